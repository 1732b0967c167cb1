//! Push notification subscription handshake.
//!
//! ```text
//! load:       Unregistered -> Checking -> Subscribed | Unsubscribed
//! subscribe:  register worker -> push service subscribe -> POST /subscriptions -> Subscribed
//! ```
//!
//! The platform side (background worker registry and push service) sits
//! behind [`PushPlatform`]. Delivery of push messages is the backend's job
//! and is not handled here.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::NotesApi;
use crate::config::Config;
use crate::structs::PushSubscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unregistered,
    Checking,
    Subscribed,
    Unsubscribed,
}

/// Arguments to the push service's subscribe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    pub application_server_key: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Subscription object as handed out by the push service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<i64>,
    pub keys: SubscriptionKeys,
}

impl PlatformSubscription {
    /// The `{endpoint, p256dh, auth}` triple the backend stores.
    pub fn credential(&self) -> Result<PushSubscription> {
        if self.endpoint.is_empty() {
            bail!("push subscription has no endpoint");
        }
        if self.keys.p256dh.is_empty() || self.keys.auth.is_empty() {
            bail!("push subscription for {} is missing keys", self.endpoint);
        }
        Ok(PushSubscription {
            endpoint: self.endpoint.clone(),
            p256dh: self.keys.p256dh.clone(),
            auth: self.keys.auth.clone(),
        })
    }
}

/// Host facilities for background workers and push subscriptions.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    fn supports_workers(&self) -> bool;

    /// Resolves once a background worker is active.
    async fn ready(&self) -> Result<()>;

    async fn existing_subscription(&self) -> Result<Option<PlatformSubscription>>;

    async fn register_worker(&self, script: &str, scope: &str) -> Result<()>;

    async fn subscribe(&self, options: &SubscribeOptions) -> Result<PlatformSubscription>;
}

/// Host without background workers, e.g. a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWorkerPlatform;

#[async_trait]
impl PushPlatform for NoWorkerPlatform {
    fn supports_workers(&self) -> bool {
        false
    }

    async fn ready(&self) -> Result<()> {
        Err(unsupported())
    }

    async fn existing_subscription(&self) -> Result<Option<PlatformSubscription>> {
        Ok(None)
    }

    async fn register_worker(&self, _script: &str, _scope: &str) -> Result<()> {
        Err(unsupported())
    }

    async fn subscribe(&self, _options: &SubscribeOptions) -> Result<PlatformSubscription> {
        Err(unsupported())
    }
}

fn unsupported() -> anyhow::Error {
    anyhow!("background workers are not supported on this platform")
}

pub struct PushManager<P> {
    platform: P,
    worker_script: String,
    worker_scope: String,
    application_server_key: Option<Vec<u8>>,
    state: SubscriptionState,
}

impl<P: PushPlatform> PushManager<P> {
    pub fn new(
        platform: P,
        worker_script: impl Into<String>,
        worker_scope: impl Into<String>,
        application_server_key: Option<Vec<u8>>,
    ) -> Self {
        Self {
            platform,
            worker_script: worker_script.into(),
            worker_scope: worker_scope.into(),
            application_server_key,
            state: SubscriptionState::Unregistered,
        }
    }

    /// A missing or undecodable key is logged; `subscribe` will then fail.
    pub fn from_config(platform: P, config: &Config) -> Self {
        let key = match config.application_server_key() {
            Ok(key) => Some(key),
            Err(e) => {
                log::warn!("[Push] notifications unavailable: {:#}", e);
                None
            }
        };
        Self::new(platform, &config.worker_script, &config.worker_scope, key)
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    pub fn is_subscribed(&self) -> bool {
        self.state == SubscriptionState::Subscribed
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Look for a subscription left over from an earlier session.
    pub async fn check_existing(&mut self) -> SubscriptionState {
        if !self.platform.supports_workers() {
            log::debug!("[Push] no background worker support");
            return self.state;
        }

        self.state = SubscriptionState::Checking;
        self.state = match self.find_existing().await {
            Ok(true) => SubscriptionState::Subscribed,
            Ok(false) => SubscriptionState::Unsubscribed,
            Err(e) => {
                log::error!("[Push] checking subscription failed: {:#}", e);
                SubscriptionState::Unsubscribed
            }
        };
        self.state
    }

    async fn find_existing(&self) -> Result<bool> {
        self.platform.ready().await?;
        Ok(self.platform.existing_subscription().await?.is_some())
    }

    /// Run the handshake and report the forwarded credential.
    ///
    /// State only changes on full success. If the backend rejects the
    /// credential the platform keeps its subscription anyway.
    pub async fn try_subscribe<A: NotesApi>(&mut self, api: &A) -> Result<PushSubscription> {
        if !self.platform.supports_workers() {
            return Err(unsupported());
        }
        let key = self
            .application_server_key
            .clone()
            .context("no application server key configured")?;

        self.platform
            .register_worker(&self.worker_script, &self.worker_scope)
            .await
            .with_context(|| format!("registering {}", self.worker_script))?;

        let options = SubscribeOptions {
            user_visible_only: true,
            application_server_key: key,
        };
        let subscription = self
            .platform
            .subscribe(&options)
            .await
            .context("push service refused subscription")?
            .credential()?;

        api.post_subscription(&subscription).await?;

        log::info!("[Push] subscribed {}", subscription.endpoint);
        self.state = SubscriptionState::Subscribed;
        Ok(subscription)
    }

    /// UI entry point: returns whether the client is now subscribed.
    pub async fn subscribe<A: NotesApi>(&mut self, api: &A) -> bool {
        if let Err(e) = self.try_subscribe(api).await {
            log::error!("[Push] {:#}", e);
        }
        self.is_subscribed()
    }
}
