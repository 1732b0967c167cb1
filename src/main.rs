use anyhow::Result;
use clap::{Parser, Subcommand};

use echovault::push::NoWorkerPlatform;
use echovault::{App, Config, HttpApi, Msg, NoteId, NoteStore, NoteVector, PushManager};

#[derive(Parser, Debug)]
#[command(name = "echovault", version, about = "Take short notes on an EchoVault server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all notes
    List,
    /// Add a note
    Add { title: String, content: String },
    /// Delete a note by id
    Delete { id: NoteId },
    /// Show backend and push notification status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = NoteStore::new(HttpApi::from_config(&config));
    let push = PushManager::from_config(NoWorkerPlatform, &config);
    let mut app = App::new(store, push);

    app.update(Msg::Load).await;

    match cli.command.unwrap_or(Command::List) {
        Command::List => {}
        Command::Add { title, content } => {
            app.update(Msg::NewTitle(title)).await;
            app.update(Msg::NewContent(content)).await;
            app.update(Msg::Submit).await;
        }
        Command::Delete { id } => app.update(Msg::Delete(id)).await,
        Command::Status => {
            let reachability = match app.store().api().health().await {
                Ok(health) if health.version.is_empty() => health.status,
                Ok(health) => format!("{} (version {})", health.status, health.version),
                Err(e) => format!("{}: {:?}", e, e),
            };
            println!("backend: {} {}", config.backend_base_url, reachability);
            println!("notes:   {}", app.notes().len());
            println!("push:    {:?}", app.subscription_state());
            return Ok(());
        }
    }

    print_notes(&app.notes());
    Ok(())
}

fn print_notes(notes: &NoteVector) {
    if notes.is_empty() {
        println!("(no notes)");
        return;
    }
    for note in notes {
        let created = note
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("[{}] {}  {}", note.id, note.title, created);
        println!("    {}", note.content);
    }
}
