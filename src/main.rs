mod commands;
mod logging;

use clap::{CommandFactory, Parser};
use commands::{Cli, Commands};
use photo_collector::config::{self, Settings};
use photo_collector::protocol::ScriptClient;
use photo_collector::state::{AppState, IdentityStore};
use std::path::PathBuf;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    logging::init_logger();

    let args = Cli::parse();

    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return;
    };

    match run(command, args.data_dir, args.endpoint).await {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(err) => {
            error!("Error: {}", err);
            process::exit(1);
        }
    }
}

async fn run(command: Commands, data_dir: Option<PathBuf>, endpoint: Option<String>) -> photo_collector::Result<bool> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => config::default_data_dir()?,
    };

    if let Commands::Whoami = command {
        let identity = IdentityStore::load(&data_dir)?;
        match identity.user_id() {
            Some(user_id) => println!("{}", user_id),
            None => println!("Not registered"),
        }
        return Ok(true);
    }

    let mut settings = Settings::load(&data_dir)?;
    if let Some(endpoint) = endpoint {
        settings.endpoint = endpoint;
    }

    let client = ScriptClient::new(&settings)?;
    let identity = IdentityStore::load(&data_dir)?;
    let state = AppState::new(client, settings, identity);

    match command {
        Commands::Send { files, retries } => commands::send_files(&state, files, retries).await,
        Commands::Summary => commands::show_summary(&state).await.map(|_| true),
        Commands::Ranking => commands::show_ranking(&state).await.map(|_| true),
        Commands::Register {
            student_number,
            nickname,
        } => commands::register(&state, student_number, nickname)
            .await
            .map(|_| true),
        Commands::Whoami => Ok(true),
    }
}
