// CLI commands - thin wrappers that log and delegate to the app state

use clap::{Parser, Subcommand};
use photo_collector::protocol::Backend;
use photo_collector::state::AppState;
use photo_collector::upload::{Outcome, Progress, Recovery, SelectedFile};
use photo_collector::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "photo-collector", version, about = "Upload photos to the school photo collection")]
pub struct Cli {
    /// Directory holding settings.json and identity.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Script execution URL, overrides the configured one
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload image files
    Send {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Re-send files that failed, up to this many extra rounds
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
    /// Show collection totals
    Summary,
    /// Show the top uploaders
    Ranking,
    /// Register this device and store the issued identity
    Register {
        #[arg(long)]
        student_number: String,
        #[arg(long)]
        nickname: String,
    },
    /// Print the stored identity
    Whoami,
}

/// Returns `true` when every file ended up uploaded.
pub async fn send_files<B: Backend>(state: &AppState<B>, files: Vec<PathBuf>, retries: u32) -> Result<bool> {
    info!(
        batch_size = state.settings().batch_size,
        "Command: send {} file(s)",
        files.len()
    );

    let outcome = state
        .add_files(files.into_iter().map(SelectedFile::from_path).collect())
        .await?;
    if let Some(warning) = outcome.capped {
        println!("Warning: {}", warning);
    }
    if outcome.duplicates > 0 {
        println!("Skipped {} file(s) with duplicate names", outcome.duplicates);
    }

    for round in 0..=retries {
        if round > 0 {
            info!(round, "retrying failed files");
        }

        let mut progress_rx = state.subscribe();
        let printer = tokio::spawn(async move {
            while progress_rx.changed().await.is_ok() {
                let progress = progress_rx.borrow_and_update().progress();
                render_progress(&progress);
            }
        });

        let session = state.send().await;
        printer.abort();
        let session = session?;

        // The printer may not have seen the last update before it was stopped
        let progress = session.progress();
        render_progress(&progress);
        eprintln!();

        println!("Finished: {} / {} processed", progress.processed, progress.total);
        for entry in session.entries.iter().filter(|e| e.outcome == Outcome::Failed) {
            println!("  failed: {}", entry.filename);
        }

        match state.close_dialog().await? {
            Recovery::AllSucceeded => {
                println!("All files uploaded");
                return Ok(true);
            }
            Recovery::Retry(kept) => {
                warn!(failed = kept.len(), "some files were not uploaded");
            }
        }
    }

    let remaining = state.selected_files().await;
    println!("{} file(s) still not uploaded", remaining.len());
    Ok(false)
}

fn render_progress(progress: &Progress) {
    if progress.total > 0 {
        eprint!(
            "\r{} / {} sent ({:.0}%)",
            progress.processed, progress.total, progress.percent
        );
        let _ = std::io::stderr().flush();
    }
}

pub async fn show_summary<B: Backend>(state: &AppState<B>) -> Result<()> {
    info!("Command: summary");

    match state.summary().await? {
        Some(summary) => {
            println!("Images collected: {}", summary.number_of_images);
            println!("Participants:     {}", summary.number_of_users);
            println!("Your images:      {}", summary.user_images);
        }
        None => println!("Summary unavailable"),
    }
    Ok(())
}

pub async fn show_ranking<B: Backend>(state: &AppState<B>) -> Result<()> {
    info!("Command: ranking");

    let me = state.identity().await;
    match state.ranking().await? {
        Some(rows) if !rows.is_empty() => {
            for row in rows {
                let marker = if me.as_deref() == Some(row.identity.as_str()) { "*" } else { " " };
                println!("{}{:>3}. {:<24} {:>5}", marker, row.rank, row.identity, row.image_count);
            }
        }
        Some(_) => println!("No uploads yet"),
        None => println!("Ranking unavailable"),
    }
    Ok(())
}

pub async fn register<B: Backend>(state: &AppState<B>, student_number: String, nickname: String) -> Result<()> {
    info!("Command: register {}", nickname);

    let user_id = state.register_user(student_number, nickname).await?;
    println!("Registered as {}", user_id);
    Ok(())
}
