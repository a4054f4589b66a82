//! # wayfare-cli
//!
//! Wayfare transcription binary — reads an audio file, streams it to the
//! recognizer, and prints the transcript.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wayfare_speech::SpeechService;

/// Wayfare speech transcription.
#[derive(Parser, Debug)]
#[command(name = "wayfare", about = "Transcribe an audio file")]
struct Cli {
    /// Audio file to transcribe.
    file: PathBuf,

    /// MIME type of the file (inferred from the extension when omitted).
    #[arg(long)]
    mime: Option<String>,
}

/// Infer a MIME type from the file extension.
fn mime_for(path: &Path) -> String {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("wav") => "audio/wav".to_string(),
        Some("mp3") => "audio/mp3".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let settings_path = wayfare_settings::loader::settings_path();
    let settings = wayfare_settings::loader::load_settings_from_path(&settings_path)
        .unwrap_or_default();
    info!(
        name = %settings.name,
        version = %settings.version,
        recognizer = %settings.speech.host,
        "settings loaded"
    );

    let data = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read audio file: {}", args.file.display()))?;
    let mime = args.mime.unwrap_or_else(|| mime_for(&args.file));
    info!(file = %args.file.display(), mime = %mime, bytes = data.len(), "transcribing");

    let service = SpeechService::new(settings.speech);
    let transcript = service
        .transcribe(&data, &mime)
        .await
        .context("Transcription failed")?;

    println!("{transcript}");
    Ok(())
}
