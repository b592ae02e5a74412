use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sign_coach::speech::{self, mime_for};
use sign_coach::{ApiServerBuilder, AudioStore, Config};

/// Sign Coach - voice-driven practice backend for sign-language colors
#[derive(Parser)]
#[command(name = "sign-coach", version, about)]
struct Cli {
    /// Port to listen on (overrides config and `SIGN_COACH_PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Synthesize text with the configured TTS provider
    TestTts {
        /// Text to speak
        #[arg(default_value = "Would you like to practice colors today?")]
        text: String,
        /// Write the audio here instead of the audio directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Transcribe a recording with the configured STT provider
    TestStt {
        /// Audio file to transcribe
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,sign_coach=info",
        1 => "info,sign_coach=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::TestTts { text, out } => test_tts(&config, &text, out.as_deref()).await,
        Command::TestStt { path } => test_stt(&config, &path).await,
    }
}

/// Run the API server until interrupted
async fn serve(config: &Config) -> anyhow::Result<()> {
    let synthesizer = speech::synthesizer_from_config(config)?;
    let transcriber = speech::transcriber_from_config(config)?;

    tracing::info!(
        port = config.server.port,
        tts = synthesizer.name(),
        stt = transcriber.name(),
        "starting sign coach"
    );

    ApiServerBuilder::from_config(config, synthesizer, transcriber)
        .build()
        .run()
        .await?;

    Ok(())
}

/// Synthesize a phrase and report where it was written
async fn test_tts(config: &Config, text: &str, out: Option<&Path>) -> anyhow::Result<()> {
    let synthesizer = speech::synthesizer_from_config(config)?;
    println!("Synthesizing with {}: \"{text}\"", synthesizer.name());

    let audio = synthesizer.synthesize(text).await?;

    let path = if let Some(out) = out {
        tokio::fs::write(out, &audio).await?;
        out.to_path_buf()
    } else {
        let store = AudioStore::new(config.server.audio_dir.clone());
        let name = store.save(&audio).await?;
        store.dir().join(name)
    };

    println!("Wrote {} bytes to {}", audio.len(), path.display());
    Ok(())
}

/// Transcribe a local recording and print the text
async fn test_stt(config: &Config, path: &Path) -> anyhow::Result<()> {
    let transcriber = speech::transcriber_from_config(config)?;
    let audio = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio.mp3");

    println!(
        "Transcribing {} ({}, {} bytes) with {}...",
        path.display(),
        mime_for(file_name),
        audio.len(),
        transcriber.name()
    );

    let text = transcriber.transcribe(&audio, file_name).await?;
    println!("Transcript: {text}");
    Ok(())
}
