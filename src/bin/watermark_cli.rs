//! watermark-cli — headless embed/extract/visible/logo operations for
//! scripts and automation.
//! Build with: cargo build --release --bin watermark-cli

use clap::{Parser, Subcommand};
use invis_watermark::{self as lib, Position};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "watermark-cli", version, about = "Invisible image watermarking engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed an invisible watermark into an image.
    Embed {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        text: String,
        #[arg(short, long, default_value = "dct")]
        method: String,
    },
    /// Extract an invisible watermark from an image.
    Extract {
        input: PathBuf,
        #[arg(short, long, default_value = "dct")]
        method: String,
    },
    /// Render a visible text watermark onto an image.
    Visible {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        text: String,
        #[arg(long, default_value = "bottom-right")]
        position: String,
        #[arg(long, default_value_t = 0.5)]
        opacity: f32,
        #[arg(long, default_value_t = 20.0)]
        size: f32,
    },
    /// Composite a logo image onto an image.
    Logo {
        input: PathBuf,
        logo: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "bottom-right")]
        position: String,
        #[arg(long, default_value_t = 0.7)]
        opacity: f32,
        #[arg(long, default_value_t = 0.1)]
        size: f32,
    },
}

fn parse_position(tag: &str) -> Result<Position, String> {
    Position::parse(tag).ok_or_else(|| format!("unknown position: {tag}"))
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Embed { input, output, text, method } => {
            let bytes = std::fs::read(&input).map_err(|e| e.to_string())?;
            info!("embedding {} bytes via {}", bytes.len(), method);
            let result = lib::embed_by_tag(&bytes, &text, &method).map_err(|e| e.to_string())?;
            std::fs::write(&output, result).map_err(|e| e.to_string())?;
            info!("wrote {}", output.display());
            Ok(())
        }
        Command::Extract { input, method } => {
            let bytes = std::fs::read(&input).map_err(|e| e.to_string())?;
            let text = lib::extract_by_tag(&bytes, &method);
            println!("{text}");
            Ok(())
        }
        Command::Visible { input, output, text, position, opacity, size } => {
            let bytes = std::fs::read(&input).map_err(|e| e.to_string())?;
            let position = parse_position(&position)?;
            let result = lib::embed_visible(&bytes, &text, position, opacity, size)
                .map_err(|e| e.to_string())?;
            std::fs::write(&output, result).map_err(|e| e.to_string())?;
            info!("wrote {}", output.display());
            Ok(())
        }
        Command::Logo { input, logo, output, position, opacity, size } => {
            let base = std::fs::read(&input).map_err(|e| e.to_string())?;
            let logo_bytes = std::fs::read(&logo).map_err(|e| e.to_string())?;
            let position = parse_position(&position)?;
            let result = lib::embed_logo(&base, &logo_bytes, position, opacity, size)
                .map_err(|e| e.to_string())?;
            std::fs::write(&output, result).map_err(|e| e.to_string())?;
            info!("wrote {}", output.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
