//! Entry point of the `qrcrypt` binary.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise logging to stderr.
//! 3. Parse the command line.
//! 4. Run the command, writing payload strings to stdout.

use std::io::BufRead;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use common::{QrError, QrRenderer};
use tracing::info;

use qrcrypt::cli::{self, Command};
use qrcrypt::config::Config;
use qrcrypt::render::TextRenderer;
use qrcrypt::{crypto, key, pipeline, telemetry};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            let code = e.downcast_ref::<QrError>().map_or(1, QrError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env()?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level, &cfg.log_format)?;

    // -----------------------------------------------------------------------
    // 3. Command line
    // -----------------------------------------------------------------------
    let command = cli::parse(std::env::args().skip(1))?;
    info!(version = env!("CARGO_PKG_VERSION"), "qrcrypt starting");

    // -----------------------------------------------------------------------
    // 4. Dispatch
    // -----------------------------------------------------------------------
    let mut renderer = TextRenderer::stdout();
    match command {
        Command::Version => println!("Encrypted qr generator: {}", env!("CARGO_PKG_VERSION")),
        Command::Help => println!("{}", cli::USAGE),
        Command::NewKey { path, show_qr } => {
            let path = path.unwrap_or(cfg.key_file);
            let payload = pipeline::new_key(&path)
                .map_err(QrError::from)
                .with_context(|| format!("creating key file {}", path.display()))?;
            if show_qr {
                renderer.render(&payload)?;
            }
        }
        Command::Encode {
            key_file,
            no_encryption,
            parts,
            text,
        } => {
            let text = text_or_stdin(text, "Data: ")?;
            let key_file = key_file.unwrap_or(cfg.key_file);
            if no_encryption || !cfg.encryption {
                renderer.render(&pipeline::plain_payload(&text))?;
            } else if parts {
                print_parts(&key_file, &text)?;
            } else {
                let payload = pipeline::seal_text(&key_file, &text)
                    .map_err(QrError::from)
                    .with_context(|| format!("encrypting with key file {}", key_file.display()))?;
                renderer.render(&payload)?;
            }
        }
        Command::Decode { key_file, payload } => {
            let payload = text_or_stdin(payload, "Payload: ")?;
            let key_file = key_file.unwrap_or(cfg.key_file);
            let key = key::load_key(&key_file)
                .map_err(|e| QrError::Key(e.to_string()))
                .context("loading key for decode")?;
            let text = pipeline::open_payload(&payload, &key)
                .map_err(QrError::from)
                .context("opening payload")?;
            println!("{text}");
        }
    }
    Ok(())
}

/// Use `given`, or prompt on stderr and read one line from stdin.
fn text_or_stdin(given: Option<String>, prompt: &str) -> Result<String> {
    if let Some(text) = given {
        return Ok(text);
    }
    eprint!("{prompt}");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(QrError::from)
        .context("reading input from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Print the individually encoded envelope fields as JSON.
fn print_parts(key_file: &Path, text: &str) -> Result<()> {
    let key = key::load_key(key_file)
        .map_err(|e| QrError::Key(e.to_string()))
        .with_context(|| format!("loading key file {}", key_file.display()))?;
    let envelope = crypto::encrypt(text, &key)
        .map_err(|e| QrError::Crypto(e.to_string()))
        .context("encrypting text")?;
    let json = serde_json::to_string_pretty(&envelope.encoded_parts())
        .context("serialising envelope parts")?;
    println!("{json}");
    Ok(())
}
