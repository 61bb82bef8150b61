//! quill: stream a completion to the terminal at typing pace.
//!
//! Usage:
//!   quill [--model <id>] [--temperature <t>] [--config <file>] <prompt...>
//!
//! The API key is read from the OS keyring, falling back to `QUILL_API_KEY`.
//! Ctrl-C stops the generation quietly.

use anyhow::{bail, Context};
use quillstream::pacing::{IntervalFrames, PacingQueue};
use quillstream::{GenerationOptions, Generator, GeneratorConfig, Message, PacedSession};
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct Args {
    model: Option<String>,
    temperature: Option<f32>,
    config: Option<String>,
    prompt: String,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut model = None;
    let mut temperature = None;
    let mut config = None;
    let mut words = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" | "-m" => model = Some(args.next().context("--model needs a value")?),
            "--temperature" | "-t" => {
                let raw = args.next().context("--temperature needs a value")?;
                temperature = Some(raw.parse().context("--temperature must be a number")?);
            }
            "--config" | "-c" => config = Some(args.next().context("--config needs a path")?),
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        print_usage();
        bail!("missing prompt");
    }
    Ok(Args {
        model,
        temperature,
        config,
        prompt: words.join(" "),
    })
}

fn print_usage() {
    println!(
        r#"quill: stream a completion to the terminal

USAGE:
    quill [OPTIONS] <PROMPT>...

OPTIONS:
    -m, --model <id>          Model id (default: {})
    -t, --temperature <t>     Sampling temperature, 0-2
    -c, --config <file>       YAML config file

ENVIRONMENT:
    QUILL_API_KEY             API key when none is stored in the keyring
    QUILL_API_BASE            Provider base URL
    RUST_LOG                  Log filter, e.g. quillstream=debug"#,
        quillstream::models::DEFAULT_MODEL
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => GeneratorConfig::default(),
    };
    let frame_interval = config.frame_interval();
    let generator = Generator::builder()
        .config(config)
        .build()
        .context("building generator")?;

    let queue = PacingQueue::new(
        |c| {
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "{c}");
            let _ = out.flush();
        },
        Arc::new(IntervalFrames::new(frame_interval)),
    );
    let session = PacedSession::new(queue);

    let cancel = session.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut options = GenerationOptions::new();
    if let Some(model) = args.model {
        options = options.model(model);
    }
    if let Some(t) = args.temperature {
        options = options.temperature(t);
    }

    let messages = [Message::user(args.prompt)];
    let outcome = session.generate(&generator, &messages, options).await;
    println!();

    match outcome {
        Ok(()) => Ok(()),
        Err(e) if e.category.is_silent() => Ok(()),
        Err(e) => {
            eprintln!("[{}] {}", e.category.code(), e.message);
            std::process::exit(1);
        }
    }
}
