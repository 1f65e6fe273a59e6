//! CLI binary for lifelines.
//!
//! A thin shim over the library crate: `serve` runs the HTTP service,
//! `read` performs a one-shot reading from two local files or URLs and
//! renders the sections to the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use lifelines::{
    bind_reading, read_palms, resolve_image, reveal_words, serve, MarkdownSurface, ReadingConfig,
};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One-shot reading from local photos
  lifelines read left.jpg right.jpg

  # Reading from URLs, specific model, raw model text
  lifelines read --model gpt-4o https://example.com/l.jpg https://example.com/r.jpg --raw

  # Structured JSON (raw text + parsed sections + stats)
  lifelines read left.png right.png --json > reading.json

  # Run the HTTP service
  lifelines serve --addr 0.0.0.0:3000

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  LIFELINES_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  LIFELINES_MODEL         Override model ID

SETUP:
  1. Set API key:  export OPENAI_API_KEY=sk-...
  2. Read:         lifelines read left.jpg right.jpg
"#;

/// Palm reading reports from palm photos using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "lifelines",
    version,
    about = "Palm reading reports from palm photos using Vision LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "LIFELINES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true, env = "LIFELINES_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP reading service.
    Serve {
        /// Socket address to bind.
        #[arg(long, env = "LIFELINES_ADDR", default_value = "0.0.0.0:3000")]
        addr: SocketAddr,

        /// LLM model ID (e.g. gpt-4o-mini, claude-sonnet-4-20250514).
        #[arg(long, env = "LIFELINES_MODEL")]
        model: Option<String>,

        /// LLM provider: openai, anthropic, gemini, ollama.
        #[arg(long, env = "LIFELINES_PROVIDER")]
        provider: Option<String>,

        /// Per-inference-call timeout in seconds.
        #[arg(long, env = "LIFELINES_API_TIMEOUT", default_value_t = 60)]
        api_timeout: u64,
    },

    /// Perform one reading from two palm images (local paths or URLs).
    Read {
        /// Left palm image: local path or HTTP/HTTPS URL.
        left: String,

        /// Right palm image: local path or HTTP/HTTPS URL.
        right: String,

        /// LLM model ID.
        #[arg(long, env = "LIFELINES_MODEL")]
        model: Option<String>,

        /// LLM provider: openai, anthropic, gemini, ollama.
        #[arg(long, env = "LIFELINES_PROVIDER")]
        provider: Option<String>,

        /// LLM temperature (0.0–2.0).
        #[arg(long, default_value_t = 0.7)]
        temperature: f32,

        /// Max LLM output tokens.
        #[arg(long, default_value_t = 1500)]
        max_tokens: usize,

        /// Per-inference-call timeout in seconds.
        #[arg(long, env = "LIFELINES_API_TIMEOUT", default_value_t = 60)]
        api_timeout: u64,

        /// Print the raw model text instead of the rendered sections.
        #[arg(long)]
        raw: bool,

        /// Output structured JSON (raw + parsed + stats).
        #[arg(long)]
        json: bool,

        /// With --raw, print the text at once instead of the word-by-word reveal.
        #[arg(long)]
        no_reveal: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            addr,
            model,
            provider,
            api_timeout,
        } => {
            let mut builder = ReadingConfig::builder().api_timeout_secs(api_timeout);
            if let Some(model) = model {
                builder = builder.model(model);
            }
            if let Some(provider) = provider {
                builder = builder.provider_name(provider);
            }
            let config = builder.build().context("Invalid configuration")?;

            serve(addr, config).await.context("Server failed")?;
        }

        Command::Read {
            left,
            right,
            model,
            provider,
            temperature,
            max_tokens,
            api_timeout,
            raw,
            json,
            no_reveal,
        } => {
            let mut builder = ReadingConfig::builder()
                .temperature(temperature)
                .max_tokens(max_tokens)
                .api_timeout_secs(api_timeout);
            if let Some(model) = model {
                builder = builder.model(model);
            }
            if let Some(provider) = provider {
                builder = builder.provider_name(provider);
            }
            let config = builder.build().context("Invalid configuration")?;

            let left_image = resolve_image(&left, config.download_timeout_secs)
                .await
                .context("Failed to resolve left palm image")?;
            let right_image = resolve_image(&right, config.download_timeout_secs)
                .await
                .context("Failed to resolve right palm image")?;

            // A single network call can take tens of seconds; show a spinner
            // unless the output is being piped somewhere structured.
            let spinner = if !cli.quiet && !json {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar.set_message("Reading your palms…");
                bar.enable_steady_tick(Duration::from_millis(80));
                Some(bar)
            } else {
                None
            };

            let output = read_palms(left_image, right_image, &config).await;
            if let Some(bar) = spinner {
                bar.finish_and_clear();
            }
            let output = output.context("Reading failed")?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).context("Failed to serialise output")?
                );
            } else {
                // The reveal re-joins words with single spaces, so it is
                // only applied to the raw prose; the rendered page keeps its
                // table layout intact.
                if raw && !no_reveal {
                    print_paced(&output.raw, &config).await?;
                } else if raw {
                    println!("{}", output.raw);
                } else {
                    let mut surface = MarkdownSurface::new();
                    bind_reading(&output.parsed, &mut surface);
                    println!("{}", surface.render());
                }

                if !cli.quiet {
                    eprintln!(
                        "   {}  —  {}ms total",
                        dim(&format!(
                            "{} tokens in / {} tokens out",
                            output.stats.input_tokens, output.stats.output_tokens
                        )),
                        bold(&output.stats.duration_ms.to_string()),
                    );
                }
            }
        }
    }

    Ok(())
}

/// Print text with the cosmetic word-batched reveal.
async fn print_paced(text: &str, config: &ReadingConfig) -> Result<()> {
    let stream = reveal_words(
        text,
        config.reveal_batch_words,
        Duration::from_millis(config.reveal_delay_ms),
    );
    tokio::pin!(stream);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let mut first = true;
    while let Some(batch) = stream.next().await {
        if !first {
            handle.write_all(b" ").context("stdout")?;
        }
        handle.write_all(batch.as_bytes()).context("stdout")?;
        handle.flush().ok();
        first = false;
    }
    handle.write_all(b"\n").context("stdout")?;
    Ok(())
}
