//! Tether CLI - line-oriented driver for the session runtime
//!
//! Wires a `SessionManager` to stdin/stdout through a printing sink. The
//! scripted echo provider stands in for a real model transport, so the full
//! boundary surface (initialize, send_message, set_config, get_config,
//! set_callback, cleanup) can be exercised from a terminal.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tether_core::provider::ScriptedProvider;
use tether_core::session::{EventSink, SessionManager};
use tether_core::tools::ToolRegistry;
use tether_core::SessionConfig;

#[derive(Parser)]
#[command(name = "tether")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Streaming session runtime driver", long_about = None)]
struct Cli {
    /// Model name written into the session config
    #[arg(short, long, default_value = "scripted-echo")]
    model: String,

    /// Provider endpoint URL override
    #[arg(long)]
    endpoint: Option<String>,

    /// Characters per streamed chunk
    #[arg(long, default_value_t = 8)]
    chunk_size: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Sink that renders events as terminal lines
struct PrintSink {
    /// Whether the current turn already streamed chunk text
    streamed: AtomicBool,
}

impl PrintSink {
    fn new() -> Self {
        Self {
            streamed: AtomicBool::new(false),
        }
    }
}

impl EventSink for PrintSink {
    fn on_message(&self, text: &str) {
        if self.streamed.swap(false, Ordering::SeqCst) {
            // Chunks already printed the answer; just end the line
            println!();
        } else {
            println!("{text}");
        }
        print_prompt();
    }

    fn on_stream_chunk(&self, text: &str) {
        self.streamed.store(true, Ordering::SeqCst);
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn on_tool_start(&self, tool_name: &str, tool_id: &str) {
        println!("[tool start] {tool_name} ({tool_id})");
    }

    fn on_tool_complete(&self, tool_id: &str, result: &str) {
        println!("[tool done] {tool_id}: {result}");
    }

    fn on_error(&self, message: &str) {
        self.streamed.store(false, Ordering::SeqCst);
        eprintln!("error: {message}");
        print_prompt();
    }
}

fn print_prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let provider = Arc::new(ScriptedProvider::new().with_chunk_size(cli.chunk_size));
    let manager = SessionManager::new(provider, ToolRegistry::new());
    manager.set_callback(Some(Arc::new(PrintSink::new())));

    let mut config = SessionConfig::new(&cli.model);
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint);
    }
    if !manager.initialize(&config.to_json()?) {
        anyhow::bail!("failed to initialize session");
    }
    info!("Session ready (model: {})", cli.model);

    println!("tether - type a message, /config, /model <name>, or /quit");
    print_prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "/quit" | "/exit" => break,
            "/config" => {
                println!("{}", manager.get_config());
                print_prompt();
            }
            _ if line.starts_with("/model ") => {
                let model = line.trim_start_matches("/model ").trim();
                let swapped = SessionConfig::new(model);
                manager.set_config(&swapped.to_json()?);
                println!("model set to {model}");
                print_prompt();
            }
            _ => {
                // Empty input included: the session answers with an error event
                manager.send_message(line);
            }
        }
    }

    manager.cleanup();
    Ok(())
}
