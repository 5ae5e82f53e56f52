//! tminus CLI
//!
//! Runs the countdown server and offers a few renderer debugging commands.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tminus_api::{ApiConfig, ApiServer};
use tminus_core::constants::DEFAULT_PORT;
use tminus_core::traits::Renderer;
use tminus_core::types::{CacheKey, CountdownTarget, Remaining};
use tminus_render::GifRenderer;

/// tminus - countdown GIF server
#[derive(Parser)]
#[command(name = "tminus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Render one countdown GIF to a file
    Render {
        /// Target date (YYYY-MM-DD)
        date: String,
        /// Output file
        #[arg(short, long, default_value = "countdown.gif")]
        output: PathBuf,
        /// Draw the cheap placeholder instead of the full render
        #[arg(long)]
        placeholder: bool,
    },

    /// Print the cache key a request for DATE would use right now
    Key {
        /// Target date (YYYY-MM-DD)
        date: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "tminus=debug,info"
    } else {
        "tminus=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Render { date, output, placeholder } => cmd_render(&date, &output, placeholder),
        Commands::Key { date } => cmd_key(&date),
    }
}

/// Run the HTTP server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    let config = ApiConfig {
        port,
        ..ApiConfig::from_env()
    };

    println!("{}", "⏳ Starting tminus...".cyan().bold());
    println!("   {} http://{}:{}/countdown?date=YYYY-MM-DD", "Countdown:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!(
        "   {} {} entries, {} min window, {}s budget",
        "Cache:".dimmed(),
        config.cache_capacity,
        config.window_minutes,
        config.sweep_budget_secs
    );
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config).context("Invalid server configuration")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .context("Invalid bind address")?;
    server.run(addr).await?;

    info!("Server stopped");
    Ok(())
}

/// Render a single countdown to disk
fn cmd_render(date: &str, output: &Path, placeholder: bool) -> Result<()> {
    let target = CountdownTarget::parse(date)?;
    let remaining = target.remaining();

    let start = std::time::Instant::now();
    let gif = GifRenderer::new()
        .render(remaining, placeholder)
        .context("Failed to render countdown")?;
    std::fs::write(output, &gif)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} ({} bytes, {:?})",
        "✅ Wrote".green(),
        output.display(),
        gif.len(),
        start.elapsed()
    );
    Ok(())
}

/// Print the cache key for a date at the current instant
fn cmd_key(date: &str) -> Result<()> {
    let target = CountdownTarget::parse(date)?;
    let remaining = target.remaining();
    let quantized = Remaining::from_duration(remaining);

    println!("{}", CacheKey::from_parts(target.id(), quantized));
    if quantized.is_elapsed() {
        println!("   {}", "target reached; every request shares the zero key".yellow());
    }
    Ok(())
}
