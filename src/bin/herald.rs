//! herald — command-line front end
//!
//! Fetch URLs through the orchestrator's strategies and print the
//! resulting envelopes as JSON, one per line.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use herald::{Envelope, Herald, HeraldConfig, PollOptions};
use serde::Serialize;

/// Herald CLI
#[derive(Parser)]
#[command(name = "herald")]
#[command(version)]
#[command(about = "Fetch JSON APIs through shared, cached, debounced and polling strategies")]
struct Args {
    /// Config file (default: ~/.config/herald/config.toml)
    #[arg(short, long, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print envelopes
    #[arg(short, long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plain GET
    Get {
        url: String,
    },

    /// One shared GET observed by several subscribers
    Shared {
        url: String,
        /// Number of subscribers
        #[arg(short, long, default_value_t = 2)]
        subscribers: usize,
        /// Give every subscriber its own copy
        #[arg(long)]
        immutable: bool,
    },

    /// GET through the response cache, repeated to show hits
    Cached {
        url: String,
        /// Number of lookups
        #[arg(short, long, default_value_t = 2)]
        repeat: usize,
        /// Use the immutable cache
        #[arg(long)]
        immutable: bool,
    },

    /// Debounced GET: every URL is requested in quick succession and only
    /// the last one is fetched
    Debounced {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Quiet period in milliseconds (default: from config)
        #[arg(short, long)]
        window: Option<u64>,
    },

    /// Poll a URL
    Poll {
        url: String,
        /// Interval in milliseconds (default: from config)
        #[arg(short, long)]
        interval: Option<u64>,
        /// Stop after this many polls
        #[arg(short, long)]
        limit: Option<u32>,
        /// Stop after this many seconds
        #[arg(long = "for")]
        duration: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = HeraldConfig::load(args.config.as_deref())?;
    let herald = Herald::builder().config(config).build()?;
    let pretty = args.pretty;

    match args.command {
        Command::Get { url } => {
            print_envelope(&herald.get(&url).first().await?, pretty)?;
        }

        Command::Shared {
            url,
            subscribers,
            immutable,
        } => {
            if immutable {
                let source = herald.get_immutable(&url);
                for _ in 0..subscribers {
                    print_envelope(&source.first().await?, pretty)?;
                }
            } else {
                let source = herald.get_shared(&url);
                for _ in 0..subscribers {
                    print_envelope(&*source.first().await?, pretty)?;
                }
            }
        }

        Command::Cached {
            url,
            repeat,
            immutable,
        } => {
            for _ in 0..repeat {
                if immutable {
                    print_envelope(&herald.get_cached_immutable(&url).first().await?, pretty)?;
                } else {
                    print_envelope(&*herald.get_cached(&url).first().await?, pretty)?;
                }
            }
        }

        Command::Debounced { urls, window } => {
            let window = window.map(Duration::from_millis);
            let sources: Vec<_> = urls
                .iter()
                .map(|url| herald.get_debounced(url, window))
                .collect();
            for source in &sources {
                print_envelope(&*source.first().await?, pretty)?;
            }
        }

        Command::Poll {
            url,
            interval,
            limit,
            duration,
        } => {
            let mut options = PollOptions::new();
            if let Some(ms) = interval {
                options = options.interval(Duration::from_millis(ms));
            }
            if let Some(n) = limit {
                options = options.limit(n);
            }
            let cancel = async move {
                match duration {
                    Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                    None => std::future::pending().await,
                }
            };

            let mut stream = herald.get_until(&url, cancel, options).subscribe();
            while let Some(outcome) = stream.next().await {
                print_envelope(&*outcome?, pretty)?;
            }
        }
    }

    Ok(())
}

fn print_envelope<T: Serialize>(
    envelope: &Envelope<T>,
    pretty: bool,
) -> Result<(), serde_json::Error> {
    let line = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    println!("{line}");
    Ok(())
}
