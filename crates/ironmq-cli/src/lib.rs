//! # IronMQ CLI
//!
//! Command-line interface over the `ironmq-client` library.
//!
//! This module provides CLI commands for:
//! - Posting messages to a queue
//! - Reserving messages, optionally deleting them on reservation
//! - Deleting reserved messages
//! - Showing the resolved configuration
//!
//! Connection settings come from an optional configuration file and `IRON_*`
//! environment variables. Ctrl-C cancels the request in flight.

use clap::{CommandFactory, Parser, Subcommand};
use ironmq_client::{
    CancellationToken, ClientConfig, ConfigurationError, DequeuedMessage, HttpClient, MessageId,
    MqError, NewMessage, QueueName, ReservationId, Timeout, Wait,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// CLI Structure
// ============================================================================

/// IronMQ CLI - post, reserve and delete queue messages
#[derive(Parser)]
#[command(name = "ironmq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for IronMQ v3 queues")]
pub struct Cli {
    /// Configuration file path (TOML, JSON or YAML)
    #[arg(short, long, env = "IRONMQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Post one message per body to a queue
    Enqueue {
        /// Target queue
        queue: QueueName,

        /// Message bodies
        #[arg(required = true)]
        bodies: Vec<String>,

        /// Seconds before the messages become available
        #[arg(short, long)]
        delay: Option<u32>,

        /// Seconds before the messages expire
        #[arg(short, long)]
        expires_in: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Reserve messages from a queue
    Dequeue {
        /// Source queue
        queue: QueueName,

        /// Maximum number of messages to reserve
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// Reservation lease in seconds
        #[arg(short, long, default_value = "60")]
        timeout: u32,

        /// Long-poll duration in seconds
        #[arg(short, long, default_value = "0")]
        wait: u32,

        /// Delete messages as they are reserved
        #[arg(short, long)]
        delete: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a reserved message
    DeleteReserved {
        /// Queue holding the message
        queue: QueueName,

        /// Message ID
        message_id: MessageId,

        /// Reservation ID returned by dequeue
        reservation_id: ReservationId,
    },

    /// Show the resolved configuration
    Config {
        /// Output format for configuration
        #[arg(short, long, default_value = "toml")]
        format: ConfigFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Configuration format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    Queue(#[from] MqError),

    #[error("Logging setup failed: {message}")]
    Logging { message: String },

    #[error("Output failed: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Logging { .. } => 1,
            Self::Queue(MqError::Cancelled) => 3,
            Self::Queue(MqError::Configuration(_)) => 1,
            Self::Queue(_) => 2,
            Self::Output { .. } | Self::Io(_) => 4,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Output {
            message: e.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Output {
            message: e.to_string(),
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling request");
            on_interrupt.cancel();
        }
    });

    let mut stdout = std::io::stdout().lock();
    execute(cli, &cancel, &mut stdout).await
}

/// Run a parsed command, writing results to `out`
pub async fn execute(
    cli: Cli,
    cancel: &CancellationToken,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ironmq", out);
            Ok(())
        }
        Commands::Config { format } => {
            let config = ClientConfig::load(cli.config.as_deref())?;
            execute_config_command(&config, format, out)
        }
        Commands::Enqueue {
            queue,
            bodies,
            delay,
            expires_in,
            format,
        } => {
            let client = build_client(cli.config.as_ref())?;
            let messages: Vec<NewMessage> = bodies
                .into_iter()
                .map(|body| NewMessage {
                    delay,
                    expires_in,
                    ..NewMessage::new(body)
                })
                .collect();

            info!(queue = %queue, count = messages.len(), "Enqueueing messages");
            let enqueued = client.enqueue(cancel, &queue, &messages).await?;

            match format {
                OutputFormat::Json => write_json(out, &enqueued)?,
                OutputFormat::Text => {
                    for id in &enqueued.ids {
                        writeln!(out, "{}", id)?;
                    }
                }
            }
            Ok(())
        }
        Commands::Dequeue {
            queue,
            count,
            timeout,
            wait,
            delete,
            format,
        } => {
            let client = build_client(cli.config.as_ref())?;

            info!(queue = %queue, count = count, timeout = timeout, wait = wait, delete = delete, "Reserving messages");
            let messages = client
                .dequeue(
                    cancel,
                    &queue,
                    count,
                    Timeout::from_secs(timeout),
                    Wait::from_secs(wait),
                    delete,
                )
                .await?;

            match format {
                OutputFormat::Json => write_json(out, &messages)?,
                OutputFormat::Text => write_messages(out, &messages)?,
            }
            Ok(())
        }
        Commands::DeleteReserved {
            queue,
            message_id,
            reservation_id,
        } => {
            let client = build_client(cli.config.as_ref())?;

            info!(queue = %queue, message_id = %message_id, "Deleting reserved message");
            let deleted = client
                .delete_reserved(cancel, &queue, &message_id, &reservation_id)
                .await?;

            writeln!(out, "{}", deleted.msg)?;
            Ok(())
        }
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Initialize logging based on CLI arguments.
///
/// `RUST_LOG` takes precedence over `--log-level`. Logs go to stderr so
/// command output on stdout stays machine-readable.
fn initialize_logging(cli: &Cli) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

fn build_client(config_path: Option<&PathBuf>) -> Result<HttpClient, CliError> {
    let config = ClientConfig::load(config_path.map(PathBuf::as_path))?;
    debug!(config = ?config, "Resolved configuration");
    Ok(HttpClient::new(&config)?)
}

fn execute_config_command(
    config: &ClientConfig,
    format: ConfigFormat,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let redacted = config.redacted();
    match format {
        ConfigFormat::Toml => write!(out, "{}", toml::to_string_pretty(&redacted)?)?,
        ConfigFormat::Json => write_json(out, &redacted)?,
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// One tab-separated line per message: id, reservation, reserved count, body
fn write_messages(out: &mut dyn Write, messages: &[DequeuedMessage]) -> Result<(), CliError> {
    for message in messages {
        let reservation = message
            .reservation_id
            .as_ref()
            .map(ReservationId::as_str)
            .unwrap_or("-");
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            message.id, reservation, message.reserved_count, message.body
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
