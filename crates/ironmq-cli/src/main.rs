use ironmq_cli::run_cli;
use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(e) = run_cli().await {
        // Logging setup itself can fail, leaving nothing to report through
        if tracing::dispatcher::has_been_set() {
            error!("CLI error: {}", e);
        } else {
            eprintln!("error: {}", e);
        }

        std::process::exit(e.exit_code());
    }
}
