use std::env;

use tracing_subscriber::EnvFilter;

mod cli;
use cli::{USAGE, parse_cli_args, run_agenda_mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let args = match parse_cli_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    if let Err(e) = run_agenda_mode(args).await {
        eprintln!("Error: {:#}", e);
        tracing::error!("Agenda failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn setup_logging() {
    let log_dir = dirs::config_dir()
        .map(|d| d.join("jikan-maru"))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "jikan-maru.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("jikan-maru started");
}
