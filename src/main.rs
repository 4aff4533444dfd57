use std::net::SocketAddr;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use stability::advisor::advisor_from_args;
use stability::api::{analyze, run_http_server, simulate};
use stability::cli::{AnalyzeArgs, Cli, Command, build_profile};

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stability=info"));
    // stdout carries the `analyze` JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Serve(args) => {
            let addr = SocketAddr::new(args.host, args.port);
            let advisor = advisor_from_args(&args.advisor);
            run_http_server(addr, advisor)
                .await
                .map_err(|e| format!("Server error: {e}"))
        }
        Command::Analyze(args) => run_analyze(args).await,
    };

    if let Err(msg) = outcome {
        error!("{msg}");
        std::process::exit(1);
    }
}

async fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let profile = build_profile(&args)?;
    let overrides = args.overrides();

    let result = if overrides.is_empty() {
        let advisor = advisor_from_args(&args.advisor);
        analyze(&profile, advisor.as_ref()).await
    } else {
        simulate(&profile, &overrides)
    };

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| format!("Failed to serialize result: {e}"))?;
    println!("{json}");
    Ok(())
}
