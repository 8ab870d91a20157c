use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use route_maps::{
    background_services::export_route_maps,
    config::{Args, MatchConfig},
};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    _ = dotenv();
    let args = Args::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily(&args.log_dir, "route_maps.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(file_log)
        .with(env_filter)
        .init();

    let config = match MatchConfig::try_from(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration {e:?}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Matching with precision {} and tolerance {} x 1..={}",
        config.precision.digits(),
        config.ladder.unit(),
        config.ladder.steps()
    );

    match export_route_maps(&args.data_dir, &args.output_dir, &config).await {
        Ok(summary) => {
            info!("{summary:?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:?}");
            ExitCode::FAILURE
        }
    }
}
