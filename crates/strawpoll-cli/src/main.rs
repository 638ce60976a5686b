use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod build_info;
mod cli;
mod commands;
mod config;
mod credentials;
mod exit;
mod output;

use build_info::BuildInfo;
use commands::Context;
use output::Output;

const LOG_ENV: &str = "STRAWPOLL_LOG";

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();

    let filter = if args.global.verbose {
        EnvFilter::new("strawpoll=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("strawpoll=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let ctx = Context {
        output: Output::new(args.global.json, args.global.plain, args.global.no_color),
        cancel,
        build: BuildInfo::current(),
    };
    tracing::debug!(version = ctx.build.version(), "starting");

    let code = match commands::run(args.command, &ctx).await {
        Ok(()) => exit::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit::exit_code(&err)
        }
    };
    std::process::exit(code);
}
