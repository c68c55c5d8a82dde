mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use converge_wait_directory::{DirectoryError, DirectoryWaiterService, WaitContext, WaitError};
use std::process::ExitCode;

const EXIT_FAILED: u8 = 1;
const EXIT_TIMED_OUT: u8 = 3;
const EXIT_CANCELLED: u8 = 130;

fn init_logging(cli: &Cli) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();
}

/// Cancel `ctx` on Ctrl-C so an interrupted wait reports cancellation instead of dying mid-poll.
fn cancel_on_interrupt(ctx: &WaitContext) {
    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling wait");
            token.cancel();
        }
    });
}

async fn run(cli: &Cli, ctx: &WaitContext) -> Result<String, DirectoryError> {
    let service = DirectoryWaiterService::new().await?;
    let timeout = cli.timeout();

    let summary = match &cli.command {
        Command::RegionCreated(args) => {
            let region = service
                .region_created(ctx, &args.directory_id, &args.region_name, timeout)
                .await?;
            let state = region
                .and_then(|r| r.status)
                .map_or_else(|| "unknown".to_string(), |s| s.as_str().to_string());
            format!(
                "Region {} of directory {} is {state}",
                args.region_name, args.directory_id
            )
        }
        Command::RegionDeleted(args) => {
            service
                .region_deleted(ctx, &args.directory_id, &args.region_name, timeout)
                .await?;
            format!(
                "Region {} of directory {} is deleted",
                args.region_name, args.directory_id
            )
        }
        Command::ShareDeleted(args) => {
            service
                .shared_directory_deleted(
                    ctx,
                    &args.owner_directory_id,
                    &args.shared_directory_id,
                    timeout,
                )
                .await?;
            format!(
                "Share {} of directory {} is deleted",
                args.shared_directory_id, args.owner_directory_id
            )
        }
        Command::DirectoryShared(args) => {
            service
                .directory_shared(ctx, &args.directory_id, timeout)
                .await?;
            format!("Directory {} is shared", args.directory_id)
        }
    };
    Ok(summary)
}

fn exit_code(err: &DirectoryError) -> u8 {
    match err.as_wait_error() {
        Some(WaitError::Timeout { .. }) => EXIT_TIMED_OUT,
        Some(WaitError::Cancelled { .. }) => EXIT_CANCELLED,
        _ => EXIT_FAILED,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let ctx = WaitContext::new();
    cancel_on_interrupt(&ctx);

    match run(&cli, &ctx).await {
        Ok(summary) => {
            println!("{summary}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let code = exit_code(&err);
            let err = anyhow::Error::new(err).context(format!("{} failed", cli.command.name()));
            eprintln!("Error: {err:#}");
            Ok(ExitCode::from(code))
        }
    }
}
