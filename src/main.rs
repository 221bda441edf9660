//! Droidant - ANT build integration for Android projects
//!
//! CLI entry point wiring settings, target discovery, the build
//! coordinator, and the adb bridge together.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use droidant::commands::{
    BuildCommand, CommandContext, DevicesCommand, KillCommand, ListTargetsCommand, RunCommand,
};
use droidant::{BuildResult, Settings};
use droidant_core::Event;

#[derive(Parser)]
#[command(name = "droidant", version, about = "ANT build integration for Android projects")]
struct Cli {
    /// Android project directory (default: discovered from the current directory)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Android SDK directory (default: read from local.properties)
    #[arg(long, global = true)]
    sdk_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the project's invokable build targets
    Targets,
    /// Build one target
    Build {
        /// Target to build (default: the configured default target)
        target: Option<String>,
    },
    /// Build the default target, install it, and launch the main activity
    Run {
        /// Device serial (default: the only attached device)
        #[arg(long)]
        device: Option<String>,
    },
    /// List attached devices
    Devices,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let cli = Cli::parse();

    let mut settings = Settings::load_or_create().await?;
    if let Some(project) = cli.project {
        settings.project_path = Some(project);
    }
    if let Some(sdk_dir) = cli.sdk_dir {
        settings.sdk_dir = Some(sdk_dir);
    }

    let cwd = std::env::current_dir()?;
    let ctx = Arc::new(CommandContext::discover(settings, &cwd).await?);

    // Render build lifecycle events the way an editor status bar would.
    let subscription = ctx.events.subscribe();
    tokio::task::spawn_blocking(move || {
        for event in subscription.iter() {
            match event {
                Event::BuildStarted { target } => eprintln!("[build] {} started", target),
                Event::BuildQueued { target } => eprintln!("[build] {} queued", target),
                Event::BuildFinished { target, result } => {
                    eprintln!("[build] {} finished: {:?}", target, result)
                }
                Event::Error { message } => eprintln!("[error] {}", message),
            }
        }
    });

    match cli.command {
        Commands::Targets => {
            let list = ListTargetsCommand.execute(&ctx).await?;
            for option in list.options() {
                println!("{}", option);
            }
        }
        Commands::Build { target } => {
            let result = with_ctrl_c(&ctx, BuildCommand { target }.execute(&ctx)).await?;
            exit_on_result(result);
        }
        Commands::Run { device } => {
            let result = with_ctrl_c(&ctx, RunCommand { device }.execute(&ctx)).await?;
            exit_on_result(result);
        }
        Commands::Devices => {
            DevicesCommand.execute(&ctx).await?;
        }
    }

    Ok(())
}

/// Run `build` to completion, turning Ctrl-C into a kill request so the
/// ant process does not outlive the CLI.
async fn with_ctrl_c(
    ctx: &Arc<CommandContext>,
    build: impl std::future::Future<Output = Result<BuildResult>>,
) -> Result<BuildResult> {
    let watcher = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, killing build");
                KillCommand.execute(&ctx);
            }
        })
    };

    let result = build.await;
    watcher.abort();
    result
}

fn exit_on_result(result: BuildResult) {
    match result {
        BuildResult::Succeeded => {}
        BuildResult::Failed => std::process::exit(1),
        BuildResult::Killed => std::process::exit(130),
    }
}
