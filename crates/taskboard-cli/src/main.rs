mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("TASKBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "taskboard", &mut std::io::stdout());
        return Ok(());
    }

    let Some(file_path) = cli.file.clone() else {
        output::output_error("--file is required for board operations");
    };

    let ctx = match CliContext::load(&cli, &file_path).await {
        Ok(ctx) => ctx,
        Err(e) => output::output_error(&e.to_string()),
    };
    tracing::debug!("Loaded board from {}", ctx.file_path().display());

    let result = match cli.command {
        Commands::Board => handlers::board::handle_board(&ctx),
        Commands::Summary => handlers::board::handle_summary(&ctx),
        Commands::List(args) => handlers::task::handle_list(&ctx, args).await,
        Commands::Add(args) => handlers::task::handle_add(&ctx, args).await,
        Commands::Move(args) => handlers::task::handle_move(&ctx, args).await,
        Commands::Complete { id } => handlers::task::handle_complete(&ctx, id).await,
        Commands::Ceo { id, off } => handlers::task::handle_ceo(&ctx, id, !off).await,
        Commands::Rm { id } => handlers::task::handle_rm(&ctx, id).await,
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(e) = result {
        output::output_error(&e.to_string());
    }
    Ok(())
}
