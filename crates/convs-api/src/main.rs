//! Conversational-bot console CLI and REST API entry point.
//!
//! Binary name: `convs`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use convs_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands, CreateResource, DeleteResource, ListResource, ModuleCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (log_json, otel) = match &cli.command {
        Commands::Serve { log_json, otel, .. } => (*log_json, *otel),
        _ => (false, false),
    };
    init_tracing(&TracingOptions {
        default_filter: cli.log_filter().to_string(),
        json: log_json,
        otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "convs", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Create { resource } => match resource {
            CreateResource::Bot { name, description } => {
                cli::bot::create_bot(&state, name, description, cli.json).await?;
            }
        },

        Commands::List { resource } => match resource {
            ListResource::Bots { status, sort } => {
                cli::bot::list_bots(&state, status, &sort, cli.json).await?;
            }
        },

        Commands::Show { slug } => {
            cli::bot::show_bot(&state, &slug, cli.json).await?;
        }

        Commands::Delete { resource } => match resource {
            DeleteResource::Bot { slug, force } => {
                cli::bot::delete_bot(&state, &slug, force, cli.json).await?;
            }
        },

        Commands::Module { action } => match action {
            ModuleCommand::Create {
                bot,
                name,
                description,
                stories,
            } => {
                cli::module::create_module(&state, bot, name, description, stories, cli.json)
                    .await?;
            }
            ModuleCommand::Edit {
                id,
                name,
                description,
                bot,
                stories,
            } => {
                cli::module::edit_module(&state, &id, name, description, bot, stories, cli.json)
                    .await?;
            }
            ModuleCommand::List { bot } => {
                cli::module::list_modules(&state, &bot, cli.json).await?;
            }
            ModuleCommand::Show { id } => {
                cli::module::show_module(&state, &id, cli.json).await?;
            }
            ModuleCommand::Delete { id, force } => {
                cli::module::delete_module(&state, &id, force, cli.json).await?;
            }
        },

        Commands::Serve { port, host, .. } => serve(state, &host, port).await?,

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Start the REST API server and block until shutdown.
async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    if let Some(api_key) = http::extractors::auth::ensure_api_key(&state).await? {
        println!();
        println!(
            "  {} API key generated (save this -- it won't be shown again):",
            console::style("🔑").bold()
        );
        println!();
        println!("  {}", console::style(&api_key).yellow().bold());
        println!();
    }

    // Surface module changes in the server log.
    let mut events = state.module_service.events().subscribe();
    let event_log = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(module_id = %event.module_id(), ?event, "module event"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "module event log lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!(
        "  {}",
        console::style(format!("Data directory: {}", state.data_dir.display())).dim()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());
    tracing::info!(
        %addr,
        missing_parent = ?state.config.modules.missing_parent,
        "server started"
    );

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    event_log.abort();
    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
