//! CLI command definitions and dispatch for the `convs` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a verb-noun
//! pattern (e.g., `convs create bot`, `convs list bots`), with module
//! management grouped under `convs module`.

pub mod bot;
pub mod module;

use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use convs_types::bot::BotStatus;

/// Manage bots and their conversation modules.
#[derive(Parser)]
#[command(name = "convs", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter implied by `--quiet` and `-v`.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,convs_core=debug,convs_infra=debug,convs_api=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new resource.
    Create {
        #[command(subcommand)]
        resource: CreateResource,
    },

    /// List resources.
    #[command(alias = "ls")]
    List {
        #[command(subcommand)]
        resource: ListResource,
    },

    /// Show details of a bot and its modules.
    Show {
        /// Bot slug or ID to display.
        slug: String,
    },

    /// Delete a resource.
    #[command(alias = "rm")]
    Delete {
        #[command(subcommand)]
        resource: DeleteResource,
    },

    /// Manage bot modules (create, edit, list, show, delete).
    Module {
        #[command(subcommand)]
        action: ModuleCommand,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Emit JSON log lines.
        #[arg(long)]
        log_json: bool,

        /// Export spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CreateResource {
    /// Create a new bot.
    Bot {
        /// Bot name (prompted for when omitted).
        #[arg(short, long)]
        name: Option<String>,

        /// Short description.
        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ListResource {
    /// List all bots.
    Bots {
        /// Filter by status (active, disabled, archived).
        #[arg(short, long)]
        status: Option<String>,

        /// Sort field (name, slug, status, created_at, updated_at).
        #[arg(long, default_value = "created_at")]
        sort: String,
    },
}

#[derive(Subcommand)]
pub enum DeleteResource {
    /// Delete a bot. Refused while the bot still owns modules.
    Bot {
        /// Bot slug or ID.
        slug: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ModuleCommand {
    /// Create a module and attach it to a bot.
    Create {
        /// Parent bot slug or ID (prompted for when omitted).
        #[arg(short, long)]
        bot: Option<String>,

        /// Module name (prompted for when omitted).
        #[arg(short, long)]
        name: Option<String>,

        /// Module description.
        #[arg(short, long)]
        description: Option<String>,

        /// Story id to include (repeatable).
        #[arg(long = "story")]
        stories: Vec<String>,
    },

    /// Edit a module. Changing `--bot` moves it to another bot.
    Edit {
        /// Module ID.
        id: String,

        /// New module name.
        #[arg(short, long)]
        name: Option<String>,

        /// New description.
        #[arg(short, long)]
        description: Option<String>,

        /// New parent bot slug or ID.
        #[arg(short, long)]
        bot: Option<String>,

        /// Replace the story list (repeatable).
        #[arg(long = "story")]
        stories: Vec<String>,
    },

    /// List the modules of a bot.
    #[command(alias = "ls")]
    List {
        /// Bot slug or ID.
        bot: String,
    },

    /// Show a module.
    Show {
        /// Module ID.
        id: String,
    },

    /// Detach a module from its bot and delete it.
    #[command(alias = "rm")]
    Delete {
        /// Module ID.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },
}

// --- Shared helpers ---

/// Start a steady-ticking spinner with the given message.
pub(crate) fn spinner(color: &str, message: impl Into<String>) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template(&format!("{{spinner:.{color}}} {{msg}}"))?,
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

pub(crate) fn format_status(status: &BotStatus) -> String {
    match status {
        BotStatus::Active => format!("{}", style("● active").green()),
        BotStatus::Disabled => format!("{}", style("○ disabled").yellow()),
        BotStatus::Archived => format!("{}", style("◌ archived").dim()),
    }
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
