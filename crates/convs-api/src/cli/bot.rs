//! Bot lifecycle CLI commands: create, list, show, delete.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use convs_core::repository::bot::BotFilter;
use convs_types::bot::{BotStatus, CreateBotRequest};

use crate::cli::{format_status, spinner, truncate};
use crate::state::AppState;

/// Create a new bot via interactive prompts or one-shot flags.
///
/// # Examples
///
/// ```bash
/// # Interactive
/// convs create bot
///
/// # One-shot with flags
/// convs create bot --name "Luna" --description "Onboarding assistant"
/// ```
pub async fn create_bot(
    state: &AppState,
    name: Option<String>,
    description: Option<String>,
    json: bool,
) -> Result<()> {
    let name = match name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("Bot name")
            .interact_text()?,
    };

    let description = match description {
        Some(d) => d,
        None if json => format!("A bot named {name}"),
        None => Input::<String>::new()
            .with_prompt("Short description")
            .default(format!("A bot named {name}"))
            .interact_text()?,
    };

    let progress = spinner("cyan", "Creating bot...")?;
    let bot = state
        .bot_service
        .create_bot(CreateBotRequest {
            name,
            description: Some(description),
        })
        .await;
    progress.finish_and_clear();
    let bot = bot?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bot)?);
        return Ok(());
    }

    println!();
    println!("  {} Bot created successfully!", style("✓").green().bold());
    println!();
    println!("  {}    {}", style("Name:").bold(), style(&bot.name).cyan());
    println!("  {}    {}", style("Slug:").bold(), &bot.slug);
    println!("  {}  {}", style("Status:").bold(), format_status(&bot.status));
    println!("  {}      {}", style("ID:").bold(), style(bot.id.to_string()).dim());
    println!();
    println!(
        "  Add a module: {}",
        style(format!("convs module create --bot {} --name <name>", bot.slug)).yellow()
    );
    println!();

    Ok(())
}

/// List all bots in a colored table.
pub async fn list_bots(
    state: &AppState,
    status: Option<String>,
    sort: &str,
    json: bool,
) -> Result<()> {
    let status_filter = match status {
        Some(s) => Some(s.parse::<BotStatus>().map_err(|e| anyhow::anyhow!(e))?),
        None => None,
    };

    let filter = Some(BotFilter {
        status: status_filter,
        sort_by: Some(sort.to_string()),
        ..Default::default()
    });

    let bots = state.bot_service.list_bots(filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bots)?);
        return Ok(());
    }

    if bots.is_empty() {
        println!();
        println!(
            "  {} No bots found. Create one with: {}",
            style("i").blue().bold(),
            style("convs create bot").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Slug").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Modules").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for bot in &bots {
        let status_cell = match &bot.status {
            BotStatus::Active => Cell::new("● active").fg(Color::Green),
            BotStatus::Disabled => Cell::new("○ disabled").fg(Color::Yellow),
            BotStatus::Archived => Cell::new("◌ archived").fg(Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(&bot.name).fg(Color::Cyan),
            Cell::new(&bot.slug).fg(Color::White),
            status_cell,
            Cell::new(bot.modules.len()),
            Cell::new(truncate(&bot.description, 50)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} bot{}",
        style(bots.len()).bold(),
        if bots.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show a bot's profile with its modules.
pub async fn show_bot(state: &AppState, id_or_slug: &str, json: bool) -> Result<()> {
    let bot = state.bot_service.find_bot(id_or_slug).await?;
    let modules = state.module_service.list_modules(&bot.id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "bot": bot,
                "modules": modules,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("  {}", style(&bot.name).cyan().bold());
    println!("  {}", style(&bot.description).dim());
    println!();

    println!("  {}", style("── Details ──").dim());
    println!("  {}     {}", style("Slug:").bold(), &bot.slug);
    println!("  {}   {}", style("Status:").bold(), format_status(&bot.status));
    println!("  {}       {}", style("ID:").bold(), style(bot.id.to_string()).dim());
    println!();

    println!("  {}", style("── Modules ──").dim());
    if modules.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for module in &modules {
        println!(
            "  {} {}  {}",
            style("•").dim(),
            style(&module.name).bold(),
            style(module.id.to_string()).dim()
        );
    }
    // The back-reference list and the module records should agree.
    if bot.modules.len() != modules.len() {
        println!(
            "  {} bot lists {} module id(s) but {} module record(s) point at it",
            style("!").yellow().bold(),
            bot.modules.len(),
            modules.len()
        );
    }
    println!();

    println!("  {}", style("── Timestamps ──").dim());
    println!(
        "  {}  {}",
        style("Created:").bold(),
        bot.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  {}  {}",
        style("Updated:").bold(),
        bot.updated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();

    Ok(())
}

/// Delete a bot permanently with confirmation.
pub async fn delete_bot(state: &AppState, id_or_slug: &str, force: bool, json: bool) -> Result<()> {
    let bot = state.bot_service.find_bot(id_or_slug).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete bot '{}'?",
                style(&bot.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let progress = spinner("red", format!("Deleting {}...", bot.name))?;
    let result = state.bot_service.delete_bot(&bot.id).await;
    progress.finish_and_clear();
    result?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "slug": bot.slug}));
    } else {
        println!("  {} Bot '{}' deleted.", style("✓").red().bold(), bot.name);
    }

    Ok(())
}
