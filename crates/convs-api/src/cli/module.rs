//! Module CLI commands: create, edit, list, show, delete.
//!
//! Create and edit run through a `ModuleEditor` session, the same way an
//! interactive form would: open, load parent candidates, fill the form,
//! submit.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input, Select};

use convs_core::service::editor::ModuleEditContext;
use convs_types::error::ModuleError;
use convs_types::module::{BotModule, BotModuleId};

use crate::cli::{spinner, truncate};
use crate::state::AppState;

fn parse_module_id(id: &str) -> Result<BotModuleId, ModuleError> {
    id.parse().map_err(|_| ModuleError::NotFound)
}

/// Create a module and attach it to its parent bot.
pub async fn create_module(
    state: &AppState,
    bot: Option<String>,
    name: Option<String>,
    description: Option<String>,
    stories: Vec<String>,
    json: bool,
) -> Result<()> {
    let preselect = match &bot {
        Some(id_or_slug) => Some(state.bot_service.find_bot(id_or_slug).await?.id),
        None => None,
    };

    let mut editor = state.module_editor(ModuleEditContext::create())?;
    editor.load_bots(preselect.as_ref()).await?;

    if editor.selected_bot().is_none() {
        if editor.bots().is_empty() {
            bail!("no bots exist yet; create one with `convs create bot`");
        }
        if json {
            bail!("--bot is required with --json");
        }
        let labels: Vec<String> = editor
            .bots()
            .iter()
            .map(|b| format!("{} ({})", b.name, b.slug))
            .collect();
        let index = Select::new()
            .with_prompt("Parent bot")
            .items(&labels)
            .default(0)
            .interact()?;
        let parent = editor.bots()[index].id.clone();
        editor.form_mut().parent_bot = Some(parent);
    }

    let name = match name {
        Some(n) => n,
        None if json => String::new(),
        None => Input::<String>::new()
            .with_prompt("Module name")
            .interact_text()?,
    };

    let form = editor.form_mut();
    form.module_name = name;
    form.module_desc = description.unwrap_or_default();
    form.stories = stories;

    let progress = spinner("cyan", "Saving module...")?;
    let outcome = editor.submit().await;
    progress.finish_and_clear();
    let module = outcome?.into_module();

    if json {
        println!("{}", serde_json::to_string_pretty(&module)?);
        return Ok(());
    }

    let parent = editor
        .bots()
        .iter()
        .find(|b| b.id == module.parent_bot)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| module.parent_bot.to_string());

    println!();
    println!("  {} Module created.", style("✓").green().bold());
    println!();
    print_module(&module, &parent);

    Ok(())
}

/// Edit a module. A changed parent moves the module between bots.
pub async fn edit_module(
    state: &AppState,
    id: &str,
    name: Option<String>,
    description: Option<String>,
    bot: Option<String>,
    stories: Vec<String>,
    json: bool,
) -> Result<()> {
    let module = state
        .module_service
        .get_module(&parse_module_id(id)?)
        .await?;
    let previous_parent = module.parent_bot.clone();

    let mut editor = state.module_editor(ModuleEditContext::edit(module))?;

    if let Some(id_or_slug) = &bot {
        let target = state.bot_service.find_bot(id_or_slug).await?;
        editor.load_bots(Some(&target.id)).await?;
    }

    let form = editor.form_mut();
    if let Some(name) = name {
        form.module_name = name;
    }
    if let Some(description) = description {
        form.module_desc = description;
    }
    if !stories.is_empty() {
        form.stories = stories;
    }

    let progress = spinner("cyan", "Saving module...")?;
    let outcome = editor.submit().await;
    progress.finish_and_clear();
    let module = outcome?.into_module();

    if json {
        println!("{}", serde_json::to_string_pretty(&module)?);
        return Ok(());
    }

    println!();
    println!("  {} Module updated.", style("✓").green().bold());
    if module.parent_bot != previous_parent {
        println!(
            "  Moved from {} to {}",
            style(previous_parent.to_string()).dim(),
            style(module.parent_bot.to_string()).cyan()
        );
    }
    println!();

    Ok(())
}

/// List the modules owned by a bot.
pub async fn list_modules(state: &AppState, bot: &str, json: bool) -> Result<()> {
    let bot = state.bot_service.find_bot(bot).await?;
    let modules = state.module_service.list_modules(&bot.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&modules)?);
        return Ok(());
    }

    if modules.is_empty() {
        println!();
        println!(
            "  {} '{}' has no modules. Add one with: {}",
            style("i").blue().bold(),
            bot.name,
            style(format!("convs module create --bot {}", bot.slug)).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Stories").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for module in &modules {
        table.add_row(vec![
            Cell::new(&module.name).fg(Color::Cyan),
            Cell::new(module.id.to_string()).fg(Color::DarkGrey),
            Cell::new(module.stories.len()),
            Cell::new(truncate(&module.description, 50)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} module{} on {}",
        style(modules.len()).bold(),
        if modules.len() == 1 { "" } else { "s" },
        style(&bot.name).cyan()
    );
    println!();

    Ok(())
}

/// Show one module.
pub async fn show_module(state: &AppState, id: &str, json: bool) -> Result<()> {
    let module = state
        .module_service
        .get_module(&parse_module_id(id)?)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&module)?);
        return Ok(());
    }

    let parent = match state.bot_service.get_bot(&module.parent_bot).await {
        Ok(bot) => format!("{} ({})", bot.name, bot.slug),
        Err(_) => format!("{} {}", module.parent_bot, style("(missing)").yellow()),
    };

    println!();
    print_module(&module, &parent);

    Ok(())
}

/// Delete a module after detaching it from its bot.
pub async fn delete_module(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let module = state
        .module_service
        .get_module(&parse_module_id(id)?)
        .await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete module '{}'?",
                style(&module.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.module_service.delete_module(&module.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "id": module.id.to_string()})
        );
    } else {
        println!("  {} Module '{}' deleted.", style("✓").red().bold(), module.name);
    }

    Ok(())
}

fn print_module(module: &BotModule, parent: &str) {
    println!("  {}", style(&module.name).cyan().bold());
    if !module.description.is_empty() {
        println!("  {}", style(&module.description).dim());
    }
    println!();
    println!("  {}      {}", style("ID:").bold(), style(module.id.to_string()).dim());
    println!("  {}     {}", style("Bot:").bold(), parent);
    println!("  {}    {}", style("Type:").bold(), module.kind);
    if module.stories.is_empty() {
        println!("  {} {}", style("Stories:").bold(), style("(none)").dim());
    } else {
        println!("  {} {}", style("Stories:").bold(), module.stories.join(", "));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparsable_module_id_is_not_found() {
        assert!(matches!(
            parse_module_id("not-a-uuid"),
            Err(ModuleError::NotFound)
        ));
        let id = BotModuleId::new();
        assert_eq!(parse_module_id(&id.to_string()).unwrap(), id);
    }
}
