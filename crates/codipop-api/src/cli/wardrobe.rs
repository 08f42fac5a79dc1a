//! Wardrobe CLI subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use codipop_types::garment::{CategoryFilter, GarmentCategory, GarmentRef};

use super::{format_local, truncate_middle};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum WardrobeCommand {
    /// Save a garment image into the wardrobe.
    Add {
        /// Image file to upload.
        path: PathBuf,

        /// Category tag (TOP, PANTS, SKIRT, DRESS, ACC).
        #[arg(short, long)]
        category: Option<GarmentCategory>,
    },

    /// List saved garments, newest first.
    List {
        /// Filter by category, or ALL.
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,
    },

    /// Remove a garment from the wardrobe.
    Delete {
        /// Garment id.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Remove garments whose images point at temporary locations.
    Cleanup,

    /// Suggest garments from your most common category.
    Recommend,
}

pub async fn handle_wardrobe_command(cmd: WardrobeCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        WardrobeCommand::Add { path, category } => add_garment(state, &path, category, json).await,
        WardrobeCommand::List { category } => list_garments(state, category, json).await,
        WardrobeCommand::Delete { id, force } => delete_garment(state, &id, force, json).await,
        WardrobeCommand::Cleanup => cleanup(state, json).await,
        WardrobeCommand::Recommend => recommend(state, json).await,
    }
}

async fn add_garment(
    state: &AppState,
    path: &Path,
    category: Option<GarmentCategory>,
    json: bool,
) -> Result<()> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("'{}' has no usable file name", path.display()))?;

    let garment = state
        .wardrobe_service
        .save_garment(&state.session, filename, &data, category)
        .await
        .context("failed to save garment")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&garment)?);
        return Ok(());
    }

    println!();
    println!("  {} Garment saved!", style("✓").green().bold());
    println!();
    println!("  {}        {}", style("ID").dim(), style(&garment.id).bold());
    println!("  {}  {}", style("Category").dim(), category_label(garment.category));
    println!("  {}     {}", style("Image").dim(), garment.image_url);
    println!();
    println!(
        "  Try it on: {}",
        style(format!("codipop fit --person <photo> -g {}", garment.id)).cyan()
    );
    println!();

    Ok(())
}

async fn list_garments(state: &AppState, filter: CategoryFilter, json: bool) -> Result<()> {
    let garments = state
        .wardrobe_service
        .list(&state.session, filter)
        .await
        .context("failed to load wardrobe")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&garments)?);
        return Ok(());
    }

    if garments.is_empty() {
        println!();
        println!(
            "  No garments here. Add one with {}",
            style("codipop wardrobe add <image>").cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", garments_table(&garments));
    println!();
    println!("  {} garment{}", garments.len(), if garments.len() == 1 { "" } else { "s" });
    println!();

    Ok(())
}

fn garments_table(garments: &[GarmentRef]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Category").fg(Color::White),
        Cell::new("Added").fg(Color::White),
        Cell::new("Image").fg(Color::White),
    ]);

    for garment in garments {
        let category = match garment.category {
            Some(c) => Cell::new(c.to_string()).fg(Color::Yellow),
            None => Cell::new("-").fg(Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(&garment.id),
            category,
            Cell::new(format_local(&garment.created_at)).fg(Color::DarkGrey),
            Cell::new(truncate_middle(&garment.image_url, 60)),
        ]);
    }

    table
}

async fn delete_garment(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove garment {} from your wardrobe?", style(id).red().bold()))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state
        .wardrobe_service
        .delete(&state.session, id)
        .await
        .with_context(|| format!("could not delete garment '{id}'"))?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "id": id}));
    } else {
        println!("  {} Garment {} removed.", style("✓").red().bold(), id);
    }

    Ok(())
}

async fn cleanup(state: &AppState, json: bool) -> Result<()> {
    let removed = state
        .wardrobe_service
        .cleanup_invalid(&state.session)
        .await
        .context("wardrobe cleanup failed")?;

    if json {
        println!("{}", serde_json::json!({"removed": removed}));
    } else if removed == 0 {
        println!("  {} Wardrobe is clean.", style("✓").green().bold());
    } else {
        println!(
            "  {} Removed {} garment{} with temporary image paths.",
            style("✓").green().bold(),
            removed,
            if removed == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

async fn recommend(state: &AppState, json: bool) -> Result<()> {
    let recommendation = state
        .wardrobe_service
        .recommend(&state.session)
        .await
        .context("failed to build recommendation")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
        return Ok(());
    }

    let Some(rec) = recommendation else {
        println!();
        println!("  Tag a few garments with a category to get recommendations.");
        println!();
        return Ok(());
    };

    println!();
    println!(
        "  You wear a lot of {} ({} of {} garments).",
        style(rec.category).yellow().bold(),
        rec.category_counts.get(&rec.category).copied().unwrap_or(0),
        rec.total_items
    );
    println!();
    println!("{}", garments_table(&rec.items));
    println!();

    Ok(())
}

fn category_label(category: Option<GarmentCategory>) -> String {
    category.map_or_else(|| "uncategorised".to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse_wardrobe(args: &[&str]) -> WardrobeCommand {
        let mut argv = vec!["codipop", "wardrobe"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Wardrobe { action } => action,
            _ => panic!("expected wardrobe command"),
        }
    }

    #[test]
    fn test_list_defaults_to_all() {
        match parse_wardrobe(&["list"]) {
            WardrobeCommand::List { category } => assert_eq!(category, CategoryFilter::All),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_category_is_case_insensitive() {
        match parse_wardrobe(&["add", "shirt.jpg", "--category", "top"]) {
            WardrobeCommand::Add { path, category } => {
                assert_eq!(path, PathBuf::from("shirt.jpg"));
                assert_eq!(category, Some(GarmentCategory::Top));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!(Cli::try_parse_from(["codipop", "wardrobe", "list", "-c", "hat"]).is_err());
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label(None), "uncategorised");
        assert_eq!(category_label(Some(GarmentCategory::Dress)), "DRESS");
    }
}
