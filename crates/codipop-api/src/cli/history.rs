//! History CLI subcommands: list, group, like, delete, watch.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use codipop_core::history::aggregator::ExpansionState;
use codipop_types::fitting::{FittingResult, FittingResultId};
use codipop_types::history::{Granularity, GroupKey, HistoryGroup, HistoryView};

use super::{format_local, truncate_middle};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List past results, newest first.
    List {
        /// Only liked results.
        #[arg(long)]
        liked: bool,

        /// Show only the N most recent results.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show results bucketed by date.
    Group {
        /// Bucket size: none, day, month, year.
        #[arg(long = "by", default_value = "day")]
        granularity: Granularity,

        /// Only liked results.
        #[arg(long)]
        liked: bool,

        /// Expand the group with this key (e.g. 2024-09-03 or 2024-9). Repeatable.
        #[arg(long = "expand")]
        expand: Vec<GroupKey>,

        /// Expand every group.
        #[arg(long, conflicts_with = "expand")]
        expand_all: bool,
    },

    /// Toggle the liked flag on a result.
    Like {
        /// Result id.
        id: FittingResultId,
    },

    /// Delete a result permanently.
    Delete {
        /// Result id.
        id: FittingResultId,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Print the history whenever it changes. Stop with Ctrl-C.
    Watch {
        /// Seconds between checks for writes from other processes.
        #[arg(long, default_value_t = 2)]
        interval: u64,
    },
}

pub async fn handle_history_command(cmd: HistoryCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        HistoryCommand::List { liked, limit } => list_history(state, view(liked), limit, json).await,
        HistoryCommand::Group {
            granularity,
            liked,
            expand,
            expand_all,
        } => {
            let expansion = expansion_for(&expand);
            group_history(state, view(liked), granularity, &expansion, expand_all, json).await
        }
        HistoryCommand::Like { id } => toggle_like(state, &id, json).await,
        HistoryCommand::Delete { id, force } => delete_result(state, &id, force, json).await,
        HistoryCommand::Watch { interval } => watch_history(state, interval, json).await,
    }
}

fn view(liked: bool) -> HistoryView {
    if liked { HistoryView::Liked } else { HistoryView::All }
}

/// Expansion keyed by canonical text, so `2024-9` opens the `2024-09` group.
fn expansion_for(keys: &[GroupKey]) -> ExpansionState {
    keys.iter().map(GroupKey::to_string).collect()
}

async fn list_history(
    state: &AppState,
    view: HistoryView,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut results = state
        .history_service
        .list(&state.session, view)
        .await
        .context("failed to load history")?;

    let total = results.len();
    if let Some(limit) = limit {
        results.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!();
        match view {
            HistoryView::Liked => println!("  No liked results yet."),
            HistoryView::All => println!(
                "  No try-ons yet. Run {} to create one.",
                style("codipop fit").cyan()
            ),
        }
        println!();
        return Ok(());
    }

    println!();
    println!("{}", results_table(&results));
    println!();
    if results.len() < total {
        println!("  Showing {} of {} results", results.len(), total);
    } else {
        println!("  {} result{}", total, if total == 1 { "" } else { "s" });
    }
    println!();

    Ok(())
}

async fn group_history(
    state: &AppState,
    view: HistoryView,
    granularity: Granularity,
    expansion: &ExpansionState,
    expand_all: bool,
    json: bool,
) -> Result<()> {
    let mut groups = state
        .history_service
        .grouped(&state.session, view, granularity, expansion)
        .await
        .context("failed to load history")?;

    if expand_all {
        groups.iter_mut().for_each(|g| g.expanded = true);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!();
        println!("  Nothing to show.");
        println!();
        return Ok(());
    }

    println!();
    for group in &groups {
        print_group(group);
    }

    Ok(())
}

fn print_group(group: &HistoryGroup) {
    let marker = if group.expanded { "▾" } else { "▸" };
    println!(
        "  {} {} {}  {}",
        style(marker).dim(),
        style(&group.label).bold(),
        style(format!("({})", group.items.len())).dim(),
        style(&group.key).dim()
    );

    if group.expanded {
        println!("{}", results_table(&group.items));
    }
    println!();
}

fn results_table(results: &[FittingResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Liked").fg(Color::White),
        Cell::new("Image").fg(Color::White),
    ]);

    for result in results {
        let liked = if result.is_liked {
            Cell::new("♥").fg(Color::Magenta)
        } else {
            Cell::new("")
        };

        table.add_row(vec![
            Cell::new(result.id.to_string()),
            Cell::new(format_local(&result.created_at)).fg(Color::DarkGrey),
            liked,
            Cell::new(truncate_middle(&result.image_url, 60)).fg(Color::Cyan),
        ]);
    }

    table
}

async fn toggle_like(state: &AppState, id: &FittingResultId, json: bool) -> Result<()> {
    let liked = state
        .history_service
        .toggle_like(&state.session, id)
        .await
        .with_context(|| format!("could not update result '{id}'"))?;

    if json {
        println!("{}", serde_json::json!({"id": id, "is_liked": liked}));
    } else if liked {
        println!("  {} Liked {}", style("♥").magenta().bold(), id);
    } else {
        println!("  {} Unliked {}", style("♡").dim(), id);
    }

    Ok(())
}

async fn delete_result(state: &AppState, id: &FittingResultId, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Permanently delete result {}?", style(id).red().bold()))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state
        .history_service
        .delete(&state.session, id)
        .await
        .with_context(|| format!("could not delete result '{id}'"))?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "id": id}));
    } else {
        println!("  {} Result {} deleted.", style("✓").red().bold(), id);
    }

    Ok(())
}

/// Stream history snapshots until Ctrl-C.
///
/// Writes from this process arrive through the subscription directly; the
/// interval tick re-reads the table to pick up writes from other processes.
async fn watch_history(state: &AppState, interval_secs: u64, json: bool) -> Result<()> {
    let mut subscription = state
        .history_service
        .subscribe(&state.session)
        .await
        .context("failed to subscribe to history")?;

    print_snapshot(&subscription.current(), json)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = subscription.changed() => match changed {
                Some(results) => print_snapshot(&results, json)?,
                None => break,
            },
            _ = ticker.tick() => {
                state.history_service.repo().refresh(&state.session).await;
            }
        }
    }

    subscription.unsubscribe();
    tracing::debug!("history watch stopped");
    Ok(())
}

fn print_snapshot(results: &[FittingResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(results)?);
        return Ok(());
    }

    println!(
        "  {} {} result{}",
        style(chrono::Local::now().format("%H:%M:%S")).dim(),
        results.len(),
        if results.len() == 1 { "" } else { "s" }
    );
    if let Some(latest) = results.first() {
        println!(
            "    latest: {} {}",
            latest.id,
            style(truncate_middle(&latest.image_url, 60)).cyan()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse_history(args: &[&str]) -> HistoryCommand {
        let mut argv = vec!["codipop", "history"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::History { action } => action,
            _ => panic!("expected history command"),
        }
    }

    #[test]
    fn test_group_defaults_to_day() {
        match parse_history(&["group"]) {
            HistoryCommand::Group {
                granularity,
                liked,
                expand,
                expand_all,
            } => {
                assert_eq!(granularity, Granularity::Day);
                assert!(!liked);
                assert!(expand.is_empty());
                assert!(!expand_all);
            }
            _ => panic!("expected group"),
        }
    }

    #[test]
    fn test_group_parses_granularity_and_expansion() {
        match parse_history(&["group", "--by", "month", "--expand", "2024-09", "--expand", "2024-08"]) {
            HistoryCommand::Group { granularity, expand, .. } => {
                assert_eq!(granularity, Granularity::Month);
                assert_eq!(
                    expand,
                    vec![
                        GroupKey::Month { year: 2024, month: 9 },
                        GroupKey::Month { year: 2024, month: 8 },
                    ]
                );
            }
            _ => panic!("expected group"),
        }
    }

    #[test]
    fn test_unpadded_expand_key_opens_canonical_group() {
        let expand = match parse_history(&["group", "--by", "month", "--expand", "2024-9"]) {
            HistoryCommand::Group { expand, .. } => expand,
            _ => panic!("expected group"),
        };
        let expansion = expansion_for(&expand);
        assert!(expansion.is_expanded("2024-09"));
        assert!(!expansion.is_expanded("2024-9"));
    }

    #[test]
    fn test_invalid_expand_key_rejected() {
        let result = Cli::try_parse_from(["codipop", "history", "group", "--expand", "2024-13"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_limit() {
        match parse_history(&["list", "-n", "10"]) {
            HistoryCommand::List { liked, limit } => {
                assert!(!liked);
                assert_eq!(limit, Some(10));
            }
            _ => panic!("expected list"),
        }
        match parse_history(&["list", "--liked"]) {
            HistoryCommand::List { liked, limit } => {
                assert!(liked);
                assert_eq!(limit, None);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_like_rejects_malformed_id() {
        let result = Cli::try_parse_from(["codipop", "history", "like", "not-a-uuid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_view_from_flag() {
        assert_eq!(view(true), HistoryView::Liked);
        assert_eq!(view(false), HistoryView::All);
    }
}
