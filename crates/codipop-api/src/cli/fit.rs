//! `codipop fit` -- run one try-on and record it in history.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use codipop_types::error::FittingError;
use codipop_types::fitting::TryOnOutcome;

use crate::state::AppState;

/// Select the subject and garments, then submit a single composition.
pub async fn fit(
    state: &AppState,
    person: &str,
    garments: &[String],
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let orchestrator = &state.orchestrator;
    orchestrator.set_subject(resolve_subject(person));

    for garment_id in garments {
        let outcome = orchestrator.toggle_garment(garment_id);
        if !outcome.accepted && !json {
            println!(
                "  {} Up to {} garments per try-on; skipping '{}'",
                style("!").yellow().bold(),
                state.config.max_selection,
                garment_id
            );
        }
    }

    let spinner = ProgressBar::new_spinner();
    if !json {
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.magenta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Composing your outfit...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    }

    let outcome = orchestrator.try_on().await;
    spinner.finish_and_clear();

    let result = match outcome {
        Ok(TryOnOutcome::Completed(result)) => result,
        Ok(TryOnOutcome::Ignored | TryOnOutcome::Discarded) => {
            anyhow::bail!("try-on did not complete");
        }
        Err(e @ FittingError::QuotaExceeded { limit }) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({"success": false, "reason": "quota_exceeded", "limit": limit})
                );
            } else {
                println!();
                println!(
                    "  {} You've used all {} try-ons for today. Come back tomorrow!",
                    style("✗").red().bold(),
                    limit
                );
                println!();
            }
            return Err(e.into());
        }
        Err(e) => return Err(e).context("try-on failed"),
    };

    let saved_to = match output {
        Some(path) => Some(save_result(state, &result.image_url, path).await?),
        None => None,
    };

    let remaining = orchestrator.quota().remaining().await;

    if json {
        let body = serde_json::json!({
            "success": true,
            "result": result,
            "garments": orchestrator.selection(),
            "remaining_today": remaining,
            "saved_to": saved_to.map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!();
    println!("  {} Try-on complete!", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("Image").dim(), style(&result.image_url).cyan());
    println!("  {}     {}", style("ID").dim(), result.id);
    if let Some(path) = saved_to {
        println!("  {}  {}", style("Saved").dim(), path.display());
    }
    println!();
    println!(
        "  {} try-on{} left today",
        style(remaining).bold(),
        if remaining == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Make local subject paths absolute; URLs pass through.
fn resolve_subject(person: &str) -> String {
    if person.starts_with("http://") || person.starts_with("https://") || person.starts_with("file://") {
        return person.to_string();
    }
    std::path::absolute(person)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| person.to_string())
}

async fn save_result(state: &AppState, url: &str, path: &Path) -> Result<PathBuf> {
    let bytes = state
        .orchestrator
        .compositor()
        .fetch_image(url)
        .await
        .context("failed to download result image")?;

    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved result image");
    Ok(path.to_path_buf())
}
