//! `codipop quota` -- today's composition allowance.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub async fn show_quota(state: &AppState, json: bool) -> Result<()> {
    let quota = state.orchestrator.quota().snapshot().await;
    let remaining = quota.remaining();

    if json {
        let body = serde_json::json!({
            "date": quota.window_date,
            "used": quota.used,
            "limit": quota.limit,
            "remaining": remaining,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let count = if remaining == 0 {
        style(remaining).red().bold()
    } else {
        style(remaining).green().bold()
    };

    println!();
    println!(
        "  {} of {} try-ons left for {}",
        count,
        quota.limit,
        style(quota.window_date).dim()
    );
    println!();

    Ok(())
}
