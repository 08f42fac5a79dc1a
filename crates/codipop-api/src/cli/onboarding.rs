//! Onboarding flag subcommands.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum OnboardingCommand {
    /// Show whether onboarding was completed, with the intro if not.
    Status,
    /// Mark onboarding as completed.
    Done,
    /// Forget completion so the intro shows again.
    Reset,
}

pub async fn handle_onboarding_command(
    cmd: OnboardingCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        OnboardingCommand::Status => {
            let onboarded = state.onboarding.has_onboarded().await;
            if json {
                println!("{}", serde_json::json!({"has_onboarded": onboarded}));
            } else if onboarded {
                println!("  {} Onboarding complete.", style("✓").green().bold());
            } else {
                print_intro(state.config.daily_limit);
            }
        }
        OnboardingCommand::Done => {
            state.onboarding.mark_onboarded().await;
            if json {
                println!("{}", serde_json::json!({"has_onboarded": true}));
            } else {
                println!("  {} Onboarding marked complete.", style("✓").green().bold());
            }
        }
        OnboardingCommand::Reset => {
            state.onboarding.reset().await;
            if json {
                println!("{}", serde_json::json!({"has_onboarded": false}));
            } else {
                println!("  {} Onboarding reset.", style("✓").green().bold());
            }
        }
    }

    Ok(())
}

fn print_intro(daily_limit: u32) {
    println!();
    println!("  {}", style("Welcome to Codipop").bold());
    println!();
    println!("  1. Save garments:  {}", style("codipop wardrobe add shirt.jpg -c top").cyan());
    println!(
        "  2. Try them on:    {}",
        style("codipop fit --person me.jpg -g <garment-id>").cyan()
    );
    println!("  3. Look back:      {}", style("codipop history group --by day").cyan());
    println!();
    println!("  You get {daily_limit} try-ons per day.");
    println!(
        "  Run {} to hide this message.",
        style("codipop onboarding done").cyan()
    );
    println!();
}
