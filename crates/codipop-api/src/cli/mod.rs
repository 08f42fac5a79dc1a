//! CLI command definitions for the `codipop` binary.
//!
//! Uses clap derive macros for argument parsing. Each resource gets its own
//! subcommand group (e.g., `codipop history list`, `codipop wardrobe add`).

pub mod fit;
pub mod history;
pub mod onboarding;
pub mod quota;
pub mod wardrobe;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use codipop_types::error::FittingError;
use codipop_types::session::DEFAULT_USER_ID;

/// Virtual fitting: try wardrobe garments on a photo of yourself.
#[derive(Parser)]
#[command(name = "codipop", version, about, long_about = None)]
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

    /// Act on behalf of this user.
    #[arg(long, global = true, env = "CODIPOP_USER", default_value = DEFAULT_USER_ID)]
    pub user: String,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true, hide = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose the selected garments onto a subject photo.
    #[command(alias = "try-on")]
    Fit {
        /// Subject photo (local path or URL).
        #[arg(short, long)]
        person: String,

        /// Wardrobe garment id, in layering order. Repeat for several.
        #[arg(short, long = "garment", required = true)]
        garments: Vec<String>,

        /// Also download the result image to this path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show today's remaining try-ons.
    Quota,

    /// Browse and manage past fitting results.
    History {
        #[command(subcommand)]
        action: history::HistoryCommand,
    },

    /// Manage saved garments.
    Wardrobe {
        #[command(subcommand)]
        action: wardrobe::WardrobeCommand,
    },

    /// First-run onboarding flag.
    Onboarding {
        #[command(subcommand)]
        action: onboarding::OnboardingCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Exit code for an error the command has already reported to the user.
///
/// An exhausted daily quota exits with 2 so scripts can tell it apart from
/// other failures.
pub(crate) fn reported_exit_code(err: &anyhow::Error) -> Option<u8> {
    match err.downcast_ref::<FittingError>() {
        Some(FittingError::QuotaExceeded { .. }) => Some(2),
        _ => None,
    }
}

/// Format a timestamp for tables, in local time.
pub(crate) fn format_local(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Shorten a long URL or path for table cells.
pub(crate) fn truncate_middle(s: &str, max: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max || max < 5 {
        return s.to_string();
    }
    let keep = (max - 3) / 2;
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fit_collects_garments_in_order() {
        let cli = Cli::try_parse_from([
            "codipop", "fit", "--person", "me.jpg", "-g", "g2", "-g", "g1",
        ])
        .unwrap();
        match cli.command {
            Commands::Fit { person, garments, output } => {
                assert_eq!(person, "me.jpg");
                assert_eq!(garments, vec!["g2", "g1"]);
                assert!(output.is_none());
            }
            _ => panic!("expected fit"),
        }
    }

    #[test]
    fn test_fit_requires_a_garment() {
        assert!(Cli::try_parse_from(["codipop", "fit", "--person", "me.jpg"]).is_err());
    }

    #[test]
    fn test_quota_exceeded_has_its_own_exit_code() {
        let quota = anyhow::Error::new(FittingError::QuotaExceeded { limit: 10 });
        assert_eq!(reported_exit_code(&quota), Some(2));

        let validation = anyhow::Error::new(FittingError::Validation("no subject".to_string()));
        assert_eq!(reported_exit_code(&validation), None);
        assert_eq!(reported_exit_code(&anyhow::anyhow!("other")), None);
    }

    #[test]
    fn test_truncate_middle() {
        assert_eq!(truncate_middle("short", 10), "short");
        assert_eq!(truncate_middle("abcdefghijklmnop", 9), "abc...nop");
    }
}
