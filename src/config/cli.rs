use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "legislator-finance")]
#[command(about = "Browse federal legislators and their campaign finance profiles")]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./legislator-finance.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API key; overrides the config file and OPENSECRETS_API_KEY
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Election cycle (even year)
    #[arg(long, global = true)]
    pub cycle: Option<u16>,

    /// Bar chart width in columns
    #[arg(long, global = true)]
    pub width: Option<usize>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List legislators for a state (defaults to the last selected state)
    Legislators {
        /// Two-letter state code, e.g. CA
        state: Option<String>,
    },
    /// Show a candidate's fundraising summary, sectors and top contributors
    Candidate {
        /// OpenSecrets candidate id, e.g. N00007360
        cid: String,

        /// Print the profile as JSON instead of cards and charts
        #[arg(long)]
        json: bool,

        /// Write both chart series to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Open a view by path: `/` or `/candidate/<cid>`
    Open { path: String },
    /// List supported state codes
    States,
}

impl Cli {
    /// Flags win over file values.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(key) = &self.api_key {
            config.api.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(cycle) = self.cycle {
            config.api.cycle = cycle;
        }
        if let Some(width) = self.width {
            config.display.chart_width = width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidate_command() {
        let cli = Cli::parse_from([
            "legislator-finance",
            "candidate",
            "N00007360",
            "--export",
            "out.csv",
            "--cycle",
            "2022",
        ]);
        match &cli.command {
            Command::Candidate { cid, json, export } => {
                assert_eq!(cid, "N00007360");
                assert!(!json);
                assert_eq!(export.as_deref(), Some(std::path::Path::new("out.csv")));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api.cycle, 2022);
    }

    #[test]
    fn test_parse_legislators_without_state() {
        let cli = Cli::parse_from(["legislator-finance", "-v", "legislators"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Legislators { state: None }));
    }
}
