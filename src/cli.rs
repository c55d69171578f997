//! Command-line interface definition for wellscope
//!
//! Each invocation behaves like one dashboard page load: the saved session
//! is restored, the command runs against it, and the result is saved again.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default location of the YAML configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/wellscope.yaml";

/// wellscope - well-log dashboard session client
///
/// Browse uploaded wells, chart and interpret their curves, and chat about
/// them. The dashboard session survives between runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "wellscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Backend base URL, including the /api prefix
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Session store location
    #[arg(long, global = true)]
    pub storage_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for wellscope
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Check backend health
    Health,

    /// List uploaded wells
    Wells,

    /// Upload a LAS file and select the new well
    Upload {
        /// Path to the .las file
        file: PathBuf,
    },

    /// Select a well, clearing the previous well's chart and interpretation
    Select {
        /// Well id
        id: i64,
    },

    /// Replace the curve selection
    Curves {
        /// Comma-separated curve mnemonics
        #[arg(value_delimiter = ',')]
        curves: Vec<String>,
    },

    /// Toggle a single curve
    Toggle {
        /// Curve mnemonic
        mnemonic: String,
    },

    /// Apply a named curve preset (gas, ratios, aromatics, pixler)
    Preset {
        /// Preset name
        name: String,
    },

    /// Set the depth window; unparsable values fall back to the well bounds
    Depth {
        /// Top of the window
        #[arg(allow_hyphen_values = true)]
        min: String,

        /// Bottom of the window
        #[arg(allow_hyphen_values = true)]
        max: String,
    },

    /// Load chart data for the selected curves
    Chart,

    /// Run an interpretation of the selected curves
    Interpret,

    /// Switch the active tab (chart, interpretation, chat)
    Tab {
        /// Tab name
        name: String,
    },

    /// Ask the assistant about the selected well
    Chat {
        /// Message to send
        message: String,

        /// Answer detail level (1-5)
        #[arg(short, long)]
        detail: Option<String>,
    },

    /// Reset the selected well's chat to the introduction
    ChatClear,

    /// Delete a well
    Delete {
        /// Well id
        id: i64,
    },

    /// Delete every well and forget the saved session
    ClearAll,

    /// Show the current session
    Status,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some(DEFAULT_CONFIG_PATH.to_string()),
            verbose: false,
            json_logs: false,
            api_base: None,
            storage_path: None,
            command: Commands::Status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some(DEFAULT_CONFIG_PATH.to_string()));
        assert!(!cli.verbose);
        assert_eq!(cli.command, Commands::Status);
    }

    #[test]
    fn test_cli_parse_select() {
        let cli = Cli::try_parse_from(["wellscope", "select", "5"]).unwrap();
        assert_eq!(cli.command, Commands::Select { id: 5 });
    }

    #[test]
    fn test_cli_parse_curves_csv() {
        let cli = Cli::try_parse_from(["wellscope", "curves", "HC1,HC2,TOTAL_GAS"]).unwrap();
        if let Commands::Curves { curves } = cli.command {
            assert_eq!(curves, vec!["HC1", "HC2", "TOTAL_GAS"]);
        } else {
            panic!("Expected Curves command");
        }
    }

    #[test]
    fn test_cli_parse_depth_accepts_garbage_and_negatives() {
        let cli = Cli::try_parse_from(["wellscope", "depth", "abc", "-10"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Depth {
                min: "abc".to_string(),
                max: "-10".to_string()
            }
        );
    }

    #[test]
    fn test_cli_parse_chat_with_detail() {
        let cli = Cli::try_parse_from(["wellscope", "chat", "any gas?", "--detail", "5"]).unwrap();
        if let Commands::Chat { message, detail } = cli.command {
            assert_eq!(message, "any gas?");
            assert_eq!(detail, Some("5".to_string()));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "wellscope",
            "wells",
            "--verbose",
            "--json-logs",
            "--storage-path",
            "/tmp/s.db",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert_eq!(cli.storage_path, Some(PathBuf::from("/tmp/s.db")));
    }

    #[test]
    fn test_cli_parse_clear_all_kebab_case() {
        let cli = Cli::try_parse_from(["wellscope", "clear-all"]).unwrap();
        assert_eq!(cli.command, Commands::ClearAll);
        let cli = Cli::try_parse_from(["wellscope", "chat-clear"]).unwrap();
        assert_eq!(cli.command, Commands::ChatClear);
    }

    #[test]
    fn test_cli_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["wellscope"]).is_err());
    }
}
