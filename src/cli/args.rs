//! CLI argument definitions
//!
//! Command-line options and how they override the settings file.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Config;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "presence-sort")]
#[command(
    about = "Check last-seen status of usernames and sort them into result files",
    version
)]
pub(crate) struct Cli {
    /// Settings file (default: ./config.toml, then ~/.config/presence-sort/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Results folder (overrides General.results_folder)
    #[arg(short, long, value_name = "DIR")]
    pub(crate) results: Option<PathBuf>,

    /// Enable debug output on the console
    #[arg(long)]
    pub(crate) debug: bool,

    /// Exit right after the run instead of waiting for Enter
    #[arg(long)]
    pub(crate) no_pause: bool,

    /// Color output mode
    #[arg(long, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long)]
    pub(crate) no_color: bool,
}

impl Cli {
    /// Merge CLI overrides into the loaded settings (CLI wins)
    pub(crate) fn apply_to(&self, mut config: Config) -> Config {
        if let Some(ref results) = self.results {
            config.general.results_folder = results.clone();
        }
        config
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    /// Wait for acknowledgment only when someone can give it
    pub(crate) fn should_pause(&self) -> bool {
        !self.no_pause && std::io::stdin().is_terminal()
    }
}
