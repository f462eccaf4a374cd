use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use documenter_reporter::ReporterOptions;
use etcetera::{app_strategy, AppStrategy, AppStrategyArgs};
use serde_derive::{Deserialize, Serialize};
use termcolor::ColorChoice;

use crate::args::Cli;

#[derive(Deserialize, Serialize, clap::ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Always,
    #[default]
    Auto,
    Never,
}

impl Color {
    pub fn color_choice(self, stream: atty::Stream) -> ColorChoice {
        // termcolor's Auto does not check whether the stream is a terminal.
        match self {
            Color::Always => ColorChoice::Always,
            Color::Auto => {
                if atty::is(stream) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                }
            }
            Color::Never => ColorChoice::Never,
        }
    }
}

/// Contents of a documenter `config.toml`.
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DocumenterConfig {
    pub color: Color,
    pub render_skip_reasons: bool,
    /// Prefixes of backtrace frames that belong to the test engine rather than the code under
    /// test.
    pub backtrace_exclude: Vec<String>,
}

/// Settings for one run, after applying command-line overrides to the config file.
#[derive(Debug, PartialEq, Eq)]
pub struct Settings {
    pub color: Color,
    pub options: ReporterOptions,
    pub backtrace_exclude: Vec<String>,
}

impl Settings {
    pub fn new(config: DocumenterConfig, args: &Cli) -> Self {
        let DocumenterConfig {
            color,
            render_skip_reasons,
            mut backtrace_exclude,
        } = config;

        backtrace_exclude.extend(args.backtrace_exclude.iter().cloned());

        Self {
            color: args.color.unwrap_or(color),
            options: ReporterOptions {
                render_skip_reasons: args.render_skip_reasons().unwrap_or(render_skip_reasons),
            },
            backtrace_exclude,
        }
    }
}

pub fn documenter_config_filepath() -> anyhow::Result<PathBuf> {
    let strategy = app_strategy::Unix::new(AppStrategyArgs {
        top_level_domain: "org".to_string(),
        author: "documenter".to_string(),
        app_name: "documenter".to_string(),
    })?;
    let config_dir = strategy.config_dir();
    Ok(config_dir.join("config.toml"))
}

pub fn read_documenter_config(path: &Path) -> anyhow::Result<DocumenterConfig> {
    let toml_str = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = toml::from_str(&toml_str)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}

/// Loads the config named on the command line, or else the default config if one exists.
pub fn load_documenter_config(explicit_path: Option<&Path>) -> anyhow::Result<DocumenterConfig> {
    if let Some(path) = explicit_path {
        return read_documenter_config(path);
    }

    let path = documenter_config_filepath()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(DocumenterConfig::default());
    }
    read_documenter_config(&path)
}
