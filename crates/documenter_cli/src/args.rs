use std::path::PathBuf;

use clap::Parser;

use crate::config::Color;

/// Documents test results as they complete.
///
/// Reads the lifecycle of a test run as JSON lines (`{"event":"start"}`, then one
/// `{"event":"result",...}` per completed test, then `{"event":"finish"}`) and prints a readable
/// report of it.
#[derive(Parser, Debug)]
#[clap(version)]
pub struct Cli {
    /// File to read events from. Standard input is read when omitted.
    #[clap(long)]
    pub input: Option<PathBuf>,

    /// Whether to color the report. Overrides the config file.
    #[clap(long, value_enum, env = "DOCUMENTER_COLOR")]
    pub color: Option<Color>,

    /// Config file to use instead of `config.toml` in the documenter config directory.
    #[clap(long, env = "DOCUMENTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the reason a test was skipped beneath its status line.
    #[clap(long, overrides_with = "no_render_skip_reasons")]
    pub render_skip_reasons: bool,

    /// Do not print skip reasons, even if the config file asks for them.
    #[clap(long, overrides_with = "render_skip_reasons")]
    pub no_render_skip_reasons: bool,

    /// Drop backtrace frames starting with this prefix, in addition to those in the config file.
    /// May be given multiple times.
    #[clap(long = "backtrace-exclude", value_name = "PREFIX")]
    pub backtrace_exclude: Vec<String>,
}

impl Cli {
    /// Whether skip reasons were switched on or off on the command line. The last flag given wins.
    pub fn render_skip_reasons(&self) -> Option<bool> {
        match (self.render_skip_reasons, self.no_render_skip_reasons) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
