use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use derive_more::derive::Deref;
use serde::{Deserialize, Serialize};
use testthat_common::print;

use crate::report::Format;

/// Run the native test cases registered in this binary
#[derive(Debug, Clone, PartialEq, Parser, Deref)]
pub struct Options {
    /// Only run test cases whose `<context>/<test>` path matches this regex
    #[clap(short, long)]
    pub filter: Option<String>,

    /// Skip test cases whose `<context>/<test>` path matches this regex
    ///
    /// Can be specified multiple times
    #[clap(short, long)]
    pub skip: Vec<String>,

    /// List registered test cases without running them
    #[clap(short, long)]
    pub list: bool,

    /// Output format of the report printed to stdout
    #[clap(long)]
    pub format: Option<Format>,

    /// Path to a TOML config file
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Common options
    #[deref]
    #[clap(flatten)]
    pub options: CommonOptions,
}

/// Options that control printing
#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct CommonOptions {
    /// Enable verbose output
    #[clap(short = 'V', long)]
    pub verbose: bool,

    /// Set output color option
    ///
    /// By default, color is enabled when stderr is terminal
    #[clap(long)]
    pub color: Option<ColorOption>,
}

impl CommonOptions {
    /// Apply verbose and color options to the print system.
    ///
    /// `fallback` is used when color is not set on the command line
    pub fn apply_print_options(&self, fallback: Option<ColorOption>) {
        if self.verbose {
            print::verbose_on();
        }
        match self.color.or(fallback) {
            Some(ColorOption::Never) => print::color_off(),
            // color is already on by default
            Some(ColorOption::Always) => {}
            None => print::auto_color(),
        }
    }
}

/// Color options for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    Always,
    Never,
}
