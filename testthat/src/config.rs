//! Config structures
use testthat_common::prelude::*;
use testthat_common::Unused;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::{ColorOption, Options};
use crate::error::Error;
use crate::report::Format;
use crate::runner::Selection;

/// Config data read from a TOML file, usually `testthat.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// The `[run]` section
    #[serde(default)]
    pub run: Run,

    /// The `[report]` section
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(flatten, default)]
    pub unused: Unused,
}

error_context!(pub LoadConfig, |r| -> Error {
    errorln!("Failed", "Loading config");
    r.change_context(Error::Config)
});

impl Config {
    /// Load a config from a file
    ///
    /// Prints formatted error message when failed, and warnings
    /// for unused keys
    pub fn from_path(path: impl AsRef<Path>) -> ResultIn<Self, LoadConfig> {
        let config: Config = system::read_toml(path)?;
        config.check_unused();
        Ok(config)
    }

    /// Parse a config from TOML text
    pub fn parse(content: &str) -> Result<Self, Error> {
        toml::from_str(content).change_context(Error::Config)
    }

    /// Warn about keys that were not recognized
    pub fn check_unused(&self) {
        self.unused.check();
        self.run.unused.check_prefixed("run");
        self.report.unused.check_prefixed("report");
    }
}

/// Config in the `[run]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Run {
    /// Only run test cases whose `<context>/<test>` path matches this regex
    pub filter: Option<String>,

    /// Skip test cases whose `<context>/<test>` path matches any of these regexes
    #[serde(default)]
    pub skip: Vec<String>,

    #[serde(flatten, default)]
    pub unused: Unused,
}

/// Config in the `[report]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Output format of the report
    pub format: Option<Format>,

    /// Color of status lines on stderr
    pub color: Option<ColorOption>,

    #[serde(flatten, default)]
    pub unused: Unused,
}

/// Settings for one invocation, with command line values
/// taking precedence over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub filter: Option<String>,
    pub skip: Vec<String>,
    pub format: Format,
    pub color: Option<ColorOption>,
    pub list: bool,
}

impl Settings {
    pub fn resolve(options: &Options, config: Config) -> Self {
        let mut skip = config.run.skip;
        for pattern in &options.skip {
            if !skip.contains(pattern) {
                skip.push(pattern.clone());
            }
        }
        Self {
            filter: options.filter.clone().or(config.run.filter),
            skip,
            format: options.format.or(config.report.format).unwrap_or_default(),
            color: options.color.or(config.report.color),
            list: options.list,
        }
    }

    /// Build the test case selection from the filter and skip patterns
    pub fn selection(&self) -> Result<Selection, Error> {
        Selection::new(self.filter.as_deref(), &self.skip)
    }
}
