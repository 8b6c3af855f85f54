use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hintln;

/// Container for detecting and warning user about unused config values
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unused(BTreeMap<String, toml::Value>);

impl Unused {
    /// Keys that were not recognized, in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn check(&self) {
        for key in self.keys() {
            hintln!("Warning", "config `{}` is unused", key);
        }
    }

    pub fn check_prefixed(&self, prefix: &str) {
        for key in self.keys() {
            hintln!("Warning", "config `{}.{}` is unused", prefix, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Section {
        #[allow(dead_code)]
        name: String,
        #[serde(flatten, default)]
        unused: Unused,
    }

    #[test]
    fn collects_unknown_keys() {
        let section: Section = toml::from_str("name = \"a\"\nzeta = 1\nalpha = true").unwrap();
        assert_eq!(section.unused.keys().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn empty_when_all_keys_known() {
        let section: Section = toml::from_str("name = \"a\"").unwrap();
        assert!(section.unused.is_empty());
    }
}
