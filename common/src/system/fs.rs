use crate::prelude::*;

use std::path::Path;

use serde::de::DeserializeOwned;

use super::Error;

/// Read file as string
pub fn read_file(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();
    verboseln!("reading '{}'", path.display());
    std::fs::read_to_string(path)
        .change_context_lazy(|| Error::ReadFile(path.display().to_string()))
}

/// Read and deserialize a TOML file
///
/// Parse errors are printed line by line before being returned
pub fn read_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, Error> {
    let path = path.as_ref();
    let content = read_file(path)?;
    toml::from_str(&content)
        .map_err(|e| {
            for line in e.to_string().lines() {
                errorln!("Error", "{}", line);
            }
            e
        })
        .change_context_lazy(|| Error::ParseToml(path.display().to_string()))
}
