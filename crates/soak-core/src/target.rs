use crate::error::{ConfigError, Result};
use std::fmt;

/// A validated directory target for the filesystem driver.
///
/// The fixed file names are appended directly to the directory string, so the
/// trailing separator is required and checked before any cluster contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTarget {
    dir: String,
}

impl DirectoryTarget {
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.ends_with('/') {
            return Err(ConfigError::malformed_target(
                raw,
                "no trailing slash on directory name",
            ));
        }
        Ok(Self {
            dir: raw.to_string(),
        })
    }

    /// The directory path, trailing slash included
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Path of a fixed file inside the target directory
    pub fn file_path(&self, file_name: &str) -> String {
        format!("{}{}", self.dir, file_name)
    }
}

impl fmt::Display for DirectoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir)
    }
}
