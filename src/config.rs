//! Archive build configuration, loadable from TOML.
//!
//! ```toml
//! compress = true
//! fixed_mtime = 0          # unix seconds; omit to keep file mtimes
//! include = ["html", "*.css", ".js"]
//! skip_hidden = true
//! ```

use crate::error::{AssetFsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for [`build_archive`](crate::build_archive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    /// Deflate entries when it makes them smaller
    pub compress: bool,

    /// Stamp every entry with this mtime (unix seconds) so the archive
    /// depends only on file names, modes and contents
    pub fixed_mtime: Option<i64>,

    /// Extension filters (`jpg`, `.jpg` or `*.jpg`); empty includes all
    pub include: Vec<String>,

    /// Skip files and directories whose name starts with `.`
    pub skip_hidden: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            compress: true,
            fixed_mtime: None,
            include: Vec::new(),
            skip_hidden: true,
        }
    }
}

impl BuildOptions {
    /// Parse options from TOML text; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: Self = toml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject filters that can never match
    pub fn validate(&self) -> Result<()> {
        for filter in &self.include {
            if normalize_extension(filter).is_empty() {
                return Err(AssetFsError::Config(format!(
                    "empty extension filter: {:?}",
                    filter
                )));
            }
        }
        Ok(())
    }

    /// Whether a relative path passes the extension filters
    pub fn includes(&self, relative_path: &str) -> bool {
        if self.include.is_empty() {
            return true;
        }

        let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return false;
        };
        let extension = extension.to_lowercase();
        self.include
            .iter()
            .any(|filter| normalize_extension(filter) == extension)
    }
}

/// `*.JPG`, `.jpg` and `jpg` all become `jpg`
fn normalize_extension(filter: &str) -> String {
    filter
        .trim()
        .trim_start_matches('*')
        .trim_start_matches('.')
        .to_lowercase()
}
