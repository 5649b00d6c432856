//! Package catalog configuration.
//!
//! The catalog is externally owned configuration: an admin edits the JSON
//! file, the service reloads it on request. The orchestrator and fulfillment
//! dispatcher only ever read it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PackageId;

/// One purchasable package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Price in cents.
    pub price_cents: i64,

    /// The credential or invite link delivered on fulfillment.
    ///
    /// May be absent while an admin is still configuring the package; a
    /// completed payment for such a package cannot be fulfilled until it is
    /// set.
    #[serde(default)]
    pub access_reference: Option<String>,

    /// Whether the package is offered for sale.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Human-readable name shown in notifications.
    pub display_name: String,
}

const fn default_enabled() -> bool {
    true
}

/// The package catalog: `package_id -> entry`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageCatalog {
    /// All configured packages, enabled or not.
    pub packages: BTreeMap<PackageId, PackageEntry>,
}

impl PackageCatalog {
    /// Load the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| CatalogError::Parse {
            path: path.as_ref().display().to_string(),
            message: e.to_string(),
        })
    }

    /// Look up a package that is configured and enabled.
    #[must_use]
    pub fn enabled_entry(&self, package_id: &PackageId) -> Option<&PackageEntry> {
        self.packages.get(package_id).filter(|e| e.enabled)
    }

    /// Look up a package regardless of enablement.
    #[must_use]
    pub fn entry(&self, package_id: &PackageId) -> Option<&PackageEntry> {
        self.packages.get(package_id)
    }
}

/// Errors that can occur when loading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog file is not valid JSON for the expected shape.
    #[error("failed to parse catalog file {path}: {message}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Parser error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_json() -> &'static str {
        r#"{
            "packages": {
                "100_videos": {
                    "price_cents": 1500,
                    "access_reference": "https://chat.example/join/abc",
                    "enabled": true,
                    "display_name": "100 Videos"
                },
                "1000_videos": {
                    "price_cents": 3500,
                    "display_name": "1000 Videos",
                    "enabled": false
                },
                "5000_videos": {
                    "price_cents": 4900,
                    "display_name": "5000 Videos"
                }
            }
        }"#
    }

    #[test]
    fn load_and_query() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_json().as_bytes()).unwrap();

        let catalog = PackageCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.packages.len(), 3);

        let entry = catalog.enabled_entry(&PackageId::new("100_videos")).unwrap();
        assert_eq!(entry.price_cents, 1500);

        // Disabled packages are invisible to enabled_entry but not to entry.
        assert!(catalog.enabled_entry(&PackageId::new("1000_videos")).is_none());
        assert!(catalog.entry(&PackageId::new("1000_videos")).is_some());

        // enabled defaults to true, access_reference to None.
        let bare = catalog.enabled_entry(&PackageId::new("5000_videos")).unwrap();
        assert!(bare.access_reference.is_none());
    }

    #[test]
    fn load_missing_file_fails() {
        let result = PackageCatalog::load("/nonexistent/catalog.json");
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn unknown_package_is_none() {
        let catalog = PackageCatalog::default();
        assert!(catalog.enabled_entry(&PackageId::new("missing")).is_none());
    }
}
