//! Project configuration (`shipkit.yaml`).
//!
//! Every field is optional. The defaults match the layout of a stock Flutter
//! project, so running the tools without a config file behaves like the old
//! hard-coded scripts.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ShipkitError, ShipkitResult};
use crate::icon::IconOptions;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "shipkit.yaml";

/// Icon sizes Windows expects in an application icon.
pub const DEFAULT_ICON_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub icon: IconConfig,
    pub version: VersionConfig,
    pub branding: Branding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sizes: Vec<u32>,
    /// Also export one `icon_<size>.png` per size into this directory.
    pub png_dir: Option<PathBuf>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("assets/icon.png"),
            output: PathBuf::from("windows/runner/resources/app_icon.ico"),
            sizes: DEFAULT_ICON_SIZES.to_vec(),
            png_dir: None,
        }
    }
}

impl IconConfig {
    /// Icon options with `png_dir` resolved against `root`.
    pub fn options(&self, root: &Path) -> IconOptions {
        IconOptions {
            sizes: self.sizes.clone(),
            png_dir: self.png_dir.as_deref().map(|p| resolve(root, p)),
        }
    }
}

/// Version source and the descriptor files it is propagated to.
/// A target set to `null` in YAML is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
    pub source: PathBuf,
    pub android: Option<PathBuf>,
    pub windows_rc: Option<PathBuf>,
    pub pubspec: Option<PathBuf>,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("lib/constants/version.dart"),
            android: Some(PathBuf::from("android/app/build.gradle.kts")),
            windows_rc: Some(PathBuf::from("windows/runner/Runner.rc")),
            pubspec: Some(PathBuf::from("pubspec.yaml")),
        }
    }
}

/// String values written into the Windows resource script `VALUE` entries.
/// Unset fields leave the existing entry untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub company_name: Option<String>,
    pub legal_copyright: Option<String>,
    pub original_filename: Option<String>,
    pub product_name: Option<String>,
}

impl Branding {
    /// `(resource key, value)` pairs for every configured field.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("CompanyName", &self.company_name),
            ("LegalCopyright", &self.legal_copyright),
            ("OriginalFilename", &self.original_filename),
            ("ProductName", &self.product_name),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }

    /// Values end up inside a quoted resource-script string, which has no
    /// escape for `"`.
    pub fn validate(&self) -> ShipkitResult<()> {
        match self.entries().into_iter().find(|(_, v)| v.contains('"')) {
            Some((key, value)) => Err(ShipkitError::InvalidBranding {
                key,
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Config {
    /// Load the project config.
    ///
    /// An explicit path must exist. Without one, `shipkit.yaml` in `root` is
    /// used when present and the defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> ShipkitResult<Self> {
        let path = match explicit {
            Some(p) => {
                let p = resolve(root, p);
                if !p.exists() {
                    return Err(ShipkitError::ConfigNotFound(p));
                }
                p
            }
            None => {
                let p = root.join(CONFIG_FILE_NAME);
                if !p.exists() {
                    debug!(root = %root.display(), "No {} found, using defaults", CONFIG_FILE_NAME);
                    return Ok(Self::default());
                }
                p
            }
        };

        let config: Config = load_yaml(&path)?;
        config.branding.validate()?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}

/// Resolve a configured path against the project root. Absolute paths are kept.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Load a YAML file from disk.
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> ShipkitResult<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(ShipkitError::io(path))?;
    parse_yaml(&content)
}

/// Parse YAML from string.
pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> ShipkitResult<T> {
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: Config = parse_yaml(
            "icon:\n  sizes: [32, 256]\nversion:\n  android: null\nbranding:\n  product_name: Demo\n",
        )
        .unwrap();

        assert_eq!(config.icon.sizes, vec![32, 256]);
        assert_eq!(config.icon.input, PathBuf::from("assets/icon.png"));
        assert!(config.version.android.is_none());
        assert_eq!(config.version.pubspec, Some(PathBuf::from("pubspec.yaml")));
        assert_eq!(config.branding.entries(), vec![("ProductName", "Demo")]);
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path(), None).unwrap();
        assert_eq!(config.icon.sizes, DEFAULT_ICON_SIZES.to_vec());
        assert!(config.branding.entries().is_empty());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path(), Some(Path::new("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ShipkitError::ConfigNotFound(_)));
    }

    #[test]
    fn loads_config_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "version:\n  source: VERSION.dart\n",
        )
        .unwrap();

        let config = Config::load(dir.path(), None).unwrap();
        assert_eq!(config.version.source, PathBuf::from("VERSION.dart"));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "icon: [not, a, map").unwrap();
        let err = Config::load(dir.path(), None).unwrap_err();
        assert!(matches!(err, ShipkitError::Yaml(_)));
    }

    #[test]
    fn quoted_branding_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "branding:\n  product_name: 'Course \"Widgets\"'\n",
        )
        .unwrap();

        let err = Config::load(dir.path(), None).unwrap_err();
        assert!(matches!(err, ShipkitError::InvalidBranding { key: "ProductName", .. }));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let root = Path::new("/project");
        assert_eq!(resolve(root, Path::new("a/b")), PathBuf::from("/project/a/b"));
        assert_eq!(resolve(root, Path::new("/abs")), PathBuf::from("/abs"));
    }
}
