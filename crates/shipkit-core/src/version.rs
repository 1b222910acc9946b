//! Application version as declared in the Dart constants file.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{ShipkitError, ShipkitResult};

static APP_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const String appVersion = '([^']+)'").expect("valid regex"));

static BUILD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const int buildNumber = (\d+)").expect("valid regex"));

/// Number of components in a Windows FILEVERSION / PRODUCTVERSION.
const RC_COMPONENTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Human readable version, e.g. `2.2.3`.
    pub version: String,
    pub build_number: u64,
}

impl VersionInfo {
    /// Read `appVersion` and `buildNumber` from Dart source.
    /// `path` is only used for error messages.
    pub fn parse_dart(content: &str, path: &Path) -> ShipkitResult<Self> {
        let not_found = |field| ShipkitError::VersionNotFound {
            path: path.to_path_buf(),
            field,
        };

        let version = APP_VERSION_RE
            .captures(content)
            .map(|c| c[1].to_string())
            .ok_or_else(|| not_found("appVersion"))?;
        let build_number = BUILD_NUMBER_RE
            .captures(content)
            .and_then(|c| c[1].parse().ok())
            .ok_or_else(|| not_found("buildNumber"))?;

        Ok(Self { version, build_number })
    }

    /// The four numeric components used by Windows resource scripts,
    /// zero-padded: `2.2` becomes `[2, 2, 0, 0]`.
    pub fn rc_components(&self) -> ShipkitResult<[u16; RC_COMPONENTS]> {
        let invalid = |reason: String| ShipkitError::InvalidVersion {
            version: self.version.clone(),
            reason,
        };

        let parts: Vec<&str> = self.version.split('.').collect();
        if parts.len() > RC_COMPONENTS {
            return Err(invalid(format!(
                "at most {RC_COMPONENTS} components allowed, got {}",
                parts.len()
            )));
        }

        let mut out = [0u16; RC_COMPONENTS];
        for (slot, part) in out.iter_mut().zip(&parts) {
            let not_a_number = || invalid(format!("component {part:?} is not a number in 0..=65535"));
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(not_a_number());
            }
            *slot = part.parse().map_err(|_| not_a_number())?;
        }
        Ok(out)
    }

    /// `a,b,c,d` as written after `VERSION_AS_NUMBER`.
    pub fn rc_number(&self) -> ShipkitResult<String> {
        Ok(self
            .rc_components()?
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(","))
    }

    /// `version+build` as used by `pubspec.yaml`.
    pub fn pubspec_string(&self) -> String {
        format!("{}+{}", self.version, self.build_number)
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.version, self.build_number)
    }
}
