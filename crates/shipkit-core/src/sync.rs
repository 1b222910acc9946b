//! Propagate the Dart version constants into the platform build files.
//!
//! Planning reads every file and computes the new contents in memory, so a
//! bad source or a version Windows cannot encode aborts before anything is
//! written. Applying then writes only the files whose text changed.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{resolve, Branding, Config};
use crate::error::{ShipkitError, ShipkitResult};
use crate::substitute::{apply_rules, Rule};
use crate::version::VersionInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Android,
    WindowsRc,
    Pubspec,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TargetKind::Android => "Android",
            TargetKind::WindowsRc => "Windows",
            TargetKind::Pubspec => "pubspec.yaml",
        };
        f.write_str(label)
    }
}

impl TargetKind {
    /// Substitution rules for this kind of file.
    pub fn rules(self, version: &VersionInfo, branding: &Branding) -> ShipkitResult<Vec<Rule>> {
        let rules = match self {
            TargetKind::Android => vec![
                Rule::new(
                    "versionCode",
                    r"versionCode = \d+",
                    format!("versionCode = {}", version.build_number),
                ),
                Rule::new(
                    "versionName",
                    r#"versionName = "[^"]+""#,
                    format!(r#"versionName = "{}""#, version.version),
                ),
            ],
            TargetKind::WindowsRc => {
                branding.validate()?;
                let mut rules = vec![
                    Rule::new(
                        "VERSION_AS_NUMBER",
                        r"#define VERSION_AS_NUMBER [\d,]+",
                        format!("#define VERSION_AS_NUMBER {}", version.rc_number()?),
                    ),
                    Rule::new(
                        "VERSION_AS_STRING",
                        r#"#define VERSION_AS_STRING "[^"]+""#,
                        format!(r#"#define VERSION_AS_STRING "{}""#, version.version),
                    ),
                ];
                for (key, value) in branding.entries() {
                    rules.push(Rule::new(
                        key,
                        &format!(r#"VALUE "{}", "[^"]+""#, regex::escape(key)),
                        format!(r#"VALUE "{key}", "{value}""#),
                    ));
                }
                rules
            }
            TargetKind::Pubspec => vec![Rule::new(
                "version",
                r"version: [\d.]+\+\d+",
                format!("version: {}", version.pubspec_string()),
            )],
        };
        Ok(rules)
    }
}

/// A target file with its current and planned contents.
#[derive(Debug, Clone)]
pub struct PlannedTarget {
    pub kind: TargetKind,
    pub path: PathBuf,
    pub original: String,
    pub updated: String,
    pub unmatched: Vec<String>,
}

impl PlannedTarget {
    pub fn changed(&self) -> bool {
        self.original != self.updated
    }
}

#[derive(Debug, Clone)]
pub struct TargetReport {
    pub kind: TargetKind,
    pub path: PathBuf,
    pub written: bool,
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub version: VersionInfo,
    pub targets: Vec<PlannedTarget>,
}

/// Read the version source and compute the new contents of every enabled target.
pub fn plan_sync(root: &Path, config: &Config) -> ShipkitResult<SyncPlan> {
    let source = resolve(root, &config.version.source);
    let content = fs::read_to_string(&source).map_err(ShipkitError::io(&source))?;
    let version = VersionInfo::parse_dart(&content, &source)?;
    info!(%version, path = %source.display(), "Read version");

    let enabled = [
        (TargetKind::Android, &config.version.android),
        (TargetKind::WindowsRc, &config.version.windows_rc),
        (TargetKind::Pubspec, &config.version.pubspec),
    ];

    let mut targets = Vec::new();
    for (kind, path) in enabled {
        let Some(path) = path else {
            debug!(%kind, "Target disabled");
            continue;
        };
        let path = resolve(root, path);
        let original = fs::read_to_string(&path).map_err(ShipkitError::io(&path))?;
        let rules = kind.rules(&version, &config.branding)?;
        let result = apply_rules(&original, &rules);

        let unmatched: Vec<String> = result.unmatched().into_iter().map(String::from).collect();
        for rule in &unmatched {
            warn!(%kind, path = %path.display(), rule = %rule, "Pattern not found");
        }

        targets.push(PlannedTarget {
            kind,
            path,
            original,
            updated: result.content,
            unmatched,
        });
    }

    Ok(SyncPlan { version, targets })
}

impl SyncPlan {
    /// Targets whose contents differ from the planned version.
    pub fn out_of_sync(&self) -> Vec<&PlannedTarget> {
        self.targets.iter().filter(|t| t.changed()).collect()
    }

    /// Fail with [`ShipkitError::OutOfSync`] if any target would change.
    pub fn check(&self) -> ShipkitResult<()> {
        let stale = self.out_of_sync();
        if stale.is_empty() {
            return Ok(());
        }
        Err(ShipkitError::OutOfSync {
            count: stale.len(),
            files: stale.iter().map(|t| t.path.display().to_string()).collect(),
        })
    }

    /// Write every changed target.
    pub fn apply(&self) -> ShipkitResult<Vec<TargetReport>> {
        let mut reports = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let written = target.changed();
            if written {
                fs::write(&target.path, &target.updated).map_err(ShipkitError::io(&target.path))?;
                info!(kind = %target.kind, path = %target.path.display(), "Updated");
            } else {
                debug!(kind = %target.kind, path = %target.path.display(), "Already up to date");
            }
            reports.push(TargetReport {
                kind: target.kind,
                path: target.path.clone(),
                written,
                unmatched: target.unmatched.clone(),
            });
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DART: &str = "const String appVersion = '2.3.0';\nconst int buildNumber = 10002300;\n";

    const GRADLE: &str = r#"android {
    defaultConfig {
        applicationId = "com.zongzi.schedule"
        minSdk = 34
        versionCode = 10002203
        versionName = "2.2.3"
    }
}
"#;

    const RC: &str = r##"#if defined(FLUTTER_VERSION_MAJOR)
#define VERSION_AS_NUMBER FLUTTER_VERSION_MAJOR,FLUTTER_VERSION_MINOR,FLUTTER_VERSION_PATCH,FLUTTER_VERSION_BUILD
#else
#define VERSION_AS_NUMBER 2,2,3,0
#endif

#if defined(FLUTTER_VERSION)
#define VERSION_AS_STRING FLUTTER_VERSION
#else
#define VERSION_AS_STRING "2.2.3"
#endif

            VALUE "CompanyName", "com.example" "\0"
            VALUE "FileDescription", "schedule_app" "\0"
            VALUE "ProductName", "schedule_app" "\0"
"##;

    const PUBSPEC: &str = "name: schedule_app\nversion: 2.2.3+10002203\n\nenvironment:\n  sdk: ^3.5.0\n";

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for (rel, content) in [
            ("lib/constants/version.dart", DART),
            ("android/app/build.gradle.kts", GRADLE),
            ("windows/runner/Runner.rc", RC),
            ("pubspec.yaml", PUBSPEC),
        ] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn read(root: &Path, rel: &str) -> String {
        fs::read_to_string(root.join(rel)).unwrap()
    }

    #[test]
    fn updates_all_targets() {
        let dir = project();
        let root = dir.path();
        let mut config = Config::default();
        config.branding.company_name = Some("CourseWidgets".into());
        config.branding.product_name = Some("CourseWidgets".into());

        let plan = plan_sync(root, &config).unwrap();
        assert_eq!(plan.version.version, "2.3.0");
        let reports = plan.apply().unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.written && r.unmatched.is_empty()));

        let gradle = read(root, "android/app/build.gradle.kts");
        assert!(gradle.contains("versionCode = 10002300"));
        assert!(gradle.contains(r#"versionName = "2.3.0""#));
        assert!(gradle.contains("minSdk = 34"));

        let rc = read(root, "windows/runner/Runner.rc");
        assert!(rc.contains("#define VERSION_AS_NUMBER 2,3,0,0\n"));
        assert!(rc.contains("#define VERSION_AS_NUMBER FLUTTER_VERSION_MAJOR"));
        assert!(rc.contains(r#"#define VERSION_AS_STRING "2.3.0""#));
        assert!(rc.contains(r#"VALUE "CompanyName", "CourseWidgets" "\0""#));
        assert!(rc.contains(r#"VALUE "ProductName", "CourseWidgets" "\0""#));
        assert!(rc.contains(r#"VALUE "FileDescription", "schedule_app" "\0""#));

        let pubspec = read(root, "pubspec.yaml");
        assert!(pubspec.contains("version: 2.3.0+10002300\n"));
        assert!(pubspec.contains("sdk: ^3.5.0"));
    }

    #[test]
    fn second_run_writes_nothing() {
        let dir = project();
        let config = Config::default();
        plan_sync(dir.path(), &config).unwrap().apply().unwrap();

        let plan = plan_sync(dir.path(), &config).unwrap();
        assert!(plan.out_of_sync().is_empty());
        assert!(plan.check().is_ok());
        assert!(plan.apply().unwrap().iter().all(|r| !r.written));
    }

    #[test]
    fn check_reports_stale_files_without_writing() {
        let dir = project();
        let plan = plan_sync(dir.path(), &Config::default()).unwrap();

        let err = plan.check().unwrap_err();
        assert!(matches!(err, ShipkitError::OutOfSync { count: 3, .. }));
        assert_eq!(read(dir.path(), "pubspec.yaml"), PUBSPEC);
    }

    #[test]
    fn invalid_rc_version_aborts_before_writing() {
        let dir = project();
        fs::write(
            dir.path().join("lib/constants/version.dart"),
            "const String appVersion = '3.0.0-rc1';\nconst int buildNumber = 1;\n",
        )
        .unwrap();

        let err = plan_sync(dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, ShipkitError::InvalidVersion { .. }));
        assert_eq!(read(dir.path(), "android/app/build.gradle.kts"), GRADLE);
    }

    #[test]
    fn quoted_branding_aborts_before_writing() {
        let dir = project();
        let mut config = Config::default();
        config.branding.company_name = Some(r#"Acme "Tools""#.into());

        let err = plan_sync(dir.path(), &config).unwrap_err();
        assert!(matches!(err, ShipkitError::InvalidBranding { key: "CompanyName", .. }));
        assert_eq!(read(dir.path(), "windows/runner/Runner.rc"), RC);
        assert_eq!(read(dir.path(), "android/app/build.gradle.kts"), GRADLE);
    }

    #[test]
    fn disabled_targets_are_skipped() {
        let dir = project();
        let mut config = Config::default();
        config.version.windows_rc = None;
        config.version.android = None;

        let plan = plan_sync(dir.path(), &config).unwrap();
        assert_eq!(plan.targets.len(), 1);
        assert_eq!(plan.targets[0].kind, TargetKind::Pubspec);
    }

    #[test]
    fn missing_target_is_an_io_error() {
        let dir = project();
        fs::remove_file(dir.path().join("pubspec.yaml")).unwrap();
        let err = plan_sync(dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, ShipkitError::Io { .. }));
    }

    #[test]
    fn unmatched_patterns_are_reported() {
        let dir = project();
        fs::write(dir.path().join("pubspec.yaml"), "name: schedule_app\n").unwrap();

        let plan = plan_sync(dir.path(), &Config::default()).unwrap();
        let pubspec = plan.targets.iter().find(|t| t.kind == TargetKind::Pubspec).unwrap();
        assert_eq!(pubspec.unmatched, vec!["version".to_string()]);
        assert!(!pubspec.changed());
    }
}
