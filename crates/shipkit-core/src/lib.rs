//! shipkit-core: release preparation for a Flutter-style project.
//!
//! Two independent jobs share this crate: building the Windows `.ico` from
//! the app's PNG icon, and copying the Dart version constants into the
//! Android, Windows and pubspec build files. The binaries in `shipkit-cli`
//! are thin wrappers around [`generate_icon`] and [`plan_sync`].

mod config;
mod error;
mod icon;
mod substitute;
mod sync;
mod version;

pub use config::{
    load_yaml, parse_yaml, resolve, Branding, Config, IconConfig, VersionConfig, CONFIG_FILE_NAME,
    DEFAULT_ICON_SIZES,
};
pub use error::{ShipkitError, ShipkitResult};
pub use icon::{generate_icon, normalize_sizes, IconOptions, IconReport, MAX_ICON_SIZE};
pub use substitute::{apply_rules, Rule, Substitution};
pub use sync::{plan_sync, PlannedTarget, SyncPlan, TargetKind, TargetReport};
pub use version::VersionInfo;
