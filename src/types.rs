//! Core vocabulary types for build-plan resolution
//!
//! Packaging family, build phase, and setting precedence live here as
//! proper enums rather than strings, so family-specific branches stay
//! exhaustive and typos surface at compile time.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Packaging family of a target platform.
///
/// Family decides package-manager behavior downstream: which install
/// template applies, whether a package identifier is required, and how
/// toolchain paths are labeled.
///
/// `Display` and `FromStr` speak the short labels below, with unknown
/// labels falling through to `Other`. Registry JSON is serde's view
/// instead: variant names for the closed set (`"RpmFamily"`) and the
/// tagged form `{"Other":"aix"}` for the catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum OsFamily {
    /// Debian-descended platforms packaged as .deb (Debian, Ubuntu).
    #[strum(serialize = "linux-deb")]
    DebianFamily,
    /// RPM-based platforms (EL, Fedora, SLES).
    #[strum(serialize = "linux-rpm")]
    RpmFamily,
    /// Solaris 10/11, packaged via IPS.
    #[strum(serialize = "solaris")]
    Solaris,
    /// macOS, packaged as .dmg.
    #[strum(serialize = "macos")]
    MacOs,
    /// Any family the catalog has no special handling for.
    #[strum(default, to_string = "{0}")]
    Other(String),
}

impl OsFamily {
    /// Whether packages on this family carry a reverse-DNS style
    /// package identifier (IPS publisher, bundle identifier).
    pub fn requires_identifier(&self) -> bool {
        matches!(self, Self::Solaris | Self::MacOs)
    }

    /// Check if this family is a Linux distribution.
    pub fn is_linux(&self) -> bool {
        matches!(self, Self::DebianFamily | Self::RpmFamily)
    }

    /// OS label used in toolchain and artifact paths
    /// (e.g. `builds/linux-amd64/build.tar.gz`).
    pub fn os_label(&self) -> &str {
        match self {
            Self::DebianFamily | Self::RpmFamily => "linux",
            Self::Solaris => "solaris",
            Self::MacOs => "darwin",
            Self::Other(name) => name,
        }
    }
}

/// Build lifecycle phase of a component recipe.
///
/// Iteration order is execution order: configure, then build, then install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BuildPhase {
    Configure,
    Build,
    Install,
}

/// Precedence scope of a setting definition.
///
/// Derived `Ord` follows declaration order, so a higher scope shadows a
/// lower one: component-local beats project, project beats platform
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Display, EnumString, EnumIter)]
pub enum SettingScope {
    #[strum(serialize = "platform")]
    PlatformDefault,
    #[strum(serialize = "project")]
    Project,
    #[strum(serialize = "component")]
    ComponentLocal,
}
