//! Error handling for build-plan resolution
//!
//! Provides the resolution error taxonomy using thiserror. Every failure a
//! resolver can hit maps to exactly one variant, carrying the names the
//! caller needs to diagnose it (platform, component, setting key, cycle
//! chain). All variants are resolution-time: nothing here represents a
//! build-host failure.

use thiserror::Error;

use crate::settings::SettingsError;
use crate::types::BuildPhase;

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Everything that can go wrong while resolving a build plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Platform name not present in the registry
    #[error("unknown platform '{name}'")]
    UnknownPlatform { name: String },

    /// Platform registered twice under the same name
    #[error("platform '{name}' is already registered")]
    DuplicatePlatform { name: String },

    /// Component name not present in the catalog
    #[error("unknown component '{name}'")]
    UnknownComponent { name: String },

    /// Component defined or added twice under the same name
    #[error("duplicate component '{name}'")]
    DuplicateComponent { name: String },

    /// A setting was read that no scope defines
    #[error("setting '{key}' is not defined in any scope")]
    UndefinedSetting { key: String },

    /// Derived settings depend on each other in a loop
    #[error("cyclic derivation while resolving '{key}' ({chain})")]
    CyclicDerivation { key: String, chain: String },

    /// A component recipe read a setting that is missing for this platform
    #[error("component '{component}' ({phase} phase) requires setting '{key}', which is not defined")]
    MissingSetting {
        component: String,
        phase: BuildPhase,
        key: String,
    },

    /// The target family requires a package identifier the project lacks
    #[error("project '{project}' has no package identifier for family '{family}'")]
    UnresolvedIdentifier { project: String, family: String },
}

impl From<SettingsError> for ResolveError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Undefined { key } => ResolveError::UndefinedSetting { key },
            SettingsError::Cycle { key, chain } => ResolveError::CyclicDerivation { key, chain },
        }
    }
}
