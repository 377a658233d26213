//! Component build recipes
//!
//! A `ComponentSpec` describes how one piece of software gets built:
//! where its sources come from, what build-time packages it needs, and a
//! recipe closure per lifecycle phase. Recipes are pure functions from
//! (settings, platform) to ordered command strings, so one recipe
//! resolves against every target platform.
//!
//! Components live in a `ComponentCatalog` under unique names; projects
//! reference them by name.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::platform::PlatformDescriptor;
use crate::settings::{SettingValue, SettingsError, SettingsStore};
use crate::types::BuildPhase;

// ============================================================================
// Source Locations
// ============================================================================

/// Where component sources are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLocation {
    /// Remote URL fetched over the network
    Url(String),
    /// Path on the machine driving the build, shipped to the build host
    LocalPath(PathBuf),
}

impl SourceLocation {
    /// Create a remote URL location.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Create a local path location.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::LocalPath(path.into())
    }

    /// Check if this location is a local path.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalPath(_))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::LocalPath(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Sources for one component: a primary location plus ordered extras.
///
/// The two slots are not interchangeable. The primary location is what
/// gets checked out (or copied) as the component's working tree; secondary
/// locations are fetched alongside it into the same directory. Recipes
/// that install pre-built artifacts use this split: the working tree rides
/// in as the primary local path and the per-platform `build.tar.gz`
/// arrives as a secondary fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Drives checkout; every component has exactly one
    pub primary: SourceLocation,
    /// Fetched after the primary, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<SourceLocation>,
}

impl SourceSpec {
    /// Create a source spec with only a primary location.
    pub fn new(primary: SourceLocation) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
        }
    }

    /// Append a secondary location.
    pub fn with_secondary(mut self, location: SourceLocation) -> Self {
        self.secondary.push(location);
        self
    }

    /// Iterate all locations, primary first.
    pub fn all(&self) -> impl Iterator<Item = &SourceLocation> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }
}

// ============================================================================
// Component Specification
// ============================================================================

/// Recipe closure for one build phase.
///
/// Receives the layered settings (with this component's local scope
/// active) and the target platform, and returns the ordered commands for
/// that phase. `Send + Sync` so catalogs can be shared across resolver
/// threads.
pub type StepGenerator = Arc<
    dyn Fn(&SettingsStore, &PlatformDescriptor) -> std::result::Result<Vec<String>, SettingsError>
        + Send
        + Sync,
>;

/// One component's build recipe and metadata.
#[derive(Clone, Default)]
pub struct ComponentSpec {
    name: String,
    /// Component version, recorded for provenance
    pub version: Option<String>,
    /// Component license
    pub license: Option<String>,
    /// Where the sources come from
    pub sources: Option<SourceSpec>,
    /// Build-time package dependencies, in declaration order
    pub build_requires: Vec<String>,
    /// Directories the installed package owns
    pub directories: Vec<String>,
    settings: Vec<(String, SettingValue)>,
    configure: Option<StepGenerator>,
    build: Option<StepGenerator>,
    install: Option<StepGenerator>,
}

impl ComponentSpec {
    /// Create an empty recipe with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Component name (the catalog key).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the component version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the component license.
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Set the source locations.
    pub fn with_sources(mut self, sources: SourceSpec) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Append one build-time package dependency.
    pub fn with_build_require(mut self, package: impl Into<String>) -> Self {
        self.build_requires.push(package.into());
        self
    }

    /// Append one directory the installed package owns.
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directories.push(directory.into());
        self
    }

    /// Add a component-local literal setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings
            .push((key.into(), SettingValue::literal(value.into())));
        self
    }

    /// Add a component-local derived setting.
    pub fn with_derived_setting<F>(mut self, key: impl Into<String>, thunk: F) -> Self
    where
        F: Fn(&SettingsStore) -> std::result::Result<String, SettingsError>
            + Send
            + Sync
            + 'static,
    {
        self.settings.push((key.into(), SettingValue::derived(thunk)));
        self
    }

    /// Set the configure-phase recipe.
    pub fn configure_with<F>(mut self, generator: F) -> Self
    where
        F: Fn(&SettingsStore, &PlatformDescriptor) -> std::result::Result<Vec<String>, SettingsError>
            + Send
            + Sync
            + 'static,
    {
        self.configure = Some(Arc::new(generator));
        self
    }

    /// Set the build-phase recipe.
    pub fn build_with<F>(mut self, generator: F) -> Self
    where
        F: Fn(&SettingsStore, &PlatformDescriptor) -> std::result::Result<Vec<String>, SettingsError>
            + Send
            + Sync
            + 'static,
    {
        self.build = Some(Arc::new(generator));
        self
    }

    /// Set the install-phase recipe.
    pub fn install_with<F>(mut self, generator: F) -> Self
    where
        F: Fn(&SettingsStore, &PlatformDescriptor) -> std::result::Result<Vec<String>, SettingsError>
            + Send
            + Sync
            + 'static,
    {
        self.install = Some(Arc::new(generator));
        self
    }

    /// Component-local settings, in definition order.
    pub fn settings(&self) -> &[(String, SettingValue)] {
        &self.settings
    }

    /// Phases this recipe defines steps for.
    pub fn defined_phases(&self) -> Vec<BuildPhase> {
        let mut phases = Vec::new();
        if self.configure.is_some() {
            phases.push(BuildPhase::Configure);
        }
        if self.build.is_some() {
            phases.push(BuildPhase::Build);
        }
        if self.install.is_some() {
            phases.push(BuildPhase::Install);
        }
        phases
    }

    /// Run the recipe for one phase.
    ///
    /// A phase without a recipe contributes no steps. The caller is
    /// responsible for activating this component's local settings scope
    /// first.
    pub fn generate(
        &self,
        phase: BuildPhase,
        settings: &SettingsStore,
        platform: &PlatformDescriptor,
    ) -> std::result::Result<Vec<String>, SettingsError> {
        let generator = match phase {
            BuildPhase::Configure => &self.configure,
            BuildPhase::Build => &self.build,
            BuildPhase::Install => &self.install,
        };
        match generator {
            Some(generator) => generator(settings, platform),
            None => Ok(Vec::new()),
        }
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("license", &self.license)
            .field("sources", &self.sources)
            .field("build_requires", &self.build_requires)
            .field("directories", &self.directories)
            .field("settings", &self.settings)
            .field("phases", &self.defined_phases())
            .finish()
    }
}

// ============================================================================
// Component Catalog
// ============================================================================

/// Named collection of component recipes.
#[derive(Debug, Default, Clone)]
pub struct ComponentCatalog {
    components: Vec<ComponentSpec>,
}

impl ComponentCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::DuplicateComponent` if the name is taken.
    pub fn register(&mut self, component: ComponentSpec) -> Result<()> {
        if self.contains(component.name()) {
            return Err(ResolveError::DuplicateComponent {
                name: component.name,
            });
        }
        debug!(component = %component.name, "registered component");
        self.components.push(component);
        Ok(())
    }

    /// Look up a recipe by name.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnknownComponent` if no recipe matches.
    pub fn lookup(&self, name: &str) -> Result<&ComponentSpec> {
        self.components
            .iter()
            .find(|component| component.name == name)
            .ok_or_else(|| ResolveError::UnknownComponent {
                name: name.to_string(),
            })
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.components.iter().any(|component| component.name == name)
    }

    /// Number of registered recipes.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|component| component.name())
    }

    /// Iterate recipes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.components.iter()
    }
}
