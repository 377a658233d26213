//! Target platform descriptors and the platform registry
//!
//! A `PlatformDescriptor` is plain data about one build target: what family
//! it belongs to, its architecture, which VM image builds run on, how the
//! build host is provisioned, and how build-time package dependencies get
//! installed. Descriptors carry no behavior beyond small helpers; the
//! resolver interprets them.
//!
//! The `PlatformRegistry` holds descriptors under unique names and can
//! round-trip through a JSON file, so a catalog can be maintained outside
//! the binary that uses it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::types::OsFamily;

// ============================================================================
// Dependency Installation Template
// ============================================================================

/// How a platform installs build-time package dependencies.
///
/// The command is a template, not a finished string: the resolver appends
/// the collected package list to `prefix`, then appends `suffix` verbatim
/// when one exists. Solaris is the reason the suffix slot exists at all:
/// `pkg install` exits 4 when every requested package is already present,
/// so its template ends with `|| [[ $? -eq 4 ]]` to keep that from
/// aborting the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInstall {
    /// Command text preceding the package list
    pub prefix: String,
    /// Text appended after the package list, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl DependencyInstall {
    /// Create a template with no suffix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: None,
        }
    }

    /// Set the text appended after the package list.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Render the full install command for a package list.
    ///
    /// Catalog templates vary on trailing whitespace in the prefix;
    /// normalize to a single separator before the list. An empty list
    /// renders the trimmed prefix alone, with no separator and no suffix.
    pub fn command_for(&self, packages: &[impl AsRef<str>]) -> String {
        if packages.is_empty() {
            return self.prefix.trim_end().to_string();
        }
        let list = packages
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        let mut command = format!("{} {}", self.prefix.trim_end(), list);
        if let Some(suffix) = &self.suffix {
            command.push_str(suffix);
        }
        command
    }
}

// ============================================================================
// Platform Descriptor
// ============================================================================

/// Everything the resolver knows about one build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Registry name, e.g. `debian-9-amd64`
    pub name: String,
    /// Packaging family
    pub os_family: OsFamily,
    /// Distribution codename where the family uses one (e.g. `stretch`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,
    /// Hardware architecture as the platform names it (e.g. `x86_64`, `i386`)
    pub architecture: String,
    /// VM image builds for this platform run on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_image: Option<String>,
    /// Ordered commands that provision a fresh build host
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provisioning: Vec<String>,
    /// Template for installing build-time package dependencies.
    /// `None` means the platform has no such mechanism and plans for it
    /// never contain a dependency-install command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_install: Option<DependencyInstall>,
    /// Platform-default settings (lowest precedence scope)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

impl PlatformDescriptor {
    /// Create a descriptor with the required fields.
    pub fn new(
        name: impl Into<String>,
        os_family: OsFamily,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            os_family,
            codename: None,
            architecture: architecture.into(),
            vm_image: None,
            provisioning: Vec::new(),
            dependency_install: None,
            settings: BTreeMap::new(),
        }
    }

    /// Set the distribution codename.
    pub fn with_codename(mut self, codename: impl Into<String>) -> Self {
        self.codename = Some(codename.into());
        self
    }

    /// Set the VM image name.
    pub fn with_vm_image(mut self, image: impl Into<String>) -> Self {
        self.vm_image = Some(image.into());
        self
    }

    /// Append one provisioning command.
    pub fn with_provisioning(mut self, command: impl Into<String>) -> Self {
        self.provisioning.push(command.into());
        self
    }

    /// Set the dependency-install template.
    pub fn with_dependency_install(mut self, template: DependencyInstall) -> Self {
        self.dependency_install = Some(template);
        self
    }

    /// Add a platform-default setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Map this platform's architecture through a naming table.
    ///
    /// Toolchains disagree on architecture labels (`i386` vs `386`,
    /// `x86_64` vs `amd64`); recipes pass the table for the toolchain at
    /// hand. Architectures the table does not mention come back unchanged.
    pub fn normalize_architecture(&self, table: &[(&str, &str)]) -> String {
        table
            .iter()
            .find(|(raw, _)| *raw == self.architecture)
            .map(|(_, mapped)| (*mapped).to_string())
            .unwrap_or_else(|| self.architecture.clone())
    }
}

// ============================================================================
// Platform Registry
// ============================================================================

/// Named collection of platform descriptors.
///
/// Names are unique; registration order is preserved for listing.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PlatformRegistry {
    platforms: Vec<PlatformDescriptor>,
}

impl PlatformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from descriptors whose names are known to be
    /// distinct (the built-in catalog).
    pub(crate) fn from_distinct(platforms: Vec<PlatformDescriptor>) -> Self {
        Self { platforms }
    }

    /// Add a descriptor to the registry.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::DuplicatePlatform` if the name is taken.
    pub fn register(&mut self, descriptor: PlatformDescriptor) -> Result<()> {
        if self.contains(&descriptor.name) {
            return Err(ResolveError::DuplicatePlatform {
                name: descriptor.name,
            });
        }
        debug!(platform = %descriptor.name, "registered platform");
        self.platforms.push(descriptor);
        Ok(())
    }

    /// Look up a platform by name.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnknownPlatform` if no descriptor matches.
    pub fn lookup(&self, name: &str) -> Result<&PlatformDescriptor> {
        self.platforms
            .iter()
            .find(|platform| platform.name == name)
            .ok_or_else(|| ResolveError::UnknownPlatform {
                name: name.to_string(),
            })
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.platforms.iter().any(|platform| platform.name == name)
    }

    /// Number of registered platforms.
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Iterate descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PlatformDescriptor> {
        self.platforms.iter()
    }

    /// Iterate registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().map(|platform| platform.name.as_str())
    }

    /// Save the registry to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize platform registry to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write platform registry to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load a registry from a JSON file.
    ///
    /// Rejects files that define the same platform name twice, since every
    /// lookup would silently favor the first entry.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read platform registry from {:?}", path.as_ref()))?;

        let registry: Self =
            serde_json::from_str(&content).context("Failed to parse platform registry JSON")?;

        let mut seen = std::collections::BTreeSet::new();
        for platform in &registry.platforms {
            if !seen.insert(platform.name.as_str()) {
                anyhow::bail!("Platform '{}' is defined more than once", platform.name);
            }
        }

        Ok(registry)
    }
}
