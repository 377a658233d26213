//! Project specifications
//!
//! A `ProjectSpec` names the components that make up a shippable package,
//! carries the package metadata (version, license, vendor, platform
//! identifiers), and contributes the project scope of the settings store.
//! Projects reference components by catalog name; membership is validated
//! when a component is added, not at resolve time.

use crate::component::ComponentCatalog;
use crate::error::{ResolveError, Result};
use crate::settings::{SettingValue, SettingsError, SettingsStore};
use crate::types::OsFamily;

/// Platform-specific package identifiers.
///
/// Solaris wants an IPS publisher (`puppetlabs.com`), macOS a reverse-DNS
/// bundle prefix (`com.puppetlabs`). Families that do not use identifiers
/// have no slot here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIdentifiers {
    pub solaris: Option<String>,
    pub macos: Option<String>,
}

/// One buildable project: metadata plus an ordered set of components.
#[derive(Debug, Clone, Default)]
pub struct ProjectSpec {
    name: String,
    /// One-line package description
    pub description: Option<String>,
    /// Package version
    pub version: Option<String>,
    /// Package license
    pub license: Option<String>,
    /// Project homepage URL
    pub homepage: Option<String>,
    /// Packaging vendor string
    pub vendor: Option<String>,
    /// Directories the installed package owns, before component additions
    pub directories: Vec<String>,
    identifiers: PackageIdentifiers,
    settings: Vec<(String, SettingValue)>,
    components: Vec<String>,
}

impl ProjectSpec {
    /// Create an empty project with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Project name (becomes the package name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the package description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the package version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the package license.
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Set the project homepage.
    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    /// Set the packaging vendor string.
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Set the install prefix.
    ///
    /// Defines the `prefix` setting and a derived `bindir` of
    /// `{prefix}/bin`. Both can still be overridden by later definitions.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings
            .push(("prefix".to_string(), SettingValue::literal(prefix.into())));
        self.settings.push((
            "bindir".to_string(),
            SettingValue::derived(|store| Ok(format!("{}/bin", store.resolve("prefix")?))),
        ));
        self
    }

    /// Add a project-scope literal setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings
            .push((key.into(), SettingValue::literal(value.into())));
        self
    }

    /// Add a project-scope derived setting.
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

    /// Set the Solaris IPS publisher identifier.
    pub fn with_solaris_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifiers.solaris = Some(identifier.into());
        self
    }

    /// Set the macOS bundle identifier prefix.
    pub fn with_macos_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifiers.macos = Some(identifier.into());
        self
    }

    /// Append one directory the installed package owns.
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directories.push(directory.into());
        self
    }

    /// Add a component to the project by catalog name.
    ///
    /// Membership is ordered and unique; resolution later walks components
    /// in the order they were added here.
    ///
    /// # Errors
    ///
    /// - `ResolveError::UnknownComponent` if the catalog has no such recipe
    /// - `ResolveError::DuplicateComponent` if it was already added
    pub fn add_component(&mut self, name: &str, catalog: &ComponentCatalog) -> Result<()> {
        catalog.lookup(name)?;
        if self.components.iter().any(|existing| existing == name) {
            return Err(ResolveError::DuplicateComponent {
                name: name.to_string(),
            });
        }
        self.components.push(name.to_string());
        Ok(())
    }

    /// Component names in the order they were added.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Project-scope settings, in definition order.
    pub fn settings(&self) -> &[(String, SettingValue)] {
        &self.settings
    }

    /// The configured platform identifiers.
    pub fn identifiers(&self) -> &PackageIdentifiers {
        &self.identifiers
    }

    /// The package identifier for a target family, if the project has one.
    ///
    /// Total over every family: families that do not use identifiers
    /// resolve to `None`. Whether a missing identifier is an error is the
    /// resolver's call, made per family.
    pub fn resolve_identifier(&self, family: &OsFamily) -> Option<&str> {
        match family {
            OsFamily::Solaris => self.identifiers.solaris.as_deref(),
            OsFamily::MacOs => self.identifiers.macos.as_deref(),
            OsFamily::DebianFamily | OsFamily::RpmFamily | OsFamily::Other(_) => None,
        }
    }
}
