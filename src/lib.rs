//! Caravan Build Planning Library
//!
//! This library turns declarative build specifications (platforms,
//! components, projects) into concrete, ordered [`BuildPlan`]s, one per
//! (project, platform) pair. Resolution is pure: nothing here touches the
//! network or spawns a process.
//!
//! ```
//! use caravan::{platforms, ComponentCatalog, ComponentSpec, ProjectSpec};
//! use caravan::engine::resolver::resolve_build_plan;
//!
//! let mut catalog = ComponentCatalog::new();
//! catalog.register(ComponentSpec::new("app").install_with(|settings, _| {
//!     Ok(vec![format!("mkdir -p {}", settings.resolve("bindir")?)])
//! }))?;
//!
//! let mut project = ProjectSpec::new("app")
//!     .with_version("1.0.0")
//!     .with_prefix("/opt/app");
//! project.add_component("app", &catalog)?;
//!
//! let registry = platforms::builtin_registry();
//! let platform = registry.lookup("debian-9-amd64")?;
//! let plan = resolve_build_plan(&project, platform, &catalog)?;
//! assert_eq!(plan.install, vec!["mkdir -p /opt/app/bin"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod component;
pub mod engine;
pub mod error;
pub mod platform;
pub mod platforms;
pub mod project;
pub mod settings;
pub mod steps;
pub mod types;

// Re-export main types for convenience
pub use component::{ComponentCatalog, ComponentSpec, SourceLocation, SourceSpec, StepGenerator};
pub use engine::plan::{BuildPlan, PackageMetadata};
pub use engine::resolver::{resolve_all, resolve_build_plan, BatchReport, PlatformOutcome};
pub use error::{ResolveError, Result};
pub use platform::{DependencyInstall, PlatformDescriptor, PlatformRegistry};
pub use project::{PackageIdentifiers, ProjectSpec};
pub use settings::{DeriveFn, SettingValue, SettingsError, SettingsStore};
pub use types::{BuildPhase, OsFamily, SettingScope};
