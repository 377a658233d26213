//! Build plan resolution
//!
//! Translates a (project, platform) pair into a concrete `BuildPlan` by
//! layering settings, resolving project-level derivations, and running
//! each member component's recipes in declaration order.
//!
//! # Design
//!
//! - **Pure resolution**: recipes run against in-memory state only; the
//!   resolver never touches the filesystem
//! - **All-or-nothing**: the first resolution error aborts the pair; a
//!   plan with missing steps never escapes
//! - **Isolated batches**: `resolve_all` keeps one platform's failure from
//!   touching any other platform's outcome

use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::component::ComponentCatalog;
use crate::engine::plan::{BuildPlan, PackageMetadata};
use crate::error::{ResolveError, Result};
use crate::platform::{PlatformDescriptor, PlatformRegistry};
use crate::project::ProjectSpec;
use crate::settings::{SettingsError, SettingsStore};
use crate::types::{BuildPhase, SettingScope};

// ============================================================================
// Single-Pair Resolution
// ============================================================================

/// Resolve one project against one platform.
///
/// Runs four stages: settings layering, project-level derivations
/// (prefix, bindir, package identifier), per-component step generation,
/// and plan assembly. Component recipes see the store with their local
/// scope active; the final settings snapshot does not include local
/// values.
///
/// # Errors
///
/// Any `ResolveError` from the taxonomy: unknown component names, missing
/// or cyclic settings, or a missing package identifier on a family that
/// requires one. On error no plan is produced.
pub fn resolve_build_plan(
    project: &ProjectSpec,
    platform: &PlatformDescriptor,
    catalog: &ComponentCatalog,
) -> Result<BuildPlan> {
    debug!(
        project = %project.name(),
        platform = %platform.name,
        "resolving build plan"
    );

    // Stage 1: layer settings (platform defaults, then project scope)
    let mut store = SettingsStore::new();
    for (key, value) in &platform.settings {
        store.define(SettingScope::PlatformDefault, key.clone(), value.clone());
    }
    for (key, value) in project.settings() {
        store.define_value(SettingScope::Project, key.clone(), value.clone());
    }

    // Stage 2: project-level derivations
    let identifier = project
        .resolve_identifier(&platform.os_family)
        .map(str::to_string);
    if identifier.is_none() && platform.os_family.requires_identifier() {
        return Err(ResolveError::UnresolvedIdentifier {
            project: project.name().to_string(),
            family: platform.os_family.to_string(),
        });
    }
    let prefix = store.resolve("prefix")?;
    let bindir = store.resolve("bindir")?;

    // Stage 3: run component recipes in declaration order
    let mut configure = Vec::new();
    let mut build = Vec::new();
    let mut install = Vec::new();
    let mut build_requires: Vec<String> = Vec::new();
    let mut directories = project.directories.clone();

    for name in project.components() {
        let component = catalog.lookup(name)?;
        store.set_component_scope(component.settings());

        for phase in BuildPhase::iter() {
            let steps = component
                .generate(phase, &store, platform)
                .map_err(|err| recipe_error(err, name, phase))?;
            match phase {
                BuildPhase::Configure => configure.extend(steps),
                BuildPhase::Build => build.extend(steps),
                BuildPhase::Install => install.extend(steps),
            }
        }

        extend_unique(&mut build_requires, &component.build_requires);
        extend_unique(&mut directories, &component.directories);
        store.clear_component_scope();
    }

    // Stage 4: assemble the plan
    let settings = store.snapshot()?;
    let dependency_install = platform.dependency_install.as_ref().and_then(|template| {
        if build_requires.is_empty() {
            None
        } else {
            Some(template.command_for(&build_requires))
        }
    });

    let plan = BuildPlan {
        project: project.name().to_string(),
        platform: platform.name.clone(),
        vm_image: platform.vm_image.clone(),
        settings,
        dependency_install,
        provisioning: platform.provisioning.clone(),
        configure,
        build,
        install,
        metadata: PackageMetadata {
            name: project.name().to_string(),
            version: project.version.clone(),
            license: project.license.clone(),
            identifier,
            prefix,
            bindir,
            description: project.description.clone(),
            homepage: project.homepage.clone(),
            vendor: project.vendor.clone(),
            directories,
        },
    };

    info!(
        project = %plan.project,
        platform = %plan.platform,
        steps = plan.step_count(),
        "resolved build plan"
    );
    Ok(plan)
}

/// Map a recipe's settings failure to the taxonomy, keeping the component
/// and phase that hit it.
fn recipe_error(err: SettingsError, component: &str, phase: BuildPhase) -> ResolveError {
    match err {
        SettingsError::Undefined { key } => ResolveError::MissingSetting {
            component: component.to_string(),
            phase,
            key,
        },
        other => other.into(),
    }
}

/// Append additions that are not already present, preserving order.
fn extend_unique(target: &mut Vec<String>, additions: &[String]) {
    for addition in additions {
        if !target.iter().any(|existing| existing == addition) {
            target.push(addition.clone());
        }
    }
}

// ============================================================================
// Batch Resolution
// ============================================================================

/// Outcome of one platform within a batch resolution.
#[derive(Debug)]
pub struct PlatformOutcome {
    /// Requested platform name (recorded even when lookup failed)
    pub platform: String,
    /// The plan, or why this pair failed
    pub result: Result<BuildPlan>,
}

/// Outcomes of resolving one project against a set of platforms.
#[derive(Debug)]
pub struct BatchReport {
    /// Project the batch was resolved for
    pub project: String,
    /// One outcome per requested platform, in request order
    pub outcomes: Vec<PlatformOutcome>,
}

impl BatchReport {
    /// Iterate the successfully resolved plans, in request order.
    pub fn plans(&self) -> impl Iterator<Item = &BuildPlan> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }

    /// Iterate the failed pairs as (platform name, error).
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ResolveError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(_) => None,
            Err(err) => Some((outcome.platform.as_str(), err)),
        })
    }

    /// Check whether every requested platform resolved.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    /// Number of requested platforms.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check whether the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Resolve one project against many platforms.
///
/// Platform lookup happens here, so an unknown name becomes that pair's
/// outcome instead of failing the batch. Outcomes keep the request order.
pub fn resolve_all(
    project: &ProjectSpec,
    platform_names: &[&str],
    registry: &PlatformRegistry,
    catalog: &ComponentCatalog,
) -> BatchReport {
    let outcomes = platform_names
        .iter()
        .map(|name| {
            let result = registry
                .lookup(name)
                .and_then(|platform| resolve_build_plan(project, platform, catalog));
            if let Err(err) = &result {
                warn!(platform = %name, error = %err, "build plan resolution failed");
            }
            PlatformOutcome {
                platform: (*name).to_string(),
                result,
            }
        })
        .collect();

    BatchReport {
        project: project.name().to_string(),
        outcomes,
    }
}
