//! Build plan data model
//!
//! A `BuildPlan` is the resolver's output for one (project, platform)
//! pair: every command the build host will run, in order, plus the
//! resolved settings and the metadata packaging needs afterwards. Plans
//! are plain data, so they serialize to JSON and diff cleanly in tests;
//! [`BuildPlan::render_script`] turns one into a shell script.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::types::BuildPhase;

/// Package metadata recorded alongside the build steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Package name (the project name)
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    /// Platform package identifier; only Solaris and macOS targets have one
    #[serde(default)]
    pub identifier: Option<String>,
    /// Resolved install prefix
    pub prefix: String,
    /// Resolved binary directory
    pub bindir: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    /// Directories the installed package owns (project first, then
    /// component contributions, duplicates removed)
    #[serde(default)]
    pub directories: Vec<String>,
}

/// A complete build plan: ordered steps plus resolved context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Project this plan was resolved for
    pub project: String,
    /// Platform this plan was resolved for
    pub platform: String,
    /// VM image the build should run on, when the platform names one
    #[serde(default)]
    pub vm_image: Option<String>,
    /// Final settings snapshot (platform + project scopes)
    pub settings: BTreeMap<String, String>,
    /// Fully rendered dependency-install command; `None` when the platform
    /// has no template or no component required packages
    #[serde(default)]
    pub dependency_install: Option<String>,
    /// Build-host provisioning commands, in platform order
    #[serde(default)]
    pub provisioning: Vec<String>,
    /// Configure-phase steps across all components, in declaration order
    #[serde(default)]
    pub configure: Vec<String>,
    /// Build-phase steps across all components, in declaration order
    #[serde(default)]
    pub build: Vec<String>,
    /// Install-phase steps across all components, in declaration order
    #[serde(default)]
    pub install: Vec<String>,
    /// Metadata for the packaging stage
    pub metadata: PackageMetadata,
}

impl BuildPlan {
    /// Steps for one recipe phase.
    pub fn steps_for(&self, phase: BuildPhase) -> &[String] {
        match phase {
            BuildPhase::Configure => &self.configure,
            BuildPhase::Build => &self.build,
            BuildPhase::Install => &self.install,
        }
    }

    /// Total recipe steps across the three phases (provisioning and
    /// dependency installation not included).
    pub fn step_count(&self) -> usize {
        self.configure.len() + self.build.len() + self.install.len()
    }

    /// Returns a summary of the plan for logging/display.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Build Plan: {} on {}", self.project, self.platform),
            format!(
                "  VM image: {}",
                self.vm_image.as_deref().unwrap_or("(none)")
            ),
            format!("  Settings: {}", self.settings.len()),
        ];
        if let Some(command) = &self.dependency_install {
            lines.push(format!("  Dependencies: {}", command));
        }
        lines.push(format!("  Steps ({}):", self.step_count()));
        let mut index = 0;
        for phase in BuildPhase::iter() {
            for step in self.steps_for(phase) {
                index += 1;
                lines.push(format!("    {}. [{}] {}", index, phase, step));
            }
        }
        lines.join("\n")
    }

    /// Render the plan as a POSIX shell script.
    ///
    /// Section order is execution order: dependency installation,
    /// provisioning, configure, build, install. Empty sections are
    /// omitted entirely, header included.
    pub fn render_script(&self) -> String {
        let mut lines: Vec<String> = vec!["#!/bin/sh".to_string(), "set -e".to_string()];

        push_section(
            &mut lines,
            "Install build dependencies",
            self.dependency_install.as_slice(),
        );
        push_section(&mut lines, "Provision build host", &self.provisioning);
        push_section(&mut lines, "Configure", &self.configure);
        push_section(&mut lines, "Build", &self.build);
        push_section(&mut lines, "Install", &self.install);

        let mut script = lines.join("\n");
        script.push('\n');
        script
    }

    /// Serialize the plan to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a plan from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, commands: &[String]) {
    if commands.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("# {}", title));
    lines.extend(commands.iter().cloned());
}
