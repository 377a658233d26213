//! End-to-end resolution tests
//!
//! Exercises the whole pipeline — built-in platform catalog, component
//! catalog, project spec, resolver — with a realistic fixture: a cron
//! wrapper distributed as a pre-built per-platform artifact.

use caravan::engine::resolver::{resolve_all, resolve_build_plan};
use caravan::{
    platforms, steps, ComponentCatalog, ComponentSpec, ProjectSpec, ResolveError, SourceLocation,
    SourceSpec,
};

/// Install a fmt subscriber so `RUST_LOG=caravan=debug` shows resolver
/// traces during test runs. Only the first call installs one.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A Go binary delivered as a per-platform tarball. The primary source is
/// the working tree; the build artifact rides along as a secondary source
/// and unpacks next to it.
fn puppet_cron_component() -> ComponentSpec {
    ComponentSpec::new("puppet-cron")
        .with_version("1.0.0")
        .with_license("MIT")
        .with_sources(
            SourceSpec::new(SourceLocation::local("/work/puppet-cron")).with_secondary(
                SourceLocation::local("/work/puppet-cron/builds/linux-amd64/build.tar.gz"),
            ),
        )
        .with_directory("/opt/puppet-cron/bin")
        .build_with(|_, platform| {
            let os = platform.os_family.os_label();
            let arch = platform.normalize_architecture(platforms::GO_ARCH_LABELS);
            Ok(vec![steps::unpack(
                format!("builds/{}-{}/build.tar.gz", os, arch),
                "..",
            )])
        })
        .install_with(|settings, _| {
            let bindir = settings.resolve("bindir")?;
            Ok(vec![
                steps::mkdir_p(&bindir),
                steps::install_file(
                    "../build/puppet-cron",
                    format!("{}/puppet-cron", bindir),
                    "0755",
                ),
            ])
        })
}

fn catalog() -> ComponentCatalog {
    let mut catalog = ComponentCatalog::new();
    catalog.register(puppet_cron_component()).unwrap();
    catalog
}

fn puppet_cron_project(catalog: &ComponentCatalog) -> ProjectSpec {
    let mut project = ProjectSpec::new("puppet-cron")
        .with_description("Wrapper for puppet agent to be run from cron")
        .with_version("1.0.0")
        .with_homepage("https://github.com/puppetlabs-operations/puppet-cron")
        .with_vendor("Daniel Parks <daniel.parks@puppet.com>")
        .with_license("MIT")
        .with_prefix("/opt/puppet-cron")
        .with_setting("piddir", "/var/run")
        .with_solaris_identifier("puppetlabs.com")
        .with_macos_identifier("com.puppetlabs")
        .with_directory("/opt/puppet-cron");
    project.add_component("puppet-cron", catalog).unwrap();
    project
}

#[test]
fn test_debian_9_full_plan() {
    init_tracing();
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);
    let platform = platforms::debian_9_amd64();

    let plan = resolve_build_plan(&project, &platform, &catalog).unwrap();

    assert_eq!(plan.project, "puppet-cron");
    assert_eq!(plan.platform, "debian-9-amd64");
    assert_eq!(plan.vm_image.as_deref(), Some("debian-9-x86_64"));

    // Settings snapshot: prefix, derived bindir, piddir
    assert_eq!(plan.settings.len(), 3);
    assert_eq!(plan.settings["prefix"], "/opt/puppet-cron");
    assert_eq!(plan.settings["bindir"], "/opt/puppet-cron/bin");
    assert_eq!(plan.settings["piddir"], "/var/run");

    // No build_requires, so no dependency-install command even if the
    // platform had a template (this one does not)
    assert_eq!(plan.dependency_install, None);

    assert_eq!(plan.configure, Vec::<String>::new());
    assert_eq!(plan.build, vec!["tar -xzf builds/linux-amd64/build.tar.gz -C .."]);
    assert_eq!(
        plan.install,
        vec![
            "mkdir -p /opt/puppet-cron/bin",
            "install -m 0755 ../build/puppet-cron /opt/puppet-cron/bin/puppet-cron",
        ]
    );

    assert_eq!(plan.metadata.name, "puppet-cron");
    assert_eq!(plan.metadata.version.as_deref(), Some("1.0.0"));
    assert_eq!(plan.metadata.license.as_deref(), Some("MIT"));
    assert_eq!(plan.metadata.identifier, None);
    assert_eq!(plan.metadata.prefix, "/opt/puppet-cron");
    assert_eq!(plan.metadata.bindir, "/opt/puppet-cron/bin");
    assert_eq!(
        plan.metadata.vendor.as_deref(),
        Some("Daniel Parks <daniel.parks@puppet.com>")
    );
    assert_eq!(
        plan.metadata.directories,
        vec!["/opt/puppet-cron", "/opt/puppet-cron/bin"]
    );
}

#[test]
fn test_debian_9_rendered_script() {
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);

    let plan = resolve_build_plan(&project, &platforms::debian_9_amd64(), &catalog).unwrap();
    assert_eq!(
        plan.render_script(),
        "#!/bin/sh\n\
         set -e\n\
         \n\
         # Provision build host\n\
         export DEBIAN_FRONTEND=noninteractive\n\
         apt-get update -qq\n\
         apt-get install -qy --no-install-recommends make rsync curl devscripts fakeroot debhelper\n\
         \n\
         # Build\n\
         tar -xzf builds/linux-amd64/build.tar.gz -C ..\n\
         \n\
         # Install\n\
         mkdir -p /opt/puppet-cron/bin\n\
         install -m 0755 ../build/puppet-cron /opt/puppet-cron/bin/puppet-cron\n"
    );
}

#[test]
fn test_i386_gets_go_architecture_label() {
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);

    let plan = resolve_build_plan(&project, &platforms::debian_9_i386(), &catalog).unwrap();
    assert_eq!(plan.build, vec!["tar -xzf builds/linux-386/build.tar.gz -C .."]);
}

#[test]
fn test_solaris_plan_carries_identifier() {
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);

    let plan = resolve_build_plan(&project, &platforms::solaris_11_amd64(), &catalog).unwrap();
    assert_eq!(plan.metadata.identifier.as_deref(), Some("puppetlabs.com"));
    assert_eq!(plan.vm_image.as_deref(), Some("solaris-11-x86_64"));
    // Solaris images come pre-provisioned
    assert_eq!(plan.provisioning, Vec::<String>::new());
    // The os label falls through to the family name
    assert_eq!(plan.build, vec!["tar -xzf builds/solaris-amd64/build.tar.gz -C .."]);
}

#[test]
fn test_el_plan_uses_linux_label() {
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);

    let plan = resolve_build_plan(&project, &platforms::el_7_amd64(), &catalog).unwrap();
    assert_eq!(plan.vm_image.as_deref(), Some("centos-7-x86_64"));
    assert_eq!(plan.build, vec!["tar -xzf builds/linux-amd64/build.tar.gz -C .."]);
    assert_eq!(
        plan.provisioning,
        vec!["yum install --assumeyes createrepo rsync make rpmdevtools rpm-libs yum-utils rpm-sign"]
    );
}

#[test]
fn test_dependency_install_rendering_per_family() {
    let mut catalog = ComponentCatalog::new();
    catalog
        .register(
            puppet_cron_component()
                .with_build_require("make")
                .with_build_require("rsync"),
        )
        .unwrap();
    let project = puppet_cron_project(&catalog);

    let apt = resolve_build_plan(&project, &platforms::debian_7_amd64(), &catalog).unwrap();
    assert_eq!(
        apt.dependency_install.as_deref(),
        Some("DEBIAN_FRONTEND=noninteractive apt-get install -qy --no-install-recommends make rsync")
    );

    let yum = resolve_build_plan(&project, &platforms::el_6_amd64(), &catalog).unwrap();
    assert_eq!(
        yum.dependency_install.as_deref(),
        Some("yum install --assumeyes make rsync")
    );

    let ips = resolve_build_plan(&project, &platforms::solaris_11_amd64(), &catalog).unwrap();
    assert_eq!(
        ips.dependency_install.as_deref(),
        Some("pkg install make rsync || [[ $? -eq 4 ]]")
    );

    // Platforms without a template never get the command
    let bare = resolve_build_plan(&project, &platforms::debian_9_amd64(), &catalog).unwrap();
    assert_eq!(bare.dependency_install, None);
}

#[test]
fn test_dependency_install_precedes_provisioning_in_script() {
    let mut catalog = ComponentCatalog::new();
    catalog
        .register(puppet_cron_component().with_build_require("make"))
        .unwrap();
    let project = puppet_cron_project(&catalog);

    let plan = resolve_build_plan(&project, &platforms::debian_7_amd64(), &catalog).unwrap();
    let script = plan.render_script();

    let dependencies = script.find("# Install build dependencies").unwrap();
    let provisioning = script.find("# Provision build host").unwrap();
    assert!(dependencies < provisioning);
}

#[test]
fn test_resolve_all_builtin_platforms() {
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);
    let registry = platforms::builtin_registry();

    let names: Vec<&str> = registry.names().collect();
    let report = resolve_all(&project, &names, &registry, &catalog);

    assert_eq!(report.len(), 10);
    assert!(report.all_succeeded());
    for plan in report.plans() {
        assert!(plan.vm_image.is_some());
        assert_eq!(plan.settings["bindir"], "/opt/puppet-cron/bin");
        assert_eq!(plan.install.len(), 2);
    }
}

#[test]
fn test_resolve_all_isolates_unknown_platforms() {
    init_tracing();
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);
    let registry = platforms::builtin_registry();

    let report = resolve_all(
        &project,
        &["debian-9-amd64", "windows-2012-x64", "el-7-amd64"],
        &registry,
        &catalog,
    );

    assert_eq!(report.len(), 3);
    assert!(!report.all_succeeded());
    assert_eq!(report.plans().count(), 2);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "windows-2012-x64");
    assert!(matches!(
        failures[0].1,
        ResolveError::UnknownPlatform { name } if name == "windows-2012-x64"
    ));
}

#[test]
fn test_registry_file_round_trip_preserves_plans() {
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);
    let registry = platforms::builtin_registry();

    let file = tempfile::NamedTempFile::new().unwrap();
    registry.save_to_file(file.path()).unwrap();
    let reloaded = caravan::PlatformRegistry::load_from_file(file.path()).unwrap();

    let original = resolve_build_plan(
        &project,
        registry.lookup("debian-9-amd64").unwrap(),
        &catalog,
    )
    .unwrap();
    let from_file = resolve_build_plan(
        &project,
        reloaded.lookup("debian-9-amd64").unwrap(),
        &catalog,
    )
    .unwrap();
    assert_eq!(original, from_file);
}

#[test]
fn test_plan_json_survives_round_trip() {
    let catalog = catalog();
    let project = puppet_cron_project(&catalog);

    let plan = resolve_build_plan(&project, &platforms::solaris_11_amd64(), &catalog).unwrap();
    let json = plan.to_json().unwrap();
    let restored = caravan::BuildPlan::from_json(&json).unwrap();
    assert_eq!(restored, plan);
}

#[test]
fn test_two_slot_sources_survive_in_catalog() {
    let catalog = catalog();
    let component = catalog.lookup("puppet-cron").unwrap();

    let sources = component.sources.as_ref().unwrap();
    assert!(sources.primary.is_local());
    assert_eq!(sources.secondary.len(), 1);
    assert_eq!(
        sources.all().map(|s| s.to_string()).collect::<Vec<_>>(),
        vec![
            "/work/puppet-cron",
            "/work/puppet-cron/builds/linux-amd64/build.tar.gz",
        ]
    );
}
