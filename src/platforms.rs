//! Built-in platform catalog
//!
//! This module provides the platform descriptors shipped with the crate.
//! Descriptors are maintained in Rust rather than data files so typos in
//! names, images, or provisioning commands fail tests instead of builds.
//!
//! # Supported Platforms
//!
//! | Platform         | Family    | Codename | VM Image          |
//! |------------------|-----------|----------|-------------------|
//! | debian-7-amd64   | linux-deb | wheezy   | debian-7-x86_64   |
//! | debian-7-i386    | linux-deb | wheezy   | debian-7-i386     |
//! | debian-8-amd64   | linux-deb | jessie   | debian-8-x86_64   |
//! | debian-8-i386    | linux-deb | jessie   | debian-8-i386     |
//! | debian-9-amd64   | linux-deb | stretch  | debian-9-x86_64   |
//! | debian-9-i386    | linux-deb | stretch  | debian-9-i386     |
//! | el-6-amd64       | linux-rpm | —        | centos-6-x86_64   |
//! | el-6-i386        | linux-rpm | —        | centos-6-i386     |
//! | el-7-amd64       | linux-rpm | —        | centos-7-x86_64   |
//! | solaris-11-amd64 | solaris   | —        | solaris-11-x86_64 |
//!
//! Dependency-install templates are uneven on purpose: only the Debian
//! targets whose build hosts lack the toolchain carry one, every EL
//! target uses yum, and Solaris tolerates "already installed" through its
//! suffix. Solaris images come pre-provisioned, so that descriptor has no
//! provisioning commands at all.

use crate::platform::{DependencyInstall, PlatformDescriptor, PlatformRegistry};
use crate::types::OsFamily;

/// Architecture labels used by Go-style toolchains and artifact paths.
pub const GO_ARCH_LABELS: &[(&str, &str)] = &[("i386", "386"), ("x86_64", "amd64")];

/// Provisioning for Debian build hosts.
const APT_PROVISIONING: &[&str] = &[
    "export DEBIAN_FRONTEND=noninteractive",
    "apt-get update -qq",
    "apt-get install -qy --no-install-recommends make rsync curl devscripts fakeroot debhelper",
];

/// Provisioning for EL build hosts.
const YUM_PROVISIONING: &str =
    "yum install --assumeyes createrepo rsync make rpmdevtools rpm-libs yum-utils rpm-sign";

const APT_DEPENDENCY_TEMPLATE: &str =
    "DEBIAN_FRONTEND=noninteractive apt-get install -qy --no-install-recommends ";
const YUM_DEPENDENCY_TEMPLATE: &str = "yum install --assumeyes";
const IPS_DEPENDENCY_PREFIX: &str = "pkg install ";
const IPS_DEPENDENCY_SUFFIX: &str = " || [[ $? -eq 4 ]]";

fn debian(
    name: &str,
    codename: &str,
    architecture: &str,
    vm_image: &str,
    dependency_template: bool,
) -> PlatformDescriptor {
    let mut platform = PlatformDescriptor::new(name, OsFamily::DebianFamily, architecture)
        .with_codename(codename)
        .with_vm_image(vm_image);
    for command in APT_PROVISIONING {
        platform = platform.with_provisioning(*command);
    }
    if dependency_template {
        platform =
            platform.with_dependency_install(DependencyInstall::new(APT_DEPENDENCY_TEMPLATE));
    }
    platform
}

fn el(name: &str, architecture: &str, vm_image: &str) -> PlatformDescriptor {
    PlatformDescriptor::new(name, OsFamily::RpmFamily, architecture)
        .with_vm_image(vm_image)
        .with_provisioning(YUM_PROVISIONING)
        .with_dependency_install(DependencyInstall::new(YUM_DEPENDENCY_TEMPLATE))
}

/// Debian 7 "wheezy" on amd64.
pub fn debian_7_amd64() -> PlatformDescriptor {
    debian("debian-7-amd64", "wheezy", "amd64", "debian-7-x86_64", true)
}

/// Debian 7 "wheezy" on i386.
pub fn debian_7_i386() -> PlatformDescriptor {
    debian("debian-7-i386", "wheezy", "i386", "debian-7-i386", true)
}

/// Debian 8 "jessie" on amd64.
pub fn debian_8_amd64() -> PlatformDescriptor {
    debian("debian-8-amd64", "jessie", "amd64", "debian-8-x86_64", false)
}

/// Debian 8 "jessie" on i386.
pub fn debian_8_i386() -> PlatformDescriptor {
    debian("debian-8-i386", "jessie", "i386", "debian-8-i386", false)
}

/// Debian 9 "stretch" on amd64.
pub fn debian_9_amd64() -> PlatformDescriptor {
    debian("debian-9-amd64", "stretch", "amd64", "debian-9-x86_64", false)
}

/// Debian 9 "stretch" on i386.
pub fn debian_9_i386() -> PlatformDescriptor {
    debian("debian-9-i386", "stretch", "i386", "debian-9-i386", true)
}

/// Enterprise Linux 6 on amd64.
pub fn el_6_amd64() -> PlatformDescriptor {
    el("el-6-amd64", "amd64", "centos-6-x86_64")
}

/// Enterprise Linux 6 on i386.
pub fn el_6_i386() -> PlatformDescriptor {
    el("el-6-i386", "i386", "centos-6-i386")
}

/// Enterprise Linux 7 on amd64.
pub fn el_7_amd64() -> PlatformDescriptor {
    el("el-7-amd64", "amd64", "centos-7-x86_64")
}

/// Solaris 11 on amd64.
///
/// The image arrives pre-provisioned; only the IPS dependency template
/// applies. Its suffix keeps `pkg install` exit code 4 (nothing to do)
/// from failing the build.
pub fn solaris_11_amd64() -> PlatformDescriptor {
    PlatformDescriptor::new("solaris-11-amd64", OsFamily::Solaris, "amd64")
        .with_vm_image("solaris-11-x86_64")
        .with_dependency_install(
            DependencyInstall::new(IPS_DEPENDENCY_PREFIX).with_suffix(IPS_DEPENDENCY_SUFFIX),
        )
}

/// Every built-in descriptor, in catalog order.
pub fn all() -> Vec<PlatformDescriptor> {
    vec![
        debian_7_amd64(),
        debian_7_i386(),
        debian_8_amd64(),
        debian_8_i386(),
        debian_9_amd64(),
        debian_9_i386(),
        el_6_amd64(),
        el_6_i386(),
        el_7_amd64(),
        solaris_11_amd64(),
    ]
}

/// A registry pre-loaded with every built-in platform.
pub fn builtin_registry() -> PlatformRegistry {
    // Names in `all` are distinct by construction
    PlatformRegistry::from_distinct(all())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_ten_platforms() {
        assert_eq!(all().len(), 10);
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let platforms = all();
        for (index, platform) in platforms.iter().enumerate() {
            for other in &platforms[index + 1..] {
                assert_ne!(platform.name, other.name);
            }
        }
    }

    #[test]
    fn test_builtin_registry_lookup() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), 10);
        assert!(registry.lookup("debian-9-amd64").is_ok());
        assert!(registry.lookup("solaris-11-amd64").is_ok());
        assert!(registry.lookup("debian-10-amd64").is_err());
    }

    #[test]
    fn test_debian_codenames() {
        assert_eq!(debian_7_amd64().codename.as_deref(), Some("wheezy"));
        assert_eq!(debian_8_i386().codename.as_deref(), Some("jessie"));
        assert_eq!(debian_9_amd64().codename.as_deref(), Some("stretch"));
        assert_eq!(el_7_amd64().codename, None);
        assert_eq!(solaris_11_amd64().codename, None);
    }

    #[test]
    fn test_vm_images() {
        assert_eq!(
            debian_9_amd64().vm_image.as_deref(),
            Some("debian-9-x86_64")
        );
        assert_eq!(el_6_i386().vm_image.as_deref(), Some("centos-6-i386"));
        assert_eq!(
            solaris_11_amd64().vm_image.as_deref(),
            Some("solaris-11-x86_64")
        );
    }

    #[test]
    fn test_debian_dependency_templates_are_uneven() {
        assert!(debian_7_amd64().dependency_install.is_some());
        assert!(debian_7_i386().dependency_install.is_some());
        assert!(debian_9_i386().dependency_install.is_some());
        assert!(debian_8_amd64().dependency_install.is_none());
        assert!(debian_8_i386().dependency_install.is_none());
        assert!(debian_9_amd64().dependency_install.is_none());
    }

    #[test]
    fn test_el_dependency_command() {
        let template = el_7_amd64().dependency_install.unwrap();
        assert_eq!(
            template.command_for(&["createrepo", "rsync"]),
            "yum install --assumeyes createrepo rsync"
        );
    }

    #[test]
    fn test_solaris_dependency_command_tolerates_exit_4() {
        let template = solaris_11_amd64().dependency_install.unwrap();
        assert_eq!(
            template.command_for(&["gmake"]),
            "pkg install gmake || [[ $? -eq 4 ]]"
        );
    }

    #[test]
    fn test_solaris_has_no_provisioning() {
        assert!(solaris_11_amd64().provisioning.is_empty());
        assert_eq!(debian_7_amd64().provisioning.len(), 3);
        assert_eq!(el_6_amd64().provisioning.len(), 1);
    }

    #[test]
    fn test_go_arch_labels() {
        assert_eq!(
            debian_9_i386().normalize_architecture(GO_ARCH_LABELS),
            "386"
        );
        // amd64 is already the Go label
        assert_eq!(
            debian_9_amd64().normalize_architecture(GO_ARCH_LABELS),
            "amd64"
        );
    }
}
