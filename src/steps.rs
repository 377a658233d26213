//! Shell-step helpers for component recipes
//!
//! Recipes emit plain command strings; these helpers format the handful of
//! commands almost every recipe needs, so fixtures and downstream specs
//! agree on the exact text. Nothing here executes anything.

/// Create a directory and its parents.
pub fn mkdir_p(path: impl AsRef<str>) -> String {
    format!("mkdir -p {}", path.as_ref())
}

/// Install one file with an explicit mode.
pub fn install_file(source: impl AsRef<str>, dest: impl AsRef<str>, mode: &str) -> String {
    format!("install -m {} {} {}", mode, source.as_ref(), dest.as_ref())
}

/// Unpack a gzipped tarball into a directory.
pub fn unpack(archive: impl AsRef<str>, dest: impl AsRef<str>) -> String {
    format!("tar -xzf {} -C {}", archive.as_ref(), dest.as_ref())
}
