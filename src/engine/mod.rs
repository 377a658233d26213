//! Engine modules that turn specification data into build plans.
//!
//! The engine layer sits between specification data (platforms, components,
//! projects) and whatever executes a build. It generates ordered, validated
//! build plans and never performs I/O itself.

pub mod plan;
pub mod resolver;
