//! Layered build settings with lazy derived values
//!
//! A `SettingsStore` holds the key/value configuration a build plan is
//! resolved against. Values live in one of three fixed scopes; a read
//! consults them in precedence order (component-local, then project, then
//! platform defaults) and returns the first hit.
//!
//! # Design
//!
//! - **Two value kinds**: plain literals, and derived values computed from
//!   other settings by a closure
//! - **Lazy**: a derived value runs only when something reads it
//! - **Memoized**: each derived value is computed at most once per store,
//!   unless the scope layering changes underneath it
//! - **Cycle-safe**: derivations that read each other in a loop fail with
//!   the full reference chain instead of recursing forever

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::types::SettingScope;

/// Closure type for derived settings.
///
/// Runs against the store it is defined in, so it can read other settings
/// (including other derived ones). `Send + Sync` so specs holding these
/// can be shared across resolver threads.
pub type DeriveFn =
    Arc<dyn Fn(&SettingsStore) -> Result<String, SettingsError> + Send + Sync>;

/// Errors raised by setting resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// No scope defines the requested key
    #[error("setting '{key}' is not defined in any scope")]
    Undefined { key: String },

    /// Derived values reference each other in a loop
    #[error("cyclic derivation while resolving '{key}' ({chain})")]
    Cycle { key: String, chain: String },
}

/// A single setting definition: either a literal or a deferred computation.
#[derive(Clone)]
pub enum SettingValue {
    /// Fixed string value
    Literal(String),
    /// Computed from other settings when first read
    Derived(DeriveFn),
}

impl SettingValue {
    /// Create a literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a derived value from a closure.
    pub fn derived<F>(thunk: F) -> Self
    where
        F: Fn(&SettingsStore) -> Result<String, SettingsError> + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(thunk))
    }
}

impl fmt::Debug for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(<thunk>)"),
        }
    }
}

/// Layered setting store for one (project, platform) resolution.
///
/// Mutation (defining keys, swapping the component overlay) requires
/// `&mut self`; reads go through `resolve` and share `&self`. The memo
/// cache and the cycle-detection stack use interior mutability so that
/// resolution stays a `&self` operation.
#[derive(Debug, Default)]
pub struct SettingsStore {
    platform: HashMap<String, SettingValue>,
    project: HashMap<String, SettingValue>,
    component: HashMap<String, SettingValue>,
    /// Memoized results of derived values
    resolved: RefCell<HashMap<String, String>>,
    /// Keys currently being derived, outermost first
    resolving: RefCell<Vec<String>>,
}

impl SettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a literal setting in the given scope.
    pub fn define(&mut self, scope: SettingScope, key: impl Into<String>, value: impl Into<String>) {
        self.define_value(scope, key, SettingValue::Literal(value.into()));
    }

    /// Define a derived setting in the given scope.
    pub fn define_derived<F>(&mut self, scope: SettingScope, key: impl Into<String>, thunk: F)
    where
        F: Fn(&SettingsStore) -> Result<String, SettingsError> + Send + Sync + 'static,
    {
        self.define_value(scope, key, SettingValue::Derived(Arc::new(thunk)));
    }

    /// Define a setting from an already-built `SettingValue`.
    ///
    /// Redefining a key replaces the previous definition in that scope and
    /// drops memoized results, which may have read the old value.
    pub fn define_value(&mut self, scope: SettingScope, key: impl Into<String>, value: SettingValue) {
        self.resolved.borrow_mut().clear();
        self.scope_map_mut(scope).insert(key.into(), value);
    }

    /// Replace the component-local overlay for the component being resolved.
    ///
    /// Cached derivations may have read keys the overlay shadows (or keys a
    /// previous overlay provided), so any change to a non-empty overlay
    /// drops the memo cache. Swapping one empty overlay for another keeps
    /// it, which preserves compute-once across components without local
    /// settings.
    pub fn set_component_scope(&mut self, entries: &[(String, SettingValue)]) {
        if !self.component.is_empty() || !entries.is_empty() {
            self.resolved.borrow_mut().clear();
        }
        self.component.clear();
        for (key, value) in entries {
            self.component.insert(key.clone(), value.clone());
        }
    }

    /// Remove the component-local overlay.
    pub fn clear_component_scope(&mut self) {
        self.set_component_scope(&[]);
    }

    /// Find the definition for a key, honoring scope precedence.
    pub fn lookup(&self, key: &str) -> Option<&SettingValue> {
        self.component
            .get(key)
            .or_else(|| self.project.get(key))
            .or_else(|| self.platform.get(key))
    }

    /// Which scope currently supplies this key, if any.
    pub fn scope_of(&self, key: &str) -> Option<SettingScope> {
        if self.component.contains_key(key) {
            Some(SettingScope::ComponentLocal)
        } else if self.project.contains_key(key) {
            Some(SettingScope::Project)
        } else if self.platform.contains_key(key) {
            Some(SettingScope::PlatformDefault)
        } else {
            None
        }
    }

    /// Check whether any scope defines the key.
    pub fn is_defined(&self, key: &str) -> bool {
        self.scope_of(key).is_some()
    }

    /// Resolve a key to its final string value.
    ///
    /// Literals are returned as-is. Derived values run their closure on
    /// first read and are memoized afterwards.
    ///
    /// # Errors
    ///
    /// - `SettingsError::Undefined` if no scope defines the key
    /// - `SettingsError::Cycle` if the derivation re-enters itself,
    ///   directly or through other derived settings
    pub fn resolve(&self, key: &str) -> Result<String, SettingsError> {
        match self.lookup(key) {
            None => Err(SettingsError::Undefined {
                key: key.to_string(),
            }),
            Some(SettingValue::Literal(value)) => Ok(value.clone()),
            Some(SettingValue::Derived(thunk)) => {
                if let Some(cached) = self.resolved.borrow().get(key) {
                    return Ok(cached.clone());
                }
                if self.resolving.borrow().iter().any(|entry| entry == key) {
                    return Err(SettingsError::Cycle {
                        key: key.to_string(),
                        chain: self.cycle_chain(key),
                    });
                }

                let thunk = Arc::clone(thunk);
                self.resolving.borrow_mut().push(key.to_string());
                let outcome = thunk(self);
                self.resolving.borrow_mut().pop();

                let value = outcome?;
                self.resolved
                    .borrow_mut()
                    .insert(key.to_string(), value.clone());
                Ok(value)
            }
        }
    }

    /// All defined keys across every scope, sorted.
    pub fn keys(&self) -> BTreeSet<String> {
        self.platform
            .keys()
            .chain(self.project.keys())
            .chain(self.component.keys())
            .cloned()
            .collect()
    }

    /// Resolve every defined key into a sorted map.
    ///
    /// Strict: the first failing derivation fails the whole snapshot.
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        let mut snapshot = BTreeMap::new();
        for key in self.keys() {
            let value = self.resolve(&key)?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    fn scope_map_mut(&mut self, scope: SettingScope) -> &mut HashMap<String, SettingValue> {
        match scope {
            SettingScope::PlatformDefault => &mut self.platform,
            SettingScope::Project => &mut self.project,
            SettingScope::ComponentLocal => &mut self.component,
        }
    }

    /// Render the reference chain for a cycle report, e.g. `a -> b -> a`.
    fn cycle_chain(&self, key: &str) -> String {
        let stack = self.resolving.borrow();
        let start = stack.iter().position(|entry| entry == key).unwrap_or(0);
        let mut chain: Vec<&str> = stack[start..].iter().map(String::as_str).collect();
        chain.push(key);
        chain.join(" -> ")
    }
}
