//! Contains the [`Plugin`] trait, and types useful for creating plugins.
//!
//! A `Plugin` is a named, user-defined function that a view can call from
//! inside an interpolation. Any struct that implements the [`Plugin`] trait,
//! or function matching the [`call`][`Plugin::call`] method, can be
//! registered on an [`Engine`][`crate::Engine`].
//!
//! ```html
//! <h1>{{ uppercase(title) }}</h1>
//! ```
//!
//! When the call site is the whole expression, each argument is resolved on
//! its own. A nested call like `trim(name)` is resolved recursively, a name
//! that exists in the data is replaced by its value, and anything else is
//! passed through as the literal, trimmed text. No numeric or boolean
//! conversion happens, so `repeat(name, 3)` receives the string `"3"`.
//!
//! Arguments are split on every comma, without regard to quotes or nested
//! parentheses. When a call appears inside a larger expression, such as
//! `uppercase(title) + "!"`, it is evaluated like any other expression and
//! its arguments are typed values.
//!
//! A plugin that returns an [`Error`] never aborts a render. The failure is
//! logged and the interpolation renders as an empty string.
//!
//! # Examples
//!
//! ```
//! use vellum::{
//!     plugin::{serde::{json, Value}, Error},
//!     Engine, Kind,
//! };
//!
//! fn uppercase(args: &[Value]) -> Result<Value, Error> {
//!     match args.first() {
//!         Some(Value::String(text)) => Ok(json!(text.to_uppercase())),
//!         _ => Err(Error::build(Kind::Plugin, "plugin `uppercase` requires string input")),
//!     }
//! }
//!
//! let engine = Engine::default().with_plugin_must("uppercase", uppercase);
//! assert!(engine.get_plugin("uppercase").is_some());
//! ```

pub mod serde {
    //! Contains types from `serde_json`.
    pub use serde_json::*;
}

pub use crate::log::Error;

use serde_json::Value;
use std::collections::HashMap;

/// Describes a type which can be called from an expression.
pub trait Plugin: Sync + Send {
    /// Execute the plugin with the given arguments and return a new Value.
    fn call(&self, args: &[Value]) -> Result<Value, Error>;
}

/// Allows registering any function matching the signature of `call` as a
/// [`Plugin`], instead of requiring a struct be created.
impl<F> Plugin for F
where
    F: Fn(&[Value]) -> Result<Value, Error> + Sync + Send,
{
    fn call(&self, args: &[Value]) -> Result<Value, Error> {
        self(args)
    }
}

/// Storage for the plugins known to an [`Engine`][`crate::Engine`].
#[derive(Default)]
pub struct Registry {
    plugins: HashMap<String, Box<dyn Plugin>>,
}

impl Registry {
    /// Create an empty [`Registry`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the plugin under the given name, replacing any previous one.
    #[inline]
    pub fn insert(&mut self, name: &str, plugin: Box<dyn Plugin>) {
        self.plugins.insert(name.to_string(), plugin);
    }

    /// Return true if a plugin with the given name exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Return the plugin with the given name, if any.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|plugin| plugin.as_ref())
    }

    /// Return the number of registered plugins.
    #[inline]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Return true if no plugins are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.plugins.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Plugin, Registry};
    use crate::log::{Error, Kind};
    use serde_json::{json, Value};

    struct Counter;

    impl Plugin for Counter {
        fn call(&self, args: &[Value]) -> Result<Value, Error> {
            Ok(json!(args.len()))
        }
    }

    fn fail(_: &[Value]) -> Result<Value, Error> {
        Err(Error::build(Kind::Plugin, "always fails"))
    }

    #[test]
    fn test_struct_and_function_plugins() {
        let mut registry = Registry::new();
        registry.insert("count", Box::new(Counter));
        registry.insert("fail", Box::new(fail));

        let count = registry.get("count").unwrap();
        assert_eq!(count.call(&[json!(1), json!(2)]).unwrap(), json!(2));
        assert!(registry.get("fail").unwrap().call(&[]).is_err());
        assert!(registry.get("ghost").is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = Registry::new();
        registry.insert("p", Box::new(|_: &[Value]| Ok::<_, Error>(json!("a"))));
        registry.insert("p", Box::new(|_: &[Value]| Ok::<_, Error>(json!("b"))));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("p").unwrap().call(&[]).unwrap(), json!("b"));
    }
}
