//! Resolution of the expressions found inside `{{ }}`, `{{{ }}}`, `if(..)`,
//! `var` and directive parameters.
//!
//! An expression is resolved by the first of these that succeeds:
//!
//! 1. A dot separated path into the data, like `user.name`, that points to a
//!    value other than `null`.
//! 2. A whole expression plugin call like `uppercase(name)`. Arguments are
//!    split on commas and resolved one at a time, see [`crate::plugin`].
//! 3. Evaluation as a general expression, with every top level name in the
//!    data bound as an identifier.
//!
//! Failures never propagate. An expression that cannot be resolved is logged
//! and treated as absent.
pub mod eval;
pub mod lex;
pub mod parse;

use self::{eval::Evaluator, parse::Parser};
use crate::{
    log::Error,
    plugin::Registry,
    store::{path, Lookup},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Matches a plugin call spanning the whole expression.
static CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([A-Za-z_$][\w$]*)\s*\((.*)\)$").expect("valid call pattern"));

/// Parse and evaluate the expression.
///
/// # Errors
///
/// Returns an [`Error`] if the expression cannot be parsed or evaluated.
pub fn evaluate(source: &str, lookup: &dyn Lookup, plugins: &Registry) -> Result<Value, Error> {
    let tree = Parser::new(source).parse()?;

    Evaluator::new(lookup, plugins).evaluate(&tree)
}

/// Resolve the expression, returning `None` when every strategy fails or
/// the result is `null`.
pub fn resolve(source: &str, lookup: &dyn Lookup, plugins: &Registry) -> Option<Value> {
    let source = source.trim();
    if let Some(value) = path(lookup, source).filter(|value| !value.is_null()) {
        return Some(value.clone());
    }
    if let Some(value) = dispatch(source, lookup, plugins) {
        return Some(value);
    }

    match evaluate(source, lookup, plugins) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(error) => {
            tracing::debug!(expression = source, %error, "expression failed, rendering empty");
            None
        }
    }
}

/// Call a registered plugin when the whole expression looks like
/// `name(args)`.
///
/// Arguments are split on every comma. A nested call is resolved first, then
/// a path into the data, and otherwise the trimmed text is passed as a string.
fn dispatch(source: &str, lookup: &dyn Lookup, plugins: &Registry) -> Option<Value> {
    let captures = CALL.captures(source)?;
    let name = captures.get(1)?.as_str();
    let plugin = plugins.get(name)?;

    let inner = captures.get(2).map_or("", |m| m.as_str());
    let arguments = if inner.trim().is_empty() {
        vec![]
    } else {
        inner
            .split(',')
            .map(|argument| resolve_argument(argument.trim(), lookup, plugins))
            .collect()
    };

    match plugin.call(&arguments) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::debug!(plugin = name, %error, "plugin failed");
            None
        }
    }
}

fn resolve_argument(argument: &str, lookup: &dyn Lookup, plugins: &Registry) -> Value {
    if let Some(value) = dispatch(argument, lookup, plugins) {
        return value;
    }
    match path(lookup, argument).filter(|value| !value.is_null()) {
        Some(value) => value.clone(),
        None => Value::String(argument.to_string()),
    }
}
