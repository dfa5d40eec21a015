use super::{lex::token::Operator, parse::tree::Tree};
use crate::{
    log::{Error, Kind, INCOMPATIBLE_TYPES},
    pipe::stringify,
    plugin::Registry,
    store::Lookup,
};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// Evaluates a [`Tree`] against the data in a [`Lookup`].
///
/// Every top level name in the lookup is an identifier, and every plugin in
/// the [`Registry`] is a callable function.
pub struct Evaluator<'a> {
    lookup: &'a dyn Lookup,
    plugins: &'a Registry,
}

impl<'a> Evaluator<'a> {
    #[inline]
    pub fn new(lookup: &'a dyn Lookup, plugins: &'a Registry) -> Self {
        Self { lookup, plugins }
    }

    /// Evaluate the [`Tree`] to a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a name is undefined, a member of `null` is
    /// read, something that is not a plugin is called, or a plugin fails.
    pub fn evaluate(&self, tree: &Tree) -> Result<Value, Error> {
        match tree {
            Tree::Literal(value) => Ok(value.clone()),
            Tree::Variable(name) => self
                .lookup
                .get(name)
                .cloned()
                .ok_or_else(|| error_eval(format!("`{name}` is not defined"))),
            Tree::Array(items) => items
                .iter()
                .map(|item| self.evaluate(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Tree::Object(entries) => {
                let mut object = Map::new();
                for (key, value) in entries {
                    object.insert(key.clone(), self.evaluate(value)?);
                }
                Ok(Value::Object(object))
            }
            Tree::Member(receiver, name) => member(&self.evaluate(receiver)?, name),
            Tree::Index(receiver, index) => {
                index_value(&self.evaluate(receiver)?, &self.evaluate(index)?)
            }
            Tree::Call(callee, arguments) => self.evaluate_call(callee, arguments),
            Tree::Not(operand) => Ok(Value::Bool(!is_truthy(&self.evaluate(operand)?))),
            Tree::Negate(operand) => Ok(number(-to_number(&self.evaluate(operand)?))),
            Tree::Binary(left, operator, right) => Ok(apply(
                &self.evaluate(left)?,
                *operator,
                &self.evaluate(right)?,
            )),
            Tree::And(left, right) => {
                let left = self.evaluate(left)?;
                if is_truthy(&left) {
                    self.evaluate(right)
                } else {
                    Ok(left)
                }
            }
            Tree::Or(left, right) => {
                let left = self.evaluate(left)?;
                if is_truthy(&left) {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Tree::Conditional(check, then, otherwise) => {
                if is_truthy(&self.evaluate(check)?) {
                    self.evaluate(then)
                } else {
                    self.evaluate(otherwise)
                }
            }
        }
    }

    /// Evaluate a call to a plugin, or to a method on a value.
    fn evaluate_call(&self, callee: &Tree, arguments: &[Tree]) -> Result<Value, Error> {
        let arguments = arguments
            .iter()
            .map(|argument| self.evaluate(argument))
            .collect::<Result<Vec<_>, _>>()?;

        match callee {
            Tree::Variable(name) => match self.plugins.get(name) {
                Some(plugin) => plugin.call(&arguments),
                None => Err(error_eval(format!("`{name}` is not a function"))
                    .with_help("register it with `.add_plugin`")),
            },
            Tree::Member(receiver, method) => {
                call_method(&self.evaluate(receiver)?, method, &arguments)
            }
            _ => Err(error_eval("expression is not callable")),
        }
    }
}

/// Return true if the given [`Value`] is truthy.
///
/// `false`, `0`, `""` and `null` are falsy. Arrays and objects are always
/// truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(bool) => *bool,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(string) => !string.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

/// Convert an `f64` into a [`Value`].
///
/// Whole numbers are stored as integers so they render without a fraction.
/// Results that are not finite become `null`.
pub fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

/// Coerce a [`Value`] to a number, yielding `NaN` when there is no sensible
/// conversion.
fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::Bool(bool) => f64::from(u8::from(*bool)),
        Value::Null => 0.0,
        Value::String(string) if string.trim().is_empty() => 0.0,
        Value::String(string) => string.trim().parse().unwrap_or(f64::NAN),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Apply the [`Operator`] to the two values.
fn apply(left: &Value, operator: Operator, right: &Value) -> Value {
    match operator {
        Operator::Add if is_textual(left) || is_textual(right) => {
            Value::String(format!("{}{}", concat_text(left), concat_text(right)))
        }
        Operator::Add => number(to_number(left) + to_number(right)),
        Operator::Subtract => number(to_number(left) - to_number(right)),
        Operator::Multiply => number(to_number(left) * to_number(right)),
        Operator::Divide => number(to_number(left) / to_number(right)),
        Operator::Remainder => number(to_number(left) % to_number(right)),
        Operator::Equal => Value::Bool(loose_equal(left, right)),
        Operator::NotEqual => Value::Bool(!loose_equal(left, right)),
        Operator::StrictEqual => Value::Bool(strict_equal(left, right)),
        Operator::StrictNotEqual => Value::Bool(!strict_equal(left, right)),
        Operator::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        Operator::Lesser => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        Operator::GreaterOrEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        Operator::LesserOrEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
    }
}

/// Return true if `+` treats the value as text.
fn is_textual(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Array(_) | Value::Object(_))
}

/// Return the text of a value being concatenated, `null` included.
fn concat_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => stringify(other),
    }
}

/// Compare two values of the same type, or two values that both convert to
/// numbers.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        (left, right) => to_number(left).partial_cmp(&to_number(right)),
    }
}

fn strict_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
        (left, right) => left == right,
    }
}

/// Equality that converts between numbers, strings and booleans.
fn loose_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(_), Value::String(_) | Value::Bool(_))
        | (Value::String(_) | Value::Bool(_), Value::Number(_))
        | (Value::String(_), Value::Bool(_))
        | (Value::Bool(_), Value::String(_)) => to_number(left) == to_number(right),
        (left, right) => strict_equal(left, right),
    }
}

/// Read a named member of a value.
fn member(value: &Value, name: &str) -> Result<Value, Error> {
    match (value, name) {
        (Value::Null, _) => Err(error_eval(format!("cannot read `{name}` of null"))),
        (Value::Object(object), _) => Ok(object.get(name).cloned().unwrap_or(Value::Null)),
        (Value::Array(array), "length") => Ok(Value::from(array.len())),
        (Value::String(string), "length") => Ok(Value::from(string.chars().count())),
        _ => Ok(Value::Null),
    }
}

/// Read a computed member of a value, `value[index]`.
fn index_value(value: &Value, index: &Value) -> Result<Value, Error> {
    match (value, index) {
        (Value::Null, _) => Err(error_eval(format!("cannot read `{index}` of null"))),
        (Value::Array(array), Value::Number(number)) => Ok(number
            .as_u64()
            .and_then(|i| array.get(i as usize))
            .cloned()
            .unwrap_or(Value::Null)),
        (Value::String(string), Value::Number(number)) => Ok(number
            .as_u64()
            .and_then(|i| string.chars().nth(i as usize))
            .map_or(Value::Null, |c| Value::String(c.to_string()))),
        (value, index) => member(value, &stringify(index)),
    }
}

/// Call one of the built in methods on a value.
fn call_method(value: &Value, method: &str, arguments: &[Value]) -> Result<Value, Error> {
    let result = match (value, method) {
        (Value::String(string), "toUpperCase") => Value::String(string.to_uppercase()),
        (Value::String(string), "toLowerCase") => Value::String(string.to_lowercase()),
        (Value::String(string), "trim") => Value::String(string.trim().to_string()),
        (Value::String(string), "includes") => Value::Bool(
            arguments
                .first()
                .is_some_and(|needle| string.contains(&stringify(needle))),
        ),
        (Value::Array(array), "includes") => Value::Bool(
            arguments
                .first()
                .is_some_and(|needle| array.iter().any(|item| strict_equal(item, needle))),
        ),
        (Value::Array(array), "join") => {
            let separator = arguments.first().map_or(",".to_string(), stringify);
            Value::String(
                array
                    .iter()
                    .map(stringify)
                    .collect::<Vec<_>>()
                    .join(&separator),
            )
        }
        (Value::Null, _) => {
            return Err(error_eval(format!("cannot read `{method}` of null")));
        }
        (value, "toString") => Value::String(stringify(value)),
        _ => {
            return Err(Error::build(Kind::Syntax, INCOMPATIBLE_TYPES)
                .with_help(format!("`{method}` is not a function on `{value}`")))
        }
    };

    Ok(result)
}

fn error_eval<T>(help: T) -> Error
where
    T: Into<String>,
{
    Error::build(Kind::Syntax, "unable to evaluate expression").with_help(help)
}
