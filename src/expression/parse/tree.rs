use crate::expression::lex::token::Operator;
use serde_json::Value;

/// A parsed expression.
#[derive(Debug, PartialEq, Clone)]
pub enum Tree {
    /// A literal string, number, boolean or null.
    Literal(Value),
    /// A name bound in the data, such as `user`.
    Variable(String),
    /// An array literal, `[a, b]`.
    Array(Vec<Tree>),
    /// An object literal, `{ key: value }`.
    Object(Vec<(String, Tree)>),
    /// Named member access, `receiver.name`.
    Member(Box<Tree>, String),
    /// Computed member access, `receiver[index]`.
    Index(Box<Tree>, Box<Tree>),
    /// A call with arguments, `callee(a, b)`.
    Call(Box<Tree>, Vec<Tree>),
    /// `!operand`.
    Not(Box<Tree>),
    /// `-operand`.
    Negate(Box<Tree>),
    /// `left <operator> right`.
    Binary(Box<Tree>, Operator, Box<Tree>),
    /// `left && right`, evaluates to one of its operands.
    And(Box<Tree>, Box<Tree>),
    /// `left || right`, evaluates to one of its operands.
    Or(Box<Tree>, Box<Tree>),
    /// `check ? then : otherwise`.
    Conditional(Box<Tree>, Box<Tree>, Box<Tree>),
}
