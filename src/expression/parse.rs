//! Expression parser.
//!
//! Pulls tokens from a [`Lexer`] and builds a [`Tree`] by precedence
//! climbing. From loosest to tightest binding:
//!
//! ```text
//! c ? a : b    ||    &&    == != === !==    < > <= >=    + -    * / %    ! -    . [] ()
//! ```
pub mod tree;

use self::tree::Tree;
use crate::{
    expression::{
        eval::number,
        lex::{
            token::{Operator, Token},
            Lexer, TokenResult,
        },
    },
    log::{error_eof, Error, Kind, INVALID_SYNTAX, UNEXPECTED_TOKEN},
    region::Region,
};
use serde_json::Value;

pub struct Parser<'source> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source>,
    /// Store peeked tokens.
    ///
    /// Double option is used to remember when the next token is None.
    buffer: Option<Option<(Token, Region)>>,
}

impl<'source> Parser<'source> {
    /// Create a new [`Parser`] over the given expression.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            buffer: None,
        }
    }

    /// Parse the whole expression.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source is not a single, complete
    /// expression.
    pub fn parse(mut self) -> Result<Tree, Error> {
        let tree = self.parse_conditional()?;
        match self.next()? {
            Some((token, region)) => Err(self.error_unexpected(token, region)),
            None => Ok(tree),
        }
    }

    /// Parse `check ? then : otherwise`, or anything tighter.
    fn parse_conditional(&mut self) -> Result<Tree, Error> {
        let check = self.parse_or()?;
        if !self.next_is(Token::Question)? {
            return Ok(check);
        }
        self.next()?;
        let then = self.parse_conditional()?;
        self.next_must(Token::Colon)?;
        let otherwise = self.parse_conditional()?;

        Ok(Tree::Conditional(
            Box::new(check),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn parse_or(&mut self) -> Result<Tree, Error> {
        let mut left = self.parse_and()?;
        while self.next_is(Token::Or)? {
            self.next()?;
            left = Tree::Or(Box::new(left), Box::new(self.parse_and()?));
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Tree, Error> {
        let mut left = self.parse_binary(0)?;
        while self.next_is(Token::And)? {
            self.next()?;
            left = Tree::And(Box::new(left), Box::new(self.parse_binary(0)?));
        }

        Ok(left)
    }

    /// Parse a chain of [`Operator`] applications that bind tighter than
    /// `floor`.
    fn parse_binary(&mut self, floor: u8) -> Result<Tree, Error> {
        let mut left = self.parse_unary()?;
        while let Some(Token::Operator(operator)) = self.peek()? {
            let precedence = operator.precedence();
            if precedence <= floor {
                break;
            }
            self.next()?;
            let right = self.parse_binary(precedence)?;
            left = Tree::Binary(Box::new(left), operator, Box::new(right));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Tree, Error> {
        match self.peek()? {
            Some(Token::Exclamation) => {
                self.next()?;
                Ok(Tree::Not(Box::new(self.parse_unary()?)))
            }
            Some(Token::Operator(Operator::Subtract)) => {
                self.next()?;
                Ok(Tree::Negate(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Parse a primary expression followed by any number of member
    /// accesses, indexes and calls.
    fn parse_postfix(&mut self) -> Result<Tree, Error> {
        let mut tree = self.parse_primary()?;
        loop {
            tree = match self.peek()? {
                Some(Token::Period) => {
                    self.next()?;
                    let region = self.next_must(Token::Identifier)?;
                    Tree::Member(Box::new(tree), self.lexer.source[region].to_string())
                }
                Some(Token::LeftBracket) => {
                    self.next()?;
                    let index = self.parse_conditional()?;
                    self.next_must(Token::RightBracket)?;
                    Tree::Index(Box::new(tree), Box::new(index))
                }
                Some(Token::LeftParen) => {
                    self.next()?;
                    let arguments = self.parse_list(Token::RightParen)?;
                    Tree::Call(Box::new(tree), arguments)
                }
                _ => break,
            };
        }

        Ok(tree)
    }

    fn parse_primary(&mut self) -> Result<Tree, Error> {
        let (token, region) = self.next_any_must()?;
        let literal = &self.lexer.source[region];

        match token {
            Token::Number => parse_number(literal)
                .map(Tree::Literal)
                .ok_or_else(|| {
                    Error::build(Kind::Syntax, INVALID_SYNTAX)
                        .with_pointer(self.lexer.source, region)
                        .with_help(format!("`{literal}` is not a valid number"))
                }),
            Token::String => Ok(Tree::Literal(Value::String(unquote(literal)))),
            Token::True => Ok(Tree::Literal(Value::Bool(true))),
            Token::False => Ok(Tree::Literal(Value::Bool(false))),
            Token::Null => Ok(Tree::Literal(Value::Null)),
            Token::Identifier => Ok(Tree::Variable(literal.to_string())),
            Token::LeftParen => {
                let tree = self.parse_conditional()?;
                self.next_must(Token::RightParen)?;
                Ok(tree)
            }
            Token::LeftBracket => Ok(Tree::Array(self.parse_list(Token::RightBracket)?)),
            Token::LeftBrace => self.parse_object(),
            _ => Err(self.error_unexpected(token, region)),
        }
    }

    /// Parse the entries of an object literal, after the opening brace.
    ///
    /// Keys may be identifiers, strings or numbers. A bare identifier with no
    /// value, like `{ name }`, is shorthand for `{ name: name }`.
    fn parse_object(&mut self) -> Result<Tree, Error> {
        let mut entries = vec![];
        loop {
            let (token, region) = self.next_any_must()?;
            let literal = &self.lexer.source[region];
            let key = match token {
                Token::RightBrace => break,
                Token::Identifier
                | Token::Number
                | Token::True
                | Token::False
                | Token::Null => literal.to_string(),
                Token::String => unquote(literal),
                _ => return Err(self.error_unexpected(token, region)),
            };

            let value = if self.next_is(Token::Colon)? {
                self.next()?;
                self.parse_conditional()?
            } else if token == Token::Identifier {
                Tree::Variable(key.clone())
            } else {
                let (token, region) = self.next_any_must()?;
                return Err(self.error_unexpected(token, region));
            };
            entries.push((key, value));

            match self.next_any_must()? {
                (Token::Comma, _) => continue,
                (Token::RightBrace, _) => break,
                (token, region) => return Err(self.error_unexpected(token, region)),
            }
        }

        Ok(Tree::Object(entries))
    }

    /// Parse comma separated expressions up to and including `close`.
    ///
    /// A trailing comma is accepted.
    fn parse_list(&mut self, close: Token) -> Result<Vec<Tree>, Error> {
        let mut items = vec![];
        loop {
            if self.next_is(close)? {
                self.next()?;
                break;
            }
            items.push(self.parse_conditional()?);

            match self.next_any_must()? {
                (Token::Comma, _) => continue,
                (token, _) if token == close => break,
                (token, region) => return Err(self.error_unexpected(token, region)),
            }
        }

        Ok(items)
    }

    /// Return the next [`Token`] and [`Region`], preferring the buffer.
    fn next(&mut self) -> TokenResult {
        match self.buffer.take() {
            Some(buffered) => Ok(buffered),
            None => self.lexer.next(),
        }
    }

    /// Return the next [`Token`] without consuming it.
    fn peek(&mut self) -> Result<Option<Token>, Error> {
        if self.buffer.is_none() {
            self.buffer = Some(self.lexer.next()?);
        }

        Ok(self.buffer.flatten().map(|(token, _)| token))
    }

    /// Return true if the next [`Token`] is the given one.
    fn next_is(&mut self, token: Token) -> Result<bool, Error> {
        Ok(self.peek()? == Some(token))
    }

    /// Return the next [`Token`] and [`Region`], failing at the end of
    /// source.
    fn next_any_must(&mut self) -> Result<(Token, Region), Error> {
        self.next()?.ok_or_else(|| error_eof(self.lexer.source))
    }

    /// Consume the next [`Token`], which must be the given one, and return
    /// its [`Region`].
    fn next_must(&mut self, expect: Token) -> Result<Region, Error> {
        let (token, region) = self.next_any_must()?;
        if token != expect {
            return Err(self
                .error_unexpected(token, region)
                .with_help(format!("expected {expect}, found {token}")));
        }

        Ok(region)
    }

    fn error_unexpected(&self, token: Token, region: Region) -> Error {
        Error::build(Kind::Syntax, UNEXPECTED_TOKEN)
            .with_pointer(self.lexer.source, region)
            .with_help(format!("{token} is not expected here"))
    }
}

/// Parse a number literal, ignoring `_` separators.
fn parse_number(literal: &str) -> Option<Value> {
    literal.replace('_', "").parse::<f64>().ok().map(number)
}

/// Remove the surrounding quotes of a string literal and resolve escapes.
fn unquote(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut buffer = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(char) = chars.next() {
        if char != '\\' {
            buffer.push(char);
            continue;
        }
        match chars.next() {
            Some('n') => buffer.push('\n'),
            Some('t') => buffer.push('\t'),
            Some('r') => buffer.push('\r'),
            Some('0') => buffer.push('\0'),
            Some(other) => buffer.push(other),
            None => buffer.push('\\'),
        }
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::{tree::Tree, Parser};
    use crate::expression::lex::token::Operator;
    use serde_json::json;

    fn var(name: &str) -> Box<Tree> {
        Box::new(Tree::Variable(name.to_string()))
    }

    fn lit(value: serde_json::Value) -> Box<Tree> {
        Box::new(Tree::Literal(value))
    }

    #[test]
    fn test_parse_precedence() {
        let tree = Parser::new("a + b * 2").parse().unwrap();

        assert_eq!(
            tree,
            Tree::Binary(
                var("a"),
                Operator::Add,
                Box::new(Tree::Binary(var("b"), Operator::Multiply, lit(json!(2))))
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        let tree = Parser::new("10 - 4 - 3").parse().unwrap();

        assert_eq!(
            tree,
            Tree::Binary(
                Box::new(Tree::Binary(lit(json!(10)), Operator::Subtract, lit(json!(4)))),
                Operator::Subtract,
                lit(json!(3))
            )
        );
    }

    #[test]
    fn test_parse_ternary_and_logic() {
        let tree = Parser::new("a && !b ? 'yes' : 'no'").parse().unwrap();

        assert_eq!(
            tree,
            Tree::Conditional(
                Box::new(Tree::And(var("a"), Box::new(Tree::Not(var("b"))))),
                lit(json!("yes")),
                lit(json!("no"))
            )
        );
    }

    #[test]
    fn test_parse_postfix_chain() {
        let tree = Parser::new("format(user.tags[0], 'x')").parse().unwrap();

        assert_eq!(
            tree,
            Tree::Call(
                var("format"),
                vec![
                    Tree::Index(
                        Box::new(Tree::Member(var("user"), "tags".to_string())),
                        lit(json!(0))
                    ),
                    Tree::Literal(json!("x")),
                ]
            )
        );
    }

    #[test]
    fn test_parse_object_literal() {
        let tree = Parser::new("{ title: 'Home', \"count\": 2, user }").parse().unwrap();

        assert_eq!(
            tree,
            Tree::Object(vec![
                ("title".to_string(), Tree::Literal(json!("Home"))),
                ("count".to_string(), Tree::Literal(json!(2))),
                ("user".to_string(), Tree::Variable("user".to_string())),
            ])
        );
    }

    #[test]
    fn test_parse_array_trailing_comma() {
        let tree = Parser::new("[1, 'two',]").parse().unwrap();

        assert_eq!(
            tree,
            Tree::Array(vec![Tree::Literal(json!(1)), Tree::Literal(json!("two"))])
        );
    }

    #[test]
    fn test_parse_escapes() {
        let tree = Parser::new(r#""line\none \"quoted\"""#).parse().unwrap();

        assert_eq!(tree, Tree::Literal(json!("line\none \"quoted\"")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Parser::new("a +").parse().is_err());
        assert!(Parser::new("(a").parse().is_err());
        assert!(Parser::new("a b").parse().is_err());
        assert!(Parser::new("a ? b").parse().is_err());
        assert!(Parser::new("").parse().is_err());
    }
}
