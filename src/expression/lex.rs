pub mod token;

use self::token::{Operator, Token};
use crate::{
    log::{Error, Kind, INVALID_SYNTAX, UNEXPECTED_TOKEN},
    region::Region,
};

pub type TokenResult = Result<Option<(Token, Region)>, Error>;

/// Provides methods to read an expression as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    cursor: usize,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] over the given expression.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self { source, cursor: 0 }
    }

    /// Return the next [`Token`] and [`Region`], skipping whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character is found.
    pub fn next(&mut self) -> TokenResult {
        let from = self.cursor;
        let mut iterator = self.source[from..]
            .char_indices()
            .map(|(d, c)| (from + d, c))
            .skip_while(|(_, c)| c.is_whitespace());

        let Some((index, char)) = iterator.next() else {
            self.cursor = self.source.len();
            return Ok(None);
        };

        let mut advance = |length: usize, token: Token| {
            self.cursor = index + length;

            Ok(Some((token, (index..index + length).into())))
        };

        match char {
            '(' => advance(1, Token::LeftParen),
            ')' => advance(1, Token::RightParen),
            '[' => advance(1, Token::LeftBracket),
            ']' => advance(1, Token::RightBracket),
            '{' => advance(1, Token::LeftBrace),
            '}' => advance(1, Token::RightBrace),
            ',' => advance(1, Token::Comma),
            ':' => advance(1, Token::Colon),
            '?' => advance(1, Token::Question),
            '+' => advance(1, Token::Operator(Operator::Add)),
            '-' => advance(1, Token::Operator(Operator::Subtract)),
            '*' => advance(1, Token::Operator(Operator::Multiply)),
            '/' => advance(1, Token::Operator(Operator::Divide)),
            '%' => advance(1, Token::Operator(Operator::Remainder)),
            '.' if !self.source[index + 1..].starts_with(|c: char| c.is_ascii_digit()) => {
                advance(1, Token::Period)
            }
            '"' | '\'' => self.lex_string(iterator, index, char),
            '=' | '!' | '>' | '<' | '|' | '&' => self.lex_operator(index, char),
            c if c.is_ascii_digit() || c == '.' => Ok(Some(self.lex_digit(iterator, index))),
            c if is_ident_start(c) => Ok(Some(self.lex_ident_or_keyword(iterator, index))),
            _ => Err(Error::build(Kind::Syntax, UNEXPECTED_TOKEN)
                .with_pointer(self.source, index..index + char.len_utf8())
                .with_help(format!("`{char}` is not valid inside an expression"))),
        }
    }

    /// Return a [`Token`] and [`Region`] for an operator beginning with the
    /// given character.
    ///
    /// All of these are recognized:
    ///
    /// `===`, `!==`, `==`, `!=`, `>=`, `<=`, `||`, `&&`, `>`, `<`, `!`
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] for a lone `=`, `|` or `&`.
    fn lex_operator(&mut self, from: usize, first: char) -> TokenResult {
        let rest = &self.source[from..];
        let (length, token) = if rest.starts_with("===") {
            (3, Token::Operator(Operator::StrictEqual))
        } else if rest.starts_with("!==") {
            (3, Token::Operator(Operator::StrictNotEqual))
        } else if rest.starts_with("==") {
            (2, Token::Operator(Operator::Equal))
        } else if rest.starts_with("!=") {
            (2, Token::Operator(Operator::NotEqual))
        } else if rest.starts_with(">=") {
            (2, Token::Operator(Operator::GreaterOrEqual))
        } else if rest.starts_with("<=") {
            (2, Token::Operator(Operator::LesserOrEqual))
        } else if rest.starts_with("||") {
            (2, Token::Or)
        } else if rest.starts_with("&&") {
            (2, Token::And)
        } else {
            match first {
                '>' => (1, Token::Operator(Operator::Greater)),
                '<' => (1, Token::Operator(Operator::Lesser)),
                '!' => (1, Token::Exclamation),
                _ => {
                    return Err(Error::build(Kind::Syntax, UNEXPECTED_TOKEN)
                        .with_pointer(self.source, from..from + 1)
                        .with_help(format!(
                            "expected operator like `==`, `||`, `&&`, found `{first}`"
                        )))
                }
            }
        };
        self.cursor = from + length;

        Ok(Some((token, (from..self.cursor).into())))
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Number`].
    fn lex_digit<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !is_number(char) => {
                    self.cursor = index;

                    break (Token::Number, (from..index).into());
                }
                Some(_) => continue,
                None => {
                    self.cursor = self.source.len();

                    break (Token::Number, (from..self.source.len()).into());
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::String`].
    ///
    /// The region includes both quotes.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the string is never closed.
    fn lex_string<T>(&mut self, iter: T, from: usize, quote: char) -> TokenResult
    where
        T: Iterator<Item = (usize, char)>,
    {
        let mut escaped = false;
        for (index, char) in iter {
            match char {
                '\\' if !escaped => escaped = true,
                c if c == quote && !escaped => {
                    let to = index + 1;
                    self.cursor = to;

                    return Ok(Some((Token::String, (from..to).into())));
                }
                _ => escaped = false,
            }
        }

        Err(Error::build(Kind::Syntax, INVALID_SYNTAX)
            .with_pointer(self.source, from..self.source.len())
            .with_help(format!(
                "this might be an undelimited string, try closing it with `{quote}`"
            )))
    }

    /// Return a [`Token`] and [`Region`] from the given iterator.
    ///
    /// The `Token` will be [`Token::Identifier`] or a literal keyword.
    fn lex_ident_or_keyword<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        let to = iter
            .find(|(_, c)| !is_ident_continue(*c))
            .map_or(self.source.len(), |(index, _)| index);
        self.cursor = to;

        let token = match &self.source[from..to] {
            "true" => Token::True,
            "false" => Token::False,
            "null" | "undefined" => Token::Null,
            _ => Token::Identifier,
        };

        (token, (from..to).into())
    }
}

/// Return true if the given character may begin an identifier.
fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character may continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}

/// Return true if the given character is part of a number literal.
fn is_number(c: char) -> bool {
    matches!(c, '0'..='9' | '.' | '_')
}

#[cfg(test)]
mod tests {
    use super::{
        token::{Operator, Token},
        Lexer,
    };
    use crate::region::Region;

    #[test]
    fn test_lex_ident() {
        helper_lex_all("user", vec![(Token::Identifier, 0..4)]);
    }

    #[test]
    fn test_lex_member_access() {
        helper_lex_all(
            "user.name",
            vec![
                (Token::Identifier, 0..4),
                (Token::Period, 4..5),
                (Token::Identifier, 5..9),
            ],
        );
    }

    #[test]
    fn test_lex_numbers() {
        helper_lex_all(
            "10 + 2.5 - .5",
            vec![
                (Token::Number, 0..2),
                (Token::Operator(Operator::Add), 3..4),
                (Token::Number, 5..8),
                (Token::Operator(Operator::Subtract), 9..10),
                (Token::Number, 11..13),
            ],
        );
    }

    #[test]
    fn test_lex_strings() {
        helper_lex_all(
            r#"'it\'s' "say \"hi\"""#,
            vec![(Token::String, 0..7), (Token::String, 8..20)],
        );
    }

    #[test]
    fn test_lex_operators() {
        helper_lex_all(
            "a === b !== c == d != e >= f <= g || !h && i",
            vec![
                (Token::Identifier, 0..1),
                (Token::Operator(Operator::StrictEqual), 2..5),
                (Token::Identifier, 6..7),
                (Token::Operator(Operator::StrictNotEqual), 8..11),
                (Token::Identifier, 12..13),
                (Token::Operator(Operator::Equal), 14..16),
                (Token::Identifier, 17..18),
                (Token::Operator(Operator::NotEqual), 19..21),
                (Token::Identifier, 22..23),
                (Token::Operator(Operator::GreaterOrEqual), 24..26),
                (Token::Identifier, 27..28),
                (Token::Operator(Operator::LesserOrEqual), 29..31),
                (Token::Identifier, 32..33),
                (Token::Or, 34..36),
                (Token::Exclamation, 37..38),
                (Token::Identifier, 38..39),
                (Token::And, 40..42),
                (Token::Identifier, 43..44),
            ],
        );
    }

    #[test]
    fn test_lex_keywords() {
        helper_lex_all(
            "true false null undefined truthy",
            vec![
                (Token::True, 0..4),
                (Token::False, 5..10),
                (Token::Null, 11..15),
                (Token::Null, 16..25),
                (Token::Identifier, 26..32),
            ],
        );
    }

    #[test]
    fn test_lex_unclosed_string() {
        assert!(Lexer::new("'open").next().is_err());
    }

    #[test]
    fn test_lex_lone_assign() {
        let mut lexer = Lexer::new("a = b");
        assert!(lexer.next().is_ok());
        assert!(lexer.next().is_err());
    }

    /// Lex the whole source and compare every token against `expect`.
    fn helper_lex_all(source: &str, expect: Vec<(Token, std::ops::Range<usize>)>) {
        let mut lexer = Lexer::new(source);
        for (token, range) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, Region::new(range)))));
        }

        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
    }
}
