use std::fmt::Display;

/// Types emitted by the [`Lexer`][`super::Lexer`].
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// String literal, quoted with `"` or `'`.
    String,
    /// Number literal.
    Number,
    /// Identifier (unquoted name).
    Identifier,
    /// A boolean true.
    True,
    /// A boolean false.
    False,
    /// `null` or `undefined`.
    Null,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// .
    Period,
    /// ,
    Comma,
    /// :
    Colon,
    /// ?
    Question,
    /// !
    Exclamation,
    /// ||
    Or,
    /// &&
    And,
    /// Describes an action taken on two values.
    Operator(Operator),
}

/// Binary operators with a fixed precedence.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Greater,
    Lesser,
    GreaterOrEqual,
    LesserOrEqual,
}

impl Operator {
    /// Return the binding power of the operator, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Equal
            | Operator::NotEqual
            | Operator::StrictEqual
            | Operator::StrictNotEqual => 3,
            Operator::Greater
            | Operator::Lesser
            | Operator::GreaterOrEqual
            | Operator::LesserOrEqual => 4,
            Operator::Add | Operator::Subtract => 5,
            Operator::Multiply | Operator::Divide | Operator::Remainder => 6,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Remainder => "%",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::StrictEqual => "===",
            Operator::StrictNotEqual => "!==",
            Operator::Greater => ">",
            Operator::Lesser => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::LesserOrEqual => "<=",
        };
        write!(f, "{symbol}")
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::String => write!(f, "string"),
            Token::Number => write!(f, "number"),
            Token::Identifier => write!(f, "identifier"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::LeftParen => write!(f, "left paren (()"),
            Token::RightParen => write!(f, "right paren ())"),
            Token::LeftBracket => write!(f, "left bracket ([)"),
            Token::RightBracket => write!(f, "right bracket (])"),
            Token::LeftBrace => write!(f, "left brace ({{)"),
            Token::RightBrace => write!(f, "right brace (}})"),
            Token::Period => write!(f, "period (.)"),
            Token::Comma => write!(f, "comma (,)"),
            Token::Colon => write!(f, "colon (:)"),
            Token::Question => write!(f, "question (?)"),
            Token::Exclamation => write!(f, "exclamation (!)"),
            Token::Or => write!(f, "or (||)"),
            Token::And => write!(f, "and (&&)"),
            Token::Operator(operator) => write!(f, "operator {operator}"),
        }
    }
}
