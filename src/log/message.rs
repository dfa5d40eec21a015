use super::{Error, Kind};
use std::path::Path;

pub const RENDER_FAILED: &str = "failed to render view";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_EOF: &str = "unexpected end of expression";
pub const INCOMPATIBLE_TYPES: &str = "incompatible types";

/// Return an [`Error`] describing a file that does not exist.
///
/// `what` names the thing being looked up, such as "view" or "partial".
pub fn error_not_found(what: &str, name: &str, attempted: &Path) -> Error {
    Error::build(Kind::NotFound, format!("{what} `{name}` not found")).with_help(format!(
        "attempted `{}`, does the file exist?",
        attempted.display()
    ))
}

/// Return an [`Error`] explaining that a file could not be read.
pub fn error_read(path: &Path) -> Error {
    Error::build(
        Kind::Read,
        format!("unable to read `{}`", path.display()),
    )
    .with_help(format!(
        "`{}` exists but could not be read as UTF-8 text, check its permissions and encoding",
        path.display()
    ))
}

/// Return an [`Error`] explaining that no module is available for a view.
pub fn error_missing_module(name: &str) -> Error {
    Error::build(
        Kind::MissingModule,
        format!("no module available to resolve `{name}`"),
    )
    .with_help("tag the name like `*module*/view`, or select one with `.module`")
}

/// Return an [`Error`] explaining that the expression ended too early.
pub fn error_eof(source: &str) -> Error {
    let len = source.len();
    Error::build(Kind::Syntax, UNEXPECTED_EOF)
        .with_pointer(source, len..len)
        .with_help("did you close all strings, brackets and parentheses?")
}
