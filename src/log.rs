mod error;
mod message;
mod pointer;

pub use error::{Error, Kind};
pub use message::*;
pub use pointer::{Pointer, Visual};

const RED: &str = "\x1B[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1B[0m";
