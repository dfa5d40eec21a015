//! Vellum - View Template Engine
//!
//! Renders views stored on the filesystem. A view may inherit a layout,
//! fill its blocks, pull in partials and includes, declare variables, branch
//! and loop, and interpolate expressions that call registered plugins.
//!
//! ```text
//! {{= layout('main') }}
//! {{= block('content') }}
//!   ## comments are removed from the output
//!   {{~ var greeting = 'Hello, ' + name }}
//!   {{~ if(items.length > 0) }}
//!     <ul>{{~ for item in items }}<li>{{ item }}</li>{{~ endfor }}</ul>
//!   {{~ else }}
//!     {{= partial('empty') }}
//!   {{~ endif }}
//!   <p>{{ greeting }}</p>
//!   {{{ uppercase(banner) }}}
//! {{= endblock }}
//! ```
//!
//! `{{ }}` escapes its output for HTML, `{{{ }}}` does not. Expressions that
//! fail to evaluate render as empty text. Missing files abort the render.
mod engine;
mod expression;
mod log;
mod options;
mod pipe;
mod region;
mod render;
mod resolve;
mod store;

pub mod host;
pub mod plugin;

pub use engine::Engine;
pub use log::{Error, Kind, Pointer, Visual};
pub use options::Options;
pub use region::Region;
pub use store::{path, Lookup, Shadow, Store};
