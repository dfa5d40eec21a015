use super::{Pointer, Visual, RED, RENDER_FAILED, RESET};
use crate::region::Region;
use std::fmt::{Debug, Display, Formatter, Result};

/// Broad category of an [`Error`].
///
/// Structural failures (`NotFound`, `MissingModule`, `Read`) abort a render.
/// `Syntax` and `Plugin` errors are raised while evaluating expressions and
/// are absorbed by the renderer, so they never reach the caller of
/// [`Engine::render`][`crate::Engine::render`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Kind {
    /// No file exists for a view, layout, partial or include.
    NotFound,
    /// Module resolution is enabled but no module could be determined.
    MissingModule,
    /// A file exists but could not be read.
    Read,
    /// A render failed, as reported to a host application.
    Render,
    /// A plugin rejected its input.
    Plugin,
    /// An expression could not be lexed or parsed, or failed to evaluate.
    Syntax,
    /// Configuration could not be loaded.
    Config,
}

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// # Examples
///
/// ```
/// use vellum::{Error, Kind};
///
/// let error = Error::build(Kind::NotFound, "view not found")
///     .with_pointer("{{= partial('nav') }}", 0..21)
///     .with_name("index.html")
///     .with_help("attempted `/srv/views/partials/nav.html`");
///
/// assert_eq!(error.kind(), Kind::NotFound);
/// assert_eq!(error.to_string(), "error: view not found");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: view not found
///   --> index.html:1:1
///    |
///  1 | {{= partial('nav') }}
///    | ^^^^^^^^^^^^^^^^^^^^^
///    |
///   = help: attempted `/srv/views/partials/nav.html`
/// ```
pub struct Error {
    kind: Kind,
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the template that the [`Error`] comes from.
    name: Option<String>,
}

impl Error {
    /// Create a new [`Error`] with the given [`Kind`] and reason text.
    ///
    /// The additional fields may be populated using the various `with_`
    /// methods.
    pub fn build<T>(kind: Kind, reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            kind,
            reason: reason.into(),
            name: None,
            visual: None,
            help: None,
        }
    }

    /// Wrap an [`Error`] that escaped a render, prefixing it with a fixed
    /// explanation.
    ///
    /// The help text and template name of the cause are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::{Error, Kind};
    ///
    /// let cause = Error::build(Kind::NotFound, "view `home` not found");
    /// let wrapped = Error::render_failure(cause);
    ///
    /// assert_eq!(wrapped.kind(), Kind::Render);
    /// assert_eq!(wrapped.reason(), "failed to render view: view `home` not found");
    /// ```
    pub fn render_failure(cause: Error) -> Self {
        Error {
            kind: Kind::Render,
            reason: format!("{RENDER_FAILED}: {}", cause.reason),
            ..cause
        }
    }

    /// Set the name text, which is the name of the template that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] over the given source text
    /// and [`Region`].
    pub fn with_pointer<T>(self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.with_visual(Pointer::new(source, region.into()))
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the [`Kind`] of the error.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Return the reason text.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    #[inline]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the template that the error is related to.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            return write!(f, "error: {}", self.reason);
        }

        write!(f, "{RED}error{RESET}: {}", self.reason)?;
        match &self.visual {
            Some(visual) => visual.display(f, self.name.as_deref(), self.help.as_deref()),
            None => match &self.help {
                Some(help) => write!(f, "\n  = help: {help}"),
                None => Ok(()),
            },
        }
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, Kind};

    #[test]
    fn test_display_plain() {
        let error = Error::build(Kind::Read, "unable to read `a.html`").with_help("permission denied");

        assert_eq!(error.to_string(), "error: unable to read `a.html`");
    }

    #[test]
    fn test_display_alternate_pointer() {
        let error = Error::build(Kind::NotFound, "partial not found")
            .with_pointer("<p>{{= partial('nav') }}</p>", 3..24)
            .with_name("index.html")
            .with_help("attempted `nav.html`");
        let output = format!("{error:#}");

        assert!(output.contains("--> index.html:1:4"));
        assert!(output.contains("= help: attempted `nav.html`"));
    }

    #[test]
    fn test_render_failure_keeps_help() {
        let cause = Error::build(Kind::MissingModule, "module not set").with_help("call `.module`");
        let wrapped = Error::render_failure(cause);

        assert_eq!(wrapped.kind(), Kind::Render);
        assert_eq!(wrapped.help(), Some("call `.module`"));
        assert!(wrapped.reason().ends_with("module not set"));
    }
}
