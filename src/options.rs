//! Describes where an [`Engine`][`crate::Engine`] finds its templates.
//!
//! Options are built with chained setters, or loaded from a TOML document:
//!
//! ```toml
//! views = "app/views"
//! partials = "app/views/partials"
//! extension = "html"
//! default_view = "index"
//! modules = false
//! ```
use crate::log::{Error, Kind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Locations and naming conventions for views, layouts and partials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    views: PathBuf,
    layouts: Option<PathBuf>,
    partials: PathBuf,
    extension: String,
    default_view: Option<String>,
    modules: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            views: PathBuf::from("views"),
            layouts: None,
            partials: PathBuf::from("views/partials"),
            extension: String::from("html"),
            default_view: None,
            modules: false,
        }
    }
}

impl Options {
    /// Create a new [`Options`] with the default locations.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load [`Options`] from TOML text.
    ///
    /// Keys that are missing take their default value.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the text is not valid TOML, or contains an
    /// unknown key or a value of the wrong type.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Options;
    ///
    /// let options = Options::from_toml("views = 'site'\nextension = '.htm'").unwrap();
    ///
    /// assert_eq!(options.views().to_str(), Some("site"));
    /// assert_eq!(options.extension(), "htm");
    /// ```
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let mut options: Options = toml::from_str(text).map_err(|error| {
            Error::build(Kind::Config, "unable to load options")
                .with_help(error.message().to_string())
        })?;
        options.set_extension(options.extension.clone());

        Ok(options)
    }

    /// Set the root directory of views.
    #[inline]
    pub fn set_views<P>(&mut self, path: P)
    where
        P: Into<PathBuf>,
    {
        self.views = path.into();
    }

    /// Set the root directory of views, and return the [`Options`].
    #[inline]
    pub fn with_views<P>(mut self, path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.set_views(path);
        self
    }

    /// Set the root directory of layouts.
    ///
    /// When unset, layouts are found in the views root.
    #[inline]
    pub fn set_layouts<P>(&mut self, path: P)
    where
        P: Into<PathBuf>,
    {
        self.layouts = Some(path.into());
    }

    /// Set the root directory of layouts, and return the [`Options`].
    #[inline]
    pub fn with_layouts<P>(mut self, path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.set_layouts(path);
        self
    }

    /// Set the root directory of partials.
    #[inline]
    pub fn set_partials<P>(&mut self, path: P)
    where
        P: Into<PathBuf>,
    {
        self.partials = path.into();
    }

    /// Set the root directory of partials, and return the [`Options`].
    #[inline]
    pub fn with_partials<P>(mut self, path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.set_partials(path);
        self
    }

    /// Set the file extension given to names that have none.
    ///
    /// A leading `.` is ignored.
    pub fn set_extension<S>(&mut self, extension: S)
    where
        S: Into<String>,
    {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
    }

    /// Set the file extension, and return the [`Options`].
    #[inline]
    pub fn with_extension<S>(mut self, extension: S) -> Self
    where
        S: Into<String>,
    {
        self.set_extension(extension);
        self
    }

    /// Set the file name used inside a view directory.
    ///
    /// With a default view of `index`, the view `users` resolves to
    /// `users/index.html`.
    #[inline]
    pub fn set_default_view<S>(&mut self, name: S)
    where
        S: Into<String>,
    {
        self.default_view = Some(name.into());
    }

    /// Set the file name used inside a view directory, and return the
    /// [`Options`].
    #[inline]
    pub fn with_default_view<S>(mut self, name: S) -> Self
    where
        S: Into<String>,
    {
        self.set_default_view(name);
        self
    }

    /// Enable or disable module structured resolution.
    #[inline]
    pub fn set_modules(&mut self, enabled: bool) {
        self.modules = enabled;
    }

    /// Enable or disable module structured resolution, and return the
    /// [`Options`].
    #[inline]
    pub fn with_modules(mut self, enabled: bool) -> Self {
        self.set_modules(enabled);
        self
    }

    #[inline]
    pub fn views(&self) -> &Path {
        &self.views
    }

    /// Return the layouts root, which falls back to the views root.
    #[inline]
    pub fn layouts(&self) -> &Path {
        self.layouts.as_deref().unwrap_or(&self.views)
    }

    #[inline]
    pub fn partials(&self) -> &Path {
        &self.partials
    }

    #[inline]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[inline]
    pub fn default_view(&self) -> Option<&str> {
        self.default_view.as_deref()
    }

    #[inline]
    pub fn modules(&self) -> bool {
        self.modules
    }
}

#[cfg(test)]
mod tests {
    use super::Options;
    use crate::Kind;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let options = Options::new();

        assert_eq!(options.views(), Path::new("views"));
        assert_eq!(options.layouts(), Path::new("views"));
        assert_eq!(options.partials(), Path::new("views/partials"));
        assert_eq!(options.extension(), "html");
        assert_eq!(options.default_view(), None);
        assert!(!options.modules());
    }

    #[test]
    fn test_builder() {
        let options = Options::new()
            .with_views("site")
            .with_layouts("site/layouts")
            .with_extension(".tpl")
            .with_default_view("index")
            .with_modules(true);

        assert_eq!(options.layouts(), Path::new("site/layouts"));
        assert_eq!(options.extension(), "tpl");
        assert_eq!(options.default_view(), Some("index"));
        assert!(options.modules());
    }

    #[test]
    fn test_from_toml() {
        let options = Options::from_toml(
            r#"
            views = "app/*/views"
            partials = "app/shared"
            default_view = "index"
            modules = true
            "#,
        )
        .unwrap();

        assert_eq!(options.views(), Path::new("app/*/views"));
        assert_eq!(options.partials(), Path::new("app/shared"));
        assert_eq!(options.extension(), "html");
        assert!(options.modules());
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(Options::from_toml("").unwrap(), Options::default());
    }

    #[test]
    fn test_from_toml_rejects_unknown_key() {
        let error = Options::from_toml("theme = 'dark'").unwrap_err();

        assert_eq!(error.kind(), Kind::Config);
        assert!(error.help().is_some_and(|help| help.contains("theme")));
    }

    #[test]
    fn test_from_toml_rejects_wrong_type() {
        assert!(Options::from_toml("modules = 'yes'").is_err());
    }
}
