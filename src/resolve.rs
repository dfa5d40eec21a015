//! Turns logical template names into files.
//!
//! In flat mode a name is joined onto its root directory. In module mode the
//! name may carry a module tag like `*admin*/users`; untagged names use the
//! module selected on the [`Engine`][`crate::Engine`]. A `*` segment in the
//! root is replaced with the module name, and a root without one gets the
//! module name appended.
use crate::{
    log::{error_missing_module, error_not_found, error_read, Error},
    options::Options,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Matches a module tag at the start of a name, `*module*/rest`.
static MODULE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*([^*/]+)\*/(.+)$").expect("valid module tag pattern"));

/// Resolves view, layout and partial names against [`Options`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    options: &'a Options,
    module: Option<&'a str>,
}

impl<'a> Resolver<'a> {
    /// Create a new [`Resolver`], using the given module for names that do
    /// not carry a module tag.
    #[inline]
    pub fn new(options: &'a Options, module: Option<&'a str>) -> Self {
        Self { options, module }
    }

    /// Return the file of the named view.
    ///
    /// When a default view is configured the name is a directory, and the
    /// default view is the file inside it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when module mode is enabled but no module is
    /// available, or the file does not exist.
    pub fn view(&self, name: &str) -> Result<PathBuf, Error> {
        let (root, rest) = self.split(self.options.views(), name)?;
        let mut path = root.join(rest);
        if let Some(default) = self.options.default_view() {
            path.push(default);
        }

        verify("view", name, self.extend(path))
    }

    /// Return the file of the named layout.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when module mode is enabled but no module is
    /// available, or the file does not exist.
    pub fn layout(&self, name: &str) -> Result<PathBuf, Error> {
        let (root, rest) = self.split(self.options.layouts(), name)?;

        verify("layout", name, self.extend(root.join(rest)))
    }

    /// Return the file of the named partial.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when module mode is enabled but no module is
    /// available, or the file does not exist.
    pub fn partial(&self, name: &str) -> Result<PathBuf, Error> {
        let (root, rest) = self.split(self.options.partials(), name)?;

        verify("partial", name, self.extend(root.join(rest)))
    }

    /// Return the file of an include, relative to the directory of the file
    /// that contains it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the file does not exist.
    pub fn include(&self, base: &Path, name: &str) -> Result<PathBuf, Error> {
        verify("include", name, self.extend(base.join(name)))
    }

    /// Split the name into the root it resolves against and the rest of
    /// the name, applying the module when module mode is enabled.
    fn split<'n>(&self, root: &Path, name: &'n str) -> Result<(PathBuf, &'n str), Error> {
        if !self.options.modules() {
            return Ok((root.to_path_buf(), name));
        }

        let (module, rest) = match MODULE_TAG.captures(name) {
            Some(captures) => match (captures.get(1), captures.get(2)) {
                (Some(module), Some(rest)) => (module.as_str(), rest.as_str()),
                _ => return Err(error_missing_module(name)),
            },
            None => match self.module {
                Some(module) => (module, name),
                None => return Err(error_missing_module(name)),
            },
        };

        Ok((substitute(root, module), rest))
    }

    /// Give the path the configured extension, unless it already ends with
    /// it. Dots elsewhere in the name are part of the name.
    fn extend(&self, path: PathBuf) -> PathBuf {
        let extension = self.options.extension();
        if extension.is_empty() || path.extension().is_some_and(|found| found == extension) {
            return path;
        }
        let mut text = path.into_os_string();
        text.push(".");
        text.push(self.options.extension());

        PathBuf::from(text)
    }
}

/// Replace the `*` segment of the root with the module, or append the module
/// when the root has no such segment.
fn substitute(root: &Path, module: &str) -> PathBuf {
    let mut found = false;
    let path: PathBuf = root
        .components()
        .map(|component| match component {
            Component::Normal(segment) if segment == "*" => {
                found = true;
                Component::Normal(module.as_ref())
            }
            component => component,
        })
        .collect();

    if found {
        path
    } else {
        path.join(module)
    }
}

/// Verify that the path is a file.
///
/// # Errors
///
/// Returns a `NotFound` [`Error`] naming the absolute path that was
/// attempted.
pub fn verify(what: &str, name: &str, path: PathBuf) -> Result<PathBuf, Error> {
    if path.is_file() {
        tracing::debug!(what, name, path = %path.display(), "resolved");
        return Ok(path);
    }
    let attempted = std::path::absolute(&path).unwrap_or(path);

    Err(error_not_found(what, name, &attempted))
}

/// Read the file to a string.
///
/// # Errors
///
/// Returns a `Read` [`Error`] when the file cannot be read.
pub fn read(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|error| {
        tracing::debug!(path = %path.display(), %error, "read failed");
        error_read(path)
    })
}
