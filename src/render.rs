//! The render pipeline.
//!
//! A view passes through these stages in order, each one a function of the
//! text produced by the stage before it:
//!
//! 1. Layout: blocks are collected from the view and substituted into the
//!    layout's `define block` placeholders.
//! 2. Composition: partials and includes are replaced with their rendered
//!    fragments. Fragments are interpolated and then sealed, so a directive
//!    inside one stays literal text.
//! 3. Control flow: `var`, then `if`, then `for`.
//! 4. Interpolation: `{{{ raw }}}`, then `{{ escaped }}`.
//! 5. Comments are stripped and sealed text is restored.
mod comment;
mod compose;
mod control;
mod interpolate;
mod layout;

use crate::{
    log::Error,
    options::Options,
    plugin::Registry,
    resolve::{read, Resolver},
    store::Store,
};
use std::path::Path;

/// Renders views from the filesystem.
pub struct Renderer<'engine> {
    resolver: Resolver<'engine>,
    /// Plugins that expressions may call.
    plugins: &'engine Registry,
}

impl<'engine> Renderer<'engine> {
    /// Create a new Renderer, using the module for names without a module tag.
    #[inline]
    pub fn new(
        options: &'engine Options,
        plugins: &'engine Registry,
        module: Option<&'engine str>,
    ) -> Self {
        Self {
            resolver: Resolver::new(options, module),
            plugins,
        }
    }

    /// Resolve and render the named view.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the view, its layout, or any partial or
    /// include cannot be found or read.
    pub fn render_view(&self, name: &str, store: &Store) -> Result<String, Error> {
        let path = self.resolver.view(name)?;

        self.render_file(&path, store)
    }

    /// Render the view stored in the file.
    ///
    /// Includes are found relative to the directory of this file, even when
    /// they come from its layout.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the file, its layout, or any partial or
    /// include cannot be found or read.
    pub fn render_file(&self, path: &Path, store: &Store) -> Result<String, Error> {
        let host = path.display().to_string();
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let text = read(path)?;
        tracing::trace!(path = %host, "rendering");

        let extraction = layout::extract(&text);
        let (text, exact) = match &extraction.layout {
            Some(name) => {
                let file = self
                    .resolver
                    .layout(name)
                    .map_err(|error| error.with_name(host.as_str()))?;
                tracing::debug!(layout = %file.display(), "applying layout");
                (layout::apply(&read(&file)?, &extraction.blocks), false)
            }
            None => (layout::unwrap_blocks(&text), true),
        };
        let origin = compose::Origin {
            name: &host,
            exact,
        };

        let mut data = store.clone();
        let text = compose::partials(&text, &data, self.plugins, &self.resolver, origin)?;
        let text = compose::includes(&text, base, &data, self.plugins, &self.resolver, origin)?;
        tracing::trace!("composed");

        let text = control::declare(&text, &mut data, self.plugins);
        let text = control::conditionals(&text, &data, self.plugins);
        let text = control::loops(&text, &data, self.plugins);
        tracing::trace!("expanded");

        let text = interpolate::all(&text, &data, self.plugins);

        Ok(interpolate::unseal(&comment::strip(&text)))
    }
}
