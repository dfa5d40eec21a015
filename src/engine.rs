use crate::{
    host::Host,
    log::{Error, Kind},
    options::Options,
    plugin::{Plugin, Registry},
    render::Renderer,
    resolve::verify,
    Store,
};
use std::{path::Path, sync::Arc};

/// Renders views from the filesystem, and provides storage for plugins.
///
/// Plugins and the current module are setup state. Finish changing them
/// before sharing the [`Engine`] between threads, or use
/// [`Engine::render_in`] to choose a module per render.
#[derive(Debug, Default)]
pub struct Engine {
    options: Options,
    /// Plugins that this engine is aware of.
    plugins: Registry,
    /// Module used for names that carry no module tag.
    module: Option<String>,
}

impl Engine {
    /// Create a new [`Engine`] with the given [`Options`].
    #[inline]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            plugins: Registry::new(),
            module: None,
        }
    }

    /// Return the [`Options`] of the [`Engine`].
    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Render the named view with the given [`Store`].
    ///
    /// In module mode, a name without a module tag uses the current module.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the view, its layout, or any partial or
    /// include cannot be found or read, or no module is available in module
    /// mode. Expressions that fail render as empty text instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::{Engine, Options, Store};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// std::fs::write(dir.path().join("hello.html"), "Hello {{ name }}!").unwrap();
    ///
    /// let engine = Engine::new(Options::new().with_views(dir.path()));
    /// let result = engine.render("hello", &Store::new().with_must("name", "World"));
    ///
    /// assert_eq!(result.unwrap(), "Hello World!");
    /// ```
    #[inline]
    pub fn render(&self, view: &str, store: &Store) -> Result<String, Error> {
        Renderer::new(&self.options, &self.plugins, self.module.as_deref()).render_view(view, store)
    }

    /// Render the named view with the given [`Store`], using the given module
    /// for a name without a module tag.
    ///
    /// The current module of the [`Engine`] is not consulted or changed.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] under the same conditions as [`Engine::render`].
    #[inline]
    pub fn render_in(&self, view: &str, store: &Store, module: &str) -> Result<String, Error> {
        Renderer::new(&self.options, &self.plugins, Some(module)).render_view(view, store)
    }

    /// Render the template at the given path, bypassing view resolution.
    ///
    /// Layouts and partials are still found through the [`Options`], and
    /// includes are relative to the directory of the template.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the template does not exist, or under the
    /// same conditions as [`Engine::render`].
    pub fn render_template<P>(&self, path: P, store: &Store) -> Result<String, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let name = path.display().to_string();
        let path = verify("template", &name, path.to_path_buf())?;

        Renderer::new(&self.options, &self.plugins, self.module.as_deref())
            .render_file(&path, store)
    }

    /// Select the current module, consulted by the next [`Engine::render`].
    ///
    /// Returns the [`Engine`], so a render may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Engine;
    ///
    /// let mut engine = Engine::default();
    /// engine.module("admin");
    ///
    /// assert_eq!(engine.current_module(), Some("admin"));
    /// ```
    #[inline]
    pub fn module<S>(&mut self, name: S) -> &mut Self
    where
        S: Into<String>,
    {
        self.module = Some(name.into());

        self
    }

    /// Select the current module, and return the [`Engine`].
    #[inline]
    pub fn with_module<S>(mut self, name: S) -> Self
    where
        S: Into<String>,
    {
        self.module(name);

        self
    }

    /// Clear the current module.
    #[inline]
    pub fn clear_module(&mut self) {
        self.module = None;
    }

    /// Return the current module.
    #[inline]
    pub fn current_module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Add a [`Plugin`].
    ///
    /// # Errors
    ///
    /// If a `Plugin` with the given name already exists in the engine, an
    /// [`Error`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::{
    ///     plugin::{
    ///         serde::{json, Value},
    ///         Error,
    ///     },
    ///     Engine, Kind,
    /// };
    ///
    /// fn to_lowercase(args: &[Value]) -> Result<Value, Error> {
    ///     match args.first() {
    ///         Some(Value::String(string)) => Ok(json!(string.to_lowercase())),
    ///         _ => Err(Error::build(Kind::Plugin, "plugin `to_lowercase` requires string input")),
    ///     }
    /// }
    ///
    /// let mut engine = Engine::default();
    /// let result = engine.add_plugin("to_lowercase", to_lowercase);
    /// assert!(result.is_ok());
    ///
    /// let second = engine.add_plugin("to_lowercase", to_lowercase);
    /// assert!(second.is_err());
    /// ```
    pub fn add_plugin<P>(&mut self, name: &str, plugin: P) -> Result<(), Error>
    where
        P: Plugin + 'static,
    {
        if self.plugins.contains(name) {
            return Err(Error::build(
                Kind::Plugin,
                format!("plugin with name `{name}` already exists in engine"),
            )
            .with_help("overwrite it with `.add_plugin_must`"));
        }
        self.plugins.insert(name, Box::new(plugin));

        Ok(())
    }

    /// Add a [`Plugin`].
    ///
    /// If a `Plugin` with the given name already exists in the engine, it is
    /// overwritten.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::{
    ///     plugin::{serde::Value, Error},
    ///     Engine,
    /// };
    ///
    /// let mut engine = Engine::default();
    /// engine.add_plugin_must("count", |args: &[Value]| Ok::<_, Error>(Value::from(args.len())));
    /// ```
    #[inline]
    pub fn add_plugin_must<P>(&mut self, name: &str, plugin: P)
    where
        P: Plugin + 'static,
    {
        self.plugins.insert(name, Box::new(plugin));
    }

    /// Add a [`Plugin`], and return the [`Engine`].
    ///
    /// # Errors
    ///
    /// If a `Plugin` with the given name already exists in the engine, an
    /// [`Error`] is returned.
    #[inline]
    pub fn with_plugin<P>(mut self, name: &str, plugin: P) -> Result<Self, Error>
    where
        P: Plugin + 'static,
    {
        self.add_plugin(name, plugin)?;

        Ok(self)
    }

    /// Add a [`Plugin`], overwriting any with the same name, and return the
    /// [`Engine`].
    #[inline]
    pub fn with_plugin_must<P>(mut self, name: &str, plugin: P) -> Self
    where
        P: Plugin + 'static,
    {
        self.add_plugin_must(name, plugin);

        self
    }

    /// Return the named [`Plugin`].
    #[inline]
    pub fn get_plugin(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name)
    }

    /// Register the [`Engine`] as the view engine of the host, and return the
    /// shared handle.
    pub fn configure<H>(self, host: &mut H) -> Arc<Engine>
    where
        H: Host + ?Sized,
    {
        let engine = Arc::new(self);
        host.set_view_engine(engine.clone());
        tracing::debug!("view engine configured");

        engine
    }
}
