//! The boundary with a host application, such as a web framework.
//!
//! A host owns a view engine behind the [`View`] trait and asks it to render
//! a view per response. [`Engine::configure`][`crate::Engine::configure`]
//! registers an [`Engine`] with a [`Host`].
use crate::{log::Error, Engine, Store};
use std::sync::Arc;

/// Something that renders named views.
pub trait View: Send + Sync {
    /// Render the named view with the given [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the view cannot be rendered.
    fn render_view(&self, view: &str, store: &Store) -> Result<String, Error>;
}

impl View for Engine {
    #[inline]
    fn render_view(&self, view: &str, store: &Store) -> Result<String, Error> {
        self.render(view, store)
    }
}

/// An application that delegates rendering to a [`View`].
pub trait Host {
    /// Make the [`View`] the active rendering backend.
    fn set_view_engine(&mut self, engine: Arc<dyn View>);
}

/// Render a view for a response.
///
/// # Errors
///
/// Any failure is wrapped with [`Error::render_failure`], which keeps the
/// cause in its reason.
///
/// # Examples
///
/// ```
/// use vellum::{host::respond, Engine, Kind, Options, Store};
///
/// let dir = tempfile::tempdir().unwrap();
/// let engine = Engine::new(Options::new().with_views(dir.path()));
///
/// let error = respond(&engine, "missing", &Store::new()).unwrap_err();
/// assert_eq!(error.kind(), Kind::Render);
/// assert!(error.reason().starts_with("failed to render view: view `missing` not found"));
/// ```
pub fn respond(view: &dyn View, name: &str, store: &Store) -> Result<String, Error> {
    view.render_view(name, store).map_err(|error| {
        tracing::debug!(view = name, %error, "render failed");
        Error::render_failure(error)
    })
}

#[cfg(test)]
mod tests {
    use super::{respond, Host, View};
    use crate::{Engine, Options, Store};
    use std::{fs, sync::Arc};
    use tempfile::TempDir;

    #[derive(Default)]
    struct App {
        views: Option<Arc<dyn View>>,
    }

    impl Host for App {
        fn set_view_engine(&mut self, engine: Arc<dyn View>) {
            self.views = Some(engine);
        }
    }

    #[test]
    fn test_configure_registers_engine() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("home.html"), "<p>{{ who }}</p>").unwrap();
        let mut app = App::default();

        let engine = Engine::new(Options::new().with_views(dir.path())).configure(&mut app);
        let views = app.views.as_deref().unwrap();
        let store = Store::new().with_must("who", "<everyone>");

        assert_eq!(
            respond(views, "home", &store).unwrap(),
            "<p>&lt;everyone&gt;</p>"
        );
        assert_eq!(Arc::strong_count(&engine), 2);
    }

    #[test]
    fn test_respond_wraps_failure() {
        let dir = TempDir::new().unwrap();
        let engine = Engine::new(Options::new().with_views(dir.path()));

        let error = respond(&engine, "ghost", &Store::new()).unwrap_err();
        assert!(error.to_string().starts_with("error: failed to render view"));
        assert!(error.help().is_some_and(|help| help.contains("ghost.html")));
    }
}
