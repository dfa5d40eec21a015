use super::interpolate;
use crate::{
    expression::resolve,
    log::Error,
    plugin::Registry,
    resolve::{read, Resolver},
    store::{Lookup, Shadow},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};

static PARTIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\{\{=\s*partial\(\s*['"]([^'"]+)['"]\s*(?:,\s*(.+?))?\s*\)\s*\}\}"#)
        .expect("valid partial pattern")
});

static INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\{\{=\s*include\(\s*['"]([^'"]+)['"]\s*(?:,\s*(.+?))?\s*\)\s*\}\}"#)
        .expect("valid include pattern")
});

/// The file that composed text came from, named in errors.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    pub name: &'a str,
    /// Whether offsets in the text are offsets in the file. Text that went
    /// through a layout is a mix of files, and gets no pointer.
    pub exact: bool,
}

/// Replace every `partial('name'[, params])` directive with the rendered
/// partial.
///
/// # Errors
///
/// Returns an [`Error`] when a partial cannot be found or read.
pub fn partials(
    text: &str,
    lookup: &dyn Lookup,
    plugins: &Registry,
    resolver: &Resolver,
    origin: Origin,
) -> Result<String, Error> {
    compose(&PARTIAL, text, lookup, plugins, origin, |name| {
        resolver.partial(name)
    })
}

/// Replace every `include('path'[, params])` directive with the rendered
/// file, found relative to the `base` directory.
///
/// # Errors
///
/// Returns an [`Error`] when an included file cannot be found or read.
pub fn includes(
    text: &str,
    base: &Path,
    lookup: &dyn Lookup,
    plugins: &Registry,
    resolver: &Resolver,
    origin: Origin,
) -> Result<String, Error> {
    compose(&INCLUDE, text, lookup, plugins, origin, |name| {
        resolver.include(base, name)
    })
}

/// Replace each match of the pattern with the located fragment, rendered by
/// interpolation alone and sealed, so directives in it have no effect.
///
/// Parameters are evaluated against the lookup, and must produce an object
/// whose entries shadow the data while the fragment renders.
fn compose<F>(
    pattern: &Regex,
    text: &str,
    lookup: &dyn Lookup,
    plugins: &Registry,
    origin: Origin,
    locate: F,
) -> Result<String, Error>
where
    F: Fn(&str) -> Result<PathBuf, Error>,
{
    let mut buffer = String::with_capacity(text.len());
    let mut last = 0;
    for captures in pattern.captures_iter(text) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        buffer.push_str(&text[last..whole.start()]);

        let path = locate(name.as_str()).map_err(|error| {
            let error = error.with_name(origin.name);
            if origin.exact {
                error.with_pointer(text, whole)
            } else {
                error
            }
        })?;
        let fragment = read(&path)?;

        let mut shadow = Shadow::new(lookup);
        if let Some(params) = captures.get(2) {
            match resolve(params.as_str(), lookup, plugins) {
                Some(Value::Object(object)) => shadow.extend(object),
                Some(_) => tracing::debug!(
                    params = params.as_str(),
                    "parameters are not an object, ignoring"
                ),
                None => {}
            }
        }
        buffer.push_str(&interpolate::finish(&fragment, &shadow, plugins));
        last = whole.end();
    }
    buffer.push_str(&text[last..]);

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::{includes, partials, Origin};
    use crate::{
        plugin::Registry, render::interpolate::unseal, resolve::Resolver, Kind, Options, Store,
    };
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const INDEX: Origin<'static> = Origin {
        name: "index.html",
        exact: true,
    };

    fn fixture() -> (TempDir, Options) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::create_dir_all(dir.path().join("pages/parts")).unwrap();
        fs::write(
            dir.path().join("partials/greet.html"),
            "<b>{{ greeting }}, {{ name }}</b>",
        )
        .unwrap();
        fs::write(
            dir.path().join("partials/nested.html"),
            "{{~ if(true) }}{{= partial('greet') }}",
        )
        .unwrap();
        fs::write(dir.path().join("pages/parts/footer.html"), "(c) {{ year }}").unwrap();
        let options = Options::new()
            .with_views(dir.path())
            .with_partials(dir.path().join("partials"));

        (dir, options)
    }

    #[test]
    fn test_partial_with_params_override() {
        let (_dir, options) = fixture();
        let store = Store::new()
            .with_must("greeting", "Hello")
            .with_must("name", "caller");

        let result = partials(
            "[{{= partial('greet', { name: 'param' }) }}]",
            &store,
            &Registry::new(),
            &Resolver::new(&options, None),
            INDEX,
        );
        assert_eq!(result.unwrap(), "[<b>Hello, param</b>]");
    }

    #[test]
    fn test_partial_params_from_data() {
        let (_dir, options) = fixture();
        let store = Store::new().with_must("person", json!({"greeting": "Hi", "name": "Ada"}));

        let result = partials(
            "{{= partial(\"greet\", person) }}",
            &store,
            &Registry::new(),
            &Resolver::new(&options, None),
            INDEX,
        );
        assert_eq!(result.unwrap(), "<b>Hi, Ada</b>");
    }

    #[test]
    fn test_partial_each_occurrence() {
        let (_dir, options) = fixture();
        let store = Store::new().with_must("greeting", "Yo").with_must("name", "x");

        let result = partials(
            "{{= partial('greet') }}|{{= partial('greet') }}",
            &store,
            &Registry::new(),
            &Resolver::new(&options, None),
            INDEX,
        );
        assert_eq!(result.unwrap(), "<b>Yo, x</b>|<b>Yo, x</b>");
    }

    #[test]
    fn test_partial_is_interpolation_only() {
        let (_dir, options) = fixture();

        let result = partials(
            "{{= partial('nested') }}",
            &Store::new(),
            &Registry::new(),
            &Resolver::new(&options, None),
            INDEX,
        );
        let result = result.unwrap();
        assert!(!result.contains("{{"));
        assert_eq!(unseal(&result), "{{~ if(true) }}{{= partial('greet') }}");
    }

    #[test]
    fn test_partial_not_found() {
        let (_dir, options) = fixture();

        let error = partials(
            "<nav>{{= partial('ghost') }}</nav>",
            &Store::new(),
            &Registry::new(),
            &Resolver::new(&options, None),
            INDEX,
        )
        .unwrap_err();
        assert_eq!(error.kind(), Kind::NotFound);
        assert_eq!(error.name(), Some("index.html"));
        assert!(format!("{error:#}").contains("index.html:1:6"));
    }

    #[test]
    fn test_partial_not_found_after_layout() {
        let (_dir, options) = fixture();

        let error = partials(
            "<nav>{{= partial('ghost') }}</nav>",
            &Store::new(),
            &Registry::new(),
            &Resolver::new(&options, None),
            Origin {
                name: "index.html",
                exact: false,
            },
        )
        .unwrap_err();
        assert_eq!(error.name(), Some("index.html"));
        assert!(!format!("{error:#}").contains("index.html:1:6"));
    }

    #[test]
    fn test_include_relative() {
        let (dir, options) = fixture();
        let store = Store::new().with_must("year", 2024);

        let result = includes(
            "<footer>{{= include('parts/footer') }}</footer>",
            &dir.path().join("pages"),
            &store,
            &Registry::new(),
            &Resolver::new(&options, None),
            Origin {
                name: "pages/home.html",
                exact: true,
            },
        );
        assert_eq!(result.unwrap(), "<footer>(c) 2024</footer>");
    }
}
