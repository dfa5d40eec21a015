use crate::{
    expression::resolve,
    pipe::Pipe,
    plugin::Registry,
    store::Lookup,
};
use morel::{Finder, Syntax};

/// Markers that surround an interpolated expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    /// `{{{`, which begins a raw expression.
    BeginRaw = 0,
    /// `}}}`, which ends a raw expression.
    EndRaw = 1,
    /// `{{`, which begins an escaped expression.
    Begin = 2,
    /// `}}`, which ends an escaped expression.
    End = 3,
}

impl Marker {
    fn from_usize(id: usize) -> Option<Self> {
        match id {
            0 => Some(Self::BeginRaw),
            1 => Some(Self::EndRaw),
            2 => Some(Self::Begin),
            3 => Some(Self::End),
            _ => None,
        }
    }
}

thread_local! {
    static FINDER: Finder = Finder::new(Syntax::new(vec![
        (Marker::BeginRaw as usize, "{{{".into()),
        (Marker::EndRaw as usize, "}}}".into()),
        (Marker::Begin as usize, "{{".into()),
        (Marker::End as usize, "}}".into()),
    ]));
}

/// Stands in for `{` in text that has finished rendering. Later passes do not
/// recognize a marker or directive that contains it.
const SEALED: char = '\u{e000}';

/// Run both interpolation passes and seal the result, so no later pass reads
/// a directive or marker from it.
///
/// This is the only processing a partial, an include or a loop body receives.
pub fn finish(text: &str, lookup: &dyn Lookup, plugins: &Registry) -> String {
    seal(&all(text, lookup, plugins))
}

fn seal(text: &str) -> String {
    text.replace('{', &SEALED.to_string())
}

/// Restore the braces of sealed text.
pub fn unseal(text: &str) -> String {
    text.replace(SEALED, "{")
}

/// Replace every `{{{ expr }}}` in the text with the unescaped result.
///
/// Written values are sealed, so a value that looks like a marker is never
/// evaluated by a later pass.
pub fn raw(text: &str, lookup: &dyn Lookup, plugins: &Registry) -> String {
    interpolate(text, lookup, plugins, false)
}

/// Replace every `{{ expr }}` in the text with the HTML escaped result.
///
/// Directives that begin with `{{=` or `{{~` are left alone.
pub fn escaped(text: &str, lookup: &dyn Lookup, plugins: &Registry) -> String {
    interpolate(text, lookup, plugins, true)
}

/// Run both interpolation passes, raw first.
pub fn all(text: &str, lookup: &dyn Lookup, plugins: &Registry) -> String {
    escaped(&raw(text, lookup, plugins), lookup, plugins)
}

fn interpolate(text: &str, lookup: &dyn Lookup, plugins: &Registry, escape: bool) -> String {
    FINDER.with(|finder| interpolate_with(finder, text, lookup, plugins, escape))
}

fn interpolate_with(
    finder: &Finder,
    text: &str,
    lookup: &dyn Lookup,
    plugins: &Registry,
    escape: bool,
) -> String {
    let begin = if escape { Marker::Begin } else { Marker::BeginRaw };

    let mut buffer = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some((id, marker_begin, marker_end)) = finder.next(text, cursor) {
        if Marker::from_usize(id) != Some(begin) || is_directive(text, marker_end) {
            buffer.push_str(&text[cursor..marker_end]);
            cursor = marker_end;
            continue;
        }
        let Some((inner_end, end)) = find_end(finder, text, marker_end, escape) else {
            break;
        };

        buffer.push_str(&text[cursor..marker_begin]);
        let expression = text[marker_end..inner_end].trim();
        if !expression.is_empty() {
            if let Some(value) = resolve(expression, lookup, plugins) {
                let mut written = String::new();
                let mut pipe = if escape {
                    Pipe::escaped(&mut written)
                } else {
                    Pipe::new(&mut written)
                };
                // Writing into a String cannot fail.
                let _ = pipe.write_value(&value);
                buffer.push_str(&seal(&written));
            }
        }
        cursor = end;
    }
    buffer.push_str(&text[cursor..]);

    buffer
}

/// Return true if `{{` at the position is followed by a directive sigil.
fn is_directive(text: &str, from: usize) -> bool {
    text[from..].starts_with(['=', '~'])
}

/// Return the end of the expression and the end of its closing marker.
fn find_end(finder: &Finder, text: &str, from: usize, escape: bool) -> Option<(usize, usize)> {
    let mut cursor = from;
    while let Some((id, marker_begin, marker_end)) = finder.next(text, cursor) {
        match (Marker::from_usize(id), escape) {
            (Some(Marker::EndRaw), false) => return Some((marker_begin, marker_end)),
            (Some(Marker::End), true) => return Some((marker_begin, marker_end)),
            // `{{ a }}}` closes on the first two braces.
            (Some(Marker::EndRaw), true) => return Some((marker_begin, marker_begin + 2)),
            _ => cursor = marker_end,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{all, escaped, finish, raw, unseal};
    use crate::{plugin::Registry, Store};
    use serde_json::json;

    #[test]
    fn test_escaped() {
        let store = Store::new().with_must("name", "World");

        assert_eq!(
            escaped("Hello {{ name }}!", &store, &Registry::new()),
            "Hello World!"
        );
    }

    #[test]
    fn test_escaped_html() {
        let store = Store::new().with_must("html", "<script>");

        assert_eq!(escaped("{{ html }}", &store, &Registry::new()), "&lt;script&gt;");
    }

    #[test]
    fn test_raw_html() {
        let store = Store::new().with_must("html", "<div>");
        let plugins = Registry::new();

        assert_eq!(raw("{{{ html }}}", &store, &plugins), "<div>");
        assert_eq!(all("{{{ html }}}", &store, &plugins), "<div>");
    }

    #[test]
    fn test_raw_leaves_escaped_alone() {
        let store = Store::new().with_must("a", 1);

        assert_eq!(raw("{{ a }} {{{ a }}}", &store, &Registry::new()), "{{ a }} 1");
    }

    #[test]
    fn test_escaped_leaves_directives_alone() {
        let store = Store::new();
        let text = "{{= block('x') }}{{~ endif }}";

        assert_eq!(escaped(text, &store, &Registry::new()), text);
    }

    #[test]
    fn test_missing_and_empty_render_nothing() {
        let store = Store::new();

        assert_eq!(all("[{{ ghost }}][{{ }}][{{{ }}}]", &store, &Registry::new()), "[][][]");
    }

    #[test]
    fn test_unmatched_marker_is_literal() {
        let store = Store::new().with_must("a", 1);

        assert_eq!(all("{{ a }} and {{ a", &store, &Registry::new()), "1 and {{ a");
    }

    #[test]
    fn test_values_are_stringified() {
        let store = Store::new()
            .with_must("list", json!(["a", "b"]))
            .with_must("n", 2.5)
            .with_must("yes", true);

        assert_eq!(
            all("{{ list }}|{{ n }}|{{ yes }}|{{ n * 2 }}", &store, &Registry::new()),
            "a,b|2.5|true|5"
        );
    }

    #[test]
    fn test_raw_value_is_not_evaluated_again() {
        let store = Store::new().with_must("code", "{{ secret }}").with_must("secret", 1);

        let result = all("{{{ code }}}", &store, &Registry::new());
        assert_eq!(unseal(&result), "{{ secret }}");
    }

    #[test]
    fn test_finish_seals_output() {
        let store = Store::new().with_must("code", "{{ secret }}").with_must("secret", 1);
        let plugins = Registry::new();

        let sealed = finish("{{ code }}{{~ endif }}", &store, &plugins);
        assert_eq!(all(&sealed, &store, &plugins), sealed);
        assert_eq!(unseal(&sealed), "{{ secret }}{{~ endif }}");
    }
}
