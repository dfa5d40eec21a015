//! Expansion of `var`, `if` and `for` directives.
//!
//! The three passes run once each over the whole text, in that order. Every
//! conditional is decided before any loop expands, so a condition never sees
//! a loop binding.
use super::interpolate;
use crate::{
    expression::{eval::is_truthy, resolve},
    plugin::Registry,
    store::{path, Lookup, Shadow, Store},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{~\s*var\s+([A-Za-z_$][\w$]*)\s*=\s*(.+?)\s*\}\}").expect("valid var pattern")
});

static CONDITIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{~\s*(?:if\s*\((.*?)\)|(else)|(endif))\s*\}\}")
        .expect("valid conditional pattern")
});

static LOOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\{\{~\s*(?:for\s+(?:\[\s*([A-Za-z_$][\w$]*)\s*,\s*([A-Za-z_$][\w$]*)\s*\]|([A-Za-z_$][\w$]*))\s+in\s+(.+?)|(endfor))\s*\}\}",
    )
    .expect("valid loop pattern")
});

/// Remove every `var name = expr` directive, assigning each result to the
/// data in order.
///
/// An expression that cannot be resolved assigns `null`.
pub fn declare(text: &str, data: &mut Store, plugins: &Registry) -> String {
    for captures in VAR.captures_iter(text) {
        let (Some(name), Some(expression)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        let value = resolve(expression.as_str(), data, plugins).unwrap_or(Value::Null);
        tracing::trace!(name = name.as_str(), "declared");
        data.set(name.as_str(), value);
    }

    VAR.replace_all(text, "").into_owned()
}

/// An `if` that has not been closed yet.
struct Conditional {
    /// Offset of the `if` directive in the text.
    start: usize,
    truthy: bool,
    then: String,
    otherwise: Option<String>,
}

impl Conditional {
    fn branch(&mut self) -> &mut String {
        match &mut self.otherwise {
            Some(otherwise) => otherwise,
            None => &mut self.then,
        }
    }
}

/// Replace every `if(cond) .. [else ..] endif` construct with the text of the
/// branch that its condition selects.
///
/// Nested constructs pair with the innermost open `if`. A stray `else` or
/// `endif` is left as literal text, as is everything from an `if` that is
/// never closed.
pub fn conditionals(text: &str, lookup: &dyn Lookup, plugins: &Registry) -> String {
    let mut output = String::with_capacity(text.len());
    let mut stack: Vec<Conditional> = vec![];
    let mut last = 0;

    for captures in CONDITIONAL.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let literal = &text[last..whole.start()];
        let current = stack.last_mut().map_or(&mut output, Conditional::branch);
        current.push_str(literal);
        last = whole.end();

        if let Some(condition) = captures.get(1) {
            let truthy =
                resolve(condition.as_str(), lookup, plugins).is_some_and(|value| is_truthy(&value));
            stack.push(Conditional {
                start: whole.start(),
                truthy,
                then: String::new(),
                otherwise: None,
            });
        } else if captures.get(2).is_some() {
            match stack.last_mut() {
                Some(open) if open.otherwise.is_none() => open.otherwise = Some(String::new()),
                Some(open) => open.branch().push_str(whole.as_str()),
                None => output.push_str(whole.as_str()),
            }
        } else {
            match stack.pop() {
                Some(closed) => {
                    let chosen = if closed.truthy {
                        closed.then
                    } else {
                        closed.otherwise.unwrap_or_default()
                    };
                    let parent = stack.last_mut().map_or(&mut output, Conditional::branch);
                    parent.push_str(&chosen);
                }
                None => output.push_str(whole.as_str()),
            }
        }
    }

    match stack.first() {
        Some(unclosed) => output.push_str(&text[unclosed.start..]),
        None => output.push_str(&text[last..]),
    }

    output
}

/// Names bound by a loop.
#[derive(Debug, PartialEq)]
enum Binding<'text> {
    /// `for item in ..`
    Item(&'text str),
    /// `for [key, value] in ..`
    Pair(&'text str, &'text str),
}

#[derive(Debug, PartialEq)]
enum Node<'text> {
    Text(&'text str),
    Loop {
        binding: Binding<'text>,
        source: &'text str,
        body: Vec<Node<'text>>,
    },
}

/// A `for` that has not been closed yet.
struct Open<'text> {
    start: usize,
    binding: Binding<'text>,
    source: &'text str,
    body: Vec<Node<'text>>,
}

/// Replace every `for .. in source .. endfor` construct with its body,
/// interpolated once for each item of the source.
///
/// The expanded output is sealed, see [`interpolate::finish`].
///
/// The source is a path into the data, and anything other than an array or
/// object produces no output. Keys of an array are its indices, as text.
pub fn loops(text: &str, lookup: &dyn Lookup, plugins: &Registry) -> String {
    let nodes = parse_loops(text);

    let mut output = String::with_capacity(text.len());
    expand(&nodes, lookup, plugins, false, &mut output);

    output
}

fn parse_loops(text: &str) -> Vec<Node<'_>> {
    let mut root = vec![];
    let mut stack: Vec<Open> = vec![];
    let mut last = 0;

    for captures in LOOP.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let body = stack.last_mut().map_or(&mut root, |open| &mut open.body);
        if last < whole.start() {
            body.push(Node::Text(&text[last..whole.start()]));
        }
        last = whole.end();

        if captures.get(5).is_some() {
            match stack.pop() {
                Some(closed) => {
                    let parent = stack.last_mut().map_or(&mut root, |open| &mut open.body);
                    parent.push(Node::Loop {
                        binding: closed.binding,
                        source: closed.source,
                        body: closed.body,
                    });
                }
                None => root.push(Node::Text(whole.as_str())),
            }
            continue;
        }

        let binding = match (captures.get(1), captures.get(2), captures.get(3)) {
            (Some(key), Some(value), _) => Binding::Pair(key.as_str(), value.as_str()),
            (_, _, Some(item)) => Binding::Item(item.as_str()),
            _ => continue,
        };
        let source = captures.get(4).map_or("", |m| m.as_str());
        stack.push(Open {
            start: whole.start(),
            binding,
            source,
            body: vec![],
        });
    }

    match stack.first() {
        Some(unclosed) => root.push(Node::Text(&text[unclosed.start..])),
        None if last < text.len() => root.push(Node::Text(&text[last..])),
        None => {}
    }

    root
}

fn expand(
    nodes: &[Node],
    lookup: &dyn Lookup,
    plugins: &Registry,
    inside: bool,
    output: &mut String,
) {
    for node in nodes {
        match node {
            Node::Text(text) if inside => {
                output.push_str(&interpolate::finish(text, lookup, plugins));
            }
            Node::Text(text) => output.push_str(text),
            Node::Loop {
                binding,
                source,
                body,
            } => {
                let items = match path(lookup, source) {
                    Some(Value::Array(array)) => array
                        .iter()
                        .enumerate()
                        .map(|(index, value)| (Value::String(index.to_string()), value.clone()))
                        .collect(),
                    Some(Value::Object(object)) => object
                        .iter()
                        .map(|(key, value)| (Value::String(key.clone()), value.clone()))
                        .collect(),
                    _ => {
                        tracing::trace!(source, "loop source is not iterable, skipping");
                        vec![]
                    }
                };

                let mut shadow = Shadow::new(lookup);
                for (key, value) in items {
                    shadow.push();
                    match binding {
                        Binding::Item(item) => shadow.insert(*item, value),
                        Binding::Pair(k, v) => {
                            shadow.insert(*k, key);
                            shadow.insert(*v, value);
                        }
                    }
                    expand(body, &shadow, plugins, true, output);
                    shadow.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{conditionals, declare, loops};
    use crate::{plugin::Registry, render::interpolate::unseal, Store};
    use serde_json::json;

    #[test]
    fn test_declare() {
        let mut store = Store::new().with_must("price", 4);
        let text = "{{~ var total = price * 2 }}{{~ var label = 'x' + total }}ok";

        let result = declare(text, &mut store, &Registry::new());
        assert_eq!(result, "ok");
        assert_eq!(store.get("total"), Some(&json!(8)));
        assert_eq!(store.get("label"), Some(&json!("x8")));
    }

    #[test]
    fn test_declare_failure_assigns_null() {
        let mut store = Store::new();

        declare("{{~ var a = ghost.name }}", &mut store, &Registry::new());
        assert_eq!(store.get("a"), Some(&json!(null)));
    }

    #[test]
    fn test_conditionals() {
        let text = "{{~ if(show) }}yes{{~ else }}no{{~ endif }}";
        let plugins = Registry::new();

        let shown = Store::new().with_must("show", true);
        let hidden = Store::new().with_must("show", false);
        assert_eq!(conditionals(text, &shown, &plugins), "yes");
        assert_eq!(conditionals(text, &hidden, &plugins), "no");
    }

    #[test]
    fn test_conditionals_without_else() {
        let store = Store::new().with_must("show", false);

        assert_eq!(
            conditionals("[{{~ if(show) }}yes{{~ endif }}]", &store, &Registry::new()),
            "[]"
        );
    }

    #[test]
    fn test_conditionals_nested() {
        let text = "{{~ if(a) }}A{{~ if(b) }}B{{~ else }}b{{~ endif }}{{~ else }}!{{~ endif }}";
        let plugins = Registry::new();

        let store = Store::new().with_must("a", true).with_must("b", false);
        assert_eq!(conditionals(text, &store, &plugins), "Ab");

        let store = Store::new().with_must("a", false).with_must("b", true);
        assert_eq!(conditionals(text, &store, &plugins), "!");
    }

    #[test]
    fn test_conditionals_expression() {
        let store = Store::new().with_must("items", json!([1, 2, 3]));

        assert_eq!(
            conditionals(
                "{{~ if(items.length > 2 && items[0] == 1) }}many{{~ endif }}",
                &store,
                &Registry::new()
            ),
            "many"
        );
    }

    #[test]
    fn test_conditionals_unbalanced_are_literal() {
        let store = Store::new().with_must("a", true);
        let plugins = Registry::new();

        assert_eq!(
            conditionals("x{{~ endif }}{{~ else }}", &store, &plugins),
            "x{{~ endif }}{{~ else }}"
        );
        assert_eq!(
            conditionals("x{{~ if(a) }}open", &store, &plugins),
            "x{{~ if(a) }}open"
        );
    }

    #[test]
    fn test_loops() {
        let store = Store::new().with_must("items", json!(["A", "B"]));

        assert_eq!(
            loops(
                "<ul>{{~ for item in items }}<li>{{ item }}</li>{{~ endfor }}</ul>",
                &store,
                &Registry::new()
            ),
            "<ul><li>A</li><li>B</li></ul>"
        );
    }

    #[test]
    fn test_loops_pairs() {
        let store = Store::new()
            .with_must("ages", json!({"ada": 36, "alan": 41}))
            .with_must("letters", json!(["x", "y"]));
        let plugins = Registry::new();

        assert_eq!(
            loops("{{~ for [k, v] in ages }}{{ k }}={{ v }};{{~ endfor }}", &store, &plugins),
            "ada=36;alan=41;"
        );
        assert_eq!(
            loops("{{~ for [i, l] in letters }}{{ i }}{{ l }}{{~ endfor }}", &store, &plugins),
            "0x1y"
        );
    }

    #[test]
    fn test_loops_nested_see_outer_binding() {
        let store = Store::new().with_must(
            "groups",
            json!([
                {"name": "a", "members": [1, 2]},
                {"name": "b", "members": [3]}
            ]),
        );

        assert_eq!(
            loops(
                "{{~ for g in groups }}[{{~ for m in g.members }}{{ g.name }}{{ m }}{{~ endfor }}]{{~ endfor }}",
                &store,
                &Registry::new()
            ),
            "[a1a2][b3]"
        );
    }

    #[test]
    fn test_loops_missing_source_is_empty() {
        assert_eq!(
            loops("-{{~ for x in ghost }}{{ x }}{{~ endfor }}-", &Store::new(), &Registry::new()),
            "--"
        );
    }

    #[test]
    fn test_loops_unbalanced_are_literal() {
        let store = Store::new().with_must("xs", json!([1]));
        let plugins = Registry::new();

        assert_eq!(
            loops("{{~ endfor }}{{ x }}", &store, &plugins),
            "{{~ endfor }}{{ x }}"
        );
        assert_eq!(
            loops("a{{~ for x in xs }}{{ x }}", &store, &plugins),
            "a{{~ for x in xs }}{{ x }}"
        );
    }

    #[test]
    fn test_loops_leave_outside_text_uninterpolated() {
        let store = Store::new().with_must("xs", json!([1]));

        assert_eq!(
            loops("{{ name }}{{~ for x in xs }}{{ x }}{{~ endfor }}", &store, &Registry::new()),
            "{{ name }}1"
        );
    }

    #[test]
    fn test_loops_output_is_not_interpolated_again() {
        let store = Store::new()
            .with_must("codes", json!(["{{ secret }}"]))
            .with_must("secret", "leaked");

        let result = loops("{{~ for c in codes }}<{{ c }}>{{~ endfor }}", &store, &Registry::new());
        assert_eq!(unseal(&result), "<{{ secret }}>");
    }
}
