use crate::log::{Error, Kind};
use serde::Serialize;
use serde_json::{to_value, Map, Value};

/// Describes a type that variables can be read from by name.
pub trait Lookup {
    /// Return the [`Value`] stored under the given top level name, if any.
    fn get(&self, name: &str) -> Option<&Value>;
}

/// Provides storage for the data that a view is rendered with.
///
/// Keys keep the order they were inserted in, which is the order `for`
/// loops walk an object in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    data: Map<String, Value>,
}

impl Store {
    /// Create a new [`Store`].
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Store;
    ///
    /// let store = Store::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self { data: Map::new() }
    }

    /// Create a [`Store`] from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the value is not an object.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Store;
    /// use serde_json::json;
    ///
    /// let store = Store::from_value(json!({"name": "taylor"})).unwrap();
    /// assert_eq!(store.get("name").unwrap(), "taylor");
    /// ```
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(Error::build(
                Kind::Render,
                format!("store data must be an object, received `{other}`"),
            )),
        }
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Store;
    ///
    /// let mut store = Store::new();
    /// let result = store.insert("name", "taylor");
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let key = key.into();
        let value = to_value(value).map_err(|e| {
            Error::build(Kind::Render, format!("value for `{key}` is unserializable"))
                .with_help(e.to_string())
        })?;
        self.data.insert(key, value);

        Ok(())
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.data
            .insert(key.into(), to_value(value).expect("value must serialize"));
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    #[inline]
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Store;
    ///
    /// let store = Store::new().with_must("name", "taylor");
    /// assert_eq!(store.get("name").unwrap(), "taylor");
    /// ```
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Set a [`Value`] that was already produced by the renderer.
    #[inline]
    pub(crate) fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    /// Returns a reference to the [`Value`] corresponding to the key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Return the number of top level keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return true if the [`Store`] holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Lookup for Store {
    #[inline]
    fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

impl From<Map<String, Value>> for Store {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

/// Wrapper for a [`Lookup`] that provides mutable storage for shadowed values.
///
/// Used for loop bindings and partial parameters, which must not leak into
/// the underlying data.
pub struct Shadow<'base> {
    base: &'base dyn Lookup,
    frames: Vec<Map<String, Value>>,
}

impl<'base> Shadow<'base> {
    /// Create a new [`Shadow`] with one empty frame over the given base.
    #[inline]
    pub fn new(base: &'base dyn Lookup) -> Self {
        Self {
            base,
            frames: vec![Map::new()],
        }
    }

    /// Push a new frame onto the [`Shadow`].
    #[inline]
    pub fn push(&mut self) {
        self.frames.push(Map::new());
    }

    /// Remove the top frame from the [`Shadow`].
    ///
    /// # Panics
    ///
    /// Panics when asked to remove the last frame.
    #[inline]
    pub fn pop(&mut self) {
        if self.frames.len() == 1 {
            panic!("last frame must never be removed");
        }
        self.frames.pop();
    }

    /// Insert the value into the top frame of the [`Shadow`].
    #[inline]
    pub fn insert<S>(&mut self, key: S, value: Value)
    where
        S: Into<String>,
    {
        self.frames
            .last_mut()
            .expect("shadow always holds a frame")
            .insert(key.into(), value);
    }

    /// Insert every entry of the object into the top frame.
    pub fn extend(&mut self, object: Map<String, Value>) {
        for (key, value) in object {
            self.insert(key, value);
        }
    }
}

impl Lookup for Shadow<'_> {
    fn get(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.base.get(name))
    }
}

/// Follow a dot separated path like `user.address.city` through the given
/// [`Lookup`].
///
/// Segments index into objects by key and into arrays by position. Any
/// missing segment short circuits to `None`.
pub fn path<'a>(lookup: &'a dyn Lookup, path: &str) -> Option<&'a Value> {
    let mut segments = path.trim().split('.');
    let mut value = lookup.get(segments.next()?.trim())?;

    for segment in segments {
        let segment = segment.trim();
        value = match value {
            Value::Object(object) => object.get(segment)?,
            Value::Array(array) => array.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(value)
}
