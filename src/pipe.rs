use serde_json::{Map, Number, Value};
use std::fmt::{Display, Result, Write};

/// Wraps some underlying buffer by providing methods that write rendered
/// values to it, optionally escaping them for HTML.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
    escape: bool,
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes text to the given buffer unchanged.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self {
            buffer,
            escape: false,
        }
    }

    /// Create a new Pipe that escapes everything written through it.
    pub fn escaped(buffer: &'buffer mut String) -> Self {
        Self {
            buffer,
            escape: true,
        }
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// Strings are written without quotes, `null` writes nothing, arrays are
    /// joined with commas and objects are written as JSON.
    ///
    /// # Errors
    ///
    /// The only error that will be returned is propagated from the underlying
    /// buffer itself.
    pub fn write_value(&mut self, value: &Value) -> Result {
        match value {
            Value::Null => Ok(()),
            Value::String(string) => self.write_str(string),
            Value::Number(number) => self.write_number(number),
            Value::Array(array) => self.write_array(array),
            Value::Object(object) => self.write_object(object),
            Value::Bool(bool) => self.write_display(bool),
        }
    }

    /// Write the value to the buffer using the Display implementation.
    fn write_display(&mut self, value: impl Display) -> Result {
        write!(self, "{value}")
    }

    /// Write the number without a trailing fraction when it is whole.
    fn write_number(&mut self, number: &Number) -> Result {
        if number.is_f64() {
            if let Some(float) = number.as_f64() {
                return self.write_display(float);
            }
        }
        self.write_display(number)
    }

    /// Write the items of the array separated by commas.
    fn write_array(&mut self, array: &[Value]) -> Result {
        let mut iter = array.iter();
        if let Some(item) = iter.next() {
            self.write_value(item)?;
            for item in iter {
                self.write_char(',')?;
                self.write_value(item)?;
            }
        }
        Ok(())
    }

    /// Write the object as compact JSON.
    fn write_object(&mut self, object: &Map<String, Value>) -> Result {
        let json = serde_json::to_string(object).map_err(|_| std::fmt::Error)?;
        self.write_str(&json)
    }
}

impl Write for Pipe<'_> {
    fn write_str(&mut self, s: &str) -> Result {
        if !self.escape {
            return self.buffer.write_str(s);
        }
        for c in s.chars() {
            self.write_char(c)?;
        }
        Ok(())
    }

    fn write_char(&mut self, c: char) -> Result {
        if !self.escape {
            return self.buffer.write_char(c);
        }
        match c {
            '&' => self.buffer.write_str("&amp;"),
            '<' => self.buffer.write_str("&lt;"),
            '>' => self.buffer.write_str("&gt;"),
            '"' => self.buffer.write_str("&quot;"),
            '\'' => self.buffer.write_str("&#39;"),
            '`' => self.buffer.write_str("&#x60;"),
            '=' => self.buffer.write_str("&#x3D;"),
            '/' => self.buffer.write_str("&#x2F;"),
            c => self.buffer.write_char(c),
        }
    }
}

/// Return the text a value renders as, unescaped.
pub fn stringify(value: &Value) -> String {
    let mut buffer = String::new();
    // Writing into a String cannot fail.
    let _ = Pipe::new(&mut buffer).write_value(value);
    buffer
}
