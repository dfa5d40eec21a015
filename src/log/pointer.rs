use super::{RESET, YELLOW};
use crate::region::Region;
use std::{
    cmp::max,
    fmt::{Debug, Formatter, Result},
};
use unicode_width::UnicodeWidthStr;

const BLANK: &str = "";
const PIPE: &str = "|";
const EQUAL: &str = "=";
const HIGHLIGHT: &str = "^";

/// Describes a type that can be associated with an Error and used
/// to print a visualization.
pub trait Visual: Debug + Send + Sync {
    /// Display the visualization by writing to the given Formatter.
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result;
}

/// A type of [`Visual`] that points to a specific location within source text.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// Zero indexed line being pointed to.
    line: usize,
    /// Zero indexed display column within the line.
    column: usize,
    /// Display width of the highlighted text.
    length: usize,
    /// The line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new [`Pointer`] over the given source text and [`Region`].
    ///
    /// A region that falls outside of the source is clamped to its end.
    pub fn new(source: &str, region: Region) -> Self {
        let begin = floor_boundary(source, region.begin);
        let end = floor_boundary(source, max(begin, region.end));

        let line_start = source[..begin].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[begin..]
            .find('\n')
            .map_or(source.len(), |i| begin + i);
        let line = source[..begin].matches('\n').count();
        // Only the part of the region on the first line is highlighted.
        let highlighted = &source[begin..end.min(line_end).max(begin)];

        Self {
            line,
            column: source[line_start..begin].width(),
            length: max(1, highlighted.width()),
            text: source[line_start..line_end].to_string(),
        }
    }
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = (self.line + 1).to_string();
        let col = self.column + 1;
        let pad = num.width();
        let align = self.column + self.length;
        let name = template.unwrap_or("?");
        let text = &self.text;
        let underline = HIGHLIGHT.repeat(self.length);

        write!(
            formatter,
            "\n {BLANK:pad$}--> {name}:{num}:{col}\
             \n {BLANK:pad$} {PIPE}\
             \n {num:>} {PIPE} {text}\
             \n {BLANK:pad$} {PIPE} {YELLOW}{underline:>align$}{RESET}\
             \n {BLANK:pad$} {PIPE}\n",
        )?;

        if let Some(help) = help {
            writeln!(formatter, "{BLANK:pad$} {EQUAL} help: {help}")?;
        }

        Ok(())
    }
}

/// Return the closest char boundary at or before `index`.
fn floor_boundary(source: &str, index: usize) -> usize {
    let mut index = index.min(source.len());
    while !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::Pointer;
    use crate::region::Region;

    #[test]
    fn test_pointer_second_line() {
        let pointer = Pointer::new("<ul>\n  {{ item }}\n</ul>", Region::new(7..17));

        assert_eq!(pointer.line, 1);
        assert_eq!(pointer.column, 2);
        assert_eq!(pointer.length, 10);
        assert_eq!(pointer.text, "  {{ item }}");
    }

    #[test]
    fn test_pointer_out_of_bounds() {
        let pointer = Pointer::new("abc", Region::new(10..20));

        assert_eq!(pointer.column, 3);
        assert_eq!(pointer.length, 1);
    }

    #[test]
    fn test_pointer_wide_characters() {
        let pointer = Pointer::new("名前 {{ x }}", Region::new(7..15));

        assert_eq!(pointer.column, 5);
    }
}
