use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)##[^\r\n]*").expect("valid comment pattern"));

/// Remove `##` comments, from the marker to the end of its line.
pub fn strip(text: &str) -> String {
    COMMENT.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::strip;

    #[test]
    fn test_strip() {
        assert_eq!(strip("## note\n<p>a</p> ## trailing\r\nb"), "\n<p>a</p> \r\nb");
        assert_eq!(strip("no comments # here"), "no comments # here");
    }
}
