/// Literal, case-insensitive pattern for free-text search.
pub fn create_regex(pattern: &str) -> anyhow::Result<regex::Regex> {
    regex::RegexBuilder::new(&regex::escape(pattern))
        .case_insensitive(true)
        .build()
        .map_err(|e| e.into())
}

/// Makes serialized JSON safe to embed verbatim inside a `<script>` element.
pub fn escape_script_json(json: &str) -> String {
    // `<` only ever appears inside JSON strings, where `\u003c` is equivalent.
    json.replace('<', "\\u003c")
}

/// Element id fragment derived from free text.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_regex_is_literal_and_case_insensitive() {
        let re = create_regex("a.b").unwrap();
        assert!(re.is_match("xA.By"));
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn test_create_regex_rejects_oversized_pattern() {
        assert!(create_regex(&"z".repeat(200_000)).is_err());
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("janeiro"), "janeiro");
        assert_eq!(slug("Black Friday!!"), "black-friday");
    }

    #[test]
    fn test_escape_script_json() {
        assert_eq!(escape_script_json(r#"{"a":"</script>"}"#), r#"{"a":"\u003c/script>"}"#);
    }
}
