//! Template scanner
//!
//! Extracts `{{ .Values.<path> }}` references from raw Helm template text in a
//! single forward pass. Only a small slice of the Go template grammar is
//! understood:
//!
//! ```text
//! {{ .Values.image.tag }}
//! {{ .Values.port | default 8080 }}
//! {{ .Values.host | default "example.com" | quote }}
//! ```
//!
//! Anything else between delimiters (control flow, function calls, trim
//! markers) is skipped. The scanner never fails: when an expression cannot
//! be recognized the attempt is dropped and scanning resumes right after the
//! `{{` that started it.

use crate::reference::ValueRef;

const OPEN: &[u8] = b"{{";
const CLOSE: &[u8] = b"}}";
const VALUES_PREFIX: &[u8] = b".Values.";
const PIPE: u8 = b'|';
const DEFAULT_FUNC: &[u8] = b"default";

/// Scan a template body and return every value reference in order of appearance
pub fn scan(content: &str, source: &str) -> Vec<ValueRef> {
    Scanner::new(content, source).run()
}

struct Scanner<'a> {
    input: &'a [u8],
    source: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str, source: &'a str) -> Self {
        Self {
            input: content.as_bytes(),
            source,
            pos: 0,
            line: 1,
        }
    }

    fn run(mut self) -> Vec<ValueRef> {
        let mut refs = Vec::new();

        while self.pos < self.input.len() {
            if !self.starts_with(OPEN) {
                self.advance();
                continue;
            }

            let line = self.line;
            self.pos += OPEN.len();
            let resume = self.pos;

            match self.value_ref(line) {
                Some(r) => refs.push(r),
                None => {
                    // Resync just past the delimiter; nothing consumed counts.
                    self.pos = resume;
                    self.line = line;
                }
            }
        }

        refs
    }

    /// Parse the body of one `{{ ... }}` expression, positioned after `{{`
    fn value_ref(&mut self, line: usize) -> Option<ValueRef> {
        self.skip_whitespace();
        if !self.eat(VALUES_PREFIX) {
            return None;
        }

        let path = self.path()?;
        let mut default_value = String::new();
        let mut first_segment = true;

        loop {
            self.skip_whitespace();
            if self.peek() != Some(PIPE) {
                break;
            }
            self.advance();
            self.skip_whitespace();

            if first_segment && self.eat_keyword(DEFAULT_FUNC) {
                self.skip_whitespace();
                default_value = self.default_literal()?;
            }
            first_segment = false;

            self.skip_segment();
        }

        self.skip_whitespace();
        if !self.eat(CLOSE) {
            return None;
        }

        Some(ValueRef::new(path, default_value, self.source, line))
    }

    /// Dot-separated path after `.Values.`
    ///
    /// Returns `None` for an empty path, a trailing dot, or two adjacent dots.
    fn path(&mut self) -> Option<String> {
        let start = self.pos;
        let mut last_was_dot = true;

        while let Some(ch) = self.peek() {
            if ch == b'.' {
                if last_was_dot {
                    return None;
                }
                last_was_dot = true;
            } else if is_path_char(ch) {
                last_was_dot = false;
            } else {
                break;
            }
            self.pos += 1;
        }

        if last_was_dot {
            return None;
        }

        // Path bytes are ASCII, so the slice is valid UTF-8.
        Some(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    /// Literal following `default`: a quoted string or a bare number
    fn default_literal(&mut self) -> Option<String> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.advance();
                let mut value = Vec::new();
                let mut escaped = false;

                while let Some(ch) = self.peek() {
                    self.advance();
                    if escaped {
                        value.push(ch);
                        escaped = false;
                    } else if ch == b'\\' {
                        escaped = true;
                    } else if ch == quote {
                        return Some(String::from_utf8_lossy(&value).into_owned());
                    } else {
                        value.push(ch);
                    }
                }

                // Unterminated quote
                None
            }
            Some(ch) if ch.is_ascii_digit() => {
                let start = self.pos;
                while matches!(self.peek(), Some(ch) if ch.is_ascii_digit() || ch == b'.') {
                    self.pos += 1;
                }
                Some(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
            }
            // Anything else (a field, a function call) carries no literal default
            _ => Some(String::new()),
        }
    }

    /// Skip the rest of a pipe segment, stopping at the next `|` or `}}`
    fn skip_segment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == PIPE || self.starts_with(CLOSE) {
                break;
            }
            self.advance();
        }
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) {
        if self.peek() == Some(b'\n') {
            self.line += 1;
        }
        self.pos += 1;
    }

    fn starts_with(&self, token: &[u8]) -> bool {
        self.input[self.pos..].starts_with(token)
    }

    fn eat(&mut self, token: &[u8]) -> bool {
        if self.starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Like `eat`, but the keyword must not run into an identifier
    fn eat_keyword(&mut self, keyword: &[u8]) -> bool {
        if !self.starts_with(keyword) {
            return false;
        }
        match self.input.get(self.pos + keyword.len()) {
            Some(&next) if is_path_char(next) => false,
            _ => {
                self.pos += keyword.len();
                true
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.advance();
        }
    }
}

fn is_path_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, b'.' | b'-' | b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(refs: &[ValueRef]) -> Vec<&str> {
        refs.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_simple_reference() {
        let refs = scan("name: {{ .Values.name }}", "t.yaml");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, "name");
        assert_eq!(refs[0].default_value, "");
        assert_eq!(refs[0].source_file, "t.yaml");
        assert_eq!(refs[0].line_number, 1);
    }

    #[test]
    fn test_no_reference() {
        assert!(scan("apiVersion: v1\nkind: ConfigMap\n", "t.yaml").is_empty());
        assert!(scan("", "t.yaml").is_empty());
    }

    #[test]
    fn test_non_values_reference_ignored() {
        let refs = scan("{{ .Release.Name }} {{ include \"x\" . }} {{ .Values.a }}", "t.yaml");
        assert_eq!(paths(&refs), vec!["a"]);
    }

    #[test]
    fn test_nested_path() {
        let refs = scan("{{ .Values.gateway.domain }}", "t.yaml");
        assert_eq!(paths(&refs), vec!["gateway.domain"]);
    }

    #[test]
    fn test_path_with_dash_and_underscore() {
        let refs = scan("{{ .Values.my-app.some_key2 }}", "t.yaml");
        assert_eq!(paths(&refs), vec!["my-app.some_key2"]);
    }

    #[test]
    fn test_missing_close_ignored() {
        assert!(scan("{{ .Values.name", "t.yaml").is_empty());
        assert!(scan("{{ .Values.name }", "t.yaml").is_empty());
    }

    #[test]
    fn test_invalid_paths_ignored() {
        assert!(scan("{{ .Values. }}", "t.yaml").is_empty());
        assert!(scan("{{ .Values.a..b }}", "t.yaml").is_empty());
        assert!(scan("{{ .Values.a. }}", "t.yaml").is_empty());
        assert!(scan("{{ .Values..a }}", "t.yaml").is_empty());
        assert!(scan("{{ .Values.a$b }}", "t.yaml").is_empty());
        assert!(scan("{{ .Values.list[0] }}", "t.yaml").is_empty());
    }

    #[test]
    fn test_whitespace_tolerance() {
        let refs = scan("{{.Values.a}} {{   .Values.b\t|\tdefault   \"x\"   }}", "t.yaml");
        assert_eq!(paths(&refs), vec!["a", "b"]);
        assert_eq!(refs[1].default_value, "x");
    }

    #[test]
    fn test_quoted_defaults() {
        let refs = scan(
            r#"{{ .Values.a | default "double" }} {{ .Values.b | default 'single' }}"#,
            "t.yaml",
        );
        assert_eq!(refs[0].default_value, "double");
        assert_eq!(refs[1].default_value, "single");
    }

    #[test]
    fn test_numeric_defaults() {
        let refs = scan("{{ .Values.port | default 80 }} {{ .Values.ratio | default 0.5 }}", "t.yaml");
        assert_eq!(refs[0].default_value, "80");
        assert_eq!(refs[1].default_value, "0.5");
    }

    #[test]
    fn test_escaped_quotes_in_default() {
        let refs = scan(r#"{{ .Values.msg | default "say \"hi\"" }}"#, "t.yaml");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].default_value, r#"say "hi""#);

        let refs = scan(r#"{{ .Values.msg | default 'it\'s' }}"#, "t.yaml");
        assert_eq!(refs[0].default_value, "it's");
    }

    #[test]
    fn test_delimiters_inside_quoted_default() {
        let refs = scan(r#"{{ .Values.tpl | default "a }} | b" }}"#, "t.yaml");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].default_value, "a }} | b");
    }

    #[test]
    fn test_unterminated_quote_ignored() {
        let refs = scan(r#"{{ .Values.a | default "oops }}"#, "t.yaml");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_unterminated_attempt_does_not_swallow_later_reference() {
        let refs = scan("{{ .Values.a | default \"oops }}\n{{ .Values.b }}", "t.yaml");
        assert_eq!(paths(&refs), vec!["b"]);
        assert_eq!(refs[0].line_number, 2);
    }

    #[test]
    fn test_multiple_pipes() {
        let refs = scan(r#"{{ .Values.host | default "example.com" | quote }}"#, "t.yaml");
        assert_eq!(refs[0].default_value, "example.com");

        let refs = scan(r#"{{ .Values.name | quote | upper }}"#, "t.yaml");
        assert_eq!(refs[0].path, "name");
        assert_eq!(refs[0].default_value, "");
    }

    #[test]
    fn test_only_first_segment_default_counts() {
        let refs = scan(r#"{{ .Values.a | default "one" | default "two" }}"#, "t.yaml");
        assert_eq!(refs[0].default_value, "one");

        let refs = scan(r#"{{ .Values.b | quote | default "late" }}"#, "t.yaml");
        assert_eq!(refs[0].default_value, "");
    }

    #[test]
    fn test_default_keyword_must_be_exact() {
        let refs = scan(r#"{{ .Values.a | defaultx "nope" }}"#, "t.yaml");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].default_value, "");
    }

    #[test]
    fn test_default_from_other_value_is_empty() {
        let refs = scan("{{ .Values.a | default .Values.b }}", "t.yaml");
        assert_eq!(paths(&refs), vec!["a"]);
        assert_eq!(refs[0].default_value, "");
    }

    #[test]
    fn test_trim_markers_skipped() {
        assert!(scan("{{- .Values.a -}}", "t.yaml").is_empty());
    }

    #[test]
    fn test_multiline_line_numbers() {
        let content = "apiVersion: v1\n\
                       metadata:\n  name: {{ .Values.name }}\n\
                       spec:\n  port: {{ .Values.port | default 80 }} {{ .Values.host }}\n";
        let refs = scan(content, "svc.yaml");
        assert_eq!(paths(&refs), vec!["name", "port", "host"]);
        assert_eq!(refs[0].line_number, 3);
        assert_eq!(refs[1].line_number, 5);
        assert_eq!(refs[2].line_number, 5);
    }

    #[test]
    fn test_line_counting_across_multiline_expression() {
        let content = "{{\n  .Values.a\n}}\n{{ .Values.b }}";
        let refs = scan(content, "t.yaml");
        assert_eq!(paths(&refs), vec!["a", "b"]);
        assert_eq!(refs[0].line_number, 1);
        assert_eq!(refs[1].line_number, 4);
    }

    #[test]
    fn test_abandoned_attempt_keeps_line_count() {
        let content = "{{\n\n .Release.Name }}\n{{ .Values.a }}";
        let refs = scan(content, "t.yaml");
        assert_eq!(refs[0].line_number, 4);
    }

    #[test]
    fn test_scan_is_repeatable() {
        let content = "{{ .Values.a }}\n{{ .Values.b | default \"x\" }}";
        assert_eq!(scan(content, "t.yaml"), scan(content, "t.yaml"));
    }
}
