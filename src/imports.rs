//! Go import declaration scanner.
//!
//! Extracts the import paths of a Go source file together with the line each
//! import spec starts on. Only the file header is examined: the `package`
//! clause followed by any number of `import` declarations, single or grouped,
//! with optional `name`, `_` or `.` qualifiers.

use regex::Regex;
use std::sync::LazyLock;

static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpackage\s+[\p{L}_][\p{L}\p{N}_]*").expect("valid regex"));

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bimport\b").expect("valid regex"));

/// First top-level declaration that ends the import section.
static DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(func|var|const|type)\b").expect("valid regex"));

static SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:([\p{L}_][\p{L}\p{N}_]*|\.)\s+)?("(?:[^"\\\n]|\\.)*"|`[^`]*`)"#)
        .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub path: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Parse the import declarations of a Go source file.
pub fn parse_imports(src: &str) -> Result<Vec<ImportRef>, ParseError> {
    let text = blank_comments(src);

    let package = PACKAGE_RE.find(&text).ok_or_else(|| ParseError {
        line: 1,
        message: "expected 'package' clause".to_string(),
    })?;

    let header_start = package.end();
    let header_end = DECL_RE
        .find_at(&text, header_start)
        .map(|m| m.start())
        .unwrap_or(text.len());

    let mut imports = Vec::new();
    let mut cursor = header_start;
    while let Some(keyword) = IMPORT_RE.find_at(&text[..header_end], cursor) {
        let mut pos = skip_space(&text, keyword.end()).min(header_end);

        if text[pos..].starts_with('(') {
            let close = text[pos..header_end]
                .find(')')
                .map(|i| pos + i)
                .ok_or_else(|| error_at(&text, keyword.start(), "unterminated import group"))?;
            pos += 1;
            loop {
                pos = skip_separators(&text, pos);
                if pos >= close {
                    break;
                }
                let (import, next) = parse_spec(&text, pos, close)?;
                imports.push(import);
                pos = next;
            }
            cursor = close + 1;
        } else {
            let (import, next) = parse_spec(&text, pos, header_end)?;
            imports.push(import);
            cursor = next;
        }
    }

    Ok(imports)
}

fn parse_spec(text: &str, pos: usize, limit: usize) -> Result<(ImportRef, usize), ParseError> {
    let caps = SPEC_RE
        .captures(&text[pos..limit])
        .ok_or_else(|| error_at(text, pos, "malformed import spec"))?;
    let literal = caps.get(2).ok_or_else(|| error_at(text, pos, "missing import path"))?;
    let spec_start = pos + caps.get(1).unwrap_or(literal).start();

    let path = unquote(literal.as_str()).ok_or_else(|| error_at(text, pos, "invalid import path"))?;
    if path.is_empty() {
        return Err(error_at(text, spec_start, "empty import path"));
    }

    Ok((
        ImportRef {
            path,
            line: line_of(text, spec_start),
        },
        pos + literal.end(),
    ))
}

fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal.strip_prefix('`') {
        return raw.strip_suffix('`').map(str::to_string);
    }
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                // import paths never need other escapes
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn skip_space(text: &str, pos: usize) -> usize {
    pos + text[pos..].len() - text[pos..].trim_start().len()
}

fn skip_separators(text: &str, pos: usize) -> usize {
    pos + text[pos..].len()
        - text[pos..]
            .trim_start_matches(|c: char| c.is_whitespace() || c == ';')
            .len()
}

fn line_of(text: &str, pos: usize) -> usize {
    text[..pos].bytes().filter(|b| *b == b'\n').count() + 1
}

fn error_at(text: &str, pos: usize, message: &str) -> ParseError {
    ParseError {
        line: line_of(text, pos),
        message: message.to_string(),
    }
}

/// Replace comments with spaces, keeping newlines and byte offsets intact.
/// String and rune literals are copied verbatim.
fn blank_comments(src: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        Line,
        Block,
        Str(char),
    }

    let mut out = String::with_capacity(src.len());
    let mut state = State::Code;
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Block;
                }
                '"' | '`' | '\'' => {
                    out.push(c);
                    state = State::Str(c);
                }
                _ => out.push(c),
            },
            State::Line => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    push_blank(&mut out, c);
                }
            }
            State::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    push_blank(&mut out, c);
                }
            }
            State::Str(quote) => {
                out.push(c);
                if c == '\\' && quote != '`' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || (c == '\n' && quote != '`') {
                    state = State::Code;
                }
            }
        }
    }
    out
}

fn push_blank(out: &mut String, c: char) {
    for _ in 0..c.len_utf8() {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(src: &str) -> Vec<(String, usize)> {
        parse_imports(src)
            .unwrap()
            .into_iter()
            .map(|i| (i.path, i.line))
            .collect()
    }

    #[test]
    fn test_single_import() {
        let src = "package main\nimport \"fmt\"\n";
        assert_eq!(paths(src), vec![("fmt".to_string(), 2)]);
    }

    #[test]
    fn test_grouped_imports_with_qualifiers() {
        let src = r#"package main

import (
	"fmt"
	toml "github.com/pelletier/go-toml"
	_ "github.com/lib/pq"
	. "math"
)

func main() {}
"#;
        assert_eq!(
            paths(src),
            vec![
                ("fmt".to_string(), 4),
                ("github.com/pelletier/go-toml".to_string(), 5),
                ("github.com/lib/pq".to_string(), 6),
                ("math".to_string(), 7),
            ]
        );
    }

    #[test]
    fn test_multiple_declarations_and_comments() {
        let src = r#"// Package x does things.
// import "github.com/not/real"
package x

/* import "github.com/also/not" */
import "os" // import "github.com/trailing"
import (
	// "github.com/commented/out"
	"strings"; "bytes"
)
"#;
        assert_eq!(
            paths(src),
            vec![
                ("os".to_string(), 6),
                ("strings".to_string(), 9),
                ("bytes".to_string(), 9),
            ]
        );
    }

    #[test]
    fn test_imports_after_declarations_are_ignored() {
        let src = "package main\nimport \"fmt\"\nfunc f() { s := \"import \\\"x\\\"\" }\n";
        assert_eq!(paths(src), vec![("fmt".to_string(), 2)]);
    }

    #[test]
    fn test_raw_string_import() {
        let src = "package main\nimport `github.com/x/y`\n";
        assert_eq!(paths(src), vec![("github.com/x/y".to_string(), 2)]);
    }

    #[test]
    fn test_no_imports() {
        assert!(paths("package main\n\nfunc main() {}\n").is_empty());
    }

    #[test]
    fn test_missing_package_clause() {
        let err = parse_imports("import \"fmt\"\n").unwrap_err();
        assert!(err.message.contains("package"));
    }

    #[test]
    fn test_unterminated_group() {
        let err = parse_imports("package main\nimport (\n\t\"fmt\"\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_malformed_spec() {
        assert!(parse_imports("package main\nimport fmt\n").is_err());
    }
}
