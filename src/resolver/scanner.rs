//! Textual `#include` scanner.
//!
//! Lines are matched one at a time. Comments, string literals and
//! conditional compilation are not interpreted: an include inside `#if 0`
//! still counts.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::header::{HeaderRef, IncludeStyle};

/// Any line that starts an include directive, well formed or not.
static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*include\b").expect("valid directive regex"));

/// A complete include directive with a `"..."` or `<...>` target.
static INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*#\s*include\b\s*(?:"([^"]*)"|<([^>]*)>)"#).expect("valid include regex")
});

/// An include line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedInclude {
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

/// Result of scanning one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    /// Well-formed includes, in file order
    pub includes: Vec<HeaderRef>,
    /// Lines that looked like includes but were skipped
    pub malformed: Vec<MalformedInclude>,
}

/// Extracts include directives from C/C++ source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeScanner;

impl IncludeScanner {
    pub fn new() -> Self {
        IncludeScanner
    }

    /// Ordered include targets of `text`. Malformed lines are dropped.
    pub fn scan(&self, text: &str) -> Vec<HeaderRef> {
        self.scan_detailed(text).includes
    }

    /// Like [`scan`](Self::scan), but also reports skipped lines.
    pub fn scan_detailed(&self, text: &str) -> ScanOutput {
        let mut output = ScanOutput::default();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;

            if !DIRECTIVE.is_match(line) {
                continue;
            }

            match parse_directive(line) {
                Some((name, style)) => output.includes.push(HeaderRef {
                    name,
                    style,
                    line: line_no,
                }),
                None => output.malformed.push(MalformedInclude {
                    line: line_no,
                    text: line.trim().to_string(),
                }),
            }
        }

        output
    }
}

fn parse_directive(line: &str) -> Option<(String, IncludeStyle)> {
    let caps = INCLUDE.captures(line)?;

    let (name, style) = match (caps.get(1), caps.get(2)) {
        (Some(m), _) => (m.as_str(), IncludeStyle::Quoted),
        (None, Some(m)) => (m.as_str(), IncludeStyle::Angle),
        (None, None) => return None,
    };

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some((name.to_string(), style))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(refs: &[HeaderRef]) -> Vec<(&str, IncludeStyle)> {
        refs.iter().map(|r| (r.name.as_str(), r.style)).collect()
    }

    #[test]
    fn test_scan_both_styles_in_order() {
        let text = "#include <stdio.h>\n#include \"util.h\"\nint main() { return 0; }\n";
        let refs = IncludeScanner::new().scan(text);

        assert_eq!(
            names(&refs),
            vec![
                ("stdio.h", IncludeStyle::Angle),
                ("util.h", IncludeStyle::Quoted)
            ]
        );
        assert_eq!(refs[0].line, 1);
        assert_eq!(refs[1].line, 2);
    }

    #[test]
    fn test_scan_whitespace_variants() {
        let text = "  #include \"a.h\"\n#  include <b.h>\n\t# \tinclude\"c.h\"\r\n#include <d.h> // trailing\n";
        let refs = IncludeScanner::new().scan(text);

        assert_eq!(
            names(&refs),
            vec![
                ("a.h", IncludeStyle::Quoted),
                ("b.h", IncludeStyle::Angle),
                ("c.h", IncludeStyle::Quoted),
                ("d.h", IncludeStyle::Angle),
            ]
        );
    }

    #[test]
    fn test_conditional_blocks_are_scanned() {
        let text = "#if 0\n#include \"dead.h\"\n#endif\n#ifdef WIN32\n#include <windows.h>\n#endif\n";
        let refs = IncludeScanner::new().scan(text);

        assert_eq!(
            names(&refs),
            vec![
                ("dead.h", IncludeStyle::Quoted),
                ("windows.h", IncludeStyle::Angle)
            ]
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "#include \"unterminated.h\n#include <also\n#include\n#include \"\"\n#include CONFIG_H\n#include \"ok.h\"\n";
        let out = IncludeScanner::new().scan_detailed(text);

        assert_eq!(names(&out.includes), vec![("ok.h", IncludeStyle::Quoted)]);
        assert_eq!(out.includes[0].line, 6);
        assert_eq!(
            out.malformed.iter().map(|m| m.line).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn test_ignores_non_include_directives() {
        let text = "#define INCLUDE_ME 1\n#include_next <stdlib.h>\n#pragma once\n// #include is mentioned here\nx = \"#include <no.h>\";\n";
        let out = IncludeScanner::new().scan_detailed(text);

        assert!(out.includes.is_empty());
        assert!(out.malformed.is_empty());
    }

    #[test]
    fn test_nested_directory_targets() {
        let refs = IncludeScanner::new().scan("#include \"../common/defs.h\"\n#include <sys/types.h>\n");
        assert_eq!(refs[0].name, "../common/defs.h");
        assert_eq!(refs[1].name, "sys/types.h");
    }

    #[test]
    fn test_leading_byte_order_mark() {
        let out = IncludeScanner::new().scan_detailed("\u{feff}#include \"first.h\"\n#include <second.h>\n");

        assert_eq!(out.includes.len(), 2);
        assert_eq!(out.includes[0].name, "first.h");
        assert_eq!(out.includes[0].line, 1);
        assert!(out.malformed.is_empty());
    }
}
