//! Resource filtering for unified diffs
//!
//! A unified diff is a sequence of per-file sections, each opened by a
//! `diff --git a/<old> b/<new>` header. Sections whose new path is a resource
//! file are dropped whole; everything else is passed through untouched and in
//! order.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::classify::ResourceRules;

/// Marker that opens a per-file section
pub const SECTION_HEADER: &str = "diff --git";

/// What the filter kept and dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    /// Sections passed through
    pub kept_files: usize,
    /// Sections removed as resources
    pub dropped_files: usize,
    /// Kept sections per source category
    pub categories: BTreeMap<&'static str, usize>,
}

/// Remove the sections of resource files from `raw`.
///
/// Returns an empty string when every section is a resource file.
pub fn filter_diff(raw: &str, rules: &ResourceRules) -> String {
    filter_diff_with_stats(raw, rules).0
}

/// [`filter_diff`], also reporting per-section statistics
pub fn filter_diff_with_stats(raw: &str, rules: &ResourceRules) -> (String, DiffStats) {
    let mut stats = DiffStats::default();
    let mut kept: Vec<&str> = Vec::new();
    // lines ahead of the first header are passed through
    let mut in_resource = false;

    for line in raw.split('\n') {
        if line.starts_with(SECTION_HEADER) {
            in_resource = match section_path(line) {
                Some(path) => {
                    let class = rules.classify(&path);
                    if class.is_resource {
                        stats.dropped_files += 1;
                    } else {
                        stats.kept_files += 1;
                        if let Some(category) = class.source_category {
                            *stats.categories.entry(category).or_default() += 1;
                        }
                    }
                    class.is_resource
                }
                // unparsable header, keep the section
                None => {
                    stats.kept_files += 1;
                    false
                }
            };
        }

        if !in_resource {
            kept.push(line);
        }
    }

    (kept.join("\n"), stats)
}

/// New path of a section header.
///
/// Plain paths follow the last ` b/` marker. Paths git had to quote
/// (`"b/\355\205\215.png"`) are unescaped first.
fn section_path(header: &str) -> Option<Cow<'_, str>> {
    if let Some(quoted) = header.strip_suffix('"') {
        let (_, path) = quoted.rsplit_once(" \"b/")?;
        return unquote(path).filter(|path| !path.is_empty()).map(Cow::Owned);
    }

    header
        .rsplit_once(" b/")
        .map(|(_, path)| path)
        .filter(|path| !path.is_empty())
        .map(Cow::Borrowed)
}

/// Undo git's C-style path quoting: single-char escapes and octal bytes
fn unquote(quoted: &str) -> Option<String> {
    let raw = quoted.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' {
            bytes.push(raw[i]);
            i += 1;
            continue;
        }

        let escaped = *raw.get(i + 1)?;
        let byte = match escaped {
            b'0'..=b'7' => {
                let digits = raw.get(i + 1..i + 4)?;
                let mut value = 0u32;
                for &digit in digits {
                    if !(b'0'..=b'7').contains(&digit) {
                        return None;
                    }
                    value = value * 8 + u32::from(digit - b'0');
                }
                i += 4;
                bytes.push(u8::try_from(value).ok()?);
                continue;
            }
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'r' => b'\r',
            b'"' | b'\\' => escaped,
            _ => return None,
        };
        bytes.push(byte);
        i += 2;
    }

    String::from_utf8(bytes).ok()
}
