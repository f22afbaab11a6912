// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment errors rendered as miette diagnostics.
//!
//! `guestpulse.toml` has five fixed tables. A misspelled table header such as
//! `[sever]` is reported as an unknown section pointing at the header, with
//! the closest table name as a suggestion. Unknown keys are looked up only
//! inside their own table. Type and missing-key errors name the
//! `GUESTPULSE_*` variable that sets the same value from the environment.

#![allow(unused_assignments)] // fields read only through the Diagnostic derive

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::{env_var_for, SECTIONS};

/// Jaro-Winkler score a candidate must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, ready for miette rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A table header that is not one of the known sections.
    #[error("unknown section `[{section}]`")]
    #[diagnostic(
        code(guestpulse::config::unknown_section),
        help("{}", section_help(suggestion.as_deref()))
    )]
    UnknownSection {
        section: String,
        suggestion: Option<String>,
        #[label("not a guestpulse section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key that its section does not define.
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(
        code(guestpulse::config::unknown_key),
        help("{}", key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        section: String,
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys of the section.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type, from a file or from the environment.
    #[error("invalid type for `{key}`: found {found}")]
    #[diagnostic(
        code(guestpulse::config::invalid_type),
        help("expected {expected}; the value can also come from `{env_var}`")
    )]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        env_var: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required key with no value anywhere.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(guestpulse::config::missing_key),
        help("set `{key}` in guestpulse.toml or export `{env_var}`")
    )]
    MissingKey { key: String, env_var: String },

    /// A semantic check that failed after parsing.
    #[error("validation error: {message}")]
    #[diagnostic(code(guestpulse::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(guestpulse::config::other))]
    Other(String),
}

fn section_help(suggestion: Option<&str>) -> String {
    let known = SECTIONS.map(|s| format!("[{s}]")).join(", ");
    match suggestion {
        Some(s) => format!("did you mean `[{s}]`? Sections: {known}"),
        None => format!("sections: {known}"),
    }
}

fn key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` pairs each file name with its content so spans can be drawn.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.iter().map(|p| p.to_string()).collect();
            let source = source_for(&error, toml_sources);

            match &error.kind {
                Kind::UnknownField(field, _) if path.is_empty() => {
                    let (span, src) = span_in(source, header_offset, None, field);
                    ConfigError::UnknownSection {
                        section: field.clone(),
                        suggestion: closest_match(field, &SECTIONS),
                        span,
                        src,
                    }
                }
                Kind::UnknownField(field, expected) => {
                    let section = path.join(".");
                    let (span, src) = span_in(source, key_offset, Some(section.as_str()), field);
                    ConfigError::UnknownKey {
                        suggestion: closest_match(field, expected),
                        valid_keys: expected.join(", "),
                        section,
                        key: field.clone(),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => {
                    let key = dotted(&path, field);
                    ConfigError::MissingKey {
                        env_var: env_var_for(&key),
                        key,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (section, field) = match path.split_last() {
                        Some((field, section)) => (section.join("."), field.as_str()),
                        None => (String::new(), ""),
                    };
                    let (span, src) = span_in(source, key_offset, Some(section.as_str()), field);
                    let key = path.join(".");
                    ConfigError::InvalidType {
                        env_var: env_var_for(&key),
                        key,
                        found: actual.to_string(),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn dotted(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

/// The TOML text an error came from. Falls back to the only source when the
/// error carries no file metadata, as with inline strings.
fn source_for<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<&'a (String, String)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    match file {
        Some(file) => toml_sources.iter().find(|(name, _)| *name == file),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    }
}

type Locator = fn(&str, Option<&str>, &str) -> Option<usize>;

fn span_in(
    source: Option<&(String, String)>,
    locate: Locator,
    section: Option<&str>,
    needle: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    source
        .and_then(|(name, content)| {
            let offset = locate(content, section, needle)?;
            Some((
                Some(SourceSpan::new(offset.into(), needle.len())),
                Some(NamedSource::new(name, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Lines of `content` with their byte offsets.
fn lines_with_offsets(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line.trim_end_matches(['\n', '\r'])))
    })
}

/// Table name of a `[header]` line, if the line is one.
fn header_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(rest[..end].trim())
}

/// Byte offset of the name inside the `[section]` header line.
pub fn header_offset(content: &str, _section: Option<&str>, name: &str) -> Option<usize> {
    lines_with_offsets(content).find_map(|(start, line)| {
        (header_name(line) == Some(name)).then(|| {
            let bracket = line.len() - line.trim_start().len();
            start + bracket + 1 + line[bracket + 1..].find(name).unwrap_or(0)
        })
    })
}

/// Byte offset of `key` inside table `section`. Keys before the first header
/// belong to the top level, which `None` or an empty name selects.
pub fn key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let wanted = section.filter(|s| !s.is_empty());
    let mut current: Option<&str> = None;

    for (start, line) in lines_with_offsets(content) {
        if let Some(name) = header_name(line) {
            current = Some(name);
            continue;
        }
        if current != wanted {
            continue;
        }
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(key)
            && after.trim_start().starts_with('=')
        {
            return Some(start + line.len() - trimmed.len());
        }
    }
    None
}

/// Closest candidate by Jaro-Winkler similarity, if any is close enough.
pub fn closest_match(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|&c| (strsim::jaro_winkler(unknown, c), c))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.to_string())
}

/// Print every error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    if errors.len() > 1 {
        eprintln!("{} configuration problems:", errors.len());
    }
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misspelled_sections_get_a_suggestion() {
        assert_eq!(closest_match("sever", &SECTIONS), Some("server".into()));
        assert_eq!(closest_match("feedbak", &SECTIONS), Some("feedback".into()));
        assert_eq!(closest_match("zzzzzz", &SECTIONS), None);
    }

    #[test]
    fn header_offset_points_at_the_name() {
        let content = "[server]\nport = 1\n\n  [sever]\nhost = \"x\"\n";
        let o = header_offset(content, None, "sever").unwrap();
        assert_eq!(&content[o..o + 5], "sever");
        assert_eq!(header_offset(content, None, "auth"), None);
    }

    #[test]
    fn key_offset_stays_inside_its_section() {
        let content = "[storage]\nport = 1\n\n[server]\nprot = 8080\n\n[auth]\nport = 2\n";
        let o = key_offset(content, Some("server"), "prot").unwrap();
        assert_eq!(&content[o..o + 4], "prot");
        assert_eq!(key_offset(content, Some("server"), "port"), None);
    }

    #[test]
    fn key_offset_ignores_prefix_matches_and_crlf() {
        let content = "[server]\r\nporter = 1\r\nport=2\r\n";
        let o = key_offset(content, Some("server"), "port").unwrap();
        assert_eq!(&content[o..o + 6], "port=2");
    }

    #[test]
    fn help_text_lists_every_section() {
        let help = section_help(Some("server"));
        assert!(help.starts_with("did you mean `[server]`?"));
        for s in SECTIONS {
            assert!(help.contains(&format!("[{s}]")));
        }
    }

    #[test]
    fn dotted_keys_join_the_path() {
        assert_eq!(dotted(&["server".into()], "port"), "server.port");
        assert_eq!(dotted(&[], "server"), "server");
    }
}
