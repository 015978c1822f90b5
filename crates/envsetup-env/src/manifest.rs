//! Requirements manifest (`requirements.txt`).
//!
//! The installer does the real parsing; this view exists to fail early on a
//! missing manifest and to report what is about to be installed.

use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};

/// One dependency specifier: `requests==2.31.0` -> name `requests`, constraint `==2.31.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraint: Option<String>,
    /// The specifier as written, comments stripped.
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    Requirement(Requirement),
    /// Installer option such as `-r other.txt` or `--index-url ...`.
    Option(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    pub lines: Vec<ManifestLine>,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SetupError::ManifestMissing {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path).map_err(|source| SetupError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(path, &decode(&bytes)))
    }

    pub fn parse(path: &Path, content: &str) -> Self {
        let lines = logical_lines(content)
            .into_iter()
            .filter_map(|line| parse_line(&line))
            .collect();
        Self {
            path: path.to_path_buf(),
            lines,
        }
    }

    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.lines.iter().filter_map(|l| match l {
            ManifestLine::Requirement(r) => Some(r),
            ManifestLine::Option(_) => None,
        })
    }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            ManifestLine::Option(o) => Some(o.as_str()),
            ManifestLine::Requirement(_) => None,
        })
    }
}

/// BOM-prefixed UTF-8 or UTF-16, otherwise UTF-8 with invalid bytes replaced.
fn decode(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return String::from_utf8_lossy(rest).into_owned();
    }
    let utf16 = |rest: &[u8], from: fn([u8; 2]) -> u16| {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| from([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    };
    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        return utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        return utf16(rest, u16::from_be_bytes);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Join `\` continuations into single lines.
fn logical_lines(content: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = String::new();
    for line in content.lines() {
        if let Some(head) = line.strip_suffix('\\') {
            pending.push_str(head);
            continue;
        }
        pending.push_str(line);
        out.push(std::mem::take(&mut pending));
    }
    if !pending.is_empty() {
        out.push(pending);
    }
    out
}

/// A `#` starts a comment at line start or after whitespace.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

fn parse_line(line: &str) -> Option<ManifestLine> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return None;
    }
    if line.starts_with('-') {
        return Some(ManifestLine::Option(line.to_string()));
    }
    Some(ManifestLine::Requirement(parse_requirement(line)))
}

fn parse_requirement(spec: &str) -> Requirement {
    let name_end = spec
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(spec.len());
    let name = &spec[..name_end];
    if name.is_empty() || spec.contains("://") {
        // URLs and local paths: nothing to split.
        return Requirement {
            name: spec.to_string(),
            constraint: None,
            raw: spec.to_string(),
        };
    }

    let mut rest = &spec[name_end..];
    let marker_start = rest.find(';').unwrap_or(rest.len());
    rest = &rest[..marker_start];
    // Per-requirement options (`--hash=...`) follow the version constraint.
    let options_start = rest.find(" --").unwrap_or(rest.len());
    rest = &rest[..options_start];
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix('[') {
        Some(extras) => extras.find(']').map(|i| &extras[i + 1..]).unwrap_or(""),
        None => rest,
    };
    let constraint = rest.trim();

    Requirement {
        name: name.to_string(),
        constraint: (!constraint.is_empty()).then(|| constraint.to_string()),
        raw: spec.to_string(),
    }
}
