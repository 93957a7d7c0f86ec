//! Minimal order-preserving INI document.
//!
//! The persisted mapping is a fixed wire format that must round-trip
//! exactly for identities, so this is a small hand-written reader/writer
//! rather than a serde format. Comments (`#` or `;`) attach to the entry
//! they precede; they are kept through a round-trip but carry no meaning.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IniError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected `key = value`")]
    Syntax { line: usize },
    #[error("line {line}: unterminated section header")]
    BadSection { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub key: String,
    pub value: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub entries: Vec<IniEntry>,
}

impl IniSection {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, IniError> {
        let mut doc = Self::new();
        let mut pending_comment: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let lineno = idx + 1;

            if line.is_empty() {
                pending_comment = None;
                continue;
            }
            if let Some(comment) = line.strip_prefix('#').or_else(|| line.strip_prefix(';')) {
                pending_comment = Some(comment.trim().to_string());
                continue;
            }
            if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .ok_or(IniError::BadSection { line: lineno })?;
                doc.sections.push(IniSection {
                    name: name.trim().to_string(),
                    entries: Vec::new(),
                });
                pending_comment = None;
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or(IniError::Syntax { line: lineno })?;
            let entry = IniEntry {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
                comment: pending_comment.take(),
            };
            // Entries before any header land in an unnamed section
            if doc.sections.is_empty() {
                doc.sections.push(IniSection {
                    name: String::new(),
                    entries: Vec::new(),
                });
            }
            if let Some(section) = doc.sections.last_mut() {
                section.entries.push(entry);
            }
        }

        Ok(doc)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (idx, section) in self.sections.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            if !section.name.is_empty() {
                out.push_str(&format!("[{}]\n", section.name));
            }
            for entry in &section.entries {
                if let Some(comment) = &entry.comment {
                    out.push_str(&format!("# {}\n", comment));
                }
                out.push_str(&format!("{} = {}\n", entry.key, entry.value));
            }
        }
        out
    }

    /// Load from disk; a missing file yields an empty document.
    pub fn load(path: &Path) -> Result<Self, IniError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path).map_err(|source| IniError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), IniError> {
        fs::write(path, self.render()).map_err(|source| IniError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = &IniSection> {
        self.sections.iter()
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Fetch or create a section.
    pub fn section_mut(&mut self, name: &str) -> &mut IniSection {
        if let Some(idx) = self.sections.iter().position(|s| s.name == name) {
            return &mut self.sections[idx];
        }
        self.sections.push(IniSection {
            name: name.to_string(),
            entries: Vec::new(),
        });
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    pub fn delete_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        self.sections.len() != before
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }

    /// Set a key, replacing an existing entry in place.
    pub fn set(&mut self, section: &str, key: &str, value: &str, comment: Option<&str>) {
        let section = self.section_mut(section);
        if let Some(entry) = section.entries.iter_mut().find(|e| e.key == key) {
            entry.value = value.to_string();
            entry.comment = comment.map(str::to_string);
        } else {
            section.entries.push(IniEntry {
                key: key.to_string(),
                value: value.to_string(),
                comment: comment.map(str::to_string),
            });
        }
    }
}

/// Parse an INI boolean. Accepts `true`/`false`/`1`/`0`, case-insensitive.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[MAP:Save12_Elira.ess]
# Oakflesh
Arcana.esp~0x00000801 = 0xFF077001~0xFF077002~25

[CONFIG]
LogLevel = info
bSilenceFX = true
";

    #[test]
    fn test_parse_sections_and_entries() {
        let doc = IniDocument::parse(SAMPLE).unwrap();
        let map = doc.section("MAP:Save12_Elira.ess").unwrap();
        assert_eq!(map.entries.len(), 1);
        assert_eq!(map.entries[0].key, "Arcana.esp~0x00000801");
        assert_eq!(map.entries[0].value, "0xFF077001~0xFF077002~25");
        assert_eq!(map.entries[0].comment.as_deref(), Some("Oakflesh"));
        assert_eq!(doc.get("CONFIG", "LogLevel"), Some("info"));
    }

    #[test]
    fn test_render_round_trips_exactly() {
        let doc = IniDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.render(), SAMPLE);
        let again = IniDocument::parse(&doc.render()).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn test_set_and_delete_section() {
        let mut doc = IniDocument::new();
        doc.set("MAP:a", "k", "v", Some("label"));
        doc.set("MAP:a", "k", "v2", None);
        assert_eq!(doc.get("MAP:a", "k"), Some("v2"));

        assert!(doc.delete_section("MAP:a"));
        assert!(!doc.has_section("MAP:a"));
        assert!(!doc.delete_section("MAP:a"));
    }

    #[test]
    fn test_syntax_errors_carry_line_numbers() {
        let err = IniDocument::parse("[S]\nnot-a-pair\n").unwrap_err();
        match err {
            IniError::Syntax { line } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = IniDocument::parse("[Broken\n").unwrap_err();
        match err {
            IniError::BadSection { line } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_blank_line_detaches_comment() {
        let doc = IniDocument::parse("[S]\n# floating\n\nk = v\n").unwrap();
        assert_eq!(doc.section("S").unwrap().entries[0].comment, None);
    }
}
