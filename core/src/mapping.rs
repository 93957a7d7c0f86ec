//! Persistence adapter for the maintained-spell mapping.
//!
//! One section per save identifier:
//!
//! ```text
//! [MAP:Save12_Elira.ess]
//! # Oakflesh
//! Arcana.esp~0x00000801 = 0xFF077001~0xFF077002~25
//! ```
//!
//! Key is the base spell's owning source file and local identity; value is
//! the maintained and debuff identities plus the recorded upkeep cost.
//! The `#` comment carries the spell name for humans and is not
//! load-bearing. Identities must round-trip exactly.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::cache::SpellCache;
use crate::forms::{parse_form_id, FormId, ParseIdError, SpellKey};
use crate::host::SpellRegistry;
use crate::ini::{IniDocument, IniError};

const SECTION_PREFIX: &str = "MAP:";

pub fn section_name(save_id: &str) -> String {
    format!("{SECTION_PREFIX}{save_id}")
}

/// One reconstructable record of the persisted mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedEntry {
    pub key: SpellKey,
    pub maintained: FormId,
    pub debuff: FormId,
    pub cost: Option<f32>,
    /// Human-readable label from the comment line, if any.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("record `{record}` is missing the `~` delimiter")]
    MissingDelimiter { record: String },
    #[error("record `{record}`: {source}")]
    BadIdentity {
        record: String,
        #[source]
        source: ParseIdError,
    },
}

/// Parse the `<plugin>~0x<hex>` key side of a record.
///
/// A malformed identity is an error under `strict`, and defaults to the
/// null identity otherwise. A missing delimiter is always an error; there
/// is no usable key without one.
pub fn parse_key(raw: &str, strict: bool) -> Result<SpellKey, MappingError> {
    let (plugin, id) = raw.split_once('~').ok_or_else(|| MappingError::MissingDelimiter {
        record: raw.to_string(),
    })?;
    let local_id = match parse_form_id(id) {
        Ok(id) => id,
        Err(source) if strict => {
            return Err(MappingError::BadIdentity {
                record: raw.to_string(),
                source,
            });
        }
        Err(_) => FormId::NULL,
    };
    Ok(SpellKey::new(plugin, local_id))
}

/// Parse the `0x<hex>~0x<hex>[~<cost>]` value side of a record.
///
/// Null identities mean "allocate fresh on load". A missing delimiter
/// yields two null identities in the relaxed path, matching the lenient
/// loader; the strict path treats it as a malformed record.
pub fn parse_value(
    raw: &str,
    strict: bool,
) -> Result<(FormId, FormId, Option<f32>), MappingError> {
    let Some((maintained, rest)) = raw.split_once('~') else {
        if strict {
            return Err(MappingError::MissingDelimiter {
                record: raw.to_string(),
            });
        }
        return Ok((FormId::NULL, FormId::NULL, None));
    };

    let parse = |id: &str| -> Result<FormId, MappingError> {
        match parse_form_id(id) {
            Ok(id) => Ok(id),
            Err(source) if strict => Err(MappingError::BadIdentity {
                record: raw.to_string(),
                source,
            }),
            Err(_) => Ok(FormId::NULL),
        }
    };

    let maintained = parse(maintained)?;
    let (debuff, cost) = match rest.split_once('~') {
        Some((debuff, cost)) => (parse(debuff)?, cost.parse::<f32>().ok()),
        None => (parse(rest)?, None),
    };
    Ok((maintained, debuff, cost))
}

/// The on-disk mapping store.
#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    doc: IniDocument,
    path: Option<PathBuf>,
}

impl MappingStore {
    /// Open the mapping file; a missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IniError> {
        let path = path.into();
        let doc = IniDocument::load(&path)?;
        Ok(Self {
            doc,
            path: Some(path),
        })
    }

    /// Store without a backing file; `save` becomes a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn from_document(doc: IniDocument) -> Self {
        Self { doc, path: None }
    }

    pub fn document(&self) -> &IniDocument {
        &self.doc
    }

    pub fn render(&self) -> String {
        self.doc.render()
    }

    /// Save identifiers present in the store.
    pub fn saves(&self) -> Vec<&str> {
        self.doc
            .sections()
            .filter_map(|s| s.name.strip_prefix(SECTION_PREFIX))
            .collect()
    }

    pub fn has_save(&self, save_id: &str) -> bool {
        self.doc.has_section(&section_name(save_id))
    }

    /// Replace the section for `save_id` with the cache's current state.
    ///
    /// Entries whose base spell cannot be resolved, or which have no owning
    /// source file, cannot be reconstructed on load and are skipped.
    pub fn store_mapping(
        &mut self,
        save_id: &str,
        cache: &SpellCache,
        registry: &dyn SpellRegistry,
    ) {
        let section = section_name(save_id);
        self.doc.delete_section(&section);

        for (base, pair, stats) in cache.iter() {
            let Some(spell) = registry.spell(base) else {
                tracing::warn!("not persisting {base}: base spell not in registry");
                continue;
            };
            let Some(key) = &spell.key else {
                tracing::warn!("not persisting {}: no owning source file", spell.name);
                continue;
            };
            let record_key = format!("{}~{}", key.plugin, key.local_id);
            let record_value =
                format!("{}~{}~{}", pair.maintained, pair.debuff, stats.upkeep_cost);
            self.doc
                .set(&section, &record_key, &record_value, Some(&spell.name));
        }
    }

    /// Parse all records for `save_id`, separating malformed ones.
    ///
    /// Under `strict`, a malformed record aborts that record's load and is
    /// reported; relaxed parsing defaults bad identities to null instead.
    pub fn scan(&self, save_id: &str, strict: bool) -> (Vec<PersistedEntry>, Vec<MappingError>) {
        let mut entries = Vec::new();
        let mut errors = Vec::new();

        let Some(section) = self.doc.section(&section_name(save_id)) else {
            return (entries, errors);
        };
        for raw in &section.entries {
            let parsed = parse_key(&raw.key, strict).and_then(|key| {
                let (maintained, debuff, cost) = parse_value(&raw.value, strict)?;
                Ok(PersistedEntry {
                    key,
                    maintained,
                    debuff,
                    cost,
                    label: raw.comment.clone(),
                })
            });
            match parsed {
                Ok(entry) => entries.push(entry),
                Err(err) => errors.push(err),
            }
        }
        (entries, errors)
    }

    /// Records for `save_id`; malformed records are logged and dropped.
    pub fn entries(&self, save_id: &str, strict: bool) -> Vec<PersistedEntry> {
        let (entries, errors) = self.scan(save_id, strict);
        for err in errors {
            tracing::error!("skipping persisted record: {err}");
        }
        entries
    }

    /// All synthesized identities persisted for `save_id`, parsed
    /// leniently. Feeds the allocator's offset computation.
    pub fn persisted_ids(&self, save_id: &str) -> Vec<FormId> {
        let mut ids = Vec::new();
        for entry in self.entries(save_id, false) {
            if !entry.maintained.is_null() {
                ids.push(entry.maintained);
            }
            if !entry.debuff.is_null() {
                ids.push(entry.debuff);
            }
        }
        ids
    }

    pub fn save(&self) -> Result<(), IniError> {
        match &self.path {
            Some(path) => self.doc.save(path),
            None => Ok(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        let key = parse_key("Arcana.esp~0x00000801", true).unwrap();
        assert_eq!(key.plugin, "Arcana.esp");
        assert_eq!(key.local_id, FormId(0x801));

        assert!(matches!(
            parse_key("Arcana.esp", true),
            Err(MappingError::MissingDelimiter { .. })
        ));
        assert!(matches!(
            parse_key("Arcana.esp~banana", true),
            Err(MappingError::BadIdentity { .. })
        ));
    }

    #[test]
    fn test_parse_key_relaxed_defaults_bad_identity() {
        let key = parse_key("Arcana.esp~banana", false).unwrap();
        assert_eq!(key.local_id, FormId::NULL);
    }

    #[test]
    fn test_parse_value_with_and_without_cost() {
        let (m, d, cost) = parse_value("0xFF077001~0xFF077002~25", true).unwrap();
        assert_eq!(m, FormId(0xFF07_7001));
        assert_eq!(d, FormId(0xFF07_7002));
        assert_eq!(cost, Some(25.0));

        let (m, d, cost) = parse_value("0xFF077001~0xFF077002", true).unwrap();
        assert_eq!((m, d, cost), (FormId(0xFF07_7001), FormId(0xFF07_7002), None));
    }

    #[test]
    fn test_parse_value_strict_vs_relaxed() {
        assert!(matches!(
            parse_value("0xFF077001~nope", true),
            Err(MappingError::BadIdentity { .. })
        ));
        let (m, d, _) = parse_value("0xFF077001~nope", false).unwrap();
        assert_eq!(m, FormId(0xFF07_7001));
        assert_eq!(d, FormId::NULL);

        assert!(parse_value("garbage", true).is_err());
        let (m, d, _) = parse_value("garbage", false).unwrap();
        assert!(m.is_null() && d.is_null());
    }

    #[test]
    fn test_scan_separates_malformed_records() {
        let doc = IniDocument::parse(
            "[MAP:test.ess]\n\
             # Oakflesh\n\
             Arcana.esp~0x00000801 = 0xFF077001~0xFF077002~25\n\
             Broken.esp~oops = 0xFF077003~0xFF077004\n",
        )
        .unwrap();
        let store = MappingStore::from_document(doc);

        let (entries, errors) = store.scan("test.ess", true);
        assert_eq!(entries.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(entries[0].label.as_deref(), Some("Oakflesh"));

        let (entries, errors) = store.scan("test.ess", false);
        assert_eq!(entries.len(), 2);
        assert!(errors.is_empty());
        assert_eq!(entries[1].key.local_id, FormId::NULL);
    }

    #[test]
    fn test_persisted_ids_feed_offset() {
        let doc = IniDocument::parse(
            "[MAP:test.ess]\n\
             A.esp~0x00000801 = 0xFF077005~0xFF077002~10\n",
        )
        .unwrap();
        let store = MappingStore::from_document(doc);
        let ids = store.persisted_ids("test.ess");
        assert_eq!(ids, vec![FormId(0xFF07_7005), FormId(0xFF07_7002)]);
    }

    #[test]
    fn test_saves_listing() {
        let doc = IniDocument::parse("[MAP:a.ess]\n[CONFIG]\n[MAP:b.ess]\n").unwrap();
        let store = MappingStore::from_document(doc);
        assert_eq!(store.saves(), vec!["a.ess", "b.ess"]);
        assert!(store.has_save("a.ess"));
        assert!(!store.has_save("c.ess"));
    }
}
