//! Form identities and the synthetic-identity allocator.
//!
//! The engine never holds live pointers into host memory; everything is
//! keyed by the host's stable numeric form identifier and resolved through
//! the registry at point of use. Synthetic identities for the maintained
//! and debuff variants come from [`FormAllocator`], offset per save context
//! so a fresh session never collides with previously persisted ids.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base of the synthetic identity range. Everything the allocator hands
/// out lives at `base + offset + counter`.
pub const FORM_OFFSET_BASE: u32 = 0xFF07_7000;

/// Stable numeric identity of a host form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FormId(pub u32);

impl FormId {
    pub const NULL: FormId = FormId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Owning source file plus local identity — the persisted identity of a
/// base spell, valid across sessions as long as the source file loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpellKey {
    pub plugin: String,
    pub local_id: FormId,
}

impl SpellKey {
    pub fn new(plugin: impl Into<String>, local_id: FormId) -> Self {
        Self {
            plugin: plugin.into(),
            local_id,
        }
    }
}

impl fmt::Display for SpellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.plugin, self.local_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("identity `{0}` is missing the 0x prefix")]
    MissingPrefix(String),
    #[error("identity `{0}` is not valid hexadecimal")]
    InvalidHex(String),
}

/// Parse a `0x`-prefixed hexadecimal form identity.
pub fn parse_form_id(s: &str) -> Result<FormId, ParseIdError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| ParseIdError::MissingPrefix(s.to_string()))?;
    u32::from_str_radix(digits, 16)
        .map(FormId)
        .map_err(|_| ParseIdError::InvalidHex(s.to_string()))
}

/// Issues collision-free synthetic identities.
///
/// The counter starts at zero at process start and only increases for the
/// lifetime of the session; the offset is recomputed once per load from the
/// highest identity found in the persisted mapping for that save.
#[derive(Debug, Clone, Default)]
pub struct FormAllocator {
    offset: u32,
    counter: u32,
}

impl FormAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Recompute the per-save offset from the persisted identities of the
    /// current save context.
    pub fn load_offset<I>(&mut self, persisted: I)
    where
        I: IntoIterator<Item = FormId>,
    {
        let mut offset = 0u32;
        for id in persisted {
            if id.0 > offset {
                offset = id.0;
            }
        }
        offset &= !FORM_OFFSET_BASE;
        self.offset = offset;
        tracing::info!("local offset: 0x{:08X}", offset);
        tracing::info!("global offset: 0x{:08X}", FORM_OFFSET_BASE);
    }

    /// Next synthetic identity, strictly above everything persisted for
    /// the current save context. Wraps rather than panics if a persisted
    /// mapping carries an identity near the top of the u32 range.
    pub fn next(&mut self) -> FormId {
        self.counter = self.counter.wrapping_add(1);
        FormId(
            FORM_OFFSET_BASE
                .wrapping_add(self.counter)
                .wrapping_add(self.offset),
        )
    }
}
