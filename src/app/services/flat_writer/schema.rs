//! Flat output schema
//!
//! Lookup tables describing which system fields exist, which flat tag each is
//! written with, which hold dates and which must be written inside a block.

use crate::constants::symphony::{BLOCKS, BLOCK_MEMBERS, DATE_FIELDS, TAGS};

/// Read-only description of the flat user schema
#[derive(Debug, Clone, Copy)]
pub struct FlatSchema {
    tags: &'static [(&'static str, &'static str)],
    date_fields: &'static [&'static str],
    blocks: &'static [&'static str],
    block_members: &'static [(&'static str, &'static str)],
}

impl FlatSchema {
    /// Symphony user schema
    pub fn symphony() -> Self {
        Self {
            tags: TAGS,
            date_fields: DATE_FIELDS,
            blocks: BLOCKS,
            block_members: BLOCK_MEMBERS,
        }
    }

    /// Flat tag written for a system field
    pub fn tag_for(&self, system_field: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(field, _)| *field == system_field)
            .map(|(_, tag)| *tag)
    }

    pub fn is_system_field(&self, name: &str) -> bool {
        self.tag_for(name).is_some()
    }

    /// Whether the system field holds a date that must be written as `YYYYMMDD`
    pub fn is_date_field(&self, system_field: &str) -> bool {
        self.date_fields.contains(&system_field)
    }

    /// Block tag prefix the system field must be written inside, if any
    pub fn block_of(&self, system_field: &str) -> Option<&'static str> {
        self.block_members
            .iter()
            .find(|(field, _)| *field == system_field)
            .map(|(_, block)| *block)
    }

    /// Block tag prefixes in emission order
    pub fn blocks(&self) -> &'static [&'static str] {
        self.blocks
    }

    /// All system field names
    pub fn system_fields(&self) -> impl Iterator<Item = &'static str> {
        self.tags.iter().map(|(field, _)| *field)
    }
}

impl Default for FlatSchema {
    fn default() -> Self {
        Self::symphony()
    }
}
