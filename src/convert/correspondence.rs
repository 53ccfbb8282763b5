//! The correspondence table between hypoDD event ids and catalog public ids.
//!
//! Persisted as `convIDs.txt`, one `sequence_id;public_id` line per event in
//! write order. It is the only link back from `hypoDD.reloc` lines to events of
//! a pre-existing catalog.

use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::convert::{read_input, ConvertError};
use crate::core::types::{PublicId, SequenceId};
use crate::parsing::{parse_token, ParseError};

/// Default file name of the persisted table
pub const DEFAULT_CORRESPONDENCE_FILE: &str = "convIDs.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrespondenceEntry {
    pub sequence_id: SequenceId,
    pub native_id: PublicId,
}

/// Ordered, bidirectional sequence id <-> public id map
#[derive(Debug, Clone, Default)]
pub struct CorrespondenceTable {
    entries: Vec<CorrespondenceEntry>,
    by_sequence: HashMap<SequenceId, usize>,
    by_native: HashMap<PublicId, usize>,
}

impl CorrespondenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Lookups resolve to the first entry for a given key.
    pub fn push(&mut self, sequence_id: SequenceId, native_id: PublicId) {
        let idx = self.entries.len();
        if self.by_sequence.contains_key(&sequence_id) {
            warn!(%sequence_id, "duplicate sequence id in correspondence table");
        }
        self.by_sequence.entry(sequence_id).or_insert(idx);
        self.by_native.entry(native_id.clone()).or_insert(idx);
        self.entries.push(CorrespondenceEntry {
            sequence_id,
            native_id,
        });
    }

    pub fn native_id(&self, sequence_id: SequenceId) -> Option<&PublicId> {
        self.by_sequence
            .get(&sequence_id)
            .map(|&idx| &self.entries[idx].native_id)
    }

    pub fn sequence_id(&self, native_id: &PublicId) -> Option<SequenceId> {
        self.by_native
            .get(native_id)
            .map(|&idx| self.entries[idx].sequence_id)
    }

    /// Resolve a hypoDD event id to its catalog public id
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Lookup` if the id is not in the table.
    pub fn resolve(&self, sequence_id: SequenceId) -> Result<&PublicId, ConvertError> {
        self.native_id(sequence_id).ok_or_else(|| {
            ConvertError::Lookup(format!(
                "event id {sequence_id} is not in the correspondence table"
            ))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorrespondenceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `sequence_id;public_id` lines
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{};{}\n", e.sequence_id, e.native_id))
            .collect()
    }

    /// Parse `sequence_id;public_id` lines; blank lines are skipped.
    /// Everything after the first `;` is the public id.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for a line without `;` or with an
    /// empty public id, or `ParseError::InvalidNumber` for a bad sequence id.
    pub fn parse_text(text: &str) -> Result<Self, ParseError> {
        let mut table = Self::new();

        for (i, line) in text.lines().enumerate() {
            let line_num = i + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (seq, native) = line.split_once(';').ok_or_else(|| ParseError::InvalidFormat {
                line: line_num,
                message: format!("expected 'id;public_id', found '{line}'"),
            })?;
            if native.is_empty() {
                return Err(ParseError::InvalidFormat {
                    line: line_num,
                    message: "empty public id".to_string(),
                });
            }

            let seq: u32 = parse_token(seq.trim(), "event id", line_num)?;
            table.push(SequenceId(seq), PublicId::new(native));
        }

        Ok(table)
    }

    /// Load a persisted table
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::FileNotFound` if the file is missing or
    /// `ConvertError::Parse` if a line is malformed.
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let text = read_input(path)?;
        Ok(Self::parse_text(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bidirectional_lookup() {
        let mut table = CorrespondenceTable::new();
        table.push(SequenceId(1), PublicId::new("smi:a/event/1"));
        table.push(SequenceId(2), PublicId::new("smi:a/event/2"));

        assert_eq!(table.native_id(SequenceId(2)).unwrap().as_str(), "smi:a/event/2");
        assert_eq!(
            table.sequence_id(&PublicId::new("smi:a/event/1")),
            Some(SequenceId(1))
        );
        assert!(table.native_id(SequenceId(3)).is_none());
        assert!(matches!(
            table.resolve(SequenceId(3)),
            Err(ConvertError::Lookup(_))
        ));
    }

    #[test]
    fn test_render_and_parse_keep_order() {
        let text = "3;smi:a/event/x\n1;smi:a/event/y;with;semicolons\n\n2;quakeml:b/ev/2\n";
        let table = CorrespondenceTable::parse_text(text).unwrap();

        let ids: Vec<u32> = table.iter().map(|e| e.sequence_id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(
            table.native_id(SequenceId(1)).unwrap().as_str(),
            "smi:a/event/y;with;semicolons"
        );
        assert_eq!(
            table.render(),
            "3;smi:a/event/x\n1;smi:a/event/y;with;semicolons\n2;quakeml:b/ev/2\n"
        );
    }

    #[test]
    fn test_first_entry_wins_on_duplicate_id() {
        let table = CorrespondenceTable::parse_text("1;first\n1;second\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.native_id(SequenceId(1)).unwrap().as_str(), "first");
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            CorrespondenceTable::parse_text("1 smi:a/event/1\n"),
            Err(ParseError::InvalidFormat { line: 1, .. })
        ));
        assert!(matches!(
            CorrespondenceTable::parse_text("\nx;smi:a\n"),
            Err(ParseError::InvalidNumber { line: 2, .. })
        ));
        assert!(matches!(
            CorrespondenceTable::parse_text("1;\n"),
            Err(ParseError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CorrespondenceTable::load(Path::new("/nonexistent/convIDs.txt")).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound(_)));
    }
}
