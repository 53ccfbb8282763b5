use std::collections::HashMap;

use crate::core::records::PickRecord;
use crate::core::types::SequenceId;
use crate::parsing::{parse_finite, parse_token, ParseError};

/// Picks of one `#` block in a phase list
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseBlock {
    /// Taken from the last token of the `#` line
    pub sequence_id: SequenceId,
    pub picks: Vec<PickRecord>,
}

/// A parsed phase list with blocks indexed by event id
#[derive(Debug, Clone, Default)]
pub struct PhaseList {
    pub blocks: Vec<PhaseBlock>,
    by_id: HashMap<SequenceId, Vec<usize>>,
}

impl PhaseList {
    pub fn new(blocks: Vec<PhaseBlock>) -> Self {
        let mut by_id: HashMap<SequenceId, Vec<usize>> = HashMap::new();
        for (idx, block) in blocks.iter().enumerate() {
            by_id.entry(block.sequence_id).or_default().push(idx);
        }
        Self { blocks, by_id }
    }

    /// All picks for an event, across every block carrying its id
    pub fn picks_for(&self, id: SequenceId) -> impl Iterator<Item = &PickRecord> {
        self.by_id
            .get(&id)
            .into_iter()
            .flatten()
            .flat_map(move |&idx| self.blocks[idx].picks.iter())
    }
}

/// Parse a phase list: `#` header lines, each followed by
/// `STATION TRAVELTIME WEIGHT PHASE` lines. Text before the first header and
/// blank lines are ignored.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for a header without an id,
/// `ParseError::MissingField` for a short pick line, or
/// `ParseError::InvalidNumber` for malformed numbers.
pub fn parse_phase_text(text: &str) -> Result<PhaseList, ParseError> {
    let mut blocks: Vec<PhaseBlock> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_num = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('#') {
            let id_token = header.split_whitespace().last().ok_or_else(|| {
                ParseError::InvalidFormat {
                    line: line_num,
                    message: "event header has no id".to_string(),
                }
            })?;
            blocks.push(PhaseBlock {
                sequence_id: SequenceId(parse_token(id_token, "event id", line_num)?),
                picks: Vec::new(),
            });
            continue;
        }

        let Some(block) = blocks.last_mut() else {
            continue;
        };
        block.picks.push(parse_pick_line(trimmed, line_num)?);
    }

    Ok(PhaseList::new(blocks))
}

fn parse_pick_line(line: &str, line_num: usize) -> Result<PickRecord, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(ParseError::MissingField {
            line: line_num,
            expected: 4,
            found: fields.len(),
        });
    }

    Ok(PickRecord {
        station_code: fields[0].to_string(),
        travel_time: parse_finite(fields[1], "travel time", line_num)?,
        weight: parse_finite(fields[2], "weight", line_num)?,
        phase: fields[3].to_string(),
    })
}
