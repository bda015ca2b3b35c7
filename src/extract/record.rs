//! The exported record schema.

use serde::{Deserialize, Serialize};

use crate::core::config::RunParams;

/// Export column order. Every column is present in every exported row,
/// empty or not, so downstream spreadsheets keep stable columns.
pub const RECORD_COLUMNS: [&str; 15] = [
    "AcNumber",
    "PartNumber",
    "SerialNumber",
    "EpicNumber",
    "Category",
    "Relation",
    "HandwrittenLetter",
    "FirstNumber",
    "LastNumber",
    "OldAc",
    "OldPart",
    "OldPartSerial",
    "RawText",
    "Page",
    "BlockIndex",
];

/// One extracted voter-roll entry.
///
/// Field presence is best-effort: a field the extractor could not find is
/// the empty string, never absent. Records are immutable once emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoterRecord {
    /// Assembly Constituency number, from run parameters.
    pub ac_number: String,
    /// Electoral part number, from run parameters.
    pub part_number: String,
    /// Serial number of the entry.
    pub serial_number: String,
    /// EPIC (voter ID) number.
    pub epic_number: String,
    /// Single-letter category (A, B, or C).
    pub category: String,
    /// Relation text (Father/Mother/... including transliterated terms).
    pub relation: String,
    /// Isolated handwritten single letter.
    pub handwritten_letter: String,
    /// Earliest standalone numeric token, or the start of a dashed range.
    pub first_number: String,
    /// Latest standalone numeric token, or the end of a dashed range.
    pub last_number: String,
    /// Old assembly-constituency reference.
    pub old_ac: String,
    /// Old part reference.
    pub old_part: String,
    /// Old part serial reference (a `part/serial` fraction in whole-page
    /// mode).
    pub old_part_serial: String,
    /// Full recognized text, whitespace-normalized.
    pub raw_text: String,
    /// 1-based page number.
    pub page: usize,
    /// 1-based block (or record) index within the page.
    pub block_index: usize,
}

impl VoterRecord {
    /// Creates an empty record carrying the run-level constituency
    /// identifiers and its position.
    pub fn with_params(params: &RunParams, page: usize, block_index: usize) -> Self {
        Self {
            ac_number: params.ac_number.clone(),
            part_number: params.part_number.clone(),
            page,
            block_index,
            ..Default::default()
        }
    }

    /// Projects the record onto the fixed export columns, in
    /// [`RECORD_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.ac_number.clone(),
            self.part_number.clone(),
            self.serial_number.clone(),
            self.epic_number.clone(),
            self.category.clone(),
            self.relation.clone(),
            self.handwritten_letter.clone(),
            self.first_number.clone(),
            self.last_number.clone(),
            self.old_ac.clone(),
            self.old_part.clone(),
            self.old_part_serial.clone(),
            self.raw_text.clone(),
            self.page.to_string(),
            self.block_index.to_string(),
        ]
    }

    /// True when any extracted text field is populated (positions and
    /// run-level identifiers excluded).
    pub fn has_extracted_fields(&self) -> bool {
        [
            &self.serial_number,
            &self.epic_number,
            &self.category,
            &self.relation,
            &self.handwritten_letter,
            &self.first_number,
            &self.last_number,
            &self.old_ac,
            &self.old_part,
            &self.old_part_serial,
        ]
        .iter()
        .any(|f| !f.is_empty())
    }
}
