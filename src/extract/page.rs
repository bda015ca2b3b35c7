//! Whole-page line-stream extraction.
//!
//! A single OCR pass over the page interleaves a voter's serial, ID,
//! category/relation, and old-reference data across several physical lines
//! with no reliable delimiter, so the parser tracks the record under
//! construction across lines. A serial-shaped line opens a record (and
//! flushes the previous one); subsequent lines fill fields until the next
//! serial or the end of the stream.

use crate::core::config::RunParams;
use crate::extract::patterns;
use crate::extract::record::VoterRecord;

/// Accumulates records across an ordered page line stream.
///
/// Lines before the first serial-shaped line are ignored; a stream with no
/// serial-shaped line yields zero records (not an error).
pub fn extract_lines<'a, I>(lines: I, params: &RunParams, page: usize) -> Vec<VoterRecord>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut records: Vec<VoterRecord> = Vec::new();
    let mut current: Option<VoterRecord> = None;
    let mut current_lines: Vec<String> = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if patterns::is_serial_line(line) {
            flush(&mut current, &mut current_lines, &mut records);
            let mut record = VoterRecord::with_params(params, page, records.len() + 1);
            record.serial_number = line.to_string();
            current = Some(record);
            current_lines.push(line.to_string());
            continue;
        }

        let Some(record) = current.as_mut() else {
            continue;
        };
        current_lines.push(line.to_string());

        if let Some((letter, rest)) = patterns::split_category_prefix(line) {
            if record.category.is_empty() {
                record.category = letter.to_string();
            }
            let fragment = take_fraction(record, rest);
            append_relation(record, &fragment);
        } else if patterns::contains_relation(line) {
            let fragment = take_fraction(record, line);
            append_relation(record, &fragment);
        } else if patterns::is_bare_fraction_line(line) {
            if record.old_part_serial.is_empty() {
                record.old_part_serial = line.to_string();
            }
        } else if record.epic_number.is_empty()
            && let Some(id) = patterns::match_id(line)
        {
            record.epic_number = id.to_string();
        }
    }

    flush(&mut current, &mut current_lines, &mut records);
    records
}

/// Extracts an embedded old-part fraction from the text (setting it on the
/// record when unset) and returns the remaining text, normalized.
fn take_fraction(record: &mut VoterRecord, text: &str) -> String {
    match patterns::find_fraction(text) {
        Some(fraction) => {
            if record.old_part_serial.is_empty() {
                record.old_part_serial = fraction.to_string();
            }
            patterns::normalize_whitespace(&text.replacen(fraction, "", 1))
        }
        None => patterns::normalize_whitespace(text),
    }
}

/// Appends a relation fragment, space-joined onto any existing value.
fn append_relation(record: &mut VoterRecord, fragment: &str) {
    if fragment.is_empty() {
        return;
    }
    if record.relation.is_empty() {
        record.relation = fragment.to_string();
    } else {
        record.relation.push(' ');
        record.relation.push_str(fragment);
    }
}

fn flush(
    current: &mut Option<VoterRecord>,
    current_lines: &mut Vec<String>,
    records: &mut Vec<VoterRecord>,
) {
    if let Some(mut record) = current.take() {
        record.raw_text = patterns::normalize_whitespace(&current_lines.join(" "));
        records.push(record);
    }
    current_lines.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RunParams {
        RunParams::new("02", "009")
    }

    #[test]
    fn accumulates_records_across_interleaved_lines() {
        let lines = ["12", "OR/02/009/22647", "A Son 04/345", "13", "XY1234567"];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.serial_number, "12");
        assert_eq!(first.epic_number, "OR/02/009/22647");
        assert_eq!(first.category, "A");
        assert_eq!(first.relation, "Son");
        assert_eq!(first.old_part_serial, "04/345");
        assert_eq!(first.ac_number, "02");
        assert_eq!(first.part_number, "009");
        assert_eq!(first.block_index, 1);

        let second = &records[1];
        assert_eq!(second.serial_number, "13");
        assert_eq!(second.epic_number, "XY1234567");
        assert_eq!(second.category, "");
        assert_eq!(second.relation, "");
        assert_eq!(second.old_part_serial, "");
        assert_eq!(second.block_index, 2);
    }

    #[test]
    fn no_serial_line_means_no_records() {
        let lines = ["OR/02/009/22647", "A Son 04/345", "Father of someone"];
        assert!(extract_lines(lines, &params(), 1).is_empty());
    }

    #[test]
    fn only_first_id_match_is_kept() {
        let lines = ["12", "ABC1234567", "XYZ7654321"];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].epic_number, "ABC1234567");
    }

    #[test]
    fn relation_lines_concatenate() {
        let lines = ["12", "A Son", "Pita Hari 04/345"];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records[0].relation, "Son Pita Hari");
        assert_eq!(records[0].old_part_serial, "04/345");
    }

    #[test]
    fn bare_fraction_sets_old_part_once() {
        let lines = ["12", "04/345", "07/999"];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records[0].old_part_serial, "04/345");
    }

    #[test]
    fn trailing_record_is_flushed() {
        let lines = ["44", "ABC1234567"];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].serial_number, "44");
    }

    #[test]
    fn lines_before_first_serial_are_ignored() {
        let lines = ["header text", "ABC1234567", "12", "XYZ7654321"];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].epic_number, "XYZ7654321");
    }

    #[test]
    fn category_only_line() {
        let lines = ["12", "B"];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records[0].category, "B");
        assert_eq!(records[0].relation, "");
    }

    #[test]
    fn blank_and_padded_lines_are_tolerated() {
        let lines = ["", "  12  ", "\t", " ABC1234567 "];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].serial_number, "12");
        assert_eq!(records[0].epic_number, "ABC1234567");
    }

    #[test]
    fn raw_text_joins_the_record_lines() {
        let lines = ["12", "ABC1234567", "13", "Son"];
        let records = extract_lines(lines, &params(), 1);
        assert_eq!(records[0].raw_text, "12 ABC1234567");
        assert_eq!(records[1].raw_text, "13 Son");
    }
}
