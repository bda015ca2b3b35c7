//! Per-block field extraction: one record per region or row.

use crate::core::config::RunParams;
use crate::extract::patterns;
use crate::extract::record::VoterRecord;

/// Extracts one record from the recognized text of a single block.
///
/// Every field is extracted independently against the whitespace-normalized
/// text; a miss leaves the field empty. Only the old-reference triplet
/// looks at the original line structure first. The function is pure: the
/// same text always yields the same record.
pub fn extract_block(
    raw_text: &str,
    params: &RunParams,
    page: usize,
    block_index: usize,
) -> VoterRecord {
    let mut record = VoterRecord::with_params(params, page, block_index);
    let normalized = patterns::normalize_whitespace(raw_text);

    if let Some(id) = patterns::match_id(&normalized) {
        record.epic_number = id.to_string();
    }
    if let Some(relation) = patterns::first_relation(&normalized) {
        record.relation = relation.to_string();
    }
    if let Some(letter) = patterns::first_single_letter(&normalized) {
        record.handwritten_letter = letter.to_string();
    }
    if let Some(category) = patterns::first_category(&normalized) {
        record.category = category.to_string();
    }

    let tokens = patterns::numeric_tokens(&normalized);
    if let Some(first) = tokens.first() {
        record.serial_number = first.to_string();
    }

    // A dashed range overrides the order-of-appearance rule.
    if let Some((start, end)) = patterns::dash_range(&normalized) {
        record.first_number = start.to_string();
        record.last_number = end.to_string();
    } else {
        match tokens.as_slice() {
            [] => {}
            [only] => record.first_number = only.to_string(),
            [first, .., last] => {
                record.first_number = first.to_string();
                record.last_number = last.to_string();
            }
        }
    }

    let (old_ac, old_part, old_serial) = old_reference_triplet(raw_text, &tokens);
    record.old_ac = old_ac;
    record.old_part = old_part;
    record.old_part_serial = old_serial;

    record.raw_text = normalized;
    record
}

/// Old-reference triplet: the first line carrying at least three standalone
/// numeric tokens wins; otherwise the first tokens found anywhere in the
/// block, degrading to two or fewer values when the block has no more.
fn old_reference_triplet(raw_text: &str, block_tokens: &[&str]) -> (String, String, String) {
    for line in raw_text.lines() {
        let line_tokens = patterns::numeric_tokens(line);
        if line_tokens.len() >= 3 {
            return (
                line_tokens[0].to_string(),
                line_tokens[1].to_string(),
                line_tokens[2].to_string(),
            );
        }
    }

    let mut triplet = (String::new(), String::new(), String::new());
    if let Some(first) = block_tokens.first() {
        triplet.0 = first.to_string();
    }
    if let Some(second) = block_tokens.get(1) {
        triplet.1 = second.to_string();
    }
    if let Some(third) = block_tokens.get(2) {
        triplet.2 = third.to_string();
    }
    triplet
}
