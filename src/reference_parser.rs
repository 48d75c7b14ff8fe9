//! # Reference Data Parser
//!
//! Parses loosely formatted free text into per-brand baking reference
//! records. Each non-empty, non-comment line describes one observation for
//! one brand, e.g. `پلنت 8:20 دقیقه 240 درجه`.
//!
//! The parser is best-effort by contract: it never errors. Lines that
//! cannot carry a record (no digits, no brand prefix, no extractable time
//! or temperature) are skipped and only counted, so invalid input simply
//! yields fewer records.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// One observed (time, temperature) pairing for a brand.
///
/// At least one of the two fields is populated; the parser discards
/// records where both would be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// Bake time as written in the source, e.g. `8:20 دقیقه` or `9:20`.
    pub time: Option<String>,
    /// Oven temperature as written in the source, e.g. `240 درجه`.
    pub temperature: Option<String>,
}

/// Insertion-ordered mapping from normalized brand name to its reference
/// records.
///
/// Backed by a `Vec` rather than a hash map so that iteration order is
/// deterministic: record order per brand is the order of appearance in the
/// source text, and brand order decides which key wins the substring
/// fallback in [`crate::reference_store::ReferenceStore::lookup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandReferenceTable {
    entries: Vec<(String, Vec<ReferenceRecord>)>,
}

impl BrandReferenceTable {
    /// Append a record under a normalized brand key, creating the key on
    /// first use.
    fn push(&mut self, brand: String, record: ReferenceRecord) {
        match self.entries.iter_mut().find(|(name, _)| *name == brand) {
            Some((_, records)) => records.push(record),
            None => self.entries.push((brand, vec![record])),
        }
    }

    /// Records for an exact normalized brand key.
    pub fn get(&self, brand: &str) -> Option<&[ReferenceRecord]> {
        self.entries
            .iter()
            .find(|(name, _)| name == brand)
            .map(|(_, records)| records.as_slice())
    }

    /// Iterate `(brand, records)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ReferenceRecord])> {
        self.entries
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    /// Brand keys in first-seen order.
    pub fn brands(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Result of one parse pass over the source text.
#[derive(Debug, Clone, Default)]
pub struct ParsedReference {
    pub table: BrandReferenceTable,
    /// Lines that were dropped (no digits, empty brand, or no extractable
    /// time/temperature token). Comments and blank lines do not count.
    pub skipped_lines: usize,
}

// Time: 1-2 digits, colon, 1-2 digits, optional minute word.
// Temperature: 2-3 digits followed by a degree word or the degree symbol.
lazy_static! {
    static ref TIME_RE: Regex = Regex::new(r"\b\d{1,2}\s*:\s*\d{1,2}(?:\s*دقیقه)?")
        .expect("time pattern should be valid");
    static ref TEMP_RE: Regex =
        Regex::new(r"\b\d{2,3}\s*(?:درجه|°)").expect("temperature pattern should be valid");
}

/// Fold Arabic letter variants to their Persian forms and trim.
///
/// Keyboards produce both ي/ی and ك/ک; brand comparison must be robust to
/// either form.
pub fn normalize(text: &str) -> String {
    text.replace('ي', "ی").replace('ك', "ک").trim().to_string()
}

/// Parse free text into a [`BrandReferenceTable`].
///
/// Deterministic: re-parsing identical text yields an identical table.
pub fn parse(text: &str) -> ParsedReference {
    let mut parsed = ParsedReference::default();

    for line in text.lines() {
        let line = normalize(line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Everything before the first digit is the brand name; the rest is
        // the data fragment.
        let Some(digit_pos) = line.char_indices().find_map(|(i, c)| c.is_ascii_digit().then_some(i))
        else {
            debug!(line = %line, "reference line has no digits, skipping");
            parsed.skipped_lines += 1;
            continue;
        };

        let brand = line[..digit_pos].trim().to_string();
        if brand.is_empty() {
            debug!(line = %line, "reference line has no brand prefix, skipping");
            parsed.skipped_lines += 1;
            continue;
        }

        let fragment = &line[digit_pos..];
        let (mut time, mut temperature) = extract_tokens(fragment);
        if time.is_none() && temperature.is_none() {
            // Some lines only anchor past the brand on the full line.
            (time, temperature) = extract_tokens(&line);
        }

        if time.is_none() && temperature.is_none() {
            debug!(line = %line, "no time or temperature token found, skipping");
            parsed.skipped_lines += 1;
            continue;
        }

        parsed.table.push(brand, ReferenceRecord { time, temperature });
    }

    debug!(
        brands = parsed.table.len(),
        skipped = parsed.skipped_lines,
        "reference text parsed"
    );
    parsed
}

/// Extract at most one time token and one temperature token from a
/// fragment. Extraction is independent and order-agnostic.
fn extract_tokens(fragment: &str) -> (Option<String>, Option<String>) {
    let time = TIME_RE
        .find(fragment)
        .map(|m| m.as_str().trim().to_string());
    let temperature = TEMP_RE
        .find(fragment)
        .map(|m| m.as_str().trim().to_string());
    (time, temperature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_line_yields_both_fields() {
        let parsed = parse("پلنت 8:20 دقیقه 240 درجه");
        let records = parsed.table.get("پلنت").expect("brand should be present");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time.as_deref(), Some("8:20 دقیقه"));
        assert_eq!(records[0].temperature.as_deref(), Some("240 درجه"));
        assert_eq!(parsed.skipped_lines, 0);
    }

    #[test]
    fn test_temperature_only_line() {
        let parsed = parse("ریرا 230 درجه");
        let records = parsed.table.get("ریرا").unwrap();
        assert_eq!(records[0].time, None);
        assert_eq!(records[0].temperature.as_deref(), Some("230 درجه"));
    }

    #[test]
    fn test_time_only_line() {
        let parsed = parse("ریرا 9:15 دقیقه");
        let records = parsed.table.get("ریرا").unwrap();
        assert_eq!(records[0].time.as_deref(), Some("9:15 دقیقه"));
        assert_eq!(records[0].temperature, None);
    }

    #[test]
    fn test_time_without_unit_word() {
        let parsed = parse("پلنت 9:20");
        let records = parsed.table.get("پلنت").unwrap();
        assert_eq!(records[0].time.as_deref(), Some("9:20"));
    }

    #[test]
    fn test_token_order_is_irrelevant() {
        let parsed = parse("پلنت 240 درجه 8:20 دقیقه");
        let records = parsed.table.get("پلنت").unwrap();
        assert_eq!(records[0].time.as_deref(), Some("8:20 دقیقه"));
        assert_eq!(records[0].temperature.as_deref(), Some("240 درجه"));
    }

    #[test]
    fn test_line_without_digits_is_dropped() {
        let parsed = parse("پلنت بدون عدد");
        assert!(parsed.table.get("پلنت").is_none());
        assert_eq!(parsed.skipped_lines, 1);
    }

    #[test]
    fn test_digits_without_tokens_are_dropped() {
        // Digits present but neither a time nor a temperature token.
        let parsed = parse("پلنت 5");
        assert!(parsed.table.is_empty());
        assert_eq!(parsed.skipped_lines, 1);
    }

    #[test]
    fn test_line_without_brand_is_dropped() {
        let parsed = parse("240 درجه 8:20 دقیقه");
        assert!(parsed.table.is_empty());
        assert_eq!(parsed.skipped_lines, 1);
    }

    #[test]
    fn test_comments_and_blank_lines_do_not_count_as_skipped() {
        let parsed = parse("# نظر\n\nپلنت 240 درجه\n");
        assert_eq!(parsed.skipped_lines, 0);
        assert_eq!(parsed.table.len(), 1);
    }

    #[test]
    fn test_records_keep_insertion_order() {
        let parsed = parse("پلنت 240 درجه 8:20 دقیقه\nپلنت 9:20 240 درجه");
        let records = parsed.table.get("پلنت").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time.as_deref(), Some("8:20 دقیقه"));
        assert_eq!(records[1].time.as_deref(), Some("9:20"));
    }

    #[test]
    fn test_brand_key_is_normalized() {
        // Arabic kaf in the source folds to Persian kaf in the key.
        let parsed = parse("كاج 200 درجه");
        assert!(parsed.table.get("کاج").is_some());
    }

    #[test]
    fn test_degree_symbol_accepted() {
        let parsed = parse("پلنت 230°");
        let records = parsed.table.get("پلنت").unwrap();
        assert_eq!(records[0].temperature.as_deref(), Some("230°"));
    }

    #[test]
    fn test_four_digit_number_is_not_a_temperature() {
        let parsed = parse("پلنت 1234 درجه");
        assert!(parsed.table.is_empty());
        assert_eq!(parsed.skipped_lines, 1);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "پلنت 8:20 دقیقه 240 درجه\nریرا 230 درجه\n# نظر\nبد";
        let first = parse(text);
        let second = parse(text);
        assert_eq!(first.table, second.table);
        assert_eq!(first.skipped_lines, second.skipped_lines);
    }

    #[test]
    fn test_normalize_folds_letter_variants() {
        assert_eq!(normalize(" يك "), "یک");
    }
}
