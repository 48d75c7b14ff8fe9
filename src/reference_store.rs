//! # Reference Store
//!
//! Holds the active reference source text and its parsed table. The table
//! is rebuilt lazily on the first read after a [`ReferenceStore::replace`],
//! under the store lock, so readers never observe a partially rebuilt
//! table.

use std::sync::Mutex;

use tracing::{debug, info};

use crate::reference_parser::{self, BrandReferenceTable, ReferenceRecord};

struct Inner {
    raw: String,
    /// `None` means the raw text changed and the table is stale.
    parsed: Option<reference_parser::ParsedReference>,
}

/// Process-wide store for brand reference records.
pub struct ReferenceStore {
    inner: Mutex<Inner>,
    /// Static catalog brands merged into [`ReferenceStore::brands`].
    catalog_brands: Vec<String>,
}

impl ReferenceStore {
    pub fn new(catalog_brands: Vec<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                raw: String::new(),
                parsed: None,
            }),
            catalog_brands,
        }
    }

    /// Seed the store from initial source text, e.g. a file loaded at
    /// startup.
    pub fn with_text(catalog_brands: Vec<String>, text: &str) -> Self {
        let store = Self::new(catalog_brands);
        store.replace(text);
        store
    }

    /// Replace the active source text. The old table stops being served
    /// immediately; the new one is built on the next read.
    pub fn replace(&self, text: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.raw = text.to_string();
        inner.parsed = None;
        info!(chars = text.len(), "reference source text replaced");
    }

    /// Look up records for a brand query.
    ///
    /// The query is normalized, then matched against the table: exact key
    /// match first, else the first key (in table order) where either side
    /// is a substring of the other. Empty when nothing matches.
    pub fn lookup(&self, brand: &str) -> Vec<ReferenceRecord> {
        let query = reference_parser::normalize(brand);
        if query.is_empty() {
            return Vec::new();
        }

        self.with_table(|table| {
            if let Some(records) = table.get(&query) {
                return records.to_vec();
            }
            for (key, records) in table.iter() {
                if key.contains(&query) || query.contains(key) {
                    debug!(query = %query, matched = %key, "brand matched by substring fallback");
                    return records.to_vec();
                }
            }
            Vec::new()
        })
    }

    /// Union of parsed brand keys and the configured catalog brands,
    /// first-seen order, without duplicates.
    pub fn brands(&self) -> Vec<String> {
        let mut brands = self.with_table(|table| table.brands());
        for brand in &self.catalog_brands {
            let normalized = reference_parser::normalize(brand);
            if !brands.contains(&normalized) {
                brands.push(normalized);
            }
        }
        brands
    }

    /// Lines the last parse dropped, for observability.
    pub fn skipped_lines(&self) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Self::parsed(&mut inner).skipped_lines
    }

    fn with_table<T>(&self, f: impl FnOnce(&BrandReferenceTable) -> T) -> T {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&Self::parsed(&mut inner).table)
    }

    fn parsed(inner: &mut Inner) -> &reference_parser::ParsedReference {
        let Inner { raw, parsed } = inner;
        parsed.get_or_insert_with(|| reference_parser::parse(raw))
    }
}
