use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::TaggerError;

/// Tag returned for class indices that have no entry in the table.
pub const UNKNOWN_TAG: &str = "Unknown";

/// One row of the label encoding table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub index: usize,
    pub tag: String,
}

impl LabelEntry {
    pub fn new(index: usize, tag: impl Into<String>) -> Self {
        Self {
            index,
            tag: tag.into(),
        }
    }
}

/// The encoding table the abbreviation/long-form tagger was trained with.
pub fn default_label_table() -> Vec<LabelEntry> {
    vec![
        LabelEntry::new(1, "B-O"),
        LabelEntry::new(2, "B-AC"),
        LabelEntry::new(3, "B-LF"),
        LabelEntry::new(4, "I-LF"),
    ]
}

/// Tags decoded for one sequence plus how many indices fell outside the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTags {
    pub tags: Vec<String>,
    pub unknown: usize,
}

/// Single canonical mapping between model class indices and NER tags.
///
/// Both directions are built from the same table, so `decode(encode(tag))`
/// always returns `tag`. Decoding never fails: indices missing from the
/// table yield the sentinel and a warning.
#[derive(Debug, Clone)]
pub struct LabelCodec {
    entries: Vec<LabelEntry>,
    by_index: FxHashMap<usize, usize>,
    by_tag: FxHashMap<String, usize>,
    sentinel: String,
}

impl LabelCodec {
    /// Build a codec from `entries`, rejecting duplicate indices or tags.
    pub fn new(
        entries: impl IntoIterator<Item = LabelEntry>,
        sentinel: impl Into<String>,
    ) -> Result<Self, TaggerError> {
        let sentinel = sentinel.into();
        let mut table: Vec<LabelEntry> = entries.into_iter().collect();
        if table.is_empty() {
            return Err(TaggerError::InvalidLabelTable("table is empty".into()));
        }
        table.sort_by_key(|entry| entry.index);

        let mut seen_tags = FxHashSet::default();
        for (pos, entry) in table.iter().enumerate() {
            if entry.tag.is_empty() {
                return Err(TaggerError::InvalidLabelTable(format!(
                    "index {} has an empty tag",
                    entry.index
                )));
            }
            if entry.tag == sentinel {
                return Err(TaggerError::InvalidLabelTable(format!(
                    "tag {:?} collides with the unknown-label sentinel",
                    entry.tag
                )));
            }
            if pos > 0 && table[pos - 1].index == entry.index {
                return Err(TaggerError::InvalidLabelTable(format!(
                    "duplicate index {}",
                    entry.index
                )));
            }
            if !seen_tags.insert(entry.tag.as_str()) {
                return Err(TaggerError::InvalidLabelTable(format!(
                    "duplicate tag {:?}",
                    entry.tag
                )));
            }
        }

        Ok(Self::from_table(table, sentinel))
    }

    /// Index both directions from one table. `table` must already be sorted
    /// by index and free of duplicates.
    fn from_table(table: Vec<LabelEntry>, sentinel: String) -> Self {
        let by_index = table
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.index, pos))
            .collect();
        let by_tag = table
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.tag.clone(), pos))
            .collect();
        Self {
            entries: table,
            by_index,
            by_tag,
            sentinel,
        }
    }

    /// Tag for `index`, or `None` when the table has no such class.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.by_index
            .get(&index)
            .map(|&pos| self.entries[pos].tag.as_str())
    }

    /// Tag for `index`, falling back to the sentinel with a warning.
    pub fn decode(&self, index: usize) -> &str {
        match self.get(index) {
            Some(tag) => tag,
            None => {
                tracing::warn!(
                    index,
                    sentinel = %self.sentinel,
                    "model emitted a class index with no known tag"
                );
                &self.sentinel
            }
        }
    }

    /// Decode a whole sequence, counting sentinel substitutions.
    pub fn decode_all(&self, indices: impl IntoIterator<Item = usize>) -> DecodedTags {
        let mut unknown = 0;
        let tags = indices
            .into_iter()
            .map(|index| {
                if self.get(index).is_none() {
                    unknown += 1;
                }
                self.decode(index).to_string()
            })
            .collect();
        DecodedTags { tags, unknown }
    }

    pub fn encode(&self, tag: &str) -> Option<usize> {
        self.by_tag.get(tag).map(|&pos| self.entries[pos].index)
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Known tags ordered by class index.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.tag.as_str())
    }

    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LabelCodec {
    fn default() -> Self {
        let mut table = default_label_table();
        table.sort_by_key(|entry| entry.index);
        Self::from_table(table, UNKNOWN_TAG.to_string())
    }
}
