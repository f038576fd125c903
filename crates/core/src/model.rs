use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;

use crate::codec;
use crate::error::KeymatchError;

// ---------------------------------------------------------------------------
// Key + Record
// ---------------------------------------------------------------------------

/// One row of tabular data: column name → text value, in source column order.
pub type Record = IndexMap<String, String>;

/// Ordered tuple of text values identifying a record within a collection.
/// Two keys are equal iff all corresponding components are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(pub Vec<String>);

impl Key {
    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

// ---------------------------------------------------------------------------
// Keyed capability
// ---------------------------------------------------------------------------

/// Shape shared by both collection variants. Any two `Keyed` values with
/// equal key arity are comparable, regardless of how they were built.
pub trait Keyed {
    /// Field names the key is derived from, in declared order.
    fn key_fields(&self) -> &[String];

    /// Key → record table. Keys are unique by construction; iteration is
    /// key-sorted.
    fn records(&self) -> &BTreeMap<Key, Record>;
}

// ---------------------------------------------------------------------------
// LoadedCollection
// ---------------------------------------------------------------------------

/// A keyed collection materialized from a delimited source. Rows whose
/// derived key collides with an already-stored record land in `loss`
/// instead of overwriting it: the first-seen record wins.
#[derive(Debug, Clone)]
pub struct LoadedCollection {
    key_fields: Vec<String>,
    mapped: BTreeMap<Key, Record>,
    loss: Vec<Record>,
}

impl LoadedCollection {
    /// Load a delimited file, sniffing the delimiter from its content.
    ///
    /// An empty `key_fields` means every column of the source, in declared
    /// order, becomes the key.
    pub fn from_path(path: &Path, key_fields: &[String]) -> Result<Self, KeymatchError> {
        let content = codec::read_file_as_utf8(path)?;
        let delimiter = codec::sniff_delimiter(&content);
        Self::from_delimited(&content, delimiter, key_fields)
    }

    /// Build a collection from already-read delimited text.
    pub fn from_delimited(
        content: &str,
        delimiter: u8,
        key_fields: &[String],
    ) -> Result<Self, KeymatchError> {
        let table = codec::parse(content, delimiter)?;

        let key_fields: Vec<String> = if key_fields.is_empty() {
            table.columns.clone()
        } else {
            key_fields.to_vec()
        };

        // Validate against the header before touching any row.
        for field in &key_fields {
            if !table.columns.contains(field) {
                return Err(KeymatchError::MissingKeyField { field: field.clone() });
            }
        }

        let mut mapped = BTreeMap::new();
        let mut loss = Vec::new();

        for record in table.rows {
            let key = Key(
                key_fields
                    .iter()
                    .map(|f| record.get(f).cloned().unwrap_or_default())
                    .collect(),
            );
            if mapped.contains_key(&key) {
                // First-seen record for a key wins; repeats are preserved
                // for auditing rather than silently dropped.
                loss.push(record);
            } else {
                mapped.insert(key, record);
            }
        }

        Ok(Self { key_fields, mapped, loss })
    }

    /// Records discarded at load time due to duplicate-key collisions,
    /// in source row order.
    pub fn loss(&self) -> &[Record] {
        &self.loss
    }

    pub fn loss_count(&self) -> usize {
        self.loss.len()
    }
}

impl Keyed for LoadedCollection {
    fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    fn records(&self) -> &BTreeMap<Key, Record> {
        &self.mapped
    }
}

// ---------------------------------------------------------------------------
// ComparisonResult
// ---------------------------------------------------------------------------

/// Output of a comparison operation. Implements [`Keyed`], so a result can
/// be fed straight into another comparison.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    key_fields: Vec<String>,
    mapped: BTreeMap<Key, Record>,
}

impl ComparisonResult {
    /// Wrap a prebuilt key → record table. Key fields are taken from the
    /// first stored record's own field order; an empty table yields empty
    /// key fields.
    pub fn from_mapped(mapped: BTreeMap<Key, Record>) -> Self {
        let key_fields = mapped
            .values()
            .next()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        Self { key_fields, mapped }
    }

    /// Field names of the stored records, for writing or chaining.
    pub fn fieldnames(&self) -> Result<Vec<String>, KeymatchError> {
        self.mapped
            .values()
            .next()
            .map(|r| r.keys().cloned().collect())
            .ok_or(KeymatchError::EmptyResult)
    }

    pub fn is_empty(&self) -> bool {
        self.mapped.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mapped.len()
    }
}

impl Keyed for ComparisonResult {
    fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    fn records(&self) -> &BTreeMap<Key, Record> {
        &self.mapped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ANIMALS: &str = "\
animal,number,code
cat,1,x
dog,2,y
";

    #[test]
    fn load_basic() {
        let coll =
            LoadedCollection::from_delimited(ANIMALS, b',', &["animal".into(), "number".into()])
                .unwrap();
        assert_eq!(coll.records().len(), 2);
        assert_eq!(coll.loss_count(), 0);

        let key = Key(vec!["cat".into(), "1".into()]);
        let record = &coll.records()[&key];
        assert_eq!(record["code"], "x");
        // Field order follows the source header
        let fields: Vec<&String> = record.keys().collect();
        assert_eq!(fields, ["animal", "number", "code"]);
    }

    #[test]
    fn empty_key_fields_use_every_column() {
        let coll = LoadedCollection::from_delimited(ANIMALS, b',', &[]).unwrap();
        assert_eq!(coll.key_fields(), ["animal", "number", "code"]);
        assert!(coll
            .records()
            .contains_key(&Key(vec!["cat".into(), "1".into(), "x".into()])));
    }

    #[test]
    fn missing_key_field_rejected() {
        let err = LoadedCollection::from_delimited(ANIMALS, b',', &["species".into()]).unwrap_err();
        assert!(matches!(err, KeymatchError::MissingKeyField { ref field } if field == "species"));
    }

    #[test]
    fn duplicate_key_first_wins() {
        let csv = "\
animal,number,code
cat,1,first
cat,1,second
dog,2,y
";
        let coll =
            LoadedCollection::from_delimited(csv, b',', &["animal".into(), "number".into()])
                .unwrap();
        assert_eq!(coll.records().len(), 2);
        assert_eq!(coll.loss_count(), 1);

        let key = Key(vec!["cat".into(), "1".into()]);
        assert_eq!(coll.records()[&key]["code"], "first");
        assert_eq!(coll.loss()[0]["code"], "second");
    }

    #[test]
    fn result_key_fields_from_first_record() {
        let coll = LoadedCollection::from_delimited(ANIMALS, b',', &["animal".into()]).unwrap();
        let result = ComparisonResult::from_mapped(coll.records().clone());
        assert_eq!(result.key_fields(), ["animal", "number", "code"]);
        assert_eq!(result.fieldnames().unwrap(), ["animal", "number", "code"]);
    }

    #[test]
    fn empty_result_has_no_fieldnames() {
        let result = ComparisonResult::from_mapped(BTreeMap::new());
        assert!(result.is_empty());
        assert!(result.key_fields().is_empty());
        assert!(matches!(result.fieldnames(), Err(KeymatchError::EmptyResult)));
    }
}
