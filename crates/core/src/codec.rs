//! Delimited text read/write: the tabular codec behind every collection.

use std::io::Read;
use std::path::Path;

use crate::error::KeymatchError;
use crate::model::{Keyed, Record};

/// An ordered sequence of records plus the header's column names in
/// declared order.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

/// Read a delimited file end to end, sniffing its delimiter.
pub fn read_path(path: &Path) -> Result<Table, KeymatchError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    parse(&content, delimiter)
}

/// Read a file and convert to UTF-8 if needed (handles Windows-1252,
/// Latin-1, etc. — common for Excel-exported CSVs).
pub fn read_file_as_utf8(path: &Path) -> Result<String, KeymatchError> {
    let mut file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KeymatchError::SourceNotFound(path.to_path_buf())
        } else {
            KeymatchError::SourceUnreadable(e.to_string())
        }
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| KeymatchError::SourceUnreadable(e.to_string()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Detect the most likely field delimiter by scoring candidates for
/// consistency over the first few lines.
///
/// A candidate must split the first line into more than one field; among
/// viable candidates, the one whose field count stays consistent across
/// the sample (weighted by field count) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];

    let sample: Vec<&str> = content.lines().take(10).collect();
    if sample.is_empty() {
        return b',';
    }

    let fields_in = |line: &str, delim: u8| -> usize {
        csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes())
            .records()
            .next()
            .and_then(|r| r.ok())
            .map(|r| r.len())
            .unwrap_or(1)
    };

    let mut best = b',';
    let mut best_score = 0u64;

    for delim in CANDIDATES {
        let target = fields_in(sample[0], delim);
        if target <= 1 {
            continue;
        }
        let consistent = sample.iter().filter(|l| fields_in(l, delim) == target).count();
        let score = consistent as u64 * target as u64;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Parse delimited text with a header row into a [`Table`]. Each row
/// becomes a record mapping column name → cell, in column order.
pub fn parse(content: &str, delimiter: u8) -> Result<Table, KeymatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| KeymatchError::SourceUnreadable(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| KeymatchError::SourceUnreadable(e.to_string()))?;
        let mut row = Record::new();
        for (i, column) in columns.iter().enumerate() {
            row.insert(column.clone(), record.get(i).unwrap_or("").to_string());
        }
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

/// Write a header row followed by one row per record in the given column
/// order. A record missing a named column fails the whole write.
pub fn write_records<'a>(
    path: &Path,
    fieldnames: &[String],
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<(), KeymatchError> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| KeymatchError::SourceUnreadable(e.to_string()))?;

    writer
        .write_record(fieldnames)
        .map_err(|e| KeymatchError::SourceUnreadable(e.to_string()))?;

    for record in records {
        let mut row: Vec<&str> = Vec::with_capacity(fieldnames.len());
        for column in fieldnames {
            let value = record
                .get(column)
                .ok_or_else(|| KeymatchError::SchemaMismatch { column: column.clone() })?;
            row.push(value);
        }
        writer
            .write_record(&row)
            .map_err(|e| KeymatchError::SourceUnreadable(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| KeymatchError::SourceUnreadable(e.to_string()))?;
    Ok(())
}

/// Serialize a collection's records in key-sorted order. When `fieldnames`
/// is not supplied it is derived from the first stored record; an empty
/// collection has nothing to derive from.
pub fn write_collection(
    collection: &dyn Keyed,
    path: &Path,
    fieldnames: Option<&[String]>,
) -> Result<(), KeymatchError> {
    let derived;
    let fieldnames = match fieldnames {
        Some(f) => f,
        None => {
            derived = collection
                .records()
                .values()
                .next()
                .map(|r| r.keys().cloned().collect::<Vec<_>>())
                .ok_or(KeymatchError::EmptyCollection)?;
            &derived
        }
    };
    write_records(path, fieldnames, collection.records().values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LoadedCollection;
    use tempfile::tempdir;

    #[test]
    fn sniff_comma() {
        assert_eq!(sniff_delimiter("Name,Age\nAlice,30\nBob,25\n"), b',');
    }

    #[test]
    fn sniff_semicolon() {
        assert_eq!(sniff_delimiter("Name;Age\nAlice;30\nBob;25\n"), b';');
    }

    #[test]
    fn sniff_tab() {
        assert_eq!(sniff_delimiter("Name\tAge\nAlice\t30\n"), b'\t');
    }

    #[test]
    fn sniff_pipe() {
        assert_eq!(sniff_delimiter("Name|Age|City\nAlice|30|Paris\n"), b'|');
    }

    #[test]
    fn sniff_semicolon_with_quoted_commas() {
        let content = "Name;Address\n\"Doe, Jane\";\"123 Main St, Apt 4\"\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn parse_preserves_column_order() {
        let table = parse("b,a,c\n1,2,3\n", b',').unwrap();
        assert_eq!(table.columns, ["b", "a", "c"]);
        assert_eq!(table.rows.len(), 1);
        let fields: Vec<&String> = table.rows[0].keys().collect();
        assert_eq!(fields, ["b", "a", "c"]);
        assert_eq!(table.rows[0]["a"], "2");
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let err = read_path(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(matches!(err, KeymatchError::SourceNotFound(_)));
    }

    #[test]
    fn write_rejects_record_missing_a_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let coll = LoadedCollection::from_delimited("a,b\n1,2\n", b',', &[]).unwrap();
        let err = write_collection(&coll, &path, Some(&["a".into(), "missing".into()]))
            .unwrap_err();
        assert!(matches!(err, KeymatchError::SchemaMismatch { ref column } if column == "missing"));
    }

    #[test]
    fn write_empty_collection_without_fieldnames_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let coll = LoadedCollection::from_delimited("a,b\n", b',', &[]).unwrap();
        let err = write_collection(&coll, &path, None).unwrap_err();
        assert!(matches!(err, KeymatchError::EmptyCollection));
    }

    #[test]
    fn round_trip_reproduces_mapped_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let source = "\
animal,number,code
dog,2,y
cat,1,x
";
        let keys = ["animal".to_string(), "number".to_string()];
        let coll = LoadedCollection::from_delimited(source, b',', &keys).unwrap();
        write_collection(&coll, &path, None).unwrap();

        // Rows come back in key-sorted order
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "animal,number,code\ncat,1,x\ndog,2,y\n");

        let reloaded = LoadedCollection::from_path(&path, &keys).unwrap();
        assert_eq!(reloaded.records(), coll.records());
    }
}
