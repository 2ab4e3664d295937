//! CSV table reader with structural validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::domain::RawTable;
use crate::IoError;

/// Reads a headed CSV file into a [`RawTable`].
///
/// Cells are kept as trimmed strings; typing happens in
/// [`normalize`](crate::normalize).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::DuplicateColumn`] | Same column name appears twice in the header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct TableReader {
    path: PathBuf,
}

impl TableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<RawTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so ragged rows surface as InconsistentRowLength, not CsvParse.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        let columns: Vec<String> = header.iter().map(str::to_string).collect();
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(IoError::DuplicateColumn {
                    path: self.path.clone(),
                    column: column.clone(),
                });
            }
        }
        debug!(n_columns = columns.len(), "read CSV header");

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            if record.len() != columns.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: columns.len(),
                    got: record.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_rows = rows.len(), n_columns = columns.len(), "table loaded");
        Ok(RawTable::new(columns, rows))
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn reads_valid_table() {
        let f = write_csv("date, revenue ,region\n2024-01-01,10,north\n2024-01-02, 12 ,south\n");
        let table = TableReader::new(f.path()).read().unwrap();
        assert_eq!(table.columns(), &["date", "revenue", "region"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][1], "12");
    }

    #[test]
    fn missing_file() {
        let err = TableReader::new(Path::new("/nonexistent/kpis.csv")).read().unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn header_only_is_empty() {
        let f = write_csv("date,revenue\n");
        let err = TableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn ragged_row() {
        let f = write_csv("date,revenue\n2024-01-01,1\n2024-01-02\n");
        let err = TableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InconsistentRowLength { row_index: 1, expected: 2, got: 1, .. }
        ));
    }

    #[test]
    fn duplicate_header() {
        let f = write_csv("date,region,region\n2024-01-01,a,b\n");
        let err = TableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::DuplicateColumn { ref column, .. } if column == "region"));
    }
}
