//! Hourly CSV tables: one column per room, one row per hour.
//!
//! ```text
//! timestamp,R1,R2,C1
//! 2024-01-01T00:00,120,98,410
//! 2024-01-01T01:00,131,101,395
//! ```
//!
//! A leading time column is recognised by name and ignored: the simulator only
//! needs hour order, not wall-clock time.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use super::IngestError;

const TIME_COLUMNS: [&str; 4] = ["timestamp", "time", "date", "hour"];

/// Parsed hourly values keyed by room identifier, in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyTable {
    identifiers: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl HourlyTable {
    pub fn from_csv_path(path: &Path) -> Result<Self, IngestError> {
        let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, IngestError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let skip_first = headers
            .get(0)
            .is_some_and(|h| TIME_COLUMNS.contains(&h.to_ascii_lowercase().as_str()));
        let first_data = usize::from(skip_first);

        let identifiers: Vec<String> = headers.iter().skip(first_data).map(str::to_string).collect();
        if identifiers.is_empty() {
            return Err(IngestError::NoColumns);
        }
        for (i, id) in identifiers.iter().enumerate() {
            if id.is_empty() {
                return Err(IngestError::EmptyIdentifier { column: i + first_data });
            }
            if identifiers[..i].contains(id) {
                return Err(IngestError::DuplicateIdentifier(id.clone()));
            }
        }

        let mut columns = vec![Vec::new(); identifiers.len()];
        for (row_idx, record) in rdr.records().enumerate() {
            let record = record?;
            // Header is line 1.
            let line = row_idx + 2;
            if record.len() != identifiers.len() + first_data {
                return Err(IngestError::RaggedRow {
                    line,
                    expected: identifiers.len() + first_data,
                    found: record.len(),
                });
            }
            for (col, field) in record.iter().skip(first_data).enumerate() {
                let value: f64 = field.parse().map_err(|_| IngestError::BadValue {
                    line,
                    column: identifiers[col].clone(),
                    raw: field.to_string(),
                })?;
                if !value.is_finite() {
                    return Err(IngestError::BadValue {
                        line,
                        column: identifiers[col].clone(),
                        raw: field.to_string(),
                    });
                }
                columns[col].push(value);
            }
        }

        Ok(Self {
            identifiers,
            columns,
        })
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Number of hourly rows.
    pub fn hours(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column(&self, identifier: &str) -> Option<&[f64]> {
        let idx = self.identifiers.iter().position(|i| i == identifier)?;
        Some(&self.columns[idx])
    }

    /// Consume the table into an identifier → values map.
    pub fn into_map(self) -> BTreeMap<String, Vec<f64>> {
        self.identifiers.into_iter().zip(self.columns).collect()
    }

    /// Write the table back out as CSV with an `hour` index column.
    pub fn write_csv<W: std::io::Write>(
        identifiers: &[String],
        columns: &[Vec<f64>],
        writer: W,
    ) -> Result<(), IngestError> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec!["hour".to_string()];
        header.extend(identifiers.iter().cloned());
        wtr.write_record(&header)?;

        let hours = columns.iter().map(Vec::len).min().unwrap_or(0);
        for h in 0..hours {
            let mut row = vec![h.to_string()];
            row.extend(columns.iter().map(|c| format!("{:.3}", c[h])));
            wtr.write_record(&row)?;
        }
        wtr.flush().map_err(|source| IngestError::Io {
            path: "<writer>".into(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_columns_and_skips_time_column() {
        let csv = "timestamp,R1,C1\n2024-01-01T00:00,1.5,10\n2024-01-01T01:00,2.5,20\n";
        let table = HourlyTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.identifiers(), &["R1".to_string(), "C1".to_string()]);
        assert_eq!(table.hours(), 2);
        assert_eq!(table.column("R1"), Some(&[1.5, 2.5][..]));
        assert_eq!(table.column("C1"), Some(&[10.0, 20.0][..]));
    }

    #[test]
    fn keeps_first_column_when_not_a_time_column() {
        let csv = "R1,R2\n1,2\n";
        let table = HourlyTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.identifiers().len(), 2);
    }

    #[test]
    fn rejects_bad_value_with_location() {
        let csv = "R1,R2\n1,2\n3,abc\n";
        let err = HourlyTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        match err {
            IngestError::BadValue { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "R2");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_cell() {
        let csv = "R1,R2\n1,\n";
        assert!(matches!(
            HourlyTable::from_csv_reader(csv.as_bytes()),
            Err(IngestError::BadValue { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_identifier() {
        let csv = "R1,R1\n1,2\n";
        assert!(matches!(
            HourlyTable::from_csv_reader(csv.as_bytes()),
            Err(IngestError::DuplicateIdentifier(_))
        ));
    }

    #[test]
    fn rejects_header_only_time_column() {
        let csv = "timestamp\n2024-01-01\n";
        assert!(matches!(
            HourlyTable::from_csv_reader(csv.as_bytes()),
            Err(IngestError::NoColumns)
        ));
    }

    #[test]
    fn write_then_read_back() {
        let ids = vec!["R1".to_string(), "C1".to_string()];
        let cols = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let mut buf = Vec::new();
        HourlyTable::write_csv(&ids, &cols, &mut buf).unwrap();
        let table = HourlyTable::from_csv_reader(buf.as_slice()).unwrap();
        assert_eq!(table.identifiers(), ids.as_slice());
        assert_eq!(table.column("C1"), Some(&[3.0, 4.0][..]));
    }
}
