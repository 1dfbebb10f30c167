use std::ops::Range;

use thiserror::Error;

// ---------------------------------------------------------------------------
// SchemaError – structural problems in a loaded table
// ---------------------------------------------------------------------------

/// Violations of the table's shape invariants, raised when assembling an
/// [`EmissionsTable`] from a parsed file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("no country column found (expected a non-year header such as \"Country/Region\")")]
    MissingCountryColumn,
    #[error("no year columns found in header")]
    NoYearColumns,
    #[error("duplicate year column {0}")]
    DuplicateYear(i32),
    #[error("year columns are not in ascending order")]
    UnorderedYears,
    #[error("row {row}: empty country name")]
    EmptyCountry { row: usize },
    #[error("row {row} ({country}): {got} values for {expected} year columns")]
    RowWidthMismatch {
        row: usize,
        country: String,
        got: usize,
        expected: usize,
    },
}

// ---------------------------------------------------------------------------
// CountryRow – one row of the emissions table
// ---------------------------------------------------------------------------

/// A single country's emissions, one value slot per year column.
///
/// `values` is parallel to [`EmissionsTable::years`]; `None` marks a missing
/// value (empty cell, unparseable text, or a non-finite number).
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRow {
    pub country: String,
    pub values: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// EmissionsTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full emissions dataset: a fixed, strictly ascending set of year
/// columns shared by every row. Built once at startup and read-only
/// afterwards; loading another file builds a whole new table.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionsTable {
    years: Vec<i32>,
    rows: Vec<CountryRow>,
}

impl EmissionsTable {
    /// Assemble a table, checking the shape invariants: at least one year
    /// column, years strictly ascending, every row as wide as the year set,
    /// every country name non-empty. Zero rows is fine (header-only file).
    pub fn new(years: Vec<i32>, rows: Vec<CountryRow>) -> Result<Self, SchemaError> {
        if years.is_empty() {
            return Err(SchemaError::NoYearColumns);
        }
        for w in years.windows(2) {
            if w[0] == w[1] {
                return Err(SchemaError::DuplicateYear(w[0]));
            }
            if w[0] > w[1] {
                return Err(SchemaError::UnorderedYears);
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.country.trim().is_empty() {
                return Err(SchemaError::EmptyCountry { row: i });
            }
            if row.values.len() != years.len() {
                return Err(SchemaError::RowWidthMismatch {
                    row: i,
                    country: row.country.clone(),
                    got: row.values.len(),
                    expected: years.len(),
                });
            }
        }
        Ok(EmissionsTable { years, rows })
    }

    /// Year columns, strictly ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// All rows in file order.
    pub fn rows(&self) -> &[CountryRow] {
        &self.rows
    }

    /// First and last year column.
    pub fn year_range(&self) -> (i32, i32) {
        // years is non-empty by construction
        (self.years[0], self.years[self.years.len() - 1])
    }

    /// Country names in row order (duplicates possible).
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.country.as_str())
    }

    /// Whether any row carries this exact country name.
    pub fn contains_country(&self, name: &str) -> bool {
        self.rows.iter().any(|r| r.country == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index range of the year columns inside the closed interval
    /// `[start_year, end_year]`. Years outside the known columns simply
    /// fall away; an inverted or fully disjoint interval gives an empty
    /// range.
    pub fn year_span(&self, start_year: i32, end_year: i32) -> Range<usize> {
        if start_year > end_year {
            return 0..0;
        }
        let lo = self.years.partition_point(|&y| y < start_year);
        let hi = self.years.partition_point(|&y| y <= end_year);
        lo..hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: &str, values: &[Option<f64>]) -> CountryRow {
        CountryRow {
            country: country.to_string(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn builds_with_matching_rows() {
        let table = EmissionsTable::new(
            vec![2000, 2001, 2002],
            vec![
                row("China", &[Some(10.0), Some(20.0), None]),
                row("United States", &[Some(5.0), Some(5.0), Some(4.0)]),
            ],
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.year_range(), (2000, 2002));
        assert_eq!(
            table.countries().collect::<Vec<_>>(),
            vec!["China", "United States"]
        );
        assert!(table.contains_country("China"));
        assert!(!table.contains_country("Chin"));
    }

    #[test]
    fn header_only_table_is_valid() {
        let table = EmissionsTable::new(vec![1990, 1991], Vec::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.year_range(), (1990, 1991));
    }

    #[test]
    fn rejects_empty_year_set() {
        let err = EmissionsTable::new(Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err, SchemaError::NoYearColumns);
    }

    #[test]
    fn rejects_duplicate_year() {
        let err = EmissionsTable::new(vec![2000, 2001, 2001], Vec::new()).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateYear(2001));
    }

    #[test]
    fn rejects_unordered_years() {
        let err = EmissionsTable::new(vec![2001, 2000], Vec::new()).unwrap_err();
        assert_eq!(err, SchemaError::UnorderedYears);
    }

    #[test]
    fn rejects_empty_country_name() {
        let err = EmissionsTable::new(
            vec![2000],
            vec![row("China", &[Some(1.0)]), row("  ", &[Some(1.0)])],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::EmptyCountry { row: 1 });
    }

    #[test]
    fn rejects_row_width_mismatch() {
        let err = EmissionsTable::new(vec![2000, 2001], vec![row("India", &[Some(1.0)])])
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RowWidthMismatch {
                row: 0,
                country: "India".to_string(),
                got: 1,
                expected: 2,
            }
        );
    }

    #[test]
    fn year_span_intersects_with_known_columns() {
        let table = EmissionsTable::new(vec![2000, 2001, 2002, 2003], Vec::new()).unwrap();

        assert_eq!(table.year_span(2000, 2003), 0..4);
        assert_eq!(table.year_span(2001, 2002), 1..3);
        // partial overlap clamps to the known columns
        assert_eq!(table.year_span(1990, 2001), 0..2);
        assert_eq!(table.year_span(2002, 2050), 2..4);
        // disjoint and inverted intervals are empty, not errors
        assert!(table.year_span(1980, 1990).is_empty());
        assert!(table.year_span(2010, 2020).is_empty());
        assert!(table.year_span(2003, 2000).is_empty());
    }
}
