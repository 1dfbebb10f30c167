//! Pure queries over the loaded table.
//!
//! Both entry points take the immutable table plus a [`Selection`] and build
//! fresh point sequences owned by the caller; nothing here caches or
//! mutates, so concurrent calls from any number of input events are safe.

use std::collections::BTreeSet;

use super::model::EmissionsTable;

// ---------------------------------------------------------------------------
// Selection – what the user asked for
// ---------------------------------------------------------------------------

/// User-chosen filter driving both queries: a set of country names plus the
/// closed year interval `[start_year, end_year]`.
///
/// Unknown country names match no rows. Years outside the table's columns
/// narrow to the intersection; an inverted interval or an empty country set
/// selects nothing. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub countries: BTreeSet<String>,
    pub start_year: i32,
    pub end_year: i32,
}

impl Selection {
    pub fn new<I, S>(countries: I, start_year: i32, end_year: i32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection {
            countries: countries.into_iter().map(Into::into).collect(),
            start_year,
            end_year,
        }
    }
}

fn selects_nothing(selection: &Selection) -> bool {
    selection.countries.is_empty() || selection.start_year > selection.end_year
}

// ---------------------------------------------------------------------------
// Query outputs
// ---------------------------------------------------------------------------

/// One melted observation: a country's emissions for a single year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint<'a> {
    pub country: &'a str,
    pub year: i32,
    pub emissions: f64,
}

/// A country's summed emissions over the selected year range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalPoint<'a> {
    pub country: &'a str,
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Melt the table into one point per selected row per in-range year with a
/// present value. Output order is table row order, then ascending year, so
/// each row forms a consecutive run the chart can group by country.
pub fn series_query<'t>(table: &'t EmissionsTable, selection: &Selection) -> Vec<SeriesPoint<'t>> {
    if selects_nothing(selection) {
        return Vec::new();
    }
    let span = table.year_span(selection.start_year, selection.end_year);
    if span.is_empty() {
        return Vec::new();
    }

    let years = &table.years()[span.clone()];
    let mut points = Vec::new();
    for row in table.rows() {
        if !selection.countries.contains(row.country.as_str()) {
            continue;
        }
        for (&year, value) in years.iter().zip(&row.values[span.clone()]) {
            if let Some(emissions) = *value {
                points.push(SeriesPoint {
                    country: &row.country,
                    year,
                    emissions,
                });
            }
        }
    }
    points
}

/// Sum each selected row's emissions over the in-range years, missing
/// values counting as zero. One point per retained row, in table row order,
/// so duplicate country names keep one entry each. An interval with no
/// in-range year columns yields an empty sequence, not a row of zeros.
pub fn totals_query<'t>(table: &'t EmissionsTable, selection: &Selection) -> Vec<TotalPoint<'t>> {
    if selects_nothing(selection) {
        return Vec::new();
    }
    let span = table.year_span(selection.start_year, selection.end_year);
    if span.is_empty() {
        return Vec::new();
    }

    table
        .rows()
        .iter()
        .filter(|row| selection.countries.contains(row.country.as_str()))
        .map(|row| TotalPoint {
            country: &row.country,
            total: row.values[span.clone()].iter().flatten().sum(),
        })
        .collect()
}

/// Number of in-range years with a present value, one entry per retained
/// row. Same retention and order as [`totals_query`], so the two zip
/// index-for-index even when country names repeat.
pub fn coverage_query(table: &EmissionsTable, selection: &Selection) -> Vec<usize> {
    if selects_nothing(selection) {
        return Vec::new();
    }
    let span = table.year_span(selection.start_year, selection.end_year);
    if span.is_empty() {
        return Vec::new();
    }

    table
        .rows()
        .iter()
        .filter(|row| selection.countries.contains(row.country.as_str()))
        .map(|row| row.values[span.clone()].iter().flatten().count())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::data::model::CountryRow;

    fn row(country: &str, values: &[Option<f64>]) -> CountryRow {
        CountryRow {
            country: country.to_string(),
            values: values.to_vec(),
        }
    }

    /// The worked example from the product notes: China [2000→10, 2001→20],
    /// USA [2000→5, 2001→5].
    fn example_table() -> EmissionsTable {
        EmissionsTable::new(
            vec![2000, 2001],
            vec![
                row("China", &[Some(10.0), Some(20.0)]),
                row("USA", &[Some(5.0), Some(5.0)]),
            ],
        )
        .unwrap()
    }

    fn point<'a>(country: &'a str, year: i32, emissions: f64) -> SeriesPoint<'a> {
        SeriesPoint {
            country,
            year,
            emissions,
        }
    }

    #[test]
    fn series_melts_rows_then_years() {
        let table = example_table();
        let selection = Selection::new(["China", "USA"], 2000, 2001);

        let series = series_query(&table, &selection);
        assert_eq!(
            series,
            vec![
                point("China", 2000, 10.0),
                point("China", 2001, 20.0),
                point("USA", 2000, 5.0),
                point("USA", 2001, 5.0),
            ]
        );
    }

    #[test]
    fn totals_sum_the_full_interval() {
        let table = example_table();
        let selection = Selection::new(["China", "USA"], 2000, 2001);

        let totals = totals_query(&table, &selection);
        assert_eq!(totals.len(), 2);
        assert_eq!((totals[0].country, totals[0].total), ("China", 30.0));
        assert_eq!((totals[1].country, totals[1].total), ("USA", 10.0));
    }

    #[test]
    fn inverted_interval_yields_empty() {
        let table = example_table();
        let selection = Selection::new(["China", "USA"], 2001, 2000);

        assert!(series_query(&table, &selection).is_empty());
        assert!(totals_query(&table, &selection).is_empty());
    }

    #[test]
    fn empty_country_set_yields_empty() {
        let table = example_table();
        let selection = Selection::new(Vec::<String>::new(), 2000, 2001);

        assert!(series_query(&table, &selection).is_empty());
        assert!(totals_query(&table, &selection).is_empty());
    }

    #[test]
    fn unknown_country_contributes_no_rows() {
        let table = example_table();
        let selection = Selection::new(["China", "Wakanda"], 2000, 2001);

        let series = series_query(&table, &selection);
        assert_eq!(
            series,
            vec![point("China", 2000, 10.0), point("China", 2001, 20.0)]
        );

        let totals = totals_query(&table, &selection);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].country, "China");
    }

    #[test]
    fn interval_clamps_to_known_columns() {
        let table = example_table();
        // 1990..2000 overlaps only the 2000 column
        let selection = Selection::new(["China"], 1990, 2000);

        assert_eq!(series_query(&table, &selection), vec![point("China", 2000, 10.0)]);
        assert_eq!(totals_query(&table, &selection)[0].total, 10.0);
    }

    #[test]
    fn disjoint_interval_yields_empty() {
        let table = example_table();
        for (start, end) in [(1980, 1999), (2002, 2050)] {
            let selection = Selection::new(["China", "USA"], start, end);
            assert!(series_query(&table, &selection).is_empty());
            assert!(totals_query(&table, &selection).is_empty());
        }
    }

    #[test]
    fn single_year_interval_is_inclusive() {
        let table = example_table();
        let selection = Selection::new(["USA"], 2001, 2001);

        assert_eq!(series_query(&table, &selection), vec![point("USA", 2001, 5.0)]);
        assert_eq!(totals_query(&table, &selection)[0].total, 5.0);
    }

    #[test]
    fn missing_values_skip_series_and_zero_totals() {
        let table = EmissionsTable::new(
            vec![2000, 2001],
            vec![
                row("Germany", &[None, Some(7.0)]),
                row("Atlantis", &[None, None]),
            ],
        )
        .unwrap();
        let selection = Selection::new(["Germany", "Atlantis"], 2000, 2001);

        let series = series_query(&table, &selection);
        assert_eq!(series, vec![point("Germany", 2001, 7.0)]);

        let totals = totals_query(&table, &selection);
        assert_eq!((totals[0].country, totals[0].total), ("Germany", 7.0));
        // a row with no values in range still gets its (zero) bar
        assert_eq!((totals[1].country, totals[1].total), ("Atlantis", 0.0));
    }

    #[test]
    fn duplicate_country_rows_emit_one_total_each() {
        let table = EmissionsTable::new(
            vec![2000],
            vec![
                row("France", &[Some(1.0)]),
                row("Japan", &[Some(9.0)]),
                row("France", &[Some(2.0)]),
            ],
        )
        .unwrap();
        let selection = Selection::new(["France"], 2000, 2000);

        let totals = totals_query(&table, &selection);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].total, 1.0);
        assert_eq!(totals[1].total, 2.0);
    }

    #[test]
    fn coverage_counts_present_values_per_row() {
        let table = EmissionsTable::new(
            vec![2000, 2001, 2002],
            vec![
                row("France", &[Some(1.0), None, Some(3.0)]),
                row("Japan", &[Some(9.0), Some(8.0), Some(7.0)]),
                row("France", &[None, None, None]),
            ],
        )
        .unwrap();
        let selection = Selection::new(["France", "Japan"], 2000, 2002);

        // duplicate-named rows keep their own counts, in table row order
        let coverage = coverage_query(&table, &selection);
        assert_eq!(coverage, vec![2, 3, 0]);
        assert_eq!(coverage.len(), totals_query(&table, &selection).len());
    }

    #[test]
    fn coverage_respects_the_year_interval() {
        let table = example_table();
        assert_eq!(
            coverage_query(&table, &Selection::new(["China"], 2001, 2001)),
            vec![1]
        );
        assert!(coverage_query(&table, &Selection::new(["China"], 2001, 2000)).is_empty());
    }

    #[test]
    fn output_follows_table_row_order_not_selection_order() {
        // table deliberately ordered against the alphabetical set order
        let table = EmissionsTable::new(
            vec![2000],
            vec![row("USA", &[Some(5.0)]), row("China", &[Some(10.0)])],
        )
        .unwrap();
        let selection = Selection::new(["China", "USA"], 2000, 2000);

        let totals = totals_query(&table, &selection);
        assert_eq!(totals[0].country, "USA");
        assert_eq!(totals[1].country, "China");

        let series = series_query(&table, &selection);
        assert_eq!(series[0].country, "USA");
        assert_eq!(series[1].country, "China");
    }

    #[test]
    fn repeated_queries_are_identical() {
        let table = example_table();
        let selection = Selection::new(["China", "USA"], 2000, 2001);

        assert_eq!(
            series_query(&table, &selection),
            series_query(&table, &selection)
        );
        assert_eq!(
            totals_query(&table, &selection),
            totals_query(&table, &selection)
        );
    }

    #[test]
    fn concurrent_queries_agree() {
        let table = Arc::new(example_table());
        let selection = Selection::new(["China", "USA"], 2000, 2001);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let table = Arc::clone(&table);
                let selection = selection.clone();
                std::thread::spawn(move || {
                    let n_points = series_query(&table, &selection).len();
                    let grand_total: f64 =
                        totals_query(&table, &selection).iter().map(|t| t.total).sum();
                    (n_points, grand_total)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), (4, 40.0));
        }
    }

    // -- Property tests: random tables and selections --

    const PROP_YEARS: [i32; 6] = [1998, 1999, 2000, 2001, 2002, 2003];

    fn arb_table() -> impl Strategy<Value = EmissionsTable> {
        prop::collection::vec(
            (
                "[A-E]",
                prop::collection::vec(prop::option::of(0.0..1000.0f64), PROP_YEARS.len()),
            ),
            0..8,
        )
        .prop_map(|raw| {
            let rows = raw
                .into_iter()
                .map(|(country, values)| CountryRow { country, values })
                .collect();
            EmissionsTable::new(PROP_YEARS.to_vec(), rows).unwrap()
        })
    }

    fn arb_selection() -> impl Strategy<Value = Selection> {
        (
            // "F" never appears in a table, so selections can name unknowns
            prop::collection::btree_set("[A-F]", 0..6),
            1995..2006i32,
            1995..2006i32,
        )
            .prop_map(|(countries, start_year, end_year)| Selection {
                countries,
                start_year,
                end_year,
            })
    }

    proptest! {
        /// The cross-check from the product notes: per country, the total
        /// equals the sum of the series values over the same range.
        #[test]
        fn totals_match_series_sums(table in arb_table(), selection in arb_selection()) {
            let series = series_query(&table, &selection);
            let totals = totals_query(&table, &selection);

            let mut from_series: BTreeMap<&str, f64> = BTreeMap::new();
            for p in &series {
                *from_series.entry(p.country).or_insert(0.0) += p.emissions;
            }
            let mut from_totals: BTreeMap<&str, f64> = BTreeMap::new();
            for t in &totals {
                *from_totals.entry(t.country).or_insert(0.0) += t.total;
            }

            // a country that is all-missing in range totals to zero and has
            // no series points, so compare in both directions with a default
            for (country, sum) in &from_series {
                let total = from_totals.get(country).copied().unwrap_or(0.0);
                prop_assert!((sum - total).abs() <= 1e-6, "{country}: {sum} vs {total}");
            }
            for (country, total) in &from_totals {
                let sum = from_series.get(country).copied().unwrap_or(0.0);
                prop_assert!((sum - total).abs() <= 1e-6, "{country}: {total} vs {sum}");
            }
        }

        /// Every series point comes from exactly one retained row, so the
        /// coverage counts sum to the series length.
        #[test]
        fn coverage_aligns_with_series(table in arb_table(), selection in arb_selection()) {
            let coverage = coverage_query(&table, &selection);
            prop_assert_eq!(coverage.len(), totals_query(&table, &selection).len());
            let counted: usize = coverage.iter().sum();
            prop_assert_eq!(counted, series_query(&table, &selection).len());
        }

        #[test]
        fn inverted_intervals_always_empty(table in arb_table(), mut selection in arb_selection()) {
            selection.start_year = selection.end_year + 1;
            prop_assert!(series_query(&table, &selection).is_empty());
            prop_assert!(totals_query(&table, &selection).is_empty());
        }

        #[test]
        fn empty_country_set_always_empty(table in arb_table(), mut selection in arb_selection()) {
            selection.countries.clear();
            prop_assert!(series_query(&table, &selection).is_empty());
            prop_assert!(totals_query(&table, &selection).is_empty());
        }
    }
}
