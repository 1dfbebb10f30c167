use std::collections::BTreeSet;

use crate::color::ColorMap;
use crate::data::model::EmissionsTable;
use crate::data::query::Selection;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Countries checked by default when a freshly loaded table carries them.
const DEFAULT_COUNTRIES: [&str; 2] = ["China", "United States"];

/// The full UI state, independent of rendering.
///
/// The table itself is never mutated; File → Open builds a complete new one
/// and swaps it in through [`AppState::replace_table`].
pub struct AppState {
    /// Loaded dataset, read-only for its whole lifetime.
    pub table: EmissionsTable,

    /// Checked entries of the country list.
    pub selected: BTreeSet<String>,

    /// Inclusive year interval driving both queries.
    pub start_year: i32,
    pub end_year: i32,

    /// Text filter over the country checkbox list.
    pub country_search: String,

    /// Country → colour, rebuilt when the table changes.
    pub color_map: ColorMap,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    /// State for a freshly loaded table: the two example countries checked
    /// (or the first two rows when neither exists), the full year range.
    pub fn new(table: EmissionsTable) -> Self {
        let selected = default_selection(&table);
        let (start_year, end_year) = table.year_range();
        let color_map = ColorMap::new(table.countries());
        AppState {
            table,
            selected,
            start_year,
            end_year,
            country_search: String::new(),
            color_map,
            status_message: None,
        }
    }

    /// Swap in a newly loaded table, resetting selection, years and colours.
    pub fn replace_table(&mut self, table: EmissionsTable) {
        *self = AppState::new(table);
    }

    /// Snapshot of the current inputs for the query engine.
    pub fn selection(&self) -> Selection {
        Selection {
            countries: self.selected.clone(),
            start_year: self.start_year,
            end_year: self.end_year,
        }
    }

    /// Flip one country checkbox.
    pub fn toggle_country(&mut self, country: &str) {
        if !self.selected.remove(country) {
            self.selected.insert(country.to_string());
        }
    }

    /// Check every country in the table.
    pub fn select_all(&mut self) {
        self.selected = self.table.countries().map(str::to_string).collect();
    }

    /// Uncheck everything; both charts go empty.
    pub fn select_none(&mut self) {
        self.selected.clear();
    }
}

fn default_selection(table: &EmissionsTable) -> BTreeSet<String> {
    let defaults: BTreeSet<String> = DEFAULT_COUNTRIES
        .iter()
        .copied()
        .filter(|name| table.contains_country(name))
        .map(str::to_string)
        .collect();
    if !defaults.is_empty() {
        return defaults;
    }
    table.countries().take(2).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CountryRow;

    fn table_of(names: &[&str]) -> EmissionsTable {
        let rows = names
            .iter()
            .map(|name| CountryRow {
                country: name.to_string(),
                values: vec![Some(1.0), Some(2.0)],
            })
            .collect();
        EmissionsTable::new(vec![2000, 2001], rows).unwrap()
    }

    #[test]
    fn defaults_to_example_countries_when_present() {
        let state = AppState::new(table_of(&["India", "China", "United States"]));
        let selected: Vec<&str> = state.selected.iter().map(String::as_str).collect();
        assert_eq!(selected, vec!["China", "United States"]);
        assert_eq!((state.start_year, state.end_year), (2000, 2001));
    }

    #[test]
    fn falls_back_to_first_two_rows() {
        let state = AppState::new(table_of(&["Austria", "Belgium", "Cyprus"]));
        let selected: Vec<&str> = state.selected.iter().map(String::as_str).collect();
        assert_eq!(selected, vec!["Austria", "Belgium"]);
    }

    #[test]
    fn selection_snapshot_carries_current_inputs() {
        let mut state = AppState::new(table_of(&["China", "United States"]));
        state.start_year = 2001;

        let selection = state.selection();
        assert_eq!(selection.start_year, 2001);
        assert_eq!(selection.end_year, 2001);
        assert!(selection.countries.contains("China"));
    }

    #[test]
    fn toggling_adds_and_removes() {
        let mut state = AppState::new(table_of(&["China", "United States", "India"]));
        state.toggle_country("India");
        assert!(state.selected.contains("India"));
        state.toggle_country("India");
        assert!(!state.selected.contains("India"));
    }

    #[test]
    fn select_all_and_none_cover_the_table() {
        let mut state = AppState::new(table_of(&["China", "United States", "India"]));
        state.select_all();
        assert_eq!(state.selected.len(), 3);
        state.select_none();
        assert!(state.selected.is_empty());
    }

    #[test]
    fn replace_table_resets_for_the_new_dataset() {
        let mut state = AppState::new(table_of(&["China", "United States"]));
        state.toggle_country("China");
        state.status_message = Some("old".to_string());

        let rows = vec![CountryRow {
            country: "Kenya".to_string(),
            values: vec![Some(0.5)],
        }];
        state.replace_table(EmissionsTable::new(vec![1995], rows).unwrap());

        assert_eq!((state.start_year, state.end_year), (1995, 1995));
        assert!(state.selected.contains("Kenya"));
        assert!(state.status_message.is_none());
    }
}
