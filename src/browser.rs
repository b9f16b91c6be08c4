use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::domain::DashError;
use crate::record::{ColumnSpec, Record};

pub const PAGE_SIZE: usize = 10;
pub const EXPORT_MESSAGE: &str = "Exporting data to Excel...";

/// Decides whether a record matches a search.
pub trait RecordMatcher {
    /// `needle` is already lower cased.
    fn is_match(&self, record: &Record, keys: &[String], needle: &str) -> Result<bool, DashError>;
}

/// Case insensitive substring match over the textual search keys.
#[derive(Debug, Default)]
pub struct SubstringMatcher;

impl RecordMatcher for SubstringMatcher {
    fn is_match(&self, record: &Record, keys: &[String], needle: &str) -> Result<bool, DashError> {
        Ok(keys.iter().any(|key| {
            record
                .text(key)
                .is_some_and(|value| value.to_lowercase().contains(needle))
        }))
    }
}

// Only exists while the browser holds data
#[derive(Debug)]
struct BrowseState {
    search: String,
    rows: Arc<Vec<usize>>, // Indices into the data, in data order
    visible: HashSet<String>,
    page: usize,
    selected: usize, // Row within the current page
}

pub struct TableBrowser {
    title: String,
    data: Arc<Vec<Record>>,
    columns: Vec<ColumnSpec>,
    search_keys: Vec<String>,
    hidden_columns: Vec<String>,
    matcher: Box<dyn RecordMatcher>,
    state: Option<BrowseState>,
}

impl TableBrowser {
    pub fn new(
        data: Arc<Vec<Record>>,
        columns: Vec<ColumnSpec>,
        search_keys: Vec<String>,
        hidden_columns: Vec<String>,
        title: &str,
    ) -> Self {
        let mut browser = Self {
            title: title.to_string(),
            data,
            columns,
            search_keys,
            hidden_columns,
            matcher: Box::new(SubstringMatcher),
            state: None,
        };
        browser.init_state();
        browser
    }

    #[cfg(test)]
    pub fn with_matcher(mut self, matcher: Box<dyn RecordMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    fn init_state(&mut self) {
        self.state = if self.data.is_empty() {
            debug!("\"{}\": no data, rendering empty state", self.title);
            None
        } else {
            Some(BrowseState {
                search: String::new(),
                rows: Arc::new((0..self.data.len()).collect()),
                visible: self.default_visible(),
                page: 1,
                selected: 0,
            })
        };
    }

    fn default_visible(&self) -> HashSet<String> {
        self.columns
            .iter()
            .map(|c| c.key.clone())
            .filter(|key| !self.hidden_columns.contains(key))
            .collect()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    #[cfg(test)]
    pub fn data(&self) -> &Arc<Vec<Record>> {
        &self.data
    }

    pub fn search_text(&self) -> &str {
        self.state.as_ref().map(|s| s.search.as_str()).unwrap_or("")
    }

    pub fn search(&mut self, text: &str) {
        let rows = self.filter_rows(text);
        if let Some(state) = self.state.as_mut() {
            state.search = text.to_string();
            state.rows = rows;
            state.page = 1;
            state.selected = 0;
        }
    }

    fn filter_rows(&self, text: &str) -> Arc<Vec<usize>> {
        let all = || Arc::new((0..self.data.len()).collect::<Vec<usize>>());
        if text.trim().is_empty() {
            return all();
        }

        let needle = text.to_lowercase();
        let mut rows = Vec::new();
        for (idx, record) in self.data.iter().enumerate() {
            match self.matcher.is_match(record, &self.search_keys, &needle) {
                Ok(true) => rows.push(idx),
                Ok(false) => {}
                Err(e) => {
                    error!("Error filtering \"{}\" for \"{text}\": {e}", self.title);
                    return all();
                }
            }
        }
        trace!("Search \"{text}\" matched {} of {} rows", rows.len(), self.data.len());
        Arc::new(rows)
    }

    /// Swap in new records, keeping search, visibility and page where possible.
    pub fn replace_data(&mut self, data: Arc<Vec<Record>>) {
        self.data = data;
        if self.data.is_empty() {
            self.state = None;
            return;
        }
        let Some(search) = self.state.as_ref().map(|s| s.search.clone()) else {
            self.init_state();
            return;
        };
        let rows = self.filter_rows(&search);
        if let Some(state) = self.state.as_mut() {
            state.rows = rows;
        }
        let page = self.current_page();
        self.change_page(page);
    }

    /// Number of rows left after filtering.
    pub fn filtered_len(&self) -> usize {
        self.state.as_ref().map(|s| s.rows.len()).unwrap_or(0)
    }

    #[cfg(test)]
    pub fn filtered(&self) -> Vec<&Record> {
        match &self.state {
            Some(state) => state.rows.iter().map(|&idx| &self.data[idx]).collect(),
            None => Vec::new(),
        }
    }

    // -------------------------- Columns ------------------------------- //

    pub fn is_visible(&self, key: &str) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.visible.contains(key))
    }

    /// Visible columns in declaration order.
    pub fn display_columns(&self) -> Vec<&ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| self.is_visible(&c.key))
            .collect()
    }

    pub fn toggle_column(&mut self, key: &str) {
        if !self.columns.iter().any(|c| c.key == key) {
            debug!("Ignoring toggle of unknown column \"{key}\"");
            return;
        }
        if let Some(state) = self.state.as_mut()
            && !state.visible.remove(key)
        {
            state.visible.insert(key.to_string());
        }
    }

    pub fn reset_columns(&mut self) {
        let visible = self.default_visible();
        if let Some(state) = self.state.as_mut() {
            state.visible = visible;
        }
    }

    // ------------------------- Pagination ------------------------------ //

    pub fn total_pages(&self) -> usize {
        self.filtered_len().div_ceil(PAGE_SIZE)
    }

    pub fn current_page(&self) -> usize {
        self.state.as_ref().map(|s| s.page).unwrap_or(1)
    }

    pub fn change_page(&mut self, page: usize) {
        let last = self.total_pages().max(1);
        let page = page.clamp(1, last);
        if let Some(state) = self.state.as_mut() {
            if state.page != page {
                state.selected = 0;
            }
            state.page = page;
        }
        self.clamp_selection();
    }

    pub fn next_page(&mut self) {
        self.change_page(self.current_page() + 1);
    }

    pub fn previous_page(&mut self) {
        self.change_page(self.current_page().saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.change_page(1);
    }

    pub fn last_page(&mut self) {
        self.change_page(self.total_pages());
    }

    fn page_bounds(&self) -> (usize, usize) {
        let start = (self.current_page() - 1) * PAGE_SIZE;
        let end = std::cmp::min(start + PAGE_SIZE, self.filtered_len());
        (start.min(end), end)
    }

    pub fn page_rows(&self) -> Vec<&Record> {
        let Some(state) = &self.state else {
            return Vec::new();
        };
        let (start, end) = self.page_bounds();
        state.rows[start..end]
            .iter()
            .map(|&idx| &self.data[idx])
            .collect()
    }

    /// 1-based first and last row shown plus the filtered total, all zero
    /// when nothing matches.
    pub fn showing(&self) -> (usize, usize, usize) {
        let (start, end) = self.page_bounds();
        if start == end {
            return (0, 0, self.filtered_len());
        }
        (start + 1, end, self.filtered_len())
    }

    // -------------------------- Selection ------------------------------ //

    pub fn selected_row(&self) -> usize {
        self.state.as_ref().map(|s| s.selected).unwrap_or(0)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if let Some(state) = self.state.as_mut() {
            state.selected = state.selected.saturating_add_signed(delta);
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let (start, end) = self.page_bounds();
        if let Some(state) = self.state.as_mut() {
            state.selected = std::cmp::min(state.selected, (end - start).saturating_sub(1));
        }
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.page_rows().get(self.selected_row()).copied()
    }

    /// Export is an acknowledgement only. Nothing is written.
    pub fn export(&self) -> &'static str {
        debug!("Export requested for \"{}\" ({} rows)", self.title, self.filtered_len());
        EXPORT_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts(n: usize) -> Arc<Vec<Record>> {
        Arc::new(
            (0..n)
                .map(|i| {
                    let name = if i < 20 {
                        format!("Contact {}", i + 1)
                    } else {
                        format!("Person {}", i + 1)
                    };
                    Record::new()
                        .with("id", format!("POC-{}", 1000 + i))
                        .with("name", name)
                        .with("employee", (i as u32) * 10)
                })
                .collect(),
        )
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("id", "ID"),
            ColumnSpec::new("name", "Name"),
            ColumnSpec::new("employee", "Employees"),
            ColumnSpec::new("status", "Status").render("pocStatus"),
        ]
    }

    fn browser(n: usize) -> TableBrowser {
        TableBrowser::new(
            contacts(n),
            columns(),
            vec!["name".to_string(), "employee".to_string()],
            vec!["status".to_string()],
            "Points of Contact",
        )
    }

    struct BrokenMatcher;

    impl RecordMatcher for BrokenMatcher {
        fn is_match(&self, _: &Record, _: &[String], _: &str) -> Result<bool, DashError> {
            Err(DashError::Matcher("unexpected record shape".into()))
        }
    }

    #[test]
    fn empty_data_has_no_browse_state() {
        let mut b = TableBrowser::new(Arc::new(Vec::new()), columns(), vec![], vec![], "Empty");
        assert!(b.is_empty());
        assert_eq!(b.title(), "Empty");
        assert!(b.display_columns().is_empty());
        assert!(b.page_rows().is_empty());
        b.search("x");
        b.change_page(3);
        assert_eq!(b.current_page(), 1);
        assert_eq!(b.search_text(), "");
    }

    #[test]
    fn search_scenario_contact_prefix() {
        let mut b = browser(25);
        b.search("cont");
        assert_eq!(b.filtered_len(), 20);
        assert_eq!(b.total_pages(), 2);
        assert!(b.filtered().iter().all(|r| r.text("name").unwrap().starts_with("Contact")));
    }

    #[test]
    fn blank_search_returns_everything_in_order() {
        let mut b = browser(25);
        b.search("Contact 1");
        b.search("   ");
        let ids: Vec<String> = b.filtered().iter().map(|r| r.display("id")).collect();
        let expected: Vec<String> = (0..25).map(|i| format!("POC-{}", 1000 + i)).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut b = browser(25);
        b.search("contact 1");
        let first: Vec<Record> = b.filtered().into_iter().cloned().collect();
        let mut again = TableBrowser::new(
            Arc::new(first.clone()),
            columns(),
            vec!["name".to_string()],
            vec![],
            "again",
        );
        again.search("contact 1");
        let second: Vec<Record> = again.filtered().into_iter().cloned().collect();
        assert_eq!(first, second);
        // Contact 1, 10..19
        assert_eq!(first.len(), 11);
    }

    #[test]
    fn matches_are_sound_and_complete() {
        let mut b = browser(25);
        b.search("SON 2");
        let kept: Vec<&Record> = b.filtered();
        assert!(kept
            .iter()
            .all(|r| r.text("name").unwrap().to_lowercase().contains("son 2")));
        let excluded = b
            .data()
            .iter()
            .filter(|r| !kept.contains(r))
            .all(|r| !r.text("name").unwrap().to_lowercase().contains("son 2"));
        assert!(excluded);
        assert_eq!(kept.len(), 5);
    }

    #[test]
    fn non_string_fields_never_match() {
        let mut b = browser(25);
        b.search("10");
        // "employee" holds numbers; only names with "10" match
        let names: Vec<String> = b.filtered().iter().map(|r| r.display("name")).collect();
        assert_eq!(names, vec!["Contact 10".to_string()]);
    }

    #[test]
    fn matcher_failure_shows_everything() {
        let mut b = browser(25).with_matcher(Box::new(BrokenMatcher));
        b.search("cont");
        assert_eq!(b.filtered_len(), 25);
        assert_eq!(b.current_page(), 1);
        assert_eq!(b.search_text(), "cont");
    }

    #[test]
    fn search_resets_page() {
        let mut b = browser(25);
        b.change_page(3);
        assert_eq!(b.current_page(), 3);
        b.search("c");
        assert_eq!(b.current_page(), 1);
    }

    #[test]
    fn change_page_clamps() {
        let mut b = browser(25);
        b.change_page(0);
        assert_eq!(b.current_page(), 1);
        b.change_page(99);
        assert_eq!(b.current_page(), 3);
        b.previous_page();
        assert_eq!(b.current_page(), 2);
        b.last_page();
        b.next_page();
        assert_eq!(b.current_page(), 3);
        assert_eq!(b.page_rows().len(), 5);
        assert_eq!(b.showing(), (21, 25, 25));
    }

    #[test]
    fn no_results_stay_on_page_one() {
        let mut b = browser(25);
        b.search("zzz");
        assert_eq!(b.total_pages(), 0);
        b.change_page(4);
        assert_eq!(b.current_page(), 1);
        assert!(b.page_rows().is_empty());
        assert!(b.selected_record().is_none());
        assert_eq!(b.showing(), (0, 0, 0));
    }

    #[test]
    fn columns_toggle_and_reset() {
        let mut b = browser(5);
        let keys = |b: &TableBrowser| -> Vec<String> {
            b.display_columns().iter().map(|c| c.key.clone()).collect()
        };
        assert_eq!(keys(&b), vec!["id", "name", "employee"]);

        b.toggle_column("name");
        b.toggle_column("status");
        b.toggle_column("does-not-exist");
        assert_eq!(keys(&b), vec!["id", "employee", "status"]);

        b.reset_columns();
        assert_eq!(keys(&b), vec!["id", "name", "employee"]);
    }

    #[test]
    fn selection_stays_on_page() {
        let mut b = browser(25);
        b.move_selection(50);
        assert_eq!(b.selected_row(), 9);
        b.last_page();
        assert_eq!(b.selected_row(), 0);
        b.move_selection(50);
        assert_eq!(b.selected_row(), 4);
        b.move_selection(-10);
        assert_eq!(b.selected_row(), 0);
        assert_eq!(b.selected_record().unwrap().display("id"), "POC-1020");
    }

    #[test]
    fn replace_data_keeps_search() {
        let mut b = browser(25);
        b.search("contact");
        b.change_page(2);
        b.replace_data(contacts(15));
        assert_eq!(b.search_text(), "contact");
        assert_eq!(b.filtered_len(), 15);
        assert_eq!(b.current_page(), 2);

        b.replace_data(contacts(5));
        assert_eq!(b.current_page(), 1);

        b.replace_data(Arc::new(Vec::new()));
        assert!(b.is_empty());
    }

    #[test]
    fn export_leaves_state_alone() {
        let mut b = browser(25);
        b.search("cont");
        b.change_page(2);
        assert_eq!(b.export(), EXPORT_MESSAGE);
        assert_eq!(b.current_page(), 2);
        assert_eq!(b.filtered_len(), 20);
    }
}
