use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{trace, warn};

use crate::domain::SubTrackError;
use crate::record::{Category, ColumnId, RecordId, Status, UnknownValue};
use crate::selection::Selection;

pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 15];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(UnknownValue {
                kind: "sort direction",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// All user adjustable parameters of one table instance.
///
/// Fields are only reachable through mutators so the page reset rules and
/// the `rows_per_page > 0` contract always hold:
/// - changing the query, a facet or the page size resets to page 1,
/// - sorting and column visibility keep the current page,
/// - the selection is never pruned implicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    query: String,
    status_facets: BTreeSet<Status>,
    category_facets: BTreeSet<Category>,
    visible_columns: BTreeSet<ColumnId>,
    sort_column: ColumnId,
    sort_direction: SortDirection,
    rows_per_page: usize,
    current_page: usize,
    selection: Selection,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query: String::new(),
            status_facets: BTreeSet::new(),
            category_facets: BTreeSet::new(),
            visible_columns: ColumnId::ALL.iter().copied().collect(),
            sort_column: ColumnId::StartDate,
            sort_direction: SortDirection::Desc,
            rows_per_page: ROWS_PER_PAGE_OPTIONS[0],
            current_page: 1,
            selection: Selection::new(),
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows_per_page(rows_per_page: usize) -> Result<Self, SubTrackError> {
        let mut state = Self::default();
        state.set_rows_per_page(rows_per_page)?;
        Ok(state)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status_facets(&self) -> &BTreeSet<Status> {
        &self.status_facets
    }

    pub fn category_facets(&self) -> &BTreeSet<Category> {
        &self.category_facets
    }

    pub fn visible_columns(&self) -> &BTreeSet<ColumnId> {
        &self.visible_columns
    }

    pub fn is_column_visible(&self, column: ColumnId) -> bool {
        self.visible_columns.contains(&column)
    }

    pub fn sort_column(&self) -> ColumnId {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn has_filters(&self) -> bool {
        !self.query.is_empty() || !self.status_facets.is_empty() || !self.category_facets.is_empty()
    }

    // -------------------- Filter mutators (reset the page) ---------------------- //

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            trace!("Query \"{}\" -> \"{}\"", self.query, query);
            self.query = query;
            self.current_page = 1;
        }
    }

    pub fn toggle_status_facet(&mut self, status: Status) {
        if !self.status_facets.remove(&status) {
            self.status_facets.insert(status);
        }
        self.current_page = 1;
    }

    pub fn toggle_category_facet(&mut self, category: Category) {
        if !self.category_facets.remove(&category) {
            self.category_facets.insert(category);
        }
        self.current_page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.query.clear();
        self.status_facets.clear();
        self.category_facets.clear();
        self.current_page = 1;
    }

    // -------------------- Sort and projection mutators ---------------------- //

    /// Header click: the active column flips direction, any other column
    /// becomes active in ascending order.
    pub fn set_sort_column(&mut self, column: ColumnId) {
        if column == self.sort_column {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Asc;
        }
        trace!("Sorting by {} {}", self.sort_column, self.sort_direction);
    }

    pub fn set_sort(&mut self, column: ColumnId, direction: SortDirection) {
        self.sort_column = column;
        self.sort_direction = direction;
    }

    pub fn toggle_column_visible(&mut self, column: ColumnId) {
        if !self.visible_columns.remove(&column) {
            self.visible_columns.insert(column);
        }
    }

    // -------------------- Paging mutators ---------------------- //

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<(), SubTrackError> {
        if rows_per_page == 0 {
            warn!("Rejecting rows per page of 0");
            return Err(SubTrackError::InvalidConfiguration(
                "rows per page must be positive".to_string(),
            ));
        }
        self.rows_per_page = rows_per_page;
        self.current_page = 1;
        Ok(())
    }

    /// Moves to the next entry of `ROWS_PER_PAGE_OPTIONS`, wrapping around.
    pub fn cycle_rows_per_page(&mut self) {
        let next = ROWS_PER_PAGE_OPTIONS
            .iter()
            .position(|&n| n == self.rows_per_page)
            .map(|idx| ROWS_PER_PAGE_OPTIONS[(idx + 1) % ROWS_PER_PAGE_OPTIONS.len()])
            .unwrap_or(ROWS_PER_PAGE_OPTIONS[0]);
        self.rows_per_page = next;
        self.current_page = 1;
    }

    /// Stores the page as given (0 becomes 1). Use `clamp_page` to pull it
    /// back into range once the page count is known.
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn clamp_page(&mut self, total_pages: usize) {
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.current_page = (self.current_page + 1).min(total_pages.max(1));
    }

    // -------------------- Selection ---------------------- //

    pub fn toggle_selection(&mut self, id: RecordId) {
        self.selection.toggle(id);
    }

    pub fn toggle_all_visible(&mut self, page_ids: &[RecordId]) {
        self.selection.toggle_all_visible(page_ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}
