use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::SubTrackError;
use crate::pipeline::{self, PipelineOutput};
use crate::record::{Category, ColumnId, Record, RecordId, Status};
use crate::view_state::{SortDirection, ViewState};

/// One rendered row: the record id, its selection state and the cells of the
/// visible columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: RecordId,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// Everything a render surface needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<ColumnId>,
    pub rows: Vec<RowView>,
    pub sort_column: ColumnId,
    pub sort_direction: SortDirection,
    pub current_page: usize,
    pub total_pages: usize,
    pub rows_per_page: usize,
    pub filtered_count: usize,
    pub selected_count: usize,
    pub all_visible_selected: bool,
}

impl TableView {
    pub fn page_ids(&self) -> Vec<RecordId> {
        self.rows.iter().map(|r| r.id).collect()
    }
}

/// The engine: a record set, its view state and the operations a host calls
/// in response to user gestures.
#[derive(Debug, Clone)]
pub struct SubscriptionTable {
    records: Arc<Vec<Record>>,
    state: ViewState,
}

impl SubscriptionTable {
    pub fn new(records: Vec<Record>) -> Self {
        Self::with_state(records, ViewState::default())
    }

    pub fn with_state(records: Vec<Record>, state: ViewState) -> Self {
        let mut table = Self {
            records: Arc::new(records),
            state,
        };
        table.clamp_page();
        table
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Replaces the record set. View parameters and selection are kept,
    /// only the page is pulled back into the new bounds.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        info!("Replacing {} records with {}", self.records.len(), records.len());
        self.records = Arc::new(records);
        self.clamp_page();
    }

    pub fn recompute(&self) -> PipelineOutput<'_> {
        pipeline::recompute(&self.records, &self.state)
    }

    pub fn total_pages(&self) -> usize {
        let filtered = pipeline::filter_records(
            &self.records,
            self.state.query(),
            self.state.status_facets(),
            self.state.category_facets(),
        );
        pipeline::total_pages(filtered.len(), self.state.rows_per_page())
    }

    /// Ids of the rows on the current page, in display order.
    pub fn page_ids(&self) -> Vec<RecordId> {
        self.recompute().page_ids()
    }

    /// Records on the current page, in display order.
    pub fn page_records(&self) -> Vec<&Record> {
        self.recompute().page
    }

    pub fn view(&self) -> TableView {
        let output = self.recompute();
        let columns: Vec<ColumnId> = self.state.visible_columns().iter().copied().collect();
        let selection = self.state.selection();
        let page_ids = output.page_ids();

        let rows = output
            .page
            .iter()
            .map(|record| RowView {
                id: record.id,
                selected: selection.is_selected(record.id),
                cells: columns.iter().map(|&c| record.cell(c)).collect(),
            })
            .collect();

        TableView {
            columns,
            rows,
            sort_column: self.state.sort_column(),
            sort_direction: self.state.sort_direction(),
            current_page: output.current_page,
            total_pages: output.total_pages,
            rows_per_page: self.state.rows_per_page(),
            filtered_count: output.filtered_count,
            selected_count: selection.len(),
            all_visible_selected: selection.is_all_visible_selected(&page_ids),
        }
    }

    /// Selected records that are part of the current record set, in record order.
    pub fn selected_records(&self) -> Vec<&Record> {
        let selection = self.state.selection();
        self.records.iter().filter(|r| selection.is_selected(r.id)).collect()
    }

    // -------------------- Mutators ---------------------- //

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.set_query(query);
    }

    pub fn toggle_status_facet(&mut self, status: Status) {
        self.state.toggle_status_facet(status);
    }

    pub fn toggle_category_facet(&mut self, category: Category) {
        self.state.toggle_category_facet(category);
    }

    pub fn reset_filters(&mut self) {
        self.state.reset_filters();
    }

    pub fn set_sort_column(&mut self, column: ColumnId) {
        self.state.set_sort_column(column);
    }

    pub fn set_sort(&mut self, column: ColumnId, direction: SortDirection) {
        self.state.set_sort(column, direction);
    }

    pub fn toggle_column_visible(&mut self, column: ColumnId) {
        self.state.toggle_column_visible(column);
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<(), SubTrackError> {
        self.state.set_rows_per_page(rows_per_page)
    }

    pub fn cycle_rows_per_page(&mut self) {
        self.state.cycle_rows_per_page();
    }

    /// Moves to `page`, clamped into `[1, total_pages]`.
    pub fn set_current_page(&mut self, page: usize) {
        self.state.set_current_page(page);
        self.clamp_page();
    }

    pub fn previous_page(&mut self) {
        self.state.previous_page();
    }

    pub fn next_page(&mut self) {
        let total_pages = self.total_pages();
        self.state.next_page(total_pages);
    }

    /// Ids outside the current record set are ignored.
    pub fn toggle_selection(&mut self, id: RecordId) {
        if self.records.iter().any(|r| r.id == id) {
            self.state.toggle_selection(id);
        } else {
            debug!("Ignoring selection of unknown id {}", id);
        }
    }

    pub fn toggle_all_visible(&mut self) {
        let page_ids = self.page_ids();
        self.state.toggle_all_visible(&page_ids);
    }

    pub fn is_all_visible_selected(&self) -> bool {
        self.state.selection().is_all_visible_selected(&self.page_ids())
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.state.selection().is_selected(id)
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    fn clamp_page(&mut self) {
        let total_pages = self.total_pages();
        let before = self.state.current_page();
        self.state.clamp_page(total_pages);
        if before != self.state.current_page() {
            debug!("Clamped page {} to {}/{}", before, self.state.current_page(), total_pages);
        }
    }
}
