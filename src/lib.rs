//! Subscription table engine: a filter -> sort -> paginate -> select
//! pipeline over an in-memory record set, plus the pieces of the terminal
//! host that drives it.

pub mod controller;
pub mod domain;
pub mod inputter;
pub mod loader;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod record;
pub mod selection;
pub mod table;
pub mod ui;
pub mod view_state;

pub use domain::{SubTrackConfig, SubTrackError};
pub use pipeline::{PipelineOutput, recompute};
pub use record::{Category, ColumnId, Currency, Frequency, Record, RecordId, Status};
pub use selection::Selection;
pub use table::{RowView, SubscriptionTable, TableView};
pub use view_state::{ROWS_PER_PAGE_OPTIONS, SortDirection, ViewState};
