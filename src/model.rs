use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace, warn};

use crate::domain::{HELP_TEXT, MenuKind, Message, SubTrackConfig, SubTrackError};
use crate::inputter::{InputResult, Inputter};
use crate::pipeline::page_links;
use crate::record::{Category, ColumnId, Record, Status as SubscriptionStatus};
use crate::table::{SubscriptionTable, TableView};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    MENU(MenuKind),
    POPUP,
    CMDINPUT,
}

/// A checkbox menu as shown by the ui.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub title: String,
    pub items: Vec<(String, bool)>,
}

/// Snapshot of everything the ui draws.
#[derive(Debug, Clone)]
pub struct UIData {
    pub name: String,
    pub table: TableView,
    pub cursor_row: usize,
    pub filters: String,
    pub page_links: Vec<Option<usize>>,
    pub show_popup: bool,
    pub popup_message: String,
    pub menu: Option<MenuView>,
    pub cmdinput: InputResult,
    pub active_cmdinput: bool,
    pub status_message: String,
}

pub struct Model {
    config: SubTrackConfig,
    pub status: Status,
    modus: Modus,
    name: String,
    table: SubscriptionTable,
    cursor_row: usize,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    query_before_edit: String,
    status_message: String,
}

impl Model {
    pub fn init(
        config: &SubTrackConfig,
        name: impl Into<String>,
        table: SubscriptionTable,
    ) -> Self {
        let name = name.into();
        let view = table.view();
        let status_message = format!("Loaded {} subscriptions", table.records().len());
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            uidata: UIData {
                name: name.clone(),
                table: view,
                cursor_row: 0,
                filters: String::new(),
                page_links: Vec::new(),
                show_popup: false,
                popup_message: String::new(),
                menu: None,
                cmdinput: InputResult::default(),
                active_cmdinput: false,
                status_message: String::new(),
            },
            name,
            table,
            cursor_row: 0,
            clipboard: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            query_before_edit: String::new(),
            status_message,
        };
        model.update_uidata();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn table(&self) -> &SubscriptionTable {
        &self.table
    }

    pub fn config(&self) -> &SubTrackConfig {
        &self.config
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CMDINPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), SubTrackError> {
        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::Help => self.show_help(),
                    Message::MoveUp => self.cursor_row = self.cursor_row.saturating_sub(1),
                    Message::MoveDown => self.cursor_row += 1,
                    Message::PreviousPage => {
                        self.table.previous_page();
                        self.cursor_row = 0;
                    }
                    Message::NextPage => {
                        self.table.next_page();
                        self.cursor_row = 0;
                    }
                    Message::ToggleRow => self.toggle_cursor_row(),
                    Message::ToggleAllVisible => self.table.toggle_all_visible(),
                    Message::EditQuery => self.enter_cmd_mode(),
                    Message::OpenMenu(kind) => self.open_menu(kind),
                    Message::Digit(n) => self.sort_by_column(n),
                    Message::CycleRowsPerPage => {
                        self.table.cycle_rows_per_page();
                        self.set_status_message(format!(
                            "{} rows per page",
                            self.table.state().rows_per_page()
                        ));
                    }
                    Message::ResetFilters => {
                        self.table.reset_filters();
                        self.set_status_message("Filters reset");
                    }
                    Message::CopySelection => self.copy_selection(),
                    Message::ClearSelection => {
                        self.table.clear_selection();
                        self.set_status_message("Selection cleared");
                    }
                    _ => (),
                },
                Modus::MENU(kind) => match msg {
                    Message::Quit => self.quit(),
                    Message::Digit(n) => self.toggle_menu_item(kind, n),
                    Message::Exit | Message::Enter | Message::OpenMenu(_) => self.exit(),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Enter | Message::Help => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key)
                    }
                }
            }
        }

        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        trace!("Leaving {:?}", self.modus);
        self.modus = Modus::TABLE;
    }

    fn show_help(&mut self) {
        self.modus = Modus::POPUP;
    }

    fn open_menu(&mut self, kind: MenuKind) {
        self.modus = Modus::MENU(kind);
    }

    fn toggle_cursor_row(&mut self) {
        if let Some(&id) = self.table.page_ids().get(self.cursor_row) {
            self.table.toggle_selection(id);
        }
    }

    fn sort_by_column(&mut self, n: usize) {
        if let Some(&column) = n.checked_sub(1).and_then(|idx| ColumnId::ALL.get(idx)) {
            self.table.set_sort_column(column);
            let state = self.table.state();
            self.set_status_message(format!(
                "Sorted by {} {}",
                state.sort_column().header(),
                state.sort_direction()
            ));
        }
    }

    fn toggle_menu_item(&mut self, kind: MenuKind, n: usize) {
        let Some(idx) = n.checked_sub(1) else {
            return;
        };
        match kind {
            MenuKind::Status => {
                if let Some(&status) = SubscriptionStatus::ALL.get(idx) {
                    self.table.toggle_status_facet(status);
                }
            }
            MenuKind::Category => {
                if let Some(&category) = Category::ALL.get(idx) {
                    self.table.toggle_category_facet(category);
                }
            }
            MenuKind::Columns => {
                if let Some(&column) = ColumnId::ALL.get(idx) {
                    self.table.toggle_column_visible(column);
                }
            }
        }
    }

    fn enter_cmd_mode(&mut self) {
        trace!("Entering command mode ...");
        self.modus = Modus::CMDINPUT;
        self.query_before_edit = self.table.state().query().to_string();
        self.input.set(&self.query_before_edit);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.canceled {
            self.table.set_query(self.query_before_edit.clone());
        } else {
            // Filter while typing
            self.table.set_query(self.last_input.input.clone());
        }
        if self.last_input.finished {
            self.handle_cmd_input();
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {:?}", self.last_input);
        self.modus = Modus::TABLE;
        self.cursor_row = 0;

        let query = self.table.state().query().to_string();
        if query.is_empty() {
            self.set_status_message("Search cleared");
        } else {
            info!("Searching for \"{query}\"");
            let found = self.table.recompute().filtered_count;
            self.set_status_message(format!("Found {found} subscriptions for \"{query}\""));
        }
    }

    fn copy_selection(&mut self) {
        let records = self.table.selected_records();
        if records.is_empty() {
            self.set_status_message("Nothing selected");
            return;
        }
        let count = records.len();
        let content = selection_to_csv(&records);

        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => warn!("Clipboard unavailable: {:?}", e),
            }
        }
        let message = match self.clipboard.as_mut().map(|c| c.set_text(content)) {
            Some(Ok(_)) => format!("Copied {count} subscriptions"),
            Some(Err(e)) => {
                warn!("Error copying to clipboard: {:?}", e);
                "Copy failed".to_string()
            }
            None => "No clipboard available".to_string(),
        };
        self.set_status_message(message);
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        debug!("Status: {}", self.status_message);
    }

    fn menu_view(&self, kind: MenuKind) -> MenuView {
        let state = self.table.state();
        let (title, items): (&str, Vec<(String, bool)>) = match kind {
            MenuKind::Status => (
                "Status",
                SubscriptionStatus::ALL
                    .iter()
                    .map(|s| (s.label(), state.status_facets().contains(s)))
                    .collect(),
            ),
            MenuKind::Category => (
                "Category",
                Category::ALL
                    .iter()
                    .map(|c| (c.label(), state.category_facets().contains(c)))
                    .collect(),
            ),
            MenuKind::Columns => (
                "Columns",
                ColumnId::ALL
                    .iter()
                    .map(|c| (c.header().to_string(), state.is_column_visible(*c)))
                    .collect(),
            ),
        };
        MenuView {
            title: title.to_string(),
            items,
        }
    }

    fn filter_summary(&self) -> String {
        let state = self.table.state();
        let mut parts = Vec::new();
        if !state.query().is_empty() {
            parts.push(format!("search \"{}\"", state.query()));
        }
        if !state.status_facets().is_empty() {
            let labels: Vec<String> = state.status_facets().iter().map(|s| s.label()).collect();
            parts.push(format!("status {}", labels.join("|")));
        }
        if !state.category_facets().is_empty() {
            let labels: Vec<String> = state.category_facets().iter().map(|c| c.label()).collect();
            parts.push(format!("category {}", labels.join("|")));
        }
        parts.join(", ")
    }

    fn update_uidata(&mut self) {
        let view = self.table.view();
        self.cursor_row = self.cursor_row.min(view.rows.len().saturating_sub(1));

        self.uidata = UIData {
            name: self.name.clone(),
            cursor_row: self.cursor_row,
            filters: self.filter_summary(),
            page_links: page_links(view.total_pages),
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            menu: match self.modus {
                Modus::MENU(kind) => Some(self.menu_view(kind)),
                _ => None,
            },
            cmdinput: self.last_input.clone(),
            active_cmdinput: self.modus == Modus::CMDINPUT,
            status_message: self.status_message.clone(),
            table: view,
        };
    }
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',' || c == '"');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

/// Csv text of `records` with a header line, as put on the clipboard.
pub fn selection_to_csv(records: &[&Record]) -> String {
    let mut lines = vec![
        "id,name,price,currency,frequency,category,startDate,paymentMethod,status".to_string(),
    ];
    for r in records {
        let cells = [
            r.id.to_string(),
            r.name.clone(),
            r.price.to_string(),
            r.currency.to_string(),
            r.frequency.to_string(),
            r.category.to_string(),
            r.start_date.to_rfc3339(),
            r.payment_method.clone(),
            r.status.to_string(),
        ];
        let row: Vec<String> = cells.iter().map(|c| wrap_cell_content(c)).collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordId, sample_subscriptions};
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn model() -> Model {
        let table = SubscriptionTable::new(sample_subscriptions());
        Model::init(&SubTrackConfig::default(), "sample", table)
    }

    fn send(model: &mut Model, message: Message) {
        model.update(Some(message)).unwrap();
    }

    fn type_keys(model: &mut Model, keys: &str) {
        for c in keys.chars() {
            send(model, Message::RawKey(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
    }

    fn press(model: &mut Model, code: KeyCode) {
        send(model, Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn query_filters_while_typing() {
        let mut model = model();
        send(&mut model, Message::EditQuery);
        assert!(model.raw_keyevents());
        type_keys(&mut model, "news");
        assert_eq!(model.get_uidata().table.filtered_count, 2);
        press(&mut model, KeyCode::Enter);
        assert!(!model.raw_keyevents());
        assert_eq!(model.table().state().query(), "news");
        assert_eq!(model.get_uidata().filters, "search \"news\"");
    }

    #[test]
    fn escape_restores_previous_query() {
        let mut model = model();
        send(&mut model, Message::EditQuery);
        type_keys(&mut model, "spot");
        press(&mut model, KeyCode::Enter);

        send(&mut model, Message::EditQuery);
        type_keys(&mut model, "ify");
        press(&mut model, KeyCode::Esc);
        assert_eq!(model.table().state().query(), "spot");
    }

    #[test]
    fn menu_digits_toggle_facets_until_closed() {
        let mut model = model();
        send(&mut model, Message::OpenMenu(MenuKind::Status));
        send(&mut model, Message::Digit(1));
        let menu = model.get_uidata().menu.clone().unwrap();
        assert_eq!(menu.items[0], ("Active".to_string(), true));
        assert_eq!(model.get_uidata().table.filtered_count, 4);

        send(&mut model, Message::Exit);
        assert!(model.get_uidata().menu.is_none());
        // Digits sort again once the menu is closed
        send(&mut model, Message::Digit(2));
        assert_eq!(model.table().state().sort_column(), ColumnId::Price);
    }

    #[test]
    fn space_toggles_the_cursor_row() {
        let mut model = model();
        send(&mut model, Message::MoveDown);
        send(&mut model, Message::ToggleRow);
        assert!(model.table().is_selected(RecordId(1)));

        send(&mut model, Message::NextPage);
        assert_eq!(model.get_uidata().cursor_row, 0);
        assert!(model.table().is_selected(RecordId(1)));
    }

    #[test]
    fn clear_selection_key_empties_the_selection() {
        let mut model = model();
        send(&mut model, Message::ToggleAllVisible);
        assert_eq!(model.get_uidata().table.selected_count, 5);
        send(&mut model, Message::ClearSelection);
        assert_eq!(model.get_uidata().table.selected_count, 0);
        assert_eq!(model.get_uidata().status_message, "Selection cleared");
    }

    #[test]
    fn cursor_stays_on_the_page() {
        let mut model = model();
        for _ in 0..10 {
            send(&mut model, Message::MoveDown);
        }
        assert_eq!(model.get_uidata().cursor_row, 4);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = model();
        send(&mut model, Message::Help);
        assert!(model.get_uidata().show_popup);
        send(&mut model, Message::Exit);
        assert!(!model.get_uidata().show_popup);
        send(&mut model, Message::Quit);
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn csv_of_selection_quotes_where_needed() {
        let records = sample_subscriptions();
        let csv = selection_to_csv(&[&records[4]]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "5,\"Apple News+\",9.99,USD,monthly,news,2025-02-01T00:00:00+00:00,\"Apple Pay\",expired"
        );
        assert_eq!(wrap_cell_content("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
