use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::domain::SubTrackConfig;
use crate::model::{MenuView, Model, UIData};
use crate::record::ColumnId;
use crate::table::TableView;

pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const CHECKBOX_WIDTH: usize = 3;
pub const NO_ROWS_TEXT: &str = "No subscriptions found";

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
}

impl TableUI {
    pub fn new(config: &SubTrackConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [top, body, footer, statusline] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_filters(uidata, frame, top);
        self.draw_table(uidata, frame, body);
        self.draw_footer(uidata, frame, footer);
        self.draw_statusline(uidata, frame, statusline);

        if let Some(menu) = &uidata.menu {
            self.draw_menu(menu, frame, body);
        }
        if uidata.show_popup {
            self.draw_popup(&uidata.popup_message, frame, body);
        }
    }

    fn draw_filters(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let filters = if uidata.filters.is_empty() {
            "no filters".dim()
        } else {
            uidata.filters.clone().yellow()
        };
        let line = Line::from(vec![" Filters: ".bold(), filters]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let view = &uidata.table;
        let title = Line::from(format!(" {} ", uidata.name).bold());
        let block = Block::bordered()
            .title(title.centered())
            .border_set(border::THICK);

        if view.rows.is_empty() {
            let paragraph = Paragraph::new(NO_ROWS_TEXT.italic()).centered().block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let widths = column_widths(view, self.max_column_width);
        let mut constraints = vec![Constraint::Length(CHECKBOX_WIDTH as u16)];
        constraints.extend(widths.iter().map(|&w| Constraint::Length(w as u16)));

        let mut header_cells = vec![Cell::from(checkbox(view.all_visible_selected))];
        header_cells.extend(
            view.columns
                .iter()
                .zip(widths.iter())
                .map(|(&c, &w)| Cell::from(visible_name(header_label(view, c), w))),
        );
        let header = Row::new(header_cells).style(Style::new().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));

        let rows = view.rows.iter().map(|row| {
            let mut cells = vec![Cell::from(checkbox(row.selected))];
            cells.extend(
                row.cells
                    .iter()
                    .zip(widths.iter())
                    .map(|(value, &w)| Cell::from(visible_name(value.clone(), w))),
            );
            let row_widget = Row::new(cells);
            if row.selected {
                row_widget.style(Style::new().fg(Color::Cyan))
            } else {
                row_widget
            }
        });

        let table = Table::new(rows, constraints)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default().with_selected(Some(uidata.cursor_row));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let view = &uidata.table;
        let mut spans = vec![
            Span::from(format!(
                " {} of {} selected",
                view.selected_count, view.filtered_count
            )),
            " | ".dim(),
            Span::from(format!("Rows per page: {}", view.rows_per_page)),
            " | ".dim(),
            Span::from(format!("Page {} of {} ", view.current_page, view.total_pages)),
        ];
        spans.push(if view.current_page > 1 { "‹ ".into() } else { "‹ ".dim() });
        for link in &uidata.page_links {
            spans.push(match link {
                Some(p) if *p == view.current_page => format!("{p} ").reversed(),
                Some(p) => format!("{p} ").into(),
                None => "... ".dim(),
            });
        }
        spans.push(if view.current_page < view.total_pages {
            "›".into()
        } else {
            "›".dim()
        });
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = " Search: ";
            let line = Line::from(vec![prompt.bold(), uidata.cmdinput.input.clone().into()]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + (prompt.chars().count() + uidata.cmdinput.cursor_pos) as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
        } else {
            let line = Line::from(vec![
                format!(" {}", uidata.status_message).into(),
                "  (? for help)".dim(),
            ]);
            frame.render_widget(Paragraph::new(line), area);
        }
    }

    fn draw_menu(&self, menu: &MenuView, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = menu
            .items
            .iter()
            .enumerate()
            .map(|(idx, (label, checked))| {
                Line::from(format!(" {} {} {}", idx + 1, checkbox(*checked), label))
            })
            .collect();
        let width = lines.iter().map(|l| l.width()).max().unwrap_or(0) + 4;
        let popup = popup_area(area, width as u16, lines.len() as u16 + 2);
        let block = Block::bordered()
            .title(Line::from(format!(" {} ", menu.title).bold()).centered())
            .title_bottom(Line::from(" Esc ".blue().bold()).centered());
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), popup);
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame, area: Rect) {
        let height = message.lines().count() as u16 + 2;
        let width = message.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
        let popup = popup_area(area, width, height);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(message.to_string()).wrap(Wrap { trim: false }).block(block),
            popup,
        );
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

/// Column header with the sort indicator on the active column.
pub fn header_label(view: &TableView, column: ColumnId) -> String {
    if column == view.sort_column {
        format!("{} {}", column.header(), view.sort_direction.indicator())
    } else {
        column.header().to_string()
    }
}

/// Width of each visible column: widest header or cell plus margin, capped.
pub fn column_widths(view: &TableView, max_column_width: usize) -> Vec<usize> {
    view.columns
        .iter()
        .enumerate()
        .map(|(idx, &column)| {
            let content = view
                .rows
                .iter()
                .filter_map(|r| r.cells.get(idx))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0);
            let header = header_label(view, column).chars().count();
            let width = std::cmp::max(header, content) + COLUMN_WIDTH_MARGIN;
            std::cmp::min(width, max_column_width)
        })
        .collect()
}

/// Cuts `name` to `width` chars, marking the cut with "...".
pub fn visible_name(name: String, width: usize) -> String {
    if width < 3 {
        return "".to_string();
    }
    if name.chars().count() > width {
        let mut reduced: String = name.chars().take(width - 3).collect();
        reduced.push_str("...");
        return reduced;
    }
    name
}

/// Plain text rendering of a view, used when printing instead of running the tui.
pub fn render_text(view: &TableView, max_column_width: usize) -> String {
    let widths = column_widths(view, max_column_width);
    let pad = |s: String, w: usize| format!("{:<w$}", visible_name(s, w), w = w);

    let mut header = vec![checkbox(view.all_visible_selected).to_string()];
    header.extend(
        view.columns
            .iter()
            .zip(widths.iter())
            .map(|(&c, &w)| pad(header_label(view, c), w)),
    );

    let mut lines = vec![header.join(" ").trim_end().to_string()];
    let total_width = CHECKBOX_WIDTH + widths.iter().map(|w| w + 1).sum::<usize>();
    lines.push("-".repeat(total_width));

    if view.rows.is_empty() {
        lines.push(NO_ROWS_TEXT.to_string());
    }
    for row in &view.rows {
        let mut cells = vec![checkbox(row.selected).to_string()];
        cells.extend(
            row.cells
                .iter()
                .zip(widths.iter())
                .map(|(value, &w)| pad(value.clone(), w)),
        );
        lines.push(cells.join(" ").trim_end().to_string());
    }

    lines.push(format!(
        "{} of {} selected | Rows per page: {} | Page {} of {}",
        view.selected_count, view.filtered_count, view.rows_per_page, view.current_page, view.total_pages
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordId, sample_subscriptions};
    use crate::table::SubscriptionTable;

    #[test]
    fn visible_name_truncates() {
        assert_eq!(visible_name("Netflix Standard".into(), 10), "Netflix...");
        assert_eq!(visible_name("WSJ".into(), 10), "WSJ");
        assert_eq!(visible_name("WSJ".into(), 2), "");
    }

    #[test]
    fn sort_indicator_on_active_column() {
        let table = SubscriptionTable::new(sample_subscriptions());
        let view = table.view();
        assert_eq!(header_label(&view, ColumnId::StartDate), "START DATE ▼");
        assert_eq!(header_label(&view, ColumnId::Name), "NAME");
    }

    #[test]
    fn text_rendering_lists_the_page() {
        let mut table = SubscriptionTable::new(sample_subscriptions());
        table.toggle_selection(RecordId(3));
        let text = render_text(&table.view(), 24);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("[ ] NAME"));
        assert!(lines[2].starts_with("[x] WSJ Digital"));
        assert_eq!(lines.len(), 2 + 5 + 1);
        assert_eq!(
            lines.last().copied(),
            Some("1 of 6 selected | Rows per page: 5 | Page 1 of 2")
        );
    }

    #[test]
    fn text_rendering_of_an_empty_page() {
        let mut table = SubscriptionTable::new(sample_subscriptions());
        table.set_query("nothing matches this");
        let text = render_text(&table.view(), 24);
        assert!(text.contains(NO_ROWS_TEXT));
        assert!(text.ends_with("Page 1 of 1"));
    }
}
