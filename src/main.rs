use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use subtrack::controller::Controller;
use subtrack::domain::{SubTrackConfig, SubTrackError};
use subtrack::loader::load_records;
use subtrack::logging;
use subtrack::model::{Model, Status as ModelStatus};
use subtrack::record::{Category, ColumnId, Record, Status, sample_subscriptions};
use subtrack::table::SubscriptionTable;
use subtrack::ui::{TableUI, render_text};
use subtrack::view_state::{SortDirection, ViewState};

/// Browse, filter and select subscriptions in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// csv, parquet or arrow file with subscriptions. Uses built-in samples when omitted.
    file: Option<String>,

    /// Case-insensitive search in name and category
    #[arg(short, long, default_value = "")]
    query: String,

    /// Only show subscriptions with this status (repeatable)
    #[arg(long = "status", value_parser = parse_value::<Status>)]
    statuses: Vec<Status>,

    /// Only show subscriptions in this category (repeatable)
    #[arg(long = "category", value_parser = parse_value::<Category>)]
    categories: Vec<Category>,

    /// Column to sort by
    #[arg(long, value_parser = ColumnId::parse_lenient, default_value = "startDate")]
    sort: ColumnId,

    /// Sort ascending
    #[arg(long, conflicts_with = "desc")]
    asc: bool,

    /// Sort descending (default)
    #[arg(long)]
    desc: bool,

    #[arg(short, long, default_value_t = 5)]
    rows_per_page: usize,

    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Hide a column (repeatable)
    #[arg(long = "hide", value_parser = ColumnId::parse_lenient)]
    hidden: Vec<ColumnId>,

    /// Print the page and exit instead of starting the tui
    #[arg(long)]
    print: bool,

    #[arg(long, default_value = "subtrack.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Event poll interval of the tui in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn parse_value<T: std::str::FromStr>(s: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = SubTrackConfig::default()
        .with_event_poll_time(args.poll_ms)
        .with_rows_per_page(args.rows_per_page)
        .with_log_file(args.log_file.clone())
        .with_log_level(args.log_level.clone());

    if let Err(e) = logging::init(&config, args.print) {
        eprintln!("Could not set up logging: {e}");
    }

    match run(&args, &config) {
        Err(e) => {
            error!("{e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: &Args, config: &SubTrackConfig) -> Result<(), SubTrackError> {
    let (name, records) = load(args.file.as_deref())?;
    let state = view_state(args, config)?;

    let mut table = SubscriptionTable::with_state(records, state);
    table.set_current_page(args.page);

    if args.print {
        println!("{}", render_text(&table.view(), config.max_column_width));
        return Ok(());
    }

    info!("Starting subtrack with {}", name);
    let mut terminal = ratatui::init();
    let mut model = Model::init(config, name, table);
    let mut ui = TableUI::new(config);
    let controller = Controller::new(config);

    let result = event_loop(&mut terminal, &mut model, &mut ui, &controller);

    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    model: &mut Model,
    ui: &mut TableUI,
    controller: &Controller,
) -> Result<(), SubTrackError> {
    while model.status != ModelStatus::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(model)?;
        model.update(message)?;
    }
    Ok(())
}

fn load(file: Option<&str>) -> Result<(String, Vec<Record>), SubTrackError> {
    match file {
        Some(raw) => {
            let expanded = shellexpand::full(raw)
                .map_err(|e| SubTrackError::LoadingFailed(e.to_string()))?;
            let path = PathBuf::from(expanded.as_ref());
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("???")
                .to_string();
            Ok((name, load_records(path)?))
        }
        None => Ok(("samples".to_string(), sample_subscriptions())),
    }
}

fn view_state(args: &Args, config: &SubTrackConfig) -> Result<ViewState, SubTrackError> {
    let mut state = ViewState::with_rows_per_page(config.rows_per_page)?;
    state.set_query(args.query.clone());
    for &status in &args.statuses {
        if !state.status_facets().contains(&status) {
            state.toggle_status_facet(status);
        }
    }
    for &category in &args.categories {
        if !state.category_facets().contains(&category) {
            state.toggle_category_facet(category);
        }
    }
    let direction = if args.asc && !args.desc {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    state.set_sort(args.sort, direction);
    for &column in &args.hidden {
        if state.is_column_visible(column) {
            state.toggle_column_visible(column);
        }
    }
    Ok(state)
}
