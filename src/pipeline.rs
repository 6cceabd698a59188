//! Filter -> sort -> paginate over an in-memory record set.
//!
//! Every stage is a pure function of its inputs and never touches the
//! records themselves, it only rearranges references to them.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::time::Instant;

use tracing::trace;

use crate::record::{Category, ColumnId, Record, RecordId, Status};
use crate::view_state::{SortDirection, ViewState};

type Comparator = fn(&Record, &Record) -> Ordering;

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput<'a> {
    /// Rows of the current page, in display order.
    pub page: Vec<&'a Record>,
    /// Number of rows that passed the filter stage.
    pub filtered_count: usize,
    /// Page count for display, never below 1.
    pub total_pages: usize,
    pub current_page: usize,
}

impl PipelineOutput<'_> {
    pub fn page_ids(&self) -> Vec<RecordId> {
        self.page.iter().map(|r| r.id).collect()
    }
}

// -------------------- Filter ---------------------- //

pub fn matches_query(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    record.name.to_lowercase().contains(&needle) || record.category.uid().contains(&needle)
}

pub fn filter_records<'a>(
    records: &'a [Record],
    query: &str,
    status_facets: &BTreeSet<Status>,
    category_facets: &BTreeSet<Category>,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| matches_query(r, query))
        .filter(|r| status_facets.is_empty() || status_facets.contains(&r.status))
        .filter(|r| category_facets.is_empty() || category_facets.contains(&r.category))
        .collect()
}

// -------------------- Sort ---------------------- //

/// Case-insensitive ordering first; among equal folds the lowercase
/// spelling comes first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn by_name(a: &Record, b: &Record) -> Ordering {
    locale_cmp(&a.name, &b.name)
}

fn by_price(a: &Record, b: &Record) -> Ordering {
    a.price.total_cmp(&b.price)
}

fn by_category(a: &Record, b: &Record) -> Ordering {
    locale_cmp(a.category.uid(), b.category.uid())
}

fn by_frequency(a: &Record, b: &Record) -> Ordering {
    locale_cmp(a.frequency.uid(), b.frequency.uid())
}

fn by_start_date(a: &Record, b: &Record) -> Ordering {
    a.start_date.cmp(&b.start_date)
}

fn by_status(a: &Record, b: &Record) -> Ordering {
    locale_cmp(a.status.uid(), b.status.uid())
}

/// Ascending comparator of a column, `None` for columns without an ordering.
pub fn comparator(column: ColumnId) -> Option<Comparator> {
    match column {
        ColumnId::Name => Some(by_name),
        ColumnId::Price => Some(by_price),
        ColumnId::Category => Some(by_category),
        ColumnId::Frequency => Some(by_frequency),
        ColumnId::StartDate => Some(by_start_date),
        ColumnId::Status => Some(by_status),
        ColumnId::Actions => None,
    }
}

/// Orders by `column`, ties broken by ascending id. `Desc` reverses the
/// whole ordering including the tie break, so it is the exact mirror of `Asc`.
/// Unsortable columns leave the input order untouched.
pub fn sort_records(mut rows: Vec<&Record>, column: ColumnId, direction: SortDirection) -> Vec<&Record> {
    let Some(cmp) = comparator(column) else {
        trace!("Column {column} is not sortable, keeping order");
        return rows;
    };
    rows.sort_by(|a, b| {
        let ordering = cmp(a, b).then_with(|| a.id.cmp(&b.id));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    rows
}

// -------------------- Paginate ---------------------- //

/// `ceil(n / rows_per_page)`, 0 for an empty set.
pub fn page_count(n: usize, rows_per_page: usize) -> usize {
    if rows_per_page == 0 {
        return 0;
    }
    n.div_ceil(rows_per_page)
}

/// Page count as shown to the user: an empty set still has page 1.
pub fn total_pages(n: usize, rows_per_page: usize) -> usize {
    page_count(n, rows_per_page).max(1)
}

/// The 1-based `current_page` window of `rows`, clipped to its bounds.
/// Pages past the end yield an empty slice.
pub fn paginate<'r, 'a>(rows: &'r [&'a Record], rows_per_page: usize, current_page: usize) -> &'r [&'a Record] {
    let start = current_page
        .saturating_sub(1)
        .saturating_mul(rows_per_page)
        .min(rows.len());
    let end = start.saturating_add(rows_per_page).min(rows.len());
    &rows[start..end]
}

/// Runs all stages for `view` over `records`.
pub fn recompute<'a>(records: &'a [Record], view: &ViewState) -> PipelineOutput<'a> {
    let start_time = Instant::now();

    let filtered = filter_records(
        records,
        view.query(),
        view.status_facets(),
        view.category_facets(),
    );
    let filtered_count = filtered.len();
    let sorted = sort_records(filtered, view.sort_column(), view.sort_direction());
    let page = paginate(&sorted, view.rows_per_page(), view.current_page()).to_vec();

    let output = PipelineOutput {
        page,
        filtered_count,
        total_pages: total_pages(filtered_count, view.rows_per_page()),
        current_page: view.current_page(),
    };
    trace!(
        "Pipeline: {} records, {} filtered, page {}/{} with {} rows in {}us",
        records.len(),
        output.filtered_count,
        output.current_page,
        output.total_pages,
        output.page.len(),
        start_time.elapsed().as_micros()
    );
    output
}

/// Page numbers for the pagination bar: the first five pages, then the last
/// page behind an ellipsis (`None`) when there are more.
pub fn page_links(total_pages: usize) -> Vec<Option<usize>> {
    let mut links: Vec<Option<usize>> = (1..=total_pages.min(5)).map(Some).collect();
    if total_pages > 5 {
        links.push(None);
        links.push(Some(total_pages));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_subscriptions;
    use rstest::rstest;

    fn ids(rows: &[&Record]) -> Vec<i64> {
        rows.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn empty_query_and_facets_pass_everything() {
        let records = sample_subscriptions();
        let rows = filter_records(&records, "", &BTreeSet::new(), &BTreeSet::new());
        assert_eq!(ids(&rows), vec![1, 2, 3, 4, 5, 6]);
    }

    #[rstest]
    #[case("news", vec![3, 5])]
    #[case("NEWS", vec![3, 5])]
    #[case("premium", vec![1, 4, 6])]
    #[case("prof", vec![6])]
    #[case("zzz", vec![])]
    fn query_matches_name_or_category(#[case] query: &str, #[case] expected: Vec<i64>) {
        let records = sample_subscriptions();
        let rows = filter_records(&records, query, &BTreeSet::new(), &BTreeSet::new());
        assert_eq!(ids(&rows), expected);
    }

    #[test]
    fn facets_or_within_and_across() {
        let records = sample_subscriptions();
        let statuses = BTreeSet::from([Status::Active, Status::Expired]);
        let categories = BTreeSet::from([Category::News]);
        let rows = filter_records(&records, "", &statuses, &categories);
        assert_eq!(ids(&rows), vec![3, 5]);

        let rows = filter_records(&records, "apple", &statuses, &categories);
        assert_eq!(ids(&rows), vec![5]);
    }

    #[rstest]
    #[case(ColumnId::StartDate, vec![4, 2, 6, 5, 1, 3])]
    #[case(ColumnId::Price, vec![4, 5, 2, 1, 6, 3])]
    #[case(ColumnId::Name, vec![1, 5, 6, 2, 4, 3])]
    #[case(ColumnId::Status, vec![1, 2, 3, 4, 6, 5])]
    #[case(ColumnId::Frequency, vec![1, 2, 4, 5, 6, 3])]
    fn ascending_sort_with_id_tie_break(#[case] column: ColumnId, #[case] expected: Vec<i64>) {
        let records = sample_subscriptions();
        let rows = sort_records(records.iter().collect(), column, SortDirection::Asc);
        assert_eq!(ids(&rows), expected);
    }

    #[rstest]
    #[case(ColumnId::Name)]
    #[case(ColumnId::Price)]
    #[case(ColumnId::Category)]
    #[case(ColumnId::Frequency)]
    #[case(ColumnId::StartDate)]
    #[case(ColumnId::Status)]
    fn descending_is_exact_reverse(#[case] column: ColumnId) {
        let records = sample_subscriptions();
        let mut asc = ids(&sort_records(records.iter().collect(), column, SortDirection::Asc));
        let desc = ids(&sort_records(records.iter().collect(), column, SortDirection::Desc));
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn unsortable_column_keeps_order() {
        let records = sample_subscriptions();
        let input: Vec<&Record> = records.iter().rev().collect();
        let rows = sort_records(input, ColumnId::Actions, SortDirection::Desc);
        assert_eq!(ids(&rows), vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn locale_cmp_ignores_case_first() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[rstest]
    #[case(0, 5, 0, 1)]
    #[case(4, 5, 1, 1)]
    #[case(5, 5, 1, 1)]
    #[case(6, 5, 2, 2)]
    #[case(31, 15, 3, 3)]
    fn page_counts(#[case] n: usize, #[case] rows_per_page: usize, #[case] raw: usize, #[case] shown: usize) {
        assert_eq!(page_count(n, rows_per_page), raw);
        assert_eq!(total_pages(n, rows_per_page), shown);
    }

    #[test]
    fn paginate_clips_and_tolerates_out_of_range() {
        let records = sample_subscriptions();
        let rows: Vec<&Record> = records.iter().collect();
        assert_eq!(ids(paginate(&rows, 5, 1)), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(paginate(&rows, 5, 2)), vec![6]);
        assert!(paginate(&rows, 5, 99).is_empty());
        assert!(paginate(&rows, 0, 1).is_empty());
        assert!(paginate(&[], 5, 1).is_empty());
    }

    #[test]
    fn pages_cover_the_sorted_set_exactly() {
        let records = sample_subscriptions();
        let sorted = sort_records(records.iter().collect(), ColumnId::Price, SortDirection::Desc);
        for rows_per_page in 1..=7 {
            let pages = page_count(sorted.len(), rows_per_page);
            let joined: Vec<&Record> = (1..=pages)
                .flat_map(|p| paginate(&sorted, rows_per_page, p).iter().copied())
                .collect();
            assert_eq!(ids(&joined), ids(&sorted), "rows per page {rows_per_page}");
        }
    }

    #[test]
    fn recompute_default_view() {
        let records = sample_subscriptions();
        let output = recompute(&records, &ViewState::new());
        assert_eq!(output.filtered_count, 6);
        assert_eq!(output.total_pages, 2);
        assert_eq!(output.page_ids(), vec![RecordId(3), RecordId(1), RecordId(5), RecordId(6), RecordId(2)]);
    }

    #[test]
    fn recompute_on_empty_records() {
        let output = recompute(&[], &ViewState::new());
        assert!(output.page.is_empty());
        assert_eq!(output.filtered_count, 0);
        assert_eq!(output.total_pages, 1);
    }

    #[test]
    fn page_links_collapse_long_ranges() {
        assert_eq!(page_links(1), vec![Some(1)]);
        assert_eq!(page_links(5), (1..=5).map(Some).collect::<Vec<_>>());
        assert_eq!(
            page_links(9),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(9)]
        );
    }
}
