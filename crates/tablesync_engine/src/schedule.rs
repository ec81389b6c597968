//! Page scheduler for paginated table fetches.
//!
//! Given the tables to paginate, the subset the server can page in
//! parallel, and each table's total page count, the scheduler produces a
//! single linear fetch order. The order never requests page *k+1* of a
//! table before page *k*, drains non-parallel tables contiguously, and
//! batches parallel-capable tables' pages beyond page 1 so they can be
//! dispatched concurrently once the last parallel table's page count is
//! known.

use std::collections::HashMap;
use tablesync_core::TableId;

/// Produces the fetch order as one table id per page request.
///
/// Non-parallel tables emit all of their pages immediately and
/// contiguously. Parallel-capable tables emit page 1 in place; their
/// remaining pages are held back and interleaved round-by-round after
/// the last parallel-capable table's page 1, in `table_ids` order.
/// A table absent from `pages` is treated as a single page.
pub fn sort_table_ids(
    table_ids: &[TableId],
    parallel_table_ids: &[TableId],
    pages: &HashMap<TableId, u32>,
) -> Vec<TableId> {
    let last_parallel = table_ids
        .iter()
        .filter(|t| parallel_table_ids.contains(t))
        .last()
        .copied();

    let mut output = Vec::new();
    // Parallel tables with pages beyond the first, in discovery order.
    let mut pending: Vec<(TableId, u32)> = Vec::new();

    for &table_id in table_ids {
        let page_count = pages.get(&table_id).copied().unwrap_or(1).max(1);

        if !parallel_table_ids.contains(&table_id) {
            for _ in 0..page_count {
                output.push(table_id);
            }
            continue;
        }

        output.push(table_id);
        if page_count > 1 {
            pending.push((table_id, page_count));
        }

        if Some(table_id) == last_parallel {
            // Interleave the held-back pages round-by-round: round r
            // emits page r of every pending table that still has one.
            let mut round = 2;
            loop {
                let mut emitted = false;
                for &(pending_id, pending_pages) in &pending {
                    if pending_pages >= round {
                        output.push(pending_id);
                        emitted = true;
                    }
                }
                if !emitted {
                    break;
                }
                round += 1;
            }
            pending.clear();
        }
    }

    output
}

/// Expands [`sort_table_ids`] into explicit `(table, page)` requests.
///
/// The n-th occurrence of a table in the sorted order is its n-th page,
/// so per-table page ordering is preserved by construction.
pub fn page_plan(
    table_ids: &[TableId],
    parallel_table_ids: &[TableId],
    pages: &HashMap<TableId, u32>,
) -> Vec<(TableId, u32)> {
    let sorted = sort_table_ids(table_ids, parallel_table_ids, pages);
    let mut next_page: HashMap<TableId, u32> = HashMap::new();
    sorted
        .into_iter()
        .map(|table_id| {
            let page = next_page.entry(table_id).or_insert(0);
            *page += 1;
            (table_id, *page)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pages(entries: &[(TableId, u32)]) -> HashMap<TableId, u32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn no_parallel_tables_drain_sequentially() {
        let sorted = sort_table_ids(
            &[1, 2, 3, 4],
            &[],
            &pages(&[(1, 2), (2, 2), (3, 2), (4, 2)]),
        );
        assert_eq!(sorted, vec![1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn single_parallel_table_matches_sequential_order() {
        let sorted = sort_table_ids(
            &[1, 2, 3, 4],
            &[2],
            &pages(&[(1, 2), (2, 2), (3, 2), (4, 2)]),
        );
        assert_eq!(sorted, vec![1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn adjacent_parallel_tables_interleave() {
        let sorted = sort_table_ids(
            &[1, 2, 3, 4],
            &[2, 3],
            &pages(&[(1, 2), (2, 2), (3, 2), (4, 2)]),
        );
        assert_eq!(sorted, vec![1, 1, 2, 3, 2, 3, 4, 4]);
    }

    #[test]
    fn scattered_parallel_tables_defer_to_last_first_page() {
        let sorted = sort_table_ids(
            &[1, 2, 3, 4],
            &[1, 4],
            &pages(&[(1, 2), (2, 2), (3, 2), (4, 2)]),
        );
        assert_eq!(sorted, vec![1, 2, 2, 3, 3, 4, 1, 4]);
    }

    #[test]
    fn scattered_parallel_tables_with_uneven_pages() {
        let sorted = sort_table_ids(
            &[1, 2, 3, 4],
            &[1, 4],
            &pages(&[(1, 3), (2, 1), (3, 2), (4, 4)]),
        );
        assert_eq!(sorted, vec![1, 2, 3, 3, 4, 1, 4, 1, 4, 4]);
    }

    #[test]
    fn adjacent_parallel_tables_with_uneven_pages() {
        let sorted = sort_table_ids(
            &[1, 2, 3, 4],
            &[1, 2],
            &pages(&[(1, 2), (2, 4), (3, 3), (4, 2)]),
        );
        assert_eq!(sorted, vec![1, 2, 1, 2, 2, 2, 3, 3, 3, 4, 4]);
    }

    #[test]
    fn missing_page_counts_default_to_one() {
        let sorted = sort_table_ids(&[1, 2], &[], &HashMap::new());
        assert_eq!(sorted, vec![1, 2]);
    }

    #[test]
    fn page_plan_numbers_occurrences() {
        let plan = page_plan(
            &[1, 2, 3, 4],
            &[1, 4],
            &pages(&[(1, 2), (2, 2), (3, 2), (4, 2)]),
        );
        assert_eq!(
            plan,
            vec![
                (1, 1),
                (2, 1),
                (2, 2),
                (3, 1),
                (3, 2),
                (4, 1),
                (1, 2),
                (4, 2),
            ]
        );
    }

    proptest! {
        #[test]
        fn every_page_is_scheduled_exactly_once(
            page_counts in proptest::collection::vec(1u32..6, 1..8),
            parallel_mask in proptest::collection::vec(any::<bool>(), 8),
        ) {
            let table_ids: Vec<TableId> = (1..=page_counts.len() as TableId).collect();
            let parallel: Vec<TableId> = table_ids
                .iter()
                .zip(&parallel_mask)
                .filter(|(_, &p)| p)
                .map(|(&t, _)| t)
                .collect();
            let pages: HashMap<TableId, u32> =
                table_ids.iter().copied().zip(page_counts.iter().copied()).collect();

            let sorted = sort_table_ids(&table_ids, &parallel, &pages);

            for &t in &table_ids {
                let occurrences = sorted.iter().filter(|&&s| s == t).count();
                prop_assert_eq!(occurrences as u32, pages[&t]);
            }
        }

        #[test]
        fn plan_never_requests_a_page_out_of_order(
            page_counts in proptest::collection::vec(1u32..6, 1..8),
            parallel_mask in proptest::collection::vec(any::<bool>(), 8),
        ) {
            let table_ids: Vec<TableId> = (1..=page_counts.len() as TableId).collect();
            let parallel: Vec<TableId> = table_ids
                .iter()
                .zip(&parallel_mask)
                .filter(|(_, &p)| p)
                .map(|(&t, _)| t)
                .collect();
            let pages: HashMap<TableId, u32> =
                table_ids.iter().copied().zip(page_counts.iter().copied()).collect();

            let plan = page_plan(&table_ids, &parallel, &pages);

            let mut highest: HashMap<TableId, u32> = HashMap::new();
            for (table_id, page) in plan {
                let prev = highest.insert(table_id, page).unwrap_or(0);
                prop_assert_eq!(page, prev + 1);
            }
        }

        #[test]
        fn non_parallel_tables_are_contiguous(
            page_counts in proptest::collection::vec(1u32..6, 1..8),
            parallel_mask in proptest::collection::vec(any::<bool>(), 8),
        ) {
            let table_ids: Vec<TableId> = (1..=page_counts.len() as TableId).collect();
            let parallel: Vec<TableId> = table_ids
                .iter()
                .zip(&parallel_mask)
                .filter(|(_, &p)| p)
                .map(|(&t, _)| t)
                .collect();
            let pages: HashMap<TableId, u32> =
                table_ids.iter().copied().zip(page_counts.iter().copied()).collect();

            let sorted = sort_table_ids(&table_ids, &parallel, &pages);

            for &t in table_ids.iter().filter(|t| !parallel.contains(t)) {
                let first = sorted.iter().position(|&s| s == t).unwrap();
                let last = sorted.iter().rposition(|&s| s == t).unwrap();
                prop_assert_eq!((last - first + 1) as u32, pages[&t]);
            }
        }
    }
}
