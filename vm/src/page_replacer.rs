use crate::page_table::PageTable;

pub trait PageReplacer {
    /// Picks the resident page of `table` to evict. Pages below
    /// `first_candidate` are pinned and must never be returned.
    fn pick_replacement_page(&mut self, table: &PageTable, first_candidate: usize) -> Option<usize>;
}

/// Approximate LRU over the aging registers: the page with the smallest
/// history loses, the lowest page number breaks ties.
///
/// Any resident unpinned page is a candidate, including one still at
/// `0xFFFF`. A scan seeded with `0xFFFF` under a strict comparison would
/// skip such pages and report no victim when every candidate is that fresh.
#[derive(Default)]
pub struct AgingPageReplacer;

impl AgingPageReplacer {
    pub fn new() -> Self {
        AgingPageReplacer
    }
}

impl PageReplacer for AgingPageReplacer {
    fn pick_replacement_page(&mut self, table: &PageTable, first_candidate: usize) -> Option<usize> {
        let mut victim = None;
        let mut min_history = None;

        for page in first_candidate..table.len() {
            if !table.get(page).is_valid() {
                continue;
            }

            let history = table.history(page);
            if min_history.map_or(true, |min| history < min) {
                min_history = Some(history);
                victim = Some(page);
            }
        }

        victim
    }
}
