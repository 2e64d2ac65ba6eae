//! Page arithmetic and the page-link list used by report tables.

use serde::Serialize;

/// Above this many pages the link list is truncated with ellipses.
pub const DEFAULT_DOT_THRESHOLD: u32 = 5;

/// Pages shown on each side of the current page in a truncated list.
const WINDOW_RADIUS: u32 = 1;

/// Number of pages needed for `total_items` at `per_page` items per page.
pub fn total_pages(total_items: i64, per_page: u32) -> u32 {
    if total_items <= 0 || per_page == 0 {
        return 0;
    }
    let per_page = i64::from(per_page);
    ((total_items + per_page - 1) / per_page) as u32
}

/// SQL `OFFSET` for a 1-based page number.
pub fn offset_for_page(page: u32, per_page: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(per_page)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLink {
    Page { number: u32, current: bool },
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub links: Vec<PageLink>,
}

impl Pagination {
    pub fn new(current: u32, total_pages: u32, dot_threshold: u32) -> Self {
        let current = current.clamp(1, total_pages.max(1));
        Self {
            current,
            total_pages,
            prev: (current > 1).then(|| current - 1),
            next: (current < total_pages).then(|| current + 1),
            links: page_links(current, total_pages, dot_threshold),
        }
    }
}

/// Build the page-number list.
///
/// When `total_pages <= threshold` every page is listed. Otherwise the list
/// holds the first page, the last page, and a window around `current`, with
/// an [`PageLink::Ellipsis`] standing in for each gap of two or more pages
/// (a gap of exactly one page shows that page instead).
pub fn page_links(current: u32, total_pages: u32, threshold: u32) -> Vec<PageLink> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let page = |number: u32| PageLink::Page {
        number,
        current: number == current,
    };

    if total_pages <= threshold {
        return (1..=total_pages).map(page).collect();
    }

    let mut shown: Vec<u32> = vec![1, total_pages];
    let low = current.saturating_sub(WINDOW_RADIUS).max(1);
    let high = (current + WINDOW_RADIUS).min(total_pages);
    shown.extend(low..=high);
    shown.sort_unstable();
    shown.dedup();

    let mut links = Vec::with_capacity(shown.len() + 2);
    let mut prev: Option<u32> = None;
    for number in shown {
        if let Some(p) = prev {
            match number - p {
                1 => {}
                2 => links.push(page(p + 1)),
                _ => links.push(PageLink::Ellipsis),
            }
        }
        links.push(page(number));
        prev = Some(number);
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(links: &[PageLink]) -> Vec<Option<u32>> {
        links
            .iter()
            .map(|l| match l {
                PageLink::Page { number, .. } => Some(*number),
                PageLink::Ellipsis => None,
            })
            .collect()
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(offset_for_page(1, 10), 0);
        assert_eq!(offset_for_page(3, 10), 20);
        assert_eq!(offset_for_page(0, 10), 0);
    }

    #[test]
    fn limit_offset_pages_cover_every_row_once() {
        let rows: Vec<u32> = (0..23).collect();
        let per_page = 10;
        let mut seen: Vec<&u32> = Vec::new();
        for page in 1..=total_pages(rows.len() as i64, per_page) {
            let offset = offset_for_page(page, per_page) as usize;
            seen.extend(rows.iter().skip(offset).take(per_page as usize));
        }
        assert_eq!(seen, rows.iter().collect::<Vec<_>>());
    }

    #[test]
    fn at_or_below_threshold_lists_every_page() {
        for total in 1..=DEFAULT_DOT_THRESHOLD {
            let links = page_links(1, total, DEFAULT_DOT_THRESHOLD);
            assert_eq!(links.len() as u32, total);
            assert!(!links.contains(&PageLink::Ellipsis));
        }
    }

    #[test]
    fn above_threshold_truncates_with_ellipsis() {
        let links = page_links(10, 20, DEFAULT_DOT_THRESHOLD);
        assert_eq!(
            numbers(&links),
            vec![Some(1), None, Some(9), Some(10), Some(11), None, Some(20)]
        );
        assert!(links.contains(&PageLink::Page { number: 10, current: true }));
    }

    #[test]
    fn near_edges_single_gap_shows_page() {
        let links = page_links(1, 8, DEFAULT_DOT_THRESHOLD);
        assert_eq!(numbers(&links), vec![Some(1), Some(2), None, Some(8)]);

        let links = page_links(3, 8, DEFAULT_DOT_THRESHOLD);
        assert_eq!(numbers(&links), vec![Some(1), Some(2), Some(3), Some(4), None, Some(8)]);

        let links = page_links(6, 8, DEFAULT_DOT_THRESHOLD);
        assert_eq!(numbers(&links), vec![Some(1), None, Some(5), Some(6), Some(7), Some(8)]);
    }

    #[test]
    fn pagination_prev_next() {
        let p = Pagination::new(1, 3, DEFAULT_DOT_THRESHOLD);
        assert_eq!(p.prev, None);
        assert_eq!(p.next, Some(2));

        let p = Pagination::new(99, 3, DEFAULT_DOT_THRESHOLD);
        assert_eq!(p.current, 3);
        assert_eq!(p.next, None);
    }
}
