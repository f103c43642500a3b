//! Page arithmetic and the pager layout shared by the API and the dashboard.

/// The number of sales returned per page.
pub const PAGE_SIZE: u64 = 10;

/// The maximum number of pages to show in the pagination indicator.
pub const MAX_PAGE_INDICATORS: u64 = 5;

/// The number of pages needed to show `total_items`.
///
/// There is always at least one page, even when there are no items.
pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    total_items.div_ceil(page_size).max(1)
}

/// The number of rows to skip to reach the first row of `page` (1-based).
pub fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// Lay out the pager for `curr_page` of `page_count` pages, showing at most
/// `max_pages` page numbers around the current page.
///
/// The first and last pages are always reachable. An ellipsis marks a gap of
/// at least one hidden page. `curr_page` may lie past `page_count`, in which
/// case only a back button pointing at the last page is added.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let (first, last) = visible_pages(curr_page, page_count, max_pages);
    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(
            (curr_page - 1).min(page_count),
        ));
    }

    if first > 1 {
        indicators.push(PaginationIndicator::Page(1));

        if first > 2 {
            indicators.push(PaginationIndicator::Ellipsis);
        }
    }

    indicators.extend((first..=last).map(|page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    }));

    if last < page_count {
        if last + 1 < page_count {
            indicators.push(PaginationIndicator::Ellipsis);
        }

        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// The first and last page numbers of the window centred on `curr_page`,
/// shifted to stay within `1..=page_count`.
fn visible_pages(curr_page: u64, page_count: u64, max_pages: u64) -> (u64, u64) {
    if page_count <= max_pages {
        return (1, page_count);
    }

    let first = curr_page
        .saturating_sub(max_pages / 2)
        .clamp(1, page_count - max_pages + 1);

    (first, first + max_pages - 1)
}
