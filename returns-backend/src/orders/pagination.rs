use returns_common::Pagination;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 50;

/// Slice page `page` (1-based) of `per_page` items out of `items`.
///
/// Pages past the end are empty; `page` and `per_page` must be at least 1.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> (&[T], Pagination) {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = items.len();

    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);

    let pagination = Pagination {
        total,
        total_pages: total.div_ceil(per_page),
        current_page: page,
        per_page,
    };

    (&items[start..end], pagination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling() {
        let items: Vec<u32> = (0..101).collect();
        let (_, p) = paginate(&items, 1, 50);
        assert_eq!(p.total, 101);
        assert_eq!(p.total_pages, 3);

        let (_, p) = paginate(&items[..100], 1, 50);
        assert_eq!(p.total_pages, 2);

        let (_, p) = paginate::<u32>(&[], 1, 50);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn test_page_slices_are_clipped() {
        let items: Vec<u32> = (0..23).collect();
        for per_page in 1..=25usize {
            let pages = items.len().div_ceil(per_page);
            for page in 1..=pages + 1 {
                let (slice, p) = paginate(&items, page, per_page);
                let start = ((page - 1) * per_page).min(items.len());
                let end = (page * per_page).min(items.len());
                assert_eq!(slice, &items[start..end]);
                assert_eq!(p.current_page, page);
                assert_eq!(p.per_page, per_page);
            }
        }
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items = [1, 2, 3];
        let (slice, p) = paginate(&items, 5, 2);
        assert!(slice.is_empty());
        assert_eq!(p.total_pages, 2);
    }
}
