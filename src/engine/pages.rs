//! Offset/limit paging of a resolved subset
//!
//! Pages are slices of the subset in dataset order. Requests that fall
//! outside the subset, or ask for zero rows, return an empty page rather
//! than an error because offsets and sizes come straight from the table
//! widget.

use super::dataset::Row;
use super::filter::RowSubset;
use serde::Serialize;

/// A stable slice of a subset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a> {
    pub rows: Vec<&'a Row>,
    /// Offset of the first row within the subset
    pub offset: usize,
    /// Requested page size
    pub size: usize,
    /// Length of the whole subset
    pub total: usize,
}

impl<'a> Page<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of pages of `size` needed for the whole subset
    pub fn page_count(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(self.size)
        }
    }
}

/// Rows `[offset, offset + size)` of the subset
pub fn page<'a>(subset: &RowSubset<'a>, offset: usize, size: usize) -> Page<'a> {
    let rows = if size == 0 {
        Vec::new()
    } else {
        subset.slice(offset, offset.saturating_add(size))
    };
    Page {
        rows,
        offset,
        size,
        total: subset.len(),
    }
}

/// Page by number, as a table widget with custom paging requests it
pub fn page_number<'a>(subset: &RowSubset<'a>, page_current: usize, page_size: usize) -> Page<'a> {
    page(subset, page_current.saturating_mul(page_size), page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dataset::fixtures::sample;

    #[test]
    fn test_page_slices_in_dataset_order() {
        let ds = sample();
        let all = RowSubset::all(&ds);
        let p = page(&all, 1, 2);
        assert_eq!(p.rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(p.total, 6);
        assert_eq!(p.page_count(), 3);
    }

    #[test]
    fn test_last_page_is_short() {
        let ds = sample();
        let all = RowSubset::all(&ds);
        let p = page_number(&all, 1, 4);
        assert_eq!(p.offset, 4);
        assert_eq!(p.rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn test_out_of_range_and_zero_size() {
        let ds = sample();
        let all = RowSubset::all(&ds);
        assert!(page(&all, 6, 5).is_empty());
        assert!(page(&all, usize::MAX, 5).is_empty());
        assert!(page(&all, 0, 0).is_empty());
        assert_eq!(page(&all, 0, 0).page_count(), 0);
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let ds = sample();
        let all = RowSubset::all(&ds);
        assert_eq!(page(&all, 2, 3), page(&all, 2, 3));
    }
}
