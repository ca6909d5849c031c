use serde::{Deserialize, Serialize};

use crate::config::PaginatorConfig;
use crate::error::{RequestError, ValidationError};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationDetails {
    pub page: i64,
    pub number_of_pages: i64,
    pub records_per_page: i64,
    pub total_count: i64,
}

#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub details: PaginationDetails,
}

pub fn number_of_pages(total_count: i64, page_size: i64) -> i64 {
    if total_count <= 0 {
        return 0;
    }
    (total_count + page_size - 1) / page_size
}

/// Turns `page`/`page_size` query parameters into a bounded page request.
///
/// Relational listings count pages from 1, the search listing follows the
/// index and counts from 0.
#[derive(Clone, Copy, Debug)]
pub struct Paginator {
    config: PaginatorConfig,
    first_page: i64,
}

impl Paginator {
    pub const fn relational(config: PaginatorConfig) -> Self {
        Self {
            config,
            first_page: 1,
        }
    }

    pub const fn search(config: PaginatorConfig) -> Self {
        Self {
            config,
            first_page: 0,
        }
    }

    pub fn request(&self, query: &PageQuery) -> Result<PageRequest, RequestError> {
        let page = query.page.unwrap_or(self.first_page);
        if page < self.first_page {
            return Err(ValidationError::Unprocessable {
                param: "page",
                value: page.to_string(),
            }
            .into());
        }
        let page_size = query.page_size.unwrap_or(self.config.per_page);
        if page_size < 1 {
            return Err(ValidationError::Unprocessable {
                param: "page_size",
                value: page_size.to_string(),
            }
            .into());
        }
        Ok(PageRequest {
            page,
            page_size: page_size.min(self.config.max_page_size()),
            first_page: self.first_page,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
    first_page: i64,
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - self.first_page) * self.page_size
    }

    pub fn ensure_in_range(&self, number_of_pages: i64) -> Result<(), RequestError> {
        if self.page - self.first_page >= number_of_pages {
            return Err(RequestError::NotFound);
        }
        Ok(())
    }

    /// Pagination metadata for a result set of `total_count` rows, or
    /// `NotFound` when this page lies past the last one.
    pub fn details(&self, total_count: i64) -> Result<PaginationDetails, RequestError> {
        let pages = number_of_pages(total_count, self.page_size);
        self.ensure_in_range(pages)?;
        Ok(PaginationDetails {
            page: self.page,
            number_of_pages: pages,
            records_per_page: self.page_size,
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: PaginatorConfig = PaginatorConfig::new(20, 60);

    fn query(page: Option<i64>, page_size: Option<i64>) -> PageQuery {
        PageQuery { page, page_size }
    }

    #[test]
    fn relational_defaults_to_first_page() {
        let request = Paginator::relational(CONFIG)
            .request(&PageQuery::default())
            .unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit(), 20);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn search_defaults_to_page_zero() {
        let request = Paginator::search(CONFIG)
            .request(&query(None, Some(5)))
            .unwrap();
        assert_eq!(request.page, 0);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn page_size_is_clamped_to_maximum() {
        let request = Paginator::relational(CONFIG)
            .request(&query(Some(3), Some(1000)))
            .unwrap();
        assert_eq!(request.limit(), 60);
        assert_eq!(request.offset(), 120);
    }

    #[test]
    fn rejects_page_below_first() {
        let err = Paginator::relational(CONFIG)
            .request(&query(Some(0), None))
            .expect_err("expected invalid page");
        assert!(matches!(
            err,
            RequestError::Validation(ValidationError::Unprocessable { param: "page", .. })
        ));

        let err = Paginator::search(CONFIG)
            .request(&query(Some(-1), None))
            .expect_err("expected invalid page");
        assert!(matches!(
            err,
            RequestError::Validation(ValidationError::Unprocessable { param: "page", .. })
        ));
    }

    #[test]
    fn rejects_non_positive_page_size() {
        let err = Paginator::relational(CONFIG)
            .request(&query(None, Some(0)))
            .expect_err("expected invalid page size");
        assert!(matches!(
            err,
            RequestError::Validation(ValidationError::Unprocessable { param: "page_size", value })
                if value == "0"
        ));
    }

    #[test]
    fn counts_partial_last_page() {
        assert_eq!(number_of_pages(0, 10), 0);
        assert_eq!(number_of_pages(10, 10), 1);
        assert_eq!(number_of_pages(11, 10), 2);
    }

    #[test]
    fn details_for_last_page() {
        let request = Paginator::relational(CONFIG)
            .request(&query(Some(3), Some(10)))
            .unwrap();
        let details = request.details(25).unwrap();
        assert_eq!(
            details,
            PaginationDetails {
                page: 3,
                number_of_pages: 3,
                records_per_page: 10,
                total_count: 25,
            }
        );
    }

    #[test]
    fn page_past_the_end_is_not_found() {
        let request = Paginator::relational(CONFIG)
            .request(&query(Some(4), Some(10)))
            .unwrap();
        assert!(matches!(request.details(25), Err(RequestError::NotFound)));
    }

    #[test]
    fn empty_result_set_has_no_pages() {
        let request = Paginator::relational(CONFIG)
            .request(&PageQuery::default())
            .unwrap();
        assert!(matches!(request.details(0), Err(RequestError::NotFound)));
    }

    #[test]
    fn search_page_range_is_zero_based() {
        let request = Paginator::search(CONFIG)
            .request(&query(Some(2), None))
            .unwrap();
        assert!(request.ensure_in_range(3).is_ok());
        assert!(matches!(
            request.ensure_in_range(2),
            Err(RequestError::NotFound)
        ));
    }
}
