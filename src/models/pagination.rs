use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            page_size: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self { page, page_size }
    }

    pub fn get_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn get_limit(&self) -> i64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }

    pub fn get_offset(&self) -> i64 {
        (self.get_page() - 1) * self.get_limit()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub records: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(records: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        let page_size = params.get_limit();
        let total_pages = if total == 0 {
            1
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            records,
            page: params.get_page(),
            page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params() {
        let params = PaginationParams::new(Some(2), Some(10));
        assert_eq!(params.get_page(), 2);
        assert_eq!(params.get_limit(), 10);
        assert_eq!(params.get_offset(), 10);
    }

    #[test]
    fn test_pagination_params_defaults() {
        let params = PaginationParams::new(None, None);
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_limit(), 20);
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn test_paginated_response_rounds_pages_up() {
        let params = PaginationParams::new(Some(2), Some(10));
        let response = PaginatedResponse::new(vec![1, 2, 3], &params, 25);
        assert_eq!(response.page, 2);
        assert_eq!(response.total_pages, 3);

        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], &params, 0);
        assert_eq!(empty.total_pages, 1);
    }
}
