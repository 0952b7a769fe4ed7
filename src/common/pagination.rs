// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    // Valores ausentes caem no padrão; limit é sempre limitado a MAX_LIMIT.
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: u32,
}

impl PageInfo {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let per_page = i64::from(request.limit);
        Self {
            current_page: request.page,
            total_pages: (total_items + per_page - 1) / per_page,
            total_items,
            items_per_page: request.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        Self {
            items,
            pagination: PageInfo::new(request, total_items),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub enum SortOrder {
    #[serde(rename = "ASC", alias = "asc", alias = "Asc")]
    Asc,
    #[default]
    #[serde(rename = "DESC", alias = "desc", alias = "Desc")]
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}
