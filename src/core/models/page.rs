use serde::{Deserialize, Serialize};

/// Pagination envelope after normalization. `current_page` is zero-based,
/// as the API reports it, and `None` when the API sent a negative or missing value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u32,
    pub current_page: Option<u32>,
    pub page_size: Option<u32>,
}
