//! # Response Formatting

use serde::Serialize;
use serde_json::Value;

/// List response with paging echo
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub data: Vec<Value>,
    pub count: usize,
    pub skip: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ListResponse {
    pub fn new(data: Vec<Value>, skip: usize, limit: Option<usize>) -> Self {
        let count = data.len();
        Self {
            data,
            count,
            skip,
            limit,
        }
    }
}

/// Delete response
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn success() -> Self {
        Self { deleted: true }
    }

    pub fn vetoed() -> Self {
        Self { deleted: false }
    }
}
