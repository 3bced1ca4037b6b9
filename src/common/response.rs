//! Success envelope shared by every endpoint.

use serde::Serialize;

use super::paging::Paging;

/// `{"data": ...}`, plus `"paging"` on list responses.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl<T> SuccessResponse<T> {
    pub fn simple(data: T) -> Self {
        Self { data, paging: None }
    }

    pub fn paged(data: T, paging: Paging) -> Self {
        Self {
            data,
            paging: Some(paging),
        }
    }
}
