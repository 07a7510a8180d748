//! JSON response envelope for the query endpoint.
//!
//! The endpoint returns `{success: true, data, meta, links}` on
//! success and `{success: false, error}` on failure; validation
//! failures are the 400-class errors, anything else is a 500-class
//! storage fault.

use serde::Serialize;
use tan_model::AssetRecord;

use crate::error::QueryError;
use crate::executor::AssetPage;
use crate::pagination::{PageLinks, PageMeta};

/// Success body of the query endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySuccessBody {
    pub success: bool,
    pub data: Vec<AssetRecord>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

/// Failure body of the query endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryErrorBody {
    pub success: bool,
    pub error: String,
}

/// Either endpoint body, plus the HTTP status it should ride on.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Success(QuerySuccessBody),
    Error(QueryErrorBody),
}

impl ApiResponse {
    pub fn from_result(result: Result<AssetPage, QueryError>) -> Self {
        match result {
            Ok(page) => Self::Success(QuerySuccessBody {
                success: true,
                data: page.records,
                meta: page.meta,
                links: page.links,
            }),
            Err(error) => Self::Error(QueryErrorBody {
                success: false,
                error: error.to_string(),
            }),
        }
    }

    /// HTTP status code the transport layer should use.
    pub fn status_code(result: &Result<AssetPage, QueryError>) -> u16 {
        match result {
            Ok(_) => 200,
            Err(error) if error.is_validation() => 400,
            Err(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tan_filter::FilterError;

    #[test]
    fn test_validation_error_maps_to_400_body() {
        let result: Result<AssetPage, QueryError> =
            Err(QueryError::Validation(FilterError::LibrariesOutsideLibraryMode));
        assert_eq!(ApiResponse::status_code(&result), 400);
        let response = ApiResponse::from_result(result);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .contains("library filter is not valid")
        );
    }

    #[test]
    fn test_success_body_shape() {
        let meta = PageMeta::new(1, 10, 0);
        let links = PageLinks::build("/api/assets", &meta);
        let page = AssetPage {
            records: Vec::new(),
            meta,
            links,
        };
        let result: Result<AssetPage, QueryError> = Ok(page);
        assert_eq!(ApiResponse::status_code(&result), 200);
        let json = serde_json::to_value(ApiResponse::from_result(result)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["meta"]["totalPages"], 0);
        assert!(json["links"]["self"].is_string());
        assert!(json["data"].as_array().unwrap().is_empty());
    }
}
