//! Query parameter extractors for list endpoints.

use serde::Deserialize;

use convs_core::repository::SortOrder;
use convs_core::repository::bot::BotFilter;
use convs_types::bot::BotStatus;

use crate::http::error::AppError;

/// Query parameters for bot list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct BotListQuery {
    /// Filter by status (active, disabled, archived).
    pub status: Option<String>,
    /// Sort by field.
    #[serde(default = "default_sort")]
    pub sort: String,
    /// Sort order (asc, desc).
    #[serde(default = "default_order")]
    pub order: String,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
}

fn default_sort() -> String {
    "created_at".to_string()
}

fn default_order() -> String {
    "desc".to_string()
}

impl BotListQuery {
    /// Convert to a repository filter, validating the status.
    pub fn into_filter(self) -> Result<BotFilter, AppError> {
        let status = match &self.status {
            Some(s) => Some(s.parse::<BotStatus>().map_err(AppError::Validation)?),
            None => None,
        };

        let sort_order = match self.order.to_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        Ok(BotFilter {
            status,
            sort_by: Some(self.sort),
            sort_order: Some(sort_order),
            limit: self.limit,
            offset: self.offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_filter() {
        let query = BotListQuery {
            status: Some("disabled".to_string()),
            sort: "name".to_string(),
            order: "ASC".to_string(),
            limit: Some(5),
            offset: None,
        };

        let filter = query.into_filter().unwrap();
        assert_eq!(filter.status, Some(BotStatus::Disabled));
        assert_eq!(filter.sort_by.as_deref(), Some("name"));
        assert!(matches!(filter.sort_order, Some(SortOrder::Asc)));
        assert_eq!(filter.limit, Some(5));
    }

    #[test]
    fn test_unknown_status_is_validation_error() {
        let query = BotListQuery {
            status: Some("sleeping".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::Validation(_))));
    }
}
