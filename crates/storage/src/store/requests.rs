#![forbid(unsafe_code)]

//! Caller-facing request shapes. Table identifiers arrive as plain strings
//! and are re-validated by the store before any SQL is built.

use serde::{Deserialize, Serialize};
use sl_core::model::RecordDraft;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableRequest {
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    pub table: String,
    #[serde(flatten)]
    pub record: RecordDraft,
}

/// Full replacement of row `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecordRequest {
    pub table: String,
    pub id: i64,
    #[serde(flatten)]
    pub record: RecordDraft,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordKeyRequest {
    pub table: String,
    pub id: i64,
}

/// `None` bounds fall back to offset 0 and limit 10.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecordsRequest {
    pub table: String,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListRecordsRequest {
    pub fn first_page(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            offset: None,
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omitted_page_bounds_deserialize_as_none() {
        let request: ListRecordsRequest =
            serde_json::from_value(json!({ "table": "products_1" })).unwrap();
        assert_eq!(request, ListRecordsRequest::first_page("products_1"));

        let request: ListRecordsRequest =
            serde_json::from_value(json!({ "table": "products_1", "limit": 25 })).unwrap();
        assert_eq!(request.offset, None);
        assert_eq!(request.limit, Some(25));

        assert!(
            serde_json::from_value::<ListRecordsRequest>(json!({
                "table": "products_1",
                "limit": -1,
            }))
            .is_err()
        );
    }

    #[test]
    fn record_fields_sit_beside_the_table() {
        let request: CreateRecordRequest = serde_json::from_value(json!({
            "table": "products_3",
            "name": "Milk",
            "flag": false,
        }))
        .unwrap();
        assert_eq!(
            request,
            CreateRecordRequest {
                table: "products_3".to_string(),
                record: RecordDraft::new("Milk", false, None),
            }
        );

        let request: UpdateRecordRequest = serde_json::from_value(json!({
            "table": "products_3",
            "id": 4,
            "name": "Eggs",
            "flag": true,
            "note": "dozen",
        }))
        .unwrap();
        assert_eq!(request.id, 4);
        assert_eq!(
            request.record,
            RecordDraft::new("Eggs", true, Some("dozen".to_string()))
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "table": "products_3",
                "id": 4,
                "name": "Eggs",
                "flag": true,
                "note": "dozen",
            })
        );
    }

    #[test]
    fn missing_required_record_fields_are_rejected() {
        assert!(
            serde_json::from_value::<CreateRecordRequest>(json!({
                "table": "products_3",
                "flag": false,
            }))
            .is_err()
        );
        assert!(
            serde_json::from_value::<CreateRecordRequest>(json!({
                "table": "products_3",
                "name": "Milk",
            }))
            .is_err()
        );
    }
}
