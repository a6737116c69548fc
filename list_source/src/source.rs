//! Remote list API contract
//!
//! This module defines the response envelope and the trait
//! implemented by anything that can list entities page by page.

use crate::entity::Entity;
use crate::errors::LoadError;
use crate::query::QueryKey;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Response envelope of the remote list API
///
/// Only `data.len()` drives pagination; `total` is carried along for
/// display and never consulted by the continuation logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "E: Deserialize<'de>"))]
pub struct ListResponse<E> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<E>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

fn null_as_empty<'de, D, E>(deserializer: D) -> Result<Vec<E>, D::Error>
where
    D: Deserializer<'de>,
    E: Deserialize<'de>,
{
    Ok(Option::<Vec<E>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<E> ListResponse<E> {
    pub fn new(data: Vec<E>) -> Self {
        Self {
            data,
            total: None,
            message: None,
            success: true,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

/// Anything that can list entities of one kind, one page per call
#[async_trait]
pub trait ListSource<E: Entity>: Send + Sync {
    /// List entities for a 1-based page under the key's filters
    async fn list_entities(&self, page: u32, query: &QueryKey) -> Result<ListResponse<E>, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestItem;

    #[test]
    fn test_decodes_generic_envelope() {
        let response: ListResponse<TestItem> = serde_json::from_str(
            r#"{"data":[{"id":4,"name":"four"}],"total":31,"message":"ok","success":true}"#,
        )
        .unwrap();
        assert_eq!(response.data, vec![TestItem::new(4, "four")]);
        assert_eq!(response.total, Some(31));
        assert!(response.success);
    }

    #[test]
    fn test_null_or_missing_data_is_empty() {
        let response: ListResponse<TestItem> =
            serde_json::from_str(r#"{"data":null,"success":false,"message":"denied"}"#).unwrap();
        assert!(response.data.is_empty());
        assert!(!response.success);

        let response: ListResponse<TestItem> = serde_json::from_str("{}").unwrap();
        assert!(response.data.is_empty());
        assert!(response.success);
    }
}
