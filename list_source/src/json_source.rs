//! JSON list source
//!
//! Adapts a raw transport (anything that can `GET` a path with query
//! parameters and return the body) to the `ListSource` contract by
//! decoding the `{data, total, message, success}` envelope.

use crate::entity::Entity;
use crate::errors::LoadError;
use crate::query::QueryKey;
use crate::source::{ListResponse, ListSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Raw request transport of the remote API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one GET and return the response body
    ///
    /// Network and HTTP-status failures map to `LoadError::Transport`.
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<String, LoadError>;
}

/// List source that decodes JSON envelopes served at a fixed path
#[derive(Debug, Clone)]
pub struct JsonListSource<T> {
    transport: T,
    path: String,
}

impl<T: Transport> JsonListSource<T> {
    pub fn new(transport: T, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters for one page: `page` first, then each filter
    fn params(page: u32, query: &QueryKey) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(query.filters().len() + 1);
        params.push(("page".to_string(), page.to_string()));
        params.extend(query.to_query_params());
        params
    }
}

#[async_trait]
impl<T, E> ListSource<E> for JsonListSource<T>
where
    T: Transport,
    E: Entity + DeserializeOwned,
{
    async fn list_entities(&self, page: u32, query: &QueryKey) -> Result<ListResponse<E>, LoadError> {
        let params = Self::params(page, query);
        let body = self.transport.get(&self.path, &params).await?;
        let response: ListResponse<E> = serde_json::from_str(&body)?;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "request was not successful".to_string());
            return Err(LoadError::Transport(message));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestItem;
    use std::sync::Mutex;

    struct CannedTransport {
        body: Result<String, LoadError>,
        seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl CannedTransport {
        fn new(body: Result<&str, LoadError>) -> Self {
            Self {
                body: body.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn get(&self, path: &str, params: &[(String, String)]) -> Result<String, LoadError> {
            self.seen
                .lock()
                .unwrap()
                .push((path.to_string(), params.to_vec()));
            self.body.clone()
        }
    }

    #[tokio::test]
    async fn test_decodes_envelope_and_sends_page_with_filters() {
        let transport = CannedTransport::new(Ok(
            r#"{"data":[{"id":1,"name":"A"},{"id":2,"name":"B"}],"total":42,"message":"ok","success":true}"#,
        ));
        let source = JsonListSource::new(transport, "/users");
        let key = QueryKey::new("students").with_filter("role", "student");

        let response: ListResponse<TestItem> = source.list_entities(3, &key).await.unwrap();
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.total, Some(42));

        let seen = source.transport.seen.lock().unwrap();
        assert_eq!(seen[0].0, "/users");
        assert_eq!(
            seen[0].1,
            vec![
                ("page".to_string(), "3".to_string()),
                ("role".to_string(), "student".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_null_data_is_an_empty_page() {
        let source = JsonListSource::new(CannedTransport::new(Ok(r#"{"data":null}"#)), "/rooms");
        let response: ListResponse<TestItem> = source
            .list_entities(1, &QueryKey::new("rooms"))
            .await
            .unwrap();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let source = JsonListSource::new(CannedTransport::new(Ok("<html>502</html>")), "/rooms");
        let result: Result<ListResponse<TestItem>, _> =
            source.list_entities(1, &QueryKey::new("rooms")).await;
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_is_transport_error() {
        let source = JsonListSource::new(
            CannedTransport::new(Ok(r#"{"data":[],"message":"unauthorized","success":false}"#)),
            "/rooms",
        );
        let result: Result<ListResponse<TestItem>, _> =
            source.list_entities(1, &QueryKey::new("rooms")).await;
        assert_eq!(result.unwrap_err(), LoadError::transport("unauthorized"));
    }

    #[tokio::test]
    async fn test_transport_failure_passes_through() {
        let source = JsonListSource::new(
            CannedTransport::new(Err(LoadError::transport("GET /rooms: 503"))),
            "/rooms",
        );
        let result: Result<ListResponse<TestItem>, _> =
            source.list_entities(1, &QueryKey::new("rooms")).await;
        assert_eq!(result.unwrap_err(), LoadError::transport("GET /rooms: 503"));
    }
}
