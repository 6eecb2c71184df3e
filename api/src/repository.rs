use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::table::{EventRow, Events, TableClient};
use crate::Event;
use async_trait::async_trait;

/// Read access to league events, whichever backend serves them.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Newest events first, at most `limit` of them.
    async fn recent_events(&self, limit: u32) -> ApiResult<Vec<Event>>;

    async fn event(&self, id: &str) -> ApiResult<Option<Event>>;
}

#[async_trait]
impl EventRepository for ApiClient {
    async fn recent_events(&self, limit: u32) -> ApiResult<Vec<Event>> {
        let mut events = self.fetch_events(limit).await?;
        // Undated events sort last.
        events.sort_by(|a, b| b.starts_on().cmp(&a.starts_on()));
        Ok(events)
    }

    async fn event(&self, id: &str) -> ApiResult<Option<Event>> {
        self.fetch_event(id).await
    }
}

#[async_trait]
impl EventRepository for TableClient {
    async fn recent_events(&self, limit: u32) -> ApiResult<Vec<Event>> {
        let rows = self.fetch_recent_events(limit).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn event(&self, id: &str) -> ApiResult<Option<Event>> {
        Ok(self.fetch_by_id::<Events>(id, None).await.map(Event::from))
    }
}

impl From<EventRow> for Event {
    /// The table has no active flag, so rows always map to inactive events.
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            name: row.name,
            start_date: row.start_date.unwrap_or_default(),
            end_date: row.end_date,
            event_type: row.event_type.map(|t| t.as_str().to_owned()),
            location: None,
            description: row.description,
            is_active: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{EventTier, EventType};
    use mockito::{Matcher, Server};

    async fn names(repo: &dyn EventRepository) -> Vec<String> {
        repo.recent_events(2)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    #[tokio::test]
    async fn both_backends_answer_through_the_same_seam() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex(r"^/api/events(\?.*)?$".into()))
            .with_status(200)
            .with_body(
                r#"{"status":"success","message":"ok","data":[
                    {"id":"e2","name":"Summer Major","start_date":"2025-06-01","is_active":true},
                    {"id":"e1","name":"Spring Split","start_date":"2025-03-01","is_active":false}]}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", Matcher::Regex(r"^/rest/v1/events(\?.*)?$".into()))
            .with_status(200)
            .with_body(
                r#"[{"id":"e2","name":"Summer Major","start_date":"2025-06-01"},
                    {"id":"e1","name":"Spring Split","start_date":"2025-03-01"}]"#,
            )
            .create_async()
            .await;

        let rest = ApiClient::with_base_url(server.url());
        let table = TableClient::with_endpoint(server.url(), "anon");
        assert_eq!(names(&rest).await, names(&table).await);
    }

    #[tokio::test]
    async fn rest_backend_orders_recent_events_newest_first() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex(r"^/api/events(\?.*)?$".into()))
            .with_status(200)
            .with_body(
                r#"{"status":"success","message":"ok","data":[
                    {"id":"e0","name":"Exhibition","start_date":""},
                    {"id":"e1","name":"Spring Split","start_date":"2025-03-01"},
                    {"id":"e2","name":"Summer Major","start_date":"2025-06-01"}]}"#,
            )
            .create_async()
            .await;

        let rest = ApiClient::with_base_url(server.url());
        let names: Vec<String> = rest
            .recent_events(3)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["Summer Major", "Spring Split", "Exhibition"]);
    }

    #[tokio::test]
    async fn missing_event_is_none_on_both_paths() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/events/zz")
            .with_status(404)
            .with_body(r#"{"status":"error","message":"not found"}"#)
            .create_async()
            .await;
        server
            .mock("GET", Matcher::Regex(r"^/rest/v1/events(\?.*)?$".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let rest = ApiClient::with_base_url(server.url());
        let table = TableClient::with_endpoint(server.url(), "anon");
        assert!(rest.event("zz").await.unwrap().is_none());
        assert!(table.event("zz").await.unwrap().is_none());
    }

    #[test]
    fn row_conversion_keeps_type_and_clears_active() {
        let row = EventRow {
            id: "e1".into(),
            name: "Spring Split".into(),
            start_date: Some("2025-03-01".into()),
            tier: Some(EventTier::T3),
            event_type: Some(EventType::Tournament),
            ..Default::default()
        };
        let event = Event::from(row);
        assert_eq!(event.event_type.as_deref(), Some("Tournament"));
        assert_eq!(event.start_date, "2025-03-01");
        assert!(!event.is_active);
    }
}
