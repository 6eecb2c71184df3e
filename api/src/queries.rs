//! Typed query façade: one method per league resource or view.
//!
//! List queries turn a missing `data` field into an empty `Vec`; single-entity
//! queries turn it (and a 404) into `None`. Everything else propagates.

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::wire::PerformancePage;
use crate::{
    Event, Health, Match, MatchDetails, Player, PlayerPerformance, SearchResults, Team,
    TeamPerformance,
};
use log::debug;
use serde::de::DeserializeOwned;

pub const DEFAULT_LIMIT: u32 = 10;

impl ApiClient {
    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    pub async fn fetch_players(&self, limit: u32) -> ApiResult<Vec<Player>> {
        self.fetch_list(&format!("/players?limit={limit}")).await
    }

    pub async fn fetch_player(&self, id: &str) -> ApiResult<Option<Player>> {
        self.fetch_one(&format!("/players/{id}")).await
    }

    pub async fn fetch_player_performance(&self, limit: u32) -> ApiResult<Vec<PlayerPerformance>> {
        let endpoint = format!("/views/player-performance?limit={limit}");
        let envelope = self
            .get::<PerformancePage<PlayerPerformance>>(&endpoint, None)
            .await?;
        Ok(envelope
            .data
            .map(PerformancePage::into_rows)
            .unwrap_or_default())
    }

    pub async fn fetch_player_performance_by_id(
        &self,
        player_id: &str,
    ) -> ApiResult<Option<PlayerPerformance>> {
        self.fetch_one(&format!("/views/player-performance-view/{player_id}"))
            .await
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    pub async fn fetch_teams(&self) -> ApiResult<Vec<Team>> {
        self.fetch_list("/teams").await
    }

    pub async fn fetch_team(&self, id: &str) -> ApiResult<Option<Team>> {
        self.fetch_one(&format!("/teams/{id}")).await
    }

    pub async fn fetch_team_performance(&self) -> ApiResult<Vec<TeamPerformance>> {
        self.fetch_list("/views/team-performance").await
    }

    pub async fn fetch_team_performance_by_id(
        &self,
        team_id: &str,
    ) -> ApiResult<Option<TeamPerformance>> {
        self.fetch_one(&format!("/views/team-performance-summary/{team_id}"))
            .await
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub async fn fetch_events(&self, limit: u32) -> ApiResult<Vec<Event>> {
        self.fetch_list(&format!("/events?limit={limit}")).await
    }

    pub async fn fetch_event(&self, id: &str) -> ApiResult<Option<Event>> {
        self.fetch_one(&format!("/events/{id}")).await
    }

    pub async fn fetch_upcoming_events(&self) -> ApiResult<Vec<Event>> {
        self.fetch_list("/views/upcoming-events").await
    }

    // -----------------------------------------------------------------------
    // Matches
    // -----------------------------------------------------------------------

    pub async fn fetch_matches(&self) -> ApiResult<Vec<Match>> {
        self.fetch_list("/matches").await
    }

    pub async fn fetch_match(&self, id: &str) -> ApiResult<Option<Match>> {
        self.fetch_one(&format!("/matches/{id}")).await
    }

    pub async fn fetch_upcoming_matches(&self) -> ApiResult<Vec<Match>> {
        self.fetch_list("/views/upcoming-matches").await
    }

    pub async fn fetch_match_details(&self, match_id: &str) -> ApiResult<Option<MatchDetails>> {
        self.fetch_one(&format!("/views/match-details/{match_id}"))
            .await
    }

    // -----------------------------------------------------------------------
    // Search / health
    // -----------------------------------------------------------------------

    pub async fn search(&self, query: &str) -> ApiResult<SearchResults> {
        let mut url = self.url_for("/search")?;
        url.query_pairs_mut().append_pair("q", query);
        let endpoint = format!("/search?{}", url.query().unwrap_or_default());
        let envelope = self.get::<SearchResults>(&endpoint, None).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn check_health(&self) -> ApiResult<Health> {
        let envelope = self.get::<Health>("/health", None).await?;
        Ok(envelope.data.unwrap_or_else(Health::unreachable))
    }

    // -----------------------------------------------------------------------
    // Shared soft-miss handling
    // -----------------------------------------------------------------------

    async fn fetch_list<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<Vec<T>> {
        let envelope = self.get::<Vec<T>>(endpoint, None).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn fetch_one<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<Option<T>> {
        match self.get::<T>(endpoint, None).await {
            Ok(envelope) => Ok(envelope.data),
            Err(e) if e.is_not_found() => {
                debug!("{endpoint}: not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;
    use mockito::{Matcher, Server, ServerGuard};

    fn route(path: &str) -> Matcher {
        Matcher::Regex(format!(r"^{path}(\?.*)?$"))
    }

    async fn serve(status: usize, path: &str, body: &str) -> (ServerGuard, ApiClient) {
        let mut server = Server::new_async().await;
        server
            .mock("GET", route(path))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let client = ApiClient::with_base_url(server.url());
        (server, client)
    }

    #[tokio::test]
    async fn list_returns_data_unchanged_and_in_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", route("/api/players"))
            .match_query(Matcher::UrlEncoded("limit".into(), "3".into()))
            .with_status(200)
            .with_body(
                r#"{"status":"success","message":"ok","data":[
                    {"id":"p3","gamertag":"Zed","player_rp":10,"player_rank_score":"1"},
                    {"id":"p1","gamertag":"Amy","player_rp":"30","player_rank_score":3},
                    {"id":"p2","gamertag":"Bo","player_rp":20,"player_rank_score":null}
                ]}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url());
        let players = client.fetch_players(3).await.unwrap();
        let ids: Vec<_> = players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p3", "p1", "p2"]);
        assert_eq!(players[1].player_rp.value(), 30.0);
        assert_eq!(players[2].player_rank_score.value(), 0.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_data_is_a_soft_miss() {
        let body = r#"{"status":"success","message":"nothing here"}"#;

        let (_s, client) = serve(200, "/api/teams", body).await;
        assert!(client.fetch_teams().await.unwrap().is_empty());

        let (_s, client) = serve(200, "/api/teams/t1", body).await;
        assert!(client.fetch_team("t1").await.unwrap().is_none());

        let (_s, client) = serve(200, "/api/search", body).await;
        assert!(client.search("cats").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_without_data_reports_error_default() {
        let (_s, client) = serve(200, "/api/health", r#"{"status":"success","message":"up"}"#).await;
        let health = client.check_health().await.unwrap();
        assert_eq!(health.status, "error");
        assert!(!health.timestamp.is_empty());
    }

    #[tokio::test]
    async fn not_found_is_soft_for_single_entity_but_hard_for_lists() {
        let body = r#"{"status":"error","message":"not found"}"#;

        let (_s, client) = serve(404, "/api/views/team-performance-summary/t9", body).await;
        assert!(client.fetch_team_performance_by_id("t9").await.unwrap().is_none());

        let (_s, client) = serve(404, "/api/views/team-performance", body).await;
        let err = client.fetch_team_performance().await.unwrap_err();
        assert!(matches!(err, ApiError::Request { ref message, .. } if message == "not found"));
    }

    #[tokio::test]
    async fn single_entity_still_propagates_server_errors() {
        let (_s, client) = serve(500, "/api/events/e1", r#"{"status":"error","message":"db down"}"#).await;
        let err = client.fetch_event("e1").await.unwrap_err();
        assert!(err.is_request());
        assert_eq!(err.to_string(), "db down");
    }

    #[tokio::test]
    async fn player_performance_unwraps_nested_data() {
        let (_s, client) = serve(
            200,
            "/api/views/player-performance",
            r#"{"status":"success","message":"ok","data":{"data":[
                {"id":"p1","gamertag":"Amy","avg_points":"21.5","avg_performance_score":88.2}
            ]}}"#,
        )
        .await;
        let rows = client.fetch_player_performance(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].avg_points.value(), 21.5);
        assert_eq!(rows[0].avg_performance_score.value(), 88.2);
    }

    #[tokio::test]
    async fn player_performance_null_inner_data_is_empty() {
        let (_s, client) = serve(
            200,
            "/api/views/player-performance",
            r#"{"status":"success","message":"ok","data":{"data":null}}"#,
        )
        .await;
        let rows = client.fetch_player_performance(10).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn player_performance_tolerates_flat_data() {
        let (_s, client) = serve(
            200,
            "/api/views/player-performance",
            r#"{"status":"success","message":"ok","data":[{"id":"p1","gamertag":"Amy"}]}"#,
        )
        .await;
        let rows = client.fetch_player_performance(10).await.unwrap();
        assert_eq!(rows[0].gamertag, "Amy");
    }

    #[tokio::test]
    async fn search_url_encodes_the_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", route("/api/search"))
            .match_query(Matcher::UrlEncoded("q".into(), "cat & dog".into()))
            .with_status(200)
            .with_body(
                r#"{"status":"success","message":"ok","data":{
                    "players":[{"id":"p1","gamertag":"CatDog"}],
                    "teams":[]}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url());
        let results = client.search("cat & dog").await.unwrap();
        assert_eq!(results.players.len(), 1);
        assert!(results.teams.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn match_details_and_upcoming_matches() {
        let (_s, client) = serve(
            200,
            "/api/views/match-details/m1",
            r#"{"status":"success","message":"ok","data":{
                "id":"m1","event_id":"e1","home_team_id":"t1","away_team_id":"t2",
                "match_date":"2025-07-01T19:00:00Z","status":"completed","venue":null,
                "home_team_name":"Cats","away_team_name":"Dogs","home_score":"64","away_score":58}}"#,
        )
        .await;
        let details = client.fetch_match_details("m1").await.unwrap().unwrap();
        assert_eq!(details.scoreline(), "Cats 64 - 58 Dogs");

        let (_s, client) = serve(
            200,
            "/api/views/upcoming-matches",
            r#"{"status":"success","message":"ok","data":[
                {"id":"m2","event_id":"e1","home_team_id":"t1","away_team_id":"t3",
                 "match_date":"2025-07-08","status":"scheduled"}]}"#,
        )
        .await;
        let upcoming = client.fetch_upcoming_matches().await.unwrap();
        assert_eq!(upcoming[0].status, "scheduled");
    }
}
