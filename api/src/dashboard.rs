//! One loader per dashboard page. Each issues its fetches concurrently and
//! fails as a whole if any of them fails; no partial snapshot is returned.

use crate::analytics::{self, EventCounts};
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::{Event, Match, Player, PlayerPerformance, Team, TeamPerformance};

const PAGE_LIMIT: u32 = 100;
const ANALYTICS_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewSnapshot {
    pub total_events: usize,
    pub total_players: usize,
    pub total_teams: usize,
    /// Mean performance score, rounded to two decimals.
    pub average_performance: f64,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayersPage {
    pub players: Vec<Player>,
    pub performance: Vec<PlayerPerformance>,
}

impl PlayersPage {
    pub fn average_performance(&self) -> f64 {
        analytics::average_performance(&self.performance)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamsPage {
    pub teams: Vec<Team>,
    pub performance: Vec<TeamPerformance>,
}

impl TeamsPage {
    pub fn average_win_percentage(&self) -> f64 {
        analytics::average_win_percentage(&self.performance)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventsPage {
    pub events: Vec<Event>,
    pub upcoming: Vec<Event>,
}

impl EventsPage {
    pub fn counts(&self) -> EventCounts {
        EventCounts::from_events(&self.events, &self.upcoming)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchesPage {
    pub matches: Vec<Match>,
    pub upcoming: Vec<Match>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSnapshot {
    pub players: Vec<PlayerPerformance>,
    pub teams: Vec<TeamPerformance>,
    pub events: Vec<Event>,
}

impl AnalyticsSnapshot {
    pub fn average_performance(&self) -> f64 {
        analytics::average_performance(&self.players)
    }

    pub fn average_win_percentage(&self) -> f64 {
        analytics::average_win_percentage(&self.teams)
    }

    pub fn active_events(&self) -> usize {
        self.events.iter().filter(|e| e.is_active).count()
    }
}

impl ApiClient {
    pub async fn load_overview(&self) -> ApiResult<OverviewSnapshot> {
        let (events, players, teams, performance) = tokio::try_join!(
            self.fetch_events(PAGE_LIMIT),
            self.fetch_players(PAGE_LIMIT),
            self.fetch_teams(),
            self.fetch_player_performance(PAGE_LIMIT),
        )?;

        Ok(OverviewSnapshot {
            total_events: events.len(),
            total_players: players.len(),
            total_teams: teams.len(),
            average_performance: analytics::round2(analytics::average_performance(&performance)),
            events,
        })
    }

    pub async fn load_players_page(&self) -> ApiResult<PlayersPage> {
        let (players, performance) = tokio::try_join!(
            self.fetch_players(PAGE_LIMIT),
            self.fetch_player_performance(PAGE_LIMIT),
        )?;
        Ok(PlayersPage {
            players,
            performance,
        })
    }

    pub async fn load_teams_page(&self) -> ApiResult<TeamsPage> {
        let (teams, performance) =
            tokio::try_join!(self.fetch_teams(), self.fetch_team_performance())?;
        Ok(TeamsPage { teams, performance })
    }

    pub async fn load_events_page(&self) -> ApiResult<EventsPage> {
        let (events, upcoming) = tokio::try_join!(
            self.fetch_events(PAGE_LIMIT),
            self.fetch_upcoming_events(),
        )?;
        Ok(EventsPage { events, upcoming })
    }

    pub async fn load_matches_page(&self) -> ApiResult<MatchesPage> {
        let (matches, upcoming) =
            tokio::try_join!(self.fetch_matches(), self.fetch_upcoming_matches())?;
        Ok(MatchesPage { matches, upcoming })
    }

    pub async fn load_analytics(&self) -> ApiResult<AnalyticsSnapshot> {
        let (players, teams, events) = tokio::try_join!(
            self.fetch_player_performance(ANALYTICS_LIMIT),
            self.fetch_team_performance(),
            self.fetch_events(ANALYTICS_LIMIT),
        )?;
        Ok(AnalyticsSnapshot {
            players,
            teams,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    async fn mock(server: &mut ServerGuard, path: &str, status: usize, body: &str) {
        server
            .mock("GET", Matcher::Regex(format!(r"^{path}(\?.*)?$")))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn overview_totals_and_rounded_average() {
        let mut server = Server::new_async().await;
        mock(
            &mut server,
            "/api/events",
            200,
            r#"{"status":"success","message":"ok","data":[{"id":"e1","name":"Cup","start_date":"2025-01-01"}]}"#,
        )
        .await;
        mock(
            &mut server,
            "/api/players",
            200,
            r#"{"status":"success","message":"ok","data":[{"id":"p1","gamertag":"A"},{"id":"p2","gamertag":"B"}]}"#,
        )
        .await;
        mock(&mut server, "/api/teams", 200, r#"{"status":"success","message":"ok"}"#).await;
        mock(
            &mut server,
            "/api/views/player-performance",
            200,
            r#"{"status":"success","message":"ok","data":{"data":[
                {"id":"p1","gamertag":"A","avg_performance_score":"70.111"},
                {"id":"p2","gamertag":"B","avg_performance_score":80}]}}"#,
        )
        .await;

        let client = ApiClient::with_base_url(server.url());
        let overview = client.load_overview().await.unwrap();
        assert_eq!(overview.total_events, 1);
        assert_eq!(overview.total_players, 2);
        assert_eq!(overview.total_teams, 0);
        assert_eq!(overview.average_performance, 75.06);
    }

    #[tokio::test]
    async fn one_failed_fetch_fails_the_whole_batch() {
        let mut server = Server::new_async().await;
        mock(
            &mut server,
            "/api/players",
            200,
            r#"{"status":"success","message":"ok","data":[{"id":"p1","gamertag":"A"}]}"#,
        )
        .await;
        mock(
            &mut server,
            "/api/events",
            200,
            r#"{"status":"success","message":"ok","data":[]}"#,
        )
        .await;
        mock(
            &mut server,
            "/api/teams",
            500,
            r#"{"status":"error","message":"teams unavailable"}"#,
        )
        .await;
        mock(
            &mut server,
            "/api/views/player-performance",
            200,
            r#"{"status":"success","message":"ok","data":{"data":[]}}"#,
        )
        .await;

        let client = ApiClient::with_base_url(server.url());
        let err = client.load_overview().await.unwrap_err();
        assert_eq!(err.to_string(), "teams unavailable");
    }

    #[tokio::test]
    async fn events_page_counts_active_and_upcoming() {
        let mut server = Server::new_async().await;
        mock(
            &mut server,
            "/api/events",
            200,
            r#"{"status":"success","message":"ok","data":[
                {"id":"e1","name":"A","start_date":"2025-01-01","is_active":true},
                {"id":"e2","name":"B","start_date":"2024-01-01","is_active":false}]}"#,
        )
        .await;
        mock(
            &mut server,
            "/api/views/upcoming-events",
            200,
            r#"{"status":"success","message":"ok","data":[
                {"id":"e3","name":"C","start_date":"2026-01-01"}]}"#,
        )
        .await;

        let client = ApiClient::with_base_url(server.url());
        let counts = client.load_events_page().await.unwrap().counts();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.active, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.upcoming, 1);
    }

    #[tokio::test]
    async fn teams_page_average_uses_reported_percentages() {
        let mut server = Server::new_async().await;
        mock(
            &mut server,
            "/api/teams",
            200,
            r#"{"status":"success","message":"ok","data":[{"id":"t1","name":"Cats"}]}"#,
        )
        .await;
        mock(
            &mut server,
            "/api/views/team-performance",
            200,
            r#"{"status":"success","message":"ok","data":[
                {"team_id":"t1","team_name":"Cats","win_percentage":"70"},
                {"team_id":"t2","team_name":"Dogs","win_percentage":30}]}"#,
        )
        .await;

        let client = ApiClient::with_base_url(server.url());
        let page = client.load_teams_page().await.unwrap();
        assert_eq!(page.teams.len(), 1);
        assert_eq!(page.average_win_percentage(), 50.0);
    }
}
