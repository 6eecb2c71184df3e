pub mod analytics;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod queries;
pub mod repository;
pub mod table;
pub mod wire;

pub use client::{ApiClient, Method};
pub use config::Config;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use wire::{Numeric, safe_number};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain records returned by the league API.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub gamertag: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub current_team_id: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub player_rp: Numeric,
    #[serde(default)]
    pub player_rank_score: Numeric,
    #[serde(default)]
    pub salary_tier: Option<String>,
    #[serde(default)]
    pub monthly_value: Numeric,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Row of the player-performance view: player identity plus per-game averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPerformance {
    pub id: String,
    pub gamertag: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub current_team_id: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub player_rp: Numeric,
    #[serde(default)]
    pub player_rank_score: Numeric,
    #[serde(default)]
    pub salary_tier: Option<String>,
    #[serde(default)]
    pub monthly_value: Numeric,
    #[serde(default)]
    pub games_played: Numeric,
    #[serde(default)]
    pub avg_points: Numeric,
    #[serde(default)]
    pub avg_assists: Numeric,
    #[serde(default)]
    pub avg_rebounds: Numeric,
    #[serde(default)]
    pub avg_steals: Numeric,
    #[serde(default)]
    pub avg_blocks: Numeric,
    #[serde(default)]
    pub avg_performance_score: Numeric,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPerformance {
    pub team_id: String,
    pub team_name: String,
    #[serde(default)]
    pub total_matches: Numeric,
    #[serde(default)]
    pub total_wins: Numeric,
    #[serde(default)]
    pub total_losses: Numeric,
    #[serde(default)]
    pub win_percentage: Numeric,
    #[serde(default)]
    pub points_scored: Numeric,
    #[serde(default)]
    pub points_allowed: Numeric,
    #[serde(default)]
    pub average_points_scored: Numeric,
}

impl TeamPerformance {
    /// Win percentage derived from wins and losses rather than trusted from the view.
    pub fn computed_win_percentage(&self) -> f64 {
        analytics::win_percentage(self.total_wins.value(), self.total_losses.value())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Stored flag; never derived from the dates.
    #[serde(default)]
    pub is_active: bool,
}

impl Event {
    pub fn starts_on(&self) -> Option<NaiveDate> {
        parse_date(&self.start_date)
    }

    pub fn ends_on(&self) -> Option<NaiveDate> {
        self.end_date.as_deref().and_then(parse_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub event_id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub match_date: String,
    pub status: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A match joined with team names and the final or running score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub id: String,
    pub event_id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub match_date: String,
    pub status: String,
    #[serde(default)]
    pub venue: Option<String>,
    pub home_team_name: String,
    pub away_team_name: String,
    #[serde(default)]
    pub home_score: Numeric,
    #[serde(default)]
    pub away_score: Numeric,
}

impl MatchDetails {
    pub fn scoreline(&self) -> String {
        format!(
            "{} {:.0} - {:.0} {}",
            self.home_team_name, self.home_score, self.away_score, self.away_team_name
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.teams.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

impl Health {
    /// Stand-in reported when `/health` answers without data.
    pub fn unreachable() -> Self {
        Self {
            status: "error".into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy" | "success")
    }
}

/// Parse either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .or_else(|| {
            raw.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn player_accepts_string_and_numeric_scores() {
        let player: Player = serde_json::from_value(json!({
            "id": "p1",
            "gamertag": "StrayCat",
            "position": null,
            "current_team_id": null,
            "player_rp": 1200,
            "player_rank_score": "456.7"
        }))
        .unwrap();
        assert_eq!(player.player_rp.value(), 1200.0);
        assert_eq!(player.player_rank_score.value(), 456.7);
        assert!(player.current_team_id.is_none());
        assert!(player.monthly_value.is_missing());
    }

    #[test]
    fn event_type_maps_from_reserved_word() {
        let event: Event = serde_json::from_value(json!({
            "id": "e1",
            "name": "Summer Major",
            "start_date": "2025-06-01",
            "type": "Tournament",
            "is_active": true
        }))
        .unwrap();
        assert_eq!(event.event_type.as_deref(), Some("Tournament"));
        assert!(event.is_active);
        assert_eq!(event.starts_on(), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(event.ends_on(), None);
    }

    #[test]
    fn parse_date_handles_timestamps_and_garbage() {
        assert_eq!(
            parse_date("2025-03-04T18:30:00+00:00"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(
            parse_date("2025-03-04 18:30:00"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn computed_win_percentage_uses_wins_and_losses() {
        let team = TeamPerformance {
            team_id: "t1".into(),
            team_name: "Bodega Cats".into(),
            total_wins: Numeric::from(7.0),
            total_losses: Numeric::from("3"),
            ..Default::default()
        };
        assert_eq!(team.computed_win_percentage(), 70.0);
    }

    #[test]
    fn scoreline_formats_whole_numbers() {
        let details = MatchDetails {
            home_team_name: "Cats".into(),
            away_team_name: "Dogs".into(),
            home_score: Numeric::from("88"),
            away_score: Numeric::from(79.0),
            ..Default::default()
        };
        assert_eq!(details.scoreline(), "Cats 88 - 79 Dogs");
    }

    #[test]
    fn health_defaults_to_error() {
        let health = Health::unreachable();
        assert_eq!(health.status, "error");
        assert!(!health.is_ok());
        assert!(DateTime::parse_from_rfc3339(&health.timestamp).is_ok());
    }
}
