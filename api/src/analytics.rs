//! Aggregates shown on the dashboard pages. Every numeric input goes through
//! [`Numeric::value`], so garbage and missing fields count as zero.

use crate::{Event, PlayerPerformance, TeamPerformance};
use std::cmp::Ordering;

/// Mean normalised `avg_performance_score`; `0` for an empty slice.
pub fn average_performance(players: &[PlayerPerformance]) -> f64 {
    mean(players.iter().map(|p| p.avg_performance_score.value()))
}

/// Mean normalised `win_percentage`; `0` for an empty slice.
pub fn average_win_percentage(teams: &[TeamPerformance]) -> f64 {
    mean(teams.iter().map(|t| t.win_percentage.value()))
}

/// `wins / (wins + losses) * 100`, or `0` with no decided matches.
pub fn win_percentage(wins: f64, losses: f64) -> f64 {
    let total = wins + losses;
    if total > 0.0 { wins / total * 100.0 } else { 0.0 }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Metric {
    Points,
    Assists,
    Rebounds,
    Steals,
    Blocks,
    #[default]
    Performance,
    RankScore,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Points,
        Metric::Assists,
        Metric::Rebounds,
        Metric::Steals,
        Metric::Blocks,
        Metric::Performance,
        Metric::RankScore,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Points => "Points",
            Metric::Assists => "Assists",
            Metric::Rebounds => "Rebounds",
            Metric::Steals => "Steals",
            Metric::Blocks => "Blocks",
            Metric::Performance => "Performance",
            Metric::RankScore => "Rank Score",
        }
    }

    pub fn of(self, p: &PlayerPerformance) -> f64 {
        match self {
            Metric::Points => p.avg_points.value(),
            Metric::Assists => p.avg_assists.value(),
            Metric::Rebounds => p.avg_rebounds.value(),
            Metric::Steals => p.avg_steals.value(),
            Metric::Blocks => p.avg_blocks.value(),
            Metric::Performance => p.avg_performance_score.value(),
            Metric::RankScore => p.player_rank_score.value(),
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The `n` best players by `metric`, highest first. Ties keep input order.
pub fn top_performers(
    players: &[PlayerPerformance],
    metric: Metric,
    n: usize,
) -> Vec<&PlayerPerformance> {
    let mut ranked: Vec<_> = players.iter().collect();
    ranked.sort_by(|a, b| descending(metric.of(a), metric.of(b)));
    ranked.truncate(n);
    ranked
}

/// The `n` best teams by reported win percentage, highest first.
pub fn top_teams(teams: &[TeamPerformance], n: usize) -> Vec<&TeamPerformance> {
    let mut ranked: Vec<_> = teams.iter().collect();
    ranked.sort_by(|a, b| descending(a.win_percentage.value(), b.win_percentage.value()));
    ranked.truncate(n);
    ranked
}

/// Full standings ranked by the record itself (wins over wins plus losses),
/// the figure the standings table shows.
pub fn standings(teams: &[TeamPerformance]) -> Vec<&TeamPerformance> {
    let mut ranked: Vec<_> = teams.iter().collect();
    ranked.sort_by(|a, b| descending(a.computed_win_percentage(), b.computed_win_percentage()));
    ranked
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub upcoming: usize,
}

impl EventCounts {
    /// Active and completed split on the stored `is_active` flag only.
    pub fn from_events(events: &[Event], upcoming: &[Event]) -> Self {
        let active = events.iter().filter(|e| e.is_active).count();
        Self {
            total: events.len(),
            active,
            completed: events.len() - active,
            upcoming: upcoming.len(),
        }
    }
}
