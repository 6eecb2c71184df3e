use crate::app::MenuItem;
use crate::state::messages::PageData;
use bodega_api::analytics::Metric;
use bodega_api::dashboard::{
    AnalyticsSnapshot, EventsPage, MatchesPage, OverviewSnapshot, PlayersPage, TeamsPage,
};
use bodega_api::{Health, SearchResults};
use chrono::Local;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Search input
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SearchState {
    pub input: String,
    pub composing: bool,
    /// Last query sent to the API.
    pub query: Option<String>,
    pub results: Option<SearchResults>,
}

impl SearchState {
    pub fn start(&mut self) {
        self.composing = true;
    }

    pub fn cancel(&mut self) {
        self.composing = false;
        self.input.clear();
    }

    /// Finish composing. Returns the trimmed query unless it is blank.
    pub fn submit(&mut self) -> Option<String> {
        self.composing = false;
        let query = self.input.trim().to_owned();
        if query.is_empty() {
            self.input.clear();
            return None;
        }
        self.query = Some(query.clone());
        Some(query)
    }
}

// ---------------------------------------------------------------------------
// Whole-app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub scroll_offset: u16,
    /// Metric used to rank players on the Players and Analytics tabs.
    pub metric: Metric,

    pub overview: Option<OverviewSnapshot>,
    pub players: Option<PlayersPage>,
    pub teams: Option<TeamsPage>,
    pub events: Option<EventsPage>,
    pub matches: Option<MatchesPage>,
    pub analytics: Option<AnalyticsSnapshot>,
    pub search: SearchState,

    pub health: Option<Health>,
    /// Last failure per tab, cleared by the next successful load.
    pub errors: HashMap<MenuItem, String>,
    pub loaded_at: HashMap<MenuItem, String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, data: PageData) {
        let tab = data.tab();
        match data {
            PageData::Overview(snapshot) => self.overview = Some(snapshot),
            PageData::Players(page) => self.players = Some(page),
            PageData::Teams(page) => self.teams = Some(page),
            PageData::Events(page) => self.events = Some(page),
            PageData::Matches(page) => self.matches = Some(page),
            PageData::Analytics(snapshot) => self.analytics = Some(snapshot),
            PageData::Search { query, results } => {
                self.search.query = Some(query);
                self.search.results = Some(results);
            }
        }
        self.errors.remove(&tab);
        self.loaded_at
            .insert(tab, Local::now().format("%H:%M:%S").to_string());
    }

    pub fn has_data(&self, tab: MenuItem) -> bool {
        match tab {
            MenuItem::Overview => self.overview.is_some(),
            MenuItem::Players => self.players.is_some(),
            MenuItem::Teams => self.teams.is_some(),
            MenuItem::Events => self.events.is_some(),
            MenuItem::Matches => self.matches.is_some(),
            MenuItem::Analytics => self.analytics.is_some(),
            MenuItem::Search => self.search.results.is_some(),
            MenuItem::Help => true,
        }
    }

    /// Rows in the tab's main table, used to clamp scrolling.
    pub fn row_count(&self, tab: MenuItem) -> usize {
        match tab {
            MenuItem::Overview => self.overview.as_ref().map_or(0, |o| o.events.len()),
            MenuItem::Players => self.players.as_ref().map_or(0, |p| p.performance.len()),
            MenuItem::Teams => self.teams.as_ref().map_or(0, |t| t.performance.len()),
            MenuItem::Events => self.events.as_ref().map_or(0, |e| e.events.len()),
            MenuItem::Matches => self.matches.as_ref().map_or(0, |m| m.matches.len()),
            MenuItem::Analytics => self.analytics.as_ref().map_or(0, |a| a.teams.len()),
            MenuItem::Search => self
                .search
                .results
                .as_ref()
                .map_or(0, |r| r.players.len() + r.teams.len()),
            MenuItem::Help => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_api::{Event, Player};

    #[test]
    fn submit_trims_and_rejects_blank_queries() {
        let mut search = SearchState::default();
        search.start();
        search.input = "   ".into();
        assert_eq!(search.submit(), None);
        assert!(search.input.is_empty());
        assert!(!search.composing);

        search.start();
        search.input = "  stray cat ".into();
        assert_eq!(search.submit().as_deref(), Some("stray cat"));
        assert_eq!(search.query.as_deref(), Some("stray cat"));
    }

    #[test]
    fn storing_a_page_clears_its_error() {
        let mut state = AppState::new();
        state.errors.insert(MenuItem::Events, "boom".into());
        state.errors.insert(MenuItem::Teams, "still broken".into());

        state.store(PageData::Events(EventsPage {
            events: vec![Event { id: "e1".into(), ..Default::default() }],
            upcoming: vec![],
        }));

        assert!(state.has_data(MenuItem::Events));
        assert!(!state.errors.contains_key(&MenuItem::Events));
        assert!(state.errors.contains_key(&MenuItem::Teams));
        assert!(state.loaded_at.contains_key(&MenuItem::Events));
        assert_eq!(state.row_count(MenuItem::Events), 1);
    }

    #[test]
    fn search_results_count_players_and_teams() {
        let mut state = AppState::new();
        assert!(!state.has_data(MenuItem::Search));
        state.store(PageData::Search {
            query: "cat".into(),
            results: SearchResults {
                players: vec![Player::default(), Player::default()],
                teams: vec![Default::default()],
            },
        });
        assert_eq!(state.row_count(MenuItem::Search), 3);
        assert_eq!(state.search.query.as_deref(), Some("cat"));
    }
}
