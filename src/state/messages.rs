use crate::app::MenuItem;
use crate::state::network::LoadingState;
use bodega_api::dashboard::{
    AnalyticsSnapshot, EventsPage, MatchesPage, OverviewSnapshot, PlayersPage, TeamsPage,
};
use bodega_api::{Health, SearchResults};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    /// Load the data behind a tab, superseding any load still in flight.
    Load { tab: MenuItem },
    Search { query: String },
    /// Abandon the current load without starting another.
    Cancel,
    CheckHealth,
}

#[derive(Debug)]
pub enum PageData {
    Overview(OverviewSnapshot),
    Players(PlayersPage),
    Teams(TeamsPage),
    Events(EventsPage),
    Matches(MatchesPage),
    Analytics(AnalyticsSnapshot),
    Search { query: String, results: SearchResults },
}

impl PageData {
    pub fn tab(&self) -> MenuItem {
        match self {
            PageData::Overview(_) => MenuItem::Overview,
            PageData::Players(_) => MenuItem::Players,
            PageData::Teams(_) => MenuItem::Teams,
            PageData::Events(_) => MenuItem::Events,
            PageData::Matches(_) => MenuItem::Matches,
            PageData::Analytics(_) => MenuItem::Analytics,
            PageData::Search { .. } => MenuItem::Search,
        }
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    PageLoaded { data: PageData },
    HealthChecked { health: Health },
    Error { tab: MenuItem, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
