use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::messages::{NetworkRequest, PageData};
use bodega_api::Health;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MenuItem {
    #[default]
    Overview,
    Players,
    Teams,
    Events,
    Matches,
    Analytics,
    Search,
    Help,
}

impl MenuItem {
    /// Tabs in tab-bar order; Help is reached with `?` only.
    pub const TABS: [MenuItem; 7] = [
        MenuItem::Overview,
        MenuItem::Players,
        MenuItem::Teams,
        MenuItem::Events,
        MenuItem::Matches,
        MenuItem::Analytics,
        MenuItem::Search,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::Overview => "Overview",
            MenuItem::Players => "Players",
            MenuItem::Teams => "Teams",
            MenuItem::Events => "Events",
            MenuItem::Matches => "Matches",
            MenuItem::Analytics => "Analytics",
            MenuItem::Search => "Search",
            MenuItem::Help => "Help",
        }
    }

    /// `'1'` is the first tab.
    pub fn from_digit(c: char) -> Option<Self> {
        let index = c.to_digit(10)?.checked_sub(1)? as usize;
        Self::TABS.get(index).copied()
    }

    pub fn index(self) -> Option<usize> {
        Self::TABS.iter().position(|t| *t == self)
    }

    pub fn has_loader(self) -> bool {
        !matches!(self, MenuItem::Search | MenuItem::Help)
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_page_loaded(&mut self, data: PageData) {
        self.state.store(data);
    }

    pub fn on_health_checked(&mut self, health: Health) {
        self.state.health = Some(health);
    }

    pub fn on_error(&mut self, tab: MenuItem, message: String) {
        self.state.errors.insert(tab, message);
    }

    // -----------------------------------------------------------------------
    // Tab management. Each returns the request the switch implies.
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) -> Option<NetworkRequest> {
        if self.state.active_tab == next {
            return None;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.scroll_offset = 0;

        if next.has_loader() {
            Some(NetworkRequest::Load { tab: next })
        } else {
            Some(NetworkRequest::Cancel)
        }
    }

    pub fn exit_help(&mut self) -> Option<NetworkRequest> {
        if self.state.active_tab == MenuItem::Help {
            self.update_tab(self.state.previous_tab)
        } else {
            None
        }
    }

    pub fn refresh(&self) -> Option<NetworkRequest> {
        let tab = self.state.active_tab;
        if tab.has_loader() {
            return Some(NetworkRequest::Load { tab });
        }
        match tab {
            MenuItem::Search => self
                .state
                .search
                .query
                .clone()
                .map(|query| NetworkRequest::Search { query }),
            _ => None,
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Table navigation
    // -----------------------------------------------------------------------

    pub fn scroll_down(&mut self) {
        let max = self
            .state
            .row_count(self.state.active_tab)
            .saturating_sub(1)
            .min(u16::MAX as usize) as u16;
        self.state.scroll_offset = (self.state.scroll_offset + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.state.scroll_offset = self.state.scroll_offset.saturating_sub(1);
    }

    pub fn next_metric(&mut self) {
        self.state.metric = self.state.metric.next();
    }

    pub fn prev_metric(&mut self) {
        self.state.metric = self.state.metric.prev();
    }

    // -----------------------------------------------------------------------
    // Search input
    // -----------------------------------------------------------------------

    pub fn start_search_input(&mut self) {
        self.state.search.start();
    }

    pub fn cancel_search_input(&mut self) {
        self.state.search.cancel();
    }

    pub fn submit_search(&mut self) -> Option<NetworkRequest> {
        self.state.scroll_offset = 0;
        self.state
            .search
            .submit()
            .map(|query| NetworkRequest::Search { query })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_api::analytics::Metric;
    use bodega_api::dashboard::PlayersPage;
    use bodega_api::PlayerPerformance;

    fn app() -> App {
        App::new(AppSettings::default())
    }

    #[test]
    fn digits_map_to_tabs() {
        assert_eq!(MenuItem::from_digit('1'), Some(MenuItem::Overview));
        assert_eq!(MenuItem::from_digit('7'), Some(MenuItem::Search));
        assert_eq!(MenuItem::from_digit('0'), None);
        assert_eq!(MenuItem::from_digit('8'), None);
        assert_eq!(MenuItem::Help.index(), None);
    }

    #[test]
    fn switching_to_a_data_tab_requests_its_load() {
        let mut app = app();
        assert_eq!(
            app.update_tab(MenuItem::Teams),
            Some(NetworkRequest::Load { tab: MenuItem::Teams })
        );
        assert_eq!(app.update_tab(MenuItem::Teams), None);
        assert_eq!(app.state.previous_tab, MenuItem::Overview);
    }

    #[test]
    fn leaving_for_help_or_search_cancels_the_load() {
        let mut app = app();
        app.update_tab(MenuItem::Players);
        assert_eq!(app.update_tab(MenuItem::Help), Some(NetworkRequest::Cancel));
        assert_eq!(
            app.exit_help(),
            Some(NetworkRequest::Load { tab: MenuItem::Players })
        );
        assert_eq!(app.update_tab(MenuItem::Search), Some(NetworkRequest::Cancel));
    }

    #[test]
    fn refresh_on_search_repeats_last_query() {
        let mut app = app();
        app.update_tab(MenuItem::Search);
        assert_eq!(app.refresh(), None);

        app.start_search_input();
        app.state.search.input = "bodega".into();
        assert_eq!(
            app.submit_search(),
            Some(NetworkRequest::Search { query: "bodega".into() })
        );
        assert_eq!(
            app.refresh(),
            Some(NetworkRequest::Search { query: "bodega".into() })
        );
    }

    #[test]
    fn scrolling_is_clamped_to_rows() {
        let mut app = app();
        app.update_tab(MenuItem::Players);
        app.scroll_down();
        assert_eq!(app.state.scroll_offset, 0);

        app.on_page_loaded(PageData::Players(PlayersPage {
            players: vec![],
            performance: vec![PlayerPerformance::default(); 3],
        }));
        for _ in 0..5 {
            app.scroll_down();
        }
        assert_eq!(app.state.scroll_offset, 2);
        app.scroll_up();
        assert_eq!(app.state.scroll_offset, 1);
    }

    #[test]
    fn errors_are_kept_per_tab() {
        let mut app = app();
        app.on_error(MenuItem::Matches, "HTTP error: 502".into());
        assert_eq!(
            app.state.errors.get(&MenuItem::Matches).map(String::as_str),
            Some("HTTP error: 502")
        );
        assert!(app.state.errors.get(&MenuItem::Overview).is_none());
    }

    #[test]
    fn metric_cycles() {
        let mut app = app();
        assert_eq!(app.state.metric, Metric::Performance);
        app.next_metric();
        assert_eq!(app.state.metric, Metric::RankScore);
        app.prev_metric();
        app.prev_metric();
        assert_eq!(app.state.metric, Metric::Blocks);
    }
}
