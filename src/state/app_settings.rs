use log::LevelFilter;

pub const LOG_ENV: &str = "BODEGA_LOG";

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
}

impl AppSettings {
    pub fn load() -> Self {
        Self {
            full_screen: false,
            log_level: std::env::var(LOG_ENV).ok().as_deref().and_then(parse_log_level),
        }
    }
}

/// `error`, `warn`, `info`, `debug`, `trace` or `off`, any case.
pub fn parse_log_level(raw: &str) -> Option<LevelFilter> {
    raw.trim().parse().ok()
}
