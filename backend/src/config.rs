use std::env;
use std::str::FromStr;

/// Which calendar the API books against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarProviderKind {
    /// In-process calendar, lost on restart
    Memory,
    /// Google Calendar v3 REST API
    Google,
}

impl FromStr for CalendarProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(CalendarProviderKind::Memory),
            "google" => Ok(CalendarProviderKind::Google),
            _ => Err(format!("Unknown calendar provider: {}", s)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub calendar_provider: CalendarProviderKind,
    /// Calendar to book against (Google calendar ID, or a label for the memory store)
    pub calendar_id: String,
    pub google_api_url: String,
    /// OAuth bearer token with the calendar scope
    pub google_access_token: Option<String>,
    /// Events per page returned by the in-memory listing
    pub memory_page_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            calendar_provider: env::var("CALENDAR_PROVIDER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(CalendarProviderKind::Memory),
            calendar_id: env::var("CALENDAR_ID").unwrap_or_else(|_| "primary".to_string()),
            google_api_url: env::var("GOOGLE_CALENDAR_API_URL")
                .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string()),
            google_access_token: env::var("GOOGLE_ACCESS_TOKEN").ok(),
            memory_page_size: env::var("MEMORY_PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(250),
        }
    }

    /// Check that the selected provider has what it needs
    pub fn validate(&self) -> Result<(), String> {
        if self.calendar_id.trim().is_empty() {
            return Err("CALENDAR_ID cannot be empty".to_string());
        }
        if self.calendar_provider == CalendarProviderKind::Google
            && self.google_access_token.is_none()
        {
            return Err("GOOGLE_ACCESS_TOKEN must be set for the google provider".to_string());
        }
        Ok(())
    }
}
