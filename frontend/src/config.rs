use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;

/// Scheduling preferences applied to chat lookups
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub working_hours_start: NaiveTime,
    pub working_hours_end: NaiveTime,
    pub default_duration_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            working_hours_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            working_hours_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            default_duration_minutes: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the booking API
    pub backend_url: String,
    /// Directory holding the chat page; the embedded copy is served when absent
    pub static_dir: PathBuf,
    pub backend_timeout: Duration,
    pub settings: Settings,
}

fn hours_var(name: &str) -> Option<NaiveTime> {
    env::var(name)
        .ok()
        .and_then(|v| NaiveTime::parse_from_str(v.trim(), "%H:%M").ok())
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Settings::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8501),
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            backend_timeout: Duration::from_secs(
                env::var("BACKEND_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .filter(|t: &u64| *t > 0)
                    .unwrap_or(10),
            ),
            settings: Settings {
                working_hours_start: hours_var("WORKING_HOURS_START")
                    .unwrap_or(defaults.working_hours_start),
                working_hours_end: hours_var("WORKING_HOURS_END")
                    .unwrap_or(defaults.working_hours_end),
                default_duration_minutes: env::var("DEFAULT_DURATION_MINUTES")
                    .ok()
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(defaults.default_duration_minutes),
            },
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = self.backend_url.trim();
        if url.is_empty() {
            return Err("BACKEND_URL cannot be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("BACKEND_URL must be an http(s) URL, got {}", url));
        }
        if self.settings.working_hours_end <= self.settings.working_hours_start {
            return Err("WORKING_HOURS_END must be after WORKING_HOURS_START".to_string());
        }
        if self.settings.default_duration_minutes <= 0 {
            return Err("DEFAULT_DURATION_MINUTES must be positive".to_string());
        }
        Ok(())
    }
}
