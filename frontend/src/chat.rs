//! Chat service
//!
//! Holds one [`Conversation`] per session and carries out the backend calls
//! its turns ask for. Idle sessions are dropped when a new one starts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::client::{BackendClient, SlotSuggestion};
use crate::config::Settings;
use crate::conversation::{AgentReply, BookingDetails, Conversation, Turn};
use crate::error::ClientError;

/// Slots listed in one chat reply
const MAX_LISTED_SLOTS: usize = 8;

const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub reply: AgentReply,
}

struct Session {
    conversation: Conversation,
    last_seen: Instant,
}

pub struct ChatService {
    client: BackendClient,
    settings: Settings,
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl ChatService {
    pub fn new(client: BackendClient, settings: Settings) -> Self {
        Self {
            client,
            settings,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: SESSION_IDLE_TIMEOUT,
            max_sessions: MAX_SESSIONS,
        }
    }

    #[cfg(test)]
    fn with_session_limits(mut self, idle_timeout: Duration, max_sessions: usize) -> Self {
        self.idle_timeout = idle_timeout;
        self.max_sessions = max_sessions;
        self
    }

    /// Run one conversation turn, starting a new session when none is given
    pub async fn handle(&self, session_id: Option<Uuid>, message: &str) -> ChatResponse {
        self.handle_on(session_id, message, Utc::now().date_naive())
            .await
    }

    async fn handle_on(
        &self,
        session_id: Option<Uuid>,
        message: &str,
        today: NaiveDate,
    ) -> ChatResponse {
        let session_id = session_id.unwrap_or_else(Uuid::new_v4);

        let turn = {
            let mut sessions = self.sessions.write().await;
            if !sessions.contains_key(&session_id) {
                self.make_room(&mut sessions);
            }

            let session = sessions.entry(session_id).or_insert_with(|| Session {
                conversation: Conversation::default(),
                last_seen: Instant::now(),
            });
            session.last_seen = Instant::now();
            session.conversation.respond(message, today)
        };

        let reply = match turn {
            Turn::Reply(reply) => reply,
            Turn::FindSlots { day } => self.free_slots_reply(day).await,
            Turn::Book(booking) => self.book(session_id, booking).await,
        };

        ChatResponse { session_id, reply }
    }

    /// Drop idle sessions, then the least recently seen ones over the cap
    fn make_room(&self, sessions: &mut HashMap<Uuid, Session>) {
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen.elapsed() < self.idle_timeout);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => sessions.remove(&id),
                None => break,
            };
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "Evicted chat sessions");
        }
    }

    /// Free slots on `day` within working hours
    pub async fn free_slots(
        &self,
        day: NaiveDate,
        duration_minutes: i64,
    ) -> Result<Vec<SlotSuggestion>, ClientError> {
        let start = day.and_time(self.settings.working_hours_start).and_utc();
        let end = day.and_time(self.settings.working_hours_end).and_utc();

        self.client
            .suggest_slots(&start.to_rfc3339(), &end.to_rfc3339(), duration_minutes)
            .await
    }

    pub fn default_duration(&self) -> i64 {
        self.settings.default_duration_minutes
    }

    async fn free_slots_reply(&self, day: NaiveDate) -> AgentReply {
        let duration = self.settings.default_duration_minutes;
        let label = day.format("%A %-d %B").to_string();

        let slots = match self.free_slots(day, duration).await {
            Ok(slots) => slots,
            Err(e) => {
                return AgentReply::failure(
                    "Sorry, I couldn't check your calendar right now. Please try again.",
                    e,
                )
            }
        };

        if slots.is_empty() {
            return AgentReply::text(format!("You're fully booked on {}.", label));
        }

        let mut output = format!("Free {}-minute slots on {}:", duration, label);
        for slot in slots.iter().take(MAX_LISTED_SLOTS) {
            output.push_str(&format!(
                "\n- {} - {}",
                clock_time(&slot.start),
                clock_time(&slot.end)
            ));
        }
        if slots.len() > MAX_LISTED_SLOTS {
            output.push_str(&format!("\n...and {} more", slots.len() - MAX_LISTED_SLOTS));
        }

        AgentReply::text(output).with_suggestions(&["Book a meeting"])
    }

    async fn book(&self, session_id: Uuid, booking: BookingDetails) -> AgentReply {
        match self.client.create_event(&booking).await {
            Ok(created) => {
                tracing::info!(%session_id, event_id = %created.event_id, "Booking confirmed");
                AgentReply::text(format!(
                    "✅ Booking confirmed!\n\n📅 Event ID: {}\n🔗 {}",
                    created.event_id,
                    created.html_link.as_deref().unwrap_or("No link"),
                ))
            }
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "Booking failed");
                // Keep the booking so the user can confirm again
                if let Some(session) = self.sessions.write().await.get_mut(&session_id) {
                    session.conversation.await_confirmation(booking.clone());
                }

                AgentReply {
                    needs_confirmation: true,
                    booking_details: Some(booking),
                    ..AgentReply::failure(
                        "Sorry, I couldn't book your meeting. Reply 'confirm' to try again or 'cancel'.",
                        e,
                    )
                }
            }
        }
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// `HH:MM` of an RFC 3339 timestamp, or the raw text if it does not parse
fn clock_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
