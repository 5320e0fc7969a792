//! Rule-based booking conversation
//!
//! A per-session state machine. Messages either answer the current question
//! of the booking form, confirm a prepared booking, or are matched against a
//! few intents (book, check availability). The machine never talks to the
//! backend itself: turns that need data come back as [`Turn::FindSlots`] or
//! [`Turn::Book`] for the caller to carry out.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::fields::{mentions_any, parse_attendees, parse_date, parse_duration, parse_time};

const BOOKING_WORDS: &[&str] = &["book", "schedul", "meeting", "appointment"];
const AVAILABILITY_WORDS: &[&str] = &["available", "availability", "free", "busy"];

const HELP_TEXT: &str = "I can help with:
- Booking meetings
- Checking availability
- Managing calendar events

Try commands like:
'Book a meeting'
'Am I free on Friday?'";

/// Booking ready to send to the API; times are UTC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub attendee_email: Option<String>,
    pub duration_minutes: i64,
}

impl BookingDetails {
    fn summary_text(&self) -> String {
        format!(
            "📅 {}\n🗓️ {} to {}\n⏱️ Duration: {} minutes\n👥 Attendees: {}",
            self.summary,
            self.start_time,
            self.end_time,
            self.duration_minutes,
            self.attendee_email.as_deref().unwrap_or("None specified"),
        )
    }
}

/// One reply shown in the chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentReply {
    pub output: String,
    pub needs_followup: bool,
    pub needs_confirmation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_details: Option<BookingDetails>,
    /// Quick replies the UI can offer as buttons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentReply {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Default::default()
        }
    }

    fn question(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            needs_followup: true,
            ..Default::default()
        }
    }

    fn confirmation(booking: BookingDetails) -> Self {
        Self {
            output: format!(
                "Ready to book:\n{}\n\nReply 'confirm' to book it, 'edit' to start over or 'cancel'.",
                booking.summary_text()
            ),
            needs_confirmation: true,
            booking_details: Some(booking),
            suggestions: vec!["confirm".into(), "edit".into(), "cancel".into()],
            ..Default::default()
        }
    }

    /// Apologetic reply for a failed backend call
    pub fn failure(output: impl Into<String>, error: impl ToString) -> Self {
        Self {
            output: output.into(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn with_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.suggestions = suggestions.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Booking form questions, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Title,
    Date,
    Time,
    Duration,
    Attendees,
}

impl Step {
    fn question(self) -> &'static str {
        match self {
            Step::Title => "What's the meeting about?",
            Step::Date => "What date should we meet? (e.g. tomorrow, Friday, 2025-03-14)",
            Step::Time => "What time? (e.g. 2pm, 11:30 AM, 14:00)",
            Step::Duration => "How long should it be? (e.g. 1 hour, 30 mins)",
            Step::Attendees => "Any attendees? (comma-separated emails, or 'none')",
        }
    }

    fn hint(self) -> &'static str {
        match self {
            Step::Title => "I need a title for the meeting.",
            Step::Date => "I couldn't understand that date.",
            Step::Time => "I couldn't understand that time.",
            Step::Duration => "I couldn't understand that duration.",
            Step::Attendees => "Those don't look like email addresses.",
        }
    }

    fn next(self) -> Option<Step> {
        match self {
            Step::Title => Some(Step::Date),
            Step::Date => Some(Step::Time),
            Step::Time => Some(Step::Duration),
            Step::Duration => Some(Step::Attendees),
            Step::Attendees => None,
        }
    }
}

/// Answers collected so far
#[derive(Debug, Clone, Default)]
struct Draft {
    title: Option<String>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    duration_minutes: Option<i64>,
    attendees: Option<String>,
}

impl Draft {
    /// Record the answer for `step`; false when it does not parse
    fn answer(&mut self, step: Step, text: &str, today: NaiveDate) -> bool {
        match step {
            Step::Title => {
                let title = text.trim();
                if title.is_empty() {
                    return false;
                }
                self.title = Some(title.to_string());
            }
            Step::Date => match parse_date(text, today) {
                Some(date) => self.date = Some(date),
                None => return false,
            },
            Step::Time => match parse_time(text) {
                Some(time) => self.time = Some(time),
                None => return false,
            },
            Step::Duration => match parse_duration(text) {
                Some(minutes) => self.duration_minutes = Some(minutes),
                None => return false,
            },
            Step::Attendees => match parse_attendees(text) {
                Some(attendees) => self.attendees = attendees,
                None => return false,
            },
        }
        true
    }

    fn into_booking(self) -> Option<BookingDetails> {
        let start = NaiveDateTime::new(self.date?, self.time?);
        let minutes = self.duration_minutes?;
        let end = start + Duration::minutes(minutes);

        Some(BookingDetails {
            summary: self.title?,
            start_time: utc_timestamp(start),
            end_time: utc_timestamp(end),
            attendee_email: self.attendees,
            duration_minutes: minutes,
        })
    }
}

fn utc_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Idle,
    Collecting {
        step: Step,
        draft: Draft,
    },
    AwaitingConfirmation(BookingDetails),
}

/// What the caller should do with a message
#[derive(Debug, Clone)]
pub enum Turn {
    /// Show this reply
    Reply(AgentReply),
    /// List free slots on this day, then reply
    FindSlots { day: NaiveDate },
    /// The user confirmed; create this event, then reply
    Book(BookingDetails),
}

/// One chat session
#[derive(Debug, Default)]
pub struct Conversation {
    state: State,
}

impl Conversation {
    /// Handle one user message. `today` anchors relative dates.
    pub fn respond(&mut self, message: &str, today: NaiveDate) -> Turn {
        let message = message.trim();
        let command = message.to_lowercase();

        match std::mem::take(&mut self.state) {
            State::Collecting { step, mut draft } => {
                if command == "cancel" {
                    return Turn::Reply(AgentReply::text("Okay, I've dropped that booking."));
                }

                if !draft.answer(step, message, today) {
                    let reply = format!("{} {}", step.hint(), step.question());
                    self.state = State::Collecting { step, draft };
                    return Turn::Reply(AgentReply::question(reply));
                }

                match step.next() {
                    Some(next) => {
                        self.state = State::Collecting { step: next, draft };
                        Turn::Reply(AgentReply::question(next.question()))
                    }
                    None => match draft.into_booking() {
                        Some(booking) => {
                            self.state = State::AwaitingConfirmation(booking.clone());
                            Turn::Reply(AgentReply::confirmation(booking))
                        }
                        // Every step stores its answer, so a finished form is complete
                        None => self.start_form("Something went wrong, let's start over."),
                    },
                }
            }

            State::AwaitingConfirmation(booking) => match command.as_str() {
                "confirm" | "yes" | "y" => Turn::Book(booking),
                "edit" | "no" | "n" => self.start_form("Let's start over."),
                "cancel" => Turn::Reply(AgentReply::text("Okay, I won't book it.")),
                _ => {
                    self.state = State::AwaitingConfirmation(booking.clone());
                    Turn::Reply(
                        AgentReply {
                            output: "Please reply 'confirm', 'edit' or 'cancel'.".to_string(),
                            needs_confirmation: true,
                            booking_details: Some(booking),
                            ..Default::default()
                        }
                        .with_suggestions(&["confirm", "edit", "cancel"]),
                    )
                }
            },

            State::Idle => {
                if mentions_any(&command, BOOKING_WORDS) {
                    return self.start_form("I'll help schedule that meeting.");
                }

                if mentions_any(&command, AVAILABILITY_WORDS) {
                    return match parse_date(&command, today) {
                        Some(day) => Turn::FindSlots { day },
                        None => Turn::Reply(AgentReply::text(
                            "Which day should I check? (e.g. tomorrow, Friday, 2025-03-14)",
                        )),
                    };
                }

                Turn::Reply(
                    AgentReply::text(HELP_TEXT)
                        .with_suggestions(&["Book a meeting", "Am I free tomorrow?"]),
                )
            }
        }
    }

    /// Put a booking back up for confirmation after the API rejected it
    pub fn await_confirmation(&mut self, booking: BookingDetails) {
        self.state = State::AwaitingConfirmation(booking);
    }

    fn start_form(&mut self, preamble: &str) -> Turn {
        self.state = State::Collecting {
            step: Step::Title,
            draft: Draft::default(),
        };
        Turn::Reply(AgentReply::question(format!(
            "{} {}",
            preamble,
            Step::Title.question()
        )))
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    #[cfg(test)]
    fn current_step(&self) -> Option<Step> {
        match self.state {
            State::Collecting { step, .. } => Some(step),
            _ => None,
        }
    }
}
