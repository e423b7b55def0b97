//! Per-session dashboard state.
//!
//! One instance lives for the whole shell run and is mutated only by the
//! loop that owns it; nothing here survives a restart.

use helio_solar::{Plant, PlantSnapshot};
use helio_weather::{ForecastTables, PlaceRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Explicit session context passed to each shell action.
#[derive(Debug)]
pub struct SessionContext {
    pub places: PlaceRegistry,
    /// Index into `places` of the currently selected entry.
    pub selected: usize,
    /// Tables from the most recent forecast query.
    pub tables: Option<ForecastTables>,

    pub account: String,
    pub password: String,
    pub token: Option<String>,
    pub plants: Vec<Plant>,
    pub snapshot: Option<PlantSnapshot>,

    pub transcript: Vec<ChatMessage>,
}

impl SessionContext {
    pub fn new(places: PlaceRegistry) -> Self {
        Self {
            places,
            selected: 0,
            tables: None,
            account: String::new(),
            password: String::new(),
            token: None,
            plants: Vec::new(),
            snapshot: None,
            transcript: Vec::new(),
        }
    }

    pub fn push_message(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    /// End the portal session: clears the fixed key set (token, plants,
    /// snapshot, transcript), and optionally the typed credentials.
    pub fn logout(&mut self, clear_credentials: bool) {
        self.token = None;
        self.plants.clear();
        self.snapshot = None;
        self.transcript.clear();
        if clear_credentials {
            self.account.clear();
            self.password.clear();
        }
    }
}
