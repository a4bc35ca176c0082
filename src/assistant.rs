//! Health assistant chat
//!
//! The assistant answers every message with one of a fixed set of canned
//! responses. The transcript lives only as long as the assistant.

use crate::error::DashboardError;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Replies the assistant picks from
pub const CANNED_RESPONSES: [&str; 8] = [
    "Based on your health data, I recommend increasing your daily hydration.",
    "Your sleep patterns suggest you could benefit from a more consistent sleep schedule.",
    "I've analyzed your activity data and noticed you're most active on weekdays. Consider adding light exercises on weekends too.",
    "Your heart rate variability has improved over the past week, which is a positive sign of recovery.",
    "Would you like me to help you set up a personalized health goal based on your recent metrics?",
    "I notice your stress levels tend to peak in the afternoons. Have you considered short meditation breaks?",
    "Your blood pressure readings are within a healthy range. Keep up the good work!",
    "Is there anything specific about your health data you'd like me to explain?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

pub struct HealthAssistant<R> {
    rng: R,
    transcript: Vec<ChatMessage>,
    last_id: i64,
}

impl HealthAssistant<StdRng> {
    /// Assistant with reproducible replies
    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> HealthAssistant<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            transcript: Vec::new(),
            last_id: 0,
        }
    }

    /// Record the user's message and return the assistant's reply
    pub fn send(&mut self, text: &str) -> Result<&ChatMessage, DashboardError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DashboardError::EmptyMessage);
        }

        let now = Utc::now();
        let question = self.message(text, Sender::User, now);
        self.transcript.push(question);

        let content = CANNED_RESPONSES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(CANNED_RESPONSES[0]);
        let reply = self.message(content, Sender::Ai, now);
        debug!(reply_id = %reply.id, "assistant replied");
        self.transcript.push(reply);

        Ok(&self.transcript[self.transcript.len() - 1])
    }

    /// Every message exchanged so far, oldest first
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    fn message(&mut self, content: &str, sender: Sender, now: DateTime<Utc>) -> ChatMessage {
        self.last_id = now.timestamp_millis().max(self.last_id + 1);
        ChatMessage {
            id: self.last_id.to_string(),
            content: content.to_string(),
            sender,
            timestamp: now,
        }
    }
}
