//! Session-keyed chat log relayed to the text model.
//!
//! A session id is the user's nickname; it is a lookup key, not a credential.

use crate::models::{
    ChatMessage, ChatSession, Profile, ProfileResponse, Role, SessionStatsResponse,
};
use serde_json::{json, Value};

/// Every n-th query also refreshes the learner profile.
pub const SUMMARY_INTERVAL: u32 = 5;
/// Number of logged messages sent along with a new question.
pub const HISTORY_WINDOW: usize = 20;

const SYSTEM_PROMPT: &str = "You are a friendly study assistant for middle-school students. \
Answer in Korean, keep explanations short and concrete, and use numbered steps for calculations.";

const SUMMARY_PROMPT: &str = "Summarise this student's learning profile from the conversation above: \
topics they asked about, recurring difficulties, and one suggestion for what to study next. \
Answer in Korean in at most five short lines.";

pub fn message(
    role: Role,
    content: impl Into<String>,
    timestamp: impl Into<String>,
) -> ChatMessage {
    ChatMessage {
        content: content.into(),
        role,
        timestamp: timestamp.into(),
    }
}

fn as_model_message(message: &ChatMessage) -> Value {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    json!({ "role": role, "content": message.content })
}

/// System prompt, the recent history window, then the new question.
pub fn build_messages(session: &ChatSession, question: &str) -> Vec<Value> {
    let start = session.messages.len().saturating_sub(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
    messages.push(json!({ "role": "system", "content": SYSTEM_PROMPT }));
    messages.extend(session.messages[start..].iter().map(as_model_message));
    messages.push(json!({ "role": "user", "content": question }));
    messages
}

/// The recent history window followed by the profile request.
pub fn build_summary_messages(session: &ChatSession) -> Vec<Value> {
    let start = session.messages.len().saturating_sub(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity(HISTORY_WINDOW + 1);
    messages.extend(session.messages[start..].iter().map(as_model_message));
    messages.push(json!({ "role": "user", "content": SUMMARY_PROMPT }));
    messages
}

/// Appends one answered exchange and returns the new query count.
pub fn record_exchange(
    session: &mut ChatSession,
    question: &str,
    answer: &str,
    timestamp: &str,
) -> u32 {
    session.messages.push(message(Role::User, question, timestamp));
    session.messages.push(message(Role::Assistant, answer, timestamp));
    session.query_count += 1;
    session.query_count
}

pub fn summary_due(query_count: u32) -> bool {
    query_count > 0 && query_count % SUMMARY_INTERVAL == 0
}

pub fn next_summary_at(query_count: u32) -> u32 {
    (query_count / SUMMARY_INTERVAL + 1) * SUMMARY_INTERVAL
}

pub fn set_profile(session: &mut ChatSession, summary: String, timestamp: String) {
    session.profile = Some(Profile {
        summary,
        last_updated: timestamp,
        message_count: session.messages.len(),
    });
}

pub fn session_stats(session: Option<&ChatSession>) -> SessionStatsResponse {
    let query_count = session.map_or(0, |session| session.query_count);
    SessionStatsResponse {
        query_count,
        next_summary_at: next_summary_at(query_count),
    }
}

pub fn profile_response(session: Option<&ChatSession>) -> ProfileResponse {
    match session.and_then(|session| session.profile.as_ref()) {
        Some(profile) => ProfileResponse {
            exists: true,
            summary: Some(profile.summary.clone()),
            last_updated: Some(profile.last_updated.clone()),
            message_count: Some(profile.message_count),
            message: None,
        },
        None => ProfileResponse {
            exists: false,
            summary: None,
            last_updated: None,
            message_count: None,
            message: Some(format!(
                "A profile is generated after {SUMMARY_INTERVAL} questions."
            )),
        },
    }
}
