//! Confirmed message log with a pending overlay.
//!
//! A sent user message waits in the pending queue until the server answers.
//! On success it joins the confirmed log followed by the reply; on failure it
//! joins the log marked [`Delivery::Failed`], followed by the error bubble.
//! The visible list is always the confirmed log then the pending queue, so
//! messages never reorder relative to submission.

use crate::models::{ChatMessage, Delivery};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageLog {
    confirmed: Vec<ChatMessage>,
    pending: VecDeque<ChatMessage>,
}

impl MessageLog {
    /// A log holding only the greeting.
    pub fn welcome(text: impl Into<String>) -> Self {
        Self {
            confirmed: vec![ChatMessage::welcome(text)],
            pending: VecDeque::new(),
        }
    }

    pub fn from_history(messages: Vec<ChatMessage>) -> Self {
        Self {
            confirmed: messages,
            pending: VecDeque::new(),
        }
    }

    pub fn push_pending(&mut self, mut message: ChatMessage) {
        message.delivery = Delivery::Pending;
        self.pending.push_back(message);
    }

    /// Acknowledge pending message `id` and append `reply`.
    /// Returns false when `id` is no longer pending (the log was replaced).
    pub fn confirm(&mut self, id: &str, reply: ChatMessage) -> bool {
        self.settle(id, Delivery::Confirmed, reply)
    }

    /// Mark pending message `id` as failed and append the error bubble.
    pub fn fail(&mut self, id: &str, bubble: ChatMessage) -> bool {
        self.settle(id, Delivery::Failed, bubble)
    }

    fn settle(&mut self, id: &str, delivery: Delivery, follow_up: ChatMessage) -> bool {
        let Some(pos) = self.pending.iter().position(|m| m.id == id) else {
            return false;
        };
        // Earlier pending entries settle first so order is preserved.
        let settled: Vec<ChatMessage> = self.pending.drain(..=pos).collect();
        let last = settled.len() - 1;
        for (i, mut message) in settled.into_iter().enumerate() {
            if i == last {
                message.delivery = delivery;
            }
            self.confirmed.push(message);
        }
        self.confirmed.push(follow_up);
        true
    }

    /// Confirmed log followed by pending entries.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.confirmed
            .iter()
            .chain(self.pending.iter())
            .cloned()
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// True while the conversation shows nothing but the greeting.
    pub fn is_only_welcome(&self) -> bool {
        self.pending.is_empty()
            && self.confirmed.len() == 1
            && self.confirmed[0].is_welcome()
    }

    /// Swap the greeting text if the conversation is untouched.
    pub fn relocalize_welcome(&mut self, text: impl Into<String>) -> bool {
        if !self.is_only_welcome() {
            return false;
        }
        self.confirmed[0] = ChatMessage::welcome(text);
        true
    }
}
