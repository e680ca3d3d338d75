//! Short-lived conversation state: a user who pressed "send" and owes us an
//! `<address> <amount>` reply.

use std::{fmt, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::UserId;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    Native,
    Token,
}

impl fmt::Display for SendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendKind::Native => write!(f, "native"),
            SendKind::Token => write!(f, "token"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSend {
    pub kind: SendKind,
    pub chat_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl PendingSend {
    fn is_live_for(&self, chat_id: i64, now: DateTime<Utc>) -> bool {
        self.chat_id == chat_id && now < self.expires_at
    }
}

/// At most one pending send per user. `take` is an atomic check-and-clear.
pub trait SessionStore: Send + Sync {
    /// Starts a send intent, replacing any earlier one for this user.
    fn begin(&self, user: UserId, kind: SendKind, chat_id: i64, now: DateTime<Utc>) -> PendingSend;

    fn peek(&self, user: UserId, chat_id: i64, now: DateTime<Utc>) -> Option<PendingSend>;

    fn take(&self, user: UserId, chat_id: i64, now: DateTime<Utc>) -> Option<PendingSend>;

    fn cancel(&self, user: UserId) -> bool;

    /// Drops expired intents and returns how many were dropped.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct MemorySessionStore {
    ttl: TimeDelta,
    entries: DashMap<UserId, PendingSend>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore for MemorySessionStore {
    fn begin(&self, user: UserId, kind: SendKind, chat_id: i64, now: DateTime<Utc>) -> PendingSend {
        let intent = PendingSend {
            kind,
            chat_id,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.entries.insert(user, intent);
        intent
    }

    fn peek(&self, user: UserId, chat_id: i64, now: DateTime<Utc>) -> Option<PendingSend> {
        self.entries
            .get(&user)
            .map(|e| *e.value())
            .filter(|p| p.is_live_for(chat_id, now))
    }

    fn take(&self, user: UserId, chat_id: i64, now: DateTime<Utc>) -> Option<PendingSend> {
        if let Some((_, intent)) = self.entries.remove_if(&user, |_, p| p.is_live_for(chat_id, now)) {
            return Some(intent);
        }
        self.entries.remove_if(&user, |_, p| now >= p.expires_at);
        None
    }

    fn cancel(&self, user: UserId) -> bool {
        self.entries.remove(&user).is_some()
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, p| now < p.expires_at);
        before.saturating_sub(self.entries.len())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
