// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::SessionConfig;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

pub const SESSION_COOKIE_NAME: &str = "custodesk_session";
const SESSION_CHANNEL_DEPTH: usize = 64;
const MAX_SESSIONS: usize = 10000;

#[derive(Debug, Clone)]
pub struct SessionIssue {
    pub session_id: String,
    pub expires_in_seconds: u64,
}

/// Session storage behind a single-owner task: callers talk to it through a
/// command channel, so the map never needs a lock.
#[derive(Clone)]
pub struct SessionStore {
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(SESSION_CHANNEL_DEPTH);
        tokio::spawn(async move {
            let mut state = SessionState::new();
            state.run(receiver).await;
        });
        Self { sender }
    }

    /// Issue a session for an authenticated principal. The remember-me TTL
    /// applies when the login form had the checkbox ticked.
    pub async fn issue(
        &self,
        username: &str,
        remember_me: bool,
        config: &SessionConfig,
    ) -> Option<SessionIssue> {
        let ttl_seconds = if remember_me {
            config.remember_me_ttl_seconds
        } else {
            config.ttl_seconds
        };
        let (reply, receive) = oneshot::channel();
        let command = SessionCommand::Issue {
            username: username.to_string(),
            ttl_seconds,
            reply,
        };
        if self.sender.send(command).await.is_err() {
            return None;
        }
        receive.await.ok()
    }

    /// Resolve a session id to the username it was issued for, if the
    /// session exists and has not expired.
    pub async fn resolve(&self, session_id: &str) -> Option<String> {
        let (reply, receive) = oneshot::channel();
        let command = SessionCommand::Resolve {
            session_id: session_id.to_string(),
            reply,
        };
        if self.sender.send(command).await.is_err() {
            return None;
        }
        receive.await.ok().flatten()
    }

    pub fn invalidate(&self, session_id: &str) {
        let _ = self.sender.try_send(SessionCommand::Invalidate {
            session_id: session_id.to_string(),
        });
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

enum SessionCommand {
    Issue {
        username: String,
        ttl_seconds: u64,
        reply: oneshot::Sender<SessionIssue>,
    },
    Resolve {
        session_id: String,
        reply: oneshot::Sender<Option<String>>,
    },
    Invalidate {
        session_id: String,
    },
}

struct SessionRecord {
    username: String,
    expires_at: Instant,
}

struct SessionState {
    sessions: HashMap<String, SessionRecord>,
    session_order: VecDeque<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            session_order: VecDeque::new(),
        }
    }

    async fn run(&mut self, mut receiver: mpsc::Receiver<SessionCommand>) {
        while let Some(command) = receiver.recv().await {
            match command {
                SessionCommand::Issue {
                    username,
                    ttl_seconds,
                    reply,
                } => {
                    let _ = reply.send(self.issue_session(username, ttl_seconds));
                }
                SessionCommand::Resolve { session_id, reply } => {
                    let _ = reply.send(self.resolve_session(&session_id));
                }
                SessionCommand::Invalidate { session_id } => {
                    self.invalidate_session(&session_id);
                }
            }
        }
    }

    fn issue_session(&mut self, username: String, ttl_seconds: u64) -> SessionIssue {
        let now = Instant::now();
        self.cleanup_expired(now);

        let session_id = generate_session_id();
        self.sessions.insert(
            session_id.clone(),
            SessionRecord {
                username,
                expires_at: now + Duration::from_secs(ttl_seconds),
            },
        );
        self.session_order.push_back(session_id.clone());
        self.prune_overflow();

        SessionIssue {
            session_id,
            expires_in_seconds: ttl_seconds,
        }
    }

    fn resolve_session(&mut self, session_id: &str) -> Option<String> {
        let now = Instant::now();
        let record = self.sessions.get(session_id)?;
        if record.expires_at <= now {
            self.invalidate_session(session_id);
            return None;
        }
        Some(record.username.clone())
    }

    fn invalidate_session(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
        self.session_order.retain(|id| id != session_id);
    }

    fn cleanup_expired(&mut self, now: Instant) {
        self.sessions.retain(|_, record| record.expires_at > now);
        self.session_order
            .retain(|id| self.sessions.contains_key(id));
    }

    fn prune_overflow(&mut self) {
        while self.sessions.len() > MAX_SESSIONS {
            if let Some(oldest) = self.session_order.pop_front() {
                self.sessions.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; 18];
    OsRng.fill_bytes(&mut bytes);
    format!("csn_{}", URL_SAFE_NO_PAD.encode(bytes))
}
