//! Live chat session registry.
//!
//! Each websocket connection registers one session under its account. A
//! broadcast copies the matching senders while holding the read lock, then
//! sends after releasing it; sessions whose receiver is gone are pruned.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone)]
struct SessionHandle {
    id: u64,
    tx: UnboundedSender<String>,
}

/// Registry of live chat sessions, keyed by account id.
#[derive(Debug, Default)]
pub struct ChatHub {
    sessions: RwLock<HashMap<i64, Vec<SessionHandle>>>,
    next_id: AtomicU64,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session for `account_id`.
    ///
    /// Returns the session id (for [`ChatHub::remove`]) and the stream of
    /// frames addressed to it.
    pub fn add(&self, account_id: i64) -> (u64, UnboundedReceiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(account_id)
            .or_default()
            .push(SessionHandle { id, tx });
        log::debug!("Chat session {id} opened for account {account_id}");
        (id, rx)
    }

    /// Unregisters one session. Unknown ids are ignored.
    pub fn remove(&self, account_id: i64, session_id: u64) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handles) = sessions.get_mut(&account_id) {
            handles.retain(|h| h.id != session_id);
            if handles.is_empty() {
                sessions.remove(&account_id);
            }
        }
        log::debug!("Chat session {session_id} closed for account {account_id}");
    }

    /// Sends `frame` to every session of every account in `account_ids`.
    ///
    /// Returns the number of sessions the frame was delivered to.
    pub fn broadcast(&self, account_ids: &[i64], frame: &str) -> usize {
        let targets: Vec<(i64, SessionHandle)> = {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            account_ids
                .iter()
                .filter_map(|account| sessions.get(account).map(|handles| (account, handles)))
                .flat_map(|(account, handles)| handles.iter().map(|h| (*account, h.clone())))
                .collect()
        };

        let mut delivered = 0;
        for (account_id, handle) in targets {
            if handle.tx.send(frame.to_string()).is_ok() {
                delivered += 1;
            } else {
                self.remove(account_id, handle.id);
            }
        }
        delivered
    }

    /// Number of open sessions across all accounts.
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }
}
