//! Session registry
//!
//! The authoritative nickname → session map. Owned exclusively by the
//! `ChatServer` actor, so every compound operation here is atomic with
//! respect to all other handlers.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerReply;
use crate::types::{ConnId, Nickname};

/// Nickname registration failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// Another live connection already owns this nickname
    #[error("name already in use")]
    NameTaken,
}

/// A live session: one registered nickname bound to one connection.
///
/// Holds the reply channel into the connection's writer task. Handlers never
/// share write access to a socket; they share only this sender.
#[derive(Debug)]
pub struct Session {
    /// Connection identity, for logs
    pub conn_id: ConnId,
    /// Server → Client reply channel
    sender: mpsc::Sender<ServerReply>,
}

impl Session {
    pub fn new(conn_id: ConnId, sender: mpsc::Sender<ServerReply>) -> Self {
        Self { conn_id, sender }
    }

    /// Queue a reply for this session's writer task.
    ///
    /// Non-blocking: a disconnected or saturated recipient returns an error
    /// instead of stalling the caller. The relay discards that error.
    pub fn send(&self, reply: ServerReply) -> Result<(), SendError> {
        self.sender.try_send(reply).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
            mpsc::error::TrySendError::Full(_) => SendError::ChannelFull,
        })
    }
}

/// Nickname → session map enforcing nickname uniqueness.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Nickname, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically check uniqueness and insert.
    ///
    /// On `NameTaken` the registry is left untouched and the nickname's
    /// existing session stays valid.
    pub fn register(&mut self, nickname: Nickname, session: Session) -> Result<(), RegisterError> {
        if self.sessions.contains_key(&nickname) {
            return Err(RegisterError::NameTaken);
        }
        self.sessions.insert(nickname, session);
        Ok(())
    }

    pub fn lookup(&self, nickname: &Nickname) -> Option<&Session> {
        self.sessions.get(nickname)
    }

    /// Idempotent removal; the nickname becomes available for reuse.
    pub fn remove(&mut self, nickname: &Nickname) -> Option<Session> {
        self.sessions.remove(nickname)
    }

    /// Point-in-time sorted view of all registered nicknames.
    pub fn snapshot_names(&self) -> Vec<Nickname> {
        let mut names: Vec<Nickname> = self.sessions.keys().cloned().collect();
        names.sort();
        names
    }

    /// All current sessions, for broadcast fan-out.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nick(s: &str) -> Nickname {
        Nickname::parse(s).unwrap()
    }

    fn session() -> (Session, mpsc::Receiver<ServerReply>) {
        let (tx, rx) = mpsc::channel(8);
        (Session::new(ConnId::new(), tx), rx)
    }

    #[test]
    fn test_register_enforces_uniqueness() {
        let mut registry = SessionRegistry::new();
        let (first, _rx1) = session();
        let (second, _rx2) = session();

        assert!(registry.register(nick("carol"), first).is_ok());
        assert_eq!(
            registry.register(nick("carol"), second),
            Err(RegisterError::NameTaken)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_register_keeps_existing_session() {
        let mut registry = SessionRegistry::new();
        let (first, mut rx1) = session();
        let (second, _rx2) = session();
        let first_id = first.conn_id;

        registry.register(nick("carol"), first).unwrap();
        let _ = registry.register(nick("carol"), second);

        let survivor = registry.lookup(&nick("carol")).unwrap();
        assert_eq!(survivor.conn_id, first_id);
        survivor.send(ServerReply::Goodbye).unwrap();
        assert_eq!(rx1.try_recv().unwrap(), ServerReply::Goodbye);
    }

    #[test]
    fn test_remove_is_idempotent_and_frees_name() {
        let mut registry = SessionRegistry::new();
        let (s, _rx) = session();

        registry.register(nick("alice"), s).unwrap();
        assert!(registry.remove(&nick("alice")).is_some());
        assert!(registry.remove(&nick("alice")).is_none());

        let (again, _rx2) = session();
        assert!(registry.register(nick("alice"), again).is_ok());
    }

    #[test]
    fn test_snapshot_names_sorted() {
        let mut registry = SessionRegistry::new();
        for name in ["mallory", "alice", "bob"] {
            let (s, _rx) = session();
            registry.register(nick(name), s).unwrap();
        }
        assert_eq!(
            registry.snapshot_names(),
            vec![nick("alice"), nick("bob"), nick("mallory")]
        );
    }

    #[test]
    fn test_send_to_dropped_receiver_errors() {
        let (tx, rx) = mpsc::channel(1);
        let s = Session::new(ConnId::new(), tx);
        drop(rx);
        assert_eq!(s.send(ServerReply::Welcome), Err(SendError::ChannelClosed));
    }
}
