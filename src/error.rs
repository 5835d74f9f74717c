//! Error types for the chat server
//!
//! Defines handler-fatal errors and best-effort delivery errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Errors fatal to one connection handler
///
/// Terminating a handler with one of these never affects other connections
/// or the server process.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on this connection's stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The server actor's command channel is closed (server shutting down)
    #[error("Channel send error")]
    ChannelSend,
}

/// Best-effort delivery errors
///
/// Produced by a refused reply-channel send; always discarded at the relay
/// boundary, since they mean the *recipient* is gone or stalled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
    /// The recipient's reply queue is saturated
    #[error("Channel full")]
    ChannelFull,
}
