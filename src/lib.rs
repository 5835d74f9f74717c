//! Line-Oriented Multi-Client Chat Server Library
//!
//! A TCP chat server where each connection is one user: the server
//! arbitrates nicknames, relays private and group messages, and tracks
//! dynamic group membership across many concurrent connections.
//!
//! # Features
//! - Newline-framed, UTF-8, human-readable wire protocol
//! - Nickname negotiation with server-side uniqueness
//! - Private messages (`/msg`) with sender echo
//! - Groups created on demand, deleted when the last member leaves
//! - Group fan-out that tolerates disconnected recipients
//! - System-wide join/leave notices
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the session and group registries
//! - Each connection has a handler task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use linechat::{ChatServer, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("0.0.0.0:5050").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(ChatServer::new(cmd_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod command;
pub mod error;
pub mod group;
pub mod handler;
pub mod message;
pub mod registry;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use command::Command;
pub use error::{AppError, SendError};
pub use group::{GroupError, GroupRegistry};
pub use handler::handle_connection;
pub use message::ServerReply;
pub use registry::{RegisterError, Session, SessionRegistry};
pub use server::{ChatServer, ServerCommand};
pub use types::{ConnId, GroupName, Nickname};
