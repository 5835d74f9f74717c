//! ChatServer Actor implementation
//!
//! The central actor owning all shared state: the session registry and the
//! group registry. Handlers talk to it over an mpsc channel, so every
//! compound registry operation (check-then-insert, leave-then-delete,
//! disconnect-then-purge) is one atomic step with no locks. Outbound
//! delivery never blocks the actor: replies are queued with `try_send` and
//! a refused send is dropped, not retried.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::command::Command;
use crate::group::GroupRegistry;
use crate::message::ServerReply;
use crate::registry::{RegisterError, Session, SessionRegistry};
use crate::types::{ConnId, GroupName, Nickname};

/// Commands sent from connection handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Claim a nickname for a negotiating connection
    Register {
        conn_id: ConnId,
        nickname: Nickname,
        sender: mpsc::Sender<ServerReply>,
        reply: oneshot::Sender<Result<(), RegisterError>>,
    },
    /// Apply one parsed command on behalf of a registered nickname
    Apply {
        nickname: Nickname,
        command: Command,
    },
    /// A session's connection ended (quit, end-of-stream, or read error)
    Disconnect { nickname: Nickname },
}

/// The main ChatServer actor
///
/// Processes commands from connection handlers one at a time. Sole owner of
/// both registries.
pub struct ChatServer {
    sessions: SessionRegistry,
    groups: GroupRegistry,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            groups: GroupRegistry::new(),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are
    /// dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Register {
                conn_id,
                nickname,
                sender,
                reply,
            } => {
                let result = self.handle_register(conn_id, nickname, sender);
                let _ = reply.send(result);
            }
            ServerCommand::Apply { nickname, command } => {
                self.handle_apply(&nickname, command);
            }
            ServerCommand::Disconnect { nickname } => {
                self.handle_disconnect(&nickname);
            }
        }
    }

    /// Handle a nickname claim from a negotiating connection
    fn handle_register(
        &mut self,
        conn_id: ConnId,
        nickname: Nickname,
        sender: mpsc::Sender<ServerReply>,
    ) -> Result<(), RegisterError> {
        let session = Session::new(conn_id, sender);
        self.sessions.register(nickname.clone(), session)?;

        info!("Connection {} registered as '{}'", conn_id, nickname);

        // Greeting and help go to the new session first, then everyone
        // (the new session included) sees the join notice.
        self.reply_to(&nickname, ServerReply::Hello(nickname.clone()));
        self.reply_to(&nickname, ServerReply::Help);
        self.broadcast_system(format!("{} joined the chat.", nickname));

        debug!(
            "Total sessions: {}, Total groups: {}",
            self.sessions.len(),
            self.groups.len()
        );
        Ok(())
    }

    /// Handle a session's end: remove it, purge its group memberships, and
    /// tell everyone who remains.
    fn handle_disconnect(&mut self, nickname: &Nickname) {
        if self.sessions.remove(nickname).is_none() {
            return;
        }
        self.groups.purge(nickname);

        info!("'{}' disconnected", nickname);
        self.broadcast_system(format!("{} left the chat.", nickname));

        debug!(
            "Total sessions: {}, Total groups: {}",
            self.sessions.len(),
            self.groups.len()
        );
    }

    /// Dispatch one parsed command for a registered sender.
    ///
    /// Every failure path replies to the sender only and leaves both
    /// registries untouched.
    fn handle_apply(&mut self, sender: &Nickname, command: Command) {
        match command {
            Command::Help => self.reply_to(sender, ServerReply::Help),
            Command::ListUsers => {
                let names = self.sessions.snapshot_names();
                self.reply_to(sender, ServerReply::UserList(names));
            }
            Command::ListGroups => {
                let listing = self.groups.list_all();
                self.reply_to(sender, ServerReply::GroupList(listing));
            }
            Command::PrivateMessage { target, text } => {
                self.handle_private_message(sender, &target, text);
            }
            Command::GroupCreate(group) => {
                let reply = match self.groups.create(group.clone(), sender.clone()) {
                    Ok(()) => {
                        ServerReply::Notice(format!("Created group {} and joined it.", group))
                    }
                    // create's only failure mode
                    Err(_) => ServerReply::Notice("Group already exists.".to_string()),
                };
                self.reply_to(sender, reply);
            }
            Command::GroupJoin(group) => {
                let reply = match self.groups.join(&group, sender.clone()) {
                    Ok(()) => ServerReply::Notice(format!("Joined group {}.", group)),
                    // join's only failure mode
                    Err(_) => ServerReply::Notice("Group does not exist.".to_string()),
                };
                self.reply_to(sender, reply);
            }
            Command::GroupLeave(group) => {
                let reply = match self.groups.leave(&group, sender) {
                    Ok(()) => ServerReply::Notice(format!("Left group {}.", group)),
                    // leave's only failure mode
                    Err(_) => {
                        ServerReply::Notice("You are not a member of that group.".to_string())
                    }
                };
                self.reply_to(sender, reply);
            }
            Command::GroupSend { group, text } => {
                self.handle_group_send(sender, &group, text);
            }
            Command::Quit => {
                // The handler terminates its read loop itself; this only
                // queues the farewell so it is flushed before close.
                self.reply_to(sender, ServerReply::Disconnecting);
            }
            Command::Unrecognized { notice } => {
                self.reply_to(sender, ServerReply::Notice(notice.to_string()));
            }
        }
    }

    fn handle_private_message(&self, sender: &Nickname, target: &str, text: String) {
        let recipient = Nickname::parse(target)
            .and_then(|nickname| self.sessions.lookup(&nickname).map(|s| (nickname, s)));
        let Some((target, session)) = recipient else {
            self.reply_to(
                sender,
                ServerReply::Notice(format!("{} is not online.", target)),
            );
            return;
        };

        if let Err(e) = session.send(ServerReply::Pm {
            from: sender.clone(),
            text: text.clone(),
        }) {
            debug!("Dropping PM to '{}': {}", target, e);
        }
        self.reply_to(sender, ServerReply::PmEcho { to: target, text });
    }

    fn handle_group_send(&self, sender: &Nickname, group: &GroupName, text: String) {
        // Point-in-time member snapshot; membership changes after this line
        // do not affect this delivery.
        let members = self.groups.members_of(group);
        if !members.contains(sender) {
            self.reply_to(
                sender,
                ServerReply::Notice("You must join the group before sending messages.".to_string()),
            );
            return;
        }

        for member in &members {
            if member == sender {
                continue;
            }
            // Members with no live session are skipped silently.
            if let Some(session) = self.sessions.lookup(member) {
                if let Err(e) = session.send(ServerReply::GroupMessage {
                    group: group.clone(),
                    from: sender.clone(),
                    text: text.clone(),
                }) {
                    debug!("Dropping group message to '{}': {}", member, e);
                }
            }
        }
        self.reply_to(
            sender,
            ServerReply::GroupEcho {
                group: group.clone(),
                text,
            },
        );
    }

    /// Relay: queue one reply for one nickname, best-effort.
    fn reply_to(&self, nickname: &Nickname, reply: ServerReply) {
        if let Some(session) = self.sessions.lookup(nickname) {
            if let Err(e) = session.send(reply) {
                debug!("Dropping reply to '{}': {}", nickname, e);
            }
        }
    }

    /// Relay: queue a `[System]` notice for every current session.
    ///
    /// Individual failures never abort the fan-out.
    fn broadcast_system(&self, message: String) {
        for session in self.sessions.sessions() {
            if let Err(e) = session.send(ServerReply::System(message.clone())) {
                debug!("Dropping system notice for {}: {}", session.conn_id, e);
            }
        }
    }
}
