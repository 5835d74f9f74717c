//! Server-to-client line protocol
//!
//! Every line the server can write is a `ServerReply` variant; `Display`
//! renders the exact wire text (without the trailing newline, which the
//! writer task appends). Keeping the formatting in one place means the
//! dispatch logic never builds protocol strings inline.

use crate::types::{GroupName, Nickname};

/// The fixed `/help` command reference, sent as one multi-line write.
pub const HELP_TEXT: &str = "\
Commands:
  /help                             Show this help message
  /list users                       Show all connected clients
  /list groups                      Show all groups with members
  /msg <user> <message>             Send a private message
  /group create <name>              Create a new group (you join automatically)
  /group join <name>                Join an existing group
  /group leave <name>               Leave a group you're part of
  /group send <name> <message>      Send a message to a group you're in
  /quit                             Disconnect from the server";

/// Server → Client message
///
/// One variant per line kind the server can emit. Variants carrying
/// formatting logic (lists, tagged messages) are unit-tested below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    /// Greeting sent immediately after accept
    Welcome,
    /// Nickname negotiation prompt
    NickPrompt,
    /// Candidate failed the alphanumeric-plus-underscore rule
    NickInvalid,
    /// Candidate collided with a registered nickname
    NickTaken,
    /// Negotiation succeeded
    Hello(Nickname),
    /// The full command reference
    Help,
    /// Negotiation aborted with /quit
    Goodbye,
    /// /quit acknowledged, connection closing
    Disconnecting,
    /// Non-command free text received while active
    UnknownInput,
    /// System-wide notice (joins, leaves)
    System(String),
    /// Private message delivered to its target
    Pm { from: Nickname, text: String },
    /// Private message echo to its sender
    PmEcho { to: Nickname, text: String },
    /// Group message delivered to a member
    GroupMessage {
        group: GroupName,
        from: Nickname,
        text: String,
    },
    /// Group message echo to its sender
    GroupEcho { group: GroupName, text: String },
    /// `/list users` output (already sorted by the registry)
    UserList(Vec<Nickname>),
    /// `/list groups` output (groups and members already sorted)
    GroupList(Vec<(GroupName, Vec<Nickname>)>),
    /// One-line confirmation, usage hint, or error notice
    Notice(String),
}

impl std::fmt::Display for ServerReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Welcome => write!(f, "Welcome to the network lab chat server!"),
            Self::NickPrompt => write!(
                f,
                "Enter a nickname (letters, numbers, underscores). Use /quit to abort."
            ),
            Self::NickInvalid => write!(
                f,
                "Nickname must be alphanumeric (underscores allowed). Try again:"
            ),
            Self::NickTaken => write!(f, "Name already in use. Try another:"),
            Self::Hello(nick) => write!(f, "Hello {}! Type /help to see commands.", nick),
            Self::Help => write!(f, "{}", HELP_TEXT),
            Self::Goodbye => write!(f, "Goodbye!"),
            Self::Disconnecting => write!(f, "Disconnecting. Bye!"),
            Self::UnknownInput => write!(
                f,
                "Unknown input. Use /help to see the list of supported commands."
            ),
            Self::System(msg) => write!(f, "[System] {}", msg),
            Self::Pm { from, text } => write!(f, "[PM] {}: {}", from, text),
            Self::PmEcho { to, text } => write!(f, "[PM -> {}] {}", to, text),
            Self::GroupMessage { group, from, text } => {
                write!(f, "[Group:{}] {}: {}", group, from, text)
            }
            Self::GroupEcho { group, text } => write!(f, "[Group:{}] (you): {}", group, text),
            Self::UserList(names) => {
                if names.is_empty() {
                    return write!(f, "No connected users.");
                }
                let users = names
                    .iter()
                    .map(Nickname::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Online users ({}): {}", names.len(), users)
            }
            Self::GroupList(groups) => {
                if groups.is_empty() {
                    return write!(f, "No groups have been created.");
                }
                let lines = groups
                    .iter()
                    .map(|(group, members)| {
                        let member_list = if members.is_empty() {
                            "(empty)".to_string()
                        } else {
                            members
                                .iter()
                                .map(Nickname::as_str)
                                .collect::<Vec<_>>()
                                .join(", ")
                        };
                        format!("{}: {}", group, member_list)
                    })
                    .collect::<Vec<_>>();
                write!(f, "{}", lines.join("\n"))
            }
            Self::Notice(msg) => write!(f, "{}", msg),
        }
    }
}
