//! Command parsing
//!
//! Turns one slash-prefixed input line into a `Command`. The parser is total:
//! malformed input never fails, it falls through to `Unrecognized` carrying
//! the usage or error notice the sender should see. Command and subcommand
//! tokens match case-insensitively; nicknames and group names keep their case.

use crate::types::GroupName;

const USAGE_LIST: &str = "Usage: /list users|groups";
const USAGE_MSG: &str = "Usage: /msg <nickname> <message>";
const USAGE_GROUP: &str = "Usage: /group create|join|leave|send <group_name> [message]";
const USAGE_GROUP_SEND: &str = "Usage: /group send <group_name> <message>";
const UNKNOWN_LIST_TARGET: &str = "Unknown list target. Use users or groups.";
const UNKNOWN_GROUP_ACTION: &str = "Unknown group action (create|join|leave|send).";
const UNKNOWN_COMMAND: &str = "Unknown command. Use /help to see all options.";

/// A parsed client command
///
/// Ephemeral: produced from one input line, consumed by one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    ListUsers,
    ListGroups,
    /// `/msg <target> <text...>` — target stays a raw token; the session
    /// registry decides whether it names anyone online.
    PrivateMessage { target: String, text: String },
    GroupCreate(GroupName),
    GroupJoin(GroupName),
    GroupLeave(GroupName),
    GroupSend { group: GroupName, text: String },
    Quit,
    /// Anything malformed: unknown command, bad argument count, unknown
    /// list target or group action. Carries the notice for the sender.
    Unrecognized { notice: &'static str },
}

impl Command {
    /// Parse one slash-prefixed line. Never fails.
    ///
    /// Message payloads are whitespace-split and rejoined with single spaces,
    /// so runs of whitespace in the original line collapse.
    pub fn parse(line: &str) -> Self {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = tokens.first() else {
            return Self::Unrecognized {
                notice: UNKNOWN_COMMAND,
            };
        };
        match first.to_lowercase().as_str() {
            "/help" => Self::Help,
            "/list" => match tokens.get(1).map(|t| t.to_lowercase()) {
                None => Self::Unrecognized { notice: USAGE_LIST },
                Some(target) if target == "users" => Self::ListUsers,
                Some(target) if target == "groups" => Self::ListGroups,
                Some(_) => Self::Unrecognized {
                    notice: UNKNOWN_LIST_TARGET,
                },
            },
            "/msg" => {
                if tokens.len() < 3 {
                    return Self::Unrecognized { notice: USAGE_MSG };
                }
                Self::PrivateMessage {
                    target: tokens[1].to_string(),
                    text: tokens[2..].join(" "),
                }
            }
            "/group" => {
                if tokens.len() < 3 {
                    return Self::Unrecognized {
                        notice: USAGE_GROUP,
                    };
                }
                let group = GroupName::new(tokens[2]);
                match tokens[1].to_lowercase().as_str() {
                    "create" => Self::GroupCreate(group),
                    "join" => Self::GroupJoin(group),
                    "leave" => Self::GroupLeave(group),
                    "send" => {
                        if tokens.len() < 4 {
                            return Self::Unrecognized {
                                notice: USAGE_GROUP_SEND,
                            };
                        }
                        Self::GroupSend {
                            group,
                            text: tokens[3..].join(" "),
                        }
                    }
                    _ => Self::Unrecognized {
                        notice: UNKNOWN_GROUP_ACTION,
                    },
                }
            }
            "/quit" => Self::Quit,
            _ => Self::Unrecognized {
                notice: UNKNOWN_COMMAND,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help_and_quit() {
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/HELP"), Command::Help);
        assert_eq!(Command::parse("/quit"), Command::Quit);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(Command::parse("/list users"), Command::ListUsers);
        assert_eq!(Command::parse("/list GROUPS"), Command::ListGroups);
        assert_eq!(
            Command::parse("/list"),
            Command::Unrecognized { notice: USAGE_LIST }
        );
        assert_eq!(
            Command::parse("/list rooms"),
            Command::Unrecognized {
                notice: UNKNOWN_LIST_TARGET
            }
        );
    }

    #[test]
    fn test_parse_msg() {
        assert_eq!(
            Command::parse("/msg bob hello there"),
            Command::PrivateMessage {
                target: "bob".to_string(),
                text: "hello there".to_string(),
            }
        );
        assert_eq!(
            Command::parse("/msg bob"),
            Command::Unrecognized { notice: USAGE_MSG }
        );
    }

    #[test]
    fn test_msg_collapses_whitespace() {
        assert_eq!(
            Command::parse("/msg bob  spaced   out"),
            Command::PrivateMessage {
                target: "bob".to_string(),
                text: "spaced out".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_group_actions() {
        assert_eq!(
            Command::parse("/group create team"),
            Command::GroupCreate(GroupName::new("team"))
        );
        assert_eq!(
            Command::parse("/group JOIN team"),
            Command::GroupJoin(GroupName::new("team"))
        );
        assert_eq!(
            Command::parse("/group leave team"),
            Command::GroupLeave(GroupName::new("team"))
        );
        assert_eq!(
            Command::parse("/group send team hello world"),
            Command::GroupSend {
                group: GroupName::new("team"),
                text: "hello world".to_string(),
            }
        );
    }

    #[test]
    fn test_group_name_keeps_case() {
        assert_eq!(
            Command::parse("/group join Team"),
            Command::GroupJoin(GroupName::new("Team"))
        );
    }

    #[test]
    fn test_parse_group_malformed() {
        assert_eq!(
            Command::parse("/group"),
            Command::Unrecognized {
                notice: USAGE_GROUP
            }
        );
        assert_eq!(
            Command::parse("/group create"),
            Command::Unrecognized {
                notice: USAGE_GROUP
            }
        );
        assert_eq!(
            Command::parse("/group send team"),
            Command::Unrecognized {
                notice: USAGE_GROUP_SEND
            }
        );
        assert_eq!(
            Command::parse("/group destroy team"),
            Command::Unrecognized {
                notice: UNKNOWN_GROUP_ACTION
            }
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            Command::parse("/frobnicate"),
            Command::Unrecognized {
                notice: UNKNOWN_COMMAND
            }
        );
        assert_eq!(
            Command::parse("/"),
            Command::Unrecognized {
                notice: UNKNOWN_COMMAND
            }
        );
    }
}
