//! Command-line argument parsing for alumni-sync.
//!
//! This module handles parsing command-line arguments and determining
//! which command to execute.

/// Parsed command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Refresh and print the notification feed (default)
    Feed,
    /// Refresh the feed and mark everything in it as read
    Ack,
    /// Print the conversation with a peer
    Chat { peer_id: String },
    /// Send a message to a peer
    Send { peer_id: String, text: String },
    /// Unsend one of your messages
    Unsend { peer_id: String, message_id: String },
    /// Arguments could not be understood
    Invalid(String),
}

/// Command plus global options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: CliCommand,
    /// `--user <id>`, overriding `ALUMNI_USER_ID`
    pub user_id: Option<String>,
}

pub const USAGE: &str = "\
usage: alumni-sync [--user <id>] <command>

commands:
  feed                       show notifications (default)
  ack                        mark every notification as read
  chat <peer>                show the conversation with <peer>
  send <peer> <text...>      send a message
  unsend <peer> <message-id> delete one of your messages
  --version, -V              print the version
  --help, -h                 print this help";

/// Parse command-line arguments.
///
/// # Examples
///
/// ```
/// use alumni_sync::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["alumni-sync".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliArgs
where
    I: Iterator<Item = String>,
{
    let mut user_id = None;
    let mut positional = Vec::new();

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                return CliArgs {
                    command: CliCommand::Version,
                    user_id,
                }
            }
            "--help" | "-h" => {
                return CliArgs {
                    command: CliCommand::Help,
                    user_id,
                }
            }
            "--user" | "-u" => match args.next() {
                Some(id) => user_id = Some(id),
                None => {
                    return CliArgs {
                        command: CliCommand::Invalid("--user needs a value".to_string()),
                        user_id,
                    }
                }
            },
            _ => positional.push(arg),
        }
    }

    CliArgs {
        command: parse_command(positional),
        user_id,
    }
}

fn parse_command(positional: Vec<String>) -> CliCommand {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return CliCommand::Feed;
    };
    let rest: Vec<String> = words.collect();

    match (name.as_str(), rest.as_slice()) {
        ("feed", []) => CliCommand::Feed,
        ("ack", []) => CliCommand::Ack,
        ("chat", [peer]) => CliCommand::Chat {
            peer_id: peer.clone(),
        },
        ("send", [peer, text @ ..]) if !text.is_empty() => CliCommand::Send {
            peer_id: peer.clone(),
            text: text.join(" "),
        },
        ("unsend", [peer, id]) => CliCommand::Unsend {
            peer_id: peer.clone(),
            message_id: id.clone(),
        },
        ("feed" | "ack" | "chat" | "send" | "unsend", _) => {
            CliCommand::Invalid(format!("wrong arguments for '{}'", name))
        }
        _ => CliCommand::Invalid(format!("unknown command '{}'", name)),
    }
}
