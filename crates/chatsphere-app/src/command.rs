//! Command parsing for the input line.
//!
//! Lines starting with `/` are commands. Anything else is chat text. A
//! leading `//` sends the rest of the line as text with a single `/`.

/// Help text listing every command.
pub const HELP: &str = "/create | /join [room] [username] | /connect | /quit | /help";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the service for a new room code
    Create,
    /// Join a room. Missing arguments fall back to the last known room and
    /// the configured username.
    Join {
        /// Room code
        room_id: Option<String>,
        /// Display name, may contain spaces
        username: Option<String>,
    },
    /// Open the channel if it is closed
    Connect,
    /// Leave the application
    Quit,
    /// Show the command list
    Help,
    /// Send chat text
    Message(String),
    /// Unrecognized `/command`
    Unknown(String),
}

/// Parse one submitted line.
pub fn parse(line: &str) -> Command {
    if let Some(text) = line.strip_prefix("//") {
        return Command::Message(format!("/{text}"));
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Command::Message(line.to_string());
    };

    let rest = rest.trim();
    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

    match name {
        "create" => Command::Create,
        "join" => {
            let args = args.trim();
            let (room, username) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
            Command::Join { room_id: non_empty(room), username: non_empty(username.trim()) }
        },
        "connect" => Command::Connect,
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help,
        _ => Command::Unknown(name.to_string()),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_message() {
        assert_eq!(parse("hello there"), Command::Message("hello there".into()));
    }

    #[test]
    fn double_slash_escapes() {
        assert_eq!(parse("//shrug"), Command::Message("/shrug".into()));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/create"), Command::Create);
        assert_eq!(parse("/connect"), Command::Connect);
        assert_eq!(parse("/quit"), Command::Quit);
        assert_eq!(parse("/exit"), Command::Quit);
        assert_eq!(parse("/help"), Command::Help);
        assert_eq!(parse("/create  "), Command::Create);
    }

    #[test]
    fn join_arguments() {
        assert_eq!(parse("/join"), Command::Join { room_id: None, username: None });
        assert_eq!(parse("/join AB12"), Command::Join { room_id: Some("AB12".into()), username: None });
        assert_eq!(parse("/join AB12 alice"), Command::Join {
            room_id: Some("AB12".into()),
            username: Some("alice".into()),
        });
        assert_eq!(parse("/join  AB12   alice smith "), Command::Join {
            room_id: Some("AB12".into()),
            username: Some("alice smith".into()),
        });
    }

    #[test]
    fn unknown_command() {
        assert_eq!(parse("/leave now"), Command::Unknown("leave".into()));
    }
}
