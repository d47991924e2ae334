//! Chat commands.
//!
//! A command is an input that starts with the configured marker, shaped
//! like `/<name>[@bot] [args]`.

/// Reply to `/reset`.
pub const RESET_ACK: &str = "Conversation history has been reset.";

/// Reply to `/start`.
pub const START_TEXT: &str = "Hi! I'm your assistant. Ask me anything: I can search the web \
for current information and do calculations for you. Send /help to see what I can do.";

/// Reply to `/help`.
pub const HELP_TEXT: &str = "Just send me a message and I'll answer it.\n\
\n\
I can:\n\
- search the web for current information\n\
- evaluate arithmetic such as 2e23*3 or (4 + 5) ^ 2\n\
\n\
Commands:\n\
/start - greeting\n\
/help - this message\n\
/reset - forget our conversation so far";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reset,
    Start,
    Help,
    /// Anything else; answered as an ordinary query.
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub args: String,
}

/// Parse `text` as a command, or `None` if it does not start with `marker`.
pub fn parse_command(text: &str, marker: &str) -> Option<ParsedCommand> {
    if marker.is_empty() {
        return None;
    }
    let rest = text.strip_prefix(marker)?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let name = head.split('@').next().unwrap_or(head).to_lowercase();

    let command = match name.as_str() {
        "reset" => Command::Reset,
        "start" => Command::Start,
        "help" => Command::Help,
        _ => Command::Other(name),
    };
    Some(ParsedCommand {
        command,
        args: args.to_string(),
    })
}
