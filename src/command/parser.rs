//! Chat command parsing
//!
//! A command is the first whitespace-separated token of a message, starting
//! with `/` and optionally suffixed with `@botname`. Its parameter is the rest
//! of the message, trimmed.

use crate::types::ListType;
use crate::utils::non_blank;

/// A recognised chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/create [title]`
    Create { title: Option<String> },
    /// `/end`
    End,
    /// `/current`
    Current,
    /// `/set_title <title>`; an empty title clears it
    SetTitle { title: String },
    /// `/in`, `/maybe`, `/out` with an optional description
    Join {
        list_type: ListType,
        description: Option<String>,
    },
    /// `/set_in_for`, `/set_maybe_for`, `/set_out_for` with a name
    SetFor { list_type: ListType, name: String },
    /// `/notify <message>`
    Notify { message: String },
    /// `/help`
    Help,
}

impl Command {
    /// Command token without the leading slash, used as a metrics label
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::End => "end",
            Command::Current => "current",
            Command::SetTitle { .. } => "set_title",
            Command::Join { list_type, .. } => list_type.as_str(),
            Command::SetFor {
                list_type: ListType::In,
                ..
            } => "set_in_for",
            Command::SetFor {
                list_type: ListType::Maybe,
                ..
            } => "set_maybe_for",
            Command::SetFor {
                list_type: ListType::Out,
                ..
            } => "set_out_for",
            Command::Notify { .. } => "notify",
            Command::Help => "help",
        }
    }

    /// What the user was trying to do, for the generic failure reply
    pub fn action(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create a new lobby",
            Command::End => "end the lobby",
            Command::Current => "show the lobby",
            Command::SetTitle { .. } => "set the lobby title",
            Command::Join { .. } | Command::SetFor { .. } => "join a lobby",
            Command::Notify { .. } => "notify the lobby",
            Command::Help => "show help",
        }
    }
}

/// Why a message did not produce a command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("message is not a command")]
    NotACommand,

    #[error("unknown command: /{0}")]
    Unknown(String),

    #[error("missing parameter, usage: {usage}")]
    MissingParameter { usage: &'static str },
}

/// Parse a chat message into a command
pub fn parse_command(text: &str) -> Result<Command, CommandError> {
    let text = text.trim_start();
    let Some(body) = text.strip_prefix('/') else {
        return Err(CommandError::NotACommand);
    };

    let (token, parameter) = match body.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (body, ""),
    };
    let token = token.split_once('@').map_or(token, |(name, _bot)| name);

    match token {
        "create" => Ok(Command::Create {
            title: non_blank(parameter),
        }),
        "end" => Ok(Command::End),
        "current" => Ok(Command::Current),
        "set_title" => Ok(Command::SetTitle {
            title: parameter.to_string(),
        }),
        "in" | "maybe" | "out" => Ok(Command::Join {
            list_type: parse_list_type(token)?,
            description: non_blank(parameter),
        }),
        "set_in_for" | "set_maybe_for" | "set_out_for" => {
            let list_type = token
                .strip_prefix("set_")
                .and_then(|rest| rest.strip_suffix("_for"))
                .ok_or_else(|| CommandError::Unknown(token.to_string()))
                .and_then(parse_list_type)?;
            let name = non_blank(parameter).ok_or(CommandError::MissingParameter {
                usage: set_for_usage(list_type),
            })?;
            Ok(Command::SetFor { list_type, name })
        }
        "notify" => Ok(Command::Notify {
            message: parameter.to_string(),
        }),
        "help" | "start" => Ok(Command::Help),
        "" => Err(CommandError::NotACommand),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_list_type(token: &str) -> Result<ListType, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::Unknown(token.to_string()))
}

fn set_for_usage(list_type: ListType) -> &'static str {
    match list_type {
        ListType::In => "/set_in_for <name>",
        ListType::Maybe => "/set_maybe_for <name>",
        ListType::Out => "/set_out_for <name>",
    }
}
