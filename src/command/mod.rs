//! Chat command layer
//!
//! Parses command text, dispatches it to the lobby manager and renders the
//! reply for the transport.

pub mod dispatcher;
pub mod markup;
pub mod parser;

pub use dispatcher::CommandDispatcher;
pub use markup::{escape_markdown_v2, TelegramMarkdownV2};
pub use parser::{parse_command, Command, CommandError};
