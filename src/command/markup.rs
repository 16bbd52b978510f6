//! Telegram MarkdownV2 rendering for mentions

use crate::lobby::roster::{Mention, MentionMarkup};

/// Characters Telegram requires escaping in MarkdownV2 text
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
    '!',
];

/// Escape free text for a MarkdownV2 message
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Inline user mentions in Telegram MarkdownV2
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramMarkdownV2;

impl MentionMarkup for TelegramMarkdownV2 {
    fn mention(&self, mention: &Mention<'_>) -> String {
        format!(
            "[{}](tg://user?id={})",
            escape_markdown_v2(mention.display_name),
            mention.telegram_id
        )
    }

    fn text(&self, text: &str) -> String {
        escape_markdown_v2(text)
    }
}
