//! Roster rendering and mention-list construction
//!
//! Everything here is a pure function of a `Lobby` snapshot.

use crate::lobby::instance::Lobby;
use crate::types::{ListType, Participant, TelegramId};

/// Sent instead of an empty mention line
pub const NO_ONE_TO_NOTIFY: &str = "There is no one to notify";

/// Render the lobby as the text posted to the chat
///
/// The title (if non-empty) comes first, then the numbered `in` list, then
/// the `Maybe:` and `Out:` sections when they have anyone in them.
pub fn format_roster(lobby: &Lobby) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(title) = lobby.title().filter(|t| !t.is_empty()) {
        lines.push(title.to_string());
    }

    lines.extend(numbered(lobby.list(ListType::In)));

    for (list_type, header) in [(ListType::Maybe, "Maybe:"), (ListType::Out, "Out:")] {
        let participants = lobby.list(list_type);
        if participants.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(header.to_string());
        lines.extend(numbered(participants));
    }

    lines.join("\n")
}

fn numbered(participants: &[Participant]) -> impl Iterator<Item = String> + '_ {
    participants.iter().enumerate().map(|(index, participant)| {
        let suffix = participant
            .description
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        format!("{}. {}{}", index + 1, participant.display_name(), suffix)
    })
}

/// A contactable attendee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention<'a> {
    pub telegram_id: TelegramId,
    pub display_name: &'a str,
}

/// Transport-specific rendering of mentions and free text
pub trait MentionMarkup {
    /// Markup that pings one user
    fn mention(&self, mention: &Mention<'_>) -> String;

    /// Free text made safe for the markup
    fn text(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Attendees on the `in` list that can be pinged, in list order
///
/// Organizer-assisted entries have no transport id and are skipped.
pub fn mention_targets(lobby: &Lobby) -> Vec<Mention<'_>> {
    lobby
        .list(ListType::In)
        .iter()
        .filter_map(|participant| {
            participant.telegram_id.map(|telegram_id| Mention {
                telegram_id,
                display_name: participant.display_name(),
            })
        })
        .collect()
}

/// Space-joined mention markup, `None` when nobody is contactable
pub fn mention_list(lobby: &Lobby, markup: &dyn MentionMarkup) -> Option<String> {
    let mentions: Vec<String> = mention_targets(lobby)
        .iter()
        .map(|mention| markup.mention(mention))
        .collect();

    if mentions.is_empty() {
        None
    } else {
        Some(mentions.join(" "))
    }
}

/// The broadcast sent by the notify command
///
/// Returns the message followed by the mentions, or the fixed
/// `NO_ONE_TO_NOTIFY` text when the mention list is empty.
pub fn notification_text(lobby: &Lobby, message: &str, markup: &dyn MentionMarkup) -> String {
    match mention_list(lobby, markup) {
        Some(mentions) if message.is_empty() => mentions,
        Some(mentions) => format!("{} {}", markup.text(message), mentions),
        None => markup.text(NO_ONE_TO_NOTIFY),
    }
}
