//! Lobby document and its membership transitions
//!
//! A `Lobby` is the whole unit of persistence: the manager loads one, mutates
//! it through the methods here and saves it back in full.

use crate::types::{ChatId, Identity, ListType, LobbyId, Participant};
use crate::utils::{current_timestamp, generate_lobby_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The open roster for one chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lobby {
    id: LobbyId,
    chat_id: ChatId,
    title: Option<String>,
    lists: BTreeMap<ListType, Vec<Participant>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Lobby {
    /// Create an empty lobby for a chat
    pub fn new(chat_id: ChatId, title: Option<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: generate_lobby_id(),
            chat_id,
            title,
            lists: ListType::ALL
                .into_iter()
                .map(|list_type| (list_type, Vec::new()))
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> LobbyId {
        self.id
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Participants on a list, in join order
    pub fn list(&self, list_type: ListType) -> &[Participant] {
        self.lists
            .get(&list_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of participants across all lists
    pub fn participant_count(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Which list, if any, holds the participant with this display name
    pub fn find(&self, display_name: &str) -> Option<(ListType, usize)> {
        ListType::ALL.into_iter().find_map(|list_type| {
            self.list(list_type)
                .iter()
                .position(|p| p.display_name() == display_name)
                .map(|index| (list_type, index))
        })
    }

    /// Replace the title verbatim; an empty title is kept as-is
    pub fn set_title(&mut self, title: String) {
        self.title = Some(title);
        self.touch();
    }

    /// Drop every entry matching `display_name` from all three lists
    ///
    /// Returns how many entries were removed. More than one only happens for
    /// documents written before the single-membership rule held.
    pub fn remove(&mut self, display_name: &str) -> usize {
        let mut removed = 0;
        for participants in self.lists.values_mut() {
            let before = participants.len();
            participants.retain(|p| p.display_name() != display_name);
            removed += before - participants.len();
        }
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Put `identity` at the end of `list_type`, removing it from wherever it was
    pub fn place(
        &mut self,
        list_type: ListType,
        identity: Identity,
        description: Option<String>,
    ) -> &Participant {
        let participant = Participant::new(identity, description);
        self.remove(participant.display_name());

        let target = self.lists.entry(list_type).or_default();
        target.push(participant);
        let index = target.len() - 1;
        self.touch();

        &self.lists[&list_type][index]
    }

    fn touch(&mut self) {
        self.updated_at = current_timestamp();
    }
}
