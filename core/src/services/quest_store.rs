//! In-memory quest store
//!
//! The authoritative collection of quests for one user session. Every
//! derived query builds a fresh list from the live collection, so there is
//! nothing to cache or invalidate. Unknown ids are never an error: updates,
//! deletes and toggles on them are silent no-ops.

use super::quest_validation::{validate_estimated_time, validate_parent, validate_title};
use crate::database::{NewQuest, Quest, QuestPatch, QuestStatus, QuestType};
use crate::error::ValidationError;
use std::collections::HashSet;
use uuid::Uuid;

/// Insertion-ordered quest collection
#[derive(Debug, Clone, Default)]
pub struct QuestStore {
    quests: Vec<Quest>,
    /// Every id handed out or loaded, deleted ones included
    issued_ids: HashSet<String>,
}

impl QuestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted records, keeping their order
    pub fn from_quests(quests: Vec<Quest>) -> Self {
        let issued_ids = quests.iter().map(|q| q.id.clone()).collect();
        Self { quests, issued_ids }
    }

    /// All quests in insertion order
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Validate and append a new quest under a freshly issued id
    pub fn add_quest(&mut self, new_quest: NewQuest) -> Result<Quest, ValidationError> {
        validate_title(&new_quest.title)?;
        validate_estimated_time(new_quest.estimated_time)?;
        validate_parent(
            &self.quests,
            None,
            new_quest.quest_type,
            new_quest.dependent_on.as_deref(),
        )?;

        let quest = new_quest.into_quest(self.issue_id());
        self.quests.push(quest.clone());

        Ok(quest)
    }

    /// Merge `patch` into the quest with `id`.
    ///
    /// Returns `Ok(None)` when no such quest exists. Only the fields the
    /// patch touches are validated, so an orphan whose parent was deleted
    /// can still be renamed.
    pub fn update_quest(
        &mut self,
        id: &str,
        patch: QuestPatch,
    ) -> Result<Option<Quest>, ValidationError> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let touches_title = patch.title.is_some();
        let touches_estimate = patch.estimated_time.is_some();
        let touches_parent = patch.dependent_on.is_some();

        let mut updated = self.quests[index].clone();
        patch.apply_to(&mut updated);

        if touches_title {
            validate_title(&updated.title)?;
        }
        if touches_estimate {
            validate_estimated_time(updated.estimated_time)?;
        }
        if touches_parent {
            validate_parent(
                &self.quests,
                Some(&updated.id),
                updated.quest_type,
                updated.dependent_on.as_deref(),
            )?;
        }

        self.quests[index] = updated.clone();
        Ok(Some(updated))
    }

    /// Remove a quest without touching quests that depend on it
    pub fn delete_quest(&mut self, id: &str) -> Option<Quest> {
        let index = self.position(id)?;
        Some(self.quests.remove(index))
    }

    pub fn get_quest_by_id(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn task_quests(&self) -> Vec<Quest> {
        self.by_type(QuestType::Task)
    }

    pub fn chapter_quests(&self) -> Vec<Quest> {
        self.by_type(QuestType::Chapter)
    }

    pub fn plot_quests(&self) -> Vec<Quest> {
        self.by_type(QuestType::Plot)
    }

    /// Every quest whose parent is `parent_id`, whatever its type
    pub fn quests_by_parent(&self, parent_id: &str) -> Vec<Quest> {
        self.filtered(|q| q.dependent_on.as_deref() == Some(parent_id))
    }

    /// Tasks that never declared a parent. A task whose parent was deleted
    /// still counts as attached.
    pub fn orphaned_tasks(&self) -> Vec<Quest> {
        self.filtered(|q| q.quest_type == QuestType::Task && q.dependent_on.is_none())
    }

    /// Two-way toggle: `done` goes back to `in_progress`, anything else
    /// (including `planned`) becomes `done`.
    pub fn toggle_quest_status(&mut self, id: &str) -> Option<QuestStatus> {
        let index = self.position(id)?;
        let quest = &mut self.quests[index];

        quest.status = match quest.status {
            QuestStatus::Done => QuestStatus::InProgress,
            QuestStatus::Planned | QuestStatus::InProgress => QuestStatus::Done,
        };

        Some(quest.status)
    }

    fn issue_id(&mut self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.quests.iter().position(|q| q.id == id)
    }

    fn by_type(&self, quest_type: QuestType) -> Vec<Quest> {
        self.filtered(|q| q.quest_type == quest_type)
    }

    fn filtered(&self, predicate: impl Fn(&Quest) -> bool) -> Vec<Quest> {
        self.quests.iter().filter(|q| predicate(q)).cloned().collect()
    }
}
