//! Quest write validation
//!
//! Hierarchy rules: a chapter has no parent, a plot hangs off a chapter,
//! a task hangs off a chapter or a plot. Parent chains must stay acyclic.

use crate::database::{Quest, QuestType};
use crate::error::ValidationError;
use std::collections::HashSet;

/// Check that a title is usable for display
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_estimated_time(estimated_time: Option<u32>) -> Result<(), ValidationError> {
    match estimated_time {
        Some(0) => Err(ValidationError::InvalidEstimatedTime),
        _ => Ok(()),
    }
}

/// Check that the quest `quest_id` (None when not yet created) of type
/// `quest_type` may depend on `parent_id`.
pub fn validate_parent(
    quests: &[Quest],
    quest_id: Option<&str>,
    quest_type: QuestType,
    parent_id: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };

    if quest_type == QuestType::Chapter {
        return Err(ValidationError::ChapterCannotHaveParent);
    }

    if quest_id == Some(parent_id) {
        return Err(ValidationError::SelfReference(parent_id.to_string()));
    }

    let parent = find(quests, parent_id)
        .ok_or_else(|| ValidationError::ParentNotFound(parent_id.to_string()))?;

    if !quest_type.accepts_parent(parent.quest_type) {
        return Err(ValidationError::InvalidParentType {
            child: quest_type,
            parent: parent.quest_type,
        });
    }

    if let Some(quest_id) = quest_id {
        check_acyclic(quests, quest_id, parent_id)?;
    }

    Ok(())
}

/// Walk up from `parent_id` to the root; reaching `quest_id` or revisiting
/// a node means the new link would close a loop.
fn check_acyclic(quests: &[Quest], quest_id: &str, parent_id: &str) -> Result<(), ValidationError> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = Some(parent_id);

    while let Some(id) = current {
        if id == quest_id || !visited.insert(id) {
            return Err(ValidationError::Cycle(parent_id.to_string()));
        }
        current = find(quests, id).and_then(|q| q.dependent_on.as_deref());
    }

    Ok(())
}

fn find<'a>(quests: &'a [Quest], id: &str) -> Option<&'a Quest> {
    quests.iter().find(|q| q.id == id)
}
