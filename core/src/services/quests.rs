//! Quests service
//!
//! High-level business logic for quest operations.
//! Wraps the in-memory store and writes every change through to SQLite.

use super::quest_ordering::{active_task_view, CompletionSuppression};
use super::quest_store::QuestStore;
use crate::database::{NewQuest, Quest, QuestPatch, QuestStatus, Repository};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Service for managing quests
#[derive(Clone)]
pub struct QuestService {
    repo: Repository,
    store: Arc<RwLock<QuestStore>>,
}

impl QuestService {
    /// Build the service from the quests already on disk
    pub async fn load(repo: Repository) -> Result<Self> {
        let quests = repo.list_quests().await?;
        tracing::info!("Loaded {} quests", quests.len());

        Ok(Self {
            repo,
            store: Arc::new(RwLock::new(QuestStore::from_quests(quests))),
        })
    }

    /// Create a new quest
    pub async fn add_quest(&self, new_quest: NewQuest) -> Result<Quest> {
        tracing::info!("Creating {} quest: {}", new_quest.quest_type, new_quest.title);

        let mut store = self.store.write().await;
        let mut next = store.clone();
        let quest = next.add_quest(new_quest)?;

        self.repo.save_quest(&quest).await?;
        *store = next;

        tracing::info!("Quest created successfully: {}", quest.id);
        Ok(quest)
    }

    /// Quick-add a task from a single line of text
    pub async fn quick_add(&self, title: &str) -> Result<Quest> {
        self.add_quest(NewQuest::quick(title.trim())).await
    }

    /// Update a quest. `Ok(None)` when the id is unknown.
    pub async fn update_quest(&self, id: &str, patch: QuestPatch) -> Result<Option<Quest>> {
        tracing::debug!("Updating quest: {}", id);

        let mut store = self.store.write().await;
        let mut next = store.clone();
        let Some(quest) = next.update_quest(id, patch)? else {
            tracing::debug!("Update ignored, quest not found: {}", id);
            return Ok(None);
        };

        self.repo.save_quest(&quest).await?;
        *store = next;

        Ok(Some(quest))
    }

    /// Delete a quest. Children are left pointing at the removed id.
    pub async fn delete_quest(&self, id: &str) -> Result<bool> {
        tracing::info!("Deleting quest: {}", id);

        let mut store = self.store.write().await;
        let mut next = store.clone();
        if next.delete_quest(id).is_none() {
            return Ok(false);
        }

        self.repo.delete_quest(id).await?;
        *store = next;

        Ok(true)
    }

    /// Flip a quest between done and in progress
    pub async fn toggle_quest_status(&self, id: &str) -> Result<Option<QuestStatus>> {
        let mut store = self.store.write().await;
        let mut next = store.clone();
        let Some(status) = next.toggle_quest_status(id) else {
            return Ok(None);
        };

        if let Some(quest) = next.get_quest_by_id(id) {
            self.repo.save_quest(quest).await?;
        }
        *store = next;

        tracing::debug!("Quest {} is now {:?}", id, status);
        Ok(Some(status))
    }

    pub async fn get_quest(&self, id: &str) -> Option<Quest> {
        self.store.read().await.get_quest_by_id(id).cloned()
    }

    pub async fn list_quests(&self) -> Vec<Quest> {
        self.store.read().await.quests().to_vec()
    }

    pub async fn task_quests(&self) -> Vec<Quest> {
        self.store.read().await.task_quests()
    }

    pub async fn chapter_quests(&self) -> Vec<Quest> {
        self.store.read().await.chapter_quests()
    }

    pub async fn plot_quests(&self) -> Vec<Quest> {
        self.store.read().await.plot_quests()
    }

    pub async fn quests_by_parent(&self, parent_id: &str) -> Vec<Quest> {
        self.store.read().await.quests_by_parent(parent_id)
    }

    pub async fn orphaned_tasks(&self) -> Vec<Quest> {
        self.store.read().await.orphaned_tasks()
    }

    /// Tasks for the active-quests list, sorted for display
    pub async fn active_tasks(&self, suppression: &CompletionSuppression) -> Vec<Quest> {
        let tasks = self.task_quests().await;
        active_task_view(tasks, suppression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{test_pool, Priority, QuestType};
    use crate::error::{AppError, ValidationError};

    async fn create_test_service() -> (QuestService, Repository) {
        let repo = Repository::new(test_pool().await);
        let service = QuestService::load(repo.clone()).await.unwrap();
        (service, repo)
    }

    fn chapter(title: &str) -> NewQuest {
        NewQuest {
            title: title.to_string(),
            detail: None,
            deadline: None,
            priority: Priority::High,
            estimated_time: None,
            status: QuestStatus::Planned,
            quest_type: QuestType::Chapter,
            dependent_on: None,
        }
    }

    #[tokio::test]
    async fn test_add_persists_quest() {
        let (service, repo) = create_test_service().await;

        let quest = service.quick_add("  Review notes  ").await.unwrap();
        assert_eq!(quest.title, "Review notes");

        let stored = repo.list_quests().await.unwrap();
        assert_eq!(stored, vec![quest.clone()]);
        assert_eq!(service.get_quest(&quest.id).await, Some(quest));
    }

    #[tokio::test]
    async fn test_validation_error_surfaces() {
        let (service, repo) = create_test_service().await;

        let mut bad = NewQuest::quick("Task");
        bad.dependent_on = Some("missing".to_string());

        let result = service.add_quest(bad).await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::ParentNotFound(_)))
        ));
        assert!(service.list_quests().await.is_empty());
        assert!(repo.list_quests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_toggle_and_delete_write_through() {
        let (service, repo) = create_test_service().await;

        let parent = service.add_quest(chapter("Thesis")).await.unwrap();
        let mut child = NewQuest::quick("Outline");
        child.dependent_on = Some(parent.id.clone());
        let child = service.add_quest(child).await.unwrap();

        let updated = service
            .update_quest(
                &child.id,
                QuestPatch {
                    detail: Some(Some("Three sections".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.detail.as_deref(), Some("Three sections"));

        let status = service.toggle_quest_status(&child.id).await.unwrap();
        assert_eq!(status, Some(QuestStatus::Done));

        assert!(service.delete_quest(&parent.id).await.unwrap());
        assert!(!service.delete_quest(&parent.id).await.unwrap());

        let stored = repo.list_quests().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, QuestStatus::Done);
        assert_eq!(stored[0].detail.as_deref(), Some("Three sections"));
        assert_eq!(stored[0].dependent_on.as_deref(), Some(parent.id.as_str()));

        assert!(service.quests_by_parent(&parent.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_noops() {
        let (service, _repo) = create_test_service().await;

        assert_eq!(
            service
                .update_quest("missing", QuestPatch::default())
                .await
                .unwrap(),
            None
        );
        assert_eq!(service.toggle_quest_status("missing").await.unwrap(), None);
        assert!(!service.delete_quest("missing").await.unwrap());
        assert!(service.get_quest("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_reload_restores_store() {
        let (service, repo) = create_test_service().await;

        let first = service.quick_add("First").await.unwrap();
        let second = service.add_quest(chapter("Second")).await.unwrap();

        let reloaded = QuestService::load(repo).await.unwrap();
        let quests = reloaded.list_quests().await;
        assert_eq!(quests, vec![first, second]);
        assert_eq!(reloaded.chapter_quests().await.len(), 1);
        assert_eq!(reloaded.orphaned_tasks().await.len(), 1);
    }

    #[tokio::test]
    async fn test_active_tasks_sorted() {
        let (service, _repo) = create_test_service().await;

        let planned = service
            .add_quest(NewQuest {
                status: QuestStatus::Planned,
                ..NewQuest::quick("Later")
            })
            .await
            .unwrap();
        let busy = service.quick_add("Now").await.unwrap();
        service.add_quest(chapter("Not a task")).await.unwrap();

        let view = service.active_tasks(&CompletionSuppression::new()).await;
        let ids: Vec<String> = view.into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![busy.id, planned.id]);
    }
}
