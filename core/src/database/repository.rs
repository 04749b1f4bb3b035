//! Repository layer for database operations
//!
//! This module provides persistence for quests and local accounts.
//! The in-memory quest store stays authoritative; this layer mirrors it.

use super::models::*;
use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const QUEST_COLUMNS: &str =
    "id, title, detail, deadline, priority, estimated_time, status, quest_type, dependent_on";

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Quests =====

    /// List all quests in creation order
    pub async fn list_quests(&self) -> Result<Vec<Quest>> {
        let quests = sqlx::query_as::<_, Quest>(&format!(
            "SELECT {} FROM quests ORDER BY rowid ASC",
            QUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(quests)
    }

    /// Insert a quest or overwrite the stored copy
    pub async fn save_quest(&self, quest: &Quest) -> Result<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO quests (
                id, title, detail, deadline, priority, estimated_time,
                status, quest_type, dependent_on, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                detail = excluded.detail,
                deadline = excluded.deadline,
                priority = excluded.priority,
                estimated_time = excluded.estimated_time,
                status = excluded.status,
                dependent_on = excluded.dependent_on,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&quest.id)
        .bind(&quest.title)
        .bind(&quest.detail)
        .bind(quest.deadline)
        .bind(quest.priority)
        .bind(quest.estimated_time)
        .bind(quest.status)
        .bind(quest.quest_type)
        .bind(&quest.dependent_on)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Saved quest: {}", quest.id);
        Ok(())
    }

    /// Delete a quest. Children keep their `dependent_on` value.
    pub async fn delete_quest(&self, id: &str) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM quests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted quest: {} ({} rows)", id, rows);
        Ok(rows > 0)
    }

    // ===== Users =====

    /// Create a local account
    pub async fn create_user(&self, req: NewUserRecord) -> Result<UserRecord> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (
                user_uuid, user_name, user_profile_pic,
                user_credential_id, user_credential_code, created_at, last_login
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&req.user_uuid)
        .bind(&req.user_name)
        .bind(&req.user_profile_pic)
        .bind(&req.user_credential_id)
        .bind(&req.user_credential_code)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created user: {} ({})", user.user_id, user.user_uuid);
        Ok(user)
    }

    /// Find an account by its login identifier (e-mail)
    pub async fn find_user_by_credential_id(&self, credential_id: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT * FROM users WHERE user_credential_id = ?",
        )
        .bind(credential_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_user_by_uuid(&self, user_uuid: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE user_uuid = ?")
            .bind(user_uuid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Stamp the account's last login with the current time
    pub async fn update_last_login(&self, user_id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE user_id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Updated last login for user: {}", user_id);
        Ok(())
    }

    /// Mirror an account signed in elsewhere.
    ///
    /// Matches an existing row by credential id or uuid and refreshes its
    /// profile fields; the stored credential hash is never touched.
    pub async fn upsert_user(&self, req: NewUserRecord) -> Result<UserRecord> {
        let existing = sqlx::query_as::<_, UserRecord>(
            "SELECT * FROM users WHERE user_credential_id = ? OR user_uuid = ? LIMIT 1",
        )
        .bind(&req.user_credential_id)
        .bind(&req.user_uuid)
        .fetch_optional(&self.pool)
        .await?;

        let Some(existing) = existing else {
            return self.create_user(req).await;
        };

        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET user_name = ?, user_profile_pic = ?, last_login = ?
            WHERE user_id = ?
            RETURNING *
            "#,
        )
        .bind(&req.user_name)
        .bind(&req.user_profile_pic)
        .bind(Utc::now())
        .bind(existing.user_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Updated mirrored user: {}", user.user_id);
        Ok(user)
    }

    // ===== Local refresh tokens =====

    pub async fn store_refresh_token(
        &self,
        token: &str,
        user_uuid: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_refresh_tokens (token, user_uuid, expires_at) VALUES (?, ?, ?)",
        )
        .bind(token)
        .bind(user_uuid)
        .bind(expires_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Consume a refresh token, returning the uuid of the user it was issued to.
    /// Each token works once, and only until it expires.
    pub async fn take_refresh_token(&self, token: &str) -> Result<Option<String>> {
        let row: Option<(String, i64)> = sqlx::query_as(
            "DELETE FROM local_refresh_tokens WHERE token = ? RETURNING user_uuid, expires_at",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .filter(|(_, expires_at)| *expires_at > Utc::now().timestamp())
            .map(|(user_uuid, _)| user_uuid))
    }

    /// Drop refresh tokens that expired before `now`
    pub async fn prune_refresh_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        let rows = sqlx::query("DELETE FROM local_refresh_tokens WHERE expires_at <= ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows > 0 {
            tracing::debug!("Pruned {} expired refresh tokens", rows);
        }
        Ok(rows)
    }

    /// Revoke every refresh token held by a user
    pub async fn revoke_refresh_tokens(&self, user_uuid: &str) -> Result<u64> {
        let rows = sqlx::query("DELETE FROM local_refresh_tokens WHERE user_uuid = ?")
            .bind(user_uuid)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Revoked {} refresh tokens for user: {}", rows, user_uuid);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    async fn create_test_repo() -> Repository {
        Repository::new(test_pool().await)
    }

    fn quest(id: &str, quest_type: QuestType, parent: Option<&str>) -> Quest {
        Quest {
            id: id.to_string(),
            title: format!("Quest {}", id),
            detail: None,
            deadline: None,
            priority: Priority::Middle,
            estimated_time: Some(25),
            status: QuestStatus::Planned,
            quest_type,
            dependent_on: parent.map(str::to_string),
        }
    }

    fn new_user(email: &str) -> NewUserRecord {
        NewUserRecord {
            user_uuid: uuid::Uuid::new_v4().to_string(),
            user_name: "Ada".to_string(),
            user_profile_pic: None,
            user_credential_id: Some(email.to_string()),
            user_credential_code: Some("hash".to_string()),
        }
    }

    #[tokio::test]
    async fn test_save_and_list_quests() {
        let repo = create_test_repo().await;

        let mut chapter = quest("c1", QuestType::Chapter, None);
        chapter.deadline = Some(Utc::now());
        repo.save_quest(&chapter).await.unwrap();
        repo.save_quest(&quest("t1", QuestType::Task, Some("c1")))
            .await
            .unwrap();

        let quests = repo.list_quests().await.unwrap();
        assert_eq!(quests.len(), 2);
        assert_eq!(quests[0].id, "c1");
        assert_eq!(quests[0].quest_type, QuestType::Chapter);
        assert!(quests[0].deadline.is_some());
        assert_eq!(quests[1].dependent_on.as_deref(), Some("c1"));
        assert_eq!(quests[1].estimated_time, Some(25));
    }

    #[tokio::test]
    async fn test_save_overwrites_and_keeps_order() {
        let repo = create_test_repo().await;

        repo.save_quest(&quest("a", QuestType::Task, None)).await.unwrap();
        repo.save_quest(&quest("b", QuestType::Task, None)).await.unwrap();

        let mut first = quest("a", QuestType::Task, None);
        first.status = QuestStatus::Done;
        first.title = "Renamed".to_string();
        repo.save_quest(&first).await.unwrap();

        let quests = repo.list_quests().await.unwrap();
        let ids: Vec<&str> = quests.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(quests[0].status, QuestStatus::Done);
        assert_eq!(quests[0].title, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_quest_leaves_children() {
        let repo = create_test_repo().await;

        repo.save_quest(&quest("c1", QuestType::Chapter, None)).await.unwrap();
        repo.save_quest(&quest("p1", QuestType::Plot, Some("c1"))).await.unwrap();

        assert!(repo.delete_quest("c1").await.unwrap());
        assert!(!repo.delete_quest("c1").await.unwrap());

        let quests = repo.list_quests().await.unwrap();
        assert_eq!(quests.len(), 1);
        assert_eq!(quests[0].dependent_on.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = create_test_repo().await;

        let created = repo.create_user(new_user("ada@example.com")).await.unwrap();
        assert!(created.last_login.is_some());

        let found = repo
            .find_user_by_credential_id("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, created.user_id);
        assert_eq!(found.user_credential_code.as_deref(), Some("hash"));

        let by_uuid = repo.find_user_by_uuid(&created.user_uuid).await.unwrap();
        assert!(by_uuid.is_some());

        let missing = repo.find_user_by_credential_id("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_credential_id_rejected() {
        let repo = create_test_repo().await;

        repo.create_user(new_user("ada@example.com")).await.unwrap();
        let result = repo.create_user(new_user("ada@example.com")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_upsert_user_keeps_credential_hash() {
        let repo = create_test_repo().await;

        let created = repo.create_user(new_user("ada@example.com")).await.unwrap();

        let mirrored = repo
            .upsert_user(NewUserRecord {
                user_uuid: "remote-uuid".to_string(),
                user_name: "Ada L.".to_string(),
                user_profile_pic: Some("ada.png".to_string()),
                user_credential_id: Some("ada@example.com".to_string()),
                user_credential_code: None,
            })
            .await
            .unwrap();

        assert_eq!(mirrored.user_id, created.user_id);
        assert_eq!(mirrored.user_name, "Ada L.");
        assert_eq!(mirrored.user_profile_pic.as_deref(), Some("ada.png"));
        assert_eq!(mirrored.user_credential_code.as_deref(), Some("hash"));

        let fresh = repo
            .upsert_user(NewUserRecord {
                user_uuid: "other-uuid".to_string(),
                user_name: "Grace".to_string(),
                user_profile_pic: None,
                user_credential_id: Some("grace@example.com".to_string()),
                user_credential_code: None,
            })
            .await
            .unwrap();
        assert_ne!(fresh.user_id, created.user_id);
    }

    #[tokio::test]
    async fn test_refresh_tokens_single_use() {
        let repo = create_test_repo().await;

        let expires_at = Utc::now() + chrono::Duration::days(1);
        repo.store_refresh_token("tok-1", "user-a", expires_at).await.unwrap();
        repo.store_refresh_token("tok-2", "user-a", expires_at).await.unwrap();
        repo.store_refresh_token("tok-3", "user-b", expires_at).await.unwrap();

        assert_eq!(
            repo.take_refresh_token("tok-1").await.unwrap().as_deref(),
            Some("user-a")
        );
        assert_eq!(repo.take_refresh_token("tok-1").await.unwrap(), None);

        assert_eq!(repo.revoke_refresh_tokens("user-a").await.unwrap(), 1);
        assert_eq!(repo.take_refresh_token("tok-2").await.unwrap(), None);
        assert!(repo.take_refresh_token("tok-3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_refresh_tokens_rejected_and_pruned() {
        let repo = create_test_repo().await;
        let now = Utc::now();

        repo.store_refresh_token("stale-1", "user-a", now - chrono::Duration::days(1))
            .await
            .unwrap();
        repo.store_refresh_token("stale-2", "user-b", now - chrono::Duration::seconds(5))
            .await
            .unwrap();
        repo.store_refresh_token("fresh", "user-a", now + chrono::Duration::days(1))
            .await
            .unwrap();

        assert_eq!(repo.take_refresh_token("stale-1").await.unwrap(), None);

        assert_eq!(repo.prune_refresh_tokens(now).await.unwrap(), 1);
        assert_eq!(repo.prune_refresh_tokens(now).await.unwrap(), 0);
        assert_eq!(
            repo.take_refresh_token("fresh").await.unwrap().as_deref(),
            Some("user-a")
        );
    }
}
