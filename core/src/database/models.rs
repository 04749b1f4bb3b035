//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Position of a quest in the chapter → plot → task hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestType {
    Chapter,
    Plot,
    Task,
}

impl QuestType {
    /// Whether a quest of this type may declare `parent` as its parent
    pub fn accepts_parent(self, parent: QuestType) -> bool {
        match self {
            QuestType::Chapter => false,
            QuestType::Plot => parent == QuestType::Chapter,
            QuestType::Task => matches!(parent, QuestType::Chapter | QuestType::Plot),
        }
    }
}

impl fmt::Display for QuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestType::Chapter => "chapter",
            QuestType::Plot => "plot",
            QuestType::Task => "task",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestStatus {
    Planned,
    InProgress,
    Done,
}

impl QuestStatus {
    /// Display rank: in-progress work first, finished work last
    pub fn rank(self) -> u8 {
        match self {
            QuestStatus::InProgress => 0,
            QuestStatus::Planned => 1,
            QuestStatus::Done => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Priority {
    High,
    Middle,
    Low,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Middle => 1,
            Priority::Low => 2,
        }
    }
}

/// A trackable unit of work: chapter, plot or task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub detail: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Priority,
    /// Minutes; display falls back to one pomodoro when absent
    pub estimated_time: Option<u32>,
    pub status: QuestStatus,
    pub quest_type: QuestType,
    /// Id of the parent chapter or plot
    pub dependent_on: Option<String>,
}

/// Create quest request (every quest field except the id)
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuest {
    pub title: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Priority,
    #[serde(default)]
    pub estimated_time: Option<u32>,
    pub status: QuestStatus,
    pub quest_type: QuestType,
    #[serde(default)]
    pub dependent_on: Option<String>,
}

impl NewQuest {
    /// Quick-add shortcut: an in-progress, middle-priority task
    pub fn quick(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
            deadline: None,
            priority: Priority::Middle,
            estimated_time: None,
            status: QuestStatus::InProgress,
            quest_type: QuestType::Task,
            dependent_on: None,
        }
    }

    pub(crate) fn into_quest(self, id: String) -> Quest {
        Quest {
            id,
            title: self.title,
            detail: self.detail,
            deadline: self.deadline,
            priority: self.priority,
            estimated_time: self.estimated_time,
            status: self.status,
            quest_type: self.quest_type,
            dependent_on: self.dependent_on,
        }
    }
}

/// Update quest request
///
/// `quest_type` has no field here: a quest keeps its type for life.
/// Clearable fields are doubly optional so `Some(None)` clears the value
/// while `None` leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub detail: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub estimated_time: Option<Option<u32>>,
    #[serde(default)]
    pub status: Option<QuestStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub dependent_on: Option<Option<String>>,
}

impl QuestPatch {
    /// Merge the patch into `quest`
    pub fn apply_to(self, quest: &mut Quest) {
        if let Some(title) = self.title {
            quest.title = title;
        }
        if let Some(detail) = self.detail {
            quest.detail = detail;
        }
        if let Some(deadline) = self.deadline {
            quest.deadline = deadline;
        }
        if let Some(priority) = self.priority {
            quest.priority = priority;
        }
        if let Some(estimated_time) = self.estimated_time {
            quest.estimated_time = estimated_time;
        }
        if let Some(status) = self.status {
            quest.status = status;
        }
        if let Some(dependent_on) = self.dependent_on {
            quest.dependent_on = dependent_on;
        }
    }
}

// An explicit JSON `null` must become `Some(None)` rather than `None`.
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Local account record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub user_id: i64,
    pub user_uuid: String,
    pub user_name: String,
    pub user_profile_pic: Option<String>,
    pub user_credential_id: Option<String>,
    /// Argon2 PHC string; never sent to the frontend
    #[serde(skip_serializing)]
    pub user_credential_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Create user request
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub user_uuid: String,
    pub user_name: String,
    pub user_profile_pic: Option<String>,
    pub user_credential_id: Option<String>,
    pub user_credential_code: Option<String>,
}
