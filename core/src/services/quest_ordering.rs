//! Display ordering for quest lists
//!
//! Keys, first difference wins:
//! 1. status: in progress, planned, done
//! 2. priority: high, middle, low
//! 3. deadline: earlier first, any deadline before none
//! 4. estimated time ascending, missing counted as one pomodoro

use crate::config::DEFAULT_ESTIMATED_MINUTES;
use crate::database::{Quest, QuestType};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Total order used by the active-quests list
pub fn compare_quests(a: &Quest, b: &Quest) -> Ordering {
    a.status
        .rank()
        .cmp(&b.status.rank())
        .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
        .then_with(|| match (a.deadline, b.deadline) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| estimated_minutes(a).cmp(&estimated_minutes(b)))
}

/// Stable sort; quests equal on every key keep their relative order
pub fn sort_for_display(quests: &mut [Quest]) {
    quests.sort_by(compare_quests);
}

fn estimated_minutes(quest: &Quest) -> u32 {
    quest.estimated_time.unwrap_or(DEFAULT_ESTIMATED_MINUTES)
}

/// View-local set of quests hidden while their completion effect plays.
///
/// Lives next to the list that shows it, never in the store: the quest is
/// already `done` in the data model the moment it is toggled.
#[derive(Debug, Clone, Default)]
pub struct CompletionSuppression {
    hidden: HashSet<String>,
}

impl CompletionSuppression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide a quest until `release` is called for it
    pub fn suppress(&mut self, id: impl Into<String>) {
        self.hidden.insert(id.into());
    }

    /// The completion acknowledgment finished
    pub fn release(&mut self, id: &str) {
        self.hidden.remove(id);
    }

    pub fn clear(&mut self) {
        self.hidden.clear();
    }

    pub fn is_visible(&self, quest: &Quest) -> bool {
        !self.hidden.contains(&quest.id)
    }
}

/// Task quests minus suppressed ones, in display order
pub fn active_task_view(
    quests: impl IntoIterator<Item = Quest>,
    suppression: &CompletionSuppression,
) -> Vec<Quest> {
    let mut visible: Vec<Quest> = quests
        .into_iter()
        .filter(|q| q.quest_type == QuestType::Task && suppression.is_visible(q))
        .collect();

    sort_for_display(&mut visible);
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Priority, QuestStatus};
    use chrono::{Duration, Utc};

    fn task(id: &str, status: QuestStatus, priority: Priority) -> Quest {
        Quest {
            id: id.to_string(),
            title: id.to_string(),
            detail: None,
            deadline: None,
            priority,
            estimated_time: None,
            status,
            quest_type: QuestType::Task,
            dependent_on: None,
        }
    }

    fn ids(quests: &[Quest]) -> Vec<&str> {
        quests.iter().map(|q| q.id.as_str()).collect()
    }

    #[test]
    fn test_earlier_deadline_first() {
        let now = Utc::now();
        let mut a = task("a", QuestStatus::InProgress, Priority::High);
        a.deadline = Some(now + Duration::hours(1));
        let mut b = task("b", QuestStatus::InProgress, Priority::High);
        b.deadline = Some(now + Duration::hours(2));

        let mut quests = vec![b, a];
        sort_for_display(&mut quests);
        assert_eq!(ids(&quests), vec!["a", "b"]);
    }

    #[test]
    fn test_status_beats_priority_and_deadline() {
        let mut planned = task("planned", QuestStatus::Planned, Priority::High);
        planned.deadline = Some(Utc::now());
        let in_progress = task("in_progress", QuestStatus::InProgress, Priority::Low);

        assert_eq!(compare_quests(&in_progress, &planned), Ordering::Less);

        let done = task("done", QuestStatus::Done, Priority::High);
        let mut quests = vec![done, planned, in_progress];
        sort_for_display(&mut quests);
        assert_eq!(ids(&quests), vec!["in_progress", "planned", "done"]);
    }

    #[test]
    fn test_priority_order() {
        let mut quests = vec![
            task("low", QuestStatus::Planned, Priority::Low),
            task("high", QuestStatus::Planned, Priority::High),
            task("middle", QuestStatus::Planned, Priority::Middle),
        ];
        sort_for_display(&mut quests);
        assert_eq!(ids(&quests), vec!["high", "middle", "low"]);
    }

    #[test]
    fn test_missing_deadline_sorts_last() {
        let none = task("none", QuestStatus::Planned, Priority::Middle);
        let mut far = task("far", QuestStatus::Planned, Priority::Middle);
        far.deadline = Some(Utc::now() + Duration::days(365));

        assert_eq!(compare_quests(&far, &none), Ordering::Less);
        assert_eq!(compare_quests(&none, &far), Ordering::Greater);
    }

    #[test]
    fn test_estimated_time_defaults_to_pomodoro() {
        let unset = task("unset", QuestStatus::Planned, Priority::Middle);
        let mut short = task("short", QuestStatus::Planned, Priority::Middle);
        short.estimated_time = Some(10);
        let mut exact = task("exact", QuestStatus::Planned, Priority::Middle);
        exact.estimated_time = Some(25);
        let mut long = task("long", QuestStatus::Planned, Priority::Middle);
        long.estimated_time = Some(90);

        assert_eq!(compare_quests(&unset, &exact), Ordering::Equal);

        let mut quests = vec![long, unset, short, exact];
        sort_for_display(&mut quests);
        // unset and exact tie; stable sort keeps unset first
        assert_eq!(ids(&quests), vec!["short", "unset", "exact", "long"]);
    }

    #[test]
    fn test_active_view_filters_and_sorts() {
        let mut chapter = task("chapter", QuestStatus::InProgress, Priority::High);
        chapter.quest_type = QuestType::Chapter;

        let quests = vec![
            chapter,
            task("done", QuestStatus::Done, Priority::High),
            task("just_done", QuestStatus::Done, Priority::High),
            task("planned", QuestStatus::Planned, Priority::Low),
            task("busy", QuestStatus::InProgress, Priority::Middle),
        ];

        let mut suppression = CompletionSuppression::new();
        suppression.suppress("just_done");

        let view = active_task_view(quests.clone(), &suppression);
        assert_eq!(ids(&view), vec!["busy", "planned", "done"]);

        suppression.release("just_done");
        let view = active_task_view(quests, &suppression);
        assert_eq!(ids(&view), vec!["busy", "planned", "done", "just_done"]);
    }
}
