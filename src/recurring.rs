//! Recurring tasks across every stored day.

use crate::errors::StoreError;
use crate::models::{DailyRecord, TaskCategory};
use crate::storage::RecordStore;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurringError {
    #[error("recurring task text must not be empty")]
    EmptyText,
    #[error("\"{0}\" is already a recurring task")]
    AlreadyRecurring(String),
    #[error("all task slots are filled; clear some space first")]
    NoSpace,
}

pub async fn list_recurring(store: &RecordStore) -> Result<BTreeSet<String>, StoreError> {
    Ok(store
        .fetch_all()
        .await?
        .into_iter()
        .flat_map(|(_, record)| record.recurring)
        .collect())
}

pub fn validate_new(text: &str, known: &BTreeSet<String>) -> Result<String, RecurringError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RecurringError::EmptyText);
    }
    if known.contains(text) {
        return Err(RecurringError::AlreadyRecurring(text.to_string()));
    }
    Ok(text.to_string())
}

pub fn mark_recurring(record: &mut DailyRecord, text: &str) -> Result<(), RecurringError> {
    if text.is_empty() {
        return Err(RecurringError::EmptyText);
    }
    record.recurring.insert(text.to_string());
    Ok(())
}

pub fn place_in_first_empty_slot(
    record: &mut DailyRecord,
    text: &str,
) -> Result<(TaskCategory, usize), RecurringError> {
    if text.is_empty() {
        return Err(RecurringError::EmptyText);
    }
    let (category, slot) = record.first_empty_slot().ok_or(RecurringError::NoSpace)?;
    record.tasks_mut(category)[slot].text = text.to_string();
    record.recurring.insert(text.to_string());
    Ok((category, slot))
}

pub async fn remove_everywhere(store: &RecordStore, text: &str) -> Result<usize, StoreError> {
    let mut changed = 0;
    for (date, mut record) in store.fetch_all().await? {
        if record.recurring.remove(text) {
            store.put(date, &record).await?;
            changed += 1;
        }
    }
    info!("removed recurring task {text:?} from {changed} day(s)");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    async fn temp_store(label: &str) -> RecordStore {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        RecordStore::local(std::env::temp_dir().join(format!(
            "daily_planner_recurring_{label}_{}_{nanos}.json",
            std::process::id()
        )))
        .await
    }

    #[test]
    fn placement_follows_category_priority() {
        let mut record = DailyRecord::default();
        for slot in 0..5 {
            record.set_task_text(TaskCategory::MustDo, slot, "busy").unwrap();
        }
        assert_eq!(
            place_in_first_empty_slot(&mut record, "Stretch"),
            Ok((TaskCategory::SecondPriority, 0))
        );
        assert!(record.recurring.contains("Stretch"));

        for category in TaskCategory::PRIORITIZED {
            for slot in 0..category.capacity() {
                record.set_task_text(category, slot, "busy").unwrap();
            }
        }
        assert_eq!(
            place_in_first_empty_slot(&mut record, "Nope"),
            Err(RecurringError::NoSpace)
        );
        assert_eq!(record.self_care[0].text, "");
    }

    #[test]
    fn new_texts_must_be_unique_and_non_blank() {
        let known: BTreeSet<String> = ["Water plants".to_string()].into();
        assert_eq!(validate_new("  ", &known), Err(RecurringError::EmptyText));
        assert_eq!(
            validate_new("Water plants", &known),
            Err(RecurringError::AlreadyRecurring("Water plants".into()))
        );
        assert_eq!(validate_new(" Journal ", &known), Ok("Journal".to_string()));
    }

    #[tokio::test]
    async fn listing_and_removal_span_all_days() {
        let store = temp_store("span").await;
        let mut monday = DailyRecord::default();
        mark_recurring(&mut monday, "Gym").unwrap();
        mark_recurring(&mut monday, "Read").unwrap();
        let mut tuesday = DailyRecord::default();
        mark_recurring(&mut tuesday, "Gym").unwrap();
        store.put(date("2026-02-02"), &monday).await.unwrap();
        store.put(date("2026-02-03"), &tuesday).await.unwrap();
        store.put(date("2026-02-04"), &DailyRecord::default()).await.unwrap();

        let all = list_recurring(&store).await.unwrap();
        assert_eq!(all.into_iter().collect::<Vec<_>>(), vec!["Gym", "Read"]);

        assert_eq!(remove_everywhere(&store, "Gym").await.unwrap(), 2);
        let all = list_recurring(&store).await.unwrap();
        assert_eq!(all.into_iter().collect::<Vec<_>>(), vec!["Read"]);
    }
}
