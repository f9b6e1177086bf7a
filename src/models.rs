use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub const HOURS_PER_DAY: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    MustDo,
    SecondPriority,
    ExtraTime,
    SelfCare,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::MustDo,
        TaskCategory::SecondPriority,
        TaskCategory::ExtraTime,
        TaskCategory::SelfCare,
    ];

    /// Categories that receive carried-over and recurring tasks, in fill order.
    pub const PRIORITIZED: [TaskCategory; 3] = [
        TaskCategory::MustDo,
        TaskCategory::SecondPriority,
        TaskCategory::ExtraTime,
    ];

    pub fn capacity(self) -> usize {
        match self {
            TaskCategory::MustDo => 5,
            TaskCategory::SecondPriority => 4,
            TaskCategory::ExtraTime => 4,
            TaskCategory::SelfCare => 3,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            TaskCategory::MustDo => "must",
            TaskCategory::SecondPriority => "second",
            TaskCategory::ExtraTime => "extra",
            TaskCategory::SelfCare => "selfcare",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.prefix() == prefix)
    }

    pub fn key(self) -> &'static str {
        match self {
            TaskCategory::MustDo => "must_do",
            TaskCategory::SecondPriority => "second_priority",
            TaskCategory::ExtraTime => "extra_time",
            TaskCategory::SelfCare => "self_care",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskCategory::MustDo => "Must do",
            TaskCategory::SecondPriority => "Second priority",
            TaskCategory::ExtraTime => "If I have extra time / lessons",
            TaskCategory::SelfCare => "Self-care",
        }
    }

    pub fn estimate_key(self, slot: usize) -> String {
        format!("{}-{slot}", self.prefix())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskEntry {
    pub text: String,
    pub completed: bool,
}

impl TaskEntry {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayStatus {
    #[default]
    #[serde(rename = "TO START", alias = "TO_START")]
    ToStart,
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "DELAY")]
    Delay,
    #[serde(rename = "STUCK")]
    Stuck,
    #[serde(rename = "CANCEL")]
    Cancel,
}

impl DayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::ToStart => "TO START",
            DayStatus::Ok => "OK",
            DayStatus::Delay => "DELAY",
            DayStatus::Stuck => "STUCK",
            DayStatus::Cancel => "CANCEL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TO START" | "TO_START" => Some(DayStatus::ToStart),
            "OK" => Some(DayStatus::Ok),
            "DELAY" => Some(DayStatus::Delay),
            "STUCK" => Some(DayStatus::Stuck),
            "CANCEL" => Some(DayStatus::Cancel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewWindow {
    #[serde(rename = "viewMode")]
    pub mode: ViewMode,
    #[serde(rename = "startHour")]
    pub start_hour: u8,
    #[serde(rename = "endHour")]
    pub end_hour: u8,
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self {
            mode: ViewMode::All,
            start_hour: 0,
            end_hour: HOURS_PER_DAY - 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyRecord {
    #[serde(flatten)]
    pub view_window: ViewWindow,
    #[serde(rename = "scheduleItems")]
    pub schedule: BTreeMap<u8, String>,
    #[serde(rename = "mustDoItems")]
    pub must_do: [TaskEntry; 5],
    #[serde(rename = "secondPriorityItems")]
    pub second_priority: [TaskEntry; 4],
    #[serde(rename = "extraTimeItems")]
    pub extra_time: [TaskEntry; 4],
    #[serde(rename = "selfCareItems")]
    pub self_care: [TaskEntry; 3],
    #[serde(rename = "gratefulItems")]
    pub gratitude: [String; 3],
    #[serde(rename = "taskStatus")]
    pub status: DayStatus,
    #[serde(rename = "timeEstimates")]
    pub time_estimates: BTreeMap<String, u32>,
    #[serde(rename = "recurringTasks")]
    pub recurring: BTreeSet<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("hour {0} is outside 0-23")]
    HourOutOfRange(u8),
    #[error("{category:?} has no slot {slot}")]
    SlotOutOfRange { category: TaskCategory, slot: usize },
    #[error("gratitude entry {0} does not exist")]
    GratitudeOutOfRange(usize),
    #[error("task text must not be empty")]
    EmptyText,
}

impl DailyRecord {
    pub fn tasks(&self, category: TaskCategory) -> &[TaskEntry] {
        match category {
            TaskCategory::MustDo => &self.must_do,
            TaskCategory::SecondPriority => &self.second_priority,
            TaskCategory::ExtraTime => &self.extra_time,
            TaskCategory::SelfCare => &self.self_care,
        }
    }

    pub fn tasks_mut(&mut self, category: TaskCategory) -> &mut [TaskEntry] {
        match category {
            TaskCategory::MustDo => &mut self.must_do,
            TaskCategory::SecondPriority => &mut self.second_priority,
            TaskCategory::ExtraTime => &mut self.extra_time,
            TaskCategory::SelfCare => &mut self.self_care,
        }
    }

    fn slot_mut(&mut self, category: TaskCategory, slot: usize) -> Result<&mut TaskEntry, EditError> {
        self.tasks_mut(category)
            .get_mut(slot)
            .ok_or(EditError::SlotOutOfRange { category, slot })
    }

    pub fn set_schedule_slot(&mut self, hour: u8, text: impl Into<String>) -> Result<(), EditError> {
        if hour >= HOURS_PER_DAY {
            return Err(EditError::HourOutOfRange(hour));
        }
        let text = text.into();
        if text.is_empty() {
            self.schedule.remove(&hour);
        } else {
            self.schedule.insert(hour, text);
        }
        Ok(())
    }

    pub fn set_task_text(
        &mut self,
        category: TaskCategory,
        slot: usize,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        self.slot_mut(category, slot)?.text = text.into();
        Ok(())
    }

    pub fn set_task_completed(
        &mut self,
        category: TaskCategory,
        slot: usize,
        completed: bool,
    ) -> Result<(), EditError> {
        self.slot_mut(category, slot)?.completed = completed;
        Ok(())
    }

    pub fn set_gratitude(&mut self, index: usize, text: impl Into<String>) -> Result<(), EditError> {
        let entry = self
            .gratitude
            .get_mut(index)
            .ok_or(EditError::GratitudeOutOfRange(index))?;
        *entry = text.into();
        Ok(())
    }

    pub fn set_time_estimate(
        &mut self,
        category: TaskCategory,
        slot: usize,
        minutes: Option<u32>,
    ) -> Result<(), EditError> {
        if slot >= category.capacity() {
            return Err(EditError::SlotOutOfRange { category, slot });
        }
        let key = category.estimate_key(slot);
        match minutes {
            Some(minutes) => {
                self.time_estimates.insert(key, minutes);
            }
            None => {
                self.time_estimates.remove(&key);
            }
        }
        Ok(())
    }

    pub fn toggle_recurring(&mut self, text: &str) -> Result<bool, EditError> {
        if text.is_empty() {
            return Err(EditError::EmptyText);
        }
        if self.recurring.remove(text) {
            Ok(false)
        } else {
            self.recurring.insert(text.to_string());
            Ok(true)
        }
    }

    /// Membership is by text, so every slot holding the same text matches.
    pub fn is_recurring(&self, task: &TaskEntry) -> bool {
        !task.is_empty() && self.recurring.contains(&task.text)
    }

    pub fn set_view_window(&mut self, mode: ViewMode, start_hour: u8, end_hour: u8) -> Result<(), EditError> {
        for hour in [start_hour, end_hour] {
            if hour >= HOURS_PER_DAY {
                return Err(EditError::HourOutOfRange(hour));
            }
        }
        self.view_window = ViewWindow {
            mode,
            start_hour,
            end_hour,
        };
        Ok(())
    }

    pub fn visible_hours(&self) -> Vec<u8> {
        let ViewWindow {
            mode,
            start_hour,
            end_hour,
        } = self.view_window;
        let span = match mode {
            ViewMode::All => HOURS_PER_DAY,
            ViewMode::Custom => (end_hour + HOURS_PER_DAY - start_hour) % HOURS_PER_DAY + 1,
        };
        (0..span)
            .map(|offset| (start_hour + offset) % HOURS_PER_DAY)
            .collect()
    }

    pub fn first_empty_slot(&self) -> Option<(TaskCategory, usize)> {
        TaskCategory::PRIORITIZED.into_iter().find_map(|category| {
            self.tasks(category)
                .iter()
                .position(TaskEntry::is_empty)
                .map(|slot| (category, slot))
        })
    }

    /// Self-care is not carried over.
    pub fn copy_incomplete_from(&mut self, previous: &DailyRecord) -> usize {
        let mut copied = 0;
        for category in TaskCategory::PRIORITIZED {
            let mut carried = previous
                .tasks(category)
                .iter()
                .filter(|task| !task.completed && !task.is_empty())
                .map(|task| TaskEntry {
                    text: task.text.clone(),
                    completed: false,
                });
            for slot in self.tasks_mut(category).iter_mut().filter(|slot| slot.is_empty()) {
                match carried.next() {
                    Some(task) => {
                        *slot = task;
                        copied += 1;
                    }
                    None => break,
                }
            }
        }
        copied
    }

    pub fn apply(&mut self, edit: PlannerEdit) -> Result<(), EditError> {
        match edit {
            PlannerEdit::ScheduleSlot { hour, text } => self.set_schedule_slot(hour, text),
            PlannerEdit::TaskText {
                category,
                slot,
                text,
            } => self.set_task_text(category, slot, text),
            PlannerEdit::TaskCompleted {
                category,
                slot,
                completed,
            } => self.set_task_completed(category, slot, completed),
            PlannerEdit::Gratitude { index, text } => self.set_gratitude(index, text),
            PlannerEdit::Status { status } => {
                self.status = status;
                Ok(())
            }
            PlannerEdit::TimeEstimate {
                category,
                slot,
                minutes,
            } => self.set_time_estimate(category, slot, minutes),
            PlannerEdit::ToggleRecurring { text } => self.toggle_recurring(&text).map(|_| ()),
            PlannerEdit::ViewWindow {
                mode,
                start_hour,
                end_hour,
            } => self.set_view_window(mode, start_hour, end_hour),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlannerEdit {
    ScheduleSlot {
        hour: u8,
        text: String,
    },
    TaskText {
        category: TaskCategory,
        slot: usize,
        text: String,
    },
    TaskCompleted {
        category: TaskCategory,
        slot: usize,
        completed: bool,
    },
    Gratitude {
        index: usize,
        text: String,
    },
    Status {
        status: DayStatus,
    },
    TimeEstimate {
        category: TaskCategory,
        slot: usize,
        minutes: Option<u32>,
    },
    ToggleRecurring {
        text: String,
    },
    ViewWindow {
        mode: ViewMode,
        start_hour: u8,
        end_hour: u8,
    },
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct PlannerResponse {
    pub date: NaiveDate,
    pub found: bool,
    pub autosave: bool,
    pub autosave_pending: bool,
    pub record: DailyRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AutosaveRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct CopyPreviousResponse {
    pub copied: usize,
    pub planner: PlannerResponse,
}

#[derive(Debug, Deserialize)]
pub struct RecurringRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct RecurringResponse {
    pub tasks: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlacementResponse {
    pub date: NaiveDate,
    pub category: TaskCategory,
    pub slot: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub range: Option<u32>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub completed: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub categories: BTreeMap<&'static str, CategoryCount>,
    pub completed: u32,
    pub total: u32,
    pub completion_rate: u32,
    pub estimated_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Neutral,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub days: Vec<DaySummary>,
    pub most_productive: Option<NaiveDate>,
    pub least_productive: Option<NaiveDate>,
    pub trend: Trend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_lists_keep_their_size_through_edits() {
        let mut record = DailyRecord::default();
        for category in TaskCategory::ALL {
            for slot in 0..category.capacity() {
                record.set_task_text(category, slot, format!("task {slot}")).unwrap();
                record.set_task_completed(category, slot, true).unwrap();
            }
            let overflow = record.set_task_text(category, category.capacity(), "extra");
            assert_eq!(
                overflow,
                Err(EditError::SlotOutOfRange {
                    category,
                    slot: category.capacity()
                })
            );
            assert_eq!(record.tasks(category).len(), category.capacity());
        }
    }

    #[test]
    fn recurring_membership_follows_text() {
        let mut record = DailyRecord::default();
        record.set_task_text(TaskCategory::MustDo, 0, "Buy milk").unwrap();
        assert!(record.toggle_recurring("Buy milk").unwrap());

        record.set_task_text(TaskCategory::SelfCare, 2, "Buy milk").unwrap();
        assert!(record.is_recurring(&record.must_do[0]));
        assert!(record.is_recurring(&record.self_care[2]));

        record.set_task_text(TaskCategory::MustDo, 0, "Buy oat milk").unwrap();
        assert!(!record.is_recurring(&record.must_do[0]));

        assert!(!record.toggle_recurring("Buy milk").unwrap());
        assert!(record.recurring.is_empty());
    }

    #[test]
    fn empty_schedule_text_clears_the_hour() {
        let mut record = DailyRecord::default();
        record.set_schedule_slot(9, "Standup").unwrap();
        record.set_schedule_slot(9, "").unwrap();
        assert!(record.schedule.is_empty());
        assert_eq!(record.set_schedule_slot(24, "late"), Err(EditError::HourOutOfRange(24)));
    }

    #[test]
    fn custom_window_wraps_past_midnight() {
        let mut record = DailyRecord::default();
        assert_eq!(record.visible_hours().len(), 24);

        record.set_view_window(ViewMode::Custom, 22, 2).unwrap();
        assert_eq!(record.visible_hours(), vec![22, 23, 0, 1, 2]);

        record.set_view_window(ViewMode::All, 6, 2).unwrap();
        let hours = record.visible_hours();
        assert_eq!(hours.first(), Some(&6));
        assert_eq!(hours.last(), Some(&5));
    }

    #[test]
    fn copy_incomplete_fills_only_empty_slots() {
        let mut previous = DailyRecord::default();
        previous.set_task_text(TaskCategory::MustDo, 0, "done").unwrap();
        previous.set_task_completed(TaskCategory::MustDo, 0, true).unwrap();
        previous.set_task_text(TaskCategory::MustDo, 1, "carry me").unwrap();
        previous.set_task_text(TaskCategory::ExtraTime, 3, "read").unwrap();
        previous.set_task_text(TaskCategory::SelfCare, 0, "walk").unwrap();

        let mut today = DailyRecord::default();
        today.set_task_text(TaskCategory::MustDo, 0, "existing").unwrap();

        assert_eq!(today.copy_incomplete_from(&previous), 2);
        assert_eq!(today.must_do[0].text, "existing");
        assert_eq!(today.must_do[1].text, "carry me");
        assert!(!today.must_do[1].completed);
        assert_eq!(today.extra_time[0].text, "read");
        assert!(today.self_care.iter().all(TaskEntry::is_empty));
    }

    #[test]
    fn time_estimates_use_prefixed_keys() {
        let mut record = DailyRecord::default();
        record.set_time_estimate(TaskCategory::MustDo, 0, Some(45)).unwrap();
        record.set_time_estimate(TaskCategory::SelfCare, 2, Some(15)).unwrap();
        assert_eq!(record.time_estimates.get("must-0"), Some(&45));
        assert_eq!(record.time_estimates.get("selfcare-2"), Some(&15));

        record.set_time_estimate(TaskCategory::MustDo, 0, None).unwrap();
        assert!(!record.time_estimates.contains_key("must-0"));
        assert!(record.set_time_estimate(TaskCategory::SelfCare, 3, Some(5)).is_err());
    }

    #[test]
    fn edits_deserialize_from_tagged_json() {
        let edit: PlannerEdit = serde_json::from_value(serde_json::json!({
            "op": "task_text",
            "category": "second_priority",
            "slot": 3,
            "text": "Email Sam"
        }))
        .unwrap();
        let mut record = DailyRecord::default();
        record.apply(edit).unwrap();
        assert_eq!(record.second_priority[3].text, "Email Sam");

        let edit: PlannerEdit =
            serde_json::from_value(serde_json::json!({ "op": "status", "status": "STUCK" })).unwrap();
        record.apply(edit).unwrap();
        assert_eq!(record.status, DayStatus::Stuck);
    }
}
