//! JSON text encoding for [`DailyRecord`].
//!
//! Decoding is lenient per field: anything absent or of the wrong shape falls
//! back to its default, and fixed-size lists are padded or truncated. Only a
//! payload that is not a JSON object at all is rejected.

use crate::models::{DailyRecord, DayStatus, HOURS_PER_DAY, TaskCategory, TaskEntry, ViewMode, ViewWindow};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed planner record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("planner record must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

pub fn encode_record(record: &DailyRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

pub fn decode_record(text: &str) -> Result<DailyRecord, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    record_from_value(&value)
}

pub fn record_from_value(value: &Value) -> Result<DailyRecord, DecodeError> {
    let object = value
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject(kind_of(value)))?;

    let defaults = ViewWindow::default();
    let view_window = ViewWindow {
        mode: match object.get("viewMode").and_then(Value::as_str) {
            Some("custom") => ViewMode::Custom,
            _ => ViewMode::All,
        },
        start_hour: hour_field(object, "startHour").unwrap_or(defaults.start_hour),
        end_hour: hour_field(object, "endHour").unwrap_or(defaults.end_hour),
    };

    Ok(DailyRecord {
        view_window,
        schedule: schedule_field(object.get("scheduleItems")),
        must_do: task_field(object, TaskCategory::MustDo),
        second_priority: task_field(object, TaskCategory::SecondPriority),
        extra_time: task_field(object, TaskCategory::ExtraTime),
        self_care: task_field(object, TaskCategory::SelfCare),
        gratitude: fixed_list(object.get("gratefulItems"), |item| {
            item.as_str().map(str::to_string).unwrap_or_default()
        }),
        status: object
            .get("taskStatus")
            .and_then(Value::as_str)
            .and_then(DayStatus::parse)
            .unwrap_or_default(),
        time_estimates: estimates_field(object.get("timeEstimates")),
        recurring: recurring_field(object.get("recurringTasks")),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn hour_field(object: &Map<String, Value>, key: &str) -> Option<u8> {
    object
        .get(key)
        .and_then(Value::as_u64)
        .filter(|hour| *hour < u64::from(HOURS_PER_DAY))
        .map(|hour| hour as u8)
}

fn schedule_field(value: Option<&Value>) -> BTreeMap<u8, String> {
    let Some(slots) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    slots
        .iter()
        .filter_map(|(hour, text)| {
            let hour = hour.parse::<u8>().ok().filter(|hour| *hour < HOURS_PER_DAY)?;
            let text = text.as_str().filter(|text| !text.is_empty())?;
            Some((hour, text.to_string()))
        })
        .collect()
}

fn json_key(category: TaskCategory) -> &'static str {
    match category {
        TaskCategory::MustDo => "mustDoItems",
        TaskCategory::SecondPriority => "secondPriorityItems",
        TaskCategory::ExtraTime => "extraTimeItems",
        TaskCategory::SelfCare => "selfCareItems",
    }
}

fn task_field<const N: usize>(object: &Map<String, Value>, category: TaskCategory) -> [TaskEntry; N] {
    fixed_list(object.get(json_key(category)), |item| TaskEntry {
        text: item
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
        completed: item.get("completed").and_then(Value::as_bool).unwrap_or(false),
    })
}

fn fixed_list<T: Default, const N: usize>(value: Option<&Value>, decode: impl Fn(&Value) -> T) -> [T; N] {
    let items = value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
    std::array::from_fn(|index| items.get(index).map(&decode).unwrap_or_default())
}

fn estimates_field(value: Option<&Value>) -> BTreeMap<String, u32> {
    let Some(estimates) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    estimates
        .iter()
        .filter(|(key, _)| is_estimate_key(key))
        .filter_map(|(key, minutes)| Some((key.clone(), minutes_value(minutes)?)))
        .collect()
}

fn is_estimate_key(key: &str) -> bool {
    let Some((prefix, slot)) = key.rsplit_once('-') else {
        return false;
    };
    match (TaskCategory::from_prefix(prefix), slot.parse::<usize>()) {
        (Some(category), Ok(slot)) => slot < category.capacity(),
        _ => false,
    }
}

fn minutes_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|m| *m >= 0.0).map(|m| m.trunc() as u64))
            .and_then(|m| u32::try_from(m).ok()),
        Value::String(text) => leading_integer(text),
        _ => None,
    }
}

/// Reads the leading digits of `text`, ignoring surrounding whitespace and any
/// trailing unit such as `"45min"`.
fn leading_integer(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(text.len(), |(index, _)| index);
    text[..end].parse().ok()
}

fn recurring_field(value: Option<&Value>) -> BTreeSet<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_decodes_to_defaults() {
        let record = decode_record("{}").unwrap();
        assert_eq!(record, DailyRecord::default());
        assert_eq!(record.status, DayStatus::ToStart);
        assert!(record.gratitude.iter().all(String::is_empty));
    }

    #[test]
    fn encoded_record_decodes_back() {
        let mut record = DailyRecord::default();
        record.set_schedule_slot(7, "Gym").unwrap();
        record.set_task_text(TaskCategory::MustDo, 2, "Ship release").unwrap();
        record.set_task_completed(TaskCategory::MustDo, 2, true).unwrap();
        record.set_gratitude(1, "Sunshine").unwrap();
        record.set_time_estimate(TaskCategory::ExtraTime, 1, Some(90)).unwrap();
        record.set_view_window(ViewMode::Custom, 6, 18).unwrap();
        record.toggle_recurring("Ship release").unwrap();
        record.status = DayStatus::Delay;

        let text = encode_record(&record).unwrap();
        assert_eq!(decode_record(&text).unwrap(), record);
    }

    #[test]
    fn encoding_uses_stored_field_names() {
        let value = serde_json::to_value(DailyRecord::default()).unwrap();
        for key in [
            "startHour",
            "endHour",
            "viewMode",
            "scheduleItems",
            "mustDoItems",
            "gratefulItems",
            "taskStatus",
            "timeEstimates",
            "recurringTasks",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["taskStatus"], "TO START");
        assert_eq!(value["mustDoItems"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn mistyped_fields_fall_back_individually() {
        let record = record_from_value(&json!({
            "startHour": "nine",
            "endHour": 40,
            "viewMode": 3,
            "scheduleItems": { "8": "Breakfast", "25": "never", "x": "bad", "9": 4 },
            "mustDoItems": [{ "text": "a", "completed": true }, "junk", { "completed": "yes" }],
            "selfCareItems": [{}, {}, {}, { "text": "overflow" }],
            "gratefulItems": ["tea", 7],
            "taskStatus": "PANIC",
            "timeEstimates": { "must-0": "45min", "must-9": 10, "other-1": 5, "extra-1": 30 },
            "recurringTasks": ["a", "", 5, "a"]
        }))
        .unwrap();

        assert_eq!(record.view_window, ViewWindow::default());
        assert_eq!(record.schedule.len(), 1);
        assert_eq!(record.schedule[&8], "Breakfast");
        assert_eq!(record.must_do[0], TaskEntry { text: "a".into(), completed: true });
        assert!(record.must_do[1..].iter().all(|task| *task == TaskEntry::default()));
        assert_eq!(record.self_care.len(), 3);
        assert_eq!(record.gratitude, ["tea".to_string(), String::new(), String::new()]);
        assert_eq!(record.status, DayStatus::ToStart);
        assert_eq!(record.time_estimates.len(), 2);
        assert_eq!(record.time_estimates["must-0"], 45);
        assert_eq!(record.time_estimates["extra-1"], 30);
        assert_eq!(record.recurring.len(), 1);
    }

    #[test]
    fn non_object_payloads_are_rejected() {
        assert!(matches!(decode_record("{not json"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode_record("null"), Err(DecodeError::NotAnObject("null"))));
        assert!(matches!(decode_record("[1, 2]"), Err(DecodeError::NotAnObject("an array"))));
    }
}
