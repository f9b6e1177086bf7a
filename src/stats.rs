use crate::models::{AnalyticsResponse, CategoryCount, DailyRecord, DaySummary, TaskCategory, Trend};
use crate::storage::RecordStore;
use chrono::{Duration, Local, NaiveDate};
use std::collections::BTreeMap;

pub const RANGE_OPTIONS: [u32; 2] = [7, 30];

pub async fn build_analytics(store: &RecordStore, range: u32) -> AnalyticsResponse {
    build_analytics_at(store, Local::now().date_naive(), range).await
}

pub async fn build_analytics_at(store: &RecordStore, today: NaiveDate, range: u32) -> AnalyticsResponse {
    let mut days = Vec::with_capacity(range as usize);
    for date in trailing_dates(today, range) {
        let loaded = store.get(date).await;
        days.push(summarize_day(date, &loaded.record));
    }
    summarize_range(days)
}

pub fn trailing_dates(today: NaiveDate, range: u32) -> impl Iterator<Item = NaiveDate> {
    (0..i64::from(range)).rev().map(move |offset| today - Duration::days(offset))
}

pub fn summarize_day(date: NaiveDate, record: &DailyRecord) -> DaySummary {
    let mut categories = BTreeMap::new();
    let (mut completed, mut total) = (0, 0);
    for category in TaskCategory::ALL {
        let mut count = CategoryCount::default();
        for task in record.tasks(category).iter().filter(|task| !task.is_empty()) {
            count.total += 1;
            if task.completed {
                count.completed += 1;
            }
        }
        if TaskCategory::PRIORITIZED.contains(&category) {
            completed += count.completed;
            total += count.total;
        }
        categories.insert(category.prefix(), count);
    }

    let minutes: u64 = record.time_estimates.values().map(|m| u64::from(*m)).sum();

    DaySummary {
        date,
        categories,
        completed,
        total,
        completion_rate: completion_rate(completed, total),
        estimated_hours: (minutes as f64 / 60.0 * 10.0).round() / 10.0,
    }
}

pub fn completion_rate(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * f64::from(completed) / f64::from(total)).round() as u32
}

pub fn summarize_range(days: Vec<DaySummary>) -> AnalyticsResponse {
    // Strict comparisons keep the earliest date on ties.
    let most_productive = days
        .iter()
        .fold(None::<&DaySummary>, |best, day| match best {
            Some(best) if best.completion_rate >= day.completion_rate => Some(best),
            _ => Some(day),
        })
        .map(|day| day.date);

    let least_productive = days
        .iter()
        .filter(|day| day.total > 0)
        .fold(None::<&DaySummary>, |worst, day| match worst {
            Some(worst) if worst.completion_rate <= day.completion_rate => Some(worst),
            _ => Some(day),
        })
        .map(|day| day.date);

    let trend = trend(&days);

    AnalyticsResponse {
        days,
        most_productive,
        least_productive,
        trend,
    }
}

fn trend(days: &[DaySummary]) -> Trend {
    let (first, second) = days.split_at(days.len() / 2);
    if first.is_empty() || second.is_empty() {
        return Trend::Neutral;
    }
    let mean = |half: &[DaySummary]| {
        half.iter().map(|day| f64::from(day.completion_rate)).sum::<f64>() / half.len() as f64
    };
    let (before, after) = (mean(first), mean(second));
    if after > before {
        Trend::Improving
    } else if after < before {
        Trend::Declining
    } else {
        Trend::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    fn record_with(done: usize, open: usize) -> DailyRecord {
        let mut record = DailyRecord::default();
        for slot in 0..done + open {
            record
                .set_task_text(TaskCategory::MustDo, slot, format!("task {slot}"))
                .unwrap();
            record
                .set_task_completed(TaskCategory::MustDo, slot, slot < done)
                .unwrap();
        }
        record
    }

    #[test]
    fn three_of_four_is_seventy_five_percent() {
        let summary = summarize_day(date("2026-01-05"), &record_with(3, 1));
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.completion_rate, 75);
        assert_eq!(summary.categories["must"], CategoryCount { completed: 3, total: 4 });
        assert_eq!(summary.categories["selfcare"], CategoryCount::default());
    }

    #[test]
    fn self_care_is_listed_but_not_rated() {
        let mut record = record_with(1, 0);
        record.set_task_text(TaskCategory::SelfCare, 0, "Walk").unwrap();
        let summary = summarize_day(date("2026-01-05"), &record);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.completion_rate, 100);
        assert_eq!(summary.categories["selfcare"], CategoryCount { completed: 0, total: 1 });
    }

    #[test]
    fn blank_tasks_do_not_count_even_if_checked() {
        let mut record = DailyRecord::default();
        record.set_task_completed(TaskCategory::SelfCare, 0, true).unwrap();
        let summary = summarize_day(date("2026-01-05"), &record);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completion_rate, 0);
    }

    #[test]
    fn estimates_convert_to_hours_with_one_decimal() {
        let mut record = DailyRecord::default();
        record.set_time_estimate(TaskCategory::MustDo, 0, Some(50)).unwrap();
        record.set_time_estimate(TaskCategory::ExtraTime, 2, Some(45)).unwrap();
        let summary = summarize_day(date("2026-01-05"), &record);
        assert_eq!(summary.estimated_hours, 1.6);
    }

    #[test]
    fn empty_days_are_not_least_productive() {
        let days = vec![
            summarize_day(date("2026-01-01"), &DailyRecord::default()),
            summarize_day(date("2026-01-02"), &record_with(1, 3)),
            summarize_day(date("2026-01-03"), &record_with(2, 0)),
            summarize_day(date("2026-01-04"), &record_with(2, 2)),
        ];
        let report = summarize_range(days);
        assert_eq!(report.days[0].completion_rate, 0);
        assert_eq!(report.least_productive, Some(date("2026-01-02")));
        assert_eq!(report.most_productive, Some(date("2026-01-03")));
        assert_eq!(report.trend, Trend::Improving);
    }

    #[test]
    fn trend_compares_halves() {
        let declining = summarize_range(vec![
            summarize_day(date("2026-01-01"), &record_with(4, 0)),
            summarize_day(date("2026-01-02"), &record_with(1, 3)),
        ]);
        assert_eq!(declining.trend, Trend::Declining);

        let flat = summarize_range(vec![
            summarize_day(date("2026-01-01"), &DailyRecord::default()),
            summarize_day(date("2026-01-02"), &DailyRecord::default()),
        ]);
        assert_eq!(flat.trend, Trend::Neutral);
        assert_eq!(flat.least_productive, None);
        assert_eq!(flat.most_productive, Some(date("2026-01-01")));
    }

    #[test]
    fn trailing_dates_end_today() {
        let today = date("2026-03-02");
        let dates: Vec<_> = trailing_dates(today, 7).collect();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates.first(), Some(&date("2026-02-24")));
        assert_eq!(dates.last(), Some(&today));
    }

    #[tokio::test]
    async fn analytics_reads_each_day_from_the_store() {
        let path = std::env::temp_dir().join(format!(
            "daily_planner_stats_{}_{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let store = RecordStore::local(&path).await;
        let today = date("2026-01-30");
        store.put(today, &record_with(3, 1)).await.unwrap();

        let report = build_analytics_at(&store, today, 30).await;
        assert_eq!(report.days.len(), 30);
        assert_eq!(report.days[29].completion_rate, 75);
        assert_eq!(report.least_productive, Some(today));
        assert_eq!(report.most_productive, Some(today));
        assert_eq!(report.trend, Trend::Improving);
        let _ = std::fs::remove_file(path);
    }
}
