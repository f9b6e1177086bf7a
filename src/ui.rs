use crate::models::{AnalyticsResponse, DailyRecord, DayStatus, PlannerResponse, TaskCategory, Trend};
use crate::storage::StorageMode;
use std::fmt::Write;

pub fn render_planner(planner: &PlannerResponse, mode: StorageMode) -> String {
    let record = &planner.record;
    let storage = match mode {
        StorageMode::Local => "local storage",
        StorageMode::Remote => "gist",
    };
    let warning = planner
        .warning
        .as_deref()
        .map(|warning| format!(r#"<p class="warning">{}</p>"#, escape(warning)))
        .unwrap_or_default();

    PLANNER_HTML
        .replace("{{DATE}}", &planner.date.to_string())
        .replace("{{STORAGE}}", storage)
        .replace("{{WARNING}}", &warning)
        .replace("{{STATUS}}", &status_options(record.status))
        .replace("{{SCHEDULE}}", &schedule_rows(record))
        .replace("{{TASKS}}", &task_sections(record))
        .replace("{{GRATITUDE}}", &gratitude_inputs(record))
        .replace("{{AUTOSAVE}}", if planner.autosave { "checked" } else { "" })
}

pub fn render_analytics(report: &AnalyticsResponse, range: u32) -> String {
    let mut rows = String::new();
    for day in &report.days {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}/{}</td><td>{}%</td><td>{:.1}h</td></tr>",
            day.date, day.completed, day.total, day.completion_rate, day.estimated_hours
        );
    }
    let date_or_dash = |date: Option<chrono::NaiveDate>| date.map_or_else(|| "-".to_string(), |date| date.to_string());
    let trend = match report.trend {
        Trend::Improving => "improving",
        Trend::Declining => "declining",
        Trend::Neutral => "neutral",
    };

    ANALYTICS_HTML
        .replace("{{RANGE}}", &range.to_string())
        .replace("{{ROWS}}", &rows)
        .replace("{{MOST}}", &date_or_dash(report.most_productive))
        .replace("{{LEAST}}", &date_or_dash(report.least_productive))
        .replace("{{TREND}}", trend)
}

fn status_options(current: DayStatus) -> String {
    [DayStatus::ToStart, DayStatus::Ok, DayStatus::Delay, DayStatus::Stuck, DayStatus::Cancel]
        .into_iter()
        .map(|status| {
            let selected = if status == current { " selected" } else { "" };
            format!(r#"<option value="{0}"{selected}>{0}</option>"#, status.as_str())
        })
        .collect()
}

fn hour_label(hour: u8) -> String {
    match hour {
        0 => "12am".to_string(),
        12 => "12pm".to_string(),
        1..=11 => format!("{hour}am"),
        _ => format!("{}pm", hour - 12),
    }
}

fn schedule_rows(record: &DailyRecord) -> String {
    let mut html = String::new();
    for hour in record.visible_hours() {
        let text = record.schedule.get(&hour).map(String::as_str).unwrap_or("");
        let _ = write!(
            html,
            r#"<label class="slot"><span>{}</span><input data-hour="{hour}" value="{}" /></label>"#,
            hour_label(hour),
            escape(text)
        );
    }
    html
}

fn task_sections(record: &DailyRecord) -> String {
    let mut html = String::new();
    for category in TaskCategory::ALL {
        let key = category.key();
        let _ = write!(html, "<section><h3>{}</h3>", category.label());
        for (slot, task) in record.tasks(category).iter().enumerate() {
            let checked = if task.completed { "checked" } else { "" };
            let recurring = if record.is_recurring(task) { " recurring" } else { "" };
            let minutes = record
                .time_estimates
                .get(&category.estimate_key(slot))
                .map(u32::to_string)
                .unwrap_or_default();
            let _ = write!(
                html,
                r#"<div class="task{recurring}" data-category="{key}" data-slot="{slot}"><input type="checkbox" {checked} /><input class="text" value="{}" /><input class="minutes" type="number" min="0" value="{minutes}" /></div>"#,
                escape(&task.text)
            );
        }
        html.push_str("</section>");
    }
    html
}

fn gratitude_inputs(record: &DailyRecord) -> String {
    record
        .gratitude
        .iter()
        .enumerate()
        .map(|(index, text)| format!(r#"<input data-gratitude="{index}" value="{}" />"#, escape(text)))
        .collect()
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PLANNER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Planner {{DATE}}</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 960px; padding: 24px; color: #1f2933; }
    header { display: flex; justify-content: space-between; align-items: baseline; gap: 12px; flex-wrap: wrap; }
    .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 24px; }
    .slot { display: grid; grid-template-columns: 56px 1fr; border-bottom: 1px solid #e4e7eb; }
    .task { display: grid; grid-template-columns: 24px 1fr 72px; gap: 6px; margin-bottom: 4px; }
    .task.recurring .text { border-color: #7c5cff; }
    input { padding: 4px 6px; border: 1px solid #cbd2d9; border-radius: 4px; }
    .warning { background: #ffe3e3; padding: 8px 12px; border-radius: 6px; }
    #notice { min-height: 1.2em; color: #52606d; }
  </style>
</head>
<body>
  <header>
    <h1>Daily Planner</h1>
    <form method="get" action="/"><input type="date" name="date" value="{{DATE}}" onchange="this.form.submit()" /></form>
    <span>Saving to {{STORAGE}}</span>
  </header>
  {{WARNING}}
  <p>
    Status <select id="status">{{STATUS}}</select>
    <label><input type="checkbox" id="autosave" {{AUTOSAVE}} /> Auto-save</label>
    <button id="save">Save</button>
    <button id="copy">Copy unfinished tasks from yesterday</button>
    <a href="/analytics">Analytics</a>
  </p>
  <p id="notice"></p>
  <div class="grid">
    <div><h2>Schedule</h2>{{SCHEDULE}}</div>
    <div>{{TASKS}}<section><h3>Grateful for</h3>{{GRATITUDE}}</section></div>
  </div>
  <script>
    const notice = (text) => { document.getElementById("notice").textContent = text; };
    const post = async (path, body) => {
      const response = await fetch(path, { method: "POST", headers: { "Content-Type": "application/json" }, body: JSON.stringify(body || {}) });
      if (!response.ok) { notice(await response.text()); return null; }
      return response.json();
    };
    const edit = (body) => post("/api/planner/edit", body).then((planner) => planner && notice("Unsaved changes; auto-save pending"));

    document.querySelectorAll("[data-hour]").forEach((input) =>
      input.addEventListener("change", () => edit({ op: "schedule_slot", hour: Number(input.dataset.hour), text: input.value })));
    document.querySelectorAll("[data-gratitude]").forEach((input) =>
      input.addEventListener("change", () => edit({ op: "gratitude", index: Number(input.dataset.gratitude), text: input.value })));
    document.querySelectorAll(".task").forEach((row) => {
      const target = { category: row.dataset.category, slot: Number(row.dataset.slot) };
      row.querySelector("[type=checkbox]").addEventListener("change", (event) =>
        edit({ op: "task_completed", ...target, completed: event.target.checked }));
      row.querySelector(".text").addEventListener("change", (event) =>
        edit({ op: "task_text", ...target, text: event.target.value }));
      row.querySelector(".minutes").addEventListener("change", (event) =>
        edit({ op: "time_estimate", ...target, minutes: event.target.value === "" ? null : Number(event.target.value) }));
    });
    document.getElementById("status").addEventListener("change", (event) => edit({ op: "status", status: event.target.value }));
    document.getElementById("autosave").addEventListener("change", (event) => post("/api/planner/autosave", { enabled: event.target.checked }));
    document.getElementById("save").addEventListener("click", () => post("/api/planner/save").then((planner) => planner && notice("Saved")));
    document.getElementById("copy").addEventListener("click", () =>
      post("/api/planner/copy-previous").then((result) => result && window.location.reload()));
  </script>
</body>
</html>
"#;

const ANALYTICS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Task Analytics</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 720px; padding: 24px; }
    table { border-collapse: collapse; width: 100%; }
    td, th { border-bottom: 1px solid #e4e7eb; padding: 6px; text-align: left; }
  </style>
</head>
<body>
  <h1>Task Analytics</h1>
  <p><a href="/analytics?range=7">7 days</a> | <a href="/analytics?range=30">30 days</a> | <a href="/">Planner</a></p>
  <p>Last {{RANGE}} days. Most productive: {{MOST}}. Least productive: {{LEAST}}. Trend: {{TREND}}.</p>
  <table>
    <thead><tr><th>Date</th><th>Done</th><th>Completion</th><th>Estimated</th></tr></thead>
    <tbody>{{ROWS}}</tbody>
  </table>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn planner_page_escapes_user_text() {
        let mut record = DailyRecord::default();
        record.set_task_text(TaskCategory::MustDo, 0, "<script>").unwrap();
        let planner = PlannerResponse {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            found: true,
            autosave: true,
            autosave_pending: false,
            record,
            warning: None,
        };
        let html = render_planner(&planner, StorageMode::Local);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"data-category="must_do""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn hour_labels_use_twelve_hour_clock() {
        assert_eq!(hour_label(0), "12am");
        assert_eq!(hour_label(9), "9am");
        assert_eq!(hour_label(12), "12pm");
        assert_eq!(hour_label(23), "11pm");
    }
}
