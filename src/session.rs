use crate::debounce::Debouncer;
use crate::errors::StoreError;
use crate::models::{DailyRecord, EditError, PlannerEdit, PlannerResponse};
use crate::storage::RecordStore;
use chrono::{Days, NaiveDate};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Explicit saves leave the auto-save armed; the later write wins.
pub struct PlannerSession {
    store: Arc<RecordStore>,
    delay: Duration,
    autosave: bool,
    date: NaiveDate,
    record: Arc<Mutex<DailyRecord>>,
    found: bool,
    warning: Option<String>,
    debouncer: Debouncer,
}

impl PlannerSession {
    pub async fn open(store: Arc<RecordStore>, delay: Duration, date: NaiveDate) -> Self {
        let loaded = store.get(date).await;
        Self {
            store,
            delay,
            autosave: true,
            date,
            record: Arc::new(Mutex::new(loaded.record)),
            found: loaded.found,
            warning: loaded.warning,
            debouncer: Debouncer::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave
    }

    pub fn autosave_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub async fn snapshot(&self) -> DailyRecord {
        self.record.lock().await.clone()
    }

    pub async fn view(&self) -> PlannerResponse {
        PlannerResponse {
            date: self.date,
            found: self.found,
            autosave: self.autosave,
            autosave_pending: self.autosave_pending(),
            record: self.snapshot().await,
            warning: self.warning.clone(),
        }
    }

    pub async fn switch_date(&mut self, date: NaiveDate) {
        if date == self.date {
            return;
        }
        if self.debouncer.cancel() {
            info!("discarded pending auto-save for {}", self.date);
        }
        let loaded = self.store.get(date).await;
        self.date = date;
        self.record = Arc::new(Mutex::new(loaded.record));
        self.found = loaded.found;
        self.warning = loaded.warning;
    }

    pub async fn edit(&mut self, edit: PlannerEdit) -> Result<(), EditError> {
        self.update(|record| record.apply(edit)).await
    }

    pub async fn update<T, E>(&mut self, change: impl FnOnce(&mut DailyRecord) -> Result<T, E>) -> Result<T, E> {
        let outcome = change(&mut *self.record.lock().await)?;
        self.touch();
        Ok(outcome)
    }

    fn touch(&mut self) {
        if !self.autosave {
            return;
        }
        let store = Arc::clone(&self.store);
        let record = Arc::clone(&self.record);
        let date = self.date;
        self.debouncer.schedule(self.delay, async move {
            let snapshot = record.lock().await.clone();
            match store.put(date, &snapshot).await {
                Ok(()) => info!("auto-saved planner for {date}"),
                Err(err) => error!("auto-save for {date} failed: {err}"),
            }
        });
    }

    pub async fn save_now(&mut self) -> Result<(), StoreError> {
        let snapshot = self.snapshot().await;
        self.store.put(self.date, &snapshot).await?;
        self.found = true;
        self.warning = None;
        info!("saved planner for {}", self.date);
        Ok(())
    }

    pub fn set_autosave(&mut self, enabled: bool) {
        self.autosave = enabled;
        if !enabled {
            self.debouncer.cancel();
        }
    }

    pub async fn copy_previous_day(&mut self) -> Result<Option<usize>, StoreError> {
        let Some(yesterday) = self.date.checked_sub_days(Days::new(1)) else {
            return Ok(None);
        };
        let Some(previous) = self.store.fetch(yesterday).await? else {
            return Ok(None);
        };
        let copied = self
            .update(|record| Ok::<_, StoreError>(record.copy_incomplete_from(&previous)))
            .await?;
        Ok(Some(copied))
    }

    pub fn close(&mut self) {
        self.debouncer.cancel();
    }
}
