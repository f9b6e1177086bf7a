use crate::config::Config;
use crate::gate::AccessGate;
use crate::session::PlannerSession;
use crate::storage::RecordStore;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub planner: Arc<Mutex<PlannerSession>>,
    pub gate: Arc<AccessGate>,
}

impl AppState {
    pub async fn new(config: &Config, store: RecordStore) -> Self {
        let store = Arc::new(store);
        let today = Local::now().date_naive();
        let planner = PlannerSession::open(Arc::clone(&store), config.autosave_delay, today).await;
        Self {
            store,
            planner: Arc::new(Mutex::new(planner)),
            gate: Arc::new(AccessGate::new(config.password.clone())),
        }
    }
}
