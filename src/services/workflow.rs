//! Session workflow controller
//!
//! Drives one user session through upload, column mapping and
//! optimization. The machine is headless: failures become typed state,
//! never a blocking side effect, so the whole flow is testable without a
//! UI. An optimization failure lands in an explicit `Error` state with a
//! retry action; only a reset discards the session's data.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::services::mapping::ColumnMapper;
use crate::services::normalizer::normalize_stops;
use crate::services::optimizer::OptimizationBackend;
use crate::services::spreadsheet::{self, Row};
use crate::types::{OptimizationResult, SessionParams, Stop};

/// Where the session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Upload,
    Mapping,
    Results,
    Error,
}

impl WorkflowState {
    pub const fn as_str(self) -> &'static str {
        match self {
            WorkflowState::Upload => "upload",
            WorkflowState::Mapping => "mapping",
            WorkflowState::Results => "results",
            WorkflowState::Error => "error",
        }
    }
}

/// One user session from upload to optimized routes
pub struct WorkflowSession {
    id: Uuid,
    state: WorkflowState,
    rows: Vec<Row>,
    stops: Vec<Stop>,
    params: SessionParams,
    result: Option<OptimizationResult>,
    last_error: Option<String>,
    mapper: Arc<dyn ColumnMapper>,
    backend: Arc<dyn OptimizationBackend>,
}

impl WorkflowSession {
    pub fn new(mapper: Arc<dyn ColumnMapper>, backend: Arc<dyn OptimizationBackend>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: WorkflowState::Upload,
            rows: Vec::new(),
            stops: Vec::new(),
            params: SessionParams::default(),
            result: None,
            last_error: None,
            mapper,
            backend,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn result(&self) -> Option<&OptimizationResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Accept parsed rows; Upload -> Mapping
    pub fn load_rows(&mut self, rows: Vec<Row>) -> Result<usize> {
        if self.state != WorkflowState::Upload {
            return Err(Error::validation("A file has already been loaded"));
        }
        if rows.is_empty() {
            return Err(Error::parse("spreadsheet contains no data rows"));
        }

        let count = rows.len();
        self.rows = rows;
        self.state = WorkflowState::Mapping;
        info!("Session {} loaded {} rows", self.id, count);
        Ok(count)
    }

    /// Parse a workbook and accept its rows; a parse failure keeps the
    /// session at Upload
    pub fn load_workbook(&mut self, data: &[u8]) -> Result<usize> {
        let rows = spreadsheet::parse_rows(data)?;
        self.load_rows(rows)
    }

    /// Map the loaded rows and run the optimization; Mapping -> Results
    ///
    /// A mapping failure keeps the session at Mapping with the error
    /// recorded; an optimization failure moves to Error, from where
    /// [`retry`](Self::retry) re-runs the call without re-uploading.
    pub async fn map_and_optimize(&mut self, params: SessionParams) -> Result<OptimizationResult> {
        if self.state != WorkflowState::Mapping {
            return Err(Error::validation("No uploaded data to map"));
        }

        let stops = match self
            .mapper
            .map_rows(&self.rows)
            .and_then(|inputs| normalize_stops(&inputs))
        {
            Ok(stops) => stops,
            Err(e) => {
                warn!("Session {} mapping failed: {}", self.id, e);
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        self.stops = stops;
        self.params = params;
        self.run_optimization().await
    }

    /// Re-run the optimization after a failure; Error -> Results
    pub async fn retry(&mut self) -> Result<OptimizationResult> {
        if self.state != WorkflowState::Error {
            return Err(Error::validation("Nothing to retry"));
        }
        self.run_optimization().await
    }

    /// Discard everything and return to Upload
    pub fn reset(&mut self) {
        self.state = WorkflowState::Upload;
        self.rows.clear();
        self.stops.clear();
        self.params = SessionParams::default();
        self.result = None;
        self.last_error = None;
    }

    async fn run_optimization(&mut self) -> Result<OptimizationResult> {
        match self
            .backend
            .optimize(self.stops.clone(), &self.params)
            .await
        {
            Ok(result) => {
                info!(
                    "Session {} optimized into {} routes",
                    self.id, result.summary.total_routes
                );
                self.result = Some(result.clone());
                self.last_error = None;
                self.state = WorkflowState::Results;
                Ok(result)
            }
            Err(e) => {
                warn!("Session {} optimization failed: {}", self.id, e);
                self.last_error = Some(e.to_string());
                self.state = WorkflowState::Error;
                Err(e)
            }
        }
    }
}

/// Live sessions keyed by id
///
/// The outer lock only guards the map; each session carries its own
/// async lock so one session's optimization call does not block another.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Arc<AsyncMutex<WorkflowSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn create(
        &self,
        mapper: Arc<dyn ColumnMapper>,
        backend: Arc<dyn OptimizationBackend>,
    ) -> Uuid {
        let session = WorkflowSession::new(mapper, backend);
        let id = session.id();
        self.sessions
            .lock()
            .insert(id, Arc::new(AsyncMutex::new(session)));
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<AsyncMutex<WorkflowSession>>> {
        self.sessions.lock().get(&id).cloned()
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().remove(&id).is_some()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::services::mapping::NullMapper;
    use crate::types::{OptimizationSummary, Route};

    /// In-memory backend counting calls and failing on demand
    #[derive(Default)]
    struct FakeBackend {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl OptimizationBackend for FakeBackend {
        async fn optimize(
            &self,
            stops: Vec<Stop>,
            params: &SessionParams,
        ) -> Result<OptimizationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Gateway {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(OptimizationResult {
                routes: vec![],
                summary: OptimizationSummary {
                    total_routes: 1,
                    total_stops: stops.len() as i64,
                    optimization_date: params
                        .date
                        .clone()
                        .unwrap_or_else(|| "2026-01-01".to_string()),
                },
            })
        }

        async fn fetch_route(&self, _route_id: &str) -> Result<Route> {
            unimplemented!("not exercised by workflow tests")
        }

        async fn list_territories(&self) -> Result<Value> {
            unimplemented!("not exercised by workflow tests")
        }

        async fn create_territory(&self, _name: &str, _description: &str) -> Result<Value> {
            unimplemented!("not exercised by workflow tests")
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn address_rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|i| {
                let mut row = Row::new();
                row.insert("address".to_string(), format!("{} Main St", i + 1));
                row
            })
            .collect()
    }

    fn session(backend: Arc<FakeBackend>) -> WorkflowSession {
        WorkflowSession::new(Arc::new(NullMapper), backend)
    }

    #[test]
    fn test_starts_at_upload() {
        let s = session(Arc::new(FakeBackend::default()));
        assert_eq!(s.state(), WorkflowState::Upload);
        assert!(s.result().is_none());
    }

    #[test]
    fn test_load_rows_moves_to_mapping() {
        let mut s = session(Arc::new(FakeBackend::default()));
        let count = s.load_rows(address_rows(2)).unwrap();
        assert_eq!(count, 2);
        assert_eq!(s.state(), WorkflowState::Mapping);
    }

    #[test]
    fn test_parse_failure_keeps_upload() {
        let mut s = session(Arc::new(FakeBackend::default()));
        let result = s.load_workbook(b"not a workbook");
        assert!(matches!(result, Err(Error::Parse(_))));
        assert_eq!(s.state(), WorkflowState::Upload);
    }

    #[tokio::test]
    async fn test_happy_path_reaches_results() {
        let backend = Arc::new(FakeBackend::default());
        let mut s = session(Arc::clone(&backend));
        s.load_rows(address_rows(3)).unwrap();
        s.map_and_optimize(SessionParams::default()).await.unwrap();

        assert_eq!(s.state(), WorkflowState::Results);
        assert_eq!(s.result().unwrap().summary.total_stops, 3);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_optimization_failure_enters_error_state() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail.store(true, Ordering::SeqCst);
        let mut s = session(Arc::clone(&backend));
        s.load_rows(address_rows(1)).unwrap();

        let result = s.map_and_optimize(SessionParams::default()).await;
        assert!(matches!(result, Err(Error::Gateway { .. })));
        assert_eq!(s.state(), WorkflowState::Error);
        assert!(s.last_error().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_retry_recovers_without_reupload() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail.store(true, Ordering::SeqCst);
        let mut s = session(Arc::clone(&backend));
        s.load_rows(address_rows(2)).unwrap();
        let _ = s.map_and_optimize(SessionParams::default()).await;
        assert_eq!(s.state(), WorkflowState::Error);

        backend.fail.store(false, Ordering::SeqCst);
        s.retry().await.unwrap();
        assert_eq!(s.state(), WorkflowState::Results);
        assert_eq!(s.result().unwrap().summary.total_stops, 2);
        // One failed call plus exactly one retry
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_outside_error_state_is_rejected() {
        let mut s = session(Arc::new(FakeBackend::default()));
        let result = s.retry().await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_mapping_failure_stays_in_mapping() {
        // Rows with no recognizable address column fail under HeaderMapper
        let backend = Arc::new(FakeBackend::default());
        let mut s = WorkflowSession::new(
            Arc::new(crate::services::mapping::HeaderMapper),
            Arc::clone(&backend) as Arc<dyn OptimizationBackend>,
        );
        let mut row = Row::new();
        row.insert("Color".to_string(), "teal".to_string());
        s.load_rows(vec![row]).unwrap();

        let result = s.map_and_optimize(SessionParams::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(s.state(), WorkflowState::Mapping);
        assert!(s.last_error().is_some());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_tracks_sessions_by_id() {
        let store = SessionStore::new();
        let backend = Arc::new(FakeBackend::default());
        let id = store.create(Arc::new(NullMapper), Arc::clone(&backend) as Arc<dyn OptimizationBackend>);

        let session = store.get(id).expect("session should exist");
        {
            let mut session = session.lock().await;
            session.load_rows(address_rows(1)).unwrap();
            assert_eq!(session.state(), WorkflowState::Mapping);
        }

        assert!(store.get(Uuid::new_v4()).is_none());
        assert!(store.remove(id));
        assert!(!store.remove(id));
    }

    #[tokio::test]
    async fn test_map_and_optimize_returns_the_result() {
        let backend = Arc::new(FakeBackend::default());
        let mut s = session(Arc::clone(&backend));
        s.load_rows(address_rows(2)).unwrap();
        let result = s.map_and_optimize(SessionParams::default()).await.unwrap();
        assert_eq!(result.summary.total_stops, 2);
    }

    #[tokio::test]
    async fn test_reset_returns_to_upload() {
        let backend = Arc::new(FakeBackend::default());
        let mut s = session(backend);
        s.load_rows(address_rows(1)).unwrap();
        s.map_and_optimize(SessionParams::default()).await.unwrap();
        assert_eq!(s.state(), WorkflowState::Results);

        s.reset();
        assert_eq!(s.state(), WorkflowState::Upload);
        assert!(s.result().is_none());
        assert!(s.last_error().is_none());
    }
}
