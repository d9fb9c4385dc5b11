//! Console facade.
//!
//! Owns one instance of every component and is the only place that turns
//! their typed outcomes into operator notifications.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ms_core::{Notification, Notifications, Xorshift64};
use ms_form::fields::{ZONE1_TEMP, ZONE2_TEMP, ZONE3_TEMP, format_minute};
use ms_form::{FieldValue, FormModel, GradeList, GradeSchemaCache, SchemaChange};
use ms_predict::{PredictionOrchestrator, PredictionOutcome, PredictionResult, SkipReason};
use ms_readings::{
    ReadingError, ReadingGenerator, ReadingMode, ReadingOutcome, RemoteSyntheticSource,
    SeededSyntheticSource, SyntheticSource,
};
use ms_session::{
    ConnectionState, DeviceRecord, PollConfig, PollHandle, PollOutcome, SessionManager,
    ZoneTemperatures,
};
use ms_transport::{HttpConfig, HttpTransport, Transport};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ConsoleConfig, SyntheticSourceKind};
use crate::error::{AppError, AppResult};

/// Everything a front end renders, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleView {
    pub session_id: Uuid,
    pub connection: ConnectionState,
    pub devices: Vec<DeviceRecord>,
    pub grades: Vec<String>,
    pub selected_grade: Option<String>,
    pub mode: ReadingMode,
    pub form: Value,
    pub prediction: Option<PredictionResult>,
}

/// One operator session over the device network.
///
/// Status polling is not started by the constructors. Long-lived front ends
/// call [`Console::start_polling`] as soon as the console exists; one-shot
/// commands poll once through [`Console::refresh_status`].
pub struct Console {
    session_id: Uuid,
    config: ConsoleConfig,
    session: SessionManager,
    poller: Option<PollHandle>,
    grades: GradeSchemaCache,
    selected_grade: Option<String>,
    form: FormModel,
    readings: ReadingGenerator,
    orchestrator: PredictionOrchestrator,
    notifications: Notifications,
    mode: ReadingMode,
    telemetry_rng: Xorshift64,
}

impl Console {
    /// Console talking HTTP to `config.base_url`.
    pub fn from_config(config: ConsoleConfig, started_at: DateTime<Utc>) -> AppResult<Self> {
        let http = HttpTransport::new(HttpConfig {
            base_url: config.base_url.clone(),
            default_timeout: config.request_timeout(),
            max_response_bytes: config.max_response_bytes,
        })?;
        Self::new(config, Arc::new(http), started_at)
    }

    pub fn new(
        config: ConsoleConfig,
        transport: Arc<dyn Transport>,
        started_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        config.validate()?;
        let session_id = Uuid::new_v4();
        let start_millis = started_at.timestamp_millis().unsigned_abs();
        let fallback_seed = config.fallback_seed.unwrap_or(start_millis);

        let session = SessionManager::new(Arc::clone(&transport), config.device_records())?;
        let source: Arc<dyn SyntheticSource> = match config.synthetic_source {
            SyntheticSourceKind::Remote => {
                Arc::new(RemoteSyntheticSource::new(Arc::clone(&transport)))
            }
            SyntheticSourceKind::Seeded => Arc::new(SeededSyntheticSource::new(config.synthetic_seed)),
        };
        let orchestrator = PredictionOrchestrator::new(Arc::clone(&transport), fallback_seed)
            .with_timeout(config.optimizer_timeout());

        info!(
            session = %session_id,
            base_url = %config.base_url,
            source = ?config.synthetic_source,
            "console session created"
        );

        Ok(Self {
            session_id,
            session,
            poller: None,
            grades: GradeSchemaCache::new(transport),
            selected_grade: None,
            form: FormModel::new(started_at),
            readings: ReadingGenerator::new(source),
            orchestrator,
            notifications: Notifications::default(),
            mode: ReadingMode::default(),
            telemetry_rng: Xorshift64::new(start_millis ^ config.synthetic_seed),
            config,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn connection(&self) -> ConnectionState {
        self.session.connection()
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    /// Operator edit of a form field.
    pub fn set_field(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.form.set(key, value);
    }

    pub fn grades(&self) -> &[String] {
        self.grades.grades()
    }

    pub fn selected_grade(&self) -> Option<&str> {
        self.selected_grade.as_deref()
    }

    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ReadingMode) {
        self.mode = mode;
    }

    pub fn latest_prediction(&self) -> Option<&PredictionResult> {
        self.orchestrator.latest()
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Start background status polling. A running loop is kept.
    pub fn start_polling(&mut self) -> &PollHandle {
        let interval = self.config.poll_interval();
        self.poller
            .get_or_insert_with(|| self.session.spawn_polling(PollConfig::new(interval)))
    }

    pub fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
    }

    pub fn poller(&self) -> Option<&PollHandle> {
        self.poller.as_ref()
    }

    pub async fn connect(&mut self) -> AppResult<()> {
        match self.session.connect().await {
            Ok(()) => {
                info!(session = %self.session_id, "device network connected");
                self.notify(Notification::success("Connected to device network"));
                Ok(())
            }
            Err(error) => {
                self.notify(Notification::error("Connection failed").with_detail(error.to_string()));
                Err(error.into())
            }
        }
    }

    pub async fn disconnect(&mut self) {
        self.session.disconnect().await;
        info!(session = %self.session_id, "device network disconnected");
        self.notify(Notification::info("Disconnected from device network"));
    }

    /// One status poll outside the background loop.
    pub async fn refresh_status(&mut self) -> PollOutcome {
        self.session.poll_status().await
    }

    pub async fn refresh_grades(&mut self) -> GradeList {
        let list = self.grades.list_grades().await;
        match &list.stale {
            None => self.notify(Notification::info(format!("Loaded {} grades", list.grades.len()))),
            Some(error) => self.notify(
                Notification::error("Failed to load grades").with_detail(error.to_string()),
            ),
        }
        list
    }

    /// Select a grade and reconcile the form with its elements.
    ///
    /// A blank grade clears the selection and every element field. On a
    /// failed lookup the previous selection and form stay as they were.
    pub async fn select_grade(&mut self, grade: &str) -> AppResult<SchemaChange> {
        let grade = grade.trim();
        if grade.is_empty() {
            self.selected_grade = None;
            return Ok(self.form.apply_schema(&[]));
        }
        match self.grades.elements(grade).await {
            Ok(schema) => {
                let change = self.form.apply_schema(&schema.elements);
                self.selected_grade = Some(grade.to_string());
                info!(
                    session = %self.session_id,
                    grade,
                    elements = schema.elements.len(),
                    "grade selected"
                );
                self.notify(Notification::info(format!(
                    "Grade {} selected ({} elements)",
                    grade,
                    schema.elements.len()
                )));
                Ok(change)
            }
            Err(error) => {
                self.notify(
                    Notification::error(format!("Failed to load elements for {}", grade))
                        .with_detail(error.to_string()),
                );
                Err(error.into())
            }
        }
    }

    /// Synthetic reading for the selected grade in the current mode.
    pub async fn generate_reading(&mut self) -> AppResult<ReadingOutcome> {
        let grade = self.selected_grade.as_deref().unwrap_or_default();
        let result = self.readings.generate(self.mode, grade, &mut self.form).await;

        let notification = match &result {
            Ok(ReadingOutcome::Single(report)) => Notification::success(format!(
                "Synthetic {} reading applied",
                self.mode
            ))
            .with_detail(format!("{} elements written", report.written.len())),
            Ok(ReadingOutcome::Mixed(report)) if report.is_total_failure() => {
                Notification::error("Synthetic reading failed")
                    .with_detail("both raw and scrap stages failed")
            }
            Ok(ReadingOutcome::Mixed(report)) if report.is_partial() => {
                let failed = match (&report.raw, &report.scrap) {
                    (Err(e), _) | (_, Err(e)) => e.to_string(),
                    _ => String::new(),
                };
                Notification::warning("Synthetic reading partially applied").with_detail(failed)
            }
            Ok(ReadingOutcome::Mixed(_)) => Notification::success("Synthetic raw and scrap readings applied"),
            Err(ReadingError::NoGradeSelected) => Notification::warning("Select a grade first"),
            Err(error) => Notification::error("Synthetic reading failed").with_detail(error.to_string()),
        };
        self.notify(notification);
        result.map_err(AppError::from)
    }

    /// Ask the optimizer for a recommendation. Never fails; see
    /// [`PredictionOutcome`].
    pub async fn generate_prediction(&mut self, now: DateTime<Utc>) -> PredictionOutcome {
        let grade = self.selected_grade.as_deref().unwrap_or_default();
        let outcome = self
            .orchestrator
            .generate(self.session.connection(), &self.form, grade, &format_minute(now))
            .await;

        let notification = match &outcome {
            PredictionOutcome::Skipped(SkipReason::NotConnected(_)) => {
                Notification::warning("Connect to the device network first")
            }
            PredictionOutcome::Live(_) => Notification::success("Prediction received"),
            PredictionOutcome::Fallback(result) => {
                warn!(session = %self.session_id, "serving fallback recommendation");
                let title = if result.timed_out {
                    "Optimizer timed out, showing cached recommendation"
                } else {
                    "Optimizer unavailable, showing cached recommendation"
                };
                Notification::warning(title).with_detail(result.error.clone().unwrap_or_default())
            }
        };
        self.notify(notification);
        outcome
    }

    /// Simulate one round of device telemetry and copy the furnace zones
    /// into the form.
    pub fn sample_telemetry(&mut self, now: DateTime<Utc>) -> Option<ZoneTemperatures> {
        let zones = self.session.sample_telemetry(&mut self.telemetry_rng, now)?;
        self.form.set(ZONE1_TEMP, zones.zone1);
        self.form.set(ZONE2_TEMP, zones.zone2);
        self.form.set(ZONE3_TEMP, zones.zone3);
        Some(zones)
    }

    pub fn view(&self) -> ConsoleView {
        ConsoleView {
            session_id: self.session_id,
            connection: self.session.connection(),
            devices: self.session.devices(),
            grades: self.grades.grades().to_vec(),
            selected_grade: self.selected_grade.clone(),
            mode: self.mode,
            form: self.form.to_json(),
            prediction: self.orchestrator.latest().cloned(),
        }
    }

    /// Stop polling and drop the console. The device session is left as
    /// the backend reports it; only `disconnect` closes it.
    pub async fn shutdown(mut self) {
        self.stop_polling();
        info!(session = %self.session_id, "console session closed");
    }
}
