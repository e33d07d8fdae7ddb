//! Dashboard sync adapter
//!
//! Best-effort one-way sync of visit notes into the Supabase store backing
//! the EMR dashboard, so the dashboard reflects visits documented through
//! this server. Every failure here is logged and collapsed to `false`; sync
//! must never block or fail the primary create operation.
//!
//! The dashboard schema uses snake_case column names and represents the
//! intervention/education lists as checklist objects, so rows are reshaped
//! on the way out.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::config::Config;
use crate::emr::types::{VisitNote, VisitStatus, VitalSigns};
use crate::logging;

/// Partial visit update for the dashboard store. Only present fields are
/// written.
#[derive(Debug, Clone, Default)]
pub struct VisitNoteUpdate {
    pub vital_signs: Option<VitalSigns>,
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub interventions: Option<Vec<String>>,
    pub education: Option<Vec<String>>,
    pub time_in: Option<String>,
    pub time_out: Option<String>,
    pub next_visit_date: Option<String>,
    pub status: Option<VisitStatus>,
}

/// Client for the dashboard's `visits` table
pub struct DashboardSync {
    http_client: reqwest::Client,
    config: Arc<Config>,
}

impl DashboardSync {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }

    /// Whether the dashboard store is configured
    pub fn enabled(&self) -> bool {
        self.config.supabase_enabled()
    }

    fn visits_url(&self) -> Option<(String, String)> {
        match (&self.config.supabase_url, &self.config.supabase_key) {
            (Some(url), Some(key)) => Some((
                format!("{}/rest/v1/visits", url.trim_end_matches('/')),
                key.clone(),
            )),
            _ => None,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.request_timeout_ms)
    }

    /// Fire-and-forget entry point: dispatch the sync onto the runtime and
    /// observe nothing. The caller's contract is independent of the outcome.
    pub fn submit(self: &Arc<Self>, visit: VisitNote) {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            sync.sync_visit(&visit).await;
        });
    }

    /// Upsert a visit note into the dashboard store, keyed by visit id.
    ///
    /// Returns `false` when the store is not configured or the write fails.
    pub async fn sync_visit(&self, visit: &VisitNote) -> bool {
        let (url, key) = match self.visits_url() {
            Some(target) => target,
            None => {
                tracing::debug!("dashboard store not configured, skipping sync");
                return false;
            }
        };

        tracing::info!(visit_id = %visit.id, "syncing visit to dashboard");

        let row = visit_row(visit);
        let result = self
            .http_client
            .post(&url)
            .timeout(self.timeout())
            .header("apikey", &key)
            .bearer_auth(&key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(visit_id = %visit.id, "dashboard sync successful");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    visit_id = %visit.id,
                    %status,
                    "dashboard sync failed: {}",
                    logging::sanitize(&body)
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    visit_id = %visit.id,
                    "dashboard sync error: {}",
                    logging::sanitize(&e.to_string())
                );
                false
            }
        }
    }

    /// Partially update a visit row in the dashboard store.
    ///
    /// Same fail-soft contract as [`sync_visit`](Self::sync_visit).
    pub async fn update_visit(&self, visit_id: &str, updates: &VisitNoteUpdate) -> bool {
        let (url, key) = match self.visits_url() {
            Some(target) => target,
            None => {
                tracing::debug!("dashboard store not configured, skipping update");
                return false;
            }
        };

        let row = update_row(updates);
        if row.as_object().map(|o| o.is_empty()).unwrap_or(true) {
            tracing::debug!(visit_id = %visit_id, "no dashboard fields to update");
            return false;
        }

        let result = self
            .http_client
            .patch(format!("{}?id=eq.{}", url, visit_id))
            .timeout(self.timeout())
            .header("apikey", &key)
            .bearer_auth(&key)
            .json(&row)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(visit_id = %visit_id, "dashboard update successful");
                true
            }
            Ok(response) => {
                let status = response.status();
                tracing::error!(visit_id = %visit_id, %status, "dashboard update failed");
                false
            }
            Err(e) => {
                tracing::error!(
                    visit_id = %visit_id,
                    "dashboard update error: {}",
                    logging::sanitize(&e.to_string())
                );
                false
            }
        }
    }
}

/// Vitals block in the dashboard schema: explicit nulls, unit defaults, and
/// glucose placeholders the visit model does not carry yet.
fn vitals_row(vitals: Option<&VitalSigns>) -> Value {
    let empty = VitalSigns::default();
    let vs = vitals.unwrap_or(&empty);

    json!({
        "bloodPressureSystolic": vs.blood_pressure_systolic,
        "bloodPressureDiastolic": vs.blood_pressure_diastolic,
        "heartRate": vs.heart_rate,
        "oxygenSaturation": vs.oxygen_saturation,
        "temperature": vs.temperature,
        "temperatureUnit": vs.temperature_unit.as_deref().unwrap_or("F"),
        "respiratoryRate": vs.respiratory_rate,
        "painLevel": vs.pain_level,
        "weight": vs.weight,
        "weightUnit": vs.weight_unit.as_deref().unwrap_or("lbs"),
        "bloodGlucose": Value::Null,
        "glucoseUnit": "mg/dL",
        "glucoseTiming": Value::Null,
    })
}

/// String list to dashboard checklist items with synthetic sequential codes
fn checklist(items: Option<&Vec<String>>, prefix: &str) -> Value {
    let entries: Vec<Value> = items
        .map(|list| {
            list.iter()
                .enumerate()
                .map(|(index, description)| {
                    json!({
                        "code": format!("{}-{:03}", prefix, index + 1),
                        "description": description,
                        "completed": true,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Value::Array(entries)
}

/// Full visit row in the dashboard schema
fn visit_row(visit: &VisitNote) -> Value {
    json!({
        "id": visit.id,
        "patient_id": visit.patient_id,
        "visit_type": visit.visit_type,
        "visit_date": visit.visit_date,
        "time_in": visit.time_in,
        "time_out": visit.time_out,
        "nurse_name": visit.nurse_name,
        "vital_signs": vitals_row(visit.vital_signs.as_ref()),
        "subjective": visit.subjective,
        "objective": visit.objective,
        "assessment": visit.assessment,
        "plan": visit.plan,
        "interventions": checklist(visit.interventions.as_ref(), "INT"),
        "education": checklist(visit.education.as_ref(), "EDU"),
        "next_visit_date": visit.next_visit_date,
        "status": visit.status,
    })
}

/// Row containing only the columns present in the partial update
fn update_row(updates: &VisitNoteUpdate) -> Value {
    let mut row = serde_json::Map::new();

    if let Some(vitals) = &updates.vital_signs {
        row.insert("vital_signs".to_string(), vitals_row(Some(vitals)));
    }
    if let Some(subjective) = &updates.subjective {
        row.insert("subjective".to_string(), json!(subjective));
    }
    if let Some(objective) = &updates.objective {
        row.insert("objective".to_string(), json!(objective));
    }
    if let Some(assessment) = &updates.assessment {
        row.insert("assessment".to_string(), json!(assessment));
    }
    if let Some(plan) = &updates.plan {
        row.insert("plan".to_string(), json!(plan));
    }
    if let Some(interventions) = &updates.interventions {
        row.insert(
            "interventions".to_string(),
            checklist(Some(interventions), "INT"),
        );
    }
    if let Some(education) = &updates.education {
        row.insert("education".to_string(), checklist(Some(education), "EDU"));
    }
    if let Some(time_in) = &updates.time_in {
        row.insert("time_in".to_string(), json!(time_in));
    }
    if let Some(time_out) = &updates.time_out {
        row.insert("time_out".to_string(), json!(time_out));
    }
    if let Some(next_visit_date) = &updates.next_visit_date {
        row.insert("next_visit_date".to_string(), json!(next_visit_date));
    }
    if let Some(status) = &updates.status {
        row.insert("status".to_string(), json!(status));
    }

    Value::Object(row)
}
