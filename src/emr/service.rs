//! Patient/visit service - business logic for the EMR operations
//!
//! Each operation validates its input, executes against the mock store, and
//! emits a payload-free audit line. When the server is not in mock mode the
//! operations would call the CareLink API instead; that integration is not
//! implemented yet and every live path fails with an upstream error.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};

use crate::config::Config;
use crate::emr::mock::{to_search_result, to_visit_summary, MockStore};
use crate::emr::types::*;
use crate::error::{EmrError, Result};
use crate::logging;

/// Default page size for search and history listings
pub const DEFAULT_LIMIT: usize = 10;

/// Service over patient and visit records.
///
/// Owns its store behind a mutex so callers construct isolated instances;
/// tests get a fresh dataset per service with no global reset hook.
pub struct PatientService {
    config: Arc<Config>,
    store: Mutex<MockStore>,
}

impl PatientService {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            store: Mutex::new(MockStore::seeded()),
        }
    }

    fn live_mode_unavailable(&self) -> EmrError {
        EmrError::Api {
            message: "CareLink API integration not yet implemented".to_string(),
            api_status: None,
        }
    }

    /// Search for patients by name, id, or phone number
    pub async fn search_patients(
        &self,
        params: &PatientSearchParams,
    ) -> Result<PatientSearchResponse> {
        let started = Instant::now();
        tracing::info!(
            search_type = ?params.search_type,
            has_query = !params.query.trim().is_empty(),
            "searching patients"
        );

        if params.query.trim().is_empty() {
            return Err(EmrError::validation("Search query is required", "query"));
        }

        if !self.config.mock_mode {
            return Err(self.live_mode_unavailable());
        }

        let query = params.query.trim().to_lowercase();
        let query_digits: String = query.chars().filter(|c| c.is_ascii_digit()).collect();

        let store = self.store.lock().expect("mock store lock poisoned");

        let matched: Vec<PatientSearchResult> = store
            .patients
            .iter()
            .filter(|patient| {
                if let Some(status) = params.status {
                    if patient.status != status {
                        return false;
                    }
                }

                let full_name = patient.demographics.full_name().to_lowercase();
                let id = patient.id.id.to_lowercase();
                let phone_digits: String = patient
                    .contact
                    .phone
                    .as_deref()
                    .unwrap_or("")
                    .chars()
                    .filter(|c| c.is_ascii_digit())
                    .collect();

                // A query with no digits never matches on phone
                let phone_match =
                    !query_digits.is_empty() && phone_digits.contains(&query_digits);

                match params.search_type {
                    SearchType::Name => full_name.contains(&query),
                    SearchType::Id => id.contains(&query),
                    SearchType::Phone => phone_match,
                    SearchType::All => {
                        full_name.contains(&query) || id.contains(&query) || phone_match
                    }
                }
            })
            .map(to_search_result)
            .collect();

        let total = matched.len();
        let results: Vec<PatientSearchResult> = matched
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .collect();
        let has_more = params.offset + results.len() < total;

        logging::audit("search_patient", true, started.elapsed().as_millis());

        Ok(PatientSearchResponse {
            results,
            total,
            limit: params.limit,
            offset: params.offset,
            has_more,
        })
    }

    /// Fetch a full patient record by internal id
    pub async fn get_patient(&self, patient_id: &str) -> Result<Patient> {
        let started = Instant::now();
        tracing::info!(has_patient_id = !patient_id.trim().is_empty(), "getting patient");

        if patient_id.trim().is_empty() {
            return Err(EmrError::validation("Patient ID is required", "patientId"));
        }

        if !self.config.mock_mode {
            return Err(self.live_mode_unavailable());
        }

        let store = self.store.lock().expect("mock store lock poisoned");
        match store.find_patient(patient_id) {
            Some(patient) => {
                logging::audit("get_patient", true, started.elapsed().as_millis());
                Ok(patient.clone())
            }
            None => {
                logging::audit("get_patient", false, started.elapsed().as_millis());
                Err(EmrError::not_found("Patient"))
            }
        }
    }

    /// Retrieve a patient's visit history, most recent first
    pub async fn get_patient_history(
        &self,
        params: &PatientHistoryParams,
    ) -> Result<PatientHistoryResponse> {
        let started = Instant::now();
        tracing::info!(
            has_patient_id = !params.patient_id.trim().is_empty(),
            "getting patient history"
        );

        if params.patient_id.trim().is_empty() {
            return Err(EmrError::validation("Patient ID is required", "patientId"));
        }

        if !self.config.mock_mode {
            return Err(self.live_mode_unavailable());
        }

        let store = self.store.lock().expect("mock store lock poisoned");

        let patient = match store.find_patient(&params.patient_id) {
            Some(p) => p,
            None => {
                logging::audit("get_patient_history", false, started.elapsed().as_millis());
                return Err(EmrError::not_found("Patient"));
            }
        };
        let patient_name = patient.demographics.full_name();

        let mut visits: Vec<&VisitNote> = store
            .visits
            .iter()
            .filter(|v| v.patient_id == params.patient_id)
            .filter(|v| match &params.start_date {
                Some(start) => v.visit_date.as_str() >= start.as_str(),
                None => true,
            })
            .filter(|v| match &params.end_date {
                Some(end) => v.visit_date.as_str() <= end.as_str(),
                None => true,
            })
            .filter(|v| match params.visit_type {
                Some(t) => v.visit_type == t,
                None => true,
            })
            .collect();

        // Most recent first; stable sort keeps store order for same-day visits
        visits.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));

        let total = visits.len();
        let page: Vec<VisitNoteSummary> = visits
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .map(to_visit_summary)
            .collect();
        let has_more = params.offset + page.len() < total;

        logging::audit("get_patient_history", true, started.elapsed().as_millis());

        Ok(PatientHistoryResponse {
            patient_id: params.patient_id.clone(),
            patient_name,
            visits: page,
            total,
            limit: params.limit,
            offset: params.offset,
            has_more,
        })
    }

    /// Create a visit note for an existing patient
    pub async fn create_visit_note(
        &self,
        params: &CreateVisitNoteParams,
    ) -> Result<CreateVisitNoteResponse> {
        let started = Instant::now();
        tracing::info!(
            has_patient_id = !params.patient_id.trim().is_empty(),
            visit_type = ?params.visit_type,
            "creating visit note"
        );

        if params.patient_id.trim().is_empty() {
            return Err(EmrError::validation("Patient ID is required", "patientId"));
        }
        if params.visit_date.trim().is_empty() {
            return Err(EmrError::validation("Visit date is required", "visitDate"));
        }
        if params.time_in.trim().is_empty() {
            return Err(EmrError::validation("Time in is required", "timeIn"));
        }
        if params.time_out.trim().is_empty() {
            return Err(EmrError::validation("Time out is required", "timeOut"));
        }

        if !self.config.mock_mode {
            return Err(self.live_mode_unavailable());
        }

        let duration = compute_duration(&params.time_in, &params.time_out)?;

        let mut store = self.store.lock().expect("mock store lock poisoned");

        if store.find_patient(&params.patient_id).is_none() {
            logging::audit("create_visit_note", false, started.elapsed().as_millis());
            return Err(EmrError::not_found("Patient"));
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let visit_note = VisitNote {
            id: store.next_visit_note_id(),
            patient_id: params.patient_id.clone(),
            visit_type: params.visit_type,
            status: VisitStatus::Completed,
            visit_date: params.visit_date.clone(),
            time_in: params.time_in.clone(),
            time_out: params.time_out.clone(),
            duration,
            vital_signs: params.vital_signs.clone(),
            subjective: params.subjective.clone(),
            objective: params.objective.clone(),
            assessment: params.assessment.clone(),
            plan: params.plan.clone(),
            interventions: params.interventions.clone(),
            patient_response: params.patient_response.clone(),
            education: params.education.clone(),
            notes: params.notes.clone(),
            next_visit_date: params.next_visit_date.clone(),
            // Signer identity would come from an auth context once one exists
            nurse_id: "RN-CURRENT".to_string(),
            nurse_name: "Current User, RN".to_string(),
            signed_at: Some(now.clone()),
            signed_by: Some("Current User, RN".to_string()),
            created_at: now.clone(),
            updated_at: now,
        };

        store.visits.push(visit_note.clone());

        logging::audit("create_visit_note", true, started.elapsed().as_millis());

        Ok(CreateVisitNoteResponse {
            visit_note_id: visit_note.id.clone(),
            message: format!(
                "Visit note {} created successfully for patient {}",
                visit_note.id, visit_note.patient_id
            ),
            visit_note,
        })
    }
}

/// Minutes between two HH:MM clock times, floored at zero.
fn compute_duration(time_in: &str, time_out: &str) -> Result<u32> {
    let minutes_in = parse_clock_minutes(time_in)
        .ok_or_else(|| EmrError::validation("Time in must be HH:MM (24-hour)", "timeIn"))?;
    let minutes_out = parse_clock_minutes(time_out)
        .ok_or_else(|| EmrError::validation("Time out must be HH:MM (24-hour)", "timeOut"))?;

    Ok(minutes_out.saturating_sub(minutes_in))
}

fn parse_clock_minutes(time: &str) -> Option<u32> {
    let (hours, minutes) = time.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    fn mock_service() -> PatientService {
        PatientService::new(Arc::new(Config {
            api_url: String::new(),
            api_key: String::new(),
            client_id: None,
            client_secret: None,
            supabase_url: None,
            supabase_key: None,
            mock_mode: true,
            log_level: LogLevel::Info,
            request_timeout_ms: 30_000,
        }))
    }

    fn search(query: &str) -> PatientSearchParams {
        PatientSearchParams {
            query: query.to_string(),
            search_type: SearchType::All,
            status: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let service = mock_service();
        let response = service.search_patients(&search("Eleanor")).await.unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.results[0].first_name, "Eleanor");
    }

    #[tokio::test]
    async fn test_search_by_id() {
        let service = mock_service();
        let mut params = search("PT-10001");
        params.search_type = SearchType::Id;

        let response = service.search_patients(&params).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, "PT-10001");
    }

    #[tokio::test]
    async fn test_search_by_phone_digits_only() {
        let service = mock_service();
        let mut params = search("5550101");
        params.search_type = SearchType::Phone;

        let response = service.search_patients(&params).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].phone.as_deref(), Some("555-0101"));
    }

    #[tokio::test]
    async fn test_search_status_filter() {
        let service = mock_service();
        let mut params = search("Thompson");
        params.status = Some(PatientStatus::Active);

        let response = service.search_patients(&params).await.unwrap();
        assert!(!response.results.is_empty());
        for result in &response.results {
            assert_eq!(result.status, PatientStatus::Active);
        }
    }

    #[tokio::test]
    async fn test_search_empty_query_fails_validation() {
        let service = mock_service();
        let err = service.search_patients(&search("   ")).await.unwrap_err();
        assert!(matches!(err, EmrError::Validation { ref field, .. } if field == "query"));
    }

    #[tokio::test]
    async fn test_search_no_match_is_empty_not_error() {
        let service = mock_service();
        let response = service
            .search_patients(&search("NonexistentPatient12345"))
            .await
            .unwrap();
        assert_eq!(response.total, 0);
        assert!(response.results.is_empty());
        assert!(!response.has_more);
    }

    #[tokio::test]
    async fn test_search_pagination_total_is_slice_independent() {
        let service = mock_service();
        let mut params = search("pt-");
        params.limit = 2;

        let page1 = service.search_patients(&params).await.unwrap();
        assert_eq!(page1.total, 5);
        assert_eq!(page1.results.len(), 2);
        assert!(page1.has_more);

        params.offset = 4;
        let page3 = service.search_patients(&params).await.unwrap();
        assert_eq!(page3.total, 5);
        assert_eq!(page3.results.len(), 1);
        assert!(!page3.has_more);
    }

    #[tokio::test]
    async fn test_get_patient() {
        let service = mock_service();
        let patient = service.get_patient("PT-10001").await.unwrap();
        assert_eq!(patient.demographics.first_name, "Eleanor");
        assert_eq!(patient.demographics.last_name, "Thompson");
    }

    #[tokio::test]
    async fn test_get_patient_not_found() {
        let service = mock_service();
        let err = service.get_patient("PT-99999").await.unwrap_err();
        assert!(matches!(err, EmrError::NotFound { .. }));
        assert!(!err.to_string().contains("PT-99999"));
    }

    #[tokio::test]
    async fn test_get_patient_empty_id() {
        let service = mock_service();
        let err = service.get_patient("").await.unwrap_err();
        assert!(matches!(err, EmrError::Validation { ref field, .. } if field == "patientId"));
    }

    #[tokio::test]
    async fn test_history_sorted_descending() {
        let service = mock_service();
        let response = service
            .get_patient_history(&PatientHistoryParams {
                patient_id: "PT-10001".to_string(),
                limit: DEFAULT_LIMIT,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.patient_name, "Eleanor Thompson");
        assert!(response.visits.len() >= 2);
        for pair in response.visits.windows(2) {
            assert!(pair[0].visit_date >= pair[1].visit_date);
        }
    }

    #[tokio::test]
    async fn test_history_date_range_filter() {
        let service = mock_service();
        let response = service
            .get_patient_history(&PatientHistoryParams {
                patient_id: "PT-10001".to_string(),
                limit: DEFAULT_LIMIT,
                start_date: Some("2024-12-18".to_string()),
                end_date: Some("2024-12-20".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.visits[0].visit_date, "2024-12-20");
    }

    #[tokio::test]
    async fn test_history_unknown_patient() {
        let service = mock_service();
        let err = service
            .get_patient_history(&PatientHistoryParams {
                patient_id: "PT-99999".to_string(),
                limit: DEFAULT_LIMIT,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EmrError::NotFound { .. }));
    }

    fn create_params(patient_id: &str, time_in: &str, time_out: &str) -> CreateVisitNoteParams {
        CreateVisitNoteParams {
            patient_id: patient_id.to_string(),
            visit_type: VisitType::SkilledNursing,
            visit_date: "2024-12-22".to_string(),
            time_in: time_in.to_string(),
            time_out: time_out.to_string(),
            vital_signs: None,
            subjective: None,
            objective: None,
            assessment: None,
            plan: None,
            interventions: None,
            patient_response: None,
            education: None,
            next_visit_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_visit_note_duration() {
        let service = mock_service();
        let response = service
            .create_visit_note(&create_params("PT-10001", "09:15", "10:00"))
            .await
            .unwrap();

        assert_eq!(response.visit_note.duration, 45);
        assert_eq!(response.visit_note.status, VisitStatus::Completed);
        assert!(response.visit_note_id.starts_with("VN-"));
    }

    #[tokio::test]
    async fn test_create_visit_note_negative_duration_clamps_to_zero() {
        let service = mock_service();
        let response = service
            .create_visit_note(&create_params("PT-10001", "10:00", "09:15"))
            .await
            .unwrap();
        assert_eq!(response.visit_note.duration, 0);
    }

    #[tokio::test]
    async fn test_create_visit_note_rejects_bad_clock_time() {
        let service = mock_service();
        let err = service
            .create_visit_note(&create_params("PT-10001", "25:00", "26:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, EmrError::Validation { ref field, .. } if field == "timeIn"));
    }

    #[tokio::test]
    async fn test_create_visit_note_unknown_patient_does_not_grow_store() {
        let service = mock_service();

        let before = service
            .get_patient_history(&PatientHistoryParams {
                patient_id: "PT-10001".to_string(),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap()
            .total;

        let err = service
            .create_visit_note(&create_params("PT-99999", "09:00", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, EmrError::NotFound { .. }));

        let after = service
            .get_patient_history(&PatientHistoryParams {
                patient_id: "PT-10001".to_string(),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap()
            .total;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_created_note_round_trips_through_history() {
        let service = mock_service();
        let created = service
            .create_visit_note(&create_params("PT-10001", "10:00", "10:45"))
            .await
            .unwrap();

        let history = service
            .get_patient_history(&PatientHistoryParams {
                patient_id: "PT-10001".to_string(),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap();

        let found = history
            .visits
            .iter()
            .find(|v| v.id == created.visit_note_id)
            .expect("created note missing from history");
        assert_eq!(found.duration, 45);
    }

    #[tokio::test]
    async fn test_create_visit_note_missing_fields() {
        let service = mock_service();

        let mut params = create_params("PT-10001", "09:00", "10:00");
        params.visit_date = String::new();
        let err = service.create_visit_note(&params).await.unwrap_err();
        assert!(matches!(err, EmrError::Validation { ref field, .. } if field == "visitDate"));

        let mut params = create_params("PT-10001", "09:00", "10:00");
        params.time_out = String::new();
        let err = service.create_visit_note(&params).await.unwrap_err();
        assert!(matches!(err, EmrError::Validation { ref field, .. } if field == "timeOut"));
    }

    #[tokio::test]
    async fn test_live_mode_paths_fail_upstream() {
        let service = PatientService::new(Arc::new(Config {
            api_url: "https://emr.example.com".to_string(),
            api_key: "key".to_string(),
            client_id: None,
            client_secret: None,
            supabase_url: None,
            supabase_key: None,
            mock_mode: false,
            log_level: LogLevel::Info,
            request_timeout_ms: 30_000,
        }));

        let err = service.search_patients(&search("Eleanor")).await.unwrap_err();
        assert!(matches!(err, EmrError::Api { .. }));

        let err = service.get_patient("PT-10001").await.unwrap_err();
        assert!(matches!(err, EmrError::Api { .. }));
    }

    #[test]
    fn test_compute_duration() {
        assert_eq!(compute_duration("09:15", "10:00").unwrap(), 45);
        assert_eq!(compute_duration("10:00", "09:15").unwrap(), 0);
        assert_eq!(compute_duration("00:00", "23:59").unwrap(), 1439);
        assert!(compute_duration("9am", "10:00").is_err());
    }
}
