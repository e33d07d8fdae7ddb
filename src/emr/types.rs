//! EMR domain types
//!
//! Patient and visit records as exchanged with the CareLink EMR, plus the
//! parameter and response shapes for the service operations. Wire names are
//! camelCase to match the EMR's JSON convention.

use serde::{Deserialize, Serialize};

/// Patient lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    Active,
    Inactive,
    Discharged,
    Pending,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Inactive => "inactive",
            PatientStatus::Discharged => "discharged",
            PatientStatus::Pending => "pending",
        }
    }
}

/// Patient gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

/// Patient identifier set - unique within the EMR system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientId {
    /// Internal EMR ID (e.g., "PT-10001")
    pub id: String,

    /// Medical record number, if different from the internal id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrn: Option<String>,

    /// External system ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// Patient demographic information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    /// ISO 8601 date (YYYY-MM-DD)
    pub date_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl Demographics {
    /// Display name, "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Mailing address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Patient contact information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Insurance summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_payer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
}

/// Care team assignment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareTeam {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_nurse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_physician: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
}

/// Full patient record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub demographics: Demographics,
    pub contact: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Insurance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_team: Option<CareTeam>,
    pub status: PatientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discharge_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Visit type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    SkilledNursing,
    PhysicalTherapy,
    OccupationalTherapy,
    SpeechTherapy,
    HomeHealthAide,
    SocialWork,
    InitialAssessment,
    Recertification,
    Discharge,
    Other,
}

impl VisitType {
    /// Human-readable label for tool output
    pub fn label(&self) -> &'static str {
        match self {
            VisitType::SkilledNursing => "Skilled Nursing",
            VisitType::PhysicalTherapy => "Physical Therapy",
            VisitType::OccupationalTherapy => "Occupational Therapy",
            VisitType::SpeechTherapy => "Speech Therapy",
            VisitType::HomeHealthAide => "Home Health Aide",
            VisitType::SocialWork => "Social Work",
            VisitType::InitialAssessment => "Initial Assessment",
            VisitType::Recertification => "Recertification",
            VisitType::Discharge => "Discharge",
            VisitType::Other => "Other",
        }
    }
}

/// Visit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Scheduled,
    InProgress,
    Completed,
    Missed,
    Cancelled,
    PendingReview,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Scheduled => "scheduled",
            VisitStatus::InProgress => "in_progress",
            VisitStatus::Completed => "completed",
            VisitStatus::Missed => "missed",
            VisitStatus::Cancelled => "cancelled",
            VisitStatus::PendingReview => "pending_review",
        }
    }
}

/// Vital signs recorded during a visit. Embedded value object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_systolic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_diastolic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// "F" or "C"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// "lbs" or "kg"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
    /// 0-10 scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<f64>,
}

/// Visit note record as stored in the EMR
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitNote {
    pub id: String,
    pub patient_id: String,
    pub visit_type: VisitType,
    pub status: VisitStatus,
    pub visit_date: String,
    /// HH:MM, 24-hour
    pub time_in: String,
    pub time_out: String,
    /// Minutes, derived from time_in/time_out
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vital_signs: Option<VitalSigns>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interventions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_visit_date: Option<String>,
    pub nurse_id: String,
    pub nurse_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Reduced patient shape for search listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSearchResult {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: PatientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_diagnosis: Option<String>,
}

/// Reduced visit shape for history listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitNoteSummary {
    pub id: String,
    pub visit_date: String,
    pub visit_type: VisitType,
    pub status: VisitStatus,
    pub duration: u32,
    pub nurse_name: String,
    pub has_vitals: bool,
}

/// Which field(s) a patient search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Name,
    Id,
    Phone,
    #[default]
    All,
}

/// Patient search parameters
#[derive(Debug, Clone)]
pub struct PatientSearchParams {
    pub query: String,
    pub search_type: SearchType,
    pub status: Option<PatientStatus>,
    pub limit: usize,
    pub offset: usize,
}

/// Patient search response
#[derive(Debug, Clone)]
pub struct PatientSearchResponse {
    pub results: Vec<PatientSearchResult>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Patient history request parameters
#[derive(Debug, Clone, Default)]
pub struct PatientHistoryParams {
    pub patient_id: String,
    pub limit: usize,
    pub offset: usize,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub visit_type: Option<VisitType>,
}

/// Patient history response
#[derive(Debug, Clone)]
pub struct PatientHistoryResponse {
    pub patient_id: String,
    pub patient_name: String,
    pub visits: Vec<VisitNoteSummary>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Visit note creation parameters
#[derive(Debug, Clone)]
pub struct CreateVisitNoteParams {
    pub patient_id: String,
    pub visit_type: VisitType,
    pub visit_date: String,
    pub time_in: String,
    pub time_out: String,
    pub vital_signs: Option<VitalSigns>,
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub interventions: Option<Vec<String>>,
    pub patient_response: Option<String>,
    pub education: Option<Vec<String>>,
    pub next_visit_date: Option<String>,
    pub notes: Option<String>,
}

/// Visit note creation response
#[derive(Debug, Clone)]
pub struct CreateVisitNoteResponse {
    pub visit_note_id: String,
    pub message: String,
    pub visit_note: VisitNote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_type_wire_format() {
        let json = serde_json::to_string(&VisitType::SkilledNursing).unwrap();
        assert_eq!(json, "\"skilled_nursing\"");

        let parsed: VisitType = serde_json::from_str("\"home_health_aide\"").unwrap();
        assert_eq!(parsed, VisitType::HomeHealthAide);
    }

    #[test]
    fn test_visit_type_labels_cover_all_variants() {
        assert_eq!(VisitType::InitialAssessment.label(), "Initial Assessment");
        assert_eq!(VisitType::Other.label(), "Other");
    }

    #[test]
    fn test_patient_status_wire_format() {
        let parsed: PatientStatus = serde_json::from_str("\"discharged\"").unwrap();
        assert_eq!(parsed, PatientStatus::Discharged);
        assert_eq!(parsed.as_str(), "discharged");
    }

    #[test]
    fn test_visit_note_serializes_camel_case() {
        let note = VisitNote {
            id: "VN-30000".to_string(),
            patient_id: "PT-10001".to_string(),
            visit_type: VisitType::SkilledNursing,
            status: VisitStatus::Completed,
            visit_date: "2024-12-22".to_string(),
            time_in: "09:00".to_string(),
            time_out: "09:45".to_string(),
            duration: 45,
            vital_signs: None,
            subjective: None,
            objective: None,
            assessment: None,
            plan: None,
            interventions: None,
            patient_response: None,
            education: None,
            notes: None,
            next_visit_date: None,
            nurse_id: "RN-001".to_string(),
            nurse_name: "Sarah Johnson, RN".to_string(),
            signed_at: None,
            signed_by: None,
            created_at: "2024-12-22T10:00:00Z".to_string(),
            updated_at: "2024-12-22T10:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"patientId\":\"PT-10001\""));
        assert!(json.contains("\"timeIn\":\"09:00\""));
        assert!(!json.contains("vitalSigns"));
    }

    #[test]
    fn test_search_type_default_is_all() {
        assert_eq!(SearchType::default(), SearchType::All);
    }
}
