//! In-memory mock dataset
//!
//! Seeded patient and visit collections used whenever the server runs in
//! mock mode. All names, addresses, and identifiers are fictional.
//!
//! Patients are fixed for the process lifetime; visit notes are append-only
//! and ids generated here are monotonically increasing and never reused.

use crate::emr::types::*;

/// Mock patient and visit store
#[derive(Debug)]
pub struct MockStore {
    pub patients: Vec<Patient>,
    pub visits: Vec<VisitNote>,
    visit_note_counter: u64,
}

impl MockStore {
    /// Build a store populated with the seed dataset
    pub fn seeded() -> Self {
        Self {
            patients: seed_patients(),
            visits: seed_visits(),
            visit_note_counter: 30_000,
        }
    }

    /// Next sequential visit note id
    pub fn next_visit_note_id(&mut self) -> String {
        let id = format!("VN-{}", self.visit_note_counter);
        self.visit_note_counter += 1;
        id
    }

    /// Find a patient by internal id
    pub fn find_patient(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id.id == patient_id)
    }
}

/// Reduce a full patient record to the search-listing shape
pub fn to_search_result(patient: &Patient) -> PatientSearchResult {
    PatientSearchResult {
        id: patient.id.id.clone(),
        first_name: patient.demographics.first_name.clone(),
        last_name: patient.demographics.last_name.clone(),
        date_of_birth: patient.demographics.date_of_birth.clone(),
        phone: patient.contact.phone.clone(),
        status: patient.status,
        primary_diagnosis: patient
            .diagnosis
            .as_ref()
            .and_then(|d| d.first().cloned()),
    }
}

/// Reduce a visit note to the history-listing shape
pub fn to_visit_summary(visit: &VisitNote) -> VisitNoteSummary {
    VisitNoteSummary {
        id: visit.id.clone(),
        visit_date: visit.visit_date.clone(),
        visit_type: visit.visit_type,
        status: visit.status,
        duration: visit.duration,
        nurse_name: visit.nurse_name.clone(),
        has_vitals: visit.vital_signs.is_some(),
    }
}

#[allow(clippy::too_many_arguments)] // seed rows read best as flat columns
fn patient(
    id: &str,
    mrn: &str,
    first: &str,
    last: &str,
    dob: &str,
    gender: Gender,
    phone: &str,
    phone_type: &str,
    street: &str,
    street2: Option<&str>,
    zip: &str,
    payer: &str,
    member_id: &str,
    nurse: &str,
    physician: &str,
    status: PatientStatus,
    admission: &str,
    discharge: Option<&str>,
    diagnosis: &[&str],
    created: &str,
    updated: &str,
) -> Patient {
    Patient {
        id: PatientId {
            id: id.to_string(),
            mrn: Some(mrn.to_string()),
            external_id: None,
        },
        demographics: Demographics {
            first_name: first.to_string(),
            last_name: last.to_string(),
            middle_name: None,
            date_of_birth: dob.to_string(),
            gender: Some(gender),
        },
        contact: Contact {
            phone: Some(phone.to_string()),
            phone_type: Some(phone_type.to_string()),
            alternate_phone: None,
            email: None,
            address: Some(Address {
                street1: street.to_string(),
                street2: street2.map(str::to_string),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip_code: zip.to_string(),
                country: None,
            }),
        },
        insurance: Some(Insurance {
            primary_payer: Some(payer.to_string()),
            member_id: Some(member_id.to_string()),
            group_number: None,
        }),
        care_team: Some(CareTeam {
            primary_nurse: Some(nurse.to_string()),
            primary_physician: Some(physician.to_string()),
            case_manager: None,
            agency: Some("Springfield Home Health".to_string()),
        }),
        status,
        admission_date: Some(admission.to_string()),
        discharge_date: discharge.map(str::to_string),
        diagnosis: Some(diagnosis.iter().map(|d| d.to_string()).collect()),
        created_at: created.to_string(),
        updated_at: updated.to_string(),
    }
}

fn seed_patients() -> Vec<Patient> {
    vec![
        patient(
            "PT-10001",
            "MRN-001",
            "Eleanor",
            "Thompson",
            "1942-03-15",
            Gender::Female,
            "555-0101",
            "home",
            "123 Oak Street",
            None,
            "62701",
            "Medicare",
            "MBI-001-TEST",
            "Sarah Johnson, RN",
            "Dr. Michael Chen",
            PatientStatus::Active,
            "2024-11-01",
            None,
            &["Type 2 Diabetes", "Hypertension", "CHF"],
            "2024-11-01T10:00:00Z",
            "2024-12-20T14:30:00Z",
        ),
        patient(
            "PT-10002",
            "MRN-002",
            "Robert",
            "Martinez",
            "1955-07-22",
            Gender::Male,
            "555-0102",
            "mobile",
            "456 Maple Avenue",
            Some("Apt 2B"),
            "62702",
            "Blue Cross",
            "BC-002-TEST",
            "Sarah Johnson, RN",
            "Dr. Lisa Wong",
            PatientStatus::Active,
            "2024-10-15",
            None,
            &["COPD", "Post-surgical wound care"],
            "2024-10-15T09:00:00Z",
            "2024-12-19T11:00:00Z",
        ),
        patient(
            "PT-10003",
            "MRN-003",
            "Margaret",
            "Wilson",
            "1938-11-08",
            Gender::Female,
            "555-0103",
            "home",
            "789 Pine Road",
            None,
            "62703",
            "Medicare",
            "MBI-003-TEST",
            "James Miller, RN",
            "Dr. Michael Chen",
            PatientStatus::Active,
            "2024-09-01",
            None,
            &["Parkinson's Disease", "Fall risk", "Osteoporosis"],
            "2024-09-01T08:00:00Z",
            "2024-12-18T16:00:00Z",
        ),
        patient(
            "PT-10004",
            "MRN-004",
            "James",
            "Thompson",
            "1960-04-30",
            Gender::Male,
            "555-0105",
            "mobile",
            "321 Elm Street",
            None,
            "62704",
            "Aetna",
            "AET-004-TEST",
            "Sarah Johnson, RN",
            "Dr. Lisa Wong",
            PatientStatus::Active,
            "2024-12-01",
            None,
            &["Post-stroke rehabilitation", "Hypertension"],
            "2024-12-01T10:00:00Z",
            "2024-12-15T09:00:00Z",
        ),
        patient(
            "PT-10005",
            "MRN-005",
            "Dorothy",
            "Anderson",
            "1945-09-12",
            Gender::Female,
            "555-0106",
            "home",
            "654 Birch Lane",
            None,
            "62705",
            "Medicare",
            "MBI-005-TEST",
            "James Miller, RN",
            "Dr. Michael Chen",
            PatientStatus::Discharged,
            "2024-08-01",
            Some("2024-11-30"),
            &["Hip replacement recovery"],
            "2024-08-01T11:00:00Z",
            "2024-11-30T15:00:00Z",
        ),
    ]
}

fn seed_visits() -> Vec<VisitNote> {
    vec![
        VisitNote {
            id: "VN-20001".to_string(),
            patient_id: "PT-10001".to_string(),
            visit_type: VisitType::SkilledNursing,
            status: VisitStatus::Completed,
            visit_date: "2024-12-20".to_string(),
            time_in: "09:00".to_string(),
            time_out: "09:45".to_string(),
            duration: 45,
            vital_signs: Some(VitalSigns {
                blood_pressure_systolic: Some(138.0),
                blood_pressure_diastolic: Some(82.0),
                heart_rate: Some(72.0),
                temperature: Some(98.4),
                temperature_unit: Some("F".to_string()),
                oxygen_saturation: Some(96.0),
                weight: Some(165.0),
                weight_unit: Some("lbs".to_string()),
                ..Default::default()
            }),
            subjective: Some(
                "Patient reports feeling well. Denies chest pain, shortness of breath. \
                 States blood sugars have been stable."
                    .to_string(),
            ),
            objective: Some(
                "Alert and oriented x3. Lungs clear bilaterally. No peripheral edema noted. \
                 Skin intact."
                    .to_string(),
            ),
            assessment: Some("CHF stable. Diabetes well controlled. BP slightly elevated.".to_string()),
            plan: Some("Continue current medication regimen. Monitor BP. Follow up in 3 days.".to_string()),
            interventions: Some(vec![
                "Vital signs assessment".to_string(),
                "Medication reconciliation".to_string(),
                "Disease education".to_string(),
            ]),
            patient_response: Some(
                "Patient receptive to teaching. Verbalized understanding.".to_string(),
            ),
            education: Some(vec![
                "Importance of daily weights".to_string(),
                "Low sodium diet review".to_string(),
            ]),
            notes: None,
            next_visit_date: Some("2024-12-23".to_string()),
            nurse_id: "RN-001".to_string(),
            nurse_name: "Sarah Johnson, RN".to_string(),
            signed_at: Some("2024-12-20T10:00:00Z".to_string()),
            signed_by: Some("Sarah Johnson, RN".to_string()),
            created_at: "2024-12-20T09:45:00Z".to_string(),
            updated_at: "2024-12-20T10:00:00Z".to_string(),
        },
        VisitNote {
            id: "VN-20002".to_string(),
            patient_id: "PT-10001".to_string(),
            visit_type: VisitType::SkilledNursing,
            status: VisitStatus::Completed,
            visit_date: "2024-12-17".to_string(),
            time_in: "10:00".to_string(),
            time_out: "10:50".to_string(),
            duration: 50,
            vital_signs: Some(VitalSigns {
                blood_pressure_systolic: Some(142.0),
                blood_pressure_diastolic: Some(88.0),
                heart_rate: Some(78.0),
                temperature: Some(98.2),
                temperature_unit: Some("F".to_string()),
                oxygen_saturation: Some(95.0),
                weight: Some(167.0),
                weight_unit: Some("lbs".to_string()),
                ..Default::default()
            }),
            subjective: Some("Patient reports mild ankle swelling. No chest pain or SOB.".to_string()),
            objective: Some(
                "Alert and oriented. 1+ pitting edema bilateral ankles. Lungs with fine \
                 crackles at bases."
                    .to_string(),
            ),
            assessment: Some(
                "Early signs of CHF exacerbation. Weight up 2 lbs from last visit.".to_string(),
            ),
            plan: Some(
                "Contact physician regarding findings. Patient to elevate legs. Strict I&O."
                    .to_string(),
            ),
            interventions: Some(vec![
                "Vital signs assessment".to_string(),
                "Physical assessment".to_string(),
                "Physician notification".to_string(),
            ]),
            patient_response: Some(
                "Patient concerned about weight gain. Willing to comply with recommendations."
                    .to_string(),
            ),
            education: Some(vec![
                "Signs of CHF worsening".to_string(),
                "When to call nurse/doctor".to_string(),
            ]),
            notes: None,
            next_visit_date: Some("2024-12-20".to_string()),
            nurse_id: "RN-001".to_string(),
            nurse_name: "Sarah Johnson, RN".to_string(),
            signed_at: Some("2024-12-17T11:00:00Z".to_string()),
            signed_by: Some("Sarah Johnson, RN".to_string()),
            created_at: "2024-12-17T10:50:00Z".to_string(),
            updated_at: "2024-12-17T11:00:00Z".to_string(),
        },
        VisitNote {
            id: "VN-20003".to_string(),
            patient_id: "PT-10002".to_string(),
            visit_type: VisitType::SkilledNursing,
            status: VisitStatus::Completed,
            visit_date: "2024-12-19".to_string(),
            time_in: "14:00".to_string(),
            time_out: "14:40".to_string(),
            duration: 40,
            vital_signs: Some(VitalSigns {
                blood_pressure_systolic: Some(128.0),
                blood_pressure_diastolic: Some(76.0),
                heart_rate: Some(68.0),
                temperature: Some(98.6),
                temperature_unit: Some("F".to_string()),
                oxygen_saturation: Some(93.0),
                ..Default::default()
            }),
            subjective: Some(
                "Patient reports wound is less painful. Using incentive spirometer as instructed."
                    .to_string(),
            ),
            objective: Some(
                "Surgical wound healing well. Minimal serous drainage. No signs of infection."
                    .to_string(),
            ),
            assessment: Some("Wound healing as expected. COPD stable on current regimen.".to_string()),
            plan: Some("Continue wound care. Next dressing change in 2 days.".to_string()),
            interventions: Some(vec![
                "Wound assessment".to_string(),
                "Dressing change".to_string(),
                "Respiratory assessment".to_string(),
            ]),
            patient_response: Some(
                "Patient performing wound care independently with good technique.".to_string(),
            ),
            education: Some(vec![
                "Signs of wound infection".to_string(),
                "Breathing exercises".to_string(),
            ]),
            notes: None,
            next_visit_date: Some("2024-12-21".to_string()),
            nurse_id: "RN-001".to_string(),
            nurse_name: "Sarah Johnson, RN".to_string(),
            signed_at: Some("2024-12-19T15:00:00Z".to_string()),
            signed_by: Some("Sarah Johnson, RN".to_string()),
            created_at: "2024-12-19T14:40:00Z".to_string(),
            updated_at: "2024-12-19T15:00:00Z".to_string(),
        },
        VisitNote {
            id: "VN-20004".to_string(),
            patient_id: "PT-10003".to_string(),
            visit_type: VisitType::SkilledNursing,
            status: VisitStatus::Completed,
            visit_date: "2024-12-18".to_string(),
            time_in: "11:00".to_string(),
            time_out: "12:00".to_string(),
            duration: 60,
            vital_signs: Some(VitalSigns {
                blood_pressure_systolic: Some(118.0),
                blood_pressure_diastolic: Some(72.0),
                heart_rate: Some(64.0),
                temperature: Some(97.8),
                temperature_unit: Some("F".to_string()),
                oxygen_saturation: Some(98.0),
                ..Default::default()
            }),
            subjective: Some(
                "Patient reports occasional tremor but manageable. No falls since last visit."
                    .to_string(),
            ),
            objective: Some(
                "Mild resting tremor bilateral hands. Gait steady with walker. Home \
                 environment safe."
                    .to_string(),
            ),
            assessment: Some(
                "Parkinson's symptoms stable. Fall prevention measures in place.".to_string(),
            ),
            plan: Some("Continue current medications. Reinforce fall prevention strategies.".to_string()),
            interventions: Some(vec![
                "Neurological assessment".to_string(),
                "Fall risk assessment".to_string(),
                "Home safety evaluation".to_string(),
            ]),
            patient_response: Some("Patient and caregiver engaged in care planning.".to_string()),
            education: Some(vec![
                "Fall prevention".to_string(),
                "Medication timing importance".to_string(),
            ]),
            notes: None,
            next_visit_date: Some("2024-12-25".to_string()),
            nurse_id: "RN-002".to_string(),
            nurse_name: "James Miller, RN".to_string(),
            signed_at: Some("2024-12-18T12:30:00Z".to_string()),
            signed_by: Some("James Miller, RN".to_string()),
            created_at: "2024-12-18T12:00:00Z".to_string(),
            updated_at: "2024-12-18T12:30:00Z".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_data_shape() {
        let store = MockStore::seeded();
        assert_eq!(store.patients.len(), 5);
        assert_eq!(store.visits.len(), 4);
    }

    #[test]
    fn test_every_seed_visit_references_a_seed_patient() {
        let store = MockStore::seeded();
        for visit in &store.visits {
            assert!(
                store.find_patient(&visit.patient_id).is_some(),
                "visit {} has dangling patient id",
                visit.id
            );
        }
    }

    #[test]
    fn test_visit_note_ids_are_sequential() {
        let mut store = MockStore::seeded();
        assert_eq!(store.next_visit_note_id(), "VN-30000");
        assert_eq!(store.next_visit_note_id(), "VN-30001");
    }

    #[test]
    fn test_search_result_takes_first_diagnosis() {
        let store = MockStore::seeded();
        let eleanor = store.find_patient("PT-10001").unwrap();
        let result = to_search_result(eleanor);
        assert_eq!(result.primary_diagnosis.as_deref(), Some("Type 2 Diabetes"));
        assert_eq!(result.first_name, "Eleanor");
    }

    #[test]
    fn test_visit_summary_flags_vitals() {
        let store = MockStore::seeded();
        let summary = to_visit_summary(&store.visits[0]);
        assert!(summary.has_vitals);
        assert_eq!(summary.duration, 45);
    }
}
