//! MCP tool definitions and handlers
//!
//! Three tools front the patient service: `search_patient`,
//! `get_patient_history`, and `create_visit_note`. Each handler coerces the
//! raw argument object into typed service parameters, runs the operation,
//! and renders a human-readable text summary. Errors never escape a handler;
//! they become one formatted line on an error-flagged result.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::emr::service::{PatientService, DEFAULT_LIMIT};
use crate::emr::supabase::DashboardSync;
use crate::emr::types::*;
use crate::error::{format_error, EmrError};
use crate::logging;
use crate::mcp::types::{CallToolResult, Tool};

/// Hard ceiling on requested page sizes
const MAX_LIMIT: usize = 50;

/// Tool handler: owns the service and the dashboard sync adapter
pub struct ToolHandler {
    service: Arc<PatientService>,
    dashboard: Arc<DashboardSync>,
    config: Arc<Config>,
}

impl ToolHandler {
    pub fn new(
        service: Arc<PatientService>,
        dashboard: Arc<DashboardSync>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            service,
            dashboard,
            config,
        }
    }

    /// All tool definitions, for `tools/list`
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            tool_def(
                "search_patient",
                "Search for a patient in the CareLink EMR system by name, ID, or phone number.\n\n\
                 Returns matching patient records with basic information. Use this tool to find \
                 patients before creating visit notes or retrieving history.\n\n\
                 Examples:\n\
                 - Search by name: \"Eleanor Thompson\"\n\
                 - Search by ID: \"PT-10001\"\n\
                 - Search by phone: \"555-0101\"",
                search_patient_schema(),
            ),
            tool_def(
                "get_patient_history",
                "Retrieve visit history for a patient from the CareLink EMR system.\n\n\
                 Returns a list of previous visits with dates, types, and key information. Use \
                 this to review patient history before creating a new visit note.\n\n\
                 Use search_patient first to get the patient ID.",
                get_patient_history_schema(),
            ),
            tool_def(
                "create_visit_note",
                "Create a visit note for a patient in the CareLink EMR system.\n\n\
                 This tool documents a home health visit including vital signs, assessment, and \
                 care plan. Use search_patient first to get the patient ID.\n\n\
                 Required fields: patientId, visitType, visitDate, timeIn, timeOut\n\
                 Recommended fields: vitalSigns, subjective, objective, assessment, plan",
                create_visit_note_schema(),
            ),
        ]
    }

    /// Names of all registered tools
    pub fn tool_names(&self) -> Vec<String> {
        self.list_tools().into_iter().map(|t| t.name).collect()
    }

    /// Dispatch a tool call by name.
    ///
    /// An unrecognized name is a handled case: the response is error-flagged
    /// and lists the valid tool names.
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        tracing::info!(tool = %name, "tool called");

        match name {
            "search_patient" => self.handle_search_patient(args).await,
            "get_patient_history" => self.handle_get_patient_history(args).await,
            "create_visit_note" => self.handle_create_visit_note(args).await,
            _ => {
                tracing::warn!(tool = %name, "unknown tool requested");
                CallToolResult::error_text(format!(
                    "Unknown tool: {}. Available tools: {}",
                    name,
                    self.tool_names().join(", ")
                ))
            }
        }
    }

    fn mock_banner(&self) -> &'static str {
        if self.config.mock_mode {
            "⚠️ MOCK MODE: Using test data (CareLink API not connected)\n\n"
        } else {
            ""
        }
    }

    fn error_result(&self, tool: &str, error: &EmrError) -> CallToolResult {
        tracing::error!(
            tool = %tool,
            "tool execution failed: {}",
            logging::sanitize(&error.to_string())
        );
        CallToolResult::error_text(format_error(error))
    }

    // ==================== search_patient ====================

    async fn handle_search_patient(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            query: Option<String>,
            search_type: Option<SearchType>,
            status: Option<PatientStatus>,
            limit: Option<u64>,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error_text(format!("Invalid arguments: {}", e)),
        };

        let params = PatientSearchParams {
            query: args.query.unwrap_or_default(),
            search_type: args.search_type.unwrap_or_default(),
            status: args.status,
            limit: clamp_limit(args.limit),
            offset: 0,
        };

        match self.service.search_patients(&params).await {
            Ok(response) => {
                CallToolResult::text(render_search(self.mock_banner(), &params.query, &response))
            }
            Err(e) => self.error_result("search_patient", &e),
        }
    }

    // ==================== get_patient_history ====================

    async fn handle_get_patient_history(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            patient_id: Option<String>,
            limit: Option<u64>,
            start_date: Option<String>,
            end_date: Option<String>,
            visit_type: Option<VisitType>,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error_text(format!("Invalid arguments: {}", e)),
        };

        let params = PatientHistoryParams {
            patient_id: args.patient_id.unwrap_or_default(),
            limit: clamp_limit(args.limit),
            offset: 0,
            start_date: args.start_date,
            end_date: args.end_date,
            visit_type: args.visit_type,
        };

        match self.service.get_patient_history(&params).await {
            Ok(response) => {
                CallToolResult::text(render_history(self.mock_banner(), &params, &response))
            }
            Err(e) => self.error_result("get_patient_history", &e),
        }
    }

    // ==================== create_visit_note ====================

    async fn handle_create_visit_note(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            patient_id: Option<String>,
            visit_type: Option<VisitType>,
            visit_date: Option<String>,
            time_in: Option<String>,
            time_out: Option<String>,
            vital_signs: Option<VitalSigns>,
            subjective: Option<String>,
            objective: Option<String>,
            assessment: Option<String>,
            plan: Option<String>,
            interventions: Option<Vec<String>>,
            patient_response: Option<String>,
            education: Option<Vec<String>>,
            next_visit_date: Option<String>,
            notes: Option<String>,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error_text(format!("Invalid arguments: {}", e)),
        };

        let visit_type = match args.visit_type {
            Some(t) => t,
            None => {
                return self.error_result(
                    "create_visit_note",
                    &EmrError::validation("Visit type is required", "visitType"),
                )
            }
        };

        let params = CreateVisitNoteParams {
            patient_id: args.patient_id.unwrap_or_default(),
            visit_type,
            visit_date: args.visit_date.unwrap_or_default(),
            time_in: args.time_in.unwrap_or_default(),
            time_out: args.time_out.unwrap_or_default(),
            vital_signs: args.vital_signs,
            subjective: args.subjective,
            objective: args.objective,
            assessment: args.assessment,
            plan: args.plan,
            interventions: args.interventions,
            patient_response: args.patient_response,
            education: args.education,
            next_visit_date: args.next_visit_date,
            notes: args.notes,
        };

        match self.service.create_visit_note(&params).await {
            Ok(response) => {
                // Best-effort dashboard sync; the create response never
                // depends on its outcome.
                if self.dashboard.enabled() {
                    self.dashboard.submit(response.visit_note.clone());
                }

                CallToolResult::text(render_created(self.mock_banner(), &params, &response))
            }
            Err(e) => self.error_result("create_visit_note", &e),
        }
    }
}

fn clamp_limit(limit: Option<u64>) -> usize {
    match limit {
        Some(0) | None => DEFAULT_LIMIT,
        Some(n) => (n as usize).min(MAX_LIMIT),
    }
}

// ==================== Rendering ====================

fn render_search(banner: &str, query: &str, response: &PatientSearchResponse) -> String {
    let mut text = String::from(banner);

    if response.results.is_empty() {
        text.push_str(&format!("No patients found matching \"{}\"", query));
        return text;
    }

    text.push_str(&format!(
        "Found {} patient(s) matching \"{}\":\n\n",
        response.total, query
    ));

    for patient in &response.results {
        text.push_str(&format!(
            "**{} {}** ({})\n",
            patient.first_name, patient.last_name, patient.id
        ));
        text.push_str(&format!("  • DOB: {}\n", patient.date_of_birth));
        if let Some(phone) = &patient.phone {
            text.push_str(&format!("  • Phone: {}\n", phone));
        }
        text.push_str(&format!("  • Status: {}\n", patient.status.as_str()));
        if let Some(dx) = &patient.primary_diagnosis {
            text.push_str(&format!("  • Primary Dx: {}\n", dx));
        }
        text.push('\n');
    }

    if response.has_more {
        text.push_str(&format!(
            "\n_Showing {} of {} results_",
            response.results.len(),
            response.total
        ));
    }

    text
}

fn render_history(
    banner: &str,
    params: &PatientHistoryParams,
    response: &PatientHistoryResponse,
) -> String {
    let mut text = String::from(banner);

    text.push_str(&format!(
        "**Visit History for {}** ({})\n\n",
        response.patient_name, response.patient_id
    ));

    if response.visits.is_empty() {
        text.push_str("_No visits found for the specified criteria._\n");

        if params.start_date.is_some() || params.end_date.is_some() || params.visit_type.is_some()
        {
            text.push_str("\nFilters applied:\n");
            if let Some(start) = &params.start_date {
                text.push_str(&format!("  • From: {}\n", start));
            }
            if let Some(end) = &params.end_date {
                text.push_str(&format!("  • To: {}\n", end));
            }
            if let Some(visit_type) = params.visit_type {
                text.push_str(&format!("  • Type: {}\n", visit_type.label()));
            }
        }
        return text;
    }

    text.push_str(&format!(
        "Showing {} of {} visit(s):\n\n",
        response.visits.len(),
        response.total
    ));

    for visit in &response.visits {
        let status_icon = if visit.status == VisitStatus::Completed {
            "✅"
        } else {
            "⏳"
        };
        text.push_str(&format!(
            "{} **{}** - {}\n",
            status_icon,
            visit.visit_date,
            visit.visit_type.label()
        ));
        text.push_str(&format!(
            "   • Duration: {} min | Nurse: {}\n",
            visit.duration, visit.nurse_name
        ));
        if visit.has_vitals {
            text.push_str("   • Vitals recorded\n");
        }
        text.push('\n');
    }

    if response.has_more {
        text.push_str(&format!(
            "_Showing {} of {} visits. Use limit parameter to see more._\n",
            response.visits.len(),
            response.total
        ));
    }

    text
}

fn render_created(
    banner: &str,
    params: &CreateVisitNoteParams,
    response: &CreateVisitNoteResponse,
) -> String {
    let mut text = String::from(banner);

    text.push_str("✅ **Visit Note Created Successfully**\n\n");
    text.push_str(&format!("• Note ID: {}\n", response.visit_note_id));
    text.push_str(&format!("• Patient: {}\n", params.patient_id));
    text.push_str(&format!("• Visit Type: {}\n", params.visit_type.label()));
    text.push_str(&format!("• Date: {}\n", params.visit_date));
    text.push_str(&format!("• Time: {} - {}\n", params.time_in, params.time_out));
    text.push_str(&format!(
        "• Duration: {} minutes\n",
        response.visit_note.duration
    ));

    if let Some(vs) = &params.vital_signs {
        text.push_str("\n**Vital Signs Recorded:**\n");
        if let (Some(systolic), Some(diastolic)) =
            (vs.blood_pressure_systolic, vs.blood_pressure_diastolic)
        {
            text.push_str(&format!("  • BP: {}/{} mmHg\n", systolic, diastolic));
        }
        if let Some(hr) = vs.heart_rate {
            text.push_str(&format!("  • HR: {} bpm\n", hr));
        }
        if let Some(temp) = vs.temperature {
            text.push_str(&format!(
                "  • Temp: {}°{}\n",
                temp,
                vs.temperature_unit.as_deref().unwrap_or("F")
            ));
        }
        if let Some(o2) = vs.oxygen_saturation {
            text.push_str(&format!("  • O2 Sat: {}%\n", o2));
        }
        if let Some(weight) = vs.weight {
            text.push_str(&format!(
                "  • Weight: {} {}\n",
                weight,
                vs.weight_unit.as_deref().unwrap_or("lbs")
            ));
        }
    }

    if let Some(next) = &params.next_visit_date {
        text.push_str(&format!("\n📅 Next visit scheduled: {}\n", next));
    }

    text
}

// ==================== Schema definitions ====================

fn tool_def(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn visit_type_values() -> Value {
    json!([
        "skilled_nursing",
        "physical_therapy",
        "occupational_therapy",
        "speech_therapy",
        "home_health_aide",
        "social_work",
        "initial_assessment",
        "recertification",
        "discharge",
        "other"
    ])
}

fn search_patient_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Search term: patient name, ID (e.g., PT-10001), or phone number"
            },
            "searchType": {
                "type": "string",
                "enum": ["name", "id", "phone", "all"],
                "description": "Type of search to perform. Defaults to \"all\" which searches across all fields."
            },
            "status": {
                "type": "string",
                "enum": ["active", "inactive", "discharged", "pending"],
                "description": "Filter by patient status. If not specified, returns all statuses."
            },
            "limit": {
                "type": "number",
                "description": "Maximum number of results to return (default: 10, max: 50)"
            }
        },
        "required": ["query"]
    })
}

fn get_patient_history_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "patientId": {
                "type": "string",
                "description": "Patient ID from search_patient (e.g., PT-10001)"
            },
            "limit": {
                "type": "number",
                "description": "Maximum number of visits to return (default: 10, max: 50)"
            },
            "startDate": {
                "type": "string",
                "description": "Filter visits on or after this date (YYYY-MM-DD)"
            },
            "endDate": {
                "type": "string",
                "description": "Filter visits on or before this date (YYYY-MM-DD)"
            },
            "visitType": {
                "type": "string",
                "enum": visit_type_values(),
                "description": "Filter by visit type"
            }
        },
        "required": ["patientId"]
    })
}

fn create_visit_note_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "patientId": {
                "type": "string",
                "description": "Patient ID from search_patient (e.g., PT-10001)"
            },
            "visitType": {
                "type": "string",
                "enum": visit_type_values(),
                "description": "Type of visit"
            },
            "visitDate": {
                "type": "string",
                "description": "Date of visit (YYYY-MM-DD format)"
            },
            "timeIn": {
                "type": "string",
                "description": "Time nurse arrived (HH:MM format, 24-hour)"
            },
            "timeOut": {
                "type": "string",
                "description": "Time nurse departed (HH:MM format, 24-hour)"
            },
            "vitalSigns": {
                "type": "object",
                "description": "Vital signs recorded during visit",
                "properties": {
                    "bloodPressureSystolic": {"type": "number", "description": "Systolic BP (mmHg)"},
                    "bloodPressureDiastolic": {"type": "number", "description": "Diastolic BP (mmHg)"},
                    "heartRate": {"type": "number", "description": "Heart rate (bpm)"},
                    "respiratoryRate": {"type": "number", "description": "Respiratory rate (breaths/min)"},
                    "temperature": {"type": "number", "description": "Temperature"},
                    "temperatureUnit": {"type": "string", "enum": ["F", "C"], "description": "Temperature unit"},
                    "oxygenSaturation": {"type": "number", "description": "O2 saturation (%)"},
                    "weight": {"type": "number", "description": "Weight"},
                    "weightUnit": {"type": "string", "enum": ["lbs", "kg"], "description": "Weight unit"},
                    "painLevel": {"type": "number", "description": "Pain level (0-10)"}
                }
            },
            "subjective": {
                "type": "string",
                "description": "Patient's reported symptoms, concerns, and statements"
            },
            "objective": {
                "type": "string",
                "description": "Nurse's observations and physical assessment findings"
            },
            "assessment": {
                "type": "string",
                "description": "Clinical assessment and interpretation of findings"
            },
            "plan": {
                "type": "string",
                "description": "Care plan and next steps"
            },
            "interventions": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of interventions performed during visit"
            },
            "patientResponse": {
                "type": "string",
                "description": "How patient responded to care/interventions"
            },
            "education": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Patient education topics covered"
            },
            "nextVisitDate": {
                "type": "string",
                "description": "Scheduled next visit date (YYYY-MM-DD)"
            },
            "notes": {
                "type": "string",
                "description": "Additional notes or comments"
            }
        },
        "required": ["patientId", "visitType", "visitDate", "timeIn", "timeOut"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use crate::mcp::types::ToolContent;

    fn handler() -> ToolHandler {
        let config = Arc::new(Config {
            api_url: String::new(),
            api_key: String::new(),
            client_id: None,
            client_secret: None,
            supabase_url: None,
            supabase_key: None,
            mock_mode: true,
            log_level: LogLevel::Info,
            request_timeout_ms: 30_000,
        });
        ToolHandler::new(
            Arc::new(PatientService::new(config.clone())),
            Arc::new(DashboardSync::new(config.clone())),
            config,
        )
    }

    fn result_text(result: &CallToolResult) -> &str {
        let ToolContent::Text { text } = &result.content[0];
        text
    }

    #[test]
    fn test_three_tools_registered() {
        let handler = handler();
        let names = handler.tool_names();
        assert_eq!(
            names,
            vec!["search_patient", "get_patient_history", "create_visit_note"]
        );

        for tool in handler.list_tools() {
            assert!(tool.input_schema["required"].is_array());
            assert!(tool.description.is_some());
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_lists_valid_names() {
        let handler = handler();
        let result = handler.call_tool("delete_patient", json!({})).await;

        assert!(result.is_error);
        let text = result_text(&result);
        assert!(text.contains("Unknown tool: delete_patient"));
        assert!(text.contains("search_patient"));
        assert!(text.contains("get_patient_history"));
        assert!(text.contains("create_visit_note"));
    }

    #[tokio::test]
    async fn test_search_renders_results_with_banner() {
        let handler = handler();
        let result = handler
            .call_tool("search_patient", json!({"query": "Eleanor"}))
            .await;

        assert!(!result.is_error);
        let text = result_text(&result);
        assert!(text.starts_with("⚠️ MOCK MODE"));
        assert!(text.contains("**Eleanor Thompson** (PT-10001)"));
        assert!(text.contains("• Status: active"));
        assert!(text.contains("• Primary Dx: Type 2 Diabetes"));
    }

    #[tokio::test]
    async fn test_search_empty_query_is_error_line() {
        let handler = handler();
        let result = handler.call_tool("search_patient", json!({"query": ""})).await;

        assert!(result.is_error);
        assert_eq!(
            result_text(&result),
            "Error [VALIDATION_ERROR]: Search query is required"
        );
    }

    #[tokio::test]
    async fn test_search_no_match_message() {
        let handler = handler();
        let result = handler
            .call_tool("search_patient", json!({"query": "Zebediah"}))
            .await;

        assert!(!result.is_error);
        assert!(result_text(&result).contains("No patients found matching \"Zebediah\""));
    }

    #[tokio::test]
    async fn test_history_rendering() {
        let handler = handler();
        let result = handler
            .call_tool("get_patient_history", json!({"patientId": "PT-10001"}))
            .await;

        assert!(!result.is_error);
        let text = result_text(&result);
        assert!(text.contains("**Visit History for Eleanor Thompson** (PT-10001)"));
        assert!(text.contains("Skilled Nursing"));
        assert!(text.contains("✅ **2024-12-20**"));
        assert!(text.contains("Vitals recorded"));
    }

    #[tokio::test]
    async fn test_history_empty_lists_filters() {
        let handler = handler();
        let result = handler
            .call_tool(
                "get_patient_history",
                json!({
                    "patientId": "PT-10001",
                    "startDate": "2030-01-01",
                    "visitType": "discharge"
                }),
            )
            .await;

        assert!(!result.is_error);
        let text = result_text(&result);
        assert!(text.contains("_No visits found for the specified criteria._"));
        assert!(text.contains("• From: 2030-01-01"));
        assert!(text.contains("• Type: Discharge"));
    }

    #[tokio::test]
    async fn test_history_unknown_patient_error_line() {
        let handler = handler();
        let result = handler
            .call_tool("get_patient_history", json!({"patientId": "PT-99999"}))
            .await;

        assert!(result.is_error);
        assert_eq!(result_text(&result), "Error [NOT_FOUND]: Patient not found");
    }

    #[tokio::test]
    async fn test_create_visit_note_rendering() {
        let handler = handler();
        let result = handler
            .call_tool(
                "create_visit_note",
                json!({
                    "patientId": "PT-10001",
                    "visitType": "skilled_nursing",
                    "visitDate": "2024-12-22",
                    "timeIn": "09:15",
                    "timeOut": "10:00",
                    "vitalSigns": {
                        "bloodPressureSystolic": 120,
                        "bloodPressureDiastolic": 80,
                        "heartRate": 72
                    },
                    "nextVisitDate": "2024-12-26"
                }),
            )
            .await;

        assert!(!result.is_error);
        let text = result_text(&result);
        assert!(text.contains("✅ **Visit Note Created Successfully**"));
        assert!(text.contains("• Duration: 45 minutes"));
        assert!(text.contains("• BP: 120/80 mmHg"));
        assert!(text.contains("• HR: 72 bpm"));
        assert!(text.contains("📅 Next visit scheduled: 2024-12-26"));
    }

    #[tokio::test]
    async fn test_create_visit_note_missing_visit_type() {
        let handler = handler();
        let result = handler
            .call_tool(
                "create_visit_note",
                json!({
                    "patientId": "PT-10001",
                    "visitDate": "2024-12-22",
                    "timeIn": "09:00",
                    "timeOut": "10:00"
                }),
            )
            .await;

        assert!(result.is_error);
        assert_eq!(
            result_text(&result),
            "Error [VALIDATION_ERROR]: Visit type is required"
        );
    }

    #[tokio::test]
    async fn test_create_visit_note_invalid_enum_is_invalid_arguments() {
        let handler = handler();
        let result = handler
            .call_tool(
                "create_visit_note",
                json!({
                    "patientId": "PT-10001",
                    "visitType": "house_call",
                    "visitDate": "2024-12-22",
                    "timeIn": "09:00",
                    "timeOut": "10:00"
                }),
            )
            .await;

        assert!(result.is_error);
        assert!(result_text(&result).starts_with("Invalid arguments:"));
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(5)), 5);
        assert_eq!(clamp_limit(Some(500)), MAX_LIMIT);
    }
}
