//! Analytics pipeline trigger
//!
//! `GET|POST /analytics` rebuilds the conflict-resolution analytics tables
//! and views. By default the pipeline first checks whether any new monthly
//! release has landed since the last snapshot and skips the rebuild when
//! there is nothing new. Flags:
//!
//! - `force=true`       rebuild even if no new data
//! - `skip_check=true`  skip the new-data check
//! - `check_only=true`  report whether a rebuild is needed, run nothing
//! - `views_only=true`  refresh only the dashboard views
//! - `project=<id>`     project label echoed in the report
//!
//! Flags are string-encoded; exactly `"true"` enables them.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::AppState;

pub mod scripts;

use scripts::{views_only_scripts, Script, SQL_SCRIPTS};

/// Raw trigger parameters. Flags arrive as strings; anything other than
/// exactly `"true"` is false.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsParams {
    pub force: Option<String>,
    pub skip_check: Option<String>,
    pub check_only: Option<String>,
    pub views_only: Option<String>,
    pub project: Option<String>,
}

impl AnalyticsParams {
    fn flag(value: &Option<String>) -> bool {
        value.as_deref().map(|v| v.to_lowercase()) == Some("true".to_string())
    }

    pub fn force(&self) -> bool {
        Self::flag(&self.force)
    }

    pub fn skip_check(&self) -> bool {
        Self::flag(&self.skip_check)
    }

    pub fn check_only(&self) -> bool {
        Self::flag(&self.check_only)
    }

    pub fn views_only(&self) -> bool {
        Self::flag(&self.views_only)
    }
}

/// What the trigger decided to do, resolved from the flags and (when the
/// new-data check ran) the number of unprocessed release months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// No new data: report `skipped` and run nothing. `report_rebuild_needed`
    /// is set on the `check_only` path, where the caller asked for the
    /// verdict explicitly.
    Skip { report_rebuild_needed: bool },
    /// `check_only` with new data: report that a rebuild is needed, run
    /// nothing.
    RebuildNeeded,
    /// `check_only` with the check bypassed: report as-is, run nothing.
    CheckOnly,
    /// Run the pipeline.
    Run { views_only: bool },
}

/// Whether the new-data check runs at all. `force`, `skip_check`, and
/// `views_only` all bypass it.
pub fn needs_new_data_check(params: &AnalyticsParams) -> bool {
    !params.skip_check() && !params.force() && !params.views_only()
}

/// Resolve the flags plus the check result (when one was performed) into a
/// single decision. Pure; no SQL runs here.
pub fn gate_decision(params: &AnalyticsParams, new_months: Option<i64>) -> GateDecision {
    if let Some(new_months) = new_months {
        if new_months == 0 {
            return GateDecision::Skip {
                report_rebuild_needed: params.check_only(),
            };
        }
        if params.check_only() {
            return GateDecision::RebuildNeeded;
        }
    }

    if params.check_only() {
        return GateDecision::CheckOnly;
    }

    GateDecision::Run {
        views_only: params.views_only(),
    }
}

/// Outcome of one pipeline step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub description: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execution report returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub project: String,
    pub started_at: String,
    pub steps: Vec<StepResult>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_months_found: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuild_needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration_seconds: Option<f64>,
}

impl Report {
    fn new(project: String) -> Self {
        Self {
            project,
            started_at: Utc::now().to_rfc3339(),
            steps: Vec::new(),
            status: "success".to_string(),
            new_months_found: None,
            rebuild_needed: None,
            message: None,
            completed_at: None,
            total_duration_seconds: None,
        }
    }
}

/// Failure wrapper for this endpoint: unhandled analytics errors render
/// with an `error` key, unlike the ingest trigger's `message` shape.
#[derive(Debug)]
pub struct AnalyticsError(AppError);

impl<E> From<E> for AnalyticsError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Analytics request failed: {:?}", self.0);
        }

        let body = Json(json!({
            "status": "error",
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Handle an analytics trigger request.
#[instrument(skip(state))]
pub async fn handle_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<Report>, AnalyticsError> {
    let project = params
        .project
        .clone()
        .unwrap_or_else(|| state.config.warehouse.project.clone());

    let mut report = Report::new(project);

    let new_months = if needs_new_data_check(&params) {
        let count = state.warehouse.fetch_new_month_count().await?;
        report.new_months_found = Some(count);
        Some(count)
    } else {
        None
    };

    let scripts_to_run: &[Script] = match gate_decision(&params, new_months) {
        GateDecision::Skip {
            report_rebuild_needed,
        } => {
            info!("No new monthly releases, skipping analytics rebuild");
            report.status = "skipped".to_string();
            report.message = Some("No new monthly releases to process".to_string());
            if report_rebuild_needed {
                report.rebuild_needed = Some(false);
            }
            return Ok(Json(report));
        },
        GateDecision::RebuildNeeded => {
            report.rebuild_needed = Some(true);
            report.message = Some(format!(
                "Found {} new month(s) to process",
                new_months.unwrap_or(0)
            ));
            return Ok(Json(report));
        },
        GateDecision::CheckOnly => return Ok(Json(report)),
        GateDecision::Run { views_only: true } => views_only_scripts(),
        GateDecision::Run { views_only: false } => SQL_SCRIPTS,
    };

    for script in scripts_to_run {
        info!("{} ({})", script.description, script.file);
        match state.warehouse.execute_script(script.sql).await {
            Ok(elapsed) => {
                report.steps.push(StepResult {
                    description: script.description.to_string(),
                    status: "success".to_string(),
                    duration_seconds: Some(elapsed.as_secs_f64()),
                    error: None,
                });
            },
            Err(e) => {
                error!("Analytics step failed ({}): {}", script.file, e);
                report.steps.push(StepResult {
                    description: script.description.to_string(),
                    status: "error".to_string(),
                    duration_seconds: None,
                    error: Some(e.to_string()),
                });
                report.status = "partial_failure".to_string();
            },
        }
    }

    report.completed_at = Some(Utc::now().to_rfc3339());

    if !report.steps.is_empty() {
        let total: f64 = report
            .steps
            .iter()
            .filter(|s| s.status == "success")
            .filter_map(|s| s.duration_seconds)
            .sum();
        report.total_duration_seconds = Some(total);
    }

    if report.status == "partial_failure" {
        warn!("Analytics pipeline completed with failed steps");
    } else {
        info!("Analytics pipeline completed");
    }

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn params(force: bool, skip_check: bool, check_only: bool, views_only: bool) -> AnalyticsParams {
        let flag = |on: bool| on.then(|| "true".to_string());
        AnalyticsParams {
            force: flag(force),
            skip_check: flag(skip_check),
            check_only: flag(check_only),
            views_only: flag(views_only),
            project: None,
        }
    }

    #[test]
    fn test_flags_require_exact_true() {
        let params = AnalyticsParams {
            force: Some("true".to_string()),
            skip_check: Some("TRUE".to_string()),
            check_only: Some("1".to_string()),
            views_only: Some("yes".to_string()),
            project: None,
        };

        assert!(params.force());
        assert!(params.skip_check()); // case-insensitive
        assert!(!params.check_only());
        assert!(!params.views_only());
        assert!(!AnalyticsParams::default().force());
    }

    #[test]
    fn test_params_deserialize_from_query() {
        let params: AnalyticsParams =
            serde_urlencoded::from_str("force=true&project=gvw-prod").unwrap();
        assert!(params.force());
        assert!(!params.skip_check());
        assert_eq!(params.project.as_deref(), Some("gvw-prod"));
    }

    #[test]
    fn test_check_runs_only_without_bypass_flags() {
        assert!(needs_new_data_check(&params(false, false, false, false)));
        assert!(needs_new_data_check(&params(false, false, true, false)));
        assert!(!needs_new_data_check(&params(true, false, false, false)));
        assert!(!needs_new_data_check(&params(false, true, false, false)));
        assert!(!needs_new_data_check(&params(false, false, false, true)));
    }

    #[test]
    fn test_gate_skips_when_no_new_data() {
        let decision = gate_decision(&params(false, false, false, false), Some(0));
        assert_eq!(
            decision,
            GateDecision::Skip {
                report_rebuild_needed: false
            }
        );
    }

    #[test]
    fn test_gate_check_only_no_new_data_reports_no_rebuild() {
        // check_only with nothing new: skipped, rebuild_needed=false, and
        // no scripts run.
        let decision = gate_decision(&params(false, false, true, false), Some(0));
        assert_eq!(
            decision,
            GateDecision::Skip {
                report_rebuild_needed: true
            }
        );
    }

    #[test]
    fn test_gate_check_only_with_new_data() {
        let decision = gate_decision(&params(false, false, true, false), Some(3));
        assert_eq!(decision, GateDecision::RebuildNeeded);
    }

    #[test]
    fn test_gate_check_only_with_check_bypassed() {
        let decision = gate_decision(&params(false, true, true, false), None);
        assert_eq!(decision, GateDecision::CheckOnly);
    }

    #[test]
    fn test_gate_runs_with_new_data_or_force() {
        assert_eq!(
            gate_decision(&params(false, false, false, false), Some(2)),
            GateDecision::Run { views_only: false }
        );
        assert_eq!(
            gate_decision(&params(true, false, false, false), None),
            GateDecision::Run { views_only: false }
        );
        assert_eq!(
            gate_decision(&params(false, false, false, true), None),
            GateDecision::Run { views_only: true }
        );
    }

    #[test]
    fn test_report_serialization_omits_unset_fields() {
        let report = Report::new("gvw-dev".to_string());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["project"], "gvw-dev");
        assert!(json.get("new_months_found").is_none());
        assert!(json.get("message").is_none());
        assert!(json.get("total_duration_seconds").is_none());
    }

    #[test]
    fn test_step_result_serialization() {
        let step = StepResult {
            description: "Creating monthly_conflict_snapshots".to_string(),
            status: "error".to_string(),
            duration_seconds: None,
            error: Some("relation does not exist".to_string()),
        };
        let json = serde_json::to_value(&step).unwrap();

        assert_eq!(json["status"], "error");
        assert!(json.get("duration_seconds").is_none());
        assert_eq!(json["error"], "relation does not exist");
    }

    #[tokio::test]
    async fn test_failure_body_uses_error_key() {
        let err = AnalyticsError::from(AppError::Internal("warehouse unavailable".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body.get("error").is_some());
        assert!(body.get("message").is_none());
    }
}
