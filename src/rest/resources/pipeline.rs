//! Pipeline run resource.
//!
//! Pipeline runs are read-only: they are started with
//! [`ResourceClient::run_pipeline`](crate::rest::ResourceClient::run_pipeline)
//! and observed by reloading them until [`Pipeline::is_done`].

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::rest::resource::Resource;
use crate::rest::resources::common::Reference;
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

const PIPELINE_SCHEMA: Schema = Schema {
    name: "Pipeline",
    endpoint: "api/v2/pipelines",
    seq_field: Some("pipelineRunSeq"),
    id_field: None,
    fields: &[
        FieldSpec::required("pipelineRunSeq", FieldKind::Text),
        FieldSpec::optional("command", FieldKind::Text),
        FieldSpec::optional("stageType", FieldKind::Any),
        FieldSpec::optional("dateSubmitted", FieldKind::DateTime),
        FieldSpec::optional("startTime", FieldKind::DateTime),
        FieldSpec::optional("stopTime", FieldKind::DateTime),
        FieldSpec::optional("state", FieldKind::Text),
        FieldSpec::optional("status", FieldKind::Text),
        FieldSpec::optional("numErrors", FieldKind::Integer),
        FieldSpec::optional("numWarnings", FieldKind::Integer),
        FieldSpec::optional("period", FieldKind::Any),
        FieldSpec::optional("processingUnit", FieldKind::Any),
        FieldSpec::optional("batchName", FieldKind::Text),
        FieldSpec::optional("runMode", FieldKind::Text),
        FieldSpec::optional("description", FieldKind::Text),
    ],
    expand: &["stageType", "period", "processingUnit"],
};

/// States after which a run no longer changes.
const FINAL_STATES: &[&str] = &["Done", "Cancelled", "Failed"];

/// A pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub pipeline_run_seq: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_type: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_submitted: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<DateTime<FixedOffset>>,
    /// Lifecycle state, e.g. `Scheduled`, `Running` or `Done`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Outcome, e.g. `Successful` or `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_errors: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_warnings: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_unit: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Pipeline {
    /// Whether the run has reached a final state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state
            .as_deref()
            .is_some_and(|state| FINAL_STATES.contains(&state))
    }

    /// Whether the run finished without errors.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.is_done()
            && self.status.as_deref() == Some("Successful")
            && self.num_errors.unwrap_or(0) == 0
    }
}

impl Resource for Pipeline {
    const SCHEMA: &'static Schema = &PIPELINE_SCHEMA;

    fn seq(&self) -> Option<&str> {
        Some(&self.pipeline_run_seq)
    }
}
