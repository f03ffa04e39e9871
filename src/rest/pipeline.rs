//! Pipeline jobs.
//!
//! A pipeline run is started by posting a job to `api/v2/pipelines`. The
//! server answers with the new run's identifier under
//! `{"pipelines": {"0": ["<seq>"]}}`; the run itself is then read back as a
//! [`Pipeline`] and can be polled with
//! [`ResourceClient::reload`](crate::rest::ResourceClient::reload).
//!
//! # Example
//!
//! ```rust,ignore
//! use sapim::rest::{PipelineRunJob, PipelineStage};
//!
//! let job = PipelineRunJob::new(PipelineStage::Classify, calendar_seq, period_seq);
//! let mut run = client.run_pipeline(&job).await?;
//! while !run.is_done() {
//!     tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//!     run = client.reload(&run).await?;
//! }
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::clients::{HttpError, HttpMethod, HttpRequest};
use crate::rest::client::ResourceClient;
use crate::rest::codec::{self, FieldIssue, Problem, ValidationError};
use crate::rest::errors::{collect_strings, ResourceError};
use crate::rest::resource::Resource;
use crate::rest::resources::Pipeline;
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

/// Code the controller reports when a cancelled job was already stopping.
pub const CANCEL_PIPELINE_CODE: &str = "TCMP_60255";

const COMMAND_FIELD: &str = "command";

/// A job the pipeline endpoint can run.
pub trait PipelineJob: Serialize + Send + Sync {
    /// Value of the `command` member sent with the job.
    const COMMAND: &'static str;

    /// Schema the job payload is validated against.
    const SCHEMA: &'static Schema;

    /// Checks constraints that span several fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the offending fields.
    fn check(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Which positions a pipeline run covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Every position.
    #[default]
    Full,
    /// Only positions with changed data.
    Incremental,
    /// Only the listed positions or position groups.
    Positions,
}

/// Calculation stages a [`PipelineRunJob`] can run.
///
/// Each stage maps to the stage type identifier the product ships with.
/// Tenants with custom stage types pass the raw identifier to
/// [`PipelineRunJob::new`] instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Classify,
    Allocate,
    Reward,
    Pay,
    Summarize,
    Compensate,
    CompensateAndPay,
    ResetFromClassify,
    ResetFromAllocate,
    ResetFromReward,
    ResetFromPay,
    Post,
    Finalize,
    UndoPost,
    UndoFinalize,
    CleanupDeferredResults,
    UpdateAnalytics,
    ReportsGeneration,
}

impl PipelineStage {
    /// Every stage, in calculation order.
    pub const ALL: [Self; 18] = [
        Self::ResetFromClassify,
        Self::Classify,
        Self::ResetFromAllocate,
        Self::Allocate,
        Self::ResetFromReward,
        Self::Reward,
        Self::ResetFromPay,
        Self::Pay,
        Self::Summarize,
        Self::Compensate,
        Self::CompensateAndPay,
        Self::Post,
        Self::UndoPost,
        Self::Finalize,
        Self::UndoFinalize,
        Self::CleanupDeferredResults,
        Self::UpdateAnalytics,
        Self::ReportsGeneration,
    ];

    /// The stage type identifier sent as `stageTypeSeq`.
    #[must_use]
    pub const fn seq(self) -> &'static str {
        match self {
            Self::ResetFromClassify => "21673573206720514",
            Self::Classify => "21673573206720515",
            Self::Allocate => "21673573206720516",
            Self::ResetFromAllocate => "21673573206720517",
            Self::Reward => "21673573206720518",
            Self::Pay => "21673573206720519",
            Self::ResetFromReward => "21673573206720520",
            Self::ResetFromPay => "21673573206720521",
            Self::Compensate => "21673573206720530",
            Self::Summarize => "21673573206720531",
            Self::CompensateAndPay => "21673573206720532",
            Self::Finalize => "21673573206720550",
            Self::UndoFinalize => "21673573206720571",
            Self::Post => "21673573206720573",
            Self::UndoPost => "21673573206720574",
            Self::CleanupDeferredResults => "21673573206720602",
            Self::UpdateAnalytics => "21673573206720701",
            Self::ReportsGeneration => "21673573206720704",
        }
    }
}

impl From<PipelineStage> for String {
    fn from(stage: PipelineStage) -> Self {
        stage.seq().to_string()
    }
}

const PIPELINE_RUN_SCHEMA: Schema = Schema {
    name: "PipelineRun",
    endpoint: "api/v2/pipelines",
    seq_field: None,
    id_field: None,
    fields: &[
        FieldSpec::required("stageTypeSeq", FieldKind::Text),
        FieldSpec::required("calendarSeq", FieldKind::Text),
        FieldSpec::required("periodSeq", FieldKind::Text),
        FieldSpec::required("runMode", FieldKind::Text),
        FieldSpec::optional("processingUnitSeq", FieldKind::Text),
        FieldSpec::optional("positionGroups", FieldKind::List(&FieldKind::Text)),
        FieldSpec::optional("positionSeqs", FieldKind::List(&FieldKind::Text)),
    ],
    expand: &[],
};

/// Runs a calculation stage (classify, allocate, reward, ...) for a period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunJob {
    /// The stage to run.
    pub stage_type_seq: String,
    pub calendar_seq: String,
    pub period_seq: String,
    pub run_mode: RunMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_unit_seq: Option<String>,
    /// Position groups to run, with [`RunMode::Positions`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_groups: Option<Vec<String>>,
    /// Positions to run, with [`RunMode::Positions`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_seqs: Option<Vec<String>>,
}

impl PipelineRunJob {
    /// A full run of `stage_type_seq` for one period.
    ///
    /// `stage_type_seq` is either a [`PipelineStage`] or a raw identifier.
    #[must_use]
    pub fn new(
        stage_type_seq: impl Into<String>,
        calendar_seq: impl Into<String>,
        period_seq: impl Into<String>,
    ) -> Self {
        Self {
            stage_type_seq: stage_type_seq.into(),
            calendar_seq: calendar_seq.into(),
            period_seq: period_seq.into(),
            run_mode: RunMode::Full,
            processing_unit_seq: None,
            position_groups: None,
            position_seqs: None,
        }
    }

    /// Restricts the run to the given positions.
    #[must_use]
    pub fn for_positions(mut self, position_seqs: Vec<String>) -> Self {
        self.run_mode = RunMode::Positions;
        self.position_groups = None;
        self.position_seqs = Some(position_seqs);
        self
    }

    /// Restricts the run to the given position groups.
    #[must_use]
    pub fn for_position_groups(mut self, groups: Vec<String>) -> Self {
        self.run_mode = RunMode::Positions;
        self.position_seqs = None;
        self.position_groups = Some(groups);
        self
    }
}

impl PipelineJob for PipelineRunJob {
    const COMMAND: &'static str = "PipelineRun";
    const SCHEMA: &'static Schema = &PIPELINE_RUN_SCHEMA;

    fn check(&self) -> Result<(), ValidationError> {
        let invalid = |field: &str, reason: &str| FieldIssue {
            field: field.to_string(),
            problem: Problem::Invalid {
                reason: reason.to_string(),
            },
        };

        let issues = match (self.run_mode, &self.position_groups, &self.position_seqs) {
            (RunMode::Positions, None, None) => vec![
                invalid("positionGroups", "one of positionGroups or positionSeqs is required"),
                invalid("positionSeqs", "one of positionGroups or positionSeqs is required"),
            ],
            (RunMode::Positions, Some(_), Some(_)) => vec![
                invalid("positionGroups", "cannot be combined with positionSeqs"),
                invalid("positionSeqs", "cannot be combined with positionGroups"),
            ],
            (RunMode::Positions, _, _) => Vec::new(),
            (_, groups, seqs) => {
                let mut issues = Vec::new();
                if groups.is_some() {
                    issues.push(invalid("positionGroups", "only allowed with run mode positions"));
                }
                if seqs.is_some() {
                    issues.push(invalid("positionSeqs", "only allowed with run mode positions"));
                }
                issues
            }
        };

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                schema: PIPELINE_RUN_SCHEMA.name,
                record: None,
                issues,
            })
        }
    }
}

const XML_IMPORT_SCHEMA: Schema = Schema {
    name: "XMLImport",
    endpoint: "api/v2/pipelines",
    seq_field: None,
    id_field: None,
    fields: &[
        FieldSpec::required("xmlFileName", FieldKind::Text),
        FieldSpec::required("xmlFileContent", FieldKind::Text),
        FieldSpec::required("updateExistingObjects", FieldKind::Boolean),
    ],
    expand: &[],
};

/// Imports plan data from an XML document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlImportJob {
    pub xml_file_name: String,
    pub xml_file_content: String,
    /// Overwrite objects that already exist.
    pub update_existing_objects: bool,
}

impl XmlImportJob {
    /// An import of `content`, reported under `file_name`.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            xml_file_name: file_name.into(),
            xml_file_content: content.into(),
            update_existing_objects: true,
        }
    }
}

impl PipelineJob for XmlImportJob {
    const COMMAND: &'static str = "XMLImport";
    const SCHEMA: &'static Schema = &XML_IMPORT_SCHEMA;
}

/// Stages of the data import pipeline, run by an [`ImportJob`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportStage {
    Validate,
    Transfer,
    ValidateAndTransfer,
    ValidateAndTransferIfAllValid,
    TransferIfAllValid,
    ResetFromValidate,
    Purge,
}

impl ImportStage {
    /// The stage type identifier sent as `stageTypeSeq`.
    #[must_use]
    pub const fn seq(self) -> &'static str {
        match self {
            Self::Validate => "21673573206720698",
            Self::Transfer => "21673573206720699",
            Self::ValidateAndTransfer => "21673573206720700",
            Self::ValidateAndTransferIfAllValid => "21673573206720702",
            Self::TransferIfAllValid => "21673573206720703",
            Self::ResetFromValidate => "21673573206720718",
            Self::Purge => "21673573206720721",
        }
    }

    /// Whether the stage works on one batch of staged data.
    const fn needs_batch(self) -> bool {
        !matches!(self, Self::ResetFromValidate)
    }

    /// Whether the stage runs against a calendar.
    const fn needs_calendar(self) -> bool {
        !matches!(self, Self::Purge)
    }
}

impl Serialize for ImportStage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.seq())
    }
}

/// Group of staging tables an import reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum StageTable {
    TransactionalData,
    OrganizationData,
    ClassificationData,
    PlanRelatedData,
}

/// Which staged records an import picks up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportRunMode {
    /// Every record of the batch.
    #[default]
    All,
    /// Only records not imported before. Transactional data only.
    New,
}

const IMPORT_SCHEMA: Schema = Schema {
    name: "Import",
    endpoint: "api/v2/pipelines",
    seq_field: None,
    id_field: None,
    fields: &[
        FieldSpec::required("stageTypeSeq", FieldKind::Text),
        FieldSpec::optional("calendarSeq", FieldKind::Text),
        FieldSpec::optional("periodSeq", FieldKind::Text),
        FieldSpec::optional("batchName", FieldKind::Text),
        FieldSpec::optional("module", FieldKind::Text),
        FieldSpec::optional("runMode", FieldKind::Text),
    ],
    expand: &[],
};

/// Moves a batch of staged data into the calculation tables, or cleans it up.
///
/// Build one with the constructor named after its stage.
///
/// ```rust
/// use sapim::rest::{ImportJob, ImportRunMode, StageTable};
///
/// let job = ImportJob::validate_and_transfer("2251799813685250", "orders.txt", StageTable::TransactionalData)
///     .run_mode(ImportRunMode::New);
/// assert_eq!(job.batch_name.as_deref(), Some("orders.txt"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportJob {
    #[serde(rename = "stageTypeSeq")]
    pub stage: ImportStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_seq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_seq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<StageTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_mode: Option<ImportRunMode>,
}

impl ImportJob {
    fn batch(
        stage: ImportStage,
        calendar_seq: impl Into<String>,
        batch_name: impl Into<String>,
        module: StageTable,
    ) -> Self {
        Self {
            stage,
            calendar_seq: Some(calendar_seq.into()),
            period_seq: None,
            batch_name: Some(batch_name.into()),
            module: Some(module),
            run_mode: Some(ImportRunMode::All),
        }
    }

    /// Validates a batch without transferring it.
    #[must_use]
    pub fn validate(
        calendar_seq: impl Into<String>,
        batch_name: impl Into<String>,
        module: StageTable,
    ) -> Self {
        Self::batch(ImportStage::Validate, calendar_seq, batch_name, module)
    }

    /// Transfers an already validated batch.
    #[must_use]
    pub fn transfer(
        calendar_seq: impl Into<String>,
        batch_name: impl Into<String>,
        module: StageTable,
    ) -> Self {
        Self::batch(ImportStage::Transfer, calendar_seq, batch_name, module)
    }

    /// Validates a batch and transfers its valid records.
    #[must_use]
    pub fn validate_and_transfer(
        calendar_seq: impl Into<String>,
        batch_name: impl Into<String>,
        module: StageTable,
    ) -> Self {
        Self::batch(ImportStage::ValidateAndTransfer, calendar_seq, batch_name, module)
    }

    /// Validates a batch and transfers it only if every record is valid.
    #[must_use]
    pub fn validate_and_transfer_if_all_valid(
        calendar_seq: impl Into<String>,
        batch_name: impl Into<String>,
        module: StageTable,
    ) -> Self {
        Self::batch(
            ImportStage::ValidateAndTransferIfAllValid,
            calendar_seq,
            batch_name,
            module,
        )
    }

    /// Transfers a validated batch only if every record is valid.
    #[must_use]
    pub fn transfer_if_all_valid(
        calendar_seq: impl Into<String>,
        batch_name: impl Into<String>,
        module: StageTable,
    ) -> Self {
        Self::batch(ImportStage::TransferIfAllValid, calendar_seq, batch_name, module)
    }

    /// Removes a batch from the staging tables.
    #[must_use]
    pub fn purge(batch_name: impl Into<String>, module: StageTable) -> Self {
        Self {
            stage: ImportStage::Purge,
            calendar_seq: None,
            period_seq: None,
            batch_name: Some(batch_name.into()),
            module: Some(module),
            run_mode: None,
        }
    }

    /// Undoes validation for a period, optionally for one batch only.
    #[must_use]
    pub fn reset_from_validate(
        calendar_seq: impl Into<String>,
        period_seq: impl Into<String>,
        batch_name: Option<String>,
    ) -> Self {
        Self {
            stage: ImportStage::ResetFromValidate,
            calendar_seq: Some(calendar_seq.into()),
            period_seq: Some(period_seq.into()),
            batch_name,
            module: None,
            run_mode: None,
        }
    }

    /// Sets which staged records are picked up.
    #[must_use]
    pub fn run_mode(mut self, run_mode: ImportRunMode) -> Self {
        self.run_mode = Some(run_mode);
        self
    }
}

impl PipelineJob for ImportJob {
    const COMMAND: &'static str = "Import";
    const SCHEMA: &'static Schema = &IMPORT_SCHEMA;

    fn check(&self) -> Result<(), ValidationError> {
        let issue = |field: &str, problem: Problem| FieldIssue {
            field: field.to_string(),
            problem,
        };
        let mut issues = Vec::new();

        if self.stage.needs_calendar() && self.calendar_seq.is_none() {
            issues.push(issue("calendarSeq", Problem::Missing));
        }
        if self.stage == ImportStage::ResetFromValidate {
            if self.period_seq.is_none() {
                issues.push(issue("periodSeq", Problem::Missing));
            }
        } else if self.period_seq.is_some() {
            issues.push(issue(
                "periodSeq",
                Problem::Invalid {
                    reason: "only allowed with ResetFromValidate".to_string(),
                },
            ));
        }
        if self.stage.needs_batch() {
            if self.batch_name.is_none() {
                issues.push(issue("batchName", Problem::Missing));
            }
            if self.module.is_none() {
                issues.push(issue("module", Problem::Missing));
            }
        }
        if self.run_mode == Some(ImportRunMode::New)
            && self.module != Some(StageTable::TransactionalData)
        {
            issues.push(issue(
                "runMode",
                Problem::Invalid {
                    reason: "new is only allowed for TransactionalData".to_string(),
                },
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                schema: IMPORT_SCHEMA.name,
                record: None,
                issues,
            })
        }
    }
}

/// Builds the payload of a job, `command` included.
fn job_payload<J: PipelineJob>(job: &J) -> Result<Value, ValidationError> {
    job.check()?;
    let mut payload = codec::encode_with(job, J::SCHEMA)?;
    if let Value::Object(map) = &mut payload {
        map.insert(COMMAND_FIELD.to_string(), Value::String(J::COMMAND.to_string()));
    }
    Ok(payload)
}

/// Reads the run identifier from `{"pipelines": {"0": ["<seq>"]}}`.
fn submitted_seq(body: &Value, key: &str) -> Option<String> {
    match body.get(key)?.get("0")? {
        Value::Array(seqs) => seqs.first().and_then(Value::as_str).map(ToString::to_string),
        Value::String(seq) => Some(seq.clone()),
        _ => None,
    }
}

/// Reads the submission error from `{"pipelines": {"0": "<message>"}}`.
fn submit_error(body: &Value, key: &str) -> Option<String> {
    body.get(key)?.get("0")?.as_str().map(ToString::to_string)
}

impl ResourceClient {
    /// Submits a pipeline job and returns the created run.
    ///
    /// The submission is not retried after a server error or a dropped
    /// connection, since the job may already be running. On
    /// [`HttpError::Transient`] look for the run with
    /// [`ResourceClient::list`] before submitting again.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] before sending anything if the
    /// job is invalid, [`ResourceError::UnexpectedPayload`] if the server
    /// refuses the job or answers in an unknown shape, and any error of
    /// [`ResourceClient::get`] while reading the run back.
    pub async fn run_pipeline<J: PipelineJob>(&self, job: &J) -> Result<Pipeline, ResourceError> {
        let schema = Pipeline::SCHEMA;
        let key = schema.records_key();
        let payload = job_payload(job)?;
        let request = HttpRequest::builder(HttpMethod::Post, schema.endpoint)
            .body(Value::Array(vec![payload]))
            .build()
            .map_err(HttpError::from)?;

        let body = match self.executor().execute(&request).await {
            Ok(response) => response.body,
            Err(error) => {
                return Err(match error.body().and_then(|body| submit_error(body, key)) {
                    Some(message) => ResourceError::UnexpectedPayload {
                        resource: schema.name,
                        message,
                    },
                    None => ResourceError::Http(error),
                });
            }
        };

        let seq = submitted_seq(&body, key).ok_or_else(|| ResourceError::UnexpectedPayload {
            resource: schema.name,
            message: format!("no run identifier in {body}"),
        })?;
        tracing::info!(command = J::COMMAND, seq = %seq, "Submitted pipeline job");
        self.get::<Pipeline>(&seq).await
    }

    /// Cancels a pipeline run.
    ///
    /// A run whose controller reports it is already stopping counts as
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the run does not exist, or
    /// [`ResourceError::UnexpectedPayload`] if the server refuses.
    pub async fn cancel_pipeline(&self, pipeline: &Pipeline) -> Result<(), ResourceError> {
        let schema = Pipeline::SCHEMA;
        let seq = pipeline.pipeline_run_seq.as_str();
        let request = HttpRequest::builder(HttpMethod::Delete, schema.record_path(seq))
            .build()
            .map_err(HttpError::from)?;

        match self.executor().execute(&request).await {
            Ok(response) => {
                let mentioned = response.body.get(seq).is_some()
                    || response
                        .body
                        .get(schema.records_key())
                        .and_then(|records| records.get(seq))
                        .is_some();
                if !mentioned {
                    return Err(ResourceError::UnexpectedPayload {
                        resource: schema.name,
                        message: format!("cancel response does not mention {seq}"),
                    });
                }
            }
            Err(error) => {
                let stopping = error.body().is_some_and(|body| {
                    collect_strings(body)
                        .iter()
                        .any(|message| message.contains(CANCEL_PIPELINE_CODE))
                });
                if !stopping {
                    return Err(ResourceError::from_record_failure(schema.name, seq, error));
                }
                tracing::debug!(seq, "Pipeline was already stopping");
            }
        }
        tracing::info!(seq, "Cancelled pipeline run");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_job_payload_carries_command() {
        let job = PipelineRunJob::new("21673573206720515", "2251799813685250", "2533274790395933");
        let payload = job_payload(&job).unwrap();
        assert_eq!(
            payload,
            json!({
                "stageTypeSeq": "21673573206720515",
                "calendarSeq": "2251799813685250",
                "periodSeq": "2533274790395933",
                "runMode": "full",
                "command": "PipelineRun"
            })
        );
    }

    #[test]
    fn test_positions_mode_requires_a_selection() {
        let mut job = PipelineRunJob::new("s", "c", "p");
        job.run_mode = RunMode::Positions;
        let error = job_payload(&job).unwrap_err();
        assert!(error.mentions("positionGroups"));
        assert!(error.mentions("positionSeqs"));

        let job = PipelineRunJob::new("s", "c", "p").for_positions(vec!["1".to_string()]);
        assert!(job_payload(&job).is_ok());
    }

    #[test]
    fn test_full_mode_rejects_position_selection() {
        let mut job = PipelineRunJob::new("s", "c", "p");
        job.position_groups = Some(vec!["g".to_string()]);
        let error = job_payload(&job).unwrap_err();
        assert_eq!(error.fields(), vec!["positionGroups"]);
    }

    #[test]
    fn test_blank_stage_type_is_rejected() {
        let error = job_payload(&PipelineRunJob::new("", "c", "p")).unwrap_err();
        assert!(error.mentions("stageTypeSeq"));
    }

    #[test]
    fn test_xml_import_payload() {
        let payload = job_payload(&XmlImportJob::new("plan.xml", "<plan/>")).unwrap();
        assert_eq!(payload["command"], "XMLImport");
        assert_eq!(payload["updateExistingObjects"], true);
    }

    #[test]
    fn test_named_stage_sets_stage_type() {
        let job = PipelineRunJob::new(PipelineStage::Classify, "c", "p");
        assert_eq!(job.stage_type_seq, "21673573206720515");

        let payload = job_payload(&PipelineRunJob::new(PipelineStage::UndoPost, "c", "p")).unwrap();
        assert_eq!(payload["stageTypeSeq"], PipelineStage::UndoPost.seq());
        assert_eq!(payload["command"], "PipelineRun");
    }

    #[test]
    fn test_stage_type_identifiers_are_distinct() {
        let mut seqs: Vec<&str> = PipelineStage::ALL.iter().map(|s| s.seq()).collect();
        seqs.sort_unstable();
        seqs.dedup();
        assert_eq!(seqs.len(), PipelineStage::ALL.len());
    }

    #[test]
    fn test_batch_import_payloads() {
        let cases = [
            (ImportJob::validate("c", "b.txt", StageTable::TransactionalData), ImportStage::Validate),
            (ImportJob::transfer("c", "b.txt", StageTable::TransactionalData), ImportStage::Transfer),
            (
                ImportJob::validate_and_transfer("c", "b.txt", StageTable::TransactionalData),
                ImportStage::ValidateAndTransfer,
            ),
            (
                ImportJob::validate_and_transfer_if_all_valid("c", "b.txt", StageTable::TransactionalData),
                ImportStage::ValidateAndTransferIfAllValid,
            ),
            (
                ImportJob::transfer_if_all_valid("c", "b.txt", StageTable::TransactionalData),
                ImportStage::TransferIfAllValid,
            ),
        ];
        for (job, stage) in cases {
            let payload = job_payload(&job).unwrap();
            assert_eq!(
                payload,
                json!({
                    "stageTypeSeq": stage.seq(),
                    "calendarSeq": "c",
                    "batchName": "b.txt",
                    "module": "TransactionalData",
                    "runMode": "all",
                    "command": "Import"
                }),
                "{stage:?}"
            );
        }
    }

    #[test]
    fn test_purge_payload() {
        let payload = job_payload(&ImportJob::purge("b.txt", StageTable::OrganizationData)).unwrap();
        assert_eq!(
            payload,
            json!({
                "stageTypeSeq": ImportStage::Purge.seq(),
                "batchName": "b.txt",
                "module": "OrganizationData",
                "command": "Import"
            })
        );
    }

    #[test]
    fn test_reset_from_validate_payload() {
        let job = ImportJob::reset_from_validate("c", "p", Some("b.txt".to_string()));
        let payload = job_payload(&job).unwrap();
        assert_eq!(
            payload,
            json!({
                "stageTypeSeq": ImportStage::ResetFromValidate.seq(),
                "calendarSeq": "c",
                "periodSeq": "p",
                "batchName": "b.txt",
                "command": "Import"
            })
        );

        let payload = job_payload(&ImportJob::reset_from_validate("c", "p", None)).unwrap();
        assert!(payload.get("batchName").is_none());
    }

    #[test]
    fn test_new_run_mode_only_for_transactional_data() {
        let job = ImportJob::validate("c", "b.txt", StageTable::TransactionalData)
            .run_mode(ImportRunMode::New);
        assert_eq!(job_payload(&job).unwrap()["runMode"], "new");

        for module in [
            StageTable::OrganizationData,
            StageTable::ClassificationData,
            StageTable::PlanRelatedData,
        ] {
            let job = ImportJob::validate("c", "b.txt", module).run_mode(ImportRunMode::New);
            let error = job_payload(&job).unwrap_err();
            assert_eq!(error.fields(), vec!["runMode"], "{module:?}");

            let job = ImportJob::validate("c", "b.txt", module).run_mode(ImportRunMode::All);
            assert!(job_payload(&job).is_ok());
        }
    }

    #[test]
    fn test_import_requires_batch_and_module() {
        let mut job = ImportJob::transfer("c", "b.txt", StageTable::TransactionalData);
        job.batch_name = None;
        job.module = None;
        job.calendar_seq = None;
        let error = job_payload(&job).unwrap_err();
        assert!(error.mentions("batchName"));
        assert!(error.mentions("module"));
        assert!(error.mentions("calendarSeq"));
    }

    #[test]
    fn test_submitted_seq_shapes() {
        assert_eq!(
            submitted_seq(&json!({"pipelines": {"0": ["123"]}}), "pipelines"),
            Some("123".to_string())
        );
        assert_eq!(submitted_seq(&json!({"pipelines": {}}), "pipelines"), None);
        assert_eq!(
            submit_error(&json!({"pipelines": {"0": "TCMP_1: bad period"}}), "pipelines"),
            Some("TCMP_1: bad period".to_string())
        );
    }
}
