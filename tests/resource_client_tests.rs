//! Integration tests for typed resource operations.

mod common;

use chrono::NaiveDate;
use common::{client_for, participant, participants};
use futures::TryStreamExt;
use sapim::rest::resources::{Participant, Pipeline, Position, SalesTransaction};
use sapim::rest::{BulkOperation, Filter, ImportJob, ListQuery, PipelineRunJob, StageTable};
use sapim::{Resource, ResourceError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_participant(id: &str) -> Participant {
    Participant::new(id, date(2024, 1, 1), date(2200, 1, 1))
}

#[tokio::test]
async fn test_list_streams_every_page_in_order() {
    let server = MockServer::start().await;
    let client = client_for(&server, 50).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/participants"))
        .and(query_param("skip", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "participants": participants(100..120)
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/participants"))
        .and(query_param("skip", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "participants": participants(50..100),
            "next": "/v2/participants?skip=100&top=50"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/participants"))
        .and(query_param("top", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "participants": participants(0..50),
            "next": "/v2/participants?skip=50&top=50"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let all: Vec<Participant> = client.list_all(&ListQuery::new()).await.unwrap();
    assert_eq!(all.len(), 120);
    let ids: Vec<String> = all.iter().map(|p| p.payee_id.clone()).collect();
    let expected: Vec<String> = (0..120).map(|i| format!("P-{i}")).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_list_sends_filter_and_stops_early_when_dropped() {
    let server = MockServer::start().await;
    let client = client_for(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/participants"))
        .and(query_param("$filter", "lastName eq 'Smith'"))
        .and(query_param("top", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "participants": participants(0..2),
            "next": "/v2/participants?skip=2&top=2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::new().filter(Filter::eq("lastName", "Smith"));
    let mut stream = Box::pin(client.list::<Participant>(&query));
    let first = stream.try_next().await.unwrap().unwrap();
    assert_eq!(first.payee_id, "P-0");
    // Only the first page was requested.
}

#[tokio::test]
async fn test_list_reports_the_record_that_fails_to_decode() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    let mut broken = participant(1);
    broken["effectiveStartDate"] = json!("not a date");
    Mock::given(method("GET"))
        .and(path("/api/v2/participants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "participants": [participant(0), broken]
        })))
        .mount(&server)
        .await;

    let error = client
        .list_all::<Participant>(&ListQuery::new())
        .await
        .unwrap_err();
    match error {
        ResourceError::Validation(e) => {
            assert!(e.mentions("effectiveStartDate"));
            let record = e.record.unwrap();
            assert_eq!(record.index, 1);
            assert_eq!(record.seq.as_deref(), Some("1"));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_decodes_record() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/participants(7)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(participant(7)))
        .expect(1)
        .mount(&server)
        .await;

    let found: Participant = client.get("7").await.unwrap();
    assert_eq!(found.seq(), Some("7"));
    assert_eq!(found.effective_start_date, date(2024, 1, 1));
}

#[tokio::test]
async fn test_get_missing_record_is_not_found() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/participants(404)"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let error = client.get::<Participant>("404").await.unwrap_err();
    assert!(matches!(error, ResourceError::NotFound { ref id, .. } if id == "404"));
}

#[tokio::test]
async fn test_get_names_missing_fields() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/participants(1)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payeeSeq": "1",
            "payeeId": "P-1",
            "effectiveEndDate": "2200-01-01"
        })))
        .mount(&server)
        .await;

    let error = client.get::<Participant>("1").await.unwrap_err();
    match error {
        ResourceError::Validation(e) => assert_eq!(e.fields(), vec!["effectiveStartDate"]),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_returns_server_record() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/participants"))
        .and(body_partial_json(json!([{"payeeId": "P-9"}])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "participants": [participant(9)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create(&new_participant("P-9")).await.unwrap();
    assert_eq!(created.payee_seq.as_deref(), Some("9"));
}

#[tokio::test]
async fn test_invalid_entity_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = sapim::ResourceClient::new(&common::config_for(&server, 3, 10)).unwrap();

    let error = client.create(&new_participant("  ")).await.unwrap_err();
    match error {
        ResourceError::Validation(e) => assert!(e.mentions("payeeId")),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_existing_record_is_already_exists() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/participants"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "participants": [{
                "payeeId": "P-1",
                "_ERROR_": "TCMP_35004:E: A participant with ID P-1 already exists"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let error = client.create(&new_participant("P-1")).await.unwrap_err();
    assert!(matches!(error, ResourceError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_update_not_modified_returns_entity() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/participants"))
        .and(body_partial_json(json!([{"payeeSeq": "5"}])))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;

    let mut entity = new_participant("P-5");
    entity.payee_seq = Some("5".to_string());
    let updated = client.update("5", &entity).await.unwrap();
    assert_eq!(updated, entity);
}

#[tokio::test]
async fn test_upsert_falls_back_to_update() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/participants"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "participants": [{"payeeId": "P-3", "_ERROR_": "TCMP_35004:E: already exists"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/participants"))
        .and(query_param("$filter", "payeeId eq 'P-3'"))
        .and(query_param("top", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "participants": [participant(3)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/participants"))
        .and(body_partial_json(json!([{"payeeSeq": "3", "payeeId": "P-3"}])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "participants": [participant(3)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let upserted = client.upsert(&new_participant("P-3")).await.unwrap();
    assert_eq!(upserted.payee_seq.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_read_first_without_match_is_not_found() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/participants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"participants": []})))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::new().filter(Filter::eq("payeeId", "nobody"));
    let error = client.read_first::<Participant>(&query).await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_second_delete_is_not_found() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/participants(11)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "participants": {"11": "Participant deleted"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/participants(11)"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "participants": {"11": "TCMP_09007:E: Participant 11 not found"}
        })))
        .mount(&server)
        .await;

    let deleted = client.delete::<Participant>("11").await.unwrap();
    assert_eq!(deleted.seq, "11");
    assert_eq!(deleted.message, "Participant deleted");

    let error = client.delete::<Participant>("11").await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_delete_refused_is_delete_failed() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/participants(12)"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "participants": {"12": "TCMP_50001:E: Participant is referenced by a position"}
        })))
        .mount(&server)
        .await;

    let error = client.delete::<Participant>("12").await.unwrap_err();
    assert!(matches!(error, ResourceError::DeleteFailed { ref id, .. } if id == "12"));
}

#[tokio::test]
async fn test_bulk_create_reports_per_record_outcomes() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/participants"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "participants": [
                participant(1),
                {"payeeId": "P-2", "_ERROR_": "TCMP_35004:E: already exists"},
                participant(3)
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let batch = vec![
        new_participant("P-1"),
        new_participant("P-2"),
        new_participant("P-3"),
    ];
    let results = client.bulk(&batch, BulkOperation::Create).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[2].is_ok());

    let failure = results[1].outcome.as_ref().unwrap_err();
    assert_eq!(failure.code.as_deref(), Some("TCMP_35004"));
    assert!(matches!(failure.error, ResourceError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_bulk_rejects_invalid_entity_with_its_position() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let batch = vec![new_participant("P-1"), new_participant("")];
    let error = client.bulk(&batch, BulkOperation::Create).await.unwrap_err();
    match error {
        ResourceError::Validation(e) => {
            assert!(e.mentions("payeeId"));
            assert_eq!(e.record.map(|r| r.index), Some(1));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_and_cancel_pipeline() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/pipelines"))
        .and(body_partial_json(json!([{"command": "PipelineRun", "runMode": "full"}])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "pipelines": {"0": ["555"]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pipelines(555)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pipelineRunSeq": "555",
            "command": "PipelineRun",
            "state": "Running",
            "dateSubmitted": "2024-02-01T10:00:00.000-08:00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/pipelines(555)"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "555": "TCMP_60255:E: An error occurred while attempting to delete a job."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job = PipelineRunJob::new("21673573206720515", "2251799813685250", "2533274790395933");
    let run: Pipeline = client.run_pipeline(&job).await.unwrap();
    assert_eq!(run.pipeline_run_seq, "555");
    assert!(!run.is_done());

    tokio_test::assert_ok!(client.cancel_pipeline(&run).await);
}

#[tokio::test]
async fn test_rejected_pipeline_job_reports_server_message() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/pipelines"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "pipelines": {"0": "TCMP_1:E: Period does not exist"}
        })))
        .mount(&server)
        .await;

    let job = PipelineRunJob::new("1", "2", "3");
    let error = client.run_pipeline(&job).await.unwrap_err();
    match error {
        ResourceError::UnexpectedPayload { message, .. } => {
            assert!(message.contains("Period does not exist"));
        }
        other => panic!("expected an unexpected payload error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_import_job_submits_batch() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/pipelines"))
        .and(body_partial_json(json!([{
            "command": "Import",
            "batchName": "orders.txt",
            "module": "TransactionalData",
            "runMode": "all"
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "pipelines": {"0": ["777"]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pipelines(777)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pipelineRunSeq": "777",
            "command": "Import",
            "state": "Scheduled",
            "batchName": "orders.txt",
            "dateSubmitted": "2024-02-01T10:00:00.000-08:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job = ImportJob::validate_and_transfer("2251799813685250", "orders.txt", StageTable::TransactionalData);
    let run = tokio_test::assert_ok!(client.run_pipeline(&job).await);
    assert_eq!(run.pipeline_run_seq, "777");
}

fn position(seq: usize) -> serde_json::Value {
    json!({
        "ruleElementOwnerSeq": seq.to_string(),
        "name": format!("POS-{seq}"),
        "payee": {"key": "4785074604081153", "displayName": "P-1"},
        "title": {"key": "6755399441055745", "displayName": "Sales Rep"},
        "effectiveStartDate": "2024-01-01T00:00:00.000-08:00",
        "effectiveEndDate": "2200-01-01T00:00:00.000-08:00"
    })
}

fn sales_transaction(seq: usize) -> serde_json::Value {
    json!({
        "salesTransactionSeq": seq.to_string(),
        "salesOrder": "14636698788954113",
        "lineNumber": {"value": seq, "unitType": {"name": "quantity"}},
        "subLineNumber": {"value": 1, "unitType": {"name": "quantity"}},
        "eventType": "16325548649218049",
        "compensationDate": "2024-02-15T00:00:00.000-08:00"
    })
}

#[tokio::test]
async fn test_list_expands_schema_references_by_default() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/positions"))
        .and(query_param("expand", "payee,manager,title,positionGroup"))
        .and(query_param("top", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "positions": [position(1), position(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let positions: Vec<Position> = client.list_all(&ListQuery::new()).await.unwrap();
    assert_eq!(positions.len(), 2);
    let payee = positions[0].payee.as_ref().unwrap();
    assert_eq!(payee.seq(), Some("4785074604081153"));
    assert_eq!(payee.display_name(), Some("P-1"));
}

#[tokio::test]
async fn test_list_keeps_caller_expand() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/positions"))
        .and(query_param("expand", "title"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "positions": [position(1)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let positions: Vec<Position> = client
        .list_all(&ListQuery::new().expand("title"))
        .await
        .unwrap();
    assert_eq!(positions.len(), 1);
}

#[tokio::test]
async fn test_get_expands_schema_references() {
    let server = MockServer::start().await;
    let client = client_for(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/positions(7)"))
        .and(query_param("expand", "payee,manager,title,positionGroup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(position(7)))
        .expect(1)
        .mount(&server)
        .await;

    let found = tokio_test::assert_ok!(client.get::<Position>("7").await);
    assert_eq!(found.name, "POS-7");
    assert_eq!(found.title.as_ref().and_then(|t| t.display_name()), Some("Sales Rep"));
}

#[tokio::test]
async fn test_sales_transactions_are_listed_one_per_page() {
    let server = MockServer::start().await;
    let client = client_for(&server, 50).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/salesTransactions"))
        .and(query_param("skip", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "salesTransactions": [sales_transaction(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/salesTransactions"))
        .and(query_param("top", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "salesTransactions": [sales_transaction(1)],
            "next": "/v2/salesTransactions?skip=1&top=1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transactions: Vec<SalesTransaction> =
        client.list_all(&ListQuery::new().page_size(25)).await.unwrap();
    let seqs: Vec<Option<String>> = transactions
        .iter()
        .map(|t| t.sales_transaction_seq.clone())
        .collect();
    assert_eq!(seqs, vec![Some("1".to_string()), Some("2".to_string())]);
}
