//! Typed resources of the Incentive Management v2 API.
//!
//! Each type implements [`Resource`](crate::rest::Resource) and can be used
//! with every [`ResourceClient`](crate::rest::ResourceClient) operation.
//!
//! # Available Resources
//!
//! | Type | Endpoint | Identifier |
//! |------|----------|------------|
//! | [`Participant`] | `api/v2/participants` | `payeeSeq` |
//! | [`Position`] | `api/v2/positions` | `ruleElementOwnerSeq` |
//! | [`Title`] | `api/v2/titles` | `ruleElementOwnerSeq` |
//! | [`BusinessUnit`] | `api/v2/businessUnits` | `businessUnitSeq` |
//! | [`EventType`] | `api/v2/eventTypes` | `dataTypeSeq` |
//! | [`CreditType`] | `api/v2/creditTypes` | `dataTypeSeq` |
//! | [`Reason`] | `api/v2/reasons` | `dataTypeSeq` |
//! | [`Period`] | `api/v2/periods` | `periodSeq` |
//! | [`SalesTransaction`] | `api/v2/salesTransactions` | `salesTransactionSeq` |
//! | [`Pipeline`] | `api/v2/pipelines` | `pipelineRunSeq` |
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use sapim::rest::resources::Participant;
//! # async fn run(client: &sapim::ResourceClient) -> Result<(), sapim::ResourceError> {
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2200, 1, 1).unwrap();
//!
//! let mut participant = Participant::new("P-1001", start, end);
//! participant.last_name = Some("Smith".to_string());
//! let created = client.create(&participant).await?;
//! println!("created {:?}", created.payee_seq);
//! # Ok(())
//! # }
//! ```

mod business_unit;
mod common;
mod data_types;
mod participant;
mod period;
mod pipeline;
mod position;
mod sales_transaction;
mod title;

pub use business_unit::BusinessUnit;
pub use common::{Amount, Reference, UnitType, AMOUNT_SCHEMA, UNIT_TYPE_SCHEMA};
pub use data_types::{CreditType, EventType, Reason};
pub use participant::Participant;
pub use period::Period;
pub use pipeline::Pipeline;
pub use position::Position;
pub use sales_transaction::SalesTransaction;
pub use title::Title;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::codec;
    use crate::rest::resource::Resource;
    use crate::rest::schema::Schema;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Every key a resource serializes must be declared in its schema.
    fn assert_keys_declared(value: &Value, schema: &Schema) {
        for key in value.as_object().unwrap().keys() {
            assert!(
                schema.field(key).is_some(),
                "{} serializes undeclared field {key}",
                schema.name
            );
        }
    }

    #[test]
    fn test_participant_fields_are_declared() {
        let mut participant = Participant::new("P-1", date(2024, 1, 1), date(2200, 1, 1));
        participant.payee_seq = Some("1".to_string());
        participant.prefix = Some("Dr".to_string());
        participant.first_name = Some("Ada".to_string());
        participant.middle_name = Some("B".to_string());
        participant.last_name = Some("Lovelace".to_string());
        participant.suffix = Some("Jr".to_string());
        participant.tax_id = Some("123".to_string());
        participant.user_id = Some("ada".to_string());
        participant.preferred_language = Some("en".to_string());
        participant.salary = Some(Amount::new(1.0, "USD"));
        participant.hire_date = Some(date(2020, 1, 1));
        participant.termination_date = Some(date(2030, 1, 1));
        participant.generic_attribute1 = Some("a".to_string());
        participant.generic_attribute2 = Some("b".to_string());
        participant.generic_number1 = Some(Amount::new(2.0, "quantity"));
        participant.generic_date1 = Some(date(2021, 1, 1));
        participant.generic_boolean1 = Some(true);
        assert_keys_declared(&serde_json::to_value(&participant).unwrap(), Participant::SCHEMA);
    }

    #[test]
    fn test_position_fields_are_declared() {
        let mut position = Position::new("Rep 1", date(2024, 1, 1), date(2200, 1, 1));
        position.rule_element_owner_seq = Some("9".to_string());
        position.description = Some("d".to_string());
        position.payee = Some(Reference::from("1"));
        position.manager = Some(Reference::from("2"));
        position.title = Some(Reference::from("3"));
        position.position_group = Some(Reference::from("4"));
        position.target_compensation = Some(Amount::new(1.0, "USD"));
        position.credit_start_date = Some(date(2024, 1, 1));
        position.credit_end_date = Some(date(2024, 2, 1));
        position.processing_start_date = Some(date(2024, 1, 1));
        position.processing_end_date = Some(date(2024, 2, 1));
        position.generic_attribute1 = Some("g".to_string());
        assert_keys_declared(&serde_json::to_value(&position).unwrap(), Position::SCHEMA);
    }

    #[test]
    fn test_sales_transaction_fields_are_declared() {
        let mut txn = SalesTransaction::new("SO-1", 1.0, 1.0, "SALE", date(2024, 3, 5));
        txn.sales_transaction_seq = Some("7".to_string());
        txn.value = Some(Amount::new(100.0, "USD"));
        txn.number_of_units = Some(Amount::new(2.0, "quantity"));
        txn.product_id = Some("SKU".to_string());
        txn.product_name = Some("Widget".to_string());
        txn.product_description = Some("A widget".to_string());
        txn.accounting_date = Some(date(2024, 3, 6));
        txn.is_runnable = Some(true);
        txn.reason = Some(Reference::from("R"));
        txn.business_units = Some(vec![Reference::from("BU")]);
        txn.generic_attribute1 = Some("g".to_string());
        assert_keys_declared(&serde_json::to_value(&txn).unwrap(), SalesTransaction::SCHEMA);
    }

    #[test]
    fn test_small_resources_fields_are_declared() {
        let mut title = Title::new("AE", date(2024, 1, 1), date(2200, 1, 1));
        title.description = Some("Account executive".to_string());
        assert_keys_declared(&serde_json::to_value(&title).unwrap(), Title::SCHEMA);

        let mut unit = BusinessUnit::new("EMEA");
        unit.description = Some("Europe".to_string());
        unit.processing_unit = Some(Reference::from("PU"));
        assert_keys_declared(&serde_json::to_value(&unit).unwrap(), BusinessUnit::SCHEMA);

        let period = Period::new("January 2024", date(2024, 1, 1), date(2024, 2, 1));
        assert_keys_declared(&serde_json::to_value(&period).unwrap(), Period::SCHEMA);
    }

    #[test]
    fn test_decode_participant_from_server_payload() {
        let raw = json!({
            "payeeSeq": "4785074604081153",
            "payeeId": "P-1001",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "salary": {"value": "85000", "unitType": {"name": "USD", "unitTypeSeq": "1970324836974598"}},
            "hireDate": "2019-04-01T00:00:00.000-07:00",
            "effectiveStartDate": "2024-01-01",
            "effectiveEndDate": "2200-01-01",
            "genericBoolean1": "true",
            "createDate": "2024-01-02T09:15:00.000-08:00",
            "businessUnits": null
        });

        let participant: Participant = codec::decode(&raw).unwrap();
        assert_eq!(participant.seq(), Some("4785074604081153"));
        assert_eq!(participant.salary.as_ref().map(|s| s.value), Some(85_000.0));
        assert_eq!(participant.hire_date, Some(date(2019, 4, 1)));
        assert_eq!(participant.generic_boolean1, Some(true));
        assert!(participant.create_date.is_some());
    }

    #[test]
    fn test_decode_position_with_expanded_references() {
        let raw = json!({
            "ruleElementOwnerSeq": "4785074604081160",
            "name": "Rep 1",
            "payee": {"key": "4785074604081153", "displayName": "P-1001"},
            "title": "4785074604081170",
            "effectiveStartDate": "2024-01-01",
            "effectiveEndDate": "2200-01-01"
        });

        let position: Position = codec::decode(&raw).unwrap();
        assert_eq!(position.payee.as_ref().and_then(Reference::seq), Some("4785074604081153"));
        assert_eq!(position.title.as_ref().and_then(Reference::seq), Some("4785074604081170"));
    }

    #[test]
    fn test_sales_transaction_requires_order_keys() {
        let raw = json!({
            "salesOrder": "SO-1",
            "eventType": "SALE",
            "compensationDate": "2024-03-05"
        });
        let error = codec::decode::<SalesTransaction>(&raw).unwrap_err();
        assert!(error.mentions("lineNumber"));
        assert!(error.mentions("subLineNumber"));
    }

    #[test]
    fn test_pipeline_state() {
        let raw = json!({
            "pipelineRunSeq": "12345",
            "command": "PipelineRun",
            "state": "Done",
            "status": "Successful",
            "numErrors": "0",
            "startTime": "2024-02-01T10:00:00.000-08:00",
            "stopTime": "2024-02-01T10:05:00.000-08:00"
        });
        let pipeline: Pipeline = codec::decode(&raw).unwrap();
        assert!(pipeline.is_done());
        assert!(pipeline.succeeded());

        let running: Pipeline =
            codec::decode(&json!({"pipelineRunSeq": "1", "state": "Running"})).unwrap();
        assert!(!running.is_done());
    }
}
