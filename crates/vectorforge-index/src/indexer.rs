//! Batches records, submits bulk-index requests via the scheduler, and
//! triages per-item errors.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use vectorforge_progress::ProgressReporter;
use vectorforge_scheduler::{ProcessorConfig, RetryStrategy};

use crate::error::{BulkBatchError, IndexError};
use crate::search_client::SearchClusterClient;

/// Records are submitted together in batches of this size.
pub const BATCH_SIZE: usize = 50;
/// Worker concurrency for the bulk-indexing scheduler run.
pub const NUM_WORKERS: usize = 10;

/// A contiguous slice of the overall input, carrying enough context to
/// derive deterministic document ids for its rows.
#[derive(Debug, Clone)]
pub struct BulkBatchItem {
    pub rows: Vec<Map<String, Value>>,
    pub batch_num: usize,
    pub start_idx: usize,
}

/// A record is droppable from its document body if its value is null or a
/// NaN-valued scalar. Lists/tuples are retained even if empty; they are not
/// subject to the NaN test, which is ill-defined on sequences.
fn is_valid_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Number(n) => n.as_f64().map(|f| !f.is_nan()).unwrap_or(true),
        Value::Array(_) => true,
        _ => true,
    }
}

fn filter_nan_values(row: &Map<String, Value>) -> Map<String, Value> {
    row.iter()
        .filter(|(_, v)| is_valid_value(v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn build_bulk_body(batch: &BulkBatchItem, index: &str) -> String {
    let mut body = String::new();
    for (offset, row) in batch.rows.iter().enumerate() {
        let id = batch.start_idx + offset;
        let action = serde_json::json!({ "create": { "_index": index, "_id": id.to_string() } });
        body.push_str(&action.to_string());
        body.push('\n');
        let filtered = filter_nan_values(row);
        body.push_str(&Value::Object(filtered).to_string());
        body.push('\n');
    }
    body
}

/// Parses a `/_bulk` response, treating `version_conflict_engine_exception`
/// as ignorable (logged, counted as success) and accumulating any other
/// per-item error kind. Returns an error iff any non-ignorable error was
/// accumulated.
fn parse_bulk_errors(response: &Value) -> Result<(), BulkBatchError> {
    let Some(true) = response.get("errors").and_then(Value::as_bool) else {
        return Ok(());
    };
    let Some(items) = response.get("items").and_then(Value::as_array) else {
        return Ok(());
    };

    let mut accumulated: HashMap<String, usize> = HashMap::new();
    for item in items {
        let Some(action_result) = item.values().next() else {
            continue;
        };
        let Some(error) = action_result.get("error") else {
            continue;
        };
        let error_type = error
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_string();

        if error_type == "version_conflict_engine_exception" {
            #[cfg(feature = "tracing")]
            tracing::info!("ignoring version conflict (duplicate create)");
            continue;
        }

        *accumulated.entry(error_type).or_insert(0) += 1;
    }

    if accumulated.is_empty() {
        Ok(())
    } else {
        Err(BulkBatchError(accumulated))
    }
}

/// Batches `records`, optionally truncating `index` first, and submits each
/// batch to the scheduler as a `create`-verb bulk request with deterministic
/// `_id`s equal to the record's position in the overall input.
pub async fn ingest(
    client: Arc<SearchClusterClient>,
    index: String,
    records: Vec<Map<String, Value>>,
    max_attempts: usize,
    delete_existing: bool,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<(), IndexError> {
    if delete_existing {
        client.truncate(&index).await?;
    }

    let batches: Vec<BulkBatchItem> = records
        .chunks(BATCH_SIZE)
        .enumerate()
        .map(|(i, rows)| BulkBatchItem {
            rows: rows.to_vec(),
            batch_num: i + 1,
            start_idx: i * BATCH_SIZE,
        })
        .collect();

    let client_for_op = Arc::clone(&client);
    let index_for_op = index.clone();
    let op = move |batch: BulkBatchItem| {
        let client = Arc::clone(&client_for_op);
        let index = index_for_op.clone();
        async move {
            let body = build_bulk_body(&batch, &index);
            let response = client.bulk_index(body).await?;
            parse_bulk_errors(&response).map_err(IndexError::from)
        }
    };

    let progress_reporter = Arc::clone(&reporter);
    let config: ProcessorConfig<IndexError> = ProcessorConfig::builder()
        .max_attempts(max_attempts)
        .num_workers(NUM_WORKERS)
        .handle_throttling(true)
        .retry_strategy(RetryStrategy::Jittered)
        .name("bulk-indexer")
        .on_progress(move |delta| progress_reporter.progress(delta))
        .build();

    reporter.start_progress(batches.len() as u64);
    let result = vectorforge_scheduler::process(batches, op, config).await;
    reporter.stop_progress();

    if result.total_failed > 0 {
        for item in result.results {
            if let Err(e) = item {
                return Err(e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn filters_null_and_nan_but_keeps_empty_lists() {
        let r = row(&[
            ("name", json!("alice")),
            ("age", Value::Null),
            ("score", json!(f64::NAN)),
            ("tags", json!([])),
        ]);
        let filtered = filter_nan_values(&r);
        assert!(filtered.contains_key("name"));
        assert!(filtered.contains_key("tags"));
        assert!(!filtered.contains_key("age"));
        assert!(!filtered.contains_key("score"));
    }

    #[test]
    fn bulk_body_uses_create_verb_and_deterministic_id() {
        let batch = BulkBatchItem {
            rows: vec![row(&[("name", json!("a"))]), row(&[("name", json!("b"))])],
            batch_num: 1,
            start_idx: 10,
        };
        let body = build_bulk_body(&batch, "my-index");
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        let first_action: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first_action["create"]["_id"], "10");
        assert_eq!(first_action["create"]["_index"], "my-index");
        let second_action: Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(second_action["create"]["_id"], "11");
    }

    #[test]
    fn version_conflict_is_ignorable() {
        let response = json!({
            "errors": true,
            "items": [
                { "create": { "status": 409, "error": { "type": "version_conflict_engine_exception" } } }
            ]
        });
        assert!(parse_bulk_errors(&response).is_ok());
    }

    #[test]
    fn other_errors_fail_the_batch() {
        let response = json!({
            "errors": true,
            "items": [
                { "create": { "status": 400, "error": { "type": "mapper_parsing_exception" } } }
            ]
        });
        let err = parse_bulk_errors(&response).unwrap_err();
        assert_eq!(err.0.get("mapper_parsing_exception"), Some(&1));
    }

    #[test]
    fn no_errors_flag_means_success() {
        let response = json!({ "errors": false, "items": [] });
        assert!(parse_bulk_errors(&response).is_ok());
    }
}
