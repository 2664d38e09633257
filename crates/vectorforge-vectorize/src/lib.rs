//! Orchestrates column-level embedding generation for a tabular input via
//! the batch scheduler and the embedding client.

mod error;
mod table;

pub use error::VectorizeError;
pub use table::Table;

use std::sync::Arc;

use vectorforge_embedding::{EmbeddingClient, EmbeddingModelId, EmbeddingType, InputType};
use vectorforge_progress::ProgressReporter;
use vectorforge_scheduler::{ProcessorConfig, RetryStrategy};

/// Whether embeddings are generated per requested column, or once for the
/// concatenation of all requested columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PerColumn,
    Combined,
}

/// Options controlling one `vectorize_columns` run.
pub struct VectorizeOptions<'a> {
    pub columns: &'a [String],
    pub strategy: Strategy,
    pub model_id: EmbeddingModelId,
    pub embedding_column_suffix: String,
    pub embedding_type: EmbeddingType,
    pub max_attempts: usize,
    pub num_workers: usize,
    pub output_dimension: u32,
}

impl<'a> VectorizeOptions<'a> {
    pub fn new(columns: &'a [String], model_id: EmbeddingModelId) -> Self {
        Self {
            columns,
            strategy: Strategy::PerColumn,
            model_id,
            embedding_column_suffix: "_embedding".to_string(),
            embedding_type: EmbeddingType::Float,
            max_attempts: 10,
            num_workers: 100,
            output_dimension: 1024,
        }
    }
}

/// Vectorizes `columns` of `table` using `client`, writing embedding columns
/// back into the table. Surfaces the first per-row error encountered, if
/// any.
pub async fn vectorize_columns(
    client: Arc<EmbeddingClient>,
    mut table: Table,
    options: VectorizeOptions<'_>,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<Table, VectorizeError> {
    let missing: Vec<String> = options
        .columns
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(VectorizeError::MissingColumns {
            missing,
            available: table.columns.clone(),
        });
    }

    reporter.message(&format!(
        "Vectorizing columns: {:?} using strategy: {:?}",
        options.columns, options.strategy
    ));

    let column_indices: Vec<usize> = options
        .columns
        .iter()
        .map(|c| table.column_index(c).expect("validated above"))
        .collect();

    let rows: Vec<Vec<String>> = (0..table.rows.len())
        .map(|row_idx| table.row_values(row_idx, &column_indices))
        .collect();

    let num_columns = options.columns.len();
    let strategy = options.strategy;
    let model_id = options.model_id;
    let embedding_type = options.embedding_type;
    let output_dimension = options.output_dimension;
    let client_for_op = Arc::clone(&client);

    let op = move |row_values: Vec<String>| {
        let client = Arc::clone(&client_for_op);
        async move {
            let inputs: Vec<String> = match strategy {
                Strategy::PerColumn => row_values,
                Strategy::Combined => vec![row_values.join(" ")],
            };
            client
                .invoke_embedding(
                    &inputs,
                    model_id,
                    &[embedding_type],
                    InputType::Classification,
                    output_dimension,
                )
                .await
                .map_err(VectorizeError::from)
        }
    };

    let progress_reporter = Arc::clone(&reporter);
    let config: ProcessorConfig<VectorizeError> = ProcessorConfig::builder()
        .max_attempts(options.max_attempts)
        .num_workers(options.num_workers)
        .handle_throttling(true)
        .retry_strategy(RetryStrategy::Jittered)
        .name("vectorize-columns")
        .on_progress(move |delta| progress_reporter.progress(delta))
        .build();

    reporter.start_progress(rows.len() as u64);
    let row_count = rows.len();
    let processor_result = vectorforge_scheduler::process(rows, op, config).await;
    reporter.stop_progress();

    if processor_result.total_retried > 0 {
        reporter.message(&format!("Retried: {} requests", processor_result.total_retried));
    }
    if processor_result.total_failed > 0 {
        reporter.message(&format!("Failed: {} requests", processor_result.total_failed));
    }

    let mut batch_embeddings = Vec::with_capacity(row_count);
    for result in processor_result.results {
        batch_embeddings.push(result?);
    }

    match strategy {
        Strategy::PerColumn => {
            if let Some(first) = batch_embeddings.first() {
                if num_columns > 1 && first.len() != num_columns {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        returned = first.len(),
                        requested = num_columns,
                        "embedding count does not match column count; assigning first embedding to every column"
                    );
                }
            }
            for (i, column) in options.columns.iter().enumerate() {
                let mut col_values = Vec::with_capacity(batch_embeddings.len());
                for batch in &batch_embeddings {
                    let idx = if i < batch.len() { i } else { 0 };
                    let vector = batch[idx]
                        .embeddings
                        .get(&embedding_type)
                        .cloned()
                        .unwrap_or_default();
                    col_values.push(serde_json::to_value(vector).expect("vector serializes"));
                }
                table.push_column(format!("{column}{}", options.embedding_column_suffix), col_values);
            }
        }
        Strategy::Combined => {
            let col_values: Vec<serde_json::Value> = batch_embeddings
                .iter()
                .map(|batch| {
                    let vector = batch[0].embeddings.get(&embedding_type).cloned().unwrap_or_default();
                    serde_json::to_value(vector).expect("vector serializes")
                })
                .collect();
            let name = format!("{}{}", options.columns.join("_"), options.embedding_column_suffix);
            table.push_column(name, col_values);
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_column_is_detected() {
        let table = Table::new(vec!["a".to_string()], vec![vec![json!("x")]]);
        assert!(table.column_index("b").is_none());
    }

    #[tokio::test]
    async fn vectorize_fails_fast_on_missing_columns() {
        use vectorforge_embedding::GateConfig;
        use vectorforge_progress::NullReporter;

        let table = Table::new(vec!["text".to_string()], vec![vec![json!("hello")]]);
        let client = Arc::new(EmbeddingClient::new(
            "http://localhost:0",
            GateConfig::builder().build().unwrap(),
        ));
        let columns = vec!["missing".to_string()];
        let options = VectorizeOptions::new(&columns, EmbeddingModelId::TitanEmbedV2);

        let result = vectorize_columns(client, table, options, Arc::new(NullReporter)).await;
        assert!(matches!(result, Err(VectorizeError::MissingColumns { .. })));
    }
}
