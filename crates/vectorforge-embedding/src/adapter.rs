//! Per-model request formatting, response parsing, and dimension validation.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::error::EmbeddingError;
use crate::types::{EmbeddingModelOutput, EmbeddingType, InputType};

/// A model family's wire format. `format_input` may return more than one
/// payload when the underlying model requires one call per input; callers
/// dispatch the returned payloads in parallel without needing to know which
/// case applies.
pub trait ModelAdapter: Send + Sync {
    fn supported_dimensions(&self) -> &'static [u32];

    fn format_input(
        &self,
        inputs: &[String],
        input_type: InputType,
        embedding_types: &[EmbeddingType],
        dimension: u32,
    ) -> Vec<Value>;

    fn format_output(
        &self,
        responses: &[Value],
        embedding_types: &[EmbeddingType],
    ) -> Result<Vec<EmbeddingModelOutput>, EmbeddingError>;

    fn validate_dimension(&self, dimension: u32) -> Result<(), EmbeddingError> {
        if self.supported_dimensions().contains(&dimension) {
            Ok(())
        } else {
            Err(EmbeddingError::Config(format!(
                "dimension {dimension} not in allowed set {:?}",
                self.supported_dimensions()
            )))
        }
    }
}

/// Amazon Titan: one call per input. Titan has no notion of input type,
/// requested embedding kind, or output dimension -- it always returns a
/// single 1024-dimensional `float` vector under the `embedding` key, so
/// those parameters are accepted for interface uniformity and ignored.
pub struct TitanAdapter;

impl ModelAdapter for TitanAdapter {
    fn supported_dimensions(&self) -> &'static [u32] {
        &[1024]
    }

    fn format_input(
        &self,
        inputs: &[String],
        _input_type: InputType,
        _embedding_types: &[EmbeddingType],
        _dimension: u32,
    ) -> Vec<Value> {
        inputs
            .iter()
            .map(|text| json!({ "inputText": text }))
            .collect()
    }

    fn format_output(
        &self,
        responses: &[Value],
        _embedding_types: &[EmbeddingType],
    ) -> Result<Vec<EmbeddingModelOutput>, EmbeddingError> {
        responses
            .iter()
            .map(|response| {
                let embedding = response
                    .get("embedding")
                    .and_then(Value::as_array)
                    .ok_or_else(|| EmbeddingError::output_parse(&response.to_string()))?;
                let vector = embedding
                    .iter()
                    .map(|v| v.as_f64().unwrap_or(0.0))
                    .collect();
                let mut embeddings = HashMap::new();
                embeddings.insert(EmbeddingType::Float, vector);
                Ok(EmbeddingModelOutput { embeddings })
            })
            .collect()
    }
}

/// Cohere: a single call can batch all inputs, and the response carries one
/// vector array per requested embedding kind under `embeddings.<kind>`.
pub struct CohereAdapter;

impl ModelAdapter for CohereAdapter {
    fn supported_dimensions(&self) -> &'static [u32] {
        &[256, 512, 1024, 1536]
    }

    fn format_input(
        &self,
        inputs: &[String],
        input_type: InputType,
        embedding_types: &[EmbeddingType],
        _dimension: u32,
    ) -> Vec<Value> {
        vec![json!({
            "texts": inputs,
            "input_type": input_type_label(input_type),
            "embedding_types": embedding_types.iter().map(cohere_kind_label).collect::<Vec<_>>(),
        })]
    }

    fn format_output(
        &self,
        responses: &[Value],
        embedding_types: &[EmbeddingType],
    ) -> Result<Vec<EmbeddingModelOutput>, EmbeddingError> {
        let response = responses
            .first()
            .ok_or_else(|| EmbeddingError::output_parse("empty response"))?;
        let embeddings_obj = response
            .get("embeddings")
            .ok_or_else(|| EmbeddingError::output_parse(&response.to_string()))?;

        let mut per_input: Vec<EmbeddingModelOutput> = Vec::new();
        for kind in embedding_types {
            let key = cohere_kind_label(kind);
            let arrays = embeddings_obj
                .get(key)
                .and_then(Value::as_array)
                .ok_or_else(|| EmbeddingError::output_parse(&response.to_string()))?;
            if per_input.is_empty() {
                per_input.resize_with(arrays.len(), EmbeddingModelOutput::default);
            }
            for (slot, vector_json) in per_input.iter_mut().zip(arrays) {
                let vector = vector_json
                    .as_array()
                    .ok_or_else(|| EmbeddingError::output_parse(&response.to_string()))?
                    .iter()
                    .map(|v| v.as_f64().unwrap_or(0.0))
                    .collect();
                slot.embeddings.insert(*kind, vector);
            }
        }
        Ok(per_input)
    }
}

fn input_type_label(input_type: InputType) -> &'static str {
    match input_type {
        InputType::Classification => "classification",
        InputType::Clustering => "clustering",
        InputType::SearchDocument => "search_document",
        InputType::SearchQuery => "search_query",
    }
}

fn cohere_kind_label(kind: &EmbeddingType) -> &'static str {
    match kind {
        EmbeddingType::Float => "float",
        EmbeddingType::Int8 => "int8",
        EmbeddingType::Uint8 => "uint8",
        EmbeddingType::Binary => "binary",
        EmbeddingType::Ubinary => "ubinary",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titan_rejects_unsupported_dimension() {
        let adapter = TitanAdapter;
        assert!(adapter.validate_dimension(1024).is_ok());
        assert!(adapter.validate_dimension(512).is_err());
    }

    #[test]
    fn cohere_accepts_all_four_dimensions() {
        let adapter = CohereAdapter;
        for dim in [256, 512, 1024, 1536] {
            assert!(adapter.validate_dimension(dim).is_ok());
        }
        assert!(adapter.validate_dimension(2048).is_err());
    }

    #[test]
    fn titan_parses_embedding_field() {
        let adapter = TitanAdapter;
        let responses = vec![json!({"embedding": [0.1, 0.2, 0.3]})];
        let parsed = adapter
            .format_output(&responses, &[EmbeddingType::Float])
            .unwrap();
        assert_eq!(parsed[0].embeddings[&EmbeddingType::Float], vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn titan_output_parse_error_carries_truncated_preview() {
        let adapter = TitanAdapter;
        let long_body = "x".repeat(500);
        let responses = vec![json!({"unexpected": long_body})];
        let err = adapter
            .format_output(&responses, &[EmbeddingType::Float])
            .unwrap_err();
        match err {
            EmbeddingError::OutputParse { preview } => assert!(preview.chars().count() <= 200),
            _ => panic!("expected OutputParse"),
        }
    }

    #[test]
    fn cohere_parses_per_kind_embeddings() {
        let adapter = CohereAdapter;
        let responses = vec![json!({
            "embeddings": { "float": [[0.1, 0.2]] }
        })];
        let parsed = adapter
            .format_output(&responses, &[EmbeddingType::Float])
            .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].embeddings[&EmbeddingType::Float], vec![0.1, 0.2]);
    }
}
