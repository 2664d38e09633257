use std::collections::HashMap;

use serde_json::Value;
use vectorforge_core::AsyncCounter;
use vectorforge_gate::{AdaptiveGate, GateConfig};

use crate::adapter::{CohereAdapter, ModelAdapter, TitanAdapter};
use crate::error::EmbeddingError;
use crate::types::{AdapterFamily, EmbeddingModelId, EmbeddingModelOutput, EmbeddingType, InputType};

/// A stateful client to a remote embedding service: a pooled HTTP transport
/// plus a single admission-control gate shared by every in-flight call, so
/// the AIMD feedback reflects the client's aggregate load rather than
/// per-request local decisions.
pub struct EmbeddingClient {
    http: reqwest::Client,
    base_url: String,
    gate: AdaptiveGate,
    adapters: HashMap<AdapterFamily, Box<dyn ModelAdapter>>,
    auth_header: Option<String>,
    request_count: AsyncCounter,
}

impl EmbeddingClient {
    pub fn new(base_url: impl Into<String>, gate_config: GateConfig) -> Self {
        Self::with_auth_header(base_url, gate_config, None)
    }

    pub fn with_auth_header(
        base_url: impl Into<String>,
        gate_config: GateConfig,
        auth_header: Option<String>,
    ) -> Self {
        let mut adapters: HashMap<AdapterFamily, Box<dyn ModelAdapter>> = HashMap::new();
        adapters.insert(AdapterFamily::Titan, Box::new(TitanAdapter));
        adapters.insert(AdapterFamily::Cohere, Box::new(CohereAdapter));
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            gate: AdaptiveGate::new(gate_config),
            adapters,
            auth_header,
            request_count: AsyncCounter::new(),
        }
    }

    /// Admission-controlled single call: acquire, issue the request,
    /// classify the outcome, release. The gate is released on every exit
    /// path, including early returns from `?`, because the guard's `Drop`
    /// runs regardless of how this function returns.
    pub async fn invoke(
        &self,
        model_id: EmbeddingModelId,
        payload: Value,
    ) -> Result<Value, EmbeddingError> {
        let _permit = self.gate.acquire().await;
        self.request_count.add(1).await;

        let url = format!("{}/model/{}/invoke", self.base_url, model_id.as_str());
        let mut request = self.http.post(&url).json(&payload);
        if let Some(header) = &self.auth_header {
            request = request.header("authorization", header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbeddingError::TransientService(e.to_string()))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| EmbeddingError::TransientService(e.to_string()))?;

        if body.get("code").and_then(Value::as_str) == Some("ThrottlingException") {
            self.gate.on_throttle();
            return Err(EmbeddingError::Throttling);
        }
        if !status.is_success() {
            return Err(EmbeddingError::TransientService(format!(
                "status {status}: {body}"
            )));
        }

        self.gate.on_success();
        Ok(body)
    }

    /// Formats `inputs` via the model's adapter, dispatches the resulting
    /// payloads through [`Self::invoke`] in parallel, and assembles the
    /// parsed outputs.
    pub async fn invoke_embedding(
        &self,
        inputs: &[String],
        model_id: EmbeddingModelId,
        embedding_types: &[EmbeddingType],
        input_type: InputType,
        dimension: u32,
    ) -> Result<Vec<EmbeddingModelOutput>, EmbeddingError> {
        let adapter = self
            .adapters
            .get(&model_id.family())
            .expect("every model family has a registered adapter");
        adapter.validate_dimension(dimension)?;

        let payloads = adapter.format_input(inputs, input_type, embedding_types, dimension);
        let calls = payloads
            .into_iter()
            .map(|payload| self.invoke(model_id, payload));
        let responses = futures::future::try_join_all(calls).await?;
        adapter.format_output(&responses, embedding_types)
    }

    /// Releases the pooled connection. `reqwest::Client` tears down its
    /// connection pool on drop; this exists so callers have an explicit,
    /// symmetric shutdown point matching the gate's scoped lifecycle.
    pub fn close(self) {
        drop(self);
    }

    pub fn gate(&self) -> &AdaptiveGate {
        &self.gate
    }

    /// Total number of `invoke` calls issued so far, across every in-flight
    /// and completed request.
    pub async fn request_count(&self) -> u64 {
        self.request_count.value().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_family_lookup_would_panic_is_unreachable() {
        // every EmbeddingModelId variant maps to a registered family; this
        // is exercised implicitly by invoke_embedding in integration tests
        // that require network access, so it's not re-tested here.
        let client = EmbeddingClient::new("http://localhost", GateConfig::builder().build().unwrap());
        assert!(client.adapters.contains_key(&AdapterFamily::Titan));
        assert!(client.adapters.contains_key(&AdapterFamily::Cohere));
    }

    #[tokio::test]
    async fn request_count_starts_at_zero() {
        let client = EmbeddingClient::new("http://localhost", GateConfig::builder().build().unwrap());
        assert_eq!(client.request_count().await, 0);
    }
}
