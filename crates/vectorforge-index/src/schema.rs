//! `knn_vector` index schema description (value types only; creating or
//! managing indexes beyond this crate's `create_index` call is out of
//! scope).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorSearchMethodName {
    Hnsw,
    Ivf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorSearchSpaceType {
    L2,
    Cosine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorSearchEngine {
    Faiss,
    Nmslib,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorFieldMethodParameters {
    pub ef_construction: u32,
    pub m: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorFieldMethod {
    pub name: VectorSearchMethodName,
    pub space_type: VectorSearchSpaceType,
    pub engine: VectorSearchEngine,
    pub parameters: VectorFieldMethodParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorField {
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub dimension: u32,
    pub method: VectorFieldMethod,
}

impl VectorField {
    pub fn new(dimension: u32, method: VectorFieldMethod) -> Self {
        Self {
            field_type: "knn_vector",
            dimension,
            method,
        }
    }
}

/// The minimal index schema this core depends on: a `knn_vector` field plus
/// the `knn.algo_param.ef_search` index setting set via dotted notation.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    pub vector_field_name: String,
    pub vector_field: VectorField,
    pub ef_search: u32,
}

impl IndexSchema {
    /// Renders the `PUT /<index>` body: `settings.index.knn = true`,
    /// `settings.index."knn.algo_param.ef_search"`, and the `knn_vector`
    /// field mapping.
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "settings": {
                "index": {
                    "knn": true,
                    "knn.algo_param.ef_search": self.ef_search,
                }
            },
            "mappings": {
                "properties": {
                    self.vector_field_name.clone(): self.vector_field,
                }
            }
        })
    }
}
