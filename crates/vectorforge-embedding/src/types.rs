use std::collections::HashMap;

/// The kind of embedding vector requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingType {
    Float,
    Int8,
    Uint8,
    Binary,
    Ubinary,
}

/// The purpose of an embedding request, passed through to models that
/// distinguish query-time from indexing-time inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Classification,
    Clustering,
    SearchDocument,
    SearchQuery,
}

/// A numeric embedding vector, independent of the kind it was requested as.
pub type Vector = Vec<f64>;

/// The parsed response for one formatted payload: one vector per requested
/// embedding kind.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingModelOutput {
    pub embeddings: HashMap<EmbeddingType, Vector>,
}

/// The supported embedding-capable model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingModelId {
    TitanEmbedV2,
    CohereEmbedEnglishV3,
    CohereEmbedMultilingualV3,
}

impl EmbeddingModelId {
    /// Maps a caller-supplied model identifier string to the adapter family
    /// it should be dispatched through.
    pub fn from_str(model_id: &str) -> Option<Self> {
        match model_id {
            "amazon.titan-embed-text-v2:0" => Some(Self::TitanEmbedV2),
            "cohere.embed-english-v3" => Some(Self::CohereEmbedEnglishV3),
            "cohere.embed-multilingual-v3" => Some(Self::CohereEmbedMultilingualV3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TitanEmbedV2 => "amazon.titan-embed-text-v2:0",
            Self::CohereEmbedEnglishV3 => "cohere.embed-english-v3",
            Self::CohereEmbedMultilingualV3 => "cohere.embed-multilingual-v3",
        }
    }

    /// Which adapter family handles this model's wire format.
    pub fn family(&self) -> AdapterFamily {
        match self {
            Self::TitanEmbedV2 => AdapterFamily::Titan,
            Self::CohereEmbedEnglishV3 | Self::CohereEmbedMultilingualV3 => AdapterFamily::Cohere,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterFamily {
    Titan,
    Cohere,
}
