// Qdrant-backed passage retrieval
use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, PointId, ScoredPoint, SearchPointsBuilder,
    Value as QdrantValue,
};
use qdrant_client::Qdrant;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::embedding::Embedder;
use crate::errors::RetrievalError;
use crate::rag::retrieval::{Metadata, Passage, Retriever};

/// Retriever searching an existing Qdrant collection of biography passages
pub struct QdrantRetriever {
    client: Qdrant,
    embedder: Arc<dyn Embedder>,
    collection: String,
    content_field: String,
}

impl QdrantRetriever {
    /// Connect to the collection named in `config`
    pub fn new(config: &StoreConfig, embedder: Arc<dyn Embedder>) -> Result<Self, RetrievalError> {
        Ok(Self {
            client: connect(config)?,
            embedder,
            collection: config.collection.clone(),
            content_field: config.content_field.clone(),
        })
    }

    /// Get collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

fn connect(config: &StoreConfig) -> Result<Qdrant, RetrievalError> {
    Qdrant::from_url(&config.qdrant_url)
        .api_key(config.qdrant_api_key.clone())
        .build()
        .map_err(|e| RetrievalError::Unavailable(format!("Failed to create Qdrant client: {}", e)))
}

/// Check that Qdrant answers at the configured URL
pub async fn health_check(config: &StoreConfig) -> Result<(), RetrievalError> {
    connect(config)?
        .health_check()
        .await
        .map(|_| ())
        .map_err(|e| RetrievalError::Unavailable(format!("Qdrant health check failed: {}", e)))
}

#[async_trait]
impl Retriever for QdrantRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query).await?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query_embedding, k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| RetrievalError::Unavailable(format!("Qdrant search failed: {}", e)))?;

        // Qdrant already returns points by descending score
        response
            .result
            .into_iter()
            .map(|point| passage_from_point(point, &self.content_field))
            .collect()
    }
}

/// Turn a scored point into a passage; the rest of the payload becomes metadata
fn passage_from_point(point: ScoredPoint, content_field: &str) -> Result<Passage, RetrievalError> {
    let id = point_id_to_string(&point.id);
    let mut payload = point.payload;

    let content = payload
        .remove(content_field)
        .and_then(|v| qdrant_value_to_string(&v))
        .ok_or_else(|| {
            RetrievalError::MalformedResponse(format!(
                "point {} has no text field '{}'",
                id, content_field
            ))
        })?;

    let mut metadata = Metadata::new();
    for (key, value) in payload {
        if let Some(json_val) = qdrant_to_json_value(&value) {
            metadata.insert(key, json_val);
        }
    }
    metadata.insert("id".to_string(), JsonValue::String(id));
    if let Some(score) = serde_json::Number::from_f64(point.score as f64) {
        metadata.insert("score".to_string(), JsonValue::Number(score));
    }

    Ok(Passage { content, metadata })
}

fn qdrant_to_json_value(value: &QdrantValue) -> Option<JsonValue> {
    value.kind.as_ref().and_then(|kind| match kind {
        Kind::NullValue(_) => Some(JsonValue::Null),
        Kind::StringValue(s) => Some(JsonValue::String(s.clone())),
        Kind::IntegerValue(i) => Some(JsonValue::Number((*i).into())),
        Kind::DoubleValue(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
        Kind::BoolValue(b) => Some(JsonValue::Bool(*b)),
        Kind::ListValue(list) => Some(JsonValue::Array(
            list.values.iter().filter_map(qdrant_to_json_value).collect(),
        )),
        Kind::StructValue(s) => Some(JsonValue::Object(
            s.fields
                .iter()
                .filter_map(|(k, v)| qdrant_to_json_value(v).map(|j| (k.clone(), j)))
                .collect(),
        )),
    })
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    match value.kind.as_ref() {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn point_id_to_string(point_id: &Option<PointId>) -> String {
    match point_id.as_ref().and_then(|id| id.point_id_options.as_ref()) {
        Some(PointIdOptions::Num(n)) => n.to_string(),
        Some(PointIdOptions::Uuid(u)) => u.clone(),
        None => "unknown".to_string(),
    }
}
