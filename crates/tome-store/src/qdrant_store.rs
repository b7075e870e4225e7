//! Qdrant-backed vector store.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, PointStruct, ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder, value::Kind,
};

use crate::vector_store::{
    Distance, ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError,
};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub struct QdrantVectorStore {
    client: Qdrant,
    distance: Distance,
}

impl std::fmt::Debug for QdrantVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantVectorStore")
            .field("distance", &self.distance)
            .finish_non_exhaustive()
    }
}

impl QdrantVectorStore {
    /// Connect to a Qdrant instance at the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn new(url: &str, distance: Distance) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        Ok(Self { client, distance })
    }

    fn qdrant_distance(&self) -> qdrant_client::qdrant::Distance {
        match self.distance {
            Distance::Cosine => qdrant_client::qdrant::Distance::Cosine,
            Distance::Dot => qdrant_client::qdrant::Distance::Dot,
        }
    }
}

impl VectorStore for QdrantVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let exists = self
                .client
                .collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            if exists {
                return Ok(());
            }
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&collection).vectors_config(
                        VectorParamsBuilder::new(vector_size, self.qdrant_distance()),
                    ),
                )
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            Ok(())
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.client
                .collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.client
                .delete_collection(&collection)
                .await
                .map_err(|e| VectorStoreError::Delete(e.to_string()))?;
            Ok(())
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let qdrant_points = points
                .into_iter()
                .map(point_to_qdrant)
                .collect::<Result<Vec<_>, _>>()?;
            self.client
                .upsert_points(UpsertPointsBuilder::new(&collection, qdrant_points))
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            Ok(())
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let builder =
                SearchPointsBuilder::new(&collection, vector, limit).with_payload(true);
            let results = self
                .client
                .search_points(builder)
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            Ok(results
                .result
                .into_iter()
                .map(scored_point_to_vector)
                .collect())
        })
    }
}

/// A payload that does not convert fails the upsert; storing the point with
/// an empty payload would lose its text and poison later retrievals.
fn point_to_qdrant(point: VectorPoint) -> Result<PointStruct, VectorStoreError> {
    let payload: HashMap<String, qdrant_client::qdrant::Value> =
        serde_json::from_value(serde_json::Value::Object(
            point.payload.into_iter().collect(),
        ))
        .map_err(|e| {
            VectorStoreError::Upsert(format!("payload conversion for point {}: {e}", point.id))
        })?;
    Ok(PointStruct::new(point.id, point.vector, payload))
}

fn scored_point_to_vector(point: ScoredPoint) -> ScoredVectorPoint {
    let payload: HashMap<String, serde_json::Value> = point
        .payload
        .into_iter()
        .filter_map(|(k, v)| {
            let json_val = match v.kind? {
                Kind::StringValue(s) => serde_json::Value::String(s),
                Kind::IntegerValue(i) => serde_json::Value::Number(i.into()),
                Kind::DoubleValue(d) => {
                    serde_json::Number::from_f64(d).map(serde_json::Value::Number)?
                }
                Kind::BoolValue(b) => serde_json::Value::Bool(b),
                _ => return None,
            };
            Some((k, json_val))
        })
        .collect();

    let id = match point.id.and_then(|pid| pid.point_id_options) {
        Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u)) => u,
        Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    };

    ScoredVectorPoint {
        id,
        score: point.score,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_payload_conversion_preserves_fields() {
        let point = VectorPoint {
            id: "p1".into(),
            vector: vec![1.0, 0.0],
            payload: HashMap::from([
                ("content".to_owned(), serde_json::json!("hello")),
                ("chunk_index".to_owned(), serde_json::json!(3)),
            ]),
        };
        let converted = point_to_qdrant(point).unwrap();
        assert_eq!(
            converted.payload["content"],
            qdrant_client::qdrant::Value::from("hello")
        );
        assert_eq!(
            converted.payload["chunk_index"],
            qdrant_client::qdrant::Value::from(3_i64)
        );
    }

    #[test]
    fn scored_point_payload_conversion_drops_unsupported_kinds() {
        let point = ScoredPoint {
            payload: HashMap::from([
                ("text".to_owned(), qdrant_client::qdrant::Value::from("hi")),
                ("num".to_owned(), qdrant_client::qdrant::Value::from(3_i64)),
            ]),
            score: 0.5,
            ..Default::default()
        };
        let converted = scored_point_to_vector(point);
        assert_eq!(converted.payload["text"], serde_json::json!("hi"));
        assert_eq!(converted.payload["num"], serde_json::json!(3));
        assert!(converted.id.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires running Qdrant instance on localhost:6334"]
    async fn integration_roundtrip() {
        let store = QdrantVectorStore::new("http://localhost:6334", Distance::Cosine).unwrap();
        store.ensure_collection("tome_test", 2).await.unwrap();
        store
            .upsert(
                "tome_test",
                vec![VectorPoint {
                    id: uuid::Uuid::new_v4().to_string(),
                    vector: vec![1.0, 0.0],
                    payload: HashMap::from([("content".into(), serde_json::json!("hello"))]),
                }],
            )
            .await
            .unwrap();
        let results = store
            .search("tome_test", vec![1.0, 0.0], 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        store.delete_collection("tome_test").await.unwrap();
    }
}
