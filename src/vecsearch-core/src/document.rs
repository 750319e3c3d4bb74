use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Hit;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("document id is empty")]
    EmptyId,

    #[error("embedding value at position {position} is not finite")]
    NonFiniteEmbedding { position: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that can be written to an index: an identity plus a wire payload
pub trait Document: Send + Sync {
    fn id(&self) -> &str;
    fn to_bytes(&self) -> Result<Vec<u8>, CodecError>;
}

impl<D: Document + ?Sized> Document for &D {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        (**self).to_bytes()
    }
}

impl<D: Document + ?Sized> Document for Box<D> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        (**self).to_bytes()
    }
}

/// VectorDoc is a document carrying a single embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDoc {
    pub id: String,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub embedding: Vec<f32>,
}

impl VectorDoc {
    /// Create a document stamped with the current time
    pub fn new(id: impl Into<String>, embedding: Vec<f32>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_time: now,
            updated_time: now,
            embedding,
        }
    }

    /// Mark the document as updated now
    pub fn touch(&mut self) {
        self.updated_time = Utc::now();
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Document for VectorDoc {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        if self.id.is_empty() {
            return Err(CodecError::EmptyId);
        }

        // serde_json would quietly write NaN/inf as null
        if let Some(position) = self.embedding.iter().position(|v| !v.is_finite()) {
            return Err(CodecError::NonFiniteEmbedding { position });
        }

        Ok(serde_json::to_vec(self)?)
    }
}

impl TryFrom<&Hit> for VectorDoc {
    type Error = CodecError;

    fn try_from(hit: &Hit) -> Result<Self, Self::Error> {
        Ok(hit.source_as()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_sets_both_timestamps() {
        let doc = VectorDoc::new("1001", vec![100.0, 100.0, 100.0]);
        assert_eq!(doc.id(), "1001");
        assert_eq!(doc.created_time, doc.updated_time);
    }

    #[test]
    fn test_touch_moves_updated_time_only() {
        let mut doc = VectorDoc::new("1001", vec![1.0]);
        let created = doc.created_time;
        doc.updated_time = created - chrono::Duration::seconds(5);
        doc.touch();

        assert_eq!(doc.created_time, created);
        assert!(doc.updated_time >= created);
    }

    #[test]
    fn test_wire_shape() {
        let doc = VectorDoc::new("7", vec![1.5, -2.0]);
        let value: serde_json::Value = serde_json::from_slice(&doc.to_bytes().unwrap()).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(value["id"], "7");
        assert_eq!(value["embedding"], serde_json::json!([1.5, -2.0]));
        assert!(value["created_time"].is_string());
        assert!(value["updated_time"].is_string());
    }

    #[test]
    fn test_decode_encode_preserves_every_field() {
        let doc = VectorDoc::new("abc", vec![0.1, 2.5e-3, -7.25, 1e10]);
        let decoded = VectorDoc::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let doc = VectorDoc::new("", vec![1.0]);
        assert!(matches!(doc.to_bytes(), Err(CodecError::EmptyId)));
    }

    #[test]
    fn test_non_finite_embedding_is_rejected() {
        let doc = VectorDoc::new("x", vec![1.0, f32::NAN, 3.0]);
        assert!(matches!(
            doc.to_bytes(),
            Err(CodecError::NonFiniteEmbedding { position: 1 })
        ));

        let doc = VectorDoc::new("y", vec![f32::INFINITY]);
        assert!(doc.to_bytes().is_err());
    }

    #[test]
    fn test_decode_from_hit() {
        let doc = VectorDoc::new("h1", vec![3.0, 4.0]);
        let source = serde_json::to_value(&doc).unwrap();
        let hit = Hit {
            index: "docs".to_string(),
            id: "h1".to_string(),
            score: Some(0.5),
            source: source.as_object().unwrap().clone(),
        };

        assert_eq!(VectorDoc::try_from(&hit).unwrap(), doc);
    }

    #[test]
    fn test_boxed_documents_delegate() {
        let docs: Vec<Box<dyn Document>> = vec![Box::new(VectorDoc::new("b", vec![1.0]))];
        assert_eq!(docs[0].id(), "b");
        assert!(docs[0].to_bytes().is_ok());
    }
}
