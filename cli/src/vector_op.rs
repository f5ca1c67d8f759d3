//! JSON vector requests read by `fastembed vector`.

use serde::{Deserialize, Serialize};

use fastembed_engine::{Embedder, EmbeddingError, InferenceRuntime};

/// Vector operation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorOp {
    Cosine,
    Dot,
    Norm,
    Normalize,
    Add,
}

/// `{"op": "...", "vec1": [...], "vec2": [...]}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VectorRequest {
    pub op: VectorOp,
    pub vec1: Vec<f32>,
    #[serde(default)]
    pub vec2: Option<Vec<f32>>,
}

/// `{"result": ...}` where the result is a number or an array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorResponse {
    pub result: VectorValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VectorValue {
    Scalar(f32),
    Vector(Vec<f32>),
}

impl VectorRequest {
    /// Apply the operation with `embedder`'s vector kernel.
    pub fn apply<R: InferenceRuntime>(
        &self,
        embedder: &Embedder<R>,
    ) -> Result<VectorResponse, EmbeddingError> {
        let result = match self.op {
            VectorOp::Cosine => {
                VectorValue::Scalar(embedder.cosine_similarity(&self.vec1, self.second()?)?)
            }
            VectorOp::Dot => VectorValue::Scalar(embedder.dot_product(&self.vec1, self.second()?)?),
            VectorOp::Norm => VectorValue::Scalar(embedder.vector_norm(&self.vec1)),
            VectorOp::Normalize => VectorValue::Vector(embedder.normalize_vector(&self.vec1)),
            VectorOp::Add => VectorValue::Vector(embedder.add_vectors(&self.vec1, self.second()?)?),
        };
        Ok(VectorResponse { result })
    }

    fn second(&self) -> Result<&[f32], EmbeddingError> {
        self.vec2.as_deref().ok_or_else(|| {
            EmbeddingError::InvalidArgument(format!("operation {:?} needs vec2", self.op))
        })
    }
}
