//! ONNX Runtime adapter (feature-gated behind `ort`).
//!
//! Loads a `.onnx` model with `ort`, tokenizes with `tokenizers` when a
//! `tokenizer.json` is available (falling back to the word-hash
//! tokenizer), runs one forward pass and pools the hidden states.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::backend::InferenceRuntime;
use crate::config::ModelConfig;
use crate::error::{EmbeddingError, Result};
use crate::pooling::pool;
use crate::tokenize::WordHashTokenizer;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

enum Tokenizer {
    Pretrained(Box<tokenizers::Tokenizer>),
    WordHash(WordHashTokenizer),
}

/// Token ids plus the masks the model expects.
struct Encoded {
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

impl Tokenizer {
    fn encode(&self, text: &str, max_length: usize) -> std::result::Result<Encoded, BoxError> {
        match self {
            Self::Pretrained(tokenizer) => {
                let encoding = tokenizer.encode(text, true)?;
                let len = encoding.get_ids().len().min(max_length);
                Ok(Encoded {
                    input_ids: encoding.get_ids()[..len].iter().map(|&id| i64::from(id)).collect(),
                    attention_mask: encoding.get_attention_mask()[..len]
                        .iter()
                        .map(|&m| i64::from(m))
                        .collect(),
                    token_type_ids: encoding.get_type_ids()[..len]
                        .iter()
                        .map(|&t| i64::from(t))
                        .collect(),
                })
            }
            Self::WordHash(tokenizer) => {
                let input_ids = tokenizer.encode(text);
                let len = input_ids.len();
                Ok(Encoded {
                    input_ids,
                    attention_mask: vec![1; len],
                    token_type_ids: vec![0; len],
                })
            }
        }
    }
}

/// A loaded ONNX session with its tokenizer.
pub struct OrtSession {
    session: ort::session::Session,
    tokenizer: Tokenizer,
}

/// [`InferenceRuntime`] backed by ONNX Runtime.
pub struct OrtRuntime {
    config: ModelConfig,
}

impl OrtRuntime {
    /// Create a runtime with the given model configuration.
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// The model configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn tokenizer_path(&self, model_path: &Path) -> Option<PathBuf> {
        if let Some(path) = &self.config.tokenizer_path {
            return Some(path.clone());
        }
        let sibling = model_path.with_file_name("tokenizer.json");
        sibling.is_file().then_some(sibling)
    }
}

impl Default for OrtRuntime {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

/// Create the session and tokenizer.
///
/// Uses `Box<dyn Error>` internally so all calls can use `?` directly.
/// The caller maps the error to `EmbeddingError::ModelLoad` at the boundary.
fn load_inner(
    model_path: &Path,
    tokenizer_path: Option<&Path>,
    config: &ModelConfig,
) -> std::result::Result<OrtSession, BoxError> {
    let tokenizer = match tokenizer_path {
        Some(path) => {
            let tokenizer = tokenizers::Tokenizer::from_file(path)
                .map_err(|e| format!("tokenizer load: {e}"))?;
            debug!(tokenizer = %path.display(), "using pretrained tokenizer");
            Tokenizer::Pretrained(Box::new(tokenizer))
        }
        None => {
            debug!("no tokenizer.json found, using word-hash tokenizer");
            Tokenizer::WordHash(WordHashTokenizer::new(config.max_sequence_length))
        }
    };

    let session = ort::session::Session::builder()?
        .with_intra_threads(config.intra_threads)?
        .with_log_level(ort::logging::LogLevel::Warning)?
        .commit_from_file(model_path)?;

    let mut state = OrtSession { session, tokenizer };

    // The output width is only observable by running the model once.
    let hidden = forward(&mut state, WARMUP_TEXT, config)?.len();
    check_hidden_size(hidden, config.dimension)?;

    info!(model = %model_path.display(), hidden, "ONNX model loaded");
    Ok(state)
}

/// Text for the load-time forward pass.
const WARMUP_TEXT: &str = "warmup";

fn check_hidden_size(hidden: usize, dimension: usize) -> std::result::Result<(), BoxError> {
    if hidden < dimension {
        return Err(format!(
            "model hidden size {hidden} is smaller than configured dimension {dimension}"
        )
        .into());
    }
    Ok(())
}

/// Run one forward pass and return the pooled, untruncated hidden state.
fn forward(
    state: &mut OrtSession,
    text: &str,
    config: &ModelConfig,
) -> std::result::Result<Vec<f32>, BoxError> {
    let encoded = state.tokenizer.encode(text, config.max_sequence_length)?;
    let seq_len = encoded.input_ids.len();
    if seq_len == 0 {
        return Err("empty tokenization".into());
    }

    #[allow(clippy::cast_possible_wrap)]
    let shape = vec![1i64, seq_len as i64];

    let input_ids = ort::value::Tensor::from_array((shape.clone(), encoded.input_ids))?;
    let attention_mask =
        ort::value::Tensor::from_array((shape.clone(), encoded.attention_mask.clone()))?;

    let outputs = if config.use_token_type_ids {
        let token_type_ids = ort::value::Tensor::from_array((shape, encoded.token_type_ids))?;
        state.session.run(ort::inputs![
            "input_ids" => input_ids,
            "token_type_ids" => token_type_ids,
            "attention_mask" => attention_mask,
        ])?
    } else {
        state.session.run(ort::inputs![
            "input_ids" => input_ids,
            "attention_mask" => attention_mask,
        ])?
    };

    let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let dims: Vec<usize> = output_shape.iter().map(|&d| d as usize).collect();

    let pooled = match dims.as_slice() {
        [1, seq_out, hidden] => pool(
            output_data,
            *seq_out,
            *hidden,
            &encoded.attention_mask,
            config.pooling,
        )?,
        [1, hidden] => output_data
            .get(..*hidden)
            .ok_or("pooled output is shorter than its shape")?
            .to_vec(),
        _ => return Err(format!("unexpected output shape: {output_shape:?}").into()),
    };

    Ok(pooled)
}

fn infer_inner(
    state: &mut OrtSession,
    text: &str,
    config: &ModelConfig,
) -> std::result::Result<Vec<f32>, BoxError> {
    let mut embedding = forward(state, text, config)?;
    check_hidden_size(embedding.len(), config.dimension)?;
    embedding.truncate(config.dimension);
    Ok(embedding)
}

impl InferenceRuntime for OrtRuntime {
    type Session = OrtSession;

    fn name(&self) -> &str {
        "onnxruntime"
    }

    fn load(&self, path: &Path) -> Result<OrtSession> {
        if !path.is_file() {
            return Err(EmbeddingError::ModelNotFound(path.to_path_buf()));
        }
        let tokenizer_path = self.tokenizer_path(path);
        load_inner(path, tokenizer_path.as_deref(), &self.config)
            .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))
    }

    fn infer(&self, session: &mut OrtSession, text: &str) -> Result<Vec<f32>> {
        infer_inner(session, text, &self.config).map_err(|e| EmbeddingError::Inference(e.to_string()))
    }

    fn unload(&self, session: OrtSession) {
        drop(session);
    }

    fn dimension(&self, _session: &OrtSession) -> usize {
        self.config.dimension
    }

    fn expected_dimension(&self) -> Option<usize> {
        Some(self.config.dimension)
    }
}
