//! # C ABI
//!
//! `extern "C"` entry points over the embedding engine, one shared
//! library for every language binding.
//!
//! # Conventions
//!
//! - Functions returning `int` return `0` on success and `-1` on error.
//! - Functions returning `float` return `0.0` on invalid arguments.
//! - Every failure records a message readable with [`fastembed_last_error`]
//!   on the same thread; every success clears it.
//! - Null pointers, non-positive dimensions and invalid UTF-8 are input errors.
//!
//! # Safety
//!
//! The caller owns every buffer. Each pointer must stay valid for the
//! whole call, hold at least `dimension` elements, and output buffers
//! must not alias inputs.

mod global;
mod last_error;

use std::ffi::{CStr, c_char, c_int};
use std::path::Path;

use fastembed_embeddings::vector;
use fastembed_engine::{EmbeddingError, GenerationMode};

pub use global::CONFIG_ENV;
pub use last_error::{fastembed_last_error, last_error_message};

type Result<T> = std::result::Result<T, EmbeddingError>;

/// Run `f`, recording its error for [`fastembed_last_error`].
fn call<T>(f: impl FnOnce() -> Result<T>) -> Option<T> {
    match f() {
        Ok(value) => {
            last_error::clear_last_error();
            Some(value)
        }
        Err(err) => {
            last_error::set_last_error(err.to_string());
            None
        }
    }
}

fn status(result: Option<()>) -> c_int {
    match result {
        Some(()) => 0,
        None => -1,
    }
}

fn dimension_arg(dimension: c_int) -> Result<usize> {
    match usize::try_from(dimension) {
        Ok(dimension) if dimension > 0 => Ok(dimension),
        _ => Err(EmbeddingError::InvalidArgument(format!(
            "dimension must be positive, got {dimension}"
        ))),
    }
}

fn null_argument(name: &str) -> EmbeddingError {
    EmbeddingError::InvalidArgument(format!("{name} is null"))
}

/// # Safety
///
/// `ptr` must be null or a NUL-terminated string valid for `'a`.
unsafe fn read_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(null_argument(name));
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let text = unsafe { CStr::from_ptr(ptr) };
    text.to_str()
        .map_err(|e| EmbeddingError::InvalidArgument(format!("{name} is not valid UTF-8: {e}")))
}

/// # Safety
///
/// `ptr` must be null or point to `len` readable floats valid for `'a`.
unsafe fn read_slice<'a>(ptr: *const f32, len: usize, name: &str) -> Result<&'a [f32]> {
    if ptr.is_null() {
        return Err(null_argument(name));
    }
    // SAFETY: non-null and `len` elements long per the caller's contract.
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// # Safety
///
/// `ptr` must be null or point to `len` writable floats valid for `'a`,
/// not aliased by any other slice in use.
unsafe fn write_slice<'a>(ptr: *mut f32, len: usize, name: &str) -> Result<&'a mut [f32]> {
    if ptr.is_null() {
        return Err(null_argument(name));
    }
    // SAFETY: non-null, `len` elements long and unaliased per the caller's contract.
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

/// Generate a hash embedding of `text` into `output`.
///
/// # Safety
///
/// `text` must be NUL-terminated; `output` must hold `dimension` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_generate(
    text: *const c_char,
    output: *mut f32,
    dimension: c_int,
) -> c_int {
    status(call(|| {
        let dimension = dimension_arg(dimension)?;
        // SAFETY: forwarded from this function's contract.
        let text = unsafe { read_str(text, "text") }?;
        let output = unsafe { write_slice(output, dimension, "output") }?;
        let embedding = global::embedder().generate(text, dimension, &GenerationMode::Hash)?;
        output.copy_from_slice(&embedding);
        Ok(())
    }))
}

/// Generate hash embeddings for `num_texts` texts.
///
/// All arguments are checked before anything is written, so on error no
/// output buffer has been touched.
///
/// # Safety
///
/// `texts` and `outputs` must each hold `num_texts` pointers; every text
/// must be NUL-terminated and every output must hold `dimension` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_batch_generate(
    texts: *const *const c_char,
    num_texts: c_int,
    outputs: *const *mut f32,
    dimension: c_int,
) -> c_int {
    status(call(|| {
        let dimension = dimension_arg(dimension)?;
        let count = match usize::try_from(num_texts) {
            Ok(count) if count > 0 => count,
            _ => {
                return Err(EmbeddingError::InvalidArgument(format!(
                    "num_texts must be positive, got {num_texts}"
                )));
            }
        };
        if texts.is_null() {
            return Err(null_argument("texts"));
        }
        if outputs.is_null() {
            return Err(null_argument("outputs"));
        }

        // SAFETY: both arrays hold `count` pointers per the contract.
        let text_ptrs = unsafe { std::slice::from_raw_parts(texts, count) };
        let output_ptrs = unsafe { std::slice::from_raw_parts(outputs, count) };

        let texts = text_ptrs
            .iter()
            .map(|&ptr| unsafe { read_str(ptr, "texts[i]") })
            .collect::<Result<Vec<_>>>()?;
        if output_ptrs.iter().any(|ptr| ptr.is_null()) {
            return Err(null_argument("outputs[i]"));
        }

        let embeddings =
            global::embedder().generate_batch(&texts, dimension, &GenerationMode::Hash)?;
        for (&ptr, embedding) in output_ptrs.iter().zip(&embeddings) {
            // SAFETY: checked non-null above, `dimension` floats per the contract.
            let output = unsafe { write_slice(ptr, dimension, "outputs[i]") }?;
            output.copy_from_slice(embedding);
        }
        Ok(())
    }))
}

/// Dot product of two vectors, `0.0` on invalid arguments.
///
/// # Safety
///
/// Both vectors must hold `dimension` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_dot_product(
    vec1: *const f32,
    vec2: *const f32,
    dimension: c_int,
) -> f32 {
    call(|| {
        let dimension = dimension_arg(dimension)?;
        let a = unsafe { read_slice(vec1, dimension, "vec1") }?;
        let b = unsafe { read_slice(vec2, dimension, "vec2") }?;
        vector::dot_product(a, b)
    })
    .unwrap_or(0.0)
}

/// Cosine similarity of two vectors, `0.0` on invalid arguments or a zero vector.
///
/// # Safety
///
/// Both vectors must hold `dimension` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_cosine_similarity(
    vec1: *const f32,
    vec2: *const f32,
    dimension: c_int,
) -> f32 {
    call(|| {
        let dimension = dimension_arg(dimension)?;
        let a = unsafe { read_slice(vec1, dimension, "vec1") }?;
        let b = unsafe { read_slice(vec2, dimension, "vec2") }?;
        vector::cosine_similarity(a, b)
    })
    .unwrap_or(0.0)
}

/// L2 norm of a vector, `0.0` on invalid arguments.
///
/// # Safety
///
/// `vec` must hold `dimension` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_vector_norm(vec: *const f32, dimension: c_int) -> f32 {
    call(|| {
        let dimension = dimension_arg(dimension)?;
        let v = unsafe { read_slice(vec, dimension, "vec") }?;
        Ok(vector::norm(v))
    })
    .unwrap_or(0.0)
}

/// Normalize `vec` to unit length in place. Zero vectors are left unchanged.
///
/// # Safety
///
/// `vec` must hold `dimension` writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_normalize(vec: *mut f32, dimension: c_int) {
    call(|| {
        let dimension = dimension_arg(dimension)?;
        let v = unsafe { write_slice(vec, dimension, "vec") }?;
        vector::normalize_in_place(v);
        Ok(())
    });
}

/// Elementwise sum of `vec1` and `vec2` into `result`.
///
/// # Safety
///
/// All three vectors must hold `dimension` floats and `result` must not
/// alias either input.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_add_vectors(
    vec1: *const f32,
    vec2: *const f32,
    result: *mut f32,
    dimension: c_int,
) {
    call(|| {
        let dimension = dimension_arg(dimension)?;
        let a = unsafe { read_slice(vec1, dimension, "vec1") }?;
        let b = unsafe { read_slice(vec2, dimension, "vec2") }?;
        let out = unsafe { write_slice(result, dimension, "result") }?;
        out.copy_from_slice(&vector::add(a, b)?);
        Ok(())
    });
}

/// Embed `text` with the ONNX model at `model_path` into `output`.
///
/// The model stays cached until [`fastembed_onnx_unload`] or a request
/// for a different path. `dimension` must equal the model's dimension.
///
/// # Safety
///
/// `model_path` and `text` must be NUL-terminated; `output` must hold
/// `dimension` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_onnx_generate(
    model_path: *const c_char,
    text: *const c_char,
    output: *mut f32,
    dimension: c_int,
) -> c_int {
    status(call(|| {
        let dimension = dimension_arg(dimension)?;
        let model_path = unsafe { read_str(model_path, "model_path") }?;
        let text = unsafe { read_str(text, "text") }?;
        let output = unsafe { write_slice(output, dimension, "output") }?;
        let mode = GenerationMode::Model(Path::new(model_path).to_path_buf());
        let embedding = global::embedder().generate(text, dimension, &mode)?;
        output.copy_from_slice(&embedding);
        Ok(())
    }))
}

/// Release the cached ONNX model. Returns 1 if a model was released, 0 otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn fastembed_onnx_unload() -> c_int {
    last_error::clear_last_error();
    c_int::from(global::embedder().unload_model())
}
