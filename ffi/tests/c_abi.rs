//! Calls the exported functions the way a C caller would.

use std::ffi::{CString, c_char};
use std::ptr;

use fastembed_ffi::{
    fastembed_add_vectors, fastembed_batch_generate, fastembed_cosine_similarity,
    fastembed_dot_product, fastembed_generate, fastembed_normalize, fastembed_onnx_generate,
    fastembed_onnx_unload, fastembed_vector_norm, last_error_message,
};
use pretty_assertions::assert_eq;

fn generate(text: &str, dimension: usize) -> Vec<f32> {
    let text = CString::new(text).unwrap();
    let mut output = vec![0.0f32; dimension];
    let rc = unsafe { fastembed_generate(text.as_ptr(), output.as_mut_ptr(), dimension as i32) };
    assert_eq!(rc, 0, "{:?}", last_error_message());
    output
}

#[test]
fn test_generate_is_deterministic_and_case_insensitive() {
    let a = generate("Hello world", 128);
    let b = generate("HELLO WORLD", 128);
    assert_eq!(a, b);
    assert!(a.iter().all(|v| (-1.0..1.0).contains(v)));
    assert_eq!(last_error_message(), None);
}

#[test]
fn test_generate_rejects_bad_input() {
    let mut output = vec![0.0f32; 8];

    let rc = unsafe { fastembed_generate(ptr::null(), output.as_mut_ptr(), 8) };
    assert_eq!(rc, -1);
    assert!(last_error_message().unwrap().contains("text is null"));

    let empty = CString::new("").unwrap();
    let rc = unsafe { fastembed_generate(empty.as_ptr(), output.as_mut_ptr(), 8) };
    assert_eq!(rc, -1);
    assert_eq!(last_error_message().as_deref(), Some("text is empty"));

    let text = CString::new("hello").unwrap();
    let rc = unsafe { fastembed_generate(text.as_ptr(), output.as_mut_ptr(), 0) };
    assert_eq!(rc, -1);
    let rc = unsafe { fastembed_generate(text.as_ptr(), output.as_mut_ptr(), -4) };
    assert_eq!(rc, -1);
    let rc = unsafe { fastembed_generate(text.as_ptr(), ptr::null_mut(), 8) };
    assert_eq!(rc, -1);

    let too_long = CString::new("a".repeat(8193)).unwrap();
    let rc = unsafe { fastembed_generate(too_long.as_ptr(), output.as_mut_ptr(), 8) };
    assert_eq!(rc, -1);
    assert_eq!(output, vec![0.0; 8]);
}

#[test]
fn test_invalid_utf8_is_rejected() {
    let bytes: &[u8] = b"caf\xe9\0";
    let mut output = vec![0.0f32; 8];
    let rc = unsafe { fastembed_generate(bytes.as_ptr().cast::<c_char>(), output.as_mut_ptr(), 8) };
    assert_eq!(rc, -1);
    assert!(last_error_message().unwrap().contains("UTF-8"));
}

#[test]
fn test_batch_matches_single_calls() {
    let texts = [CString::new("first").unwrap(), CString::new("second").unwrap()];
    let text_ptrs: Vec<*const c_char> = texts.iter().map(|t| t.as_ptr()).collect();
    let mut outputs = vec![vec![0.0f32; 32]; 2];
    let output_ptrs: Vec<*mut f32> = outputs.iter_mut().map(|o| o.as_mut_ptr()).collect();

    let rc = unsafe { fastembed_batch_generate(text_ptrs.as_ptr(), 2, output_ptrs.as_ptr(), 32) };
    assert_eq!(rc, 0);
    assert_eq!(outputs[0], generate("first", 32));
    assert_eq!(outputs[1], generate("second", 32));
}

#[test]
fn test_batch_failure_writes_nothing() {
    let texts = [CString::new("fine").unwrap(), CString::new("").unwrap()];
    let text_ptrs: Vec<*const c_char> = texts.iter().map(|t| t.as_ptr()).collect();
    let mut outputs = vec![vec![0.0f32; 16]; 2];
    let output_ptrs: Vec<*mut f32> = outputs.iter_mut().map(|o| o.as_mut_ptr()).collect();

    let rc = unsafe { fastembed_batch_generate(text_ptrs.as_ptr(), 2, output_ptrs.as_ptr(), 16) };
    assert_eq!(rc, -1);
    assert_eq!(outputs, vec![vec![0.0f32; 16]; 2]);

    let rc = unsafe { fastembed_batch_generate(text_ptrs.as_ptr(), 0, output_ptrs.as_ptr(), 16) };
    assert_eq!(rc, -1);
}

#[test]
fn test_vector_operations() {
    let a = [1.0f32, 2.0, 3.0];
    let b = [4.0f32, 5.0, 6.0];

    let dot = unsafe { fastembed_dot_product(a.as_ptr(), b.as_ptr(), 3) };
    assert_eq!(dot, 32.0);

    let norm = unsafe { fastembed_vector_norm([3.0f32, 4.0].as_ptr(), 2) };
    assert_eq!(norm, 5.0);

    let same = unsafe { fastembed_cosine_similarity(a.as_ptr(), a.as_ptr(), 3) };
    assert!((same - 1.0).abs() < 1e-6);

    let mut sum = [0.0f32; 3];
    unsafe { fastembed_add_vectors(a.as_ptr(), b.as_ptr(), sum.as_mut_ptr(), 3) };
    assert_eq!(sum, [5.0, 7.0, 9.0]);

    let mut v = [3.0f32, 4.0];
    unsafe { fastembed_normalize(v.as_mut_ptr(), 2) };
    let norm = unsafe { fastembed_vector_norm(v.as_ptr(), 2) };
    assert!((norm - 1.0).abs() < 1e-5);

    let mut zero = [0.0f32; 4];
    unsafe { fastembed_normalize(zero.as_mut_ptr(), 4) };
    assert_eq!(zero, [0.0; 4]);
}

#[test]
fn test_vector_operations_return_zero_on_invalid_arguments() {
    let a = [1.0f32, 2.0];
    assert_eq!(unsafe { fastembed_dot_product(a.as_ptr(), ptr::null(), 2) }, 0.0);
    assert!(last_error_message().unwrap().contains("vec2 is null"));
    assert_eq!(unsafe { fastembed_cosine_similarity(a.as_ptr(), a.as_ptr(), 0) }, 0.0);
    assert_eq!(unsafe { fastembed_vector_norm(ptr::null(), 2) }, 0.0);

    let zero = [0.0f32; 2];
    assert_eq!(unsafe { fastembed_cosine_similarity(a.as_ptr(), zero.as_ptr(), 2) }, 0.0);
    assert_eq!(last_error_message(), None);
}

#[test]
fn test_missing_model_fails_to_load() {
    let path = CString::new("/definitely/not/a/model.onnx").unwrap();
    let text = CString::new("hello").unwrap();
    let mut output = vec![0.0f32; 768];

    let rc = unsafe {
        fastembed_onnx_generate(path.as_ptr(), text.as_ptr(), output.as_mut_ptr(), 768)
    };
    assert_eq!(rc, -1);
    assert!(last_error_message().is_some());
    assert_eq!(fastembed_onnx_unload(), 0);
}
