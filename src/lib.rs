#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
use pyo3::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod ast;
pub mod compiler;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod semantic;
pub mod tree;
pub mod types;

pub use ast::{Token, TokenId, TokenKind};
pub use compiler::{compile, CompileOptions, Compiler, Screenplay};
pub use error::{BuildError, Error, LexError, Result, Rule, SemanticError, StructuralError};
pub use grammar::validate_nesting;
pub use parser::lex;
pub use semantic::validate_semantics;
pub use tree::{Node, SyntaxTree};
pub use types::{NodeOutput, ScreenplayOutput};

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pyfunction]
fn compile_text(text: String) -> PyResult<String> {
    let screenplay = compiler::compile(&text)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

    screenplay
        .to_json()
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn compile_text_wasm(text: &str) -> std::result::Result<String, JsValue> {
    let screenplay = compiler::compile(text).map_err(|e| JsValue::from_str(&e.to_string()))?;

    screenplay
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn compile_text_with_options_wasm(
    text: &str,
    check_semantics: bool,
    uppercase_cast: bool,
) -> std::result::Result<String, JsValue> {
    let compiler = compiler::Compiler::with_options(compiler::CompileOptions {
        check_semantics,
        uppercase_cast,
    });
    let screenplay = compiler
        .compile(text)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    screenplay
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pymodule]
fn guion_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compile_text, m)?)?;
    Ok(())
}
