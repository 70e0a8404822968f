//! WASM bindings for the RTML compiler.
//!
//! Exposes `compile()` to JavaScript via wasm-bindgen. Returns a JS object
//! `{ html }` or throws on error; `compile_expr()` backs the playground's
//! expression inspector.

use wasm_bindgen::prelude::*;

/// Compile RTML source to markup plus its reactive script block.
///
/// Returns a JS object with `{ html: string }`.
/// Throws a JS error if parsing fails.
#[wasm_bindgen]
pub fn compile(source: &str) -> Result<JsValue, JsError> {
    let output =
        rtml_codegen::compile("<wasm>", source).map_err(|e| JsError::new(&e.to_string()))?;

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"html".into(), &output.into())
        .map_err(|_| JsError::new("Failed to set html property"))?;

    Ok(js_obj.into())
}

/// Compile a single expression to its plain or reactive script form.
#[wasm_bindgen]
pub fn compile_expr(source: &str, reactive: bool) -> Result<String, JsError> {
    rtml_codegen::expr_to_script(source, reactive).map_err(|e| JsError::new(&e.to_string()))
}

/// Get the compiler version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Native tests (non-WASM) — verify the compile pipeline works
    // =========================================================================

    fn native_compile(source: &str) -> String {
        rtml_codegen::compile("/test", source).unwrap()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(native_compile(""), "");
    }

    #[test]
    fn test_static_html() {
        let output = native_compile("<div><span>Hello</span></div>");
        assert_eq!(output, "<div><span>Hello</span></div>");
    }

    #[test]
    fn test_interpolation_emits_mount() {
        let output = native_compile("Hi {name}");
        assert!(output.contains("<span id=\"rtElt1\">"));
        assert!(output.contains("rtml.mount(rtElt1,name);"));
    }

    #[test]
    fn test_parse_error_surfaces() {
        let result = rtml_codegen::compile("/test", "{a ? 1}");
        assert!(result.is_err());
    }

    #[test]
    fn test_multiple_compiles_do_not_interfere() {
        let out1 = native_compile("{x}");
        let out2 = native_compile("{y}");
        assert!(out1.contains("rtml.mount(rtElt1,x);"));
        assert!(out2.contains("rtml.mount(rtElt1,y);"));
        assert!(!out2.contains("rtElt2"));
    }

    #[test]
    fn test_expr_entry() {
        assert_eq!(
            rtml_codegen::expr_to_script("a+b*c", true).unwrap(),
            "rtml.plus(a,rtml.mul(b,c))"
        );
    }

    #[test]
    fn test_output_has_no_eval() {
        let output = native_compile("<button onclick={count=count+1}>Go</button>");
        assert!(!output.contains("eval("));
        assert!(!output.contains("new Function("));
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
        assert!(v.contains('.'));
    }
}
