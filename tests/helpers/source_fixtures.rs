//! Common source code fixtures for tests.

// Small declarations
pub const SIMPLE_DECLARATION: &str = "int x;";
pub const CONSTANT_DECLARATION: &str = "constant float scale = 0.5;";
pub const EMPTY_FUNCTION: &str = "void f() {}";

pub const TWO_FUNCTIONS: &str = r#"float first(float x) {
    return x * 2.0;
}

float second(float y) {
    float z = y + 1.0;
    return z;
}
"#;

pub const COMPUTE_KERNEL: &str = r#"#include <metal_stdlib>
using namespace metal;

kernel void add_arrays(device const float* a [[buffer(0)]],
                       device const float* b [[buffer(1)]],
                       device float* result [[buffer(2)]],
                       uint index [[thread_position_in_grid]]) {
    result[index] = a[index] + b[index];
}
"#;

pub const VERTEX_AND_FRAGMENT: &str = r#"struct VertexOut {
    float4 position [[position]];
    float2 uv;
};

vertex VertexOut vs(uint vid [[vertex_id]]) {
    VertexOut out;
    out.position = float4(0.0, 0.0, 0.0, 1.0);
    out.uv = float2(vid, 0);
    return out;
}

fragment float4 fs(VertexOut in [[stage_in]]) {
    return float4(in.uv, 0.0, 1.0);
}
"#;

// Sources that only parse with recovery
pub const MISSING_SEMICOLON: &str = "void f() {\n    x = 1\n}\nint y = 2;\n";
pub const STRAY_PARENS: &str = "int x = 1; ) )\nint y = 2;\nvoid g() {}\n";
pub const UNCLOSED_STRUCT: &str = "struct S {\n    float a;\n\nvoid f() {}\nint z;\n";

/// Every `.metal` file under `tests/fixtures`, sorted by path
pub fn fixture_files() -> Vec<std::path::PathBuf> {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut files: Vec<_> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "metal"))
        .collect();
    files.sort();
    files
}
