//! CPU reference of the plane's fragment lighting.
//!
//! The WGSL fragment stage computes the same thing; keeping a CPU copy lets
//! the exact output be asserted without a GPU.

pub const OBJECT_COLOR: [f32; 3] = [0.5, 0.7, 0.2];
pub const LIGHT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

#[inline]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Normalizes `v`; the zero vector stays zero instead of becoming NaN.
pub fn safe_normalize(v: [f32; 3]) -> [f32; 3] {
    let len = dot(v, v).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0; 3]
    }
}

/// Lambert term `max(dot(normalize(normal), -light_dir), 0)`.
///
/// `light_dir` points from the light and is used as given, without
/// normalization.
pub fn diffuse(normal: [f32; 3], light_dir: [f32; 3]) -> f32 {
    let n = safe_normalize(normal);
    dot(n, [-light_dir[0], -light_dir[1], -light_dir[2]]).max(0.0)
}

/// Final RGBA of a fragment with `normal` lit from `light_dir`.
pub fn shade(normal: [f32; 3], light_dir: [f32; 3]) -> [f32; 4] {
    let d = diffuse(normal, light_dir);
    let c = |i: usize| (LIGHT_COLOR[i] * d + OBJECT_COLOR[i]) * 0.5;
    [c(0), c(1), c(2), 1.0]
}
