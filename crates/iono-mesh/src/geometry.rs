//! Triangle geometry kernel.
//!
//! Pure functions on corner positions: areas, P1 basis gradients and the
//! conductance-tensor contraction used by the element stiffness integral.
//! No mesh state enters here.

/// A point or vector in simulation space.
pub type Vec3 = [f64; 3];

#[inline]
pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn scale(a: &Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
pub fn midpoint(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        0.5 * (a[0] + b[0]),
        0.5 * (a[1] + b[1]),
        0.5 * (a[2] + b[2]),
    ]
}

/// Area of the triangle (a, b, c): half the magnitude of the cross
/// product of two edge vectors. Always >= 0.
pub fn triangle_area(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    let e1 = sub(b, c);
    let e2 = sub(c, a);
    0.5 * norm(&cross(&e1, &e2))
}

/// Surface gradients of the three linear (P1) basis functions over the
/// triangle (a, b, c). `result[i]` is constant over the element, lies in
/// the element plane, and satisfies `lambda_i(corner j) = delta_ij`.
///
/// A degenerate (zero-area) triangle yields all-zero gradients, so a
/// collapsed element contributes nothing to any integral.
pub fn basis_gradients(corners: &[Vec3; 3]) -> [Vec3; 3] {
    let [a, b, c] = corners;
    let area_vec = cross(&sub(b, a), &sub(c, a));
    let two_area = norm(&area_vec);
    if two_area == 0.0 {
        return [[0.0; 3], [0.0; 3], [0.0; 3]];
    }
    let n = scale(&area_vec, 1.0 / two_area);
    let inv = 1.0 / two_area;
    [
        scale(&cross(&n, &sub(c, b)), inv),
        scale(&cross(&n, &sub(a, c)), inv),
        scale(&cross(&n, &sub(b, a)), inv),
    ]
}

/// Apply a row-major 3x3 tensor to a vector.
#[inline]
pub fn tensor_apply(sigma: &[f64; 9], v: &Vec3) -> Vec3 {
    [
        sigma[0] * v[0] + sigma[1] * v[1] + sigma[2] * v[2],
        sigma[3] * v[0] + sigma[4] * v[1] + sigma[5] * v[2],
        sigma[6] * v[0] + sigma[7] * v[1] + sigma[8] * v[2],
    ]
}
