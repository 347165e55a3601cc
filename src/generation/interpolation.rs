//! Easing and interpolation primitives shared by every shape generator.
//!
//! All functions are pure. Callers pass `t` in [0, 1]; values outside that
//! range follow the polynomial rather than being rejected.

/// Easing curve used by [`blend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Smoothstep, 3t² - 2t³
    Cubic,
    /// Smootherstep, 6t⁵ - 15t⁴ + 10t³
    Quintic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::Cubic => cubic_ease(t),
            Easing::Quintic => quintic_ease(t),
        }
    }
}

#[inline]
pub fn cubic_ease(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn quintic_ease(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Scalar cubic Bézier
#[inline]
pub fn bezier_cubic(t: f64, p0: f64, p1: f64, p2: f64, p3: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// `a * (1 - ease(t)) + b * ease(t)`
#[inline]
pub fn blend(t: f64, a: f64, b: f64, easing: Easing) -> f64 {
    let e = easing.apply(t);
    a * (1.0 - e) + b * e
}
