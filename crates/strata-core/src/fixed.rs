use fixed::types::{I16F16, I32F32};

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Q16.16 fixed-point for compact storage (tool speed multipliers, etc.).
pub type Fixed32 = I16F16;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only at catalog-load time, never in the
/// sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in the sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Convert an f64 chance into a Fixed64 probability clamped to [0, 1].
/// Catalog files carry chances as plain decimals; everything downstream
/// works in fixed point.
#[inline]
pub fn probability(v: f64) -> Fixed64 {
    Fixed64::from_num(v.clamp(0.0, 1.0))
}
