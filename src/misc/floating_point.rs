use nalgebra::RealField;
use num_traits::ToPrimitive;

/// Trait for floating point types (f32, f64)
/// Mainly used to identify the type of the field in nalgebra
pub trait FloatingPoint: RealField + ToPrimitive + Copy {
    /// Bit pattern of the value widened to f64, used for structural hashing.
    /// `-0.0` and `0.0` compare equal, so both map to the same bits.
    fn hash_bits(self) -> u64 {
        if self == Self::zero() {
            0
        } else {
            self.to_f64().map(f64::to_bits).unwrap_or(u64::MAX)
        }
    }
}

impl FloatingPoint for f32 {}
impl FloatingPoint for f64 {}
