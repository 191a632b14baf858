//! Numeric code generation

use rand::{rngs::OsRng, Rng};

/// Produces fixed-length numeric codes
///
/// `length` is validated by configuration (4 to 8 digits) before it gets
/// here, so implementations have no error path.
pub trait CodeGenerator: Send + Sync {
    /// Generate a code of exactly `length` decimal digits
    fn generate(&self, length: usize) -> String;
}

/// Code generator backed by the operating system CSPRNG
///
/// Every digit is drawn independently and uniformly from `0..=9`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureCodeGenerator;

impl CodeGenerator for SecureCodeGenerator {
    fn generate(&self, length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}
