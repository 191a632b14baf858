//! Common utility functions

pub mod mask;

pub use mask::mask_identifier;
