/// The macro-input grammar for `impl_deserialize_field!`.
mod input;

/// Implements the `impl_deserialize_field!` function-like macro.
mod generator;
pub use self::generator::impl_deserialize_field;
