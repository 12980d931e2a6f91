/// Implements the `Deserialize` derive macro for unit-only "choice" enums.
mod choice;
pub(crate) use self::choice::config_choice;

/// Implements the `impl_deserialize_field!` function-like macro.
mod field;
pub use self::field::impl_deserialize_field;
