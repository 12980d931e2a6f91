/// Renders a [`syn::Error`] as a `compile_error!` invocation appended to the
/// original item, so IDEs still see a valid item to analyze.
mod error;
pub use self::error::HelpRenderWithTokens;

/// Shared attribute-argument parsing helpers.
mod parse;
pub use self::parse::{parse_valid_args, parse_valid_item, require_empty_args, Args};
