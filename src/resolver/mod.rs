//! Module resolution.
//!
//! Runs between parsing and inference. `use` statements are replaced by the parsed
//! module they name, with the module's top-level declarations renamed under its
//! namespace so the later passes see one flat root scope.

pub mod resolver;

#[cfg(test)]
mod tests;
