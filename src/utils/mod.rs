//! Shared helpers: input validation and, under test, sequence simulation.

#[cfg(test)]
pub mod simulate;
pub mod validation;
