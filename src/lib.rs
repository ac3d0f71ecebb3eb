//! Hive library exports: the core model and the terminal screens.

pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;
