//! Console player for branching dialogue scripts.

pub mod cli;
pub mod clock;
pub mod config;
pub mod script;
pub mod terminal;
