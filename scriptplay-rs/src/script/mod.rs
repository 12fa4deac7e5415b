//! Dialogue script execution.
//!
//! A script is a flat list of [`Instruction`]s.  Control flow is expressed
//! with `TAG` markers, `JUMP`, flat `IF`/`ENDIF` skips and multiple-choice
//! `SELECT`s; state is a fixed set of integer flags.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use scriptplay::clock::{StdinLines, TokioClock};
//! use scriptplay::script::{Engine, FlagStore, Program};
//!
//! let program = Program::load("story.json")?;
//! let mut engine = Engine::new(
//!     program,
//!     FlagStore::with_defaults(),
//!     TokioClock::new(5.0),
//!     StdinLines::spawn(false),
//!     std::io::stdout(),
//! )?;
//! engine.run().await?;
//! ```

pub mod cond;
pub mod engine;
pub mod error;
pub mod flags;
pub mod instruction;
pub mod program;
pub mod render;
pub mod select;
pub mod tags;

// Re-exports for convenience.
pub use engine::{Engine, Step};
pub use error::ScriptError;
pub use flags::{FlagOp, FlagStore};
pub use instruction::{Instruction, Opcode};
pub use program::{LoadError, Program};
pub use tags::TagIndex;
