//! Fatal script errors.
//!
//! Every variant except [`ScriptError::InputClosed`] and
//! [`ScriptError::Io`] is an authoring defect in the script itself.  None of
//! them are recoverable: the engine stops at the failing instruction and the
//! error is reported with its position.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScriptError>;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("tag already defined: {0}")]
    DuplicateTag(String),

    #[error("undefined tag {0}")]
    UndefinedTag(String),

    #[error("undefined flag {0}")]
    UndefinedVariable(String),

    #[error("invalid compare operation {0}")]
    UnsupportedOperator(String),

    #[error("unhandled opcode {0:?}")]
    UnknownOpcode(String),

    #[error("malformed number {0:?}")]
    MalformedNumber(String),

    #[error("malformed condition {0:?}: expected `<flag> <op> <value>`")]
    MalformedCondition(String),

    #[error("invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),

    #[error("input closed while waiting for a line")]
    InputClosed,

    #[error("console: {0}")]
    Io(#[from] std::io::Error),

    #[error("instruction {pc}: {source}")]
    At {
        pc: usize,
        #[source]
        source: Box<ScriptError>,
    },
}

impl ScriptError {
    /// Attach the program position of the failing instruction.
    pub fn at(self, pc: usize) -> Self {
        match self {
            e @ ScriptError::At { .. } => e,
            e => ScriptError::At { pc, source: Box::new(e) },
        }
    }

    /// The underlying error, with any position wrapper removed.
    pub fn root(&self) -> &ScriptError {
        match self {
            ScriptError::At { source, .. } => source.root(),
            e => e,
        }
    }

    /// Program position recorded by [`ScriptError::at`], if any.
    pub fn pc(&self) -> Option<usize> {
        match self {
            ScriptError::At { pc, .. } => Some(*pc),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
