//! Tag index: label → program position.
//!
//! Built by a single forward scan before anything executes, so a jump may
//! name a tag declared later in the script.

use std::collections::HashMap;

use super::error::{Result, ScriptError};
use super::instruction::Opcode;
use super::program::Program;

#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    positions: HashMap<String, usize>,
}

impl TagIndex {
    /// Record every `TAG` instruction's `param1`.  A label declared twice is
    /// an error.
    pub fn build(program: &Program) -> Result<Self> {
        let mut positions = HashMap::new();
        for (pc, inst) in program.iter().enumerate() {
            if inst.opcode != Opcode::Tag {
                continue;
            }
            if positions.insert(inst.param1.clone(), pc).is_some() {
                return Err(ScriptError::DuplicateTag(inst.param1.clone()).at(pc));
            }
        }
        Ok(Self { positions })
    }

    /// Position of the `TAG` instruction declaring `label`.
    pub fn resolve(&self, label: &str) -> Result<usize> {
        self.get(label)
            .ok_or_else(|| ScriptError::UndefinedTag(label.to_owned()))
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
