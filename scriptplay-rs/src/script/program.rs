//! The loaded script.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::instruction::{Instruction, Opcode};

/// Failure to read or decode a script file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An ordered, immutable instruction sequence.
///
/// Cloning is cheap: the instructions are shared.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Arc<[Instruction]>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions: instructions.into() }
    }

    /// Decode a JSON array of instruction records.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        let instructions: Vec<Instruction> = serde_json::from_str(s)?;
        Ok(Self::new(instructions))
    }

    /// Read and decode a script file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| LoadError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Position of the first instruction at or after `start` with `opcode`.
    pub fn find_from(&self, start: usize, opcode: &Opcode) -> Option<usize> {
        self.instructions
            .get(start..)?
            .iter()
            .position(|inst| &inst.opcode == opcode)
            .map(|offset| start + offset)
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_json_array() {
        let p = Program::from_json_str(
            r#"[{"process":"EVENT_PROCESS_TAG","param1":"a"},
                {"process":"","text":"hi"},
                {"process":"EVENT_PROCESS_JUMP","param1":"a"}]"#,
        )
        .unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.get(1).unwrap().text, "hi");
        assert_eq!(p.get(2).unwrap().opcode, Opcode::Jump);
    }

    #[test]
    fn empty_array_is_empty_program() {
        let p = Program::from_json_str("[]").unwrap();
        assert!(p.is_empty());
        assert!(p.get(0).is_none());
    }

    #[test]
    fn find_from_is_inclusive() {
        let p: Program = [Opcode::If, Opcode::EndIf, Opcode::Tag, Opcode::EndIf]
            .into_iter()
            .map(Instruction::new)
            .collect();
        assert_eq!(p.find_from(0, &Opcode::EndIf), Some(1));
        assert_eq!(p.find_from(1, &Opcode::EndIf), Some(1));
        assert_eq!(p.find_from(2, &Opcode::EndIf), Some(3));
        assert_eq!(p.find_from(4, &Opcode::EndIf), None);
        assert_eq!(p.find_from(9, &Opcode::EndIf), None);
    }

    #[test]
    fn load_reports_path_on_bad_json() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{{not json").unwrap();
        let err = Program::load(f.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert!(err.to_string().contains(&f.path().display().to_string()));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Program::load("/nonexistent/script.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
