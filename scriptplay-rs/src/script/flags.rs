//! Flag store: the script's named integer registers.
//!
//! The set of names is fixed when the store is created.  Scripts may read and
//! modify existing flags but never create new ones; an unknown name is an
//! error rather than an implicit zero.

use std::collections::BTreeMap;

use super::error::{Result, ScriptError};

/// Flags declared when neither the config file nor the command line names any.
pub const DEFAULT_FLAGS: [&str; 10] = [
    "ef_flag_00",
    "ef_flag_01",
    "ef_flag_02",
    "ef_flag_03",
    "ef_flag_04",
    "ef_flag_05",
    "ef_flag_06",
    "ef_flag_07",
    "ef_flag_08",
    "ef_flag_09",
];

/// A mutation applied to one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOp {
    Add(i64),
    Subtract(i64),
    Set(i64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagStore {
    values: BTreeMap<String, i64>,
}

impl FlagStore {
    /// Declare `names`, each starting at 0.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: names.into_iter().map(|n| (n.into(), 0)).collect(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_FLAGS)
    }

    pub fn get(&self, name: &str) -> Result<i64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ScriptError::UndefinedVariable(name.to_owned()))
    }

    /// Apply `op` to `name`.  Arithmetic wraps; there is no clamping.
    pub fn apply(&mut self, name: &str, op: FlagOp) -> Result<()> {
        let value = self
            .values
            .get_mut(name)
            .ok_or_else(|| ScriptError::UndefinedVariable(name.to_owned()))?;
        *value = match op {
            FlagOp::Add(n) => value.wrapping_add(n),
            FlagOp::Subtract(n) => value.wrapping_sub(n),
            FlagOp::Set(n) => n,
        };
        Ok(())
    }

    /// Iterate over all flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
