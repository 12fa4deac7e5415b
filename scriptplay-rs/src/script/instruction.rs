//! Script instruction records.
//!
//! An [`Instruction`] is one row of the script: an [`Opcode`], the display
//! text, the speaker label, and three opcode-dependent string parameters.
//! Records are deserialized straight from the exported JSON and are never
//! mutated afterwards.

use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

// ── Opcode ────────────────────────────────────────────────────────────────────

/// Instruction discriminant.
///
/// Both the exported `EVENT_PROCESS_*` names and short names are accepted.
/// Anything else is kept as [`Opcode::Unknown`] so that a script with an
/// unsupported instruction still loads; it only fails if execution reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Opcode {
    /// Label marker; target of jumps and selections.
    Tag,
    /// Pause for `param1` milliseconds.
    Wait,
    /// Text line that waits for the reader to press Enter (empty opcode).
    Text,
    /// Text line that advances on its own.
    AutoText,
    /// Print the fixed address literal.
    IpValue,
    /// Skip to the next `ENDIF` unless `param1` holds.
    If,
    EndIf,
    /// Offer `text` as a choice jumping to tag `param1`, guarded by `param2`.
    Select,
    /// Add `param2` to flag `param1`.
    FlagAdd,
    /// Same operation as [`Opcode::FlagAdd`] under a second name.
    FlagValue,
    /// Continue after tag `param1`.
    Jump,
    Unknown(String),
}

impl Opcode {
    /// Canonical exported name.
    pub fn as_str(&self) -> &str {
        match self {
            Opcode::Tag => "EVENT_PROCESS_TAG",
            Opcode::Wait => "EVENT_PROCESS_WAIT",
            Opcode::Text => "",
            Opcode::AutoText => "EVENT_PROCESS_AUTO_PLAY",
            Opcode::IpValue => "EVENT_PROCESS_IP_VALUE",
            Opcode::If => "EVENT_PROCESS_IF",
            Opcode::EndIf => "EVENT_PROCESS_ENDIF",
            Opcode::Select => "EVENT_PROCESS_SEL",
            Opcode::FlagAdd => "EVENT_PROCESS_FLAG_ADD",
            Opcode::FlagValue => "EVENT_PROCESS_FLAG_VALUE",
            Opcode::Jump => "EVENT_PROCESS_JUMP",
            Opcode::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for Opcode {
    fn from(s: &str) -> Self {
        match s {
            "EVENT_PROCESS_TAG" | "TAG" => Opcode::Tag,
            "EVENT_PROCESS_WAIT" | "WAIT" => Opcode::Wait,
            "" => Opcode::Text,
            "EVENT_PROCESS_AUTO_PLAY" | "AUTO-TEXT" => Opcode::AutoText,
            "EVENT_PROCESS_IP_VALUE" | "IP-VALUE" => Opcode::IpValue,
            "EVENT_PROCESS_IF" | "IF" => Opcode::If,
            "EVENT_PROCESS_ENDIF" | "ENDIF" => Opcode::EndIf,
            "EVENT_PROCESS_SEL" | "SELECT" => Opcode::Select,
            "EVENT_PROCESS_FLAG_ADD" | "FLAG-ADD" => Opcode::FlagAdd,
            "EVENT_PROCESS_FLAG_VALUE" | "FLAG-VALUE" => Opcode::FlagValue,
            "EVENT_PROCESS_JUMP" | "JUMP" => Opcode::Jump,
            other => Opcode::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for Opcode {
    fn from(s: String) -> Self {
        Opcode::from(s.as_str())
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Opcode::Text => f.write_str("TEXT"),
            op => f.write_str(op.as_str()),
        }
    }
}

// ── Instruction ───────────────────────────────────────────────────────────────

/// One script record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Instruction {
    #[serde(rename = "process", alias = "opcode")]
    pub opcode: Opcode,
    #[serde(default, deserialize_with = "loose_string")]
    pub text: String,
    /// Speaker label; empty for narration.
    #[serde(rename = "name", alias = "speakerName", default, deserialize_with = "loose_string")]
    pub speaker: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub param1: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub param2: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub param3: String,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            text: String::new(),
            speaker: String::new(),
            param1: String::new(),
            param2: String::new(),
            param3: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = speaker.into();
        self
    }

    pub fn with_param1(mut self, p: impl Into<String>) -> Self {
        self.param1 = p.into();
        self
    }

    pub fn with_param2(mut self, p: impl Into<String>) -> Self {
        self.param2 = p.into();
        self
    }

    pub fn with_param3(mut self, p: impl Into<String>) -> Self {
        self.param3 = p.into();
        self
    }
}

/// Exports mix strings, bare numbers and `null` in the text/param columns.
/// Numbers keep their JSON spelling; `null` becomes the empty string.
fn loose_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Option::<Json>::deserialize(d)? {
        None | Some(Json::Null) => Ok(String::new()),
        Some(Json::String(s)) => Ok(s),
        Some(Json::Number(n)) => Ok(n.to_string()),
        Some(Json::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_exported_names() {
        assert_eq!(Opcode::from("EVENT_PROCESS_SEL"), Opcode::Select);
        assert_eq!(Opcode::from("EVENT_PROCESS_AUTO_PLAY"), Opcode::AutoText);
        assert_eq!(Opcode::from(""), Opcode::Text);
    }

    #[test]
    fn opcode_short_names() {
        assert_eq!(Opcode::from("FLAG-VALUE"), Opcode::FlagValue);
        assert_eq!(Opcode::from("IP-VALUE"), Opcode::IpValue);
    }

    #[test]
    fn opcode_unknown_is_kept() {
        assert_eq!(
            Opcode::from("EVENT_PROCESS_MOVIE"),
            Opcode::Unknown("EVENT_PROCESS_MOVIE".into())
        );
        assert_eq!(Opcode::from("EVENT_PROCESS_MOVIE").as_str(), "EVENT_PROCESS_MOVIE");
    }

    #[test]
    fn deserialize_full_record() {
        let inst: Instruction = serde_json::from_str(
            r##"{"process":"","text":"Hello<br>there","name":"SH_Aoi",
                "param1":"30","param2":"","param3":"#ff8800"}"##,
        )
        .unwrap();
        assert_eq!(inst.opcode, Opcode::Text);
        assert_eq!(inst.speaker, "SH_Aoi");
        assert_eq!(inst.param1, "30");
        assert_eq!(inst.param3, "#ff8800");
    }

    #[test]
    fn deserialize_missing_and_null_fields() {
        let inst: Instruction =
            serde_json::from_str(r#"{"process":"EVENT_PROCESS_TAG","param1":"start","param2":null}"#)
                .unwrap();
        assert_eq!(inst, Instruction::new(Opcode::Tag).with_param1("start"));
    }

    #[test]
    fn deserialize_numeric_param() {
        let inst: Instruction =
            serde_json::from_str(r#"{"opcode":"WAIT","param1":250}"#).unwrap();
        assert_eq!(inst.opcode, Opcode::Wait);
        assert_eq!(inst.param1, "250");
    }

    #[test]
    fn deserialize_speaker_alias() {
        let inst: Instruction =
            serde_json::from_str(r#"{"opcode":"AUTO-TEXT","speakerName":"Mina"}"#).unwrap();
        assert_eq!(inst.speaker, "Mina");
    }

    #[test]
    fn deserialize_rejects_object_param() {
        let res: Result<Instruction, _> =
            serde_json::from_str(r#"{"process":"","param1":{"a":1}}"#);
        assert!(res.is_err());
    }

    #[test]
    fn deserialize_requires_opcode() {
        let res: Result<Instruction, _> = serde_json::from_str(r#"{"text":"orphan"}"#);
        assert!(res.is_err());
    }
}
