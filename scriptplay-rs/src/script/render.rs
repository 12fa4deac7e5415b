//! Line layout: speaker labels, spacing, and body text.
//!
//! Only the label of the previous line matters for layout.  A speaker who
//! keeps talking is indented instead of relabelled, a change of speaker gets
//! a blank line, and speakers that share the group prefix run together.

use std::borrow::Cow;

use crate::config::Settings;

use super::instruction::Instruction;

/// Label recorded while selection choices are being listed.
pub const SELECTION_LABEL: &str = "SEL";

/// What was rendered last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Speaker {
    /// Nothing yet.
    #[default]
    Nothing,
    /// A text line; the label may be empty.
    Line(String),
    /// A selection choice.
    Selection,
}

impl Speaker {
    pub fn label(&self) -> Option<&str> {
        match self {
            Speaker::Nothing => None,
            Speaker::Line(name) => Some(name),
            Speaker::Selection => Some(SELECTION_LABEL),
        }
    }
}

/// `true` if `text` is marked as not to be rendered at all.
pub fn is_hidden(text: &str, settings: &Settings) -> bool {
    !settings.hidden_marker.is_empty() && text.starts_with(&settings.hidden_marker)
}

/// `true` if the line gets a leading newline and a speaker prefix.
///
/// A bare line break and lines with `param2 = off` are printed as-is.
pub fn is_formatted(inst: &Instruction, settings: &Settings) -> bool {
    inst.text != settings.line_break && inst.param2 != "off"
}

/// Spacing and label to print before a line spoken by `name`.
pub fn speaker_prefix(prev: &Speaker, name: &str, settings: &Settings) -> String {
    let prev = prev.label();
    let indent = " ".repeat(settings.label_width);
    let mut out = String::new();

    if name.is_empty() {
        if prev.is_some_and(|p| !p.is_empty()) {
            out.push('\n');
        }
    } else if prev == Some(name) {
        out.push_str(&indent);
    } else {
        let grouped = prev.is_some_and(|p| in_group(p, settings) && in_group(name, settings));
        if prev.is_some() && !grouped {
            out.push('\n');
        }
        if settings.hidden_speakers.iter().any(|s| s == name) {
            out.push_str(&indent);
        } else {
            out.push_str(name);
        }
    }
    out
}

fn in_group(name: &str, settings: &Settings) -> bool {
    !settings.group_prefix.is_empty() && name.starts_with(&settings.group_prefix)
}

/// Body text with every line-break marker turned into `\n`.
pub fn body_text<'a>(text: &'a str, settings: &Settings) -> Cow<'a, str> {
    if settings.line_break.is_empty() || !text.contains(&settings.line_break) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.replace(&settings.line_break, "\n"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::instruction::Opcode;

    fn prefix(prev: &Speaker, name: &str) -> String {
        speaker_prefix(prev, name, &Settings::default())
    }

    fn line(name: &str) -> Speaker {
        Speaker::Line(name.to_owned())
    }

    #[test]
    fn first_line_has_bare_label() {
        assert_eq!(prefix(&Speaker::Nothing, "Aoi"), "Aoi");
        assert_eq!(prefix(&Speaker::Nothing, ""), "");
    }

    #[test]
    fn same_speaker_is_indented() {
        assert_eq!(prefix(&line("Aoi"), "Aoi"), " ".repeat(11));
    }

    #[test]
    fn new_speaker_gets_blank_line() {
        assert_eq!(prefix(&line("Aoi"), "Mina"), "\nMina");
        assert_eq!(prefix(&line(""), "Mina"), "\nMina");
    }

    #[test]
    fn grouped_speakers_run_together() {
        assert_eq!(prefix(&line("SH_Aoi"), "SH_Mina"), "SH_Mina");
        assert_eq!(prefix(&line("SH_Aoi"), "Mina"), "\nMina");
    }

    #[test]
    fn narration_after_named_line_gets_blank_line() {
        assert_eq!(prefix(&line("Aoi"), ""), "\n");
        assert_eq!(prefix(&line(""), ""), "");
    }

    #[test]
    fn after_selection() {
        assert_eq!(prefix(&Speaker::Selection, "Aoi"), "\nAoi");
        assert_eq!(prefix(&Speaker::Selection, ""), "\n");
    }

    #[test]
    fn hidden_speaker_is_indent() {
        assert_eq!(prefix(&Speaker::Nothing, "行動ログ"), " ".repeat(11));
        assert_eq!(prefix(&line("Aoi"), "行動ログ"), format!("\n{}", " ".repeat(11)));
    }

    #[test]
    fn label_width_setting() {
        let settings = Settings { label_width: 4, ..Settings::default() };
        assert_eq!(speaker_prefix(&line("Aoi"), "Aoi", &settings), "    ");
    }

    #[test]
    fn empty_group_prefix_groups_nothing() {
        let settings = Settings { group_prefix: String::new(), ..Settings::default() };
        assert_eq!(speaker_prefix(&line("SH_Aoi"), "SH_Mina", &settings), "\nSH_Mina");
    }

    #[test]
    fn hidden_marker() {
        let settings = Settings::default();
        assert!(is_hidden("▼ stage direction", &settings));
        assert!(!is_hidden("normal ▼", &settings));
        let none = Settings { hidden_marker: String::new(), ..Settings::default() };
        assert!(!is_hidden("anything", &none));
    }

    #[test]
    fn formatting_toggles() {
        let settings = Settings::default();
        let plain = Instruction::new(Opcode::Text).with_text("hi");
        assert!(is_formatted(&plain, &settings));
        assert!(!is_formatted(&plain.clone().with_param2("off"), &settings));
        assert!(!is_formatted(&Instruction::new(Opcode::Text).with_text("<br>"), &settings));
    }

    #[test]
    fn body_text_converts_line_breaks() {
        let settings = Settings::default();
        assert_eq!(body_text("a<br>b<br>", &settings), "a\nb\n");
        assert!(matches!(body_text("plain", &settings), Cow::Borrowed("plain")));
    }
}
