//! Pending selection choices.

/// One offered choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
    /// Tag to continue after when chosen.
    pub tag: String,
}

/// Choices accumulated from consecutive `SELECT` instructions, waiting to be
/// presented.  Numbering is 1-based in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SelectionBuffer {
    choices: Vec<Choice>,
}

impl SelectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a choice and return its number.
    pub fn push(&mut self, text: impl Into<String>, tag: impl Into<String>) -> usize {
        self.choices.push(Choice { text: text.into(), tag: tag.into() });
        self.choices.len()
    }

    /// The choice picked by a (trimmed) answer, if it names one.
    ///
    /// Only the leading integer counts: `"2abc"` and `"2 please"` pick
    /// choice 2, `"1.5"` picks choice 1.
    pub fn choose(&self, answer: &str) -> Option<&Choice> {
        let n = leading_int(answer)?;
        let index = usize::try_from(n.checked_sub(1)?).ok()?;
        self.choices.get(index)
    }

    /// Every choice as it is listed on screen, `\n  <n>.<text>`.
    pub fn listing(&self) -> String {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, c)| format_choice(i + 1, &c.text))
            .collect()
    }

    pub fn clear(&mut self) {
        self.choices.clear();
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

pub fn format_choice(number: usize, text: &str) -> String {
    format!("\n  {number}.{text}")
}

/// The optionally signed run of ASCII digits at the start of `s`.
fn leading_int(s: &str) -> Option<i64> {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let end = s.len() - unsigned.len() + digits;
    s[..end].parse().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
