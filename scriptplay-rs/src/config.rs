//! Player configuration file parser.
//!
//! Line-oriented, one directive per line:
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `/set <key>=<value>` or `/set <key> <value>` | change a [`Settings`] field |
//! | `/flag <name>…` | declare flags (replaces the default schema) |
//! | `/hide <speaker>…` | render these speakers as a blank indent |
//! | Lines starting with `;` | comment, ignored |
//! | Any other `/command` | silently skipped |

use std::path::Path;

use crate::script::flags::FlagStore;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug)]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Presentation settings read by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Printed after the last instruction; empty prints nothing.
    pub end_message: String,
    /// Literal emitted by `IP-VALUE`.
    pub ip_value: String,
    pub select_prompt: String,
    /// Banner printed before re-listing the choices after a bad answer.
    pub select_error: String,
    /// Width of the indent that replaces a repeated speaker label.
    pub label_width: usize,
    /// Consecutive speakers sharing this prefix are not separated by a blank line.
    pub group_prefix: String,
    /// Speakers shown as an indent instead of their label.
    pub hidden_speakers: Vec<String>,
    /// Lines whose text starts with this are not rendered.
    pub hidden_marker: String,
    /// In-text line-break marker.
    pub line_break: String,
    /// Floor for every timed delay, in milliseconds.
    pub min_delay_ms: f64,
    /// Keep lines typed while nothing is waiting for input.
    pub typeahead: bool,
    /// Skip all timed delays.
    pub instant: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            end_message: "== GAME ENDED: Interpreter by Lipsum ==".to_owned(),
            ip_value: "127.0.0.1".to_owned(),
            select_prompt: "Select No. = ".to_owned(),
            select_error: "ID_TNK_PROCESS_ERROR.".to_owned(),
            label_width: 11,
            group_prefix: "SH_".to_owned(),
            hidden_speakers: vec!["行動ログ".to_owned()],
            hidden_marker: "▼".to_owned(),
            line_break: "<br>".to_owned(),
            min_delay_ms: 5.0,
            typeahead: false,
            instant: false,
        }
    }
}

impl Settings {
    /// Assign one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "end_message" => self.end_message = value.to_owned(),
            "ip_value" => self.ip_value = value.to_owned(),
            "select_prompt" => self.select_prompt = value.to_owned(),
            "select_error" => self.select_error = value.to_owned(),
            "group_prefix" => self.group_prefix = value.to_owned(),
            "hidden_marker" => self.hidden_marker = value.to_owned(),
            "line_break" => self.line_break = value.to_owned(),
            "label_width" => {
                self.label_width = value
                    .parse()
                    .map_err(|_| format!("/set: label_width must be a count, got '{value}'"))?;
            }
            "min_delay_ms" => {
                self.min_delay_ms = match value.parse::<f64>() {
                    Ok(v) if v.is_finite() && v >= 0.0 => v,
                    _ => return Err(format!("/set: min_delay_ms must be >= 0, got '{value}'")),
                };
            }
            "typeahead" => self.typeahead = parse_bool(key, value)?,
            "instant" => self.instant = parse_bool(key, value)?,
            _ => return Err(format!("/set: unknown setting '{key}'")),
        }
        Ok(())
    }
}

/// Parsed configuration: settings plus the declared flag names.
#[derive(Debug, Default)]
pub struct Config {
    pub settings: Settings,
    /// Declared flags; empty means the default schema.
    pub flags: Vec<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config string.
    ///
    /// Unknown directives are skipped.  Returns the config and a list of any
    /// errors on recognised lines; those lines leave the config unchanged.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            let Some(rest) = line.strip_prefix('/') else { continue };

            let (cmd, args_str) = rest
                .split_once(|c: char| c.is_ascii_whitespace())
                .unwrap_or((rest, ""));
            let tokens = split_args(args_str.trim());

            let result = match cmd {
                "set" => parse_set(&tokens, &mut config.settings),
                "flag" => add_names("/flag", tokens, &mut config.flags),
                "hide" => add_names("/hide", tokens, &mut config.settings.hidden_speakers),
                _ => Ok(()),
            };
            if let Err(message) = result {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// A fresh flag store for the declared schema.
    pub fn flag_store(&self) -> FlagStore {
        if self.flags.is_empty() {
            FlagStore::with_defaults()
        } else {
            FlagStore::new(self.flags.iter().cloned())
        }
    }
}

// ── Argument tokenizer ────────────────────────────────────────────────────────

/// Split `s` into whitespace-delimited tokens, honouring double-quoted strings
/// and `\"` escapes within them.
fn split_args(s: &str) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if !in_quotes => {
                in_quotes = true;
                quoted = true;
            }
            '"' if in_quotes => in_quotes = false,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    cur.push(escaped);
                }
            }
            c if c.is_ascii_whitespace() && !in_quotes => {
                if !cur.is_empty() || quoted {
                    args.push(std::mem::take(&mut cur));
                    quoted = false;
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() || quoted {
        args.push(cur);
    }
    args
}

// ── Directives ────────────────────────────────────────────────────────────────

/// Parse `/set <key>=<value>` or `/set <key> <value>`.
fn parse_set(tokens: &[String], settings: &mut Settings) -> Result<(), String> {
    if tokens.is_empty() {
        return Err("/set: requires an argument".into());
    }

    let (key, value) = if let Some(eq) = tokens[0].find('=') {
        let mut value = tokens[0][eq + 1..].to_owned();
        // `/set end_message=Thanks for playing` keeps the trailing words.
        for extra in &tokens[1..] {
            value.push(' ');
            value.push_str(extra);
        }
        (tokens[0][..eq].to_owned(), value)
    } else if tokens.len() >= 2 {
        (tokens[0].clone(), tokens[1..].join(" "))
    } else {
        return Err(format!("/set: missing value for '{}'", tokens[0]));
    };

    if key.is_empty() {
        return Err("/set: setting name cannot be empty".into());
    }

    settings.set(&key, &value)
}

fn add_names(cmd: &str, tokens: Vec<String>, into: &mut Vec<String>) -> Result<(), String> {
    if tokens.is_empty() {
        return Err(format!("{cmd}: requires at least one name"));
    }
    for name in tokens {
        if !into.contains(&name) {
            into.push(name);
        }
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "yes" | "true" => Ok(true),
        "0" | "off" | "no" | "false" => Ok(false),
        _ => Err(format!("/set: {key} must be on or off, got '{value}'")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // -- split_args -----------------------------------------------------------

    #[test]
    fn defaults_are_the_player_strings() {
        let s = Settings::default();
        assert_eq!(s.end_message, "== GAME ENDED: Interpreter by Lipsum ==");
        assert_eq!(s.select_prompt, "Select No. = ");
        assert_eq!(s.select_error, "ID_TNK_PROCESS_ERROR.");
        assert_eq!(s.ip_value, "127.0.0.1");
        assert_eq!(s.label_width, 11);
        assert_eq!(s.min_delay_ms, 5.0);
    }

    #[test]
    fn split_simple() {
        assert_eq!(split_args("foo bar baz"), ["foo", "bar", "baz"]);
    }

    #[test]
    fn split_quoted_spaces() {
        assert_eq!(split_args(r#""Select No. = " x"#), ["Select No. = ", "x"]);
    }

    #[test]
    fn split_escaped_quote_inside_quotes() {
        assert_eq!(split_args(r#""say \"hi\"""#), [r#"say "hi""#]);
    }

    #[test]
    fn split_empty_quotes_is_a_token() {
        assert_eq!(split_args(r#"group_prefix """#), ["group_prefix", ""]);
    }

    // -- /set -----------------------------------------------------------------

    #[test]
    fn set_equals_syntax() {
        let (cfg, errs) = Config::load_str("/set label_width=8");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.settings.label_width, 8);
    }

    #[test]
    fn set_space_syntax_keeps_words() {
        let (cfg, errs) = Config::load_str("/set end_message == THE END ==");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.settings.end_message, "== THE END ==");
    }

    #[test]
    fn set_quoted_prompt_keeps_trailing_space() {
        let (cfg, errs) = Config::load_str(r#"/set select_prompt "Choice? ""#);
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.settings.select_prompt, "Choice? ");
    }

    #[test]
    fn set_bool_settings() {
        let (cfg, errs) = Config::load_str("/set typeahead=on\n/set instant yes");
        assert!(errs.is_empty(), "{errs:?}");
        assert!(cfg.settings.typeahead);
        assert!(cfg.settings.instant);
    }

    #[test]
    fn set_unknown_key_is_error() {
        let (cfg, errs) = Config::load_str("/set colour=red");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].line, 1);
        assert_eq!(cfg.settings, Settings::default());
    }

    #[test]
    fn set_bad_number_is_error() {
        let (cfg, errs) = Config::load_str("\n/set min_delay_ms=-3");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].line, 2);
        assert_eq!(cfg.settings.min_delay_ms, 5.0);
    }

    // -- /flag and /hide ------------------------------------------------------

    #[test]
    fn flag_declares_schema() {
        let (cfg, errs) = Config::load_str("/flag route love\n/flag love trust");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.flags, ["route", "love", "trust"]);
        let store = cfg.flag_store();
        assert_eq!(store.len(), 3);
        assert!(store.get("ef_flag_00").is_err());
    }

    #[test]
    fn no_flags_means_default_schema() {
        let (cfg, _) = Config::load_str("/set instant=off");
        assert_eq!(cfg.flag_store(), FlagStore::with_defaults());
    }

    #[test]
    fn flag_without_names_is_error() {
        let (_, errs) = Config::load_str("/flag");
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn hide_extends_defaults() {
        let (cfg, errs) = Config::load_str("/hide Narrator");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.settings.hidden_speakers, ["行動ログ", "Narrator"]);
    }

    // -- Comments & skipping --------------------------------------------------

    #[test]
    fn comments_blank_and_unknown_lines_skipped() {
        let src = "\
;; player config\n\
\n\
/bind ^X = /quit\n\
plain text line\n\
/set ip_value=10.0.0.7\n\
";
        let (cfg, errs) = Config::load_str(src);
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.settings.ip_value, "10.0.0.7");
    }

    #[test]
    fn load_file_reads_disk() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "/flag a b").unwrap();
        let (cfg, errs) = Config::load_file(f.path()).unwrap();
        assert!(errs.is_empty());
        assert_eq!(cfg.flags, ["a", "b"]);
    }
}
