//! Command-line argument parsing.
//!
//! Usage:
//!   scriptplay [-f[<file>]] [-F<flag,…>] [-intqd] <script.json>

use std::path::PathBuf;

use directories::ProjectDirs;

pub const USAGE: &str = "Usage: scriptplay [-f[<file>]] [-F<flag,...>] [-intqd] <script.json>";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Script to play.
    pub script: PathBuf,
    /// Config-file specification.
    pub config: ConfigFile,
    /// Flag schema override (`-F<a,b,…>`).
    pub flags: Option<Vec<String>>,
    /// No timed delays (`-i`).
    pub instant: bool,
    /// Leave terminal echo alone (`-n`).
    pub no_echo: bool,
    /// Keep lines typed ahead of a prompt (`-t`).
    pub typeahead: bool,
    /// Suppress the end message (`-q`).
    pub quiet: bool,
    /// Debug logging (`-d`).
    pub debug: bool,
}

/// How to choose the config file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// Search the user config dir, then `./.scriptplayrc` (default).
    #[default]
    Search,
    /// `-f` with no file argument: skip config.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'i' => args.instant = true,
                'n' => args.no_echo = true,
                't' => args.typeahead = true,
                'q' => args.quiet = true,
                'd' => args.debug = true,

                // -f[<file>]: the file must be attached.
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -F<a,b,…>
                'F' => {
                    let list = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-F requires a flag list".to_owned());
                    };
                    let names: Vec<String> = list
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                        .collect();
                    if names.is_empty() {
                        return Err("-F requires at least one flag name".to_owned());
                    }
                    args.flags = Some(names);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    match positional.len() {
        0 => return Err("missing script file".to_owned()),
        1 => args.script = PathBuf::from(positional.remove(0)),
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the user config file in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_user_config() -> Option<PathBuf> {
    let user = ProjectDirs::from("", "", "scriptplay").map(|d| d.config_dir().join("config"));
    user.into_iter()
        .chain([PathBuf::from("./.scriptplayrc")])
        .find(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
