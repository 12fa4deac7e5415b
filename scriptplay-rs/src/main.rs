use std::io;

use scriptplay::cli::{self, ConfigFile, USAGE};
use scriptplay::clock::{StdinLines, TokioClock};
use scriptplay::config::Config;
use scriptplay::script::{Engine, FlagStore, Program};
use scriptplay::terminal::{echo_control, EchoControl, NoEcho};
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("scriptplay: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    init_logging(args.debug);

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = match args.config {
        ConfigFile::Skip => None,
        ConfigFile::Explicit(ref path) => Some(path.clone()),
        ConfigFile::Search => cli::find_user_config(),
    };
    let mut config = Config::new();
    if let Some(path) = config_path {
        match Config::load_file(&path) {
            Ok((loaded, errors)) => {
                for e in errors {
                    tracing::warn!(file = %path.display(), "{e}");
                }
                config = loaded;
            }
            Err(e) => {
                eprintln!("scriptplay: {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    let mut settings = config.settings.clone();
    settings.instant |= args.instant;
    settings.typeahead |= args.typeahead;
    if args.quiet {
        settings.end_message.clear();
    }
    let flags = match args.flags {
        Some(ref names) => FlagStore::new(names.iter().cloned()),
        None => config.flag_store(),
    };

    // ── Script ────────────────────────────────────────────────────────────────
    let program = match Program::load(&args.script) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("scriptplay: {e}");
            std::process::exit(1);
        }
    };

    // ── Run ───────────────────────────────────────────────────────────────────
    let mut stdout = io::stdout();
    let echo: Box<dyn EchoControl> = if args.no_echo {
        Box::new(NoEcho)
    } else {
        echo_control(&mut stdout)
    };
    let clock = if settings.instant {
        TokioClock::instant()
    } else {
        TokioClock::new(settings.min_delay_ms)
    };
    let input = StdinLines::spawn(settings.typeahead);

    let mut engine = match Engine::new(program, flags, clock, input, stdout) {
        Ok(e) => e.with_settings(settings).with_echo(echo),
        Err(e) => {
            eprintln!("scriptplay: {}: {e}", args.script.display());
            std::process::exit(1);
        }
    };

    let result = tokio::select! {
        r = engine.run() => Some(r),
        _ = tokio::signal::ctrl_c() => None,
    };
    // Restores the terminal mode before exiting.
    drop(engine);

    match result {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            eprintln!("scriptplay: {e}");
            std::process::exit(1);
        }
        None => std::process::exit(EXIT_INTERRUPTED),
    }
}

/// Log to stderr.  `RUST_LOG` overrides the default filter.
fn init_logging(debug: bool) {
    let default = if debug { "scriptplay=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
