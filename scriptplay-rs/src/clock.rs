//! The engine's two ways of pausing: a timed delay and waiting for a line of
//! input.
//!
//! The engine only sees the [`Clock`] and [`LineSource`] traits.  The binary
//! plugs in [`TokioClock`] and [`StdinLines`]; tests plug in fakes that
//! record delays and replay canned answers.

use std::time::Duration;

use tokio::sync::mpsc;

/// Timed delay.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Resume after at least `ms` milliseconds (subject to the clock's floor).
    async fn sleep(&mut self, ms: f64);
}

/// Line-of-input wait.
#[allow(async_fn_in_trait)]
pub trait LineSource {
    /// Resume when the next line arrives.  `None` means no line ever will.
    async fn read_line(&mut self) -> Option<String>;
}

// ── TokioClock ────────────────────────────────────────────────────────────────

/// Real-time delays on the tokio timer.
#[derive(Debug, Clone)]
pub struct TokioClock {
    floor_ms: f64,
    instant: bool,
}

impl TokioClock {
    /// Every delay lasts at least `min_delay_ms`, so a zero or negative
    /// request never degenerates into a busy loop.
    pub fn new(min_delay_ms: f64) -> Self {
        Self { floor_ms: min_delay_ms.max(0.0), instant: false }
    }

    /// A clock that never waits.
    pub fn instant() -> Self {
        Self { floor_ms: 0.0, instant: true }
    }

    /// The duration actually slept for a request of `ms`.
    pub fn delay_for(&self, ms: f64) -> Option<Duration> {
        if self.instant {
            return None;
        }
        let ms = if ms.is_finite() { ms.max(self.floor_ms) } else { self.floor_ms };
        Some(Duration::from_secs_f64(ms / 1000.0))
    }
}

impl Clock for TokioClock {
    async fn sleep(&mut self, ms: f64) {
        if let Some(d) = self.delay_for(ms) {
            tokio::time::sleep(d).await;
        }
    }
}

// ── StdinLines ────────────────────────────────────────────────────────────────

/// Lines from stdin, read on a dedicated thread.
///
/// Unless `typeahead` is set, lines that arrived while nothing was waiting
/// are discarded when the next wait begins, so keys pressed during a slow
/// reveal do not answer the following prompt.
pub struct StdinLines {
    rx: mpsc::Receiver<String>,
    typeahead: bool,
}

impl StdinLines {
    pub fn spawn(typeahead: bool) -> Self {
        // Not tokio::io::stdin(): its pending blocking read would outlive the run.
        let (tx, rx) = mpsc::channel::<String>(16);
        std::thread::spawn(move || {
            use std::io::BufRead;
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break; // receiver dropped (run finished)
                }
            }
        });
        Self::from_receiver(rx, typeahead)
    }

    pub fn from_receiver(rx: mpsc::Receiver<String>, typeahead: bool) -> Self {
        Self { rx, typeahead }
    }
}

impl LineSource for StdinLines {
    async fn read_line(&mut self) -> Option<String> {
        if !self.typeahead {
            while let Ok(stale) = self.rx.try_recv() {
                tracing::trace!(line = %stale, "discarding typeahead");
            }
        }
        self.rx.recv().await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
