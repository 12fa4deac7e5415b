//! The execution engine.
//!
//! [`Engine`] owns all run state: program counter, flags, pending choices and
//! the last speaker.  Each [`Engine::step`] performs one transition:
//!
//! * If choices are pending and the current instruction is not a `SELECT`,
//!   prompt until a valid answer arrives, then continue after the chosen
//!   tag.  The current instruction is *not* executed on that step.
//! * Otherwise dispatch the current instruction and move the program counter.
//!
//! Jumps (from `JUMP` or a choice) land on the instruction after the target
//! `TAG`.  A false `IF` resumes after the first `ENDIF` at or after the `IF`,
//! ignoring any nesting.
//!
//! The engine pauses only through its [`Clock`] and [`LineSource`], so a run
//! can be driven entirely by test doubles.

use std::io::Write;

use tracing::{debug, warn};

use crate::clock::{Clock, LineSource};
use crate::config::Settings;
use crate::terminal::{Console, EchoControl, NoEcho, Rgb};

use super::cond::{evaluate, parse_float, parse_int};
use super::error::{Result, ScriptError};
use super::flags::{FlagOp, FlagStore};
use super::instruction::{Instruction, Opcode};
use super::program::Program;
use super::render::{self, Speaker};
use super::select::{format_choice, SelectionBuffer};
use super::tags::TagIndex;

/// Outcome of one [`Engine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Finished,
}

pub struct Engine<C, L, W: Write> {
    program: Program,
    tags: TagIndex,
    flags: FlagStore,
    selections: SelectionBuffer,
    speaker: Speaker,
    pc: usize,
    settings: Settings,
    console: Console<W>,
    echo: Box<dyn EchoControl>,
    clock: C,
    input: L,
}

impl<C: Clock, L: LineSource, W: Write> Engine<C, L, W> {
    /// Index the program's tags and set up a run starting at position 0.
    pub fn new(program: Program, flags: FlagStore, clock: C, input: L, out: W) -> Result<Self> {
        let tags = TagIndex::build(&program)?;
        debug!(instructions = program.len(), tags = tags.len(), "program indexed");
        Ok(Self {
            program,
            tags,
            flags,
            selections: SelectionBuffer::new(),
            speaker: Speaker::Nothing,
            pc: 0,
            settings: Settings::default(),
            console: Console::new(out),
            echo: Box::new(NoEcho),
            clock,
            input,
        })
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_echo(mut self, echo: Box<dyn EchoControl>) -> Self {
        self.echo = echo;
        self
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn is_finished(&self) -> bool {
        self.pc >= self.program.len()
    }

    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    pub fn selections(&self) -> &SelectionBuffer {
        &self.selections
    }

    pub fn tags(&self) -> &TagIndex {
        &self.tags
    }

    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }

    pub fn output(&self) -> &W {
        self.console.get_ref()
    }

    pub fn into_output(self) -> W {
        self.console.into_inner()
    }

    /// Run to the end of the program, then print the end message.
    pub async fn run(&mut self) -> Result<()> {
        self.echo.set_echo(false);
        while self.step().await? == Step::Continue {}
        debug!(flags = ?self.flags.iter().collect::<Vec<_>>(), "run finished");
        if !self.settings.end_message.is_empty() {
            let msg = format!("\n\n{}\n", self.settings.end_message);
            self.console.print(&msg)?;
        }
        self.console.flush()?;
        Ok(())
    }

    /// Perform one transition.  Errors carry the position they occurred at.
    pub async fn step(&mut self) -> Result<Step> {
        let pc = self.pc;
        self.transition().await.map_err(|e| e.at(pc))?;
        Ok(if self.is_finished() { Step::Finished } else { Step::Continue })
    }

    async fn transition(&mut self) -> Result<()> {
        // Cheap clone so the instruction can be borrowed across `&mut self` calls.
        let program = self.program.clone();
        let Some(inst) = program.get(self.pc) else {
            return Ok(());
        };

        if !self.selections.is_empty() && inst.opcode != Opcode::Select {
            return self.resolve_selection().await;
        }

        match &inst.opcode {
            Opcode::Tag | Opcode::EndIf => {}
            Opcode::Wait => {
                // Unreadable durations still wait the clock's minimum.
                let ms = lenient_ms(&inst.param1, "wait").unwrap_or(0.0);
                self.pause(ms).await?;
            }
            Opcode::Text | Opcode::AutoText => self.show_line(inst).await?,
            Opcode::IpValue => {
                let line = format!("{}\n", self.settings.ip_value);
                self.console.print(&line)?;
            }
            Opcode::If => {
                if !evaluate(&self.flags, &inst.param1)? {
                    let resume = program
                        .find_from(self.pc, &Opcode::EndIf)
                        .map_or(program.len(), |endif| endif + 1);
                    debug!(pc = self.pc, cond = %inst.param1, resume, "condition false, skipping");
                    self.pc = resume;
                    return Ok(());
                }
            }
            Opcode::Select => self.offer_choice(inst)?,
            Opcode::FlagAdd | Opcode::FlagValue => {
                let n = parse_int(&inst.param2)?;
                self.flags.apply(&inst.param1, FlagOp::Add(n))?;
                debug!(flag = %inst.param1, add = n, "flag updated");
            }
            Opcode::Jump => {
                self.jump(&inst.param1)?;
                return Ok(());
            }
            Opcode::Unknown(raw) => return Err(ScriptError::UnknownOpcode(raw.clone())),
        }

        self.pc += 1;
        Ok(())
    }

    /// Continue after the `TAG` declaring `label`.
    fn jump(&mut self, label: &str) -> Result<()> {
        let target = self.tags.resolve(label)?;
        debug!(from = self.pc, tag = label, to = target + 1, "jump");
        self.pc = target + 1;
        Ok(())
    }

    // ── Text lines ────────────────────────────────────────────────────────

    async fn show_line(&mut self, inst: &Instruction) -> Result<()> {
        if render::is_hidden(&inst.text, &self.settings) {
            return Ok(());
        }

        let formatted = render::is_formatted(inst, &self.settings);
        if formatted {
            let prefix = render::speaker_prefix(&self.speaker, &inst.speaker, &self.settings);
            self.console.print("\n")?;
            self.console.print(&prefix)?;
        }

        let color = match inst.param3.trim() {
            "" => None,
            spec => Some(Rgb::parse(spec)?),
        };
        if let Some(color) = color {
            self.console.set_color(color)?;
        }

        let interval = lenient_ms(&inst.param1, "interval").filter(|ms| *ms != 0.0);
        let body = render::body_text(&inst.text, &self.settings);
        match interval {
            Some(ms) => {
                for ch in body.chars() {
                    self.pause(ms).await?;
                    self.console.print_char(ch)?;
                }
            }
            None => self.console.print(&body)?,
        }

        if color.is_some() {
            self.console.reset_color()?;
        }
        self.speaker = Speaker::Line(inst.speaker.clone());

        if inst.opcode == Opcode::Text && formatted {
            self.read_line().await?;
        }
        Ok(())
    }

    // ── Selections ────────────────────────────────────────────────────────

    fn offer_choice(&mut self, inst: &Instruction) -> Result<()> {
        if !inst.param2.trim().is_empty() && !evaluate(&self.flags, &inst.param2)? {
            return Ok(());
        }
        let number = self.selections.push(inst.text.clone(), inst.param1.clone());
        if self.speaker != Speaker::Selection {
            self.console.print("\n")?;
        }
        self.console.print(&format_choice(number, &inst.text))?;
        self.speaker = Speaker::Selection;
        Ok(())
    }

    /// Prompt until the answer names a pending choice, then jump to it.
    async fn resolve_selection(&mut self) -> Result<()> {
        loop {
            self.console.print("\n")?;
            let answer = loop {
                let prompt = self.settings.select_prompt.clone();
                self.console.print(&prompt)?;
                self.echo.set_echo(true);
                let line = self.read_line().await;
                self.echo.set_echo(false);
                let answer = line?.trim().to_owned();
                if !answer.is_empty() {
                    break answer;
                }
            };

            if let Some(choice) = self.selections.choose(&answer) {
                let tag = choice.tag.clone();
                debug!(answer = %answer, tag = %tag, "choice made");
                self.jump(&tag)?;
                self.selections.clear();
                return Ok(());
            }

            debug!(answer = %answer, choices = self.selections.len(), "invalid choice");
            let banner = format!(
                "\n{}\nCan't exploit at \"{answer}\" process.\n{}",
                self.settings.select_error,
                self.selections.listing(),
            );
            self.console.print(&banner)?;
        }
    }

    // ── Suspension points ─────────────────────────────────────────────────

    async fn pause(&mut self, ms: f64) -> Result<()> {
        self.console.flush()?;
        self.clock.sleep(ms).await;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String> {
        self.console.flush()?;
        self.input.read_line().await.ok_or(ScriptError::InputClosed)
    }
}

/// A millisecond count, or `None` when blank or unreadable.
fn lenient_ms(param: &str, what: &str) -> Option<f64> {
    let param = param.trim();
    if param.is_empty() {
        return None;
    }
    match parse_float(param) {
        Ok(ms) => Some(ms),
        Err(e) => {
            warn!(%what, "{e}; ignored");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
