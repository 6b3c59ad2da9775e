use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cli::commands::parse_task_id;
use crate::model::priority::Priority;

/// Line-oriented prompts for the interactive session.
///
/// Every answer is read as one line; an empty answer means "unset". End of
/// input aborts the command being entered.
pub struct Prompter<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
    interrupt: Option<&'a Interrupt>,
}

/// Set from the Ctrl-C handler, consumed by the next read that notices it.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once per trigger
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

fn input_closed() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input closed")
}

fn interrupted() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "interrupted")
}

impl<'a, R: BufRead, W: Write> Prompter<'a, R, W> {
    pub fn new(input: &'a mut R, out: &'a mut W) -> Self {
        Prompter {
            input,
            out,
            interrupt: None,
        }
    }

    /// Fail reads with `ErrorKind::Interrupted` once `interrupt` fires
    pub fn with_interrupt(mut self, interrupt: &'a Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn out(&mut self) -> &mut W {
        self.out
    }

    /// Read one line without its line ending. `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if self.interrupt.is_some_and(Interrupt::take) {
            return Err(interrupted());
        }
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Show `label: ` and read the answer
    pub fn ask(&mut self, label: &str) -> io::Result<String> {
        write!(self.out, "{}: ", label)?;
        self.out.flush()?;
        self.read_line()?.ok_or_else(input_closed)
    }

    /// Like [`Prompter::ask`], with an empty answer as `None`
    pub fn ask_optional(&mut self, label: &str) -> io::Result<Option<String>> {
        let answer = self.ask(label)?;
        Ok(Some(answer).filter(|a| !a.is_empty()))
    }

    /// Comma-separated label names
    pub fn ask_labels(&mut self) -> io::Result<Option<Vec<String>>> {
        Ok(self.ask_optional("labels")?.map(|answer| {
            answer
                .split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect()
        }))
    }

    /// Ask until the answer is empty or a valid priority
    pub fn ask_priority(&mut self) -> io::Result<Option<Priority>> {
        loop {
            let Some(answer) = self.ask_optional("priority")? else {
                return Ok(None);
            };
            match answer.parse::<Priority>() {
                Ok(p) => return Ok(Some(p)),
                Err(e) => writeln!(self.out, "{}", e)?,
            }
        }
    }

    /// Ask until the answer is a hex task id. `open_ids` is shown as a hint
    /// after a bad answer.
    pub fn ask_task(&mut self, open_ids: &[String]) -> io::Result<i64> {
        loop {
            let answer = self.ask("task")?;
            match parse_task_id(&answer) {
                Ok(id) => return Ok(id),
                Err(e) => {
                    writeln!(self.out, "{}", e)?;
                    if !open_ids.is_empty() {
                        writeln!(self.out, "open tasks: {}", open_ids.join(" "))?;
                    }
                }
            }
        }
    }
}
