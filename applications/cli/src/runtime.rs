//! Terminal main loop
//!
//! Waits on two sources at once: committed input lines and a fixed-rate
//! ticker. Lines go to the interpreter, ticks drive end-of-track handling.
//! Console output is flushed to the terminal after either.

use crate::error::Result;
use cadence_playback::console::PROMPT;
use cadence_playback::{ConsoleBuffer, Flow, Interpreter, LineSink, PlaybackEvent, Player};
use crossbeam_channel::{select, tick, Receiver};
use std::io::Write;
use std::time::Duration;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Console buffer that remembers whether it was cleared since the last flush
#[derive(Debug, Default)]
struct TerminalConsole {
    buffer: ConsoleBuffer,
    cleared: bool,
}

impl LineSink for TerminalConsole {
    fn write_line(&mut self, line: &str) {
        self.buffer.write_line(line);
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.cleared = true;
    }
}

/// Interactive session bound to an output stream
pub struct Runtime<W: Write> {
    player: Player,
    interpreter: Interpreter,
    console: TerminalConsole,
    out: W,
    tick_interval: Duration,
    /// Track announced by the last status line
    announced: Option<String>,
}

impl<W: Write> Runtime<W> {
    /// Create a runtime ticking `tick_rate` times per second
    pub fn new(player: Player, interpreter: Interpreter, out: W, tick_rate: u32) -> Self {
        Self {
            player,
            interpreter,
            console: TerminalConsole::default(),
            out,
            tick_interval: Duration::from_secs(1) / tick_rate.max(1),
            announced: None,
        }
    }

    /// Run until `exit` or end of input
    pub fn run(&mut self, lines: &Receiver<String>) -> Result<()> {
        self.flush()?;
        self.prompt()?;

        let ticker = tick(self.tick_interval);
        loop {
            select! {
                recv(lines) -> line => match line {
                    Ok(line) => {
                        if self.handle_line(&line)? == Flow::Exit {
                            return Ok(());
                        }
                    }
                    Err(_) => {
                        tracing::debug!("Input closed, shutting down");
                        self.shutdown()?;
                        return Ok(());
                    }
                },
                recv(ticker) -> _ => {
                    self.tick()?;
                }
            }
        }
    }

    /// Submit one committed line
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let flow = self
            .interpreter
            .submit(line, &mut self.player, &mut self.console);
        self.flush()?;
        if flow == Flow::Continue {
            self.announce()?;
            self.prompt()?;
        }
        Ok(flow)
    }

    /// Advance the player by one tick
    pub fn tick(&mut self) -> Result<Option<PlaybackEvent>> {
        let event = self.player.tick(&mut self.console);
        if event.is_some() {
            writeln!(self.out)?;
            self.flush()?;
            self.announce()?;
            self.prompt()?;
        }
        Ok(event)
    }

    /// Stop playback and flush whatever is left
    pub fn shutdown(&mut self) -> Result<()> {
        self.player.shutdown();
        self.flush()?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    /// Player driven by this runtime
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Output stream
    pub fn output(&self) -> &W {
        &self.out
    }

    fn flush(&mut self) -> Result<()> {
        if std::mem::take(&mut self.console.cleared) {
            write!(self.out, "{}", CLEAR_SCREEN)?;
        }
        for line in self.console.buffer.take_unread() {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    /// Print a status line when the loaded track changed
    fn announce(&mut self) -> Result<()> {
        let status = self.player.now_playing();
        let current = status.as_ref().map(|s| s.name.clone());
        if current == self.announced {
            return Ok(());
        }
        if let Some(status) = status {
            writeln!(self.out, "{}", status)?;
        }
        self.announced = current;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "{}", PROMPT)?;
        self.out.flush()?;
        Ok(())
    }
}
