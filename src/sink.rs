//! Console rendering of tracker emissions
//!
//! The status line is redrawn in place with a carriage return and never ends
//! with a newline, so the terminal shows one continuously updated line.

use std::io::{self, Write};

use crate::tracker::Emission;

pub const WAITING_MESSAGE: &str = "Waiting for first battery report...";

/// Padding after the status line, wipes leftovers of a longer previous line
const LINE_PADDING: &str = "   ";

/// Receiver of tracker emissions
pub trait StatusSink {
    fn emit(&mut self, emission: &Emission) -> io::Result<()>;
}

/// Text of an emission without any terminal control characters
pub fn render(emission: &Emission) -> String {
    match emission {
        Emission::Waiting => WAITING_MESSAGE.to_string(),
        Emission::Status { reading, .. } => reading.to_string(),
    }
}

/// Carriage-return redraw on a writer (stdout in the binary)
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusSink for ConsoleSink<W> {
    fn emit(&mut self, emission: &Emission) -> io::Result<()> {
        match emission {
            Emission::Waiting => write!(self.out, "\r{}", render(emission))?,
            Emission::Status { .. } => write!(self.out, "\r{}{}", render(emission), LINE_PADDING)?,
        }
        self.out.flush()
    }
}

/// Sink that keeps every emission in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub emissions: Vec<Emission>,
}

impl StatusSink for RecordingSink {
    fn emit(&mut self, emission: &Emission) -> io::Result<()> {
        self.emissions.push(*emission);
        Ok(())
    }
}
