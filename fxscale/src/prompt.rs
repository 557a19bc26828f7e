//! Interactive job prompt
//!
//! Answers are whitespace separated and may be split over lines or typed
//! on one line:
//!
//! 1. input filename, or `@` to reuse the previously loaded raster
//! 2. output format selector, `b` (bin) or `p` (PGM)
//! 3. crop corners `X0 Y0 X1 Y1` (inclusive, x is the column)
//! 4. scale factors `SX SY`
//!
//! # Examples
//!
//! ```
//! use fxscale::prompt::{InputChoice, Prompt};
//!
//! let input = b"@ p 0 0 3 3 2.0 0.5\n";
//! let mut prompt = Prompt::new(&input[..], Vec::new());
//! let answers = prompt.next_answers().unwrap().unwrap();
//! assert_eq!(answers.input, InputChoice::Reuse);
//! assert_eq!(answers.job.sx, 2.0);
//! ```

use crate::driver::Job;
use anyhow::{Context, Result, bail};
use fxscale_core::Rect;
use fxscale_io::OutputFormat;
use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Filename answer that reuses the previous raster
pub const REUSE_INPUT: &str = "@";

/// Where the job's source comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputChoice {
    /// The raster loaded by an earlier job
    Reuse,
    Path(PathBuf),
}

/// One complete set of answers
#[derive(Debug, Clone, PartialEq)]
pub struct Answers {
    pub input: InputChoice,
    pub job: Job,
}

/// Token reader asking questions on `writer` and reading answers from `reader`
pub struct Prompt<R, W> {
    reader: R,
    writer: W,
    pending: VecDeque<String>,
    ended: bool,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Prompt {
            reader,
            writer,
            pending: VecDeque::new(),
            ended: false,
        }
    }

    /// Whether the input has run out.
    pub fn ended(&self) -> bool {
        self.ended && self.pending.is_empty()
    }

    /// Drop the unread rest of the current input line(s).
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// The question text written so far.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn ask(&mut self, question: &str) -> Result<()> {
        self.writer.write_all(question.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn token(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            if self.ended {
                return Ok(None);
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                self.ended = true;
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }

    fn value<T>(&mut self, what: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let token = self
            .token()?
            .with_context(|| format!("input ended before {}", what))?;
        token
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {} '{}': {}", what, token, e))
    }

    /// Ask for the next job.
    ///
    /// Returns `Ok(None)` if the input ends before a filename is given.
    ///
    /// # Errors
    ///
    /// Fails on unparsable answers, corners that do not describe a
    /// rectangle, non-positive scale factors or input ending mid-job.
    pub fn next_answers(&mut self) -> Result<Option<Answers>> {
        self.ask("Enter input filename: ")?;
        let Some(name) = self.token()? else {
            return Ok(None);
        };
        let input = if name == REUSE_INPUT {
            InputChoice::Reuse
        } else {
            InputChoice::Path(PathBuf::from(name))
        };

        self.ask("\nEnter output image format: ")?;
        let format: OutputFormat = self.value("output format")?;

        self.ask("\nEnter endpoint coordinates: ")?;
        let x0 = self.value("X0")?;
        let y0 = self.value("Y0")?;
        let x1 = self.value("X1")?;
        let y1 = self.value("Y1")?;
        let crop = Rect::from_corners(x0, y0, x1, y1)?;

        self.ask("\nEnter scaling factors: ")?;
        let sx: f32 = self.value("SX")?;
        let sy: f32 = self.value("SY")?;
        if !(sx > 0.0 && sy > 0.0) {
            bail!("scaling factors must be positive, got {} {}", sx, sy);
        }
        self.ask("\n")?;

        Ok(Some(Answers {
            input,
            job: Job {
                crop: Some(crop),
                sx,
                sy,
                format,
            },
        }))
    }
}
