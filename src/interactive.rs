//! Menu-driven single trials on a terminal.

use crate::counters::CounterSession;
use crate::error::BenchError;
use crate::kernels::{Kernel, ParamKind, Variant};
use crate::runner::{TrialSpec, run_trial};
use std::collections::VecDeque;
use std::io::{BufRead, Write};

const MENU: &[(u32, Variant, &str)] = &[
    (1, Variant::Naive, "Multiplication (i-j-k)"),
    (2, Variant::Line, "Line Multiplication (i-k-j)"),
    (3, Variant::Block, "Block Multiplication"),
    (4, Variant::ParallelOuter, "Line Multiplication, parallel outer loop"),
    (5, Variant::ParallelInner, "Line Multiplication, parallel inner loop"),
];

/// Whitespace-separated tokens over a line-oriented input.
struct Tokens<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<String>, BenchError> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }
}

enum Answer {
    Value(i64),
    Invalid(String),
    Eof,
}

fn ask<R: BufRead, W: Write>(
    tokens: &mut Tokens<R>,
    out: &mut W,
    prompt: &str,
) -> Result<Answer, BenchError> {
    write!(out, "{}", prompt)?;
    out.flush()?;
    Ok(match tokens.next_token()? {
        None => Answer::Eof,
        Some(tok) => match tok.parse() {
            Ok(v) => Answer::Value(v),
            Err(_) => Answer::Invalid(tok),
        },
    })
}

/// Asks for a strictly positive integer. `None` means end of input.
fn ask_positive<R: BufRead, W: Write>(
    tokens: &mut Tokens<R>,
    out: &mut W,
    prompt: &str,
) -> Result<Option<usize>, BenchError> {
    loop {
        match ask(tokens, out, prompt)? {
            Answer::Eof => return Ok(None),
            Answer::Value(v) if v > 0 => return Ok(Some(v as usize)),
            Answer::Value(v) => writeln!(out, "Must be at least 1, got {}", v)?,
            Answer::Invalid(tok) => writeln!(out, "Not a number: {}", tok)?,
        }
    }
}

/// Runs the interactive menu until selection 0 or end of input.
///
/// Each selection runs one trial and prints its time, cache misses,
/// throughput and the first elements of the result. Allocation failures
/// are reported and the menu continues; counter errors end the loop.
pub fn run_menu<R, W, S>(input: R, mut out: W, session: &mut S) -> Result<(), BenchError>
where
    R: BufRead,
    W: Write,
    S: CounterSession + ?Sized,
{
    let mut tokens = Tokens::new(input);

    loop {
        writeln!(out)?;
        for (key, _, label) in MENU {
            writeln!(out, "{}. {}", key, label)?;
        }
        writeln!(out, "0. Exit")?;

        let choice = match ask(&mut tokens, &mut out, "Selection?: ")? {
            Answer::Eof | Answer::Value(0) => break,
            Answer::Value(v) => v,
            Answer::Invalid(tok) => {
                writeln!(out, "Invalid selection: {}", tok)?;
                continue;
            }
        };
        let Some(&(_, variant, _)) = MENU.iter().find(|(key, _, _)| i64::from(*key) == choice)
        else {
            writeln!(out, "Invalid selection: {}", choice)?;
            continue;
        };

        let Some(size) = ask_positive(&mut tokens, &mut out, "Dimensions: lins=cols ? ")? else {
            break;
        };

        let kernel = match variant.param_kind() {
            ParamKind::None => Kernel::new(variant, None, None)?,
            ParamKind::BlockSize => {
                let Some(bs) = ask_positive(&mut tokens, &mut out, "Block Size? ")? else {
                    break;
                };
                Kernel::new(variant, Some(bs), None)?
            }
            ParamKind::Threads => {
                let Some(t) = ask_positive(&mut tokens, &mut out, "Threads? ")? else {
                    break;
                };
                Kernel::new(variant, None, Some(t))?
            }
        };

        match run_trial(&TrialSpec::new(kernel, size), session) {
            Ok(r) => {
                writeln!(out, "L1 DCM: {}", r.l1_misses.map_or("NA".into(), |v| v.to_string()))?;
                writeln!(out, "L2 DCM: {}", r.l2_misses.map_or("NA".into(), |v| v.to_string()))?;
                writeln!(out, "Time: {:.3} seconds", r.elapsed_secs)?;
                writeln!(out, "GFLOPS: {:.3}", r.gflops)?;
                writeln!(out, "Result matrix:")?;
                let sample: Vec<String> = r.sample.iter().map(|x| x.to_string()).collect();
                writeln!(out, "{}", sample.join(" "))?;
            }
            Err(e) if e.is_recoverable() => writeln!(out, "Skipped: {}", e)?,
            Err(e) => return Err(e),
        }
    }

    out.flush()?;
    Ok(())
}
