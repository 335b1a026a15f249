//! Repeated wall-clock timing of a unit of work.

use crate::stats::{Summary, TimingSample};
use anyhow::{bail, Result};
use std::time::Instant;

/// A zero-argument unit of work whose duration is measured.
///
/// Implementors carry whatever they need (a connection, a prepared query) so
/// the harness never has to know about it. Any `FnMut() -> Result<T>` is an
/// operation.
pub trait Operation {
    type Output;

    fn run(&mut self) -> Result<Self::Output>;
}

impl<F, T> Operation for F
where
    F: FnMut() -> Result<T>,
{
    type Output = T;

    fn run(&mut self) -> Result<T> {
        self()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Run `op` once, returning the elapsed milliseconds and its output.
pub fn time_once<O: Operation + ?Sized>(op: &mut O) -> Result<(f64, O::Output)> {
    let start = Instant::now();
    let output = op.run()?;
    Ok((elapsed_ms(start), output))
}

/// Run `op` exactly `runs` times in sequence and collect the durations.
///
/// The first failing repetition aborts the run and its error is returned
/// unchanged; nothing from the partial sample escapes.
pub fn collect<O: Operation + ?Sized>(op: &mut O, runs: usize) -> Result<TimingSample> {
    if runs == 0 {
        bail!("repetition count must be at least 1");
    }

    let mut sample = TimingSample::with_capacity(runs);
    for _ in 0..runs {
        let start = Instant::now();
        op.run()?;
        sample.push(elapsed_ms(start));
    }
    Ok(sample)
}

/// Run `op` exactly `runs` times and summarise the durations.
pub fn measure<O: Operation + ?Sized>(op: &mut O, runs: usize) -> Result<Summary> {
    let sample = collect(op, runs)?;
    match sample.summarize() {
        Some(summary) => Ok(summary),
        None => bail!("no timing samples were collected"),
    }
}
