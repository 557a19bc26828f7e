//! Scaling jobs as run by the `fxscale` binary
//!
//! A job crops the source, scales the crop in software and, when a
//! transfer session is supplied, on the accelerator. Both results are
//! compared and written to the output directory as `result_sw.<ext>` and
//! `result_hw.<ext>`.

use crate::prompt::{InputChoice, Prompt};
use anyhow::{Context, Result, bail};
use fxscale_core::{Raster, RasterDiff, Rect};
use fxscale_io::{OutputFormat, read_raster_file, write_raster_file};
use fxscale_sgdma::{AcceleratorRegisters, SgdmaEngine, TransferSession};
use fxscale_transform::scale_bilinear;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// File stem of the software result
pub const SOFTWARE_RESULT: &str = "result_sw";
/// File stem of the accelerator result
pub const HARDWARE_RESULT: &str = "result_hw";

/// One scaling request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Job {
    /// Region of the source to scale; `None` scales the whole raster.
    pub crop: Option<Rect>,
    pub sx: f32,
    pub sy: f32,
    pub format: OutputFormat,
}

/// What a job produced
#[derive(Debug, Clone)]
pub struct JobReport {
    /// `(height, width)` of the scaled raster
    pub output_dimensions: (u32, u32),
    pub software_time: Duration,
    /// `None` when only the software path ran
    pub hardware_time: Option<Duration>,
    /// Software versus accelerator comparison
    pub diff: Option<RasterDiff>,
    /// Files written, accelerator result first
    pub written: Vec<PathBuf>,
}

impl JobReport {
    /// Whether the two paths produced identical rasters (trivially true
    /// when only the software path ran).
    pub fn paths_agree(&self) -> bool {
        self.diff.is_none_or(|d| d.is_identical())
    }

    /// Timing report with one section per path.
    pub fn timing_table(&self) -> String {
        let mut table = format!("{:<10}{:>16}\n", "Section", "Time");
        let mut row = |name: &str, time: Duration| {
            table.push_str(&format!("{:<10}{:>16}\n", name, format!("{:?}", time)));
        };
        row("Software", self.software_time);
        if let Some(hw) = self.hardware_time {
            row("Hardware", hw);
        }
        table
    }
}

fn result_path(out_dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    out_dir.join(format!("{}.{}", stem, format.extension()))
}

/// Run `job` on `source`.
///
/// # Errors
///
/// Fails if the crop does not fit the source, a scale factor is not
/// positive, the accelerator transfer fails or a result cannot be written.
pub fn run_job<R, E>(
    source: &Raster,
    job: &Job,
    session: Option<&mut TransferSession<R, E>>,
    out_dir: &Path,
) -> Result<JobReport>
where
    R: AcceleratorRegisters,
    E: SgdmaEngine,
{
    if !(job.sx > 0.0 && job.sy > 0.0) {
        bail!("scaling factors must be positive, got {} {}", job.sx, job.sy);
    }
    let segment = match job.crop {
        Some(rect) => source.view_rect(&rect).with_context(|| {
            format!(
                "crop {}x{} at ({}, {}) does not fit the {}x{} source",
                rect.w,
                rect.h,
                rect.x,
                rect.y,
                source.width(),
                source.height()
            )
        })?,
        None => source.alias(),
    };
    log::info!("extracted {}x{} segment", segment.width(), segment.height());

    let started = Instant::now();
    let software = scale_bilinear(&segment, job.sx, job.sy).context("software scaling failed")?;
    let software_time = started.elapsed();
    log::info!("image scaled (software)");

    let hardware = match session {
        Some(session) => {
            let started = Instant::now();
            let out = session
                .scale(&segment, job.sx, job.sy)
                .context("accelerator scaling failed")?;
            let elapsed = started.elapsed();
            log::info!("image scaled (hardware)");
            Some((out, elapsed))
        }
        None => None,
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;
    let mut written = Vec::with_capacity(2);
    let mut diff = None;
    let mut hardware_time = None;
    if let Some((out, elapsed)) = &hardware {
        let path = result_path(out_dir, HARDWARE_RESULT, job.format);
        write_raster_file(out, &path, job.format)
            .with_context(|| format!("cannot write {}", path.display()))?;
        log::info!("image {} saved", path.display());
        written.push(path);
        diff = Some(software.compare(out)?);
        hardware_time = Some(*elapsed);
    }
    let path = result_path(out_dir, SOFTWARE_RESULT, job.format);
    write_raster_file(&software, &path, job.format)
        .with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("image {} saved", path.display());
    written.push(path);

    let report = JobReport {
        output_dimensions: software.dimensions(),
        software_time,
        hardware_time,
        diff,
        written,
    };
    log::info!("performance report\n{}", report.timing_table());
    if let Some(d) = &report.diff {
        if d.is_identical() {
            log::info!("software and hardware results agree");
        } else {
            log::warn!(
                "software and hardware results differ in {} of {} samples (max difference {})",
                d.differing,
                d.total,
                d.max_abs_diff
            );
        }
    }
    Ok(report)
}

/// Answer prompts from `prompt` and run jobs until its input ends.
///
/// A failed job is logged and the loop asks for the next one. Returns the
/// number of jobs that completed.
///
/// # Errors
///
/// Only prompt I/O failures end the loop early.
pub fn run_interactive<In, Out, R, E>(
    prompt: &mut Prompt<In, Out>,
    mut session: Option<&mut TransferSession<R, E>>,
    out_dir: &Path,
) -> Result<usize>
where
    In: BufRead,
    Out: Write,
    R: AcceleratorRegisters,
    E: SgdmaEngine,
{
    let mut loaded: Option<Raster> = None;
    let mut done = 0;
    loop {
        let answers = match prompt.next_answers() {
            Ok(Some(answers)) => answers,
            Ok(None) => break,
            Err(e) if prompt.ended() => {
                log::warn!("{:#}", e);
                break;
            }
            Err(e) => {
                log::error!("{:#}", e);
                prompt.discard_pending();
                continue;
            }
        };

        let source = match (&answers.input, &loaded) {
            (InputChoice::Reuse, Some(raster)) => raster.alias(),
            (InputChoice::Reuse, None) => {
                log::error!("no image loaded yet; enter a filename first");
                continue;
            }
            (InputChoice::Path(path), _) => {
                log::info!("loading image {}", path.display());
                match read_raster_file(path) {
                    Ok(raster) => {
                        log::info!("image {} loaded", path.display());
                        loaded = Some(raster.alias());
                        raster
                    }
                    Err(e) => {
                        log::error!("cannot load {}: {}", path.display(), e);
                        continue;
                    }
                }
            }
        };

        match run_job(&source, &answers.job, session.as_deref_mut(), out_dir) {
            Ok(_) => done += 1,
            Err(e) => log::error!("{:#}", e),
        }
    }
    Ok(done)
}
