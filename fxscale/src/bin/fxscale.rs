//! fxscale command line driver
//!
//! ```text
//! fxscale scale --input img.bin --crop 0 0 63 63 --scale 2 2 --format p
//! fxscale interactive --out-dir results
//! fxscale textualize img.bin img.txt
//! ```

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use fxscale::Rect;
use fxscale::driver::{Job, run_interactive, run_job};
use fxscale::io::{OutputFormat, read_raster_file, textualize_file};
use fxscale::prompt::Prompt;
use fxscale::sgdma::SessionConfig;
use fxscale::sgdma::sim::{SimConfig, SimPlatform, SimSession};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "fxscale",
    version,
    about = "Fixed-point bilinear scaling in software and on a simulated accelerator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scale one raster
    Scale(ScaleArgs),
    /// Prompt for jobs on stdin until end of input
    Interactive(RunArgs),
    /// Write each sample of a bin raster as an 8-digit binary string
    Textualize {
        /// Source bin raster
        input: PathBuf,
        /// Text file to write
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ScaleArgs {
    /// Source raster (bin or PGM)
    #[arg(long)]
    input: PathBuf,
    /// Inclusive crop corners; the whole raster when omitted
    #[arg(long, num_args = 4, value_names = ["X0", "Y0", "X1", "Y1"])]
    crop: Option<Vec<u32>>,
    /// Horizontal and vertical scale factors
    #[arg(
        long,
        num_args = 2,
        value_names = ["SX", "SY"],
        required = true,
        allow_negative_numbers = true
    )]
    scale: Vec<f32>,
    /// Output format: b (bin) or p (PGM)
    #[arg(long, default_value = "b")]
    format: OutputFormat,
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory receiving result_sw and result_hw
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Run the software path only
    #[arg(long)]
    software_only: bool,
    /// Stop waiting for the accelerator after this many milliseconds
    /// (defaults to FXSCALE_WAIT_TIMEOUT_MS, otherwise no limit)
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

impl RunArgs {
    fn session(&self) -> Option<SimSession> {
        if self.software_only {
            return None;
        }
        let config = match self.timeout_ms {
            Some(0) => SessionConfig::default(),
            Some(ms) => SessionConfig::default().with_wait_timeout(Some(Duration::from_millis(ms))),
            None => SessionConfig::from_env(),
        };
        Some(SimPlatform::new(SimConfig::default()).into_session(config))
    }
}

fn scale(args: &ScaleArgs) -> Result<()> {
    let &[sx, sy] = args.scale.as_slice() else {
        bail!("--scale takes exactly two factors");
    };
    let crop = match args.crop.as_deref() {
        Some(&[x0, y0, x1, y1]) => Some(Rect::from_corners(x0, y0, x1, y1)?),
        Some(_) => bail!("--crop takes exactly four coordinates"),
        None => None,
    };
    let source = read_raster_file(&args.input)
        .with_context(|| format!("cannot load {}", args.input.display()))?;
    log::info!("image {} loaded", args.input.display());

    let job = Job {
        crop,
        sx,
        sy,
        format: args.format,
    };
    let mut session = args.run.session();
    let report = run_job(&source, &job, session.as_mut(), &args.run.out_dir)?;
    if !report.paths_agree() {
        bail!("software and hardware results differ");
    }
    Ok(())
}

fn interactive(args: &RunArgs) -> Result<()> {
    let mut session = args.session();
    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());
    let done = run_interactive(&mut prompt, session.as_mut(), &args.out_dir)?;
    log::info!("{} jobs done", done);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match &cli.command {
        Command::Scale(args) => scale(args),
        Command::Interactive(args) => interactive(args),
        Command::Textualize { input, output } => {
            let count = textualize_file(input, output)
                .with_context(|| format!("cannot textualize {}", input.display()))?;
            log::info!("wrote {} samples to {}", count, output.display());
            Ok(())
        }
    }
}
