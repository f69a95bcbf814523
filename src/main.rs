mod report;
mod session;

use clap::Parser;
use report::render_summary;
use session::{replay, SessionSettings};
use shearbox::{
    CriticalStateRule, EndOfSeries, ReferenceTable, Simulation, SimulationFrame, SoilClass,
    StressSlot,
};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shearbox")]
#[command(version, about = "Headless replay of a direct shear test simulation")]
struct Cli {
    /// Session file (JSON) with parameters, selection and playback settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Soil class to show (dense, loose). Repeat for both.
    #[arg(long = "soil", value_name = "CLASS")]
    soils: Vec<SoilClass>,

    /// Stress slot to show (1, 2, 3). Repeat for several.
    #[arg(long = "slot", value_name = "SLOT")]
    slots: Vec<StressSlot>,

    /// Normal stress in kPa, assigned to slots 1 to 3 in order.
    #[arg(long = "stress", value_name = "KPA")]
    stresses: Vec<f64>,

    /// Cohesion intercept in kPa.
    #[arg(long)]
    cohesion: Option<f64>,

    /// Internal friction angle in degrees.
    #[arg(long)]
    friction_angle: Option<f64>,

    /// Number of strain samples.
    #[arg(long)]
    samples: Option<usize>,

    /// Keep the timer running at the last sample instead of stopping.
    #[arg(long)]
    hold: bool,

    /// Place critical-state markers at the end of the series.
    #[arg(long)]
    series_end_markers: bool,

    /// Semicolon-separated table of measured responses to replay instead of
    /// the closed-form model.
    #[arg(long, value_name = "CSV")]
    reference: Option<PathBuf>,

    /// Maximum number of timer ticks; defaults to a full run.
    #[arg(long)]
    ticks: Option<usize>,

    /// Print frames as JSON instead of a text report.
    #[arg(long)]
    json: bool,

    /// With --json, print every frame as one line instead of only the last.
    #[arg(long, requires = "json")]
    every: bool,
}

impl Cli {
    /// Merge the session file, if any, with the command-line overrides.
    fn settings(&self) -> Result<SessionSettings, Box<dyn Error>> {
        let mut settings = match &self.config {
            Some(path) => SessionSettings::load(path)?,
            None => SessionSettings::default(),
        };
        settings.apply_stresses(&self.stresses)?;
        settings.apply_selection(&self.soils, &self.slots);
        if let Some(cohesion) = self.cohesion {
            settings.parameters.cohesion = cohesion;
        }
        if let Some(friction_angle) = self.friction_angle {
            settings.parameters.friction_angle = friction_angle;
        }
        if let Some(samples) = self.samples {
            settings.simulation.samples = samples;
        }
        if self.hold {
            settings.simulation.end_of_series = EndOfSeries::Hold;
        }
        if self.series_end_markers {
            settings.simulation.critical_state = CriticalStateRule::SeriesEnd;
        }
        Ok(settings)
    }

    fn print_frame(&self, frame: &SimulationFrame) {
        if self.every {
            match serde_json::to_string(frame) {
                Ok(line) => println!("{line}"),
                Err(error) => tracing::error!(%error, "failed to encode frame"),
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Route diagnostics to stderr so JSON on stdout stays machine readable.
    // `RUST_LOG=debug` exposes playback transitions and curve recomputation.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Start from the session file, if any, and let individual flags override
    // it. Normal stresses, cohesion and friction angle are the inputs of a
    // direct shear test series, see https://en.wikipedia.org/wiki/Direct_shear_test.
    let cli = Cli::parse();
    let settings = cli.settings()?;

    // Replay the test: press start and feed timer ticks until playback stops.
    // Curves come either from the closed-form soil model or from a measured
    // table; both reveal the same strain samples one tick at a time.
    let frame = match &cli.reference {
        Some(path) => {
            let table = ReferenceTable::from_path(path)?;
            let simulation = Simulation::with_source(settings.simulation, table);
            replay(simulation, &settings, cli.ticks, |frame| cli.print_frame(frame))?
        }
        None => {
            let simulation = Simulation::new(settings.simulation);
            replay(simulation, &settings, cli.ticks, |frame| cli.print_frame(frame))?
        }
    };

    // Report the last frame. The text summary relates the peak strengths to
    // the Mohr-Coulomb envelope (https://en.wikipedia.org/wiki/Mohr%E2%80%93Coulomb_theory);
    // JSON is meant for an external renderer.
    if cli.json {
        if !cli.every {
            println!("{}", serde_json::to_string_pretty(&frame)?);
        }
    } else {
        println!("{}", render_summary(&frame, &settings.parameters));
    }

    Ok(())
}
