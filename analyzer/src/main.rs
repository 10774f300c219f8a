use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use generator::synthetic::{build_storms, SyntheticConfig};
use std::path::{Path, PathBuf};
use stormcore::analysis::{
    join_nearest, tally_by_year, ApproachStage, CategoryStage, ImpactStage, LandfallStage,
    SummaryStage,
};
use stormcore::export::approach_collection;
use stormcore::ibtracs::load_tracks;
use stormcore::records::LandfallRecord;
use stormcore::track::StormTrack;
use workflow::config::{ArgOverrides, WorkflowConfig};
use workflow::output::{read_rows, read_table, write_geojson, write_rows, write_table};
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "IBTrACS landfall analysis driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One row per storm with its basins and observation period
    Summary(CommonArgs),
    /// Storm summary with lifetime category and closest approach to land
    Categories(CommonArgs),
    /// One row per landfall event west of the landfall longitude
    Landfalls(CommonArgs),
    /// Landfalling and major-landfall storm counts per year
    Counts(CountsArgs),
    /// GeoJSON tracks with the lead-up to each landfall
    Approach(CommonArgs),
    /// Attach the closest landfall of the matching storm to each site
    Nearest(NearestArgs),
    /// Run the landfall analyses on generated tracks
    Demo(DemoArgs),
}

#[derive(Args, Clone)]
struct CommonArgs {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// IBTrACS list CSV
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output path (`-` for stdout); defaults next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    start_year: Option<i32>,
    #[arg(long)]
    end_year: Option<i32>,
    /// Basin code such as NA or EP, or `all`
    #[arg(long)]
    basin: Option<String>,
    /// Landfall distance threshold in km
    #[arg(long)]
    threshold_km: Option<f64>,
    /// Hours highlighted before each landfall
    #[arg(long)]
    lead_hours: Option<i64>,
    /// YAML table of per-storm event selection rules
    #[arg(long)]
    overrides: Option<PathBuf>,
    /// Skip storms that fail validation instead of aborting
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,
}

#[derive(Args)]
struct CountsArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Output path for the major-landfall counts
    #[arg(long)]
    major_output: Option<PathBuf>,
}

#[derive(Args)]
struct NearestArgs {
    /// Sites CSV with Name, Year, Lat and Lon (degrees west) columns
    #[arg(long)]
    sites: PathBuf,
    /// Landfall table written by the `landfalls` command
    #[arg(long)]
    landfalls: PathBuf,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct DemoArgs {
    #[arg(long, default_value_t = 40)]
    storms: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Directory receiving the demo outputs
    #[arg(long, default_value = "demo-output")]
    output_dir: PathBuf,
}

impl CommonArgs {
    fn workflow(&self) -> anyhow::Result<WorkflowConfig> {
        let base = match &self.workflow {
            Some(path) => WorkflowConfig::load(path)?,
            None => WorkflowConfig::default(),
        };
        Ok(base.apply_args(ArgOverrides {
            input: self.input.clone(),
            output: self.output.clone(),
            start_year: self.start_year,
            end_year: self.end_year,
            basin: self.basin.clone(),
            threshold_km: self.threshold_km,
            lead_hours: self.lead_hours,
            overrides_file: self.overrides.clone(),
            skip_invalid: self.skip_invalid,
        }))
    }
}

fn load(config: &WorkflowConfig) -> anyhow::Result<Vec<StormTrack>> {
    let input = config.input_path()?;
    let storms =
        load_tracks(input).with_context(|| format!("loading IBTrACS {}", input.display()))?;
    log::info!("{} storms read from {}", storms.len(), input.display());
    Ok(storms)
}

fn report(path: &Path, rows: usize) {
    println!("wrote {} rows to {}", rows, path.display());
}

fn run_counts(
    runner: &Runner,
    storms: &[StormTrack],
    all_path: &Path,
    major_path: &Path,
) -> anyhow::Result<()> {
    let impacts = runner.execute("counts", &mut ImpactStage::new(), storms)?;
    let analysis = runner.analysis();
    let (all, major) = tally_by_year(&impacts, analysis.start_year, analysis.end_year);
    write_rows(&all, all_path)?;
    write_rows(&major, major_path)?;
    report(all_path, all.len());
    report(major_path, major.len());
    Ok(())
}

fn run_approach(runner: &Runner, storms: &[StormTrack], path: &Path) -> anyhow::Result<()> {
    let mut stage = ApproachStage::new(runner.overrides().clone());
    let approaches = runner.execute("approach", &mut stage, storms)?;
    write_geojson(&approach_collection(&approaches), path)?;
    let highlighted = approaches.iter().filter(|a| !a.approach.is_empty()).count();
    println!(
        "wrote {} tracks ({} with landfall approach) to {}",
        approaches.len(),
        highlighted,
        path.display()
    );
    Ok(())
}

fn run_demo(args: &DemoArgs) -> anyhow::Result<()> {
    let synthetic = SyntheticConfig {
        storms: args.storms,
        seed: args.seed,
        ..Default::default()
    };
    let storms = build_storms(&synthetic)?;
    let config = WorkflowConfig::default().apply_args(ArgOverrides {
        start_year: Some(synthetic.start_year),
        end_year: Some(synthetic.start_year + synthetic.years - 1),
        ..Default::default()
    });
    let runner = Runner::new(&config)?;

    let landfalls = runner.execute(
        "landfalls",
        &mut LandfallStage::new(runner.overrides().clone()),
        &storms,
    )?;
    let landfall_path = args.output_dir.join("landfall_summary.csv");
    write_rows(&landfalls, &landfall_path)?;
    report(&landfall_path, landfalls.len());

    run_counts(
        &runner,
        &storms,
        &args.output_dir.join("landfalling_storms.csv"),
        &args.output_dir.join("landfalling_storms_major.csv"),
    )?;
    run_approach(
        &runner,
        &storms,
        &args.output_dir.join("approach_tracks.geojson"),
    )?;

    let metrics = runner.metrics();
    println!(
        "Demo run -> storms {}, landfalls {}, rejected {}",
        storms.len(),
        landfalls.len(),
        metrics.rejected
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Summary(args) => {
            let config = args.workflow()?;
            let runner = Runner::new(&config)?;
            let storms = load(&config)?;
            let rows = runner.execute("summary", &mut SummaryStage::new(), &storms)?;
            let path = config.output_path("summary.csv");
            write_rows(&rows, &path)?;
            report(&path, rows.len());
        }
        Command::Categories(args) => {
            let config = args.workflow()?;
            let runner = Runner::new(&config)?;
            let storms = load(&config)?;
            let rows = runner.execute("categories", &mut CategoryStage::new(), &storms)?;
            let path = config.output_path("summary_withcategory.csv");
            write_rows(&rows, &path)?;
            report(&path, rows.len());
        }
        Command::Landfalls(args) => {
            let config = args.workflow()?;
            let runner = Runner::new(&config)?;
            let storms = load(&config)?;
            let mut stage = LandfallStage::new(runner.overrides().clone());
            let rows = runner.execute("landfalls", &mut stage, &storms)?;
            let path = config.output_path("landfall_summary.csv");
            write_rows(&rows, &path)?;
            report(&path, rows.len());
        }
        Command::Counts(args) => {
            let config = args.common.workflow()?;
            let runner = Runner::new(&config)?;
            let storms = load(&config)?;
            let all_path = config.output_path("landfalling_storms.csv");
            let major_path = args.major_output.clone().unwrap_or_else(|| {
                let stem = all_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("landfalling_storms");
                all_path.with_file_name(format!("{}_major.csv", stem))
            });
            run_counts(&runner, &storms, &all_path, &major_path)?;
        }
        Command::Approach(args) => {
            let config = args.workflow()?;
            let runner = Runner::new(&config)?;
            let storms = load(&config)?;
            run_approach(&runner, &storms, &config.output_path("approach_tracks.geojson"))?;
        }
        Command::Nearest(args) => {
            let sites = read_table(&args.sites)?;
            let landfalls: Vec<LandfallRecord> = read_rows(&args.landfalls)?;
            let joined = join_nearest(&sites, &landfalls).context("joining sites to landfalls")?;
            let path = args.output.unwrap_or_else(|| {
                args.sites
                    .with_file_name("specific_landfall_storms-final.csv")
            });
            write_table(&joined, &path)?;
            report(&path, joined.rows.len());
        }
        Command::Demo(args) => run_demo(&args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn demo_writes_every_output() {
        let dir = tempdir().unwrap();
        let args = DemoArgs {
            storms: 12,
            seed: 5,
            output_dir: dir.path().to_path_buf(),
        };
        run_demo(&args).unwrap();

        for name in [
            "landfall_summary.csv",
            "landfalling_storms.csv",
            "landfalling_storms_major.csv",
            "approach_tracks.geojson",
        ] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
        let counts = std::fs::read_to_string(dir.path().join("landfalling_storms.csv")).unwrap();
        // Header plus one row per year of the synthetic range.
        assert_eq!(counts.lines().count(), 11);
    }

    #[test]
    fn cli_parses_shared_flags() {
        let cli = Cli::try_parse_from([
            "analyzer",
            "counts",
            "--input",
            "ibtracs.NA.list.v04r00.csv",
            "--start-year",
            "1970",
            "--end-year",
            "2019",
            "--major-output",
            "major.csv",
        ])
        .unwrap();
        match cli.command {
            Command::Counts(args) => {
                let config = args.common.workflow().unwrap();
                assert_eq!(config.analysis.start_year, 1970);
                assert_eq!(args.major_output, Some(PathBuf::from("major.csv")));
            }
            _ => panic!("expected counts"),
        }
    }
}
