use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use log::{info, LevelFilter};
use perspective::{
    timed, EntityGpuInfo, GpuTile, GpuTileNodeInfo, Scenario, ScenarioOutput,
};
use serde::Serialize;
use simple_logger::SimpleLogger;
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for building tile networks from scenario files, checking them, and
/// dumping them for inspection.
#[derive(Debug, StructOpt)]
#[structopt(name = "perspective")]
struct Opt {
    /// Path to a scenario file that defines the network to build. Supported
    /// formats: JSON, TOML
    #[structopt(short, long)]
    scenario: Option<PathBuf>,

    /// Generate a random scenario from this seed instead of loading one
    #[structopt(long)]
    random_seed: Option<u64>,

    /// Number of edits in a random scenario
    #[structopt(long, default_value = "200")]
    random_steps: usize,

    /// How far out from the origin (in half-tiles) a random scenario places
    /// tiles
    #[structopt(long, default_value = "4")]
    random_extent: i32,

    /// Skip the full consistency check after building the network
    #[structopt(long)]
    skip_check: bool,

    /// If given, the built network will be saved to this directory. The
    /// exact files that appear in the directory are defined by the output
    /// formats. See `--output-formats` for more info
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to output the network in. Supported formats:
    ///
    /// json - Every tile, node and force flag, as JSON
    ///
    /// gpu - The GPU transfer buffers (tiles, node infos, entities), as JSON
    ///
    /// scenario - The scenario that built the network, in TOML format. Use
    ///   this to save a random scenario for replay
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// The logging level to use while building. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Different output formats.
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    // If you change this, make sure to update the help text for
    // `--output-formats`!
    /// Export the whole network snapshot
    Json,
    /// Export the buffers a renderer would upload
    Gpu,
    /// Export the scenario in a human-readable file
    Scenario,
}

impl OutputFormat {
    fn file_name(self) -> &'static str {
        match self {
            Self::Json => "network.json",
            Self::Gpu => "gpu.json",
            Self::Scenario => "scenario.toml",
        }
    }
}

#[derive(Serialize)]
struct GpuBuffers {
    tiles: Vec<GpuTile>,
    node_infos: Vec<GpuTileNodeInfo>,
    entities: Vec<EntityGpuInfo>,
}

fn load_scenario(scenario_path: &Path) -> anyhow::Result<Scenario> {
    let mut settings = Config::new();
    let scenario_path = scenario_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", scenario_path)
    })?;
    settings
        .merge(File::with_name(scenario_path))
        .context("error reading scenario file")?;
    settings.try_into().context("error reading scenario")
}

/// Generate an output form of the network in the given format.
fn gen_output(
    output_dir: &Path,
    output_format: OutputFormat,
    scenario: &Scenario,
    output: &ScenarioOutput,
) -> anyhow::Result<()> {
    fn generate_bytes(
        output_format: OutputFormat,
        scenario: &Scenario,
        output: &ScenarioOutput,
    ) -> anyhow::Result<Vec<u8>> {
        let bytes = match output_format {
            OutputFormat::Json => output.network.to_json()?.into_bytes(),
            OutputFormat::Gpu => {
                let buffers = GpuBuffers {
                    tiles: output.network.gpu_tiles(),
                    node_infos: output.network.gpu_node_infos(),
                    entities: output.entities.gpu_infos(),
                };
                serde_json::to_vec(&buffers)
                    .context("error serializing GPU buffers")?
            }
            OutputFormat::Scenario => toml::to_string_pretty(scenario)
                .context("error serializing scenario")?
                .into_bytes(),
        };
        Ok(bytes)
    }

    let output_file_path = output_dir.join(output_format.file_name());

    timed!(
        format!(
            "Generating {} output and writing to {:?}",
            output_format, &output_file_path
        ),
        log::Level::Info,
        {
            let bytes = generate_bytes(output_format, scenario, output)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&output_file_path)
                .with_context(|| {
                    format!("error opening output file {:?}", &output_file_path)
                })?;
            file.write_all(&bytes).with_context(|| {
                format!("error writing to file {:?}", &output_file_path)
            })?;
        }
    );

    Ok(())
}

/// Log how many nodes of each kind the network has
fn log_summary(output: &ScenarioOutput) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for (_, node) in output.network.nodes() {
        *counts.entry(node.kind().to_string()).or_default() += 1;
    }
    let degenerate_quadrants: usize = output
        .network
        .nodes()
        .filter_map(|(_, node)| node.as_degenerate())
        .map(|degen| degen.pairs().len())
        .sum();
    info!(
        "{} tiles, {} entities, nodes: {:?}",
        output.network.tile_count(),
        output.entities.len(),
        counts
    );
    if degenerate_quadrants > 0 {
        info!(
            "{} quadrants meet at degenerate corners",
            degenerate_quadrants
        );
    }
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let scenario = match (&opt.scenario, opt.random_seed) {
        (Some(scenario_path), None) => load_scenario(scenario_path)?,
        (None, Some(seed)) => {
            info!("Generating random scenario from seed {}", seed);
            Scenario::random(seed, opt.random_steps, opt.random_extent)
        }
        _ => bail!(
            "must pass exactly one of --scenario (to load a scenario file) \
            or --random-seed (to generate a random one)"
        ),
    };

    let output = scenario.run()?;
    log_summary(&output);
    if !opt.skip_check {
        output
            .network
            .check_consistency()
            .context("network is inconsistent")?;
        info!("Network is consistent");
    }

    // If an output dir was specified, write out output format(s) there
    if let Some(output_dir) = opt.output {
        if opt.output_formats.is_empty() {
            bail!("output dir was specified, but no output formats were given")
        }
        fs::create_dir_all(&output_dir)?;

        for output_format in opt.output_formats {
            gen_output(&output_dir, output_format, &scenario, &output)?;
        }
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
