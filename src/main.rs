//! Driver binary: spawns the mesh-slicer subprocess, drives the C6
//! scheduler's `deliverRaw → computeNext → drainOutputs` loop (spec.md §5),
//! and writes every handed-out output slice's contours and toolpaths to a
//! paths-file container (spec.md §6).

use anyhow::Context;
use clap::Parser;
use mrsp_core::spec::{GlobalSpec, ProcessSpec};
use mrsp_io::cli::expand_response_files;
use mrsp_io::config::RunConfig;
use mrsp_io::pathsfile::{write_slice, FileHeader, PathCloseMode, RecordKind, VoxelFileSpec};
use mrsp_io::subprocess::MeshSlicerProcess;
use mrsp_sched::SimpleSlicingScheduler;
use std::io::BufWriter;
use std::path::PathBuf;

/// Multi-resolution toolpath planner: slices a mesh across one or more
/// fabrication processes of increasing resolution and writes the result as
/// a paths-file container.
#[derive(Parser, Debug)]
#[command(name = "mrsp", version, about)]
struct Cli {
    /// Mesh file passed through to the mesh-slicer subprocess.
    mesh: PathBuf,

    /// Destination paths-file container.
    #[arg(short, long)]
    output: PathBuf,

    /// Mesh-slicer helper executable to spawn.
    #[arg(long, default_value = "mesh-slicer")]
    slicer: String,

    /// Optional TOML run configuration; when given, its `[global]`/
    /// `[[processes]]` take precedence over the trailing flag stream.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lower Z bound for schedule building.
    #[arg(long)]
    zmin: f64,

    /// Upper Z bound for schedule building.
    #[arg(long)]
    zmax: f64,

    /// Ask the mesh-slicer to repair the mesh before slicing.
    #[arg(long)]
    repair: bool,

    /// Use the mesh-slicer's incremental mode.
    #[arg(long)]
    incremental: bool,

    /// spec.md §6 global and per-process flags (`--process N ...`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    process_args: Vec<String>,
}

fn load_processes(cli: &Cli) -> anyhow::Result<(GlobalSpec, Vec<ProcessSpec>)> {
    if let Some(config_path) = &cli.config {
        let config = RunConfig::load_from_file(config_path)
            .with_context(|| format!("loading configuration from {}", config_path.display()))?;
        return Ok((config.global, config.processes));
    }
    let expanded = expand_response_files(&cli.process_args)?;
    let parsed = mrsp_io::cli::parse_args(&expanded)?;
    Ok((parsed.global, parsed.processes))
}

fn main() -> anyhow::Result<()> {
    mrsp::init_logging()?;
    let cli = Cli::parse();

    let (global, processes) = load_processes(&cli)?;
    if processes.is_empty() {
        anyhow::bail!("no processes configured: pass --config or --process N ... flags");
    }
    for (idx, process) in processes.iter().enumerate() {
        process
            .validate()
            .with_context(|| format!("process[{idx}] failed validation"))?;
    }

    tracing::info!(num_processes = processes.len(), zmin = cli.zmin, zmax = cli.zmax, "starting run");

    let mut slicer = MeshSlicerProcess::spawn(
        &cli.slicer,
        &cli.mesh.to_string_lossy(),
        cli.repair,
        cli.incremental,
    )
    .context("spawning mesh-slicer subprocess")?;

    let mut scheduler = SimpleSlicingScheduler::new(processes.clone(), global, cli.zmin, cli.zmax);
    let raw_zs = scheduler.raw_zs();
    tracing::debug!(count = raw_zs.len(), "requesting raw slices");

    let client = slicer.client_mut();
    if !cli.repair {
        client.read_limits().context("reading mesh limits")?;
    }
    client.send_zs(&raw_zs).context("sending Z schedule")?;
    let raw_slices = client.read_all_slices(raw_zs.len()).context("reading raw slices")?;

    for (idx, polygons) in raw_slices.into_iter().enumerate() {
        scheduler.deliver_raw_slice(idx, polygons)?;
    }

    let output_file =
        std::fs::File::create(&cli.output).with_context(|| format!("creating {}", cli.output.display()))?;
    let mut writer = BufWriter::new(output_file);

    let use_sched = processes.iter().any(|p| p.profile.is_some());
    let voxels: Vec<VoxelFileSpec> = processes
        .iter()
        .map(|p| match (&p.profile, use_sched) {
            (Some(profile), true) => VoxelFileSpec::with_schedule(
                p.radius as f64,
                profile.voxel_semi_height(),
                profile.slice_height(),
                profile.application_point(),
            ),
            _ => VoxelFileSpec::without_schedule(p.radius as f64),
        })
        .collect();
    let header = FileHeader::new(voxels, use_sched);
    header.write_to(&mut writer).context("writing paths-file header")?;

    let mut num_records: i64 = 0;
    scheduler.compute_next_input_slices()?;
    loop {
        // Clone the handed-out result's fields before calling back into the
        // scheduler, since `give_next_output_slice` ties its return value to
        // `&mut self` and the next `compute_next_input_slices` call needs
        // that borrow released first.
        let next = scheduler
            .give_next_output_slice()?
            .map(|result| (result.tool, result.z, result.contours.clone(), result.toolpaths.clone()));
        let Some((tool, z, contours, toolpaths)) = next else { break };

        write_slice(
            &mut writer,
            RecordKind::ProcessedContour,
            tool as i64,
            z,
            1.0,
            &contours,
            PathCloseMode::Closed,
        )?;
        num_records += 1;

        let toolpath_set = mrsp_core::PolygonSet::new(toolpaths);
        write_slice(
            &mut writer,
            RecordKind::Toolpath,
            tool as i64,
            z,
            1.0,
            &toolpath_set,
            PathCloseMode::Open,
        )?;
        num_records += 1;

        scheduler.compute_next_input_slices()?;
    }

    use std::io::Write;
    writer.flush()?;
    drop(writer);

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .open(&cli.output)
        .with_context(|| format!("reopening {} to finalize numRecords", cli.output.display()))?;
    header
        .rewrite_num_records(&mut file, num_records)
        .context("finalizing paths-file numRecords")?;

    slicer.terminate().ok();
    tracing::info!(num_records, "run complete");
    Ok(())
}
