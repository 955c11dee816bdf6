//! # mrsp
//!
//! Root binary crate for the multi-resolution toolpath planner: wires the
//! algorithm crates (`mrsp-core`, `mrsp-geom`, `mrsp-snap`, `mrsp-medial`,
//! `mrsp-motion`, `mrsp-slice`, `mrsp-sched`) to the external interfaces
//! (`mrsp-io`'s paths-file writer, mesh-slicer subprocess client, CLI
//! parsing and TOML configuration) and owns process-wide logging setup.

/// Initializes structured logging with console output and `RUST_LOG`
/// support, the way `gcodekit5::init_logging` sets up its `tracing`
/// subscriber for the driver binary.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
    Ok(())
}
