//! TOML configuration loading (spec.md ambient stack), grounded in
//! `gcodekit5-settings::config::Config::{load_from_file,save_to_file,validate}`:
//! read-validate-or-default, `ConfigError` on a malformed file or a key that
//! fails the underlying spec struct's own `validate()`.

use crate::error::{IoKindError, IoKindResult};
use mrsp_core::spec::{GlobalSpec, ProcessSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The full on-disk run configuration: the cross-cutting [`GlobalSpec`] plus
/// one [`ProcessSpec`] per tool, ordered coarse-to-fine (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunConfig {
    pub global: GlobalSpec,
    #[serde(default)]
    pub processes: Vec<ProcessSpec>,
}

impl RunConfig {
    /// Loads a run configuration from a TOML file. Falls back to
    /// [`GlobalSpec::default`] with no processes when `path` does not exist,
    /// the way `gcodekit5-settings`'s persistence layer falls back to
    /// `Config::default()` when there is no settings file yet.
    pub fn load_from_file(path: &Path) -> IoKindResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes and writes the configuration back to `path` as TOML.
    pub fn save_to_file(&self, path: &Path) -> IoKindResult<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| IoKindError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Cross-field validation: at least one process, every process's own
    /// invariants (spec.md §3 "ProcessSpec", `MultiSpec::populateParameters`/
    /// `validate` in `original_source/multi/spec.cpp`), and manual-schedule
    /// consistency when `scheduling_mode = Manual`.
    pub fn validate(&self) -> IoKindResult<()> {
        if self.processes.is_empty() {
            return Err(IoKindError::Config(
                "configuration must declare at least one process".into(),
            ));
        }
        for (idx, process) in self.processes.iter().enumerate() {
            process
                .validate()
                .map_err(|e| IoKindError::Config(format!("process[{idx}]: {e}")))?;
        }
        if self.global.is_manual() {
            for entry in &self.global.manual_schedule {
                if entry.tool >= self.processes.len() {
                    return Err(IoKindError::Config(format!(
                        "manual schedule references tool {} but only {} process(es) are configured",
                        entry.tool,
                        self.processes.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = RunConfig::load_from_file(&path).expect("falls back to default");
        assert!(config.processes.is_empty());
    }

    #[test]
    fn empty_process_list_fails_validation() {
        let config = RunConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        let mut config = RunConfig::default();
        config.processes.push(ProcessSpec::new(75, 10));
        config.processes.push(ProcessSpec::new(10, 1));
        config.save_to_file(&path).expect("saves");

        let loaded = RunConfig::load_from_file(&path).expect("loads");
        assert_eq!(loaded.processes.len(), 2);
        assert_eq!(loaded.processes[0].radius, 75);
        assert_eq!(loaded.processes[1].radius, 10);
    }

    #[test]
    fn manual_schedule_referencing_unknown_tool_fails() {
        let mut config = RunConfig::default();
        config.processes.push(ProcessSpec::new(75, 10));
        config.global.scheduling_mode = mrsp_core::spec::SchedulingMode::Manual;
        config.global.manual_schedule.push(mrsp_core::spec::ManualScheduleEntry {
            z: 0.0,
            tool: 5,
        });
        assert!(config.validate().is_err());
    }
}
