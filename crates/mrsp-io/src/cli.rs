//! The driver CLI surface (spec.md §6), specified for completeness only.
//!
//! The source grammar is unusual for `clap`: a flat stream of global flags
//! interleaved with repeated `--process N` markers that each open a scope
//! of per-process flags applying to process `N`. Rather than force that
//! shape through `clap`'s derive macros, this module follows spec.md §9's
//! "result-carrying parsing" Design Note directly: a small hand-rolled
//! token scanner returning `Result` at every step (never throwing to signal
//! a mismatch, unlike the original), grounded in `gladius_slicer`'s
//! flag-driven settings builder from the wider example pack. The top-level
//! `--help`/`--version` banner is `clap`'s job, in the root `mrsp` binary;
//! response-file (`@filename`) token expansion is handled ourselves here
//! since `clap` does not support it natively.

use crate::error::{IoKindError, IoKindResult};
use mrsp_core::spec::{GlobalSpec, InfillingMode, ManualScheduleEntry, ProcessSpec, SchedulingMode};
use std::path::Path;

/// Parsed result of a full CLI invocation: the shared [`GlobalSpec`] plus
/// one [`ProcessSpec`] per `--process N` scope seen (missing indices are
/// filled with [`ProcessSpec::new`] defaults of radius/gridstep `1`).
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    pub global: GlobalSpec,
    pub processes: Vec<ProcessSpec>,
}

/// Expands every `@filename` token into that file's whitespace-separated
/// contents, recursively (spec.md §6 "A response-file token `@filename`
/// expands to the file contents, recursively").
pub fn expand_response_files(args: &[String]) -> IoKindResult<Vec<String>> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        if let Some(path) = arg.strip_prefix('@') {
            let content = std::fs::read_to_string(Path::new(path))?;
            let tokens: Vec<String> = content.split_whitespace().map(str::to_owned).collect();
            out.extend(expand_response_files(&tokens)?);
        } else {
            out.push(arg.clone());
        }
    }
    Ok(out)
}

fn ensure_process(processes: &mut Vec<ProcessSpec>, idx: usize) {
    while processes.len() <= idx {
        processes.push(ProcessSpec::new(1, 1));
    }
}

struct Cursor<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<&'a str> {
        let t = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(t.as_str())
    }

    fn next_f64(&mut self, flag: &str) -> IoKindResult<f64> {
        self.next()
            .ok_or_else(|| missing_value(flag))?
            .parse()
            .map_err(|_| IoKindError::Arguments(format!("{flag}: expected a number")))
    }

    fn next_i64(&mut self, flag: &str) -> IoKindResult<i64> {
        self.next()
            .ok_or_else(|| missing_value(flag))?
            .parse()
            .map_err(|_| IoKindError::Arguments(format!("{flag}: expected an integer")))
    }

    fn next_usize(&mut self, flag: &str) -> IoKindResult<usize> {
        self.next()
            .ok_or_else(|| missing_value(flag))?
            .parse()
            .map_err(|_| IoKindError::Arguments(format!("{flag}: expected a non-negative integer")))
    }

    /// Peeks whether the next token parses as `f64` without consuming it;
    /// used for the several optional trailing numeric arguments (`H` in
    /// `--voxel-z R [H]`, `LY` in `--subtractive-box-mode LX [LY]`, ...).
    fn peek_is_number(&self) -> bool {
        self.tokens
            .get(self.pos)
            .map(|t| t.parse::<f64>().is_ok())
            .unwrap_or(false)
    }

    /// Consumes consecutive number-shaped tokens, stopping at the next
    /// `--flag` or end of input; used for variadic lists like
    /// `--medialaxis-radius f1 f2 ...`.
    fn collect_numbers(&mut self) -> Vec<f64> {
        let mut out = Vec::new();
        while self.peek_is_number() {
            out.push(self.next().unwrap().parse().unwrap());
        }
        out
    }
}

fn missing_value(flag: &str) -> IoKindError {
    IoKindError::Arguments(format!("{flag}: missing value"))
}

/// Parses a full CLI invocation (after response-file expansion) into a
/// [`ParsedArgs`]. Unrecognized options are reported as `ArgumentsError`
/// rather than silently ignored (spec.md §7 "unrecognized option").
pub fn parse_args(tokens: &[String]) -> IoKindResult<ParsedArgs> {
    let mut out = ParsedArgs::default();
    let mut cur = Cursor { tokens, pos: 0 };
    let mut current_process: Option<usize> = None;

    while let Some(tok) = cur.next() {
        match tok {
            "--save-contours" => {}
            "--correct-input" => out.global.correct_input = true,
            "--motion-planner" => out.global.apply_motion_planner = true,
            "--vertical-correction" => out.global.avoid_vertical_overwriting = true,
            "--addsub" => out.global.addsub_workflow_mode = true,
            "--z-epsilon" => out.global.z_epsilon = cur.next_f64(tok)?,
            "--subtractive-box-mode" => {
                out.global.substractive_outer = true;
                out.global.outer_limit_x = cur.next_i64(tok)?;
                out.global.outer_limit_y = if cur.peek_is_number() {
                    cur.next_i64(tok)?
                } else {
                    out.global.outer_limit_x
                };
            }
            "--slicing-uniform" => {
                out.global.scheduling_mode = SchedulingMode::Uniform;
                out.global.z_uniform_step = cur.next_f64(tok)?;
            }
            "--slicing-scheduler" => {
                out.global.scheduling_mode = SchedulingMode::Simple;
                let mut tools = Vec::new();
                while let Some(next) = cur.tokens.get(cur.pos) {
                    if next.starts_with("--") {
                        break;
                    }
                    tools.push(
                        next.parse::<usize>()
                            .map_err(|_| IoKindError::Arguments(format!("{tok}: expected tool indices")))?,
                    );
                    cur.pos += 1;
                }
                if !tools.is_empty() {
                    out.global.tool_subset = Some(tools);
                }
            }
            "--slicing-manual" => {
                out.global.scheduling_mode = SchedulingMode::Manual;
                loop {
                    let Some(next) = cur.tokens.get(cur.pos) else { break };
                    if next.starts_with("--") {
                        break;
                    }
                    let z = cur.next_f64(tok)?;
                    let tool = cur.next_usize(tok)?;
                    out.global.manual_schedule.push(ManualScheduleEntry { z, tool });
                }
            }
            "--process" => {
                let idx = cur.next_usize(tok)?;
                ensure_process(&mut out.processes, idx);
                current_process = Some(idx);
            }
            other => {
                let idx = current_process.ok_or_else(|| {
                    IoKindError::Arguments(format!("{other}: per-process option with no preceding --process N"))
                })?;
                apply_process_flag(&mut out.processes[idx], other, &mut cur)?;
            }
        }
    }

    Ok(out)
}

fn apply_process_flag(process: &mut ProcessSpec, flag: &str, cur: &mut Cursor<'_>) -> IoKindResult<()> {
    match flag {
        "--radx" => process.radius = cur.next_i64(flag)?,
        "--gridstep" => process.gridstep = cur.next_i64(flag)?,
        "--snap" => process.apply_snap = true,
        "--safestep" => process.snap_small_safe_step = true,
        "--clearance" => process.add_internal_clearance = true,
        "--smoothing" => {}
        "--no-preprocessing" => process.do_preprocessing = false,
        "--radius-removecommon" => process.radius_remove_common = cur.next_i64(flag)?,
        "--infill-byregion" => process.infilling_whole = false,
        "--infill-recursive" => process.infilling_recursive = true,
        "--tolerances" => {
            process.arctol_r = cur.next_f64(flag)?;
            if cur.peek_is_number() {
                process.arctol_g = cur.next_f64(flag)?;
            }
        }
        "--voxel-z" => {
            let r = cur.next_f64(flag)?;
            let h = if cur.peek_is_number() { cur.next_f64(flag)? } else { r };
            process.profile = Some(mrsp_core::spec::VoxelProfile::constant(r, h / 2.0, h));
        }
        "--voxel-profile" => {
            let kind = cur.next().ok_or_else(|| missing_value(flag))?;
            match kind {
                "constant" => {}
                "ellipsoid" => {
                    if let Some(mrsp_core::spec::VoxelProfile::Constant { radius, semi_height, slice_height }) =
                        process.profile
                    {
                        process.profile = Some(mrsp_core::spec::VoxelProfile::elliptical(
                            radius,
                            semi_height,
                            slice_height,
                        ));
                    }
                }
                other => {
                    return Err(IoKindError::Arguments(format!(
                        "--voxel-profile: unknown kind {other:?}, expected constant|ellipsoid"
                    )))
                }
            }
        }
        "--medialaxis-radius" => process.medial_axis_factors = cur.collect_numbers(),
        "--infill-medialaxis-radius" => process.medial_axis_factors_for_infillings = cur.collect_numbers(),
        "--infill" => {
            let mode = cur.next().ok_or_else(|| missing_value(flag))?;
            process.infilling_mode = match mode {
                "linesh" => InfillingMode::RectilinearHorizontal,
                "linesv" => InfillingMode::RectilinearVertical,
                "concentric" => InfillingMode::Concentric,
                "justcontour" => InfillingMode::JustContour,
                other => {
                    return Err(IoKindError::Arguments(format!(
                        "--infill: unknown mode {other:?}"
                    )))
                }
            };
        }
        other => return Err(IoKindError::Arguments(format!("unrecognized option {other:?}"))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn parses_global_flags() {
        let parsed = parse_args(&tokens("--addsub --z-epsilon 0.5 --slicing-uniform 2.0")).unwrap();
        assert!(parsed.global.addsub_workflow_mode);
        assert_eq!(parsed.global.z_epsilon, 0.5);
        assert_eq!(parsed.global.z_uniform_step, 2.0);
        assert_eq!(parsed.global.scheduling_mode, SchedulingMode::Uniform);
    }

    #[test]
    fn parses_per_process_scopes() {
        let parsed = parse_args(&tokens(
            "--process 0 --radx 75 --gridstep 10 --snap --process 1 --radx 10 --gridstep 1 --infill concentric",
        ))
        .unwrap();
        assert_eq!(parsed.processes.len(), 2);
        assert_eq!(parsed.processes[0].radius, 75);
        assert!(parsed.processes[0].apply_snap);
        assert_eq!(parsed.processes[1].radius, 10);
        assert_eq!(parsed.processes[1].infilling_mode, InfillingMode::Concentric);
    }

    #[test]
    fn medialaxis_radius_collects_variadic_list() {
        let parsed = parse_args(&tokens("--process 0 --radx 75 --medialaxis-radius 0.8 0.5 0.2")).unwrap();
        assert_eq!(parsed.processes[0].medial_axis_factors, vec![0.8, 0.5, 0.2]);
    }

    #[test]
    fn process_flag_without_preceding_process_marker_fails() {
        let err = parse_args(&tokens("--radx 75")).unwrap_err();
        assert!(matches!(err, IoKindError::Arguments(_)));
    }

    #[test]
    fn unrecognized_flag_fails() {
        let err = parse_args(&tokens("--not-a-real-flag")).unwrap_err();
        assert!(matches!(err, IoKindError::Arguments(_)));
    }

    #[test]
    fn response_file_expands_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner.rsp");
        std::fs::write(&inner, "--radx 75").unwrap();
        let outer = dir.path().join("outer.rsp");
        std::fs::write(&outer, format!("--process 0 @{}", inner.display())).unwrap();

        let expanded = expand_response_files(&tokens(&format!("@{}", outer.display()))).unwrap();
        let parsed = parse_args(&expanded).unwrap();
        assert_eq!(parsed.processes[0].radius, 75);
    }

    #[test]
    fn slicing_manual_collects_z_tool_pairs() {
        let parsed = parse_args(&tokens("--slicing-manual 0 0 25 1 50 1")).unwrap();
        assert_eq!(parsed.global.scheduling_mode, SchedulingMode::Manual);
        assert_eq!(parsed.global.manual_schedule.len(), 3);
        assert_eq!(parsed.global.manual_schedule[1].tool, 1);
    }
}
