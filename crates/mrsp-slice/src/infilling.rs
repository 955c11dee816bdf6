//! Steps 7-8: the recursive outer-ring independent contour and the
//! infilling area itself (spec.md §4.5), grounded in
//! `original_source/multi/multislicer.cpp`'s
//! `processInfillingsRectilinear` and the concentric-infilling recursion
//! described alongside it.

use crate::error::{tag, SliceResult};
use crate::holes::group_into_holed_polygons;
use mrsp_core::geometry::BoundingBox;
use mrsp_core::spec::{InfillingMode, ProcessSpec};
use mrsp_core::{Path, Point, PolygonSet};
use mrsp_geom::{offset, offset2, EndType, JoinStyle};
use mrsp_snap::{snap_paths, GridSpec, SnapMode};

pub const STEP_RECURSIVE_CONTOUR: &str = "recursive_contour";
pub const STEP_INFILLING: &str = "infilling";

/// Result of step 8: the infilling area (if any), the toolpaths it
/// generated directly (concentric rings, rectilinear lines), and an
/// optional independent contour for cross-slice dependency tracking
/// (spec.md §4.5 step 8's closing clause: "If `infillingRecursive`, also
/// emit `offset(+radius, infillingToolpaths)`...").
pub struct InfillingOutput {
    pub areas: Option<PolygonSet>,
    pub toolpaths: Vec<Path>,
    pub independent_contour: Option<PolygonSet>,
}

/// Step 7: when the next process is the same kind and recursive infilling
/// is requested, the *contour* toolpaths (not the infilling ones) are
/// themselves recorded as an independent contour, the way the infilling
/// toolpaths are in step 8's closing clause.
pub fn recursive_outer_ring_contour(
    process_index: usize,
    process: &ProcessSpec,
    next_same_kind: bool,
    toolpaths: &[Path],
) -> SliceResult<Option<PolygonSet>> {
    if !(next_same_kind && process.infilling_recursive && process.infilling_mode != InfillingMode::None) {
        return Ok(None);
    }
    let set = PolygonSet::new(toolpaths.to_vec());
    let inflated = offset(process.radius as f64, &set, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP_RECURSIVE_CONTOUR))?;
    Ok(Some(inflated))
}

/// Step 8, dispatching on `infilling_mode`.
pub fn compute_infilling(
    process_index: usize,
    process: &ProcessSpec,
    temp: &PolygonSet,
    grid: Option<&GridSpec>,
) -> SliceResult<InfillingOutput> {
    let shrink_factor = if process.add_internal_clearance { 0.99 } else { 0.3 };
    let radius = process.radius as f64;

    let (areas, mut toolpaths) = match process.infilling_mode {
        InfillingMode::None => (None, Vec::new()),
        InfillingMode::JustContour => {
            let areas = offset(-radius * shrink_factor, temp, JoinStyle::Round, EndType::Closed)
                .map_err(tag(process_index, STEP_INFILLING))?;
            (Some(areas), Vec::new())
        }
        InfillingMode::Concentric => {
            let mut rings = Vec::new();
            concentric_rings(process_index, process, temp, &mut rings, 0)?;
            (Some(temp.clone()), rings)
        }
        InfillingMode::RectilinearHorizontal | InfillingMode::RectilinearVertical => {
            let horizontal = process.infilling_mode == InfillingMode::RectilinearHorizontal;
            let lines = if process.infilling_whole {
                rectilinear_lines(process_index, process, temp, horizontal, grid)?
            } else {
                let mut all = Vec::new();
                for hp in group_into_holed_polygons(&temp.paths) {
                    let mut set = PolygonSet::new(vec![hp.outer]);
                    set.paths.extend(hp.holes);
                    all.extend(rectilinear_lines(process_index, process, &set, horizontal, grid)?);
                }
                all
            };
            (Some(temp.clone()), lines)
        }
    };

    let independent_contour = if process.infilling_recursive && !toolpaths.is_empty() {
        let set = PolygonSet::new(std::mem::take(&mut toolpaths));
        let inflated = offset(radius, &set, JoinStyle::Round, EndType::Round)
            .map_err(tag(process_index, STEP_INFILLING))?;
        toolpaths = set.paths;
        Some(inflated)
    } else {
        None
    };

    Ok(InfillingOutput { areas, toolpaths, independent_contour })
}

/// Recursively erodes `area` by `radius` (applying internal clearance the
/// same way step 3 does, when requested), recording each ring and
/// recursing into any island left over once the ring's own holes are
/// subtracted out, until nothing remains.
fn concentric_rings(
    process_index: usize,
    process: &ProcessSpec,
    area: &PolygonSet,
    out: &mut Vec<Path>,
    depth: u32,
) -> SliceResult<()> {
    if area.is_empty() || depth > 10_000 {
        return Ok(());
    }
    let radius = process.radius as f64;
    let eroded = offset(-radius, area, JoinStyle::Round, EndType::Closed)
        .map_err(tag(process_index, STEP_INFILLING))?;
    if eroded.is_empty() {
        return Ok(());
    }
    let ring = if process.add_internal_clearance {
        offset2(-radius, radius, &eroded, JoinStyle::Round, EndType::Closed)
            .map_err(tag(process_index, STEP_INFILLING))?
    } else {
        eroded.clone()
    };
    out.extend(ring.paths.iter().map(Path::as_closed_open));

    for hp in group_into_holed_polygons(&eroded.paths) {
        let mut island = PolygonSet::new(vec![hp.outer]);
        island.paths.extend(hp.holes);
        concentric_rings(process_index, process, &island, out, depth + 1)?;
    }
    Ok(())
}

fn rectilinear_lines(
    process_index: usize,
    process: &ProcessSpec,
    area: &PolygonSet,
    horizontal: bool,
    grid: Option<&GridSpec>,
) -> SliceResult<Vec<Path>> {
    let radius = process.radius as f64;
    let all_points: Vec<Point> = area.paths.iter().flat_map(|p| p.points.iter().copied()).collect();
    let Some(bbox) = BoundingBox::from_points(&all_points) else {
        return Ok(Vec::new());
    };

    let clip_area = if process.add_internal_clearance {
        offset(radius * -0.99, area, JoinStyle::Round, EndType::Closed)
            .map_err(tag(process_index, STEP_INFILLING))?
    } else {
        area.clone()
    };

    let delta = (2.0 * radius * 0.999).max(1.0) as i64;
    let (start, end) = if horizontal { (bbox.min_y, bbox.max_y) } else { (bbox.min_x, bbox.max_x) };
    let mut lines = Vec::new();
    let mut pos = start;
    while pos <= end {
        let line = if horizontal {
            Path::open(vec![Point::new(bbox.min_x, pos), Point::new(bbox.max_x, pos)])
        } else {
            Path::open(vec![Point::new(pos, bbox.min_y), Point::new(pos, bbox.max_y)])
        };
        lines.push(line);
        pos += delta;
    }

    let clip_set = PolygonSet::new(lines);
    let (inside, _outside) = mrsp_motion::split_inside_outside(&clip_set.paths, &clip_area);
    let mut inside = inside;

    if process.apply_snap {
        if let Some(grid) = grid {
            let mut grid = *grid;
            grid.mode = SnapMode::Simple;
            let is_hole = vec![false; inside.len()];
            inside = snap_paths(&inside, &is_hole, &grid).map_err(tag(process_index, STEP_INFILLING))?;
        }
    }

    inside.retain(|line| line.polyline_length() >= radius);
    Ok(inside)
}
