//! Groups a flat [`PolygonSet`] back into [`HoledPolygon`]s, the way
//! `mrsp_geom::convert::polygon_set_to_sketch` groups paths into
//! outer/hole nestings before handing them to the clipping kernel, but kept
//! general enough to also regroup islands nested inside holes (needed when
//! recursing into concentric infilling rings, spec.md §4.5 step 8).

use mrsp_core::geometry::{nesting_info, HoledPolygon, Path, PolygonSet};

/// Every even-depth path becomes one [`HoledPolygon`]'s outer ring, with its
/// direct odd-depth children as holes. An island nested inside one of those
/// holes (depth two steps deeper) becomes its own entry in the returned
/// list, recursively.
pub fn group_into_holed_polygons(paths: &[Path]) -> Vec<HoledPolygon> {
    let closed: Vec<Path> = paths.iter().filter(|p| p.points.len() >= 3).cloned().collect();
    let info = nesting_info(&closed);
    let mut groups = Vec::new();
    for (i, n) in info.iter().enumerate() {
        if n.depth % 2 != 0 {
            continue;
        }
        let holes: Vec<Path> = info
            .iter()
            .enumerate()
            .filter(|(_, nj)| nj.parent == Some(i))
            .map(|(j, _)| closed[j].clone())
            .collect();
        groups.push(HoledPolygon::new(closed[i].clone(), holes));
    }
    groups
}

pub fn group_set_into_holed_polygons(set: &PolygonSet) -> Vec<HoledPolygon> {
    group_into_holed_polygons(&set.paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::geometry::Point;

    fn square(x0: i64, y0: i64, side: i64, ccw: bool) -> Path {
        let pts = if ccw {
            vec![
                Point::new(x0, y0),
                Point::new(x0 + side, y0),
                Point::new(x0 + side, y0 + side),
                Point::new(x0, y0 + side),
            ]
        } else {
            vec![
                Point::new(x0, y0),
                Point::new(x0, y0 + side),
                Point::new(x0 + side, y0 + side),
                Point::new(x0 + side, y0),
            ]
        };
        Path::closed(pts)
    }

    #[test]
    fn single_outer_with_one_hole() {
        let outer = square(0, 0, 100, true);
        let hole = square(10, 10, 20, false);
        let groups = group_into_holed_polygons(&[outer, hole]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].holes.len(), 1);
    }

    #[test]
    fn island_nested_inside_a_hole_becomes_its_own_group() {
        let outer = square(0, 0, 100, true);
        let hole = square(10, 10, 60, false);
        let island = square(20, 20, 20, true);
        let groups = group_into_holed_polygons(&[outer, hole, island]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().any(|g| g.holes.is_empty()));
    }
}
