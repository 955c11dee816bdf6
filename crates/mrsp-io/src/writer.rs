//! Output-writer delegator (spec.md §9 Design Notes: "Dynamic dispatch at
//! path-writer boundaries... Model as a capability set + a list of
//! `(predicate, writer)` pairs; iterate and forward.").
//!
//! The DXF/SVG/GWL formatters themselves stay out of scope (spec.md §1);
//! this module keeps the extension point real and testable with one
//! trivial built-in writer, [`RawDebugWriter`], that renders a tagged
//! path set as text.

use mrsp_core::PolygonSet;

/// The same `(type, ntool, z)` tag carried by a paths-file `SliceRecord`
/// header (spec.md §6), used to route a slice to the writer(s) whose
/// predicate accepts it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceTag {
    pub record_type: i64,
    pub ntool: i64,
    pub z: f64,
}

/// A sink capable of rendering one tagged slice. Concrete DXF/SVG/GWL
/// writers would implement this; only [`RawDebugWriter`] does here.
pub trait SliceWriter {
    fn write(&mut self, tag: SliceTag, paths: &PolygonSet) -> std::io::Result<()>;
}

type Predicate<'a> = Box<dyn Fn(SliceTag) -> bool + 'a>;

/// The delegator itself: a list of `(predicate, writer)` pairs. `dispatch`
/// forwards a tagged slice to every writer whose predicate accepts it, in
/// registration order — the "capability set" of spec.md §9.
#[derive(Default)]
pub struct WriterRegistry<'a> {
    entries: Vec<(Predicate<'a>, Box<dyn SliceWriter + 'a>)>,
}

impl<'a> WriterRegistry<'a> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn register(
        &mut self,
        predicate: impl Fn(SliceTag) -> bool + 'a,
        writer: Box<dyn SliceWriter + 'a>,
    ) {
        self.entries.push((Box::new(predicate), writer));
    }

    pub fn dispatch(&mut self, tag: SliceTag, paths: &PolygonSet) -> std::io::Result<()> {
        for (predicate, writer) in &mut self.entries {
            if predicate(tag) {
                writer.write(tag, paths)?;
            }
        }
        Ok(())
    }
}

/// Dumps `(type, ntool, z)`-tagged paths as plain text, one line per path.
pub struct RawDebugWriter<W: std::io::Write> {
    out: W,
}

impl<W: std::io::Write> RawDebugWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: std::io::Write> SliceWriter for RawDebugWriter<W> {
    fn write(&mut self, tag: SliceTag, paths: &PolygonSet) -> std::io::Result<()> {
        writeln!(
            self.out,
            "type={} ntool={} z={} paths={}",
            tag.record_type,
            tag.ntool,
            tag.z,
            paths.paths.len()
        )?;
        for path in &paths.paths {
            writeln!(self.out, "  {} point(s)", path.points.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::{Path, Point};

    #[test]
    fn dispatch_only_calls_matching_writers() {
        let mut registry = WriterRegistry::new();
        let mut buf = Vec::new();
        registry.register(|tag| tag.ntool == 0, Box::new(RawDebugWriter::new(&mut buf)));

        let square = PolygonSet::new(vec![Path::closed(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ])]);

        registry
            .dispatch(SliceTag { record_type: 2, ntool: 1, z: 0.0 }, &square)
            .unwrap();
        assert!(buf.is_empty());

        registry
            .dispatch(SliceTag { record_type: 2, ntool: 0, z: 0.0 }, &square)
            .unwrap();
        assert!(!buf.is_empty());
    }
}
