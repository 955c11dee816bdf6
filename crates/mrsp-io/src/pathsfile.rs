//! The paths-file binary container (spec.md §6), grounded in
//! `original_source/interfaces/pathsfile.{hpp,cpp}`'s `FileHeader` /
//! `SliceHeader` / `writeSlice` / `seekNextMatchingPathsFromFile`.
//!
//! Little-endian throughout, stream-framed: one [`FileHeader`] followed by
//! `numRecords` [`SliceRecord`]s. `numRecords` may be rewritten in place
//! once the stream is finalized, at [`FileHeader::num_records_offset`].

use crate::error::{IoKindError, IoKindResult};
use mrsp_core::{Path, Point, Point3, PolygonSet};
use std::io::{Read, Seek, SeekFrom, Write};

const MAGIC: [u8; 4] = *b"PATH";
const CURRENT_VERSION: u32 = 0;

/// Per-tool voxel parameters stored in the file header (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelFileSpec {
    pub radius_x: f64,
    /// Present only when the header was built with `use_sched`.
    pub radius_z: Option<f64>,
    pub z_height: Option<f64>,
    pub z_application_point: Option<f64>,
}

impl VoxelFileSpec {
    pub fn without_schedule(radius_x: f64) -> Self {
        Self {
            radius_x,
            radius_z: None,
            z_height: None,
            z_application_point: None,
        }
    }

    pub fn with_schedule(radius_x: f64, radius_z: f64, z_height: f64, z_application_point: f64) -> Self {
        Self {
            radius_x,
            radius_z: Some(radius_z),
            z_height: Some(z_height),
            z_application_point: Some(z_application_point),
        }
    }
}

/// The fixed leading block of a paths file (spec.md §6 `FileHeader`).
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub version: u32,
    pub use_sched: bool,
    pub voxels: Vec<VoxelFileSpec>,
    pub num_records: i64,
}

impl FileHeader {
    pub fn new(voxels: Vec<VoxelFileSpec>, use_sched: bool) -> Self {
        Self {
            version: CURRENT_VERSION,
            use_sched,
            voxels,
            num_records: 0,
        }
    }

    pub fn numtools(&self) -> i64 {
        self.voxels.len() as i64
    }

    /// Byte offset of the `numRecords` field, for the caller's
    /// seek-back-and-rewrite pass once the stream is finalized.
    pub fn num_records_offset(&self) -> u64 {
        8 * (3 + self.numtools() * if self.use_sched { 4 } else { 1 }) as u64
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> IoKindResult<()> {
        w.write_all(&MAGIC)?;
        write_u32(w, self.version)?;
        write_i64(w, self.numtools())?;
        write_i64(w, self.use_sched as i64)?;
        for v in &self.voxels {
            write_f64(w, v.radius_x)?;
            if self.use_sched {
                write_f64(w, v.radius_z.unwrap_or(0.0))?;
                write_f64(w, v.z_height.unwrap_or(0.0))?;
                write_f64(w, v.z_application_point.unwrap_or(0.0))?;
            }
        }
        write_i64(w, self.num_records)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> IoKindResult<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(IoKindError::BadMagic(magic));
        }
        let version = read_u32(r)?;
        if version != CURRENT_VERSION {
            return Err(IoKindError::UnsupportedVersion(version));
        }
        let numtools = read_i64(r)?;
        let use_sched = read_i64(r)? != 0;
        let mut voxels = Vec::with_capacity(numtools.max(0) as usize);
        for _ in 0..numtools {
            let radius_x = read_f64(r)?;
            if use_sched {
                let radius_z = read_f64(r)?;
                let z_height = read_f64(r)?;
                let z_application_point = read_f64(r)?;
                voxels.push(VoxelFileSpec::with_schedule(radius_x, radius_z, z_height, z_application_point));
            } else {
                voxels.push(VoxelFileSpec::without_schedule(radius_x));
            }
        }
        let num_records = read_i64(r)?;
        Ok(Self {
            version,
            use_sched,
            voxels,
            num_records,
        })
    }

    /// Seeks back to [`Self::num_records_offset`] and overwrites the field,
    /// the way `FileHeader::writeToFile(f, alsoNumRecords=true)` does after
    /// the stream is finalized.
    pub fn rewrite_num_records<W: Write + Seek>(&self, w: &mut W, num_records: i64) -> IoKindResult<()> {
        w.seek(SeekFrom::Start(self.num_records_offset()))?;
        write_i64(w, num_records)?;
        Ok(())
    }
}

/// `type` field of a [`SliceHeader`] (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Raw,
    ProcessedContour,
    Toolpath,
    ToolpathInfilling,
}

impl RecordKind {
    fn to_i64(self) -> i64 {
        match self {
            RecordKind::Raw => 0,
            RecordKind::ProcessedContour => 1,
            RecordKind::Toolpath => 2,
            RecordKind::ToolpathInfilling => 3,
        }
    }

    fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(RecordKind::Raw),
            1 => Some(RecordKind::ProcessedContour),
            2 => Some(RecordKind::Toolpath),
            3 => Some(RecordKind::ToolpathInfilling),
            _ => None,
        }
    }
}

/// Whether a written path repeats its first point as its last (closed) or
/// not (open); spec.md §6 "Closed paths repeat the first point as the last
/// point."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCloseMode {
    Closed,
    Open,
}

/// How path coordinates are encoded in the payload (spec.md §6 `saveFormat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// `int64` clipper-style integer coordinates, scaled by `scaling`.
    Int64 = 0,
    /// `float64` 2D coordinates.
    Double2D = 1,
    /// `float64` 3D coordinates (`x, y, z`).
    Double3D = 2,
}

impl SaveFormat {
    fn from_i64(v: i64) -> IoKindResult<Self> {
        match v {
            0 => Ok(SaveFormat::Int64),
            1 => Ok(SaveFormat::Double2D),
            2 => Ok(SaveFormat::Double3D),
            other => Err(IoKindError::UnsupportedSaveFormat(other)),
        }
    }
}

/// Fixed-size fields preceding a slice record's payload (spec.md §6
/// `SliceHeader`). `numFields = 7`, each field 8 bytes wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceHeader {
    pub total_size: i64,
    pub header_size: i64,
    pub kind: RecordKind,
    /// `-1` for raw slices.
    pub ntool: i64,
    pub z: f64,
    pub save_format: SaveFormat,
    pub scaling: f64,
}

const SLICE_HEADER_SIZE: i64 = 7 * 8;

/// A full decoded record: header plus the paths it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum SlicePayload {
    Int(PolygonSet),
    Double2D(Vec<Path2D>),
    Double3D(Vec<Vec<Point3>>),
}

/// An open or closed path of `f64` 2D points (payload-only representation;
/// distinct from [`mrsp_core::Path`] since its internal coordinate system is
/// integer).
#[derive(Debug, Clone, PartialEq)]
pub struct Path2D {
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
}

pub struct SliceRecord {
    pub header: SliceHeader,
    pub payload: SlicePayload,
}

/// Writes one slice record: computes the payload, then the header framing
/// it (spec.md §6 `writeSlice`).
pub fn write_slice<W: Write>(
    w: &mut W,
    kind: RecordKind,
    ntool: i64,
    z: f64,
    scaling: f64,
    paths: &PolygonSet,
    mode: PathCloseMode,
) -> IoKindResult<()> {
    let payload = encode_int_payload(paths, mode);
    let total_size = SLICE_HEADER_SIZE + payload.len() as i64;
    write_i64(w, total_size)?;
    write_i64(w, SLICE_HEADER_SIZE)?;
    write_i64(w, kind.to_i64())?;
    write_i64(w, ntool)?;
    write_f64(w, z)?;
    write_i64(w, SaveFormat::Int64 as i64)?;
    write_f64(w, scaling)?;
    w.write_all(&payload)?;
    Ok(())
}

/// Writes one slice record whose payload is `f64` 2D coordinates
/// (`saveFormat=1`).
pub fn write_slice_double2d<W: Write>(
    w: &mut W,
    kind: RecordKind,
    ntool: i64,
    z: f64,
    paths: &[Path2D],
) -> IoKindResult<()> {
    let payload = encode_double2d_payload(paths);
    let total_size = SLICE_HEADER_SIZE + payload.len() as i64;
    write_i64(w, total_size)?;
    write_i64(w, SLICE_HEADER_SIZE)?;
    write_i64(w, kind.to_i64())?;
    write_i64(w, ntool)?;
    write_f64(w, z)?;
    write_i64(w, SaveFormat::Double2D as i64)?;
    write_f64(w, 1.0)?;
    w.write_all(&payload)?;
    Ok(())
}

/// Reads one slice record (header + decoded payload).
pub fn read_slice<R: Read>(r: &mut R) -> IoKindResult<SliceRecord> {
    let total_size = read_i64(r)?;
    let header_size = read_i64(r)?;
    let kind_raw = read_i64(r)?;
    let ntool = read_i64(r)?;
    let z = read_f64(r)?;
    let save_format = SaveFormat::from_i64(read_i64(r)?)?;
    let scaling = read_f64(r)?;
    let kind = RecordKind::from_i64(kind_raw)
        .ok_or_else(|| IoKindError::Config(format!("unknown slice record type {kind_raw}")))?;

    let extra_header_bytes = (header_size - SLICE_HEADER_SIZE).max(0) as usize;
    if extra_header_bytes > 0 {
        let mut skip = vec![0u8; extra_header_bytes];
        r.read_exact(&mut skip)?;
    }
    let payload_size = (total_size - header_size).max(0) as usize;
    let mut payload_bytes = vec![0u8; payload_size];
    r.read_exact(&mut payload_bytes)?;

    let header = SliceHeader {
        total_size,
        header_size,
        kind,
        ntool,
        z,
        save_format,
        scaling,
    };
    let payload = match save_format {
        SaveFormat::Int64 => SlicePayload::Int(decode_int_payload(&payload_bytes)?),
        SaveFormat::Double2D => SlicePayload::Double2D(decode_double2d_payload(&payload_bytes)?),
        SaveFormat::Double3D => SlicePayload::Double3D(decode_double3d_payload(&payload_bytes)?),
    };
    Ok(SliceRecord { header, payload })
}

/// Encodes a [`PolygonSet`] as `saveFormat=0` bytes: `numPaths`, then per
/// path `numPoints` followed by `(X, Y)` pairs, with closed paths repeating
/// their first point as their last (spec.md §6).
fn encode_int_payload(paths: &PolygonSet, mode: PathCloseMode) -> Vec<u8> {
    let mut out = Vec::new();
    write_i64(&mut out, paths.paths.len() as i64).unwrap();
    for path in &paths.paths {
        let repeated = mode == PathCloseMode::Closed && !path.points.is_empty();
        let count = path.points.len() + if repeated { 1 } else { 0 };
        write_i64(&mut out, count as i64).unwrap();
        for p in &path.points {
            write_i64(&mut out, p.x).unwrap();
            write_i64(&mut out, p.y).unwrap();
        }
        if repeated {
            let first = path.points[0];
            write_i64(&mut out, first.x).unwrap();
            write_i64(&mut out, first.y).unwrap();
        }
    }
    out
}

fn decode_int_payload(bytes: &[u8]) -> IoKindResult<PolygonSet> {
    let mut cur = std::io::Cursor::new(bytes);
    let num_paths = read_i64(&mut cur)?;
    let mut paths = Vec::with_capacity(num_paths.max(0) as usize);
    for _ in 0..num_paths {
        let num_points = read_i64(&mut cur)?;
        let mut points = Vec::with_capacity(num_points.max(0) as usize);
        for _ in 0..num_points {
            let x = read_i64(&mut cur)?;
            let y = read_i64(&mut cur)?;
            points.push(Point::new(x, y));
        }
        let closed = points.len() > 1 && points.first() == points.last();
        if closed {
            points.pop();
        }
        paths.push(if closed { Path::closed(points) } else { Path::open(points) });
    }
    Ok(PolygonSet::new(paths))
}

fn encode_double2d_payload(paths: &[Path2D]) -> Vec<u8> {
    let mut out = Vec::new();
    write_i64(&mut out, paths.len() as i64).unwrap();
    for path in paths {
        let repeated = path.closed && !path.points.is_empty();
        let count = path.points.len() + if repeated { 1 } else { 0 };
        write_i64(&mut out, count as i64).unwrap();
        for (x, y) in &path.points {
            write_f64(&mut out, *x).unwrap();
            write_f64(&mut out, *y).unwrap();
        }
        if repeated {
            let (x, y) = path.points[0];
            write_f64(&mut out, x).unwrap();
            write_f64(&mut out, y).unwrap();
        }
    }
    out
}

fn decode_double2d_payload(bytes: &[u8]) -> IoKindResult<Vec<Path2D>> {
    let mut cur = std::io::Cursor::new(bytes);
    let num_paths = read_i64(&mut cur)?;
    let mut paths = Vec::with_capacity(num_paths.max(0) as usize);
    for _ in 0..num_paths {
        let num_points = read_i64(&mut cur)?;
        let mut points = Vec::with_capacity(num_points.max(0) as usize);
        for _ in 0..num_points {
            let x = read_f64(&mut cur)?;
            let y = read_f64(&mut cur)?;
            points.push((x, y));
        }
        let closed = points.len() > 1 && points.first() == points.last();
        if closed {
            points.pop();
        }
        paths.push(Path2D { points, closed });
    }
    Ok(paths)
}

fn decode_double3d_payload(bytes: &[u8]) -> IoKindResult<Vec<Vec<Point3>>> {
    let mut cur = std::io::Cursor::new(bytes);
    let num_paths = read_i64(&mut cur)?;
    let mut paths = Vec::with_capacity(num_paths.max(0) as usize);
    for _ in 0..num_paths {
        let num_points = read_i64(&mut cur)?;
        let mut points = Vec::with_capacity(num_points.max(0) as usize);
        for _ in 0..num_points {
            let x = read_f64(&mut cur)?;
            let y = read_f64(&mut cur)?;
            let z = read_f64(&mut cur)?;
            points.push(Point3::new(x as i64, y as i64, z));
        }
        paths.push(points);
    }
    Ok(paths)
}

/// Pattern-matches a subset of a slice record's header fields, mirroring
/// `original_source/interfaces/pathsfile.hpp`'s `PathInFileSpec`.
#[derive(Debug, Clone, Default)]
pub struct PathInFileSpec {
    pub kind: Option<RecordKind>,
    pub ntool: Option<i64>,
    pub z: Option<f64>,
}

impl PathInFileSpec {
    pub fn matches(&self, header: &SliceHeader) -> bool {
        if let Some(k) = self.kind {
            if k != header.kind {
                return false;
            }
        }
        if let Some(n) = self.ntool {
            if n != header.ntool {
                return false;
            }
        }
        if let Some(z) = self.z {
            if (z - header.z).abs() > 1e-9 {
                return false;
            }
        }
        true
    }
}

/// Scans forward from the current reader position until a record matching
/// `spec` is found (or the stream is exhausted), returning the matching
/// record. Mirrors `seekNextMatchingPathsFromFile`.
pub fn seek_next_matching<R: Read>(r: &mut R, spec: &PathInFileSpec) -> IoKindResult<Option<SliceRecord>> {
    loop {
        let record = match read_slice(r) {
            Ok(rec) => rec,
            Err(IoKindError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        };
        if spec.matches(&record.header) {
            return Ok(Some(record));
        }
    }
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> IoKindResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}
fn write_i64<W: Write>(w: &mut W, v: i64) -> IoKindResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}
fn write_f64<W: Write>(w: &mut W, v: f64) -> IoKindResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}
fn read_u32<R: Read>(r: &mut R) -> IoKindResult<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}
fn read_i64<R: Read>(r: &mut R) -> IoKindResult<i64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(i64::from_le_bytes(b))
}
fn read_f64<R: Read>(r: &mut R) -> IoKindResult<f64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(f64::from_le_bytes(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_polygons() -> PolygonSet {
        PolygonSet::new(vec![
            Path::closed(vec![Point::new(0, 0), Point::new(100, 0), Point::new(100, 100), Point::new(0, 100)]),
            Path::open(vec![Point::new(5, 5), Point::new(50, 5)]),
        ])
    }

    #[test]
    fn file_header_round_trips_without_schedule() {
        let header = FileHeader::new(vec![VoxelFileSpec::without_schedule(75.0), VoxelFileSpec::without_schedule(10.0)], false);
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        let back = FileHeader::read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(header, back);
    }

    #[test]
    fn file_header_round_trips_with_schedule() {
        let header = FileHeader::new(
            vec![VoxelFileSpec::with_schedule(75.0, 40.0, 20.0, 10.0)],
            true,
        );
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        let back = FileHeader::read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(header, back);
    }

    #[test]
    fn num_records_offset_matches_formula() {
        let header = FileHeader::new(vec![VoxelFileSpec::without_schedule(1.0); 3], true);
        assert_eq!(header.num_records_offset(), 8 * (3 + 3 * 4));
    }

    #[test]
    fn rewrite_num_records_updates_in_place() {
        let header = FileHeader::new(vec![VoxelFileSpec::without_schedule(1.0)], false);
        let mut buf = Cursor::new(Vec::new());
        header.write_to(&mut buf).unwrap();
        header.rewrite_num_records(&mut buf, 42).unwrap();
        buf.set_position(0);
        let back = FileHeader::read_from(&mut buf).unwrap();
        assert_eq!(back.num_records, 42);
    }

    #[test]
    fn slice_record_int_round_trips_exact_bytes() {
        let polygons = sample_polygons();
        let mut buf = Vec::new();
        write_slice(&mut buf, RecordKind::Toolpath, 0, 12.5, 1000.0, &polygons, PathCloseMode::Closed).unwrap();
        let record = read_slice(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(record.header.kind, RecordKind::Toolpath);
        assert_eq!(record.header.ntool, 0);
        assert!((record.header.z - 12.5).abs() < 1e-12);
        match record.payload {
            SlicePayload::Int(back) => {
                assert_eq!(back.paths.len(), polygons.paths.len());
                assert_eq!(back.paths[0].points, polygons.paths[0].points);
                assert!(back.paths[0].closed);
                assert!(!back.paths[1].closed);
            }
            _ => panic!("expected int payload"),
        }
    }

    #[test]
    fn slice_record_double2d_round_trips_within_machine_epsilon() {
        let paths = vec![Path2D {
            points: vec![(1.5, 2.25), (3.75, 4.125)],
            closed: false,
        }];
        let mut buf = Vec::new();
        write_slice_double2d(&mut buf, RecordKind::ProcessedContour, 1, 3.0, &paths).unwrap();
        let record = read_slice(&mut Cursor::new(&buf)).unwrap();
        match record.payload {
            SlicePayload::Double2D(back) => {
                for (p, q) in back[0].points.iter().zip(paths[0].points.iter()) {
                    assert!((p.0 - q.0).abs() <= q.0.abs() * 2f64.powi(-52));
                    assert!((p.1 - q.1).abs() <= q.1.abs() * 2f64.powi(-52));
                }
            }
            _ => panic!("expected double2d payload"),
        }
    }

    #[test]
    fn seek_next_matching_finds_by_ntool_and_type() {
        let mut buf = Vec::new();
        write_slice(&mut buf, RecordKind::Raw, -1, 0.0, 1.0, &sample_polygons(), PathCloseMode::Closed).unwrap();
        write_slice(&mut buf, RecordKind::Toolpath, 2, 1.0, 1.0, &sample_polygons(), PathCloseMode::Closed).unwrap();
        let mut cur = Cursor::new(&buf);
        let spec = PathInFileSpec {
            kind: Some(RecordKind::Toolpath),
            ntool: Some(2),
            z: None,
        };
        let found = seek_next_matching(&mut cur, &spec).unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().header.ntool, 2);
    }

    #[test]
    fn seek_next_matching_returns_none_past_end_of_stream() {
        let buf = Vec::new();
        let mut cur = Cursor::new(&buf);
        let spec = PathInFileSpec::default();
        assert!(seek_next_matching(&mut cur, &spec).unwrap().is_none());
    }

    #[test]
    fn full_file_round_trip_reproduces_payload_bytes() {
        let header = FileHeader::new(vec![VoxelFileSpec::without_schedule(75.0)], false);
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        let polygons = sample_polygons();
        write_slice(&mut buf, RecordKind::Raw, -1, 0.0, 1.0, &polygons, PathCloseMode::Closed).unwrap();
        write_slice(&mut buf, RecordKind::Toolpath, 0, 0.0, 1.0, &polygons, PathCloseMode::Closed).unwrap();

        let mut cur = Cursor::new(&buf);
        let back_header = FileHeader::read_from(&mut cur).unwrap();
        assert_eq!(back_header.voxels, header.voxels);
        let rec1 = read_slice(&mut cur).unwrap();
        let rec2 = read_slice(&mut cur).unwrap();
        assert_eq!(rec1.header.kind, RecordKind::Raw);
        assert_eq!(rec2.header.kind, RecordKind::Toolpath);
    }
}
