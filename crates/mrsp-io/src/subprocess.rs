//! The mesh-slicer subprocess protocol (spec.md §6), grounded in
//! `original_source/interfaces/slicermanager.cpp`'s `ExternalSlicerManager`
//! and `original_source/interfaces/subprocess.{hpp,cpp}`.
//!
//! The wire exchange itself is expressed over any `Read`/`Write` pair so it
//! can be tested against an in-memory pipe; [`MeshSlicerProcess`] wraps a
//! spawned child's stdio handles the same way.

use crate::error::{IoKindError, IoKindResult};
use mrsp_core::{Path, PolygonSet};
use std::io::{Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// The seven limit values the slicer reports once the mesh is loaded
/// (spec.md §6 "seven float64s").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshLimits {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub scaling_factor: f64,
}

/// Client side of the bidirectional pipe exchange with the mesh-slicer
/// child process (spec.md §6 "Mesh-slicer subprocess").
pub struct MeshSlicerClient<R: Read, W: Write> {
    read: R,
    write: W,
    /// Whether the child reports `needRepair` before the limits block; off
    /// when the caller already requested an unconditional repair.
    repair_on_demand: bool,
}

impl<R: Read, W: Write> MeshSlicerClient<R, W> {
    pub fn new(read: R, write: W, repair_on_demand: bool) -> Self {
        Self {
            read,
            write,
            repair_on_demand,
        }
    }

    /// Reads the child's startup response: an optional `needRepair` flag,
    /// then the seven mesh limit values.
    pub fn read_limits(&mut self) -> IoKindResult<MeshLimits> {
        if self.repair_on_demand {
            let need_repair = read_i64(&mut self.read)?;
            if need_repair != 0 {
                return Err(IoKindError::Slicer("mesh needs repair".into()));
            }
        }
        let mut buf = [0.0f64; 7];
        for slot in &mut buf {
            *slot = read_f64(&mut self.read)?;
        }
        Ok(MeshLimits {
            min_x: buf[0],
            max_x: buf[1],
            min_y: buf[2],
            max_y: buf[3],
            min_z: buf[4],
            max_z: buf[5],
            scaling_factor: buf[6],
        })
    }

    /// Sends the schedule of Z values the parent wants cross-sections for
    /// (spec.md §6 "Request (parent → child)").
    pub fn send_zs(&mut self, zs: &[f64]) -> IoKindResult<()> {
        write_i64(&mut self.write, zs.len() as i64)?;
        for &z in zs {
            write_f64(&mut self.write, z)?;
        }
        self.write.flush()?;
        Ok(())
    }

    /// Reads the next raw slice: a length-prefixed clipper-paths payload
    /// identical in shape to the paths-file `saveFormat=0` encoding.
    pub fn read_next_slice(&mut self) -> IoKindResult<PolygonSet> {
        let num_paths = read_i64(&mut self.read)?;
        let mut paths = Vec::with_capacity(num_paths.max(0) as usize);
        for _ in 0..num_paths {
            let num_points = read_i64(&mut self.read)?;
            let mut points = Vec::with_capacity(num_points.max(0) as usize);
            for _ in 0..num_points {
                let x = read_i64(&mut self.read)?;
                let y = read_i64(&mut self.read)?;
                points.push(mrsp_core::Point::new(x, y));
            }
            let closed = points.len() > 1 && points.first() == points.last();
            if closed {
                points.pop();
            }
            paths.push(if closed { Path::closed(points) } else { Path::open(points) });
        }
        Ok(PolygonSet::new(paths))
    }

    /// Reads exactly `n` raw slices in schedule order (spec.md §5 "RawSlice
    /// reception order matches the `rawZs` schedule emitted to the mesh
    /// slicer").
    pub fn read_all_slices(&mut self, n: usize) -> IoKindResult<Vec<PolygonSet>> {
        (0..n).map(|_| self.read_next_slice()).collect()
    }
}

fn write_i64<W: Write>(w: &mut W, v: i64) -> IoKindResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}
fn write_f64<W: Write>(w: &mut W, v: f64) -> IoKindResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
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

/// Spawns the mesh-slicer helper binary and owns its stdio pipes, mirroring
/// `SubProcessManager`'s `repair`/`norepair`, `incremental`/`noincremental`,
/// `<meshfile>` argument convention.
pub struct MeshSlicerProcess {
    child: Child,
    client: MeshSlicerClient<ChildStdout, ChildStdin>,
}

impl MeshSlicerProcess {
    pub fn spawn(
        executable: &str,
        mesh_filename: &str,
        repair: bool,
        incremental: bool,
    ) -> IoKindResult<Self> {
        let mut child = Command::new(executable)
            .arg(if repair { "repair" } else { "norepair" })
            .arg(if incremental { "incremental" } else { "noincremental" })
            .arg(mesh_filename)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().ok_or_else(|| IoKindError::Slicer("no stdin pipe".into()))?;
        let stdout = child.stdout.take().ok_or_else(|| IoKindError::Slicer("no stdout pipe".into()))?;
        let client = MeshSlicerClient::new(stdout, stdin, !repair);
        Ok(Self { child, client })
    }

    pub fn client_mut(&mut self) -> &mut MeshSlicerClient<ChildStdout, ChildStdin> {
        &mut self.client
    }

    /// Cooperative cancellation (spec.md §5): send a termination signal and
    /// reap the child.
    pub fn terminate(&mut self) -> IoKindResult<()> {
        self.child.kill().ok();
        self.child.wait()?;
        Ok(())
    }

    pub fn wait(&mut self) -> IoKindResult<std::process::ExitStatus> {
        Ok(self.child.wait()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_limits(repair_on_demand: bool, need_repair: i64, limits: [f64; 7]) -> Vec<u8> {
        let mut buf = Vec::new();
        if repair_on_demand {
            buf.extend_from_slice(&need_repair.to_le_bytes());
        }
        for v in limits {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    #[test]
    fn read_limits_without_repair_flag() {
        let bytes = encode_limits(false, 0, [0.0, 10.0, 0.0, 10.0, 0.0, 5.0, 1000.0]);
        let mut client = MeshSlicerClient::new(Cursor::new(bytes), Vec::new(), false);
        let limits = client.read_limits().unwrap();
        assert_eq!(limits.max_x, 10.0);
        assert_eq!(limits.scaling_factor, 1000.0);
    }

    #[test]
    fn read_limits_honors_need_repair_flag() {
        let bytes = encode_limits(true, 1, [0.0; 7]);
        let mut client = MeshSlicerClient::new(Cursor::new(bytes), Vec::new(), true);
        assert!(client.read_limits().is_err());
    }

    #[test]
    fn send_zs_writes_count_then_values() {
        let mut out = Vec::new();
        {
            let mut client = MeshSlicerClient::new(Cursor::new(Vec::new()), &mut out, false);
            client.send_zs(&[0.0, 1.5, 3.0]).unwrap();
        }
        let mut cur = Cursor::new(&out);
        assert_eq!(read_i64(&mut cur).unwrap(), 3);
        assert_eq!(read_f64(&mut cur).unwrap(), 0.0);
        assert_eq!(read_f64(&mut cur).unwrap(), 1.5);
        assert_eq!(read_f64(&mut cur).unwrap(), 3.0);
    }

    #[test]
    fn read_next_slice_decodes_closed_and_open_paths() {
        let mut buf = Vec::new();
        write_i64(&mut buf, 2).unwrap(); // numPaths
        // closed square, repeating first point
        write_i64(&mut buf, 5).unwrap();
        for (x, y) in [(0, 0), (10, 0), (10, 10), (0, 10), (0, 0)] {
            write_i64(&mut buf, x).unwrap();
            write_i64(&mut buf, y).unwrap();
        }
        // open segment
        write_i64(&mut buf, 2).unwrap();
        for (x, y) in [(1, 1), (2, 2)] {
            write_i64(&mut buf, x).unwrap();
            write_i64(&mut buf, y).unwrap();
        }
        let mut client = MeshSlicerClient::new(Cursor::new(buf), Vec::new(), false);
        let slice = client.read_next_slice().unwrap();
        assert_eq!(slice.paths.len(), 2);
        assert!(slice.paths[0].closed);
        assert_eq!(slice.paths[0].points.len(), 4);
        assert!(!slice.paths[1].closed);
    }
}
