//! On-disk ray log (spec.md §6 operation 5): an appended sequence of
//! `(snapshot_id, ray_idx, hit_xyz, direction, reflections)` records behind a
//! small self-describing binary header, written with `byteorder` the way the
//! teacher writes its own little-endian binary artefacts.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};
use crate::geom::Vec3;

const MAGIC: &[u8; 4] = b"SFRL";
const VERSION: u16 = 1;
/// little-endian = 0, matching the only byte order this writer ever emits.
const ENDIANNESS_LE: u16 = 0;
/// `snapshot_id: u64, ray_idx: u64, hit_xyz: 3*f64, direction: 3*f64,
/// reflections: u32`.
const RECORD_SIZE: u32 = 8 + 8 + 24 + 24 + 4;

/// One traced ray's terminal state, as logged per bounce (spec.md §6
/// operation 5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayLogRecord {
    pub snapshot_id: u64,
    pub ray_idx: u64,
    pub hit_xyz: Vec3<f64>,
    pub direction: Vec3<f64>,
    pub reflections: u32,
}

/// Appends ray-log records to a file, writing the self-describing header on
/// first creation only.
pub struct RayLogWriter {
    file: BufWriter<File>,
}

impl RayLogWriter {
    /// Opens `path` for appending, writing a fresh header if the file is
    /// empty or does not yet exist.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let needs_header = !path.exists() || std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::internal(format!("ray log: failed to open {}: {e}", path.display())))?;
        let mut file = BufWriter::new(file);
        if needs_header {
            file.write_all(MAGIC)
                .map_err(|e| Error::internal(format!("ray log: header write failed: {e}")))?;
            file.write_u16::<LittleEndian>(VERSION)
                .map_err(|e| Error::internal(format!("ray log: header write failed: {e}")))?;
            file.write_u16::<LittleEndian>(ENDIANNESS_LE)
                .map_err(|e| Error::internal(format!("ray log: header write failed: {e}")))?;
            file.write_u32::<LittleEndian>(RECORD_SIZE)
                .map_err(|e| Error::internal(format!("ray log: header write failed: {e}")))?;
        }
        Ok(Self { file })
    }

    pub fn append(&mut self, record: &RayLogRecord) -> Result<()> {
        let w = &mut self.file;
        w.write_u64::<LittleEndian>(record.snapshot_id)
            .and_then(|_| w.write_u64::<LittleEndian>(record.ray_idx))
            .and_then(|_| w.write_f64::<LittleEndian>(record.hit_xyz.x))
            .and_then(|_| w.write_f64::<LittleEndian>(record.hit_xyz.y))
            .and_then(|_| w.write_f64::<LittleEndian>(record.hit_xyz.z))
            .and_then(|_| w.write_f64::<LittleEndian>(record.direction.x))
            .and_then(|_| w.write_f64::<LittleEndian>(record.direction.y))
            .and_then(|_| w.write_f64::<LittleEndian>(record.direction.z))
            .and_then(|_| w.write_u32::<LittleEndian>(record.reflections))
            .map_err(|e| Error::internal(format!("ray log: record write failed: {e}")))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file
            .flush()
            .map_err(|e| Error::internal(format!("ray log: flush failed: {e}")))
    }
}

/// Header metadata read back from a ray log (spec.md §6 operation 5:
/// "self-describing header giving record size and endianness").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayLogHeader {
    pub version: u16,
    pub little_endian: bool,
    pub record_size: u32,
}

/// Reads an entire ray log back into memory. Provided for the caller's
/// convenience alongside the writer (spec.md §6 describes read access as
/// direct, but a library reader is in scope — only a standalone CLI isn't).
pub fn read_all(path: impl AsRef<Path>) -> Result<(RayLogHeader, Vec<RayLogRecord>)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::internal(format!("ray log: failed to open {}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|e| Error::invalid_input(format!("ray log: truncated header: {e}")))?;
    if &magic != MAGIC {
        return Err(Error::invalid_input("ray log: bad magic"));
    }
    let version = reader
        .read_u16::<LittleEndian>()
        .map_err(|e| Error::invalid_input(format!("ray log: truncated header: {e}")))?;
    let endianness = reader
        .read_u16::<LittleEndian>()
        .map_err(|e| Error::invalid_input(format!("ray log: truncated header: {e}")))?;
    let record_size = reader
        .read_u32::<LittleEndian>()
        .map_err(|e| Error::invalid_input(format!("ray log: truncated header: {e}")))?;
    if endianness != ENDIANNESS_LE {
        return Err(Error::invalid_input("ray log: only little-endian logs are supported"));
    }
    if record_size != RECORD_SIZE {
        return Err(Error::invalid_input(format!(
            "ray log: record size {record_size} does not match reader's {RECORD_SIZE}"
        )));
    }

    let header = RayLogHeader {
        version,
        little_endian: true,
        record_size,
    };

    let mut records = Vec::new();
    loop {
        let snapshot_id = match reader.read_u64::<LittleEndian>() {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::internal(format!("ray log: read failed: {e}"))),
        };
        let ray_idx = reader
            .read_u64::<LittleEndian>()
            .map_err(|e| Error::invalid_input(format!("ray log: truncated record: {e}")))?;
        let hx = reader
            .read_f64::<LittleEndian>()
            .map_err(|e| Error::invalid_input(format!("ray log: truncated record: {e}")))?;
        let hy = reader
            .read_f64::<LittleEndian>()
            .map_err(|e| Error::invalid_input(format!("ray log: truncated record: {e}")))?;
        let hz = reader
            .read_f64::<LittleEndian>()
            .map_err(|e| Error::invalid_input(format!("ray log: truncated record: {e}")))?;
        let dx = reader
            .read_f64::<LittleEndian>()
            .map_err(|e| Error::invalid_input(format!("ray log: truncated record: {e}")))?;
        let dy = reader
            .read_f64::<LittleEndian>()
            .map_err(|e| Error::invalid_input(format!("ray log: truncated record: {e}")))?;
        let dz = reader
            .read_f64::<LittleEndian>()
            .map_err(|e| Error::invalid_input(format!("ray log: truncated record: {e}")))?;
        let reflections = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| Error::invalid_input(format!("ray log: truncated record: {e}")))?;
        records.push(RayLogRecord {
            snapshot_id,
            ray_idx,
            hit_xyz: Vec3::new(hx, hy, hz),
            direction: Vec3::new(dx, dy, dz),
            reflections,
        });
    }

    Ok((header, records))
}
