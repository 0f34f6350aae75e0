//! Data table I/O
//!
//! Plain-text trajectory tables, one sample per line:
//!
//! ```text
//! TrackId Frame PosX PosZ [Label]
//! ```
//!
//! The optional trailing label is ignored on read and written as
//! `Person` on write. Rows may appear in any order; each track's start
//! frame is the minimum frame observed for its id, and every track
//! must cover a gap-free frame range.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::errors::LoadError;
use crate::model::{Data, Trajectory};

fn parse_field<T: std::str::FromStr>(
    token: &str,
    path: &Path,
    line: usize,
    what: &str,
) -> Result<T, LoadError> {
    token.parse::<T>().map_err(|_| LoadError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("expected {}, got {:?}", what, token),
    })
}

/// Read a data table from disk.
///
/// Track ids must be contiguous from zero; the result holds one
/// trajectory per id with dimensions in column order (PosX, PosZ).
pub fn read_data(path: impl AsRef<Path>) -> Result<Data, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // id -> frame -> (x, z); BTreeMap keeps frames sorted per track
    let mut tracks: BTreeMap<usize, BTreeMap<usize, (f64, f64)>> = BTreeMap::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(LoadError::Parse {
                path: path.to_path_buf(),
                line,
                message: format!("expected at least 4 fields, got {}", fields.len()),
            });
        }
        let id: usize = parse_field(fields[0], path, line, "a track id")?;
        let frame: usize = parse_field(fields[1], path, line, "a frame number")?;
        let x: f64 = parse_field(fields[2], path, line, "a number")?;
        let z: f64 = parse_field(fields[3], path, line, "a number")?;
        if tracks.entry(id).or_default().insert(frame, (x, z)).is_some() {
            return Err(LoadError::Parse {
                path: path.to_path_buf(),
                line,
                message: format!("duplicate sample for track {} at frame {}", id, frame),
            });
        }
    }

    let mut data = Data::new();
    for (expected_id, (id, frames)) in tracks.iter().enumerate() {
        if *id != expected_id {
            return Err(LoadError::Invalid {
                description: format!(
                    "track ids must be contiguous from 0; missing id {}",
                    expected_id
                ),
            });
        }
        let start = *frames.keys().next().unwrap_or(&0);
        let end = *frames.keys().next_back().unwrap_or(&0);
        if frames.len() != end - start + 1 {
            return Err(LoadError::Invalid {
                description: format!(
                    "track {} covers [{}, {}] but has {} samples",
                    id,
                    start,
                    end,
                    frames.len()
                ),
            });
        }
        let mut xs = Vec::with_capacity(frames.len());
        let mut zs = Vec::with_capacity(frames.len());
        for &(x, z) in frames.values() {
            xs.push(x);
            zs.push(z);
        }
        let mut traj = Trajectory::new(start);
        traj.push_dimension(xs).map_err(|e| LoadError::Invalid {
            description: format!("track {}: {}", id, e),
        })?;
        traj.push_dimension(zs).map_err(|e| LoadError::Invalid {
            description: format!("track {}: {}", id, e),
        })?;
        data.push(traj);
    }
    Ok(data)
}

/// Write a data table to disk, one row per track and frame.
///
/// Only the first two dimensions are written; tracks with fewer than
/// two dimensions are rejected.
pub fn write_data(path: impl AsRef<Path>, data: &Data) -> Result<(), LoadError> {
    let path = path.as_ref();
    let io_err = |source: std::io::Error| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::io::BufWriter::new(std::fs::File::create(path).map_err(io_err)?);
    for (id, traj) in data.iter().enumerate() {
        if traj.dimensions() < 2 {
            return Err(LoadError::Invalid {
                description: format!(
                    "track {} has {} dimensions, need at least 2",
                    id,
                    traj.dimensions()
                ),
            });
        }
        for frame in traj.start()..=traj.end() {
            let x = traj.value(0, frame).map_err(|e| LoadError::Invalid {
                description: e.to_string(),
            })?;
            let z = traj.value(1, frame).map_err(|e| LoadError::Invalid {
                description: e.to_string(),
            })?;
            writeln!(file, "{} {} {} {} Person", id, frame, x, z).map_err(io_err)?;
        }
    }
    file.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_grouped_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        // Out of order on purpose
        std::fs::write(
            &path,
            "1 6 4.0 5.0 Person\n0 5 1.0 2.0\n0 6 1.5 2.5\n1 5 3.0 4.0\n",
        )
        .unwrap();
        let data = read_data(&path).unwrap();
        assert_eq!(data.len(), 2);
        let t0 = data.get(0).unwrap();
        assert_eq!(t0.start(), 5);
        assert_eq!(t0.value(0, 6).unwrap(), 1.5);
        let t1 = data.get(1).unwrap();
        assert_eq!(t1.value(1, 6).unwrap(), 5.0);
    }

    #[test]
    fn test_read_rejects_gap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "0 0 1.0 1.0\n0 2 2.0 2.0\n").unwrap();
        assert!(matches!(
            read_data(&path),
            Err(LoadError::Invalid { .. })
        ));
    }

    #[test]
    fn test_read_rejects_short_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "0 0 1.0\n").unwrap();
        assert!(matches!(read_data(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_read_rejects_noncontiguous_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "0 0 1.0 1.0\n2 0 2.0 2.0\n").unwrap();
        assert!(matches!(
            read_data(&path),
            Err(LoadError::Invalid { .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut data = Data::new();
        let mut traj = Trajectory::with_zeros(3, 4, 2).unwrap();
        traj.set_value(0, 4, 1.25).unwrap();
        traj.set_value(1, 6, -2.5).unwrap();
        data.push(traj);

        write_data(&path, &data).unwrap();
        let loaded = read_data(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let t = loaded.get(0).unwrap();
        assert_eq!(t.start(), 3);
        assert_eq!(t.size(), 4);
        assert_eq!(t.value(0, 4).unwrap(), 1.25);
        assert_eq!(t.value(1, 6).unwrap(), -2.5);
    }
}
