//! On-disk layout of the document store.
//!
//! Each save writes a complete snapshot generation into its own directory:
//!
//! ```text
//! <store dir>/
//!   CURRENT                  snapshot id of the live generation
//!   snapshot-<id>/
//!     index.bin              the vector matrix
//!     metadata.json          document registry and per-chunk metadata
//!     chunks.json            chunk texts
//! ```
//!
//! All three files of a generation carry its snapshot id. A new generation
//! is written and synced in full before `CURRENT` is replaced with a single
//! rename, so readers see either the old generation or the new one. Older
//! generations are removed after the switch. A load refuses files whose
//! snapshot ids, format versions or row counts disagree.
//!
//! Binary layout of `index.bin`:
//! - 8 bytes: magic `FOLIOIDX`
//! - 4 bytes: format version (u32 LE)
//! - 16 bytes: snapshot id (UUID bytes)
//! - 8 bytes: row count N (u64 LE)
//! - 4 bytes: dimension D (u32 LE)
//! - N * D * 4 bytes: f32 LE values in row-major order

use super::{ChunkMetadata, DocumentRecord};
use crate::error::{FolioError, Result};
use crate::vector_store::Matrix;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

/// Version written into every artifact. Bump on incompatible layout changes.
pub const FORMAT_VERSION: u32 = 1;

const INDEX_MAGIC: &[u8; 8] = b"FOLIOIDX";
const INDEX_HEADER_SIZE: usize = 8 + 4 + 16 + 8 + 4;

const CURRENT_FILE: &str = "CURRENT";
const SNAPSHOT_PREFIX: &str = "snapshot-";

/// Location of a store directory and its `CURRENT` pointer.
#[derive(Debug, Clone)]
pub struct StorePaths {
    dir: PathBuf,
    current: PathBuf,
}

/// The three artifacts of one snapshot generation.
#[derive(Debug, Clone)]
pub struct Generation {
    pub id: Uuid,
    pub dir: PathBuf,
    pub index: PathBuf,
    pub metadata: PathBuf,
    pub chunks: PathBuf,
}

impl Generation {
    fn all(&self) -> [&PathBuf; 3] {
        [&self.index, &self.metadata, &self.chunks]
    }

    fn all_exist(&self) -> bool {
        self.all().iter().all(|p| p.exists())
    }
}

impl StorePaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            current: dir.join(CURRENT_FILE),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn generation(&self, id: Uuid) -> Generation {
        let dir = self.dir.join(format!("{}{}", SNAPSHOT_PREFIX, id));
        Generation {
            id,
            index: dir.join("index.bin"),
            metadata: dir.join("metadata.json"),
            chunks: dir.join("chunks.json"),
            dir,
        }
    }

    /// The generation `CURRENT` points to, or `None` if there is no pointer.
    pub fn current_generation(&self) -> Result<Option<Generation>> {
        let content = match std::fs::read_to_string(&self.current) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let id = Uuid::parse_str(content.trim()).map_err(|_| {
            FolioError::Persistence(format!(
                "{} does not hold a snapshot id",
                self.current.display()
            ))
        })?;
        Ok(Some(self.generation(id)))
    }

    /// Whether a live generation with all three artifacts is present.
    pub fn all_exist(&self) -> bool {
        matches!(self.current_generation(), Ok(Some(g)) if g.all_exist())
    }

    /// Remove the pointer and every generation.
    pub fn remove_all(&self) -> Result<()> {
        match std::fs::remove_file(&self.current) {
            Ok(()) => debug!("Removed {}", self.current.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        for dir in self.generations_except(None)? {
            std::fs::remove_dir_all(&dir)?;
            debug!("Removed {}", dir.display());
        }
        Ok(())
    }

    /// Generation directories on disk, skipping `keep`.
    fn generations_except(&self, keep: Option<Uuid>) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let keep = keep.map(|id| format!("{}{}", SNAPSHOT_PREFIX, id));
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(SNAPSHOT_PREFIX)
                && keep.as_deref() != Some(name.as_str())
                && entry.file_type()?.is_dir()
            {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MetadataFile {
    format_version: u32,
    snapshot_id: Uuid,
    documents: Vec<DocumentRecord>,
    chunks: Vec<ChunkMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChunksFile {
    format_version: u32,
    snapshot_id: Uuid,
    texts: Vec<String>,
}

/// Borrowed view of the state to persist.
pub struct SnapshotRef<'a> {
    pub documents: &'a [DocumentRecord],
    pub metadata: &'a [ChunkMetadata],
    pub texts: &'a [String],
    pub vectors: &'a Matrix,
}

/// Owned state read back from disk.
#[derive(Debug)]
pub struct Snapshot {
    pub documents: Vec<DocumentRecord>,
    pub metadata: Vec<ChunkMetadata>,
    pub texts: Vec<String>,
    pub vectors: Matrix,
}

/// Write a new generation and make it the live one.
///
/// The live generation is untouched until the `CURRENT` rename. On failure
/// the partly written generation is removed and the previous one stays live.
pub fn save(paths: &StorePaths, snapshot: SnapshotRef<'_>) -> Result<()> {
    if snapshot.metadata.len() != snapshot.texts.len()
        || snapshot.texts.len() != snapshot.vectors.rows()
    {
        return Err(FolioError::Persistence(format!(
            "refusing to save misaligned state: {} texts, {} metadata, {} vectors",
            snapshot.texts.len(),
            snapshot.metadata.len(),
            snapshot.vectors.rows()
        )));
    }

    std::fs::create_dir_all(&paths.dir)?;
    let generation = paths.generation(Uuid::new_v4());

    let written = write_generation(&generation, &snapshot).and_then(|()| commit(paths, generation.id));
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_dir_all(&generation.dir) {
            debug!("Could not remove {}: {}", generation.dir.display(), cleanup);
        }
        return Err(e);
    }

    // The new generation is live; anything older is garbage.
    match paths.generations_except(Some(generation.id)) {
        Ok(stale) => {
            for dir in stale {
                if let Err(e) = std::fs::remove_dir_all(&dir) {
                    warn!("Could not remove old snapshot {}: {}", dir.display(), e);
                }
            }
        }
        Err(e) => warn!("Could not list old snapshots: {}", e),
    }

    debug!(
        "Saved snapshot {} ({} chunks, dimension {})",
        generation.id,
        snapshot.texts.len(),
        snapshot.vectors.dim()
    );
    Ok(())
}

fn write_generation(generation: &Generation, snapshot: &SnapshotRef<'_>) -> Result<()> {
    let index_bytes = encode_index(generation.id, snapshot.vectors)?;
    let metadata_bytes = serde_json::to_vec(&MetadataFile {
        format_version: FORMAT_VERSION,
        snapshot_id: generation.id,
        documents: snapshot.documents.to_vec(),
        chunks: snapshot.metadata.to_vec(),
    })?;
    let chunks_bytes = serde_json::to_vec(&ChunksFile {
        format_version: FORMAT_VERSION,
        snapshot_id: generation.id,
        texts: snapshot.texts.to_vec(),
    })?;

    std::fs::create_dir(&generation.dir)?;
    write_synced(&generation.index, &index_bytes)?;
    write_synced(&generation.metadata, &metadata_bytes)?;
    write_synced(&generation.chunks, &chunks_bytes)?;
    sync_dir(&generation.dir);
    Ok(())
}

/// Point `CURRENT` at `id` with one atomic rename.
fn commit(paths: &StorePaths, id: Uuid) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(&paths.dir)?;
    writeln!(tmp, "{}", id)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&paths.current).map_err(|e| {
        FolioError::Persistence(format!("failed to replace {}: {}", paths.current.display(), e))
    })?;
    sync_dir(&paths.dir);
    Ok(())
}

/// Read the live generation, or `None` if there is none or it is incomplete.
pub fn load(paths: &StorePaths) -> Result<Option<Snapshot>> {
    let Some(generation) = paths.current_generation()? else {
        return Ok(None);
    };
    if !generation.all_exist() {
        warn!(
            "Snapshot {} is missing files, starting with an empty store",
            generation.id
        );
        return Ok(None);
    }

    let (index_snapshot, vectors) = decode_index(&std::fs::read(&generation.index)?)?;
    let metadata: MetadataFile = serde_json::from_slice(&std::fs::read(&generation.metadata)?)?;
    let chunks: ChunksFile = serde_json::from_slice(&std::fs::read(&generation.chunks)?)?;

    for (name, version) in [
        ("metadata", metadata.format_version),
        ("chunks", chunks.format_version),
    ] {
        if version != FORMAT_VERSION {
            return Err(FolioError::Persistence(format!(
                "{} file has format version {}, expected {}",
                name, version, FORMAT_VERSION
            )));
        }
    }

    if [index_snapshot, metadata.snapshot_id, chunks.snapshot_id]
        .iter()
        .any(|id| *id != generation.id)
    {
        return Err(FolioError::Persistence(format!(
            "files in snapshot {} belong to different snapshots",
            generation.id
        )));
    }

    if metadata.chunks.len() != chunks.texts.len() || chunks.texts.len() != vectors.rows() {
        return Err(FolioError::Persistence(format!(
            "store files are misaligned: {} texts, {} metadata, {} vectors",
            chunks.texts.len(),
            metadata.chunks.len(),
            vectors.rows()
        )));
    }

    let known: HashSet<&str> = metadata.documents.iter().map(|d| d.id.as_str()).collect();
    if let Some(orphan) = metadata
        .chunks
        .iter()
        .find(|c| !known.contains(c.document_id.as_str()))
    {
        return Err(FolioError::Persistence(format!(
            "chunk refers to unknown document {}",
            orphan.document_id
        )));
    }

    Ok(Some(Snapshot {
        documents: metadata.documents,
        metadata: metadata.chunks,
        texts: chunks.texts,
        vectors,
    }))
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = std::fs::File::open(dir).and_then(|d| d.sync_all()) {
        debug!("Could not sync store directory: {}", e);
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

fn encode_index(snapshot_id: Uuid, vectors: &Matrix) -> Result<Vec<u8>> {
    let dim = u32::try_from(vectors.dim())
        .map_err(|_| FolioError::Persistence("vector dimension exceeds u32".to_string()))?;

    let values = vectors.as_slice();
    let mut bytes = Vec::with_capacity(INDEX_HEADER_SIZE + std::mem::size_of_val(values));
    bytes.extend_from_slice(INDEX_MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(snapshot_id.as_bytes());
    bytes.extend_from_slice(&(vectors.rows() as u64).to_le_bytes());
    bytes.extend_from_slice(&dim.to_le_bytes());
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    Ok(bytes)
}

fn decode_index(bytes: &[u8]) -> Result<(Uuid, Matrix)> {
    if bytes.len() < INDEX_HEADER_SIZE || &bytes[0..8] != INDEX_MAGIC {
        return Err(FolioError::Persistence("index file is not a Folio index".to_string()));
    }

    let version = u32::from_le_bytes(read_array(&bytes[8..12]));
    if version != FORMAT_VERSION {
        return Err(FolioError::Persistence(format!(
            "index file has format version {}, expected {}",
            version, FORMAT_VERSION
        )));
    }

    let snapshot_id = Uuid::from_bytes(read_array(&bytes[12..28]));
    let rows = u64::from_le_bytes(read_array(&bytes[28..36])) as usize;
    let dim = u32::from_le_bytes(read_array(&bytes[36..40])) as usize;

    let payload = &bytes[INDEX_HEADER_SIZE..];
    let expected = rows
        .checked_mul(dim)
        .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()));
    if expected != Some(payload.len()) {
        return Err(FolioError::Persistence(format!(
            "index file is truncated: {} rows x {} dims does not match {} bytes",
            rows,
            dim,
            payload.len()
        )));
    }

    let data: Vec<f32> = payload
        .chunks_exact(std::mem::size_of::<f32>())
        .map(|b| f32::from_le_bytes(read_array(b)))
        .collect();
    Ok((snapshot_id, Matrix::from_flat(rows, dim, data)?))
}

fn read_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}
