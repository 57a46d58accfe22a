//! Snapshot persistence for the record store.
//!
//! Discovery runs are long and resumable, so the store can be written out as
//! a versioned binary snapshot and reloaded later. The file carries a magic
//! header and a format version; the payload is a bincode-encoded map of
//! regions to their records, and R-tree indexes are rebuilt on load.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PanostatError, Result};
use crate::store::MemoryStore;
use crate::types::PanoramaRecord;

const SNAPSHOT_MAGIC: &[u8; 8] = b"PANOSNP\0";
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotData {
    version: u32,
    regions: BTreeMap<String, Vec<PanoramaRecord>>,
}

/// Write the full store contents to a snapshot file.
///
/// # Examples
///
/// ```rust,no_run
/// use panostat::MemoryStore;
/// use panostat::persistence::save_snapshot;
///
/// let store = MemoryStore::new();
/// save_snapshot(&store, "panos.snapshot")?;
/// # Ok::<(), panostat::PanostatError>(())
/// ```
pub fn save_snapshot<P: AsRef<Path>>(store: &MemoryStore, path: P) -> Result<()> {
    let regions: BTreeMap<String, Vec<PanoramaRecord>> = store
        .region_records()
        .map(|(name, records)| (name.to_string(), records.cloned().collect()))
        .collect();

    let data = SnapshotData {
        version: SNAPSHOT_VERSION,
        regions,
    };

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(SNAPSHOT_MAGIC)?;
    bincode::serialize_into(&mut writer, &data)
        .map_err(|e| PanostatError::Snapshot(format!("failed to encode snapshot: {}", e)))?;
    writer.flush()?;

    Ok(())
}

/// Load a store from a snapshot file, rebuilding spatial indexes.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<MemoryStore> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;
    if &magic != SNAPSHOT_MAGIC {
        return Err(PanostatError::Snapshot(
            "not a panostat snapshot file".into(),
        ));
    }

    let data: SnapshotData = bincode::deserialize_from(&mut reader)
        .map_err(|e| PanostatError::Snapshot(format!("failed to decode snapshot: {}", e)))?;

    if data.version != SNAPSHOT_VERSION {
        return Err(PanostatError::Snapshot(format!(
            "unsupported snapshot version {} (expected {})",
            data.version, SNAPSHOT_VERSION
        )));
    }

    let mut store = MemoryStore::new();
    for (region, records) in data.regions {
        store.insert_batch(&region, records)?;
    }

    Ok(store)
}
