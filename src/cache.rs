use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::tracks::TrackStore;

/// Bump when the serialized track layout changes. Stale blobs are
/// recomputed instead of trusted.
const CACHE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CacheBlob<T> {
    version: u32,
    tracks: T,
}

/// Persist the whole track store, overwriting any existing file.
pub fn save(tracks: &TrackStore, path: &Path) -> Result<(), Error> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer(
        file,
        &CacheBlob {
            version: CACHE_VERSION,
            tracks,
        },
    )?;

    log::debug!("saved track cache to {}", path.display());
    Ok(())
}

/// Reload a previously saved track store. `Ok(None)` when the file does
/// not exist or carries a stale version; both fall through to a full
/// recomputation.
pub fn load(path: &Path) -> Result<Option<TrackStore>, Error> {
    if !path.exists() {
        return Ok(None);
    }

    let file = BufReader::new(File::open(path)?);
    let blob: CacheBlob<TrackStore> = serde_json::from_reader(file)?;

    if blob.version != CACHE_VERSION {
        log::warn!(
            "stale track cache at {} (version {}, expected {}), recomputing",
            path.display(),
            blob.version,
            CACHE_VERSION
        );
        return Ok(None);
    }

    Ok(Some(blob.tracks))
}
