//! Directory-backed artifact store with atomic set publication.
//!
//! Layout of the store directory:
//!
//! ```text
//! CURRENT                 name of the published generation
//! gen-<uuid>/
//!     extractor.bin       bincode TfIdfVectorizer
//!     model.bin           bincode TrainedModel
//!     metadata.json       ModelMetadata, with CRC32 of both blobs
//! ```
//!
//! A save writes and syncs a whole new generation directory before it
//! replaces `CURRENT` with a rename, so a loader sees either the previous
//! set or the new one. The generation it replaced is kept so that a loader
//! that already read the old pointer can finish; anything older is removed.
//! A loader that still loses the race re-reads `CURRENT` and retries.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::artifact::ArtifactSet;
use crate::artifact::metadata::{BlobChecksums, ModelMetadata};
use crate::error::{ArtifactError, DocClassError, Result};
use crate::feature::TfIdfVectorizer;
use crate::model::{Classifier, TrainedModel};

pub const CURRENT_FILE: &str = "CURRENT";
pub const EXTRACTOR_BLOB: &str = "extractor.bin";
pub const MODEL_BLOB: &str = "model.bin";
pub const METADATA_BLOB: &str = "metadata.json";

const GENERATION_PREFIX: &str = "gen-";

/// Loads retried when `CURRENT` moves while the blobs are being read.
const MAX_LOAD_ATTEMPTS: usize = 5;

/// Persists and loads [`ArtifactSet`]s in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    directory: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether a set has been published.
    pub fn exists(&self) -> bool {
        self.directory.join(CURRENT_FILE).is_file()
    }

    /// Name of the published generation directory, if any.
    pub fn current_generation(&self) -> Result<Option<String>> {
        match fs::read_to_string(self.directory.join(CURRENT_FILE)) {
            Ok(content) => {
                let name = content.trim().to_string();
                if !name.starts_with(GENERATION_PREFIX) || name.contains(['/', '\\']) {
                    return Err(ArtifactError::Corrupt {
                        blob: CURRENT_FILE.to_string(),
                        reason: format!("invalid generation name '{name}'"),
                    }
                    .into());
                }
                Ok(Some(name))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ArtifactError::Corrupt {
                blob: CURRENT_FILE.to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// Publish a new set, replacing the previous one.
    ///
    /// Returns the metadata as written, with blob checksums filled in.
    pub fn save(
        &self,
        extractor: &TfIdfVectorizer,
        model: &TrainedModel,
        metadata: &ModelMetadata,
    ) -> Result<ModelMetadata> {
        if !model.is_fitted() {
            return Err(DocClassError::serialization("refusing to save an unfitted model"));
        }
        fs::create_dir_all(&self.directory)?;

        let extractor_bytes = bincode::serialize(extractor)?;
        let model_bytes = bincode::serialize(model)?;

        let mut metadata = metadata.clone();
        metadata.checksums = BlobChecksums {
            extractor: crc32fast::hash(&extractor_bytes),
            model: crc32fast::hash(&model_bytes),
        };
        let metadata_bytes = serde_json::to_vec_pretty(&metadata)?;

        let generation = format!("{GENERATION_PREFIX}{}", uuid::Uuid::new_v4());
        let generation_dir = self.directory.join(&generation);
        fs::create_dir(&generation_dir)?;

        write_synced(&generation_dir.join(EXTRACTOR_BLOB), &extractor_bytes)?;
        write_synced(&generation_dir.join(MODEL_BLOB), &model_bytes)?;
        write_synced(&generation_dir.join(METADATA_BLOB), &metadata_bytes)?;
        sync_dir(&generation_dir)?;

        let previous = self.current_generation().ok().flatten();
        let temp = self.directory.join(format!("{CURRENT_FILE}.{}.tmp", uuid::Uuid::new_v4()));
        write_synced(&temp, generation.as_bytes())?;
        fs::rename(&temp, self.directory.join(CURRENT_FILE))?;
        sync_dir(&self.directory)?;

        info!(
            "Published {} ({} bytes extractor, {} bytes model) to {}",
            generation,
            extractor_bytes.len(),
            model_bytes.len(),
            self.directory.display()
        );

        self.remove_stale_generations(&generation, previous.as_deref());
        Ok(metadata)
    }

    /// Load the published set. Fails as a unit: no partial set is returned.
    ///
    /// If `CURRENT` is republished while the blobs are read, the load starts
    /// over from the new generation.
    pub fn load(&self) -> Result<ArtifactSet> {
        let mut attempt = 1;
        loop {
            let generation = self.current_generation()?.ok_or_else(|| ArtifactError::NotFound {
                directory: self.directory.clone(),
            })?;
            let result = self.load_generation(&generation);
            let moved = self.current_generation()?.as_deref() != Some(generation.as_str());

            match result {
                Ok(set) if !moved || attempt == MAX_LOAD_ATTEMPTS => return Ok(set),
                Err(e) if !moved || attempt == MAX_LOAD_ATTEMPTS => return Err(e),
                _ => debug!("{CURRENT_FILE} moved past {generation} during load (attempt {attempt})"),
            }
            attempt += 1;
        }
    }

    fn load_generation(&self, generation: &str) -> Result<ArtifactSet> {
        let generation_dir = self.directory.join(generation);

        let extractor_bytes = read_blob(&generation_dir, EXTRACTOR_BLOB)?;
        let model_bytes = read_blob(&generation_dir, MODEL_BLOB)?;
        let metadata_bytes = read_blob(&generation_dir, METADATA_BLOB)?;

        let metadata: ModelMetadata =
            serde_json::from_slice(&metadata_bytes).map_err(|e| corrupt(METADATA_BLOB, e))?;

        verify_checksum(EXTRACTOR_BLOB, &extractor_bytes, metadata.checksums.extractor)?;
        verify_checksum(MODEL_BLOB, &model_bytes, metadata.checksums.model)?;

        let extractor: TfIdfVectorizer =
            bincode::deserialize(&extractor_bytes).map_err(|e| corrupt(EXTRACTOR_BLOB, e))?;
        let model: TrainedModel =
            bincode::deserialize(&model_bytes).map_err(|e| corrupt(MODEL_BLOB, e))?;

        if extractor.vocabulary_size() != metadata.vocabulary_size {
            return Err(corrupt(
                METADATA_BLOB,
                format!(
                    "vocabulary size {} does not match extractor ({})",
                    metadata.vocabulary_size,
                    extractor.vocabulary_size()
                ),
            ));
        }
        if metadata.model_type != model.kind().type_name() {
            return Err(corrupt(
                METADATA_BLOB,
                format!(
                    "model type {} does not match model blob ({})",
                    metadata.model_type,
                    model.kind().type_name()
                ),
            ));
        }
        metadata.category_set().map_err(|e| corrupt(METADATA_BLOB, e))?;

        info!(
            "Loaded {} ({} categories, {} terms) from {}",
            metadata.model_name,
            metadata.categories.len(),
            metadata.vocabulary_size,
            generation_dir.display()
        );

        Ok(ArtifactSet {
            extractor,
            model,
            metadata,
        })
    }

    fn remove_stale_generations(&self, current: &str, previous: Option<&str>) {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list {}: {e}", self.directory.display());
                return;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with(GENERATION_PREFIX) || name == current || Some(name.as_ref()) == previous {
                continue;
            }
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => debug!("Removed stale generation {name}"),
                Err(e) => warn!("Failed to remove stale generation {name}: {e}"),
            }
        }
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> Result<()> {
    File::open(path)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> Result<()> {
    Ok(())
}

fn read_blob(dir: &Path, blob: &str) -> Result<Vec<u8>> {
    fs::read(dir.join(blob)).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ArtifactError::Missing {
                blob: blob.to_string(),
            }
            .into()
        } else {
            corrupt(blob, e)
        }
    })
}

fn verify_checksum(blob: &str, bytes: &[u8], expected: u32) -> Result<()> {
    let actual = crc32fast::hash(bytes);
    if actual != expected {
        return Err(corrupt(
            blob,
            format!("checksum mismatch (expected {expected:08x}, found {actual:08x})"),
        ));
    }
    Ok(())
}

fn corrupt(blob: &str, reason: impl std::fmt::Display) -> DocClassError {
    ArtifactError::Corrupt {
        blob: blob.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
