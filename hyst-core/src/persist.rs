//! Saving and restoring constructed models.
//!
//! A saved model is a JSON envelope holding a format version and the model's
//! configuration plus its cached major loop. Restoring revalidates the
//! configuration and reuses the cached loop, skipping the construction-time
//! integration entirely. Floating-point values round-trip exactly: the JSON
//! encoder emits the shortest decimal form that parses back to the same bits.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    jiles_atherton::JilesAthertonConfig,
    model::{ConfigError, MajorLoop},
    preisach::{DensityError, PreisachConfig},
};

/// Version written into every envelope; readers reject anything newer.
const FORMAT_VERSION: u32 = 1;

/// An error raised while saving or restoring a model.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed model blob")]
    Format(#[from] serde_json::Error),
    #[error("unsupported format version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("saved model is a {found} model, expected {expected}")]
    ModelMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("saved configuration no longer validates")]
    Config(#[from] ConfigError),
    #[error("saved density no longer validates")]
    Density(#[from] DensityError),
}

/// The persisted payload: which model, its configuration, and its loop.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "model")]
pub(crate) enum SavedModel {
    JilesAtherton {
        config: JilesAthertonConfig,
        major: MajorLoop,
    },
    Preisach {
        config: PreisachConfig,
        major: MajorLoop,
    },
}

impl SavedModel {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::JilesAtherton { .. } => "JilesAtherton",
            Self::Preisach { .. } => "Preisach",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    #[serde(flatten)]
    model: SavedModel,
}

/// The version field alone, checked before the payload is parsed so a
/// future format fails with `UnsupportedVersion` rather than a parse error.
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

pub(crate) fn write<W: Write>(mut writer: W, model: SavedModel) -> Result<(), PersistError> {
    let bytes = serde_json::to_vec(&Envelope {
        version: FORMAT_VERSION,
        model,
    })?;
    writer.write_all(&bytes)?;
    Ok(())
}

pub(crate) fn read<R: Read>(mut reader: R) -> Result<SavedModel, PersistError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let probe: VersionProbe = serde_json::from_slice(&bytes)?;
    if probe.version > FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: probe.version,
            supported: FORMAT_VERSION,
        });
    }

    let envelope: Envelope = serde_json::from_slice(&bytes)?;
    Ok(envelope.model)
}
