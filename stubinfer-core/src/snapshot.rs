use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ast::File;
use crate::error::SnapshotError;
use crate::source::SourceMap;
use crate::types::TypeInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSource {
    pub path: PathBuf,
    pub contents: String,
}

/// A parsed and type-checked file recorded for replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub sources: Vec<SnapshotSource>,
    pub file: File,
    pub types: TypeInfo,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        snapshot.types.validate()?;
        if !snapshot.sources.is_empty() && snapshot.file.source.0 as usize >= snapshot.sources.len()
        {
            return Err(SnapshotError::UnknownSource {
                source_id: snapshot.file.source.0,
                available: snapshot.sources.len(),
            });
        }
        Ok(snapshot)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Source map with one entry per recorded source, in order, so the
    /// file's `SourceId` indexes it directly.
    pub fn source_map(&self) -> SourceMap {
        let mut map = SourceMap::new();
        for source in &self.sources {
            map.add(source.path.clone(), source.contents.clone());
        }
        map
    }
}
