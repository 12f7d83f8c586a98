//! FILENAME: core/skeleton-store/src/bundle.rs
//! PURPOSE: Scenario export/import as a single ZIP file.
//! CONTEXT: Lets a scenario be handed to a colleague. Layout:
//!   manifest.json          format marker, version, export time
//!   scenario.json          the scenario record
//!   skeletons/<id>.json    one file per skeleton in the scenario

use crate::error::StoreError;
use crate::model::{LibrarySnapshot, Scenario, Skeleton};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const BUNDLE_FORMAT: &str = "demolens-scenario";
pub const BUNDLE_VERSION: u32 = 1;

const MANIFEST_PATH: &str = "manifest.json";
const SCENARIO_PATH: &str = "scenario.json";
const SKELETON_DIR: &str = "skeletons/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    pub format: String,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub skeleton_count: usize,
}

/// A scenario together with the skeletons it references.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioBundle {
    pub manifest: BundleManifest,
    pub scenario: Scenario,
    pub skeletons: Vec<Skeleton>,
}

impl ScenarioBundle {
    /// Collects a scenario and its skeletons. Dangling skeleton ids are dropped.
    pub fn from_snapshot(snapshot: &LibrarySnapshot, scenario_id: &str) -> Result<Self, StoreError> {
        let mut scenario = snapshot
            .scenarios
            .iter()
            .find(|s| s.id == scenario_id)
            .cloned()
            .ok_or_else(|| StoreError::ScenarioNotFound(scenario_id.to_string()))?;

        let skeletons: Vec<Skeleton> = scenario
            .skeleton_ids
            .iter()
            .filter_map(|id| snapshot.skeletons.iter().find(|s| &s.id == id).cloned())
            .collect();
        scenario.skeleton_ids = skeletons.iter().map(|s| s.id.clone()).collect();

        Ok(ScenarioBundle {
            manifest: BundleManifest {
                format: BUNDLE_FORMAT.to_string(),
                version: BUNDLE_VERSION,
                exported_at: Utc::now(),
                skeleton_count: skeletons.len(),
            },
            scenario,
            skeletons,
        })
    }
}

// ============================================================================
// EXPORT
// ============================================================================

/// Writes the scenario `scenario_id` of `snapshot` to a ZIP file at `path`.
pub fn export_bundle(path: &Path, snapshot: &LibrarySnapshot, scenario_id: &str) -> Result<(), StoreError> {
    let bundle = ScenarioBundle::from_snapshot(snapshot, scenario_id)?;
    let file = File::create(path)?;
    write_bundle(BufWriter::new(file), &bundle)?.flush()?;
    Ok(())
}

pub fn write_bundle<W: Write + Seek>(writer: W, bundle: &ScenarioBundle) -> Result<W, StoreError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_PATH, options)?;
    zip.write_all(&serde_json::to_vec_pretty(&bundle.manifest)?)?;

    zip.start_file(SCENARIO_PATH, options)?;
    zip.write_all(&serde_json::to_vec_pretty(&bundle.scenario)?)?;

    for skeleton in &bundle.skeletons {
        zip.start_file(format!("{}{}.json", SKELETON_DIR, skeleton.id), options)?;
        zip.write_all(&serde_json::to_vec(skeleton)?)?;
    }

    Ok(zip.finish()?)
}

// ============================================================================
// IMPORT
// ============================================================================

/// Reads a bundle written by `export_bundle`.
pub fn import_bundle(path: &Path) -> Result<ScenarioBundle, StoreError> {
    let file = File::open(path)?;
    read_bundle(BufReader::new(file))
}

pub fn read_bundle<R: Read + Seek>(reader: R) -> Result<ScenarioBundle, StoreError> {
    let mut archive = ZipArchive::new(reader)?;

    let manifest: BundleManifest = read_json(&mut archive, MANIFEST_PATH)?;
    if manifest.format != BUNDLE_FORMAT {
        return Err(StoreError::InvalidFormat(format!(
            "unexpected bundle format '{}'",
            manifest.format
        )));
    }
    if manifest.version > BUNDLE_VERSION {
        return Err(StoreError::InvalidFormat(format!(
            "bundle version {} is newer than supported version {}",
            manifest.version, BUNDLE_VERSION
        )));
    }

    let scenario: Scenario = read_json(&mut archive, SCENARIO_PATH)?;

    // Playlist order, not archive order.
    let skeletons = scenario
        .skeleton_ids
        .iter()
        .map(|id| read_json(&mut archive, &format!("{}{}.json", SKELETON_DIR, id)))
        .collect::<Result<Vec<Skeleton>, _>>()?;

    Ok(ScenarioBundle {
        manifest,
        scenario,
        skeletons,
    })
}

fn read_json<R: Read + Seek, T: DeserializeOwned>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<T, StoreError> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(StoreError::InvalidFormat(format!("bundle is missing {}", path)))
        }
        Err(e) => return Err(e.into()),
    };
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(serde_json::from_slice(&buffer)?)
}
