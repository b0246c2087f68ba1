//! Self-hosted OSRM dataset preparation for walking routes.
//!
//! Downloads a Geofabrik extract and runs the OSRM toolchain (via docker)
//! with the foot profile, so a local `osrm-routed` can stand in for the
//! public demo server.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

const OSRM_IMAGE: &str = "osrm/osrm-backend";

#[derive(Debug, Clone)]
pub struct GeofabrikRegion {
    /// Geofabrik region path, e.g. "north-america/us/california".
    pub path: String,
}

impl GeofabrikRegion {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> &str {
        self.path
            .rsplit('/')
            .find(|part| !part.is_empty())
            .unwrap_or("region")
    }

    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path.trim_matches('/'))
    }
}

/// Lua routing profile shipped inside the OSRM image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OsrmProfile {
    #[default]
    Foot,
    Bicycle,
}

impl OsrmProfile {
    fn lua_path(self) -> &'static str {
        match self {
            OsrmProfile::Foot => "/opt/foot.lua",
            OsrmProfile::Bicycle => "/opt/bicycle.lua",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmDatasetConfig {
    pub region: GeofabrikRegion,
    pub data_root: PathBuf,
    pub profile: OsrmProfile,
}

impl OsrmDatasetConfig {
    pub fn new(region: GeofabrikRegion, data_root: impl Into<PathBuf>) -> Self {
        Self {
            region,
            data_root: data_root.into(),
            profile: OsrmProfile::Foot,
        }
    }
}

/// Prepared (multi-level Dijkstra) dataset on disk.
#[derive(Debug, Clone)]
pub struct OsrmDataset {
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
    pub pbf_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum OsrmDataError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("extract download failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{step} failed: {status}")]
    ProcessFailure { step: String, status: String },
}

impl OsrmDataset {
    /// Download and preprocess whatever is missing, then describe the result.
    pub fn ensure(config: &OsrmDatasetConfig) -> Result<Self, OsrmDataError> {
        let data_root = if config.data_root.is_absolute() {
            config.data_root.clone()
        } else {
            std::env::current_dir()?.join(&config.data_root)
        };
        let paths = Self::layout(&data_root, &config.region);
        fs::create_dir_all(&paths.data_dir)?;

        if !paths.pbf_path.exists() {
            tracing::info!(url = %config.region.url(), "downloading OSM extract");
            download_pbf(&config.region.url(), &paths.pbf_path)?;
        }

        if !paths.osrm_base.exists() {
            let pbf = format!("/data/{}", file_name(&paths.pbf_path));
            run_docker(
                &["osrm-extract", "-p", config.profile.lua_path(), &pbf],
                &paths.data_dir,
            )?;
        }

        if !mld_ready(&paths.osrm_base) {
            let base = format!("/data/{}", file_name(&paths.osrm_base));
            run_docker(&["osrm-partition", &base], &paths.data_dir)?;
            run_docker(&["osrm-customize", &base], &paths.data_dir)?;
        }

        Ok(paths)
    }

    fn layout(data_root: &Path, region: &GeofabrikRegion) -> Self {
        let data_dir = data_root.join(region.name());
        let pbf_path = data_dir.join(format!("{}-latest.osm.pbf", region.name()));
        let osrm_base = data_dir.join(format!("{}-latest.osrm", region.name()));
        Self {
            data_dir,
            osrm_base,
            pbf_path,
        }
    }
}

fn download_pbf(url: &str, dest: &Path) -> Result<(), OsrmDataError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&response.bytes()?)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn mld_ready(osrm_base: &Path) -> bool {
    osrm_base.exists()
        && ["osrm.partition", "osrm.mldgr", "osrm.cells"]
            .iter()
            .all(|extension| osrm_base.with_extension(extension).exists())
}

fn run_docker(args: &[&str], data_dir: &Path) -> Result<(), OsrmDataError> {
    tracing::info!(step = args[0], dir = %data_dir.display(), "running OSRM preprocessing");
    let status = Command::new("docker")
        .arg("run")
        .arg("--rm")
        .arg("-t")
        .arg("-v")
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(OsrmDataError::ProcessFailure {
            step: args[0].to_string(),
            status: status.to_string(),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
