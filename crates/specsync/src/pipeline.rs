//! Batch pipeline wiring the transformations to the filesystem.
//!
//! Each feature is processed end-to-end independently: a unit either gets
//! its output file written in one shot (the text is rendered fully in
//! memory first, so no partial file is ever observable) or contributes a
//! failure to the run report. One unit's failure never aborts the rest of
//! the batch; only module loading and an unreadable specs directory are
//! fatal for a whole run.
//!
//! The resolver's collision set is the single piece of shared mutable
//! state, guarded by a mutex because name uniqueness spans features.

use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::SyncError;
use crate::introspect::introspect_file;
use crate::model::Feature;
use crate::resolve::NameResolver;
use crate::stubgen::{StubConfig, StubUnit, generate_feature};
use crate::write::write_feature;

/// One failed unit: the feature or file it concerns plus the error.
#[derive(Debug)]
pub struct UnitFailure {
    /// Feature name, or file name for failures before a feature exists.
    pub unit: String,
    /// What went wrong.
    pub error: SyncError,
}

/// Outcome of a batch run: files written and per-unit failures.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Paths written, in processing order.
    pub written: Vec<Utf8PathBuf>,
    /// Units that failed, in processing order.
    pub failures: Vec<UnitFailure>,
}

impl RunReport {
    /// `true` when every unit succeeded; drives the caller's exit code.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, unit: &str, result: Result<Vec<Utf8PathBuf>, SyncError>) {
        match result {
            Ok(paths) => {
                for path in paths {
                    info!(%path, %unit, "wrote output");
                    self.written.push(path);
                }
            }
            Err(error) => {
                warn!(%unit, %error, "unit failed");
                self.failures.push(UnitFailure {
                    unit: unit.to_string(),
                    error,
                });
            }
        }
    }
}

/// Direction A: introspect a tagged source module and write one
/// specification text file per feature.
///
/// # Errors
///
/// Module loading and output-directory creation failures are fatal and
/// returned directly; everything else is collected per feature in the
/// report.
pub fn generate_specs_from_module(
    module: &Utf8Path,
    out_dir: &Utf8Path,
) -> Result<RunReport, SyncError> {
    let features = introspect_file(module)?;
    std::fs::create_dir_all(out_dir)?;
    let resolver = Mutex::new(NameResolver::new());

    let mut report = RunReport::default();
    for feature in &features {
        let result = write_spec_unit(feature, out_dir, &resolver);
        report.record(&feature.name, result);
    }
    Ok(report)
}

fn write_spec_unit(
    feature: &Feature,
    out_dir: &Utf8Path,
    resolver: &Mutex<NameResolver>,
) -> Result<Vec<Utf8PathBuf>, SyncError> {
    let text = write_feature(feature)?;
    let path = lock(resolver).resolve_path(out_dir, &feature.name, "feature")?;
    std::fs::write(&path, text)?;
    Ok(vec![path])
}

/// Direction B: parse every `.feature` file under a directory and write
/// test-source skeletons.
///
/// Files are visited in sorted order so the run is deterministic. A parse
/// error fails its file as one unit; a generation error fails its feature;
/// other features in the same file still produce output. Each rendered
/// unit is recorded the moment its file is written, so a failure partway
/// through a feature's units leaves the earlier files both on disk and in
/// the report.
///
/// # Errors
///
/// A missing specs directory and output-directory creation failures are
/// fatal; everything else lands in the report.
pub fn generate_stubs_from_specs(
    specs_dir: &Utf8Path,
    out_dir: &Utf8Path,
    config: &StubConfig,
) -> Result<RunReport, SyncError> {
    if !specs_dir.is_dir() {
        return Err(SyncError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("specs directory not found: {specs_dir}"),
        )));
    }
    std::fs::create_dir_all(out_dir)?;
    let resolver = Mutex::new(NameResolver::new());

    let mut report = RunReport::default();
    for spec_path in spec_files(specs_dir) {
        let text = match std::fs::read_to_string(&spec_path) {
            Ok(text) => text,
            Err(error) => {
                report.record(spec_path.as_str(), Err(error.into()));
                continue;
            }
        };
        let features = match crate::parse::parse_spec(&text) {
            Ok(features) => features,
            Err(error) => {
                report.record(spec_path.as_str(), Err(error.into()));
                continue;
            }
        };
        for feature in &features {
            write_stub_units(feature, out_dir, config, &resolver, &mut report);
        }
    }
    Ok(report)
}

fn write_stub_units(
    feature: &Feature,
    out_dir: &Utf8Path,
    config: &StubConfig,
    resolver: &Mutex<NameResolver>,
    report: &mut RunReport,
) {
    let units = match generate_feature(feature, config) {
        Ok(units) => units,
        Err(error) => {
            report.record(&feature.name, Err(error.into()));
            return;
        }
    };
    for unit in units {
        let result = write_stub_unit(&unit, out_dir, resolver);
        report.record(&unit.name, result);
    }
}

fn write_stub_unit(
    unit: &StubUnit,
    out_dir: &Utf8Path,
    resolver: &Mutex<NameResolver>,
) -> Result<Vec<Utf8PathBuf>, SyncError> {
    let path = lock(resolver).resolve_path(out_dir, &unit.stem, "rs")?;
    std::fs::write(&path, &unit.source)?;
    Ok(vec![path])
}

/// `.feature` files under a directory, in sorted traversal order.
fn spec_files(specs_dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    WalkDir::new(specs_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
        .filter(|path| path.extension() == Some("feature"))
        .collect()
}

/// A poisoned lock only means another unit panicked; the collision set
/// itself is still consistent.
fn lock(resolver: &Mutex<NameResolver>) -> MutexGuard<'_, NameResolver> {
    resolver.lock().unwrap_or_else(PoisonError::into_inner)
}
