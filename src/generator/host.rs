use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, Write as _};
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, warn};

use crate::diagnostics::{Diagnostic, Severity};
use crate::pipeline::GeneratedArtifact;

/// The build system the pipeline runs inside.
///
/// Paths handed to the host are relative to its output root.
pub trait CodegenHost {
    /// Write (create or overwrite) one generated file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the caller turns it into
    /// an `emission_io_failure` diagnostic for that artifact only.
    fn write_artifact(&mut self, path: &Path, contents: &str) -> anyhow::Result<()>;

    /// Record that `path` depends on every file in `sources` (aggregating:
    /// a change to any of them regenerates this artifact).
    fn register_aggregating(
        &mut self,
        path: &Path,
        artifact: &GeneratedArtifact,
        sources: &BTreeSet<PathBuf>,
    );

    /// Surface a diagnostic to the user.
    fn report(&mut self, diagnostic: &Diagnostic);

    /// Called once at the end of a pass.
    ///
    /// # Errors
    ///
    /// Returns an error if pending host state (e.g. the dependency manifest)
    /// cannot be persisted.
    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// One entry of the dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEntry {
    pub namespace: String,
    pub name: String,
    pub declarations: Vec<String>,
    pub sources: Vec<PathBuf>,
}

#[derive(Serialize)]
struct DependencyManifest<'a> {
    mode: &'static str,
    artifacts: &'a BTreeMap<PathBuf, DependencyEntry>,
}

/// The part of an earlier manifest needed to find stale outputs.
#[derive(Deserialize)]
struct PreviousManifest {
    #[serde(default)]
    artifacts: BTreeMap<PathBuf, serde_json::Value>,
}

/// Only plain relative paths are ever removed from the output root.
fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic.severity {
        Severity::Error => error!(
            kind = %diagnostic.kind,
            location = %diagnostic.location,
            "{}",
            diagnostic.message
        ),
        Severity::Warning => warn!(
            kind = %diagnostic.kind,
            location = %diagnostic.location,
            "{}",
            diagnostic.message
        ),
    }
}

fn dependency_entry(artifact: &GeneratedArtifact, sources: &BTreeSet<PathBuf>) -> DependencyEntry {
    DependencyEntry {
        namespace: artifact.namespace.clone(),
        name: artifact.name.clone(),
        declarations: artifact
            .source_descriptors
            .iter()
            .map(|d| d.to_string())
            .collect(),
        sources: sources.iter().cloned().collect(),
    }
}

/// Host writing into a directory on disk.
///
/// Dependencies are flushed to `deps_manifest` (pretty JSON, sorted by
/// artifact path) in [`CodegenHost::finish`]. Artifacts listed in the previous
/// manifest but not written by this pass are deleted at the same time.
#[derive(Debug)]
pub struct FsHost {
    root: PathBuf,
    deps_manifest: String,
    dependencies: BTreeMap<PathBuf, DependencyEntry>,
    written: Vec<PathBuf>,
}

impl FsHost {
    pub fn new(root: impl Into<PathBuf>, deps_manifest: impl Into<String>) -> Self {
        FsHost {
            root: root.into(),
            deps_manifest: deps_manifest.into(),
            dependencies: BTreeMap::new(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths of every file written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.deps_manifest)
    }

    /// Remove artifacts the previous manifest lists that this pass did not
    /// write. Returns the absolute paths removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a stale file exists but cannot be removed.
    pub fn remove_stale(&self) -> anyhow::Result<Vec<PathBuf>> {
        let path = self.manifest_path();
        let previous = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read dependency manifest {}", path.display())
                })
            }
        };
        let previous: PreviousManifest = match serde_json::from_str(&previous) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable dependency manifest");
                return Ok(Vec::new());
            }
        };

        let written: BTreeSet<&PathBuf> = self.written.iter().collect();
        let mut removed = Vec::new();
        for relative in previous.artifacts.keys() {
            if !is_plain_relative(relative) {
                warn!(path = %relative.display(), "skipping manifest entry outside the output root");
                continue;
            }
            let target = self.root.join(relative);
            if written.contains(&target) {
                continue;
            }
            match fs::remove_file(&target) {
                Ok(()) => {
                    info!(path = %target.display(), "removed stale artifact");
                    println!("🗑️  Removed {}", target.display());
                    removed.push(target);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to remove {}", target.display()))
                }
            }
        }
        Ok(removed)
    }
}

impl CodegenHost for FsHost {
    fn write_artifact(&mut self, path: &Path, contents: &str) -> anyhow::Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        // The handle is closed when it drops, on success and on every error path.
        let mut file = File::create(&target)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write {}", target.display()))?;
        file.flush()
            .with_context(|| format!("Failed to flush {}", target.display()))?;
        println!("✅ Generated {}", target.display());
        self.written.push(target);
        Ok(())
    }

    fn register_aggregating(
        &mut self,
        path: &Path,
        artifact: &GeneratedArtifact,
        sources: &BTreeSet<PathBuf>,
    ) {
        self.dependencies
            .insert(path.to_path_buf(), dependency_entry(artifact, sources));
    }

    fn report(&mut self, diagnostic: &Diagnostic) {
        log_diagnostic(diagnostic);
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.remove_stale()?;
        let manifest = DependencyManifest {
            mode: "aggregating",
            artifacts: &self.dependencies,
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        let path = self.manifest_path();
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create directory {}", self.root.display()))?;
        fs::write(&path, json + "\n")
            .with_context(|| format!("Failed to write dependency manifest {}", path.display()))?;
        Ok(())
    }
}

/// Host keeping everything in memory. Used by `check`, `inspect` and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    pub files: BTreeMap<PathBuf, String>,
    pub dependencies: BTreeMap<PathBuf, DependencyEntry>,
    pub diagnostics: Vec<Diagnostic>,
    /// Paths whose writes should fail, to exercise I/O error handling
    pub fail_writes: BTreeSet<PathBuf>,
}

impl MemoryHost {
    pub fn new() -> Self {
        MemoryHost::default()
    }

    /// Make every write to `path` fail.
    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_writes.insert(path.into());
        self
    }
}

impl CodegenHost for MemoryHost {
    fn write_artifact(&mut self, path: &Path, contents: &str) -> anyhow::Result<()> {
        if self.fail_writes.contains(path) {
            anyhow::bail!("simulated write failure for {}", path.display());
        }
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn register_aggregating(
        &mut self,
        path: &Path,
        artifact: &GeneratedArtifact,
        sources: &BTreeSet<PathBuf>,
    ) {
        self.dependencies
            .insert(path.to_path_buf(), dependency_entry(artifact, sources));
    }

    fn report(&mut self, diagnostic: &Diagnostic) {
        log_diagnostic(diagnostic);
        self.diagnostics.push(diagnostic.clone());
    }
}
