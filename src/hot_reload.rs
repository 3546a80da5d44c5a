//! # Watch Mode
//!
//! Re-runs the discovery pass whenever the type-graph manifest changes, the way
//! an incremental host re-invokes the generator as declarations become
//! resolvable.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mvigen::hot_reload::watch_graph;
//!
//! let watcher = watch_graph("graph.yaml", |graph| {
//!     let mut host = FsHost::new("out", &config.deps_manifest);
//!     let report = run_pass(&graph, &config, &mut host);
//!     println!("{} dispatcher(s)", report.artifacts.len());
//! })?;
//! ```
//!
//! ## Reload Process
//!
//! 1. **Detection** - the filesystem watcher sees a modify or create event
//! 2. **Load** - the manifest is parsed into a fresh [`ModelGraph`]
//! 3. **Pass** - the callback runs a new pass against it
//!
//! Each reload starts from nothing. If the manifest fails to parse, the error
//! is logged and the previous output stays on disk until the next good save.

use crate::graph::{load_graph, ModelGraph};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Watch a type-graph manifest and hand every successfully reloaded graph to
/// `on_reload`.
///
/// The returned watcher stops when dropped.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created or the path cannot be
/// watched.
pub fn watch_graph<P, F>(graph_path: P, mut on_reload: F) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(ModelGraph) + Send + 'static,
{
    let path: PathBuf = graph_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match load_graph(&watch_path) {
                        Ok(graph) => {
                            info!(
                                declarations = graph.len(),
                                "watch: type graph changed, running a new pass"
                            );
                            on_reload(graph);
                        }
                        Err(err) => error!(error = %format!("{err:#}"), "watch: reload failed"),
                    }
                }
            }
            Err(e) => error!(error = ?e, "watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_watch_graph_reloads_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.yaml");
        std::fs::write(&path, "declarations: []\n").unwrap();

        let (tx, rx) = mpsc::channel();
        let _watcher = watch_graph(&path, move |graph| {
            let _ = tx.send(graph.len());
        })
        .unwrap();

        std::fs::write(
            &path,
            "declarations:\n  - name: app.State\n    kind: class\n",
        )
        .unwrap();

        // Editors and filesystems may emit several events; wait for the one
        // that observed the new content.
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        let mut seen = None;
        while std::time::Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(1) => {
                    seen = Some(1);
                    break;
                }
                Ok(_) | Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        assert_eq!(seen, Some(1));
    }

    #[test]
    fn test_watch_graph_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = watch_graph(dir.path().join("absent.yaml"), |_| {});
        assert!(result.is_err());
    }
}
