//! Plugin loader: discovers shared modules and runs their registration
//!
//! Loading is best effort. One broken module is recorded and skipped, never
//! aborting the rest of the scan; the outcome is returned as a structured
//! [`LoadReport`] in addition to being logged.

use std::collections::HashSet;
use std::env::consts::DLL_SUFFIX;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::ffi;
use crate::registry::ProcessorRegistry;

/// One shared module retained in memory.
///
/// Held until [`PluginLoader::unload_all`]; dropping the `Library` earlier
/// would leave dangling code pointers inside still-registered processors.
struct LoadedPlugin {
    path: PathBuf,
    _library: Library,
}

/// Why a candidate module contributed nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LoadFailure {
    /// The module could not be opened (not a valid shared object, missing
    /// transitive dependencies, ...)
    Open { message: String },
    /// The module opened but does not export the registration entrypoint.
    /// Its handle stays open regardless.
    EntrypointMissing { message: String },
    /// The plugin directory exists but could not be read
    DirectoryUnreadable { message: String },
}

/// A module that loaded and ran its entrypoint.
#[derive(Debug, Clone, Serialize)]
pub struct PluginRecord {
    /// Path the module was loaded from
    pub path: PathBuf,
    /// Services the entrypoint registered (newly added names; overwrites of
    /// pre-existing names are logged by the registry but not attributed here)
    pub services: Vec<String>,
}

/// A candidate module that failed, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct PluginFailure {
    /// Path of the failing candidate (or the directory itself for
    /// [`LoadFailure::DirectoryUnreadable`])
    pub path: PathBuf,
    /// What went wrong
    pub reason: LoadFailure,
}

/// Structured outcome of a [`PluginLoader::load_all`] scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Modules that loaded and ran their entrypoint
    pub loaded: Vec<PluginRecord>,
    /// Candidates that contributed nothing, with reasons
    pub failed: Vec<PluginFailure>,
}

impl LoadReport {
    /// Total number of services the scan registered
    pub fn registered_services(&self) -> usize {
        self.loaded.iter().map(|p| p.services.len()).sum()
    }
}

/// Scans a directory for shared modules and runs their registration
/// entrypoints against a [`ProcessorRegistry`].
#[derive(Default)]
pub struct PluginLoader {
    /// Retained module handles, released only in `unload_all`
    plugins: Vec<LoadedPlugin>,
    /// Set once the first scan completes; later scans are no-ops
    loaded: bool,
}

impl PluginLoader {
    /// Create a loader with no modules
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `dir` and load every plugin module in it.
    ///
    /// Candidates are entries whose file name ends with the platform's
    /// dynamic-module suffix; everything else is skipped. Order follows the
    /// directory listing and is not guaranteed stable. A missing directory
    /// means "no plugins" and is not an error. The call is idempotent: after
    /// one completed scan, repeat calls return an empty report.
    pub fn load_all(&mut self, dir: &Path, registry: &Arc<ProcessorRegistry>) -> LoadReport {
        if self.loaded {
            debug!("Plugins already loaded; skipping scan of {:?}", dir);
            return LoadReport::default();
        }
        self.loaded = true;

        info!("Scanning plugin directory: {:?}", dir);
        let mut report = LoadReport::default();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("Plugin directory {:?} not found; skipping scan", dir);
                return report;
            }
            Err(e) => {
                error!("Could not read plugin directory {:?}: {}", dir, e);
                report.failed.push(PluginFailure {
                    path: dir.to_path_buf(),
                    reason: LoadFailure::DirectoryUnreadable {
                        message: e.to_string(),
                    },
                });
                return report;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            let path = entry.path();
            if !is_plugin_candidate(&path) {
                continue;
            }
            self.load_one(&path, registry, &mut report);
        }

        info!(
            "Plugin scan finished: {} module(s) loaded, {} failed, {} service(s) registered",
            report.loaded.len(),
            report.failed.len(),
            report.registered_services()
        );
        report
    }

    /// Load a single candidate module and run its entrypoint.
    fn load_one(&mut self, path: &Path, registry: &Arc<ProcessorRegistry>, report: &mut LoadReport) {
        let library = match unsafe { Library::new(path) } {
            Ok(library) => library,
            Err(e) => {
                warn!("Cannot open plugin module {:?}: {}", path, e);
                report.failed.push(PluginFailure {
                    path: path.to_path_buf(),
                    reason: LoadFailure::Open {
                        message: e.to_string(),
                    },
                });
                return;
            }
        };

        let entry = match ffi::resolve_entrypoint(&library) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("No registration entrypoint in {:?}: {}", path, e);
                report.failed.push(PluginFailure {
                    path: path.to_path_buf(),
                    reason: LoadFailure::EntrypointMissing {
                        message: e.to_string(),
                    },
                });
                // The handle stays open even though the module is unusable.
                self.plugins.push(LoadedPlugin {
                    path: path.to_path_buf(),
                    _library: library,
                });
                return;
            }
        };

        // Retain the module before running its code: processors it registers
        // must never outlive the library that produced them.
        self.plugins.push(LoadedPlugin {
            path: path.to_path_buf(),
            _library: library,
        });

        let before: HashSet<String> = registry.service_names().into_iter().collect();
        ffi::invoke_entrypoint(entry, registry);
        let services: Vec<String> = registry
            .service_names()
            .into_iter()
            .filter(|name| !before.contains(name))
            .collect();

        if services.is_empty() {
            // Either an ABI-version mismatch or an entrypoint that registered
            // nothing new; both are worth surfacing.
            warn!("Plugin {:?} registered no new services", path);
        } else {
            info!("Loaded plugin {:?} ({} service(s))", path, services.len());
        }
        report.loaded.push(PluginRecord {
            path: path.to_path_buf(),
            services,
        });
    }

    /// Release every retained module handle, in arbitrary order.
    ///
    /// Must only be called after the registry has been cleared and in-flight
    /// dispatches have drained; unloading earlier leaves dangling code
    /// behind still-alive processors.
    pub fn unload_all(&mut self) {
        for plugin in self.plugins.drain(..) {
            debug!("Unloading plugin module {:?}", plugin.path);
        }
    }

    /// Number of retained module handles
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Whether a scan has already completed
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Directory entries qualify only when the file name is longer than the
/// platform suffix and ends with it; `read_dir` never yields `.`/`..`.
fn is_plugin_candidate(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    name.len() > DLL_SUFFIX.len() && name.ends_with(DLL_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fake_module(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(format!("{name}{DLL_SUFFIX}"));
        std::fs::write(&path, b"definitely not a shared object").unwrap();
        path
    }

    #[test]
    fn missing_directory_is_no_plugins() {
        let temp = tempdir().unwrap();
        let mut loader = PluginLoader::new();
        let registry = Arc::new(ProcessorRegistry::new());

        let report = loader.load_all(&temp.path().join("does-not-exist"), &registry);
        assert!(report.loaded.is_empty());
        assert!(report.failed.is_empty());
        assert!(registry.is_empty());
        assert!(loader.is_loaded());
    }

    #[test]
    fn corrupt_modules_are_skipped_not_fatal() {
        let temp = tempdir().unwrap();
        fake_module(temp.path(), "broken_a");
        fake_module(temp.path(), "broken_b");
        // Not a candidate: wrong suffix.
        std::fs::write(temp.path().join("readme.txt"), b"hello").unwrap();

        let mut loader = PluginLoader::new();
        let registry = Arc::new(ProcessorRegistry::new());
        let report = loader.load_all(temp.path(), &registry);

        // Both candidates recorded as failures; the scan reached both.
        assert_eq!(report.failed.len(), 2);
        assert!(report.loaded.is_empty());
        assert!(
            report
                .failed
                .iter()
                .all(|f| matches!(f.reason, LoadFailure::Open { .. }))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn second_scan_is_a_no_op() {
        let temp = tempdir().unwrap();
        fake_module(temp.path(), "broken");

        let mut loader = PluginLoader::new();
        let registry = Arc::new(ProcessorRegistry::new());

        let first = loader.load_all(temp.path(), &registry);
        assert_eq!(first.failed.len(), 1);

        let second = loader.load_all(temp.path(), &registry);
        assert!(second.loaded.is_empty());
        assert!(second.failed.is_empty());
    }

    #[test]
    fn bare_suffix_name_is_not_a_candidate() {
        assert!(!is_plugin_candidate(Path::new(DLL_SUFFIX)));
        assert!(is_plugin_candidate(&PathBuf::from(format!(
            "libfoo{DLL_SUFFIX}"
        ))));
        assert!(!is_plugin_candidate(Path::new("libfoo.txt")));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = LoadReport {
            loaded: vec![PluginRecord {
                path: PathBuf::from("/plugins/libecho.so"),
                services: vec!["echo".into()],
            }],
            failed: vec![PluginFailure {
                path: PathBuf::from("/plugins/libbad.so"),
                reason: LoadFailure::Open {
                    message: "invalid ELF header".into(),
                },
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["loaded"][0]["services"][0], "echo");
        assert_eq!(json["failed"][0]["reason"]["kind"], "open");
    }
}
