//! Dynamic module loading using libloading.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};
use thiserror::Error;

use crate::host::{Host, HostConfig};
use crate::tool::ToolId;

/// Errors that can occur when loading a module.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to load the shared library.
    #[error("failed to load library: {0}")]
    LoadFailed(String),

    /// The library doesn't export `init_module`.
    #[error("missing module entry point: init_module")]
    MissingEntryPoint,

    /// No library with that name in any search path.
    #[error("module '{0}' not found in search paths")]
    NotFound(String),
}

/// Type of the module entry point function.
pub type ModuleEntryPoint = unsafe extern "C" fn();

/// What a successful load produced.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub path: PathBuf,
    pub tools: Vec<ToolId>,
}

/// Finds plugin libraries and runs their `init_module` against a host.
#[derive(Debug, Clone)]
pub struct PluginLoader {
    search_paths: Vec<PathBuf>,
}

impl PluginLoader {
    /// Create a loader that searches the current directory.
    pub fn new() -> Self {
        Self {
            search_paths: vec![PathBuf::from(".")],
        }
    }

    /// Create a loader searching the directories listed in `config`, then
    /// the current directory.
    pub fn from_config(config: &HostConfig) -> Self {
        let mut loader = Self { search_paths: config.plugin_dirs.clone() };
        loader.add_search_path(".");
        loader
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Load the library at `path`, call its `init_module` and adopt every
    /// tool it registers into `host`.
    ///
    /// # Safety
    ///
    /// This runs arbitrary native code. The library must export
    /// `init_module` with the expected signature, and every tool object it
    /// registers must follow the tool object layout.
    pub unsafe fn load_from_path(
        &self,
        host: &mut Host,
        path: impl AsRef<Path>,
    ) -> Result<LoadedModule, LoadError> {
        let path = path.as_ref();
        // The library resolves the host functions against this process.
        #[cfg(all(feature = "host", not(feature = "plugin")))]
        super::exports::keep_linked();

        // SAFETY: Loading a dynamic library. Caller ensures the library is trusted.
        let library =
            unsafe { Library::new(path).map_err(|e| LoadError::LoadFailed(e.to_string()))? };

        // SAFETY: Looking up a symbol in the library that was just loaded.
        let init: ModuleEntryPoint = unsafe {
            let symbol: Symbol<'_, ModuleEntryPoint> =
                library.get(b"init_module\0").map_err(|_| LoadError::MissingEntryPoint)?;
            *symbol
        };

        let origin = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        // SAFETY: `init` stays callable while the Arc keeps the library loaded.
        let tools = unsafe { host.load_foreign_module(&origin, init, Some(Arc::new(library))) };
        log::info!("loaded {} tools from {}", tools.len(), path.display());

        Ok(LoadedModule {
            path: path.to_path_buf(),
            tools,
        })
    }

    /// Load a module by name, searching in all search paths.
    ///
    /// The name goes without platform prefix and suffix: "brush" finds
    /// `libbrush.so`, `libbrush.dylib` or `brush.dll`.
    ///
    /// # Safety
    ///
    /// See `load_from_path`.
    pub unsafe fn load_by_name(
        &self,
        host: &mut Host,
        name: &str,
    ) -> Result<LoadedModule, LoadError> {
        let file_name = libloading::library_filename(name);

        for search_path in &self.search_paths {
            let path = search_path.join(&file_name);
            if path.exists() {
                // SAFETY: Caller guarantees the module is trusted.
                return unsafe { self.load_from_path(host, &path) };
            }
        }

        Err(LoadError::NotFound(name.to_string()))
    }

    /// Load every shared library found directly in `dir`.
    ///
    /// # Safety
    ///
    /// See `load_from_path`.
    pub unsafe fn load_all_from_dir(
        &self,
        host: &mut Host,
        dir: impl AsRef<Path>,
    ) -> Vec<Result<LoadedModule, LoadError>> {
        let dir = dir.as_ref();
        let mut modules = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("cannot scan {}: {err}", dir.display());
                return modules;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension() == Some(OsStr::new(std::env::consts::DLL_EXTENSION)))
            .collect();
        paths.sort();

        for path in paths {
            // SAFETY: Caller guarantees all modules in the directory are trusted.
            modules.push(unsafe { self.load_from_path(host, &path) });
        }

        modules
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new()
    }
}
