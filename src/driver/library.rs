//! Lazily loaded driver library with a per-symbol resolution cache.

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;
use std::sync::{Mutex, OnceLock, PoisonError};

use libloading::Library;
use tracing::debug;

use super::BindError;

/// Hook run once, right after the library is first loaded.
pub type LoadHook = fn(&DriverLibrary);

/// Address of a resolved export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proc(NonNull<c_void>);

// SAFETY: a code address inside a library that is never unloaded is valid
// from any thread.
unsafe impl Send for Proc {}
// SAFETY: see above; `Proc` is an immutable address.
unsafe impl Sync for Proc {}

impl Proc {
    /// Returns the export's address.
    #[must_use]
    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }

    /// Reinterprets the export as a function pointer of type `F`.
    ///
    /// # Safety
    ///
    /// `F` must be an `extern` function pointer type matching the export's
    /// real signature and calling convention.
    ///
    /// # Panics
    ///
    /// Panics if `F` is not pointer-sized.
    #[must_use]
    pub unsafe fn cast<F: Copy>(self) -> F {
        assert_eq!(
            size_of::<F>(),
            size_of::<*mut c_void>(),
            "entry point type must be a function pointer"
        );
        // SAFETY: sizes match; the caller guarantees the signature.
        unsafe { std::mem::transmute_copy(&self.0) }
    }
}

/// A driver library that is loaded on first use and never unloaded.
///
/// Designed to live in a `static`: construction is `const`, the library is
/// loaded by the first [`resolve`](Self::resolve) call under a mutex, and
/// resolved addresses are cached for the rest of the process.
///
/// A failed load is not remembered, so a later call (for example after the
/// DLL was copied into place) can still succeed. Likewise a missing symbol
/// does not affect any other symbol.
///
/// # Example
///
/// ```no_run
/// use wintun_ctl::driver::DriverLibrary;
///
/// static LIB: DriverLibrary = DriverLibrary::new("wintun.dll", None);
///
/// match LIB.resolve("WintunGetRunningDriverVersion") {
///     Ok(proc) => println!("resolved at {:#x}", proc.addr()),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
pub struct DriverLibrary {
    path: &'static str,
    on_load: Option<LoadHook>,
    loaded: OnceLock<Library>,
    load_lock: Mutex<()>,
    symbols: Mutex<BTreeMap<String, Proc>>,
}

impl fmt::Debug for DriverLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverLibrary")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl DriverLibrary {
    /// Creates an unloaded binding for `path`.
    ///
    /// `on_load` runs exactly once, after the first successful load and
    /// before the call that triggered the load continues.
    #[must_use]
    pub const fn new(path: &'static str, on_load: Option<LoadHook>) -> Self {
        Self {
            path,
            on_load,
            loaded: OnceLock::new(),
            load_lock: Mutex::new(()),
            symbols: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the path this binding loads from.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns true once the library has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Resolves the export `symbol`, loading the library first if needed.
    ///
    /// # Errors
    ///
    /// - [`BindError::LibraryLoad`] if the library cannot be loaded
    /// - [`BindError::SymbolNotFound`] if the loaded library lacks `symbol`
    pub fn resolve(&self, symbol: &str) -> Result<Proc, BindError> {
        if let Some(proc) = self.cached(symbol) {
            return Ok(proc);
        }

        let library = self.library()?;

        // SAFETY: the symbol is read as a plain address; it is only turned
        // into a callable through `Proc::cast`, whose caller vouches for
        // the signature.
        let raw = unsafe { library.get::<*mut c_void>(symbol.as_bytes()) }.map_err(|source| {
            BindError::SymbolNotFound {
                library: self.path.to_string(),
                symbol: symbol.to_string(),
                source: Some(source),
            }
        })?;

        let proc = NonNull::new(*raw)
            .map(Proc)
            .ok_or_else(|| BindError::SymbolNotFound {
                library: self.path.to_string(),
                symbol: symbol.to_string(),
                source: None,
            })?;

        debug!(library = self.path, symbol, addr = proc.addr(), "Resolved entry point");

        self.symbols
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), proc);

        Ok(proc)
    }

    fn cached(&self, symbol: &str) -> Option<Proc> {
        self.symbols
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .copied()
    }

    /// Returns the loaded library, loading it (and running the hook) once.
    fn library(&self) -> Result<&Library, BindError> {
        if let Some(library) = self.loaded.get() {
            return Ok(library);
        }

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another thread may have finished loading while we waited.
        if let Some(library) = self.loaded.get() {
            return Ok(library);
        }

        debug!(path = self.path, "Loading driver library");
        let library = open_library(self.path).map_err(|source| BindError::LibraryLoad {
            path: self.path.to_string(),
            source,
        })?;
        let library = self.loaded.get_or_init(|| library);

        // The hook may resolve symbols; `loaded` is already set, so that
        // does not come back through this path.
        if let Some(hook) = self.on_load {
            hook(self);
        }

        Ok(library)
    }
}

/// Loads the library, restricting the DLL search to the application
/// directory and System32.
#[cfg(windows)]
fn open_library(path: &str) -> Result<Library, libloading::Error> {
    use libloading::os::windows::{
        LOAD_LIBRARY_SEARCH_APPLICATION_DIR, LOAD_LIBRARY_SEARCH_SYSTEM32,
    };

    // SAFETY: loading runs the DLL's initialisation routine; the driver
    // library is trusted code.
    unsafe {
        libloading::os::windows::Library::load_with_flags(
            path,
            LOAD_LIBRARY_SEARCH_APPLICATION_DIR | LOAD_LIBRARY_SEARCH_SYSTEM32,
        )
    }
    .map(Library::from)
}

#[cfg(not(windows))]
fn open_library(path: &str) -> Result<Library, libloading::Error> {
    // SAFETY: loading runs the library's initialisers; callers choose the path.
    unsafe { Library::new(path) }
}
