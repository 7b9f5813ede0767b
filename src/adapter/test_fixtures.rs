//! In-memory driver for adapter lifecycle tests.
//!
//! Models the parts of the system the lifecycle depends on: adapters that
//! live as long as some handle references them, LUID assignment, network
//! location profiles keyed by adapter GUID, and system-wide handles held
//! by other processes.

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::sync::Mutex;

use crate::driver::{BindError, Driver, DriverError, DriverVersion, RawHandle, symbol};
use crate::guid::Guid;

use super::ADAPTER_NAME_MAX;

pub const ERROR_FILE_NOT_FOUND: i32 = 2;
pub const ERROR_GEN_FAILURE: i32 = 31;
pub const ERROR_INVALID_PARAMETER: i32 = 87;
pub const ERROR_ALREADY_EXISTS: i32 = 183;

/// Version reported while the driver is installed (0.14).
pub const RUNNING_VERSION: u32 = 0x0000_000E;

const IF_TYPE_PROP_VIRTUAL: u64 = 53;

#[derive(Debug)]
struct FakeAdapter {
    guid: Guid,
    luid: u64,
    /// Handles referencing this adapter, including other processes'.
    references: usize,
}

#[derive(Debug, Default)]
struct State {
    adapters: HashMap<String, FakeAdapter>,
    handles: HashMap<usize, String>,
    next_handle: usize,
    next_luid_index: u64,
    random_guids: u64,
    /// Network location profile number per adapter GUID.
    profiles: HashMap<Guid, u32>,
    releases: Vec<RawHandle>,
    uninstalled: bool,
    missing: BTreeSet<&'static str>,
}

/// In-memory [`Driver`].
#[derive(Debug, Default)]
pub struct InMemoryDriver {
    state: Mutex<State>,
}

fn native(operation: &'static str, code: i32) -> DriverError {
    DriverError::Native {
        operation,
        source: io::Error::from_raw_os_error(code),
    }
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `entry_point` unresolvable, as with an older driver library.
    pub fn without_entry_point(self, entry_point: &'static str) -> Self {
        self.state.lock().unwrap().missing.insert(entry_point);
        self
    }

    /// Simulates another process holding a handle to `name`.
    pub fn hold_from_other_process(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(adapter) = state.adapters.get_mut(name) {
            adapter.references += 1;
        }
    }

    /// Releases a handle held by another process.
    pub fn release_from_other_process(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        Self::drop_reference(&mut state, name);
    }

    /// Returns how often `handle` was released.
    pub fn release_count(&self, handle: RawHandle) -> usize {
        let state = self.state.lock().unwrap();
        state.releases.iter().filter(|&&h| h == handle).count()
    }

    /// Returns the total number of releases.
    pub fn total_releases(&self) -> usize {
        self.state.lock().unwrap().releases.len()
    }

    /// Returns the number of handles this process has open.
    pub fn open_handles(&self) -> usize {
        self.state.lock().unwrap().handles.len()
    }

    /// Returns the network location profile name of the adapter behind
    /// `handle`, e.g. "Network 2".
    pub fn network_location(&self, handle: RawHandle) -> Option<String> {
        let state = self.state.lock().unwrap();
        let name = state.handles.get(&handle.get())?;
        let guid = state.adapters.get(name)?.guid;
        state.profiles.get(&guid).map(|n| format!("Network {n}"))
    }

    fn check_entry(state: &State, entry_point: &'static str) -> Result<(), DriverError> {
        if state.missing.contains(entry_point) {
            return Err(BindError::SymbolNotFound {
                library: "in-memory".to_string(),
                symbol: entry_point.to_string(),
                source: None,
            }
            .into());
        }
        Ok(())
    }

    fn issue_handle(state: &mut State, name: &str) -> RawHandle {
        state.next_handle += 1;
        let raw = state.next_handle * 0x10;
        state.handles.insert(raw, name.to_string());
        RawHandle::new(raw).unwrap()
    }

    fn drop_reference(state: &mut State, name: &str) {
        let remove = state.adapters.get_mut(name).is_some_and(|adapter| {
            adapter.references = adapter.references.saturating_sub(1);
            adapter.references == 0
        });
        if remove {
            state.adapters.remove(name);
        }
    }
}

impl Driver for InMemoryDriver {
    fn create_adapter(
        &self,
        name: &str,
        tunnel_type: &str,
        requested_guid: Option<&Guid>,
    ) -> Result<RawHandle, DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_entry(&state, symbol::CREATE_ADAPTER)?;

        if name.is_empty() || tunnel_type.is_empty() || name.encode_utf16().count() > ADAPTER_NAME_MAX {
            return Err(native(symbol::CREATE_ADAPTER, ERROR_INVALID_PARAMETER));
        }
        if state.adapters.contains_key(name) {
            return Err(native(symbol::CREATE_ADAPTER, ERROR_ALREADY_EXISTS));
        }

        let guid = requested_guid.copied().unwrap_or_else(|| {
            state.random_guids += 1;
            Guid::from_name(&format!("system-random-{}", state.random_guids))
        });

        let next_profile = u32::try_from(state.profiles.len()).unwrap() + 1;
        state.profiles.entry(guid).or_insert(next_profile);

        state.next_luid_index += 1;
        let luid = (IF_TYPE_PROP_VIRTUAL << 48) | (state.next_luid_index << 24);
        state.adapters.insert(
            name.to_string(),
            FakeAdapter {
                guid,
                luid,
                references: 1,
            },
        );
        state.uninstalled = false;

        Ok(Self::issue_handle(&mut state, name))
    }

    fn open_adapter(&self, name: &str) -> Result<RawHandle, DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_entry(&state, symbol::OPEN_ADAPTER)?;

        let Some(adapter) = state.adapters.get_mut(name) else {
            return Err(native(symbol::OPEN_ADAPTER, ERROR_FILE_NOT_FOUND));
        };
        adapter.references += 1;

        Ok(Self::issue_handle(&mut state, name))
    }

    fn close_adapter(&self, handle: RawHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_entry(&state, symbol::CLOSE_ADAPTER)?;

        state.releases.push(handle);
        if let Some(name) = state.handles.remove(&handle.get()) {
            Self::drop_reference(&mut state, &name);
        }
        Ok(())
    }

    fn adapter_luid(&self, handle: RawHandle) -> u64 {
        let state = self.state.lock().unwrap();
        if Self::check_entry(&state, symbol::GET_ADAPTER_LUID).is_err() {
            return 0;
        }
        state
            .handles
            .get(&handle.get())
            .and_then(|name| state.adapters.get(name))
            .map_or(0, |adapter| adapter.luid)
    }

    fn delete_driver(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_entry(&state, symbol::DELETE_DRIVER)?;

        if !state.adapters.is_empty() {
            return Err(native(symbol::DELETE_DRIVER, ERROR_GEN_FAILURE));
        }
        state.uninstalled = true;
        Ok(())
    }

    fn running_driver_version(&self) -> Result<DriverVersion, DriverError> {
        let state = self.state.lock().unwrap();
        Self::check_entry(&state, symbol::GET_RUNNING_DRIVER_VERSION)?;

        if state.uninstalled {
            return Err(native(symbol::GET_RUNNING_DRIVER_VERSION, ERROR_FILE_NOT_FOUND));
        }
        Ok(DriverVersion::from_raw(RUNNING_VERSION))
    }
}
