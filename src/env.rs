use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use tracing::warn;

/// Key-value store that receives parsed assignments.
///
/// Setting a key that already exists replaces its value.
pub trait EnvSink {
    fn set_var(&mut self, key: &str, value: &str);
}

impl EnvSink for BTreeMap<String, String> {
    fn set_var(&mut self, key: &str, value: &str) {
        self.insert(key.to_owned(), value.to_owned());
    }
}

impl<S: BuildHasher> EnvSink for HashMap<String, String, S> {
    fn set_var(&mut self, key: &str, value: &str) {
        self.insert(key.to_owned(), value.to_owned());
    }
}

impl<T: EnvSink + ?Sized> EnvSink for &mut T {
    fn set_var(&mut self, key: &str, value: &str) {
        (**self).set_var(key, value);
    }
}

/// Destination for loaded environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnv {
    kind: TargetEnvKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetEnvKind {
    /// Apply entries to the current process environment.
    ///
    /// This writes through [`std::env::set_var`], which mutates global process
    /// state and is not thread-safe for concurrent environment access.
    Process,
    /// Apply entries to an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for TargetEnv {
    fn default() -> Self {
        Self::memory()
    }
}

impl TargetEnv {
    /// Create a process-environment target.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment for the duration of operations that may mutate this
    /// target.
    pub unsafe fn process() -> Self {
        Self {
            kind: TargetEnvKind::Process,
        }
    }

    /// Create an in-memory environment target.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory environment target seeded with existing values.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: TargetEnvKind::Memory(map),
        }
    }

    pub fn is_process(&self) -> bool {
        matches!(self.kind, TargetEnvKind::Process)
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub fn into_memory(self) -> Option<BTreeMap<String, String>> {
        match self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    /// Read a value back from the target.
    pub fn get_var(&self, key: &str) -> Option<String> {
        match &self.kind {
            TargetEnvKind::Process => {
                std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
            }
            TargetEnvKind::Memory(map) => map.get(key).cloned(),
        }
    }
}

impl EnvSink for TargetEnv {
    fn set_var(&mut self, key: &str, value: &str) {
        match &mut self.kind {
            TargetEnvKind::Process => {
                // `std::env::set_var` panics on these.
                if key.contains('\0') || value.contains('\0') {
                    warn!(key = %key.escape_debug(), "skipping variable containing NUL");
                    return;
                }
                // SAFETY: guaranteed by the caller of `TargetEnv::process`.
                unsafe { std::env::set_var(key, value) }
            }
            TargetEnvKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_target_overwrites_existing_values() {
        let mut initial = BTreeMap::new();
        initial.insert("A".to_string(), "old".to_string());
        let mut target = TargetEnv::from_memory(initial);

        target.set_var("A", "new");
        target.set_var("B", "added");

        assert!(!target.is_process());
        assert_eq!(target.get_var("A").as_deref(), Some("new"));
        assert_eq!(target.get_var("B").as_deref(), Some("added"));
    }

    #[test]
    fn maps_are_sinks() {
        fn apply(mut sink: impl EnvSink) {
            sink.set_var("K", "v");
        }

        let mut hash: HashMap<String, String> = HashMap::new();
        hash.set_var("K", "1");
        hash.set_var("K", "2");
        assert_eq!(hash.get("K").map(String::as_str), Some("2"));

        let mut tree: BTreeMap<String, String> = BTreeMap::new();
        apply(&mut tree);
        assert_eq!(tree.get("K").map(String::as_str), Some("v"));
    }

    #[test]
    fn process_target_skips_nul_bytes() {
        // SAFETY: the key is unique to this test and is never written.
        let mut target = unsafe { TargetEnv::process() };
        target.set_var("ENVLINE_ENV_TEST_NUL\0", "value");
        assert!(target.is_process());
        assert_eq!(target.get_var("ENVLINE_ENV_TEST_NUL"), None);
    }
}
