//! Hash collections used throughout the crate.
//!
//! FxHash is faster than SipHash for the small integer keys we use
//! everywhere (window, container, and monitor ids).

pub use std::collections::BTreeMap;

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;
