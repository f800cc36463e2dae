//! Generation cache.
//!
//! Three independent tables, all keyed by canonical strings:
//!
//! ```text
//! base   shape descriptor                         → PolyMesh
//! step   base key + every enabled step so far     → PolyMesh
//! mesh   chain key + tessellation settings        → TriangleMesh
//! ```
//!
//! Entries are never evicted. The cache is an explicit context object shared
//! as `Arc<GenerationCache>`; tests create their own isolated instance.
//! Inserts go through `entry().or_insert`, so when two writers race on the
//! same key the first value wins and both callers get it back.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::mesh::PolyMesh;
use crate::types::TriangleMesh;

/// Canonical cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
  pub fn new(key: impl Into<String>) -> Self {
    Self(key.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// This key with `fragment` appended.
  pub fn extend(&self, fragment: &str) -> Self {
    let mut key = String::with_capacity(self.0.len() + fragment.len() + 1);
    key.push_str(&self.0);
    key.push('/');
    key.push_str(fragment);
    Self(key)
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheTable {
  Base,
  Step,
  Mesh,
}

impl CacheTable {
  fn index(self) -> usize {
    self as usize
  }
}

/// Hit/miss/entry counts for one table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableStats {
  pub hits: u64,
  pub misses: u64,
  pub entries: usize,
}

/// Snapshot of all three tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
  pub base: TableStats,
  pub step: TableStats,
  pub mesh: TableStats,
}

#[derive(Default)]
struct Counters {
  hits: AtomicU64,
  misses: AtomicU64,
}

#[derive(Default)]
pub struct GenerationCache {
  base: DashMap<CacheKey, Arc<PolyMesh>>,
  steps: DashMap<CacheKey, Arc<PolyMesh>>,
  meshes: DashMap<CacheKey, Arc<TriangleMesh>>,
  counters: [Counters; 3],
}

impl GenerationCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fresh cache behind an `Arc`, ready to share with workers.
  pub fn shared() -> Arc<Self> {
    Arc::new(Self::new())
  }

  fn record(&self, table: CacheTable, hit: bool, key: &CacheKey) {
    let counters = &self.counters[table.index()];
    if hit {
      counters.hits.fetch_add(1, Ordering::Relaxed);
    } else {
      counters.misses.fetch_add(1, Ordering::Relaxed);
    }
    debug!(?table, hit, key = %key, "Cache probe");
  }

  fn lookup<V: Clone>(&self, map: &DashMap<CacheKey, V>, table: CacheTable, key: &CacheKey) -> Option<V> {
    let found = map.get(key).map(|entry| entry.value().clone());
    self.record(table, found.is_some(), key);
    found
  }

  fn store<V: Clone>(map: &DashMap<CacheKey, V>, key: CacheKey, value: V) -> V {
    map.entry(key).or_insert(value).value().clone()
  }

  pub fn get_base(&self, key: &CacheKey) -> Option<Arc<PolyMesh>> {
    self.lookup(&self.base, CacheTable::Base, key)
  }

  /// Store a base mesh; returns the value now held for `key`.
  pub fn set_base(&self, key: CacheKey, mesh: Arc<PolyMesh>) -> Arc<PolyMesh> {
    Self::store(&self.base, key, mesh)
  }

  pub fn get_step(&self, key: &CacheKey) -> Option<Arc<PolyMesh>> {
    self.lookup(&self.steps, CacheTable::Step, key)
  }

  pub fn set_step(&self, key: CacheKey, mesh: Arc<PolyMesh>) -> Arc<PolyMesh> {
    Self::store(&self.steps, key, mesh)
  }

  pub fn get_mesh(&self, key: &CacheKey) -> Option<Arc<TriangleMesh>> {
    self.lookup(&self.meshes, CacheTable::Mesh, key)
  }

  pub fn set_mesh(&self, key: CacheKey, mesh: Arc<TriangleMesh>) -> Arc<TriangleMesh> {
    Self::store(&self.meshes, key, mesh)
  }

  pub fn contains(&self, table: CacheTable, key: &CacheKey) -> bool {
    match table {
      CacheTable::Base => self.base.contains_key(key),
      CacheTable::Step => self.steps.contains_key(key),
      CacheTable::Mesh => self.meshes.contains_key(key),
    }
  }

  pub fn len(&self, table: CacheTable) -> usize {
    match table {
      CacheTable::Base => self.base.len(),
      CacheTable::Step => self.steps.len(),
      CacheTable::Mesh => self.meshes.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.base.is_empty() && self.steps.is_empty() && self.meshes.is_empty()
  }

  fn table_stats(&self, table: CacheTable) -> TableStats {
    let counters = &self.counters[table.index()];
    TableStats {
      hits: counters.hits.load(Ordering::Relaxed),
      misses: counters.misses.load(Ordering::Relaxed),
      entries: self.len(table),
    }
  }

  pub fn stats(&self) -> CacheStats {
    CacheStats {
      base: self.table_stats(CacheTable::Base),
      step: self.table_stats(CacheTable::Step),
      mesh: self.table_stats(CacheTable::Mesh),
    }
  }

  /// Drop every entry and reset counters.
  pub fn clear(&self) {
    self.base.clear();
    self.steps.clear();
    self.meshes.clear();
    for counters in &self.counters {
      counters.hits.store(0, Ordering::Relaxed);
      counters.misses.store(0, Ordering::Relaxed);
    }
  }
}

impl fmt::Debug for GenerationCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GenerationCache")
      .field("stats", &self.stats())
      .finish()
  }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;
