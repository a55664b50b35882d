//! Thread-safe memoization of per-pair results.
//!
//! [`ResultCache`] maps a canonical [`PairKey`] to the last correlation and
//! cointegration result computed for it. One mutex guards both maps and is
//! held only for a single lookup or insert; hit and miss counters are
//! atomics so reading statistics never contends with the workers.
//!
//! # Persistence
//!
//! ```text
//! save(writer) ──► JSON { version, settings, correlation: [..], cointegration: [..] }
//! load(reader) ◄── same document; entries re-keyed from their symbols
//! ```
//!
//! Entries are written in key order so identical caches produce identical
//! bytes. A snapshot written under different [`CacheSettings`] is discarded
//! on load, since every cointegration result depends on them.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use quant::{PairAnalysis, PairSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use types::{CointegrationResult, CorrelationResult, PairKey};

use crate::error::CacheError;

/// Persisted format version.
const FORMAT_VERSION: u32 = 2;

#[derive(Debug, Default)]
struct Tables {
    correlation: HashMap<PairKey, CorrelationResult>,
    cointegration: HashMap<PairKey, CointegrationResult>,
}

/// Analysis parameters a cached result was computed under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    pub significance_level: f64,
    pub adf_max_lags: usize,
    pub entry_z: f64,
    pub exit_z: f64,
    pub stop_z: f64,
}

impl From<&PairSettings> for CacheSettings {
    fn from(s: &PairSettings) -> Self {
        Self {
            significance_level: s.significance_level,
            adf_max_lags: s.adf_max_lags,
            entry_z: s.entry_z,
            exit_z: s.exit_z,
            stop_z: s.stop_z,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(default)]
    settings: Option<CacheSettings>,
    correlation: Vec<CorrelationResult>,
    cointegration: Vec<CointegrationResult>,
}

/// Hit, miss and size counters of a [`ResultCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub correlation_hits: u64,
    pub correlation_misses: u64,
    pub cointegration_hits: u64,
    pub cointegration_misses: u64,
    pub correlation_entries: usize,
    pub cointegration_entries: usize,
    /// Hits over lookups across both maps; 0 before any lookup.
    pub hit_rate: f64,
    /// Approximate heap footprint of both maps.
    pub memory_mb: f64,
}

/// Pair-keyed result cache shared by the scheduler's workers.
#[derive(Debug, Default)]
pub struct ResultCache {
    tables: Mutex<Tables>,
    /// Settings this cache's entries belong to; `None` accepts any snapshot.
    settings: Option<CacheSettings>,
    correlation_hits: AtomicU64,
    correlation_misses: AtomicU64,
    cointegration_hits: AtomicU64,
    cointegration_misses: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose persisted snapshots are only reused under `settings`.
    pub fn with_settings(settings: CacheSettings) -> Self {
        Self {
            settings: Some(settings),
            ..Self::default()
        }
    }

    pub fn settings(&self) -> Option<&CacheSettings> {
        self.settings.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup and insert
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy of the cached correlation result for `key`.
    pub fn correlation(&self, key: &PairKey) -> Option<CorrelationResult> {
        let hit = self.tables.lock().correlation.get(key).cloned();
        Self::record(hit.is_some(), &self.correlation_hits, &self.correlation_misses);
        hit
    }

    /// Copy of the cached cointegration result for `key`.
    pub fn cointegration(&self, key: &PairKey) -> Option<CointegrationResult> {
        let hit = self.tables.lock().cointegration.get(key).cloned();
        Self::record(hit.is_some(), &self.cointegration_hits, &self.cointegration_misses);
        hit
    }

    /// Both results for `key`, when both are cached.
    pub fn pair(&self, key: &PairKey) -> Option<PairAnalysis> {
        self.pair_where(key, |_| true)
    }

    /// Both results for `key`, when both are cached and `fresh` accepts
    /// them. A rejected entry counts as a miss on both maps.
    pub fn pair_where(&self, key: &PairKey, fresh: impl FnOnce(&PairAnalysis) -> bool) -> Option<PairAnalysis> {
        let found = {
            let tables = self.tables.lock();
            match (tables.correlation.get(key), tables.cointegration.get(key)) {
                (Some(correlation), Some(cointegration)) => Some(PairAnalysis {
                    correlation: correlation.clone(),
                    cointegration: cointegration.clone(),
                }),
                _ => None,
            }
        };
        let hit = found.filter(fresh);
        Self::record(hit.is_some(), &self.correlation_hits, &self.correlation_misses);
        Self::record(hit.is_some(), &self.cointegration_hits, &self.cointegration_misses);
        hit
    }

    /// Store a correlation result under its own key (last writer wins).
    pub fn insert_correlation(&self, result: CorrelationResult) {
        let key = result.key();
        self.tables.lock().correlation.insert(key, result);
    }

    /// Store a cointegration result under its own key (last writer wins).
    pub fn insert_cointegration(&self, result: CointegrationResult) {
        let key = result.key();
        self.tables.lock().cointegration.insert(key, result);
    }

    pub fn insert_pair(&self, analysis: &PairAnalysis) {
        self.insert_correlation(analysis.correlation.clone());
        self.insert_cointegration(analysis.cointegration.clone());
    }

    fn record(hit: bool, hits: &AtomicU64, misses: &AtomicU64) {
        let counter = if hit { hits } else { misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop all entries and reset the counters.
    pub fn clear(&self) {
        let mut tables = self.tables.lock();
        tables.correlation.clear();
        tables.cointegration.clear();
        for counter in [
            &self.correlation_hits,
            &self.correlation_misses,
            &self.cointegration_hits,
            &self.cointegration_misses,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Number of cached (correlation, cointegration) entries.
    pub fn len(&self) -> (usize, usize) {
        let tables = self.tables.lock();
        (tables.correlation.len(), tables.cointegration.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == (0, 0)
    }

    pub fn stats(&self) -> CacheStats {
        let (correlation_entries, cointegration_entries, bytes) = {
            let tables = self.tables.lock();
            let corr_bytes: usize = tables
                .correlation
                .iter()
                .map(|(k, v)| {
                    k.heap_bytes()
                        + std::mem::size_of::<CorrelationResult>()
                        + v.stock1.capacity()
                        + v.stock2.capacity()
                        + v.sector1.capacity()
                        + v.sector2.capacity()
                })
                .sum();
            let coint_bytes: usize = tables
                .cointegration
                .iter()
                .map(|(k, v)| {
                    k.heap_bytes()
                        + std::mem::size_of::<CointegrationResult>()
                        + v.stock1.capacity()
                        + v.stock2.capacity()
                })
                .sum();
            (
                tables.correlation.len(),
                tables.cointegration.len(),
                corr_bytes + coint_bytes,
            )
        };

        let correlation_hits = self.correlation_hits.load(Ordering::Relaxed);
        let correlation_misses = self.correlation_misses.load(Ordering::Relaxed);
        let cointegration_hits = self.cointegration_hits.load(Ordering::Relaxed);
        let cointegration_misses = self.cointegration_misses.load(Ordering::Relaxed);
        let hits = correlation_hits + cointegration_hits;
        let lookups = hits + correlation_misses + cointegration_misses;

        CacheStats {
            correlation_hits,
            correlation_misses,
            cointegration_hits,
            cointegration_misses,
            correlation_entries,
            cointegration_entries,
            hit_rate: if lookups > 0 {
                hits as f64 / lookups as f64
            } else {
                0.0
            },
            memory_mb: bytes as f64 / (1024.0 * 1024.0),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize every entry to `writer`.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), CacheError> {
        let snapshot = {
            let tables = self.tables.lock();
            let mut correlation: Vec<_> = tables.correlation.values().cloned().collect();
            let mut cointegration: Vec<_> = tables.cointegration.values().cloned().collect();
            correlation.sort_by(|a, b| (&a.stock1, &a.stock2).cmp(&(&b.stock1, &b.stock2)));
            cointegration.sort_by(|a, b| (&a.stock1, &a.stock2).cmp(&(&b.stock1, &b.stock2)));
            Snapshot {
                version: FORMAT_VERSION,
                settings: self.settings,
                correlation,
                cointegration,
            }
        };
        serde_json::to_writer(writer, &snapshot).map_err(CacheError::Encode)
    }

    /// Replace the contents with entries read from `reader`.
    ///
    /// On corrupt input, or a snapshot saved under other settings, the cache
    /// is left empty and the error returned. Returns the number of entries
    /// restored.
    pub fn load<R: Read>(&self, reader: R) -> Result<usize, CacheError> {
        let parsed: Result<Snapshot, _> = serde_json::from_reader(reader);
        let mut tables = self.tables.lock();
        tables.correlation.clear();
        tables.cointegration.clear();

        let snapshot = parsed.map_err(CacheError::Corrupt)?;
        if snapshot.version != FORMAT_VERSION {
            return Err(CacheError::Corrupt(serde::de::Error::custom(format!(
                "unsupported cache version {}",
                snapshot.version
            ))));
        }
        if self.settings.is_some() && snapshot.settings != self.settings {
            return Err(CacheError::SettingsChanged);
        }
        let restored = snapshot.correlation.len() + snapshot.cointegration.len();
        tables.correlation = snapshot
            .correlation
            .into_iter()
            .map(|r| (r.key(), r))
            .collect();
        tables.cointegration = snapshot
            .cointegration
            .into_iter()
            .map(|r| (r.key(), r))
            .collect();
        Ok(restored)
    }

    /// Write the cache to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<(), CacheError> {
        let io_err = |source: std::io::Error| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        self.save(&mut out)?;
        out.flush().map_err(io_err)?;
        info!(path = %path.display(), entries = ?self.len(), "saved result cache");
        Ok(())
    }

    /// Restore the cache from `path`.
    ///
    /// A missing file restores nothing. A corrupt file is logged and leaves
    /// the cache empty; only an unreadable file is an error.
    pub fn load_from_file(&self, path: &Path) -> Result<usize, CacheError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file yet");
                return Ok(0);
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        match self.load(BufReader::new(file)) {
            Ok(restored) => {
                info!(path = %path.display(), restored, "loaded result cache");
                Ok(restored)
            }
            Err(CacheError::SettingsChanged) => {
                info!(path = %path.display(), "cache was built with other settings, starting empty");
                Ok(0)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache, starting empty");
                Ok(0)
            }
        }
    }
}
