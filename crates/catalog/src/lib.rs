//! Catalog loading.
//!
//! Provides the `CatalogSource` trait with a JSON file and an in-memory
//! implementation, and the immutable `Catalog` that queries run against.
//! Records are normalized once here; queries only ever read them.

use laptopscope_features::{normalize_record, PriceError};
use laptopscope_model::{Facets, NormalizedRecord, RawRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors from catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode catalog: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Record #{position} ('{name}') has an invalid price: {source}")]
    InvalidPrice {
        position: usize,
        name: String,
        #[source]
        source: PriceError,
    },
}

/// Trait for catalog sources (JSON file, in-memory, ...).
pub trait CatalogSource {
    /// Read every raw record, in catalog order.
    fn load(&self) -> Result<Vec<RawRecord>, CatalogError>;

    /// Get the source name for logging.
    fn name(&self) -> &'static str;
}

/// A catalog stored as a JSON array of records.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileSource {
    fn load(&self) -> Result<Vec<RawRecord>, CatalogError> {
        tracing::debug!(path = %self.path.display(), "Reading catalog file");

        let content = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;

        parse_records(&content)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

/// Records supplied directly by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<RawRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl CatalogSource for InMemorySource {
    fn load(&self) -> Result<Vec<RawRecord>, CatalogError> {
        Ok(self.records.clone())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

/// Parse a JSON array of raw records.
pub fn parse_records(json: &str) -> Result<Vec<RawRecord>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

/// What to do with a record whose price cannot be normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Drop the record and report it
    #[default]
    SkipInvalid,
    /// Fail the whole load
    Strict,
}

/// A record dropped during a `SkipInvalid` load.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position in the source, zero-based
    pub position: usize,
    pub name: String,
    pub error: PriceError,
}

/// Outcome of loading a catalog.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub rejected: Vec<RejectedRecord>,
}

/// An immutable, cheaply cloneable set of normalized records.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Arc<[NormalizedRecord]>,
    facets: Arc<Facets>,
}

impl Catalog {
    /// Load and normalize every record from a source.
    pub fn load(source: &impl CatalogSource, policy: LoadPolicy) -> Result<CatalogLoad, CatalogError> {
        let raw = source.load()?;
        tracing::debug!(source = source.name(), records = raw.len(), "Loaded raw catalog");
        Self::from_raw(&raw, policy)
    }

    /// Normalize raw records into a catalog.
    pub fn from_raw(raw: &[RawRecord], policy: LoadPolicy) -> Result<CatalogLoad, CatalogError> {
        let mut records = Vec::with_capacity(raw.len());
        let mut rejected = Vec::new();

        for (position, record) in raw.iter().enumerate() {
            match normalize_record(record) {
                Ok(normalized) => records.push(normalized),
                Err(error) => match policy {
                    LoadPolicy::Strict => {
                        return Err(CatalogError::InvalidPrice {
                            position,
                            name: record.name.clone(),
                            source: error,
                        });
                    }
                    LoadPolicy::SkipInvalid => {
                        tracing::warn!(position, name = %record.name, error = %error, "Rejecting catalog record");
                        rejected.push(RejectedRecord {
                            position,
                            name: record.name.clone(),
                            error,
                        });
                    }
                },
            }
        }

        tracing::debug!(accepted = records.len(), rejected = rejected.len(), "Normalized catalog");

        Ok(CatalogLoad {
            catalog: Self::from_records(records),
            rejected,
        })
    }

    /// Wrap already-normalized records.
    pub fn from_records(records: Vec<NormalizedRecord>) -> Self {
        let facets = Facets::observe(&records);
        Self {
            records: records.into(),
            facets: Arc::new(facets),
        }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laptopscope_model::CpuVendor;

    fn sample() -> Vec<RawRecord> {
        vec![
            RawRecord::new("IdeaPad Slim 3", "Lenovo", 65_990u64, 55).with_cpu("13th Gen Core i7 13620H"),
            RawRecord::new("Odd One", "Acme", "call for price", 50),
            RawRecord::new("MacBook Air", "Apple", "₹1 Lakh", 70).with_cpu("Apple M2"),
        ]
    }

    #[test]
    fn test_skip_invalid_reports_rejects() {
        let load = Catalog::load(&InMemorySource::new(sample()), LoadPolicy::SkipInvalid).unwrap();
        assert_eq!(load.catalog.len(), 2);
        assert_eq!(load.rejected.len(), 1);
        assert_eq!(load.rejected[0].position, 1);
        assert_eq!(load.rejected[0].name, "Odd One");
        assert_eq!(load.catalog.records()[1].price, 100_000);
    }

    #[test]
    fn test_strict_fails_whole_load() {
        let err = Catalog::load(&InMemorySource::new(sample()), LoadPolicy::Strict).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPrice { position: 1, .. }));
    }

    #[test]
    fn test_facets_follow_accepted_records() {
        let load = Catalog::from_raw(&sample(), LoadPolicy::SkipInvalid).unwrap();
        let facets = load.catalog.facets();
        assert!(!facets.brands.contains("Acme"));
        assert!(facets.cpu_vendors.contains(&CpuVendor::Apple));
        assert_eq!(facets.price_range, Some((65_990, 100_000)));
    }

    #[test]
    fn test_clone_shares_records() {
        let catalog = Catalog::from_raw(&sample(), LoadPolicy::SkipInvalid).unwrap().catalog;
        let clone = catalog.clone();
        assert!(std::ptr::eq(catalog.records(), clone.records()));
    }

    #[test]
    fn test_json_file_source() {
        let path = std::env::temp_dir().join(format!("laptopscope-catalog-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"name": "Victus 15", "brand": "HP", "utility": "Gaming",
                 "cpu_full": "AMD Ryzen 5 8645HS", "ram_gb": 16, "storage_gb": 512,
                 "screen_size_in": 15.6, "spec_score": 72, "price_inr": "₹65,990",
                 "gpu_type": "NVIDIA GeForce RTX 3050", "gpu_vram_gb": 6}]"#,
        )
        .unwrap();

        let load = Catalog::load(&JsonFileSource::new(&path), LoadPolicy::Strict);
        std::fs::remove_file(&path).unwrap();

        let catalog = load.unwrap().catalog;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].price, 65_990);
        assert_eq!(catalog.records()[0].cpu_vendor(), CpuVendor::Amd);
    }

    #[test]
    fn test_missing_file() {
        let source = JsonFileSource::new("/nonexistent/laptops.json");
        assert!(matches!(source.load(), Err(CatalogError::Io { .. })));
    }

    #[test]
    fn test_decode_error() {
        assert!(matches!(parse_records("{not json"), Err(CatalogError::Decode(_))));
    }
}
