//! Query resolution and filter evaluation.
//!
//! Turns caller `FilterOptions` into a `ValidatedConfig` and applies it to a
//! catalog. A record matches iff every `Dimension` admits it. Filtering never
//! fails; an empty result is a normal outcome.

use laptopscope_features::{normalize_price, PriceError};
use laptopscope_model::{
    Facets, FilterConfig, FilterOptions, GpuClass, NormalizedRecord, ScreenRange,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid {field} range: {detail}")]
    InvalidRange { field: &'static str, detail: String },

    #[error("Invalid {field} option: {source}")]
    InvalidOption {
        field: &'static str,
        #[source]
        source: PriceError,
    },
}

/// A `FilterConfig` whose ranges have been checked.
///
/// Only `validate` and `resolve` produce one, and every filter entry point
/// takes one, so an inverted range never reaches evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedConfig(FilterConfig);

impl ValidatedConfig {
    pub fn config(&self) -> &FilterConfig {
        &self.0
    }

    pub fn into_inner(self) -> FilterConfig {
        self.0
    }
}

/// One filter dimension, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Price,
    Score,
    Brand,
    Usage,
    Ram,
    Storage,
    CpuVendor,
    Screen,
    GpuClass,
    Vram,
}

impl Dimension {
    pub const ALL: [Dimension; 10] = [
        Self::Price,
        Self::Score,
        Self::Brand,
        Self::Usage,
        Self::Ram,
        Self::Storage,
        Self::CpuVendor,
        Self::Screen,
        Self::GpuClass,
        Self::Vram,
    ];

    /// Whether this dimension lets the record through.
    pub fn admits(self, record: &NormalizedRecord, config: &ValidatedConfig) -> bool {
        let config = config.config();
        match self {
            Self::Price => (config.min_price..=config.max_price).contains(&record.price),
            Self::Score => record.score >= config.min_score,
            Self::Brand => config.brands.contains(&record.brand),
            Self::Usage => config.usages.contains(&record.usage),
            Self::Ram => record.ram_gb >= config.min_ram,
            Self::Storage => record.storage_gb >= config.min_storage,
            Self::CpuVendor => config.cpu_vendors.contains(&record.cpu_vendor()),
            Self::Screen => config.screen.contains(record.screen_in),
            Self::GpuClass => match exclusive_gpu_class(config) {
                Some(class) => record.gpu_class() == class,
                None => true,
            },
            Self::Vram => {
                if vram_threshold_applies(config) {
                    record.vram_gb >= config.min_vram
                } else {
                    true
                }
            }
        }
    }
}

/// The single selected GPU class, if exactly one is selected.
///
/// Both or neither selected means no GPU restriction.
fn exclusive_gpu_class(config: &FilterConfig) -> Option<GpuClass> {
    let dedicated = config.gpu_classes.contains(&GpuClass::Dedicated);
    let integrated = config.gpu_classes.contains(&GpuClass::Integrated);
    match (dedicated, integrated) {
        (true, false) => Some(GpuClass::Dedicated),
        (false, true) => Some(GpuClass::Integrated),
        _ => None,
    }
}

fn vram_threshold_applies(config: &FilterConfig) -> bool {
    config.gpu_classes.contains(&GpuClass::Dedicated) && config.min_vram > 0
}

/// First dimension that rejects the record, if any.
pub fn first_rejection(record: &NormalizedRecord, config: &ValidatedConfig) -> Option<Dimension> {
    Dimension::ALL
        .into_iter()
        .find(|dimension| !dimension.admits(record, config))
}

pub fn matches(record: &NormalizedRecord, config: &ValidatedConfig) -> bool {
    first_rejection(record, config).is_none()
}

/// Return the records that satisfy every active predicate, in catalog order.
pub fn filter(catalog: &[NormalizedRecord], config: &ValidatedConfig) -> Vec<NormalizedRecord> {
    catalog
        .iter()
        .filter(|record| matches(record, config))
        .cloned()
        .collect()
}

/// Per-dimension rejection counts for one query.
///
/// A rejected record is counted against the first dimension it fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub examined: usize,
    pub matched: usize,
    pub rejected_by: BTreeMap<Dimension, usize>,
}

/// Filter and record why each non-matching record was dropped.
pub fn filter_with_stats(
    catalog: &[NormalizedRecord],
    config: &ValidatedConfig,
) -> (Vec<NormalizedRecord>, FilterStats) {
    let mut stats = FilterStats {
        examined: catalog.len(),
        ..Default::default()
    };

    let matched: Vec<NormalizedRecord> = catalog
        .iter()
        .filter(|record| match first_rejection(record, config) {
            Some(dimension) => {
                *stats.rejected_by.entry(dimension).or_default() += 1;
                false
            }
            None => true,
        })
        .cloned()
        .collect();

    stats.matched = matched.len();
    tracing::debug!(
        examined = stats.examined,
        matched = stats.matched,
        rejected_by = ?stats.rejected_by,
        "Filtered catalog"
    );

    (matched, stats)
}

/// Run independent queries in parallel over the same catalog.
///
/// Results are returned in the order of `configs`.
pub fn filter_many(catalog: &[NormalizedRecord], configs: &[ValidatedConfig]) -> Vec<Vec<NormalizedRecord>> {
    configs
        .par_iter()
        .map(|config| filter(catalog, config))
        .collect()
}

/// Resolve caller options against the catalog's observed domain.
///
/// Absent options select every observed value, and `"Max"` leaves the price
/// ceiling open. The resulting config is validated before it is returned.
pub fn resolve(options: &FilterOptions, facets: &Facets) -> Result<ValidatedConfig, QueryError> {
    let base = FilterConfig::permissive(facets);

    let min_price = match &options.min_price {
        Some(price) => normalize_price(price).map_err(|source| QueryError::InvalidOption {
            field: "min_price",
            source,
        })?,
        None => base.min_price,
    };

    let max_price = match &options.max_price {
        Some(price) if price.is_max_sentinel() => u64::MAX,
        Some(price) => normalize_price(price).map_err(|source| QueryError::InvalidOption {
            field: "max_price",
            source,
        })?,
        None => base.max_price,
    };

    let config = FilterConfig {
        min_price,
        max_price,
        brands: options.brands.clone().unwrap_or(base.brands),
        usages: options.usages.clone().unwrap_or(base.usages),
        min_ram: options.min_ram.unwrap_or(base.min_ram),
        min_storage: options.min_storage.unwrap_or(base.min_storage),
        cpu_vendors: options.cpu_vendors.clone().unwrap_or(base.cpu_vendors),
        screen: ScreenRange::new(
            options.screen_min.unwrap_or(base.screen.min),
            options.screen_max.unwrap_or(base.screen.max),
        ),
        min_score: options.min_score.unwrap_or(base.min_score),
        gpu_classes: options.gpu_classes.clone().unwrap_or(base.gpu_classes),
        min_vram: options.min_vram.unwrap_or(base.min_vram),
    };

    validate(config, facets)
}

/// Reject configs whose ranges are inverted or whose minimum score lies
/// outside the catalog's observed scores.
pub fn validate(config: FilterConfig, facets: &Facets) -> Result<ValidatedConfig, QueryError> {
    if config.min_price > config.max_price {
        return Err(QueryError::InvalidRange {
            field: "price",
            detail: format!("min {} > max {}", config.min_price, config.max_price),
        });
    }

    let screen = config.screen;
    if screen.min.is_nan() || screen.max.is_nan() || screen.min > screen.max {
        return Err(QueryError::InvalidRange {
            field: "screen",
            detail: format!("min {} > max {}", screen.min, screen.max),
        });
    }

    if let Some((lo, hi)) = facets.score_range {
        if config.min_score < lo || config.min_score > hi {
            return Err(QueryError::InvalidRange {
                field: "min_score",
                detail: format!("{} is outside the observed {}..={}", config.min_score, lo, hi),
            });
        }
    }

    Ok(ValidatedConfig(config))
}
