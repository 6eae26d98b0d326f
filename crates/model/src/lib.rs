//! Core domain model for LaptopScope catalog queries.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `RawRecord`: A catalog item as it arrives from the catalog file
//! - `NormalizedRecord`: The canonical record with derived classification fields
//! - `FilterConfig` / `FilterOptions`: The active query and its caller-facing form
//! - `RankedRecord`: A match annotated with its value score
//! - `Facets`: The observed value domain of a loaded catalog

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper screen bound used by the open-ended top bucket.
///
/// Screen ranges are half-open, so the largest bucket reaches the true
/// maximum by sitting above any realistic screen size.
pub const SCREEN_CEILING: f64 = 100.0;

/// Sentinel accepted as a max-price option meaning "no upper bound".
pub const MAX_PRICE_SENTINEL: &str = "Max";

/// A string did not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// CPU vendor class derived from the free-text CPU description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CpuVendor {
    Apple,
    #[serde(rename = "AMD")]
    Amd,
    Intel,
    Other,
}

impl CpuVendor {
    pub const ALL: [CpuVendor; 4] = [Self::Apple, Self::Amd, Self::Intel, Self::Other];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Apple => "Apple",
            Self::Amd => "AMD",
            Self::Intel => "Intel",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CpuVendor {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "APPLE" => Ok(Self::Apple),
            "AMD" => Ok(Self::Amd),
            "INTEL" => Ok(Self::Intel),
            "OTHER" => Ok(Self::Other),
            _ => Err(UnknownVariant {
                kind: "CPU vendor",
                value: s.to_string(),
            }),
        }
    }
}

/// Whether a machine carries dedicated video memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GpuClass {
    Dedicated,
    Integrated,
}

impl GpuClass {
    pub const ALL: [GpuClass; 2] = [Self::Dedicated, Self::Integrated];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dedicated => "Dedicated",
            Self::Integrated => "Integrated",
        }
    }
}

impl fmt::Display for GpuClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GpuClass {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEDICATED" => Ok(Self::Dedicated),
            "INTEGRATED" => Ok(Self::Integrated),
            _ => Err(UnknownVariant {
                kind: "GPU class",
                value: s.to_string(),
            }),
        }
    }
}

/// A price as supplied by the catalog or a caller.
///
/// Integers are already in rupees. Text such as `"₹1.25 Lakh"` needs
/// normalization before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Amount(u64),
    Text(String),
}

impl PriceInput {
    /// Whether this is the `"Max"` option that lifts the upper price bound.
    pub fn is_max_sentinel(&self) -> bool {
        matches!(self, Self::Text(t) if t.trim().eq_ignore_ascii_case(MAX_PRICE_SENTINEL))
    }
}

impl From<u64> for PriceInput {
    fn from(amount: u64) -> Self {
        Self::Amount(amount)
    }
}

impl From<&str> for PriceInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PriceInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A catalog item as read from the catalog file.
///
/// Field names on the wire follow the catalog's JSON keys; the shorter
/// canonical names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Display name (not required to be unique)
    pub name: String,

    pub brand: String,

    #[serde(default)]
    pub os: String,

    /// Usage category, e.g. "Gaming" or "Everyday Use"
    #[serde(rename = "utility", alias = "usage")]
    pub usage: String,

    /// Free-text CPU description
    #[serde(rename = "cpu_full", alias = "cpu")]
    pub cpu: String,

    pub ram_gb: u32,

    pub storage_gb: u32,

    #[serde(rename = "screen_size_in", alias = "screen_in")]
    pub screen_in: f64,

    /// Performance score
    #[serde(rename = "spec_score", alias = "score")]
    pub score: u32,

    #[serde(rename = "price_inr", alias = "price")]
    pub price: PriceInput,

    /// Free-text GPU description
    #[serde(rename = "gpu_type", alias = "gpu", default)]
    pub gpu: String,

    /// Dedicated video memory; 0 means integrated graphics
    #[serde(rename = "gpu_vram_gb", alias = "vram_gb", default)]
    pub vram_gb: u32,
}

impl RawRecord {
    /// Create a minimal record for testing.
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        price: impl Into<PriceInput>,
        score: u32,
    ) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            os: String::new(),
            usage: String::new(),
            cpu: String::new(),
            ram_gb: 8,
            storage_gb: 256,
            screen_in: 15.6,
            score,
            price: price.into(),
            gpu: String::new(),
            vram_gb: 0,
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_cpu(mut self, cpu: impl Into<String>) -> Self {
        self.cpu = cpu.into();
        self
    }

    pub fn with_memory(mut self, ram_gb: u32, storage_gb: u32) -> Self {
        self.ram_gb = ram_gb;
        self.storage_gb = storage_gb;
        self
    }

    pub fn with_screen(mut self, screen_in: f64) -> Self {
        self.screen_in = screen_in;
        self
    }

    pub fn with_gpu(mut self, gpu: impl Into<String>, vram_gb: u32) -> Self {
        self.gpu = gpu.into();
        self.vram_gb = vram_gb;
        self
    }
}

/// Classification fields computed once from the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub cpu_vendor: CpuVendor,

    /// Vendor-specific tier ("i7", "Ryzen 5", ...), "Other" or "N/A"
    pub cpu_tier: String,

    pub gpu_class: GpuClass,
}

/// A catalog record in canonical form.
///
/// Produced once at catalog load and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: String,
    pub brand: String,
    pub os: String,
    pub usage: String,
    pub cpu: String,
    pub ram_gb: u32,
    pub storage_gb: u32,
    pub screen_in: f64,
    pub score: u32,

    /// Price in whole rupees
    pub price: u64,

    pub gpu: String,
    pub vram_gb: u32,

    #[serde(flatten)]
    pub derived: DerivedFields,
}

impl NormalizedRecord {
    /// Assemble a record from its raw form, an already-normalized price and
    /// the derived fields.
    pub fn from_parts(raw: &RawRecord, price: u64, derived: DerivedFields) -> Self {
        Self {
            name: raw.name.clone(),
            brand: raw.brand.clone(),
            os: raw.os.clone(),
            usage: raw.usage.clone(),
            cpu: raw.cpu.clone(),
            ram_gb: raw.ram_gb,
            storage_gb: raw.storage_gb,
            screen_in: raw.screen_in,
            score: raw.score,
            price,
            gpu: raw.gpu.clone(),
            vram_gb: raw.vram_gb,
            derived,
        }
    }

    pub fn cpu_vendor(&self) -> CpuVendor {
        self.derived.cpu_vendor
    }

    pub fn gpu_class(&self) -> GpuClass {
        self.derived.gpu_class
    }
}

/// A filtered record annotated with its value score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: NormalizedRecord,

    /// Price per performance point (lower = better value)
    pub value_score: f64,
}

/// Half-open screen size range `[min, max)` in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRange {
    pub min: f64,
    pub max: f64,
}

impl ScreenRange {
    pub const ALL: ScreenRange = ScreenRange::new(0.0, SCREEN_CEILING);

    /// Named buckets offered to users.
    pub const PRESETS: [(&'static str, ScreenRange); 4] = [
        ("14-15", ScreenRange::new(14.0, 15.0)),
        ("15-16", ScreenRange::new(15.0, 16.0)),
        ("16+", ScreenRange::new(16.0, SCREEN_CEILING)),
        ("all", ScreenRange::ALL),
    ];

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Look up a named bucket.
    pub fn preset(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::PRESETS
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, range)| *range)
    }

    /// Lower bound inclusive, upper bound exclusive.
    pub fn contains(&self, inches: f64) -> bool {
        inches >= self.min && inches < self.max
    }
}

impl Default for ScreenRange {
    fn default() -> Self {
        Self::ALL
    }
}

/// The active query.
///
/// Built once per query and never mutated; a new query builds a new value.
/// Empty `brands`, `usages` or `cpu_vendors` match nothing, while empty
/// `gpu_classes` applies no GPU restriction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Inclusive lower price bound
    pub min_price: u64,
    /// Inclusive upper price bound
    pub max_price: u64,
    pub brands: BTreeSet<String>,
    pub usages: BTreeSet<String>,
    pub min_ram: u32,
    pub min_storage: u32,
    pub cpu_vendors: BTreeSet<CpuVendor>,
    pub screen: ScreenRange,
    pub min_score: u32,
    pub gpu_classes: BTreeSet<GpuClass>,
    /// Only enforced when `Dedicated` is selected and the value is > 0
    pub min_vram: u32,
}

impl FilterConfig {
    /// A config that selects every value observed in the catalog.
    /// The price ceiling is left open.
    pub fn permissive(facets: &Facets) -> Self {
        Self {
            min_price: facets.price_range.map(|(lo, _)| lo).unwrap_or(0),
            max_price: u64::MAX,
            brands: facets.brands.clone(),
            usages: facets.usages.clone(),
            min_ram: facets.ram_options.first().copied().unwrap_or(0),
            min_storage: facets.storage_options.first().copied().unwrap_or(0),
            cpu_vendors: facets.cpu_vendors.clone(),
            screen: ScreenRange::ALL,
            min_score: facets.score_range.map(|(lo, _)| lo).unwrap_or(0),
            gpu_classes: GpuClass::ALL.into_iter().collect(),
            min_vram: 0,
        }
    }

    pub fn with_price_range(mut self, min_price: u64, max_price: u64) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_min_score(mut self, min_score: u32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = brands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_usages<I, S>(mut self, usages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.usages = usages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_memory(mut self, min_ram: u32, min_storage: u32) -> Self {
        self.min_ram = min_ram;
        self.min_storage = min_storage;
        self
    }

    pub fn with_cpu_vendors(mut self, vendors: impl IntoIterator<Item = CpuVendor>) -> Self {
        self.cpu_vendors = vendors.into_iter().collect();
        self
    }

    pub fn with_screen(mut self, screen: ScreenRange) -> Self {
        self.screen = screen;
        self
    }

    pub fn with_gpu_classes(mut self, classes: impl IntoIterator<Item = GpuClass>) -> Self {
        self.gpu_classes = classes.into_iter().collect();
        self
    }

    pub fn with_min_vram(mut self, min_vram: u32) -> Self {
        self.min_vram = min_vram;
        self
    }
}

/// Caller-facing query options.
///
/// Every field is optional. An absent field resolves to the permissive
/// default drawn from the catalog's `Facets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    #[serde(alias = "minPrice", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<PriceInput>,

    /// Accepts `"Max"` for no upper bound
    #[serde(alias = "maxPrice", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<PriceInput>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub brands: Option<BTreeSet<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usages: Option<BTreeSet<String>>,

    #[serde(alias = "minRam", skip_serializing_if = "Option::is_none")]
    pub min_ram: Option<u32>,

    #[serde(alias = "minStorage", skip_serializing_if = "Option::is_none")]
    pub min_storage: Option<u32>,

    #[serde(alias = "cpuVendors", skip_serializing_if = "Option::is_none")]
    pub cpu_vendors: Option<BTreeSet<CpuVendor>>,

    #[serde(alias = "screenMin", skip_serializing_if = "Option::is_none")]
    pub screen_min: Option<f64>,

    #[serde(alias = "screenMax", skip_serializing_if = "Option::is_none")]
    pub screen_max: Option<f64>,

    #[serde(alias = "minScore", skip_serializing_if = "Option::is_none")]
    pub min_score: Option<u32>,

    #[serde(alias = "gpuClasses", skip_serializing_if = "Option::is_none")]
    pub gpu_classes: Option<BTreeSet<GpuClass>>,

    #[serde(alias = "minVram", skip_serializing_if = "Option::is_none")]
    pub min_vram: Option<u32>,
}

/// The observed value domain of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facets {
    pub brands: BTreeSet<String>,
    pub usages: BTreeSet<String>,
    pub cpu_vendors: BTreeSet<CpuVendor>,
    /// Distinct RAM sizes, ascending
    pub ram_options: Vec<u32>,
    /// Distinct storage sizes, ascending
    pub storage_options: Vec<u32>,
    /// Distinct non-zero VRAM sizes, ascending
    pub vram_options: Vec<u32>,
    /// (min, max) score; `None` for an empty catalog
    pub score_range: Option<(u32, u32)>,
    /// (min, max) price; `None` for an empty catalog
    pub price_range: Option<(u64, u64)>,
}

impl Facets {
    /// Collect the observed domain of a set of records.
    pub fn observe(records: &[NormalizedRecord]) -> Self {
        let mut ram = BTreeSet::new();
        let mut storage = BTreeSet::new();
        let mut vram = BTreeSet::new();
        let mut facets = Self::default();

        for record in records {
            facets.brands.insert(record.brand.clone());
            facets.usages.insert(record.usage.clone());
            facets.cpu_vendors.insert(record.cpu_vendor());
            ram.insert(record.ram_gb);
            storage.insert(record.storage_gb);
            if record.vram_gb > 0 {
                vram.insert(record.vram_gb);
            }

            facets.score_range = Some(match facets.score_range {
                Some((lo, hi)) => (lo.min(record.score), hi.max(record.score)),
                None => (record.score, record.score),
            });
            facets.price_range = Some(match facets.price_range {
                Some((lo, hi)) => (lo.min(record.price), hi.max(record.price)),
                None => (record.price, record.price),
            });
        }

        facets.ram_options = ram.into_iter().collect();
        facets.storage_options = storage.into_iter().collect();
        facets.vram_options = vram.into_iter().collect();
        facets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(name: &str, brand: &str, price: u64, score: u32, vram: u32) -> NormalizedRecord {
        let raw = RawRecord::new(name, brand, price, score).with_gpu("", vram);
        let derived = DerivedFields {
            cpu_vendor: CpuVendor::Intel,
            cpu_tier: "i5".to_string(),
            gpu_class: if vram > 0 { GpuClass::Dedicated } else { GpuClass::Integrated },
        };
        NormalizedRecord::from_parts(&raw, price, derived)
    }

    #[test]
    fn test_vendor_from_str() {
        assert_eq!("AMD".parse::<CpuVendor>(), Ok(CpuVendor::Amd));
        assert_eq!("apple".parse::<CpuVendor>(), Ok(CpuVendor::Apple));
        assert!("Qualcomm".parse::<CpuVendor>().is_err());
        assert_eq!("integrated".parse::<GpuClass>(), Ok(GpuClass::Integrated));
    }

    #[test]
    fn test_raw_record_reads_catalog_keys() {
        let json = r#"{
            "name": "Victus 15", "brand": "HP", "os": "Windows 11", "utility": "Gaming",
            "cpu_full": "AMD Ryzen 5 8645HS", "ram_gb": 16, "storage_gb": 512,
            "screen_size_in": 15.6, "spec_score": 72, "price_inr": 65990,
            "gpu_type": "NVIDIA GeForce RTX 3050", "gpu_vram_gb": 6
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.usage, "Gaming");
        assert_eq!(record.price, PriceInput::Amount(65990));
        assert_eq!(record.vram_gb, 6);
    }

    #[test]
    fn test_raw_record_accepts_text_price_and_aliases() {
        let json = r#"{
            "name": "X", "brand": "Y", "usage": "Business", "cpu": "Apple M4",
            "ram_gb": 16, "storage_gb": 512, "screen_in": 13.6, "score": 70,
            "price": "₹1.25 Lakh"
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.price, PriceInput::Text("₹1.25 Lakh".into()));
        assert_eq!(record.vram_gb, 0);
    }

    #[test]
    fn test_max_sentinel() {
        assert!(PriceInput::from("Max").is_max_sentinel());
        assert!(PriceInput::from(" max ").is_max_sentinel());
        assert!(!PriceInput::from("₹2 Lakh").is_max_sentinel());
        assert!(!PriceInput::from(200_000).is_max_sentinel());
    }

    #[test]
    fn test_screen_range_half_open() {
        let range = ScreenRange::preset("14-15").unwrap();
        assert!(range.contains(14.0));
        assert!(range.contains(14.99));
        assert!(!range.contains(15.0));
        assert!(ScreenRange::preset("16+").unwrap().contains(18.0));
        assert!(ScreenRange::preset("huge").is_none());
    }

    #[test]
    fn test_facets_observe() {
        let records = vec![
            normalized("a", "HP", 65_990, 72, 6),
            normalized("b", "Acer", 36_541, 56, 0),
            normalized("c", "HP", 84_990, 68, 8),
        ];
        let facets = Facets::observe(&records);
        assert_eq!(facets.brands.iter().collect::<Vec<_>>(), vec!["Acer", "HP"]);
        assert_eq!(facets.vram_options, vec![6, 8]);
        assert_eq!(facets.score_range, Some((56, 72)));
        assert_eq!(facets.price_range, Some((36_541, 84_990)));

        let config = FilterConfig::permissive(&facets);
        assert_eq!((config.min_price, config.max_price), (36_541, u64::MAX));
    }

    #[test]
    fn test_permissive_config_from_empty_facets() {
        let config = FilterConfig::permissive(&Facets::default());
        assert_eq!(config.max_price, u64::MAX);
        assert!(config.brands.is_empty());
        assert_eq!(config.gpu_classes.len(), 2);
    }

    #[test]
    fn test_normalized_record_serialization_flattens_derived() {
        let record = normalized("a", "HP", 65_990, 72, 6);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["cpu_vendor"], "Intel");
        assert_eq!(value["gpu_class"], "Dedicated");
        let parsed: NormalizedRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_filter_options_accept_camel_case() {
        let options: FilterOptions =
            serde_json::from_str(r#"{"minScore": 60, "maxPrice": "Max", "gpuClasses": ["Dedicated"]}"#)
                .unwrap();
        assert_eq!(options.min_score, Some(60));
        assert!(options.max_price.unwrap().is_max_sentinel());
        assert!(options.brands.is_none());
    }
}
