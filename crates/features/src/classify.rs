//! Ordered-rule classification of free-text specification strings.
//!
//! Each rule set is a list of `(markers, label)` pairs evaluated in order;
//! the first rule with any marker present in the text wins. Matching is
//! case-sensitive.

use laptopscope_model::{CpuVendor, DerivedFields, GpuClass, NormalizedRecord, RawRecord};

use crate::price::{normalize_price, PriceError};

/// Tier label for vendors without a tier table.
pub const TIER_NOT_APPLICABLE: &str = "N/A";
/// Tier label when the vendor is known but no tier marker matched.
pub const TIER_OTHER: &str = "Other";

/// A classification rule: the label applies if any marker occurs in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule<L> {
    pub markers: &'static [&'static str],
    pub label: L,
}

impl<L> Rule<L> {
    pub const fn new(markers: &'static [&'static str], label: L) -> Self {
        Self { markers, label }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.markers.iter().any(|marker| text.contains(marker))
    }
}

/// Return the label of the first matching rule.
pub fn first_match<'r, L>(rules: &'r [Rule<L>], text: &str) -> Option<&'r L> {
    rules.iter().find(|rule| rule.matches(text)).map(|rule| &rule.label)
}

pub const VENDOR_RULES: [Rule<CpuVendor>; 3] = [
    Rule::new(&["Apple"], CpuVendor::Apple),
    Rule::new(&["AMD"], CpuVendor::Amd),
    Rule::new(&["Intel", "Core"], CpuVendor::Intel),
];

pub const INTEL_TIER_RULES: [Rule<&str>; 7] = [
    Rule::new(&["i9"], "i9"),
    Rule::new(&["i7"], "i7"),
    Rule::new(&["i5"], "i5"),
    Rule::new(&["i3"], "i3"),
    Rule::new(&["Ultra 9"], "Ultra 9"),
    Rule::new(&["Ultra 7"], "Ultra 7"),
    Rule::new(&["Ultra 5"], "Ultra 5"),
];

pub const AMD_TIER_RULES: [Rule<&str>; 4] = [
    Rule::new(&["Ryzen 9"], "Ryzen 9"),
    Rule::new(&["Ryzen 7"], "Ryzen 7"),
    Rule::new(&["Ryzen 5"], "Ryzen 5"),
    Rule::new(&["Ryzen 3"], "Ryzen 3"),
];

/// Classify the CPU vendor from its description.
pub fn classify_vendor(cpu: &str) -> CpuVendor {
    first_match(&VENDOR_RULES, cpu)
        .copied()
        .unwrap_or(CpuVendor::Other)
}

/// Classify the CPU tier using the detected vendor's tier table.
pub fn classify_tier(vendor: CpuVendor, cpu: &str) -> &'static str {
    let rules: &[Rule<&'static str>] = match vendor {
        CpuVendor::Intel => &INTEL_TIER_RULES,
        CpuVendor::Amd => &AMD_TIER_RULES,
        CpuVendor::Apple | CpuVendor::Other => return TIER_NOT_APPLICABLE,
    };

    first_match(rules, cpu).copied().unwrap_or(TIER_OTHER)
}

pub fn classify_gpu(vram_gb: u32) -> GpuClass {
    if vram_gb > 0 {
        GpuClass::Dedicated
    } else {
        GpuClass::Integrated
    }
}

/// Compute the derived classification fields for a raw record.
pub fn derive_fields(raw: &RawRecord) -> DerivedFields {
    let cpu_vendor = classify_vendor(&raw.cpu);

    DerivedFields {
        cpu_vendor,
        cpu_tier: classify_tier(cpu_vendor, &raw.cpu).to_string(),
        gpu_class: classify_gpu(raw.vram_gb),
    }
}

/// Normalize the price and derive classification fields.
pub fn normalize_record(raw: &RawRecord) -> Result<NormalizedRecord, PriceError> {
    let price = normalize_price(&raw.price)?;
    Ok(NormalizedRecord::from_parts(raw, price, derive_fields(raw)))
}
