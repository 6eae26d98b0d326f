//! Feature extraction for catalog records.
//!
//! Provides pure functions applied once at catalog load:
//! - Price normalization (rupees, lakh and crore text)
//! - CPU vendor and tier classification via ordered marker rules
//! - GPU class derivation

pub mod classify;
pub mod price;

pub use classify::{
    classify_gpu, classify_tier, classify_vendor, derive_fields, first_match, normalize_record, Rule,
    TIER_NOT_APPLICABLE, TIER_OTHER,
};
pub use price::{normalize_price, parse_price_text, PriceError, CRORE, LAKH};
