//! Result summaries and CSV export.
//!
//! Converts ranked results into summary statistics, a one-line readable
//! summary, and CSV with the record name as the first column.

use laptopscope_model::{NormalizedRecord, RankedRecord};
use laptopscope_rerank::best_value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error during export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export produced invalid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),
}

/// The best value-for-money record in a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestValue {
    pub name: String,
    pub price: u64,
    pub score: u32,
    pub value_score: f64,
}

/// Summary statistics for one query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    /// (min, max) price; `None` for an empty result
    pub price_range: Option<(u64, u64)>,
    pub mean_price: Option<f64>,
    /// (min, max) score; `None` for an empty result
    pub score_range: Option<(u32, u32)>,
    pub best_value: Option<BestValue>,
}

impl Summary {
    pub fn from_ranked(ranked: &[RankedRecord]) -> Self {
        if ranked.is_empty() {
            return Self::default();
        }

        let prices = ranked.iter().map(|r| r.record.price);
        let scores = ranked.iter().map(|r| r.record.score);
        let total: u128 = prices.clone().map(u128::from).sum();

        Self {
            count: ranked.len(),
            price_range: prices.clone().min().zip(prices.max()),
            mean_price: Some(total as f64 / ranked.len() as f64),
            score_range: scores.clone().min().zip(scores.max()),
            best_value: best_value(ranked).map(|best| BestValue {
                name: best.record.name.clone(),
                price: best.record.price,
                score: best.record.score,
                value_score: best.value_score,
            }),
        }
    }
}

/// Generate a one-line readable summary.
pub fn summarize(summary: &Summary) -> String {
    if summary.count == 0 {
        return "No laptops match the current selection. Try broadening your filters.".to_string();
    }

    let phrase = if summary.count == 1 { "laptop matches" } else { "laptops match" };
    let mut parts = vec![format!("{} {}", summary.count, phrase)];

    if let (Some((lo, hi)), Some(mean)) = (summary.price_range, summary.mean_price) {
        parts.push(format!("price {}..{} (mean {:.0})", lo, hi, mean));
    }
    if let Some((lo, hi)) = summary.score_range {
        parts.push(format!("score {}..{}", lo, hi));
    }
    if let Some(best) = &summary.best_value {
        parts.push(format!("best value: {} ({:.1} per point)", best.name, best.value_score));
    }

    parts.join(" | ")
}

/// A row that can be written to CSV.
pub trait CsvRow {
    fn record(&self) -> &NormalizedRecord;

    /// Value score, if the row has been ranked.
    fn value_score(&self) -> Option<f64> {
        None
    }
}

impl CsvRow for NormalizedRecord {
    fn record(&self) -> &NormalizedRecord {
        self
    }
}

impl CsvRow for RankedRecord {
    fn record(&self) -> &NormalizedRecord {
        &self.record
    }

    fn value_score(&self) -> Option<f64> {
        Some(self.value_score)
    }
}

/// An exportable field. The record name is always written first and is not
/// a selectable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Brand,
    Os,
    Usage,
    Price,
    Score,
    Cpu,
    CpuVendor,
    CpuTier,
    RamGb,
    StorageGb,
    Gpu,
    GpuClass,
    VramGb,
    ScreenIn,
    ValueScore,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Self::Brand,
        Self::Os,
        Self::Usage,
        Self::Price,
        Self::Score,
        Self::Cpu,
        Self::CpuVendor,
        Self::CpuTier,
        Self::RamGb,
        Self::StorageGb,
        Self::Gpu,
        Self::GpuClass,
        Self::VramGb,
        Self::ScreenIn,
        Self::ValueScore,
    ];

    /// Results table layout.
    pub const DEFAULT: [Column; 11] = [
        Self::Brand,
        Self::Usage,
        Self::Price,
        Self::Score,
        Self::Cpu,
        Self::RamGb,
        Self::StorageGb,
        Self::Gpu,
        Self::VramGb,
        Self::ScreenIn,
        Self::ValueScore,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Os => "os",
            Self::Usage => "usage",
            Self::Price => "price",
            Self::Score => "score",
            Self::Cpu => "cpu",
            Self::CpuVendor => "cpu_vendor",
            Self::CpuTier => "cpu_tier",
            Self::RamGb => "ram_gb",
            Self::StorageGb => "storage_gb",
            Self::Gpu => "gpu",
            Self::GpuClass => "gpu_class",
            Self::VramGb => "vram_gb",
            Self::ScreenIn => "screen_in",
            Self::ValueScore => "value_score",
        }
    }

    /// Plain decimal text for numbers; blank value score for unranked rows.
    pub fn value(&self, row: &impl CsvRow) -> String {
        let record = row.record();
        match self {
            Self::Brand => record.brand.clone(),
            Self::Os => record.os.clone(),
            Self::Usage => record.usage.clone(),
            Self::Price => record.price.to_string(),
            Self::Score => record.score.to_string(),
            Self::Cpu => record.cpu.clone(),
            Self::CpuVendor => record.cpu_vendor().to_string(),
            Self::CpuTier => record.derived.cpu_tier.clone(),
            Self::RamGb => record.ram_gb.to_string(),
            Self::StorageGb => record.storage_gb.to_string(),
            Self::Gpu => record.gpu.clone(),
            Self::GpuClass => record.gpu_class().to_string(),
            Self::VramGb => record.vram_gb.to_string(),
            Self::ScreenIn => record.screen_in.to_string(),
            Self::ValueScore => row.value_score().map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.header().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ExportError::UnknownColumn(s.to_string()))
    }
}

/// Parse a comma-separated column list such as `"brand,price,score"`.
pub fn parse_columns(list: &str) -> Result<Vec<Column>, ExportError> {
    list.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Write rows as CSV: a header row, then one row per record, with `name`
/// first and the remaining columns in the order given.
pub fn export_csv<R: CsvRow, W: Write>(rows: &[R], columns: &[Column], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(std::iter::once("name").chain(columns.iter().map(Column::header)))?;
    for row in rows {
        let fields = std::iter::once(row.record().name.clone()).chain(columns.iter().map(|column| column.value(row)));
        csv.write_record(fields)?;
    }

    csv.flush()?;
    Ok(())
}

/// Export to an in-memory string.
pub fn export_csv_string<R: CsvRow>(rows: &[R], columns: &[Column]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    export_csv(rows, columns, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laptopscope_model::{CpuVendor, DerivedFields, GpuClass, RawRecord};
    use laptopscope_rerank::rank;
    use pretty_assertions::assert_eq;

    fn make_record(name: &str, price: u64, score: u32, vram: u32) -> NormalizedRecord {
        let raw = RawRecord::new(name, "HP", price, score)
            .with_usage("Gaming")
            .with_gpu("RTX", vram);
        let derived = DerivedFields {
            cpu_vendor: CpuVendor::Amd,
            cpu_tier: "Ryzen 5".to_string(),
            gpu_class: if vram > 0 { GpuClass::Dedicated } else { GpuClass::Integrated },
        };
        NormalizedRecord::from_parts(&raw, price, derived)
    }

    #[test]
    fn test_summary_statistics() {
        let ranked = rank(&[
            make_record("a", 60_000, 50, 0),
            make_record("b", 90_000, 90, 6),
            make_record("c", 120_000, 80, 8),
        ])
        .unwrap();
        let summary = Summary::from_ranked(&ranked);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.price_range, Some((60_000, 120_000)));
        assert_eq!(summary.mean_price, Some(90_000.0));
        assert_eq!(summary.score_range, Some((50, 90)));
        assert_eq!(summary.best_value.as_ref().unwrap().name, "b");
    }

    #[test]
    fn test_empty_summary_is_not_an_error() {
        let summary = Summary::from_ranked(&[]);
        assert_eq!(summary, Summary::default());
        assert!(summarize(&summary).starts_with("No laptops match"));
    }

    #[test]
    fn test_summarize_text() {
        let ranked = rank(&[make_record("Victus 15", 65_990, 72, 6)]).unwrap();
        let text = summarize(&Summary::from_ranked(&ranked));
        assert!(text.starts_with("1 laptop matches"));
        assert!(text.contains("best value: Victus 15"));
    }

    #[test]
    fn test_csv_name_first_in_caller_order() {
        let ranked = rank(&[make_record("Victus 15", 65_990, 72, 6)]).unwrap();
        let csv = export_csv_string(&ranked, &[Column::Score, Column::Price, Column::ValueScore]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,score,price,value_score");
        assert_eq!(lines[1], format!("Victus 15,72,65990,{}", 65_990.0 / 72.0));
    }

    #[test]
    fn test_csv_unranked_rows_leave_value_blank() {
        let rows = vec![make_record("IdeaPad, Slim 3", 65_990, 55, 0)];
        let csv = export_csv_string(&rows, &[Column::GpuClass, Column::ValueScore]).unwrap();
        assert_eq!(csv, "name,gpu_class,value_score\n\"IdeaPad, Slim 3\",Integrated,\n");
    }

    #[test]
    fn test_csv_empty_rows_still_have_header() {
        let rows: Vec<RankedRecord> = Vec::new();
        let csv = export_csv_string(&rows, &Column::DEFAULT).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("name,brand,usage,price,score"));
    }

    #[test]
    fn test_parse_columns() {
        assert_eq!(
            parse_columns("brand, price,VALUE_SCORE").unwrap(),
            vec![Column::Brand, Column::Price, Column::ValueScore]
        );
        assert!(matches!(parse_columns("brand,colour"), Err(ExportError::UnknownColumn(_))));
    }
}
