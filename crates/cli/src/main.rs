//! Command-line front end for querying a laptop catalog.
//!
//! Usage:
//!     laptopscope search --min-score 60 --gpu dedicated --max-price "₹1.5 Lakh"
//!     laptopscope search --options gaming.json --options budget.json
//!     laptopscope facets
//!     laptopscope export --out filtered.csv --columns brand,price,score

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use laptopscope_catalog::{Catalog, JsonFileSource, LoadPolicy};
use laptopscope_model::{
    CpuVendor, Facets, FilterOptions, GpuClass, PriceInput, RankedRecord, ScreenRange,
};
use laptopscope_query::{filter_many, filter_with_stats, resolve, ValidatedConfig};
use laptopscope_report::{export_csv, parse_columns, summarize, Column, Summary};
use laptopscope_rerank::rank;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "laptopscope")]
#[command(about = "Filter, rank and export a laptop catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog file (JSON array of records)
    #[arg(long, global = true, default_value = "data/laptops.json")]
    catalog: PathBuf,

    /// Fail the load if any record has a malformed price
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and rank the catalog
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Maximum results to print per query
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the values observed in the catalog
    Facets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write ranked matches to a CSV file
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,

        /// Columns after the name (comma-separated)
        #[arg(long)]
        columns: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Filter flags. Flags override the same keys in `--options` files.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Query options file (JSON); repeat to run several queries in parallel
    #[arg(long = "options")]
    options: Vec<PathBuf>,

    /// Lower price bound, e.g. "₹40,000" or "₹1 Lakh"
    #[arg(long)]
    min_price: Option<String>,

    /// Upper price bound, or "Max" for none
    #[arg(long)]
    max_price: Option<String>,

    /// Brands to include (comma-separated)
    #[arg(long, value_delimiter = ',')]
    brands: Vec<String>,

    /// Usage categories to include (comma-separated)
    #[arg(long, value_delimiter = ',')]
    usages: Vec<String>,

    #[arg(long)]
    min_ram: Option<u32>,

    #[arg(long)]
    min_storage: Option<u32>,

    /// CPU vendors to include: apple, amd, intel, other
    #[arg(long, value_delimiter = ',')]
    cpu_vendors: Vec<CpuVendor>,

    /// Screen bucket: 14-15, 15-16, 16+ or all
    #[arg(long)]
    screen: Option<String>,

    #[arg(long)]
    screen_min: Option<f64>,

    #[arg(long)]
    screen_max: Option<f64>,

    #[arg(long)]
    min_score: Option<u32>,

    /// GPU classes: dedicated, integrated
    #[arg(long, value_delimiter = ',')]
    gpu: Vec<GpuClass>,

    /// Minimum dedicated video memory (GB)
    #[arg(long)]
    min_vram: Option<u32>,
}

impl FilterArgs {
    /// Apply the flags on top of a base set of options.
    fn overlay(&self, mut options: FilterOptions) -> Result<FilterOptions> {
        if let Some(price) = &self.min_price {
            options.min_price = Some(PriceInput::from(price.as_str()));
        }
        if let Some(price) = &self.max_price {
            options.max_price = Some(PriceInput::from(price.as_str()));
        }
        if !self.brands.is_empty() {
            options.brands = Some(trimmed_set(&self.brands));
        }
        if !self.usages.is_empty() {
            options.usages = Some(trimmed_set(&self.usages));
        }
        if !self.cpu_vendors.is_empty() {
            options.cpu_vendors = Some(self.cpu_vendors.iter().copied().collect());
        }
        if !self.gpu.is_empty() {
            options.gpu_classes = Some(self.gpu.iter().copied().collect());
        }

        if let Some(name) = &self.screen {
            let Some(range) = ScreenRange::preset(name) else {
                bail!("Unknown screen bucket '{}' (expected 14-15, 15-16, 16+ or all)", name);
            };
            options.screen_min = Some(range.min);
            options.screen_max = Some(range.max);
        }
        options.screen_min = self.screen_min.or(options.screen_min);
        options.screen_max = self.screen_max.or(options.screen_max);

        options.min_ram = self.min_ram.or(options.min_ram);
        options.min_storage = self.min_storage.or(options.min_storage);
        options.min_score = self.min_score.or(options.min_score);
        options.min_vram = self.min_vram.or(options.min_vram);

        Ok(options)
    }

    /// Build one validated config per query.
    fn resolve_queries(&self, facets: &Facets) -> Result<Vec<ValidatedConfig>> {
        let bases = if self.options.is_empty() {
            vec![FilterOptions::default()]
        } else {
            self.options
                .iter()
                .map(|path| read_options(path))
                .collect::<Result<Vec<_>>>()?
        };

        bases
            .into_iter()
            .map(|base| -> Result<ValidatedConfig> {
                let options = self.overlay(base)?;
                Ok(resolve(&options, facets)?)
            })
            .collect()
    }
}

fn trimmed_set(values: &[String]) -> BTreeSet<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}

fn read_options(path: &Path) -> Result<FilterOptions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse options file '{}'", path.display()))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,laptopscope_cli=info")),
        )
        .init();

    let cli = Cli::parse();

    let policy = if cli.strict {
        LoadPolicy::Strict
    } else {
        LoadPolicy::SkipInvalid
    };
    let catalog = load_catalog(&cli.catalog, policy)?;

    match cli.command {
        Commands::Search {
            filters,
            limit,
            format,
        } => {
            let configs = filters.resolve_queries(catalog.facets())?;
            run_search(&catalog, &configs, limit, format)?;
        }
        Commands::Facets { json } => {
            run_facets(catalog.facets(), json)?;
        }
        Commands::Export {
            filters,
            out,
            columns,
        } => {
            let configs = filters.resolve_queries(catalog.facets())?;
            run_export(&catalog, &configs, &out, columns.as_deref())?;
        }
    }

    Ok(())
}

fn load_catalog(path: &Path, policy: LoadPolicy) -> Result<Catalog> {
    let load = Catalog::load(&JsonFileSource::new(path), policy)
        .with_context(|| format!("Failed to load catalog '{}'", path.display()))?;

    if !load.rejected.is_empty() {
        tracing::warn!(
            rejected = load.rejected.len(),
            "Some catalog records were skipped; use --strict to fail instead"
        );
    }
    tracing::info!(records = load.catalog.len(), "Catalog loaded");

    Ok(load.catalog)
}

/// One query's ranked output.
#[derive(Serialize)]
struct QueryResult {
    config: ValidatedConfig,
    summary: Summary,
    results: Vec<RankedRecord>,
}

fn execute(catalog: &Catalog, configs: &[ValidatedConfig]) -> Result<Vec<QueryResult>> {
    let matches = if let [config] = configs {
        let (matched, stats) = filter_with_stats(catalog.records(), config);
        tracing::info!(matched = stats.matched, examined = stats.examined, "Query complete");
        vec![matched]
    } else {
        filter_many(catalog.records(), configs)
    };

    configs
        .iter()
        .zip(matches)
        .map(|(config, matched)| -> Result<QueryResult> {
            let results = rank(&matched)?;
            Ok(QueryResult {
                config: config.clone(),
                summary: Summary::from_ranked(&results),
                results,
            })
        })
        .collect()
}

/// CSV rows carry no query marker, so CSV output takes exactly one query.
fn ensure_single_query(configs: &[ValidatedConfig]) -> Result<()> {
    if configs.len() > 1 {
        bail!(
            "CSV output supports a single query, got {}; run each --options file separately",
            configs.len()
        );
    }
    Ok(())
}

fn run_search(catalog: &Catalog, configs: &[ValidatedConfig], limit: usize, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Csv {
        ensure_single_query(configs)?;
    }

    let mut outputs = execute(catalog, configs)?;
    for output in &mut outputs {
        output.results.truncate(limit);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outputs)?);
        }
        OutputFormat::Csv => {
            let rows: Vec<RankedRecord> = outputs.into_iter().flat_map(|o| o.results).collect();
            export_csv(&rows, &Column::DEFAULT, std::io::stdout().lock())?;
        }
        OutputFormat::Text => {
            for (index, output) in outputs.iter().enumerate() {
                if outputs.len() > 1 {
                    println!("=== Query {} ===", index + 1);
                }
                print_results(output);
            }
        }
    }

    Ok(())
}

fn print_results(output: &QueryResult) {
    println!("{}", summarize(&output.summary));
    println!("---");

    for (i, hit) in output.results.iter().enumerate() {
        let record = &hit.record;
        println!("\n{}. {} ({})", i + 1, record.name, record.brand);
        println!(
            "   Price: {} | Score: {} | Value: {:.1} per point",
            record.price, record.score, hit.value_score
        );
        println!(
            "   CPU: {} [{} {}] | RAM: {} GB | Storage: {} GB",
            record.cpu,
            record.cpu_vendor(),
            record.derived.cpu_tier,
            record.ram_gb,
            record.storage_gb
        );
        println!(
            "   GPU: {} ({}, {} GB) | Screen: {:.1} in | {}",
            record.gpu,
            record.gpu_class(),
            record.vram_gb,
            record.screen_in,
            record.usage
        );
    }

    if output.results.len() < output.summary.count {
        println!("\n(showing {} of {})", output.results.len(), output.summary.count);
    }
    println!();
}

fn run_facets(facets: &Facets, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(facets)?);
        return Ok(());
    }

    let join = |items: Vec<String>| items.join(", ");

    println!("Brands:      {}", join(facets.brands.iter().cloned().collect()));
    println!("Usages:      {}", join(facets.usages.iter().cloned().collect()));
    println!("CPU vendors: {}", join(facets.cpu_vendors.iter().map(|v| v.to_string()).collect()));
    println!("RAM (GB):    {}", join(facets.ram_options.iter().map(|v| v.to_string()).collect()));
    println!("Storage (GB): {}", join(facets.storage_options.iter().map(|v| v.to_string()).collect()));
    println!("VRAM (GB):   {}", join(facets.vram_options.iter().map(|v| v.to_string()).collect()));
    if let Some((lo, hi)) = facets.score_range {
        println!("Score:       {}..{}", lo, hi);
    }
    if let Some((lo, hi)) = facets.price_range {
        println!("Price:       {}..{}", lo, hi);
    }
    println!(
        "Screens:     {}",
        join(ScreenRange::PRESETS.iter().map(|(name, _)| name.to_string()).collect())
    );

    Ok(())
}

fn run_export(catalog: &Catalog, configs: &[ValidatedConfig], out: &Path, columns: Option<&str>) -> Result<()> {
    ensure_single_query(configs)?;

    let columns = match columns {
        Some(list) => parse_columns(list)?,
        None => Column::DEFAULT.to_vec(),
    };

    let rows: Vec<RankedRecord> = execute(catalog, configs)?
        .into_iter()
        .flat_map(|output| output.results)
        .collect();

    let file = File::create(out).with_context(|| format!("Failed to create '{}'", out.display()))?;
    export_csv(&rows, &columns, BufWriter::new(file))?;

    println!("Wrote {} rows to {}", rows.len(), out.display());
    Ok(())
}
