//! PropLens CLI — query, aggregate, and compare commands.
//!
//! Commands:
//! - `query` — filter and sort a record file, print a table or export CSV/JSON
//! - `aggregate` — group summaries (count, volume, averages, share)
//! - `compare` — side-by-side field matrix for up to three records
//!
//! Records are loaded from a JSON file (the dashboard's fetch layer stands
//! outside the engine); all querying happens in-process via proplens-core.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};

use config::{parse_dimension, parse_sort_field, QueryConfig};
use proplens_core::{
    aggregate, filter, matrix, parse_bound, parse_choice, sort, to_csv, to_json, AggregationSpec,
    ComparisonSet, ExportEnvelope, FilterCriteria, GroupOrder, GroupSummary, RangeFilter,
    RecordId, RecordStore, SortDirection, SortSpec, ToggleOutcome, TransactionRecord,
    DEFAULT_COMPARE_CAPACITY, DEFAULT_COMPARE_FIELDS, TRANSACTIONS_EXPORT_COLUMNS,
};

#[derive(Parser)]
#[command(
    name = "proplens",
    about = "PropLens CLI — property transaction analytics engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and sort records; print a table or export CSV/JSON.
    Query {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Sort field: date, price, area, price-per-sqft, location,
        /// developer, project, id.
        #[arg(long)]
        sort: Option<String>,

        /// Sort ascending (default is descending).
        #[arg(long, default_value_t = false)]
        asc: bool,

        /// Load filters/sort from a TOML query file instead of flags.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum rows to print (export always covers the full result).
        #[arg(long, default_value_t = 25)]
        limit: usize,

        /// Export the full filtered+sorted result.
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,

        /// Output file for --export. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Group the (optionally filtered) records and print summary statistics.
    Aggregate {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Dimension: property-type, transaction-type, location, developer,
        /// price-bucket, area-bucket.
        #[arg(long, default_value = "property-type")]
        by: String,

        /// Ascending bucket thresholds for price-bucket/area-bucket,
        /// comma-separated (e.g. 500000,1000000,2000000).
        #[arg(long, value_delimiter = ',')]
        buckets: Vec<String>,

        /// Order groups alphabetically instead of by descending count.
        #[arg(long, default_value_t = false)]
        alphabetical: bool,
    },
    /// Toggle the given record ids into a comparison set and print the matrix.
    Compare {
        #[command(flatten)]
        input: InputArgs,

        /// Record ids to compare, in selection order.
        #[arg(required = true)]
        ids: Vec<String>,

        /// Selection capacity.
        #[arg(long, default_value_t = DEFAULT_COMPARE_CAPACITY)]
        capacity: usize,
    },
}

#[derive(Args)]
struct InputArgs {
    /// JSON file containing an array of transaction records.
    #[arg(long, short = 'i')]
    input: PathBuf,
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Case-insensitive search across location, developer, project, and id.
    #[arg(long, default_value = "")]
    search: String,

    /// Property type filter ("all" = no filter).
    #[arg(long, default_value = "all")]
    property_type: String,

    /// Transaction type filter ("all" = no filter).
    #[arg(long, default_value = "all")]
    transaction_type: String,

    /// Exact location filter ("all" = no filter).
    #[arg(long, default_value = "all")]
    location: String,

    /// Minimum price in AED.
    #[arg(long, default_value = "")]
    min_price: String,

    /// Maximum price in AED.
    #[arg(long, default_value = "")]
    max_price: String,

    /// Minimum area in sqft.
    #[arg(long, default_value = "")]
    min_area: String,

    /// Maximum area in sqft.
    #[arg(long, default_value = "")]
    max_area: String,
}

impl FilterArgs {
    fn is_unset(&self) -> bool {
        self.to_criteria().is_unset()
    }

    /// Build engine criteria. Malformed input degrades to unset predicates;
    /// this never fails.
    fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search_text: self.search.clone(),
            property_type: parse_choice(&self.property_type),
            transaction_type: parse_choice(&self.transaction_type),
            location: {
                let trimmed = self.location.trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(proplens_core::ALL_SENTINEL)
                {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            },
            price_aed: RangeFilter::new(parse_bound(&self.min_price), parse_bound(&self.max_price)),
            area_sq_ft: RangeFilter::new(parse_bound(&self.min_area), parse_bound(&self.max_area)),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            input,
            filters,
            sort,
            asc,
            config,
            limit,
            export,
            output,
        } => run_query(&input, &filters, sort.as_deref(), asc, config, limit, export, output),
        Commands::Aggregate {
            input,
            filters,
            by,
            buckets,
            alphabetical,
        } => run_aggregate(&input, &filters, &by, &buckets, alphabetical),
        Commands::Compare {
            input,
            ids,
            capacity,
        } => run_compare(&input, &ids, capacity),
    }
}

// ── Commands ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn run_query(
    input: &InputArgs,
    filters: &FilterArgs,
    sort_field: Option<&str>,
    asc: bool,
    config_path: Option<PathBuf>,
    limit: usize,
    export: Option<ExportFormat>,
    output: Option<PathBuf>,
) -> Result<()> {
    // A saved query and ad-hoc flags would silently shadow each other.
    if config_path.is_some() && (!filters.is_unset() || sort_field.is_some() || asc) {
        bail!("--config and ad-hoc filter/sort flags are mutually exclusive");
    }

    let store = load_store(&input.input)?;

    let (criteria, sort_spec) = match config_path {
        Some(path) => {
            let config = QueryConfig::from_file(&path)?;
            (config.criteria(), config.sort_spec()?)
        }
        None => {
            let spec = match sort_field {
                None => SortSpec::default(),
                Some(name) => {
                    let field = parse_sort_field(name)
                        .with_context(|| format!("unknown sort field '{name}'"))?;
                    let direction = if asc {
                        SortDirection::Asc
                    } else {
                        SortDirection::Desc
                    };
                    SortSpec::new(field, direction)
                }
            };
            (filters.to_criteria(), spec)
        }
    };

    let rows = sort(&filter(store.records(), &criteria), &sort_spec);
    println!("{} of {} records match", rows.len(), store.len());

    match export {
        Some(ExportFormat::Csv) => {
            let payload = to_csv(&rows, TRANSACTIONS_EXPORT_COLUMNS)?;
            write_payload(&payload, output.as_deref())?;
        }
        Some(ExportFormat::Json) => {
            let envelope = ExportEnvelope::new(
                rows,
                criteria,
                sort_spec,
                store.dataset_hash(),
                Utc::now(),
            );
            let payload = to_json(&envelope)?;
            write_payload(&payload, output.as_deref())?;
        }
        None => print_records(&rows, limit),
    }

    Ok(())
}

fn run_aggregate(
    input: &InputArgs,
    filters: &FilterArgs,
    by: &str,
    buckets: &[String],
    alphabetical: bool,
) -> Result<()> {
    let store = load_store(&input.input)?;

    let thresholds: Vec<f64> = buckets.iter().filter_map(|b| parse_bound(b)).collect();
    let group_by = parse_dimension(by, &thresholds)
        .with_context(|| format!("unknown aggregation dimension '{by}'"))?;
    let spec = AggregationSpec {
        group_by,
        order: if alphabetical {
            GroupOrder::KeyAsc
        } else {
            GroupOrder::CountDesc
        },
    };

    let scoped = filter(store.records(), &filters.to_criteria());
    let groups = aggregate(&scoped, &spec);

    if groups.is_empty() {
        println!("No records in scope.");
        return Ok(());
    }
    print_groups(&groups, scoped.len());
    Ok(())
}

fn run_compare(input: &InputArgs, ids: &[String], capacity: usize) -> Result<()> {
    let store = load_store(&input.input)?;

    let mut set = ComparisonSet::with_capacity(capacity);
    for raw in ids {
        let id = RecordId::new(raw.as_str());
        let (next, outcome) = set.toggle(&id);
        match outcome {
            ToggleOutcome::RejectedFull => {
                eprintln!("selection full ({capacity}): '{raw}' not added");
            }
            ToggleOutcome::Removed => {
                eprintln!("'{raw}' toggled off (listed twice)");
            }
            ToggleOutcome::Added => {}
        }
        set = next;
    }

    let set = set.prune(&store);
    if set.is_empty() {
        bail!("none of the given ids exist in the record file");
    }

    let rows = matrix(&set, &store, DEFAULT_COMPARE_FIELDS);
    print_matrix(&rows);
    Ok(())
}

// ── Loading & output ─────────────────────────────────────────────────

fn load_store(path: &Path) -> Result<RecordStore> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw: Vec<TransactionRecord> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid record array", path.display()))?;
    let raw_count = raw.len();
    let store = RecordStore::new(raw);
    let dropped = raw_count - store.len();
    if dropped > 0 {
        eprintln!("dropped {dropped} malformed/duplicate records");
    }
    Ok(store)
}

fn write_payload(payload: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, payload)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported to: {}", path.display());
        }
        None => print!("{payload}"),
    }
    Ok(())
}

fn print_records(rows: &[TransactionRecord], limit: usize) {
    if rows.is_empty() {
        return;
    }
    println!(
        "{:<12} {:<12} {:<12} {:<22} {:>12} {:>12} {:>10}",
        "ID", "Date", "Type", "Location", "Area sqft", "Price AED", "AED/sqft"
    );
    for record in rows.iter().take(limit) {
        println!(
            "{:<12} {:<12} {:<12} {:<22} {:>12} {:>12} {:>10}",
            record.id.to_string(),
            record
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
            record.property_type.to_string(),
            truncate(&record.location, 22),
            record
                .area_sq_ft
                .map(|a| format!("{a:.0}"))
                .unwrap_or_else(|| "-".into()),
            format!("{:.0}", record.price_aed),
            record
                .price_per_sq_ft()
                .map(|p| format!("{p:.0}"))
                .unwrap_or_else(|| "-".into()),
        );
    }
    if rows.len() > limit {
        println!("... and {} more", rows.len() - limit);
    }
}

fn print_groups(groups: &[GroupSummary], total: usize) {
    println!(
        "{:<24} {:>8} {:>16} {:>14} {:>12} {:>8}",
        "Group", "Count", "Volume AED", "Avg AED", "Avg sqft", "Share"
    );
    for g in groups {
        println!(
            "{:<24} {:>8} {:>16} {:>14} {:>12} {:>7.1}%",
            truncate(&g.key, 24),
            g.count,
            format!("{:.0}", g.sum_price),
            format!("{:.0}", g.avg_price),
            g.avg_area
                .map(|a| format!("{a:.0}"))
                .unwrap_or_else(|| "-".into()),
            g.percentage_display(),
        );
    }
    println!("{total} records in scope");
}

fn print_matrix(rows: &[proplens_core::ComparisonRow]) {
    let Some(first) = rows.first() else {
        return;
    };
    print!("{:<18}", "Field");
    for (id, _) in &first.values {
        print!(" {:>20}", id.as_str());
    }
    println!();
    for row in rows {
        print!("{:<18}", row.field.label());
        for (_, value) in &row.values {
            let cell = value.to_string();
            print!(" {:>20}", if cell.is_empty() { "-".into() } else { cell });
        }
        println!();
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
