//! roi-runner: headless batch runner for the campaign ROI engine.
//!
//! Usage:
//!   roi-runner --input data/marketing_data.json --out roi_results
//!   roi-runner --synthetic --seed 12345 --campaigns 5 --days 30 --db runs.db
//!   roi-runner --input rows.json --data-dir ./data --conversion-value 80
//!   roi-runner --input rows.json --featured   (also writes featured_records.json)

use anyhow::{Context, Result};
use campaign_roi_core::{
    aggregate::{enrich, EnrichedRecord},
    config::EngineConfig,
    engine::{fmt_metric, RoiEngine},
    kpi::derive_features,
    normalize::{normalize_rows, parse_rows, DataQualityReport},
    record::CampaignRecord,
    result_set::{ResultSet, OVERALL_METRICS},
    store::ResultStore,
    synthetic::{self, SyntheticConfig},
    tier::PerformanceTier,
};
use std::env;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let synthetic_mode = args.iter().any(|a| a == "--synthetic");
    let featured = args.iter().any(|a| a == "--featured");
    let input = flag_value(&args, "--input");
    let data_dir = flag_value(&args, "--data-dir");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let out_dir = flag_value(&args, "--out").unwrap_or("roi_results");

    let mut config = match data_dir {
        Some(dir) => EngineConfig::load(dir)?,
        None => EngineConfig::default(),
    };
    if let Some(cv) = flag_value(&args, "--conversion-value") {
        let cv: f64 = cv
            .parse()
            .with_context(|| format!("--conversion-value is not a number: {cv}"))?;
        config = config.with_conversion_value(cv);
    }

    let engine = RoiEngine::new(config)?;
    let run_id = format!("run-{}", uuid::Uuid::new_v4());

    println!("Campaign ROI | roi-runner");
    println!("  run_id:           {run_id}");
    println!("  conversion_value: {}", engine.config().conversion_value);
    println!("  db:               {db}");
    println!("  out:              {out_dir}");
    println!();

    let (records, data_quality) = if synthetic_mode {
        let synth = SyntheticConfig {
            seed: parse_arg(&args, "--seed", 42u64),
            campaigns: parse_arg(&args, "--campaigns", 3u32),
            days: parse_arg(&args, "--days", 14u32),
            ..SyntheticConfig::default()
        };
        println!("  source:           synthetic (seed {})", synth.seed);
        (synthetic::generate(&synth), None)
    } else {
        let path = input.context("either --input <rows.json> or --synthetic is required")?;
        println!("  source:           {path}");
        load_rows(path)?
    };

    let enriched = featured.then(|| enrich(derive_features(records.clone())));

    let mut results = engine.run(run_id.clone(), records)?;
    results.data_quality = data_quality;

    let store = ResultStore::open(db)?;
    store.migrate()?;
    store.insert_run(
        &run_id,
        results.conversion_value,
        results.overall_metrics.record_count,
        env!("CARGO_PKG_VERSION"),
    )?;
    store.save_result_set(&results)?;

    export_tables(&results, Path::new(out_dir))?;
    if let Some(rows) = &enriched {
        export_featured(rows, Path::new(out_dir))?;
    }
    print_summary(&results);

    Ok(())
}

fn load_rows(path: &str) -> Result<(Vec<CampaignRecord>, Option<DataQualityReport>)> {
    let content = fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    let rows = parse_rows(&content)?;
    let batch = normalize_rows(&rows)?;
    Ok((batch.records, Some(batch.report)))
}

/// Write one JSON file per named result into `out_dir`.
fn export_tables(results: &ResultSet, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Cannot create {}", out_dir.display()))?;

    let overall_path = out_dir.join(format!("{OVERALL_METRICS}.json"));
    fs::write(
        &overall_path,
        serde_json::to_string_pretty(&results.overall_metrics)?,
    )?;

    for (name, table) in results.tables() {
        let path = out_dir.join(format!("{name}.json"));
        let rows = table.to_json_rows()?;
        fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
        log::debug!("Saved {}", path.display());
    }

    log::info!("All results saved to {}", out_dir.display());
    Ok(())
}

/// Per-record features with campaign and segment context.
fn export_featured(rows: &[EnrichedRecord], out_dir: &Path) -> Result<()> {
    let path = out_dir.join("featured_records.json");
    fs::write(&path, serde_json::to_string_pretty(rows)?)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    log::info!("Saved {} featured records to {}", rows.len(), path.display());
    Ok(())
}

fn print_summary(results: &ResultSet) {
    let m = &results.overall_metrics;

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  records:        {}", m.record_count);
    if let Some(dq) = &results.data_quality {
        println!("  rows in:        {}", dq.input_rows);
        println!("  duplicates:     {}", dq.duplicates_removed);
        println!("  clipped:        {}", dq.clipped_counters);
    }
    println!("  spend:          ${:.2}", m.total_spend);
    println!("  revenue:        ${:.2}", m.total_revenue);
    println!("  profit:         ${:.2}", m.total_profit);
    println!("  roi:            {}", fmt_metric(m.roi));
    println!("  roas:           {}", fmt_metric(m.roas));
    println!("  cpa:            {}", fmt_metric(m.cpa));
    println!("  ctr:            {:.4}%", m.ctr * 100.0);
    println!("  conv. rate:     {:.2}%", m.conversion_rate * 100.0);

    println!();
    println!("=== PERFORMANCE TIERS ===");
    let counts = results.campaign_metrics.tier_counts();
    for tier in PerformanceTier::ALL.iter().rev() {
        let n = counts.get(tier).copied().unwrap_or(0);
        if n > 0 {
            println!("  {:<18} {n}", tier.label());
        }
    }

    println!();
    println!("=== TOP CAMPAIGNS BY ROI ===");
    let top = results.campaign_metrics.top_by_roi(10);
    if top.is_empty() {
        println!("  (No campaign with spend)");
    }
    for row in top {
        println!(
            "  {:<10} | ROI: {} | ROAS: {} | CPA: {} | {}",
            row.key,
            fmt_metric(row.roi),
            fmt_metric(row.roas),
            fmt_metric(row.cpa),
            row.performance_tier.unwrap_or(PerformanceTier::Undefined)
        );
    }

    println!();
    println!("=== LOWEST CPA CAMPAIGNS ===");
    let cheapest = results.campaign_metrics.lowest_cpa(5);
    if cheapest.is_empty() {
        println!("  (No campaign with approved conversions)");
    }
    for row in cheapest {
        println!(
            "  {:<10} | CPA: {} | conversions: {:.0} | spend: ${:.2}",
            row.key,
            fmt_metric(row.cpa),
            row.approved_conversion,
            row.spent
        );
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
