//! Rate-impact simulator entry point: CLI wiring and report printing.

use std::io;
use std::process;

use clap::Parser;
use tracing::info;

use rate_impact_sim::cli::Cli;
use rate_impact_sim::config::StudyConfig;
use rate_impact_sim::constants::MODEL_VERSION;
use rate_impact_sim::io::export::export_csv;
use rate_impact_sim::model::capacity::dc_peak_contribution_mw;
use rate_impact_sim::model::{AllTrajectories, RateImpactEngine, SummaryStats};
use rate_impact_sim::profiles;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn print_trajectory_table(trajectories: &AllTrajectories) {
    println!(
        "{:>6} {:>10} {:>10} {:>10} {:>12}",
        "Year", "Baseline", "Firm", "Flexible", "Dispatchable"
    );
    let rows = trajectories
        .baseline
        .iter()
        .zip(&trajectories.firm)
        .zip(&trajectories.flexible)
        .zip(&trajectories.dispatchable);
    for (((b, f), x), d) in rows {
        println!(
            "{:>6} {:>10.2} {:>10.2} {:>10.2} {:>12.2}",
            b.year, b.monthly_bill, f.monthly_bill, x.monthly_bill, d.monthly_bill
        );
    }
}

/// Prints the capacity-price and revenue-adequacy diagnostics.
///
/// Diagnostics are informational; a failure is logged rather than fatal.
fn print_diagnostics(engine: &RateImpactEngine, study: &StudyConfig) {
    let dc = &study.data_center;
    let firm_peak = dc_peak_contribution_mw(dc.capacity_mw, dc.firm_peak_coincidence, 0.0);

    match engine.compute_capacity_price(&study.utility, firm_peak) {
        Ok(cp) => {
            println!("--- Capacity Price (firm peak {firm_peak:.0} MW) ---");
            println!(
                "Reserve margin:        {:.1}% -> {:.1}%",
                cp.old_reserve_margin * 100.0,
                cp.new_reserve_margin * 100.0
            );
            println!(
                "Scarcity / critical:   {} / {}",
                cp.is_scarcity, cp.is_critical
            );
            println!(
                "Capacity price:        ${:.2} -> ${:.2}/MW-day",
                cp.old_price, cp.new_price
            );
        }
        Err(e) => tracing::warn!(error = %e, "capacity price diagnostic unavailable"),
    }

    let modes = [
        ("firm", dc.firm_load_factor, dc.firm_peak_coincidence, 0.0),
        (
            "flexible",
            dc.flex_load_factor,
            dc.flex_peak_coincidence,
            dc.onsite_generation_mw,
        ),
    ];
    println!("--- Revenue Adequacy ---");
    for (label, load_factor, peak_coincidence, onsite) in modes {
        match engine.compute_revenue_adequacy(
            dc.capacity_mw,
            load_factor,
            peak_coincidence,
            &study.tariff,
            &study.utility,
            onsite,
        ) {
            Ok(ra) => println!(
                "{:<9} ratio {:.2}, {:+.0} $/MW-yr, surplus: {}",
                format!("{label}:"),
                ra.revenue_adequacy_ratio,
                ra.surplus_or_deficit_per_mw,
                ra.contributes_surplus
            ),
            Err(e) => tracing::warn!(error = %e, mode = label, "revenue adequacy unavailable"),
        }
    }
}

fn print_utility_catalog() {
    for (region, entries) in profiles::by_region() {
        println!("{region}");
        for p in entries {
            println!(
                "  {:<22} {:<32} {:>9} {:>7.0} MW",
                p.id,
                p.display_name(),
                format!("{:?}", p.market.kind).to_lowercase(),
                p.system_peak_mw
            );
        }
    }
}

fn print_json(trajectories: &AllTrajectories, summary: &SummaryStats) {
    let doc = serde_json::json!({
        "model_version": MODEL_VERSION,
        "trajectories": trajectories,
        "summary": summary,
    });
    match serde_json::to_string_pretty(&doc) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if cli.list_utilities {
        print_utility_catalog();
        return;
    }

    let study = match cli.load_study() {
        Ok(study) => study,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let errors = study.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let engine = study.engine();
    let years = study.projection.years;
    info!(
        years,
        capacity_mw = study.data_center.capacity_mw,
        market = ?study.utility.market_type,
        "computing trajectories"
    );

    let result = engine
        .compute_all_trajectories(&study.utility, &study.data_center, years)
        .and_then(|t| {
            let summary = engine.compute_summary(&t, &study.utility)?;
            Ok((t, summary))
        });
    let (trajectories, summary) = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if cli.json {
        print_json(&trajectories, &summary);
    } else {
        print_trajectory_table(&trajectories);
        println!("\n{summary}\n");
        print_diagnostics(&engine, &study);
    }

    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&trajectories, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "trajectories written");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(rate_impact_sim::api::AppState::from_study(study));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(rate_impact_sim::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}
