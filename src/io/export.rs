//! CSV export for scenario trajectories.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::model::AllTrajectories;

/// Column header for trajectory CSV export.
const HEADER: &str = "scenario,year,year_index,monthly_bill,annual_bill,dc_online,\
                      dc_impact,residential_allocation,effective_peak_mw";

/// Exports all four trajectories to a CSV file at the given path.
///
/// Writes a header row followed by one row per (scenario, year), scenarios in
/// report order. Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `trajectories` - Output of the trajectory generator
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(trajectories: &AllTrajectories, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(trajectories, buf)
}

/// Writes all four trajectories as CSV to any writer.
///
/// `residential_allocation` is the market-adjusted share once the load is
/// online, the utility's base allocation before, and empty for the baseline.
/// `effective_peak_mw` is zero while offline.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(trajectories: &AllTrajectories, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for (scenario, records) in trajectories.iter() {
        for r in records {
            let (allocation, effective_peak_mw) = match (&r.metrics, &r.parameters) {
                (Some(m), _) => (Some(m.residential_allocation), m.effective_peak_mw),
                (None, Some(p)) => (Some(p.residential_allocation), 0.0),
                (None, None) => (None, 0.0),
            };
            wtr.write_record(&[
                scenario.as_str().to_string(),
                r.year.to_string(),
                r.year_index.to_string(),
                format!("{:.4}", r.monthly_bill),
                format!("{:.4}", r.annual_bill),
                r.dc_online.to_string(),
                format!("{:.4}", r.components.dc_impact),
                allocation.map_or_else(String::new, |a| format!("{a:.4}")),
                format!("{effective_peak_mw:.2}"),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataCenterLoadProfile, RateImpactEngine, UtilityProfile};

    fn trajectories(years: usize) -> AllTrajectories {
        RateImpactEngine::default()
            .compute_all_trajectories(
                &UtilityProfile::default(),
                &DataCenterLoadProfile::default(),
                years,
            )
            .unwrap()
    }

    fn render(t: &AllTrajectories) -> String {
        let mut buf = Vec::new();
        write_csv(t, &mut buf).ok();
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn header_matches_schema() {
        let output = render(&trajectories(5));
        let first_line = output.lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "scenario,year,year_index,monthly_bill,annual_bill,dc_online,\
             dc_impact,residential_allocation,effective_peak_mw"
        );
    }

    #[test]
    fn row_count_covers_every_scenario_year() {
        let output = render(&trajectories(10));
        // 1 header + 4 scenarios * 11 years
        assert_eq!(output.lines().count(), 45);
    }

    #[test]
    fn deterministic_output() {
        let t = trajectories(8);
        assert_eq!(render(&t), render(&t));
    }

    #[test]
    fn rows_parse_back() {
        let output = render(&trajectories(5));
        let mut rdr = csv::ReaderBuilder::new().from_reader(output.as_bytes());
        let mut firm_online = 0;
        for record in rdr.records() {
            let rec = record.unwrap();
            let bill: f64 = rec[3].parse().unwrap();
            assert!(bill > 0.0);
            let online: bool = rec[5].parse().unwrap();
            if &rec[0] == "firm" && online {
                firm_online += 1;
                let peak: f64 = rec[8].parse().unwrap();
                assert!((peak - 1_000.0).abs() < 1e-9);
            }
            if &rec[0] == "baseline" {
                assert!(rec[7].is_empty());
            }
        }
        // years 2..=5
        assert_eq!(firm_online, 4);
    }
}
