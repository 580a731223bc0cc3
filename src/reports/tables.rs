use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use scout_baseline::format::{percent, percent_or_na, thousands, title_case};
use scout_baseline::reconcile::{ComparisonRecord, RollupState, Verdict, ERROR_THRESHOLD};
use scout_baseline::segment::TaxonomyAudit;
use scout_baseline::taxonomy::{BuildingClass, FilterKey, Fuel};
use strum::IntoEnumIterator;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<Cell>>(),
    );

    for i in 0..headers.len() {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

fn key_label(key: &FilterKey) -> String {
    format!(
        "{} | {} | {}",
        key.class.as_ref().to_uppercase(),
        title_case(key.fuel.as_ref()),
        title_case(key.end_use.as_ref())
    )
}

pub fn comparison(record: &ComparisonRecord) {
    println!(
        "\n=== {} ===\nSeries ID       : {}\nAverage % error : {}",
        key_label(&record.key),
        record.series_id,
        percent(record.avg_pct_error)
    );

    let mut table = new_table(&["Year", "Scout JSON total", "EIA API total", "Percent error"]);
    for row in &record.rows {
        let err_cell = match row.pct_error {
            Some(e) if e > ERROR_THRESHOLD => Cell::new(percent(e)).fg(Color::Red),
            Some(e) => Cell::new(percent(e)).fg(Color::Green),
            None => Cell::new(percent_or_na(None)).fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&row.year),
            Cell::new(thousands(row.internal)),
            Cell::new(thousands(row.external)),
            err_cell,
        ]);
    }
    println!("{}", table);
}

pub fn rollups(state: &RollupState) {
    for class in BuildingClass::iter() {
        let banner = format!(
            "{}  {}  {}",
            "=".repeat(10),
            class.as_ref().to_uppercase(),
            "=".repeat(10)
        );
        println!("\n{}", banner);

        for fuel in Fuel::iter() {
            println!("\n{}  (Btu)", title_case(fuel.as_ref()));

            let years = match state.totals(class, fuel) {
                Some(years) if !years.is_empty() => years,
                _ => {
                    println!("(no data)");
                    continue;
                }
            };

            let mut table = new_table(&["Year", "Scout total", "EIA total", "Pct delta"]);
            for (year, cell) in years {
                table.add_row(vec![
                    Cell::new(year),
                    Cell::new(thousands(cell.internal)),
                    Cell::new(thousands(cell.external)),
                    Cell::new(format!("{:4.1}%", cell.pct_delta() * 100.0)),
                ]);
            }
            println!("{}", table);
        }
    }
}

pub fn large_errors(state: &RollupState) {
    let log = state.error_log();
    if log.is_empty() {
        println!(
            "\nAll series were within {} average error.",
            percent(ERROR_THRESHOLD)
        );
        return;
    }

    println!("\nSeries with average error > {}:", percent(ERROR_THRESHOLD));
    let mut table = new_table(&["Combination", "Series ID", "Avg error"]);
    for rec in log {
        table.add_row(vec![
            Cell::new(key_label(&rec.key)).set_alignment(CellAlignment::Left),
            Cell::new(&rec.series_id).set_alignment(CellAlignment::Left),
            Cell::new(percent(rec.avg_pct_error)).fg(Color::Red),
        ]);
    }
    println!("{}", table);
}

pub fn zero_divisions(state: &RollupState) {
    let summary = state.zero_division_summary();
    if summary.is_empty() {
        println!("\nNo zero-division cases encountered.");
        return;
    }

    println!("\nZero-division cases (EIA values equal to 0):");
    for (group, years) in &summary {
        let years_str = if years.is_empty() {
            "(all/unknown)".to_string()
        } else {
            years.iter().cloned().collect::<Vec<String>>().join(", ")
        };
        println!(
            "  {} | context: {} | years: {}\n    Series: {}",
            key_label(&group.key),
            group.context,
            years_str,
            group.series_id
        );
    }
}

pub fn audit(audit: &TaxonomyAudit, detailed: bool) {
    if audit.gap_count() == 0 && audit.overlap_count() == 0 {
        println!("\nEnd-use decision table covers every energy leaf exactly once.");
        return;
    }

    let mut table = new_table(&[
        "Slice",
        "Leaf total",
        "Unmatched",
        "Gap energy",
        "Multi-matched",
        "Excess energy",
    ]);
    for slice in audit.slices.iter().filter(|s| !s.is_clean()) {
        table.add_row(vec![
            Cell::new(format!(
                "{} | {}",
                slice.class.as_ref().to_uppercase(),
                title_case(slice.fuel.as_ref())
            ))
            .set_alignment(CellAlignment::Left),
            Cell::new(thousands(slice.unfiltered)),
            Cell::new(slice.gaps.len()),
            Cell::new(thousands(slice.gap_total())).fg(Color::Yellow),
            Cell::new(slice.overlaps.len()),
            Cell::new(thousands(slice.overlap_excess())).fg(Color::Yellow),
        ]);
    }
    println!("\nEnd-use decision table audit:\n{}", table);

    if !detailed {
        return;
    }
    for slice in &audit.slices {
        for gap in &slice.gaps {
            println!("  unmatched: {}  ({})", gap.path, thousands(gap.energy));
        }
        for overlap in &slice.overlaps {
            let claims: Vec<&str> = overlap.end_uses.iter().map(|eu| eu.as_ref()).collect();
            println!(
                "  multi-matched: {}  -> {}",
                overlap.path,
                claims.join(", ")
            );
        }
    }
}

pub fn verdict(verdict: &Verdict) {
    match verdict {
        Verdict::Pass { worst } => println!(
            "\nMax average percent error {} is within the allowed tolerance.",
            percent(*worst)
        ),
        Verdict::Fail { worst, tolerance } => println!(
            "\nMax average percent error {} exceeds allowed tolerance {}.\n\
             Check above list for problem series.\nFailing run.",
            percent(*worst),
            percent(*tolerance)
        ),
    }
}
