//! Risk card and attribution waterfall for a scored applicant

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{Attribution, RiskAssessment, RiskBand};

const BAR_WIDTH: usize = 20;

fn band_color(band: RiskBand) -> Color {
    match band {
        RiskBand::Low => Color::Green,
        RiskBand::Medium => Color::Yellow,
        RiskBand::High => Color::Red,
    }
}

/// Attributions ordered by absolute contribution, largest first
pub fn ranked_attributions(attributions: &[Attribution]) -> Vec<&Attribution> {
    let mut ranked: Vec<&Attribution> = attributions.iter().collect();
    ranked.sort_by(|a, b| {
        b.contribution
            .abs()
            .partial_cmp(&a.contribution.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Waterfall table: base value, the `top_n` largest contributions with a
/// running total, the remaining features folded into one row, and the final
/// raw output.
pub fn waterfall_table(attributions: &[Attribution], top_n: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
        Cell::new("Contribution").add_attribute(Attribute::Bold),
        Cell::new("").add_attribute(Attribute::Bold),
        Cell::new("Running total").add_attribute(Attribute::Bold),
    ]);

    let Some(first) = attributions.first() else {
        return table;
    };
    let base = first.base_value;
    let ranked = ranked_attributions(attributions);
    let max_abs = ranked.first().map(|a| a.contribution.abs()).unwrap_or(0.0);

    table.add_row(vec![
        Cell::new("base value").add_attribute(Attribute::Italic),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{:.4}", base)).set_alignment(CellAlignment::Right),
    ]);

    let mut running = base;
    for attribution in ranked.iter().take(top_n) {
        running += attribution.contribution;
        let (color, sign) = if attribution.contribution >= 0.0 {
            (Color::Red, "+")
        } else {
            (Color::Green, "")
        };
        let bar_len = if max_abs > 0.0 {
            ((attribution.contribution.abs() / max_abs) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        table.add_row(vec![
            Cell::new(&attribution.feature),
            Cell::new(format!("{:.3}", attribution.value)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}{:.4}", sign, attribution.contribution))
                .fg(color)
                .set_alignment(CellAlignment::Right),
            Cell::new("█".repeat(bar_len)).fg(color),
            Cell::new(format!("{:.4}", running)).set_alignment(CellAlignment::Right),
        ]);
    }

    let rest = ranked.len().saturating_sub(top_n);
    if rest > 0 {
        let remainder: f64 = ranked.iter().skip(top_n).map(|a| a.contribution).sum();
        running += remainder;
        table.add_row(vec![
            Cell::new(format!("{} other feature(s)", rest)).add_attribute(Attribute::Italic),
            Cell::new(""),
            Cell::new(format!("{:+.4}", remainder)).set_alignment(CellAlignment::Right),
            Cell::new(""),
            Cell::new(format!("{:.4}", running)).set_alignment(CellAlignment::Right),
        ]);
    }

    table.add_row(vec![
        Cell::new("model output").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{:.4}", running))
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
    ]);

    table
}

/// Print the risk card followed by the attribution waterfall
pub fn display_assessment(assessment: &RiskAssessment, top_n: usize) {
    let color = band_color(assessment.band);

    let mut card = Table::new();
    card.load_preset(UTF8_FULL_CONDENSED);
    card.add_row(vec![
        Cell::new("Model").add_attribute(Attribute::Bold),
        Cell::new(&assessment.model),
    ]);
    card.add_row(vec![
        Cell::new("Risk score").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2} / 100", assessment.score))
            .fg(color)
            .add_attribute(Attribute::Bold),
    ]);
    card.add_row(vec![
        Cell::new("Risk band").add_attribute(Attribute::Bold),
        Cell::new(assessment.band).fg(color).add_attribute(Attribute::Bold),
    ]);
    card.add_row(vec![
        Cell::new("Recommendation").add_attribute(Attribute::Bold),
        Cell::new(&assessment.recommendation).fg(color),
    ]);

    println!();
    println!("    {} {}", style("🧾").cyan(), style("RISK ASSESSMENT").white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
    for line in card.to_string().lines() {
        println!("    {}", line);
    }

    println!();
    println!("    {} {}", style("🌊").cyan(), style("FEATURE ATTRIBUTION").white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!(
        "    {}",
        style("Positive contributions push towards default; units are the model's raw output").dim()
    );
    println!();
    for line in waterfall_table(&assessment.attributions, top_n).to_string().lines() {
        println!("    {}", line);
    }
    println!();
}
