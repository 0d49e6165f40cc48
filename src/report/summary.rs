//! Training summary and evaluation comparison tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use super::training_export::{ModelImportance, TrainingReport};
use crate::pipeline::{EvaluationOutcome, EvaluationRecord};

fn section_title(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn metric_cell(value: f64) -> Cell {
    let color = if value >= 0.8 {
        Color::Green
    } else if value >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{:.4}", value))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Build the model comparison table, one row per evaluation record in order
pub fn evaluation_table(records: &[EvaluationRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        ["Model", "ROC-AUC", "Precision", "Recall", "F1", "Accuracy", "TP/FP/FN/TN"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for record in records {
        match &record.outcome {
            EvaluationOutcome::Scored(m) => {
                let c = &m.confusion;
                table.add_row(vec![
                    Cell::new(&record.model),
                    metric_cell(m.roc_auc),
                    metric_cell(m.precision),
                    metric_cell(m.recall),
                    metric_cell(m.f1),
                    metric_cell(m.accuracy),
                    Cell::new(format!(
                        "{}/{}/{}/{}",
                        c.true_positives, c.false_positives, c.false_negatives, c.true_negatives
                    ))
                    .set_alignment(CellAlignment::Right),
                ]);
            }
            EvaluationOutcome::Skipped { reason } => {
                table.add_row(vec![
                    Cell::new(&record.model),
                    Cell::new(format!("skipped: {}", reason)).fg(Color::DarkGrey),
                ]);
            }
        }
    }

    table
}

/// Print the model comparison table
pub fn display_evaluation(records: &[EvaluationRecord]) {
    section_title("📈", "HOLDOUT EVALUATION");
    print_indented(&evaluation_table(records));
}

/// Print the top features of one model's global importance ranking
pub fn display_importance(importance: &ModelImportance, top_n: usize) {
    section_title("🔍", &format!("TOP FEATURES · {}", importance.model));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Mean |contribution|").add_attribute(Attribute::Bold),
    ]);
    for (rank, feature) in importance.features.iter().take(top_n).enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&feature.feature),
            Cell::new(format!("{:.4}", feature.mean_abs_contribution)).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

/// Print the end-of-run summary
pub fn display_training_summary(report: &TrainingReport) {
    section_title("📋", "TRAINING SUMMARY");

    let data = &report.dataset;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![Cell::new("📁 Loaded Rows"), Cell::new(data.loaded_rows)]);
    table.add_row(vec![
        Cell::new("🗑️  Dropped (Label)"),
        Cell::new(data.dropped_rows).fg(if data.dropped_rows == 0 {
            Color::White
        } else {
            Color::Red
        }),
    ]);
    table.add_row(vec![Cell::new("🏋️  Training Rows"), Cell::new(data.train_rows)]);
    table.add_row(vec![Cell::new("🧪 Holdout Rows"), Cell::new(data.holdout_rows)]);
    table.add_row(vec![Cell::new("🧬 Features"), Cell::new(data.features)]);
    table.add_row(vec![
        Cell::new("⚖️  Defaults (before → after)"),
        Cell::new(format!(
            "{} → {}",
            data.train_before_resampling.default, data.train_after_resampling.default
        )),
    ]);
    table.add_row(vec![
        Cell::new("✅ Models Trained"),
        Cell::new(report.evaluations.len())
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    if !report.failures.is_empty() {
        table.add_row(vec![
            Cell::new("❌ Models Failed"),
            Cell::new(report.failures.len()).fg(Color::Red),
        ]);
    }
    if let Some(best) = report.best_model() {
        table.add_row(vec![
            Cell::new("🏆 Best ROC-AUC"),
            Cell::new(format!(
                "{} ({:.4})",
                best.model,
                best.metric("roc_auc").unwrap_or(0.0)
            ))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        ]);
    }

    print_indented(&table);

    if !report.failures.is_empty() {
        println!();
        for failure in &report.failures {
            println!("        {} {}", style("•").dim(), style(failure).yellow());
        }
    }
}
