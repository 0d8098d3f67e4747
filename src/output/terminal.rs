// Colored terminal output for per-model result tables.
//
// Every analysis prints one panel per model, in slot order. A model whose
// analysis failed gets its error message in place of the table so the other
// panels stay readable.

use colored::Colorize;

use crate::analysis::bias::{BiasReport, ALL_WORDS_LABEL};
use crate::analysis::report::Table;
use crate::analysis::wordlists::{BiasAxisKind, BiasAxisTable, NeutralCategory};
use crate::embeddings::traits::EmbeddingStore;
use crate::registry::ModelRegistry;
use crate::runner::ModelRun;

/// Display loaded models and empty slots.
pub fn display_status(registry: &ModelRegistry) {
    println!(
        "\n{}",
        format!(
            "=== Models ({} of {} slots used) ===",
            registry.len(),
            registry.capacity()
        )
        .bold()
    );
    println!();

    for slot in 0..registry.capacity() {
        match registry.get(slot) {
            Some(entry) => {
                let space = entry.space();
                println!(
                    "  {:>2}. {:<20} {:>10} words  {:>4}-dim",
                    slot + 1,
                    entry.name.bold(),
                    space.vocabulary_size(),
                    space.dimension(),
                );
                if let Some(source) = &entry.source {
                    println!(
                        "      {} ({})",
                        source.path.display().to_string().dimmed(),
                        source.format
                    );
                }
            }
            None => println!("  {:>2}. {}", slot + 1, "(empty)".dimmed()),
        }
    }
}

/// Display association or analogy tables, one panel per model.
pub fn display_tables(title: &str, runs: &[ModelRun<Table>]) {
    println!("\n{}", format!("=== {title} ===").bold());

    for run in runs {
        print_model_header(run);
        match &run.outcome {
            Ok(table) if table.is_empty() => println!("    {}", "No results".dimmed()),
            Ok(table) => {
                println!(
                    "    {:<30} {:>10}",
                    table.columns[0].dimmed(),
                    table.columns[1].dimmed()
                );
                println!("    {}", "-".repeat(41).dimmed());
                for row in &table.rows {
                    println!("    {:<30} {:>10.4}", row.label, row.value);
                }
            }
            Err(message) => print_error(message),
        }
    }

    print_summary(runs);
}

/// Display bias reports, one panel per model, with a bar per category.
pub fn display_bias(runs: &[ModelRun<BiasReport>]) {
    let axis = runs
        .iter()
        .find_map(|r| r.outcome.as_ref().ok().map(|rep| rep.axis.clone()))
        .unwrap_or_default();
    println!("\n{}", format!("=== Bias Scores: {axis} ===").bold());

    for run in runs {
        print_model_header(run);
        match &run.outcome {
            Ok(report) => {
                let scale = if report.normalized { "normalized" } else { "raw" };
                println!(
                    "    {}",
                    format!(
                        "Group separation: {:.4}  ({scale} scores)",
                        report.axis_separation
                    )
                    .dimmed()
                );
                println!();

                let max = report
                    .rows
                    .iter()
                    .map(|r| r.score)
                    .fold(0.0_f64, f64::max)
                    .max(f64::EPSILON);

                for row in &report.rows {
                    let label = if row.category == ALL_WORDS_LABEL {
                        row.category.italic()
                    } else {
                        row.category.normal()
                    };
                    println!(
                        "    {:<22} {} {:.4}  {}",
                        label,
                        score_bar(row.score / max),
                        row.score,
                        format!("({}/{} words)", row.resolved, row.denominator).dimmed()
                    );
                }
            }
            Err(message) => print_error(message),
        }
    }

    print_summary(runs);
}

/// Display the loaded reference word lists.
pub fn display_word_lists(axes: &BiasAxisTable, categories: &[NeutralCategory]) {
    println!("\n{}", "=== Bias Axes ===".bold());
    for kind in BiasAxisKind::ALL {
        match axes.axis(kind) {
            Ok(axis) => {
                println!("  {} ({})", kind.as_str().bold(), kind.ordinal());
                for group in [&axis.first, &axis.second] {
                    let preview = super::truncate_chars(&group.words.join(", "), 70);
                    println!("    {:>3} words: {}", group.words.len(), preview.dimmed());
                }
            }
            Err(_) => println!("  {} {}", kind.as_str().bold(), "(missing)".red()),
        }
    }

    println!("\n{}", "=== Neutral Word Categories ===".bold());
    for category in categories {
        let preview = super::truncate_chars(&category.words.join(", "), 60);
        println!(
            "  {:<22} {:>3} words: {}",
            category.label.bold(),
            category.words.len(),
            preview.dimmed()
        );
    }
}

fn print_model_header<T>(run: &ModelRun<T>) {
    println!();
    println!("  {} {}", format!("[{}]", run.slot + 1).dimmed(), run.model.bold());
}

fn print_error(message: &str) {
    println!("    {} {}", "Error:".red().bold(), message.red());
}

fn print_summary<T>(runs: &[ModelRun<T>]) {
    let failed = runs.iter().filter(|r| !r.is_ok()).count();
    println!();
    if runs.is_empty() {
        println!("  {}", "No models loaded.".yellow());
    } else if failed > 0 {
        println!(
            "  {} {} of {} models failed",
            "!".bright_red(),
            failed,
            runs.len()
        );
    }
}

/// A 20-character bar for a value in [0, 1].
fn score_bar(fraction: f64) -> colored::ColoredString {
    let width: usize = 20;
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(width - filled));
    if fraction >= 0.66 {
        bar.bright_red()
    } else if fraction >= 0.33 {
        bar.bright_yellow()
    } else {
        bar.bright_green()
    }
}
