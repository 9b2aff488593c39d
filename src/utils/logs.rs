use console::{measure_text_width, Style};
use std::path::Path;
use strum::IntoEnumIterator;

use crate::history::Statistics;
use crate::scoring::{
    Assessment, Confidence, FeatureName, PerformanceCategory, StudentFeatures, ValidationError,
};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn branch_for(i: usize, count: usize) -> String {
    if i + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn ml_prefix() -> String {
    yellow().apply_to("[ML]").to_string()
}

fn store_prefix() -> String {
    magenta().apply_to("[STORE]").to_string()
}

pub fn category_style(category: PerformanceCategory) -> Style {
    match category {
        PerformanceCategory::Excellent => green().bold(),
        PerformanceCategory::Good => blue().bold(),
        PerformanceCategory::Average => yellow().bold(),
        PerformanceCategory::Poor => red().bold(),
    }
}

fn confidence_style(confidence: Confidence) -> Style {
    match confidence {
        Confidence::High => green(),
        Confidence::Medium => yellow(),
        Confidence::Low => red(),
    }
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn log_init(model_path: &Path, history_path: &Path) {
    println!(
        "{} model artifact {}",
        init_prefix(),
        cyan().apply_to(model_path.display()),
    );
    println!(
        "{} history store {}",
        init_prefix(),
        cyan().apply_to(history_path.display()),
    );
}

pub fn log_ml_loading() {
    println!("{} loading model...", ml_prefix());
}

pub fn log_ml_ready(model_type: &str) {
    println!(
        "{} {} ready!",
        ml_prefix(),
        bold().apply_to(model_type)
    );
}

pub fn log_ml_error(error: &str) {
    println!(
        "{} {} {}",
        ml_prefix(),
        red().apply_to("failed to initialize:"),
        dim().apply_to(error)
    );
}

pub fn log_saved(recorded: bool) {
    if recorded {
        println!("{} {}", store_prefix(), green().apply_to("prediction saved"));
    } else {
        println!(
            "{} {}",
            store_prefix(),
            red().apply_to("prediction not saved (see log)")
        );
    }
}

pub fn log_missing_features(error: &ValidationError) {
    println!("{}", red().bold().apply_to("Missing required features"));
    let count = error.missing().len();
    for (i, feature) in error.missing().iter().enumerate() {
        println!("{}{}", branch_for(i, count), feature);
    }
}

fn feature_lines(features: &StudentFeatures) -> Vec<String> {
    let all = FeatureName::ordered();
    let count = all.len();
    all.into_iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                "{}{} {}",
                branch_for(i, count),
                pad_label(f.key(), 1),
                features.value(f)
            )
        })
        .collect()
}

pub fn print_assessment(student_id: Option<&str>, assessment: &Assessment) {
    let mut lines: Vec<String> = Vec::new();
    let result = &assessment.result;

    lines.push(format!(
        "{} {}",
        magenta().apply_to(bold().apply_to("[STUDENT ASSESSMENT]")),
        dim().apply_to(student_id.unwrap_or("N/A"))
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("INPUT")));
    lines.extend(feature_lines(&assessment.features));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("MODEL")));
    lines.push(format!(
        "{}{} {} ({})",
        tree_branch(),
        pad_label("output", 1),
        bold().apply_to(assessment.label.as_bit()),
        dim().apply_to(assessment.label)
    ));
    lines.push(format!(
        "{}{} {:.2}",
        tree_end(),
        pad_label("calculated score", 1),
        assessment.calculated_score
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("CONTRIBUTIONS")));
    let pairs = result.contributions.as_pairs();
    for (i, (name, value)) in pairs.iter().enumerate() {
        lines.push(format!(
            "{}{} {:.2}",
            branch_for(i, pairs.len()),
            pad_label(name, 1),
            value
        ));
    }

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("RESULT")));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("category", 1),
        category_style(result.category).apply_to(result.category)
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("predicted score", 1),
        bold().apply_to(result.predicted_score)
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("confidence", 1),
        confidence_style(result.confidence).apply_to(result.confidence)
    ));

    println!("{}\n", lines.join("\n"));
}

pub fn log_probe_header() {
    println!("{}", bold().apply_to("MODEL ENCODING CHECK"));
}

pub fn log_probe_result(name: &str, assessment: &Assessment, last: bool) {
    let branch = if last { tree_end() } else { tree_branch() };
    println!(
        "{}{} output {} {} {}",
        branch,
        pad_label(name, 1),
        bold().apply_to(assessment.label.as_bit()),
        dim().apply_to("->"),
        category_style(assessment.result.category).apply_to(assessment.result.category)
    );
}

pub fn print_statistics(stats: &Statistics) {
    let mut lines = vec![format!("{}", bold().apply_to("STATISTICS"))];
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("total", 1),
        bold().apply_to(stats.total)
    ));
    lines.push(format!("{}{}", tree_branch(), pad_label("by category", 1)));
    let categories: Vec<PerformanceCategory> = PerformanceCategory::iter().rev().collect();
    for (i, category) in categories.iter().enumerate() {
        let n = stats.count(*category);
        let count = if n == 0 {
            dim().apply_to(n).to_string()
        } else {
            n.to_string()
        };
        lines.push(format!(
            "{}{}{} {}",
            tree_indent(),
            branch_for(i, categories.len()),
            pad_label(&category_style(*category).apply_to(category).to_string(), 2),
            count
        ));
    }
    lines.push(format!(
        "{}{} {:.2}",
        tree_end(),
        pad_label("average score", 1),
        stats.average_score
    ));

    println!("{}\n", lines.join("\n"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_label_aligns_to_value_column() {
        assert_eq!(measure_text_width(&pad_label("category", 1)), VALUE_COLUMN - 4);
        assert_eq!(measure_text_width(&pad_label("tests", 2)), VALUE_COLUMN - 8);
    }

    #[test]
    fn test_pad_label_long_label_gets_single_space() {
        let label = "a label that is far too long to fit";
        assert_eq!(pad_label(label, 1), format!("{label} "));
    }

    #[test]
    fn test_pad_label_ignores_ansi_codes() {
        let styled = Style::new()
            .red()
            .force_styling(true)
            .apply_to("Poor")
            .to_string();
        assert_eq!(
            measure_text_width(&pad_label(&styled, 2)),
            measure_text_width(&pad_label("Poor", 2))
        );
    }
}
