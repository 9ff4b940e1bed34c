//! Console output helpers for the CLI

use crate::pipeline::TrainingResult;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Format a fraction as a percentage with one decimal
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Print the summary shared by every training command
pub fn print_training_result(result: &TrainingResult) {
    print_subsection("Training");
    print_kv("Episodes", &result.episodes.to_string());
    print_kv("Decisions", &result.steps.to_string());
    print_kv("Accuracy", &format_percent(result.accuracy()));
    print_kv("Last episode", &format_percent(result.final_accuracy));
    print_kv("Final epsilon", &format!("{:.4}", result.final_epsilon));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.5), "50.0%");
        assert_eq!(format_percent(1.0 / 3.0), "33.3%");
    }
}
