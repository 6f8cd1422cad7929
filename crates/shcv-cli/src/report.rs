//! Verbose report printed to stdout

use console::style;
use shcv_core::{StrategyWarning, ValueRef};
use std::path::Path;

pub fn print_templates(count: usize) {
    println!("Found {} template files", style(count).bold());
}

pub fn print_references(refs: &[ValueRef]) {
    println!("Found {} value references", style(refs.len()).bold());
    for r in refs {
        println!(
            "- {} {}",
            style(&r.path).cyan(),
            style(format!("(from {}:{})", file_name(&r.source_file), r.line_number)).dim()
        );
        if r.has_default() {
            println!("  default: {}", style(&r.default_value).green());
        }
    }
}

pub fn print_warnings(warnings: &[StrategyWarning]) {
    for warning in warnings {
        println!("{} {}", style("Warning:").yellow().bold(), warning);
    }
}

pub fn print_updated(path: &Path) {
    println!(
        "{} {}",
        style("Successfully updated").green(),
        path.display()
    );
}

fn file_name(source: &str) -> &str {
    Path::new(source)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(source)
}
