use std::path::PathBuf;

use crate::builders::rules::ToggleRule;

/// What a single rule did to the document.
///
/// This provides a clean way to pass rule-specific data from the
/// `BlockToggler` to the `StatusReporter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Name of the rule.
    pub rule: String,
    /// Human-readable description of the rule's target.
    pub target: String,
    /// Fragments wrapped (or, when restoring, unwrapped).
    pub applied: usize,
    /// Fragments left alone because they were already inside a comment.
    pub skipped: usize,
}

impl RuleOutcome {
    pub fn new(rule: &ToggleRule) -> Self {
        Self {
            rule: rule.name.clone(),
            target: rule.target.to_string(),
            applied: 0,
            skipped: 0,
        }
    }

    /// A rule that neither applied nor skipped anything found no target.
    pub fn is_no_match(&self) -> bool {
        self.applied == 0 && self.skipped == 0
    }
}

/// Summary of one run over one file.
#[derive(Debug)]
pub struct RunReport {
    pub path: PathBuf,
    pub outcomes: Vec<RuleOutcome>,
    /// False for dry runs.
    pub written: bool,
}

impl RunReport {
    pub fn changed(&self) -> bool {
        self.outcomes.iter().any(|o| o.applied > 0)
    }

    pub fn total_applied(&self) -> usize {
        self.outcomes.iter().map(|o| o.applied).sum()
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.is_no_match())
    }
}

pub trait StatusReporter {
    fn generate_run_report(&self, report: &RunReport) -> Vec<String>;
}

/// A concrete implementation of `StatusReporter` that renders the report for
/// the console.
///
/// Used for `--dry-run` and `--verbose`.
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Constructs a new `ConsoleReporter` instance.
    pub fn new() -> Self {
        Self
    }

    /// Formats the status line for a single rule.
    ///
    /// 🟢: the rule changed the document.
    /// 🟡: every match was already commented out.
    /// ⚪: the rule found nothing.
    fn format_outcome(&self, outcome: &RuleOutcome) -> String {
        let status_icon = if outcome.applied > 0 {
            "🟢"
        } else if outcome.skipped > 0 {
            "🟡"
        } else {
            "⚪"
        };

        format!(
            "{} {} ({}): {} changed, {} already commented",
            status_icon, outcome.rule, outcome.target, outcome.applied, outcome.skipped
        )
    }

    pub fn print(&self, report: &RunReport) {
        for line in self.generate_run_report(report) {
            println!("{line}");
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for ConsoleReporter {
    fn generate_run_report(&self, report: &RunReport) -> Vec<String> {
        let mut lines = vec![
            format!("📊 Dependency Toggle Report: {}", report.path.display()),
            "=====================================".to_string(),
        ];

        if report.outcomes.is_empty() {
            lines.push("No rules configured.".to_string());
            return lines;
        }

        lines.extend(report.outcomes.iter().map(|o| self.format_outcome(o)));

        let unmatched = report.unmatched().count();
        lines.push(String::new());
        lines.push("📈 Summary:".to_string());
        lines.push(format!("  Rules: {}", report.outcomes.len()));
        lines.push(format!("  Fragments changed: {}", report.total_applied()));
        lines.push(format!("  Rules without a match: {unmatched}"));
        if !report.written {
            lines.push("  Dry run: file not written".to_string());
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(rule: &str, applied: usize, skipped: usize) -> RuleOutcome {
        RuleOutcome {
            rule: rule.to_string(),
            target: "dependency g:a".to_string(),
            applied,
            skipped,
        }
    }

    #[test]
    fn test_report_lines() {
        let report = RunReport {
            path: PathBuf::from("pom.xml"),
            outcomes: vec![outcome("a", 1, 0), outcome("b", 0, 1), outcome("c", 0, 0)],
            written: false,
        };
        let lines = ConsoleReporter::new().generate_run_report(&report);

        assert!(lines[2].starts_with("🟢 a"));
        assert!(lines[3].starts_with("🟡 b"));
        assert!(lines[4].starts_with("⚪ c"));
        assert!(lines.contains(&"  Rules without a match: 1".to_string()));
        assert!(lines.contains(&"  Dry run: file not written".to_string()));
        assert!(report.changed());
    }
}
