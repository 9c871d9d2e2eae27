use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::builders::rules::{self, RuleTarget, ToggleRule};
use crate::core::config;

/// The `ConfigValidator` trait defines the public interface for validating the
/// toggle configuration.
///
/// This trait allows for the implementation of different validation strategies,
/// such as a strict validator or a more permissive one, by adhering to a common
/// set of methods.
pub trait ConfigValidator {
    /// Performs a full validation of the `ToggleConfig` and returns
    /// a list of issues found.
    ///
    /// # Arguments
    /// * `config`: The `ToggleConfig` to be validated.
    ///
    /// # Returns
    /// A `Result<Vec<String>>` containing a vector of strings, where each string
    /// describes a specific validation issue.
    fn validate_config(&self, config: &config::ToggleConfig) -> Result<Vec<String>>;

    /// Validates a single `ToggleRule` and returns a list of issues.
    fn validate_rule(&self, rule: &ToggleRule) -> Result<Vec<String>>;
}

/// The `StandardValidator` is a concrete implementation of `ConfigValidator`.
///
/// It checks that the target file exists and that every rule is well-formed
/// and distinct from the others.
pub struct StandardValidator {
    root: PathBuf,
}

impl StandardValidator {
    /// Creates a validator that resolves the target file against `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn check_file_exists(&self, file_path: &str) -> bool {
        self.root.join(file_path).exists()
    }

    /// Checks for rules sharing a name or a target.
    ///
    /// Two rules on the same target would wrap a fragment twice when the
    /// already-commented check is off, and make reports ambiguous when it is on.
    fn check_rule_conflicts(&self, rules: &[ToggleRule]) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut names = HashSet::new();
        let mut targets = HashSet::new();

        for rule in rules {
            if !names.insert(rule.name.as_str()) {
                warnings.push(format!("Duplicate rule name '{}'", rule.name));
            }
            if !targets.insert(&rule.target) {
                warnings.push(format!("Duplicate rule target: {}", rule.target));
            }
        }
        warnings
    }
}

fn is_single_comment(anchor: &str) -> bool {
    let anchor = anchor.trim();
    anchor.starts_with(rules::OPEN_COMMENT)
        && anchor.ends_with(rules::CLOSE_COMMENT)
        && anchor.len() >= rules::OPEN_COMMENT.len() + rules::CLOSE_COMMENT.len()
        && anchor[rules::OPEN_COMMENT.len()..anchor.len() - rules::CLOSE_COMMENT.len()]
            .find(rules::CLOSE_COMMENT)
            .is_none()
}

fn is_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

impl ConfigValidator for StandardValidator {
    /// The main public method for validating the entire configuration.
    ///
    /// It orchestrates multiple checks, including:
    /// - Version compatibility.
    /// - Whether the target file exists.
    /// - Conflicts between rules.
    /// - The validity of each individual rule.
    fn validate_config(&self, config: &config::ToggleConfig) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        if config.version != "1.0" {
            issues.push(format!("Unsupported config version: {}", config.version));
        }

        if !self.check_file_exists(&config.target_file) {
            issues.push(format!("File not found: {}", config.target_file));
        }

        if config.rules.is_empty() {
            issues.push("No rules configured; runs will leave the file unchanged".to_string());
        }

        issues.extend(self.check_rule_conflicts(&config.rules));

        for rule in &config.rules {
            issues.extend(self.validate_rule(rule)?);
        }

        Ok(issues)
    }

    /// Validates a single rule's identifiers, anchor, indent and patterns.
    fn validate_rule(&self, rule: &ToggleRule) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        if rule.name.trim().is_empty() {
            issues.push(format!("Rule for {} has an empty name", rule.target));
        }

        match &rule.target {
            RuleTarget::Dependency {
                group_id,
                artifact_id,
            } => {
                if group_id.trim().is_empty() || artifact_id.trim().is_empty() {
                    issues.push(format!(
                        "Rule '{}': groupId and artifactId cannot be empty",
                        rule.name
                    ));
                }
            }
            RuleTarget::Section { tag } => {
                if !is_tag_name(tag) {
                    issues.push(format!("Rule '{}': invalid section tag '{tag}'", rule.name));
                }
            }
        }

        if let Some(anchor) = &rule.anchor
            && !is_single_comment(anchor)
        {
            issues.push(format!(
                "Rule '{}': anchor must be a single XML comment, got '{anchor}'",
                rule.name
            ));
        }

        if !rule.indent.chars().all(|c| c == ' ' || c == '\t') {
            issues.push(format!(
                "Rule '{}': indent may only contain spaces and tabs",
                rule.name
            ));
        }

        // Literals are escaped, so this only trips on pathological input.
        for pattern in [rule.activation_pattern(), rule.wrapper_open_pattern()] {
            if let Err(e) = rule.compile(&pattern) {
                issues.push(e.to_string());
            }
        }

        Ok(issues)
    }
}
