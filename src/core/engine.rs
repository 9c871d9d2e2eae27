use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::builders::reporter::{RuleOutcome, RunReport};
use crate::builders::rules::{RuleMatcher, ToggleRule};
use crate::core::config::GlobalSettings;
use crate::core::document::Document;
use crate::core::error::ToggleError;

/// The result of applying one rule: the next document and what happened.
#[derive(Debug)]
pub struct RuleApplication {
    pub document: Document,
    pub outcome: RuleOutcome,
}

/// Comments out dependency blocks and sections of a POM, and undoes it.
pub struct BlockToggler {
    skip_commented: bool,
    dry_run: bool,
}

impl BlockToggler {
    pub fn new(settings: &GlobalSettings) -> Self {
        Self {
            skip_commented: settings.skip_commented,
            dry_run: false,
        }
    }

    /// In dry-run mode `run` and `restore` compute the report but never write.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn load(path: &Path) -> Result<Document, ToggleError> {
        let content = fs::read_to_string(path).map_err(|e| ToggleError::read(path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "loaded build descriptor");
        Ok(Document::new(content))
    }

    /// Overwrites `path` in place. There is no temp file and no rollback.
    pub fn save(path: &Path, document: &Document) -> Result<(), ToggleError> {
        fs::write(path, document.as_str()).map_err(|source| ToggleError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Wraps every fragment `rule` matches in comment delimiters.
    ///
    /// Matches whose block already sits inside an XML comment are counted as
    /// skipped and left alone, unless `skip_commented` is off. A match that
    /// only starts inside a comment (a tag quoted in prose) does not hide the
    /// live block after it. A rule that matches nothing returns the document
    /// unchanged.
    pub fn apply_rule(
        &self,
        document: Document,
        rule: &ToggleRule,
    ) -> Result<RuleApplication, ToggleError> {
        let mut outcome = RuleOutcome::new(rule);
        let comments = if self.skip_commented {
            document.comment_spans()
        } else {
            Vec::new()
        };
        let scan = rule.find_fragments(document.as_str(), &comments)?;
        outcome.skipped = scan.commented;

        if scan.live.is_empty() {
            if scan.commented > 0 {
                debug!(rule = %rule.name, skipped = scan.commented, "every match already commented out");
            } else {
                info!(rule = %rule.name, target = %rule.target, "rule matched nothing, document unchanged");
            }
            return Ok(RuleApplication { document, outcome });
        }

        let source = document.as_str();
        let mut output = String::with_capacity(source.len() + scan.live.len() * 32);
        let mut cursor = 0;

        for block in scan.live {
            output.push_str(&source[cursor..block.start]);
            output.push_str(&rule.wrap_fragment(&source[block.clone()]));
            cursor = block.end;
            outcome.applied += 1;
        }
        output.push_str(&source[cursor..]);

        info!(
            rule = %rule.name,
            wrapped = outcome.applied,
            skipped = outcome.skipped,
            "rule applied"
        );
        Ok(RuleApplication {
            document: Document::new(output),
            outcome,
        })
    }

    /// Removes wrappers produced by `rule`, leaving the bare blocks.
    pub fn unwrap_rule(
        &self,
        document: Document,
        rule: &ToggleRule,
    ) -> Result<RuleApplication, ToggleError> {
        let mut outcome = RuleOutcome::new(rule);
        let wrappers = rule.find_wrapped(document.as_str())?;

        if wrappers.is_empty() {
            info!(rule = %rule.name, "no wrapper found to restore");
            return Ok(RuleApplication { document, outcome });
        }

        let source = document.as_str();
        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;

        for (wrapper, block) in wrappers {
            output.push_str(&source[cursor..wrapper.start]);
            output.push_str(&source[block]);
            cursor = wrapper.end;
            outcome.applied += 1;
        }
        output.push_str(&source[cursor..]);

        info!(rule = %rule.name, restored = outcome.applied, "rule restored");
        Ok(RuleApplication {
            document: Document::new(output),
            outcome,
        })
    }

    /// Applies `rules` in order, each one to the output of the previous one.
    pub fn apply_all(
        &self,
        document: Document,
        rules: &[ToggleRule],
    ) -> Result<(Document, Vec<RuleOutcome>), ToggleError> {
        rules.iter().try_fold(
            (document, Vec::with_capacity(rules.len())),
            |(document, mut outcomes), rule| {
                let RuleApplication { document, outcome } = self.apply_rule(document, rule)?;
                outcomes.push(outcome);
                Ok::<_, ToggleError>((document, outcomes))
            },
        )
    }

    /// Undoes `rules` in reverse order, so enclosing sections are opened
    /// before the fragments inside them.
    pub fn restore_all(
        &self,
        document: Document,
        rules: &[ToggleRule],
    ) -> Result<(Document, Vec<RuleOutcome>), ToggleError> {
        rules.iter().rev().try_fold(
            (document, Vec::with_capacity(rules.len())),
            |(document, mut outcomes), rule| {
                let RuleApplication { document, outcome } = self.unwrap_rule(document, rule)?;
                outcomes.push(outcome);
                Ok::<_, ToggleError>((document, outcomes))
            },
        )
    }

    /// Load, apply every rule in memory, then write once.
    pub fn run(&self, path: &Path, rules: &[ToggleRule]) -> Result<RunReport, ToggleError> {
        info!(path = %path.display(), rules = rules.len(), "commenting out dependencies");
        let document = Self::load(path)?;
        let (document, outcomes) = self.apply_all(document, rules)?;
        self.finish(path, &document, outcomes)
    }

    /// Load, strip every wrapper the rules produced, then write once.
    pub fn restore(&self, path: &Path, rules: &[ToggleRule]) -> Result<RunReport, ToggleError> {
        info!(path = %path.display(), rules = rules.len(), "restoring dependencies");
        let document = Self::load(path)?;
        let (document, outcomes) = self.restore_all(document, rules)?;
        self.finish(path, &document, outcomes)
    }

    fn finish(
        &self,
        path: &Path,
        document: &Document,
        outcomes: Vec<RuleOutcome>,
    ) -> Result<RunReport, ToggleError> {
        if !self.dry_run {
            Self::save(path, document)?;
        }
        Ok(RunReport {
            path: path.to_path_buf(),
            outcomes,
            written: !self.dry_run,
        })
    }
}
