use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::core::error::ToggleError;

/// Opening XML comment delimiter inserted before a disabled fragment.
pub const OPEN_COMMENT: &str = "<!--";
/// Closing XML comment delimiter inserted after a disabled fragment.
pub const CLOSE_COMMENT: &str = "-->";

const DEPENDENCY_INDENT: &str = "        ";
const SECTION_INDENT: &str = "    ";

/// What a rule points at inside the POM.
///
/// A dependency is identified by its `groupId`/`artifactId` pair. A section is
/// identified only by its enclosing tag, e.g. `dependencyManagement`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuleTarget {
    Dependency {
        group_id: String,
        artifact_id: String,
    },
    Section {
        tag: String,
    },
}

/// A single toggling rule as stored in the rule file.
///
/// Rules are plain data. The regex for a rule is built on demand from the
/// escaped literals, so a rule can be serialized and cloned freely.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToggleRule {
    /// Unique name, shown in reports and logs.
    pub name: String,
    /// Literal comment that must precede the block. It stays outside the
    /// inserted wrapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// Whitespace placed between each delimiter and the wrapped block.
    pub indent: String,
    pub target: RuleTarget,
}

impl fmt::Display for RuleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleTarget::Dependency {
                group_id,
                artifact_id,
            } => write!(f, "dependency {group_id}:{artifact_id}"),
            RuleTarget::Section { tag } => write!(f, "section <{tag}>"),
        }
    }
}

/// Blocks found by one rule scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FragmentScan {
    /// Blocks outside any comment, in document order. Ranges exclude the anchor.
    pub live: Vec<Range<usize>>,
    /// Blocks that already sit inside an XML comment.
    pub commented: usize,
}

/// Matching behaviour shared by every rule.
///
/// The engine only talks to rules through this trait, which keeps the
/// wrapping logic independent of how a fragment is located.
pub trait RuleMatcher {
    /// Scans `content` for the blocks this rule targets.
    ///
    /// `comments` are the XML comment spans of `content`. A candidate that
    /// starts inside one of them is never returned as live, and the scan
    /// resumes after that comment so a tag quoted in a comment cannot swallow
    /// the real block that follows it. Pass an empty slice to match comments
    /// like any other text.
    fn find_fragments(
        &self,
        content: &str,
        comments: &[Range<usize>],
    ) -> Result<FragmentScan, ToggleError>;

    /// Produces the comment-wrapped form of a matched block.
    fn wrap_fragment(&self, block: &str) -> String;

    /// Finds wrappers previously produced by `wrap_fragment`.
    ///
    /// Each item is `(wrapper, block)`: the full range including delimiters
    /// and the range of the untouched block inside it.
    fn find_wrapped(&self, content: &str) -> Result<Vec<(Range<usize>, Range<usize>)>, ToggleError>;
}

impl ToggleRule {
    /// Creates a rule that disables one `<dependency>` block.
    pub fn dependency(
        name: impl Into<String>,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            anchor: None,
            indent: DEPENDENCY_INDENT.to_string(),
            target: RuleTarget::Dependency {
                group_id: group_id.into(),
                artifact_id: artifact_id.into(),
            },
        }
    }

    /// Creates a rule that disables a whole `<tag>...</tag>` section.
    pub fn section(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor: None,
            indent: SECTION_INDENT.to_string(),
            target: RuleTarget::Section { tag: tag.into() },
        }
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Regex source for the bare block, without anchor or wrapper.
    ///
    /// `.*?` runs in dot-matches-newline mode and stops at the nearest
    /// closing tag.
    pub fn block_pattern(&self) -> String {
        match &self.target {
            RuleTarget::Dependency {
                group_id,
                artifact_id,
            } => format!(
                r"<dependency>\s+<groupId>{}</groupId>\s+<artifactId>{}</artifactId>.*?</dependency>",
                regex::escape(group_id),
                regex::escape(artifact_id)
            ),
            RuleTarget::Section { tag } => {
                let tag = regex::escape(tag);
                format!(r"<{tag}>.*?</{tag}>")
            }
        }
    }

    /// Full matcher: optional anchor plus whitespace, then the block in a
    /// named `block` group.
    pub fn activation_pattern(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!(
                r"(?s){}\s+(?P<block>{})",
                regex::escape(anchor),
                self.block_pattern()
            ),
            None => format!(r"(?s)(?P<block>{})", self.block_pattern()),
        }
    }

    /// Opening delimiter as written by `wrap_fragment`.
    fn wrapper_open(&self) -> String {
        format!("{OPEN_COMMENT}\n{}", self.indent)
    }

    /// Closing delimiter as written by `wrap_fragment`.
    fn wrapper_close(&self) -> String {
        format!("\n{}{CLOSE_COMMENT}", self.indent)
    }

    /// Matcher for the opening delimiter of a wrapper this rule produced
    /// earlier, followed by the shortest block. The closing delimiter is
    /// checked separately so the block never runs past its nearest closing
    /// tag.
    pub fn wrapper_open_pattern(&self) -> String {
        format!(
            r"(?s){}(?P<block>{})",
            regex::escape(&self.wrapper_open()),
            self.block_pattern(),
        )
    }

    /// Compiles `pattern`, attributing failures to this rule.
    pub fn compile(&self, pattern: &str) -> Result<Regex, ToggleError> {
        Regex::new(pattern).map_err(|source| ToggleError::Pattern {
            rule: self.name.clone(),
            source,
        })
    }
}

impl RuleMatcher for ToggleRule {
    fn find_fragments(
        &self,
        content: &str,
        comments: &[Range<usize>],
    ) -> Result<FragmentScan, ToggleError> {
        let regex = self.compile(&self.activation_pattern())?;
        let open = self.wrapper_open();
        let mut scan = FragmentScan::default();
        let mut at = 0;

        while at < content.len() {
            let Some(block) = regex
                .captures_at(content, at)
                .and_then(|caps| caps.name("block").map(|m| m.range()))
            else {
                break;
            };

            let Some(span) = comments.iter().find(|span| span.contains(&block.start)) else {
                at = block.end;
                scan.live.push(block);
                continue;
            };

            // Our own wrapper may hold inner comments that end the span early.
            let own_wrapper = span.start + open.len() == block.start
                && content[span.start..block.start] == open;
            if own_wrapper {
                scan.commented += 1;
                at = block.end;
            } else {
                // A block running past the comment started on a tag quoted in it.
                if block.end <= span.end {
                    scan.commented += 1;
                }
                at = span.end;
            }
        }

        Ok(scan)
    }

    fn wrap_fragment(&self, block: &str) -> String {
        format!(
            "{open}{block}{close}",
            open = self.wrapper_open(),
            close = self.wrapper_close()
        )
    }

    fn find_wrapped(&self, content: &str) -> Result<Vec<(Range<usize>, Range<usize>)>, ToggleError> {
        let regex = self.compile(&self.wrapper_open_pattern())?;
        let close = self.wrapper_close();
        let mut wrappers = Vec::new();
        let mut at = 0;

        while at < content.len() {
            let Some(caps) = regex.captures_at(content, at) else {
                break;
            };
            let (Some(whole), Some(block)) = (caps.get(0), caps.name("block")) else {
                break;
            };

            if content[block.end()..].starts_with(&close) {
                let end = block.end() + close.len();
                wrappers.push((whole.start()..end, block.range()));
                at = end;
            } else {
                // Not ours: the block's closing tag is not followed by the delimiter.
                at = whole.start() + OPEN_COMMENT.len();
            }
        }

        Ok(wrappers)
    }
}

/// The rule set shipped with the tool, in application order.
///
/// Shared libraries come first, then the Spring Cloud starters, and finally
/// the whole `dependencyManagement` section. The last rule may enclose
/// wrappers produced by the earlier ones.
pub fn default_rules() -> Vec<ToggleRule> {
    const TELEPESA: &str = "com.maelcolium.telepesa";
    const SPRING_CLOUD: &str = "org.springframework.cloud";

    vec![
        ToggleRule::dependency("common-models", TELEPESA, "common-models")
            .with_anchor("<!-- Shared Libraries - Temporarily commented out for CI/CD fix -->"),
        ToggleRule::dependency("security-utils", TELEPESA, "security-utils"),
        ToggleRule::dependency("common-exceptions", TELEPESA, "common-exceptions"),
        ToggleRule::dependency(
            "spring-cloud-openfeign",
            SPRING_CLOUD,
            "spring-cloud-starter-openfeign",
        )
        .with_anchor("<!-- Spring Cloud OpenFeign for inter-service communication -->"),
        ToggleRule::dependency(
            "spring-cloud-circuitbreaker",
            SPRING_CLOUD,
            "spring-cloud-starter-circuitbreaker-resilience4j",
        )
        .with_anchor("<!-- Circuit Breaker -->"),
        ToggleRule::section("dependency-management", "dependencyManagement"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Document;

    const TWO_DEPS: &str = "<dependencies>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>alpha</artifactId>
        </dependency>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>beta</artifactId>
            <version>1.0</version>
        </dependency>
    </dependencies>";

    fn live(rule: &ToggleRule, content: &str) -> Vec<Range<usize>> {
        rule.find_fragments(content, &[]).unwrap().live
    }

    fn scan(rule: &ToggleRule, content: &str) -> FragmentScan {
        let comments = Document::new(content).comment_spans();
        rule.find_fragments(content, &comments).unwrap()
    }

    #[test]
    fn test_dependency_match_stops_at_nearest_close() {
        let rule = ToggleRule::dependency("alpha", "com.example", "alpha");
        let ranges = live(&rule, TWO_DEPS);
        assert_eq!(ranges.len(), 1);
        let block = &TWO_DEPS[ranges[0].clone()];
        assert!(block.starts_with("<dependency>"));
        assert!(block.ends_with("</dependency>"));
        assert!(!block.contains("beta"));
    }

    #[test]
    fn test_identifiers_are_literal() {
        // An unescaped '.' would let "comXexample" match.
        let content = TWO_DEPS.replace("com.example</groupId>\n            <artifactId>alpha", "comXexample</groupId>\n            <artifactId>alpha");
        let rule = ToggleRule::dependency("alpha", "com.example", "alpha");
        assert!(live(&rule, &content).is_empty());
    }

    #[test]
    fn test_anchor_required_when_set() {
        let rule = ToggleRule::dependency("beta", "com.example", "beta").with_anchor("<!-- Beta -->");
        assert!(live(&rule, TWO_DEPS).is_empty());

        let anchored = TWO_DEPS.replacen(
            "<dependency>\n            <groupId>com.example</groupId>\n            <artifactId>beta",
            "<!-- Beta -->\n        <dependency>\n            <groupId>com.example</groupId>\n            <artifactId>beta",
            1,
        );
        let ranges = scan(&rule, &anchored).live;
        assert_eq!(ranges.len(), 1);
        assert!(anchored[ranges[0].clone()].starts_with("<dependency>"));
    }

    #[test]
    fn test_section_match() {
        let content = "<project>\n    <dependencyManagement>\n        <dependencies/>\n    </dependencyManagement>\n</project>";
        let rule = ToggleRule::section("dm", "dependencyManagement");
        let ranges = live(&rule, content);
        assert_eq!(ranges.len(), 1);
        assert_eq!(
            &content[ranges[0].clone()],
            "<dependencyManagement>\n        <dependencies/>\n    </dependencyManagement>"
        );
    }

    #[test]
    fn test_tag_quoted_in_comment_does_not_hide_real_section() {
        let content = "<!-- BOM imports live in <dependencyManagement> below -->\n    <dependencyManagement>\n        <dependencies/>\n    </dependencyManagement>";
        let rule = ToggleRule::section("dm", "dependencyManagement");

        let found = scan(&rule, content);

        assert_eq!(found.commented, 0);
        assert_eq!(found.live.len(), 1);
        assert!(content[found.live[0].clone()].starts_with("<dependencyManagement>\n"));
    }

    #[test]
    fn test_commented_block_is_counted_not_returned() {
        let content = TWO_DEPS.replacen("<dependency>", "<!--\n        <dependency>", 1).replacen(
            "</dependency>",
            "</dependency>\n        -->",
            1,
        );
        let rule = ToggleRule::dependency("alpha", "com.example", "alpha");

        let found = scan(&rule, &content);

        assert_eq!(found.commented, 1);
        assert!(found.live.is_empty());
    }

    #[test]
    fn test_wrap_and_find_wrapped() {
        let rule = ToggleRule::section("dm", "dependencyManagement");
        let wrapped = rule.wrap_fragment("<dependencyManagement></dependencyManagement>");
        assert_eq!(
            wrapped,
            "<!--\n    <dependencyManagement></dependencyManagement>\n    -->"
        );

        let found = rule.find_wrapped(&wrapped).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 0..wrapped.len());
        assert_eq!(
            &wrapped[found[0].1.clone()],
            "<dependencyManagement></dependencyManagement>"
        );
    }

    #[test]
    fn test_find_wrapped_ignores_foreign_comment() {
        let rule = ToggleRule::dependency("alpha", "com.example", "alpha");
        let block = "<dependency>\n            <groupId>com.example</groupId>\n            <artifactId>alpha</artifactId>\n        </dependency>";
        let foreign = format!("<!--\n        {block} old copy, kept for reference -->\n");
        let ours = rule.wrap_fragment(block);
        let content = format!("{foreign}        {ours}\n");

        let found = rule.find_wrapped(&content).unwrap();

        assert_eq!(found.len(), 1);
        let (wrapper, inner) = found[0].clone();
        assert_eq!(&content[wrapper], ours);
        assert_eq!(&content[inner], block);
    }

    #[test]
    fn test_default_rules_order() {
        let rules = default_rules();
        assert_eq!(rules.len(), 6);
        assert_eq!(rules[0].name, "common-models");
        assert!(matches!(
            rules.last().unwrap().target,
            RuleTarget::Section { .. }
        ));
        assert_eq!(rules.last().unwrap().indent, "    ");
    }
}
