use pom_toggle::builders::rules::{ToggleRule, default_rules};
use pom_toggle::core::config::{ConfigManager, ConfigProvider, ToggleConfig};
use pom_toggle::utils::{self, RunOptions};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const POM: &str = include_str!("fixtures/notification-pom.xml");

fn setup_project(pom: &str, rules: Vec<ToggleRule>) -> (TempDir, ConfigManager, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let pom_path = root.join("pom.xml");
    fs::write(&pom_path, pom).unwrap();

    let config_manager = ConfigManager::new_at(root).unwrap();
    let config = ToggleConfig {
        rules,
        ..ToggleConfig::default()
    };
    config_manager.save_config(&config).unwrap();
    (dir, config_manager, pom_path)
}

/// Text strictly between the delimiters of the wrapper that starts at `open`.
fn wrapped_interior<'a>(content: &'a str, open: usize, indent: &str) -> &'a str {
    let start = open + "<!--\n".len() + indent.len();
    let close = content[start..]
        .find(&format!("\n{indent}-->"))
        .expect("wrapper should be closed");
    &content[start..start + close]
}

#[test]
fn test_end_to_end_single_dependency() {
    let pom = "<project>
    <dependencies>
        <dependency>
            <groupId>com.example.foo</groupId>
            <artifactId>security-utils</artifactId>
        </dependency>
    </dependencies>
</project>
";
    let expected = "<project>
    <dependencies>
        <!--
        <dependency>
            <groupId>com.example.foo</groupId>
            <artifactId>security-utils</artifactId>
        </dependency>
        -->
    </dependencies>
</project>
";
    let rules = vec![ToggleRule::dependency(
        "security-utils",
        "com.example.foo",
        "security-utils",
    )];
    let (_dir, config_manager, pom_path) = setup_project(pom, rules);

    let report = utils::toggle_with(&config_manager, &RunOptions::default()).unwrap();

    assert!(report.written);
    assert_eq!(fs::read_to_string(&pom_path).unwrap(), expected);
}

#[test]
fn test_no_match_leaves_document_identical() {
    let pom = "<project>\n    <dependencies>\n        <dependency>\n            <groupId>org.slf4j</groupId>\n            <artifactId>slf4j-api</artifactId>\n        </dependency>\n    </dependencies>\n</project>\n";
    let (_dir, config_manager, pom_path) = setup_project(pom, default_rules());

    let report = utils::toggle_with(&config_manager, &RunOptions::default()).unwrap();

    assert!(!report.changed());
    assert_eq!(report.unmatched().count(), 6);
    assert_eq!(fs::read_to_string(&pom_path).unwrap(), pom);
}

#[test]
fn test_untargeted_lines_survive_byte_for_byte() {
    let (_dir, config_manager, pom_path) = setup_project(POM, default_rules());

    utils::toggle_with(&config_manager, &RunOptions::default()).unwrap();
    let output = fs::read_to_string(&pom_path).unwrap();

    // Dropping the inserted delimiter lines must give back the original lines.
    let stripped: Vec<&str> = output
        .lines()
        .filter(|line| !matches!(line.trim(), "<!--" | "-->"))
        .collect();
    let original: Vec<&str> = POM.lines().collect();
    assert_eq!(stripped, original);
}

#[test]
fn test_wrapped_content_is_preserved() {
    let (_dir, config_manager, pom_path) = setup_project(POM, default_rules());

    utils::toggle_with(&config_manager, &RunOptions::default()).unwrap();
    let output = fs::read_to_string(&pom_path).unwrap();

    for artifact in ["common-models", "security-utils", "common-exceptions"] {
        let original_start = POM
            .find(&format!(
                "<dependency>\n            <groupId>com.maelcolium.telepesa</groupId>\n            <artifactId>{artifact}</artifactId>"
            ))
            .unwrap();
        let original_end = original_start + POM[original_start..].find("</dependency>").unwrap()
            + "</dependency>".len();
        let original_block = &POM[original_start..original_end];

        let artifact_line = output
            .find(&format!("<artifactId>{artifact}</artifactId>"))
            .unwrap();
        let open = output[..artifact_line].rfind("<!--\n").unwrap();
        assert_eq!(wrapped_interior(&output, open, "        "), original_block);
    }
}

#[test]
fn test_section_wrap_keeps_inner_wrappers() {
    let pom = "<project>
    <dependencyManagement>
        <dependencies>
        <dependency>
            <groupId>com.maelcolium.telepesa</groupId>
            <artifactId>security-utils</artifactId>
            <version>1.0.0</version>
        </dependency>
        </dependencies>
    </dependencyManagement>
</project>
";
    let (_dir, config_manager, pom_path) = setup_project(pom, default_rules());

    utils::toggle_with(&config_manager, &RunOptions::default()).unwrap();
    let output = fs::read_to_string(&pom_path).unwrap();

    let outer = output.find("<!--\n    <dependencyManagement>").unwrap();
    let inner = output.find("<!--\n        <dependency>").unwrap();
    assert!(outer < inner);
    assert_eq!(output.matches("<!--").count(), 2);
    assert_eq!(output.matches("-->").count(), 2);
    assert!(output.ends_with("</dependency>\n        -->\n        </dependencies>\n    </dependencyManagement>\n    -->\n</project>\n"));

    // A rerun must not wrap the section or the inner dependency again.
    let report = utils::toggle_with(&config_manager, &RunOptions::default()).unwrap();
    assert!(!report.changed());
    assert_eq!(fs::read_to_string(&pom_path).unwrap(), output);
}

#[test]
fn test_restore_round_trip() {
    let (_dir, config_manager, pom_path) = setup_project(POM, default_rules());

    utils::toggle_with(&config_manager, &RunOptions::default()).unwrap();
    assert_ne!(fs::read_to_string(&pom_path).unwrap(), POM);

    let report = utils::restore_with(&config_manager, &RunOptions::default()).unwrap();

    assert_eq!(report.total_applied(), 6);
    assert_eq!(fs::read_to_string(&pom_path).unwrap(), POM);
}

#[test]
fn test_file_option_overrides_target() {
    let (dir, config_manager, pom_path) = setup_project(POM, default_rules());
    let other = dir.path().join("other.xml");
    fs::write(&other, POM).unwrap();

    let options = RunOptions {
        file: Some(PathBuf::from("other.xml")),
        ..RunOptions::default()
    };
    utils::toggle_with(&config_manager, &options).unwrap();

    assert_eq!(fs::read_to_string(&pom_path).unwrap(), POM);
    assert_ne!(fs::read_to_string(&other).unwrap(), POM);
}

#[test]
fn test_config_option_selects_rule_file() {
    let (dir, _default_manager, pom_path) = setup_project(POM, default_rules());
    let ci_rules = ToggleConfig {
        rules: vec![ToggleRule::dependency(
            "security-utils",
            "com.maelcolium.telepesa",
            "security-utils",
        )],
        ..ToggleConfig::default()
    };
    fs::write(
        dir.path().join("ci-rules.toml"),
        toml::to_string_pretty(&ci_rules).unwrap(),
    )
    .unwrap();

    let options = RunOptions {
        config: Some(PathBuf::from("ci-rules.toml")),
        ..RunOptions::default()
    };
    let config_manager = utils::config_manager_for(dir.path().to_path_buf(), &options).unwrap();
    assert_eq!(
        config_manager.get_config_path().unwrap(),
        dir.path().join("ci-rules.toml")
    );

    let report = utils::toggle_with(&config_manager, &options).unwrap();

    let applied: Vec<_> = report.outcomes.iter().map(|o| o.rule.as_str()).collect();
    assert_eq!(applied, vec!["security-utils"]);
    assert_eq!(report.total_applied(), 1);

    let output = fs::read_to_string(&pom_path).unwrap();
    assert!(output.contains(
        "<!--\n        <dependency>\n            <groupId>com.maelcolium.telepesa</groupId>\n            <artifactId>security-utils</artifactId>"
    ));
    // Rules from the default pom-toggle.toml were not used.
    assert!(!output.contains("<!--\n    <dependencyManagement>"));
    assert!(!output.contains(
        "<!--\n        <dependency>\n            <groupId>com.maelcolium.telepesa</groupId>\n            <artifactId>common-models</artifactId>"
    ));
}

#[test]
fn test_missing_target_fails() {
    let (_dir, config_manager, pom_path) = setup_project(POM, default_rules());
    fs::remove_file(&pom_path).unwrap();

    let result = utils::toggle_with(&config_manager, &RunOptions::default());

    assert!(result.is_err(), "a missing POM must abort the run");
    assert!(!pom_path.exists());
}
