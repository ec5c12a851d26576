//! Loader for operations files.
//!
//! Operations files hold front desk commands grouped under step markers
//! (`--# step_name`). Inside a step, `--` starts a comment and `-- @` a
//! runner directive (see [`crate::runner`]).

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ScenarioError, ScenarioResult};

/// A parsed operations file.
#[derive(Debug, Clone)]
pub struct Operations {
    /// Map of step name to its command lines.
    pub steps: HashMap<String, String>,
    /// Steps in order of appearance.
    pub step_order: Vec<String>,
}

impl Operations {
    /// Parse an operations file from a string.
    pub fn parse(source: &str) -> ScenarioResult<Self> {
        let mut steps = HashMap::new();
        let mut step_order = Vec::new();
        let mut current_step: Option<String> = None;
        let mut current_content = String::new();

        for line in source.lines() {
            let trimmed = line.trim();

            if let Some(suffix) = trimmed.strip_prefix("--#") {
                if let Some(step_name) = current_step.take() {
                    steps.insert(step_name, current_content.trim().to_string());
                }

                let step_name = suffix.trim().to_string();
                if step_name.is_empty() {
                    return Err(ScenarioError::operations_parse(
                        "<inline>",
                        "empty step name after --#",
                    ));
                }
                if step_order.contains(&step_name) {
                    return Err(ScenarioError::operations_parse(
                        "<inline>",
                        format!("duplicate step '{}'", step_name),
                    ));
                }
                step_order.push(step_name.clone());
                current_step = Some(step_name);
                current_content = String::new();
            } else if current_step.is_some() {
                current_content.push_str(trimmed);
                current_content.push('\n');
            }
            // Lines before the first step marker are file-level comments.
        }

        if let Some(step_name) = current_step {
            steps.insert(step_name, current_content.trim().to_string());
        }

        Ok(Self { steps, step_order })
    }

    /// Load and parse an operations file from disk.
    pub fn load(path: &Path) -> ScenarioResult<Self> {
        let source =
            std::fs::read_to_string(path).map_err(|e| ScenarioError::file_read(path, e))?;
        Self::parse(&source).map_err(|e| ScenarioError::operations_parse(path, e.to_string()))
    }

    /// The command lines for a step.
    pub fn get_step(&self, name: &str) -> Option<&str> {
        self.steps.get(name).map(|s| s.as_str())
    }

    /// All step names in order.
    pub fn step_names(&self) -> &[String] {
        &self.step_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps_in_order() {
        let source = r#"
-- file comment, ignored
--# login
login asha pw

--# borrow
-- @advance 3
borrow 1111111111
"#;

        let ops = Operations::parse(source).unwrap();

        assert_eq!(ops.step_names(), ["login", "borrow"]);
        assert_eq!(ops.get_step("login"), Some("login asha pw"));
        assert_eq!(
            ops.get_step("borrow"),
            Some("-- @advance 3\nborrow 1111111111")
        );
        assert_eq!(ops.get_step("missing"), None);
    }

    #[test]
    fn test_parse_rejects_bad_markers() {
        assert!(Operations::parse("--#\nbooks").is_err());
        assert!(Operations::parse("--# a\nbooks\n--# a\nbooks").is_err());
    }
}
