//! Assertion types and builders for verifying step results.
//!
//! A step result is the front desk's text output, or the error message it
//! printed.

use crate::error::{ScenarioError, ScenarioResult};

/// What a step produced: its output, or the user-facing error.
pub type StepOutput = Result<String, String>;

/// A complete assertion for a step result.
#[derive(Default)]
pub struct Assertion {
    // Output assertions
    pub output: Option<String>,
    pub contains: Vec<String>,
    pub excludes: Vec<String>,

    // Table assertions
    pub rows: Option<usize>,
    pub empty: Option<bool>,

    // Error assertions
    pub error: Option<String>,
    pub error_pattern: Option<String>,

    // Custom assertion function
    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&str) -> bool + Send + Sync>>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("output", &self.output)
            .field("contains", &self.contains)
            .field("excludes", &self.excludes)
            .field("rows", &self.rows)
            .field("empty", &self.empty)
            .field("error", &self.error)
            .field("error_pattern", &self.error_pattern)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Assertion {
    /// Create a new empty assertion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the assertion against a result.
    pub fn verify(&self, step: &str, result: &StepOutput) -> ScenarioResult<()> {
        if let Some(ref expected_error) = self.error {
            return match result {
                Err(msg) if msg.contains(expected_error.as_str()) => Ok(()),
                Err(msg) => Err(ScenarioError::assertion_failed(
                    step,
                    format!(
                        "expected error containing '{}', got: {}",
                        expected_error, msg
                    ),
                )),
                Ok(_) => Err(ScenarioError::assertion_failed(
                    step,
                    format!(
                        "expected error containing '{}', but step succeeded",
                        expected_error
                    ),
                )),
            };
        }

        if let Some(ref pattern) = self.error_pattern {
            let re = regex_lite::Regex::new(pattern).map_err(|e| {
                ScenarioError::assertion_failed(step, format!("invalid regex pattern: {}", e))
            })?;
            return match result {
                Err(msg) if re.is_match(msg) => Ok(()),
                Err(msg) => Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error matching '{}', got: {}", pattern, msg),
                )),
                Ok(_) => Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error matching '{}', but step succeeded", pattern),
                )),
            };
        }

        let output = result
            .as_ref()
            .map_err(|msg| ScenarioError::assertion_failed(step, format!("step failed: {}", msg)))?;

        if let Some(ref custom) = self.custom {
            if !custom(output) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    "custom assertion failed",
                ));
            }
        }

        self.verify_output(step, output)
    }

    fn verify_output(&self, step: &str, output: &str) -> ScenarioResult<()> {
        if let Some(ref expected) = self.output {
            if output != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected output '{}', got '{}'", expected, output),
                ));
            }
        }

        for needle in &self.contains {
            if !output.contains(needle.as_str()) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected output containing '{}', got:\n{}", needle, output),
                ));
            }
        }

        for needle in &self.excludes {
            if output.contains(needle.as_str()) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected output without '{}', got:\n{}", needle, output),
                ));
            }
        }

        let rows = table_rows(output);
        if let Some(expected) = self.rows {
            if rows != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected {} rows, got {}:\n{}", expected, rows, output),
                ));
            }
        }

        match self.empty {
            Some(true) if rows != 0 => Err(ScenarioError::assertion_failed(
                step,
                format!("expected no rows, got {}", rows),
            )),
            Some(false) if rows == 0 => {
                Err(ScenarioError::assertion_failed(step, "expected rows, got none"))
            }
            _ => Ok(()),
        }
    }
}

/// Rows of the last table in `output`: lines after its dashed rule.
pub fn table_rows(output: &str) -> usize {
    let lines: Vec<&str> = output.lines().collect();
    let rule = lines.iter().rposition(|line| {
        !line.is_empty() && line.starts_with('-') && line.chars().all(|c| c == '-' || c == ' ')
    });
    match rule {
        Some(index) => lines[index + 1..]
            .iter()
            .take_while(|line| !line.trim().is_empty())
            .count(),
        None => 0,
    }
}

/// Builder for fluent assertion construction.
pub struct AssertionBuilder {
    assertion: Assertion,
}

impl AssertionBuilder {
    /// Create a new assertion builder.
    pub fn new() -> Self {
        Self {
            assertion: Assertion::new(),
        }
    }

    /// Build the assertion.
    pub fn build(self) -> Assertion {
        self.assertion
    }

    // ========== Output assertions ==========

    /// Assert that the step succeeds. Equivalent to an empty builder.
    pub fn ok(self) -> Self {
        self
    }

    /// Assert the exact output text.
    pub fn output(mut self, text: impl Into<String>) -> Self {
        self.assertion.output = Some(text.into());
        self
    }

    /// Assert that the output contains the given text.
    pub fn contains(mut self, text: impl Into<String>) -> Self {
        self.assertion.contains.push(text.into());
        self
    }

    /// Assert that the output does not contain the given text.
    pub fn excludes(mut self, text: impl Into<String>) -> Self {
        self.assertion.excludes.push(text.into());
        self
    }

    // ========== Table assertions ==========

    /// Assert that the listing has exactly N rows.
    pub fn rows(mut self, n: usize) -> Self {
        self.assertion.rows = Some(n);
        self
    }

    /// Assert that the listing is empty.
    pub fn empty(mut self) -> Self {
        self.assertion.empty = Some(true);
        self
    }

    /// Assert that the listing is not empty.
    pub fn not_empty(mut self) -> Self {
        self.assertion.empty = Some(false);
        self
    }

    // ========== Error assertions ==========

    /// Assert that the step fails with an error containing the given string.
    pub fn error(mut self, contains: impl Into<String>) -> Self {
        self.assertion.error = Some(contains.into());
        self
    }

    /// Assert that the step fails with an error matching the given regex.
    pub fn error_matches(mut self, pattern: impl Into<String>) -> Self {
        self.assertion.error_pattern = Some(pattern.into());
        self
    }

    // ========== Advanced ==========

    /// Custom assertion function over the output text.
    pub fn assert_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.assertion.custom = Some(Box::new(f));
        self
    }
}

impl Default for AssertionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "ISBN        Title\n----------  -----\n1111111111  Dune\n2222222222  Emma";

    #[test]
    fn test_table_rows() {
        assert_eq!(table_rows(TABLE), 2);
        assert_eq!(table_rows("No books found"), 0);
        let transactions = "Asha Rao (asha, m1) Active\nActive borrows: 0\nTxn\n---\nt1";
        assert_eq!(table_rows(transactions), 1);
    }

    #[test]
    fn test_error_expectations() {
        let expects_error = AssertionBuilder::new().error("overdue").build();

        assert!(expects_error
            .verify("s", &Err("Cannot borrow new books while you have overdue items".into()))
            .is_ok());
        assert!(expects_error.verify("s", &Ok(String::new())).is_err());

        let expects_ok = AssertionBuilder::new().ok().build();
        assert!(expects_ok.verify("s", &Err("boom".into())).is_err());
    }

    #[test]
    fn test_output_expectations() {
        let assertion = AssertionBuilder::new()
            .contains("Dune")
            .excludes("Borrowed")
            .rows(2)
            .build();

        assert!(assertion.verify("s", &Ok(TABLE.into())).is_ok());

        let wrong_count = AssertionBuilder::new().rows(3).build();
        assert!(matches!(
            wrong_count.verify("s", &Ok(TABLE.into())),
            Err(ScenarioError::AssertionFailed { .. })
        ));
    }
}
