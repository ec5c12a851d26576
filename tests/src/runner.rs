//! Scenario runner.
//!
//! Each scenario gets a fresh store, a [`FixedClock`] on the scenario's start
//! date and a front desk with one administrator, [`ADMIN_USERNAME`] /
//! [`ADMIN_PASSWORD`]. Step lines are fed to the desk one at a time; the first
//! failing line ends the step with its error.
//!
//! Directives move the clock between commands:
//! - `-- @advance <days>`
//! - `-- @today <YYYY-MM-DD>`

use chrono::NaiveDate;
use circ_engine::{FixedClock, LendingEngine};
use circ_repl::{Backend, Repl};
use circ_session::Library;
use circ_store::{LendingStore, MemoryStore, SqliteStore};

use crate::assertion::StepOutput;
use crate::error::{ScenarioError, ScenarioResult};
use crate::loader::Operations;
use crate::scenario::Scenario;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";

/// Runs a scenario against a fresh library.
pub struct Runner<'s> {
    scenario: &'s Scenario,
    operations: Operations,
}

impl<'s> Runner<'s> {
    /// Create a new runner for a scenario.
    pub fn new(scenario: &'s Scenario) -> ScenarioResult<Self> {
        let operations = scenario.load_operations()?;
        Ok(Self {
            scenario,
            operations,
        })
    }

    /// Run the scenario.
    pub fn run(&self) -> ScenarioResult<()> {
        match self.scenario.store_backend() {
            Backend::Memory => self.run_on(MemoryStore::new()),
            Backend::Sqlite => self.run_on(SqliteStore::open_in_memory()?),
        }
    }

    fn run_on<S: LendingStore>(&self, store: S) -> ScenarioResult<()> {
        // 1. A library with one administrator
        let clock = FixedClock::new(self.scenario.start_date());
        let library = Library::new(LendingEngine::new(store, clock));
        library.create_admin(ADMIN_USERNAME, ADMIN_PASSWORD, None)?;
        let mut repl = Repl::new(library);

        // 2. Execute seed if present
        if let Some(seed_path) = self.scenario.seed_path() {
            let seed_ops = Operations::load(&seed_path)?;
            for step_name in seed_ops.step_names() {
                let lines = seed_ops.get_step(step_name).unwrap_or_default();
                let label = format!("seed:{}", step_name);
                run_step(&mut repl, &label, lines)?
                    .map_err(|e| ScenarioError::step_execution(&label, e))?;
            }
        }

        // 3. Execute each step and verify assertions
        for step in self.scenario.steps() {
            let lines = self
                .operations
                .get_step(&step.name)
                .ok_or_else(|| ScenarioError::step_not_found(&step.name))?;
            let result = run_step(&mut repl, &step.name, lines)?;
            step.assertion.verify(&step.name, &result)?;
        }

        Ok(())
    }
}

/// Feed a step's lines to the desk. Outputs of successive commands are joined
/// with newlines.
fn run_step<S: LendingStore>(
    repl: &mut Repl<S, FixedClock>,
    step: &str,
    lines: &str,
) -> ScenarioResult<StepOutput> {
    let mut outputs = Vec::new();
    for line in lines.lines().map(str::trim) {
        if let Some(directive) = line.strip_prefix("-- @") {
            apply_directive(repl.library().engine().clock(), step, directive)?;
            continue;
        }
        if line.is_empty() || line.starts_with("--") {
            continue;
        }
        match repl.execute(line) {
            Ok(output) if output.is_empty() => {}
            Ok(output) => outputs.push(output),
            Err(message) => return Ok(Err(message)),
        }
    }
    Ok(Ok(outputs.join("\n")))
}

fn apply_directive(clock: &FixedClock, step: &str, directive: &str) -> ScenarioResult<()> {
    let bad = || ScenarioError::bad_directive(step, directive);
    match directive.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["advance", days] => clock.advance(days.parse().map_err(|_| bad())?),
        ["today", date] => clock.set(date.parse::<NaiveDate>().map_err(|_| bad())?),
        _ => return Err(bad()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::scenario::Scenario;
    use crate::ScenarioError;

    const OPERATIONS: &str = r#"
--# login
login --admin admin admin

--# add
add-book 1111111111 "Malgudi Days" "R. K. Narayan" Fiction
add-book 2222222222 "Swami and Friends" "R. K. Narayan" Fiction

--# register
register asha pw Asha Rao asha@example.com
login asha pw

--# borrow
borrow 1111111111

--# late_return
-- @advance 16
return 1111111111
"#;

    #[test]
    fn test_runner_with_inline_operations() {
        let scenario = Scenario::new("inline")
            .operations_source(OPERATIONS)
            .unwrap()
            .step("login", |a| a.contains("administrator"))
            .step("add", |a| a.contains("Book added"))
            .step("register", |a| a.contains("Logged in as asha"))
            .step("borrow", |a| a.output("Book borrowed successfully"))
            .step("late_return", |a| a.contains("fine of ₹20"));

        scenario.run().unwrap();
    }

    #[test]
    fn test_failed_assertion_names_the_step() {
        let scenario = Scenario::new("inline")
            .operations_source(OPERATIONS)
            .unwrap()
            .step("login", |a| a.ok())
            .step("borrow", |a| a.ok());

        let err = scenario.run().unwrap_err();

        match err {
            ScenarioError::AssertionFailed { step, .. } => assert_eq!(step, "borrow"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_directive() {
        let scenario = Scenario::new("inline")
            .operations_source("--# wait\n-- @sleep 3")
            .unwrap()
            .step("wait", |a| a.ok());

        assert!(matches!(
            scenario.run(),
            Err(ScenarioError::BadDirective { .. })
        ));
    }
}
