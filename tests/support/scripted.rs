// ABOUTME: StepExecutor double that records every command and answers from a script.
// ABOUTME: Failures are keyed on a substring of the rendered command line.

use async_trait::async_trait;
use deployline::exec::{CommandSpec, ExecError, StepExecutor, StepOutput};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Scripted reply for commands whose rendered form contains `pattern`.
#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    stderr: String,
    /// Remaining failures; `None` fails forever.
    remaining: Option<u32>,
}

/// Records calls in order; every command succeeds unless a rule matches.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    calls: Mutex<Vec<CommandSpec>>,
    rules: Mutex<Vec<Rule>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `pattern` exit 1 with `stderr`.
    pub fn fail_on(self, pattern: &str, stderr: &str) -> Self {
        self.rules.lock().push(Rule {
            pattern: pattern.to_string(),
            stderr: stderr.to_string(),
            remaining: None,
        });
        self
    }

    /// Commands containing `pattern` fail `times` times, then succeed.
    pub fn fail_times(self, pattern: &str, times: u32, stderr: &str) -> Self {
        self.rules.lock().push(Rule {
            pattern: pattern.to_string(),
            stderr: stderr.to_string(),
            remaining: Some(times),
        });
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Rendered command lines, in call order.
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(pattern)).count()
    }
}

#[async_trait]
impl StepExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<StepOutput, ExecError> {
        self.calls.lock().push(spec.clone());
        if cancel.is_cancelled() {
            return Err(ExecError::Cancelled {
                program: spec.program().to_string(),
            });
        }

        let line = spec.to_string();
        let mut rules = self.rules.lock();
        for rule in rules.iter_mut() {
            if !line.contains(&rule.pattern) {
                continue;
            }
            match rule.remaining.as_mut() {
                Some(0) => continue,
                Some(n) => *n -= 1,
                None => {}
            }
            return Err(ExecError::NonZeroExit {
                program: spec.program().to_string(),
                code: Some(1),
                stdout: String::new(),
                stderr: rule.stderr.clone(),
            });
        }
        Ok(StepOutput::default())
    }
}
