use std::collections::HashMap;

use crate::env::interpolator::parse_vars;
use crate::state::environment::EnvironmentDef;

/// Substitutes `{{key}}` tokens from the active environment.
///
/// Keys are matched as literal text, never as patterns. Disabled variables
/// are invisible. When `variables` holds duplicate keys the later entry wins
/// (last-write-wins in list order). Unresolved tokens stay verbatim —
/// resolution never fails on a missing key.
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    vars: HashMap<String, String>,
}

impl VariableResolver {
    pub fn from_environment(environment: Option<&EnvironmentDef>) -> Self {
        let mut vars = HashMap::new();
        if let Some(env) = environment {
            for var in env.variables.iter().filter(|v| v.enabled) {
                vars.insert(var.key.clone(), var.value.clone());
            }
        }
        Self { vars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace every `{{key}}` occurrence with its value; splice the rest of
    /// the input through untouched.
    pub fn resolve(&self, input: &str) -> String {
        let spans = parse_vars(input);
        if spans.is_empty() || self.vars.is_empty() {
            return input.to_string();
        }

        let mut output = String::with_capacity(input.len());
        let mut last = 0;

        for (start, end, name) in &spans {
            output.push_str(&input[last..*start]);
            if let Some(value) = self.vars.get(name) {
                output.push_str(value);
            } else {
                // Keep the original placeholder text for unresolved vars
                output.push_str(&input[*start..*end]);
            }
            last = *end;
        }

        output.push_str(&input[last..]);
        output
    }
}
