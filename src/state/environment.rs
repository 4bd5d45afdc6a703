use serde::{Deserialize, Serialize};

use crate::ident::new_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub key: String,
    pub value: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,
}

impl EnvVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
            secret: false,
        }
    }
}

/// Key uniqueness within `variables` is not enforced; resolution applies
/// last-write-wins over list order (see `env::resolver`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDef {
    pub id: String,
    pub name: String,
    pub variables: Vec<EnvVariable>,
}

impl EnvironmentDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            variables: Vec::new(),
        }
    }

    /// The environment every fresh document starts with.
    pub fn default_environment() -> Self {
        Self {
            id: String::from("env-default"),
            name: String::from("Default"),
            variables: Vec::new(),
        }
    }

    pub fn duplicated(&self) -> Self {
        Self {
            id: new_id(),
            name: format!("{} (Copy)", self.name),
            variables: self.variables.clone(),
        }
    }

    pub fn apply(&mut self, update: EnvironmentUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(variables) = update.variables {
            self.variables = variables;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentUpdate {
    pub name: Option<String>,
    pub variables: Option<Vec<EnvVariable>>,
}
