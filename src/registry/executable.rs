// src/registry/executable.rs

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::errors::{BuildError, Result};
use crate::registry::context::TaskContext;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]+$").expect("valid name pattern"));

/// Body of an executable.
///
/// Bodies receive the invocation context and report failures as
/// `anyhow::Error`, which keeps whatever context chain the body attached.
pub type Callable = Arc<dyn Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Fail with [`BuildError::InvalidName`] unless `name` is a valid identifier.
pub fn validate_name(name: &str) -> Result<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(BuildError::InvalidName(name.to_string()))
    }
}

/// A named callable plus its description and declared parameters.
#[derive(Clone)]
pub struct Executable {
    name: String,
    description: String,
    parameters: Vec<String>,
    body: Callable,
}

impl Executable {
    /// Wrap `body` under `name`; the name is validated here.
    pub fn new(name: impl Into<String>, body: Callable) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            description: String::new(),
            parameters: Vec::new(),
            body,
        })
    }

    /// Convenience constructor taking a closure.
    pub fn from_fn<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(name, Arc::new(body))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declare the context bindings this body relies on.
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Bind every declared parameter from `ctx` and invoke the body.
    pub fn execute(&self, ctx: &mut TaskContext<'_>) -> Result<()> {
        if let Some(missing) = self.parameters.iter().find(|p| !ctx.binds(p)) {
            return Err(BuildError::InvalidParameter {
                executable: self.name.clone(),
                parameter: missing.clone(),
            });
        }
        (self.body)(ctx)?;
        Ok(())
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
