//! Suites: scenarios plus the configuration to launch their target.
//!
//! Suites can be written in code or loaded from JSON:
//!
//! ```json
//! {
//!   "spawn": { "command": "cargo", "args": ["run", "--", "--default-config"] },
//!   "session": { "settle_ms": 100, "timeout_secs": 60 },
//!   "scenarios": {
//!     "arithmetic": [
//!       { "send": "let a = 2;" },
//!       { "check": "a + a", "equals": "4" },
//!       { "check": "z", "matches": "cannot find value `z`" }
//!     ]
//!   }
//! }
//! ```
//!
//! A `spawn.env` given in the file replaces the default environment, so it
//! should include `NO_COLOR` if the target colors its output.

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use super::{Expected, Scenario, Step};
use crate::driver::{SessionBuilder, SessionConfig};
use crate::error::{Result, ScenarioError};
use crate::transport::SpawnConfig;

/// Session overrides as written in a suite file.
///
/// Unset fields keep the [`SessionConfig`] defaults. An empty
/// `response_marker` disables marker stripping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSettings {
    /// Literal prefix of the idle prompt line.
    pub prompt_marker: Option<String>,

    /// Marker stripped from the front of each response; `""` for none.
    pub response_marker: Option<String>,

    /// Appended to every input line.
    pub line_terminator: Option<String>,

    /// Quiet period in milliseconds before a partial line is complete.
    pub settle_ms: Option<u64>,

    /// Limit in seconds for startup and for each step.
    pub timeout_secs: Option<u64>,
}

impl SessionSettings {
    /// Apply these overrides on top of `config`.
    pub fn apply(&self, config: &mut SessionConfig) {
        if let Some(ref marker) = self.prompt_marker {
            config.prompt_marker = marker.clone();
        }
        if let Some(ref marker) = self.response_marker {
            config.response_marker = (!marker.is_empty()).then(|| marker.clone());
        }
        if let Some(ref terminator) = self.line_terminator {
            config.line_terminator = terminator.clone();
        }
        if let Some(ms) = self.settle_ms {
            config.settle = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Some(Duration::from_secs(secs));
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFile {
    #[serde(default)]
    spawn: SpawnConfig,
    #[serde(default)]
    session: SessionSettings,
    scenarios: IndexMap<String, Vec<StepFile>>,
}

// Each shape rejects extra keys, so a step mixing two shapes fails to parse.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EqualsStep {
    check: String,
    equals: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchesStep {
    check: String,
    matches: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SendStep {
    send: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StepFile {
    Equals(EqualsStep),
    Matches(MatchesStep),
    Send(SendStep),
}

impl StepFile {
    fn into_step(self) -> std::result::Result<Step, ScenarioError> {
        Ok(match self {
            Self::Equals(step) => Step::Check {
                input: step.check,
                expected: Expected::Exact(step.equals),
            },
            Self::Matches(step) => Step::Check {
                input: step.check,
                expected: Expected::pattern(&step.matches)?,
            },
            Self::Send(step) => Step::Send(step.send),
        })
    }
}

/// Scenarios and the configuration to run them.
#[derive(Debug, Clone)]
pub struct Suite {
    /// How to launch the target.
    pub spawn: SpawnConfig,

    /// Protocol settings.
    pub session: SessionConfig,

    /// Scenarios in execution order, keyed by name.
    pub scenarios: IndexMap<String, Scenario>,
}

impl Suite {
    /// Create an empty suite for `spawn`.
    pub fn new(spawn: SpawnConfig) -> Self {
        Self {
            spawn,
            session: SessionConfig::default(),
            scenarios: IndexMap::new(),
        }
    }

    /// Add a scenario, replacing any with the same name.
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.insert(scenario.name.clone(), scenario);
        self
    }

    /// Parse a suite from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: SuiteFile = serde_json::from_str(text).map_err(ScenarioError::Parse)?;

        let mut session = SessionConfig::default();
        file.session.apply(&mut session);

        let mut scenarios = IndexMap::with_capacity(file.scenarios.len());
        for (name, steps) in file.scenarios {
            let steps = steps
                .into_iter()
                .map(StepFile::into_step)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            scenarios.insert(name.clone(), Scenario { name, steps });
        }

        Ok(Self {
            spawn: file.spawn,
            session,
            scenarios,
        })
    }

    /// Load a suite from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading suite from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Get a scenario by name.
    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.get(name)
    }

    /// Scenarios to run: all of them when `names` is empty, else those named.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Scenario>> {
        if names.is_empty() {
            return Ok(self.scenarios.values().collect());
        }
        names
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| {
                    ScenarioError::UnknownScenario { name: name.clone() }.into()
                })
            })
            .collect()
    }

    /// A session builder carrying this suite's configuration.
    pub fn session_builder(&self) -> SessionBuilder {
        SessionBuilder::from_spawn_config(self.spawn.clone()).session_config(self.session.clone())
    }
}
