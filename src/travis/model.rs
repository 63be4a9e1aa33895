//! Serde model for the `jobs` section of a `.travis.yml`
//!
//! Travis is lenient about shapes (a script may be a string or a list, `env`
//! may be a list, a mapping or a string), so every loose field gets a
//! representation that normalizes at load time.

use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};

/// Shell text for one lifecycle stage.
///
/// Lists are joined with newlines when loaded; `null` becomes empty. A
/// mapping (a `deploy` provider block) is kept as its YAML text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct Script(String);

impl From<Value> for Script {
    fn from(value: Value) -> Self {
        match value {
            Value::Sequence(items) => Script(
                items
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            other => Script(scalar_to_string(&other)),
        }
    }
}

impl Script {
    pub fn new(text: impl Into<String>) -> Self {
        Script(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Travis uses a literal `skip` to disable a default stage.
    pub fn is_skip(&self) -> bool {
        self.0.trim() == "skip"
    }
}

/// The lifecycle stages of a Travis job, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    BeforeInstall,
    Install,
    BeforeScript,
    Script,
    BeforeDeploy,
    Deploy,
    AfterDeploy,
    AfterScript,
    AfterSuccess,
    AfterFailure,
}

impl LifecycleStage {
    pub const ORDER: [LifecycleStage; 10] = [
        LifecycleStage::BeforeInstall,
        LifecycleStage::Install,
        LifecycleStage::BeforeScript,
        LifecycleStage::Script,
        LifecycleStage::BeforeDeploy,
        LifecycleStage::Deploy,
        LifecycleStage::AfterDeploy,
        LifecycleStage::AfterScript,
        LifecycleStage::AfterSuccess,
        LifecycleStage::AfterFailure,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LifecycleStage::BeforeInstall => "before_install",
            LifecycleStage::Install => "install",
            LifecycleStage::BeforeScript => "before_script",
            LifecycleStage::Script => "script",
            LifecycleStage::BeforeDeploy => "before_deploy",
            LifecycleStage::Deploy => "deploy",
            LifecycleStage::AfterDeploy => "after_deploy",
            LifecycleStage::AfterScript => "after_script",
            LifecycleStage::AfterSuccess => "after_success",
            LifecycleStage::AfterFailure => "after_failure",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LifecycleStage::BeforeInstall => "Before install:",
            LifecycleStage::Install => "Install:",
            LifecycleStage::BeforeScript => "Before script:",
            LifecycleStage::Script => "Script:",
            LifecycleStage::BeforeDeploy => "Before deploy:",
            LifecycleStage::Deploy => "Deploy:",
            LifecycleStage::AfterDeploy => "After deploy:",
            LifecycleStage::AfterScript => "After script:",
            LifecycleStage::AfterSuccess => "After success:",
            LifecycleStage::AfterFailure => "After failure:",
        }
    }
}

/// One `env` item: a `NAME: value` mapping or a `NAME=value` string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnvEntry {
    Vars(Mapping),
    Assignment(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnvSpec {
    List(Vec<EnvEntry>),
    Single(EnvEntry),
}

impl Default for EnvSpec {
    fn default() -> Self {
        EnvSpec::List(Vec::new())
    }
}

impl EnvSpec {
    pub fn entries(&self) -> &[EnvEntry] {
        match self {
            EnvSpec::List(entries) => entries,
            EnvSpec::Single(entry) => std::slice::from_ref(entry),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_exports().is_empty()
    }

    /// `export NAME="value"` lines in declaration order.
    pub fn to_exports(&self) -> Vec<String> {
        let mut exports = Vec::new();
        for entry in self.entries() {
            match entry {
                EnvEntry::Vars(vars) => {
                    for (name, value) in vars {
                        exports.push(format!(
                            "export {}=\"{}\"",
                            scalar_to_string(name),
                            scalar_to_string(value)
                        ));
                    }
                }
                EnvEntry::Assignment(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    match text.split_once('=') {
                        Some((name, value)) => {
                            let value = value.trim_matches(|c| c == '"' || c == '\'');
                            exports.push(format!("export {}=\"{}\"", name.trim(), value));
                        }
                        None => exports.push(format!("export {}", text)),
                    }
                }
            }
        }
        exports
    }
}

/// `allow_failures` is either a flag or a list of job matchers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AllowFailures {
    Flag(bool),
    Jobs(Vec<Mapping>),
}

impl Default for AllowFailures {
    fn default() -> Self {
        AllowFailures::Flag(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Job {
    #[serde(deserialize_with = "scalar_string")]
    pub stage: String,
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub python: String,
    pub env: EnvSpec,
    pub workspaces: Mapping,
    pub before_install: Script,
    pub install: Script,
    pub before_script: Script,
    pub script: Script,
    pub before_deploy: Script,
    pub deploy: Script,
    pub after_deploy: Script,
    pub after_script: Script,
    pub after_success: Script,
    pub after_failure: Script,
}

impl Job {
    pub fn lifecycle(&self, stage: LifecycleStage) -> &Script {
        match stage {
            LifecycleStage::BeforeInstall => &self.before_install,
            LifecycleStage::Install => &self.install,
            LifecycleStage::BeforeScript => &self.before_script,
            LifecycleStage::Script => &self.script,
            LifecycleStage::BeforeDeploy => &self.before_deploy,
            LifecycleStage::Deploy => &self.deploy,
            LifecycleStage::AfterDeploy => &self.after_deploy,
            LifecycleStage::AfterScript => &self.after_script,
            LifecycleStage::AfterSuccess => &self.after_success,
            LifecycleStage::AfterFailure => &self.after_failure,
        }
    }
}

/// The job matrix. Only `include` is rendered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Jobs {
    pub include: Vec<Job>,
    pub exclude: Vec<Job>,
    pub allow_failures: AllowFailures,
    pub fast_finish: bool,
}

/// Renders a YAML scalar the way it reads in the source file.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}
