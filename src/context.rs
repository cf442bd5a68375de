use std::path::PathBuf;

/// Runtime facts that decide which plugins apply and where they are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    /// Current environment (e.g. `prod`). `None` accepts every plugin's env list.
    pub env: Option<String>,
    /// Current agent role, consulted only when `is_agent` is set.
    pub agent: Option<String>,
    /// Whether the host process runs in the agent role.
    pub is_agent: bool,
    /// Framework identifier matched against a manifest's `plugin.framework`.
    pub framework: Option<String>,
    /// Starting point for locating installed packages.
    pub cwd: PathBuf,
    /// Base directory for `path` entries.
    pub base: PathBuf,
}

impl ResolveContext {
    /// A context with no environment, role or framework restrictions.
    pub fn new(cwd: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        Self {
            env: None,
            agent: None,
            is_agent: false,
            framework: None,
            cwd: cwd.into(),
            base: base.into(),
        }
    }

    /// Set the current environment. An empty name leaves it unset.
    #[must_use]
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into()).filter(|e| !e.is_empty());
        self
    }

    /// Run in the agent role, optionally as a specific agent.
    ///
    /// An empty role name counts as no role.
    #[must_use]
    pub fn as_agent(mut self, agent: Option<String>) -> Self {
        self.is_agent = true;
        self.agent = agent.filter(|a| !a.is_empty());
        self
    }

    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    /// File name of the entry point for the current role.
    #[must_use]
    pub fn entry_file(&self) -> &'static str {
        if self.is_agent {
            "agent.json"
        } else {
            "app.json"
        }
    }
}
