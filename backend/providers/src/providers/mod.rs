pub mod demo;
pub mod ollama;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};
use vani_core::LlmProvider;

use self::demo::DemoProvider;
use self::ollama::OllamaProvider;

/// Which backend a session should talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    Ollama,
    Demo,
    /// Ollama when it answers, demo otherwise.
    #[default]
    Auto,
}

impl BackendChoice {
    pub const NAMES: [&'static str; 3] = ["ollama", "demo", "auto"];
}

impl FromStr for BackendChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "demo" => Ok(Self::Demo),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown backend '{other}' (use ollama, demo or auto)")),
        }
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ollama => "ollama",
            Self::Demo => "demo",
            Self::Auto => "auto",
        })
    }
}

/// Picks the backend for a new session.
///
/// `Auto` pings Ollama once; an unreachable server falls back to the demo
/// backend with a warning instead of failing every turn later.
pub async fn resolve_backend(choice: BackendChoice, ollama: OllamaProvider) -> Arc<dyn LlmProvider> {
    match choice {
        BackendChoice::Ollama => Arc::new(ollama),
        BackendChoice::Demo => Arc::new(DemoProvider::new()),
        BackendChoice::Auto => match ollama.ping().await {
            Ok(()) => {
                info!(url = %ollama.base_url(), "Ollama reachable, using local model");
                Arc::new(ollama)
            }
            Err(e) => {
                warn!(error = %e, "Ollama is not responding, falling back to demo mode");
                Arc::new(DemoProvider::new())
            }
        },
    }
}
