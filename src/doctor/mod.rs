//! Doctor command for service diagnostics
//!
//! Checks that everything the answer pipeline talks to is reachable before a
//! question is asked.

use colored::Colorize;
use std::path::Path;

use crate::bootstrap;
use crate::config::{Config, EmbeddingProvider, StoreProvider};
use crate::rag::retrieval::memory::split_passages;
use crate::rag::retrieval::qdrant;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
}

impl Doctor {
    /// Create a new doctor instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let installed = self.installed_models().await;

        let mut checks = vec![
            self.check_config(),
            self.check_ollama_api(&installed),
            self.check_generation_model(&installed),
            self.check_embedding_backend(&installed),
        ];
        checks.push(self.check_passage_store().await);

        checks
    }

    /// Installed Ollama models, or why they could not be listed
    async fn installed_models(&self) -> Result<Vec<String>, String> {
        let generator = bootstrap::build_generator(&self.config).map_err(|e| e.to_string())?;
        generator.list_models().await.map_err(|e| e.to_string())
    }

    /// Check 1: configuration is usable
    fn check_config(&self) -> HealthCheck {
        match self.config.validate() {
            Ok(()) => HealthCheck::new("Configuration", HealthStatus::Pass),
            Err(e) => HealthCheck::new("Configuration", HealthStatus::Fail(e.to_string())),
        }
    }

    /// Check 2: Ollama API reachable
    fn check_ollama_api(&self, installed: &Result<Vec<String>, String>) -> HealthCheck {
        match installed {
            Ok(_) => HealthCheck::new("Ollama API", HealthStatus::Pass),
            Err(e) => HealthCheck::new(
                "Ollama API",
                HealthStatus::Fail(format!("{} not reachable: {}", self.config.ollama.base_url, e)),
            ),
        }
    }

    /// Check 3: generation model pulled
    fn check_generation_model(&self, installed: &Result<Vec<String>, String>) -> HealthCheck {
        model_check("Generation Model", &self.config.ollama.model, installed)
    }

    /// Check 4: embedding backend usable
    fn check_embedding_backend(&self, installed: &Result<Vec<String>, String>) -> HealthCheck {
        match self.config.embedding.provider {
            EmbeddingProvider::Ollama => {
                model_check("Embedding Model", &self.config.embedding.model, installed)
            }
            EmbeddingProvider::Local => HealthCheck::new(
                "Embedding Model",
                HealthStatus::Warn(format!(
                    "{} is loaded locally (downloaded on first use)",
                    self.config.embedding.local_model
                )),
            ),
        }
    }

    /// Check 5: passage store reachable
    async fn check_passage_store(&self) -> HealthCheck {
        const NAME: &str = "Passage Store";

        match self.config.store.provider {
            StoreProvider::Qdrant => match qdrant::health_check(&self.config.store).await {
                Ok(()) => HealthCheck::new(NAME, HealthStatus::Pass),
                Err(e) => HealthCheck::new(
                    NAME,
                    HealthStatus::Fail(format!("{} ({})", e, self.config.store.qdrant_url)),
                ),
            },
            StoreProvider::Memory => match &self.config.store.passages_path {
                Some(path) => check_passages_file(path),
                None => HealthCheck::new(
                    NAME,
                    HealthStatus::Fail("store.passages_path is not set".to_string()),
                ),
            },
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "BioBuddy Diagnostics".bold());
        println!("{:<20} Status", "Check");
        println!("{}", "=".repeat(50));

        for check in checks {
            let status = match &check.status {
                HealthStatus::Pass => "PASS".green().to_string(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow().to_string(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red().to_string(),
            };
            println!("{:<20} {}", check.name, status);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

/// Ollama reports untagged models as `name:latest`
fn model_installed(model: &str, installed: &[String]) -> bool {
    installed.iter().any(|m| {
        m == model || (!model.contains(':') && m.strip_suffix(":latest") == Some(model))
    })
}

fn model_check(name: &str, model: &str, installed: &Result<Vec<String>, String>) -> HealthCheck {
    match installed {
        Ok(models) if model_installed(model, models) => HealthCheck::new(name, HealthStatus::Pass),
        Ok(_) => HealthCheck::new(
            name,
            HealthStatus::Fail(format!("{} is not installed (ollama pull {})", model, model)),
        ),
        Err(_) => HealthCheck::new(
            name,
            HealthStatus::Warn("cannot check models while Ollama is unreachable".to_string()),
        ),
    }
}

fn check_passages_file(path: &Path) -> HealthCheck {
    const NAME: &str = "Passage Store";

    match std::fs::read_to_string(path) {
        Ok(text) => {
            let count = split_passages(&text, &path.display().to_string()).len();
            if count == 0 {
                HealthCheck::new(
                    NAME,
                    HealthStatus::Warn(format!("{} contains no passages", path.display())),
                )
            } else {
                HealthCheck::new(NAME, HealthStatus::Pass)
            }
        }
        Err(e) => HealthCheck::new(
            NAME,
            HealthStatus::Fail(format!("cannot read {}: {}", path.display(), e)),
        ),
    }
}
