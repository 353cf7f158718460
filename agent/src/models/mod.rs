//! Model variants and preference-weighted model selection
//!
//! A [`ModelCatalog`] lists the model variants each backend can run, scored on
//! a common `[0, 1]` scale for capability, cost and latency. Given a set of
//! [`ModelPreferences`], [`select`] picks the variant with the highest weighted
//! score, where cost and latency count as penalties.
//!
//! Selection is deterministic: candidates are scanned in declaration order and
//! a later candidate only wins on a strictly higher score.

use serde::{Deserialize, Serialize};

use crate::error::FailureKind;

/// Errors from model selection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("No model candidates for backend '{backend}'")]
    NoCandidates { backend: String },

    #[error("Invalid model preferences: {0}")]
    InvalidPreferences(String),

    #[error("Invalid model variant '{name}': {reason}")]
    InvalidVariant { name: String, reason: String },
}

impl SelectionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoCandidates { .. } => FailureKind::NoCandidates,
            Self::InvalidPreferences(_) | Self::InvalidVariant { .. } => FailureKind::InvalidInput,
        }
    }
}

/// Relative priorities for picking a model
///
/// Only the ratio between the weights matters; `{2, 0, 0}` and `{1, 0, 0}`
/// select the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPreferences {
    #[serde(alias = "intelligencePriority", default)]
    pub intelligence_priority: f64,
    #[serde(alias = "costPriority", default)]
    pub cost_priority: f64,
    #[serde(alias = "speedPriority", default)]
    pub speed_priority: f64,
}

impl Default for ModelPreferences {
    fn default() -> Self {
        Self {
            intelligence_priority: 0.5,
            cost_priority: 0.25,
            speed_priority: 0.25,
        }
    }
}

impl ModelPreferences {
    /// Create validated preferences
    pub fn new(intelligence: f64, cost: f64, speed: f64) -> Result<Self, SelectionError> {
        let prefs = Self {
            intelligence_priority: intelligence,
            cost_priority: cost,
            speed_priority: speed,
        };
        prefs.validate()?;
        Ok(prefs)
    }

    /// Weights must be finite, non-negative, and not all zero
    pub fn validate(&self) -> Result<(), SelectionError> {
        let weights = [
            ("intelligence", self.intelligence_priority),
            ("cost", self.cost_priority),
            ("speed", self.speed_priority),
        ];

        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(SelectionError::InvalidPreferences(format!(
                    "{} priority must be a non-negative number, got {}",
                    name, w
                )));
            }
        }

        if weights.iter().all(|(_, w)| *w == 0.0) {
            return Err(SelectionError::InvalidPreferences(
                "at least one priority must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Weights scaled to sum to 1
    ///
    /// Divides by the largest weight first so the sum stays finite for any
    /// valid weights.
    fn normalized(&self) -> (f64, f64, f64) {
        let max = self
            .intelligence_priority
            .max(self.cost_priority)
            .max(self.speed_priority);
        let (i, c, s) = (
            self.intelligence_priority / max,
            self.cost_priority / max,
            self.speed_priority / max,
        );
        let total = i + c + s;
        (i / total, c / total, s / total)
    }
}

/// A model a backend can run, with normalized scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVariant {
    /// Model identifier passed to the backend (e.g. "qwen3:14b")
    pub name: String,
    /// Backend kind serving this model (e.g. "ollama", "openai")
    pub backend: String,
    /// Higher is more capable
    pub capability: f64,
    /// Higher is more expensive
    pub cost: f64,
    /// Higher is slower
    pub latency: f64,
}

impl ModelVariant {
    pub fn new(
        name: impl Into<String>,
        backend: impl Into<String>,
        capability: f64,
        cost: f64,
        latency: f64,
    ) -> Self {
        Self {
            name: name.into(),
            backend: backend.into(),
            capability,
            cost,
            latency,
        }
    }

    /// Scores must lie in `[0, 1]`
    pub fn validate(&self) -> Result<(), SelectionError> {
        for (label, score) in [
            ("capability", self.capability),
            ("cost", self.cost),
            ("latency", self.latency),
        ] {
            if !(0.0..=1.0).contains(&score) {
                return Err(SelectionError::InvalidVariant {
                    name: self.name.clone(),
                    reason: format!("{} score {} is outside [0, 1]", label, score),
                });
            }
        }
        Ok(())
    }

    /// Weighted score under the given preferences (cost and latency are penalties)
    pub fn weighted_score(&self, preferences: &ModelPreferences) -> f64 {
        let (wi, wc, ws) = preferences.normalized();
        wi * self.capability - wc * self.cost - ws * self.latency
    }
}

/// Pick the candidate with the highest weighted score
///
/// Ties go to the earliest candidate in `candidates`.
pub fn select<'a>(
    preferences: &ModelPreferences,
    candidates: &'a [ModelVariant],
) -> Result<&'a ModelVariant, SelectionError> {
    preferences.validate()?;

    let mut best: Option<(&ModelVariant, f64)> = None;
    for candidate in candidates {
        let score = candidate.weighted_score(preferences);
        if score.is_nan() {
            tracing::warn!("Skipping model '{}' with unscorable values", candidate.name);
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(variant, score)| {
        tracing::debug!("Selected model '{}' (score {:.3})", variant.name, score);
        variant
    })
    .ok_or_else(|| SelectionError::NoCandidates {
        backend: candidates
            .first()
            .map(|c| c.backend.clone())
            .unwrap_or_default(),
    })
}

/// Built-in model table: (name, backend, capability, cost, latency)
///
/// Order matters - it is the tie-break order.
const BUILTIN_VARIANTS: &[(&str, &str, f64, f64, f64)] = &[
    ("llama3.1:8b", "ollama", 0.55, 0.05, 0.15),
    ("qwen3:14b", "ollama", 0.72, 0.15, 0.35),
    ("qwen3-coder:30b", "ollama", 0.82, 0.30, 0.55),
    ("llama3.1:70b", "ollama", 0.88, 0.60, 0.85),
    ("gpt-4o-mini", "openai", 0.70, 0.10, 0.20),
    ("gpt-4.1", "openai", 0.88, 0.55, 0.45),
    ("o3", "openai", 0.96, 0.90, 0.90),
];

/// Ordered set of model variants across backends
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    variants: Vec<ModelVariant>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCatalog {
    /// Create a catalog, validating every variant
    pub fn new(variants: Vec<ModelVariant>) -> Result<Self, SelectionError> {
        for variant in &variants {
            variant.validate()?;
        }
        Ok(Self { variants })
    }

    /// The built-in catalog
    pub fn builtin() -> Self {
        Self {
            variants: BUILTIN_VARIANTS
                .iter()
                .map(|(name, backend, capability, cost, latency)| {
                    ModelVariant::new(*name, *backend, *capability, *cost, *latency)
                })
                .collect(),
        }
    }

    /// All variants in declaration order
    pub fn variants(&self) -> &[ModelVariant] {
        &self.variants
    }

    /// Variants served by one backend, in declaration order
    pub fn candidates_for(&self, backend: &str) -> Vec<ModelVariant> {
        self.variants
            .iter()
            .filter(|v| v.backend == backend)
            .cloned()
            .collect()
    }

    /// Select among the variants of one backend
    pub fn select(
        &self,
        backend: &str,
        preferences: &ModelPreferences,
    ) -> Result<ModelVariant, SelectionError> {
        let candidates = self.candidates_for(backend);
        if candidates.is_empty() {
            return Err(SelectionError::NoCandidates {
                backend: backend.to_string(),
            });
        }
        select(preferences, &candidates).cloned()
    }
}
