//! Trained regressors and the process-wide table that holds them.

mod artifact;
mod tree;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::domain::{HousingType, RentType};

pub use artifact::{ModelTableError, ARTIFACT_FORMAT_VERSION};
pub use tree::{RegressionTree, TreeEnsemble, TreeValidationError};

/// A fitted model mapping an ordered feature vector to a scalar.
pub trait Regressor: Send + Sync + fmt::Debug {
    fn predict(&self, features: &[f64]) -> f64;
}

impl Regressor for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> f64 {
        TreeEnsemble::predict(self, features)
    }
}

/// `intercept + coefficients · x`; missing trailing features count as zero.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct LinearRegressor {
    #[serde(default)]
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(weight, value)| weight * value)
                .sum::<f64>()
    }
}

/// Table key: one model pair per housing/rent combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModelKey {
    pub housing_type: HousingType,
    pub rent_type: RentType,
}

impl ModelKey {
    pub fn new(housing_type: HousingType, rent_type: RentType) -> Self {
        Self {
            housing_type,
            rent_type,
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.housing_type, self.rent_type)
    }
}

/// Two independently trained regressors plus the column order they were trained on.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    primary: Arc<dyn Regressor>,
    secondary: Arc<dyn Regressor>,
    feature_names: Vec<String>,
}

impl ModelEntry {
    pub fn new(
        primary: Arc<dyn Regressor>,
        secondary: Arc<dyn Regressor>,
        feature_names: Vec<String>,
    ) -> Self {
        Self {
            primary,
            secondary,
            feature_names,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Mean of both regressors over the same inputs.
    pub fn ensemble_predict(&self, features: &[f64]) -> f64 {
        let first = self.primary.predict(features);
        let second = self.secondary.predict(features);
        (first + second) / 2.0
    }
}

/// Read-only model lookup, built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ModelTable {
    entries: HashMap<ModelKey, ModelEntry>,
}

impl ModelTable {
    pub fn builder() -> ModelTableBuilder {
        ModelTableBuilder::default()
    }

    pub fn get(&self, key: ModelKey) -> Option<&ModelEntry> {
        self.entries.get(&key)
    }

    /// Loaded combinations in a stable order.
    pub fn keys(&self) -> Vec<ModelKey> {
        let mut keys: Vec<ModelKey> = self.entries.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assembles a [`ModelTable`], rejecting duplicate keys.
#[derive(Debug, Default)]
pub struct ModelTableBuilder {
    entries: HashMap<ModelKey, ModelEntry>,
}

impl ModelTableBuilder {
    pub fn insert(mut self, key: ModelKey, entry: ModelEntry) -> Result<Self, ModelTableError> {
        if self.entries.contains_key(&key) {
            return Err(ModelTableError::DuplicateEntry(key));
        }
        self.entries.insert(key, entry);
        Ok(self)
    }

    pub fn build(self) -> ModelTable {
        ModelTable {
            entries: self.entries,
        }
    }
}
