use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::tree::{TreeEnsemble, TreeValidationError};
use super::{LinearRegressor, ModelEntry, ModelKey, ModelTable, Regressor};
use crate::estimation::domain::{HousingType, RentType};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct ArtifactDocument {
    format_version: u32,
    entries: Vec<ArtifactEntry>,
}

#[derive(Debug, Deserialize)]
struct ArtifactEntry {
    housing_type: HousingType,
    rent_type: RentType,
    feature_names: Vec<String>,
    regressors: Vec<RegressorSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RegressorSpec {
    TreeEnsemble {
        #[serde(default)]
        name: Option<String>,
        #[serde(flatten)]
        ensemble: TreeEnsemble,
    },
    Linear {
        #[serde(default)]
        name: Option<String>,
        #[serde(flatten)]
        linear: LinearRegressor,
    },
}

impl RegressorSpec {
    fn name(&self) -> &str {
        match self {
            RegressorSpec::TreeEnsemble { name, .. } => name.as_deref().unwrap_or("tree_ensemble"),
            RegressorSpec::Linear { name, .. } => name.as_deref().unwrap_or("linear"),
        }
    }

    fn into_regressor(
        self,
        key: ModelKey,
        n_features: usize,
    ) -> Result<Arc<dyn Regressor>, ModelTableError> {
        let regressor = self.name().to_string();
        match self {
            RegressorSpec::TreeEnsemble { ensemble, .. } => {
                ensemble
                    .validate(n_features)
                    .map_err(|(tree, source)| ModelTableError::InvalidTree {
                        key,
                        regressor,
                        tree,
                        source,
                    })?;
                Ok(Arc::new(ensemble))
            }
            RegressorSpec::Linear { linear, .. } => {
                if linear.coefficients.len() > n_features {
                    return Err(ModelTableError::CoefficientCount {
                        key,
                        regressor,
                        coefficients: linear.coefficients.len(),
                        n_features,
                    });
                }
                Ok(Arc::new(linear))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelTableError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported model artifact version {found} (expected 1)")]
    UnsupportedVersion { found: u32 },
    #[error("model artifact lists {0} more than once")]
    DuplicateEntry(ModelKey),
    #[error("model {key} needs exactly two regressors, found {found}")]
    RegressorCount { key: ModelKey, found: usize },
    #[error("model {key} has an empty feature list")]
    EmptyFeatureList { key: ModelKey },
    #[error("model {key} lists feature '{name}' more than once")]
    DuplicateFeature { key: ModelKey, name: String },
    #[error("model {key}, regressor '{regressor}', tree {tree}: {source}")]
    InvalidTree {
        key: ModelKey,
        regressor: String,
        tree: usize,
        source: TreeValidationError,
    },
    #[error(
        "model {key}, regressor '{regressor}' has {coefficients} coefficients for {n_features} features"
    )]
    CoefficientCount {
        key: ModelKey,
        regressor: String,
        coefficients: usize,
        n_features: usize,
    },
}

impl ModelTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelTableError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        info!(path = %path.display(), entries = table.len(), "model table loaded");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelTableError> {
        let document: ArtifactDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelTableError> {
        let document: ArtifactDocument = serde_json::from_str(raw)?;
        Self::from_document(document)
    }

    fn from_document(document: ArtifactDocument) -> Result<Self, ModelTableError> {
        if document.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelTableError::UnsupportedVersion {
                found: document.format_version,
            });
        }

        let mut builder = ModelTable::builder();
        for entry in document.entries {
            let key = ModelKey::new(entry.housing_type, entry.rent_type);
            builder = builder.insert(key, build_entry(key, entry)?)?;
        }
        Ok(builder.build())
    }
}

fn build_entry(key: ModelKey, entry: ArtifactEntry) -> Result<ModelEntry, ModelTableError> {
    let ArtifactEntry {
        feature_names,
        regressors,
        ..
    } = entry;

    if feature_names.is_empty() {
        return Err(ModelTableError::EmptyFeatureList { key });
    }
    let duplicate = {
        let mut seen = HashSet::new();
        feature_names
            .iter()
            .find(|name| !seen.insert(name.as_str()))
            .cloned()
    };
    if let Some(name) = duplicate {
        return Err(ModelTableError::DuplicateFeature { key, name });
    }

    let found = regressors.len();
    let Ok([primary, secondary]) = <[RegressorSpec; 2]>::try_from(regressors) else {
        return Err(ModelTableError::RegressorCount { key, found });
    };

    let n_features = feature_names.len();
    let primary = primary.into_regressor(key, n_features)?;
    let secondary = secondary.into_regressor(key, n_features)?;
    Ok(ModelEntry::new(primary, secondary, feature_names))
}
