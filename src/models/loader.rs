//! Model artifact resolution and loading

use crate::config::{ModelsConfig, ResolutionPolicy};
use crate::error::{Result, ServiceError};
use crate::models::artifact::{self, ArtifactError, LoadStrategy};
use crate::models::linear::{LinearRegression, Regressor};
use crate::types::record::FEATURE_COUNT;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default artifact file name
pub const DEFAULT_MODEL_FILE: &str = "lin_reg_model_opt.bin";

/// Directories searched for the artifact, in order. Covers the known
/// deployment layouts, and the same layouts one level up for processes
/// started from a subdirectory.
pub const DEFAULT_SEARCH_DIRS: [&str; 8] = [
    "app/models",
    "models",
    "model",
    ".",
    "../app/models",
    "../models",
    "../model",
    "..",
];

type Decoder = fn(&[u8]) -> std::result::Result<LinearRegression, ArtifactError>;

/// Loaded model with metadata
pub struct LoadedModel {
    /// Model ready for inference
    pub model: Arc<dyn Regressor>,
    /// Path the model was read from
    pub path: PathBuf,
    /// Strategy that decoded the file
    pub strategy: LoadStrategy,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("type", &self.model.type_name())
            .field("path", &self.path)
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Loader resolving the model artifact from a list of candidate paths
#[derive(Debug, Clone)]
pub struct ModelLoader {
    /// Candidate paths, relative to `root` (or the working directory)
    candidates: Vec<PathBuf>,
    /// Base directory the candidates are resolved against
    root: Option<PathBuf>,
    /// What to do with a candidate that exists but cannot be decoded
    policy: ResolutionPolicy,
}

impl ModelLoader {
    /// Create a loader searching `search_dirs` for `file_name`
    pub fn new<S: AsRef<str>>(file_name: &str, search_dirs: &[S], policy: ResolutionPolicy) -> Self {
        let candidates = search_dirs
            .iter()
            .map(|dir| match dir.as_ref() {
                "" | "." => PathBuf::from(file_name),
                dir => Path::new(dir).join(file_name),
            })
            .collect();

        Self {
            candidates,
            root: None,
            policy,
        }
    }

    /// Create a loader from the `[models]` configuration section
    pub fn from_config(config: &ModelsConfig) -> Self {
        Self::new(&config.file_name, &config.search_dirs, config.resolution)
    }

    /// Resolve candidates against `root` instead of the working directory
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Candidate paths in search order
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    /// Resolve and load the model.
    ///
    /// The first candidate that exists is decoded. If decoding fails, the
    /// policy decides whether resolution stops there (`FailFast`) or moves
    /// on to the next candidate (`SkipCorrupt`).
    pub fn load(&self) -> Result<LoadedModel> {
        let mut searched = Vec::with_capacity(self.candidates.len());
        let mut corrupt = 0usize;

        for candidate in &self.candidates {
            let path = self.resolve(candidate);
            searched.push(path.clone());

            if !path.exists() {
                debug!(path = %path.display(), "Model candidate not found");
                continue;
            }

            info!(path = %path.display(), "Trying to load model");

            match self.load_file(&path) {
                Ok((model, strategy)) => {
                    info!(
                        path = %path.display(),
                        strategy = %strategy,
                        model_type = model.type_name(),
                        features = model.n_features(),
                        "Model loaded successfully"
                    );
                    return Ok(LoadedModel {
                        model: Arc::new(model),
                        path,
                        strategy,
                    });
                }
                Err(reason) => match self.policy {
                    ResolutionPolicy::FailFast => {
                        error!(path = %path.display(), error = %reason, "Failed to load model");
                        return Err(ServiceError::ModelLoadFailure { path, reason });
                    }
                    ResolutionPolicy::SkipCorrupt => {
                        warn!(
                            path = %path.display(),
                            error = %reason,
                            "Failed to load model, trying next candidate"
                        );
                        corrupt += 1;
                    }
                },
            }
        }

        error!(
            searched = searched.len(),
            corrupt = corrupt,
            "Model could not be loaded from any candidate path"
        );
        Err(ServiceError::ModelNotFound { searched })
    }

    /// Decode one file, trying each strategy in turn
    pub fn load_file(&self, path: &Path) -> std::result::Result<(LinearRegression, LoadStrategy), String> {
        let bytes = fs::read(path).map_err(|e| format!("read failed: {}", e))?;

        let attempts: [(LoadStrategy, Decoder); 3] = [
            (LoadStrategy::Binary, artifact::decode_binary),
            (LoadStrategy::Json, artifact::decode_json),
            (LoadStrategy::JsonLatin1, artifact::decode_json_latin1),
        ];

        let mut failures = Vec::with_capacity(attempts.len());
        for (strategy, decode) in attempts {
            match decode(&bytes) {
                Ok(model) => {
                    if model.n_features() != FEATURE_COUNT {
                        return Err(format!(
                            "{} decoded a model with {} coefficients, expected {}",
                            strategy,
                            model.n_features(),
                            FEATURE_COUNT
                        ));
                    }
                    model.check_feature_order()?;
                    return Ok((model, strategy));
                }
                Err(e) => {
                    debug!(path = %path.display(), strategy = %strategy, error = %e, "Decoding strategy failed");
                    failures.push(format!("{}: {}", strategy, e));
                }
            }
        }

        Err(failures.join("; "))
    }

    fn resolve(&self, candidate: &Path) -> PathBuf {
        match &self.root {
            Some(root) => root.join(candidate),
            None => candidate.to_path_buf(),
        }
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_FILE, &DEFAULT_SEARCH_DIRS, ResolutionPolicy::default())
    }
}
