//! Simulation request cache and orchestrator.
//!
//! The engine deduplicates simulation requests keyed by the exact pair of
//! variable vectors, fans each unique request out into the three-tier job
//! cascade, and merges results as they complete. Public calls never block on
//! simulations: the write path returns the current best approximation
//! immediately, and later calls observe improved estimates as completions
//! are ingested on worker threads.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use fc_approx::{ApproxError, ErrorEstimation};
use fc_core::{FuelUses, RequestKey, ensure_dimension, ensure_finite};
use fc_jobs::{JobDb, JobQueue, JobTree, QueueStats, StageRunner, TreeManifest, TreeStatus, Workflow};
use fc_results::{FuelUseReader, SUMMARY_FILE_NAME, SimulationDetails, compute_request_id};

use crate::error::{EngineError, EngineResult};
use crate::model::{MODEL_FILE_NAME, SimModel};
use crate::tier::{
    PARAM_CONTINUOUS_VARS, PARAM_DISCRETE_VARS, PARAM_RUN_TYPE, PARAM_SIMULATION_ID,
    PARAM_WEATHER_FILE, RunTier,
};

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub cache_dir: PathBuf,
    pub num_variables: usize,
    pub workers: usize,
}

impl EngineConfig {
    pub fn new(cache_dir: impl Into<PathBuf>, num_variables: usize) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            num_variables,
            workers: 4,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// Optional tags for the enqueue path.
#[derive(Debug, Clone, Default)]
pub struct FuelUsesOptions {
    pub simulation_id: Option<String>,
    pub weather_file: Option<PathBuf>,
}

impl FuelUsesOptions {
    pub fn with_simulation_id(mut self, id: impl Into<String>) -> Self {
        self.simulation_id = Some(id.into());
        self
    }

    pub fn with_weather_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.weather_file = Some(path.into());
        self
    }
}

#[derive(Default)]
struct EngineState {
    estimations: BTreeMap<Vec<i32>, ErrorEstimation>,
    details: BTreeMap<RequestKey, SimulationDetails>,
    enqueued: BTreeSet<RequestKey>,
    simulation_ids: BTreeMap<String, RequestKey>,
}

struct EngineInner {
    num_variables: usize,
    cache_dir: PathBuf,
    reader: Box<dyn FuelUseReader>,
    state: Mutex<EngineState>,
}

/// Caching simulation orchestrator. One instance exclusively owns its cache
/// folder; pointing two engines at the same folder is unsupported.
pub struct SimulationEngine {
    inner: Arc<EngineInner>,
    queue: JobQueue,
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine").finish_non_exhaustive()
    }
}

impl SimulationEngine {
    /// Open (or create) an engine over `config.cache_dir`.
    ///
    /// Finished job trees already present in the folder's job database are
    /// replayed through the regular ingestion path, so estimation state
    /// survives a process restart without re-running anything.
    pub fn new(
        config: EngineConfig,
        runner: impl StageRunner,
        reader: impl FuelUseReader + 'static,
    ) -> EngineResult<Self> {
        if config.num_variables == 0 {
            return Err(EngineError::Config {
                message: "num_variables must be positive".to_string(),
            });
        }
        if config.cache_dir.exists() && !config.cache_dir.is_dir() {
            return Err(EngineError::Config {
                message: format!(
                    "cache path exists and is not a directory: {}",
                    config.cache_dir.display()
                ),
            });
        }
        fs::create_dir_all(&config.cache_dir)?;

        let db = JobDb::open(&config.cache_dir)?;
        let inner = Arc::new(EngineInner {
            num_variables: config.num_variables,
            cache_dir: config.cache_dir,
            reader: Box::new(reader),
            state: Mutex::new(EngineState::default()),
        });

        let queue = JobQueue::new(db.clone(), runner, config.workers);
        {
            let inner = Arc::clone(&inner);
            let db = db.clone();
            queue.set_completion_handler(move |id, status| {
                if status != TreeStatus::Finished {
                    debug!(tree = %id, ?status, "tree ended without usable results");
                    return;
                }
                match db.load(id) {
                    Ok(manifest) => {
                        if let Err(e) = inner.ingest(&manifest) {
                            warn!(tree = %id, error = %e, "failed to ingest completed tree");
                        }
                    }
                    Err(e) => {
                        warn!(tree = %id, error = %e, "failed to load manifest of completed tree");
                    }
                }
            });
        }

        let mut replayed = 0usize;
        for manifest in db.finished_trees()? {
            match inner.ingest(&manifest) {
                Ok(()) => replayed += 1,
                Err(e) => warn!(tree = %manifest.id, error = %e, "failed to replay finished tree"),
            }
        }
        if replayed > 0 {
            info!(replayed, "rebuilt estimation state from job database");
        }

        Ok(Self { inner, queue })
    }

    pub fn num_variables(&self) -> usize {
        self.inner.num_variables
    }

    /// Request fuel uses for `model` at the given variable point.
    ///
    /// The first call for a (variables, discrete variables) pair enqueues
    /// the three-tier cascade; repeated calls are cache hits and enqueue
    /// nothing. Always returns the current best approximation immediately,
    /// which has zero confidence until some tier has completed.
    pub fn fuel_uses<M: SimModel>(
        &self,
        model: &M,
        variables: &[f64],
        discrete_variables: &[i32],
        options: &FuelUsesOptions,
    ) -> EngineResult<FuelUses> {
        self.validate_variables(variables)?;
        for &v in variables {
            ensure_finite(v, "design variable")?;
        }

        let key = RequestKey::new(variables, discrete_variables.to_vec());
        let (estimate, needs_enqueue) = {
            let mut state = self.inner.state.lock().unwrap();
            if let Some(id) = &options.simulation_id {
                state
                    .simulation_ids
                    .entry(id.clone())
                    .or_insert_with(|| key.clone());
            }
            let needs_enqueue = state.enqueued.insert(key.clone());
            if needs_enqueue && !state.estimations.contains_key(&key.discrete) {
                let bucket = new_bucket(self.inner.num_variables)?;
                state.estimations.insert(key.discrete.clone(), bucket);
            }
            (
                best_estimate(&state, variables, discrete_variables),
                needs_enqueue,
            )
        };

        if needs_enqueue {
            if let Err(e) = self.enqueue_cascade(model, &key, options) {
                // Allow a later retry rather than wedging the key forever.
                let mut state = self.inner.state.lock().unwrap();
                state.enqueued.remove(&key);
                return Err(e);
            }
        }

        Ok(estimate)
    }

    /// Best-known fuel uses at a variable point, extrapolation included.
    ///
    /// Pure read: never enqueues. Fails for a discrete-variable combination
    /// the engine has never seen.
    pub fn fuel_uses_at(
        &self,
        variables: &[f64],
        discrete_variables: &[i32],
    ) -> EngineResult<FuelUses> {
        self.validate_variables(variables)?;
        let state = self.inner.state.lock().unwrap();
        let estimation = state
            .estimations
            .get(discrete_variables)
            .ok_or(EngineError::UnknownBucket)?;
        match estimation.approximate(variables) {
            Ok(uses) => Ok(uses),
            // Enqueued but nothing completed yet: same zero-confidence
            // answer the write path hands out for this key.
            Err(ApproxError::NoObservations) => Ok(FuelUses::new(0.0)),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a caller-supplied simulation id and return its fuel uses.
    pub fn fuel_uses_for(&self, simulation_id: &str) -> EngineResult<FuelUses> {
        let key = self.lookup_simulation_id(simulation_id)?;
        self.fuel_uses_at(key.continuous.as_slice(), &key.discrete)
    }

    /// Best completed result recorded for the request so far, or the
    /// zero-confidence default when nothing has completed.
    pub fn details(
        &self,
        variables: &[f64],
        discrete_variables: &[i32],
    ) -> EngineResult<SimulationDetails> {
        self.validate_variables(variables)?;
        let key = RequestKey::new(variables, discrete_variables.to_vec());
        let state = self.inner.state.lock().unwrap();
        Ok(state.details.get(&key).cloned().unwrap_or_default())
    }

    pub fn details_for(&self, simulation_id: &str) -> EngineResult<SimulationDetails> {
        let key = self.lookup_simulation_id(simulation_id)?;
        let state = self.inner.state.lock().unwrap();
        Ok(state.details.get(&key).cloned().unwrap_or_default())
    }

    /// Substrate wait surface: block until no trees are queued or running.
    /// The engine's own operations never call this.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.queue.wait_idle(timeout)
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    fn validate_variables(&self, variables: &[f64]) -> EngineResult<()> {
        ensure_dimension("variable vector", self.inner.num_variables, variables.len())?;
        Ok(())
    }

    fn lookup_simulation_id(&self, simulation_id: &str) -> EngineResult<RequestKey> {
        let state = self.inner.state.lock().unwrap();
        state
            .simulation_ids
            .get(simulation_id)
            .cloned()
            .ok_or(EngineError::UnknownSimulationId)
    }

    fn enqueue_cascade<M: SimModel>(
        &self,
        model: &M,
        key: &RequestKey,
        options: &FuelUsesOptions,
    ) -> EngineResult<()> {
        let request_id = compute_request_id(key);
        let continuous_json = serde_json::to_string(key.continuous.as_slice())?;
        let discrete_json = serde_json::to_string(&key.discrete)?;

        for tier in RunTier::ALL {
            let out_dir = self
                .inner
                .cache_dir
                .join("runs")
                .join(&request_id)
                .join(tier.as_str());
            fs::create_dir_all(&out_dir)?;

            let tier_model = match tier {
                RunTier::Estimation => model.simplified(),
                RunTier::Full | RunTier::Radiance => model.clone(),
            };
            tier_model.save(&out_dir.join(MODEL_FILE_NAME))?;

            let mut workflow = Workflow::new(tier.stages())
                .with_param(PARAM_RUN_TYPE, tier.as_str())
                .with_param(PARAM_CONTINUOUS_VARS, continuous_json.clone())
                .with_param(PARAM_DISCRETE_VARS, discrete_json.clone())
                .with_parallelism(tier.parallelism());
            if let Some(id) = &options.simulation_id {
                workflow = workflow.with_param(PARAM_SIMULATION_ID, id.clone());
            }
            if let Some(weather) = &options.weather_file {
                workflow = workflow.with_param(PARAM_WEATHER_FILE, weather.display().to_string());
            }

            let tree = JobTree::new(workflow, out_dir);
            debug!(tree = %tree.id, tier = tier.as_str(), request = %request_id, "submitting tier");
            self.queue.enqueue(tree)?;
        }

        info!(request = %request_id, "enqueued simulation cascade");
        Ok(())
    }
}

impl EngineInner {
    /// Shared ingestion path for live completions and startup replay.
    fn ingest(&self, manifest: &TreeManifest) -> EngineResult<()> {
        let tier_name = require_param(manifest, PARAM_RUN_TYPE)?;
        let tier = RunTier::parse(tier_name).ok_or_else(|| {
            EngineError::Jobs(format!("unknown run type in job parameters: {tier_name}"))
        })?;
        let continuous: Vec<f64> = serde_json::from_str(require_param(manifest, PARAM_CONTINUOUS_VARS)?)?;
        let discrete: Vec<i32> = serde_json::from_str(require_param(manifest, PARAM_DISCRETE_VARS)?)?;
        ensure_dimension("recorded variable vector", self.num_variables, continuous.len())?;

        let result_path = manifest.out_dir.join(SUMMARY_FILE_NAME);
        let uses = self.reader.read(&result_path)?;
        let key = RequestKey::new(continuous.as_slice(), discrete.clone());

        let mut state = self.state.lock().unwrap();
        state.enqueued.insert(key.clone());
        if let Some(id) = manifest.params.get(PARAM_SIMULATION_ID) {
            state
                .simulation_ids
                .entry(id.clone())
                .or_insert_with(|| key.clone());
        }

        let bucket = match state.estimations.entry(discrete) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(new_bucket(self.num_variables)?),
        };
        let corrected = bucket.add(&uses, tier.as_str(), &continuous)?;

        let details = SimulationDetails::new(tier.confidence(), result_path);
        let upgraded = state.details.entry(key).or_default().upgrade(&details);

        info!(
            tree = %manifest.id,
            tier = tier.as_str(),
            confidence = corrected.confidence(),
            total_j = corrected.sum(),
            upgraded,
            "ingested simulation result"
        );
        Ok(())
    }
}

fn require_param<'a>(manifest: &'a TreeManifest, name: &str) -> EngineResult<&'a str> {
    manifest
        .params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| EngineError::Jobs(format!("tree {} is missing parameter {name}", manifest.id)))
}

fn new_bucket(num_variables: usize) -> EngineResult<ErrorEstimation> {
    let mut estimation = ErrorEstimation::new(num_variables)?;
    for tier in RunTier::ALL {
        estimation.set_confidence(tier.as_str(), tier.confidence());
    }
    Ok(estimation)
}

fn best_estimate(state: &EngineState, variables: &[f64], discrete_variables: &[i32]) -> FuelUses {
    match state.estimations.get(discrete_variables) {
        Some(estimation) => match estimation.approximate(variables) {
            Ok(uses) => uses,
            Err(_) => FuelUses::new(0.0),
        },
        None => FuelUses::new(0.0),
    }
}
