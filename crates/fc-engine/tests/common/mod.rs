//! Shared helpers for engine integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fc_core::{FuelType, FuelUses};
use fc_engine::SimModel;
use fc_jobs::{JobTree, JobsResult, Stage, StageRunner};
use fc_results::{SUMMARY_FILE_NAME, write_summary};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

/// Per-tier gas/electricity totals written by the stub stages, in joules.
pub fn tier_gas_j(run_type: &str) -> f64 {
    match run_type {
        "estimation" => 8.0e9,
        "full" => 9.5e9,
        "radiance" => 1.0e10,
        _ => 0.0,
    }
}

pub fn tier_electricity_j(run_type: &str) -> f64 {
    match run_type {
        "estimation" => 4.0e9,
        "full" => 4.75e9,
        "radiance" => 5.0e9,
        _ => 0.0,
    }
}

/// Minimal model collaborator: a text blob.
#[derive(Clone)]
pub struct StubModel {
    pub content: String,
}

impl StubModel {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }
}

impl SimModel for StubModel {
    fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, &self.content)
    }

    fn simplified(&self) -> Self {
        Self {
            content: format!("simplified:{}", self.content),
        }
    }
}

#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cond.wait(open).unwrap();
        }
    }
}

/// Stage runner stub: tracks which trees it touched, optionally holds them
/// at a gate or delays per tier, and leaves a fuel-use summary behind the
/// way a real simulation stage would.
pub struct TestRunner {
    pub trees_seen: Arc<Mutex<BTreeSet<String>>>,
    pub gate: Option<Arc<Gate>>,
    pub tier_delays: BTreeMap<&'static str, Duration>,
}

impl TestRunner {
    pub fn tracking() -> (Self, Arc<Mutex<BTreeSet<String>>>) {
        let trees_seen = Arc::new(Mutex::new(BTreeSet::new()));
        (
            Self {
                trees_seen: Arc::clone(&trees_seen),
                gate: None,
                tier_delays: BTreeMap::new(),
            },
            trees_seen,
        )
    }

    pub fn gated(gate: Arc<Gate>) -> (Self, Arc<Mutex<BTreeSet<String>>>) {
        let (mut runner, trees_seen) = Self::tracking();
        runner.gate = Some(gate);
        (runner, trees_seen)
    }

    pub fn with_tier_delay(mut self, run_type: &'static str, delay: Duration) -> Self {
        self.tier_delays.insert(run_type, delay);
        self
    }
}

impl StageRunner for TestRunner {
    fn run_stage(&self, stage: Stage, tree: &JobTree) -> JobsResult<()> {
        self.trees_seen
            .lock()
            .unwrap()
            .insert(tree.id.to_string());

        if let Some(gate) = &self.gate {
            gate.wait();
        }

        if stage == Stage::EnergyPlus {
            let run_type = tree.workflow.param("run_type").unwrap_or("");
            if let Some(delay) = self.tier_delays.get(run_type) {
                thread::sleep(*delay);
            }
            let uses = FuelUses::new(0.0)
                .with_use(FuelType::Gas, tier_gas_j(run_type))
                .with_use(FuelType::Electricity, tier_electricity_j(run_type));
            write_summary(&tree.out_dir.join(SUMMARY_FILE_NAME), &uses).map_err(|e| {
                fc_jobs::JobsError::StageFailed {
                    stage,
                    message: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}
