#![allow(dead_code)]

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use image::RgbImage;
use realenv::config::{EnvConfig, WorkerConfig};
use realenv::physics::{PhysicsRenderer, PhysicsSettings};
use realenv::reward::RewardDisplay;
use realenv::scene::{ModelGeometry, SceneBundle, SceneDataset};
use realenv::synthetic::SyntheticDataset;
use realenv::visual::PointCloudRenderer;
use realenv::{Backend, BoxError, DepthMap, Frame, PhysicsState, Pose};

pub const SCENE: &str = "scene-a";

pub fn worker_program() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_depth_worker"))
}

pub fn worker_config() -> WorkerConfig {
    WorkerConfig {
        reply_timeout_ms: 2_000,
        shutdown_grace_ms: 2_000,
        ..WorkerConfig::with_program(worker_program())
    }
}

pub fn config() -> EnvConfig {
    EnvConfig {
        model_id: SCENE.to_string(),
        debug: false,
        worker: worker_config(),
        ..EnvConfig::default()
    }
}

/// A loopback port that was free a moment ago.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[derive(Debug, Default)]
pub struct Record {
    pub events: Vec<&'static str>,
    pub initialized_with: Option<Pose>,
    pub physics_built: usize,
    pub settings: Option<PhysicsSettings>,
    pub rewards: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Probe(Arc<Mutex<Record>>);

impl Probe {
    pub fn get(&self) -> MutexGuard<'_, Record> {
        self.0.lock().unwrap()
    }

    fn event(&self, name: &'static str) {
        self.get().events.push(name);
    }
}

pub struct ScriptedRenderer {
    probe: Probe,
    initial: Pose,
}

impl PointCloudRenderer for ScriptedRenderer {
    fn initial_pose(&mut self, _depth: &DepthMap) -> Result<Pose, BoxError> {
        self.probe.event("initial_pose");
        Ok(self.initial)
    }

    fn render_offscreen(&mut self, _pose: &Pose, depth: &DepthMap) -> Result<Frame, BoxError> {
        self.probe.event("render");
        Ok(RgbImage::new(depth.width, depth.height))
    }

    fn setup_onscreen(&mut self) -> Result<(), BoxError> {
        self.probe.event("setup_onscreen");
        Ok(())
    }
}

/// Replays a fixed list of distances, repeating the last one.
pub struct ScriptedPhysics {
    probe: Probe,
    distances: Vec<f64>,
    fail_on_step: Option<usize>,
    fail_initialize: bool,
    step: usize,
}

impl PhysicsRenderer for ScriptedPhysics {
    type Action = ();

    fn initialize(&mut self, pose: Pose) -> Result<(), BoxError> {
        self.probe.event("initialize");
        if self.fail_initialize {
            return Err("initialization rejected".into());
        }
        self.probe.get().initialized_with = Some(pose);
        Ok(())
    }

    fn render_offscreen(&mut self, _action: ()) -> Result<(Pose, PhysicsState), BoxError> {
        self.step += 1;
        if self.fail_on_step == Some(self.step) {
            return Err(format!("engine fault on step {}", self.step).into());
        }
        let d = self
            .distances
            .get(self.step - 1)
            .or(self.distances.last())
            .copied()
            .unwrap_or(1.0);
        Ok((Pose::from_translation([d, 0.0, 0.0]), PhysicsState::new(d)))
    }
}

struct RecordingDisplay(Probe);

impl RewardDisplay for RecordingDisplay {
    fn add_reward(&mut self, reward: f64) -> Result<(), BoxError> {
        self.0.get().rewards.push(reward);
        Ok(())
    }

    fn reset(&mut self) {
        self.0.get().rewards.clear();
    }
}

pub struct MockBackend {
    pub probe: Probe,
    pub initial: Pose,
    pub distances: Vec<f64>,
    pub fail_on_step: Option<usize>,
    pub fail_initialize: bool,
    pub fail_renderer: bool,
    dataset: SyntheticDataset,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            probe: Probe::default(),
            initial: Pose::from_translation([1.0, 2.0, 3.0]),
            distances: vec![2.0],
            fail_on_step: None,
            fail_initialize: false,
            fail_renderer: false,
            dataset: SyntheticDataset::new([SCENE, "scene-b"]),
        }
    }
}

impl Backend for MockBackend {
    type Renderer = ScriptedRenderer;
    type Physics = ScriptedPhysics;

    fn dataset(&self) -> &dyn SceneDataset {
        &self.dataset
    }

    fn build_renderer(&mut self, _scene: Arc<SceneBundle>) -> Result<ScriptedRenderer, BoxError> {
        self.probe.event("build_renderer");
        if self.fail_renderer {
            return Err("no point cloud for scene".into());
        }
        Ok(ScriptedRenderer {
            probe: self.probe.clone(),
            initial: self.initial,
        })
    }

    fn build_physics(
        &mut self,
        _model: ModelGeometry,
        settings: PhysicsSettings,
    ) -> Result<ScriptedPhysics, BoxError> {
        self.probe.event("build_physics");
        {
            let mut record = self.probe.get();
            record.physics_built += 1;
            record.settings = Some(settings);
        }
        Ok(ScriptedPhysics {
            probe: self.probe.clone(),
            distances: self.distances.clone(),
            fail_on_step: self.fail_on_step,
            fail_initialize: self.fail_initialize,
            step: 0,
        })
    }

    fn build_reward_display(&mut self) -> Result<Box<dyn RewardDisplay>, BoxError> {
        self.probe.event("build_reward_display");
        Ok(Box::new(RecordingDisplay(self.probe.clone())))
    }
}
