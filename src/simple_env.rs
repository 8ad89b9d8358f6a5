//! The orchestration core: worker lifecycle, strict initialization order,
//! the step loop and teardown.
//!
//! ```text
//! spawn worker -> load scene -> connect channels -> build renderer
//!   -> initial pose -> build physics -> initialize(pose) -> [debug wiring]
//! ```
//!
//! Any failure after the worker is spawned shuts it down before the error is
//! returned. The same holds for every step: a failed step ends the
//! environment, and so does the next call after a step future was dropped
//! mid-flight.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::Backend;
use crate::config::EnvConfig;
use crate::env::{AsyncEnv, EnvError, StepInfo, Transition};
use crate::physics::{PhysicsRenderer, PhysicsSettings};
use crate::reward::{RewardDisplay, distance_reward};
use crate::runtime::{Shutdown, WorkerProcess};
use crate::scene::{SceneError, SceneIndex, load_bundle, resolve_scene};
use crate::types::{Frame, PhysicsState};
use crate::visual::VisualSubsystem;

pub type ActionOf<B> = <<B as Backend>::Physics as PhysicsRenderer>::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Ready,
    /// A step is running, or its future was dropped before it finished.
    Stepping,
    /// Worker terminated; no further steps.
    Ended,
}

type Parts<B> = (
    VisualSubsystem<<B as Backend>::Renderer>,
    <B as Backend>::Physics,
    Option<Box<dyn RewardDisplay>>,
);

pub struct SimpleEnv<B: Backend> {
    id: Uuid,
    config: EnvConfig,
    scene: SceneIndex,
    worker: WorkerProcess,
    visuals: VisualSubsystem<B::Renderer>,
    physics: B::Physics,
    display: Option<Box<dyn RewardDisplay>>,
    state_old: Option<PhysicsState>,
    lifecycle: Lifecycle,
    steps: u64,
}

impl<B: Backend> SimpleEnv<B> {
    /// Builds a steppable environment or fails with nothing left running.
    pub async fn new(config: EnvConfig, mut backend: B) -> Result<Self, EnvError> {
        config.validate()?;
        let Some(scene) = resolve_scene(backend.dataset(), &config.model_id) else {
            error!(model_id = %config.model_id, "model not found");
            return Err(EnvError::UnknownScene {
                model_id: config.model_id.clone(),
            });
        };

        let id = Uuid::new_v4();
        info!(
            %id,
            model_id = %config.model_id,
            debug = config.debug,
            human = config.human,
            scale_up = config.scale_up,
            "initializing environment"
        );

        let mut worker = WorkerProcess::spawn(&config.worker).await?;
        let (visuals, physics, display) =
            match Self::assemble(&config, &mut backend, scene, &worker).await {
                Ok(parts) => parts,
                Err(err) => {
                    error!(%id, error = %err, "environment setup failed; tearing down");
                    worker.shutdown().await;
                    return Err(err);
                }
            };
        info!(%id, "environment ready");

        Ok(Self {
            id,
            config,
            scene,
            worker,
            visuals,
            physics,
            display,
            state_old: None,
            lifecycle: Lifecycle::Ready,
            steps: 0,
        })
    }

    async fn assemble(
        config: &EnvConfig,
        backend: &mut B,
        scene: SceneIndex,
        worker: &WorkerProcess,
    ) -> Result<Parts<B>, EnvError> {
        let bundle = load_bundle(backend.dataset(), scene, &config.model_id, config.scale_up)?;
        let mut visuals = VisualSubsystem::open(
            bundle,
            config.scale_up,
            worker,
            &config.worker,
            |bundle| backend.build_renderer(bundle),
        )
        .await?;

        let pose_init = visuals.initial_pose().await?;
        info!(?pose_init, "initial pose");

        let model = backend
            .dataset()
            .model_geometry(scene)
            .map_err(SceneError::Dataset)?;
        let settings = PhysicsSettings {
            frame_rate: config.frame_rate,
            debug: config.debug,
            human: config.human,
        };
        let mut physics = backend
            .build_physics(model, settings)
            .map_err(EnvError::Physics)?;
        physics.initialize(pose_init).map_err(EnvError::Physics)?;

        let display = if config.debug {
            visuals.setup_onscreen()?;
            Some(backend.build_reward_display().map_err(EnvError::Display)?)
        } else {
            None
        };

        Ok((visuals, physics, display))
    }

    /// Advances one frame. Any failure ends the environment.
    pub async fn step(
        &mut self,
        action: ActionOf<B>,
    ) -> Result<Transition<Frame, StepInfo>, EnvError> {
        match self.lifecycle {
            Lifecycle::Ready => {}
            Lifecycle::Ended => return Err(EnvError::Ended),
            Lifecycle::Stepping => {
                warn!(id = %self.id, step = self.steps, "previous step was cancelled; tearing down");
                self.teardown().await;
                return Err(EnvError::Ended);
            }
        }

        self.lifecycle = Lifecycle::Stepping;
        match self.advance(action).await {
            Ok(transition) => {
                self.lifecycle = Lifecycle::Ready;
                Ok(transition)
            }
            Err(err) => {
                error!(id = %self.id, step = self.steps, error = %err, "step failed; tearing down");
                self.teardown().await;
                Err(err)
            }
        }
    }

    async fn advance(
        &mut self,
        action: ActionOf<B>,
    ) -> Result<Transition<Frame, StepInfo>, EnvError> {
        let started = Instant::now();
        let (pose, state_new) = self
            .physics
            .render_offscreen(action)
            .map_err(EnvError::Physics)?;
        debug!(elapsed = ?started.elapsed(), "physics to screen");

        let reward = distance_reward(self.state_old.as_ref(), &state_new);
        let info = StepInfo {
            state_old: self.state_old.as_ref().map(|s| s.distance_to_target),
            state_new: state_new.distance_to_target,
        };

        let started = Instant::now();
        let frame = self.visuals.render_offscreen(pose).await?;
        debug!(elapsed = ?started.elapsed(), "render to screen");
        self.state_old = Some(state_new);

        if let Some(display) = self.display.as_mut() {
            if let Err(e) = display.add_reward(reward) {
                warn!(error = %e, "reward display rejected sample");
            }
        }
        self.steps += 1;

        Ok((frame, reward as f32, false, info))
    }

    /// Does nothing; episodes are never reset by this environment.
    pub fn reset(&mut self) {}

    /// Does nothing; frames are returned by [`SimpleEnv::step`].
    pub fn render(&mut self) {}

    /// Terminates the worker and ends the environment. Safe to call any
    /// number of times.
    pub async fn teardown(&mut self) -> Shutdown {
        if self.lifecycle != Lifecycle::Ended {
            info!(id = %self.id, steps = self.steps, "ending environment");
        }
        self.lifecycle = Lifecycle::Ended;
        self.worker.shutdown().await
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn scene(&self) -> SceneIndex {
        self.scene
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn state_old(&self) -> Option<&PhysicsState> {
        self.state_old.as_ref()
    }

    pub fn physics(&self) -> &B::Physics {
        &self.physics
    }

    pub fn visuals(&self) -> &VisualSubsystem<B::Renderer> {
        &self.visuals
    }

    pub fn worker(&self) -> &WorkerProcess {
        &self.worker
    }

    pub fn has_reward_display(&self) -> bool {
        self.display.is_some()
    }
}

#[async_trait]
impl<B: Backend + 'static> AsyncEnv for SimpleEnv<B> {
    type Obs = Frame;
    type Act = ActionOf<B>;
    type Info = StepInfo;

    async fn reset(&mut self) -> Result<(), EnvError> {
        SimpleEnv::reset(self);
        Ok(())
    }

    async fn step(&mut self, act: Self::Act) -> Result<Transition<Frame, StepInfo>, EnvError> {
        SimpleEnv::step(self, act).await
    }

    async fn render(&mut self) -> Result<(), EnvError> {
        SimpleEnv::render(self);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), EnvError> {
        self.teardown().await;
        Ok(())
    }
}
