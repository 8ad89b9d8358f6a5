//! Simulation environment shell: per step, advances a physics simulation,
//! renders the matching frame with help from a separate depth worker process,
//! and scores the step by how much closer the agent got to its target.

pub mod backend;
pub mod config;
pub mod env;
pub mod physics;
pub mod reward;
pub mod runtime;
pub mod scene;
pub mod simple_env;
pub mod synthetic;
pub mod types;
pub mod visual;

#[cfg(feature = "python")]
mod python;

pub use backend::Backend;
pub use config::{EnvConfig, WorkerConfig};
pub use env::{AsyncEnv, BlockingEnv, BoxError, Env, EnvError, StepInfo, Transition};
pub use simple_env::{ActionOf, Lifecycle, SimpleEnv};
pub use types::{DepthMap, Frame, PhysicsState, Pose};
