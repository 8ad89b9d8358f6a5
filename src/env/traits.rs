use async_trait::async_trait;

use crate::env::errors::EnvError;
use crate::env::types::Transition;

pub trait Env: Send {
    type Obs: Send + Clone + 'static;
    type Act: Send + 'static;
    type Info: Send + Clone + 'static;

    fn reset(&mut self) -> Result<(), EnvError>;
    fn step(&mut self, act: Self::Act) -> Result<Transition<Self::Obs, Self::Info>, EnvError>;
    fn render(&mut self) -> Result<(), EnvError>;
    fn close(&mut self) -> Result<(), EnvError>;
}

/// Same contract as [`Env`] for environments whose steps wait on other
/// processes.
#[async_trait]
pub trait AsyncEnv: Send {
    type Obs: Send + Clone + 'static;
    type Act: Send + 'static;
    type Info: Send + Clone + 'static;

    async fn reset(&mut self) -> Result<(), EnvError>;
    async fn step(
        &mut self,
        act: Self::Act,
    ) -> Result<Transition<Self::Obs, Self::Info>, EnvError>;
    async fn render(&mut self) -> Result<(), EnvError>;
    async fn close(&mut self) -> Result<(), EnvError>;
}
