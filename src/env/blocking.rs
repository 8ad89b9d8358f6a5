use std::future::Future;

use tokio::runtime::{Builder, Runtime};

use super::{AsyncEnv, Env, EnvError, Transition};

/// Drives an [`AsyncEnv`] on a private current-thread runtime so it can be
/// used through the synchronous [`Env`] contract.
///
/// Must not be used from inside another tokio runtime.
pub struct BlockingEnv<E> {
    // Declared before `runtime` so the environment is dropped while the
    // runtime still exists.
    env: E,
    runtime: Runtime,
}

impl<E: AsyncEnv> BlockingEnv<E> {
    pub fn new<F, Fut>(make_env: F) -> Result<Self, EnvError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<E, EnvError>>,
    {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EnvError::Runtime)?;
        let env = runtime.block_on(make_env())?;
        Ok(Self { env, runtime })
    }

    pub fn get_ref(&self) -> &E {
        &self.env
    }

    pub fn get_mut(&mut self) -> &mut E {
        &mut self.env
    }
}

impl<E: AsyncEnv> Env for BlockingEnv<E> {
    type Obs = E::Obs;
    type Act = E::Act;
    type Info = E::Info;

    fn reset(&mut self) -> Result<(), EnvError> {
        self.runtime.block_on(self.env.reset())
    }

    fn step(&mut self, act: Self::Act) -> Result<Transition<Self::Obs, Self::Info>, EnvError> {
        self.runtime.block_on(self.env.step(act))
    }

    fn render(&mut self) -> Result<(), EnvError> {
        self.runtime.block_on(self.env.render())
    }

    fn close(&mut self) -> Result<(), EnvError> {
        self.runtime.block_on(self.env.close())
    }
}
