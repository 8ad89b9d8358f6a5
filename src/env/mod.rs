mod blocking;
mod errors;
mod traits;
mod types;

pub use blocking::BlockingEnv;
pub use errors::{BoxError, EnvError};
pub use traits::{AsyncEnv, Env};
pub use types::{StepInfo, Transition};
