pub mod channel;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod worker;

pub use channel::{DepthChannel, MessageChannel, SyncChannel};
pub use error::{ChannelError, WorkerError};
pub use protocol::{DepthReply, DepthRequest, SyncReply, SyncRequest, WorkerReady};
pub use worker::{Shutdown, WorkerProcess};
