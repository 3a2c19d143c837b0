pub mod progress_channel;

pub use progress_channel::{progress_channel, ProgressReceiver, ProgressSender, TryReceive};
