pub mod pacing;
pub mod reporter;
pub mod suspend;

pub use pacing::{Pacer, RandomPacer};
pub use reporter::{ChannelReporter, Reporter};
pub use suspend::{PollOptions, Sleeper, Suspender, TokioSleeper, WaitOutcome};
