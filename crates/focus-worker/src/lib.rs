//! Landmark recording replay.
//!
//! Drives the attention monitor against a recorded detector stream and
//! produces the session report, without a camera or a landmark model.

pub mod config;
pub mod error;
pub mod logging;
pub mod replay;

pub use config::ReplayConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::SessionLogger;
pub use replay::{load_recording, parse_recording, run_replay};
