//! Kickoff search crate - alpha-beta over complete turns, run off-thread.

mod alphabeta;
mod worker;

pub use alphabeta::{search, SearchConfig, SearchOutcome, INFINITY};
pub use worker::{RequestId, SearchError, SearchReply, SearchWorker};
