//! Level/chapter unlock state machine

mod machine;

pub use machine::{AccessCheck, ProgressionMachine, UnlockOutcome, UserProgress};
