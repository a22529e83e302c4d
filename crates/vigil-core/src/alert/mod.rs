mod hold;
mod machine;
mod tap;

pub use hold::{HoldRelease, HoldTick, HoldTracker, CHECKPOINTS, HOLD_TICK, TICKS_TO_CLEAR};
pub use machine::{AlertMachine, AlertPhase, GRACE_PERIOD};
pub use tap::{
    DecayTick, TapAccumulator, TapOutcome, COMMIT_DELAY, DECAY_STEP, DECAY_TICK,
    INTER_TAP_TIMEOUT, PROGRESS_PER_TAP, TAPS_TO_RAISE, TAP_WINDOW_MS,
};
