//! Typewriter reveal for assistant replies.
//!
//! [`Reveal`] is the pure, lazy step sequence for one text. [`Typewriter`]
//! owns the reveal of the most recent message, fires its completion callback
//! once, and cancels stale timer chains when the text changes.

mod engine;
mod typewriter;

pub use engine::{
    segment_groups, GlyphStyle, Reveal, RevealFrame, RevealRng, RevealStep, StyledSpan,
    FLICKER_INTERVAL_MS, FRESH_TAIL, GROUP_SIZE, MAX_STEP_MS, MIN_STEP_MS,
};
pub use typewriter::{PlayOutcome, Scheduler, TokioScheduler, Typewriter, VirtualScheduler};
