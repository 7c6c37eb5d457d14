use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, trace};

use super::engine::{Reveal, RevealFrame, RevealRng, RevealStep};

/// Cooperative timer used between reveal steps
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Real timers on the tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Virtual time: returns immediately and records how long it would have slept
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    elapsed: Mutex<Duration>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Scheduler for VirtualScheduler {
    async fn sleep(&self, delay: Duration) {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner()) += delay;
        tokio::task::yield_now().await;
    }
}

/// How a call to [`Typewriter::play`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The text was fully revealed during this call.
    Completed,
    /// Nothing to do: no text, or it was already fully revealed.
    Idle,
    /// The text changed while playing; this chain stopped.
    Superseded,
}

type CompletionCallback = Box<dyn FnMut(&str) + Send>;

struct Current<R> {
    text: String,
    reveal: Reveal<R>,
    /// Last committed frame. Lags `reveal` while a step is waiting out its delay.
    shown: RevealFrame,
    fired: bool,
}

struct Inner<R> {
    generation: u64,
    current: Option<Current<R>>,
    make_rng: Box<dyn FnMut() -> R + Send>,
    on_complete: Option<CompletionCallback>,
}

/// Typewriter effect for the most recent assistant message.
///
/// Cloning gives another handle to the same state. Setting a different text
/// starts a new generation: any `play` loop still running for the old text
/// stops at its next step and never fires the callback.
pub struct Typewriter<R> {
    inner: Arc<Mutex<Inner<R>>>,
}

impl<R> Clone for Typewriter<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RevealRng + Send + 'static> Typewriter<R> {
    /// `make_rng` is called once per distinct text.
    pub fn new(make_rng: impl FnMut() -> R + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                current: None,
                make_rng: Box::new(make_rng),
                on_complete: None,
            })),
        }
    }

    /// Register the callback fired once per text when it becomes fully visible.
    /// It must not call back into this typewriter.
    pub fn on_complete(self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.lock().on_complete = Some(Box::new(callback));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Show `text`. Returns `false` when it is already the current text, in
    /// which case nothing is reset.
    pub fn set_text(&self, text: &str) -> bool {
        let mut inner = self.lock();
        if inner.current.as_ref().is_some_and(|c| c.text == text) {
            return false;
        }
        let rng = (inner.make_rng)();
        let reveal = Reveal::new(text, rng);
        inner.generation += 1;
        inner.current = Some(Current {
            text: text.to_string(),
            shown: reveal.frame(),
            reveal,
            fired: false,
        });
        debug!(generation = inner.generation, chars = text.len(), "Typewriter reset");
        true
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Frame as last committed, if a text is set
    pub fn frame(&self) -> Option<RevealFrame> {
        self.lock().current.as_ref().map(|c| c.shown.clone())
    }

    pub fn is_complete(&self) -> bool {
        self.lock()
            .current
            .as_ref()
            .is_some_and(|c| c.shown.complete)
    }

    /// Advance one step without waiting. Fires the callback on the completing step.
    pub fn step(&self) -> Option<RevealStep> {
        let generation = self.generation();
        let step = self.next_step(generation)?;
        self.commit(generation, &step);
        Some(step)
    }

    fn next_step(&self, generation: u64) -> Option<RevealStep> {
        let mut inner = self.lock();
        if inner.generation != generation {
            return None;
        }
        inner.current.as_mut().and_then(|c| c.reveal.next())
    }

    /// Make `step` the shown frame and fire the callback if it completed the
    /// text of `generation`. Returns `false` when the generation is stale.
    fn commit(&self, generation: u64, step: &RevealStep) -> bool {
        let (callback, text) = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return false;
            }
            let Some(current) = inner.current.as_mut() else {
                return false;
            };
            current.shown = step.frame.clone();
            if !step.frame.complete || current.fired {
                return true;
            }
            current.fired = true;
            let text = current.text.clone();
            (inner.on_complete.take(), text)
        };

        if let Some(mut callback) = callback {
            callback(&text);
            let mut inner = self.lock();
            if inner.on_complete.is_none() {
                inner.on_complete = Some(callback);
            }
        }
        true
    }

    /// Reveal the current text in real (or virtual) time, calling `render`
    /// after every step.
    pub async fn play<S, F>(&self, scheduler: &S, mut render: F) -> PlayOutcome
    where
        S: Scheduler + ?Sized,
        F: FnMut(&RevealFrame) + Send,
    {
        let generation = self.generation();
        let mut advanced = false;

        loop {
            let Some(step) = self.next_step(generation) else {
                if self.generation() != generation {
                    return PlayOutcome::Superseded;
                }
                return if advanced {
                    PlayOutcome::Completed
                } else {
                    PlayOutcome::Idle
                };
            };
            advanced = true;

            scheduler.sleep(step.delay).await;

            if !self.commit(generation, &step) {
                trace!(generation, "Typewriter chain superseded");
                return PlayOutcome::Superseded;
            }
            render(&step.frame);

            if step.frame.complete {
                return PlayOutcome::Completed;
            }
        }
    }
}
