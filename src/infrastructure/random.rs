use crate::domain::ports::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Production randomness backed by the thread-local rng.
#[derive(Default, Clone)]
pub struct ThreadRngSource;

impl ThreadRngSource {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRngSource {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

/// Reproducible randomness from a fixed seed.
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_f64(&self) -> f64 {
        self.rng.lock().unwrap().r#gen::<f64>()
    }
}

/// Plays back a scripted sequence of draws, then repeats the final value.
/// Lets tests pin the outcome draw, the processing-time draw, or the WIFI
/// flakiness draw independently.
pub struct ScriptedSource {
    values: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedSource {
    pub fn new(values: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
            fallback,
        }
    }

    /// A source that always returns the same value.
    pub fn constant(value: f64) -> Self {
        Self::new([], value)
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&self) -> f64 {
        self.values
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback)
    }
}
