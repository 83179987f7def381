//! System implementations of the clock and randomness ports.

use chrono::{DateTime, Utc};
use emberrun_domain::CharacterId;
use rand::seq::SliceRandom;
use rand::Rng;

use super::ports::{ClockPort, RandomPort};

#[derive(Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Default)]
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomPort for SystemRandom {
    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn coin_flip(&self) -> bool {
        rand::thread_rng().gen_bool(0.5)
    }

    fn shuffle_characters(&self, ids: &mut Vec<CharacterId>) {
        ids.shuffle(&mut rand::thread_rng());
    }
}
