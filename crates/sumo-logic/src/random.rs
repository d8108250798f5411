//! Seeded pseudo-random number generator
//!
//! Deterministic PRNG for reproducible series.
//! Uses a simple but effective xorshift algorithm and plugs into `rand`
//! through `RngCore`, so samplers accept it or any other generator.

use std::cell::RefCell;
use std::rc::Rc;

use rand::RngCore;

use crate::combatant::Side;

/// Seeded random number generator
///
/// Deterministic: same seed + stream = same sequence
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed and stream index
    pub fn new(seed: &[u8; 32], stream: u32) -> Self {
        // Combine seed bytes into initial state
        let mut state = 0u64;
        for (i, chunk) in seed.chunks(8).enumerate() {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            state ^= u64::from_le_bytes(bytes).wrapping_add(i as u64);
        }

        // Mix in stream index
        state ^= (stream as u64).wrapping_mul(0x517cc1b727220a95);

        Self::warmed(state)
    }

    /// Create a new RNG from a plain integer seed
    pub fn from_seed_u64(seed: u64) -> Self {
        Self::warmed(seed.wrapping_mul(0x9e3779b97f4a7c15) ^ 0x2545f4914f6cdd1d)
    }

    /// Independent stream for one side of the board.
    ///
    /// Left and right draws never share state, so one side's sampling
    /// cannot shift the other's sequence.
    pub fn for_side(&self, side: Side) -> Self {
        let salt = match side {
            Side::Left => 1u64,
            Side::Right => 2u64,
        };
        Self::warmed(self.state ^ salt.wrapping_mul(0x9e3779b97f4a7c15))
    }

    fn warmed(state: u64) -> Self {
        // xorshift has a fixed point at zero
        let state = if state == 0 { 0x9e3779b97f4a7c15 } else { state };
        let mut rng = Self { state };
        for _ in 0..8 {
            rng.step();
        }
        rng
    }

    fn step(&mut self) -> u64 {
        // xorshift64*
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545f4914f6cdd1d)
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// One generator drawn from by several owners.
///
/// Clones share the same underlying state, so handing one clone to each
/// side makes them interleave draws from a single stream.
#[derive(Debug)]
pub struct SharedRng<R> {
    inner: Rc<RefCell<R>>,
}

impl<R> SharedRng<R> {
    pub fn new(rng: R) -> Self {
        Self {
            inner: Rc::new(RefCell::new(rng)),
        }
    }
}

impl<R> Clone for SharedRng<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: RngCore> RngCore for SharedRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.inner.borrow_mut().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.borrow_mut().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.borrow_mut().fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.borrow_mut().try_fill_bytes(dest)
    }
}
