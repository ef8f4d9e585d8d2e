//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Threads
//!
//! Every actor thread owns its own generator, derived from the run seed and
//! the actor id. Generators are never shared, so no draw ever waits on a
//! lock. The interleaving of threads is still up to the OS: same seed means
//! the same choices per actor, not the same global outcome.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use health_economy_core::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let batch = rng.range(1, 6); // [1, 6)
/// assert!((1..6).contains(&batch));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    pub fn new(seed: u64) -> Self {
        // Ensure seed is never zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create the generator of one actor
    ///
    /// The run seed and the actor id are mixed with a splitmix64 step so
    /// neighbouring ids get unrelated streams.
    ///
    /// # Example
    /// ```
    /// use health_economy_core::RngManager;
    ///
    /// let mut a = RngManager::for_actor(7, 0);
    /// let mut b = RngManager::for_actor(7, 0);
    /// assert_eq!(a.next(), b.next());
    /// ```
    pub fn for_actor(seed: u64, actor: usize) -> Self {
        let mut z = seed ^ (actor as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self::new(z ^ (z >> 31))
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Uniform index in [0, len)
    ///
    /// # Panics
    /// Panics if len is zero
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty range");
        (self.next() % len as u64) as usize
    }

    /// Uniform pick from a slice, `None` when it is empty
    ///
    /// # Example
    /// ```
    /// use health_economy_core::RngManager;
    ///
    /// let mut rng = RngManager::new(1);
    /// assert_eq!(rng.choose::<u8>(&[]), None);
    /// assert_eq!(rng.choose(&[42]), Some(&42));
    /// ```
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.index(items.len());
        items.get(idx)
    }
}
