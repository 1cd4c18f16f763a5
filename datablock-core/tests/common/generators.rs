//! Stochastic content generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("DATABLOCK_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    /// Returns 0, 1, 2, ... with decreasing probability
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Poisson-like count (simplified)
    pub fn poisson(&mut self, lambda: f64) -> usize {
        let l = (-lambda).exp();
        let mut k = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.rng.gen::<f64>();
            if p <= l {
                break;
            }
        }
        k - 1
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Random bare identifier, prefixed so it never collides with wrapper names
    pub fn name(&mut self) -> String {
        let len = 1 + self.geometric(0.7);
        let chars = b"abcdefghijklmnopqrstuvwxyz0123456789-_.";
        let mut name = String::from("n_");
        for _ in 0..len {
            name.push(char::from(chars[self.rng.gen_range(0..chars.len())]));
        }
        name
    }

    /// Random integer literal
    pub fn integer(&mut self) -> String {
        let val: i32 = self.rng.gen_range(-9999..9999);
        val.to_string()
    }

    /// Random valid statement (for context wrapping)
    pub fn fragment(&mut self, indent: usize) -> String {
        let mut out = " ".repeat(indent);
        out.push_str(&self.name());

        match self.rng.gen_range(0..3) {
            0 => {
                out.push_str(":S32 = ");
                out.push_str(&self.integer());
            }
            1 => out.push_str("{}"),
            _ => {
                out.push_str(" { ");
                out.push_str(&self.name());
                out.push_str(":Bool = true }");
            }
        }

        if self.chance(0.2) {
            out.push_str(" // noise");
        }
        out.push('\n');
        out
    }

    /// Random indent width (geometric, α=0.5)
    pub fn indent_level(&mut self) -> usize {
        self.geometric(0.5) * 2 // 2 spaces per level
    }

    /// Inject random blank lines
    pub fn blank_lines(&mut self) -> String {
        let count = self.geometric(0.1); // Usually 0
        "\n".repeat(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut g1 = Gen::new(42);
        let mut g2 = Gen::new(42);

        for _ in 0..10 {
            assert_eq!(g1.name(), g2.name());
            assert_eq!(g1.geometric(0.9), g2.geometric(0.9));
        }
    }

    #[test]
    fn test_geometric_distribution() {
        let mut gen = Gen::new(12345);
        let samples: Vec<usize> = (0..1000).map(|_| gen.geometric(0.9)).collect();

        // With α=0.9, we expect mean ≈ 9 (geometric mean = α/(1-α))
        let mean: f64 = samples.iter().sum::<usize>() as f64 / samples.len() as f64;
        assert!(mean > 5.0 && mean < 15.0, "Mean {} out of expected range", mean);
    }

    #[test]
    fn test_fragments_parse() {
        let mut gen = Gen::new(7);
        for _ in 0..50 {
            let fragment = gen.fragment(2);
            assert!(
                datablock_core::Block::parse(&fragment).is_ok(),
                "fragment does not parse: {fragment:?}"
            );
        }
    }
}
