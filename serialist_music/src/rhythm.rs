// Duration tokens and complexity-weighted duration sampling.
//
// Complexity (0-100) opens up finer subdivisions tier by tier. Each tier
// spans 25 points and introduces one new, finer duration whose weight grows
// linearly from zero to the tier's maximum share (0.5, 0.333, 0.25, 0.2),
// while the coarser durations give up weight evenly:
//
//   c <= 0       : always a half note
//   (0, 25]      : 2n 4n
//   (25, 50]     : 2n 4n 8n
//   (50, 75]     : 2n 4n 8n 16n
//   (75, 100]    : 2n 4n 8n 16n 32n
//
// At the top of each tier the weights are (close to) uniform across the
// durations in play, which is where the next tier starts from.

use std::fmt;

use serde::{Deserialize, Serialize};
use serialist_prng::SerialRng;

/// Symbolic note length, serialized as the transport's token (`"4n"` etc.).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Duration {
    #[serde(rename = "2n")]
    Half,
    #[serde(rename = "4n")]
    Quarter,
    #[serde(rename = "8n")]
    Eighth,
    #[serde(rename = "16n")]
    Sixteenth,
    #[serde(rename = "32n")]
    ThirtySecond,
}

impl Duration {
    /// Longest to shortest.
    pub const ALL: [Duration; 5] = [
        Duration::Half,
        Duration::Quarter,
        Duration::Eighth,
        Duration::Sixteenth,
        Duration::ThirtySecond,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Duration::Half => "2n",
            Duration::Quarter => "4n",
            Duration::Eighth => "8n",
            Duration::Sixteenth => "16n",
            Duration::ThirtySecond => "32n",
        }
    }

    /// Length in quarter-note beats.
    pub fn beats(self) -> f64 {
        match self {
            Duration::Half => 2.0,
            Duration::Quarter => 1.0,
            Duration::Eighth => 0.5,
            Duration::Sixteenth => 0.25,
            Duration::ThirtySecond => 0.125,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Unnormalized weights over `Duration::ALL` for a complexity value.
pub fn duration_weights(complexity: u8) -> [f64; 5] {
    let c = f64::from(complexity);
    if c <= 0.0 {
        [1.0, 0.0, 0.0, 0.0, 0.0]
    } else if c <= 25.0 {
        let p = c / 25.0;
        [1.0 - 0.5 * p, 0.5 * p, 0.0, 0.0, 0.0]
    } else if c <= 50.0 {
        let p = (c - 25.0) / 25.0;
        let coarse = 0.5 - 0.167 * p;
        [coarse, coarse, 0.333 * p, 0.0, 0.0]
    } else if c <= 75.0 {
        let p = (c - 50.0) / 25.0;
        let coarse = 0.333 - 0.083 * p;
        [coarse, coarse, coarse, 0.25 * p, 0.0]
    } else {
        let p = (c - 75.0) / 25.0;
        let coarse = 0.25 - 0.05 * p;
        [coarse, coarse, coarse, coarse, 0.2 * p]
    }
}

/// Draw one duration for the given complexity.
pub fn sample_duration(complexity: u8, rng: &mut SerialRng) -> Duration {
    rng.weighted_index(&duration_weights(complexity))
        .map_or(Duration::Half, |i| Duration::ALL[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(complexity: u8, draws: usize) -> [usize; 5] {
        let mut rng = SerialRng::new(u64::from(complexity) + 100);
        let mut counts = [0; 5];
        for _ in 0..draws {
            let d = sample_duration(complexity, &mut rng);
            counts[Duration::ALL.iter().position(|&x| x == d).unwrap()] += 1;
        }
        counts
    }

    #[test]
    fn zero_complexity_is_always_half() {
        assert_eq!(histogram(0, 1000), [1000, 0, 0, 0, 0]);
    }

    #[test]
    fn full_complexity_uses_every_duration() {
        let counts = histogram(100, 5000);
        for (d, n) in Duration::ALL.iter().zip(counts) {
            assert!(n > 500, "{d} drawn only {n} times");
        }
    }

    #[test]
    fn tiers_gate_finer_durations() {
        assert_eq!(histogram(25, 2000)[2..], [0, 0, 0]);
        assert_eq!(histogram(50, 2000)[3..], [0, 0]);
        assert_eq!(histogram(75, 2000)[4], 0);
        assert!(histogram(26, 4000)[2] > 0);
        assert!(histogram(76, 4000)[4] > 0);
    }

    #[test]
    fn tier_tops_are_balanced() {
        let w = duration_weights(25);
        assert!((w[0] - 0.5).abs() < 1e-9 && (w[1] - 0.5).abs() < 1e-9);
        let w = duration_weights(50);
        for x in &w[..3] {
            assert!((x - 0.333).abs() < 0.001, "{w:?}");
        }
        let w = duration_weights(75);
        for x in &w[..4] {
            assert!((x - 0.25).abs() < 0.001, "{w:?}");
        }
        let w = duration_weights(100);
        for x in w {
            assert!((x - 0.2).abs() < 1e-9, "{w:?}");
        }
    }

    #[test]
    fn tokens_serialize_as_transport_strings() {
        assert_eq!(serde_json::to_string(&Duration::Sixteenth).unwrap(), "\"16n\"");
        let d: Duration = serde_json::from_str("\"2n\"").unwrap();
        assert_eq!(d, Duration::Half);
        assert_eq!(Duration::ThirtySecond.to_string(), "32n");
    }
}
