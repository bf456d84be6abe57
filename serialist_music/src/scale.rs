// Dissonance-driven pitch-class set selection.
//
// A `ScaleBank` is an ordered table of disjoint half-open dissonance bands
// `[low, high)`. Each band holds one or two named pitch-class sets. For a
// dissonance level `d`:
// - one candidate: it is returned as-is
// - two candidates: the first is weighted `high - d`, the second `d - low`,
//   so moving through the band crossfades from the first colour to the second
// - no band matches: the unconstrained set (no snapping)
//
// The last band is closed at its top edge so that `d == 1.0` resolves.
//
// The default bank climbs from a plain C major triad through seventh and
// ninth chords, altered and half-diminished colours, diminished and
// augmented sevenths, and finally no constraint at all.

use serde::{Deserialize, Serialize};
use serialist_prng::SerialRng;

use crate::error::ScaleBankError;

/// Allowed pitch classes, or no constraint.
///
/// On the wire and in config files this is `null` (unconstrained) or an
/// array of pitch classes. Classes are reduced mod 12, sorted and
/// deduplicated, so a ninth written as 14 becomes 2. An empty array also
/// means unconstrained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<i32>>", into = "Option<Vec<i32>>")]
pub enum PitchClassSet {
    Unconstrained,
    Classes(Vec<u8>),
}

impl PitchClassSet {
    pub fn classes(pcs: &[i32]) -> PitchClassSet {
        let mut v: Vec<u8> = pcs.iter().map(|pc| pc.rem_euclid(12) as u8).collect();
        v.sort_unstable();
        v.dedup();
        if v.is_empty() {
            PitchClassSet::Unconstrained
        } else {
            PitchClassSet::Classes(v)
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, PitchClassSet::Unconstrained)
    }

    pub fn contains(&self, pc: u8) -> bool {
        match self {
            PitchClassSet::Unconstrained => true,
            PitchClassSet::Classes(v) => v.contains(&(pc % 12)),
        }
    }
}

impl From<Option<Vec<i32>>> for PitchClassSet {
    fn from(value: Option<Vec<i32>>) -> Self {
        match value {
            Some(pcs) => PitchClassSet::classes(&pcs),
            None => PitchClassSet::Unconstrained,
        }
    }
}

impl From<PitchClassSet> for Option<Vec<i32>> {
    fn from(value: PitchClassSet) -> Self {
        match value {
            PitchClassSet::Unconstrained => None,
            PitchClassSet::Classes(v) => Some(v.into_iter().map(i32::from).collect()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedSet {
    pub name: String,
    #[serde(default = "unconstrained")]
    pub classes: PitchClassSet,
}

fn unconstrained() -> PitchClassSet {
    PitchClassSet::Unconstrained
}

impl NamedSet {
    pub fn new(name: &str, pcs: &[i32]) -> NamedSet {
        NamedSet {
            name: name.to_owned(),
            classes: PitchClassSet::classes(pcs),
        }
    }

    pub fn unconstrained(name: &str) -> NamedSet {
        NamedSet {
            name: name.to_owned(),
            classes: PitchClassSet::Unconstrained,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
    pub candidates: Vec<NamedSet>,
}

impl Band {
    pub fn new(low: f64, high: f64, candidates: Vec<NamedSet>) -> Band {
        Band {
            low,
            high,
            candidates,
        }
    }

    /// Crossfade weights for a two-candidate band at dissonance `d`.
    pub fn crossfade_weights(&self, d: f64) -> [f64; 2] {
        [self.high - d, d - self.low]
    }
}

/// The set picked for a batch, borrowed from the bank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleChoice<'a> {
    pub name: &'a str,
    pub set: &'a PitchClassSet,
}

static UNCONSTRAINED: PitchClassSet = PitchClassSet::Unconstrained;

/// Validated, ordered table of dissonance bands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Band>", into = "Vec<Band>")]
pub struct ScaleBank {
    bands: Vec<Band>,
}

impl ScaleBank {
    pub fn new(bands: Vec<Band>) -> Result<ScaleBank, ScaleBankError> {
        if bands.is_empty() {
            return Err(ScaleBankError::Empty);
        }
        for (index, band) in bands.iter().enumerate() {
            if !band.low.is_finite() || !band.high.is_finite() || band.low >= band.high {
                return Err(ScaleBankError::BadBounds {
                    index,
                    low: band.low,
                    high: band.high,
                });
            }
            let count = band.candidates.len();
            if !(1..=2).contains(&count) {
                return Err(ScaleBankError::CandidateCount { index, count });
            }
            if index > 0 && bands[index - 1].high > band.low {
                return Err(ScaleBankError::Unordered { index });
            }
        }
        Ok(ScaleBank { bands })
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// The band containing `d`: half-open, except the last band which also
    /// takes its upper edge.
    pub fn band_for(&self, d: f64) -> Option<&Band> {
        let last = self.bands.len() - 1;
        self.bands.iter().enumerate().find_map(|(i, band)| {
            let inside = band.low <= d && (d < band.high || (i == last && d == band.high));
            inside.then_some(band)
        })
    }

    /// Pick the pitch-class set for dissonance level `d`.
    pub fn select(&self, d: f64, rng: &mut SerialRng) -> ScaleChoice<'_> {
        let Some(band) = self.band_for(d) else {
            return ScaleChoice {
                name: "None",
                set: &UNCONSTRAINED,
            };
        };
        let picked = match band.candidates.as_slice() {
            [only] => only,
            [first, second] => {
                match rng.weighted_index(&band.crossfade_weights(d)) {
                    Some(1) => second,
                    _ => first,
                }
            }
            // Banks are validated to hold one or two candidates.
            _ => &band.candidates[0],
        };
        ScaleChoice {
            name: &picked.name,
            set: &picked.classes,
        }
    }
}

impl TryFrom<Vec<Band>> for ScaleBank {
    type Error = ScaleBankError;

    fn try_from(bands: Vec<Band>) -> Result<Self, Self::Error> {
        ScaleBank::new(bands)
    }
}

impl From<ScaleBank> for Vec<Band> {
    fn from(bank: ScaleBank) -> Self {
        bank.bands
    }
}

impl Default for ScaleBank {
    fn default() -> Self {
        ScaleBank {
            bands: vec![
                Band::new(0.0, 0.1, vec![NamedSet::new("Cmaj", &[0, 4, 7])]),
                Band::new(
                    0.1,
                    0.3,
                    vec![
                        NamedSet::new("Cmaj7", &[0, 4, 7, 11]),
                        NamedSet::new("Cadd9", &[0, 4, 7, 14]),
                    ],
                ),
                Band::new(
                    0.3,
                    0.5,
                    vec![
                        NamedSet::new("Cm7", &[0, 3, 7, 10]),
                        NamedSet::new("Cm9", &[0, 3, 7, 10, 14]),
                    ],
                ),
                Band::new(
                    0.5,
                    0.7,
                    vec![
                        NamedSet::new("C7alt", &[0, 4, 8, 10]),
                        NamedSet::new("Cm7b5", &[0, 3, 6, 10]),
                    ],
                ),
                Band::new(
                    0.7,
                    0.9,
                    vec![
                        NamedSet::new("Cdim7", &[0, 3, 6, 9]),
                        NamedSet::new("Caugm7", &[0, 4, 8, 10]),
                    ],
                ),
                Band::new(0.9, 1.0, vec![NamedSet::unconstrained("None")]),
            ],
        }
    }
}
