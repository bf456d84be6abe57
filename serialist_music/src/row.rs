// Twelve-tone rows and their derived forms.
//
// A `Row` is an ordering of the 12 chromatic pitch classes placed in one
// octave starting at a base pitch (MIDI 60 by default, so 60..=71). The type
// can only be built through constructors that preserve that invariant:
// `generate` (uniform shuffle), `from_pitches` (validated), and the three
// transforms.
//
// Transforms:
// - retrograde: reverse order, an involution
// - inversion: mirror each pitch around the first (`n -> 2b - n`), then fold
//   back into the base octave by pitch class. `n -> 2b - n (mod 12)` is a
//   bijection on pitch classes, so the fold of a permutation is again a
//   permutation.
// - retrograde inversion: retrograde of the inversion
//
// The four forms always travel together in a `RowBundle`, regenerated as a
// unit by the sequencer on replenishment.

use serde::{Deserialize, Serialize};
use serialist_prng::SerialRng;

use crate::error::RowError;

pub const ROW_LEN: usize = 12;

/// Fold any pitch into `[base, base + 12)` keeping its pitch class.
pub fn fold_into_octave(pitch: i32, base: i32) -> i32 {
    (pitch - base).rem_euclid(12) + base
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pitches: [i32; ROW_LEN],
}

impl Row {
    /// A uniformly random row in the octave starting at `base`.
    pub fn generate(rng: &mut SerialRng, base: i32) -> Row {
        let mut pitches: [i32; ROW_LEN] = std::array::from_fn(|i| base + i as i32);
        rng.shuffle(&mut pitches);
        Row { pitches }
    }

    /// Build a row from explicit pitches, checking that they are a
    /// permutation of the octave starting at `base`.
    pub fn from_pitches(pitches: [i32; ROW_LEN], base: i32) -> Result<Row, RowError> {
        let mut seen = [false; ROW_LEN];
        for (position, &pitch) in pitches.iter().enumerate() {
            if !(base..base + ROW_LEN as i32).contains(&pitch) {
                return Err(RowError::OutsideOctave {
                    pitch,
                    position,
                    base,
                });
            }
            let pc = (pitch - base) as usize;
            if seen[pc] {
                return Err(RowError::Repeated {
                    pitch_class: pitch.rem_euclid(12),
                });
            }
            seen[pc] = true;
        }
        Ok(Row { pitches })
    }

    pub fn pitches(&self) -> &[i32; ROW_LEN] {
        &self.pitches
    }

    pub fn first(&self) -> i32 {
        self.pitches[0]
    }

    pub fn retrograde(&self) -> Row {
        let mut pitches = self.pitches;
        pitches.reverse();
        Row { pitches }
    }

    /// Mirror around the first pitch and fold back into the octave at `base`.
    pub fn inversion(&self, base: i32) -> Row {
        let axis = self.first();
        Row {
            pitches: self.pitches.map(|n| fold_into_octave(2 * axis - n, base)),
        }
    }

    pub fn retrograde_inversion(&self, base: i32) -> Row {
        self.inversion(base).retrograde()
    }
}

/// Which of the four related forms a row is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowForm {
    Prime,
    Retrograde,
    Inversion,
    RetrogradeInversion,
}

impl RowForm {
    pub const ALL: [RowForm; 4] = [
        RowForm::Prime,
        RowForm::Retrograde,
        RowForm::Inversion,
        RowForm::RetrogradeInversion,
    ];
}

/// A prime row together with its three derived forms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBundle {
    pub prime: Row,
    pub retrograde: Row,
    pub inversion: Row,
    pub retrograde_inversion: Row,
}

impl RowBundle {
    pub fn from_prime(prime: Row, base: i32) -> RowBundle {
        let retrograde = prime.retrograde();
        let inversion = prime.inversion(base);
        let retrograde_inversion = inversion.retrograde();
        RowBundle {
            prime,
            retrograde,
            inversion,
            retrograde_inversion,
        }
    }

    pub fn generate(rng: &mut SerialRng, base: i32) -> RowBundle {
        RowBundle::from_prime(Row::generate(rng, base), base)
    }

    pub fn form(&self, form: RowForm) -> &Row {
        match form {
            RowForm::Prime => &self.prime,
            RowForm::Retrograde => &self.retrograde,
            RowForm::Inversion => &self.inversion,
            RowForm::RetrogradeInversion => &self.retrograde_inversion,
        }
    }

    /// Pick one of the four forms uniformly.
    pub fn choose(&self, rng: &mut SerialRng) -> (RowForm, &Row) {
        let form = RowForm::ALL[rng.range_usize(0, RowForm::ALL.len())];
        (form, self.form(form))
    }
}
