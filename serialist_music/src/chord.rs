// Chord-size sampling.
//
// A chord-probability percentage decides how many consecutive row notes
// sound together on a tick. Up to 50% it is a plain two-note chance; above
// 50% a three-note share of up to 33% opens up and the rest is split evenly
// between two notes and one. The sequencer caps the result at the number of
// notes left in the active sequence.

use serialist_prng::SerialRng;

/// Largest share (in percent) of three-note chords, reached at 100%.
pub const MAX_TRIAD_SHARE: f64 = 33.0;

/// Sample a chord size in `1..=3` for `chord_probability` (percent).
pub fn uncapped_chord_size(chord_probability: f64, rng: &mut SerialRng) -> usize {
    if chord_probability <= 0.0 {
        return 1;
    }
    let x = rng.next_f64() * 100.0;
    if chord_probability <= 50.0 {
        return if x < chord_probability { 2 } else { 1 };
    }
    let ratio = (chord_probability - 50.0) / 50.0;
    let triad_share = MAX_TRIAD_SHARE * ratio;
    let dyad_share = (100.0 - triad_share) / 2.0;
    if x < triad_share {
        3
    } else if x < triad_share + dyad_share {
        2
    } else {
        1
    }
}

/// Sample a chord size, never more than `remaining`.
pub fn chord_size(chord_probability: f64, remaining: usize, rng: &mut SerialRng) -> usize {
    uncapped_chord_size(chord_probability, rng).min(remaining)
}
