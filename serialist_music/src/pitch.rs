// Pitch snapping and octave placement.
//
// Two steps turn a row pitch into a playable note for one voice:
//
// 1. `snap` moves the note to the nearest allowed pitch class (circular
//    distance on the 12-class clock, ties broken uniformly at random), then
//    keeps whichever of the candidate one octave down, at, or up lies closest
//    to the original note. When two of those candidates are equally close
//    the lower one wins.
// 2. `place_in_range` keeps the pitch class and picks uniformly among every
//    octave placement inside the voice's inclusive range. If none exists the
//    note is dropped (`None`). That is a normal outcome, not an error.
//
// `map_row` applies both steps to a whole row; the result can be shorter than
// 12 when the range drops notes.

use serialist_prng::SerialRng;

use crate::row::Row;
use crate::scale::PitchClassSet;

pub fn pitch_class(note: i32) -> u8 {
    note.rem_euclid(12) as u8
}

/// Shortest distance between two pitch classes around the octave.
pub fn circular_distance(a: u8, b: u8) -> u8 {
    let d = (i16::from(a) - i16::from(b)).unsigned_abs() as u8 % 12;
    d.min(12 - d)
}

/// Move `note` onto the nearest pitch class in `set`.
pub fn snap(note: i32, set: &PitchClassSet, rng: &mut SerialRng) -> i32 {
    let classes = match set {
        PitchClassSet::Unconstrained => return note,
        PitchClassSet::Classes(v) if v.is_empty() => return note,
        PitchClassSet::Classes(v) => v,
    };

    let pc = pitch_class(note);
    let best = classes
        .iter()
        .map(|&c| circular_distance(c, pc))
        .min()
        .unwrap_or(0);
    let closest: Vec<u8> = classes
        .iter()
        .copied()
        .filter(|&c| circular_distance(c, pc) == best)
        .collect();
    let chosen = rng.choose(&closest).copied().unwrap_or(pc);

    let candidate = note.div_euclid(12) * 12 + i32::from(chosen);
    [candidate - 12, candidate, candidate + 12]
        .into_iter()
        .min_by_key(|n| (n - note).abs())
        .unwrap_or(candidate)
}

/// Every placement of `note`'s pitch class inside `[lower, upper]`.
pub fn placements(note: i32, lower: i32, upper: i32) -> Vec<i32> {
    if lower > upper {
        return Vec::new();
    }
    let pc = i32::from(pitch_class(note));
    (lower.div_euclid(12)..=upper.div_euclid(12))
        .map(|octave| octave * 12 + pc)
        .filter(|n| (lower..=upper).contains(n))
        .collect()
}

/// Relocate `note` to a random octave inside `[lower, upper]`, or drop it.
pub fn place_in_range(note: i32, lower: i32, upper: i32, rng: &mut SerialRng) -> Option<i32> {
    rng.choose(&placements(note, lower, upper)).copied()
}

/// Snap and place every note of `row`, skipping the ones that drop out.
pub fn map_row(
    row: &Row,
    set: &PitchClassSet,
    lower: i32,
    upper: i32,
    rng: &mut SerialRng,
) -> Vec<i32> {
    row.pitches()
        .iter()
        .filter_map(|&note| {
            let snapped = snap(note, set, rng);
            place_in_range(snapped, lower, upper, rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triad() -> PitchClassSet {
        PitchClassSet::classes(&[0, 4, 7])
    }

    #[test]
    fn circular_distance_wraps() {
        assert_eq!(circular_distance(0, 11), 1);
        assert_eq!(circular_distance(11, 0), 1);
        assert_eq!(circular_distance(2, 8), 6);
        assert_eq!(circular_distance(5, 5), 0);
    }

    #[test]
    fn unconstrained_snap_is_identity() {
        let mut rng = SerialRng::new(1);
        for note in 0..128 {
            assert_eq!(snap(note, &PitchClassSet::Unconstrained, &mut rng), note);
        }
    }

    #[test]
    fn snap_lands_on_allowed_classes() {
        let mut rng = SerialRng::new(2);
        let set = triad();
        for note in 36..96 {
            let snapped = snap(note, &set, &mut rng);
            assert!(set.contains(pitch_class(snapped)), "{note} -> {snapped}");
            assert!((snapped - note).abs() <= 6, "{note} -> {snapped}");
        }
    }

    #[test]
    fn snap_crosses_octave_boundary_to_nearest() {
        let mut rng = SerialRng::new(3);
        // B4 (71) is one semitone from C5 (72), not eleven from C4.
        assert_eq!(snap(71, &PitchClassSet::classes(&[0]), &mut rng), 72);
        // C4 (60) nearest to B is B3 (59).
        assert_eq!(snap(60, &PitchClassSet::classes(&[11]), &mut rng), 59);
    }

    #[test]
    fn snap_ties_pick_either_class() {
        let mut rng = SerialRng::new(4);
        // D (62) is two semitones from both C and E.
        let set = PitchClassSet::classes(&[0, 4]);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(snap(62, &set, &mut rng));
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![60, 64]);
    }

    #[test]
    fn tritone_tie_prefers_lower_octave() {
        let mut rng = SerialRng::new(5);
        // C4 against {F#}: F#3 and F#4 are both six semitones away.
        assert_eq!(snap(60, &PitchClassSet::classes(&[6]), &mut rng), 54);
    }

    #[test]
    fn placement_stays_in_range_and_keeps_class() {
        let mut rng = SerialRng::new(6);
        for note in 60..72 {
            for _ in 0..20 {
                let placed = place_in_range(note, 50, 80, &mut rng).unwrap();
                assert!((50..=80).contains(&placed));
                assert_eq!(pitch_class(placed), pitch_class(note));
            }
        }
    }

    #[test]
    fn placement_uses_every_octave() {
        let mut rng = SerialRng::new(7);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(place_in_range(60, 36, 84, &mut rng).unwrap());
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![36, 48, 60, 72, 84]);
    }

    #[test]
    fn inverted_or_empty_range_drops_everything() {
        let mut rng = SerialRng::new(8);
        for note in 0..128 {
            assert_eq!(place_in_range(note, 80, 60, &mut rng), None);
        }
        // [61, 62] holds only C# and D.
        assert_eq!(place_in_range(60, 61, 62, &mut rng), None);
        assert_eq!(place_in_range(73, 61, 62, &mut rng), Some(61));
    }

    #[test]
    fn map_row_can_shrink() {
        let mut rng = SerialRng::new(9);
        let row = Row::generate(&mut rng, 60);
        let full = map_row(&row, &PitchClassSet::Unconstrained, 0, 127, &mut rng);
        assert_eq!(full.len(), 12);

        // A five-semitone window keeps five of the twelve classes.
        let narrow = map_row(&row, &PitchClassSet::Unconstrained, 60, 64, &mut rng);
        assert_eq!(narrow.len(), 5);
        assert!(narrow.iter().all(|n| (60..=64).contains(n)));

        let none = map_row(&row, &triad(), 90, 80, &mut rng);
        assert!(none.is_empty());
    }
}
