// MIDI export of generated note events.
//
// Lays a batch of `NoteEvent`s end to end on a single SMF track: each event
// starts where the previous one ended and lasts its duration token. Chords
// sound all their notes together; rests just advance time. Because every
// event carries its own jittered tempo, a tempo meta event is written
// whenever the tempo changes.
//
// Uses the `midly` crate. Output is SMF Format 0 at 480 ticks per quarter.

use std::io;
use std::path::Path;

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};

use crate::rhythm::Duration;
use crate::sequencer::NoteEvent;

const TICKS_PER_QUARTER: u16 = 480;

/// Length of a duration token in MIDI ticks.
pub fn duration_ticks(duration: Duration) -> u32 {
    (duration.beats() * f64::from(TICKS_PER_QUARTER)) as u32
}

fn tempo_micros(bpm: f64) -> u32 {
    let micros = (60_000_000.0 / bpm).round();
    micros.clamp(1.0, f64::from(0x00FF_FFFFu32)) as u32
}

fn key(pitch: i32) -> u7 {
    u7::new(pitch.clamp(0, 127) as u8)
}

fn note_velocity(velocity: f64) -> u7 {
    u7::new((velocity * 127.0).round().clamp(1.0, 127.0) as u8)
}

/// Convert a batch into an in-memory SMF on the given channel (0-15).
pub fn events_to_smf(events: &[NoteEvent], channel: u8) -> Smf<'static> {
    let channel = u4::new(channel.min(15));
    let mut track: Track<'static> = Vec::new();
    let mut pending_delta: u32 = 0;
    let mut current_tempo: Option<u32> = None;

    for event in events {
        let micros = tempo_micros(event.tempo);
        if current_tempo != Some(micros) {
            track.push(TrackEvent {
                delta: u28::new(pending_delta),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros))),
            });
            pending_delta = 0;
            current_tempo = Some(micros);
        }

        let length = duration_ticks(event.duration);
        if event.is_rest() {
            pending_delta += length;
            continue;
        }

        for (i, &pitch) in event.notes.iter().enumerate() {
            track.push(TrackEvent {
                delta: u28::new(if i == 0 { pending_delta } else { 0 }),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key: key(pitch),
                        vel: note_velocity(event.velocity),
                    },
                },
            });
        }
        for (i, &pitch) in event.notes.iter().enumerate() {
            track.push(TrackEvent {
                delta: u28::new(if i == 0 { length } else { 0 }),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key: key(pitch),
                        vel: u7::new(0),
                    },
                },
            });
        }
        pending_delta = 0;
    }

    track.push(TrackEvent {
        delta: u28::new(pending_delta),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    smf.tracks.push(track);
    smf
}

/// Encode a batch as SMF bytes.
pub fn to_bytes(events: &[NoteEvent], channel: u8) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    events_to_smf(events, channel).write_std(&mut buf)?;
    Ok(buf)
}

pub fn write_midi(events: &[NoteEvent], channel: u8, path: &Path) -> io::Result<()> {
    std::fs::write(path, to_bytes(events, channel)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(notes: &[i32], duration: Duration, tempo: f64) -> NoteEvent {
        NoteEvent {
            notes: notes.to_vec(),
            duration,
            velocity: 0.5,
            tempo,
        }
    }

    #[test]
    fn duration_ticks_follow_tokens() {
        assert_eq!(duration_ticks(Duration::Half), 960);
        assert_eq!(duration_ticks(Duration::Quarter), 480);
        assert_eq!(duration_ticks(Duration::ThirtySecond), 60);
    }

    #[test]
    fn chords_rests_and_tempo_changes() {
        let events = vec![
            event(&[60, 64], Duration::Quarter, 120.0),
            event(&[], Duration::Eighth, 120.0),
            event(&[67], Duration::Half, 90.0),
        ];
        let smf = events_to_smf(&events, 0);
        assert_eq!(smf.tracks.len(), 1);
        let track = &smf.tracks[0];

        let note_ons = track
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    }
                )
            })
            .count();
        let tempos = track
            .iter()
            .filter(|e| matches!(e.kind, TrackEventKind::Meta(MetaMessage::Tempo(_))))
            .count();
        assert_eq!(note_ons, 3);
        assert_eq!(tempos, 2);

        // The G starts after the quarter chord's release plus the eighth rest.
        let g_on = track
            .iter()
            .find(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { key, .. },
                        ..
                    } if key == u7::new(67)
                )
            })
            .unwrap();
        assert_eq!(g_on.delta, u28::new(0));
        let second_tempo = track
            .iter()
            .filter(|e| matches!(e.kind, TrackEventKind::Meta(MetaMessage::Tempo(_))))
            .nth(1)
            .unwrap();
        assert_eq!(second_tempo.delta, u28::new(240));
        assert!(matches!(
            track.last().unwrap().kind,
            TrackEventKind::Meta(MetaMessage::EndOfTrack)
        ));
    }

    #[test]
    fn bytes_start_with_header_chunk() {
        let bytes = to_bytes(&[event(&[60], Duration::Quarter, 120.0)], 0).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
    }
}
