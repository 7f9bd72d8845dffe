use std::sync::{Arc, Mutex};

use orchestrion::orchestrion::{DeliveryConfig, LoopSettings, OrchestrionBuilder, Staff};
use orchestrion::sequencing::{
    Chord, Gesture, InputEvent, NoteEventKind, OutputEvent, PedalSequence, Tick, VoiceId,
};
use orchestrion::OrchestrionSequencer;

use NoteEventKind::{NoteOff, NoteOn};

type Log = Arc<Mutex<Vec<OutputEvent>>>;

fn chord(pitches: &[u8], tick: u32, duration: u32) -> Gesture {
    Chord::new(
        pitches.to_vec(),
        Tick::notated(tick),
        Tick::notated(tick + duration),
    )
    .into()
}

fn rest(tick: u32, duration: u32) -> Gesture {
    Chord::rest(Tick::notated(tick), Tick::notated(tick + duration)).into()
}

fn staff(voice: VoiceId, gestures: Vec<Gesture>) -> Staff {
    Staff::from([(voice, gestures)])
}

fn record(builder: OrchestrionBuilder) -> (OrchestrionSequencer, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let sequencer = builder
        .build(move |event| sink.lock().unwrap().push(event))
        .unwrap();
    (sequencer, log)
}

/// Note batches as `(kind, pitch)` pairs. Only complete after the sequencer
/// has been dropped.
fn note_batches(log: &Log) -> Vec<Vec<(NoteEventKind, u8)>> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            OutputEvent::Notes(notes) => Some(notes.iter().map(|note| (note.kind, note.pitch)).collect()),
            OutputEvent::Pedal(_) => None,
        })
        .collect()
}

fn pedal_changes(log: &Log) -> Vec<bool> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            OutputEvent::Pedal(pedal) => Some(pedal.on),
            OutputEvent::Notes(_) => None,
        })
        .collect()
}

fn press(sequencer: &mut OrchestrionSequencer, pitch: u8) {
    sequencer.on_input_event(InputEvent::note_on(pitch, 0.5));
}

fn release(sequencer: &mut OrchestrionSequencer, pitch: u8) {
    sequencer.on_input_event(InputEvent::note_off(pitch));
}

#[test]
fn release_onto_rest_then_press_plays_next_chord() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, vec![chord(&[60], 0, 480), rest(480, 480), chord(&[64], 960, 480)]))
            .config(DeliveryConfig::exact()),
    );

    press(&mut sequencer, 60);
    release(&mut sequencer, 60);
    press(&mut sequencer, 60);
    drop(sequencer);

    assert_eq!(
        note_batches(&log),
        vec![vec![(NoteOn, 60)], vec![(NoteOff, 60)], vec![(NoteOn, 64)]]
    );
}

#[test]
fn notes_carry_voice_and_velocity() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(3, vec![chord(&[72], 0, 480)]))
            .config(DeliveryConfig::exact()),
    );
    press(&mut sequencer, 61);
    drop(sequencer);

    let log = log.lock().unwrap();
    let OutputEvent::Notes(notes) = &log[0] else {
        panic!("expected notes, got {:?}", log[0]);
    };
    assert_eq!(notes[0].voice, 3);
    assert_eq!(notes[0].velocity, 0.5);
}

#[test]
fn low_keys_play_the_left_hand() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, vec![chord(&[72], 0, 480)]))
            .left_hand(staff(0, vec![chord(&[48], 0, 480)]))
            .config(DeliveryConfig::exact()),
    );

    press(&mut sequencer, 58);
    press(&mut sequencer, 60);
    drop(sequencer);

    assert_eq!(note_batches(&log), vec![vec![(NoteOn, 48)], vec![(NoteOn, 72)]]);
}

#[test]
fn loop_wraps_back_to_left_bound() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(
                0,
                vec![
                    chord(&[60], 0, 480),
                    chord(&[62], 480, 480),
                    chord(&[64], 960, 480),
                    chord(&[65], 1440, 480),
                ],
            ))
            .config(DeliveryConfig::exact())
            .looping(LoopSettings::new(0, 960)),
    );

    for _ in 0..4 {
        press(&mut sequencer, 60);
        release(&mut sequencer, 60);
    }
    drop(sequencer);

    let started: Vec<u8> = note_batches(&log)
        .into_iter()
        .flatten()
        .filter(|(kind, _)| *kind == NoteOn)
        .map(|(_, pitch)| pitch)
        .collect();
    assert_eq!(started, vec![60, 62, 60, 62]);
}

#[test]
fn loop_past_the_end_wraps_once_then_stops() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, vec![chord(&[60], 0, 480), chord(&[62], 480, 480), chord(&[64], 960, 480)]))
            .pedal(PedalSequence::from_spans([(0, 1440)]))
            .config(DeliveryConfig::exact())
            .looping(LoopSettings::new(5000, 480)),
    );

    press(&mut sequencer, 60);
    // Steps past the right bound while 60 still sounds; the wrap lands nowhere
    press(&mut sequencer, 61);
    assert!(sequencer.voices().all(|voice| voice.is_finished()));
    assert_eq!(sequencer.position(), None);

    release(&mut sequencer, 60);
    release(&mut sequencer, 61);
    for _ in 0..3 {
        press(&mut sequencer, 62);
        release(&mut sequencer, 62);
    }
    drop(sequencer);

    assert_eq!(note_batches(&log), vec![vec![(NoteOn, 60)], vec![(NoteOff, 60)]]);
    assert_eq!(pedal_changes(&log), vec![true, false]);
}

#[test]
fn disabled_loop_plays_on() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, vec![chord(&[60], 0, 480), chord(&[62], 480, 480), chord(&[64], 960, 480)]))
            .config(DeliveryConfig::exact())
            .looping(LoopSettings {
                enabled: false,
                left: 0,
                right: Some(480),
            }),
    );

    for _ in 0..3 {
        press(&mut sequencer, 60);
        release(&mut sequencer, 60);
    }
    drop(sequencer);

    let started: Vec<u8> = note_batches(&log)
        .into_iter()
        .flatten()
        .filter(|(kind, _)| *kind == NoteOn)
        .map(|(_, pitch)| pitch)
        .collect();
    assert_eq!(started, vec![60, 62, 64]);
}

#[test]
fn legato_re_strikes_pedal_without_double_press() {
    let gestures = (0..5).map(|i| chord(&[60 + i as u8], i * 480, 480)).collect();
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, gestures))
            .pedal(PedalSequence::from_spans([(0, 480), (480, 960), (960, 1920)]))
            .config(DeliveryConfig::exact()),
    );

    // Alternate two keys, each released after the other is down
    let keys = [60, 61];
    press(&mut sequencer, keys[0]);
    for step in 1..5 {
        press(&mut sequencer, keys[step % 2]);
        release(&mut sequencer, keys[(step + 1) % 2]);
    }
    release(&mut sequencer, keys[0]);
    assert!(!sequencer.is_pedal_down());
    drop(sequencer);

    let pedal = pedal_changes(&log);
    assert_eq!(pedal.first(), Some(&true));
    assert_eq!(pedal.last(), Some(&false));
    assert!(pedal.windows(2).all(|w| w[0] != w[1]), "{pedal:?}");
    assert_eq!(pedal.iter().filter(|on| **on).count(), 3);
}

#[test]
fn dropping_lifts_the_pedal() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, vec![chord(&[60], 0, 480), chord(&[62], 480, 480)]))
            .pedal(PedalSequence::from_spans([(0, 960)]))
            .config(DeliveryConfig {
                pedal_delay: std::time::Duration::from_millis(20),
                ..DeliveryConfig::exact()
            }),
    );

    press(&mut sequencer, 60);
    assert!(sequencer.is_pedal_down());
    drop(sequencer);

    assert_eq!(pedal_changes(&log), vec![true, false]);
}

#[test]
fn finishing_the_piece_lifts_the_pedal() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, vec![chord(&[60], 0, 480)]))
            .pedal(PedalSequence::from_spans([(0, 960)]))
            .config(DeliveryConfig::exact()),
    );

    press(&mut sequencer, 60);
    release(&mut sequencer, 60);
    assert!(!sequencer.is_pedal_down());
    assert!(sequencer.voices().all(|voice| voice.is_finished()));

    // Nothing left to play
    press(&mut sequencer, 60);
    drop(sequencer);

    assert_eq!(pedal_changes(&log), vec![true, false]);
    assert_eq!(note_batches(&log), vec![vec![(NoteOn, 60)], vec![(NoteOff, 60)]]);
}

#[test]
fn seeking_silences_everything() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, vec![chord(&[60, 64], 0, 480), chord(&[67], 480, 480)]))
            .pedal(PedalSequence::from_spans([(0, 960)]))
            .config(DeliveryConfig::exact()),
    );

    press(&mut sequencer, 60);
    sequencer.go_to_tick(0);
    assert!(!sequencer.is_pedal_down());
    assert_eq!(sequencer.position(), Some(Tick::ZERO));

    // The pedal timeline was rewound too
    press(&mut sequencer, 61);
    assert!(sequencer.is_pedal_down());
    drop(sequencer);

    let batches = note_batches(&log);
    // Two humanized note-ons, the seek's note-offs, two more note-ons
    assert_eq!(batches.len(), 5);
    assert_eq!(batches[2], vec![(NoteOff, 60), (NoteOff, 64)]);
    assert_eq!(pedal_changes(&log), vec![true, false, true, false]);
}

#[test]
fn chords_are_humanized() {
    let (mut sequencer, log) = record(
        OrchestrionBuilder::new()
            .right_hand(staff(0, vec![chord(&[60, 64, 67], 0, 480)]))
            .config(DeliveryConfig::default()),
    );
    press(&mut sequencer, 60);
    drop(sequencer);

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 3);

    let mut pitches = Vec::new();
    for event in log.iter() {
        let OutputEvent::Notes(notes) = event else {
            panic!("unexpected {event:?}");
        };
        assert_eq!(notes.len(), 1);
        assert!((0.34..=0.66).contains(&notes[0].velocity), "{:?}", notes[0]);
        pitches.push(notes[0].pitch);
    }
    pitches.sort_unstable();
    assert_eq!(pitches, vec![60, 64, 67]);
}
