//! Integration tests for triskel-io: WAV files feeding the core pipeline.

use std::f64::consts::PI;

use tempfile::tempdir;
use triskel_core::{
    DEFAULT_SAMPLE_RATE, HarmonicCodec, ReplayCapture, ResonanceSensor, Waveform,
};
use triskel_io::{
    ResonanceDecoder, SimulatedSensor, WavEmitter, WavFormat, WavSpec, load_waveform,
    read_wav_info, write_waveform,
};

fn tone_stack(base: f64, sample_rate: u32, secs: f64) -> Waveform {
    let n = (secs * f64::from(sample_rate)) as usize;
    let samples = (0..n)
        .map(|i| {
            let t = i as f64 / f64::from(sample_rate);
            [(3.0, 0.5), (6.0, 0.25), (9.0, 0.125)]
                .iter()
                .map(|(m, a)| a * (2.0 * PI * base * m * t).sin())
                .sum()
        })
        .collect();
    Waveform::new(samples, sample_rate).unwrap()
}

#[test]
fn written_file_encodes_like_the_original() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stack.wav");
    let original = tone_stack(111.0, DEFAULT_SAMPLE_RATE, 1.0);
    write_waveform(&path, &original, WavSpec::default()).unwrap();

    let info = read_wav_info(&path).unwrap();
    assert_eq!(info.format, WavFormat::IeeeFloat);
    assert_eq!(info.num_frames, DEFAULT_SAMPLE_RATE as u64);
    assert!((info.duration_secs - 1.0).abs() < 1e-9);

    let loaded = load_waveform(&path, DEFAULT_SAMPLE_RATE).unwrap();
    let codec = HarmonicCodec::new(DEFAULT_SAMPLE_RATE);
    let a = codec.analyze(&original).unwrap();
    let b = codec.analyze(&loaded).unwrap();
    assert_eq!(a.fundamental_hz, b.fundamental_hz);
    for (m, amp) in a.vector.iter() {
        assert!((amp - b.vector.get(m).unwrap()).abs() < 1e-4);
    }
}

#[test]
fn stereo_file_duplicates_mono_channel() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    let original = tone_stack(111.0, 8000, 0.1);
    let spec = WavSpec {
        channels: 2,
        bits_per_sample: 32,
    };
    write_waveform(&path, &original, spec).unwrap();

    let info = read_wav_info(&path).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.num_frames, original.len() as u64);
    assert_eq!(load_waveform(&path, 8000).unwrap().len(), original.len());
}

#[test]
fn dry_run_emitter_output_replays_as_feedback() {
    use triskel_core::{Emitter, FeedbackCapture};

    let dir = tempdir().unwrap();
    let mut emitter = WavEmitter::new(dir.path().join("beam.wav"));
    let wave = tone_stack(111.0, 8000, 1.0);
    emitter.emit(&wave).unwrap();

    let replayed = load_waveform(&emitter.written()[0], 8000).unwrap();
    let mut capture = ReplayCapture::new(replayed);
    let samples = capture.capture(0.5, 8000).unwrap();
    assert_eq!(samples.len(), 4000);
}

#[test]
fn simulated_sensors_agree() {
    let mut sim = SimulatedSensor;
    let mut decoder = ResonanceDecoder::new();
    assert_eq!(sim.read_lock(), decoder.read_lock());
    assert_eq!(sim.read_voltage(), decoder.read_voltage());
}
