//! WAV file reading and writing.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::{Path, PathBuf};
use triskel_core::{Emitter, Waveform};

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = reader.len() as u64; // total across all channels
    let num_frames = total_samples / spec.channels as u64;
    let duration_secs = num_frames as f64 / spec.sample_rate as f64;

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// On-disk layout for written waveforms.
///
/// The sample rate always comes from the waveform itself; only the channel
/// count and bit depth are chosen here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of channels; the mono waveform is copied to each.
    pub channels: u16,
    /// Bit depth per sample. 32 writes IEEE float, anything else integer PCM.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            bits_per_sample: 32,
        }
    }
}

impl WavSpec {
    fn to_hound(self, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels.max(1),
            sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: if self.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file into a waveform.
///
/// Only the first channel of a multi-channel file is kept.
pub fn read_waveform<P: AsRef<Path>>(path: P) -> Result<Waveform> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = f64::from(1u32 << (spec.bits_per_sample - 1));
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let first_channel = interleaved.into_iter().step_by(channels).collect();
    Ok(Waveform::new(first_channel, spec.sample_rate)?)
}

/// Read a WAV file and require a specific sample rate.
///
/// A different rate is a precondition violation, not something to resample.
pub fn load_waveform<P: AsRef<Path>>(path: P, expected_rate: u32) -> Result<Waveform> {
    let waveform = read_waveform(path)?;
    waveform.require_sample_rate(expected_rate)?;
    Ok(waveform)
}

/// Write a waveform to a WAV file.
pub fn write_waveform<P: AsRef<Path>>(path: P, waveform: &Waveform, spec: WavSpec) -> Result<()> {
    let hound_spec = spec.to_hound(waveform.sample_rate());
    let channels = hound_spec.channels;
    let mut writer = WavWriter::create(path, hound_spec)?;
    if spec.bits_per_sample == 32 {
        for &sample in waveform.samples() {
            for _ in 0..channels {
                writer.write_sample(sample as f32)?;
            }
        }
    } else {
        let max_val = f64::from(1u32 << (spec.bits_per_sample - 1));
        for &sample in waveform.samples() {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            for _ in 0..channels {
                writer.write_sample(int_sample)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Emitter that writes each emission to a WAV file instead of a device.
///
/// The first emission goes to `path`; later ones get a `-2`, `-3`, ...
/// suffix before the extension.
#[derive(Debug, Clone)]
pub struct WavEmitter {
    path: PathBuf,
    spec: WavSpec,
    written: Vec<PathBuf>,
}

impl WavEmitter {
    /// Emitter writing to `path` as 32-bit float mono.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            spec: WavSpec::default(),
            written: Vec::new(),
        }
    }

    /// Use a different on-disk layout.
    pub fn with_spec(mut self, spec: WavSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn next_path(&self) -> PathBuf {
        if self.written.is_empty() {
            return self.path.clone();
        }
        let index = self.written.len() + 1;
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "emission".to_owned());
        let name = match self.path.extension() {
            Some(ext) => format!("{stem}-{index}.{}", ext.to_string_lossy()),
            None => format!("{stem}-{index}"),
        };
        self.path.with_file_name(name)
    }
}

impl Emitter for WavEmitter {
    fn emit(&mut self, waveform: &Waveform) -> triskel_core::Result<()> {
        let path = self.next_path();
        write_waveform(&path, waveform, self.spec)?;
        tracing::info!(path = %path.display(), samples = waveform.len(), "waveform written");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, tempdir};
    use triskel_core::DEFAULT_SAMPLE_RATE;

    fn ramp(len: usize) -> Waveform {
        let samples = (0..len).map(|i| (i as f64 / len as f64) - 0.5).collect();
        Waveform::new(samples, DEFAULT_SAMPLE_RATE).unwrap()
    }

    #[test]
    fn float_round_trip() {
        let original = ramp(1000);
        let file = NamedTempFile::new().unwrap();
        write_waveform(file.path(), &original, WavSpec::default()).unwrap();

        let loaded = read_waveform(file.path()).unwrap();
        assert_eq!(loaded.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert_eq!(loaded.len(), original.len());
        for (a, b) in loaded.samples().iter().zip(original.samples()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn pcm16_round_trip() {
        let original = ramp(500);
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            channels: 1,
            bits_per_sample: 16,
        };
        write_waveform(file.path(), &original, spec).unwrap();

        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.format, WavFormat::Pcm);
        assert_eq!(info.bits_per_sample, 16);

        let loaded = read_waveform(file.path()).unwrap();
        for (a, b) in loaded.samples().iter().zip(original.samples()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn multichannel_keeps_first_channel() {
        let file = NamedTempFile::new().unwrap();
        let hound_spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(file.path(), hound_spec).unwrap();
        for i in 0..10 {
            writer.write_sample(i as f32 * 0.1).unwrap();
            writer.write_sample(-1.0f32).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = read_waveform(file.path()).unwrap();
        assert_eq!(loaded.len(), 10);
        assert!(loaded.samples().iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn rate_mismatch_is_precondition_violation() {
        let file = NamedTempFile::new().unwrap();
        let w = Waveform::silence(100, 48000).unwrap();
        write_waveform(file.path(), &w, WavSpec::default()).unwrap();

        let err = load_waveform(file.path(), 44100).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Core(triskel_core::Error::PreconditionViolation(_))
        ));
        assert!(load_waveform(file.path(), 48000).is_ok());
    }

    #[test]
    fn wav_emitter_numbers_later_files() {
        let dir = tempdir().unwrap();
        let mut emitter = WavEmitter::new(dir.path().join("beam.wav"));
        emitter.emit(&ramp(64)).unwrap();
        emitter.emit(&ramp(64)).unwrap();

        let names: Vec<String> = emitter
            .written()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["beam.wav", "beam-2.wav"]);
        assert!(emitter.written().iter().all(|p| p.exists()));
    }

    #[test]
    fn missing_file_is_error() {
        assert!(read_waveform("/nonexistent/path/to/file.wav").is_err());
    }
}
