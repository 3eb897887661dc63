//! Device and file adapters for the triskel transmission chain.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_waveform`], [`load_waveform`] and [`write_waveform`]
//! - **Playback**: [`CpalEmitter`] plays waveforms on an output device,
//!   [`WavEmitter`] writes them to disk instead
//! - **Feedback capture**: [`CpalCapture`] records from an input device
//! - **Resonance sensing**: [`ResonanceDecoder`] over an [`Mcp3008`] ADC and a
//!   lock line, falling back to [`SimulatedSensor`]
//!
//! The playback, capture and sensor types implement the traits in
//! [`triskel_core::hardware`], so they plug straight into a
//! [`TransmissionPipeline`](triskel_core::TransmissionPipeline).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use triskel_io::{load_waveform, write_waveform, WavSpec};
//!
//! let input = load_waveform("input.wav", 44100)?;
//! write_waveform("copy.wav", &input, WavSpec::default())?;
//! ```

mod capture;
mod device;
mod playback;
mod sensor;
mod wav;

pub use capture::CpalCapture;
pub use device::{AudioDevice, default_device, list_devices};
pub use playback::{CpalEmitter, DEFAULT_OUTPUT_GAIN, apply_output_gain};
pub use sensor::{
    AdcChannel, DEFAULT_VREF, LockLine, Mcp3008, ResonanceDecoder, SimulatedSensor, SpiBus,
};
pub use wav::{
    WavEmitter, WavFormat, WavInfo, WavSpec, load_waveform, read_wav_info, read_waveform,
    write_waveform,
};

/// Error types for device and file I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Sensor bus transfer failed.
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A core contract was violated (for example a sample-rate mismatch).
    #[error(transparent)]
    Core(#[from] triskel_core::Error),
}

/// Convenience result type for device and file I/O.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for triskel_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(inner) => inner,
            Error::Wav(hound::Error::IoError(e)) => triskel_core::Error::hardware(e.to_string()),
            Error::Wav(e) => triskel_core::Error::invalid_input(e.to_string()),
            other => triskel_core::Error::hardware(other.to_string()),
        }
    }
}
