//! Triskel Core - harmonic signal encoding, keyed permutation and lock protocol
//!
//! This crate holds every transform in the transmission chain plus the gates
//! that guard emission. It has no device code: hardware is reached through
//! the traits in [`hardware`].
//!
//! # Core Abstractions
//!
//! ## Data
//!
//! - [`Waveform`] - Immutable finite samples with a sample rate
//! - [`HarmonicVector`] - Ordered `(multiplier, amplitude)` pairs
//! - [`PermutedHarmonicVector`] - Keyed `(frequency, amplitude)` pairs
//! - [`PhaseTriple`] - X/Y/Z waveforms at 0°, 120°, 240°
//!
//! ## Transforms
//!
//! - [`HarmonicCodec`] - Waveform to harmonic vector at 3-6-9 multiples of the fundamental
//! - [`KeyedHarmonicCipher`] - Secret-seeded frequency offsets, exact round trip
//! - [`WaveformSynthesizer`] - Harmonic vector back to a peak-normalized waveform
//! - [`obfuscate`] - [`NoiseMask`] and [`SmearScrambler`] / [`UnlockDecoder`]
//!
//! ## Lock Protocol
//!
//! - [`KeyGenerator`] - Time-window keys from a shared salt
//! - [`FeedbackMonitor`] - `Listening -> Locked | Rejected` on captured harmonics
//!
//! ## Orchestration
//!
//! - [`TransmissionPipeline`] - `encode -> encrypt -> decrypt -> synthesize ->
//!   obfuscate -> listen -> emit`, aborting without emission on a rejected lock
//!
//! # Example
//!
//! ```rust
//! use triskel_core::{HarmonicVector, KeyedHarmonicCipher};
//!
//! let vector = HarmonicVector::from_pairs([(3, 0.8), (6, 0.4), (9, 0.2)]);
//! let cipher = KeyedHarmonicCipher::with_default_offset("IX369");
//!
//! let encrypted = cipher.encrypt(&vector, 111.0).unwrap();
//! assert_eq!(cipher.decrypt(&encrypted, 111.0).unwrap(), vector);
//! ```

pub mod cipher;
pub mod codec;
pub mod error;
pub mod hardware;
pub mod harmonic;
pub mod lock;
pub mod obfuscate;
pub mod pipeline;
pub mod seed;
pub mod synth;
pub mod waveform;

pub use cipher::{DEFAULT_MAX_OFFSET_HZ, KeyedHarmonicCipher};
pub use codec::{DEFAULT_FUNDAMENTAL_LIMIT_HZ, HarmonicCodec, HarmonicSignature};
pub use error::{Error, Result};
pub use hardware::{Emitter, FeedbackCapture, NoCapture, ReplayCapture, ResonanceSensor};
pub use harmonic::{CANONICAL_HARMONICS, HarmonicVector, Multiplier, PermutedHarmonicVector};
pub use lock::{
    Clock, FeedbackMonitor, FixedClock, HarmonicReading, KeyGenerator, LockKey, LockReport,
    LockState, MonitorConfig, SystemClock,
};
pub use obfuscate::{Masked, NoiseMask, SmearScrambler, SpectralObfuscator, UnlockDecoder};
pub use pipeline::{
    PipelineStages, Transmission, TransmissionOutcome, TransmissionPipeline, TransmitOptions,
};
pub use seed::{CipherSeed, KeyedStream};
pub use synth::WaveformSynthesizer;
pub use waveform::{DEFAULT_SAMPLE_RATE, PhaseTriple, Waveform};

pub use triskel_analysis::{PhaseTripleValidator, TripleVerdict};
