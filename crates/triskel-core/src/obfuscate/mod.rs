//! Spectral obfuscation policies.
//!
//! Two interchangeable policies sit behind [`SpectralObfuscator`]:
//!
//! - [`NoiseMask`] adds keyed Gaussian noise and subtracts it again. It is
//!   exact unless the masked signal had to be renormalized.
//! - [`SmearScrambler`] multiplies FFT bins by keyed random factors and
//!   scales blocks by keyed cosines; [`UnlockDecoder`] replays the draws.
//!   It is lossy by construction because cosine scaling is not a phase
//!   rotation.

mod noise;
mod smear;

pub use noise::{DEFAULT_NOISE_STRENGTH, Masked, NoiseMask};
pub use smear::{DEFAULT_BLOCK_SIZE, DEFAULT_SMEAR_STRENGTH, SmearScrambler, UnlockDecoder};

use crate::error::Result;
use crate::waveform::Waveform;

/// A reversible (or approximately reversible) keyed transform on waveforms.
pub trait SpectralObfuscator {
    /// Short policy name for logs and CLI output.
    fn name(&self) -> &'static str;

    /// Obfuscate `waveform`.
    fn mask(&self, waveform: &Waveform) -> Result<Waveform>;

    /// Undo [`mask`](Self::mask) as far as the policy allows.
    fn unmask(&self, masked: &Waveform) -> Result<Waveform>;
}

impl<T: SpectralObfuscator + ?Sized> SpectralObfuscator for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn mask(&self, waveform: &Waveform) -> Result<Waveform> {
        (**self).mask(waveform)
    }

    fn unmask(&self, masked: &Waveform) -> Result<Waveform> {
        (**self).unmask(masked)
    }
}
