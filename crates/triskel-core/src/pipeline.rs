//! Fixed-order transmission pipeline.
//!
//! `encode -> encrypt -> decrypt -> synthesize -> obfuscate -> listen -> emit`
//!
//! The vector is decrypted inline before synthesis, so the emitted carrier
//! holds the plain harmonic pattern. The encrypted form is still returned in
//! [`Transmission`] for callers that want to send it separately.

use crate::cipher::KeyedHarmonicCipher;
use crate::codec::{HarmonicCodec, HarmonicSignature};
use crate::error::{Error, Result, check_frequency};
use crate::hardware::{Emitter, FeedbackCapture};
use crate::harmonic::{HarmonicVector, PermutedHarmonicVector};
use crate::lock::{FeedbackMonitor, LockReport};
use crate::obfuscate::SpectralObfuscator;
use crate::synth::WaveformSynthesizer;
use crate::waveform::Waveform;

/// Per-call switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitOptions {
    /// Run the obfuscation stage when an obfuscator is configured.
    pub secure: bool,
    /// Require a feedback lock before emitting.
    pub require_lock: bool,
}

impl Default for TransmitOptions {
    fn default() -> Self {
        Self {
            secure: true,
            require_lock: true,
        }
    }
}

/// Everything the pipeline produced for one input.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    /// Encoded fundamental and harmonics.
    pub signature: HarmonicSignature,
    /// Keyed form of the harmonics.
    pub encrypted: PermutedHarmonicVector,
    /// Harmonics recovered from the keyed form and used for synthesis.
    pub carrier: HarmonicVector,
    /// The waveform that was (or would have been) emitted.
    pub waveform: Waveform,
    /// Name of the obfuscation policy applied, if any.
    pub obfuscation: Option<&'static str>,
    /// Feedback lock result, when a lock was required.
    pub lock: Option<LockReport>,
}

/// Result of [`TransmissionPipeline::transmit`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransmissionOutcome {
    /// The waveform was handed to the emitter.
    Emitted(Transmission),
    /// The feedback lock was rejected; nothing was emitted.
    Aborted(Transmission),
}

impl TransmissionOutcome {
    /// Whether the emitter was called.
    pub fn was_emitted(&self) -> bool {
        matches!(self, TransmissionOutcome::Emitted(_))
    }

    /// Stage outputs regardless of outcome.
    pub fn transmission(&self) -> &Transmission {
        match self {
            TransmissionOutcome::Emitted(t) | TransmissionOutcome::Aborted(t) => t,
        }
    }
}

/// Configured stages of a pipeline.
pub struct PipelineStages {
    /// Harmonic encoder.
    pub codec: HarmonicCodec,
    /// Keyed permutation.
    pub cipher: KeyedHarmonicCipher,
    /// Carrier synthesis.
    pub synthesizer: WaveformSynthesizer,
    /// Optional obfuscation policy.
    pub obfuscator: Option<Box<dyn SpectralObfuscator>>,
    /// Feedback lock monitor.
    pub monitor: FeedbackMonitor,
}

/// Runs the stages in order against injected hardware.
pub struct TransmissionPipeline {
    base_freq: f64,
    stages: PipelineStages,
    emitter: Box<dyn Emitter>,
    capture: Box<dyn FeedbackCapture>,
}

impl TransmissionPipeline {
    /// Assemble a pipeline. All stages must share one sample rate.
    pub fn new(
        base_freq: f64,
        stages: PipelineStages,
        emitter: Box<dyn Emitter>,
        capture: Box<dyn FeedbackCapture>,
    ) -> Result<Self> {
        check_frequency("base_freq", base_freq)?;
        let rate = stages.codec.sample_rate();
        let synth_rate = stages.synthesizer.sample_rate();
        let monitor_rate = stages.monitor.config().sample_rate;
        if synth_rate != rate || monitor_rate != rate {
            return Err(Error::precondition(format!(
                "stage sample rates differ: codec {rate} Hz, synthesizer {synth_rate} Hz, \
                 monitor {monitor_rate} Hz"
            )));
        }
        Ok(Self {
            base_freq,
            stages,
            emitter,
            capture,
        })
    }

    /// Configured base frequency.
    pub fn base_freq(&self) -> f64 {
        self.base_freq
    }

    /// Pipeline sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.stages.codec.sample_rate()
    }

    /// The feedback monitor, for inspecting its state after a run.
    pub fn monitor(&self) -> &FeedbackMonitor {
        &self.stages.monitor
    }

    /// Run every stage up to (not including) the lock and emission.
    pub fn prepare(&self, input: &Waveform, secure: bool) -> Result<Transmission> {
        input.require_sample_rate(self.sample_rate())?;

        tracing::info!(samples = input.len(), "encoding harmonics");
        let signature = self.stages.codec.analyze(input)?;

        tracing::info!(base_freq = self.base_freq, "encrypting harmonic vector");
        let encrypted = self.stages.cipher.encrypt(&signature.vector, self.base_freq)?;
        let carrier = self.stages.cipher.decrypt(&encrypted, self.base_freq)?;

        tracing::info!(harmonics = %carrier, "synthesizing carrier");
        let mut waveform = self
            .stages
            .synthesizer
            .synthesize(&carrier, self.base_freq, 0.0)?;

        let mut obfuscation = None;
        if secure && let Some(obfuscator) = &self.stages.obfuscator {
            tracing::info!(policy = obfuscator.name(), "obfuscating carrier");
            waveform = obfuscator.mask(&waveform)?;
            obfuscation = Some(obfuscator.name());
        }

        Ok(Transmission {
            signature,
            encrypted,
            carrier,
            waveform,
            obfuscation,
            lock: None,
        })
    }

    /// Prepare, wait for a feedback lock if required, then emit.
    ///
    /// A rejected lock is not an error: it returns
    /// [`TransmissionOutcome::Aborted`] and the emitter is never called.
    pub fn transmit(
        &mut self,
        input: &Waveform,
        options: TransmitOptions,
    ) -> Result<TransmissionOutcome> {
        let mut transmission = self.prepare(input, options.secure)?;

        if options.require_lock {
            let report = self
                .stages
                .monitor
                .listen(self.capture.as_mut(), self.base_freq)?;
            let locked = report.is_locked();
            transmission.lock = Some(report);
            if !locked {
                tracing::warn!("transmission aborted: feedback lock rejected");
                return Ok(TransmissionOutcome::Aborted(transmission));
            }
        }

        tracing::info!(samples = transmission.waveform.len(), "emitting");
        self.emitter.emit(&transmission.waveform)?;
        Ok(TransmissionOutcome::Emitted(transmission))
    }
}
