//! Building core components from settings.

use crate::error::ConfigError;
use crate::settings::{ObfuscationPolicy, Settings};
use triskel_core::lock::DEFAULT_ENTROPY_SALT;
use triskel_core::{
    FeedbackMonitor, HarmonicCodec, KeyGenerator, KeyedHarmonicCipher, MonitorConfig, NoiseMask,
    PipelineStages, SmearScrambler, SpectralObfuscator, TransmitOptions, WaveformSynthesizer,
};

impl Settings {
    fn secret(&self, name: &'static str, value: Option<&String>) -> Result<String, ConfigError> {
        value.cloned().ok_or(ConfigError::MissingSecret(name))
    }

    /// Encryption key, or [`ConfigError::MissingSecret`].
    pub fn encryption_key(&self) -> Result<String, ConfigError> {
        self.secret("encryption_key", self.secrets.encryption_key.as_ref())
    }

    /// Noise key, or [`ConfigError::MissingSecret`].
    pub fn noise_key(&self) -> Result<String, ConfigError> {
        self.secret("noise_key", self.secrets.noise_key.as_ref())
    }

    /// Harmonic codec for `[signal]`.
    pub fn codec(&self) -> HarmonicCodec {
        HarmonicCodec::new(self.signal.sample_rate)
            .with_targets(self.signal.harmonics.iter().copied())
            .with_fundamental_limit(self.signal.fundamental_limit_hz)
    }

    /// Cipher keyed by the encryption key.
    pub fn cipher(&self) -> Result<KeyedHarmonicCipher, ConfigError> {
        let key = self.encryption_key()?;
        Ok(KeyedHarmonicCipher::new(&key, self.cipher.max_offset_hz)?)
    }

    /// Synthesizer for `[signal]`.
    pub fn synthesizer(&self) -> WaveformSynthesizer {
        WaveformSynthesizer::new(self.signal.sample_rate, self.signal.duration)
    }

    /// Feedback monitor parameters.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            sample_rate: self.signal.sample_rate,
            duration_secs: self.lock.listen_secs,
            targets: self.signal.harmonics.clone(),
            threshold: self.lock.threshold,
        }
    }

    /// Feedback monitor.
    pub fn monitor(&self) -> Result<FeedbackMonitor, ConfigError> {
        Ok(FeedbackMonitor::new(self.monitor_config())?)
    }

    /// Lock key generator on the system clock.
    ///
    /// Without a configured salt the built-in default is used, which any
    /// other default installation shares.
    pub fn key_generator(&self) -> Result<KeyGenerator, ConfigError> {
        let salt = match &self.secrets.entropy_salt {
            Some(salt) => salt.clone(),
            None => {
                tracing::warn!("no entropy salt configured, using the built-in default");
                DEFAULT_ENTROPY_SALT.to_owned()
            }
        };
        Ok(KeyGenerator::new(salt, self.lock.window_secs)?)
    }

    /// Noise mask keyed by the noise key.
    pub fn noise_mask(&self) -> Result<NoiseMask, ConfigError> {
        let key = self.noise_key()?;
        Ok(NoiseMask::new(&key, self.obfuscation.noise_strength)?)
    }

    /// Smear scrambler.
    ///
    /// Seed precedence: `[obfuscation] seed`, then the noise key, then OS
    /// entropy (logged, since the receiver needs it).
    pub fn smear_scrambler(&self) -> SmearScrambler {
        let scrambler = match (self.obfuscation.seed, &self.secrets.noise_key) {
            (Some(seed), _) => SmearScrambler::new(seed),
            (None, Some(key)) => SmearScrambler::from_key(key),
            (None, None) => SmearScrambler::from_entropy(),
        };
        scrambler
            .with_smear_strength(self.obfuscation.smear_strength)
            .with_block_size(self.obfuscation.block_size)
    }

    /// Obfuscator for `policy`, or `None` for [`ObfuscationPolicy::None`].
    pub fn obfuscator_for(
        &self,
        policy: ObfuscationPolicy,
    ) -> Result<Option<Box<dyn SpectralObfuscator>>, ConfigError> {
        Ok(match policy {
            ObfuscationPolicy::None => None,
            ObfuscationPolicy::Noise => Some(Box::new(self.noise_mask()?)),
            ObfuscationPolicy::Smear => Some(Box::new(self.smear_scrambler())),
        })
    }

    /// Obfuscator for the configured policy.
    pub fn obfuscator(&self) -> Result<Option<Box<dyn SpectralObfuscator>>, ConfigError> {
        self.obfuscator_for(self.obfuscation.policy)
    }

    /// All pipeline stages. `secure = false` skips building the obfuscator,
    /// so no noise key is needed.
    pub fn pipeline_stages(&self, secure: bool) -> Result<PipelineStages, ConfigError> {
        Ok(PipelineStages {
            codec: self.codec(),
            cipher: self.cipher()?,
            synthesizer: self.synthesizer(),
            obfuscator: if secure { self.obfuscator()? } else { None },
            monitor: self.monitor()?,
        })
    }

    /// Per-call switches from `[lock]`.
    pub fn transmit_options(&self, secure: bool) -> TransmitOptions {
        TransmitOptions {
            secure,
            require_lock: self.lock.require_lock,
        }
    }
}
