//! Blocking waveform playback on an output device.

use crate::device::output_device;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use std::sync::mpsc;
use std::time::Duration;
use triskel_core::{Emitter, Waveform};

/// Gain applied before playback, leaving a little headroom.
pub const DEFAULT_OUTPUT_GAIN: f64 = 0.95;

/// Extra time allowed for the device to drain after the last frame.
const DRAIN_SLACK: Duration = Duration::from_secs(2);

/// Scale a waveform by `gain`, renormalizing if the result exceeds unit peak.
pub fn apply_output_gain(waveform: &Waveform, gain: f64) -> Waveform {
    let (out, limited) = waveform.clone().scaled(gain).limited();
    if limited {
        tracing::warn!(gain, "output exceeded unit peak, renormalized");
    }
    out
}

/// Plays waveforms on a cpal output device.
///
/// Every channel of the device receives the same mono signal. Playback
/// blocks until the last sample has been handed to the device.
#[derive(Debug, Clone)]
pub struct CpalEmitter {
    device: Option<String>,
    gain: f64,
}

impl Default for CpalEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl CpalEmitter {
    /// Emitter on the default output device.
    pub fn new() -> Self {
        Self {
            device: None,
            gain: DEFAULT_OUTPUT_GAIN,
        }
    }

    /// Select a device by index, exact name or partial name.
    pub fn with_device(mut self, name_or_index: impl Into<String>) -> Self {
        self.device = Some(name_or_index.into());
        self
    }

    /// Override the output gain.
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Configured output gain.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Play one waveform and wait for it to finish.
    pub fn play(&self, waveform: &Waveform) -> Result<()> {
        let host = cpal::default_host();
        let device = output_device(&host, self.device.as_deref())?;
        let channels = device
            .default_output_config()
            .map(|c| c.channels())
            .unwrap_or(2)
            .max(1);

        let samples: Vec<f32> = apply_output_gain(waveform, self.gain)
            .samples()
            .iter()
            .map(|&s| s as f32)
            .collect();
        let total = samples.len();

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: waveform.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let (done_tx, done_rx) = mpsc::channel::<()>();
        let mut position = 0usize;
        let mut finished = false;
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels as usize) {
                        frame.fill(samples.get(position).copied().unwrap_or(0.0));
                        position += 1;
                    }
                    if !finished && position >= total {
                        finished = true;
                        let _ = done_tx.send(());
                    }
                },
                |err| tracing::warn!(%err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels,
            sample_rate = waveform.sample_rate(),
            duration_secs = waveform.duration_secs(),
            "playback started"
        );

        let budget = Duration::from_secs_f64(waveform.duration_secs()) + DRAIN_SLACK;
        done_rx
            .recv_timeout(budget)
            .map_err(|_| Error::Stream("playback did not complete in time".into()))?;
        tracing::info!("playback finished");
        Ok(())
    }

    /// Play a waveform `repetitions` times with `delay` between plays.
    pub fn emit_loop(
        &self,
        waveform: &Waveform,
        repetitions: usize,
        delay: Duration,
    ) -> Result<()> {
        for i in 0..repetitions {
            tracing::debug!(repetition = i + 1, of = repetitions, "emitting");
            self.play(waveform)?;
            if i + 1 < repetitions {
                std::thread::sleep(delay);
            }
        }
        Ok(())
    }
}

impl Emitter for CpalEmitter {
    fn emit(&mut self, waveform: &Waveform) -> triskel_core::Result<()> {
        Ok(self.play(waveform)?)
    }
}
