//! Feedback recording from an input device.

use crate::device::input_device;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use triskel_core::FeedbackCapture;

const CAPTURE_SLACK: Duration = Duration::from_secs(2);

/// Records the first channel of a cpal input device.
#[derive(Debug, Clone, Default)]
pub struct CpalCapture {
    device: Option<String>,
}

impl CpalCapture {
    /// Capture from the default input device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a device by index, exact name or partial name.
    pub fn with_device(mut self, name_or_index: impl Into<String>) -> Self {
        self.device = Some(name_or_index.into());
        self
    }

    /// Record `duration_secs` of audio at `sample_rate`.
    ///
    /// Returns exactly `duration_secs * sample_rate` samples, or a stream
    /// error if the device does not deliver them in time.
    pub fn record(&self, duration_secs: f64, sample_rate: u32) -> Result<Vec<f64>> {
        let needed = (duration_secs * f64::from(sample_rate)) as usize;
        if needed == 0 {
            return Ok(Vec::new());
        }

        let host = cpal::default_host();
        let device = input_device(&host, self.device.as_deref())?;
        let channels = device
            .default_input_config()
            .map(|c| c.channels())
            .unwrap_or(1)
            .max(1);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = mpsc::channel::<Vec<f32>>();
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let first: Vec<f32> = data.iter().step_by(channels as usize).copied().collect();
                    let _ = tx.send(first);
                },
                |err| tracing::warn!(%err, "input stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(channels, sample_rate, duration_secs, "capture started");

        let deadline = Instant::now() + Duration::from_secs_f64(duration_secs) + CAPTURE_SLACK;
        let mut samples: Vec<f64> = Vec::with_capacity(needed);
        while samples.len() < needed {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(chunk) => samples.extend(chunk.into_iter().map(f64::from)),
                Err(_) => {
                    return Err(Error::Stream(format!(
                        "capture stalled after {} of {needed} samples",
                        samples.len()
                    )));
                }
            }
        }
        drop(stream);

        samples.truncate(needed);
        tracing::debug!(samples = samples.len(), "capture finished");
        Ok(samples)
    }
}

impl FeedbackCapture for CpalCapture {
    fn capture(&mut self, duration_secs: f64, sample_rate: u32) -> triskel_core::Result<Vec<f64>> {
        Ok(self.record(duration_secs, sample_rate)?)
    }
}
