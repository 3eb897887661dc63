//! Audio device discovery and selection via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};
use triskel_core::DEFAULT_SAMPLE_RATE;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether the device supports audio input.
    pub is_input: bool,
    /// Whether the device supports audio output.
    pub is_output: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

/// List all available audio devices.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(inputs) = host.input_devices() {
        for device in inputs {
            if let Ok(name) = device_name(&device) {
                let sample_rate = device
                    .default_input_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(DEFAULT_SAMPLE_RATE);
                let is_output = device.default_output_config().is_ok();

                devices.push(AudioDevice {
                    name,
                    is_input: true,
                    is_output,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    // Output-only devices
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device_name(&device) {
                if devices.iter().any(|d| d.name == name) {
                    continue;
                }

                let sample_rate = device
                    .default_output_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(DEFAULT_SAMPLE_RATE);

                devices.push(AudioDevice {
                    name,
                    is_input: false,
                    is_output: true,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    Ok(devices)
}

/// Default input and output device info, if the host has them.
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    let host = cpal::default_host();

    let input = host.default_input_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: true,
            is_output: false,
            default_sample_rate: d
                .default_input_config()
                .map(|c| c.sample_rate())
                .unwrap_or(DEFAULT_SAMPLE_RATE),
        })
    });

    let output = host.default_output_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: false,
            is_output: true,
            default_sample_rate: d
                .default_output_config()
                .map(|c| c.sample_rate())
                .unwrap_or(DEFAULT_SAMPLE_RATE),
        })
    });

    Ok((input, output))
}

/// Resolve an input device by name or index, or the host default.
pub(crate) fn input_device(host: &Host, name_or_index: Option<&str>) -> Result<Device> {
    match name_or_index {
        Some(query) => {
            let devices: Vec<_> = host
                .input_devices()
                .map_err(|e| Error::Stream(e.to_string()))?
                .collect();
            find_device_from_list(&devices, query, "input")
        }
        None => host.default_input_device().ok_or(Error::NoDevice),
    }
}

/// Resolve an output device by name or index, or the host default.
pub(crate) fn output_device(host: &Host, name_or_index: Option<&str>) -> Result<Device> {
    match name_or_index {
        Some(query) => {
            let devices: Vec<_> = host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?
                .collect();
            find_device_from_list(&devices, query, "output")
        }
        None => host.default_output_device().ok_or(Error::NoDevice),
    }
}

fn find_device_from_list(devices: &[Device], name_or_index: &str, kind: &str) -> Result<Device> {
    let names: Vec<Option<String>> = devices.iter().map(|d| device_name(d).ok()).collect();
    let index = resolve_device_index(&names, name_or_index, kind)?;
    Ok(devices[index].clone())
}

/// Pick a device position by index, exact name, or case-insensitive
/// substring. Devices whose name could not be read are `None`.
fn resolve_device_index(
    names: &[Option<String>],
    name_or_index: &str,
    kind: &str,
) -> Result<usize> {
    if let Ok(index) = name_or_index.parse::<usize>() {
        if index < names.len() {
            return Ok(index);
        }
        return Err(Error::DeviceNotFound(format!(
            "{kind} device index {index} (only {} devices available)",
            names.len()
        )));
    }

    if let Some(index) = names
        .iter()
        .position(|n| n.as_deref() == Some(name_or_index))
    {
        return Ok(index);
    }

    let search_lower = name_or_index.to_lowercase();
    let matches: Vec<(usize, &str)> = names
        .iter()
        .enumerate()
        .filter_map(|(i, n)| {
            n.as_deref()
                .filter(|name| name.to_lowercase().contains(&search_lower))
                .map(|name| (i, name))
        })
        .collect();

    match matches.as_slice() {
        [] => Err(Error::DeviceNotFound(format!(
            "no {kind} device matching '{name_or_index}'"
        ))),
        [(index, _)] => Ok(*index),
        [(index, first), ..] => {
            let all: Vec<_> = matches.iter().map(|(_, n)| *n).collect();
            tracing::warn!(
                query = name_or_index,
                kind,
                candidates = ?all,
                "multiple devices match, using {first}"
            );
            Ok(*index)
        }
    }
}
