//! Field resonance sensor: a digital lock line plus an optional MCP3008 ADC.
//!
//! The bus and line are traits so that a board support crate (spidev, a GPIO
//! character device, ...) can be plugged in without this crate depending on
//! it. When neither is attached, [`ResonanceDecoder`] behaves like
//! [`SimulatedSensor`] and says so in the log.

use crate::{Error, Result};
use triskel_core::ResonanceSensor;

/// Reference voltage of the ADC in volts.
pub const DEFAULT_VREF: f64 = 3.3;

/// Full-scale reading of a 10-bit converter.
const ADC_MAX_COUNTS: f64 = 1023.0;

/// Full-duplex 3-byte SPI transaction.
pub trait SpiBus {
    /// Clock `request` out and return the bytes clocked in.
    fn transfer(&mut self, request: [u8; 3]) -> Result<[u8; 3]>;
}

/// Digital input reporting field lock (high = locked).
pub trait LockLine {
    /// Current level of the line.
    fn is_high(&mut self) -> Result<bool>;
}

impl<T: SpiBus + ?Sized> SpiBus for Box<T> {
    fn transfer(&mut self, request: [u8; 3]) -> Result<[u8; 3]> {
        (**self).transfer(request)
    }
}

impl<T: LockLine + ?Sized> LockLine for Box<T> {
    fn is_high(&mut self) -> Result<bool> {
        (**self).is_high()
    }
}

/// Single-ended MCP3008 input, 0 through 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcChannel(u8);

impl AdcChannel {
    /// Validate a channel number.
    pub fn new(channel: u8) -> Result<Self> {
        if channel < 8 {
            Ok(Self(channel))
        } else {
            Err(Error::Sensor(format!(
                "ADC channel {channel} out of range (0-7)"
            )))
        }
    }

    /// Channel number.
    pub fn index(self) -> u8 {
        self.0
    }
}

/// MCP3008 10-bit ADC on an SPI bus.
#[derive(Debug)]
pub struct Mcp3008<B> {
    bus: B,
    vref: f64,
}

impl<B: SpiBus> Mcp3008<B> {
    /// Converter on `bus` with a 3.3 V reference.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            vref: DEFAULT_VREF,
        }
    }

    /// Override the reference voltage.
    pub fn with_vref(mut self, vref: f64) -> Self {
        self.vref = vref;
        self
    }

    /// Reference voltage.
    pub fn vref(&self) -> f64 {
        self.vref
    }

    /// Request frame: start bit, single-ended mode with channel, padding.
    pub fn request(channel: AdcChannel) -> [u8; 3] {
        [1, (8 + channel.0) << 4, 0]
    }

    /// Raw 10-bit value from a reply frame.
    pub fn decode(reply: [u8; 3]) -> u16 {
        (u16::from(reply[1] & 3) << 8) | u16::from(reply[2])
    }

    /// Raw conversion result.
    pub fn read_counts(&mut self, channel: AdcChannel) -> Result<u16> {
        let reply = self.bus.transfer(Self::request(channel))?;
        Ok(Self::decode(reply))
    }

    /// Conversion result in volts.
    pub fn read_voltage(&mut self, channel: AdcChannel) -> Result<f64> {
        let counts = self.read_counts(channel)?;
        let volts = f64::from(counts) * self.vref / ADC_MAX_COUNTS;
        tracing::debug!(channel = channel.0, counts, volts, "ADC reading");
        Ok(volts)
    }
}

/// Sensor stand-in: always locked, zero volts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSensor;

impl ResonanceSensor for SimulatedSensor {
    fn read_lock(&mut self) -> bool {
        true
    }

    fn read_voltage(&mut self) -> Option<f64> {
        Some(0.0)
    }
}

/// Decodes field lock from whatever sensor hardware is attached.
#[derive(Default)]
pub struct ResonanceDecoder {
    line: Option<Box<dyn LockLine>>,
    adc: Option<(Mcp3008<Box<dyn SpiBus>>, AdcChannel)>,
}

impl std::fmt::Debug for ResonanceDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResonanceDecoder")
            .field("line", &self.line.is_some())
            .field("adc_channel", &self.adc.as_ref().map(|(_, ch)| ch.0))
            .finish()
    }
}

impl ResonanceDecoder {
    /// Decoder with no hardware; every read is simulated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the digital lock line.
    pub fn with_lock_line(mut self, line: impl LockLine + 'static) -> Self {
        self.line = Some(Box::new(line));
        self
    }

    /// Attach an ADC on `bus`, sampling `channel`.
    pub fn with_adc(mut self, bus: impl SpiBus + 'static, channel: AdcChannel, vref: f64) -> Self {
        let bus: Box<dyn SpiBus> = Box::new(bus);
        self.adc = Some((Mcp3008::new(bus).with_vref(vref), channel));
        self
    }

    /// Whether any real hardware is attached.
    pub fn has_hardware(&self) -> bool {
        self.line.is_some() || self.adc.is_some()
    }
}

impl ResonanceSensor for ResonanceDecoder {
    fn read_lock(&mut self) -> bool {
        let Some(line) = self.line.as_mut() else {
            tracing::warn!("no lock line attached, simulating field lock");
            return SimulatedSensor.read_lock();
        };
        match line.is_high() {
            Ok(state) => {
                tracing::info!(locked = state, "field lock line read");
                state
            }
            Err(err) => {
                tracing::warn!(%err, "lock line read failed, simulating field lock");
                SimulatedSensor.read_lock()
            }
        }
    }

    fn read_voltage(&mut self) -> Option<f64> {
        let Some((adc, channel)) = self.adc.as_mut() else {
            return SimulatedSensor.read_voltage();
        };
        match adc.read_voltage(*channel) {
            Ok(volts) => Some(volts),
            Err(err) => {
                tracing::warn!(%err, "ADC read failed, reporting simulated level");
                SimulatedSensor.read_voltage()
            }
        }
    }
}
