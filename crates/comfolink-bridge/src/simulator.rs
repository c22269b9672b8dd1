//! In-memory ComfoConnect PRO for running without hardware.
//!
//! Holds one word per register address and one flag per bit address. Reads
//! of unmapped addresses return zero, as a device answering a batched read
//! across unused registers would.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use comfolink_core::{
    encode, raw_to_words, CommunicationError, CommunicationResult, PointDefinition, PointValue,
    RegisterClass, RegisterTransport, Registry,
};

/// One request seen by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedRead {
    pub class: RegisterClass,
    pub start: u16,
    pub count: u16,
}

#[derive(Debug, Default)]
pub struct SimulatedDevice {
    words: HashMap<(RegisterClass, u16), u16>,
    bits: HashMap<(RegisterClass, u16), bool>,
    reads: Vec<SimulatedRead>,
    offline: bool,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device seeded with a plausible value for every point of `registry`.
    pub fn from_registry(registry: &Registry) -> Self {
        let mut device = Self::new();
        for point in registry.points() {
            if let Err(e) = device.seed(point) {
                debug!(key = %point.key, error = %e, "Left point unseeded");
            }
        }
        device
    }

    fn seed(&mut self, point: &PointDefinition) -> Result<(), comfolink_core::ValueError> {
        if point.register_class.is_bit() {
            self.set_bit(point.register_class, point.address, false);
            return Ok(());
        }

        let raw = if let Some(values) = &point.value_enum {
            values
                .default
                .or_else(|| values.options.first().map(|o| o.value))
                .unwrap_or(0)
        } else if point.unit.as_deref() == Some("°C") {
            encode(point, &PointValue::Number(21.5))?
        } else if let Some(min) = point.bounds.min {
            encode(point, &PointValue::Number(min))?
        } else {
            0
        };

        let words = raw_to_words(point, raw)?;
        for (offset, word) in words.into_iter().enumerate() {
            self.set_word(point.register_class, point.address + offset as u16, word);
        }
        Ok(())
    }

    pub fn set_word(&mut self, class: RegisterClass, address: u16, value: u16) {
        self.words.insert((class, address), value);
    }

    pub fn set_bit(&mut self, class: RegisterClass, address: u16, value: bool) {
        self.bits.insert((class, address), value);
    }

    pub fn word(&self, class: RegisterClass, address: u16) -> u16 {
        self.words.get(&(class, address)).copied().unwrap_or(0)
    }

    pub fn bit(&self, class: RegisterClass, address: u16) -> bool {
        self.bits.get(&(class, address)).copied().unwrap_or(false)
    }

    /// Requests served so far, oldest first.
    pub fn reads(&self) -> &[SimulatedRead] {
        &self.reads
    }

    /// Make every following request fail with a connection error.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn check_online(&self) -> CommunicationResult<()> {
        if self.offline {
            return Err(CommunicationError::Connect("simulated device offline".to_string()));
        }
        Ok(())
    }
}

fn addresses(start: u16, count: u16) -> CommunicationResult<impl Iterator<Item = u16>> {
    let end = start as u32 + count as u32;
    if count == 0 || end > u16::MAX as u32 + 1 {
        return Err(CommunicationError::Exception("IllegalDataAddress".to_string()));
    }
    Ok((start as u32..end).map(|a| a as u16))
}

#[async_trait]
impl RegisterTransport for SimulatedDevice {
    async fn read_words(
        &mut self,
        class: RegisterClass,
        start: u16,
        count: u16,
    ) -> CommunicationResult<Vec<u16>> {
        self.check_online()?;
        if class.is_bit() {
            return Err(CommunicationError::Unsupported(format!("word read from {}", class)));
        }
        let values = addresses(start, count)?.map(|a| self.word(class, a)).collect();
        self.reads.push(SimulatedRead { class, start, count });
        Ok(values)
    }

    async fn read_bits(
        &mut self,
        class: RegisterClass,
        start: u16,
        count: u16,
    ) -> CommunicationResult<Vec<bool>> {
        self.check_online()?;
        if !class.is_bit() {
            return Err(CommunicationError::Unsupported(format!("bit read from {}", class)));
        }
        let values = addresses(start, count)?.map(|a| self.bit(class, a)).collect();
        self.reads.push(SimulatedRead { class, start, count });
        Ok(values)
    }

    async fn write_word(&mut self, address: u16, value: u16) -> CommunicationResult<()> {
        self.check_online()?;
        self.set_word(RegisterClass::HoldingRegister, address, value);
        Ok(())
    }

    async fn write_bit(&mut self, address: u16, value: bool) -> CommunicationResult<()> {
        self.check_online()?;
        self.set_bit(RegisterClass::Coil, address, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comfolink_core::register_map::{comfoconnect_pro_points, keys};

    #[tokio::test]
    async fn test_seeded_from_register_map() {
        let registry = Registry::build(comfoconnect_pro_points()).unwrap();
        let device = SimulatedDevice::from_registry(&registry);

        // 21.5 °C at scale 0.1
        assert_eq!(device.word(RegisterClass::InputRegister, 7), 215);
        // Ventilation preset defaults to "Preset 2"
        assert_eq!(device.word(RegisterClass::HoldingRegister, 0), 2);
        // External setpoint seeded inside its bounds
        let setpoint = registry.point(keys::EXTERNAL_SETPOINT).unwrap();
        assert_eq!(device.word(RegisterClass::HoldingRegister, setpoint.address), 215);
    }

    #[tokio::test]
    async fn test_read_unmapped_is_zero() {
        let mut device = SimulatedDevice::new();
        device.set_word(RegisterClass::InputRegister, 2, 7);
        let words = device.read_words(RegisterClass::InputRegister, 0, 4).await.unwrap();
        assert_eq!(words, vec![0, 0, 7, 0]);
        assert_eq!(device.reads().len(), 1);
    }

    #[tokio::test]
    async fn test_class_mismatch() {
        let mut device = SimulatedDevice::new();
        assert!(matches!(
            device.read_words(RegisterClass::Coil, 0, 1).await,
            Err(CommunicationError::Unsupported(_))
        ));
        assert!(matches!(
            device.read_bits(RegisterClass::HoldingRegister, 0, 1).await,
            Err(CommunicationError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_offline() {
        let mut device = SimulatedDevice::new();
        device.set_offline(true);
        assert!(matches!(
            device.write_bit(6, true).await,
            Err(CommunicationError::Connect(_))
        ));
    }
}
