//! Contact sensor — a two-state input (door/lid switch, float contact).
//!
//! Generic over any `embedded-hal` input pin, so the same driver serves
//! a GPIO on target and a mock pin in host tests.

use embedded_hal::digital::InputPin;
use log::info;

use crate::error::{SensorError, SensorResult};
use crate::sensorif::driver::{AccessMode, Descriptor, Reading, SensorDriver, SensorKind};

pub struct ContactSensor<P> {
    label: &'static str,
    pin: P,
}

impl<P: InputPin> ContactSensor<P> {
    pub fn new(label: &'static str, pin: P) -> Self {
        Self { label, pin }
    }
}

impl<P: InputPin + Send> SensorDriver for ContactSensor<P> {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            mode: AccessMode::ReadOnly,
            kind: SensorKind::Binary,
        }
    }

    fn init(&mut self) -> SensorResult<()> {
        info!("contact[{}]: registered", self.label);
        Ok(())
    }

    fn shutdown(&mut self) -> SensorResult<()> {
        info!("contact[{}]: unregistered", self.label);
        Ok(())
    }

    fn read_default(&mut self) -> SensorResult<Reading> {
        // A pin that cannot be sampled reads back as a dead sensor.
        let high = self.pin.is_high().map_err(|_| SensorError::Invalid)?;
        Ok(Reading::single(i32::from(high)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct FakePin(bool);

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    #[test]
    fn reads_pin_level_as_binary_sample() {
        let mut open = ContactSensor::new("lid", FakePin(false));
        let mut closed = ContactSensor::new("lid", FakePin(true));
        assert_eq!(open.read_default().unwrap().values[0], 0);
        assert_eq!(closed.read_default().unwrap().values[0], 1);
    }
}
