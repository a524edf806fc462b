//! The trigger and echo lines.
//!
//! Most modules wire trigger and echo to separate pins. Some (and some
//! HC-SR04 clones with the pins bridged) use one pin for both, which then has
//! to be turned around between sending the trigger and listening for the echo.

use embedded_hal::digital::{Error as _, ErrorKind, ErrorType, InputPin, OutputPin, PinState};

/// Direction of a pin that can be switched at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// A pin that can be reconfigured between input and output.
///
/// Implement this for the HAL's flexible pin type, e.g. a newtype around
/// `embassy_rp::gpio::Flex`.
pub trait SetDirection: ErrorType {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;
}

/// What the pulse measurer needs from the hardware.
pub trait Lines {
    /// Make the trigger line drivable.
    fn arm(&mut self) -> Result<(), ErrorKind>;

    /// Drive the trigger line.
    fn set_trigger(&mut self, state: PinState) -> Result<(), ErrorKind>;

    /// Hand the line back to the sensor after the trigger pulse.
    fn listen(&mut self) -> Result<(), ErrorKind>;

    /// Current level of the echo line.
    fn echo_is_high(&mut self) -> Result<bool, ErrorKind>;
}

/// Trigger and echo on their own pins.
pub struct SeparatePins<TRIGPIN, ECHOPIN> {
    trigger: TRIGPIN,
    echo: ECHOPIN,
}

impl<TRIGPIN, ECHOPIN> SeparatePins<TRIGPIN, ECHOPIN>
where
    TRIGPIN: OutputPin,
    ECHOPIN: InputPin,
{
    pub fn new(trigger: TRIGPIN, echo: ECHOPIN) -> Self {
        Self { trigger, echo }
    }

    pub fn release(self) -> (TRIGPIN, ECHOPIN) {
        (self.trigger, self.echo)
    }
}

impl<TRIGPIN, ECHOPIN> Lines for SeparatePins<TRIGPIN, ECHOPIN>
where
    TRIGPIN: OutputPin,
    ECHOPIN: InputPin,
{
    fn arm(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn set_trigger(&mut self, state: PinState) -> Result<(), ErrorKind> {
        self.trigger.set_state(state).map_err(|e| e.kind())
    }

    fn listen(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn echo_is_high(&mut self) -> Result<bool, ErrorKind> {
        self.echo.is_high().map_err(|e| e.kind())
    }
}

/// Trigger and echo sharing one pin.
pub struct SharedPin<PIN> {
    pin: PIN,
}

impl<PIN> SharedPin<PIN>
where
    PIN: InputPin + OutputPin + SetDirection,
{
    pub fn new(pin: PIN) -> Self {
        Self { pin }
    }

    pub fn release(self) -> PIN {
        self.pin
    }
}

impl<PIN> Lines for SharedPin<PIN>
where
    PIN: InputPin + OutputPin + SetDirection,
{
    fn arm(&mut self) -> Result<(), ErrorKind> {
        self.pin
            .set_direction(Direction::Output)
            .map_err(|e| e.kind())
    }

    fn set_trigger(&mut self, state: PinState) -> Result<(), ErrorKind> {
        self.pin.set_state(state).map_err(|e| e.kind())
    }

    fn listen(&mut self) -> Result<(), ErrorKind> {
        self.pin
            .set_direction(Direction::Input)
            .map_err(|e| e.kind())
    }

    fn echo_is_high(&mut self) -> Result<bool, ErrorKind> {
        self.pin.is_high().map_err(|e| e.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct FlexMock {
        direction: Direction,
        level: bool,
        log: std::vec::Vec<(Direction, bool)>,
    }

    impl ErrorType for FlexMock {
        type Error = ErrorKind;
    }

    impl SetDirection for FlexMock {
        fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
            self.direction = direction;
            Ok(())
        }
    }

    impl OutputPin for FlexMock {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.direction != Direction::Output {
                return Err(ErrorKind::Other);
            }
            self.level = false;
            self.log.push((self.direction, self.level));
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.direction != Direction::Output {
                return Err(ErrorKind::Other);
            }
            self.level = true;
            self.log.push((self.direction, self.level));
            Ok(())
        }
    }

    impl InputPin for FlexMock {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.level)
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.level)
        }
    }

    struct OutputPinMock(bool);
    impl ErrorType for OutputPinMock {
        type Error = Infallible;
    }
    impl OutputPin for OutputPinMock {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0 = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0 = true;
            Ok(())
        }
    }

    struct BrokenInputMock;
    impl ErrorType for BrokenInputMock {
        type Error = ErrorKind;
    }
    impl InputPin for BrokenInputMock {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(ErrorKind::Other)
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn separate_pins_drive_trigger() {
        let mut lines = SeparatePins::new(OutputPinMock(false), BrokenInputMock);
        lines.arm().unwrap();
        lines.set_trigger(PinState::High).unwrap();
        lines.listen().unwrap();
        let (trigger, _) = lines.release();
        assert!(trigger.0);
    }

    #[test]
    fn separate_pins_report_echo_errors() {
        let mut lines = SeparatePins::new(OutputPinMock(false), BrokenInputMock);
        assert_eq!(lines.echo_is_high(), Err(ErrorKind::Other));
    }

    #[test]
    fn shared_pin_turns_around() {
        let pin = FlexMock {
            direction: Direction::Input,
            level: false,
            log: std::vec::Vec::new(),
        };
        let mut lines = SharedPin::new(pin);
        lines.arm().unwrap();
        lines.set_trigger(PinState::High).unwrap();
        lines.set_trigger(PinState::Low).unwrap();
        lines.listen().unwrap();
        assert!(!lines.echo_is_high().unwrap());
        let pin = lines.release();
        assert_eq!(pin.direction, Direction::Input);
        assert_eq!(
            pin.log,
            [(Direction::Output, true), (Direction::Output, false)]
        );
    }

    #[test]
    fn shared_pin_cannot_trigger_unarmed() {
        let pin = FlexMock {
            direction: Direction::Input,
            level: false,
            log: std::vec::Vec::new(),
        };
        let mut lines = SharedPin::new(pin);
        assert_eq!(lines.set_trigger(PinState::High), Err(ErrorKind::Other));
    }
}
