//! A deterministic test bench.
//!
//! Time only moves when the clock is read (one tick per read, like a busy
//! poll) or when a delay runs. The echo line follows a scripted pulse measured
//! from the falling edge of each trigger pulse.

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorKind, ErrorType, InputPin, OutputPin},
};

use crate::{Direction, Now, SeparatePins, SetDirection, SharedPin};

/// Delay between the trigger and a stuck echo line going high.
const STUCK_AFTER: u64 = 450;

/// What the sensor answers to one trigger.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Echo {
    Silent,
    Pulse { after: u64, width: u64 },
    StuckHigh,
}

impl Echo {
    /// A clean echo from `cm` away at 29 us/cm (20 degC).
    pub(crate) fn distance(cm: u64) -> Self {
        Echo::Pulse {
            after: 450,
            width: 2 * cm * 29,
        }
    }
}

pub(crate) struct Bench {
    now: Cell<u64>,
    script: RefCell<VecDeque<Echo>>,
    current: Cell<(u64, Echo)>,
    trigger_high: Cell<bool>,
    trigger_log: RefCell<Vec<(u64, bool)>>,
    fired: RefCell<Vec<u64>>,
    stale_until: Cell<u64>,
    echo_broken: Cell<bool>,
    trigger_broken: Cell<bool>,
    shared_direction: Cell<Direction>,
}

impl Bench {
    pub(crate) fn new(script: impl IntoIterator<Item = Echo>) -> Self {
        Self {
            now: Cell::new(0),
            script: RefCell::new(script.into_iter().collect()),
            current: Cell::new((0, Echo::Silent)),
            trigger_high: Cell::new(false),
            trigger_log: RefCell::new(Vec::new()),
            fired: RefCell::new(Vec::new()),
            stale_until: Cell::new(0),
            echo_broken: Cell::new(false),
            trigger_broken: Cell::new(false),
            shared_direction: Cell::new(Direction::Input),
        }
    }

    /// A sensor that never answers.
    pub(crate) fn silent() -> Self {
        Self::new([Echo::Silent; 0])
    }

    pub(crate) fn pins(&self) -> SeparatePins<SimTrigger<'_>, SimEcho<'_>> {
        SeparatePins::new(SimTrigger(self), SimEcho(self))
    }

    pub(crate) fn shared_pin(&self) -> SharedPin<SimFlex<'_>> {
        SharedPin::new(SimFlex(self))
    }

    pub(crate) fn clock(&self) -> SimClock<'_> {
        SimClock(self)
    }

    pub(crate) fn delay(&self) -> SimDelay<'_> {
        SimDelay(self)
    }

    pub(crate) fn now(&self) -> u64 {
        self.now.get()
    }

    /// Every trigger line change as `(time, high)`.
    pub(crate) fn trigger_log(&self) -> Vec<(u64, bool)> {
        self.trigger_log.borrow().clone()
    }

    /// Falling edges of completed trigger pulses.
    pub(crate) fn fired(&self) -> Vec<u64> {
        self.fired.borrow().clone()
    }

    pub(crate) fn hold_echo_high_until(&self, at: u64) {
        self.stale_until.set(at);
    }

    pub(crate) fn break_echo(&self) {
        self.echo_broken.set(true);
    }

    pub(crate) fn break_trigger(&self) {
        self.trigger_broken.set(true);
    }

    pub(crate) fn shared_pin_is_input(&self) -> bool {
        self.shared_direction.get() == Direction::Input
    }

    fn drive_trigger(&self, high: bool) -> Result<(), ErrorKind> {
        if self.trigger_broken.get() {
            return Err(ErrorKind::Other);
        }
        let now = self.now.get();
        self.trigger_log.borrow_mut().push((now, high));
        let was_high = self.trigger_high.replace(high);
        if was_high && !high {
            self.fired.borrow_mut().push(now);
            let echo = self.script.borrow_mut().pop_front().unwrap_or(Echo::Silent);
            self.current.set((now, echo));
        }
        Ok(())
    }

    fn echo_level(&self) -> Result<bool, ErrorKind> {
        if self.echo_broken.get() {
            return Err(ErrorKind::Other);
        }
        let now = self.now.get();
        if now < self.stale_until.get() {
            return Ok(true);
        }
        if self.fired.borrow().is_empty() {
            return Ok(false);
        }
        let (fired, echo) = self.current.get();
        let high = match echo {
            Echo::Silent => false,
            Echo::Pulse { after, width } => {
                now >= fired + after && now < fired + after + width
            }
            Echo::StuckHigh => now >= fired + STUCK_AFTER,
        };
        Ok(high)
    }
}

pub(crate) struct SimClock<'a>(&'a Bench);

impl Now for SimClock<'_> {
    fn now_micros(&self) -> u64 {
        let now = self.0.now.get();
        self.0.now.set(now + 1);
        now
    }
}

pub(crate) struct SimDelay<'a>(&'a Bench);

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        let us = u64::from(ns).div_ceil(1_000);
        self.0.now.set(self.0.now.get() + us);
    }
}

pub(crate) struct SimTrigger<'a>(&'a Bench);

impl ErrorType for SimTrigger<'_> {
    type Error = ErrorKind;
}

impl OutputPin for SimTrigger<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.drive_trigger(false)
    }
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.drive_trigger(true)
    }
}

pub(crate) struct SimEcho<'a>(&'a Bench);

impl ErrorType for SimEcho<'_> {
    type Error = ErrorKind;
}

impl InputPin for SimEcho<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.0.echo_level()
    }
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.0.echo_level().map(|high| !high)
    }
}

/// One pin for both trigger and echo.
pub(crate) struct SimFlex<'a>(&'a Bench);

impl ErrorType for SimFlex<'_> {
    type Error = ErrorKind;
}

impl SetDirection for SimFlex<'_> {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.0.shared_direction.set(direction);
        Ok(())
    }
}

impl OutputPin for SimFlex<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.0.shared_direction.get() != Direction::Output {
            return Err(ErrorKind::Other);
        }
        self.0.drive_trigger(false)
    }
    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.0.shared_direction.get() != Direction::Output {
            return Err(ErrorKind::Other);
        }
        self.0.drive_trigger(true)
    }
}

impl InputPin for SimFlex<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.0.shared_direction.get() != Direction::Input {
            return Err(ErrorKind::Other);
        }
        self.0.echo_level()
    }
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
