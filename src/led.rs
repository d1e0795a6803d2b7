use log::debug;

use crate::debounce::Edge;
use crate::error::AppError;
use crate::gpio::{DriveMode, GpioBackend, Pin, PinValue};

/// Active-low LED: `High` is off.
pub struct LedController<B: GpioBackend> {
    pin: Pin<B>,
    state: PinValue,
}

impl<B: GpioBackend> LedController<B> {
    /// Latches OFF before enabling the output driver so the LED never flashes
    /// on at startup.
    pub fn new(mut pin: Pin<B>) -> Result<Self, AppError> {
        pin.write(PinValue::High)?;
        pin.set_drive_mode(DriveMode::Output)?;

        Ok(Self {
            pin,
            state: PinValue::High,
        })
    }

    pub fn state(&self) -> PinValue {
        self.state
    }

    pub fn pin_id(&self) -> u32 {
        self.pin.id()
    }

    /// Flips the LED on a falling edge and returns the new state. The state is
    /// committed only after the pin write succeeds.
    pub fn on_edge(&mut self, edge: Edge) -> Result<Option<PinValue>, AppError> {
        if edge != Edge::Falling {
            return Ok(None);
        }

        let next = self.state.toggled();
        self.pin.write(next)?;
        self.state = next;
        debug!("led on pin {} now {next:?}", self.pin.id());

        Ok(Some(next))
    }
}
