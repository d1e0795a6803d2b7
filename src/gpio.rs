use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinValue {
    Low,
    High,
}

impl PinValue {
    pub fn toggled(self) -> Self {
        match self {
            PinValue::Low => PinValue::High,
            PinValue::High => PinValue::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveMode {
    Output,
    Input,
    InputPullUp,
}

impl DriveMode {
    pub fn direction(&self) -> Direction {
        match self {
            DriveMode::Output => Direction::Output,
            DriveMode::Input | DriveMode::InputPullUp => Direction::Input,
        }
    }
}

/// Line-level access to a GPIO controller. Lines are addressed by pin id and
/// must be opened before any other call touches them.
pub trait GpioBackend: Send + Sync {
    /// Checked once by [`GpioController::get_default`]. `open_line` reports
    /// [`AppError::NoController`] itself when the controller is missing.
    fn controller_present(&self) -> bool;
    fn open_line(&self, pin_id: u32, direction: Direction) -> Result<(), AppError>;
    fn close_line(&self, pin_id: u32);
    fn is_drive_mode_supported(&self, pin_id: u32, mode: DriveMode) -> bool;
    fn set_drive_mode(&self, pin_id: u32, mode: DriveMode) -> Result<(), AppError>;
    fn read_value(&self, pin_id: u32) -> Result<PinValue, AppError>;
    fn write_value(&self, pin_id: u32, value: PinValue) -> Result<(), AppError>;
}

pub struct GpioController<B: GpioBackend> {
    backend: Arc<B>,
}

impl<B: GpioBackend> GpioController<B> {
    /// Returns `None` on hosts without a GPIO controller.
    pub fn get_default(backend: Arc<B>) -> Option<Self> {
        backend.controller_present().then(|| Self { backend })
    }

    pub fn open_pin(&self, pin_id: u32, direction: Direction) -> Result<Pin<B>, AppError> {
        self.backend.open_line(pin_id, direction)?;
        debug!("opened pin {pin_id} as {direction:?}");

        Ok(Pin {
            id: pin_id,
            direction,
            drive_mode: None,
            debounce: Duration::ZERO,
            backend: self.backend.clone(),
        })
    }
}

/// An opened GPIO line. The line is released when the pin is dropped.
pub struct Pin<B: GpioBackend> {
    id: u32,
    direction: Direction,
    drive_mode: Option<DriveMode>,
    debounce: Duration,
    backend: Arc<B>,
}

impl<B: GpioBackend> Pin<B> {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn drive_mode(&self) -> Option<DriveMode> {
        self.drive_mode
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn is_drive_mode_supported(&self, mode: DriveMode) -> bool {
        mode.direction() == self.direction && self.backend.is_drive_mode_supported(self.id, mode)
    }

    pub fn set_drive_mode(&mut self, mode: DriveMode) -> Result<(), AppError> {
        if mode.direction() != self.direction {
            return Err(AppError::Misuse(format!(
                "drive mode {mode:?} on {:?} pin {}",
                self.direction, self.id
            )));
        }
        if !self.backend.is_drive_mode_supported(self.id, mode) {
            return Err(AppError::UnsupportedMode(mode));
        }

        self.backend.set_drive_mode(self.id, mode)?;
        self.drive_mode = Some(mode);
        Ok(())
    }

    pub fn set_debounce(&mut self, interval: Duration) -> Result<(), AppError> {
        if self.direction != Direction::Input {
            return Err(AppError::Misuse(format!(
                "debounce on output pin {}",
                self.id
            )));
        }
        self.debounce = interval;
        Ok(())
    }

    pub fn read(&self) -> Result<PinValue, AppError> {
        self.backend.read_value(self.id)
    }

    pub fn write(&self, value: PinValue) -> Result<(), AppError> {
        if self.direction != Direction::Output {
            return Err(AppError::Misuse(format!("write to input pin {}", self.id)));
        }
        self.backend.write_value(self.id, value)
    }
}

impl<B: GpioBackend> Drop for Pin<B> {
    fn drop(&mut self) {
        debug!("releasing pin {}", self.id);
        self.backend.close_line(self.id);
    }
}
