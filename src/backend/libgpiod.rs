use log::{debug, warn};
use std::path::PathBuf;
use std::sync::OnceLock;

use libgpiod::{chip::Chip, line, request};
use parking_lot::{FairMutex, RwLock as PLRwLock};
use rustc_hash::FxHashMap;

use crate::error::AppError;
use crate::gpio::{Direction, DriveMode, GpioBackend, PinValue};

pub struct LibgpiodBackend {
    chip: String,
    present: OnceLock<bool>,
    lines: PLRwLock<FxHashMap<u32, FairMutex<LineHandle>>>, // keyed by pin id, which is the line offset
}

struct LineHandle {
    direction: Direction,
    mode: Option<DriveMode>,
    latched: PinValue,
    request: request::Request,
}

impl LibgpiodBackend {
    pub fn new(chip: &str) -> Self {
        Self {
            chip: chip.to_string(),
            present: OnceLock::new(),
            lines: PLRwLock::new(FxHashMap::default()),
        }
    }

    fn open_chip(&self) -> Result<Chip, AppError> {
        let p = PathBuf::from(&self.chip);
        Chip::open(&p).map_err(|e| AppError::Gpio(format!("open chip {}: {e}", self.chip)))
    }

    fn request_lines(chip: &Chip, line_cfg: &line::Config) -> Result<request::Request, AppError> {
        let mut req_cfg =
            request::Config::new().map_err(|e| AppError::Gpio(format!("request config: {e}")))?;
        req_cfg
            .set_consumer(env!("CARGO_PKG_NAME"))
            .map_err(|e| AppError::Gpio(format!("request consumer: {e}")))?;
        chip.request_lines(Some(&req_cfg), line_cfg)
            .map_err(|e| AppError::Gpio(format!("request lines: {e}")))
    }

    // an unconfigured line is held as a bias-less input until a drive mode is chosen
    fn make_line_settings(
        mode: Option<DriveMode>,
        latched: PinValue,
    ) -> Result<line::Settings, AppError> {
        let mut ls =
            line::Settings::new().map_err(|e| AppError::Gpio(format!("libgpiod settings: {e}")))?;

        match mode {
            Some(DriveMode::Output) => {
                ls.set_direction(line::Direction::Output)
                    .map_err(|e| AppError::Gpio(format!("set direction: {e}")))?;
                ls.set_drive(line::Drive::PushPull)
                    .map_err(|e| AppError::Gpio(format!("set drive: {e}")))?;
                ls.set_output_value(to_line_value(latched))
                    .map_err(|e| AppError::Gpio(format!("set output value: {e}")))?;
            }
            Some(DriveMode::InputPullUp) => {
                ls.set_direction(line::Direction::Input)
                    .map_err(|e| AppError::Gpio(format!("set direction: {e}")))?;
                ls.set_bias(Some(line::Bias::PullUp))
                    .map_err(|e| AppError::Gpio(format!("set bias: {e}")))?;
            }
            Some(DriveMode::Input) | None => {
                ls.set_direction(line::Direction::Input)
                    .map_err(|e| AppError::Gpio(format!("set direction: {e}")))?;
                ls.set_bias(None)
                    .map_err(|e| AppError::Gpio(format!("set bias: {e}")))?;
            }
        }

        Ok(ls)
    }

    fn make_line_config(offset: u32, settings: line::Settings) -> Result<line::Config, AppError> {
        let mut cfg =
            line::Config::new().map_err(|e| AppError::Gpio(format!("line config: {e}")))?;
        cfg.add_line_settings(&[offset], settings)
            .map_err(|e| AppError::Gpio(format!("line config add settings: {e}")))?;
        Ok(cfg)
    }

    fn reconfigure(
        handle: &mut LineHandle,
        offset: u32,
        mode: Option<DriveMode>,
    ) -> Result<(), AppError> {
        let settings = Self::make_line_settings(mode, handle.latched)?;
        let cfg = Self::make_line_config(offset, settings)?;
        handle
            .request
            .reconfigure_lines(&cfg)
            .map_err(|e| AppError::Gpio(format!("reconfigure lines: {e}")))?;
        Ok(())
    }
}

fn to_line_value(value: PinValue) -> line::Value {
    match value {
        PinValue::Low => line::Value::InActive,
        PinValue::High => line::Value::Active,
    }
}

impl GpioBackend for LibgpiodBackend {
    fn controller_present(&self) -> bool {
        *self.present.get_or_init(|| self.open_chip().is_ok())
    }

    fn open_line(&self, pin_id: u32, direction: Direction) -> Result<(), AppError> {
        let mut lines = self.lines.write();
        if lines.contains_key(&pin_id) {
            return Err(AppError::PinUnavailable(pin_id, "pin already open".into()));
        }

        let chip = self.open_chip().map_err(|_| AppError::NoController)?;
        let settings = Self::make_line_settings(None, PinValue::Low)?;
        let cfg = Self::make_line_config(pin_id, settings)?;
        let request = Self::request_lines(&chip, &cfg)
            .map_err(|e| AppError::PinUnavailable(pin_id, e.to_string()))?;

        lines.insert(
            pin_id,
            FairMutex::new(LineHandle {
                direction,
                mode: None,
                latched: PinValue::Low,
                request,
            }),
        );
        Ok(())
    }

    fn close_line(&self, pin_id: u32) {
        // dropping the request releases the line in the kernel
        if self.lines.write().remove(&pin_id).is_some() {
            debug!("released line {pin_id} on {}", self.chip);
        }
    }

    fn is_drive_mode_supported(&self, pin_id: u32, mode: DriveMode) -> bool {
        if mode != DriveMode::InputPullUp {
            return true;
        }

        let lines = self.lines.read();
        let Some(handle_lock) = lines.get(&pin_id) else {
            return false;
        };
        let mut handle = handle_lock.lock();
        if handle.direction != Direction::Input {
            return false;
        }

        // test bias support by applying it, then restore the current settings
        let supported = Self::reconfigure(&mut handle, pin_id, Some(DriveMode::InputPullUp)).is_ok();
        let current = handle.mode;
        if let Err(e) = Self::reconfigure(&mut handle, pin_id, current) {
            warn!("restore line {pin_id} after pull-up check: {e}");
        }
        supported
    }

    fn set_drive_mode(&self, pin_id: u32, mode: DriveMode) -> Result<(), AppError> {
        let lines = self.lines.read();
        let handle_lock = lines
            .get(&pin_id)
            .ok_or_else(|| AppError::Misuse(format!("pin {pin_id} not open")))?;
        let mut handle = handle_lock.lock();

        if mode.direction() != handle.direction {
            return Err(AppError::Misuse(format!(
                "drive mode {mode:?} on {:?} pin {pin_id}",
                handle.direction
            )));
        }

        Self::reconfigure(&mut handle, pin_id, Some(mode)).map_err(|e| match mode {
            DriveMode::InputPullUp => AppError::UnsupportedMode(mode),
            _ => e,
        })?;
        handle.mode = Some(mode);
        Ok(())
    }

    fn read_value(&self, pin_id: u32) -> Result<PinValue, AppError> {
        let lines = self.lines.read();
        let handle_lock = lines
            .get(&pin_id)
            .ok_or_else(|| AppError::Misuse(format!("pin {pin_id} not open")))?;
        let handle = handle_lock.lock();

        let value = handle
            .request
            .value(pin_id)
            .map_err(|e| AppError::Gpio(format!("get value: {e}")))?;
        Ok(match value {
            line::Value::InActive => PinValue::Low,
            line::Value::Active => PinValue::High,
        })
    }

    fn write_value(&self, pin_id: u32, value: PinValue) -> Result<(), AppError> {
        let lines = self.lines.read();
        let handle_lock = lines
            .get(&pin_id)
            .ok_or_else(|| AppError::Misuse(format!("pin {pin_id} not open")))?;
        let mut handle = handle_lock.lock();

        if handle.direction != Direction::Output {
            return Err(AppError::Misuse(format!("write to input pin {pin_id}")));
        }

        // before the output driver is enabled the value is only latched
        if handle.mode == Some(DriveMode::Output) {
            handle
                .request
                .set_value(pin_id, to_line_value(value))
                .map_err(|e| AppError::Gpio(format!("set value: {e}")))?;
        }
        handle.latched = value;
        Ok(())
    }
}
