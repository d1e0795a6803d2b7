use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use parking_lot::Mutex as PLMutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::AppError;
use crate::gpio::{Direction, DriveMode, GpioBackend, PinValue};

/// In-memory GPIO controller. Input levels are driven from the outside with
/// [`MockGpioBackend::drive_input`], which stands in for the physical button.
pub struct MockGpioBackend {
    present: bool,
    presence_checks: AtomicUsize,
    pull_up_supported: bool,
    unavailable: FxHashSet<u32>,
    lines: RwLock<FxHashMap<u32, Mutex<MockLine>>>, // keyed by pin id
    sim: PLMutex<Simulation>,
}

struct MockLine {
    direction: Direction,
    mode: Option<DriveMode>,
    latched: PinValue,
}

#[derive(Default)]
struct Simulation {
    driven: FxHashMap<u32, PinValue>,
    failing_writes: FxHashSet<u32>,
    failing_reads: FxHashMap<u32, usize>,
    writes: FxHashMap<u32, Vec<PinValue>>,
}

impl Default for MockGpioBackend {
    fn default() -> Self {
        Self {
            present: true,
            presence_checks: AtomicUsize::new(0),
            pull_up_supported: true,
            unavailable: FxHashSet::default(),
            lines: RwLock::new(FxHashMap::default()),
            sim: PLMutex::new(Simulation::default()),
        }
    }
}

impl MockGpioBackend {
    pub fn without_controller() -> Self {
        Self {
            present: false,
            ..Self::default()
        }
    }

    pub fn without_pull_up(mut self) -> Self {
        self.pull_up_supported = false;
        self
    }

    pub fn with_unavailable_pin(mut self, pin_id: u32) -> Self {
        self.unavailable.insert(pin_id);
        self
    }

    /// Sets the physical level seen on an input line, or clears it with `None`
    /// so the line floats back to its bias level.
    pub fn drive_input(&self, pin_id: u32, level: Option<PinValue>) {
        let mut sim = self.sim.lock();
        match level {
            Some(level) => sim.driven.insert(pin_id, level),
            None => sim.driven.remove(&pin_id),
        };
    }

    pub fn fail_writes(&self, pin_id: u32, fail: bool) {
        let mut sim = self.sim.lock();
        if fail {
            sim.failing_writes.insert(pin_id);
        } else {
            sim.failing_writes.remove(&pin_id);
        }
    }

    /// Makes reads of the line fail until `fail_reads(pin_id, false)`, and
    /// counts the failed attempts.
    pub fn fail_reads(&self, pin_id: u32, fail: bool) {
        let mut sim = self.sim.lock();
        if fail {
            sim.failing_reads.entry(pin_id).or_insert(0);
        } else {
            sim.failing_reads.remove(&pin_id);
        }
    }

    pub fn failed_reads(&self, pin_id: u32) -> usize {
        self.sim
            .lock()
            .failing_reads
            .get(&pin_id)
            .copied()
            .unwrap_or(0)
    }

    /// How many times the controller has been asked whether it exists.
    pub fn presence_checks(&self) -> usize {
        self.presence_checks.load(Ordering::Relaxed)
    }

    /// Every value successfully written to the line, oldest first.
    pub fn written_values(&self, pin_id: u32) -> Vec<PinValue> {
        self.sim
            .lock()
            .writes
            .get(&pin_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_open(&self, pin_id: u32) -> bool {
        self.lines
            .read()
            .map(|lines| lines.contains_key(&pin_id))
            .unwrap_or(false)
    }

    pub fn open_count(&self) -> usize {
        self.lines.read().map(|lines| lines.len()).unwrap_or(0)
    }

    pub fn drive_mode(&self, pin_id: u32) -> Option<DriveMode> {
        let lines = self.lines.read().ok()?;
        let line = lines.get(&pin_id)?.lock().ok()?;
        line.mode
    }
}

impl GpioBackend for MockGpioBackend {
    fn controller_present(&self) -> bool {
        self.presence_checks.fetch_add(1, Ordering::Relaxed);
        self.present
    }

    fn open_line(&self, pin_id: u32, direction: Direction) -> Result<(), AppError> {
        if !self.present {
            return Err(AppError::NoController);
        }
        if self.unavailable.contains(&pin_id) {
            return Err(AppError::PinUnavailable(pin_id, "pin is reserved".into()));
        }

        let mut lines = self
            .lines
            .write()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;
        if lines.contains_key(&pin_id) {
            return Err(AppError::PinUnavailable(pin_id, "pin already open".into()));
        }

        lines.insert(
            pin_id,
            Mutex::new(MockLine {
                direction,
                mode: None,
                latched: PinValue::Low,
            }),
        );
        Ok(())
    }

    fn close_line(&self, pin_id: u32) {
        if let Ok(mut lines) = self.lines.write() {
            lines.remove(&pin_id);
        }
    }

    fn is_drive_mode_supported(&self, _pin_id: u32, mode: DriveMode) -> bool {
        match mode {
            DriveMode::InputPullUp => self.pull_up_supported,
            DriveMode::Input | DriveMode::Output => true,
        }
    }

    fn set_drive_mode(&self, pin_id: u32, mode: DriveMode) -> Result<(), AppError> {
        let lines = self
            .lines
            .read()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;
        let entry = lines
            .get(&pin_id)
            .ok_or_else(|| AppError::Misuse(format!("pin {pin_id} not open")))?;
        let mut line = entry
            .lock()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;

        if mode.direction() != line.direction {
            return Err(AppError::Misuse(format!(
                "drive mode {mode:?} on {:?} pin {pin_id}",
                line.direction
            )));
        }
        line.mode = Some(mode);
        Ok(())
    }

    fn read_value(&self, pin_id: u32) -> Result<PinValue, AppError> {
        let lines = self
            .lines
            .read()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;
        let entry = lines
            .get(&pin_id)
            .ok_or_else(|| AppError::Misuse(format!("pin {pin_id} not open")))?;
        let line = entry
            .lock()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;

        let mut sim = self.sim.lock();
        if let Some(failed) = sim.failing_reads.get_mut(&pin_id) {
            *failed += 1;
            return Err(AppError::Gpio(format!("read from pin {pin_id} failed")));
        }

        if line.direction == Direction::Output {
            return Ok(line.latched);
        }

        let bias = match line.mode {
            Some(DriveMode::InputPullUp) => PinValue::High,
            _ => PinValue::Low,
        };
        Ok(sim.driven.get(&pin_id).copied().unwrap_or(bias))
    }

    fn write_value(&self, pin_id: u32, value: PinValue) -> Result<(), AppError> {
        let lines = self
            .lines
            .read()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;
        let entry = lines
            .get(&pin_id)
            .ok_or_else(|| AppError::Misuse(format!("pin {pin_id} not open")))?;
        let mut line = entry
            .lock()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;

        if line.direction != Direction::Output {
            return Err(AppError::Misuse(format!("write to input pin {pin_id}")));
        }

        let mut sim = self.sim.lock();
        if sim.failing_writes.contains(&pin_id) {
            return Err(AppError::Gpio(format!("write to pin {pin_id} failed")));
        }
        line.latched = value;
        sim.writes.entry(pin_id).or_default().push(value);
        Ok(())
    }
}
