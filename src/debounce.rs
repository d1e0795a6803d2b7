use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::error::AppError;
use crate::gpio::{Direction, GpioBackend, Pin, PinValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    fn between(from: PinValue, to: PinValue) -> Option<Self> {
        match (from, to) {
            (PinValue::Low, PinValue::High) => Some(Edge::Rising),
            (PinValue::High, PinValue::Low) => Some(Edge::Falling),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeEvent {
    pub pin_id: u32,
    pub edge: Edge,
    /// When the raw transition was first observed.
    pub timestamp: Instant,
}

/// Switch debouncer driven by level samples.
///
/// A transition away from the stable level becomes pending and is accepted
/// only once the new level has been observed continuously for the full
/// interval. A pending transition that reverts before then is dropped, so a
/// burst of bounces shorter than the interval yields no edge at all, and two
/// accepted edges are always more than one interval apart.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    stable: PinValue,
    pending: Option<(PinValue, Instant)>,
}

impl Debouncer {
    pub fn new(interval: Duration, initial: PinValue) -> Self {
        Self {
            interval,
            stable: initial,
            pending: None,
        }
    }

    pub fn stable(&self) -> PinValue {
        self.stable
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Feeds one level sample taken at `now`. Returns the accepted edge and the
    /// instant its raw transition was first seen.
    pub fn sample(&mut self, level: PinValue, now: Instant) -> Option<(Edge, Instant)> {
        if level == self.stable {
            self.pending = None;
            return None;
        }

        let since = match self.pending {
            Some((pending, since)) if pending == level => since,
            _ => {
                self.pending = Some((level, now));
                now
            }
        };

        if now.saturating_duration_since(since) < self.interval {
            return None;
        }

        let edge = Edge::between(self.stable, level)?;
        self.stable = level;
        self.pending = None;
        Some((edge, since))
    }
}

/// Samples an input pin on a dedicated thread and hands accepted edges to an
/// unbounded channel, so the sampling loop never waits on the consumer.
///
/// The thread owns the pin; dropping the detector stops the thread and
/// releases the line.
pub struct EdgeDetector {
    pin_id: u32,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EdgeDetector {
    pub fn spawn<B: GpioBackend + 'static>(
        pin: Pin<B>,
        sample_interval: Duration,
        sink: mpsc::UnboundedSender<EdgeEvent>,
    ) -> Result<Self, AppError> {
        if pin.direction() != Direction::Input {
            return Err(AppError::Misuse(format!(
                "edge detection on output pin {}",
                pin.id()
            )));
        }

        let pin_id = pin.id();
        let initial = pin.read()?;
        let mut debouncer = Debouncer::new(pin.debounce(), initial);

        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = cancel.clone();

        let handle = std::thread::Builder::new()
            .name(format!("edge-detector-{pin_id}"))
            .spawn(move || {
                // only the first failure of a run is logged
                let mut read_failing = false;
                while !cancel_flag.load(Ordering::Relaxed) {
                    match pin.read() {
                        Ok(level) => {
                            if read_failing {
                                info!("pin {pin_id} readable again");
                                read_failing = false;
                            }
                            if let Some((edge, timestamp)) = debouncer.sample(level, Instant::now())
                            {
                                debug!("pin {pin_id} accepted {edge:?} edge");
                                let event = EdgeEvent {
                                    pin_id,
                                    edge,
                                    timestamp,
                                };
                                if sink.send(event).is_err() {
                                    debug!("edge consumer for pin {pin_id} gone, stopping");
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            if !read_failing {
                                warn!("read pin {pin_id} error: {e}");
                                read_failing = true;
                            }
                        }
                    }
                    std::thread::sleep(sample_interval);
                }
            })
            .map_err(|e| AppError::Gpio(format!("spawn edge detector: {e}")))?;

        Ok(Self {
            pin_id,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn pin_id(&self) -> u32 {
        self.pin_id
    }
}

impl Drop for EdgeDetector {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
