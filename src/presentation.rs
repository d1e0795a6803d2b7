use log::{debug, info};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};

use crate::error::AppError;
use crate::gpio::PinValue;

pub const BUTTON_PRESSED: &str = "Button Pressed";
pub const BUTTON_RELEASED: &str = "Button Released";
pub const GPIO_INITIALIZED: &str = "GPIO pins initialized correctly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Indicator {
    Red,
    LightGray,
}

impl From<PinValue> for Indicator {
    // active-low: a low pin lights the LED
    fn from(value: PinValue) -> Self {
        match value {
            PinValue::Low => Indicator::Red,
            PinValue::High => Indicator::LightGray,
        }
    }
}

/// User-visible output. Only the presentation thread ever holds one.
pub trait Surface {
    fn set_status(&mut self, text: &str);
    fn set_indicator(&mut self, indicator: Indicator);
}

pub type PresentationTask = Box<dyn FnOnce(&mut dyn Surface) + Send>;

enum Message {
    Run(PresentationTask),
    Stop,
}

/// Cloneable producer side of the presentation queue.
#[derive(Clone)]
pub struct PresentationHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl PresentationHandle {
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce(&mut dyn Surface) + Send + 'static,
    {
        if self.tx.send(Message::Run(Box::new(task))).is_err() {
            debug!("presentation thread stopped, task dropped");
        }
    }

    pub fn status(&self, text: impl Into<String>) {
        let text = text.into();
        self.enqueue(move |surface| surface.set_status(&text));
    }
}

/// Owns the presentation thread, which drains tasks one at a time in enqueue
/// order.
pub struct Presenter<S> {
    handle: PresentationHandle,
    thread: JoinHandle<S>,
}

impl<S: Surface + Send + 'static> Presenter<S> {
    pub fn spawn(mut surface: S) -> Result<Self, AppError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        let thread = std::thread::Builder::new()
            .name("presentation".into())
            .spawn(move || {
                while let Some(msg) = rx.blocking_recv() {
                    match msg {
                        Message::Run(task) => task(&mut surface),
                        Message::Stop => break,
                    }
                }
                surface
            })
            .map_err(|e| AppError::Presentation(format!("spawn presentation thread: {e}")))?;

        Ok(Self {
            handle: PresentationHandle { tx },
            thread,
        })
    }

    pub fn handle(&self) -> PresentationHandle {
        self.handle.clone()
    }

    /// Runs every task queued so far, stops the thread and hands the surface
    /// back. Tasks enqueued afterwards are dropped.
    pub fn shutdown(self) -> Result<S, AppError> {
        let _ = self.handle.tx.send(Message::Stop);
        self.thread
            .join()
            .map_err(|_| AppError::Presentation("presentation thread panicked".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: String,
    pub indicator: Indicator,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            status: String::new(),
            indicator: Indicator::LightGray,
        }
    }
}

/// Surface backing the HTTP status page. Writes happen on the presentation
/// thread; readers go through a [`StatusView`].
pub struct StatusBoard {
    current: Arc<RwLock<StatusSnapshot>>,
    updates: broadcast::Sender<StatusSnapshot>,
}

#[derive(Clone)]
pub struct StatusView {
    current: Arc<RwLock<StatusSnapshot>>,
    updates: broadcast::Sender<StatusSnapshot>,
}

impl StatusBoard {
    pub fn new(broadcast_capacity: usize) -> (Self, StatusView) {
        let current = Arc::new(RwLock::new(StatusSnapshot::default()));
        let (updates, _) = broadcast::channel(broadcast_capacity);

        let view = StatusView {
            current: current.clone(),
            updates: updates.clone(),
        };
        (Self { current, updates }, view)
    }

    fn publish(&self) {
        let snapshot = self.current.read().clone();
        let _ = self.updates.send(snapshot);
    }
}

impl Surface for StatusBoard {
    fn set_status(&mut self, text: &str) {
        info!("status: {text}");
        self.current.write().status = text.to_string();
        self.publish();
    }

    fn set_indicator(&mut self, indicator: Indicator) {
        debug!("indicator: {indicator:?}");
        self.current.write().indicator = indicator;
        self.publish();
    }
}

impl StatusView {
    pub fn snapshot(&self) -> StatusSnapshot {
        self.current.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusSnapshot> {
        self.updates.subscribe()
    }
}
