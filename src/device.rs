use log::{error, info, warn};
use std::sync::Arc;

use actix_rt::task::JoinHandle;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::debounce::EdgeDetector;
use crate::dispatch::Dispatcher;
use crate::error::AppError;
use crate::gpio::{Direction, DriveMode, GpioBackend, GpioController, Pin, PinValue};
use crate::led::LedController;
use crate::presentation::{GPIO_INITIALIZED, PresentationHandle};
use crate::services::{Services, SpeechService, TelemetrySender, WeatherService};

/// The running button/LED pair. Without a controller, or when a pin cannot be
/// set up, the device stays idle and reports why on the status surface.
pub struct Device<B: GpioBackend> {
    led: Option<Arc<Mutex<LedController<B>>>>,
    detector: Option<EdgeDetector>,
    worker: Option<JoinHandle<()>>,
}

impl<B: GpioBackend + 'static> Device<B> {
    pub fn start<W, S, T>(
        config: Arc<AppConfig>,
        controller: Option<GpioController<B>>,
        services: Arc<Services<W, S, T>>,
        presenter: PresentationHandle,
    ) -> Self
    where
        W: WeatherService + 'static,
        S: SpeechService + 'static,
        T: TelemetrySender + 'static,
    {
        let Some(controller) = controller else {
            warn!("no GPIO controller found, button and LED disabled");
            presenter.status(AppError::NoController.to_string());
            return Self::idle();
        };

        match Self::wire(config, &controller, services, presenter.clone()) {
            Ok(device) => {
                info!("GPIO pins initialized");
                presenter.status(GPIO_INITIALIZED);
                device
            }
            Err(e) => {
                error!("GPIO initialization failed: {e}");
                presenter.status(e.to_string());
                Self::idle()
            }
        }
    }

    fn idle() -> Self {
        Self {
            led: None,
            detector: None,
            worker: None,
        }
    }

    // pins opened here are released by their Drop if a later step fails
    fn wire<W, S, T>(
        config: Arc<AppConfig>,
        controller: &GpioController<B>,
        services: Arc<Services<W, S, T>>,
        presenter: PresentationHandle,
    ) -> Result<Self, AppError>
    where
        W: WeatherService + 'static,
        S: SpeechService + 'static,
        T: TelemetrySender + 'static,
    {
        let gpio = &config.gpio;

        let mut button = controller.open_pin(gpio.button_pin, Direction::Input)?;
        let led_pin = controller.open_pin(gpio.led_pin, Direction::Output)?;
        let led = Arc::new(Mutex::new(LedController::new(led_pin)?));

        configure_button(&mut button)?;
        button.set_debounce(gpio.debounce)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let detector = EdgeDetector::spawn(button, gpio.sample_interval, tx)?;
        let worker = Dispatcher::new(config, led.clone(), services, presenter).spawn(rx);

        Ok(Self {
            led: Some(led),
            detector: Some(detector),
            worker: Some(worker),
        })
    }

    pub fn is_active(&self) -> bool {
        self.detector.is_some()
    }

    pub fn led_state(&self) -> Option<PinValue> {
        self.led.as_ref().map(|led| led.lock().state())
    }

    /// Stops edge detection and waits for the dispatcher to drain. Chains that
    /// are already running finish on their own.
    pub async fn shutdown(mut self) {
        drop(self.detector.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }
}

fn configure_button<B: GpioBackend>(button: &mut Pin<B>) -> Result<(), AppError> {
    if button.is_drive_mode_supported(DriveMode::InputPullUp) {
        match button.set_drive_mode(DriveMode::InputPullUp) {
            Ok(()) => return Ok(()),
            Err(AppError::UnsupportedMode(_)) => {}
            Err(e) => return Err(e),
        }
    }
    warn!("pull-up unavailable on pin {}, using plain input", button.id());
    button.set_drive_mode(DriveMode::Input)
}
