use log::{debug, error, warn};
use std::sync::Arc;

use actix_rt::task::JoinHandle;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::debounce::{Edge, EdgeEvent};
use crate::gpio::GpioBackend;
use crate::led::LedController;
use crate::presentation::{BUTTON_PRESSED, BUTTON_RELEASED, Indicator, PresentationHandle};
use crate::services::{Services, SpeechService, TelemetrySender, WeatherService};

pub const TELEMETRY_MESSAGE: &[u8] = b"Hello, Cloud!";

/// Turns accepted edges into action chains, one local task per edge.
///
/// Collaborator failures end at this boundary: they are logged, the step that
/// depended on them is skipped, and the next edge is handled as usual.
pub struct Dispatcher<B: GpioBackend, W, S, T> {
    config: Arc<AppConfig>,
    led: Arc<Mutex<LedController<B>>>,
    services: Arc<Services<W, S, T>>,
    presenter: PresentationHandle,
}

impl<B, W, S, T> Dispatcher<B, W, S, T>
where
    B: GpioBackend + 'static,
    W: WeatherService + 'static,
    S: SpeechService + 'static,
    T: TelemetrySender + 'static,
{
    pub fn new(
        config: Arc<AppConfig>,
        led: Arc<Mutex<LedController<B>>>,
        services: Arc<Services<W, S, T>>,
        presenter: PresentationHandle,
    ) -> Self {
        Self {
            config,
            led,
            services,
            presenter,
        }
    }

    /// Drains `events` until every sender is gone. Must be called from within
    /// an actix system.
    pub fn spawn(self, mut events: mpsc::UnboundedReceiver<EdgeEvent>) -> JoinHandle<()> {
        actix_rt::spawn(async move {
            while let Some(event) = events.recv().await {
                self.dispatch(event);
            }
            debug!("edge channel closed, dispatcher exiting");
        })
    }

    pub fn dispatch(&self, event: EdgeEvent) -> JoinHandle<()> {
        debug!(
            "dispatching {:?} edge from pin {} ({:?} after transition)",
            event.edge,
            event.pin_id,
            event.timestamp.elapsed()
        );

        match event.edge {
            Edge::Falling => actix_rt::spawn(toggle_and_render(
                self.led.clone(),
                self.presenter.clone(),
            )),
            Edge::Rising => actix_rt::spawn(fetch_and_announce(
                self.config.clone(),
                self.services.clone(),
                self.presenter.clone(),
            )),
        }
    }
}

async fn toggle_and_render<B: GpioBackend>(
    led: Arc<Mutex<LedController<B>>>,
    presenter: PresentationHandle,
) {
    let outcome = led.lock().on_edge(Edge::Falling);

    match outcome {
        Ok(Some(value)) => presenter.enqueue(move |surface| {
            surface.set_indicator(Indicator::from(value));
            surface.set_status(BUTTON_PRESSED);
        }),
        Ok(None) => presenter.status(BUTTON_PRESSED),
        Err(e) => {
            error!("led toggle failed, state unchanged: {e}");
            presenter.status(BUTTON_PRESSED);
        }
    }
}

async fn fetch_and_announce<W, S, T>(
    config: Arc<AppConfig>,
    services: Arc<Services<W, S, T>>,
    presenter: PresentationHandle,
) where
    W: WeatherService,
    S: SpeechService,
    T: TelemetrySender,
{
    match services.weather.fetch(&config.weather.coordinates).await {
        Ok(summary) => {
            if let Err(e) = services.speech.speak(&summary).await {
                warn!("announcement failed: {e}");
            }
        }
        Err(e) => warn!("weather fetch failed, skipping announcement: {e}"),
    }

    if config.telemetry.enabled
        && let Err(e) = services.telemetry.send(TELEMETRY_MESSAGE).await
    {
        warn!("telemetry send failed: {e}");
    }

    presenter.status(BUTTON_RELEASED);
}
