mod backend;
mod config;
mod debounce;
mod device;
mod dispatch;
mod error;
mod gpio;
mod led;
mod presentation;
mod routes;
mod services;

pub use config::{AppConfig, GpioConfig, HttpConfig, TelemetryConfig, WeatherConfig};
pub use debounce::{Debouncer, Edge, EdgeDetector, EdgeEvent};
pub use device::Device;
pub use dispatch::{Dispatcher, TELEMETRY_MESSAGE};
pub use error::AppError;
pub use gpio::{Direction, DriveMode, GpioBackend, GpioController, Pin, PinValue};
pub use led::LedController;
pub use presentation::{
    BUTTON_PRESSED, BUTTON_RELEASED, GPIO_INITIALIZED, Indicator, PresentationHandle,
    PresentationTask, Presenter, StatusBoard, StatusSnapshot, StatusView, Surface,
};
pub use routes::AppState;
pub use services::{
    CommandSpeech, DailyForecast, DisabledTelemetry, Forecast, ForecastClient, Services,
    SpeechService, TelemetrySender, WeatherService, parse_forecast,
};

#[cfg(feature = "hardware-gpio")]
pub use backend::LibgpiodBackend;
pub use backend::MockGpioBackend;
