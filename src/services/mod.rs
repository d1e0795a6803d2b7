mod speech;
mod telemetry;
mod weather;

pub use speech::{CommandSpeech, SpeechService};
pub use telemetry::{DisabledTelemetry, TelemetrySender};
pub use weather::{
    DailyForecast, Forecast, ForecastClient, WeatherService, parse_forecast,
};

/// Collaborators the dispatcher calls on a rising edge.
pub struct Services<W, S, T> {
    pub weather: W,
    pub speech: S,
    pub telemetry: T,
}
