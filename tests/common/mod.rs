#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use pushbutton::{
    AppConfig, AppError, Indicator, SpeechService, Surface, TelemetrySender, WeatherService,
};

pub const SUMMARY: &str = "Light rain on Saturday, with temperatures rising.";

/// Ordered record of everything the collaborators saw, across threads.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

pub struct RecordingSurface {
    pub journal: Journal,
}

impl Surface for RecordingSurface {
    fn set_status(&mut self, text: &str) {
        self.journal.push(format!("status:{text}"));
    }

    fn set_indicator(&mut self, indicator: Indicator) {
        self.journal.push(format!("indicator:{indicator:?}"));
    }
}

pub struct FakeWeather {
    pub journal: Journal,
    pub reply: Result<String, String>,
    /// When set, the fetch stays pending until the gate is notified.
    pub gate: Option<Arc<Notify>>,
}

impl WeatherService for FakeWeather {
    async fn fetch(&self, coordinates: &str) -> Result<String, AppError> {
        self.journal.push(format!("fetch:{coordinates}"));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone().map_err(AppError::Weather)
    }
}

pub struct FakeSpeech {
    pub journal: Journal,
    pub fail: bool,
}

impl SpeechService for FakeSpeech {
    async fn speak(&self, text: &str) -> Result<(), AppError> {
        self.journal.push(format!("speak:{text}"));
        if self.fail {
            return Err(AppError::Speech("synthesiser missing".into()));
        }
        Ok(())
    }
}

pub struct FakeTelemetry {
    pub journal: Journal,
}

impl TelemetrySender for FakeTelemetry {
    async fn send(&self, message: &[u8]) -> Result<(), AppError> {
        self.journal
            .push(format!("telemetry:{}", String::from_utf8_lossy(message)));
        Err(AppError::Telemetry("hub unreachable".into()))
    }
}

pub fn services(
    journal: &Journal,
    reply: Result<&str, &str>,
) -> pushbutton::Services<FakeWeather, FakeSpeech, FakeTelemetry> {
    pushbutton::Services {
        weather: FakeWeather {
            journal: journal.clone(),
            reply: reply.map(str::to_string).map_err(str::to_string),
            gate: None,
        },
        speech: FakeSpeech {
            journal: journal.clone(),
            fail: false,
        },
        telemetry: FakeTelemetry {
            journal: journal.clone(),
        },
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.gpio.sample_interval = Duration::from_millis(1);
    config
}
