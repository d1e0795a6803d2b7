use std::time::Duration;

pub const GPIO_CHIP: &str = "/dev/gpiochip0";
pub const LED_PIN: u32 = 6;
pub const BUTTON_PIN: u32 = 5;
pub const BUTTON_DEBOUNCE: Duration = Duration::from_millis(50);
pub const BUTTON_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

pub const FORECAST_URL: &str = "https://api.forecast.io/forecast/YOURSECRETOKEN/";
pub const WEATHER_COORDINATES: &str = "37,-128";

pub const IOT_HUB_URI: &str = "YOURHUB.azure-devices.net";
pub const IOT_DEVICE_ID: &str = "MyDevice";
pub const IOT_DEVICE_KEY: &str = "YOURSECRETTOKENb/asQOPUesD1BmYOURSECRETTOKENlgMKyk=";

pub const HTTP_HOST: &str = "127.0.0.1:8080";
pub const HTTP_PATH: &str = "/api/v1";
pub const STATUS_BROADCAST_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct GpioConfig {
    pub chip: String,
    pub led_pin: u32,
    pub button_pin: u32,
    pub debounce: Duration,
    pub sample_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub forecast_url: String,
    pub coordinates: String,
}

impl WeatherConfig {
    pub fn forecast_uri(&self, coordinates: &str) -> String {
        format!("{}{}", self.forecast_url, coordinates)
    }
}

#[derive(Clone)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub hub_uri: String,
    pub device_id: String,
    pub device_key: String,
}

// keep the device key out of logs
impl std::fmt::Debug for TelemetryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryConfig")
            .field("enabled", &self.enabled)
            .field("hub_uri", &self.hub_uri)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub path: String,
    pub broadcast_capacity: usize,
}

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gpio: GpioConfig,
    pub weather: WeatherConfig,
    pub telemetry: TelemetryConfig,
    pub http: HttpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gpio: GpioConfig {
                chip: GPIO_CHIP.to_string(),
                led_pin: LED_PIN,
                button_pin: BUTTON_PIN,
                debounce: BUTTON_DEBOUNCE,
                sample_interval: BUTTON_SAMPLE_INTERVAL,
            },
            weather: WeatherConfig {
                forecast_url: FORECAST_URL.to_string(),
                coordinates: WEATHER_COORDINATES.to_string(),
            },
            telemetry: TelemetryConfig {
                enabled: false,
                hub_uri: IOT_HUB_URI.to_string(),
                device_id: IOT_DEVICE_ID.to_string(),
                device_key: IOT_DEVICE_KEY.to_string(),
            },
            http: HttpConfig {
                host: HTTP_HOST.to_string(),
                path: HTTP_PATH.to_string(),
                broadcast_capacity: STATUS_BROADCAST_CAPACITY,
            },
        }
    }
}
