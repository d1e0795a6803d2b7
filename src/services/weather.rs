use std::future::Future;
use std::time::Duration;

use awc::Client;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::AppError;

const FORECAST_TIMEOUT: Duration = Duration::from_secs(10);

pub trait WeatherService {
    /// Short natural-language forecast for `coordinates` ("lat,lon").
    fn fetch(&self, coordinates: &str) -> impl Future<Output = Result<String, AppError>>;
}

#[derive(Debug, Deserialize)]
pub struct Forecast {
    pub daily: DailyForecast,
}

#[derive(Debug, Deserialize)]
pub struct DailyForecast {
    pub summary: String,
}

pub fn parse_forecast(body: &[u8]) -> Result<String, AppError> {
    let forecast: Forecast = serde_json::from_slice(body)
        .map_err(|e| AppError::Weather(format!("Invalid forecast payload: {e}")))?;
    Ok(forecast.daily.summary)
}

pub struct ForecastClient {
    client: Client,
    config: WeatherConfig,
}

impl ForecastClient {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            client: Client::builder().timeout(FORECAST_TIMEOUT).finish(),
            config: config.clone(),
        }
    }
}

impl WeatherService for ForecastClient {
    async fn fetch(&self, coordinates: &str) -> Result<String, AppError> {
        // the uri embeds the api token, keep it out of error messages
        let mut response = self
            .client
            .get(self.config.forecast_uri(coordinates))
            .send()
            .await
            .map_err(|e| AppError::Weather(format!("forecast request: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Weather(format!(
                "forecast returned {}",
                response.status()
            )));
        }

        let body = response
            .body()
            .await
            .map_err(|e| AppError::Weather(format!("forecast body: {e}")))?;
        parse_forecast(&body)
    }
}
