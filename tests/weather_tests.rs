use pushbutton::{AppConfig, AppError, parse_forecast};

#[test]
fn parses_daily_summary() {
    let body = br#"{
        "latitude": 37,
        "longitude": -128,
        "daily": { "summary": "Drizzle tomorrow.", "icon": "rain", "data": [] }
    }"#;

    assert_eq!(parse_forecast(body).unwrap(), "Drizzle tomorrow.");
}

#[test]
fn missing_summary_is_a_weather_error() {
    let body = br#"{ "daily": { "icon": "rain" } }"#;
    assert!(matches!(parse_forecast(body), Err(AppError::Weather(_))));
}

#[test]
fn non_json_is_a_weather_error() {
    assert!(matches!(
        parse_forecast(b"<html>502 Bad Gateway</html>"),
        Err(AppError::Weather(_))
    ));
}

#[test]
fn forecast_uri_appends_coordinates() {
    let config = AppConfig::default();
    assert_eq!(
        config.weather.forecast_uri(&config.weather.coordinates),
        "https://api.forecast.io/forecast/YOURSECRETOKEN/37,-128"
    );
}
