use log::{error, info};
use std::sync::Arc;

use actix_web::{App, HttpServer, web};

use pushbutton::{
    AppConfig, AppState, CommandSpeech, Device, DisabledTelemetry, ForecastClient,
    GpioController, Presenter, Services, StatusBoard,
};

#[cfg(feature = "hardware-gpio")]
use pushbutton::LibgpiodBackend;
#[cfg(not(feature = "hardware-gpio"))]
use pushbutton::MockGpioBackend;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Arc::new(AppConfig::default());

    let backend = {
        #[cfg(feature = "hardware-gpio")]
        {
            Arc::new(LibgpiodBackend::new(&config.gpio.chip))
        }
        #[cfg(not(feature = "hardware-gpio"))]
        {
            Arc::new(MockGpioBackend::default())
        }
    };

    let (board, view) = StatusBoard::new(config.http.broadcast_capacity);
    let presenter = Presenter::spawn(board).map_err(std::io::Error::other)?;

    let services = Arc::new(Services {
        weather: ForecastClient::new(&config.weather),
        speech: CommandSpeech::espeak(),
        telemetry: DisabledTelemetry,
    });

    let device = Device::start(
        config.clone(),
        GpioController::get_default(backend),
        services,
        presenter.handle(),
    );

    let app_state = AppState { view };
    let scope_path = config.http.path.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .service(app_state.api_scope(&scope_path))
    })
    .bind(&config.http.host)?;

    info!("Starting status server on {}...", config.http.host);
    let result = server.run().await;

    device.shutdown().await;
    if let Err(e) = presenter.shutdown() {
        error!("{e}");
    }
    result
}
