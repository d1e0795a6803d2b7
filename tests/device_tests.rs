mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_rt::time::sleep;
use pushbutton::{
    Device, DriveMode, GpioController, MockGpioBackend, PinValue, Presenter,
};

use common::{Journal, RecordingSurface, SUMMARY, services, test_config};

const BUTTON: u32 = 5;
const LED: u32 = 6;

fn presenter(journal: &Journal) -> Presenter<RecordingSurface> {
    Presenter::spawn(RecordingSurface {
        journal: journal.clone(),
    })
    .unwrap()
}

#[actix_rt::test]
async fn missing_controller_reports_and_stays_idle() {
    let journal = Journal::default();
    let presenter = presenter(&journal);
    let backend = Arc::new(MockGpioBackend::without_controller());

    let device = Device::start(
        Arc::new(test_config()),
        GpioController::get_default(backend.clone()),
        Arc::new(services(&journal, Ok(SUMMARY))),
        presenter.handle(),
    );

    assert!(!device.is_active());
    assert_eq!(device.led_state(), None);
    assert_eq!(backend.open_count(), 0);

    device.shutdown().await;
    presenter.shutdown().unwrap();
    assert_eq!(
        journal.entries(),
        vec!["status:There is no GPIO controller on this device."]
    );
}

#[actix_rt::test]
async fn press_then_release_toggles_once_and_announces_once() {
    let journal = Journal::default();
    let presenter = presenter(&journal);
    let backend = Arc::new(MockGpioBackend::default());

    let device = Device::start(
        Arc::new(test_config()),
        GpioController::get_default(backend.clone()),
        Arc::new(services(&journal, Ok(SUMMARY))),
        presenter.handle(),
    );
    assert!(device.is_active());
    assert_eq!(backend.drive_mode(BUTTON), Some(DriveMode::InputPullUp));
    assert_eq!(device.led_state(), Some(PinValue::High));

    sleep(Duration::from_millis(20)).await;
    backend.drive_input(BUTTON, Some(PinValue::Low));
    sleep(Duration::from_millis(200)).await;
    assert_eq!(device.led_state(), Some(PinValue::Low));

    backend.drive_input(BUTTON, Some(PinValue::High));
    sleep(Duration::from_millis(200)).await;
    assert_eq!(device.led_state(), Some(PinValue::Low));

    device.shutdown().await;
    assert!(!backend.is_open(BUTTON));
    presenter.shutdown().unwrap();

    assert_eq!(
        backend.written_values(LED),
        vec![PinValue::High, PinValue::Low]
    );
    assert_eq!(
        journal.entries(),
        vec![
            "status:GPIO pins initialized correctly.".to_string(),
            "indicator:Red".to_string(),
            "status:Button Pressed".to_string(),
            "fetch:37,-128".to_string(),
            format!("speak:{SUMMARY}"),
            "status:Button Released".to_string(),
        ]
    );
}

#[actix_rt::test]
async fn bounce_shorter_than_window_is_ignored() {
    let journal = Journal::default();
    let presenter = presenter(&journal);
    let backend = Arc::new(MockGpioBackend::default());

    let device = Device::start(
        Arc::new(test_config()),
        GpioController::get_default(backend.clone()),
        Arc::new(services(&journal, Ok(SUMMARY))),
        presenter.handle(),
    );

    sleep(Duration::from_millis(20)).await;
    backend.drive_input(BUTTON, Some(PinValue::Low));
    std::thread::sleep(Duration::from_millis(10));
    backend.drive_input(BUTTON, Some(PinValue::High));
    sleep(Duration::from_millis(150)).await;

    assert_eq!(device.led_state(), Some(PinValue::High));
    device.shutdown().await;
    presenter.shutdown().unwrap();
    assert_eq!(journal.entries(), vec!["status:GPIO pins initialized correctly."]);
}

#[actix_rt::test]
async fn falls_back_to_plain_input_without_pull_up() {
    let journal = Journal::default();
    let presenter = presenter(&journal);
    let backend = Arc::new(MockGpioBackend::default().without_pull_up());

    // without the pull-up the released button must be held high externally
    backend.drive_input(BUTTON, Some(PinValue::High));
    let device = Device::start(
        Arc::new(test_config()),
        GpioController::get_default(backend.clone()),
        Arc::new(services(&journal, Ok(SUMMARY))),
        presenter.handle(),
    );

    assert!(device.is_active());
    assert_eq!(backend.drive_mode(BUTTON), Some(DriveMode::Input));

    device.shutdown().await;
    presenter.shutdown().unwrap();
    assert_eq!(journal.entries(), vec!["status:GPIO pins initialized correctly."]);
}

#[actix_rt::test]
async fn unavailable_led_pin_releases_button() {
    let journal = Journal::default();
    let presenter = presenter(&journal);
    let backend = Arc::new(MockGpioBackend::default().with_unavailable_pin(LED));

    let device = Device::start(
        Arc::new(test_config()),
        GpioController::get_default(backend.clone()),
        Arc::new(services(&journal, Ok(SUMMARY))),
        presenter.handle(),
    );

    assert!(!device.is_active());
    assert_eq!(backend.open_count(), 0);

    device.shutdown().await;
    presenter.shutdown().unwrap();
    assert_eq!(journal.count("status:Pin 6 unavailable"), 1);
}
