use std::sync::Arc;

use pushbutton::{
    AppError, Direction, DriveMode, Edge, GpioController, LedController, MockGpioBackend,
    PinValue,
};

fn led(backend: &Arc<MockGpioBackend>) -> LedController<MockGpioBackend> {
    let controller = GpioController::get_default(backend.clone()).unwrap();
    let pin = controller.open_pin(6, Direction::Output).unwrap();
    LedController::new(pin).unwrap()
}

#[test]
fn starts_off_before_driving_output() {
    let backend = Arc::new(MockGpioBackend::default());
    let led = led(&backend);

    assert_eq!(led.state(), PinValue::High);
    assert_eq!(backend.written_values(6), vec![PinValue::High]);
    assert_eq!(backend.drive_mode(6), Some(DriveMode::Output));
}

#[test]
fn falling_edges_flip_by_parity() {
    let backend = Arc::new(MockGpioBackend::default());
    let mut led = led(&backend);

    for n in 1..=7 {
        let value = led.on_edge(Edge::Falling).unwrap();
        let expected = if n % 2 == 0 { PinValue::High } else { PinValue::Low };
        assert_eq!(value, Some(expected));
        assert_eq!(led.state(), expected);
        assert_eq!(backend.written_values(6).last(), Some(&expected));
    }
    // initial write plus one per flip
    assert_eq!(backend.written_values(6).len(), 8);
}

#[test]
fn rising_edges_leave_led_alone() {
    let backend = Arc::new(MockGpioBackend::default());
    let mut led = led(&backend);

    assert_eq!(led.on_edge(Edge::Rising).unwrap(), None);
    assert_eq!(led.state(), PinValue::High);
    assert_eq!(backend.written_values(6).len(), 1);
}

#[test]
fn failed_write_keeps_previous_state() {
    let backend = Arc::new(MockGpioBackend::default());
    let mut led = led(&backend);

    backend.fail_writes(6, true);
    assert!(matches!(led.on_edge(Edge::Falling), Err(AppError::Gpio(_))));
    assert_eq!(led.state(), PinValue::High);
    assert_eq!(backend.written_values(6), vec![PinValue::High]);

    backend.fail_writes(6, false);
    assert_eq!(led.on_edge(Edge::Falling).unwrap(), Some(PinValue::Low));
    assert_eq!(backend.written_values(6), vec![PinValue::High, PinValue::Low]);
}
