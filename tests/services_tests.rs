use pushbutton::{
    AppConfig, AppError, CommandSpeech, DisabledTelemetry, SpeechService, TELEMETRY_MESSAGE,
    TelemetrySender,
};

#[actix_rt::test]
async fn dash_leading_text_is_not_an_option() {
    // succeeds only if the text arrives verbatim on stdin
    let speech = CommandSpeech::new(
        "sh",
        &["-c", r#"read -r line; [ "$line" = "-w /tmp/forecast.wav" ]"#],
    );

    speech.speak("-w /tmp/forecast.wav").await.unwrap();
}

#[actix_rt::test]
async fn version_flag_text_is_spoken_not_executed() {
    // cat with no arguments echoes stdin; `--version` as an argument would
    // print the version instead of reading the text
    let speech = CommandSpeech::new(
        "sh",
        &["-c", r#"[ "$(cat)" = "--version" ]"#],
    );

    speech.speak("--version").await.unwrap();
}

#[actix_rt::test]
async fn failing_synthesiser_is_a_speech_error() {
    let speech = CommandSpeech::new("sh", &["-c", "cat >/dev/null; exit 3"]);

    assert!(matches!(
        speech.speak("Clear skies.").await,
        Err(AppError::Speech(_))
    ));
}

#[actix_rt::test]
async fn missing_synthesiser_is_a_speech_error() {
    let speech = CommandSpeech::new("pushbutton-no-such-synthesiser", &[]);

    assert!(matches!(
        speech.speak("Clear skies.").await,
        Err(AppError::Speech(_))
    ));
}

#[actix_rt::test]
async fn telemetry_is_disabled_by_default_and_accepts_messages() {
    assert!(!AppConfig::default().telemetry.enabled);
    DisabledTelemetry.send(TELEMETRY_MESSAGE).await.unwrap();
}
