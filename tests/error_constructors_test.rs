use tariffwatch::error::TariffWatchError;

#[test]
fn error_constructors_transport() {
    assert!(matches!(
        TariffWatchError::network("x"),
        TariffWatchError::Network { .. }
    ));
    assert!(matches!(
        TariffWatchError::timeout("x"),
        TariffWatchError::Timeout { .. }
    ));
    assert!(matches!(
        TariffWatchError::api("x"),
        TariffWatchError::Api { .. }
    ));
}

#[test]
fn error_constructors_data() {
    assert!(matches!(
        TariffWatchError::serialization("x"),
        TariffWatchError::Serialization { .. }
    ));
    assert!(matches!(
        TariffWatchError::parse("x"),
        TariffWatchError::Parse { .. }
    ));
    assert!(matches!(
        TariffWatchError::no_data("x"),
        TariffWatchError::NoData { .. }
    ));
    assert!(matches!(
        TariffWatchError::not_yet_available("x"),
        TariffWatchError::NotYetAvailable { .. }
    ));
}

#[test]
fn error_constructors_process() {
    assert!(matches!(
        TariffWatchError::config("x"),
        TariffWatchError::Config { .. }
    ));
    assert!(matches!(
        TariffWatchError::sink("x"),
        TariffWatchError::Sink { .. }
    ));
    assert!(matches!(TariffWatchError::io("x"), TariffWatchError::Io { .. }));
    assert!(matches!(
        TariffWatchError::validation("f", "m"),
        TariffWatchError::Validation { .. }
    ));
}

#[test]
fn io_and_json_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(
        TariffWatchError::from(io),
        TariffWatchError::Io { .. }
    ));
    let json = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
    assert!(matches!(
        TariffWatchError::from(json),
        TariffWatchError::Serialization { .. }
    ));
}
