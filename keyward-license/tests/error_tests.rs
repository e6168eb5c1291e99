use keyward_crypto::CryptoError;
use keyward_license::{ErrorKind, LicenseError};

#[test]
fn token_errors_map_to_taxonomy() {
    let decode = LicenseError::from(CryptoError::MalformedToken("no separator".into()));
    let crypto = LicenseError::from(CryptoError::Decryption("bad tag".into()));
    let format = LicenseError::from(CryptoError::InvalidPayload("not json".into()));
    assert_eq!(decode.kind(), ErrorKind::Decode);
    assert_eq!(crypto.kind(), ErrorKind::Crypto);
    assert_eq!(format.kind(), ErrorKind::Format);
}

#[test]
fn transport_errors() {
    assert!(LicenseError::Network("refused".into()).is_transport());
    assert!(LicenseError::Timeout.is_transport());
    assert!(LicenseError::InvalidResponse("html".into()).is_transport());
    assert!(!LicenseError::Identity("none".into()).is_transport());
}

#[test]
fn error_display_server_rejected() {
    let err = LicenseError::ServerRejected {
        status: 403,
        message: Some("License key already in use".into()),
    };
    let msg = format!("{err}");
    assert!(msg.contains("403"));
    assert!(msg.contains("already in use"));

    let err = LicenseError::ServerRejected {
        status: 500,
        message: None,
    };
    assert!(format!("{err}").contains("no reason given"));
}

#[test]
fn error_display_identity() {
    let err = LicenseError::Identity("machine id unavailable".into());
    assert!(format!("{err}").contains("device identity"));
    assert_eq!(err.kind(), ErrorKind::Identity);
}

#[test]
fn error_display_storage() {
    let err = LicenseError::Storage("disk full".into());
    assert!(format!("{err}").contains("storage"));
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn error_display_timeout() {
    assert!(format!("{}", LicenseError::Timeout).contains("timed out"));
}

#[test]
fn error_from_serde_json() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let license_err: LicenseError = serde_err.unwrap_err().into();
    assert!(format!("{license_err}").contains("serialization"));
}

#[test]
fn error_kind_serializes_snake_case() {
    let json = serde_json::to_string(&ErrorKind::IntegrityMismatch).unwrap();
    assert_eq!(json, "\"integrity_mismatch\"");
}
