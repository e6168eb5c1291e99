use keyward_crypto::CryptoError;

#[test]
fn error_display_malformed_token() {
    let err = CryptoError::MalformedToken("missing ':' separator".into());
    let msg = format!("{err}");
    assert!(msg.contains("malformed token"));
    assert!(msg.contains("separator"));
}

#[test]
fn error_display_decryption() {
    let err = CryptoError::Decryption("bad tag".into());
    assert!(format!("{err}").contains("decryption failed"));
}

#[test]
fn error_display_invalid_payload() {
    let err = CryptoError::InvalidPayload("missing field".into());
    assert!(format!("{err}").contains("invalid token payload"));
}

#[test]
fn error_display_key_length() {
    let err = CryptoError::InvalidKeyLength {
        expected: 32,
        actual: 16,
    };
    let msg = format!("{err}");
    assert!(msg.contains("32"));
    assert!(msg.contains("16"));
}
