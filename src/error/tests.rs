use super::*;

#[test]
fn test_error_display() {
    let err = Error::param("scalar", "value out of range");
    assert_eq!(
        err.to_string(),
        "Invalid parameter 'scalar': value out of range"
    );

    let err = Error::Length {
        context: "chain code",
        expected: 32,
        actual: 16,
    };
    assert_eq!(
        err.to_string(),
        "Invalid length for chain code: expected 32, got 16"
    );

    let err = Error::Processing {
        operation: "modular inverse",
        details: "value is not invertible",
    };
    assert_eq!(
        err.to_string(),
        "Processing error in modular inverse: value is not invertible"
    );
}

#[test]
fn test_validation_functions() {
    // Parameter validation
    assert!(validate::parameter(true, "test", "should pass").is_ok());
    let err = validate::parameter(false, "test", "should fail").unwrap_err();

    match err {
        Error::Parameter { name, reason } => {
            assert_eq!(name, "test");
            assert_eq!(reason, "should fail");
        }
        _ => panic!("Expected Parameter error"),
    }

    // Length validation
    assert!(validate::length("buffer", 32, 32).is_ok());
    let err = validate::length("buffer", 16, 32).unwrap_err();

    match err {
        Error::Length {
            context,
            expected,
            actual,
        } => {
            assert_eq!(context, "buffer");
            assert_eq!(expected, 32);
            assert_eq!(actual, 16);
        }
        _ => panic!("Expected Length error"),
    }

    // Bounds validation
    assert!(validate::min_length("seed", 32, 16).is_ok());
    assert!(validate::min_length("seed", 8, 16).is_err());
    assert!(validate::max_length("seed", 32, 64).is_ok());
    assert!(validate::max_length("seed", 80, 64).is_err());
}
