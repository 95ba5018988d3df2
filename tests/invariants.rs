//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use productcode_core::{
    checksum::remainder, identify, CodeError, DispatchConfig, FormatTag, Module, ProductCode,
};

const VALID: &[(FormatTag, &str)] = &[
    (FormatTag::Isbn10, "0-9669553-0-7"),
    (FormatTag::Isbn10, "0-8044-2957-X"),
    (FormatTag::Isbn13, "978-0-9669553-0-9"),
    (FormatTag::Isbn13, "979-0-9669553-0-8"),
    (FormatTag::Ismn, "M-2306-7118-7"),
    (FormatTag::Ismn13, "979-0-2306-7118-7"),
    (FormatTag::Ean13, "5901234123457"),
    (FormatTag::Ean13, "4006381333931"),
    (FormatTag::UpcA, "036000291452"),
    (FormatTag::Upc5, "51595"),
];

const WILD: &[(FormatTag, &str)] = &[
    (FormatTag::Isbn10, "0-9669553-0-*"),
    (FormatTag::Isbn10, "0-9*69553-0-7"),
    (FormatTag::Isbn13, "978-0-966955*-0-9"),
    (FormatTag::Isbn13, "979-0-9669553-*-8"),
    (FormatTag::Isbn13, "*78-0-9669553-0-9"),
    (FormatTag::Ismn, "M-9669553-0-*"),
    (FormatTag::Ean13, "590123412345*"),
    (FormatTag::UpcA, "03600029*452"),
];

fn weighted_ok(code: &ProductCode) -> bool {
    let config = code.format().config();
    remainder(code.digits(), config.weights, config.modulus) == Ok(0)
}

#[test]
fn invariant_valid_codes_sum_to_zero() {
    for (tag, s) in VALID {
        let code = ProductCode::new(*tag, s).unwrap_or_else(|e| panic!("{s}: {e}"));
        assert!(weighted_ok(&code), "{s}");
        assert_eq!(code.digits().len(), tag.config().weights.len());
    }
}

#[test]
fn invariant_wildcard_resolution_idempotent() {
    for (tag, s) in WILD {
        let code = ProductCode::new(*tag, s).unwrap_or_else(|e| panic!("{s}: {e}"));
        assert!(weighted_ok(&code), "{s}");
        assert!(!code.normalized().contains('*'));

        // rebuilding the substituted string changes nothing
        let again = ProductCode::new(*tag, code.normalized()).unwrap();
        assert_eq!(again.digits(), code.digits());
        assert_eq!(again.normalized(), code.normalized());
        assert_eq!(again.bits(), code.bits());
    }
}

#[test]
fn invariant_two_wildcards_always_fail() {
    let inputs = [
        (FormatTag::Isbn13, "*78-0-9669553-0-*"),
        (FormatTag::Isbn10, "**"),
        (FormatTag::Ean13, "59012341234**"),
        (FormatTag::Ismn, "M-96695**-0-8"),
        (FormatTag::UpcA, "*-*-Q"),
    ];
    for (tag, s) in inputs {
        let err = ProductCode::new(tag, s).unwrap_err();
        assert!(matches!(err, CodeError::WildcardCount { .. }), "{s}: {err:?}");
    }
}

#[test]
fn invariant_isbn10_converts_with_fresh_check_digit() {
    let isbn = ProductCode::isbn10("0-9669553-0-7").unwrap();
    let ean = isbn.as_ean13().unwrap();

    assert_eq!(ean.format(), FormatTag::Isbn13);
    assert!(ean.normalized().starts_with("978-0-9669553-0-"));
    assert_eq!(ean.normalized(), "978-0-9669553-0-9");
    assert_eq!(isbn.check_digit(), 7);
    assert_eq!(ean.check_digit(), 9);

    assert_eq!(&ean.digits()[0..3], &[9, 7, 8]);
    assert_eq!(&ean.digits()[3..12], &isbn.digits()[0..9]);
}

#[test]
fn invariant_round_trip_digit_image() {
    for s in ["0-9669553-0-7", "0-8044-2957-X", "096695530-*"] {
        let isbn = ProductCode::isbn10(s).unwrap();
        let ean = isbn.as_ean13().unwrap();
        assert_eq!(&ean.digits()[1..3], &[7, 8]);
        assert_eq!(&ean.digits()[3..12], &isbn.digits()[..9]);
    }

    for s in ["M-9669553-0-8", "M-2306-7118-7", "M 2306 7118 7"] {
        let ismn = ProductCode::ismn(s).unwrap();
        let ean = ismn.as_ean13().unwrap();
        assert_eq!(&ean.digits()[1..4], &[7, 9, 0]);
        // the M seed is dropped
        assert_eq!(&ean.digits()[4..12], &ismn.digits()[1..9]);
    }
}

#[test]
fn invariant_conversion_bits_match_own_bits() {
    let isbn = ProductCode::isbn10("0-9669553-0-7").unwrap();
    assert_eq!(isbn.bits(), isbn.as_ean13().unwrap().bits());

    let ismn = ProductCode::ismn("M-9669553-0-8").unwrap();
    assert_eq!(
        ismn.bits().as_str(),
        "L0L0111011001011101001110001011000010101011110L0L0111010010011101001110100001011100101001000L0L"
    );
}

#[test]
fn invariant_checksum_error() {
    let err = ProductCode::isbn10("0-9669553-0-8").unwrap_err();
    assert_eq!(err, CodeError::Checksum { format: FormatTag::Isbn10 });
    assert_eq!(err.to_string(), "ISBN10: checksum error");
}

#[test]
fn invariant_repeated_separator_is_structural() {
    let err = ProductCode::isbn10("*-9669553-0---7").unwrap_err();
    match err {
        CodeError::Structural { format, messages } => {
            assert_eq!(format, FormatTag::Isbn10);
            assert_eq!(messages, vec!["ISBN10: Repeated separator".to_string()]);
        }
        other => panic!("expected structural error, got {other:?}"),
    }
}

#[test]
fn invariant_structural_messages_accumulate() {
    let err = ProductCode::isbn10("0-96--69").unwrap_err();
    match err {
        CodeError::Structural { format, messages } => {
            assert_eq!(format, FormatTag::Isbn10);
            assert_eq!(
                messages,
                vec![
                    "ISBN10: Not enough digits".to_string(),
                    "ISBN10: Repeated separator".to_string(),
                ]
            );
        }
        other => panic!("expected structural error, got {other:?}"),
    }

    // structure is checked before the checksum
    let err = ProductCode::ean13("59012--34123457*").unwrap_err();
    assert_eq!(
        err.to_string(),
        "EAN13: Too many digits\nEAN13: Repeated separator"
    );
}

#[test]
fn invariant_wildcard_never_resolves_to_ten() {
    let err = ProductCode::isbn10("0-8044-2957-*").unwrap_err();
    assert_eq!(err, CodeError::Checksum { format: FormatTag::Isbn10 });

    assert!(matches!(
        identify("0-8044-2957-*", &DispatchConfig::default()),
        Err(CodeError::Unidentified { .. })
    ));

    // a typed X is still read as 10
    let typed = ProductCode::isbn10("0-8044-2957-x").unwrap();
    assert_eq!(typed.check_digit(), 10);
    assert_eq!(typed.normalized(), "0-8044-2957-X");
}

#[test]
fn invariant_isbn13_parses_directly() {
    let code = ProductCode::isbn13("978-0-9669553-0-9").unwrap();
    assert_eq!(code.check_digit(), 9);
    assert_eq!(
        code.bits().as_str(),
        "L0L0111011000100101001110001011000010101011110L0L0111010010011101001110100001011100101110100L0L"
    );
}

#[test]
fn invariant_979_check_digit() {
    // 979-0-9669553-0 needs 8, so 9 fails everywhere
    assert!(matches!(
        ProductCode::isbn13("979-0-9669553-0-9"),
        Err(CodeError::Checksum { .. })
    ));
    assert!(identify("979-0-9669553-0-9", &DispatchConfig::default()).is_err());

    let ismn13 = ProductCode::ismn13("979-0-9669553-0-8").unwrap();
    assert_eq!(ismn13.to_string(), "ISMN 979-0-9669553-0-8");
}

#[test]
fn invariant_errors_are_independent() {
    let a = ProductCode::isbn10("0-9669553-0-8").unwrap_err();
    let b = ProductCode::ean13("12--34").unwrap_err();
    // b's messages never leak into a
    assert_eq!(a.to_string(), "ISBN10: checksum error");
    assert!(!b.to_string().contains("ISBN10"));
}

#[test]
fn invariant_pattern_shapes() {
    let ean = ProductCode::ean13("4006381333931").unwrap();
    assert_eq!(ean.bits().len(), 95);
    let modules: Vec<Module> = ean.bits().modules().collect();
    assert_eq!(&modules[..3], &[Module::Guard, Module::Space, Module::Guard]);
    assert_eq!(&modules[92..], &[Module::Guard, Module::Space, Module::Guard]);
    assert_eq!(
        &modules[45..50],
        &[Module::Space, Module::Guard, Module::Space, Module::Guard, Module::Space]
    );

    let addon = ProductCode::upc5("55553").unwrap();
    assert_eq!(addon.bits().as_str(), "10110110001010110001010111001010110001010100001");
    assert!(addon.bits().modules().all(|m| m != Module::Guard));
}

#[test]
fn invariant_dispatch_priority() {
    let cases = [
        ("978-0-9669553-0-*", FormatTag::Isbn13, "ISBN 978-0-9669553-0-9"),
        ("096695530-*", FormatTag::Isbn13, "ISBN 978-096695530-9"),
        ("0-9*69553-0-7", FormatTag::Isbn13, "ISBN 978-0-9669553-0-9"),
        ("M-9669553-0-*", FormatTag::Ismn, "ISMN M-9669553-0-8"),
        ("979-0-9669553-0-*", FormatTag::Isbn13, "ISBN 979-0-9669553-0-8"),
        ("4006381333931", FormatTag::Ean13, "EAN13 4006381333931"),
    ];
    for (input, tag, display) in cases {
        let code = identify(input, &DispatchConfig::default()).unwrap();
        assert_eq!(code.format(), tag, "{input}");
        assert_eq!(code.to_string(), display);
    }

    for input in ["-9669553-0-7", "0-9669553-0-", "*78-0-9669553-0-*", "90000", ""] {
        assert!(
            matches!(
                identify(input, &DispatchConfig::default()),
                Err(CodeError::Unidentified { .. })
            ),
            "{input}"
        );
    }
}

#[test]
fn invariant_codes_build_across_threads() {
    let handles: Vec<_> = VALID
        .iter()
        .map(|(tag, s)| {
            let (tag, s) = (*tag, s.to_string());
            std::thread::spawn(move || ProductCode::new(tag, &s).map(|c| c.check_digit()))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_normalization_reruns_validation() {
    use productcode_core::validation::{get_validation_call_count, reset_validation_call_count};

    reset_validation_call_count();
    let isbn = ProductCode::isbn10("0-9669553-0-7").unwrap();
    // one pass for the ISBN-10, two for its EAN-13 form since its
    // check digit is a substituted wildcard
    assert_eq!(get_validation_call_count(), 3);

    reset_validation_call_count();
    isbn.as_ean13().unwrap();
    assert_eq!(get_validation_call_count(), 2);
}
