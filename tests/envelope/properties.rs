//! Property Tests
//!
//! Generated value trees survive encoding under every writer preset, and
//! damaged buffers are rejected without panicking.

use crate::*;
use proptest::prelude::*;
use zera::{transcode, ReaderOptions, WriterOptions};

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::UInt),
        any::<f64>().prop_filter("NaN never equals itself", |f| !f.is_nan()).prop_map(Value::Float),
        ".{0,24}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..48).prop_map(Value::Bytes),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{0,6}", inner), 0..8).prop_map(Value::Object),
        ]
    })
}

fn presets() -> Vec<WriterOptions> {
    vec![
        WriterOptions::default(),
        WriterOptions::compact(),
        WriterOptions::tensor(),
        WriterOptions::no_inline(),
    ]
}

proptest! {
    #[test]
    fn prop_round_trip(value in arb_value()) {
        for options in presets() {
            let buf = zera::encode_with(&value, options).unwrap();
            prop_assert_eq!(&decode_all(&buf), &value);
        }
    }

    #[test]
    fn prop_transcode_identity_is_byte_exact(value in arb_value()) {
        let buf = encode_one(&value);
        let again = transcode(&buf, ReaderOptions::default(), WriterOptions::default()).unwrap();
        prop_assert_eq!(again.as_slice(), buf.as_slice());
    }

    #[test]
    fn prop_truncation_rejected(value in arb_value(), cut in any::<prop::sample::Index>()) {
        let buf = encode_one(&value);
        let env_end = 20 + Reader::new(&buf).unwrap().header().env_size as usize;
        let cut = cut.index(env_end);
        prop_assert!(Reader::new(&buf[..cut]).is_err());
    }

    #[test]
    fn prop_byte_flips_never_panic(
        value in arb_value(),
        flips in prop::collection::vec((any::<prop::sample::Index>(), any::<u8>()), 1..8),
    ) {
        let mut bytes = encode_one(&value).to_vec();
        for (at, b) in flips {
            let i = at.index(bytes.len());
            bytes[i] ^= b;
        }
        if let Ok(r) = Reader::new(&bytes) {
            let _ = r.to_value();
            let _ = r.to_string();
        }
    }
}
