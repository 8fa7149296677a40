//! Property tests for bounded integer arithmetic.

use neovm::int_value::{bigint_from_neo_bytes, bigint_to_neo_bytes};
use neovm::{IntValue, VmError};
use num_bigint::BigInt;
use proptest::prelude::*;

fn bounded_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=32)
}

proptest! {
    #[test]
    fn prop_i64_matches_bigint_encoding(v in any::<i64>()) {
        let value = IntValue::from(v);
        prop_assert_eq!(value.to_bytes(), bigint_to_neo_bytes(&BigInt::from(v)));
        prop_assert_eq!(value.to_i64(), Some(v));
    }

    #[test]
    fn prop_bytes_decode_to_same_number(bytes in bounded_bytes()) {
        let value = IntValue::from_bytes(&bytes).expect("32 bytes should decode");
        prop_assert_eq!(value.to_bigint(), bigint_from_neo_bytes(&bytes));
        let reencoded = IntValue::from_bytes(&value.to_bytes()).expect("re-decode should succeed");
        prop_assert_eq!(reencoded, value);
    }

    #[test]
    fn prop_small_addition_matches_bigint(a in any::<i64>(), b in any::<i64>()) {
        let sum = IntValue::from(a).add(&IntValue::from(b)).expect("add should succeed");
        prop_assert_eq!(sum.to_bigint(), BigInt::from(a) + BigInt::from(b));
    }

    #[test]
    fn prop_small_multiplication_matches_bigint(a in any::<i64>(), b in any::<i64>()) {
        let product = IntValue::from(a).mul(&IntValue::from(b)).expect("mul should succeed");
        prop_assert_eq!(product.to_bigint(), BigInt::from(a) * BigInt::from(b));
    }

    #[test]
    fn prop_division_truncates(a in any::<i64>(), b in any::<i64>().prop_filter("non-zero", |b| *b != 0)) {
        let q = IntValue::from(a).div(&IntValue::from(b)).expect("div should succeed");
        let r = IntValue::from(a).modulo(&IntValue::from(b)).expect("mod should succeed");
        prop_assert_eq!(q.to_bigint(), BigInt::from(a) / BigInt::from(b));
        prop_assert_eq!(r.to_bigint(), BigInt::from(a) % BigInt::from(b));
    }

    #[test]
    fn prop_results_stay_within_bound(bytes in bounded_bytes(), shift in 0i64..300) {
        let value = IntValue::from_bytes(&bytes).expect("decode should succeed");
        match value.shl(&IntValue::from(shift)) {
            Ok(shifted) => prop_assert!(shifted.to_bytes().len() <= 32),
            Err(err) => prop_assert_eq!(err, VmError::OverMaxBigIntegerSize),
        }
    }

    #[test]
    fn prop_ordering_matches_bigint(a in bounded_bytes(), b in bounded_bytes()) {
        let x = IntValue::from_bytes(&a).expect("decode should succeed");
        let y = IntValue::from_bytes(&b).expect("decode should succeed");
        prop_assert_eq!(x.cmp(&y), x.to_bigint().cmp(&y.to_bigint()));
    }
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        IntValue::from(1).div(&IntValue::from(0)).unwrap_err(),
        VmError::DivModByZero
    );
    assert_eq!(
        IntValue::from(1).modulo(&IntValue::from(0)).unwrap_err(),
        VmError::DivModByZero
    );
}

#[test]
fn test_thirty_three_byte_results_rejected() {
    let max = BigInt::from(2).pow(255) - 1;
    let value = IntValue::from_bigint(max).expect("2^255-1 should fit");
    assert_eq!(
        value.add(&IntValue::from(1)).unwrap_err(),
        VmError::OverMaxBigIntegerSize
    );
    let min = -BigInt::from(2).pow(255);
    let value = IntValue::from_bigint(min).expect("-2^255 should fit");
    assert_eq!(value.negate().unwrap_err(), VmError::OverMaxBigIntegerSize);
}
