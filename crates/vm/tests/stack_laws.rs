//! Property tests for the bounded value stack.

use neovm::{ValueStack, VmError, VmValue};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_pop_returns_pushes_in_reverse(values in prop::collection::vec(any::<i64>(), 0..64)) {
        let mut stack = ValueStack::new(64);
        for v in &values {
            stack.push(VmValue::from(*v)).expect("push should succeed");
        }
        prop_assert_eq!(stack.len(), values.len());
        for v in values.iter().rev() {
            prop_assert_eq!(stack.pop().expect("pop should succeed").as_int64().expect("int"), *v);
        }
        prop_assert!(stack.is_empty());
    }

    #[test]
    fn prop_peek_addresses_from_top(values in prop::collection::vec(any::<i64>(), 1..32), n in 0usize..32) {
        let mut stack = ValueStack::new(64);
        for v in &values {
            stack.push(VmValue::from(*v)).expect("push should succeed");
        }
        if n < values.len() {
            let expected = values[values.len() - 1 - n];
            prop_assert_eq!(stack.peek(n).expect("peek should succeed").as_int64().expect("int"), expected);
        } else {
            prop_assert!(stack.peek(n).is_err());
        }
        prop_assert_eq!(stack.len(), values.len());
    }

    #[test]
    fn prop_limit_never_exceeded(limit in 1usize..32, pushes in 0usize..64) {
        let mut stack = ValueStack::new(limit);
        for i in 0..pushes {
            let result = stack.push(VmValue::from(i as i64));
            if i < limit {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(matches!(result, Err(VmError::StackOverflow(_))));
            }
        }
        prop_assert_eq!(stack.len(), pushes.min(limit));
    }
}

#[test]
fn test_pop_empty_underflows() {
    let mut stack = ValueStack::new(4);
    assert!(matches!(stack.pop(), Err(VmError::StackUnderflow(_))));
}
