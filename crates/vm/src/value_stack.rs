//! Bounded value stack used for the evaluation stack and the alt stack.
//!
//! Index 0 always addresses the top of the stack.

use crate::error::{VmError, VmResult};
use crate::int_value::IntValue;
use crate::vm_value::{ArrayRef, MapRef, VmValue};

/// Represents a bounded stack of [`VmValue`]s.
#[derive(Debug, Clone)]
pub struct ValueStack {
    /// Bottom of the stack first
    data: Vec<VmValue>,

    /// Maximum number of items
    limit: usize,
}

impl ValueStack {
    /// Creates an empty stack holding at most `limit` items.
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of items on the stack.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn position(&self, n: usize) -> VmResult<usize> {
        if n >= self.data.len() {
            return Err(VmError::IndexOutOfBound(format!(
                "index {} on stack of depth {}",
                n,
                self.data.len()
            )));
        }
        Ok(self.data.len() - 1 - n)
    }

    fn check_room(&self) -> VmResult<()> {
        if self.data.len() >= self.limit {
            return Err(VmError::StackOverflow(format!(
                "stack limit {} reached",
                self.limit
            )));
        }
        Ok(())
    }

    /// Pushes an item onto the stack. Fails without growing at the limit.
    pub fn push(&mut self, item: VmValue) -> VmResult<()> {
        self.check_room()?;
        self.data.push(item);
        Ok(())
    }

    /// Pops an item from the stack.
    pub fn pop(&mut self) -> VmResult<VmValue> {
        self.data
            .pop()
            .ok_or_else(|| VmError::stack_underflow_msg("pop from empty stack"))
    }

    /// Pops the top two items, returning `(second, top)`.
    pub fn pop_pair(&mut self) -> VmResult<(VmValue, VmValue)> {
        if self.data.len() < 2 {
            return Err(VmError::stack_underflow_msg(format!(
                "need 2 items, have {}",
                self.data.len()
            )));
        }
        let right = self.pop()?;
        let left = self.pop()?;
        Ok((left, right))
    }

    /// Returns the item `n` positions below the top without removing it.
    pub fn peek(&self, n: usize) -> VmResult<&VmValue> {
        let index = self.position(n)?;
        Ok(&self.data[index])
    }

    /// Removes and returns the item `n` positions below the top.
    pub fn remove(&mut self, n: usize) -> VmResult<VmValue> {
        let index = self.position(n)?;
        Ok(self.data.remove(index))
    }

    /// Inserts an item so that it ends up `n` positions below the top.
    pub fn insert(&mut self, n: usize, item: VmValue) -> VmResult<()> {
        let index = self.position(n)?;
        self.check_room()?;
        self.data.insert(index + 1, item);
        Ok(())
    }

    /// Swaps the items at depths `i` and `j`.
    pub fn swap(&mut self, i: usize, j: usize) -> VmResult<()> {
        let a = self.position(i)?;
        let b = self.position(j)?;
        self.data.swap(a, b);
        Ok(())
    }

    /// Reverses the order of the top `n` items.
    pub fn reverse(&mut self, n: usize) -> VmResult<()> {
        if n > self.data.len() {
            return Err(VmError::IndexOutOfBound(format!(
                "reverse {} items on stack of depth {}",
                n,
                self.data.len()
            )));
        }
        let start = self.data.len() - n;
        self.data[start..].reverse();
        Ok(())
    }

    /// Pushes copies of all items onto `target`, preserving order.
    pub fn copy_to(&self, target: &mut ValueStack) -> VmResult<()> {
        if target.data.len() + self.data.len() > target.limit {
            return Err(VmError::StackOverflow(format!(
                "copy of {} items exceeds stack limit {}",
                self.data.len(),
                target.limit
            )));
        }
        target.data.extend(self.data.iter().cloned());
        Ok(())
    }

    /// Clears the stack.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Iterates from the top of the stack down.
    pub fn iter(&self) -> impl Iterator<Item = &VmValue> {
        self.data.iter().rev()
    }

    pub fn pop_as_bool(&mut self) -> VmResult<bool> {
        self.pop()?.as_bool()
    }

    pub fn pop_as_int_value(&mut self) -> VmResult<IntValue> {
        self.pop()?.as_int_value()
    }

    pub fn pop_as_int64(&mut self) -> VmResult<i64> {
        self.pop()?.as_int64()
    }

    pub fn pop_as_bytes(&mut self) -> VmResult<Vec<u8>> {
        self.pop()?.as_bytes()
    }

    pub fn pop_as_array(&mut self) -> VmResult<ArrayRef> {
        self.pop()?.as_array()
    }

    pub fn pop_as_map(&mut self) -> VmResult<MapRef> {
        self.pop()?.as_map()
    }

    /// Pops a non-negative index that addresses an existing item below it.
    ///
    /// Used by XDROP, XSWAP, XTUCK, PICK and ROLL.
    pub fn pop_stack_index(&mut self) -> VmResult<usize> {
        let n = self.pop_as_int64()?;
        if n < 0 || n as u64 >= self.data.len() as u64 {
            return Err(VmError::bad_value_msg(format!(
                "stack index {} with {} items below",
                n,
                self.data.len()
            )));
        }
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> VmValue {
        VmValue::from(v)
    }

    fn top_int(stack: &ValueStack, n: usize) -> i64 {
        stack
            .peek(n)
            .expect("peek should succeed")
            .as_int64()
            .expect("integer expected")
    }

    #[test]
    fn test_push_pop() {
        let mut stack = ValueStack::new(16);
        stack.push(int(1)).expect("push should succeed");
        stack.push(int(2)).expect("push should succeed");
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop_as_int64().expect("pop should succeed"), 2);
        assert_eq!(stack.pop_as_int64().expect("pop should succeed"), 1);
        assert!(matches!(stack.pop(), Err(VmError::StackUnderflow(_))));
    }

    #[test]
    fn test_peek_is_relative_to_top() {
        let mut stack = ValueStack::new(16);
        for v in 1..=3 {
            stack.push(int(v)).expect("push should succeed");
        }
        assert_eq!(top_int(&stack, 0), 3);
        assert_eq!(top_int(&stack, 2), 1);
        assert!(stack.peek(3).is_err());
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_limit_leaves_stack_full() {
        let mut stack = ValueStack::new(2);
        stack.push(int(1)).expect("push should succeed");
        stack.push(int(2)).expect("push should succeed");
        assert!(matches!(stack.push(int(3)), Err(VmError::StackOverflow(_))));
        assert!(stack.insert(0, int(3)).is_err());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_remove_insert_swap() {
        let mut stack = ValueStack::new(16);
        for v in 1..=4 {
            stack.push(int(v)).expect("push should succeed");
        }
        // [4, 3, 2, 1] from the top
        assert_eq!(
            stack.remove(1).expect("remove should succeed").as_int64().expect("int"),
            3
        );
        stack.insert(2, int(9)).expect("insert should succeed");
        // [4, 2, 9, 1]
        assert_eq!(top_int(&stack, 2), 9);
        assert_eq!(top_int(&stack, 3), 1);
        stack.swap(0, 3).expect("swap should succeed");
        assert_eq!(top_int(&stack, 0), 1);
        assert_eq!(top_int(&stack, 3), 4);
        assert!(stack.swap(0, 4).is_err());
        assert!(stack.remove(4).is_err());
        assert!(stack.insert(4, int(0)).is_err());
    }

    #[test]
    fn test_reverse_and_copy() {
        let mut stack = ValueStack::new(4);
        for v in 1..=3 {
            stack.push(int(v)).expect("push should succeed");
        }
        stack.reverse(2).expect("reverse should succeed");
        assert_eq!(top_int(&stack, 0), 2);
        assert_eq!(top_int(&stack, 1), 3);
        assert!(stack.reverse(4).is_err());

        let mut target = ValueStack::new(4);
        stack.copy_to(&mut target).expect("copy should succeed");
        assert_eq!(top_int(&target, 0), 2);
        assert!(stack.copy_to(&mut target).is_err());
    }

    #[test]
    fn test_pop_stack_index() {
        let mut stack = ValueStack::new(8);
        stack.push(int(10)).expect("push should succeed");
        stack.push(int(0)).expect("push should succeed");
        assert_eq!(stack.pop_stack_index().expect("index should be valid"), 0);
        stack.push(int(1)).expect("push should succeed");
        assert!(matches!(stack.pop_stack_index(), Err(VmError::BadValue(_))));
        stack.push(int(-1)).expect("push should succeed");
        assert!(stack.pop_stack_index().is_err());
    }
}
