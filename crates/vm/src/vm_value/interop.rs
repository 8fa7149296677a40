//! Opaque host objects carried on the stack.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A host object that bytecode can hold and pass back to syscalls.
pub trait InteropInterface: fmt::Debug + Any {
    /// Type name checked by syscall validators.
    fn interface_type(&self) -> &str;

    /// Downcast hook for handlers that need the concrete host object.
    fn as_any(&self) -> &dyn Any;

    /// Canonical bytes of the object, used for equality and notifications.
    fn to_bytes(&self) -> Vec<u8> {
        Vec::new()
    }
}

/// Shared handle to an [`InteropInterface`].
#[derive(Clone)]
pub struct InteropValue(Rc<dyn InteropInterface>);

impl InteropValue {
    pub fn new<T: InteropInterface>(value: T) -> Self {
        InteropValue(Rc::new(value))
    }

    pub fn interface_type(&self) -> &str {
        self.0.interface_type()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    /// Returns the wrapped object if it is a `T`.
    pub fn downcast_ref<T: InteropInterface>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Same handle, or same host type with equal canonical bytes.
    pub fn equals(&self, other: &InteropValue) -> bool {
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.interface_type() == other.interface_type() && {
            let bytes = self.to_bytes();
            !bytes.is_empty() && bytes == other.to_bytes()
        }
    }
}

impl fmt::Debug for InteropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interop({:?})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Header(u32);

    impl InteropInterface for Header {
        fn interface_type(&self) -> &str {
            "Header"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn to_bytes(&self) -> Vec<u8> {
            self.0.to_le_bytes().to_vec()
        }
    }

    #[test]
    fn test_downcast_and_equality() {
        let a = InteropValue::new(Header(5));
        let b = InteropValue::new(Header(5));
        let c = InteropValue::new(Header(6));
        assert_eq!(a.downcast_ref::<Header>().map(|h| h.0), Some(5));
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
        assert!(a.equals(&a.clone()));
    }
}
