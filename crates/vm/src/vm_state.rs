//! Engine state flags.

/// Where the engine stands between steps.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum VMState {
    /// Running, or not yet started by `execute`.
    NONE = 0,

    /// The invocation stack drained without error.
    HALT = 1 << 0,

    /// A step failed; the error is kept on the engine.
    FAULT = 1 << 1,

    /// Execution is paused, either before the first step or at a breakpoint.
    BREAK = 1 << 2,
}

impl VMState {
    #[inline]
    pub fn contains(self, flag: VMState) -> bool {
        (self as u8 & flag as u8) != 0
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self == VMState::NONE
    }

    #[inline]
    pub fn is_halt(self) -> bool {
        self.contains(VMState::HALT)
    }

    #[inline]
    pub fn is_fault(self) -> bool {
        self.contains(VMState::FAULT)
    }

    #[inline]
    pub fn is_break(self) -> bool {
        self.contains(VMState::BREAK)
    }

    /// True once the engine can make no further progress.
    #[inline]
    pub fn is_terminal(self) -> bool {
        self.is_halt() || self.is_fault()
    }
}

impl std::fmt::Display for VMState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VMState::NONE => "NONE",
            VMState::HALT => "HALT",
            VMState::FAULT => "FAULT",
            VMState::BREAK => "BREAK",
        };
        f.write_str(name)
    }
}
