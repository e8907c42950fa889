// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Unique identifier for a component registered with a Hub.
///
/// # Reserved values
/// `ComponentId::DEFAULT` (0) means "unaddressed" on an outgoing envelope, or
/// "let Hub resolve the target from icid/message semantics". `BROADCAST`
/// (`u32::MAX`) means "every attached consumer of this message type".
/// All other values are allocated monotonically by Hub on registration.
///
/// # Example
/// ```rust
/// use ime_hub::util::ComponentId;
///
/// let id = ComponentId::new(7);
/// assert_eq!(id.value(), 7);
/// assert!(!id.is_default());
/// assert_eq!(ComponentId::DEFAULT.value(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Unaddressed / unassigned component id.
    pub const DEFAULT: Self = Self(0);
    /// Sentinel meaning "all attached consumers of this message type".
    pub const BROADCAST: Self = Self(u32::MAX);

    /// Wrap a raw id value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The raw id value.
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// True if this is the unaddressed sentinel.
    pub const fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT.0
    }

    /// True if this addresses every attached consumer.
    pub const fn is_broadcast(&self) -> bool {
        self.0 == Self::BROADCAST.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DEFAULT => write!(f, "default"),
            Self::BROADCAST => write!(f, "broadcast"),
            Self(v) => write!(f, "{v}"),
        }
    }
}

/// Unique identifier for an input context (icid).
///
/// # Reserved values
/// `InputContextId::NONE` (0) means "global, no context". The "focused
/// context" sentinel from the spec is not a storable id: it is resolved by
/// Hub at dispatch time by looking up the current `focused_icid`, so it
/// never appears as a key in a registry.
///
/// # Example
/// ```rust
/// use ime_hub::util::InputContextId;
///
/// let icid = InputContextId::new(100);
/// assert_eq!(icid.value(), 100);
/// assert!(InputContextId::NONE.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputContextId(u32);

impl InputContextId {
    /// Global / no-context sentinel.
    pub const NONE: Self = Self(0);

    /// Wrap a raw id value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The raw id value.
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// True if this is the global sentinel.
    pub const fn is_none(&self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl Default for InputContextId {
    fn default() -> Self {
        Self::NONE
    }
}

impl Display for InputContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => write!(f, "none"),
            Self(v) => write!(f, "{v}"),
        }
    }
}

/// Request/reply correlation id, allocated by the sending `ComponentHost`.
///
/// Unique only within the lifetime of the host that allocated it; a reply
/// envelope carries the original request's serial unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Serial(u32);

impl Serial {
    /// Wrap a raw serial value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The raw serial value.
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator for `Serial` values, one per `ComponentHost`.
#[derive(Debug, Default)]
pub struct SerialAllocator {
    next: std::sync::atomic::AtomicU32,
}

impl SerialAllocator {
    /// Create a fresh allocator starting at 1 (0 is reserved as "no serial").
    pub fn new() -> Self {
        Self {
            next: std::sync::atomic::AtomicU32::new(1),
        }
    }

    /// Allocate the next serial, wrapping past `u32::MAX` back to 1.
    pub fn allocate(&self) -> Serial {
        loop {
            let current = self.next.load(std::sync::atomic::Ordering::Relaxed);
            let next = if current == u32::MAX { 1 } else { current + 1 };
            if self
                .next
                .compare_exchange(
                    current,
                    next,
                    std::sync::atomic::Ordering::Relaxed,
                    std::sync::atomic::Ordering::Relaxed,
                )
                .is_ok()
            {
                return Serial::new(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_id_reserved_values() {
        assert!(ComponentId::DEFAULT.is_default());
        assert!(ComponentId::BROADCAST.is_broadcast());
        assert_ne!(ComponentId::DEFAULT, ComponentId::BROADCAST);
    }

    #[test]
    fn component_id_display() {
        assert_eq!(ComponentId::DEFAULT.to_string(), "default");
        assert_eq!(ComponentId::BROADCAST.to_string(), "broadcast");
        assert_eq!(ComponentId::new(42).to_string(), "42");
    }

    #[test]
    fn input_context_id_none() {
        assert!(InputContextId::NONE.is_none());
        assert!(!InputContextId::new(5).is_none());
    }

    #[test]
    fn serial_allocator_monotonic_and_unique() {
        let alloc = SerialAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_ne!(a, b);
        assert_eq!(a.value() + 1, b.value());
    }

    #[test]
    fn serial_allocator_wraps_past_max() {
        let alloc = SerialAllocator::new();
        alloc
            .next
            .store(u32::MAX, std::sync::atomic::Ordering::Relaxed);
        let s = alloc.allocate();
        assert_eq!(s.value(), u32::MAX);
        let next = alloc.allocate();
        assert_eq!(next.value(), 1);
    }
}
