/// Identifies one submitted load in a deterministic, stable way.
///
/// Handles are issued in submission order, so sorting them recovers that
/// order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Request(pub u64);
