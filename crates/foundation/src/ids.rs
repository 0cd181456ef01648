use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of one boundary region (a state, an SA4, ...).
///
/// Ids come straight from the boundary and statistics sources, so they are
/// kept as opaque strings. Several polygon parts may share one id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        RegionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        RegionId(s.to_string())
    }
}

impl From<String> for RegionId {
    fn from(s: String) -> Self {
        RegionId(s)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Boundary resolution tier, coarse (0 = state) to fine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LevelIndex(pub u8);

impl LevelIndex {
    pub fn new(n: u8) -> Self {
        LevelIndex(n)
    }
}

impl fmt::Display for LevelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{LevelIndex, RegionId};
    use std::collections::HashMap;

    #[test]
    fn region_id_looks_up_by_str() {
        let mut m: HashMap<RegionId, u32> = HashMap::new();
        m.insert(RegionId::from("101"), 7);
        assert_eq!(m.get("101"), Some(&7));
        assert_eq!(RegionId::new("101").to_string(), "101");
    }

    #[test]
    fn levels_order_coarse_to_fine() {
        assert!(LevelIndex::new(0) < LevelIndex::new(3));
        assert_eq!(LevelIndex(2).to_string(), "level 2");
    }
}
