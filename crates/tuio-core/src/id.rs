//! Identity types for the TUIO protocol
//!
//! Session ids are scoped to a profile: a cursor and an object may carry
//! the same numeric session id without referring to each other.

use std::fmt;

/// Session identity - one tracked cursor or object instance
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(pub i32);

impl SessionId {
    #[inline]
    pub fn new(id: i32) -> Self {
        SessionId(id)
    }

    #[inline]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Symbol identity - the fiducial pattern a physical marker carries
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SymbolId(pub i32);

impl SymbolId {
    #[inline]
    pub fn new(id: i32) -> Self {
        SymbolId(id)
    }

    #[inline]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported TUIO profiles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Profile {
    /// `/tuio/2Dcur` - position-only pointers
    Cursor2D,
    /// `/tuio/2Dobj` - fiducial markers with pose and kinematics
    Object2D,
}

impl Profile {
    /// Last address segment that selects this profile
    pub fn address_suffix(self) -> &'static str {
        match self {
            Profile::Cursor2D => "2Dcur",
            Profile::Object2D => "2Dobj",
        }
    }

    /// Resolve a profile from an OSC address such as `/tuio/2Dobj`
    pub fn from_address(address: &str) -> Option<Self> {
        match address.rsplit('/').next()? {
            "2Dcur" => Some(Profile::Cursor2D),
            "2Dobj" => Some(Profile::Object2D),
            _ => None,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.address_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_address() {
        assert_eq!(Profile::from_address("/tuio/2Dcur"), Some(Profile::Cursor2D));
        assert_eq!(Profile::from_address("/tuio/2Dobj"), Some(Profile::Object2D));
        assert_eq!(Profile::from_address("/tuio/2Dblb"), None);
        assert_eq!(Profile::from_address("/tuio/3Dobj"), None);
        assert_eq!(Profile::from_address(""), None);
    }

    #[test]
    fn test_session_ordering() {
        let mut ids = vec![SessionId::new(5), SessionId::new(-1), SessionId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![SessionId::new(-1), SessionId::new(2), SessionId::new(5)]);
    }
}
