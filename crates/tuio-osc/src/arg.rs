//! Typed OSC arguments

/// A single OSC argument
#[derive(Clone, Debug, PartialEq)]
pub enum OscArg {
    /// `i` - 32-bit integer
    Int(i32),
    /// `f` - 32-bit float
    Float(f32),
    /// `s` - string
    String(String),
    /// `b` - blob
    Blob(Vec<u8>),
    /// `h` - 64-bit integer
    Long(i64),
    /// `d` - 64-bit float
    Double(f64),
    /// `t` - NTP time tag
    Time(u64),
    /// `T`
    True,
    /// `F`
    False,
    /// `N`
    Nil,
    /// `I`
    Impulse,
}

impl OscArg {
    /// Type tag character for this argument
    pub fn type_tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::String(_) => 's',
            OscArg::Blob(_) => 'b',
            OscArg::Long(_) => 'h',
            OscArg::Double(_) => 'd',
            OscArg::Time(_) => 't',
            OscArg::True => 'T',
            OscArg::False => 'F',
            OscArg::Nil => 'N',
            OscArg::Impulse => 'I',
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            OscArg::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            OscArg::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OscArg::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for OscArg {
    fn from(v: i32) -> Self {
        OscArg::Int(v)
    }
}

impl From<f32> for OscArg {
    fn from(v: f32) -> Self {
        OscArg::Float(v)
    }
}

impl From<&str> for OscArg {
    fn from(v: &str) -> Self {
        OscArg::String(v.to_string())
    }
}

impl From<String> for OscArg {
    fn from(v: String) -> Self {
        OscArg::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_do_not_coerce() {
        assert_eq!(OscArg::Int(3).as_i32(), Some(3));
        assert_eq!(OscArg::Int(3).as_f32(), None);
        assert_eq!(OscArg::Float(0.5).as_i32(), None);
        assert_eq!(OscArg::from("set").as_str(), Some("set"));
        assert_eq!(OscArg::from(0.5f32).type_tag(), 'f');
    }
}
