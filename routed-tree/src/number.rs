//! Numeric scalar with i64/u64/f64 storage.

use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};

/// Internal representation of a number.
#[derive(Copy, Clone, Debug)]
enum Repr {
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 64-bit integer (only used above `i64::MAX`)
    U64(u64),
    /// 64-bit floating point
    F64(f64),
}

/// A numeric scalar value.
///
/// Stores integers in the narrowest of `i64`/`u64` and floats as `f64`.
/// Equality is numeric across the two integer representations; integers and
/// floats never compare equal.
#[derive(Copy, Clone)]
pub struct Number(Repr);

impl Number {
    /// The value as `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            Repr::I64(i) => Some(i),
            Repr::U64(u) => i64::try_from(u).ok(),
            Repr::F64(_) => None,
        }
    }

    /// The value as `u64`, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self.0 {
            Repr::I64(i) => u64::try_from(i).ok(),
            Repr::U64(u) => Some(u),
            Repr::F64(_) => None,
        }
    }

    /// The value as `f64`. Integers convert lossily above 2^53.
    pub fn as_f64(&self) -> f64 {
        match self.0 {
            Repr::I64(i) => i as f64,
            Repr::U64(u) => u as f64,
            Repr::F64(f) => f,
        }
    }

    /// Whether this number is stored as a float.
    pub fn is_float(&self) -> bool {
        matches!(self.0, Repr::F64(_))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Repr::F64(a), Repr::F64(b)) => a == b,
            (Repr::F64(_), _) | (_, Repr::F64(_)) => false,
            // integer vs integer: compare through the common i128 domain
            _ => self.as_i128() == other.as_i128(),
        }
    }
}

impl Number {
    fn as_i128(&self) -> i128 {
        match self.0 {
            Repr::I64(i) => i as i128,
            Repr::U64(u) => u as i128,
            Repr::F64(_) => unreachable!("float compared as integer"),
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Repr::F64(f) => f.to_bits().hash(state),
            _ => self.as_i128().hash(state),
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::I64(i) => write!(f, "{i}"),
            Repr::U64(u) => write!(f, "{u}"),
            Repr::F64(v) => write!(f, "{v}"),
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number(Repr::I64(i))
    }
}

impl From<u64> for Number {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Number(Repr::I64(i)),
            Err(_) => Number(Repr::U64(u)),
        }
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number(Repr::F64(f))
    }
}

macro_rules! number_from_int {
    ($($t:ty)*) => {
        $(
            impl From<$t> for Number {
                fn from(v: $t) -> Self {
                    Number(Repr::I64(v as i64))
                }
            }
        )*
    };
}

number_from_int!(i8 i16 i32 u8 u16 u32 isize);

impl From<usize> for Number {
    fn from(v: usize) -> Self {
        Number::from(v as u64)
    }
}

impl From<f32> for Number {
    fn from(f: f32) -> Self {
        Number(Repr::F64(f as f64))
    }
}
