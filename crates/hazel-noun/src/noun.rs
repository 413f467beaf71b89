use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;
use ibig::UBig;
use num_traits::Zero;

use crate::Rc;

/// A noun is either an atom (a non-negative integer of arbitrary size) or a
/// cell (an ordered pair of nouns).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Noun {
    Atom(UBig),
    Cell(Rc<Noun>, Rc<Noun>),
}

impl Noun {
    pub fn is_atom(&self) -> bool {
        matches!(self, Noun::Atom(_))
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, Noun::Cell(_, _))
    }

    /// True for the atom `0` only; cells are never zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Noun::Atom(value) if value.is_zero())
    }

    pub fn as_atom(&self) -> Option<&UBig> {
        match self {
            Noun::Atom(value) => Some(value),
            Noun::Cell(_, _) => None,
        }
    }

    pub fn as_cell(&self) -> Option<(&Noun, &Noun)> {
        match self {
            Noun::Atom(_) => None,
            Noun::Cell(head, tail) => Some((head, tail)),
        }
    }

    /// Atom from a little-endian byte string. Trailing zero bytes are
    /// insignificant, so `[1, 0, 0]` and `[1]` make the same atom.
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        Noun::Atom(UBig::from_le_bytes(bytes))
    }
}

impl fmt::Display for Noun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Noun::Atom(value) => write!(f, "{}", value),
            Noun::Cell(head, tail) => write!(f, "[{} {}]", head, tail),
        }
    }
}

pub fn atom(value: u64) -> Noun {
    Noun::Atom(UBig::from(value))
}

pub fn cell(head: Noun, tail: Noun) -> Noun {
    Noun::Cell(Rc::new(head), Rc::new(tail))
}

pub trait NounEncode {
    fn to_noun(&self) -> Noun;
}

pub trait NounDecode: Sized {
    fn from_noun(noun: &Noun) -> Option<Self>;
}

impl<T: NounEncode + ?Sized> NounEncode for &T {
    fn to_noun(&self) -> Noun {
        (**self).to_noun()
    }
}

impl NounEncode for Noun {
    fn to_noun(&self) -> Noun {
        self.clone()
    }
}

impl NounDecode for Noun {
    fn from_noun(noun: &Noun) -> Option<Self> {
        Some(noun.clone())
    }
}

impl NounEncode for UBig {
    fn to_noun(&self) -> Noun {
        Noun::Atom(self.clone())
    }
}

impl NounDecode for UBig {
    fn from_noun(noun: &Noun) -> Option<Self> {
        noun.as_atom().cloned()
    }
}

macro_rules! impl_noun_encode_for_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NounEncode for $ty {
                fn to_noun(&self) -> Noun {
                    atom(*self as u64)
                }
            }
        )*
    };
}

impl_noun_encode_for_int!(i32, i64, isize, u32, u64, usize);

impl NounDecode for u64 {
    fn from_noun(noun: &Noun) -> Option<Self> {
        noun.as_atom()?.try_into().ok()
    }
}

impl NounDecode for u32 {
    fn from_noun(noun: &Noun) -> Option<Self> {
        u64::from_noun(noun)?.try_into().ok()
    }
}

impl NounDecode for usize {
    fn from_noun(noun: &Noun) -> Option<Self> {
        u64::from_noun(noun)?.try_into().ok()
    }
}

// Signed values are encoded through `as u64`, so decoding casts the bits
// back rather than range-checking them.
macro_rules! impl_noun_decode_for_signed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NounDecode for $ty {
                fn from_noun(noun: &Noun) -> Option<Self> {
                    u64::from_noun(noun).map(|value| value as $ty)
                }
            }
        )*
    };
}

impl_noun_decode_for_signed!(i32, i64, isize);

impl NounEncode for bool {
    fn to_noun(&self) -> Noun {
        atom(if *self { 0 } else { 1 })
    }
}

impl NounDecode for bool {
    fn from_noun(noun: &Noun) -> Option<Self> {
        match u64::from_noun(noun)? {
            0 => Some(true),
            1 => Some(false),
            _ => None,
        }
    }
}

impl<T: NounEncode> NounEncode for Option<T> {
    fn to_noun(&self) -> Noun {
        match self {
            None => atom(0),
            Some(value) => (0, value.to_noun()).to_noun(),
        }
    }
}

impl<T: NounDecode> NounDecode for Option<T> {
    fn from_noun(noun: &Noun) -> Option<Self> {
        match noun {
            n if n.is_zero() => Some(None),
            Noun::Cell(tag, value) if tag.is_zero() => Some(Some(T::from_noun(value)?)),
            _ => None,
        }
    }
}

impl<T: NounEncode> NounEncode for Box<T> {
    fn to_noun(&self) -> Noun {
        (**self).to_noun()
    }
}

impl<T: NounDecode> NounDecode for Box<T> {
    fn from_noun(noun: &Noun) -> Option<Self> {
        Some(Box::new(T::from_noun(noun)?))
    }
}

impl<A: NounEncode, B: NounEncode> NounEncode for (A, B) {
    fn to_noun(&self) -> Noun {
        cell(self.0.to_noun(), self.1.to_noun())
    }
}

impl<A: NounEncode, B: NounEncode, C: NounEncode> NounEncode for (A, B, C) {
    fn to_noun(&self) -> Noun {
        (&self.0, (&self.1, &self.2)).to_noun()
    }
}

impl<A: NounEncode, B: NounEncode, C: NounEncode, D: NounEncode> NounEncode for (A, B, C, D) {
    fn to_noun(&self) -> Noun {
        (&self.0, (&self.1, (&self.2, &self.3))).to_noun()
    }
}

impl<A: NounDecode, B: NounDecode> NounDecode for (A, B) {
    fn from_noun(noun: &Noun) -> Option<Self> {
        let (head, tail) = noun.as_cell()?;
        Some((A::from_noun(head)?, B::from_noun(tail)?))
    }
}

impl<A: NounDecode, B: NounDecode, C: NounDecode> NounDecode for (A, B, C) {
    fn from_noun(noun: &Noun) -> Option<Self> {
        let (head, tail) = noun.as_cell()?;
        let (b, c) = <(B, C)>::from_noun(tail)?;
        Some((A::from_noun(head)?, b, c))
    }
}

impl<A: NounDecode, B: NounDecode, C: NounDecode, D: NounDecode> NounDecode for (A, B, C, D) {
    fn from_noun(noun: &Noun) -> Option<Self> {
        let (head, tail) = noun.as_cell()?;
        let (b, c, d) = <(B, C, D)>::from_noun(tail)?;
        Some((A::from_noun(head)?, b, c, d))
    }
}

impl<T: NounEncode> NounEncode for &[T] {
    fn to_noun(&self) -> Noun {
        match self.split_last() {
            None => atom(0),
            Some((last, rest)) => {
                let mut acc = last.to_noun();
                for item in rest.iter().rev() {
                    acc = cell(item.to_noun(), acc);
                }
                acc
            }
        }
    }
}

impl<T: NounEncode> NounEncode for Vec<T> {
    fn to_noun(&self) -> Noun {
        let mut acc = atom(0);
        for item in self.iter().rev() {
            acc = cell(item.to_noun(), acc);
        }
        acc
    }
}

impl<T: NounDecode> NounDecode for Vec<T> {
    fn from_noun(noun: &Noun) -> Option<Self> {
        let mut items = Vec::new();
        let mut rest = noun;
        loop {
            match rest {
                n if n.is_zero() => return Some(items),
                Noun::Cell(head, tail) => {
                    items.push(T::from_noun(head)?);
                    rest = tail.as_ref();
                }
                Noun::Atom(_) => return None,
            }
        }
    }
}

impl NounEncode for &str {
    fn to_noun(&self) -> Noun {
        Noun::from_le_bytes(self.as_bytes())
    }
}

impl NounEncode for String {
    fn to_noun(&self) -> Noun {
        self.as_str().to_noun()
    }
}

impl NounDecode for String {
    fn from_noun(noun: &Noun) -> Option<Self> {
        String::from_utf8(noun.as_atom()?.to_le_bytes()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::{format, vec};

    #[test]
    fn test_atom_normalisation() {
        assert_eq!(Noun::from_le_bytes(&[1, 0, 0]), atom(1));
        assert_eq!(Noun::from_le_bytes(&[]), atom(0));
    }

    #[test]
    fn test_display() {
        let noun = cell(atom(1), cell(atom(2), atom(3)));
        assert_eq!(format!("{}", noun), "[1 [2 3]]");
    }

    #[test]
    fn test_inspectors() {
        let pair = cell(atom(7), atom(0));
        assert!(pair.is_cell() && !pair.is_atom() && !pair.is_zero());
        let (head, tail) = pair.as_cell().unwrap();
        assert_eq!(head, &atom(7));
        assert!(tail.is_zero());
        assert_eq!(atom(7).as_atom(), Some(&UBig::from(7u64)));
    }

    #[test]
    fn test_int_round_trip() {
        assert_eq!(u64::from_noun(&42u64.to_noun()), Some(42));
        assert_eq!(u32::from_noun(&7u32.to_noun()), Some(7));
        assert_eq!(i64::from_noun(&(-3i64).to_noun()), Some(-3));
        assert_eq!(i32::from_noun(&(-1i32).to_noun()), Some(-1));
        // An atom too wide for the target fails instead of wrapping.
        assert_eq!(u32::from_noun(&atom(u64::MAX)), None);
        assert_eq!(u64::from_noun(&cell(atom(0), atom(0))), None);
    }

    #[test]
    fn test_bool_is_loobean() {
        assert_eq!(true.to_noun(), atom(0));
        assert_eq!(false.to_noun(), atom(1));
        assert_eq!(bool::from_noun(&atom(0)), Some(true));
        assert_eq!(bool::from_noun(&atom(2)), None);
    }

    #[test]
    fn test_option_round_trip() {
        let nothing: Option<u64> = None;
        assert_eq!(Option::<u64>::from_noun(&nothing.to_noun()), Some(None));
        assert_eq!(Option::<u64>::from_noun(&Some(9u64).to_noun()), Some(Some(9)));
    }

    #[test]
    fn test_list_round_trip() {
        let items = vec![3u64, 1, 4, 1, 5];
        assert_eq!(Vec::<u64>::from_noun(&items.to_noun()), Some(items));
        let empty: Vec<u64> = vec![];
        assert_eq!(Vec::<u64>::from_noun(&empty.to_noun()), Some(empty));
        // A bare non-zero atom is not a list.
        assert_eq!(Vec::<u64>::from_noun(&atom(1)), None);
    }

    #[test]
    fn test_slice_is_unterminated_tuple() {
        let noun = [1u64, 2, 3].as_slice().to_noun();
        assert_eq!(noun, cell(atom(1), cell(atom(2), atom(3))));
    }

    #[test]
    fn test_tuple_round_trip() {
        let triple = (1u64, 2u64, 3u64);
        assert_eq!(<(u64, u64, u64)>::from_noun(&triple.to_noun()), Some(triple));
        let quad = (1u64, 2u64, 3u64, 4u64);
        assert_eq!(
            <(u64, u64, u64, u64)>::from_noun(&quad.to_noun()),
            Some(quad)
        );
    }

    #[test]
    fn test_string_round_trip() {
        // Longer than eight bytes, so the value spans multiple words.
        let memo = "a noun is an atom or a cell".to_string();
        assert_eq!(String::from_noun(&memo.to_noun()), Some(memo));
        assert_eq!(String::from_noun(&"".to_noun()), Some("".to_string()));
    }
}
