use std::fmt;

use phf::phf_map;

pub static PRIMITIVES: phf::Map<&'static str, Primitive> = phf_map! {
    "u64" => Primitive::U64,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    U64,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::U64 => "u64",
        }
    }
}

/// Structural type: equality is derived, so two types are equal iff their
/// tags and payloads (array lengths included) are equal all the way down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    Primitive(Primitive),
    Ptr(Box<Ty>),
    Array(Box<Ty>, usize),
}

impl Ty {
    pub const U64: Ty = Ty::Primitive(Primitive::U64);

    pub fn ptr(inner: Ty) -> Self {
        Ty::Ptr(Box::new(inner))
    }

    pub fn array(element: Ty, len: usize) -> Self {
        Ty::Array(Box::new(element), len)
    }

    pub fn sizeof(&self) -> usize {
        match self {
            Ty::Primitive(Primitive::U64) => 8,
            Ty::Ptr(_) => 8,
            Ty::Array(t, len) => t.sizeof() * len,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Ty::Ptr(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Ty::Array(_, _))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Primitive(p) => write!(f, "{}", p.name()),
            Ty::Ptr(t) => write!(f, "ptr {}", t),
            Ty::Array(t, len) => write!(f, "[{}] {}", len, t),
        }
    }
}
