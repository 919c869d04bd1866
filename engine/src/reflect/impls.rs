//! `Reflect` impls for standard and chrono types.

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{Binder, Reflect, Shape};
use crate::coerce;
use crate::models::PrimitiveKind;

macro_rules! reflect_scalar {
    ($kind:expr, $parse:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn shape() -> Shape {
                    Shape::primitive($kind, stringify!($ty))
                }

                fn binder() -> Binder<Self> {
                    Binder::Scalar(coerce::$parse::<$ty>)
                }
            }
        )+
    };
}

reflect_scalar!(PrimitiveKind::Integer, parse_integer =>
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
reflect_scalar!(PrimitiveKind::Decimal, parse_decimal => f32, f64);

impl Reflect for bool {
    fn shape() -> Shape {
        Shape::primitive(PrimitiveKind::Boolean, "bool")
    }

    fn binder() -> Binder<Self> {
        Binder::Scalar(coerce::parse_bool)
    }
}

impl Reflect for String {
    fn shape() -> Shape {
        Shape::primitive(PrimitiveKind::Text, "String")
    }

    fn binder() -> Binder<Self> {
        Binder::Scalar(coerce::parse_text)
    }
}

impl Reflect for NaiveDateTime {
    fn shape() -> Shape {
        Shape::primitive(PrimitiveKind::Timestamp, "NaiveDateTime")
    }

    fn binder() -> Binder<Self> {
        Binder::Scalar(coerce::parse_naive_datetime)
    }
}

impl Reflect for NaiveDate {
    fn shape() -> Shape {
        Shape::primitive(PrimitiveKind::Timestamp, "NaiveDate")
    }

    fn binder() -> Binder<Self> {
        Binder::Scalar(coerce::parse_naive_date)
    }
}

impl Reflect for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::primitive(PrimitiveKind::Timestamp, "DateTime<Utc>")
    }

    fn binder() -> Binder<Self> {
        Binder::Scalar(coerce::parse_utc_datetime)
    }
}

// Sequences describe as arrays; they have no coercion strategy.

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::Array(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn shape() -> Shape {
        Shape::Array(Box::new(T::shape()))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> Shape {
        Shape::Array(Box::new(T::shape()))
    }
}

// Pointer-like wrappers unwrap to their target when describing.

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for Rc<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_family_shares_kind() {
        for shape in [i8::shape(), u64::shape(), usize::shape()] {
            assert!(matches!(
                shape,
                Shape::Primitive { kind: PrimitiveKind::Integer, .. }
            ));
        }
        assert_eq!(i32::shape().describe(), "i32");
    }

    #[test]
    fn test_wrappers_describe_inner() {
        assert_eq!(Vec::<String>::shape().describe(), "array of String");
        assert_eq!(<[f64; 3]>::shape().describe(), "array of f64");
        assert_eq!(Arc::<bool>::shape().describe(), "pointer to bool");
        assert_eq!(
            Option::<Vec<DateTime<Utc>>>::shape().describe(),
            "pointer to array of DateTime<Utc>"
        );
    }

    #[test]
    fn test_binders() {
        assert!(matches!(String::binder(), Binder::Scalar(_)));
        assert!(matches!(NaiveDate::binder(), Binder::Scalar(_)));
        assert!(matches!(Vec::<i64>::binder(), Binder::Unsupported));
        assert!(matches!(Option::<i64>::binder(), Binder::Unsupported));
    }
}
