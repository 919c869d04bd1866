//! Compile-time type introspection.
//!
//! Every type that can appear as a record field implements [`Reflect`], which
//! answers two questions:
//!
//! - what does it look like? ([`Shape`], used by schema derivation)
//! - how is it written from a row? ([`Binder`], used by the coercion cache)
//!
//! Record types implement [`Record`] through the [`impl_record!`](crate::impl_record)
//! macro, which lists their fields in declaration order. A field whose type has
//! no `Reflect` impl does not compile.
//!
//! ```rust,ignore
//! #[derive(Debug, Default)]
//! struct Subs {
//!     website: String,
//! }
//!
//! rowmap::impl_record!(Subs { website => "Website" });
//! ```

mod impls;

use std::sync::Arc;

use crate::cache::{BranchFn, CheckFn, CoercionCache, Coercer, LeafFn, PrepareFn};
use crate::error::{CoercionResult, MappingError, MappingResult};
use crate::mapping::{Branch, Leaf, MappingNode, ParseOptions};
use crate::models::PrimitiveKind;
use crate::resolver;

/// Parses one token into a field value: `(field name, token, options)`.
pub type ScalarFn<T> = fn(&str, &str, Option<&ParseOptions>) -> CoercionResult<T>;

/// Fills a nested record from a row and the branch's children.
pub type NestedFillFn<T> =
    fn(&CoercionCache, &[String], &[MappingNode], &mut T) -> MappingResult<()>;

/// Structural shape of a type.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Scalar with its primitive kind and native Rust type name
    Primitive {
        kind: PrimitiveKind,
        native: &'static str,
    },
    /// Sequence of elements
    Array(Box<Shape>),
    /// Pointer-like wrapper (`Box`, `Arc`, `Rc`, `Option`)
    Pointer(Box<Shape>),
    /// Nested record
    Record(RecordShape),
}

/// Lazily expanded record shape. Fields are produced on demand so that
/// building a shape never recurses.
#[derive(Debug, Clone, Copy)]
pub struct RecordShape {
    pub name: &'static str,
    fields: fn() -> Vec<FieldShape>,
}

/// Name and shape of one record field.
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub name: &'static str,
    pub shape: Shape,
}

impl Shape {
    pub fn primitive(kind: PrimitiveKind, native: &'static str) -> Self {
        Shape::Primitive { kind, native }
    }

    /// Human-readable kind, used in build-time errors.
    pub fn describe(&self) -> String {
        match self {
            Shape::Primitive { native, .. } => native.to_string(),
            Shape::Array(element) => format!("array of {}", element.describe()),
            Shape::Pointer(inner) => format!("pointer to {}", inner.describe()),
            Shape::Record(record) => record.name.to_string(),
        }
    }
}

impl RecordShape {
    pub fn of<R: Record>() -> Self {
        Self {
            name: R::NAME,
            fields: field_shapes::<R>,
        }
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> Vec<FieldShape> {
        (self.fields)()
    }
}

fn field_shapes<R: Record>() -> Vec<FieldShape> {
    R::fields()
        .into_iter()
        .map(|field| FieldShape {
            name: field.name,
            shape: field.shape,
        })
        .collect()
}

/// How values of a type are written from a row.
pub enum Binder<T> {
    /// Parsed from a single token
    Scalar(ScalarFn<T>),
    /// Filled recursively from a branch
    Nested(NestedBinder<T>),
    /// No coercion strategy
    Unsupported,
}

/// Entry points of the resolver for one nested record type.
pub struct NestedBinder<T> {
    pub(crate) fill: NestedFillFn<T>,
    pub(crate) check: CheckFn,
    pub(crate) prepare: PrepareFn,
}

impl<T: Record> Binder<T> {
    /// Binder for a record type.
    pub fn nested() -> Self {
        Binder::Nested(NestedBinder {
            fill: resolver::fill_nested::<T>,
            check: resolver::check_nested::<T>,
            prepare: resolver::prepare_nested::<T>,
        })
    }
}

/// A type that can describe itself.
pub trait Reflect: Sized + 'static {
    fn shape() -> Shape;

    fn binder() -> Binder<Self> {
        Binder::Unsupported
    }
}

/// A structured record type with a fixed, named, ordered field set.
///
/// Implement with [`impl_record!`](crate::impl_record).
pub trait Record: Reflect + Default {
    /// Type name used in schemas and errors.
    const NAME: &'static str;

    /// Fields in declaration order.
    fn fields() -> Vec<Field<Self>>;
}

/// One field of record `R`: its name, shape and coercion function.
pub struct Field<R> {
    pub name: &'static str,
    pub shape: Shape,
    pub(crate) coercer: Option<Coercer<R>>,
}

impl<R: 'static> Field<R> {
    /// Describe a field through an accessor into the record.
    pub fn new<T, A>(name: &'static str, access: A) -> Self
    where
        T: Reflect,
        A: Fn(&mut R) -> &mut T + Copy + Send + Sync + 'static,
    {
        let coercer = match T::binder() {
            Binder::Scalar(parse) => {
                let write: LeafFn<R> = Arc::new(
                    move |row: &[String], target: &mut R, leaf: &Leaf| -> MappingResult<()> {
                        let token = row.get(leaf.column).ok_or(MappingError::RowTooShort {
                            index: leaf.column,
                            len: row.len(),
                        })?;
                        *access(target) = parse(name, token, leaf.options())?;
                        Ok(())
                    },
                );
                Some(Coercer::Scalar(write))
            }
            Binder::Nested(nested) => {
                let fill = nested.fill;
                let write: BranchFn<R> = Arc::new(
                    move |cache: &CoercionCache,
                          row: &[String],
                          target: &mut R,
                          branch: &Branch|
                          -> MappingResult<()> {
                        fill(cache, row, &branch.children, access(target))
                    },
                );
                Some(Coercer::Nested {
                    write,
                    check: nested.check,
                    prepare: nested.prepare,
                })
            }
            Binder::Unsupported => None,
        };

        Self {
            name,
            shape: T::shape(),
            coercer,
        }
    }
}

/// Register a struct as a [`Record`].
///
/// Fields are listed in declaration order. Each field is exposed under its
/// identifier, or under the literal given after `=>`.
///
/// ```rust,ignore
/// impl_record!(Customer {
///     name => "Name",
///     id => "Id",
///     sub => "Sub",
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    (@name $field:ident) => {
        stringify!($field)
    };
    (@name $field:ident $rename:literal) => {
        $rename
    };
    ($ty:ident { $($field:ident $(=> $rename:literal)?),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn shape() -> $crate::reflect::Shape {
                $crate::reflect::Shape::Record($crate::reflect::RecordShape::of::<$ty>())
            }

            fn binder() -> $crate::reflect::Binder<Self> {
                $crate::reflect::Binder::nested()
            }
        }

        impl $crate::reflect::Record for $ty {
            const NAME: &'static str = stringify!($ty);

            fn fields() -> ::std::vec::Vec<$crate::reflect::Field<Self>> {
                ::std::vec![
                    $(
                        $crate::reflect::Field::new(
                            $crate::impl_record!(@name $field $($rename)?),
                            |record: &mut $ty| &mut record.$field,
                        )
                    ),*
                ]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, Default)]
    struct Line {
        sku: String,
        qty: u32,
    }

    crate::impl_record!(Line { sku, qty => "Quantity" });

    #[derive(Debug, Default)]
    struct Order {
        placed: Option<NaiveDate>,
        lines: Vec<Line>,
        parent: Option<Box<Line>>,
    }

    crate::impl_record!(Order {
        placed,
        lines,
        parent
    });

    #[test]
    fn test_field_names_follow_declaration() {
        let names: Vec<_> = Line::fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["sku", "Quantity"]);
        assert_eq!(Line::NAME, "Line");
    }

    #[test]
    fn test_shapes() {
        let fields = Order::fields();
        assert_eq!(fields[0].shape.describe(), "pointer to NaiveDate");
        assert_eq!(fields[1].shape.describe(), "array of Line");
        assert_eq!(fields[2].shape.describe(), "pointer to pointer to Line");
        assert!(matches!(Line::shape(), Shape::Record(r) if r.name == "Line"));
    }

    #[test]
    fn test_coercers_only_for_supported_shapes() {
        assert!(Line::fields().iter().all(|f| f.coercer.is_some()));
        assert!(Order::fields().iter().all(|f| f.coercer.is_none()));
    }

    #[test]
    fn test_record_shape_expands_lazily() {
        let Shape::Record(record) = Line::shape() else {
            panic!("expected record shape");
        };
        let fields = record.fields();
        assert_eq!(fields.len(), 2);
        assert!(matches!(
            fields[1].shape,
            Shape::Primitive { kind: PrimitiveKind::Integer, native: "u32" }
        ));
    }
}
