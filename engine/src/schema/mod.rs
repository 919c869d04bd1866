//! Schema derivation.
//!
//! Turns a record type's [`Shape`] into a serializable [`ObjectDescriptor`].
//! Derivation is pure: every call walks the shape again and returns a fresh
//! value, so two calls for the same type always agree, field order included.

use crate::error::{SchemaError, SchemaResult};
use crate::models::{FieldDescriptor, ObjectDescriptor, TypeDescriptor};
use crate::reflect::{RecordShape, Reflect, Shape};

/// Derive the schema of a record type.
///
/// `T` may also be a pointer-like wrapper (`Box`, `Arc`, `Rc`, `Option`) of a
/// record. Anything else is [`SchemaError::NotAStructuredType`].
pub fn derive_schema<T: Reflect>() -> SchemaResult<ObjectDescriptor> {
    match unwrap_pointers(T::shape()) {
        Shape::Record(record) => Ok(object_descriptor(&record)),
        _ => Err(SchemaError::NotAStructuredType(
            std::any::type_name::<T>().to_string(),
        )),
    }
}

/// Describe any reflectable type, record or not.
pub fn describe_type<T: Reflect>() -> TypeDescriptor {
    type_descriptor(T::shape())
}

/// Abstract type of a shape. Pointer-like wrappers are transparent.
pub fn type_descriptor(shape: Shape) -> TypeDescriptor {
    match unwrap_pointers(shape) {
        Shape::Primitive { kind, .. } => TypeDescriptor::Primitive(kind),
        Shape::Array(element) => TypeDescriptor::Array(Box::new(type_descriptor(*element))),
        Shape::Record(record) => TypeDescriptor::Object(object_descriptor(&record)),
        // unwrap_pointers never returns a pointer
        Shape::Pointer(inner) => type_descriptor(*inner),
    }
}

fn unwrap_pointers(mut shape: Shape) -> Shape {
    while let Shape::Pointer(inner) = shape {
        shape = *inner;
    }
    shape
}

fn object_descriptor(record: &RecordShape) -> ObjectDescriptor {
    let fields = record
        .fields()
        .into_iter()
        .map(|field| FieldDescriptor {
            name: field.name.to_string(),
            description: format!("{} {}", record.name, field.name),
            ty: type_descriptor(field.shape),
        })
        .collect();

    ObjectDescriptor {
        name: record.name.to_string(),
        description: format!("{} Schema", record.name),
        fields,
    }
}
