#![forbid(unsafe_code)]
//! Minimal JVM class-file reader.
//!
//! Only the parts of the format that describe a type's declared API are decoded: the
//! constant pool, access flags, super/interface names, fields and methods, and the
//! `Signature`, `InnerClasses` and `Synthetic` attributes. Code and annotations are skipped.

pub mod access;
mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;
mod signature;

pub use crate::classfile::{ClassFile, ClassMember, InnerClassInfo};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSignature, FieldTypeSignature, MethodSignature, SimpleClassTypeSignature,
    TypeArgument, TypeParameter, TypeSignature,
};

/// Converts an internal name (`java/util/Map$Entry`) into a binary name (`java.util.Map$Entry`).
pub fn internal_name_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}
