//! Type mapping shared by schema and query analysis

mod mapper;
mod oid;
mod runtime_support;

pub use mapper::{
    normalize_native_type, validate_identifier_column, InvalidIdentifier, TypeMapper,
    TypeOverride, UnsupportedType, IDENTIFIER_NATIVE_TYPE,
};
pub use oid::{canonical_type_for_oid, native_type, NativeType, OidType};
pub use runtime_support::{
    required_runtime_support, required_runtime_support_for_types, RuntimeSupport,
};
