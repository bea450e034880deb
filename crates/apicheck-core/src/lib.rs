#![forbid(unsafe_code)]
//! Structural API-equivalence checking.
//!
//! A *candidate* type is compared against a *reference* type that describes the expected
//! public contract. Reference-side names carry a naming-convention marker (`AGAPIFoo` for
//! `Foo`) which the [`NameResolver`] maps back to candidate names, so signatures can be
//! compared as canonical strings.
//!
//! ```text
//! IntrospectionProvider ──> TypeDescriptor ──> facets (render + SetDiff) ──> TypeReport
//!                                    ^                      │
//!                                    └── nested types, with an extended NameResolver
//! ```

mod checker;
mod diff;
mod error;
mod facets;
mod model;
mod probe;
mod provider;
mod render;
mod report;
mod resolver;

pub use checker::{reference_name_for, ApiChecker, CheckSettings, DEFAULT_REFERENCE_MARKER};
pub use diff::SetDiff;
pub use error::{CheckError, LoadError, ModelError, ResolverError};
pub use model::{
    ConstructorDescriptor, FieldDescriptor, MethodDescriptor, Modifiers, NestedKind,
    NestedTypeDescriptor, TypeDescriptor, TypeParameter, TypeReference, WildcardBound,
};
pub use probe::{has_constructor, has_method};
pub use provider::{InMemoryProvider, IntrospectionProvider};
pub use render::{Renderer, Side};
pub use report::{BatchReport, DiffBlock, Facet, FacetReport, PairOutcome, TypeReport};
pub use resolver::NameResolver;
