//! structural resolution of polymorphic JSON values.
//!
//! report definitions contain unions with no discriminator property: a value
//! may be one of several object shapes, a scalar, or a list of either. This
//! module decides which one a value is by looking at it:
//!
//! - `null` stays null
//! - scalars coerce to their nearest native type (dates included)
//! - arrays take their element type from the first element
//! - objects go to the shape whose declared fields overlap best
//!
//! [`AnyOf2`] and [`AnyOf3`] plug this into serde, [`optional`] lets an
//! optional union degrade to `None`, and [`populate`] degrades a null document
//! to its default.

mod any_of;
mod error;
mod resolver;
mod scalar;
mod shape;

pub use any_of::{optional, populate, AnyOf2, AnyOf3};
pub use error::{ResolveError, ResolveResult};
pub use resolver::{Resolved, Resolver, ShapeScore};
pub use scalar::{Scalar, ScalarKind};
pub use shape::{Candidate, FieldDef, FieldKind, Resolvable, ShapeDef};
