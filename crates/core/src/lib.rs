//! tripstack_core - resource declarations for the trips stack.
//!
//! Everything in this crate is a Functional Core: constructs are pure data,
//! synthesis is a pure function from a [`Stack`] to a [`Template`]. Reading
//! asset directories and writing templates to disk lives in the CLI crate.

pub mod apigateway;
pub mod assets;
pub mod construct;
pub mod dynamodb;
pub mod error;
pub mod iam;
pub mod intrinsics;
pub mod lambda;
pub mod plan;
pub mod stack;
pub mod template;
pub mod trips;

pub use error::{ConstructError, Result};
pub use stack::Stack;
pub use template::Template;
pub use trips::{trips_stack, TripsStackProps};
