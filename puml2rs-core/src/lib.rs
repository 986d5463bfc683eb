//! Diagram pipeline for puml2rs.
//!
//! Text goes in, a validated hierarchical state-machine model comes out:
//! [`reader::Source`] splits and cleans the lines, [`parser::parse`] runs
//! the three parsing passes plus semantic validation, and the resulting
//! [`model::Diagram`] is the frozen representation the code generator
//! queries.

pub mod error;
pub mod model;
pub mod parser;
pub mod reader;
pub mod validate;

pub use error::{DiagramError, Location};
pub use model::{Action, Diagram, Event, Guard, State, StateId, Transition, TransitionKind};
pub use parser::parse;
pub use reader::{Line, Source};
