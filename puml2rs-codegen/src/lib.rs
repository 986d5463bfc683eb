//! Rust code generation for puml2rs.
//!
//! [`ir::FsmIr`] lowers a validated [`puml2rs_core::Diagram`] into the
//! static dispatch tables of the generated machine; [`render::generate`]
//! turns those tables into the text of a standalone `.rs` file with no
//! dependencies of its own.

mod idents;
pub mod ir;
pub mod render;

pub use ir::FsmIr;
pub use render::generate;

/// Options controlling the shape of the generated artifact.
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Name of the generated machine type; also prefixes the actions trait.
    pub machine_name: String,
    /// Wrap the artifact in `pub mod <name>` when set.
    pub module: Option<String>,
}

/// Error raised while lowering or rendering a diagram.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("diagram has no top-level initial state; it was not validated")]
    MissingInitialState,

    #[error("`{0}` is not a valid Rust identifier")]
    InvalidIdentifier(String),

    #[error("generated code failed to parse: {0}")]
    Render(#[from] syn::Error),
}
