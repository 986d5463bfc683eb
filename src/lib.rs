//! # puml2rs
//!
//! Compiles PlantUML state diagrams into standalone, dependency-free Rust
//! state machines: composite states, entry/exit hooks, guarded and internal
//! transitions, with the full hierarchical dispatch algorithm baked into
//! static tables in the generated file.
//!
//! ## Example
//!
//! ```rust
//! use puml2rs::{GenOptions, Source, generate, parse};
//!
//! let diagram = parse(&Source::from_text(
//!     "blink.puml",
//!     "[*] --> Off
//! state Off
//! state On
//! Off --> On : Toggle / turn_on()
//! On --> Off : Toggle / turn_off()
//! ",
//! ))
//! .unwrap();
//!
//! let code = generate(
//!     &diagram,
//!     &GenOptions {
//!         machine_name: "Blink".to_string(),
//!         module: None,
//!     },
//! )
//! .unwrap();
//!
//! assert!(code.contains("pub struct Blink"));
//! assert!(code.contains("fn turn_on(&mut self);"));
//! ```

pub use puml2rs_codegen::{CodegenError, FsmIr, GenOptions, generate};
pub use puml2rs_core::{Diagram, DiagramError, Location, Source, parse};
