#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod display;
pub mod dump;
pub mod ir;
pub mod layout;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use display::{DisplayResolver, NodeDisplay, ScriptDisplayResolver, SourceContext};
pub use ir::{NodeKind, ScriptNode};
pub use layout::{Diagram, DiagramEdge, DiagramNode, compute_diagram};
pub use theme::Theme;
