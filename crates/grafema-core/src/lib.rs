pub mod config;
pub mod edge;
pub mod error;
pub mod hash;
pub mod ids;
pub mod node;
pub mod plugin;
pub mod scope;
pub mod shared;
pub mod traits;
pub mod types;

pub use config::EngineConfig;
pub use edge::GraphEdge;
pub use error::{CodeGraphError, Result};
pub use hash::HashUtils;
pub use ids::{CollisionResolver, IdGenerator, IdResolution, IdShape, PendingId, PendingSlot, SemanticId};
pub use node::{AttrValue, GraphNode, NodeFactory};
pub use plugin::{
    Creates, IssueReporter, Plugin, PluginContext, PluginMetadata, PluginPhase, PluginResult,
};
pub use scope::{ScopeContext, ScopeTracker};
pub use shared::SharedStr;
pub use traits::{FieldDeclaration, Graph, NodeFilter};
pub use types::{EdgeType, ImportKind, Language, Location, NodeKind, ResolutionStatus, ScopeKind, Span};
