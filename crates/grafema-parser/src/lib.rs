pub mod collections;
pub mod context;
mod extractors;
pub mod file_collect;
pub mod graph_builder;
pub mod language;
pub mod parser;
pub mod pipeline;

pub use collections::ModuleCollections;
pub use context::BuilderContext;
pub use file_collect::{collect_source_files, collect_source_files_with_config, FileCollectionConfig};
pub use graph_builder::{BuiltModule, GraphBuilder};
pub use language::{LanguageConfig, LanguageRegistry};
pub use parser::{DirectoryParser, ParsingStatistics};
pub use pipeline::extract_module;
