//! The MCP tool/resource surface and conversion-pipeline orchestration
//! over the query engine (design §5's component C5): ties the
//! normalize/categorize/storage/query crates into one binary that
//! converts an OpenAPI/Swagger document and serves `searchEndpoints`,
//! `getSchema`, and `getExample` over stdio.

pub mod definition;
pub mod error;
pub mod examples;
pub mod handler;
pub mod logging;
pub mod pipeline;
pub mod resources;
pub mod settings;
pub mod state;
pub mod tools;

pub use error::ServerError;
pub use handler::SwaggerMcpServer;
pub use pipeline::{convert, ConversionSummary};
pub use settings::ServerSettings;
pub use state::ServerState;
