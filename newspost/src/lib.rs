// Library interface for newspost modules
// This allows tests and the binaries to import modules

pub mod bootstrap;
pub mod error;
pub mod llm;
pub mod news;
pub mod orchestrator;
pub mod platforms;
pub mod server;
