//! Upload a document, then ask for a summary, explanation, quiz, case study
//! or chart, each grounded in that document through retrieval.

pub mod error;
pub mod indexer;
pub mod llm;
pub mod models;
pub mod rag;
pub mod server;
pub mod session;
pub mod settings;
pub mod tasks;

pub use error::{Error, Result};
pub use settings::Settings;
pub use tasks::Assistant;
