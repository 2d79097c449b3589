pub mod assess;
pub mod core;
pub mod dataset;
pub mod export;
pub mod history;
pub mod llm;
pub mod retrieval;
pub mod server;
pub mod state;
