pub mod embedding;
pub mod generation;
pub mod openai;
pub mod provider;
pub mod translate;
pub mod types;

pub use embedding::{EmbeddingClient, EMBEDDING_DIM};
pub use generation::GenerationClient;
pub use openai::OpenAiProvider;
pub use provider::ChatProvider;
pub use translate::Translator;
