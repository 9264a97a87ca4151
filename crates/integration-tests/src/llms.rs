mod openai;

pub use openai::{OpenAIMock, OpenAIServer, RecordedRequest};
