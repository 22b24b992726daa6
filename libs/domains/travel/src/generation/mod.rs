mod openai;
mod provider;

pub use openai::OpenAIChatProvider;
pub use provider::GenerationProvider;

#[cfg(test)]
pub use provider::MockGenerationProvider;
