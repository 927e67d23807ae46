use std::future::Future;

/// Transport or service failure from the generation collaborator.
/// Retry-eligible; the store decides when to give up.
#[derive(Debug, thiserror::Error)]
#[error("generation service error: {0}")]
pub struct GenerateError(pub String);

impl GenerateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The contract with the language-generation collaborator: one prompt in,
/// free text out. Implementations wrap whatever transport a deployment
/// uses; the store only ever sees this seam, which is also what makes the
/// transitions testable against a scripted stub.
pub trait TextGenerator {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerateError>> + Send;
}
