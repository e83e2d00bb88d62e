//! Text generation backends.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use triage_core::NarrativeError;

/// Default per-request time budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Generation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

impl From<GenerationError> for NarrativeError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::Timeout(d) => NarrativeError::Timeout(d),
            GenerationError::Backend(msg) => NarrativeError::Generation(msg),
        }
    }
}

/// Per-request settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub model: String,
    pub system_instruction: Option<String>,
    /// JSON schema the response must follow, if structured output is wanted
    pub response_schema: Option<String>,
    pub timeout: Duration,
}

impl GenerationOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            response_schema: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.response_schema = Some(schema.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A model that turns a prompt into text.
///
/// Implementations give up with [`GenerationError::Timeout`] once a request
/// runs past `options.timeout`.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult<String>;
}

/// Generator replaying canned responses in order (for testing).
///
/// Records every prompt it receives. Once the script runs out, each call
/// fails with a backend error. A simulated latency longer than the request's
/// timeout fails the call without consuming the script.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<GenerationResult<String>>>,
    prompts: Mutex<Vec<(String, GenerationOptions)>>,
    latency: Duration,
}

impl ScriptedGenerator {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = GenerationResult<String>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    /// Pretend every call takes `latency` to answer.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Generator answering every call with the same text.
    pub fn always(text: impl Into<String>, times: usize) -> Self {
        let text = text.into();
        Self::new((0..times).map(|_| Ok(text.clone())))
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<(String, GenerationOptions)> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((prompt.to_string(), options.clone()));
        }
        if self.latency > options.timeout {
            return Err(GenerationError::Timeout(options.timeout));
        }
        self.responses
            .lock()
            .map_err(|e| GenerationError::Backend(format!("Lock poisoned: {}", e)))?
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Backend("script exhausted".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replays_in_order() {
        let generator = ScriptedGenerator::new(vec![
            Ok("first".to_string()),
            Err(GenerationError::Timeout(Duration::from_secs(1))),
        ]);
        let options = GenerationOptions::new("test-model");

        assert_eq!(generator.generate("a", &options).unwrap(), "first");
        assert_eq!(
            generator.generate("b", &options),
            Err(GenerationError::Timeout(Duration::from_secs(1)))
        );
        assert!(generator.generate("c", &options).is_err());
        assert_eq!(generator.call_count(), 3);
        assert_eq!(generator.prompts()[1].0, "b");
    }

    #[test]
    fn test_options_builder() {
        let options = GenerationOptions::new("m")
            .with_system("sys")
            .with_schema("{}");
        assert_eq!(options.system_instruction.as_deref(), Some("sys"));
        assert_eq!(options.response_schema.as_deref(), Some("{}"));
        assert_eq!(options.timeout, DEFAULT_TIMEOUT);
        let options = options.with_timeout(Duration::from_secs(2));
        assert_eq!(options.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_latency_past_timeout() {
        let generator =
            ScriptedGenerator::always("late", 1).with_latency(Duration::from_secs(10));
        let options = GenerationOptions::new("m").with_timeout(Duration::from_secs(5));

        assert_eq!(
            generator.generate("a", &options),
            Err(GenerationError::Timeout(Duration::from_secs(5)))
        );

        // Within budget the script still answers
        let relaxed = GenerationOptions::new("m").with_timeout(Duration::from_secs(10));
        assert_eq!(generator.generate("b", &relaxed).unwrap(), "late");
        assert_eq!(generator.call_count(), 2);
    }

    #[test]
    fn test_error_conversion() {
        let timeout: NarrativeError = GenerationError::Timeout(Duration::from_secs(5)).into();
        assert_eq!(timeout, NarrativeError::Timeout(Duration::from_secs(5)));

        let backend: NarrativeError = GenerationError::Backend("quota".into()).into();
        assert!(matches!(backend, NarrativeError::Generation(_)));
    }
}
