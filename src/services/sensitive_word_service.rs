use crate::api::{SearchBackend, SensitiveWords, WordCategory};
use crate::error::{ConsoleError, ConsoleResult, ValidationError};
use crate::logging::targets;
use std::rc::Rc;
use tracing::info;

/// Maintains the server-side dictionary the anonymizer redacts with
pub struct SensitiveWordService {
    backend: Rc<dyn SearchBackend>,
}

impl SensitiveWordService {
    pub fn new(backend: Rc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self) -> ConsoleResult<SensitiveWords> {
        self.backend
            .list_sensitive_words()
            .await
            .map_err(ConsoleError::Dictionary)
    }

    pub async fn add(&self, word: &str, category: WordCategory) -> ConsoleResult<()> {
        let word = normalize(word)?;
        self.backend
            .add_sensitive_word(word, category)
            .await
            .map_err(ConsoleError::Dictionary)?;
        info!(target: targets::ANONYMIZE, "Added {} to {}", word, category.label());
        Ok(())
    }

    pub async fn remove(&self, word: &str, category: WordCategory) -> ConsoleResult<()> {
        let word = normalize(word)?;
        self.backend
            .remove_sensitive_word(word, category)
            .await
            .map_err(ConsoleError::Dictionary)?;
        info!(target: targets::ANONYMIZE, "Removed {} from {}", word, category.label());
        Ok(())
    }
}

fn normalize(word: &str) -> Result<&str, ValidationError> {
    let word = word.trim();
    if word.is_empty() {
        Err(ValidationError::BlankSensitiveWord)
    } else {
        Ok(word)
    }
}
