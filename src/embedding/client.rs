// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrying embedding client.
//!
//! Wraps an [`EmbeddingProvider`] with a bounded, fixed-delay retry loop and
//! returns normalized [`Embedding`]s. Invalid vectors (empty, NaN, zero
//! norm) count as failed attempts just like transport errors.

use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::provider::EmbeddingProvider;
use super::vector::Embedding;
use crate::errors::PipelineError;

/// Default number of attempts per text.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fixed-delay retry policy. No exponential backoff, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_retries: usize,
    /// Sleep between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    fn attempts(&self) -> usize {
        self.max_retries.max(1)
    }
}

/// Embedding client with retry and normalization.
pub struct EmbeddingClient<P> {
    provider: P,
    policy: RetryPolicy,
}

impl<P: EmbeddingProvider> EmbeddingClient<P> {
    pub fn new(provider: P, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Embeds `text`, retrying up to the policy's attempt budget.
    pub fn embed(&mut self, text: &str) -> Result<Embedding, PipelineError> {
        let attempts = self.policy.attempts();
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=attempts {
            match self.provider.embed_raw(text) {
                Ok(raw) if !raw.is_valid => {
                    last_error = "service returned an empty or non-finite vector".to_string();
                }
                Ok(raw) => match Embedding::from_raw(raw.vector) {
                    Some(embedding) => {
                        if attempt > 1 {
                            debug!("embedding succeeded on attempt {}/{}", attempt, attempts);
                        }
                        return Ok(embedding);
                    }
                    None => last_error = "service returned a zero-norm vector".to_string(),
                },
                Err(err) => last_error = format!("{:#}", err),
            }

            warn!(
                "embedding attempt {}/{} failed: {}",
                attempt, attempts, last_error
            );
            if attempt < attempts && !self.policy.delay.is_zero() {
                thread::sleep(self.policy.delay);
            }
        }

        Err(PipelineError::EmbeddingUnavailable {
            attempts,
            last_error,
        })
    }
}
