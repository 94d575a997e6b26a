//! Counting gate used as the start and stop barriers of a stage

use std::sync::Arc;

use tokio::sync::Semaphore;

/// A counting gate that hands out single-use tokens
///
/// The orchestrator releases one token per worker; each worker takes exactly
/// one. Released tokens stay buffered until taken, so a worker that reaches
/// the gate late never misses its signal.
#[derive(Debug, Clone)]
pub struct Gate {
    tokens: Arc<Semaphore>,
}

impl Gate {
    /// Create a closed gate with no tokens
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(Semaphore::new(0)),
        }
    }

    /// Release `n` tokens at once
    pub fn release(&self, n: usize) {
        self.tokens.add_permits(n);
    }

    /// Wait for a token and consume it
    pub async fn pass(&self) {
        // The semaphore is never closed, so acquire only returns once a
        // token is available.
        if let Ok(permit) = self.tokens.acquire().await {
            permit.forget();
        }
    }

    /// Consume a token if one is available, without waiting
    pub fn try_pass(&self) -> bool {
        match self.tokens.try_acquire() {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Tokens released but not yet taken
    pub fn pending(&self) -> usize {
        self.tokens.available_permits()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_try_pass_consumes_one_token() {
        let gate = Gate::new();
        assert!(!gate.try_pass());

        gate.release(2);
        assert_eq!(gate.pending(), 2);
        assert!(gate.try_pass());
        assert!(gate.try_pass());
        assert!(!gate.try_pass());
    }

    #[tokio::test]
    async fn test_pass_waits_for_release() {
        let gate = Gate::new();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.pass().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gate.release(1);
        waiter.await.unwrap();
        assert_eq!(gate.pending(), 0);
    }

    #[tokio::test]
    async fn test_tokens_released_before_waiting_are_kept() {
        let gate = Gate::new();
        gate.release(3);

        for _ in 0..3 {
            gate.pass().await;
        }
        assert_eq!(gate.pending(), 0);
    }

    #[tokio::test]
    async fn test_tokens_are_shared_between_clones() {
        let gate = Gate::new();
        let other = gate.clone();

        other.release(1);
        assert_eq!(gate.pending(), 1);
        assert!(gate.try_pass());
        assert!(!other.try_pass());
    }
}
