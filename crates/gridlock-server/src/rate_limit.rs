use std::time::Instant;

/// Per-connection token bucket. Each incoming frame costs one token;
/// tokens refill continuously up to the burst cap.
pub struct RateLimiter {
    tokens: f64,
    max_tokens: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    /// Returns `true` if the frame is allowed, `false` if rate-limited.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_burst() {
        let mut limiter = RateLimiter::new(3.0, 0.0);
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
    }

    #[test]
    fn refills_over_time() {
        let mut limiter = RateLimiter::new(2.0, 1000.0);
        assert!(limiter.check());
        assert!(limiter.check());
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(limiter.check());
    }
}
