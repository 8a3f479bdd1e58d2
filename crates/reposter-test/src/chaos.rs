//! Chaos delivery for relay testing
//!
//! Simulates hostile destinations:
//! - Sinks that always reject (kicked bot, deleted chat)
//! - Random rejection at a configured rate

use std::collections::HashSet;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use reposter_core::{Identity, InboundEvent, Reaction, ReposterError, ReposterResult};
use reposter_transport::{EventSink, Outbound, Responder};

/// Delivery chaos configuration
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    /// Sinks whose every delivery fails
    pub dead_sinks: HashSet<Identity>,
    /// Probability (0.0 - 1.0) that any other delivery fails
    pub failure_rate: f64,
    /// Fail replies and reactions too
    pub fail_responses: bool,
    pub seed: u64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            dead_sinks: HashSet::new(),
            failure_rate: 0.0,
            fail_responses: false,
            seed: 0x5eed,
        }
    }
}

impl ChaosConfig {
    /// Every delivery succeeds
    pub fn reliable() -> Self {
        ChaosConfig::default()
    }

    /// Listed sinks always fail, others succeed
    pub fn dead(sinks: impl IntoIterator<Item = Identity>) -> Self {
        ChaosConfig {
            dead_sinks: sinks.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Random failures at `rate`
    pub fn flaky(rate: f64, seed: u64) -> Self {
        ChaosConfig {
            failure_rate: rate.clamp(0.0, 1.0),
            seed,
            ..Default::default()
        }
    }
}

/// One delivery attempt as seen by the transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub sink: Identity,
    pub origin: Identity,
    pub items: usize,
    pub delivered: bool,
}

/// Transport that records everything and fails on demand
#[derive(Debug)]
pub struct ChaosTransport {
    config: ChaosConfig,
    rng: Mutex<StdRng>,
    attempts: Mutex<Vec<Attempt>>,
    responses: Mutex<Vec<Outbound>>,
}

impl ChaosTransport {
    pub fn new(config: ChaosConfig) -> Self {
        ChaosTransport {
            rng: Mutex::new(StdRng::seed_from_u64(config.seed)),
            config,
            attempts: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
        }
    }

    pub fn reliable() -> Self {
        Self::new(ChaosConfig::reliable())
    }

    fn should_fail(&self, sink: Identity) -> bool {
        if self.config.dead_sinks.contains(&sink) {
            return true;
        }
        self.config.failure_rate > 0.0 && self.rng.lock().gen_bool(self.config.failure_rate)
    }

    /// Every delivery attempt so far
    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().clone()
    }

    /// Sinks that actually received something
    pub fn delivered_to(&self) -> Vec<Identity> {
        self.attempts
            .lock()
            .iter()
            .filter(|a| a.delivered)
            .map(|a| a.sink)
            .collect()
    }

    /// Replies and reactions that went out
    pub fn responses(&self) -> Vec<Outbound> {
        self.responses.lock().clone()
    }

    fn respond(&self, action: Outbound) -> ReposterResult<()> {
        if self.config.fail_responses {
            return Err(ReposterError::TransportError("chat unavailable".to_string()));
        }
        self.responses.lock().push(action);
        Ok(())
    }
}

impl EventSink for ChaosTransport {
    async fn deliver(&self, sink: Identity, event: &InboundEvent) -> ReposterResult<()> {
        let fail = self.should_fail(sink);
        self.attempts.lock().push(Attempt {
            sink,
            origin: event.origin,
            items: event.body.len(),
            delivered: !fail,
        });
        if fail {
            return Err(ReposterError::DeliveryFailed {
                sink,
                reason: "chaos: destination rejected".to_string(),
            });
        }
        Ok(())
    }
}

impl Responder for ChaosTransport {
    async fn reply(&self, to: &InboundEvent, text: &str) -> ReposterResult<()> {
        self.respond(Outbound::reply(to, text))
    }

    async fn react(&self, to: &InboundEvent, reaction: Reaction) -> ReposterResult<()> {
        self.respond(Outbound::react(to, reaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposter_core::Payload;

    #[tokio::test]
    async fn test_dead_sink_always_fails() {
        let transport = ChaosTransport::new(ChaosConfig::dead([Identity(1)]));
        let post = InboundEvent::channel_post(Identity(9), Payload::text(1, "x"));
        for _ in 0..5 {
            assert!(transport.deliver(Identity(1), &post).await.is_err());
            assert!(transport.deliver(Identity(2), &post).await.is_ok());
        }
        assert_eq!(transport.delivered_to(), vec![Identity(2); 5]);
    }

    #[tokio::test]
    async fn test_flaky_rate_is_seeded() {
        let post = InboundEvent::channel_post(Identity(9), Payload::text(1, "x"));
        let run = || async {
            let transport = ChaosTransport::new(ChaosConfig::flaky(0.5, 42));
            for i in 0..32 {
                let _ = transport.deliver(Identity(i), &post).await;
            }
            transport.delivered_to()
        };
        assert_eq!(run().await, run().await);
    }
}
