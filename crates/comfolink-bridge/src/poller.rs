//! Envelope-batched polling and point writes.
//!
//! Each poll reads every register class once over its address envelope,
//! split into protocol-sized requests, and decodes all points from the
//! returned block.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use comfolink_core::{
    decode, encode, raw_to_words, words_to_raw, AddressRange, PointDefinition, PointValue,
    RegisterClass, RegisterTransport, Registry,
};

use crate::error::{BridgeError, BridgeResult};

/// Maximum registers per read request.
pub const MAX_WORDS_PER_READ: u16 = 125;

/// Maximum coils or discrete inputs per read request.
pub const MAX_BITS_PER_READ: u16 = 2000;

/// Values decoded by one poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub values: BTreeMap<String, PointValue>,
    /// Points whose raw value could not be decoded
    pub errors: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&PointValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Split `range` into `(start, count)` requests of at most `max` items.
pub fn chunk_range(range: AddressRange, max: u16) -> Vec<(u16, u16)> {
    let mut chunks = Vec::new();
    let end = range.end as u32;
    let mut start = range.start as u32;
    while start <= end {
        let count = (end - start + 1).min(max as u32);
        chunks.push((start as u16, count as u16));
        start += count;
    }
    chunks
}

enum Block {
    Words(Vec<u16>),
    Bits(Vec<bool>),
}

pub struct Poller<'r, T> {
    registry: &'r Registry,
    transport: T,
}

impl<'r, T: RegisterTransport> Poller<'r, T> {
    pub fn new(registry: &'r Registry, transport: T) -> Self {
        Self {
            registry,
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    async fn read_block(
        &mut self,
        class: RegisterClass,
        envelope: AddressRange,
    ) -> BridgeResult<Block> {
        if class.is_bit() {
            let mut bits = Vec::new();
            for (start, count) in chunk_range(envelope, MAX_BITS_PER_READ) {
                bits.extend(self.transport.read_bits(class, start, count).await?);
            }
            Ok(Block::Bits(bits))
        } else {
            let mut words = Vec::new();
            for (start, count) in chunk_range(envelope, MAX_WORDS_PER_READ) {
                words.extend(self.transport.read_words(class, start, count).await?);
            }
            Ok(Block::Words(words))
        }
    }

    /// Read all envelopes and decode every point.
    ///
    /// Transport errors abort the poll; decode errors are collected per point.
    pub async fn poll_once(&mut self) -> BridgeResult<Snapshot> {
        let mut snapshot = Snapshot::default();
        let envelopes: Vec<_> = self.registry.envelopes().collect();

        for (class, envelope) in envelopes {
            let block = self.read_block(class, envelope).await?;
            for point in self.registry.points_in(class) {
                if self.registry.descriptor(&point.key).is_none() {
                    continue;
                }
                let offset = (point.address - envelope.start) as usize;
                let decoded = match &block {
                    Block::Bits(bits) => match bits.get(offset) {
                        Some(bit) => decode(point, *bit as i64),
                        None => continue,
                    },
                    Block::Words(words) => {
                        words_to_raw(point, words.get(offset..).unwrap_or_default())
                            .and_then(|raw| decode(point, raw))
                    }
                };
                match decoded {
                    Ok(value) => {
                        snapshot.values.insert(point.key.clone(), value);
                    }
                    Err(e) => {
                        warn!(key = %point.key, error = %e, "Failed to decode point");
                        snapshot.errors.insert(point.key.clone(), e.to_string());
                    }
                }
            }
        }

        debug!(
            values = snapshot.values.len(),
            errors = snapshot.errors.len(),
            "Poll complete"
        );
        Ok(snapshot)
    }

    fn writable_point(&self, key: &str) -> BridgeResult<&'r PointDefinition> {
        let point = self
            .registry
            .point(key)
            .ok_or_else(|| BridgeError::UnknownKey(key.to_string()))?;
        if point.is_readonly() {
            return Err(BridgeError::ReadOnly(key.to_string()));
        }
        Ok(point)
    }

    /// Encode `value` and write it to the point's register or coil.
    pub async fn write_value(&mut self, key: &str, value: &PointValue) -> BridgeResult<()> {
        let point = self.writable_point(key)?;
        let raw = encode(point, value)?;

        match point.register_class {
            RegisterClass::Coil => {
                self.transport.write_bit(point.address, raw != 0).await?;
            }
            RegisterClass::HoldingRegister => {
                let words = raw_to_words(point, raw)?;
                if let [word] = words.as_slice() {
                    self.transport.write_word(point.address, *word).await?;
                } else {
                    self.transport.write_words(point.address, &words).await?;
                }
            }
            RegisterClass::InputRegister | RegisterClass::DiscreteInput => {
                return Err(BridgeError::ReadOnly(key.to_string()));
            }
        }

        info!(key = %key, value = %value, raw, "Point written");
        Ok(())
    }

    /// Poll every `interval` until `shutdown` resolves.
    ///
    /// A failed poll is logged and retried on the next tick.
    pub async fn run<F, S>(&mut self, interval: Duration, shutdown: S, mut on_snapshot: F)
    where
        F: FnMut(&Snapshot),
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval_secs = interval.as_secs(), "Polling started");
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Polling stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(snapshot) => on_snapshot(&snapshot),
                        Err(e) => warn!(error = %e, "Poll failed"),
                    }
                }
            }
        }
    }
}
