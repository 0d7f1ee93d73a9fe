use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const WALLET_ID_PREFIX: &str = "wallet_";

/// Issues time-based wallet names of the form `wallet_<unix-millis>`.
///
/// The millisecond component is strictly increasing per generator: when the
/// clock has not moved past the last issued value, the last value plus one is
/// used instead, so two creations in the same millisecond still get distinct
/// names.
#[derive(Debug, Default)]
pub struct WalletIdGenerator {
    last_millis: AtomicU64,
}

impl WalletIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        self.next_id_at(now_millis())
    }

    fn next_id_at(&self, now: u64) -> String {
        let mut last = self.last_millis.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last_millis.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return format!("{WALLET_ID_PREFIX}{candidate}"),
                Err(observed) => last = observed,
            }
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
