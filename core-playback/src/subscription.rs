//! Cancellable engine status subscriptions.
//!
//! Each loaded resource gets one [`StatusSubscription`] (consumed by a
//! forwarding task) and one [`SubscriptionGuard`] (kept next to the handle).
//! Dropping or cancelling the guard revokes the subscription: once revoked,
//! [`StatusSubscription::next`] yields `None` even if the engine keeps
//! emitting, so late ticks from an unloaded resource never reach the session.

use bridge_traits::{EngineHandle, EngineStatus, LoadedSound, StatusReceiver};
use tokio_util::sync::CancellationToken;

/// Split a freshly loaded sound into a guard and a subscription.
pub fn subscribe(sound: LoadedSound) -> (SubscriptionGuard, StatusSubscription) {
    let token = CancellationToken::new();
    let guard = SubscriptionGuard {
        handle: sound.handle,
        token: token.clone(),
    };
    let subscription = StatusSubscription {
        handle: sound.handle,
        receiver: sound.status,
        token,
    };
    (guard, subscription)
}

/// Owner side of a subscription. Revokes on drop.
#[derive(Debug)]
pub struct SubscriptionGuard {
    handle: EngineHandle,
    token: CancellationToken,
}

impl SubscriptionGuard {
    pub fn handle(&self) -> EngineHandle {
        self.handle
    }

    pub fn revoke(&self) {
        self.token.cancel();
    }

    pub fn is_revoked(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Consumer side of a subscription.
#[derive(Debug)]
pub struct StatusSubscription {
    handle: EngineHandle,
    receiver: StatusReceiver,
    token: CancellationToken,
}

impl StatusSubscription {
    /// Handle the statuses originate from.
    pub fn handle(&self) -> EngineHandle {
        self.handle
    }

    /// Next status, or `None` once revoked or once the engine closed the channel.
    pub async fn next(&mut self) -> Option<EngineStatus> {
        let status = tokio::select! {
            biased;
            _ = self.token.cancelled() => return None,
            status = self.receiver.recv() => status,
        };

        if self.token.is_cancelled() {
            return None;
        }
        status
    }
}
