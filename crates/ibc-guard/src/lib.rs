// Path: crates/ibc-guard/src/lib.rs
#![forbid(unsafe_code)]

//! Inbound cross-chain transfer guard for protected module addresses.
//!
//! The burn module account only ever burns the native denomination, so a
//! foreign token transferred to it over IBC would be stranded forever.
//! This middleware rejects such transfers with an error acknowledgement —
//! the sending chain refunds the sender — and passes everything else
//! through to the wrapped handler untouched.
//!
//! The guard is stateless across packets: it is re-applied to every
//! inbound packet at every height, with no memory beyond the packet
//! itself.

use opal_telemetry::guard_metrics;
use opal_types::app::{burn_address, display_address};
use opal_types::consts::NATIVE_DENOM;
use opal_types::error::GuardError;
use serde::{Deserialize, Serialize};

/// An inbound packet as delivered by the channel layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// The port the packet arrived on.
    pub source_port: String,
    /// The channel the packet arrived on.
    pub source_channel: String,
    /// The opaque application payload.
    pub data: Vec<u8>,
}

/// The ICS-20-shaped payload of a fungible asset transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleTransferData {
    /// The possibly hop-prefixed denomination being transferred.
    pub denom: String,
    /// The transfer amount, as a decimal string.
    pub amount: String,
    /// The sender address on the source chain.
    pub sender: String,
    /// The receiver address on this chain.
    pub receiver: String,
    /// An optional application memo.
    #[serde(default)]
    pub memo: String,
}

/// The acknowledgement returned to the channel layer for a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// The packet was processed; the payload is handler-specific.
    Success(Vec<u8>),
    /// The packet was rejected; the sending chain refunds the sender.
    Error(String),
}

/// The capability this middleware wraps: whatever handles packets when the
/// guard lets them through.
pub trait PacketHandler: Send + Sync {
    /// Processes one inbound packet and produces its acknowledgement.
    fn on_recv_packet(&self, packet: &Packet) -> Acknowledgement;
}

/// Strips all leading `"transfer/channel-<n>/"` hop prefixes from a
/// denomination, yielding its base denomination.
///
/// A native asset that left the chain and returned home carries one such
/// prefix per hop; zero or more hops must all resolve to the same base.
pub fn base_denom(denom: &str) -> &str {
    let mut rest = denom;
    loop {
        let Some(after_port) = rest.strip_prefix("transfer/") else {
            return rest;
        };
        let Some(after_channel) = after_port.strip_prefix("channel-") else {
            return rest;
        };
        let Some(slash) = after_channel.find('/') else {
            return rest;
        };
        let (channel_id, tail) = after_channel.split_at(slash);
        if channel_id.is_empty() || !channel_id.bytes().all(|b| b.is_ascii_digit()) {
            return rest;
        }
        // Drop the leading '/' of the tail and keep stripping.
        rest = &tail[1..];
    }
}

/// Middleware rejecting inbound transfers of non-native tokens to the
/// burn address.
///
/// When a transfer is rejected, an error acknowledgement is returned,
/// causing the source chain to refund the sender; local state is never
/// mutated by the rejected transfer.
pub struct ProtectedAddressGuard<H: PacketHandler> {
    inner: H,
    protected: String,
}

impl<H: PacketHandler> ProtectedAddressGuard<H> {
    /// Wraps a packet handler, protecting the burn module address.
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            protected: display_address(&burn_address()),
        }
    }

    /// The display form of the protected address.
    pub fn protected_address(&self) -> &str {
        &self.protected
    }
}

impl<H: PacketHandler> PacketHandler for ProtectedAddressGuard<H> {
    fn on_recv_packet(&self, packet: &Packet) -> Acknowledgement {
        let data: FungibleTransferData = match serde_json::from_slice(&packet.data) {
            // Not a fungible token packet; it may be a different message
            // type sharing the channel. Pass through to the wrapped handler.
            Err(_) => {
                guard_metrics().inc_transfers_passed();
                return self.inner.on_recv_packet(packet);
            }
            Ok(data) => data,
        };

        if data.receiver == self.protected {
            let base = base_denom(&data.denom);
            if base != NATIVE_DENOM {
                let err = GuardError::NonNativeAsset {
                    native: NATIVE_DENOM.to_string(),
                    denom: data.denom.clone(),
                    base: base.to_string(),
                };
                tracing::debug!(
                    target: "ibc.guard",
                    denom = %data.denom,
                    base = %base,
                    channel = %packet.source_channel,
                    "rejected inbound transfer to protected address"
                );
                guard_metrics().inc_transfers_rejected();
                return Acknowledgement::Error(err.to_string());
            }
        }

        guard_metrics().inc_transfers_passed();
        self.inner.on_recv_packet(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records whether the wrapped handler saw the packet.
    struct Recorder;

    impl PacketHandler for Recorder {
        fn on_recv_packet(&self, packet: &Packet) -> Acknowledgement {
            Acknowledgement::Success(packet.data.clone())
        }
    }

    fn transfer_packet(denom: &str, receiver: &str) -> Packet {
        let data = FungibleTransferData {
            denom: denom.to_string(),
            amount: "1000".to_string(),
            sender: "opal1aaaa".to_string(),
            receiver: receiver.to_string(),
            memo: String::new(),
        };
        Packet {
            source_port: "transfer".to_string(),
            source_channel: "channel-0".to_string(),
            data: serde_json::to_vec(&data).unwrap(),
        }
    }

    fn guard() -> ProtectedAddressGuard<Recorder> {
        ProtectedAddressGuard::new(Recorder)
    }

    #[test]
    fn base_denom_strips_any_hop_depth() {
        assert_eq!(base_denom("uopal"), "uopal");
        assert_eq!(base_denom("transfer/channel-3/uopal"), "uopal");
        assert_eq!(
            base_denom("transfer/channel-12/transfer/channel-0/uopal"),
            "uopal"
        );
        assert_eq!(base_denom("transfer/channel-1/uatom"), "uatom");
        // Non-hop-shaped prefixes stay intact.
        assert_eq!(base_denom("transfer/channelx/uopal"), "transfer/channelx/uopal");
        assert_eq!(base_denom("factory/addr/sub"), "factory/addr/sub");
    }

    #[test]
    fn native_transfers_to_protected_address_pass_at_every_hop_depth() {
        let guard = guard();
        let protected = guard.protected_address().to_string();

        for denom in [
            "uopal".to_string(),
            "transfer/channel-0/uopal".to_string(),
            "transfer/channel-7/transfer/channel-0/uopal".to_string(),
        ] {
            let ack = guard.on_recv_packet(&transfer_packet(&denom, &protected));
            assert!(
                matches!(ack, Acknowledgement::Success(_)),
                "denom {} should pass",
                denom
            );
        }
    }

    #[test]
    fn foreign_transfers_to_protected_address_are_rejected_at_every_hop_depth() {
        let guard = guard();
        let protected = guard.protected_address().to_string();

        for denom in [
            "uatom".to_string(),
            "transfer/channel-0/uatom".to_string(),
            "transfer/channel-7/transfer/channel-0/uatom".to_string(),
        ] {
            let ack = guard.on_recv_packet(&transfer_packet(&denom, &protected));
            match ack {
                Acknowledgement::Error(reason) => {
                    assert!(reason.contains("uatom"), "reason should name the denom");
                }
                other => panic!("denom {} should be rejected, got {:?}", denom, other),
            }
        }
    }

    #[test]
    fn transfers_to_other_receivers_pass_through() {
        let guard = guard();
        let ack = guard.on_recv_packet(&transfer_packet("uatom", "opal1somebodyelse"));
        assert!(matches!(ack, Acknowledgement::Success(_)));
    }

    #[test]
    fn non_transfer_payloads_pass_through_unmodified() {
        let guard = guard();
        let packet = Packet {
            source_port: "transfer".to_string(),
            source_channel: "channel-0".to_string(),
            data: b"not json at all".to_vec(),
        };
        match guard.on_recv_packet(&packet) {
            Acknowledgement::Success(data) => assert_eq!(data, packet.data),
            other => panic!("expected pass-through, got {:?}", other),
        }
    }
}
