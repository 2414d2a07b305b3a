//! Tagged point-to-point transport between ranks.
//!
//! Each rank owns one unbounded inbox; sends are asynchronous and never
//! block. Delivery between a fixed (source, destination) pair is FIFO, so
//! matching by `(source, tag)` in posting order reproduces MPI's
//! non-overtaking guarantee. A stash holds packets that arrive ahead of
//! their posted receive.

use crate::error::CommsError;
use couette_core::{MessageTag, RankId};
use crossbeam_channel::{unbounded, Receiver, Sender};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// One in-flight message: source rank, tag, and the payload values.
#[derive(Clone, Debug)]
pub struct Packet {
    /// Rank that sent the packet.
    pub source: RankId,
    /// Tag distinguishing concurrent transfers between one rank pair.
    pub tag: MessageTag,
    /// The payload.
    pub payload: Vec<f64>,
}

/// A rank's endpoint: senders to every peer plus its own inbox.
///
/// Self-sends are allowed and never deadlock (the inbox is unbounded), so
/// single-rank axes use the same exchange path as decomposed ones.
pub struct Communicator {
    rank: RankId,
    peers: Vec<Sender<Packet>>,
    inbox: Receiver<Packet>,
    stash: VecDeque<Packet>,
}

impl Communicator {
    /// Create a fully-connected set of `size` communicators.
    ///
    /// Element `r` of the returned vector belongs to rank `r`; move each
    /// one into its rank's thread.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn world(size: usize) -> Vec<Communicator> {
        assert!(size > 0, "communicator world must have at least one rank");
        let mut txs = Vec::with_capacity(size);
        let mut rxs = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = unbounded();
            txs.push(tx);
            rxs.push(rx);
        }
        rxs.into_iter()
            .enumerate()
            .map(|(r, inbox)| Communicator {
                rank: RankId(r),
                peers: txs.clone(),
                inbox,
                stash: VecDeque::new(),
            })
            .collect()
    }

    /// This endpoint's rank.
    pub fn rank(&self) -> RankId {
        self.rank
    }

    /// Number of ranks in the world.
    pub fn size(&self) -> usize {
        self.peers.len()
    }

    /// Asynchronously send `payload` to `dest` under `tag`.
    ///
    /// Returns immediately; the payload is buffered at the destination.
    pub fn send(
        &self,
        dest: RankId,
        tag: MessageTag,
        payload: Vec<f64>,
    ) -> Result<(), CommsError> {
        self.peers[dest.0]
            .send(Packet {
                source: self.rank,
                tag,
                payload,
            })
            .map_err(|_| CommsError::Disconnected { peer: dest })
    }

    /// Block until a packet matching `(source, tag)` arrives, stashing any
    /// packets received out of order.
    fn take_matching(
        &mut self,
        source: RankId,
        tag: MessageTag,
    ) -> Result<Vec<f64>, CommsError> {
        if let Some(pos) = self
            .stash
            .iter()
            .position(|p| p.source == source && p.tag == tag)
        {
            // remove() preserves arrival order for the rest of the stash.
            return Ok(self.stash.remove(pos).map(|p| p.payload).unwrap_or_default());
        }
        loop {
            let pkt = self
                .inbox
                .recv()
                .map_err(|_| CommsError::Disconnected { peer: source })?;
            if pkt.source == source && pkt.tag == tag {
                return Ok(pkt.payload);
            }
            self.stash.push_back(pkt);
        }
    }
}

/// A scoped batch of pending receives: post all, then block for all.
///
/// Mirrors the post-then-wait request array pattern: every receive for one
/// exchange round is posted before any is waited on, giving a single
/// blocking synchronisation per round. Payloads come back in posting order.
#[derive(Default)]
pub struct RecvBatch {
    pending: SmallVec<[(RankId, MessageTag); 8]>,
}

impl RecvBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a receive for a packet from `source` under `tag`.
    pub fn post(&mut self, source: RankId, tag: MessageTag) {
        self.pending.push((source, tag));
    }

    /// Number of posted receives.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no receives have been posted.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Block until every posted receive has completed.
    ///
    /// Consumes the batch; payloads are returned in posting order.
    pub fn wait_all(self, comm: &mut Communicator) -> Result<Vec<Vec<f64>>, CommsError> {
        self.pending
            .into_iter()
            .map(|(source, tag)| comm.take_matching(source, tag))
            .collect()
    }
}
