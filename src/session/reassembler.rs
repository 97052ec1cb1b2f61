//! Chunk reassembly: ordered fragments in, materialized transaction out
//!
//! Data fragments carry no byte offsets. They are sorted by `sequence` and
//! copied contiguously, each starting at the running sum of the lengths
//! copied before it. The declared `data_size` is the only sizing authority:
//! a fragment set that does not tile it exactly fails the finalize step.
//! Tag fragments keep arrival order and are never sorted.

use std::sync::Arc;

use tracing::debug;

use crate::session::store::{SessionState, SessionStore, SigningSession};
use crate::tx::{Fragment, FragmentPayload, Transaction};
use crate::types::{Result, WicketError};

/// Accumulates fragments into sessions and finalizes them
#[derive(Clone)]
pub struct Reassembler {
    store: Arc<SessionStore>,
}

impl Reassembler {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Append one fragment to an open session.
    ///
    /// Fragments may arrive in any order, data and tag kinds interleaved.
    /// A data fragment that would push the accumulated byte total past the
    /// declared size is rejected and does not enter the session.
    pub fn append(&self, origin: &str, collection_id: &str, fragment: Fragment) -> Result<()> {
        self.store
            .with_open_session(collection_id, origin, |session| {
                if let FragmentPayload::Data(ref bytes) = fragment.payload {
                    let total = session
                        .pending_data_bytes
                        .checked_add(bytes.len() as u64)
                        .ok_or_else(|| {
                            WicketError::Reconstruction("Fragment byte total overflow".to_string())
                        })?;
                    if total > session.transaction.data_size {
                        return Err(WicketError::Reconstruction(
                            "Fragment data exceeds declared transaction size".to_string(),
                        ));
                    }
                    session.pending_data_bytes = total;
                }
                session.pending.push(fragment);
                Ok(())
            })
            .unwrap_or_else(|| {
                Err(WicketError::Session(
                    "Invalid origin for chunk request".to_string(),
                ))
            })
    }

    /// Finalize a session into a reconstructed transaction.
    ///
    /// The session is removed from the store before reconstruction runs, so
    /// cleanup happens regardless of the outcome here or anywhere downstream.
    pub fn finalize(&self, origin: &str, collection_id: &str) -> Result<Transaction> {
        let session = self.store.take(collection_id, origin).ok_or_else(|| {
            WicketError::Session("Invalid origin for end request".to_string())
        })?;

        debug!(
            origin = %origin,
            collection_id = %collection_id,
            fragments = session.pending.len(),
            "Finalizing signing session"
        );

        reconstruct(session)
    }
}

/// Assemble the session's pending fragments into its transaction.
///
/// Consumes the session; by this point it has already left the store.
fn reconstruct(mut session: SigningSession) -> Result<Transaction> {
    let declared = session.transaction.data_size as usize;

    let mut data_fragments: Vec<(u64, Vec<u8>)> = Vec::new();
    let mut tags = Vec::new();
    for fragment in session.pending.drain(..) {
        match fragment.payload {
            FragmentPayload::Data(bytes) => data_fragments.push((fragment.sequence, bytes)),
            FragmentPayload::Tag(tag) => tags.push(tag),
        }
    }

    // Stable sort: equal sequences keep arrival order, matching the
    // contiguous-copy contract
    data_fragments.sort_by_key(|(sequence, _)| *sequence);

    let mut data = Vec::with_capacity(declared);
    for (_, bytes) in &data_fragments {
        if data.len() + bytes.len() > declared {
            return Err(WicketError::Reconstruction(
                "Assembled data exceeds declared transaction size".to_string(),
            ));
        }
        data.extend_from_slice(bytes);
    }

    if data.len() != declared {
        return Err(WicketError::Reconstruction(format!(
            "Assembled data length {} does not match declared size {}",
            data.len(),
            declared
        )));
    }

    session.transaction.data = data;
    session.transaction.tags = tags;
    session.state = SessionState::Reconstructed;

    Ok(session.transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{Tag, Winston};

    const ORIGIN: &str = "https://x";

    fn setup(data_size: u64) -> (Arc<SessionStore>, Reassembler) {
        let store = Arc::new(SessionStore::new(600, 16, 1 << 20));
        let tx = Transaction {
            format: 2,
            id: String::new(),
            last_tx: String::new(),
            owner: String::new(),
            target: String::new(),
            quantity: Winston(0),
            reward: Winston(0),
            data_size,
            data: Vec::new(),
            tags: Vec::new(),
        };
        store.create("c1", ORIGIN, tx).unwrap();
        let reassembler = Reassembler::new(store.clone());
        (store, reassembler)
    }

    fn data_fragment(sequence: u64, bytes: &[u8]) -> Fragment {
        Fragment {
            sequence,
            payload: FragmentPayload::Data(bytes.to_vec()),
        }
    }

    fn tag_fragment(name: &str, value: &str) -> Fragment {
        Fragment {
            sequence: 0,
            payload: FragmentPayload::Tag(Tag {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    #[test]
    fn test_out_of_order_fragments_reassemble_in_sequence_order() {
        let (_, reassembler) = setup(3);
        reassembler.append(ORIGIN, "c1", data_fragment(1, b"BC")).unwrap();
        reassembler.append(ORIGIN, "c1", data_fragment(0, b"A")).unwrap();

        let tx = reassembler.finalize(ORIGIN, "c1").unwrap();
        assert_eq!(tx.data, b"ABC");
    }

    #[test]
    fn test_tags_keep_arrival_order() {
        let (_, reassembler) = setup(0);
        reassembler.append(ORIGIN, "c1", tag_fragment("z", "1")).unwrap();
        reassembler.append(ORIGIN, "c1", tag_fragment("a", "2")).unwrap();
        reassembler.append(ORIGIN, "c1", tag_fragment("m", "3")).unwrap();

        let tx = reassembler.finalize(ORIGIN, "c1").unwrap();
        let names: Vec<&str> = tx.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_interleaved_kinds() {
        let (_, reassembler) = setup(4);
        reassembler.append(ORIGIN, "c1", data_fragment(1, b"CD")).unwrap();
        reassembler
            .append(ORIGIN, "c1", tag_fragment("Content-Type", "text/plain"))
            .unwrap();
        reassembler.append(ORIGIN, "c1", data_fragment(0, b"AB")).unwrap();

        let tx = reassembler.finalize(ORIGIN, "c1").unwrap();
        assert_eq!(tx.data, b"ABCD");
        assert_eq!(tx.tags.len(), 1);
    }

    #[test]
    fn test_foreign_origin_append_rejected_without_mutation() {
        let (_, reassembler) = setup(2);
        reassembler.append(ORIGIN, "c1", data_fragment(0, b"AB")).unwrap();

        let err = reassembler
            .append("https://evil.example", "c1", data_fragment(1, b"XY"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin for chunk request");

        // Session is untouched: finalize still succeeds on the legit fragments
        let tx = reassembler.finalize(ORIGIN, "c1").unwrap();
        assert_eq!(tx.data, b"AB");
    }

    #[test]
    fn test_foreign_origin_finalize_rejected() {
        let (_, reassembler) = setup(1);
        reassembler.append(ORIGIN, "c1", data_fragment(0, b"A")).unwrap();

        let err = reassembler
            .finalize("https://evil.example", "c1")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin for end request");

        let tx = reassembler.finalize(ORIGIN, "c1").unwrap();
        assert_eq!(tx.data, b"A");
    }

    #[test]
    fn test_missing_session_finalize() {
        let (_, reassembler) = setup(1);
        let err = reassembler.finalize(ORIGIN, "missing").unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin for end request");
    }

    #[test]
    fn test_short_fragment_set_fails_length_check() {
        let (store, reassembler) = setup(10);
        reassembler.append(ORIGIN, "c1", data_fragment(0, b"ABC")).unwrap();

        let err = reassembler.finalize(ORIGIN, "c1").unwrap_err();
        assert!(matches!(err, WicketError::Reconstruction(_)));

        // Cleanup ran despite the fault
        assert!(store.is_empty());
    }

    #[test]
    fn test_overlong_fragment_rejected_at_append() {
        let (_, reassembler) = setup(3);
        reassembler.append(ORIGIN, "c1", data_fragment(0, b"AB")).unwrap();

        let err = reassembler
            .append(ORIGIN, "c1", data_fragment(1, b"CD"))
            .unwrap_err();
        assert!(matches!(err, WicketError::Reconstruction(_)));

        // The rejected fragment never entered the session
        reassembler.append(ORIGIN, "c1", data_fragment(1, b"C")).unwrap();
        let tx = reassembler.finalize(ORIGIN, "c1").unwrap();
        assert_eq!(tx.data, b"ABC");
    }

    #[test]
    fn test_empty_data_with_zero_declared_size() {
        let (_, reassembler) = setup(0);
        let tx = reassembler.finalize(ORIGIN, "c1").unwrap();
        assert!(tx.data.is_empty());
    }

    #[test]
    fn test_session_destroyed_after_successful_finalize() {
        let (store, reassembler) = setup(1);
        reassembler.append(ORIGIN, "c1", data_fragment(0, b"A")).unwrap();
        reassembler.finalize(ORIGIN, "c1").unwrap();

        assert!(store.is_empty());
        let err = reassembler.finalize(ORIGIN, "c1").unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin for end request");
    }
}
