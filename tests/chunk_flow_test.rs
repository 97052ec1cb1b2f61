//! Chunked signing session integration tests

use std::sync::Arc;

use wicket::session::{Reassembler, SessionStore};
use wicket::tx::{Fragment, FragmentPayload, Tag, Transaction, Winston};
use wicket::WicketError;

fn skeleton(data_size: u64) -> Transaction {
    Transaction {
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
    }
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

fn setup() -> (Arc<SessionStore>, Reassembler) {
    let store = Arc::new(SessionStore::new(600, 16, 1 << 20));
    let reassembler = Reassembler::new(store.clone());
    (store, reassembler)
}

/// Any fragment set whose sequences tile the declared size exactly must
/// reproduce the concatenation in sequence order, whatever the arrival
/// order was.
#[test]
fn test_tiling_fragments_reconstruct_exactly() {
    let (store, reassembler) = setup();
    store.create("c1", "https://x", skeleton(10)).unwrap();

    // Arrival order 2, 0, 3, 1
    reassembler
        .append("https://x", "c1", data_fragment(2, b"FGH"))
        .unwrap();
    reassembler
        .append("https://x", "c1", data_fragment(0, b"AB"))
        .unwrap();
    reassembler
        .append("https://x", "c1", data_fragment(3, b"IJ"))
        .unwrap();
    reassembler
        .append("https://x", "c1", data_fragment(1, b"CDE"))
        .unwrap();

    let tx = reassembler.finalize("https://x", "c1").unwrap();
    assert_eq!(tx.data, b"ABCDEFGHIJ");
}

/// The scenario from the protocol contract: fragments [seq 1 = "BC",
/// seq 0 = "A"] with declared size 3 reconstruct to "ABC".
#[test]
fn test_out_of_order_two_fragment_scenario() {
    let (store, reassembler) = setup();
    store.create("c1", "https://x", skeleton(3)).unwrap();

    reassembler
        .append("https://x", "c1", data_fragment(1, b"BC"))
        .unwrap();
    reassembler
        .append("https://x", "c1", data_fragment(0, b"A"))
        .unwrap();

    let tx = reassembler.finalize("https://x", "c1").unwrap();
    assert_eq!(tx.data, b"ABC");
}

/// Tags keep arrival order; their sequence numbers are ignored.
#[test]
fn test_tags_preserve_arrival_order_not_sequence() {
    let (store, reassembler) = setup();
    store.create("c1", "https://x", skeleton(0)).unwrap();

    let mut late = tag_fragment("first-arrived", "1");
    late.sequence = 99;
    reassembler.append("https://x", "c1", late).unwrap();
    reassembler
        .append("https://x", "c1", tag_fragment("second-arrived", "2"))
        .unwrap();

    let tx = reassembler.finalize("https://x", "c1").unwrap();
    assert_eq!(tx.tags[0].name, "first-arrived");
    assert_eq!(tx.tags[1].name, "second-arrived");
}

/// A foreign origin can neither append to nor finalize another origin's
/// session, and its attempts leave the session untouched.
#[test]
fn test_cross_origin_requests_never_mutate() {
    let (store, reassembler) = setup();
    store.create("c1", "https://x", skeleton(2)).unwrap();
    reassembler
        .append("https://x", "c1", data_fragment(0, b"OK"))
        .unwrap();

    let err = reassembler
        .append("https://evil", "c1", data_fragment(1, b"ZZ"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid origin for chunk request");

    let err = reassembler.finalize("https://evil", "c1").unwrap_err();
    assert_eq!(err.to_string(), "Invalid origin for end request");

    let tx = reassembler.finalize("https://x", "c1").unwrap();
    assert_eq!(tx.data, b"OK");
}

/// Sessions with a colliding collection id are never conflated: the second
/// create fails instead of overwriting, and the original owner keeps sole
/// access.
#[test]
fn test_colliding_collection_ids_are_not_conflated() {
    let (store, reassembler) = setup();
    store.create("c1", "https://a", skeleton(1)).unwrap();

    let err = store.create("c1", "https://b", skeleton(5)).unwrap_err();
    assert!(matches!(err, WicketError::Session(_)));

    assert!(reassembler
        .append("https://b", "c1", data_fragment(0, b"X"))
        .is_err());

    reassembler
        .append("https://a", "c1", data_fragment(0, b"A"))
        .unwrap();
    let tx = reassembler.finalize("https://a", "c1").unwrap();
    assert_eq!(tx.data, b"A");
    assert_eq!(tx.data_size, 1);
}

/// An undersized fragment set fails finalize explicitly, and cleanup still
/// runs: the session does not survive the failed attempt.
#[test]
fn test_gap_fails_finalize_and_cleans_up() {
    let (store, reassembler) = setup();
    store.create("c1", "https://x", skeleton(5)).unwrap();
    reassembler
        .append("https://x", "c1", data_fragment(0, b"AB"))
        .unwrap();

    let err = reassembler.finalize("https://x", "c1").unwrap_err();
    assert!(matches!(err, WicketError::Reconstruction(_)));
    assert!(store.is_empty());

    // A retry addresses a dead session
    let err = reassembler.finalize("https://x", "c1").unwrap_err();
    assert_eq!(err.to_string(), "Invalid origin for end request");
}

/// Overlapping/oversized fragments cannot smuggle extra bytes past the
/// declared size.
#[test]
fn test_excess_bytes_rejected_at_append() {
    let (store, reassembler) = setup();
    store.create("c1", "https://x", skeleton(3)).unwrap();
    reassembler
        .append("https://x", "c1", data_fragment(0, b"ABC"))
        .unwrap();

    let err = reassembler
        .append("https://x", "c1", data_fragment(1, b"D"))
        .unwrap_err();
    assert!(matches!(err, WicketError::Reconstruction(_)));

    let tx = reassembler.finalize("https://x", "c1").unwrap();
    assert_eq!(tx.data, b"ABC");
}

/// Concurrent sessions from different origins stay independent end to end.
#[test]
fn test_interleaved_sessions_from_two_origins() {
    let (store, reassembler) = setup();
    store.create("a1", "https://a", skeleton(2)).unwrap();
    store.create("b1", "https://b", skeleton(2)).unwrap();

    reassembler
        .append("https://a", "a1", data_fragment(0, b"AA"))
        .unwrap();
    reassembler
        .append("https://b", "b1", data_fragment(0, b"BB"))
        .unwrap();

    let tx_b = reassembler.finalize("https://b", "b1").unwrap();
    let tx_a = reassembler.finalize("https://a", "a1").unwrap();
    assert_eq!(tx_a.data, b"AA");
    assert_eq!(tx_b.data, b"BB");
}
