// ABOUTME: Integration tests for the deployment log codec.
// ABOUTME: Round trips well-formed logs and checks malformed line reporting.

use proptest::prelude::*;
use webapp_deploy::history::codec::MalformedReason;
use webapp_deploy::history::{LogCodecError, decode, encode};

/// Well-formed log text: LF-terminated `timestamp<TAB>filename` lines.
fn arb_log() -> impl Strategy<Value = String> {
    prop::collection::vec((0i64..2_000_000_000, "[a-z0-9/._ \t-]{1,24}"), 0..20).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(ts, name)| format!("{ts}\t{name}\n"))
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn encode_after_decode_reproduces_bytes(log in arb_log()) {
        let history = decode(log.as_bytes()).unwrap();
        prop_assert_eq!(encode(&history), log.into_bytes());
    }
}

#[test]
fn decode_reads_log_written_by_previous_run() {
    let log = b"1700000000\tindex.html\n1700000000\tassets/app.js\n1700086400\tindex.html\n";
    let history = decode(log).unwrap();

    assert_eq!(history.len(), 3);
    assert_eq!(history.timestamps().len(), 2);
    assert_eq!(history.records()[1].filename(), "assets/app.js");
}

#[test]
fn malformed_line_reports_line_number() {
    let log = b"1700000000\tindex.html\n\nnot-a-number\tapp.js\n";
    let err = decode(log).unwrap_err();

    assert_eq!(
        err,
        LogCodecError::MalformedLogEntry {
            line: 3,
            content: "not-a-number\tapp.js".to_string(),
            reason: MalformedReason::InvalidTimestamp,
        }
    );
}
