//! End-to-end log walks over built log files.

use logscope_core::{
    CoreError, DecodeDepth, DecryptionContext, FormatRegistry, IdentityCipher, IntegrityPolicy,
    LogReader, PayloadDecoder, ReaderConfig, ReportWriter, WalkResult,
};
use logscope_storage::{FileBackend, InMemoryBackend, StorageBackend};
use logscope_testkit::prelude::*;
use proptest::prelude::*;

fn walk_with(
    reader: &LogReader,
    backend: &dyn StorageBackend,
) -> (WalkResult, String) {
    let mut report = ReportWriter::new(Vec::new());
    let result = reader.walk(backend, &mut report).unwrap();
    let xml = String::from_utf8(report.finish().unwrap()).unwrap();
    (result, xml)
}

fn walk(config: ReaderConfig, decoder: Box<dyn PayloadDecoder>, log: Vec<u8>) -> (WalkResult, String) {
    let reader = LogReader::new(config, decoder);
    walk_with(&reader, &InMemoryBackend::with_data(log))
}

fn log_with_frames(count: usize) -> Vec<u8> {
    (0..count)
        .fold(LogFileBuilder::new(), |builder, i| {
            builder.frame(&PayloadBuilder::new(300).transaction(i as i64).build())
        })
        .end_marker()
        .build()
}

fn stub() -> Box<StubDecoder> {
    Box::new(StubDecoder::new("Foo", Some("bar=1")))
}

#[test]
fn record_limit_caps_the_walk() {
    for (frames, limit) in [(5, Some(3)), (3, Some(5)), (4, None), (0, Some(2)), (2, Some(0))] {
        let config = ReaderConfig::new().max_records(limit);
        let (result, xml) = walk(config, stub(), log_with_frames(frames));

        let expected = limit.map_or(frames, |l| frames.min(l));
        assert_eq!(result.records_processed, expected, "frames={frames} limit={limit:?}");
        assert!(result.is_clean());
        assert_eq!(xml.matches("<wrapper ").count(), expected);
        assert!(xml.contains(&format!("<recordCount>{expected}</recordCount>")));
    }
}

#[test]
fn zero_length_marker_alone_is_clean() {
    let log = LogFileBuilder::new().without_header().end_marker().build();
    let config = ReaderConfig::new().header_check(IntegrityPolicy::Ignore);

    // An all-zero header followed by the marker.
    let reader = LogReader::new(config, stub());
    let mut padded = vec![0u8; LogFileBuilder::HEADER_SIZE];
    padded.extend_from_slice(&log);
    let (result, _) = walk_with(&reader, &InMemoryBackend::with_data(padded));
    assert_eq!(result.records_processed, 0);
    assert!(result.is_clean());

    // The same marker read from an explicit offset.
    let config = ReaderConfig::new().start_offset(4);
    let mut shifted = vec![0xFF; 4];
    shifted.extend_from_slice(&log);
    let (result, xml) = walk(config, stub(), shifted);
    assert_eq!(result.records_processed, 0);
    assert!(result.is_clean());
    assert!(!xml.contains("<formatableID>"));
}

#[test]
fn trailing_garbage_stops_with_error() {
    let log = LogFileBuilder::new()
        .frame(&PayloadBuilder::new(300).build())
        .frame(&PayloadBuilder::new(301).build())
        .raw(&[0x00, 0x00, 0x01, 0x00, 0xAB, 0xCD])
        .build();

    let (result, xml) = walk(ReaderConfig::default(), stub(), log);
    assert_eq!(result.records_processed, 2);
    let err = result.terminal_error.expect("walk should stop with an error");
    assert_eq!(err.classification(), "TruncatedFrame");
    assert!(xml.contains("<partialWrapper "));
    assert!(xml.contains("<recordCount>2</recordCount>"));
    assert!(xml.trim_end().ends_with("</logFile>"));
}

#[test]
fn negative_garbage_tail_stops_with_error() {
    let log = LogFileBuilder::new()
        .frame(&PayloadBuilder::new(300).build())
        .frame(&PayloadBuilder::new(301).build())
        .raw(&[0xFF, 0xFF, 0xFF, 0xFE, 0xAB, 0xCD])
        .build();

    let (result, xml) = walk(ReaderConfig::default(), stub(), log);
    assert_eq!(result.records_processed, 2);
    assert!(matches!(
        result.terminal_error,
        Some(CoreError::InvalidFrameLength { length: -2, .. })
    ));
    assert!(xml.contains("<classification>InvalidFrameLength</classification>"));
    assert!(xml.contains("<recordCount>2</recordCount>"));
    assert!(xml.trim_end().ends_with("</logFile>"));
}

#[test]
fn negative_length_mid_log_is_not_end_of_log() {
    let log = LogFileBuilder::new()
        .frame(&PayloadBuilder::new(300).build())
        .raw(&(-5i32).to_be_bytes())
        .raw(&[0; 40])
        .build();

    let (result, _) = walk(ReaderConfig::default(), stub(), log);
    assert_eq!(result.records_processed, 1);
    assert!(!result.is_clean());
}

#[test]
fn header_only_and_full_decode() {
    let payload = PayloadBuilder::new(300).groups(0b101).transaction(12).build();
    let log = LogFileBuilder::new().frame(&payload).end_marker().build();

    let (_, header_only) = walk(ReaderConfig::default(), stub(), log.clone());
    assert!(header_only.contains("<operation type=\"Foo\"/>"));
    assert!(!header_only.contains("bar=1"));

    let config = ReaderConfig::new().depth(DecodeDepth::Full);
    let (_, full) = walk(config, stub(), log);
    assert!(full.contains("<operation type=\"Foo\">"));
    assert!(full.contains("<details>bar=1</details>"));

    for xml in [&header_only, &full] {
        assert!(xml.contains("<flag>FIRST</flag>"));
        assert!(xml.contains("<flag>COMPENSATION</flag>"));
        assert_eq!(xml.matches("<flag>").count(), 2);
        assert!(xml.contains("<transactionID value=\"12\"/>"));
    }
}

#[test]
fn failing_decoder_does_not_stop_the_walk() {
    let log = log_with_frames(3);
    let config = ReaderConfig::new().depth(DecodeDepth::Full);
    let (result, xml) = walk(config, Box::new(FailingDecoder), log);

    assert_eq!(result.records_processed, 3);
    assert!(result.is_clean());
    assert_eq!(xml.matches("<operation type=\"NULL\"/>").count(), 3);
    assert_eq!(xml.matches("<fieldError field=\"operation\">").count(), 3);
}

#[test]
fn padded_log_decodes_with_identity_cipher() {
    let payloads: Vec<Vec<u8>> = (0..4)
        .map(|i| PayloadBuilder::new(300).transaction(i).body(&vec![7; i as usize * 5]).build())
        .collect();
    let log = payloads
        .iter()
        .fold(LogFileBuilder::new().padded(16), |b, p| b.frame(p))
        .end_marker()
        .build();

    let ctx = DecryptionContext::new(Box::new(IdentityCipher::new(16))).unwrap();
    let reader = LogReader::new(ReaderConfig::default(), stub()).with_decryption(ctx);
    let (result, xml) = walk_with(&reader, &InMemoryBackend::with_data(log));

    assert_eq!(result.records_processed, 4);
    assert!(result.is_clean());
    assert!(!xml.contains("<warning>"));
    assert!(xml.contains("<transactionID value=\"3\"/>"));
}

#[test]
fn padded_log_without_decryption_is_misread() {
    let payload = PayloadBuilder::new(300).build();
    let log = LogFileBuilder::new().padded(16).frame(&payload).end_marker().build();

    let (_, xml) = walk(ReaderConfig::default(), stub(), log);
    // The padding is read as payload, so the trailer no longer lines up.
    assert!(xml.contains("<warning>forward length 7 does not match backward length 129</warning>"));
}

#[cfg(feature = "encryption")]
#[test]
fn aes_encrypted_log() {
    use logscope_core::{AesCbcCipher, EncryptionKey};

    let key = [0x5Au8; 32];
    let iv = [0x01u8; 16];
    let log = LogFileBuilder::new()
        .encrypted(16, Box::new(move |plain: &[u8]| aes_cbc_encrypt(&key, iv, plain)))
        .frame(&PayloadBuilder::new(300).groups(0x10).transaction(99).build())
        .frame(&PayloadBuilder::new(300).transaction(100).body(&[1; 40]).build())
        .end_marker()
        .build();

    let cipher = AesCbcCipher::new(&EncryptionKey::from_bytes(&key).unwrap(), iv);
    let ctx = DecryptionContext::new(Box::new(cipher)).unwrap();
    let reader = LogReader::new(ReaderConfig::default(), stub()).with_decryption(ctx);
    let (result, xml) = walk_with(&reader, &InMemoryBackend::with_data(log));

    assert_eq!(result.records_processed, 2);
    assert!(result.is_clean());
    assert!(xml.contains("<transactionID value=\"99\"/>"));
    assert!(xml.contains("<flag>COMMIT</flag>"));
    assert!(xml.contains("<transactionID value=\"100\"/>"));
}

#[test]
fn length_mismatch_policies() {
    let payload = PayloadBuilder::new(300).build();
    let log = LogFileBuilder::new()
        .frame(&payload)
        .frame_with_backward(&payload, Some(1))
        .frame(&payload)
        .end_marker()
        .build();

    let (result, xml) = walk(ReaderConfig::default(), stub(), log.clone());
    assert_eq!(result.records_processed, 3);
    assert_eq!(xml.matches("<warning>").count(), 1);

    let config = ReaderConfig::new().length_check(IntegrityPolicy::Ignore);
    let (result, xml) = walk(config, stub(), log.clone());
    assert_eq!(result.records_processed, 3);
    assert!(!xml.contains("<warning>"));

    let config = ReaderConfig::new().length_check(IntegrityPolicy::Fail);
    let (result, xml) = walk(config, stub(), log);
    assert_eq!(result.records_processed, 1);
    assert!(matches!(result.terminal_error, Some(CoreError::LengthMismatch { .. })));
    assert!(xml.contains("<classification>LengthMismatch</classification>"));
}

#[test]
fn missing_backward_length_at_end_of_file() {
    let payload = PayloadBuilder::new(300).build();
    let log = LogFileBuilder::new()
        .frame_with_backward(&payload, None)
        .build();

    let (result, xml) = walk(ReaderConfig::default(), stub(), log);
    assert_eq!(result.records_processed, 1);
    assert!(result.is_clean());
    assert!(xml.contains("<backwardLength>0</backwardLength>"));
    assert!(xml.contains("<warning>"));
}

#[test]
fn start_offset_resumes_at_a_frame() {
    let builder = LogFileBuilder::new().frame(&PayloadBuilder::new(300).transaction(1).build());
    let second = builder.next_offset();
    let log = builder
        .frame(&PayloadBuilder::new(300).transaction(2).build())
        .end_marker()
        .build();

    let config = ReaderConfig::new().start_offset(second);
    let (result, xml) = walk(config, stub(), log);
    assert_eq!(result.records_processed, 1);
    assert!(xml.contains(&format!("<wrapper offset=\"{second}\">")));
    assert!(xml.contains("<transactionID value=\"2\"/>"));
    assert!(!xml.contains("<obsoleteVersion>"));
}

#[test]
fn file_backed_walk() {
    let log = TempLog::new(&log_with_frames(2));
    let backend = FileBackend::open(&log.path).unwrap();

    let mut registry = FormatRegistry::new();
    registry.register(300, "Insert");
    let reader = LogReader::new(ReaderConfig::default(), Box::new(registry));
    let (result, xml) = walk_with(&reader, &backend);

    assert_eq!(result.records_processed, 2);
    assert_eq!(xml.matches("<operation type=\"Insert\"/>").count(), 2);
}

#[test]
fn registry_loaded_from_json() {
    let registry = FormatRegistry::from_json(&registry_json(&[(300, "Update")])).unwrap();
    let (_, xml) = walk(ReaderConfig::default(), Box::new(registry), log_with_frames(1));
    assert!(xml.contains("<operation type=\"Update\"/>"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn walk_counts_every_frame(payloads in payloads_strategy(12), limit in prop::option::of(0usize..16)) {
        let log = payloads
            .iter()
            .fold(LogFileBuilder::new(), |b, p| b.frame(p))
            .end_marker()
            .build();

        let config = ReaderConfig::new().max_records(limit);
        let (result, xml) = walk(config, stub(), log);

        let expected = limit.map_or(payloads.len(), |l| payloads.len().min(l));
        prop_assert_eq!(result.records_processed, expected);
        prop_assert!(result.is_clean());
        prop_assert!(!xml.contains("<fieldError"));
    }

    #[test]
    fn padded_walks_match_plain_walks(payloads in payloads_strategy(6), block_size in block_size_strategy()) {
        let plain = payloads
            .iter()
            .fold(LogFileBuilder::new(), |b, p| b.frame(p))
            .end_marker()
            .build();
        let padded = payloads
            .iter()
            .fold(LogFileBuilder::new().padded(block_size), |b, p| b.frame(p))
            .end_marker()
            .build();

        let (plain_result, plain_xml) = walk(ReaderConfig::default(), stub(), plain);

        let ctx = DecryptionContext::new(Box::new(IdentityCipher::new(block_size))).unwrap();
        let reader = LogReader::new(ReaderConfig::default(), stub()).with_decryption(ctx);
        let (padded_result, padded_xml) = walk_with(&reader, &InMemoryBackend::with_data(padded));

        prop_assert_eq!(plain_result.records_processed, padded_result.records_processed);
        prop_assert_eq!(
            plain_xml.matches("<transactionID").count(),
            padded_xml.matches("<transactionID").count()
        );
    }
}
