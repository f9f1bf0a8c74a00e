use bytes::Bytes;
use chrono::TimeZone;

use super::*;

fn sample_report(ssrc: u32) -> ReceptionReport {
    ReceptionReport {
        ssrc,
        fraction_lost: 84,
        total_lost: 5,
        last_sequence_number: 0x46e1,
        jitter: 273,
        last_sender_report: 0x9f36432,
        delay: 150137,
    }
}

#[test]
fn test_sender_report_roundtrip() {
    let mut sr = SenderReport {
        ssrc: 0x902f9e2e,
        ntp_time: 0xda8bd1fcdddda05a,
        rtp_time: 0xaaf4edd5,
        packet_count: 1,
        octet_count: 2,
        reports: vec![sample_report(0xbc5e9a40)],
        profile_extensions: Bytes::new(),
    };
    sr.set_profile_extensions(&[0x81, 0xca, 0x00, 0x04, 0x90, 0x2f, 0x9e, 0x2e])
        .expect("set extension");

    let header = sr.header();
    assert_eq!(header.count, 1);
    assert_eq!(header.packet_type, PacketType::SenderReport);
    assert_eq!(header.length, 14, "60 bytes = 15 words, length = words - 1");

    let data = sr.marshal().expect("marshal sr");
    assert_eq!(data.len(), sr.marshal_size());
    assert_eq!(
        &data[..],
        &[
            0x81, 0xc8, 0x00, 0x0e, // v=2, p=0, count=1, SR, len=14
            0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
            0xda, 0x8b, 0xd1, 0xfc, // ntp msw
            0xdd, 0xdd, 0xa0, 0x5a, // ntp lsw
            0xaa, 0xf4, 0xed, 0xd5, // rtp timestamp
            0x00, 0x00, 0x00, 0x01, // packet count
            0x00, 0x00, 0x00, 0x02, // octet count
            0xbc, 0x5e, 0x9a, 0x40, // report ssrc=0xbc5e9a40
            0x54, 0x00, 0x00, 0x05, // fracLost=84, totalLost=5
            0x00, 0x00, 0x46, 0xe1, // lastSeq=0x46e1
            0x00, 0x00, 0x01, 0x11, // jitter=273
            0x09, 0xf3, 0x64, 0x32, // lsr=0x9f36432
            0x00, 0x02, 0x4a, 0x79, // delay=150137
            0x81, 0xca, 0x00, 0x04, // profile extension
            0x90, 0x2f, 0x9e, 0x2e, // profile extension
        ]
    );

    let got = SenderReport::unmarshal(&mut data.clone()).expect("unmarshal sr");
    assert_eq!(got, sr);
    assert_eq!(
        got.destination_ssrc(),
        vec![0xbc5e9a40, 0x902f9e2e],
        "reports first, then the sender itself"
    );
}

#[test]
fn test_sender_report_empty_roundtrip() {
    let sr = SenderReport::default();

    let header = sr.header();
    assert_eq!(header.count, 0);
    assert_eq!(header.length, 6, "28 bytes = 7 words, length = words - 1");

    let data = sr.marshal().expect("marshal sr");
    assert_eq!(data.len(), 28);

    let got = SenderReport::unmarshal(&mut data.clone()).expect("unmarshal sr");
    assert_eq!(got, sr);
}

#[test]
fn test_sender_report_report_list_capacity() {
    let mut sr = SenderReport::default();

    for i in 0..31u32 {
        sr.add_report(sample_report(i)).expect("add report");
        assert_eq!(sr.header().count as usize, sr.reports.len());
    }
    assert_eq!(sr.reports.len(), 31);

    let got_err = sr.add_report(sample_report(31)).err().expect("expected error");
    assert_eq!(got_err, Error::TooManyReports);
    assert_eq!(sr.reports.len(), 31, "failed add must not mutate the list");

    // A list grown past the maximum by direct mutation fails at marshal.
    sr.reports.push(sample_report(32));
    let got_err = sr.marshal().err().expect("expected error");
    assert_eq!(Error::TooManyReports, got_err);
}

#[test]
fn test_sender_report_remove_report() {
    let mut sr = SenderReport::default();

    let mut report = ReceptionReport {
        ssrc: 1,
        total_lost: 0,
        last_sequence_number: 100,
        ..Default::default()
    };
    report.set_fraction_lost_ratio(0.5);
    sr.add_report(report).expect("add report");

    assert_eq!(sr.reports.len(), 1);
    assert!((sr.reports[0].fraction_lost_ratio() - 0.5).abs() <= 1.0 / 256.0);

    assert!(!sr.remove_report(2), "ssrc 2 was never added");
    assert_eq!(sr.header().count, 1);

    assert!(sr.remove_report(1));
    assert!(sr.reports.is_empty());
    assert_eq!(sr.header().count, 0);

    assert!(!sr.remove_report(1), "second removal finds nothing");
}

#[test]
fn test_sender_report_remove_first_match() {
    let mut sr = SenderReport::default();
    sr.add_report(sample_report(7)).expect("add report");
    sr.add_report(sample_report(8)).expect("add report");
    sr.add_report(sample_report(7)).expect("add report");

    assert!(sr.remove_report(7));
    assert_eq!(
        sr.reports.iter().map(|r| r.ssrc).collect::<Vec<_>>(),
        vec![8, 7],
        "only the first matching block is removed"
    );
}

#[test]
fn test_sender_report_profile_extension_validation() {
    let mut sr = SenderReport::default();

    let got_err = sr
        .set_profile_extensions(&[1, 2, 3, 4, 5])
        .err()
        .expect("expected error");
    assert_eq!(got_err, Error::ProfileExtensionNotAligned);
    assert!(sr.profile_extensions.is_empty(), "failed set must not mutate");

    sr.set_profile_extensions(&[1, 2, 3, 4, 5, 6, 7, 8])
        .expect("aligned extension");
    let data = sr.marshal().expect("marshal sr");
    assert_eq!(&data[data.len() - 8..], &[1, 2, 3, 4, 5, 6, 7, 8]);

    let got = SenderReport::unmarshal(&mut data.clone()).expect("unmarshal sr");
    assert_eq!(&got.profile_extensions[..], &[1, 2, 3, 4, 5, 6, 7, 8]);

    sr.clear_profile_extensions();
    assert!(sr.profile_extensions.is_empty());

    // A misaligned extension set by direct mutation fails at marshal.
    sr.profile_extensions = Bytes::from_static(&[1, 2, 3]);
    let got_err = sr.marshal().err().expect("expected error");
    assert_eq!(Error::ProfileExtensionNotAligned, got_err);
}

#[test]
fn test_sender_report_ntp_unix_epoch() {
    let mut sr = SenderReport::default();

    sr.set_ntp_unix_millis(0);
    assert_eq!(sr.ntp_time, (NTP_EPOCH_OFFSET_SECS as u64) << 32);
    assert_eq!(sr.ntp_unix_millis(), 0);
}

#[test]
fn test_sender_report_ntp_roundtrip_within_1ms() {
    let mut sr = SenderReport::default();

    let cases = [
        chrono::Utc
            .with_ymd_and_hms(2022, 4, 25, 12, 0, 0)
            .unwrap()
            .timestamp_millis(),
        chrono::Utc
            .with_ymd_and_hms(1999, 12, 31, 23, 59, 59)
            .unwrap()
            .timestamp_millis()
            + 999,
        1,
        999,
        1_650_000_000_123,
    ];

    for unix_millis in cases {
        sr.set_ntp_unix_millis(unix_millis);
        let got = sr.ntp_unix_millis();
        assert!(
            (got - unix_millis).abs() <= 1,
            "ntp round trip for {unix_millis} gave {got}"
        );
    }
}

#[test]
fn test_sender_report_ntp_fraction_precision() {
    let mut sr = SenderReport::default();

    // 500 ms is exactly half of the 32-bit fraction range.
    sr.set_ntp_unix_millis(500);
    assert_eq!(sr.ntp_time & 0xFFFF_FFFF, 1u64 << 31);

    // Truncating the fraction below the millisecond is invisible at
    // millisecond granularity.
    sr.ntp_time += 1;
    assert_eq!(sr.ntp_unix_millis(), 500);
}

#[test]
fn test_sender_report_unmarshal_errors() {
    let tests = vec![
        ("nil", Bytes::from_static(&[]), Error::PacketTooShort),
        (
            "header only",
            Bytes::from_static(&[0x80, 0xc8, 0x00, 0x06]),
            Error::PacketTooShort,
        ),
        (
            "sender info truncated",
            Bytes::from_static(&[
                0x80, 0xc8, 0x00, 0x06, // v=2, p=0, count=0, SR, len=6
                0x90, 0x2f, 0x9e, 0x2e, // ssrc
                0xda, 0x8b, 0xd1, 0xfc, // ntp msw
                0xdd, 0xdd, 0xa0, 0x5a, // ntp lsw
                0xaa, 0xf4, 0xed, 0xd5, // rtp timestamp
                0x00, 0x00, 0x00, 0x01, // packet count
            ]),
            Error::PacketTooShort,
        ),
        (
            "report blocks truncated",
            Bytes::from_static(&[
                0x81, 0xc8, 0x00, 0x0c, // v=2, p=0, count=1, SR, len=12
                0x90, 0x2f, 0x9e, 0x2e, // ssrc
                0xda, 0x8b, 0xd1, 0xfc, // ntp msw
                0xdd, 0xdd, 0xa0, 0x5a, // ntp lsw
                0xaa, 0xf4, 0xed, 0xd5, // rtp timestamp
                0x00, 0x00, 0x00, 0x01, // packet count
                0x00, 0x00, 0x00, 0x02, // octet count
            ]),
            Error::PacketTooShort,
        ),
        (
            "wrong type",
            Bytes::from_static(&[
                0x80, 0xc9, 0x00, 0x06, // v=2, p=0, count=0, RR, len=6
                0x90, 0x2f, 0x9e, 0x2e, // ssrc
                0xda, 0x8b, 0xd1, 0xfc, // ntp msw
                0xdd, 0xdd, 0xa0, 0x5a, // ntp lsw
                0xaa, 0xf4, 0xed, 0xd5, // rtp timestamp
                0x00, 0x00, 0x00, 0x01, // packet count
                0x00, 0x00, 0x00, 0x02, // octet count
            ]),
            Error::WrongType,
        ),
        (
            "misaligned extension",
            Bytes::from_static(&[
                0x80, 0xc8, 0x00, 0x07, // v=2, p=0, count=0, SR, len=7
                0x90, 0x2f, 0x9e, 0x2e, // ssrc
                0xda, 0x8b, 0xd1, 0xfc, // ntp msw
                0xdd, 0xdd, 0xa0, 0x5a, // ntp lsw
                0xaa, 0xf4, 0xed, 0xd5, // rtp timestamp
                0x00, 0x00, 0x00, 0x01, // packet count
                0x00, 0x00, 0x00, 0x02, // octet count
                0x01, 0x02, // dangling half-word
            ]),
            Error::ProfileExtensionNotAligned,
        ),
    ];

    for (name, mut data, want_error) in tests {
        let got_err = SenderReport::unmarshal(&mut data)
            .err()
            .unwrap_or_else(|| panic!("Unmarshal {name}: expected error"));
        assert_eq!(
            want_error, got_err,
            "Unmarshal {name}: err = {got_err:?}, want {want_error:?}"
        );
    }
}
