use dnswire_domain::{Message, RData, RecordType};
use dnswire_infrastructure::dns::wire::name::{to_presentation, unpack};
use dnswire_infrastructure::dns::wire::{MessageWriter, HFIXEDSZ, PACKETSZ};
use dnswire_infrastructure::dns::{decode_message, encode_to_vec, validate_message};
use std::net::{Ipv4Addr, Ipv6Addr};

mod helpers;
use helpers::MessageBuilder;

fn header(qdcount: u16, ancount: u16) -> Vec<u8> {
    let mut buf = vec![0x12, 0x34, 0x81, 0x80];
    buf.extend_from_slice(&qdcount.to_be_bytes());
    buf.extend_from_slice(&ancount.to_be_bytes());
    buf.extend_from_slice(&[0, 0, 0, 0]);
    buf
}

#[test]
fn test_single_answer_message_layout() {
    let message = MessageBuilder::new(0x1234)
        .question("example.com", "A")
        .answer("example.com", 300, "A", &["127.0.0.1"])
        .build();

    let (wire, truncated) = encode_to_vec(&message, PACKETSZ).unwrap();
    assert!(!truncated);

    let mut expected = vec![0x12, 0x34, 0x00, 0x00, 0, 1, 0, 1, 0, 0, 0, 0];
    expected.extend_from_slice(b"\x07example\x03com\x00\x00\x01\x00\x01");
    expected.extend_from_slice(&[0xc0, 0x0c, 0, 1, 0, 1, 0, 0, 0x01, 0x2c, 0, 4, 127, 0, 0, 1]);
    assert_eq!(wire, expected);

    let decoded = decode_message(&wire).unwrap();
    assert_eq!(decoded.header.qdcount, 1);
    assert_eq!(decoded.header.ancount, 1);
    assert_eq!(decoded.answers[0].ttl, 300);
    assert_eq!(decoded.answers[0].rdata, RData::A(Ipv4Addr::LOCALHOST));
    assert_eq!(decoded, message);
}

#[test]
fn test_bitstring_name_survives_message_round_trip() {
    let message = MessageBuilder::new(9)
        .question("\\[x3FF/12]", "PTR")
        .answer("\\[x3FF/12].in-addr.arpa", 60, "PTR", &["host.example"])
        .build();

    let (wire, _) = encode_to_vec(&message, PACKETSZ).unwrap();
    assert_eq!(&wire[HFIXEDSZ..HFIXEDSZ + 5], &[0x41, 12, 0x3f, 0xf0, 0]);

    let decoded = decode_message(&wire).unwrap();
    assert_eq!(decoded.questions[0].name, "\\[x3FF/12]");
    assert_eq!(decoded.answers[0].name, "\\[x3FF/12].in-addr.arpa");
    assert_eq!(decoded, message);
}

#[test]
fn test_compressed_names_are_shorter() {
    let mut compressed = vec![0u8; PACKETSZ];
    let mut writer = MessageWriter::new(&mut compressed, PACKETSZ);
    writer.write_name("www.example.com").unwrap();
    writer.write_name("MAIL.Example.COM").unwrap();
    let compressed_len = writer.position();

    let mut plain = vec![0u8; PACKETSZ];
    let mut writer = MessageWriter::new(&mut plain, PACKETSZ);
    writer.write_name_uncompressed("www.example.com").unwrap();
    writer.write_name_uncompressed("MAIL.Example.COM").unwrap();
    let plain_len = writer.position();

    assert_eq!(compressed_len, 17 + 7);
    assert_eq!(plain_len, 17 + 18);

    let (expanded, consumed) = unpack(&compressed[..compressed_len], 17, compressed_len).unwrap();
    assert_eq!(consumed, 7);
    assert_eq!(to_presentation(&expanded).unwrap(), "MAIL.example.com");
}

#[test]
fn test_zero_compression_entries_disables_compression() {
    let message = MessageBuilder::new(1)
        .question("example.com", "MX")
        .answer("example.com", 60, "MX", &["10", "mail.example.com"])
        .build();

    let mut buf = vec![0u8; PACKETSZ];
    let compressed = MessageWriter::new(&mut buf, PACKETSZ)
        .write_message(&message)
        .unwrap();
    let plain = MessageWriter::with_compression_entries(&mut buf, PACKETSZ, 0)
        .write_message(&message)
        .unwrap();
    assert!(compressed < plain);

    let decoded = decode_message(&buf[..plain]).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn test_overflowing_records_are_dropped_and_tc_set() {
    let message = MessageBuilder::new(2)
        .response()
        .question("example.com", "A")
        .many_answers(40)
        .build();

    let (wire, truncated) = encode_to_vec(&message, PACKETSZ).unwrap();
    assert!(truncated);
    assert_eq!(wire.len(), HFIXEDSZ + 17);

    let decoded = decode_message(&wire).unwrap();
    assert!(decoded.header.tc);
    assert_eq!(decoded.header.qdcount, 1);
    assert_eq!(decoded.header.ancount, 0);
    assert!(decoded.answers.is_empty());
    assert_eq!(decoded.questions, message.questions);

    let (wire, truncated) = encode_to_vec(&message, 4096).unwrap();
    assert!(!truncated);
    assert_eq!(decode_message(&wire).unwrap(), message);
}

#[test]
fn test_budget_below_header_produces_nothing() {
    let message = MessageBuilder::new(3).question("example.com", "A").build();
    let (wire, truncated) = encode_to_vec(&message, HFIXEDSZ - 1).unwrap();
    assert!(wire.is_empty());
    assert!(truncated);

    let (wire, truncated) = encode_to_vec(&message, HFIXEDSZ).unwrap();
    assert_eq!(wire.len(), HFIXEDSZ);
    assert!(truncated);
    let decoded = decode_message(&wire).unwrap();
    assert!(decoded.header.tc);
    assert!(decoded.questions.is_empty());
}

#[test]
fn test_self_pointer_is_rejected() {
    let mut buf = header(1, 0);
    buf.extend_from_slice(&[0xc0, 0x0c, 0, 1, 0, 1]);
    assert!(decode_message(&buf).unwrap_err().is_format());
}

#[test]
fn test_forward_pointer_cycle_is_rejected() {
    let mut buf = header(1, 0);
    buf.extend_from_slice(&[0xc0, 0x0e, 0xc0, 0x0c, 0, 1, 0, 1]);
    assert!(decode_message(&buf).is_err());
}

#[test]
fn test_counts_beyond_data_are_bounds_errors() {
    let buf = header(1, 0);
    assert!(validate_message(&buf).unwrap_err().is_bounds());
    assert!(decode_message(&buf).unwrap_err().is_bounds());
}

/// One answer of `rtype` whose declared length is `rdlength`, followed by
/// the `rdata` bytes. A declared length shorter than the bytes leaves the
/// remainder as trailing data after the last section.
fn single_record(rtype: u16, rdlength: usize, rdata: &[u8]) -> Vec<u8> {
    let mut buf = header(1, 1);
    buf.extend_from_slice(b"\x01a\x00");
    buf.extend_from_slice(&rtype.to_be_bytes());
    buf.extend_from_slice(&[0, 1]);
    buf.extend_from_slice(&[0xc0, 0x0c]);
    buf.extend_from_slice(&rtype.to_be_bytes());
    buf.extend_from_slice(&[0, 1, 0, 0, 0, 60]);
    buf.extend_from_slice(&(rdlength as u16).to_be_bytes());
    buf.extend_from_slice(rdata);
    buf
}

/// Decodes `rdata` as declared, then one byte short and one byte long.
/// `extra` is the byte appended for the long case.
fn assert_exact_rdata(rtype: RecordType, rdata: &[u8], extra: u8) -> RData {
    let code = rtype.to_u16();
    let exact = decode_message(&single_record(code, rdata.len(), rdata))
        .unwrap_or_else(|e| panic!("{} exact: {}", rtype, e));
    assert_eq!(exact.answers[0].record_type, rtype);

    let short = decode_message(&single_record(code, rdata.len() - 1, rdata)).unwrap_err();
    assert!(short.is_format(), "{} short: {}", rtype, short);

    let mut long_rdata = rdata.to_vec();
    long_rdata.push(extra);
    let long = decode_message(&single_record(code, long_rdata.len(), &long_rdata)).unwrap_err();
    assert!(long.is_format(), "{} long: {}", rtype, long);

    exact.answers[0].rdata.clone()
}

#[test]
fn test_rdata_must_be_consumed_exactly() {
    let rdata = assert_exact_rdata(RecordType::MX, &[0, 10, 1, b'm', 0], 0xff);
    assert_eq!(
        rdata,
        RData::Mx {
            preference: 10,
            exchange: "m".to_string()
        }
    );
}

#[test]
fn test_address_rdata_lengths_are_exact() {
    let rdata = assert_exact_rdata(RecordType::A, &[192, 0, 2, 1], 0);
    assert_eq!(rdata, RData::A(Ipv4Addr::new(192, 0, 2, 1)));

    let mut v6 = [0u8; 16];
    v6[0] = 0x20;
    v6[1] = 0x01;
    v6[15] = 1;
    let rdata = assert_exact_rdata(RecordType::AAAA, &v6, 0);
    assert_eq!(rdata, RData::Aaaa(Ipv6Addr::from(v6)));
}

#[test]
fn test_single_name_rdata_must_end_at_rdlength() {
    // "ns" plus a pointer back to the question name "a"
    let target = b"\x02ns\xc0\x0c";
    for rtype in [RecordType::NS, RecordType::CNAME, RecordType::PTR] {
        let rdata = assert_exact_rdata(rtype, target, 0);
        assert_eq!(rdata.to_string(), "ns.a", "{}", rtype);
    }

    // uncompressed target: cutting the root label makes the name overrun
    for rtype in [RecordType::NS, RecordType::CNAME, RecordType::PTR] {
        assert_exact_rdata(rtype, b"\x02ns\x01a\x00", 0);
    }
}

#[test]
fn test_soa_rdata_must_be_consumed_exactly() {
    let mut rdata = b"\x02ns\xc0\x0c\x05admin\xc0\x0c".to_vec();
    for value in [2024u32, 3600, 600, 86400, 300] {
        rdata.extend_from_slice(&value.to_be_bytes());
    }
    match assert_exact_rdata(RecordType::SOA, &rdata, 0) {
        RData::Soa(soa) => {
            assert_eq!(soa.mname, "ns.a");
            assert_eq!(soa.rname, "admin.a");
            assert_eq!(soa.serial, 2024);
            assert_eq!(soa.minimum, 300);
        }
        other => panic!("expected SOA payload, got {:?}", other),
    }
}

#[test]
fn test_txt_string_may_not_overrun_rdata() {
    // a trailing non-zero byte starts a string longer than what is left
    let rdata = assert_exact_rdata(RecordType::TXT, b"\x05hello\x02hi", 3);
    assert_eq!(rdata, RData::Txt(vec![b"hello".to_vec(), b"hi".to_vec()]));
}

#[test]
fn test_nsec_rdata_must_be_consumed_exactly() {
    // next name "b.a", then window 0 with A and NS set
    let rdata = assert_exact_rdata(RecordType::NSEC, b"\x01b\x01a\x00\x00\x01\x60", 0);
    assert_eq!(rdata.to_string(), "b.a A NS");

    // the next name alone overrunning the declared length
    let short = decode_message(&single_record(RecordType::NSEC.to_u16(), 3, b"\x01b\x01a\x00"))
        .unwrap_err();
    assert!(short.is_format(), "{}", short);
}

#[test]
fn test_trailing_bytes_after_last_section_are_ignored() {
    let message: Message = MessageBuilder::new(4).question("example.org", "TXT").build();
    let (mut wire, _) = encode_to_vec(&message, PACKETSZ).unwrap();
    wire.extend_from_slice(&[0xde, 0xad]);
    assert_eq!(decode_message(&wire).unwrap(), message);
}
