mod common;

use common::{Track, frame, halves, packet_bits};
use dccrx::consts::{CAPTURE_CAPACITY, MAX_PACKET_LEN};
use dccrx::framer::FramerState;
use dccrx::receiver::DccReceiver;
use embedded_hal_mock::eh1::digital::Mock as PinMock;

fn receiver(keep_checksum: bool) -> DccReceiver<PinMock> {
    DccReceiver::new(PinMock::new(&[]), None, Some(keep_checksum))
}

#[test]
fn test_idle_packet_full_frame() {
    let mut rx = receiver(true);
    let mut track = Track::new(&mut rx, 0);
    track.packet(14, &[0xff, 0x00]);
    assert_eq!(track.completed, 1);

    let mut buf = [0; CAPTURE_CAPACITY];
    assert!(rx.available());
    assert_eq!(rx.read(&mut buf), 3);
    assert_eq!(&buf[..3], &[0xff, 0x00, 0xff]);
    rx.rx.done();
}

#[test]
fn test_idle_packet_payload_only() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);
    track.packet(14, &[0xff, 0x00]);

    let mut buf = [0; CAPTURE_CAPACITY];
    assert_eq!(rx.read(&mut buf), 2);
    assert_eq!(&buf[..2], &[0xff, 0x00]);
    rx.rx.done();
}

#[test]
fn test_round_trip_each_packet_size() {
    let payloads: [&[u8]; 4] = [
        &[0x03, 0x60],
        &[0x03, 0x3f, 0xb2],
        &[0xc1, 0x23, 0x3f, 0x95],
        &[0xc1, 0x23, 0xde, 0x00, 0x7e],
    ];
    let mut rx = receiver(false);
    let mut buf = [0; CAPTURE_CAPACITY];

    for payload in payloads {
        let mut track = Track::new(&mut rx, 5_000);
        track.packet(12, payload);
        assert_eq!(track.completed, 1);
        assert!(rx.available());
        assert_eq!(rx.read(&mut buf), payload.len());
        assert_eq!(&buf[..payload.len()], payload);
        assert!(!rx.available());
    }
    assert_eq!(rx.stats().packets_ok, 4);
    rx.rx.done();
}

#[test]
fn test_available_once_per_packet() {
    let mut rx = receiver(false);
    let mut buf = [0; CAPTURE_CAPACITY];
    let mut track = Track::new(&mut rx, 0);

    track.packet(14, &[0x03, 0x60]);
    assert!(track.receiver.available());
    assert_eq!(track.receiver.read(&mut buf), 2);
    assert!(!track.receiver.available());

    track.packet(14, &[0x03, 0x60]);
    assert!(track.receiver.available());
    assert_eq!(track.completed, 2);
    rx.rx.done();
}

#[test]
fn test_second_read_returns_zero() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);
    track.packet(14, &[0x05, 0x81]);

    let mut buf = [0; CAPTURE_CAPACITY];
    assert_eq!(rx.read(&mut buf), 2);
    let before = buf;
    assert_eq!(rx.read(&mut buf), 0);
    assert_eq!(buf, before);
    assert!(!rx.available());
    rx.rx.done();
}

#[test]
fn test_invalid_pulse_drops_only_that_packet() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);

    // Corrupt the first half of the fourth bit of the first byte
    let mut corrupted = halves(&packet_bits(14, &frame(&[0x03, 0x3f])));
    let index = 2 * (14 + 1 + 3);
    corrupted[index] = 75;
    track.halves(&corrupted);
    assert_eq!(track.completed, 0);
    assert!(!track.receiver.available());
    assert!(track.receiver.stats().timing_errors >= 1);

    track.packet(14, &[0x03, 0x40]);
    assert_eq!(track.completed, 1);

    let mut buf = [0; CAPTURE_CAPACITY];
    assert_eq!(rx.read(&mut buf), 2);
    assert_eq!(&buf[..2], &[0x03, 0x40]);
    rx.rx.done();
}

#[test]
fn test_noise_in_trailing_ones_drops_only_that_packet() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);

    // Corrupt the first half of the end bit, leaving its second half unpaired
    let mut corrupted = halves(&packet_bits(14, &frame(&[0x03, 0x3f])));
    let index = corrupted.len() - 2;
    corrupted[index] = 75;
    track.halves(&corrupted);
    assert_eq!(track.completed, 0);

    track.packet(14, &[0x03, 0x40]);
    assert_eq!(track.completed, 1);

    let mut buf = [0; CAPTURE_CAPACITY];
    assert_eq!(rx.read(&mut buf), 2);
    assert_eq!(&buf[..2], &[0x03, 0x40]);
    rx.rx.done();
}

#[test]
fn test_first_edge_mid_bit_still_captures() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);

    // Listening starts half a bit into the preamble
    track.half(58);
    track.packet(20, &[0x03, 0x60]);
    assert_eq!(track.completed, 1);

    let mut buf = [0; CAPTURE_CAPACITY];
    assert_eq!(rx.read(&mut buf), 2);
    assert_eq!(&buf[..2], &[0x03, 0x60]);
    assert_eq!(rx.stats().timing_errors, 0);
    rx.rx.done();
}

#[test]
fn test_bad_checksum_never_available() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);
    track.raw_packet(14, &[0x03, 0x60, 0x64]);

    assert_eq!(track.completed, 0);
    assert!(!rx.available());
    assert_eq!(rx.stats().checksum_errors, 1);
    rx.rx.done();
}

#[test]
fn test_unread_packet_overwritten() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);
    track.packet(14, &[0x03, 0x60]);
    track.packet(14, &[0x04, 0x70]);
    assert_eq!(track.completed, 2);

    let mut buf = [0; CAPTURE_CAPACITY];
    assert_eq!(rx.read(&mut buf), 2);
    assert_eq!(&buf[..2], &[0x04, 0x70]);
    assert_eq!(rx.read(&mut buf), 0);
    assert_eq!(rx.stats().overwritten, 1);
    rx.rx.done();
}

#[test]
fn test_idle_line_never_completes() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);
    track.bits(&vec![true; 20_000]);

    assert_eq!(track.completed, 0);
    assert!(!rx.available());
    assert_eq!(rx.state(), FramerState::SeekPacketStart);
    rx.rx.done();
}

#[test]
fn test_oversized_packet_rejected() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);
    track.packet(14, &[0x11; MAX_PACKET_LEN]);

    assert_eq!(track.completed, 0);
    assert!(!track.receiver.available());
    assert_eq!(track.receiver.stats().framing_errors, 1);

    track.packet(14, &[0x03, 0x60]);
    assert!(rx.available());
    rx.rx.done();
}

#[test]
fn test_small_host_buffer_truncates() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, 0);
    track.packet(14, &[0xc1, 0x23, 0x3f, 0x95]);

    let mut buf = [0; 2];
    assert_eq!(rx.read(&mut buf), 4);
    assert_eq!(buf, [0xc1, 0x23]);
    assert!(!rx.available());
    rx.rx.done();
}

#[test]
fn test_stretched_zero_and_jitter_accepted() {
    let mut rx = receiver(false);
    let mut track = Track::new(&mut rx, u32::MAX - 500);

    let mut durations = halves(&packet_bits(16, &frame(&[0x03, 0x60])));
    for d in durations.iter_mut() {
        *d = match *d {
            58 => 53,
            _ => 4_000,
        };
    }
    track.halves(&durations);
    assert_eq!(track.completed, 1);
    rx.rx.done();
}
