#[cfg(test)]
mod tests {
    use particle_core::codec::{CodecError, CtdSample, FixedWidthCodec, RecordCodec, WfpCtdCodec};
    use particle_core::constants::EOP_MARKER;
    use particle_core::framing::{FixedLengthSieve, Framer};

    #[test]
    fn ctd_decodes_big_endian_fields() {
        let frame = [0x01, 0x02, 0x03, 0x00, 0x10, 0x00, 0x00, 0x00, 0x2A, 0x12, 0x34];
        let sample = WfpCtdCodec.decode(&frame, &mut ()).unwrap();
        assert_eq!(
            sample,
            CtdSample { conductivity: 0x010203, temperature: 0x001000, pressure: 42, oxygen: 0x1234 }
        );
        assert_eq!(sample.to_bytes(), frame);
        assert_eq!(WfpCtdCodec.record_size(), 11);
    }

    #[test]
    fn ctd_rejects_wrong_length() {
        let err = WfpCtdCodec.decode(&[0u8; 10], &mut ()).unwrap_err();
        assert_eq!(err, CodecError::LengthMismatch { expected: 11, actual: 10 });
    }

    #[test]
    fn ctd_rejects_marker_shaped_record() {
        let err = WfpCtdCodec.decode(&EOP_MARKER, &mut ()).unwrap_err();
        assert_eq!(err, CodecError::EndMarker);
    }

    #[test]
    fn ctd_truncates_wide_fields() {
        let sample = CtdSample { conductivity: 0x0A00_0001, temperature: 0, pressure: 0, oxygen: 0 };
        assert_eq!(&sample.to_bytes()[..3], &[0x00, 0x00, 0x01]);
    }

    #[test]
    fn ctd_frames_decode_in_order() {
        let samples: Vec<CtdSample> =
            (0..3).map(|i| CtdSample { conductivity: i, temperature: 2, pressure: 3, oxygen: 4 }).collect();
        let mut data: Vec<u8> = samples.iter().flat_map(|s| s.to_bytes()).collect();
        data.extend_from_slice(&EOP_MARKER);

        let sieve = FixedLengthSieve::new(WfpCtdCodec.record_size()).with_end_marker(EOP_MARKER.to_vec());
        let mut framer = Framer::new(sieve);
        framer.feed(&data);

        let decoded: Vec<CtdSample> =
            framer.drain().iter().map(|f| WfpCtdCodec.decode(f.as_slice(), &mut ()).unwrap()).collect();
        assert_eq!(decoded, samples);
        assert!(framer.is_terminated());
    }
}
