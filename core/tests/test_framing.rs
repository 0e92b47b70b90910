#[cfg(test)]
mod tests {
    use particle_core::framing::{
        CompositeSieve, DelimitedSieve, FixedLengthSieve, Frame, Framer, Sieve, SieveError, SieveScan,
    };
    use proptest::prelude::*;

    fn slices(frames: &[Frame]) -> Vec<Vec<u8>> {
        frames.iter().map(|f| f.as_slice().to_vec()).collect()
    }

    #[test]
    fn fixed_length_keeps_incomplete_tail() {
        let mut framer = Framer::new(FixedLengthSieve::new(11));
        framer.feed(&[1u8; 25]);

        let frames = framer.drain();
        assert_eq!(frames.len(), 2);
        assert_eq!((frames[0].start, frames[0].end), (0, 11));
        assert_eq!((frames[1].start, frames[1].end), (11, 22));
        assert_eq!(framer.buffered(), 3);
        assert_eq!(framer.base_offset(), 22);

        framer.feed(&[2u8; 8]);
        let frames = framer.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!((frames[0].start, frames[0].end), (22, 33));
        assert_eq!(&frames[0].as_slice()[..3], &[1, 1, 1]);
        assert_eq!(framer.buffered(), 0);
        assert_eq!(framer.noise_bytes(), 0);
    }

    #[test]
    fn drain_on_empty_buffer_yields_nothing() {
        let mut framer = Framer::new(FixedLengthSieve::new(4));
        assert!(framer.drain().is_empty());
        framer.feed(&[0, 1]);
        assert!(framer.drain().is_empty());
        assert_eq!(framer.buffered(), 2);
    }

    #[test]
    fn base_offset_carries_into_frames() {
        let mut framer = Framer::with_base_offset(FixedLengthSieve::new(4), 100);
        framer.feed(&[9u8; 8]);
        let frames = framer.drain();
        assert_eq!((frames[0].start, frames[1].end), (100, 108));
        assert_eq!(framer.fed_offset(), 108);
    }

    #[test]
    fn sync_pattern_skips_leading_noise() {
        let sieve = FixedLengthSieve::new(4).with_sync(vec![0xA5]);
        let mut framer = Framer::new(sieve);
        framer.feed(&[0x00, 0x01, 0x02, 0xA5, 1, 2, 3, 0x07, 0xA5, 4, 5, 6]);

        let frames = framer.drain();
        assert_eq!(slices(&frames), vec![vec![0xA5, 1, 2, 3], vec![0xA5, 4, 5, 6]]);
        assert_eq!(frames[0].start, 3);
        assert_eq!(frames[1].start, 8);
        assert_eq!(framer.noise_bytes(), 4);
    }

    #[test]
    fn end_marker_terminates_framing() {
        let sieve = FixedLengthSieve::new(3).with_end_marker(vec![0xFF; 3]);
        let mut framer = Framer::new(sieve);
        framer.feed(&[1, 2, 3, 4, 5, 6, 0xFF, 0xFF, 0xFF, 7, 8, 9]);

        let frames = framer.drain();
        assert_eq!(frames.len(), 2);
        assert!(framer.is_terminated());

        framer.feed(&[10, 11, 12]);
        assert!(framer.drain().is_empty(), "nothing is framed past the marker");
    }

    #[test]
    fn delimited_frames_between_noise() {
        let mut framer = Framer::new(DelimitedSieve::new("<S>", "</S>").unwrap());
        framer.feed(b"xx<S>a=1</S>yy");

        let frames = framer.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_slice(), b"<S>a=1</S>");
        assert_eq!((frames[0].start, frames[0].end), (2, 12));
        assert_eq!(framer.noise_bytes(), 4);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn delimited_keeps_partial_start_pattern() {
        let mut framer = Framer::new(DelimitedSieve::new("<S>", "</S>").unwrap());
        framer.feed(b"ab<");
        assert!(framer.drain().is_empty());
        assert_eq!(framer.noise_bytes(), 2);
        assert_eq!(framer.buffered(), 1);

        framer.feed(b"S>k=v</S>");
        let frames = framer.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].start, 2);
        assert_eq!(frames[0].as_slice(), b"<S>k=v</S>");
    }

    #[test]
    fn delimited_rejects_empty_patterns() {
        assert_eq!(DelimitedSieve::new("", "</S>").err(), Some(SieveError::EmptyPattern("start")));
        assert_eq!(DelimitedSieve::new("<S>", Vec::<u8>::new()).err(), Some(SieveError::EmptyPattern("end")));
    }

    #[test]
    fn delimited_oversized_block_is_noise() {
        let sieve = DelimitedSieve::new("<", ">").unwrap().with_max_frame_len(4);
        let mut framer = Framer::new(sieve);
        framer.feed(b"<toolong><ok>");

        let frames = framer.drain();
        assert_eq!(slices(&frames), vec![b"<ok>".to_vec()]);
        assert_eq!(framer.noise_bytes(), 9);
    }

    #[test]
    fn composite_merges_members_in_stream_order() {
        let sieve = CompositeSieve::new()
            .push(DelimitedSieve::new("<S>", "</S>").unwrap())
            .push(FixedLengthSieve::new(4).with_sync(vec![0xA5]));

        let mut buf = vec![0xA5, 1, 2, 3];
        buf.extend_from_slice(b"<S>k=v</S>");
        buf.extend_from_slice(&[0xA5, 4, 5, 6]);

        let mut framer = Framer::new(sieve);
        framer.feed(&buf);
        let frames = framer.drain();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].as_slice(), &[0xA5, 1, 2, 3]);
        assert_eq!(frames[1].as_slice(), b"<S>k=v</S>");
        assert_eq!(frames[2].as_slice(), &[0xA5, 4, 5, 6]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn composite_higher_priority_wins_overlaps() {
        let sieve = CompositeSieve::new()
            .push(DelimitedSieve::new("<S>", "</S>").unwrap())
            .push(FixedLengthSieve::new(4));

        let mut buf = b"<S>a</S>".to_vec();
        buf.extend_from_slice(&[1, 2, 3, 4]);

        let scan: SieveScan = sieve.scan(&buf);
        assert_eq!(scan.ranges, vec![0..8, 8..12]);
        assert_eq!(scan.terminator, None);
    }

    #[test]
    fn composite_keeps_split_block_buffered() {
        let sieve = || {
            CompositeSieve::new()
                .push(DelimitedSieve::new("<S>", "</S>").unwrap())
                .push(FixedLengthSieve::new(4))
        };
        let mut data = b"<S>a</S>".to_vec();
        data.extend_from_slice(&[1, 2, 3, 4]);

        let mut whole = Framer::new(sieve());
        whole.feed(&data);
        let expected = slices(&whole.drain());
        assert_eq!(expected, vec![b"<S>a</S>".to_vec(), vec![1, 2, 3, 4]]);

        let mut split = Framer::new(sieve());
        split.feed(&data[..6]);
        assert!(split.drain().is_empty());
        assert_eq!(split.buffered(), 6);

        split.feed(&data[6..]);
        assert_eq!(slices(&split.drain()), expected);
        assert_eq!(split.noise_bytes(), 0);
    }

    #[test]
    fn composite_keeps_partial_start_pattern_buffered() {
        let sieve = CompositeSieve::new()
            .push(DelimitedSieve::new("<S>", "</S>").unwrap())
            .push(FixedLengthSieve::new(2));

        let scan = sieve.scan(&[9, 9, b'<']);
        assert_eq!(scan.ranges, vec![0..2]);
        assert_eq!(scan.noise_until, 0);
    }

    #[test]
    fn empty_composite_matches_nothing() {
        let sieve = CompositeSieve::default();
        assert!(sieve.is_empty());
        assert_eq!(sieve.scan(b"anything"), SieveScan::empty());
    }

    #[test]
    fn discard_counts_as_noise() {
        let mut framer = Framer::new(FixedLengthSieve::new(4));
        framer.feed(&[0u8; 6]);
        assert_eq!(framer.discard(2), 2);
        assert_eq!(framer.base_offset(), 2);
        assert_eq!(framer.noise_bytes(), 2);

        let frames = framer.drain();
        assert_eq!(frames[0].start, 2);
    }

    fn feed_in_chunks<S: Sieve>(framer: &mut Framer<S>, data: &[u8], cuts: &[usize]) -> Vec<Frame> {
        let mut cuts: Vec<usize> = cuts.iter().map(|c| c % (data.len() + 1)).collect();
        cuts.sort_unstable();
        cuts.push(data.len());

        let mut frames = Vec::new();
        let mut from = 0;
        for cut in cuts {
            framer.feed(&data[from..cut]);
            frames.extend(framer.drain());
            from = cut;
        }
        frames
    }

    proptest! {
        #[test]
        fn prop_fixed_length_chunking_invariant(
            data in prop::collection::vec(0u8..0xF0, 0..200),
            cuts in prop::collection::vec(any::<usize>(), 0..12),
        ) {
            let mut whole = Framer::new(FixedLengthSieve::new(7));
            whole.feed(&data);
            let expected = whole.drain();

            let mut chunked = Framer::new(FixedLengthSieve::new(7));
            let got = feed_in_chunks(&mut chunked, &data, &cuts);

            prop_assert_eq!(got, expected);
            prop_assert_eq!(chunked.buffered(), data.len() % 7);
        }

        #[test]
        fn prop_delimited_chunking_invariant(
            blocks in prop::collection::vec(("[a-z]{0,5}", "[a-z=]{0,6}"), 0..8),
            cuts in prop::collection::vec(any::<usize>(), 0..12),
        ) {
            let mut data = Vec::new();
            let mut noise = 0u64;
            for (junk, body) in &blocks {
                data.extend_from_slice(junk.as_bytes());
                noise += junk.len() as u64;
                data.extend_from_slice(b"<S>");
                data.extend_from_slice(body.as_bytes());
                data.extend_from_slice(b"</S>");
            }

            let mut framer = Framer::new(DelimitedSieve::new("<S>", "</S>").unwrap());
            let frames = feed_in_chunks(&mut framer, &data, &cuts);

            prop_assert_eq!(frames.len(), blocks.len());
            for (frame, (_, body)) in frames.iter().zip(&blocks) {
                let expected = format!("<S>{}</S>", body);
                prop_assert_eq!(frame.as_slice(), expected.as_bytes());
            }
            prop_assert_eq!(framer.noise_bytes(), noise);
            prop_assert_eq!(framer.buffered(), 0);
        }

        #[test]
        fn prop_composite_chunking_invariant(
            pieces in prop::collection::vec(
                prop_oneof![
                    "[a-z=]{0,6}".prop_map(|body| format!("<S>{}</S>", body).into_bytes()),
                    prop::collection::vec(0x80u8..0xA5, 3).prop_map(|mut tail| {
                        tail.insert(0, 0xA5);
                        tail
                    }),
                ],
                0..10,
            ),
            cuts in prop::collection::vec(any::<usize>(), 0..12),
        ) {
            let sieve = || {
                CompositeSieve::new()
                    .push(DelimitedSieve::new("<S>", "</S>").unwrap())
                    .push(FixedLengthSieve::new(4).with_sync(vec![0xA5]))
            };
            let data: Vec<u8> = pieces.concat();

            let mut whole = Framer::new(sieve());
            whole.feed(&data);
            let expected = whole.drain();
            prop_assert_eq!(slices(&expected), pieces.clone());

            let mut chunked = Framer::new(sieve());
            let got = feed_in_chunks(&mut chunked, &data, &cuts);

            prop_assert_eq!(got, expected);
            prop_assert_eq!(chunked.noise_bytes(), 0);
            prop_assert_eq!(chunked.buffered(), 0);
        }
    }
}
