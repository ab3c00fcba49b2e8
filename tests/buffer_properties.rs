//! End-to-end property tests for the buffer subsystem

use chunkbuf::error::{Error, Result};
use chunkbuf::{ByteSource, Loader, LoaderConfig, SourceSink, SourceWriter, StorageKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}

fn loader(kind: StorageKind, max: usize, chunk: usize) -> Loader {
    Loader::new(LoaderConfig::new(kind, max, chunk).expect("valid config"))
}

#[test]
fn round_trip_all_kind_and_chunk_combinations() -> Result<()> {
    init_tracing();

    // Lengths chosen to exercise single-chunk, exact-boundary and
    // trailing-short-chunk shapes
    let lengths = [1usize, 255, 256, 257, 1024, 10_000];
    for kind in [StorageKind::Heap, StorageKind::Direct] {
        for &len in &lengths {
            let data = random_bytes(len, len as u64);
            let source = loader(kind, 1 << 20, 256).load(&data[..])?;

            assert_eq!(source.len(), data.len());
            assert_eq!(source.read(), data);
            assert_eq!(source.kind(), kind);

            let expected_chunks = len.div_ceil(256);
            assert_eq!(source.chunk_count(), expected_chunks);
        }
    }
    Ok(())
}

#[test]
fn merge_is_idempotent_and_conserves_size() -> Result<()> {
    for kind in [StorageKind::Heap, StorageKind::Direct] {
        let data = random_bytes(5000, 7);
        let source = loader(kind, 1 << 20, 512).load(&data[..])?;
        let len = source.len();

        let once = source.merge();
        assert_eq!(once.len(), len);
        assert_eq!(once.chunk_count(), 1);

        let twice = once.clone().merge();
        assert_eq!(twice.chunk_count(), 1);
        assert_eq!(twice.read(), once.read());

        // Conservation under rechunk, for assorted thresholds
        for k in [1, 100, 512, 1024, 5000, 50_000] {
            let rechunked = loader(kind, 1 << 20, 512)
                .load(&data[..])?
                .rechunk(k)?;
            assert_eq!(rechunked.len(), len);
            assert_eq!(rechunked.read(), data);
        }
    }
    Ok(())
}

#[test]
fn storage_invariant_holds_across_conversions() -> Result<()> {
    let data = random_bytes(3000, 11);
    for kind in [StorageKind::Heap, StorageKind::Direct] {
        let source = loader(kind, 1 << 20, 1000).load(&data[..])?;
        assert!(source.is_heap() != source.is_direct());

        let heap = source.clone().to_heap(false);
        assert!(heap.is_heap() && !heap.is_direct());
        assert_eq!(heap.read(), data);

        let direct = source.to_direct(true);
        assert!(direct.is_direct() && !direct.is_heap());
        assert_eq!(direct.read(), data);
    }
    Ok(())
}

#[test]
fn overflow_scenario_returns_no_source() {
    let max = 1000;
    let data = vec![9u8; max + 1];
    let err = loader(StorageKind::Heap, max, 256)
        .load(&data[..])
        .unwrap_err();
    assert!(matches!(err, Error::Overflow(m) if m == max));
}

#[test]
fn exact_fit_scenario_succeeds() -> Result<()> {
    let max = 1000;
    let data = random_bytes(max, 13);
    let source = loader(StorageKind::Direct, max, 256).load(&data[..])?;
    assert_eq!(source.len(), max);
    assert_eq!(source.read(), data);
    Ok(())
}

#[test]
fn chunking_scenario_10k_at_4096() -> Result<()> {
    let data = random_bytes(10_000, 17);
    let source = loader(StorageKind::Heap, 1_000_000, 4096).load(&data[..])?;

    assert_eq!(source.len(), 10_000);
    assert_eq!(source.chunk_count(), 3);
    assert_eq!(source.chunk_size(), 4096);
    assert_eq!(source.read(), data);
    Ok(())
}

#[test]
fn sink_scenario_three_streams_in_order() -> Result<()> {
    init_tracing();

    let sink = SourceSink::new(LoaderConfig::new(StorageKind::Heap, 1 << 16, 1024)?);
    let payloads: Vec<Vec<u8>> = (0..3).map(|i| random_bytes(2000 + i, 19 + i as u64)).collect();

    for payload in &payloads {
        let stream = sink.open_stream();
        stream.write_bytes(payload)?;
        stream.close();
    }

    assert_eq!(sink.len(), 3);
    for payload in &payloads {
        let source = sink.try_next().expect("queued source");
        assert_eq!(&source.read(), payload);
    }
    assert!(sink.try_next().is_none());
    Ok(())
}

#[test]
fn empty_scenario_matches_shared_singleton() {
    for (kind, singleton) in [
        (StorageKind::Heap, ByteSource::EMPTY_HEAP),
        (StorageKind::Direct, ByteSource::EMPTY_DIRECT),
    ] {
        let writer = SourceWriter::new(
            LoaderConfig::new(kind, 64, 16).expect("valid config"),
        );
        let source = writer.close().expect("first close");
        assert_eq!(source.len(), 0);
        assert_eq!(source, singleton);
    }
}

#[test]
fn independent_streams_over_one_source() -> Result<()> {
    use std::io::Read;
    use std::sync::Arc;

    let data = random_bytes(8192, 23);
    let source = Arc::new(loader(StorageKind::Direct, 1 << 20, 1024).load(&data[..])?);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let source = Arc::clone(&source);
        let expected = data.clone();
        handles.push(std::thread::spawn(move || {
            let mut out = Vec::new();
            source
                .open_stream()
                .read_to_end(&mut out)
                .expect("in-memory read");
            assert_eq!(out, expected);
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    Ok(())
}

#[test]
fn loaded_source_survives_kind_round_trip() -> Result<()> {
    let data = random_bytes(6000, 29);
    let source = loader(StorageKind::Heap, 1 << 20, 700).load(&data[..])?;
    let chunk_count = source.chunk_count();

    let round_tripped = source.to_direct(false).to_heap(false);
    assert!(round_tripped.is_heap());
    assert_eq!(round_tripped.chunk_count(), chunk_count);
    assert_eq!(round_tripped.read(), data);
    Ok(())
}
