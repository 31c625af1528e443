//! Async compression tests.

#![cfg(all(feature = "async", unix))]

mod common;

use common::{FAILS, FakeFfmpeg, SUCCEEDS};
use videocompress::{CompressError, CompressOptions, CompressionSession, Compressor};

#[tokio::test(flavor = "multi_thread")]
async fn compress_async_succeeds() {
    let fake = FakeFfmpeg::new(SUCCEEDS);
    let compressor = Compressor::load_from(Some(fake.binary.clone())).unwrap();
    let mut session = CompressionSession::new(fake.output());
    session.set_input(fake.input());

    let report = session
        .compress_async(&compressor, CompressOptions::new().with_probe(false))
        .await
        .expect("Async compression failed");
    assert_eq!(report.output_size, 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn compress_async_propagates_failure() {
    let fake = FakeFfmpeg::new(FAILS);
    let compressor = Compressor::load_from(Some(fake.binary.clone())).unwrap();
    let mut session = CompressionSession::new(fake.output());
    session.set_input(fake.input());

    let result = session
        .compress_async(&compressor, CompressOptions::new().with_probe(false))
        .await;
    assert!(matches!(result, Err(CompressError::ExecutionFailed { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn compress_async_without_input() {
    let fake = FakeFfmpeg::new(SUCCEEDS);
    let compressor = Compressor::load_from(Some(fake.binary.clone())).unwrap();
    let session = CompressionSession::new(fake.output());

    let result = session
        .compress_async(&compressor, CompressOptions::new())
        .await;
    assert!(matches!(result, Err(CompressError::NoInputVideo)));
    assert!(!fake.was_invoked());
}
