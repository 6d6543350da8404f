use std::fs;
use std::sync::Arc;
use std::time::Duration;

use clipmeter_core::PipelineConfig;
use clipmeter_engine::{
    FileTextSource, HeuristicTokenCounter, Pipeline, SourceError, TextSource,
};
use tempfile::TempDir;
use tokio::time::timeout;

#[tokio::test]
async fn reads_current_file_contents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("clip.txt");
    fs::write(&path, "hello file").unwrap();

    let source = FileTextSource::new(&path);
    assert_eq!(source.read_text().await.unwrap(), "hello file");

    fs::write(&path, "changed").unwrap();
    assert_eq!(source.read_text().await.unwrap(), "changed");
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let source = FileTextSource::new(temp.path().join("absent.txt"));
    let err = source.read_text().await.unwrap_err();
    assert!(matches!(err, SourceError::Io(_)));
}

#[tokio::test]
async fn pipeline_follows_file_edits() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("clip.txt");
    fs::write(&path, "initial").unwrap();

    let config = PipelineConfig {
        poll_interval: Duration::from_millis(5),
        ..PipelineConfig::default()
    };
    let mut pipeline = Pipeline::start(
        config,
        Arc::new(FileTextSource::new(&path)),
        Arc::new(HeuristicTokenCounter::new()),
    )
    .unwrap();

    // Give the monitor time to take its startup baseline.
    tokio::time::sleep(Duration::from_millis(50)).await;
    // Rename over the watched file so a poll never sees a half-written file.
    let staged = temp.path().join("clip.txt.tmp");
    fs::write(&staged, "edited, again").unwrap();
    fs::rename(&staged, &path).unwrap();

    let result = timeout(Duration::from_secs(5), pipeline.recv())
        .await
        .expect("result within deadline")
        .expect("pipeline running")
        .expect("analysis succeeded");
    assert_eq!(result.source_text, "edited, again");
    // "edited" -> 2, "," -> 1, "again" -> 2
    assert_eq!(result.token_count, 5);
    assert_eq!(result.word_count, 2);

    pipeline.shutdown().await;
}
