use std::sync::{Arc, Mutex};

use assert_fs::prelude::*;
use assert_fs::TempDir;
use async_trait::async_trait;

use subtrad::backend::TranslationBackend;
use subtrad::config::{Config, Device};
use subtrad::error::{Result, SubtradError};
use subtrad::workflow::{OutputFormat, Workflow};

#[derive(Default)]
struct Recorded {
    calls: Vec<String>,
    loads: usize,
    reloads: Vec<Device>,
}

/// Upper-cases text; anything containing `FAIL` errors
struct UppercaseBackend {
    recorded: Arc<Mutex<Recorded>>,
    device: Device,
}

#[async_trait]
impl TranslationBackend for UppercaseBackend {
    async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
        self.recorded.lock().unwrap().calls.push(text.to_string());
        if text.contains("FAIL") {
            return Err(SubtradError::Translation("refused".to_string()));
        }
        Ok(text.to_uppercase())
    }

    async fn load(&self) -> Result<()> {
        self.recorded.lock().unwrap().loads += 1;
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        Ok(())
    }

    async fn reload(&mut self, device: Device) -> Result<()> {
        self.recorded.lock().unwrap().reloads.push(device);
        self.device = device;
        Ok(())
    }

    fn device(&self) -> Device {
        self.device
    }
}

fn workflow() -> (Workflow, Arc<Mutex<Recorded>>) {
    let mut config = Config::default();
    config.detection.external = false;

    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let backend = UppercaseBackend {
        recorded: Arc::clone(&recorded),
        device: Device::Gpu,
    };
    (Workflow::with_backend(config, Box::new(backend)), recorded)
}

#[tokio::test]
async fn test_srt_to_srt_keeps_timing_and_newlines() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("movie.srt");
    input
        .write_str("1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nWorld\r\n")
        .unwrap();

    let (mut workflow, recorded) = workflow();
    let report = workflow
        .translate_file(input.path(), None, None, "es", None)
        .await
        .unwrap();

    assert_eq!(report.output, temp.child("movie.es.srt").path());
    assert_eq!(report.source_language, "en");
    assert_eq!(report.stats.translated, 2);
    assert_eq!(
        std::fs::read_to_string(&report.output).unwrap(),
        "1\r\n00:00:01,000 --> 00:00:02,000\r\nHELLO\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nWORLD\r\n\r\n"
    );
    assert_eq!(recorded.lock().unwrap().loads, 1);
}

#[tokio::test]
async fn test_txt_to_txt_preserves_lines() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("notes.txt");
    input.write_str("first line\r\n\r\nsecond FAIL line\nlast").unwrap();

    let (mut workflow, _) = workflow();
    let report = workflow
        .translate_file(input.path(), None, Some("en"), "de", None)
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(temp.child("notes.de.txt").path()).unwrap(),
        "FIRST LINE\r\n\r\nsecond FAIL line\nLAST"
    );
    assert_eq!(report.stats.translated, 2);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.skipped, 1);
}

#[tokio::test]
async fn test_legacy_encoding_is_written_back() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("cafe.txt");
    input.write_binary(b"caf\xe9\n").unwrap();

    let (mut workflow, _) = workflow();
    workflow
        .translate_file(input.path(), None, Some("fr"), "en", None)
        .await
        .unwrap();

    assert_eq!(std::fs::read(temp.child("cafe.en.txt").path()).unwrap(), b"CAF\xc9\n");
}

#[tokio::test]
async fn test_utf16_bom_is_written_back() {
    let temp = TempDir::new().unwrap();
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "hi\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let input = temp.child("wide.txt");
    input.write_binary(&bytes).unwrap();

    let (mut workflow, _) = workflow();
    workflow
        .translate_file(input.path(), None, Some("en"), "es", None)
        .await
        .unwrap();

    let mut expected = vec![0xFF, 0xFE];
    for unit in "HI\n".encode_utf16() {
        expected.extend_from_slice(&unit.to_le_bytes());
    }
    assert_eq!(std::fs::read(temp.child("wide.es.txt").path()).unwrap(), expected);
}

#[tokio::test]
async fn test_same_language_never_touches_the_backend() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("plain.txt");
    input.write_str("Nothing to do here.\n").unwrap();

    let (mut workflow, recorded) = workflow();
    workflow
        .translate_file(input.path(), None, None, "en", None)
        .await
        .unwrap();

    let recorded = recorded.lock().unwrap();
    assert!(recorded.calls.is_empty());
    assert_eq!(recorded.loads, 0);
    assert_eq!(
        std::fs::read_to_string(temp.child("plain.en.txt").path()).unwrap(),
        "Nothing to do here.\n"
    );
}

#[tokio::test]
async fn test_srt_to_txt_forces_txt_extension() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("show.srt");
    input
        .write_str("1\n00:00:01,000 --> 00:00:02,000\nOne.\n\n2\n00:00:02,000 --> 00:00:03,000\nTwo.\n")
        .unwrap();
    let requested = temp.child("result.srt");

    let (mut workflow, _) = workflow();
    let report = workflow
        .translate_file(input.path(), Some(requested.path()), Some("en"), "es", Some(OutputFormat::Txt))
        .await
        .unwrap();

    assert_eq!(report.output, temp.child("result.txt").path());
    assert_eq!(std::fs::read_to_string(&report.output).unwrap(), "ONE. TWO.");
}

#[tokio::test]
async fn test_txt_to_srt_synthesizes_cues() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("story.txt");
    input.write_str("Once upon a time. The end.").unwrap();

    let (mut workflow, _) = workflow();
    let report = workflow
        .translate_file(input.path(), None, Some("en"), "it", Some(OutputFormat::Srt))
        .await
        .unwrap();

    assert_eq!(report.output, temp.child("story.it.srt").path());
    assert_eq!(
        std::fs::read_to_string(&report.output).unwrap(),
        "1\n00:00:00,000 --> 00:00:03,000\nONCE UPON A TIME.\n\n2\n00:00:03,000 --> 00:00:06,000\nTHE END.\n\n"
    );
}

#[tokio::test]
async fn test_input_errors() {
    let temp = TempDir::new().unwrap();
    let (mut workflow, _) = workflow();

    let missing = workflow
        .translate_file(temp.child("missing.srt").path(), None, None, "es", None)
        .await;
    assert!(matches!(missing, Err(SubtradError::FileNotFound(_))));

    let video = temp.child("clip.mkv");
    video.write_str("not text").unwrap();
    let unsupported = workflow.translate_file(video.path(), None, None, "es", None).await;
    assert!(matches!(unsupported, Err(SubtradError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_detect_file_language() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("ru.srt");
    input
        .write_str("1\n00:00:01,000 --> 00:00:02,000\nПривет мир\n")
        .unwrap();
    let blank = temp.child("blank.txt");
    blank.write_str("\n\n").unwrap();

    let (workflow, _) = workflow();
    assert_eq!(workflow.detect_file_language(input.path()).await.unwrap(), "ru");
    assert_eq!(workflow.detect_file_language(blank.path()).await.unwrap(), "en");
}

#[tokio::test]
async fn test_process_directory() {
    let temp = TempDir::new().unwrap();
    temp.child("sub").create_dir_all().unwrap();
    temp.child("a.srt")
        .write_str("1\n00:00:01,000 --> 00:00:02,000\nHello\n")
        .unwrap();
    temp.child("a.es.srt")
        .write_str("1\n00:00:01,000 --> 00:00:02,000\nHola\n")
        .unwrap();
    temp.child("sub/b.txt").write_str("line one\nline two\n").unwrap();
    temp.child("broken.srt").write_str("no cues in here\n").unwrap();
    temp.child("readme.md").write_str("ignored\n").unwrap();
    let out = temp.child("out");

    let (mut workflow, recorded) = workflow();
    let summary = workflow
        .process_directory(temp.path(), Some(out.path()), Some("en"), "es", None)
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.stats.translated, 3);
    assert_eq!(
        std::fs::read_to_string(out.child("a.es.srt").path()).unwrap(),
        "1\n00:00:01,000 --> 00:00:02,000\nHELLO\n\n"
    );
    assert_eq!(
        std::fs::read_to_string(out.child("sub/b.es.txt").path()).unwrap(),
        "LINE ONE\nLINE TWO\n"
    );
    assert_eq!(recorded.lock().unwrap().loads, 1);
}

#[tokio::test]
async fn test_set_device_reloads_backend() {
    let (mut workflow, recorded) = workflow();

    workflow.set_device(Device::Cpu).await.unwrap();
    workflow.set_device(Device::Cpu).await.unwrap();

    assert_eq!(recorded.lock().unwrap().reloads, vec![Device::Cpu]);
    assert_eq!(workflow.config().backend.device, Device::Cpu);
}
