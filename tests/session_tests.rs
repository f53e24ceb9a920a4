/// Session controller tests against stand-in encoders.
///
/// The fake encoders are small shell scripts that behave like ffmpeg where it matters:
/// the last argument is the output file, SIGINT makes a capture finish its file, and
/// a `-vf` invocation is a conversion pass that writes its output and exits. A capture
/// creates its empty output only after its SIGINT handler is installed.
#[cfg(unix)]
mod session_tests {
    use peekaboo::capture::CaptureBackend;
    use peekaboo::error::RecorderError;
    use peekaboo::output::intermediate_path;
    use peekaboo::profile::{AudioOptions, OutputFormat, RecordingOptions};
    use peekaboo::region::CaptureRegion;
    use peekaboo::session::SessionController;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::OnceLock;
    use std::time::Duration;
    use tempfile::TempDir;

    const WELL_BEHAVED: &str = r#"#!/bin/sh
for last in "$@"; do :; done
case " $* " in
  *" -vf "*) echo gif > "$last"; exit 0 ;;
esac
trap 'echo video > "$last"; exit 0' INT
: > "$last"
while :; do sleep 0.05; done
"#;

    const FAILING_CONVERSION: &str = r#"#!/bin/sh
for last in "$@"; do :; done
case " $* " in
  *" -vf "*) exit 1 ;;
esac
trap 'echo video > "$last"; exit 0' INT
: > "$last"
while :; do sleep 0.05; done
"#;

    const IGNORES_INTERRUPT: &str = r#"#!/bin/sh
trap '' INT
while :; do sleep 0.05; done
"#;

    const CRASHES: &str = r#"#!/bin/sh
exit 3
"#;

    struct FakeEncoders {
        _dir: TempDir,
        well_behaved: PathBuf,
        failing_conversion: PathBuf,
        ignores_interrupt: PathBuf,
        crashes: PathBuf,
    }

    /// Scripts are written once, before any test spawns a process.
    fn encoders() -> &'static FakeEncoders {
        static ENCODERS: OnceLock<FakeEncoders> = OnceLock::new();
        ENCODERS.get_or_init(|| {
            let dir = tempfile::tempdir().unwrap();
            let write = |name: &str, body: &str| {
                let path = dir.path().join(name);
                std::fs::write(&path, body).unwrap();
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
                path
            };
            FakeEncoders {
                well_behaved: write("ffmpeg-ok", WELL_BEHAVED),
                failing_conversion: write("ffmpeg-bad-gif", FAILING_CONVERSION),
                ignores_interrupt: write("ffmpeg-stuck", IGNORES_INTERRUPT),
                crashes: write("ffmpeg-crash", CRASHES),
                _dir: dir,
            }
        })
    }

    fn controller(encoder: &Path) -> SessionController {
        SessionController::new(CaptureBackend::new(encoder, ":0.0"))
            .with_stop_timeout(Duration::from_secs(10))
            .with_conversion_timeout(Some(Duration::from_secs(10)))
    }

    fn options(format: OutputFormat) -> RecordingOptions {
        RecordingOptions {
            format,
            frames_per_second: 30,
            show_cursor: true,
            audio: AudioOptions::NONE,
        }
    }

    fn region() -> CaptureRegion {
        CaptureRegion::new(0, 0, 801, 601)
    }

    async fn wait_for(path: &Path) {
        for _ in 0..100 {
            if path.exists() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("{} never appeared", path.display());
    }

    #[tokio::test]
    async fn test_mp4_session_finalizes_on_stop() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("clip.mp4");
        let mut controller = controller(&encoders().well_behaved);

        controller
            .start(region(), &options(OutputFormat::Mp4), &output)
            .await
            .unwrap();
        assert!(controller.is_active());
        wait_for(&output).await;

        let stopped = controller.stop().await;
        assert_eq!(stopped, Some(output.clone()));
        assert!(!controller.is_active());
        assert_eq!(std::fs::read_to_string(&output).unwrap().trim(), "video");
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first.mp4");
        let second = tmp.path().join("second.mp4");
        let mut controller = controller(&encoders().well_behaved);

        controller
            .start(region(), &options(OutputFormat::Mp4), &first)
            .await
            .unwrap();
        wait_for(&first).await;
        let err = controller
            .start(region(), &options(OutputFormat::Webm), &second)
            .await
            .unwrap_err();

        assert!(matches!(err, RecorderError::AlreadyRecording));
        assert!(controller.is_active());
        assert!(!second.exists());

        // The first session is still the one that gets stopped.
        assert_eq!(controller.stop().await, Some(first.clone()));
        assert_eq!(std::fs::read_to_string(&first).unwrap().trim(), "video");
    }

    #[tokio::test]
    async fn test_gif_session_converts_and_removes_intermediate() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("clip.gif");
        let intermediate = intermediate_path(&output);
        assert!(intermediate.to_string_lossy().contains(".tmp"));
        let mut controller = controller(&encoders().well_behaved);

        controller
            .start(region(), &options(OutputFormat::Gif), &output)
            .await
            .unwrap();
        wait_for(&intermediate).await;
        assert!(!output.exists());

        assert_eq!(controller.stop().await, Some(output.clone()));
        assert_eq!(std::fs::read_to_string(&output).unwrap().trim(), "gif");
        assert!(!intermediate.exists());
    }

    #[tokio::test]
    async fn test_failed_gif_conversion_still_stops_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("clip.gif");
        let intermediate = intermediate_path(&output);
        let mut controller = controller(&encoders().failing_conversion);

        controller
            .start(region(), &options(OutputFormat::Gif), &output)
            .await
            .unwrap();
        wait_for(&intermediate).await;

        assert_eq!(controller.stop().await, Some(output.clone()));
        assert!(!controller.is_active());
        assert!(!output.exists());
        assert!(!intermediate.exists());
    }

    #[tokio::test]
    async fn test_stuck_encoder_is_killed_after_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("clip.mp4");
        let mut controller = SessionController::new(CaptureBackend::new(
            &encoders().ignores_interrupt,
            ":0.0",
        ))
        .with_stop_timeout(Duration::from_millis(300));

        controller
            .start(region(), &options(OutputFormat::Mp4), &output)
            .await
            .unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(10), controller.stop())
            .await
            .expect("stop should be bounded by the stop timeout");
        assert_eq!(stopped, Some(output));
        assert!(!controller.is_active());
    }

    #[tokio::test]
    async fn test_crashed_encoder_returns_controller_to_idle() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("clip.mp4");
        let mut controller = controller(&encoders().crashes);

        controller
            .start(region(), &options(OutputFormat::Mp4), &output)
            .await
            .unwrap();

        let mut active = true;
        for _ in 0..100 {
            active = controller.is_active();
            if !active {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!active);
        assert_eq!(controller.stop().await, None);

        // A new session can start once the crashed one has been reaped.
        let restarted = controller
            .start(region(), &options(OutputFormat::Mp4), &output)
            .await;
        assert!(restarted.is_ok());
        assert_eq!(controller.stop().await, Some(output));
    }
}
