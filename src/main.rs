use clap::Parser;
use peekaboo::capture::CaptureBackend;
use peekaboo::cli::{CheckArgs, Cli, Commands, ConfigArgs, RecordArgs};
use peekaboo::config::{self, AppConfig};
use peekaboo::error::{RecorderError, Result};
use peekaboo::ffmpeg_utils;
use peekaboo::output;
use peekaboo::profile::{AudioOptions, OutputFormat, RecordingOptions};
use peekaboo::region::CaptureRegion;
use peekaboo::session::SessionController;
use peekaboo::validation::{parse_geometry, validate_fps, validate_output_path, validate_region};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    log::debug!("🎥 Peekaboo v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Record(args) => record(args).await,
        Commands::Config(args) => configure(args),
        Commands::Check(args) => check(args),
    }
}

async fn record(args: RecordArgs) -> Result<()> {
    let cfg = config::load_config()?;

    let format: OutputFormat = args.format.as_deref().unwrap_or(cfg.format()).parse()?;
    let fps = args.fps.unwrap_or(cfg.fps());
    validate_fps(fps)?;

    let bounds = parse_geometry(&args.geometry)?;
    let region = if args.window {
        CaptureRegion::from_window_bounds(bounds)
    } else {
        CaptureRegion::from(bounds)
    };
    validate_region(&region)?;

    let options = RecordingOptions {
        format,
        frames_per_second: fps,
        show_cursor: !args.no_cursor && cfg.show_cursor(),
        audio: AudioOptions {
            capture_system_audio: args.system_audio || cfg.system_audio.unwrap_or(false),
            capture_microphone: args.mic || cfg.microphone.unwrap_or(false),
        },
    };

    let output_path = match args.output {
        Some(path) => {
            validate_output_path(&path)
                .map_err(|e| RecorderError::InvalidParameter(format!("{:#}", e)))?;
            path
        }
        None => {
            let dir = match cfg.output_dir.clone() {
                Some(dir) => dir,
                None => output::default_output_dir()?,
            };
            output::default_output_path(&dir, format)?
        }
    };

    let conversion_timeout = match cfg.gif_conversion_timeout_secs() {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let backend = CaptureBackend::from_env(args.ffmpeg_path.as_deref());
    let mut controller = SessionController::new(backend)
        .with_stop_timeout(Duration::from_secs(cfg.stop_timeout_secs()))
        .with_conversion_timeout(conversion_timeout);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C, stopping recording...");
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| RecorderError::ConfigError(format!("Failed to set Ctrl+C handler: {}", e)))?;

    let started_at = chrono::Utc::now();
    controller.start(region, &options, &output_path).await?;
    log::info!(
        "Recording {} (Ctrl+C to stop{})",
        output_path.display(),
        args.duration
            .map(|secs| format!(", or wait {} seconds", secs))
            .unwrap_or_default()
    );

    let started = Instant::now();
    let limit = args.duration.map(Duration::from_secs);
    while running.load(Ordering::SeqCst) {
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            log::info!("Duration reached, stopping recording...");
            break;
        }
        if !controller.is_active() {
            return Err(RecorderError::EncoderRuntimeFailure(
                "ffmpeg exited before the recording was stopped".to_string(),
            ));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    let elapsed = started.elapsed();
    let final_path = controller.stop().await.unwrap_or(output_path);
    let exists = final_path.exists();

    if args.json {
        let summary = serde_json::json!({
            "output": final_path,
            "exists": exists,
            "format": format,
            "fps": fps,
            "width": region.width(),
            "height": region.height(),
            "x": region.x(),
            "y": region.y(),
            "audio": options.audio,
            "started_at": started_at.to_rfc3339(),
            "duration_seconds": elapsed.as_secs_f64(),
        });
        println!("{}", summary);
    } else if exists {
        println!("✅ Recording saved to: {}", final_path.display());
    } else {
        println!("⚠️  Recording stopped but {} was not written", final_path.display());
    }

    Ok(())
}

fn configure(args: ConfigArgs) -> Result<()> {
    if args.clear {
        if config::clear_config()? {
            println!("Configuration cleared successfully.");
        } else {
            println!("No configuration file found. Nothing to clear.");
        }
        return Ok(());
    }

    let mut cfg = config::load_config()?;

    if args.is_empty() {
        let content = toml::to_string_pretty(&cfg)
            .map_err(|e| RecorderError::ConfigError(e.to_string()))?;
        println!("# {}", config::config_file_path()?.display());
        print!("{}", content);
        return Ok(());
    }

    if let Some(format) = &args.format {
        format.parse::<OutputFormat>()?;
    }
    if let Some(fps) = args.fps {
        validate_fps(fps)?;
    }

    cfg.merge(AppConfig {
        format: args.format,
        fps: args.fps,
        show_cursor: args.show_cursor,
        system_audio: args.system_audio,
        microphone: args.mic,
        output_dir: args.output_dir,
        stop_timeout_secs: args.stop_timeout,
        gif_conversion_timeout_secs: args.gif_timeout,
    });
    config::save_config(&cfg)?;
    println!("Configuration saved to: {}", config::config_file_path()?.display());
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    let ffmpeg = ffmpeg_utils::resolve_ffmpeg_binary(args.ffmpeg_path.as_deref());
    let version = ffmpeg_utils::validate_ffmpeg(&ffmpeg)?;
    println!("✅ {} ({})", version, ffmpeg.display());
    Ok(())
}
