//! CLI Command Implementations
//!
//! Each command loads a project into a fresh session, runs one operation
//! through the engine and prints a short report.

use std::path::Path;

use log::info;

use crate::config::EngineConfig;
use crate::engine::{PlaybackEngine, ResolvedFrame};
use crate::error::Result;
use crate::render::{Compositor, FilterStack, StillFrameSource};
use crate::state::{ProjectState, Session};

/// Load the engine configuration, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Open a project file into a new session.
pub fn open_session(path: &Path, config: EngineConfig) -> Result<Session> {
    let project = ProjectState::load(path)?;
    let mut session = Session::new(config);
    session.restore_project(project);
    Ok(session)
}

/// Directory media paths in the project are relative to.
fn project_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// List tracks, clips and the timeline extent.
pub fn inspect(path: &Path, config: EngineConfig) -> Result<()> {
    let session = open_session(path, config)?;
    let timeline = session.timeline();

    println!("Project: {}", path.display());
    println!("{:-<60}", "");
    for track in timeline.all_tracks() {
        let mut flags = Vec::new();
        if track.muted {
            flags.push("muted");
        }
        if track.locked {
            flags.push("locked");
        }
        println!(
            "[{}] {} ({}) {}",
            track.kind,
            track.name,
            track.id,
            flags.join(" ")
        );
        for clip in &track.clips {
            println!(
                "    {:<24} {:>6} {:>9.4}s - {:>9.4}s  source {:.4}-{:.4}",
                clip.id,
                clip.kind.to_string(),
                clip.start_time,
                clip.end_time(),
                clip.trim_start,
                clip.trim_end
            );
        }
    }
    println!("{:-<60}", "");
    println!(
        "Clips: {} | Extent: {:.2}s | Studio tracks: {}",
        timeline.clip_count(),
        session.max_time(),
        session.studio.tracks().len()
    );

    Ok(())
}

/// Resolve the timeline at `time`.
pub fn resolve(path: &Path, time: f64, config: EngineConfig) -> Result<()> {
    let mut session = open_session(path, config)?;
    let frame = seek_frame(&mut session, time);

    println!("Time: {:.4}s", frame.time);
    if frame.visuals.is_empty() {
        println!("Visible: none");
    }
    for visual in &frame.visuals {
        println!(
            "Visible  track {} ({}): {} fade {:.3} filter \"{}\"",
            visual.track_index,
            visual.track_id,
            visual.clip.id,
            visual.fade,
            FilterStack::for_clip(&visual.clip)
        );
    }
    match &frame.audio {
        Some(audio) => println!(
            "Audible  track {}: {} fade {:.3}",
            audio.track_id, audio.clip.id, audio.fade
        ),
        None => println!("Audible: none"),
    }

    Ok(())
}

/// Composite a still at `time` into a PNG.
pub fn render(path: &Path, time: f64, out: &Path, config: EngineConfig) -> Result<()> {
    info!("Rendering {} at {:.3}s", path.display(), time);

    let compositor = Compositor::from_config(&config);
    let mut session = open_session(path, config)?;
    let frame = seek_frame(&mut session, time);
    let mut source = StillFrameSource::new(project_dir(path));
    compositor.render_to_file(&frame, &mut source, out)?;

    let (w, h) = compositor.dimensions();
    println!(
        "Rendered {} layer(s) at {:.4}s to {} ({}x{})",
        frame.visuals.len(),
        frame.time,
        out.display(),
        w,
        h
    );

    Ok(())
}

/// Split `clip_id` at `time` and save.
pub fn split(
    path: &Path,
    clip_id: &str,
    time: f64,
    out: Option<&Path>,
    config: EngineConfig,
) -> Result<()> {
    let mut session = open_session(path, config)?;

    if !session.split_clip(clip_id, time) {
        println!("Split declined: {} cannot be split at {:.4}s", clip_id, time);
        return Ok(());
    }

    let target = out.unwrap_or(path);
    session.export_project().save(target)?;
    println!("Split {} at {:.4}s; saved {}", clip_id, time, target.display());

    Ok(())
}

/// Render the audio studio to a WAV file.
pub fn mixdown(path: &Path, out: &Path, seconds: Option<f64>, config: EngineConfig) -> Result<()> {
    let mut session = open_session(path, config)?;
    let total = session.studio.tracks().len();
    let loaded = session.studio.load_sources(project_dir(path));
    info!("Loaded {} of {} studio sources", loaded, total);

    session.studio.export_mixdown(out, seconds)?;
    println!(
        "Mixed {} track(s) ({} with audio) to {}",
        total,
        loaded,
        out.display()
    );

    Ok(())
}

fn seek_frame(session: &mut Session, time: f64) -> ResolvedFrame {
    let mut engine = PlaybackEngine::new(&session.config);
    engine.seek(session, time);
    engine.frame(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Clip, ClipKind, Timeline, TrackKind};
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_project(dir: &Path) -> std::path::PathBuf {
        let mut timeline = Timeline::with_default_tracks();
        let mut clip = Clip::new(ClipKind::Image, "red", 10.0).with_source("red.png");
        clip.id = "red".to_string();
        timeline.tracks_mut(TrackKind::Video)[0].clips.push(clip);

        RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]))
            .save(dir.join("red.png"))
            .unwrap();

        let path = dir.join("project.json");
        ProjectState::new(timeline, Vec::new()).save(&path).unwrap();
        path
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            canvas_width: 16,
            canvas_height: 9,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_load_config_defaults() {
        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
        let err = load_config(Some(Path::new("/nonexistent/cfg.json"))).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_split_writes_out() {
        let dir = tempdir().unwrap();
        let path = write_project(dir.path());
        let out = dir.path().join("split.json");

        split(&path, "red", 4.0, Some(&out), small_config()).unwrap();
        let session = open_session(&out, small_config()).unwrap();
        assert_eq!(session.timeline().clip_count(), 2);

        // The source project is untouched.
        let original = open_session(&path, small_config()).unwrap();
        assert_eq!(original.timeline().clip_count(), 1);
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempdir().unwrap();
        let path = write_project(dir.path());
        let out = dir.path().join("frame.png");

        render(&path, 2.0, &out, small_config()).unwrap();
        let img = image::open(&out).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (16, 9));
        assert_eq!(img.get_pixel(8, 4).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_inspect_and_resolve_run() {
        let dir = tempdir().unwrap();
        let path = write_project(dir.path());
        inspect(&path, small_config()).unwrap();
        resolve(&path, 1.0, small_config()).unwrap();
    }

    #[test]
    fn test_missing_project() {
        let err = inspect(Path::new("/nonexistent/project.json"), small_config()).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
