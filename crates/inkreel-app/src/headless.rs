//! Headless drawing: feed a recorded session through the coordinator onto a
//! software raster, then export stills or replay frames.

use crate::config::AppConfig;
use crate::error::AppResult;
use inkreel_core::{
    DrawingState, EntryId, HistoryView, RenderSurface, ReplayTick, Session, SessionError, Stroke,
    StrokeLog,
};
use inkreel_render::RasterSurface;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Read and validate a session file.
///
/// A bare stroke log (a JSON array of strokes) is accepted too; its canvas
/// size then comes from the configuration.
pub fn load_session(path: &Path) -> AppResult<Session> {
    let json = fs::read_to_string(path)?;
    let session = if json.trim_start().starts_with('[') {
        let log = StrokeLog::from_json(&json).map_err(SessionError::from)?;
        Session::new(0, 0, log)
    } else {
        Session::from_json(&json)?
    };
    log::info!(
        "Loaded {} stroke(s) from {:?} ({}x{})",
        session.strokes.len(),
        path,
        session.width,
        session.height
    );
    Ok(session)
}

/// Replay one recorded stroke as a live gesture: pointer down on the first
/// point, a move per remaining point, pointer up.
pub fn feed_stroke<S: RenderSurface>(state: &mut DrawingState<S>, stroke: &Stroke) -> Option<EntryId> {
    let (first, rest) = stroke.points.split_first()?;
    state.set_style(stroke.style.clone());
    state.start_stroke(*first);
    for point in rest {
        state.add_to_stroke(*point);
    }
    state.end_stroke()
}

/// Draw every stroke of `session` onto a fresh raster.
pub fn draw_session(session: &Session, config: &AppConfig) -> AppResult<DrawingState<RasterSurface>> {
    let (width, height) = config.canvas_size(session);
    let surface = RasterSurface::new(width, height)?;
    let mut state = DrawingState::with_config(surface, config.drawing_config());

    let mut skipped = 0;
    for stroke in &session.strokes {
        if feed_stroke(&mut state, stroke).is_none() {
            skipped += 1;
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {} stroke(s) with fewer than two points", skipped);
    }
    Ok(state)
}

/// Undo up to `steps` times. Returns how many steps were taken.
pub fn undo_steps<S: RenderSurface>(state: &mut DrawingState<S>, steps: usize) -> usize {
    (0..steps).take_while(|_| state.undo().is_some()).count()
}

/// Draw a session, step back `undo` states and encode the canvas as PNG.
pub fn render_png(session: &Session, config: &AppConfig, undo: usize) -> AppResult<Vec<u8>> {
    let mut state = draw_session(session, config)?;
    let undone = undo_steps(&mut state, undo);
    if undone < undo {
        log::warn!("Only {} of {} undo step(s) available", undone, undo);
    }
    Ok(state.surface().to_png(config.background)?)
}

/// How a replay is driven.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Sleep between steps to honour the configured delays.
    pub realtime: bool,
    /// Write a PNG into this directory after each stroke completes.
    pub frames_dir: Option<PathBuf>,
}

/// Outcome of [`replay_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub strokes: usize,
    pub frames: Vec<PathBuf>,
    pub cancelled: bool,
}

/// Draw a session, then replay its stroke log from a blank canvas.
///
/// Returns the coordinator with the replayed raster on its surface.
pub fn replay_session(
    session: &Session,
    config: &AppConfig,
    options: &ReplayOptions,
) -> AppResult<(DrawingState<RasterSurface>, ReplaySummary)> {
    let mut state = draw_session(session, config)?;
    let mut summary = ReplaySummary {
        strokes: state.strokes().len(),
        frames: Vec::new(),
        cancelled: false,
    };

    if let Some(dir) = &options.frames_dir {
        fs::create_dir_all(dir)?;
    }
    if !state.replay_strokes()? {
        log::info!("Nothing to replay");
        return Ok((state, summary));
    }

    let mut due = Instant::now();
    let mut finished_strokes = 0;
    loop {
        match state.step_replay() {
            ReplayTick::Wait(delay) => {
                let (done, _) = state.replay().progress();
                if done > finished_strokes {
                    finished_strokes = done;
                    if let Some(dir) = &options.frames_dir {
                        summary.frames.push(write_frame(&state, config, dir, done)?);
                    }
                }
                if options.realtime {
                    due += delay;
                    let now = Instant::now();
                    if due > now {
                        std::thread::sleep(due - now);
                    }
                }
            }
            ReplayTick::Finished => break,
            ReplayTick::Cancelled => {
                summary.cancelled = true;
                break;
            }
            ReplayTick::Idle => break,
        }
    }
    Ok((state, summary))
}

fn write_frame(
    state: &DrawingState<RasterSurface>,
    config: &AppConfig,
    dir: &Path,
    index: usize,
) -> AppResult<PathBuf> {
    let path = dir.join(format!("frame_{:04}.png", index));
    fs::write(&path, state.surface().to_png(config.background)?)?;
    log::debug!("Wrote frame {:?}", path);
    Ok(path)
}

/// Render the history list, one entry per line, current entry marked.
pub fn format_history(view: &HistoryView) -> String {
    let mut out = String::new();
    for entry in &view.entries {
        let marker = if entry.is_current { '*' } else { ' ' };
        out.push_str(&format!("{} {}\n", marker, entry.label()));
    }
    out.push_str(&format!(
        "undo: {}  redo: {}\n",
        if view.can_undo { "yes" } else { "no" },
        if view.can_redo { "yes" } else { "no" }
    ));
    out
}
