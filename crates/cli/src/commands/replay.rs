use crate::OutputFormat;
use crate::util::{CliResult, format_rects, paint_error, paint_label, paint_ok, paint_skip};
use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use titlebar_core::platform::{RegionKind, RegionSourceId};
use titlebar_core::types::{PhysicalRect, Rect};
use titlebar_platform_mock::{MOCK_APPLICATION_WINDOW, MockRegionPlatform};
use titlebar_runtime::{
    FromLayoutMetrics, FromVisual, LayoutMetrics, LayoutMetricsChanged, LayoutMetricsView, PassthroughHost,
    PassthroughSettings, PassthroughView, ReconcileOutcome, RectSource, SkipReason, ViewError, Visual, VisualView,
};

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(value_name = "SCRIPT", help = "JSON script with a `steps` array of view events.")]
    pub script: PathBuf,

    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(
        long = "geometry",
        value_enum,
        default_value_t = GeometryMode::Layout,
        help = "How views report their rectangle: layout frame or rendered visual."
    )]
    pub geometry: GeometryMode,

    #[arg(long = "no-color", help = "Disable ANSI colors in text output.")]
    pub no_color: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GeometryMode {
    #[default]
    Layout,
    Visual,
}

/// Replay input.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    /// Scale factor applied to every frame, `1.0` when omitted.
    #[serde(default = "default_scale")]
    pub scale_factor: f64,
    pub steps: Vec<ReplayEvent>,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ReplayEvent {
    /// Mount a component and attach a view with `rect` (logical units).
    Mount { id: String, rect: Rect },
    /// Move or resize the view and fire the layout notification.
    Layout { id: String, rect: Rect },
    /// Explicit unmount of the attached view.
    Unmount { id: String },
    /// Drop the handle, exercising the fallback cleanup.
    Drop { id: String },
    /// Make the view report itself stale and trigger a reconciliation.
    Invalidate { id: String },
    /// Show or hide the application window.
    Window { present: bool },
    /// Declare the draggable caption area (logical units).
    Caption { rects: Vec<Rect> },
}

impl ReplayEvent {
    fn describe(&self) -> String {
        match self {
            ReplayEvent::Mount { id, .. } => format!("mount {id}"),
            ReplayEvent::Layout { id, .. } => format!("layout {id}"),
            ReplayEvent::Unmount { id } => format!("unmount {id}"),
            ReplayEvent::Drop { id } => format!("drop {id}"),
            ReplayEvent::Invalidate { id } => format!("invalidate {id}"),
            ReplayEvent::Window { present: true } => "window shown".to_owned(),
            ReplayEvent::Window { present: false } => "window hidden".to_owned(),
            ReplayEvent::Caption { rects } => format!("caption {}", rects.len()),
        }
    }
}

/// Result of one replayed step.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub index: usize,
    pub event: String,
    pub outcome: String,
    pub registered: usize,
    pub applied: Vec<PhysicalRect>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<PhysicalRect>,
}

// Views ------------------------------------------------------------------------------------------

struct ScriptViewState {
    frame: Mutex<Rect>,
    scale_factor: f64,
    stale: AtomicBool,
}

#[derive(Clone)]
struct ScriptView(Arc<ScriptViewState>);

impl ScriptView {
    fn new(frame: Rect, scale_factor: f64) -> Self {
        Self(Arc::new(ScriptViewState { frame: Mutex::new(frame), scale_factor, stale: AtomicBool::new(false) }))
    }

    fn frame(&self) -> Rect {
        *self.0.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_frame(&self, frame: Rect) {
        *self.0.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = frame;
    }

    fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics::new(self.frame(), self.0.scale_factor)
    }

    fn check(&self) -> Result<(), ViewError> {
        if self.0.stale.load(Ordering::Acquire) { Err(ViewError::Stale) } else { Ok(()) }
    }
}

impl LayoutMetricsView for ScriptView {
    fn layout_metrics(&self) -> Result<LayoutMetrics, ViewError> {
        self.check()?;
        Ok(self.metrics())
    }
}

impl VisualView for ScriptView {
    fn visual(&self) -> Result<Visual, ViewError> {
        self.check()?;
        let frame = self.frame();
        Ok(Visual { offset: frame.origin(), size: frame.size(), scale_factor: self.0.scale_factor })
    }
}

struct Mounted {
    handle: PassthroughView,
    source: Arc<dyn RectSource>,
    view: ScriptView,
}

// Replay -----------------------------------------------------------------------------------------

pub fn run(args: &ReplayArgs) -> CliResult<String> {
    if args.no_color {
        owo_colors::set_override(false);
    }
    let script = load_script(&args.script)?;
    let records = replay(&script, args.geometry)?;
    match args.format {
        OutputFormat::Text => Ok(render_text(&records)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&records)?),
    }
}

pub fn load_script(path: &Path) -> CliResult<ReplayScript> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Runs `script` against a fresh mock platform and records the applied
/// passthrough set after every step.
pub fn replay(script: &ReplayScript, geometry: GeometryMode) -> CliResult<Vec<StepRecord>> {
    let platform = Arc::new(MockRegionPlatform::new());
    platform.add_application_window(MOCK_APPLICATION_WINDOW);
    let host = PassthroughHost::new(platform.clone(), PassthroughSettings::default());
    let source = RegionSourceId::new(MOCK_APPLICATION_WINDOW.raw());

    let mut mounted: HashMap<String, Mounted> = HashMap::new();
    let mut records = Vec::with_capacity(script.steps.len());

    for (offset, event) in script.steps.iter().enumerate() {
        let index = offset + 1;
        tracing::info!(step = index, event = %event.describe(), "replaying");
        let outcome = match event {
            ReplayEvent::Mount { id, rect } => {
                // Re-mounting an id drops the previous handle first.
                mounted.remove(id);
                let handle = host.mount();
                let view = ScriptView::new(*rect, script.scale_factor);
                let rect_source: Arc<dyn RectSource> = match geometry {
                    GeometryMode::Layout => Arc::new(FromLayoutMetrics(view.clone())),
                    GeometryMode::Visual => Arc::new(FromVisual(view.clone())),
                };
                let outcome = handle.attach(Arc::clone(&rect_source));
                mounted.insert(id.clone(), Mounted { handle, source: rect_source, view });
                StepOutcome::Reconciled(outcome)
            }
            ReplayEvent::Layout { id, rect } => {
                let entry = lookup(&mounted, id, index)?;
                let old = entry.view.metrics();
                entry.view.set_frame(*rect);
                let change = LayoutMetricsChanged { old, new: entry.view.metrics() };
                StepOutcome::Reconciled(entry.handle.on_layout_metrics_changed(&change))
            }
            ReplayEvent::Unmount { id } => {
                let entry = lookup(&mounted, id, index)?;
                entry.handle.unmount(&entry.source).map_or(StepOutcome::NoOp, StepOutcome::Reconciled)
            }
            ReplayEvent::Drop { id } => {
                let entry = mounted.remove(id).ok_or_else(|| unknown_view(id, index))?;
                let was_mounted = entry.handle.is_mounted();
                drop(entry);
                if was_mounted { StepOutcome::Released } else { StepOutcome::NoOp }
            }
            ReplayEvent::Invalidate { id } => {
                let entry = lookup(&mounted, id, index)?;
                entry.view.0.stale.store(true, Ordering::Release);
                StepOutcome::Reconciled(host.reconcile())
            }
            ReplayEvent::Window { present: true } => {
                platform.remove_window(MOCK_APPLICATION_WINDOW);
                platform.add_application_window(MOCK_APPLICATION_WINDOW);
                StepOutcome::Reconciled(host.reconcile())
            }
            ReplayEvent::Window { present: false } => {
                platform.remove_window(MOCK_APPLICATION_WINDOW);
                StepOutcome::Reconciled(host.reconcile())
            }
            ReplayEvent::Caption { rects } => {
                let rects: Vec<PhysicalRect> =
                    rects.iter().map(|rect| rect.to_physical(script.scale_factor)).collect();
                match host.set_caption(&rects) {
                    Ok(_) => StepOutcome::Caption,
                    Err(err) => StepOutcome::Reconciled(ReconcileOutcome::Failed(err)),
                }
            }
        };

        records.push(StepRecord {
            index,
            event: event.describe(),
            outcome: outcome.describe(),
            registered: host.registry().len(),
            applied: platform.regions(source, RegionKind::Passthrough),
            caption: platform.regions(source, RegionKind::Caption),
        });
    }

    Ok(records)
}

fn lookup<'a>(mounted: &'a HashMap<String, Mounted>, id: &str, index: usize) -> CliResult<&'a Mounted> {
    mounted.get(id).ok_or_else(|| unknown_view(id, index))
}

fn unknown_view(id: &str, index: usize) -> anyhow::Error {
    anyhow::anyhow!("step {index}: unknown view `{id}`")
}

enum StepOutcome {
    Reconciled(ReconcileOutcome),
    /// Handle dropped while mounted; the fallback cleanup reconciled.
    Released,
    Caption,
    NoOp,
}

impl StepOutcome {
    fn describe(&self) -> String {
        match self {
            StepOutcome::NoOp => "no-op".to_owned(),
            StepOutcome::Released => "released".to_owned(),
            StepOutcome::Caption => "caption set".to_owned(),
            StepOutcome::Reconciled(ReconcileOutcome::Applied(report)) => format!("applied {}", report.rects.len()),
            StepOutcome::Reconciled(ReconcileOutcome::Cleared(_)) => "cleared".to_owned(),
            StepOutcome::Reconciled(ReconcileOutcome::Skipped(reason)) => match reason {
                SkipReason::NoTopLevelWindow => "skipped: no window".to_owned(),
                SkipReason::InputSourceUnavailable => "skipped: no input source".to_owned(),
                SkipReason::ProviderUnmounted => "skipped: unmounted".to_owned(),
                SkipReason::Deferred => "skipped: deferred".to_owned(),
            },
            StepOutcome::Reconciled(ReconcileOutcome::Failed(err)) => format!("failed: {err}"),
        }
    }
}

fn paint_outcome(outcome: &str) -> String {
    if outcome.starts_with("applied") || matches!(outcome, "cleared" | "released" | "caption set") {
        paint_ok(outcome)
    } else if outcome.starts_with("failed") {
        paint_error(outcome)
    } else {
        paint_skip(outcome)
    }
}

pub(crate) fn render_text(records: &[StepRecord]) -> String {
    let mut output = String::new();
    for record in records {
        let _ = writeln!(
            &mut output,
            "[{}] {} -> {} {}",
            record.index,
            record.event,
            paint_outcome(&record.outcome),
            paint_label(&format!("(registered: {})", record.registered)),
        );
        if !record.caption.is_empty() {
            let _ = writeln!(&mut output, "    caption: {}", format_rects(&record.caption));
        }
        let _ = writeln!(&mut output, "    passthrough: {}", format_rects(&record.applied));
    }
    output.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    const SCENARIO: &str = r#"{
        "steps": [
            { "event": "mount", "id": "a", "rect": { "x": 10, "y": 10, "width": 50, "height": 20 } },
            { "event": "mount", "id": "b", "rect": { "x": 100, "y": 10, "width": 30, "height": 20 } },
            { "event": "unmount", "id": "a" },
            { "event": "layout", "id": "b", "rect": { "x": 100, "y": 50, "width": 30, "height": 20 } },
            { "event": "drop", "id": "a" },
            { "event": "drop", "id": "b" }
        ]
    }"#;

    fn parse(raw: &str) -> ReplayScript {
        serde_json::from_str(raw).unwrap()
    }

    #[rstest]
    #[case(GeometryMode::Layout)]
    #[case(GeometryMode::Visual)]
    fn scenario_tracks_live_views(#[case] geometry: GeometryMode) {
        let records = replay(&parse(SCENARIO), geometry).unwrap();

        let applied: Vec<_> = records.iter().map(|record| record.applied.clone()).collect();
        assert_eq!(
            applied,
            vec![
                vec![PhysicalRect::new(10, 10, 50, 20)],
                vec![PhysicalRect::new(10, 10, 50, 20), PhysicalRect::new(100, 10, 30, 20)],
                vec![PhysicalRect::new(100, 10, 30, 20)],
                vec![PhysicalRect::new(100, 50, 30, 20)],
                vec![PhysicalRect::new(100, 50, 30, 20)],
                vec![],
            ]
        );
        assert_eq!(records[4].outcome, "no-op");
        assert_eq!(records[5].outcome, "released");
        assert_eq!(records[5].registered, 0);
    }

    #[test]
    fn scale_factor_applies_to_frames() {
        let script = parse(
            r#"{ "scaleFactor": 1.5, "steps": [
                { "event": "mount", "id": "a", "rect": { "x": 10, "y": 10, "width": 50, "height": 20 } }
            ] }"#,
        );
        let records = replay(&script, GeometryMode::Layout).unwrap();
        assert_eq!(records[0].applied, vec![PhysicalRect::new(15, 15, 75, 30)]);
    }

    #[test]
    fn hidden_window_skips_and_keeps_last_set() {
        let script = parse(
            r#"{ "steps": [
                { "event": "mount", "id": "a", "rect": { "x": 10, "y": 10, "width": 50, "height": 20 } },
                { "event": "window", "present": false },
                { "event": "invalidate", "id": "a" },
                { "event": "window", "present": true }
            ] }"#,
        );
        let records = replay(&script, GeometryMode::Layout).unwrap();
        assert_eq!(records[1].outcome, "skipped: no window");
        assert_eq!(records[2].applied, vec![PhysicalRect::new(10, 10, 50, 20)]);
        assert_eq!(records[3].outcome, "cleared");
        assert!(records[3].applied.is_empty());
    }

    #[test]
    fn caption_is_kept_across_passthrough_changes() {
        let script = parse(
            r#"{ "scaleFactor": 2.0, "steps": [
                { "event": "caption", "rects": [ { "x": 0, "y": 0, "width": 400, "height": 16 } ] },
                { "event": "mount", "id": "a", "rect": { "x": 350, "y": 0, "width": 50, "height": 16 } },
                { "event": "unmount", "id": "a" }
            ] }"#,
        );
        let records = replay(&script, GeometryMode::Layout).unwrap();

        assert_eq!(records[0].outcome, "caption set");
        assert!(records.iter().all(|record| record.caption == vec![PhysicalRect::new(0, 0, 800, 32)]));
        assert_eq!(records[1].applied, vec![PhysicalRect::new(700, 0, 100, 32)]);
        assert!(records[2].applied.is_empty());
    }

    #[test]
    fn unknown_view_is_an_error() {
        let script = parse(r#"{ "steps": [ { "event": "unmount", "id": "ghost" } ] }"#);
        let err = replay(&script, GeometryMode::Layout).unwrap_err();
        assert_eq!(err.to_string(), "step 1: unknown view `ghost`");
    }

    #[test]
    fn run_reads_script_and_renders_json() {
        let dir = tempdir().expect("temp");
        let path = dir.path().join("script.json");
        fs::write(&path, SCENARIO).unwrap();
        let args =
            ReplayArgs { script: path, format: OutputFormat::Json, geometry: GeometryMode::Layout, no_color: true };

        let output = run(&args).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(6));
        assert_eq!(value[0]["applied"][0], serde_json::json!({ "x": 10, "y": 10, "width": 50, "height": 20 }));
    }

    #[test]
    fn run_reports_missing_script() {
        let dir = tempdir().expect("temp");
        let args = ReplayArgs {
            script: dir.path().join("missing.json"),
            format: OutputFormat::Text,
            geometry: GeometryMode::Layout,
            no_color: true,
        };
        assert!(run(&args).unwrap_err().to_string().starts_with("reading "));
    }

    #[test]
    fn render_text_lists_steps() {
        let records = vec![StepRecord {
            index: 1,
            event: "mount a".into(),
            outcome: "applied 1".into(),
            registered: 1,
            applied: vec![PhysicalRect::new(10, 10, 50, 20)],
            caption: vec![],
        }];
        let text = render_text(&records);
        assert!(text.contains("[1] mount a -> "));
        assert!(text.ends_with("passthrough: (10, 10, 50x20)"));
    }
}
