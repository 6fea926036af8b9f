use crate::OutputFormat;
use crate::util::{CliResult, paint_label, paint_ok, yes_no};
use clap::Args;
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use titlebar_core::platform::{RegionPlatform, WindowInfo};
use titlebar_runtime::{PassthroughSettings, RegionReconciler};

#[derive(Args, Debug, Clone)]
pub struct WindowsArgs {
    #[arg(
        long = "pid",
        required_unless_present = "all",
        help = "Process whose application window is selected. A console tool owns no top-level window of its own, \
                so pass the process of the app under inspection. With --all it defaults to this process."
    )]
    pub pid: Option<u32>,

    #[arg(long = "all", help = "List windows of every process, not only the selected one.")]
    pub all: bool,

    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct WindowSummary {
    id: String,
    process_id: u32,
    is_visible: bool,
    has_parent: bool,
    selected: bool,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct WindowListing {
    platform: &'static str,
    process_id: u32,
    windows: Vec<WindowSummary>,
}

pub fn run(platform: &Arc<dyn RegionPlatform>, args: &WindowsArgs) -> CliResult<String> {
    let listing = collect(platform, args)?;
    match args.format {
        OutputFormat::Text => Ok(render_text(&listing)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&listing)?),
    }
}

fn collect(platform: &Arc<dyn RegionPlatform>, args: &WindowsArgs) -> CliResult<WindowListing> {
    let process_id = args.pid.unwrap_or_else(|| platform.current_process_id());
    let reconciler =
        RegionReconciler::new(Arc::clone(platform), PassthroughSettings::default().with_process_id(process_id));
    let selected = reconciler.find_application_window().ok();

    let windows = platform
        .top_level_windows()?
        .into_iter()
        .filter(|info| args.all || info.process_id == process_id)
        .map(|info| WindowSummary::from_info(&info, selected == Some(info.id)))
        .collect();

    Ok(WindowListing { platform: platform.name(), process_id, windows })
}

impl WindowSummary {
    fn from_info(info: &WindowInfo, selected: bool) -> Self {
        Self {
            id: format!("0x{:x}", info.id.raw()),
            process_id: info.process_id,
            is_visible: info.is_visible,
            has_parent: info.has_parent,
            selected,
        }
    }
}

fn render_text(listing: &WindowListing) -> String {
    let mut output = String::new();
    let _ = writeln!(&mut output, "Platform: {} (target process {})", listing.platform, listing.process_id);
    if listing.windows.is_empty() {
        let _ = writeln!(&mut output, "Windows: none");
        return output.trim_end().to_owned();
    }

    let _ = writeln!(&mut output, "Windows:");
    for window in &listing.windows {
        let marker = if window.selected { paint_ok("*") } else { " ".to_owned() };
        let _ = writeln!(
            &mut output,
            "{marker} {} {} visible: {}, parent: {}",
            window.id,
            paint_label(&format!("pid={}", window.process_id)),
            yes_no(window.is_visible),
            yes_no(window.has_parent),
        );
    }
    output.trim_end().to_owned()
}
