//! Win32 [`RegionPlatform`].
//!
//! Top-level windows are enumerated with `EnumWindows`. The input source of a
//! window is a `SetWindowSubclass` subclass that answers `WM_NCHITTEST` from a
//! process-wide table of caption and passthrough rectangles, keyed by HWND.
//! Setting regions only updates the table; the next hit test picks them up.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};

use titlebar_core::platform::{
    PlatformError, PlatformErrorKind, RegionKind, RegionPlatform, RegionSourceId, WindowId, WindowInfo,
};
use titlebar_core::register_region_platform;
use titlebar_core::types::PhysicalRect;
use tracing::{debug, warn};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::Graphics::Gdi::ScreenToClient;
use windows::Win32::UI::Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetParent, GetWindowThreadProcessId, HTCAPTION, HTCLIENT, IsWindow, IsWindowVisible, WM_NCDESTROY,
    WM_NCHITTEST,
};
use windows::core::BOOL;

use crate::hit_test::{NonClientHit, WindowRegions, screen_coordinates};

/// Identifier of our subclass in the per-window subclass chain.
const SUBCLASS_ID: usize = 0x7462_7074; // "tbpt"

// ---------------------------------------------------------------------------
//  HWND ↔ WindowId conversions
// ---------------------------------------------------------------------------

fn hwnd_from_id(id: WindowId) -> HWND {
    HWND(id.raw() as usize as *mut core::ffi::c_void)
}

fn id_from_hwnd(hwnd: HWND) -> WindowId {
    WindowId::new(hwnd.0 as usize as u64)
}

fn table_key(hwnd: HWND) -> usize {
    hwnd.0 as usize
}

// ---------------------------------------------------------------------------
//  Region table
// ---------------------------------------------------------------------------

fn table() -> MutexGuard<'static, HashMap<usize, WindowRegions>> {
    static TABLE: OnceLock<Mutex<HashMap<usize, WindowRegions>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new())).lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_regions<R>(source: RegionSourceId, f: impl FnOnce(&mut WindowRegions) -> R) -> Result<R, PlatformError> {
    let mut table = table();
    let key = usize::try_from(source.raw())
        .map_err(|_| PlatformError::new(PlatformErrorKind::OperationFailed, format!("invalid {source}")))?;
    table.get_mut(&key).map(f).ok_or_else(|| {
        PlatformError::new(PlatformErrorKind::WindowUnavailable, format!("{source} has no subclass installed"))
    })
}

// ---------------------------------------------------------------------------
//  Subclass procedure
// ---------------------------------------------------------------------------

fn classify(hwnd: HWND, lparam: LPARAM) -> Option<NonClientHit> {
    let (x, y) = screen_coordinates(lparam.0);
    let mut point = POINT { x, y };
    if !unsafe { ScreenToClient(hwnd, &mut point) }.as_bool() {
        return None;
    }
    table().get(&table_key(hwnd)).and_then(|regions| regions.hit_test(point.x, point.y))
}

unsafe extern "system" fn hit_test_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _subclass_id: usize,
    _ref_data: usize,
) -> LRESULT {
    match msg {
        WM_NCHITTEST => match classify(hwnd, lparam) {
            Some(NonClientHit::Client) => return LRESULT(HTCLIENT as isize),
            Some(NonClientHit::Caption) => return LRESULT(HTCAPTION as isize),
            None => {}
        },
        WM_NCDESTROY => {
            let _ = unsafe { RemoveWindowSubclass(hwnd, Some(hit_test_proc), SUBCLASS_ID) };
            table().remove(&table_key(hwnd));
            debug!(hwnd = table_key(hwnd), "region subclass removed");
        }
        _ => {}
    }
    unsafe { DefSubclassProc(hwnd, msg, wparam, lparam) }
}

// ---------------------------------------------------------------------------
//  Enumeration
// ---------------------------------------------------------------------------

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = unsafe { &mut *(lparam.0 as *mut Vec<WindowInfo>) };
    let mut process_id: u32 = 0;
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut process_id)) };
    let is_visible = unsafe { IsWindowVisible(hwnd) }.as_bool();
    let has_parent = unsafe { GetParent(hwnd) }.map(|parent| !parent.is_invalid()).unwrap_or(false);
    windows.push(WindowInfo { id: id_from_hwnd(hwnd), process_id, is_visible, has_parent });
    BOOL(1) // continue
}

// ---------------------------------------------------------------------------
//  RegionPlatform implementation
// ---------------------------------------------------------------------------

pub struct Win32RegionPlatform;

impl RegionPlatform for Win32RegionPlatform {
    fn name(&self) -> &'static str {
        "Win32"
    }

    fn current_process_id(&self) -> u32 {
        std::process::id()
    }

    fn top_level_windows(&self) -> Result<Vec<WindowInfo>, PlatformError> {
        let mut windows: Vec<WindowInfo> = Vec::new();
        unsafe { EnumWindows(Some(collect_window), LPARAM(&raw mut windows as isize)) }.map_err(|e| {
            warn!(error = %e, "EnumWindows failed");
            PlatformError::new(PlatformErrorKind::OperationFailed, format!("EnumWindows: {e}"))
        })?;
        Ok(windows)
    }

    fn input_source(&self, window: WindowId) -> Result<RegionSourceId, PlatformError> {
        let hwnd = hwnd_from_id(window);
        if !unsafe { IsWindow(Some(hwnd)) }.as_bool() {
            return Err(PlatformError::new(PlatformErrorKind::WindowUnavailable, format!("{window} was destroyed")));
        }

        // Re-installing with the same procedure and id only updates the reference data.
        if !unsafe { SetWindowSubclass(hwnd, Some(hit_test_proc), SUBCLASS_ID, 0) }.as_bool() {
            warn!(%window, "SetWindowSubclass failed");
            return Err(PlatformError::new(
                PlatformErrorKind::InputSourceUnavailable,
                format!("SetWindowSubclass failed for {window}"),
            ));
        }
        table().entry(table_key(hwnd)).or_default();
        Ok(RegionSourceId::new(window.raw()))
    }

    fn clear_regions(&self, source: RegionSourceId, kind: RegionKind) -> Result<(), PlatformError> {
        with_regions(source, |regions| regions.clear(kind))
    }

    fn set_regions(
        &self,
        source: RegionSourceId,
        kind: RegionKind,
        rects: &[PhysicalRect],
    ) -> Result<(), PlatformError> {
        with_regions(source, |regions| regions.replace(kind, rects))?;
        debug!(%source, %kind, count = rects.len(), "non-client regions updated");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
//  Registration
// ---------------------------------------------------------------------------

static PLATFORM: Win32RegionPlatform = Win32RegionPlatform;

register_region_platform!(&PLATFORM);
