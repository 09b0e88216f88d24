//! # Scoped Scan Listener
//!
//! Binds a [`ScanFilter`] to the text surface that hosts the invoice form.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Listener Lifecycle                                 │
//! │                                                                         │
//! │  form opens ──► surface.attach(config, on_scan) ──► ScanGuard           │
//! │                          │                              │               │
//! │                          ▼                              │               │
//! │  key event ──► surface.dispatch(event)                  │               │
//! │                  ├── PassThrough → key reaches focused field            │
//! │                  └── Scanned(code) → default suppressed, on_scan(code)  │
//! │                                                         │               │
//! │  form closes / early return / unwind ──► drop(guard) ───┘               │
//! │                                           listener detached             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one listener is bound to a surface at a time.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopfront_core::{KeyDisposition, KeyEvent, ScanFilter, ScannerConfig};
use tracing::{debug, info};

use crate::error::{CheckoutError, CheckoutResult};

type ScanCallback = Arc<dyn Fn(&str) + Send + Sync>;

struct Binding {
    filter: ScanFilter,
    on_scan: ScanCallback,
}

type Slot = Arc<Mutex<Option<Binding>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Binding>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The hosting text surface that receives raw key events.
///
/// Cloning yields another handle to the same surface.
#[derive(Clone)]
pub struct InputSurface {
    name: String,
    slot: Slot,
}

impl InputSurface {
    pub fn new(name: impl Into<String>) -> Self {
        InputSurface {
            name: name.into(),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true while a [`ScanGuard`] is alive for this surface.
    pub fn is_attached(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Binds a scan listener for the lifetime of the returned guard.
    ///
    /// ## Errors
    /// `SurfaceBusy` if another guard is still alive.
    pub fn attach<F>(&self, config: ScannerConfig, on_scan: F) -> CheckoutResult<ScanGuard>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut slot = lock(&self.slot);
        if slot.is_some() {
            return Err(CheckoutError::SurfaceBusy(self.name.clone()));
        }

        *slot = Some(Binding {
            filter: ScanFilter::new(config),
            on_scan: Arc::new(on_scan),
        });
        info!(surface = %self.name, "Scan listener attached");

        Ok(ScanGuard {
            surface: self.name.clone(),
            slot: Arc::clone(&self.slot),
        })
    }

    /// Routes one key event through the attached filter.
    ///
    /// With no listener attached every key passes through. The scan
    /// callback runs after the surface lock is released, so it may call
    /// back into the surface.
    pub fn dispatch(&self, event: &KeyEvent) -> KeyDisposition {
        let (disposition, on_scan) = {
            let mut slot = lock(&self.slot);
            match slot.as_mut() {
                Some(binding) => (binding.filter.handle(event), Arc::clone(&binding.on_scan)),
                None => return KeyDisposition::PassThrough,
            }
        };

        if let KeyDisposition::Scanned(code) = &disposition {
            debug!(surface = %self.name, barcode = %code, "Dispatching scanned barcode");
            on_scan(code);
        }
        disposition
    }
}

impl fmt::Debug for InputSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSurface")
            .field("name", &self.name)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Keeps a scan listener bound to its surface; dropping it detaches.
#[must_use = "the listener is detached as soon as the guard is dropped"]
pub struct ScanGuard {
    surface: String,
    slot: Slot,
}

impl ScanGuard {
    /// Turns scan detection on or off without detaching.
    ///
    /// Either transition discards a partially accumulated buffer.
    pub fn set_enabled(&self, enabled: bool) {
        if let Some(binding) = lock(&self.slot).as_mut() {
            binding.filter.set_enabled(enabled);
            debug!(surface = %self.surface, enabled, "Scan detection toggled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        lock(&self.slot)
            .as_ref()
            .map(|binding| binding.filter.is_enabled())
            .unwrap_or(false)
    }
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        lock(&self.slot).take();
        info!(surface = %self.surface, "Scan listener detached");
    }
}

impl fmt::Debug for ScanGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanGuard").field("surface", &self.surface).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::{Key, Modifiers};
    use std::time::{Duration, Instant};

    fn collector() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |code: &str| sink.lock().unwrap().push(code.to_string()))
    }

    fn burst(surface: &InputSurface, code: &str, start: Instant) -> Vec<KeyDisposition> {
        let mut out = Vec::new();
        let mut t = start;
        for c in code.chars() {
            out.push(surface.dispatch(&KeyEvent::char(c, t)));
            t += Duration::from_millis(10);
        }
        out.push(surface.dispatch(&KeyEvent::enter(t)));
        out
    }

    #[test]
    fn test_unattached_surface_passes_through() {
        let surface = InputSurface::new("invoice-form");
        let out = burst(&surface, "8901234567890", Instant::now());
        assert!(out.iter().all(|d| *d == KeyDisposition::PassThrough));
    }

    #[test]
    fn test_scan_invokes_callback() {
        let surface = InputSurface::new("invoice-form");
        let (seen, on_scan) = collector();
        let _guard = surface.attach(ScannerConfig::default(), on_scan).unwrap();

        let out = burst(&surface, "8901234567890", Instant::now());

        assert_eq!(
            out.last(),
            Some(&KeyDisposition::Scanned("8901234567890".to_string()))
        );
        assert_eq!(*seen.lock().unwrap(), vec!["8901234567890".to_string()]);
    }

    #[test]
    fn test_second_attach_is_rejected() {
        let surface = InputSurface::new("invoice-form");
        let _guard = surface.attach(ScannerConfig::default(), |_| {}).unwrap();

        let err = surface.attach(ScannerConfig::default(), |_| {}).unwrap_err();
        assert!(matches!(err, CheckoutError::SurfaceBusy(name) if name == "invoice-form"));
    }

    #[test]
    fn test_drop_detaches() {
        let surface = InputSurface::new("invoice-form");
        let (seen, on_scan) = collector();

        {
            let _guard = surface.attach(ScannerConfig::default(), on_scan).unwrap();
            assert!(surface.is_attached());
        }

        assert!(!surface.is_attached());
        burst(&surface, "8901234567890", Instant::now());
        assert!(seen.lock().unwrap().is_empty());

        assert!(surface.attach(ScannerConfig::default(), |_| {}).is_ok());
    }

    #[test]
    fn test_unwinding_detaches() {
        let surface = InputSurface::new("invoice-form");
        let handle = surface.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = handle.attach(ScannerConfig::default(), |_| {}).unwrap();
            panic!("form crashed");
        });

        assert!(result.is_err());
        assert!(!surface.is_attached());
    }

    #[test]
    fn test_guard_toggles_detection() {
        let surface = InputSurface::new("invoice-form");
        let (seen, on_scan) = collector();
        let guard = surface.attach(ScannerConfig::default(), on_scan).unwrap();

        guard.set_enabled(false);
        assert!(!guard.is_enabled());
        let out = burst(&surface, "8901234567890", Instant::now());
        assert!(out.iter().all(|d| !d.suppresses_default()));

        guard.set_enabled(true);
        burst(&surface, "4006381333931", Instant::now());
        assert_eq!(*seen.lock().unwrap(), vec!["4006381333931".to_string()]);
    }

    #[test]
    fn test_callback_may_reenter_surface() {
        let surface = InputSurface::new("invoice-form");
        let handle = surface.clone();
        let attached = Arc::new(Mutex::new(None));
        let record = Arc::clone(&attached);

        let _guard = surface
            .attach(ScannerConfig::default(), move |_| {
                *record.lock().unwrap() = Some(handle.is_attached());
            })
            .unwrap();

        burst(&surface, "8901234", Instant::now());
        assert_eq!(*attached.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_typed_keys_reach_field() {
        let surface = InputSurface::new("invoice-form");
        let _guard = surface.attach(ScannerConfig::default(), |_| {}).unwrap();

        let t = Instant::now();
        let ctrl_a = KeyEvent::new(
            Key::Char('a'),
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
            t,
        );

        assert_eq!(surface.dispatch(&KeyEvent::char('1', t)), KeyDisposition::PassThrough);
        assert_eq!(surface.dispatch(&ctrl_a), KeyDisposition::PassThrough);
        assert_eq!(
            surface.dispatch(&KeyEvent::enter(t + Duration::from_millis(400))),
            KeyDisposition::PassThrough
        );
    }
}
