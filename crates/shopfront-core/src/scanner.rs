//! # Scanner Input Disambiguation
//!
//! A hardware barcode scanner is a keyboard: it "types" the code and presses
//! Enter. The only thing separating it from a cashier is speed. This module
//! classifies a keystroke stream by timing alone.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            printable key                      printable key             │
//! │         (gap > threshold: clear first)     (append, stamp time)         │
//! │   ┌──────────┐ ──────────────────────► ┌──────────────┐ ◄──┐            │
//! │   │   Idle   │                         │ Accumulating │ ───┘            │
//! │   │ (empty)  │ ◄────────────────────── │  (buffer)    │                 │
//! │   └──────────┘        Enter            └──────────────┘                 │
//! │                                                                         │
//! │   On Enter:                                                             │
//! │     buffer ≥ min length → Scanned(buffer), suppress Enter's default    │
//! │     otherwise           → discard buffer, Enter passes through         │
//! │                                                                         │
//! │   Ctrl / Alt / Meta combos, function keys, arrows: ignored entirely.   │
//! │   Disabled: everything passes through, buffer untouched.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Typed characters are never swallowed; only the terminating Enter of a
//! recognized scan is consumed. Misclassification is an accepted risk kept
//! small by the gap and length thresholds, not an error.
//!
//! The filter never reads a clock. Each [`KeyEvent`] carries the instant the
//! host observed it, which keeps the gap check per-keystroke and testable.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::{DEFAULT_MAX_KEY_GAP_MS, DEFAULT_MIN_BARCODE_LEN};

// =============================================================================
// Key Events
// =============================================================================

/// A key as reported by the hosting surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A single character key.
    Char(char),
    /// The terminating key scanners send after the code.
    Enter,
    /// Anything else: Tab, arrows, F-keys, Escape...
    Other(String),
}

/// Modifier keys held during a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// True when the event is a shortcut rather than text (Shift alone is text).
    pub fn is_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// One raw keyboard event with the instant it was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers, timestamp: Instant) -> Self {
        KeyEvent {
            key,
            modifiers,
            timestamp,
        }
    }

    /// Unmodified character key.
    pub fn char(c: char, timestamp: Instant) -> Self {
        KeyEvent::new(Key::Char(c), Modifiers::default(), timestamp)
    }

    /// Unmodified Enter key.
    pub fn enter(timestamp: Instant) -> Self {
        KeyEvent::new(Key::Enter, Modifiers::default(), timestamp)
    }

    /// Returns the character if this is a printable, unmodified text key.
    fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !c.is_control() && !self.modifiers.is_command() => Some(c),
            _ => None,
        }
    }

    fn is_plain_enter(&self) -> bool {
        self.key == Key::Enter && !self.modifiers.is_command()
    }
}

/// What the host should do with an event after the filter saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Let the event propagate normally.
    PassThrough,
    /// A complete scan ended with this event; suppress the event's default
    /// action (form submit, focus move) and deliver the barcode.
    Scanned(String),
}

impl KeyDisposition {
    /// Whether the host must cancel the event's default action.
    pub fn suppresses_default(&self) -> bool {
        matches!(self, KeyDisposition::Scanned(_))
    }

    pub fn barcode(&self) -> Option<&str> {
        match self {
            KeyDisposition::Scanned(code) => Some(code),
            KeyDisposition::PassThrough => None,
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Tuning knobs for the scan heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Longest pause between two keystrokes of one burst.
    pub max_key_gap: Duration,
    /// Shortest buffer that counts as a barcode on Enter.
    pub min_barcode_len: usize,
    /// Whether interception starts enabled.
    pub enabled: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            max_key_gap: Duration::from_millis(DEFAULT_MAX_KEY_GAP_MS),
            min_barcode_len: DEFAULT_MIN_BARCODE_LEN,
            enabled: true,
        }
    }
}

// =============================================================================
// Scan Filter
// =============================================================================

/// Observable state of a [`ScanFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Accumulating,
}

/// Per-surface scanner session: the burst buffer and the last keystroke time.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    config: ScannerConfig,
    enabled: bool,
    buffer: String,
    last_keystroke: Option<Instant>,
}

impl ScanFilter {
    pub fn new(config: ScannerConfig) -> Self {
        ScanFilter {
            config,
            enabled: config.enabled,
            buffer: String::new(),
            last_keystroke: None,
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Suspends or resumes interception.
    ///
    /// Toggling drops any partial burst so a stale prefix cannot leak into
    /// the first scan after re-enabling.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!(enabled, "Scanner interception toggled");
            self.reset();
        }
        self.enabled = enabled;
    }

    pub fn state(&self) -> ScanState {
        if self.buffer.is_empty() {
            ScanState::Idle
        } else {
            ScanState::Accumulating
        }
    }

    /// Characters collected in the current burst.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Returns to `Idle`.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_keystroke = None;
    }

    /// Classifies one keystroke.
    pub fn handle(&mut self, event: &KeyEvent) -> KeyDisposition {
        if !self.enabled {
            return KeyDisposition::PassThrough;
        }

        if let Some(c) = event.printable() {
            self.accept_char(c, event.timestamp);
            return KeyDisposition::PassThrough;
        }

        if event.is_plain_enter() {
            return self.flush();
        }

        KeyDisposition::PassThrough
    }

    fn accept_char(&mut self, c: char, at: Instant) {
        if let Some(last) = self.last_keystroke {
            // Earlier-than-last timestamps count as no gap
            if at.saturating_duration_since(last) > self.config.max_key_gap && !self.buffer.is_empty() {
                trace!(discarded = %self.buffer, "Key gap exceeded, starting new burst");
                self.buffer.clear();
            }
        }
        self.buffer.push(c);
        self.last_keystroke = Some(at);
    }

    fn flush(&mut self) -> KeyDisposition {
        let buffer = std::mem::take(&mut self.buffer);
        self.last_keystroke = None;

        if buffer.chars().count() >= self.config.min_barcode_len {
            debug!(barcode = %buffer, "Scan burst completed");
            KeyDisposition::Scanned(buffer)
        } else {
            if !buffer.is_empty() {
                trace!(discarded = %buffer, "Enter after short buffer, not a scan");
            }
            KeyDisposition::PassThrough
        }
    }
}

impl Default for ScanFilter {
    fn default() -> Self {
        ScanFilter::new(ScannerConfig::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(base: Instant, offset: u64) -> Instant {
        base + Duration::from_millis(offset)
    }

    /// Feeds `keys` spaced `step` ms apart, returning the time of the last key.
    fn type_burst(filter: &mut ScanFilter, base: Instant, start: u64, step: u64, keys: &str) -> u64 {
        let mut t = start;
        for c in keys.chars() {
            assert_eq!(filter.handle(&KeyEvent::char(c, ms(base, t))), KeyDisposition::PassThrough);
            t += step;
        }
        t - step
    }

    #[test]
    fn test_fast_burst_then_enter_is_a_scan() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();

        let last = type_burst(&mut filter, base, 0, 10, "890123");
        assert_eq!(filter.state(), ScanState::Accumulating);

        let outcome = filter.handle(&KeyEvent::enter(ms(base, last + 10)));
        assert_eq!(outcome, KeyDisposition::Scanned("890123".to_string()));
        assert!(outcome.suppresses_default());
        assert_eq!(filter.state(), ScanState::Idle);
    }

    #[test]
    fn test_slow_typing_is_not_a_scan() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();

        filter.handle(&KeyEvent::char('a', ms(base, 0)));
        filter.handle(&KeyEvent::char('b', ms(base, 500)));
        assert_eq!(filter.buffer(), "b");

        let outcome = filter.handle(&KeyEvent::enter(ms(base, 510)));
        assert_eq!(outcome, KeyDisposition::PassThrough);
        assert!(!outcome.suppresses_default());
        assert_eq!(filter.state(), ScanState::Idle);
    }

    #[test]
    fn test_stray_prefix_is_dropped_before_burst() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();

        filter.handle(&KeyEvent::char('x', ms(base, 0)));
        let last = type_burst(&mut filter, base, 800, 5, "40061381");
        let outcome = filter.handle(&KeyEvent::enter(ms(base, last + 5)));

        assert_eq!(outcome.barcode(), Some("40061381"));
    }

    #[test]
    fn test_short_buffer_discarded_on_enter() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();

        let last = type_burst(&mut filter, base, 0, 5, "123");
        assert_eq!(filter.handle(&KeyEvent::enter(ms(base, last + 5))), KeyDisposition::PassThrough);
        assert_eq!(filter.buffer(), "");
    }

    #[test]
    fn test_minimum_length_boundary() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();

        let last = type_burst(&mut filter, base, 0, 5, "1234");
        assert_eq!(filter.handle(&KeyEvent::enter(ms(base, last + 5))).barcode(), Some("1234"));
    }

    #[test]
    fn test_disabled_filter_never_buffers() {
        let base = Instant::now();
        let mut filter = ScanFilter::new(ScannerConfig {
            enabled: false,
            ..ScannerConfig::default()
        });

        let last = type_burst(&mut filter, base, 0, 10, "890123");
        assert_eq!(filter.buffer(), "");
        assert_eq!(filter.handle(&KeyEvent::enter(ms(base, last + 10))), KeyDisposition::PassThrough);
    }

    #[test]
    fn test_toggling_drops_partial_burst() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();

        type_burst(&mut filter, base, 0, 5, "8901");
        filter.set_enabled(false);
        assert!(!filter.is_enabled());
        assert_eq!(filter.state(), ScanState::Idle);

        filter.set_enabled(true);
        let last = type_burst(&mut filter, base, 30, 5, "2345");
        assert_eq!(filter.handle(&KeyEvent::enter(ms(base, last + 5))).barcode(), Some("2345"));
    }

    #[test]
    fn test_modified_and_named_keys_are_ignored() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };

        type_burst(&mut filter, base, 0, 10, "890");
        filter.handle(&KeyEvent::new(Key::Char('v'), ctrl, ms(base, 30)));
        filter.handle(&KeyEvent::new(Key::Other("F5".into()), Modifiers::default(), ms(base, 35)));
        assert_eq!(filter.buffer(), "890");

        let outcome = filter.handle(&KeyEvent::new(Key::Enter, ctrl, ms(base, 40)));
        assert_eq!(outcome, KeyDisposition::PassThrough);
        assert_eq!(filter.buffer(), "890");
    }

    #[test]
    fn test_modified_key_does_not_restart_gap_timer() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };

        type_burst(&mut filter, base, 0, 10, "890");
        filter.handle(&KeyEvent::new(Key::Char('v'), ctrl, ms(base, 60)));

        // 80 ms after the '0', though only 40 ms after the Ctrl+V
        filter.handle(&KeyEvent::char('1', ms(base, 100)));
        assert_eq!(filter.buffer(), "1");
    }

    #[test]
    fn test_shifted_characters_are_text() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };

        for (i, c) in "ABC-12".chars().enumerate() {
            filter.handle(&KeyEvent::new(Key::Char(c), shift, ms(base, i as u64 * 8)));
        }
        assert_eq!(filter.handle(&KeyEvent::enter(ms(base, 50))).barcode(), Some("ABC-12"));
    }

    #[test]
    fn test_control_characters_are_ignored() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();

        filter.handle(&KeyEvent::char('\t', ms(base, 0)));
        assert_eq!(filter.state(), ScanState::Idle);
    }

    #[test]
    fn test_back_to_back_scans() {
        let base = Instant::now();
        let mut filter = ScanFilter::default();

        let last = type_burst(&mut filter, base, 0, 4, "11112222");
        assert_eq!(filter.handle(&KeyEvent::enter(ms(base, last + 4))).barcode(), Some("11112222"));

        let last = type_burst(&mut filter, base, last + 8, 4, "33334444");
        assert_eq!(filter.handle(&KeyEvent::enter(ms(base, last + 4))).barcode(), Some("33334444"));
    }

    #[test]
    fn test_custom_gap_threshold() {
        let base = Instant::now();
        let mut filter = ScanFilter::new(ScannerConfig {
            max_key_gap: Duration::from_millis(200),
            ..ScannerConfig::default()
        });

        let last = type_burst(&mut filter, base, 0, 150, "5678");
        assert_eq!(filter.handle(&KeyEvent::enter(ms(base, last + 10))).barcode(), Some("5678"));
    }
}
