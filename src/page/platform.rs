use std::collections::VecDeque;

use super::Page;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub title: String,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub level: ConsoleLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub(crate) struct PlatformMockState {
    pub(crate) clipboard_text: String,
    pub(crate) alert_messages: Vec<String>,
    pub(crate) print_count: usize,
    pub(crate) share_supported: bool,
    pub(crate) share_requests: Vec<ShareRequest>,
    pub(crate) load_event_start_ms: i64,
    pub(crate) load_event_end_ms: i64,
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) timers: bool,
    pub(crate) search: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            timers: true,
            search: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

impl Page {
    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.logs.drain(..).collect()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_state.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_state.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_state.timers = enabled;
    }

    pub fn set_trace_search(&mut self, enabled: bool) {
        self.trace_state.search = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidArgument(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_state.log_limit = max_entries;
        while self.trace_state.logs.len() > self.trace_state.log_limit {
            self.trace_state.logs.pop_front();
        }
        Ok(())
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.timers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_search_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.search {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace_state.to_stderr {
            eprintln!("{line}");
        }
        if self.trace_state.logs.len() >= self.trace_state.log_limit {
            self.trace_state.logs.pop_front();
        }
        self.trace_state.logs.push_back(line);
    }

    pub(crate) fn console_log(&mut self, message: impl Into<String>) {
        self.console.push(ConsoleEntry {
            level: ConsoleLevel::Log,
            message: message.into(),
        });
    }

    pub(crate) fn console_error(&mut self, message: impl Into<String>) {
        self.console.push(ConsoleEntry {
            level: ConsoleLevel::Error,
            message: message.into(),
        });
    }

    pub fn console_entries(&self) -> &[ConsoleEntry] {
        &self.console
    }

    pub fn take_console(&mut self) -> Vec<ConsoleEntry> {
        std::mem::take(&mut self.console)
    }

    /// Logged messages only, without errors.
    pub fn console_messages(&self) -> Vec<&str> {
        self.console
            .iter()
            .filter(|entry| entry.level == ConsoleLevel::Log)
            .map(|entry| entry.message.as_str())
            .collect()
    }

    pub fn console_errors(&self) -> Vec<&str> {
        self.console
            .iter()
            .filter(|entry| entry.level == ConsoleLevel::Error)
            .map(|entry| entry.message.as_str())
            .collect()
    }

    /// From here on, failing handlers and timer tasks are logged as console
    /// errors instead of failing the user action that triggered them.
    pub fn install_error_hook(&mut self) {
        self.error_hook = true;
    }

    pub fn error_hook_installed(&self) -> bool {
        self.error_hook
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.rng_state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
    }

    pub(crate) fn next_random_f64(&mut self) -> f64 {
        // xorshift64*
        let mut x = self.rng_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng_state = if x == 0 { 0xA5A5_A5A5_A5A5_A5A5 } else { x };
        let out = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
        // Top 53 bits to [0.0, 1.0).
        let mantissa = out >> 11;
        (mantissa as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    pub fn take_alert_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.platform_mocks.alert_messages)
    }

    pub(crate) fn alert(&mut self, message: String) {
        self.trace_event_line(format!("[event] alert {message:?}"));
        self.platform_mocks.alert_messages.push(message);
    }

    pub fn print_count(&self) -> usize {
        self.platform_mocks.print_count
    }

    pub(crate) fn print(&mut self) {
        self.platform_mocks.print_count += 1;
    }

    pub fn set_clipboard_text(&mut self, text: &str) {
        self.platform_mocks.clipboard_text = text.to_string();
    }

    pub fn clipboard_text(&self) -> String {
        self.platform_mocks.clipboard_text.clone()
    }

    pub fn set_share_supported(&mut self, supported: bool) {
        self.platform_mocks.share_supported = supported;
    }

    pub fn share_supported(&self) -> bool {
        self.platform_mocks.share_supported
    }

    pub(crate) fn share(&mut self, request: ShareRequest) {
        self.platform_mocks.share_requests.push(request);
    }

    pub fn take_share_requests(&mut self) -> Vec<ShareRequest> {
        std::mem::take(&mut self.platform_mocks.share_requests)
    }

    /// Navigation timing reported by the `load` handler.
    pub fn set_navigation_timing(&mut self, load_event_start_ms: i64, load_event_end_ms: i64) {
        self.platform_mocks.load_event_start_ms = load_event_start_ms;
        self.platform_mocks.load_event_end_ms = load_event_end_ms;
    }

    pub(crate) fn load_event_duration_ms(&self) -> i64 {
        self.platform_mocks.load_event_end_ms - self.platform_mocks.load_event_start_ms
    }
}
