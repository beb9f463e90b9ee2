//! Injected diagnostics.
//!
//! The core never reaches for a global logger. Components that want to leave
//! a trace take a `&dyn Diagnostics`; the default swallows everything and
//! [`LogDiagnostics`] forwards to the `log` facade.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Sink for low-level simulation traces.
pub trait Diagnostics {
    fn event(&self, args: fmt::Arguments<'_>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn event(&self, _args: fmt::Arguments<'_>) {}
}

/// Forwards events to `log::debug!` under the `derelict` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn event(&self, args: fmt::Arguments<'_>) {
        log::debug!(target: "derelict", "{}", args);
    }
}

/// Counts events without formatting them. Handy in tests and the harness.
#[derive(Debug, Default)]
pub struct CountingDiagnostics {
    count: Cell<u64>,
}

impl CountingDiagnostics {
    pub fn count(&self) -> u64 {
        self.count.get()
    }
}

impl Diagnostics for CountingDiagnostics {
    fn event(&self, _args: fmt::Arguments<'_>) {
        self.count.set(self.count.get() + 1);
    }
}

/// Shared sinks, so a caller can keep a handle to inspect after handing one
/// to the simulation.
impl<T: Diagnostics + ?Sized> Diagnostics for Rc<T> {
    fn event(&self, args: fmt::Arguments<'_>) {
        (**self).event(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_diagnostics() {
        let diag = CountingDiagnostics::default();
        diag.event(format_args!("one {}", 1));
        diag.event(format_args!("two"));
        assert_eq!(diag.count(), 2);
    }

    #[test]
    fn test_null_and_log_accept_events() {
        NullDiagnostics.event(format_args!("ignored"));
        LogDiagnostics.event(format_args!("no logger installed, still fine"));
    }

    #[test]
    fn test_shared_handle_sees_events() {
        let counter = Rc::new(CountingDiagnostics::default());
        let boxed: Box<dyn Diagnostics> = Box::new(Rc::clone(&counter));
        boxed.event(format_args!("tick"));
        assert_eq!(counter.count(), 1);
    }
}
