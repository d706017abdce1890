use log::info;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
/// Async-safe shutdown signalling for the harness
///
/// The handler only records the signal. The runner's wait loop polls the
/// flag so a pending verifier child is killed instead of being orphaned.
use std::ffi::c_int;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static SIGNAL_RECEIVED: AtomicI32 = AtomicI32::new(0);

/// Install handlers for SIGINT, SIGTERM and SIGHUP.
/// Must be called before the first child is spawned.
pub fn install_shutdown_handlers() -> Result<(), String> {
    let action = SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    for sig in [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP] {
        // SAFETY: on_signal only stores to atomics, which is async-signal-safe.
        unsafe { signal::sigaction(sig, &action) }
            .map_err(|e| format!("Failed to install {:?} handler: {}", sig, e))?;
    }

    info!("Signal handlers installed (SIGINT, SIGTERM, SIGHUP)");
    Ok(())
}

extern "C" fn on_signal(sig: c_int) {
    SIGNAL_RECEIVED.store(sig, Ordering::SeqCst);
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Signal that requested shutdown, if any
pub fn received_signal() -> Option<i32> {
    match SIGNAL_RECEIVED.load(Ordering::SeqCst) {
        0 => None,
        sig => Some(sig),
    }
}
