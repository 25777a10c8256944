//! Session lifecycle signal: activation on login, broadcast on termination.

// crates.io
use tokio::sync::broadcast::{self, Receiver, Sender, error::TryRecvError};
// self
use crate::_prelude::*;

const SIGNAL_CAPACITY: usize = 16;

/// Why a session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoutReason {
	/// The caller asked to log out.
	UserInitiated,
	/// Credential recovery failed; the session could not continue.
	RefreshFailed {
		/// Endpoint- or gate-supplied reason string.
		reason: String,
	},
}

/// Process-wide logout signal observed by route guards and UI state.
///
/// The signal tracks whether a session is currently active so termination is idempotent:
/// tearing down an already-terminated session emits nothing.
#[derive(Debug)]
pub struct SessionSignal {
	active: Mutex<bool>,
	channel: Sender<LogoutReason>,
}
impl SessionSignal {
	pub(crate) fn new() -> Self {
		let (channel, _) = broadcast::channel(SIGNAL_CAPACITY);

		Self { active: Mutex::new(false), channel }
	}

	/// Returns `true` while a session is considered active.
	pub fn is_active(&self) -> bool {
		*self.active.lock()
	}

	/// Subscribes to logout events emitted after this call.
	pub fn subscribe(&self) -> LogoutListener {
		LogoutListener(self.channel.subscribe())
	}

	pub(crate) fn activate(&self) {
		*self.active.lock() = true;
	}

	/// Deactivates the session and emits at most one logout event.
	///
	/// `had_credentials` lets a caller that found a stored pair (but never marked the session
	/// active, e.g. a seeded store) still announce the teardown.
	pub(crate) fn terminate(&self, had_credentials: bool, reason: LogoutReason) -> bool {
		let was_active = {
			let mut active = self.active.lock();

			std::mem::replace(&mut *active, false)
		};

		if was_active || had_credentials {
			// Send only fails when no subscriber exists, which is fine.
			let _ = self.channel.send(reason);

			true
		} else {
			false
		}
	}
}
impl Default for SessionSignal {
	fn default() -> Self {
		Self::new()
	}
}

/// Receiving side of the logout signal.
#[derive(Debug)]
pub struct LogoutListener(Receiver<LogoutReason>);
impl LogoutListener {
	/// Waits for the next logout event; `None` once the signal can never fire again.
	pub async fn recv(&mut self) -> Option<LogoutReason> {
		loop {
			match self.0.recv().await {
				Ok(reason) => return Some(reason),
				Err(broadcast::error::RecvError::Lagged(_)) => continue,
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}

	/// Returns an already-delivered logout event without waiting.
	pub fn try_recv(&mut self) -> Option<LogoutReason> {
		loop {
			match self.0.try_recv() {
				Ok(reason) => return Some(reason),
				Err(TryRecvError::Lagged(_)) => continue,
				Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn terminate_is_idempotent() {
		let signal = SessionSignal::new();
		let mut listener = signal.subscribe();

		signal.activate();

		assert!(signal.is_active());
		assert!(signal.terminate(false, LogoutReason::UserInitiated));
		assert!(!signal.is_active());
		assert!(!signal.terminate(false, LogoutReason::UserInitiated));
		assert_eq!(listener.try_recv(), Some(LogoutReason::UserInitiated));
		assert_eq!(listener.try_recv(), None);
	}

	#[test]
	fn seeded_credentials_still_announce_teardown() {
		let signal = SessionSignal::new();
		let mut listener = signal.subscribe();
		let reason = LogoutReason::RefreshFailed { reason: "revoked".into() };

		assert!(signal.terminate(true, reason.clone()));
		assert_eq!(listener.try_recv(), Some(reason));
	}

	#[test]
	fn silent_when_nothing_to_tear_down() {
		let signal = SessionSignal::new();
		let mut listener = signal.subscribe();

		assert!(!signal.terminate(false, LogoutReason::UserInitiated));
		assert_eq!(listener.try_recv(), None);
	}
}
