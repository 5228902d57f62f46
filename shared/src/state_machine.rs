//! Recorder and Replay State Machines
//!
//! Defines the valid recorder transitions and the phases a replay moves
//! through.

use std::fmt;

/// Recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

/// Events that drive the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderEvent {
    /// Start a new recording (clears the path)
    Start,
    /// Stop recording (freezes the path)
    Stop,
    /// Clear the path without changing state
    Reset,
}

/// Result of feeding an event to the recorder state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State is now the given one; path should be cleared and re-originated
    Begin(RecorderState),
    /// State is now the given one; path is kept
    Freeze(RecorderState),
    /// State unchanged; path should be cleared
    Clear(RecorderState),
    /// Event had no effect in the current state
    Ignored { state: RecorderState, event: RecorderEvent },
}

/// The recorder state machine: Idle <-> Recording, Reset is a self-loop
#[derive(Debug, Default)]
pub struct RecorderStateMachine {
    current_state: RecorderState,
}

impl RecorderStateMachine {
    /// Create a new state machine in Idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> RecorderState {
        self.current_state
    }

    pub fn is_recording(&self) -> bool {
        self.current_state == RecorderState::Recording
    }

    /// Process an event and return what the recorder has to do with its path
    pub fn process_event(&mut self, event: RecorderEvent) -> Transition {
        use RecorderEvent::*;
        use RecorderState::*;

        match (self.current_state, event) {
            // Starting again while recording restarts the session
            (_, Start) => {
                self.current_state = Recording;
                Transition::Begin(Recording)
            }
            (Recording, Stop) => {
                self.current_state = Idle;
                Transition::Freeze(Idle)
            }
            (Idle, Stop) => Transition::Ignored { state: Idle, event },
            (state, Reset) => Transition::Clear(state),
        }
    }
}

/// Phases of a single replay run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    /// Replaying the recorded entries in order
    Forward,
    /// Waiting before the turn maneuver
    Dwell,
    /// Issuing the scripted turn
    Turn,
    /// Waiting for the turn to complete physically
    Settle,
    /// Replaying the reversed, inverted entries
    Reverse,
    Completed,
    Cancelled,
}

impl ReplayPhase {
    /// Whether the run has reached a terminal phase
    pub fn is_finished(&self) -> bool {
        matches!(self, ReplayPhase::Completed | ReplayPhase::Cancelled)
    }
}

impl fmt::Display for ReplayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplayPhase::Forward => "forward pass",
            ReplayPhase::Dwell => "dwell",
            ReplayPhase::Turn => "turn",
            ReplayPhase::Settle => "settle",
            ReplayPhase::Reverse => "reverse pass",
            ReplayPhase::Completed => "completed",
            ReplayPhase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let fsm = RecorderStateMachine::new();
        assert_eq!(fsm.state(), RecorderState::Idle);
        assert!(!fsm.is_recording());
    }

    #[test]
    fn test_record_cycle() {
        let mut fsm = RecorderStateMachine::new();

        let result = fsm.process_event(RecorderEvent::Start);
        assert_eq!(result, Transition::Begin(RecorderState::Recording));
        assert!(fsm.is_recording());

        let result = fsm.process_event(RecorderEvent::Stop);
        assert_eq!(result, Transition::Freeze(RecorderState::Idle));
        assert!(!fsm.is_recording());
    }

    #[test]
    fn test_reset_is_self_loop() {
        let mut fsm = RecorderStateMachine::new();
        assert_eq!(
            fsm.process_event(RecorderEvent::Reset),
            Transition::Clear(RecorderState::Idle)
        );

        fsm.process_event(RecorderEvent::Start);
        assert_eq!(
            fsm.process_event(RecorderEvent::Reset),
            Transition::Clear(RecorderState::Recording)
        );
        assert!(fsm.is_recording());
    }

    #[test]
    fn test_stop_while_idle_ignored() {
        let mut fsm = RecorderStateMachine::new();
        let result = fsm.process_event(RecorderEvent::Stop);
        assert!(matches!(result, Transition::Ignored { .. }));
        assert_eq!(fsm.state(), RecorderState::Idle);
    }

    #[test]
    fn test_restart_while_recording() {
        let mut fsm = RecorderStateMachine::new();
        fsm.process_event(RecorderEvent::Start);
        assert_eq!(
            fsm.process_event(RecorderEvent::Start),
            Transition::Begin(RecorderState::Recording)
        );
    }

    #[test]
    fn test_terminal_phases() {
        assert!(ReplayPhase::Completed.is_finished());
        assert!(ReplayPhase::Cancelled.is_finished());
        assert!(!ReplayPhase::Reverse.is_finished());
    }
}
