use std::convert::TryFrom;
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::domain::PanelKind;
use crate::error::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Loading,
    Rendered,
    Errored,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Rendered => write!(f, "Rendered"),
            Self::Errored => write!(f, "Errored"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Start,
    Resolve,
    Fail,
    Reset,
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Resolve => write!(f, "Resolve"),
            Self::Fail => write!(f, "Fail"),
            Self::Reset => write!(f, "Reset"),
        }
    }
}

struct NextState(PipelineState);

impl TryFrom<(PipelineState, PipelineEvent)> for NextState {
    type Error = TransitionError;

    fn try_from(value: (PipelineState, PipelineEvent)) -> Result<Self, Self::Error> {
        let (current, event) = value;

        match (current, event) {
            (PipelineState::Idle, PipelineEvent::Start) => Ok(Self(PipelineState::Loading)),
            (PipelineState::Loading, PipelineEvent::Resolve) => Ok(Self(PipelineState::Rendered)),
            (PipelineState::Loading, PipelineEvent::Fail) => Ok(Self(PipelineState::Errored)),
            (_, PipelineEvent::Reset) => Ok(Self(PipelineState::Idle)),
            _ => Err(TransitionError {
                from: current,
                event,
            }),
        }
    }
}

/// `Idle → Loading → {Rendered | Errored}` for one panel. Remembers which
/// selection generation started the current run so a superseded run cannot
/// finish it.
#[derive(Debug)]
pub struct PipelineMachine {
    kind: PanelKind,
    state: PipelineState,
    run: Option<u64>,
}

impl PipelineMachine {
    pub const fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            state: PipelineState::Idle,
            run: None,
        }
    }

    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Generation of the run in progress or last finished.
    pub const fn run(&self) -> Option<u64> {
        self.run
    }

    pub fn process(&mut self, event: PipelineEvent) -> Result<PipelineState, TransitionError> {
        let NextState(next) = NextState::try_from((self.state, event))?;
        debug!("{} pipeline: {} -> {next} on {event}", self.kind.as_str(), self.state);
        self.state = next;
        Ok(next)
    }

    /// Starts a run for `generation`, restarting from `Idle` if an earlier
    /// run left the machine elsewhere.
    pub fn begin(&mut self, generation: u64) -> Result<(), TransitionError> {
        if self.state != PipelineState::Idle {
            self.process(PipelineEvent::Reset)?;
        }
        self.process(PipelineEvent::Start)?;
        self.run = Some(generation);
        Ok(())
    }

    /// Whether the run started for `generation` still owns the machine.
    pub fn owned_by(&self, generation: u64) -> bool {
        self.run == Some(generation) && self.state == PipelineState::Loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_goes_idle_loading_rendered() -> Result<(), Box<dyn std::error::Error>> {
        let mut machine = PipelineMachine::new(PanelKind::Positions);

        machine.begin(1)?;
        assert_eq!(machine.state(), PipelineState::Loading);
        assert_eq!(machine.process(PipelineEvent::Resolve)?, PipelineState::Rendered);
        Ok(())
    }

    #[test]
    fn new_run_restarts_a_finished_machine() -> Result<(), Box<dyn std::error::Error>> {
        let mut machine = PipelineMachine::new(PanelKind::Pitstops);
        machine.begin(1)?;
        machine.process(PipelineEvent::Fail)?;

        machine.begin(2)?;

        assert!(machine.owned_by(2));
        assert!(!machine.owned_by(1));
        Ok(())
    }

    #[test]
    fn restart_while_loading_hands_the_machine_to_the_new_run(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut machine = PipelineMachine::new(PanelKind::TyreStrategy);
        machine.begin(1)?;

        machine.begin(2)?;

        assert_eq!(machine.run(), Some(2));
        assert_eq!(machine.state(), PipelineState::Loading);
        Ok(())
    }

    #[test]
    fn terminal_states_reject_resolution() {
        let mut machine = PipelineMachine::new(PanelKind::Results);

        let err = machine.process(PipelineEvent::Resolve);

        assert_eq!(
            err.map_err(|e| e.to_string()),
            Err("Invalid transition from Idle with event Resolve".to_string())
        );
    }
}
