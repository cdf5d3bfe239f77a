use super::message::ExchangeTarget;

/// Conversation view phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Sending(ExchangeTarget),
    Revealing(ExchangeTarget),
}

/// State transition input for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTransition {
    Submit(ExchangeTarget),
    Reply(ExchangeTarget),
    Fail(ExchangeTarget),
    Finish(ExchangeTarget),
    Reset,
}

/// Rejection reason for illegal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejection {
    Busy {
        active: ExchangeTarget,
        attempted: ExchangeTarget,
    },
    NoActiveExchange,
    TargetMismatch {
        active: ExchangeTarget,
        attempted: ExchangeTarget,
    },
    UnexpectedPhase {
        state: ViewState,
        transition: ViewTransition,
    },
}

pub type TransitionResult = Result<ViewState, TransitionRejection>;

impl ViewState {
    pub fn active_target(&self) -> Option<ExchangeTarget> {
        match self {
            Self::Sending(target) | Self::Revealing(target) => Some(*target),
            Self::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Applies one transition deterministically.
    ///
    /// Only `Idle` accepts a submit. Every other transition except `Reset` must
    /// name the active target exactly and arrive in the matching phase.
    pub fn apply(&self, transition: ViewTransition) -> TransitionResult {
        match transition {
            ViewTransition::Submit(target) => self.apply_submit(target),
            ViewTransition::Reply(target) => {
                self.apply_from_sending(target, transition, Self::Revealing(target))
            }
            ViewTransition::Fail(target) => self.apply_from_sending(target, transition, Self::Idle),
            ViewTransition::Finish(target) => self.apply_finish(target, transition),
            ViewTransition::Reset => Ok(Self::Idle),
        }
    }

    fn apply_submit(&self, target: ExchangeTarget) -> TransitionResult {
        match self {
            Self::Idle => Ok(Self::Sending(target)),
            Self::Sending(active) | Self::Revealing(active) => Err(TransitionRejection::Busy {
                active: *active,
                attempted: target,
            }),
        }
    }

    fn apply_from_sending(
        &self,
        target: ExchangeTarget,
        transition: ViewTransition,
        next: ViewState,
    ) -> TransitionResult {
        match self {
            Self::Sending(active) if *active == target => Ok(next),
            Self::Idle => Err(TransitionRejection::NoActiveExchange),
            Self::Sending(active) | Self::Revealing(active) if *active != target => {
                Err(TransitionRejection::TargetMismatch {
                    active: *active,
                    attempted: target,
                })
            }
            Self::Sending(_) | Self::Revealing(_) => Err(TransitionRejection::UnexpectedPhase {
                state: *self,
                transition,
            }),
        }
    }

    fn apply_finish(&self, target: ExchangeTarget, transition: ViewTransition) -> TransitionResult {
        match self {
            Self::Revealing(active) if *active == target => Ok(Self::Idle),
            Self::Idle => Err(TransitionRejection::NoActiveExchange),
            Self::Sending(active) | Self::Revealing(active) if *active != target => {
                Err(TransitionRejection::TargetMismatch {
                    active: *active,
                    attempted: target,
                })
            }
            Self::Sending(_) | Self::Revealing(_) => Err(TransitionRejection::UnexpectedPhase {
                state: *self,
                transition,
            }),
        }
    }
}
