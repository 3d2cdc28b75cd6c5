/// Hints shown during the first round, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TutorialStep {
    Look,
    Move,
    Ascend,
    Catch,
}

/// Round time at which each step starts, in seconds
const STEP_STARTS: [(f32, TutorialStep); 4] = [
    (0.0, TutorialStep::Look),
    (1.25, TutorialStep::Move),
    (2.5, TutorialStep::Ascend),
    (3.75, TutorialStep::Catch),
];

impl TutorialStep {
    pub fn hint(self) -> &'static str {
        match self {
            TutorialStep::Look => "Move the mouse to look around",
            TutorialStep::Move => "W/A/S/D travel along great circles",
            TutorialStep::Ascend => "Q/E move through the fourth direction",
            TutorialStep::Catch => "Be close to the red target when the timer runs out",
        }
    }

    /// Step active at `round_elapsed`, only in round 1
    pub fn at(round: u32, round_elapsed: f32) -> Option<TutorialStep> {
        if round != 1 {
            return None;
        }
        STEP_STARTS
            .iter()
            .rev()
            .find(|(start, _)| round_elapsed >= *start)
            .map(|(_, step)| *step)
    }
}
