use crate::error::TransitionError;

/// Host-side state of a registered tool.
///
/// `Registered -> WidgetBuilding -> Active -> Destroyed`, with `Destroyed`
/// also reachable from the two earlier states when the host shuts down early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Registered,
    WidgetBuilding,
    Active,
    Destroyed,
}

impl Lifecycle {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered => "Registered",
            Self::WidgetBuilding => "WidgetBuilding",
            Self::Active => "Active",
            Self::Destroyed => "Destroyed",
        }
    }

    pub fn can_transition_to(&self, next: Lifecycle) -> bool {
        matches!(
            (self, next),
            (Self::Registered, Self::WidgetBuilding)
                | (Self::WidgetBuilding, Self::Active)
                | (Self::Registered | Self::WidgetBuilding | Self::Active, Self::Destroyed)
        )
    }

    /// Validated transition
    pub fn advance(&mut self, next: Lifecycle) -> Result<(), TransitionError> {
        if !self.can_transition_to(next) {
            return Err(TransitionError::InvalidStateTransition {
                from: self.name(),
                to: next.name(),
            });
        }
        *self = next;
        Ok(())
    }

    pub fn accepts_events(&self) -> bool {
        matches!(self, Self::Active)
    }
}
