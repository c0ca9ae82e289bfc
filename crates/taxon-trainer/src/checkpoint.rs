//! Best-validation-loss checkpoint policy.

/// Keeps only the best weights so far, by strict minimum validation loss.
#[derive(Debug, Default)]
pub struct BestLossCheckpoint {
    best: Option<f32>,
}

impl BestLossCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an epoch's validation loss; `true` means the weights should be
    /// persisted because the loss strictly improved on every prior epoch.
    pub fn improved(&mut self, loss: f32) -> bool {
        match self.best {
            Some(best) if loss >= best => false,
            _ => {
                self.best = Some(loss);
                true
            }
        }
    }

    /// Best loss observed so far.
    pub fn best(&self) -> Option<f32> {
        self.best
    }
}
