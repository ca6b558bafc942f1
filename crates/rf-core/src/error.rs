//! Error types for the ReelForge slot simulator

use thiserror::Error;

/// Core error type
///
/// Configuration errors surface at construction or first use. Invariant
/// violations (`BoardGeneration`, `Tumble`, `Settlement`) abort the round
/// they occur in and propagate up to the batch runner.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Game config error: {0}")]
    GameConfig(String),

    #[error("Reel strip error: {0}")]
    ReelStrip(String),

    #[error("Unregistered symbol '{name}'. Registered symbols: {registered:?}")]
    UnregisteredSymbol {
        name: String,
        registered: Vec<String>,
    },

    #[error("Board generation error: {0}")]
    BoardGeneration(String),

    #[error("Tumble error: {0}")]
    Tumble(String),

    #[error("Base + free game payout mismatch: base={base}, free={free}, final={final_win}")]
    Settlement { base: f64, free: f64, final_win: f64 },

    #[error("Event error: {0}")]
    Event(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Simulation {sim} exceeded {attempts} repeat attempts for criteria '{criteria}'")]
    RepeatLimit {
        sim: u64,
        criteria: String,
        attempts: u64,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// True for errors that indicate an engine bookkeeping bug rather than bad input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SimError::BoardGeneration(_) | SimError::Tumble(_) | SimError::Settlement { .. }
        )
    }
}

/// Result type alias
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_symbol_lists_names() {
        let err = SimError::UnregisteredSymbol {
            name: "Q".into(),
            registered: vec!["H1".into(), "W".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Q'"));
        assert!(msg.contains("H1"));
        assert!(msg.contains("W"));
    }

    #[test]
    fn test_invariant_classification() {
        assert!(SimError::Tumble("len".into()).is_invariant_violation());
        assert!(
            SimError::Settlement {
                base: 1.0,
                free: 0.0,
                final_win: 2.0
            }
            .is_invariant_violation()
        );
        assert!(!SimError::GameConfig("rtp".into()).is_invariant_violation());
    }
}
