//! Game phase of a spin

use serde::{Deserialize, Serialize};

/// Which phase of the betting round a spin belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// Paid spin that starts every round
    #[serde(alias = "base_game", alias = "base")]
    BaseGame,
    /// Awarded free spins
    #[serde(alias = "free_game", alias = "free")]
    FreeGame,
}

impl GameType {
    /// Name used in client events
    pub fn client_name(&self) -> &'static str {
        match self {
            GameType::BaseGame => "baseGame",
            GameType::FreeGame => "freeGame",
        }
    }

    /// Name used in force records and config keys
    pub fn key(&self) -> &'static str {
        match self {
            GameType::BaseGame => "basegame",
            GameType::FreeGame => "freegame",
        }
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&GameType::FreeGame).unwrap();
        assert_eq!(json, "\"freegame\"");
        let parsed: GameType = serde_json::from_str("\"base_game\"").unwrap();
        assert_eq!(parsed, GameType::BaseGame);
    }

    #[test]
    fn test_client_name() {
        assert_eq!(GameType::BaseGame.client_name(), "baseGame");
        assert_eq!(GameType::FreeGame.to_string(), "freegame");
    }
}
