use crate::container::{Container, LayoutError};

/// Identifies a level in the catalog. Levels are numbered contiguously from
/// 1, and completing level N provisions level N + 1.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct LevelId(u32);

impl LevelId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// The level provisioned after this one is completed.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// A level's immutable authored configuration. Created at content-authoring
/// time and never mutated at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    pub id: LevelId,
    /// The starting containers, copied into every fresh session.
    pub initial: Vec<Container>,
    /// Move count of a known-optimal solution, when the authoring pipeline
    /// produced one. Consulted only for reward tiering.
    pub optimal_steps: Option<u32>,
    /// Free-form difficulty label for client display; never consulted by
    /// the engine.
    pub difficulty: Option<String>,
}

impl LevelLayout {
    pub fn new(id: LevelId, initial: Vec<Container>) -> Self {
        Self {
            id,
            initial,
            optimal_steps: None,
            difficulty: None,
        }
    }

    /// Builds a layout from bottom-to-top wire codes, one row per container.
    pub fn from_codes(id: LevelId, rows: &[Vec<i8>]) -> Result<Self, LayoutError> {
        let initial = rows
            .iter()
            .map(|row| Container::from_codes(row))
            .collect::<Result<Vec<Container>, LayoutError>>()?;
        Ok(Self::new(id, initial))
    }

    pub fn with_optimal_steps(mut self, steps: u32) -> Self {
        self.optimal_steps = Some(steps);
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }
}
