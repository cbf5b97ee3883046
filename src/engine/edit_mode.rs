/// Whether the record form creates a new record or updates an existing one.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum EditMode {
    #[default]
    Idle,
    /// Editing the record with this number; the next save is an update.
    Editing(u32),
}

impl EditMode {
    pub fn editing(&self) -> Option<u32> {
        match self {
            EditMode::Idle => None,
            EditMode::Editing(number) => Some(*number),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing().is_some()
    }
}
