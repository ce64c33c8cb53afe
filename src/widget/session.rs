/// Whether the current review session recorded activity since the last forced refresh.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Clean,
    Dirty,
}

impl SessionState {
    pub fn mark_dirty(&mut self) {
        *self = SessionState::Dirty;
    }

    /// Ends the session. Returns true when activity was recorded, meaning the counts need a
    /// forced refresh.
    pub fn end(&mut self) -> bool {
        std::mem::take(self) == SessionState::Dirty
    }
}
