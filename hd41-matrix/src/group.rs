//! Mutually exclusive selection groups

/// A set of members of which at most one is on
///
/// Selecting a member turns every other member off. Deselecting only
/// clears the local state: a group that is physically always set to
/// something (like the unit's video input) cannot be turned "off".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveGroup<T> {
    members: Vec<T>,
    selected: Option<T>,
}

impl<T: Copy + Eq> ExclusiveGroup<T> {
    /// Group over `members` with nothing selected
    pub fn new(members: impl IntoIterator<Item = T>) -> Self {
        Self {
            members: members.into_iter().collect(),
            selected: None,
        }
    }

    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn selected(&self) -> Option<T> {
        self.selected
    }

    pub fn contains(&self, member: T) -> bool {
        self.members.contains(&member)
    }

    pub fn is_on(&self, member: T) -> bool {
        self.selected == Some(member)
    }

    /// Turn `member` on and every other member off
    ///
    /// Returns the members whose state changed, or `None` if `member` is
    /// not part of the group.
    pub fn select(&mut self, member: T) -> Option<Vec<(T, bool)>> {
        if !self.contains(member) {
            return None;
        }
        let before = self.states();
        self.selected = Some(member);
        Some(self.changes_since(&before))
    }

    /// Turn `member` off if it is the selected one
    ///
    /// Returns true if the state changed.
    pub fn deselect(&mut self, member: T) -> bool {
        if self.selected == Some(member) {
            self.selected = None;
            true
        } else {
            false
        }
    }

    /// State of every member, in member order
    pub fn states(&self) -> Vec<(T, bool)> {
        self.members.iter().map(|&m| (m, self.is_on(m))).collect()
    }

    fn changes_since(&self, before: &[(T, bool)]) -> Vec<(T, bool)> {
        self.states()
            .into_iter()
            .zip(before)
            .filter(|(now, was)| now.1 != was.1)
            .map(|(now, _)| now)
            .collect()
    }
}
