use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::ids::TipId;

/// A short contextual hint shown at specific stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnTip {
    pub id: TipId,
    pub text: String,
}

impl LearnTip {
    #[must_use]
    pub fn new(id: TipId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Session-scoped bookkeeping for learn tips.
///
/// At most one tip is live at a time. A dismissed tip id is remembered for
/// the rest of the session and is never offered again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TipBoard {
    live: Option<LearnTip>,
    fading: bool,
    dismissed: HashSet<TipId>,
}

impl TipBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `candidate` unless a tip is already showing or it was dismissed.
    ///
    /// Returns `true` when the candidate became the live tip.
    pub fn offer(&mut self, candidate: Option<&LearnTip>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        if self.live.is_some() || self.dismissed.contains(&candidate.id) {
            return false;
        }
        self.live = Some(candidate.clone());
        self.fading = false;
        true
    }

    /// Dismiss the live tip and start its fade-out.
    ///
    /// Returns the dismissed id, or `None` if nothing was showing or the tip
    /// is already fading.
    pub fn dismiss(&mut self) -> Option<TipId> {
        if self.fading {
            return None;
        }
        let id = self.live.as_ref()?.id;
        self.dismissed.insert(id);
        self.fading = true;
        Some(id)
    }

    /// Drop the live tip once its fade-out has elapsed.
    pub fn clear_faded(&mut self) -> bool {
        if !self.fading {
            return false;
        }
        self.live = None;
        self.fading = false;
        true
    }

    /// Forget the live tip and every dismissal.
    pub fn reset(&mut self) {
        self.live = None;
        self.fading = false;
        self.dismissed.clear();
    }

    #[must_use]
    pub fn live(&self) -> Option<&LearnTip> {
        self.live.as_ref()
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fading
    }

    #[must_use]
    pub fn is_dismissed(&self, id: TipId) -> bool {
        self.dismissed.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tip(id: u32) -> LearnTip {
        LearnTip::new(TipId::new(id), format!("tip {id}"))
    }

    #[test]
    fn offer_shows_first_candidate_only() {
        let mut board = TipBoard::new();
        assert!(board.offer(Some(&tip(1))));
        assert!(!board.offer(Some(&tip(2))));
        assert_eq!(board.live().map(|t| t.id), Some(TipId::new(1)));
    }

    #[test]
    fn offer_without_candidate_is_noop() {
        let mut board = TipBoard::new();
        assert!(!board.offer(None));
        assert!(board.live().is_none());
    }

    #[test]
    fn dismissed_tip_is_never_offered_again() {
        let mut board = TipBoard::new();
        board.offer(Some(&tip(1)));
        assert_eq!(board.dismiss(), Some(TipId::new(1)));
        assert!(board.clear_faded());
        assert!(!board.offer(Some(&tip(1))));
        assert!(board.live().is_none());
    }

    #[test]
    fn fading_tip_stays_visible_until_cleared() {
        let mut board = TipBoard::new();
        board.offer(Some(&tip(3)));
        board.dismiss();
        assert!(board.is_fading());
        assert!(board.live().is_some());
        assert_eq!(board.dismiss(), None);
        board.clear_faded();
        assert!(board.live().is_none());
    }

    #[test]
    fn reset_forgets_dismissals() {
        let mut board = TipBoard::new();
        board.offer(Some(&tip(1)));
        board.dismiss();
        board.reset();
        assert!(!board.is_dismissed(TipId::new(1)));
        assert!(board.offer(Some(&tip(1))));
    }
}
