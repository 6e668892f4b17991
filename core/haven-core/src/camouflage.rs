//! Normal/Decoy state machine.
//!
//! Owns only the mode, entry reason, and decoy variant; rendering the decoy
//! content is the host's job. Transitions are conservative: racing triggers
//! while already in Decoy are ignored, and dismissal must match the entry
//! trigger. The machine errs toward staying hidden.

use rand::Rng;

/// Decoy page flavors, picked uniformly at random on each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoyVariant {
    Classroom,
    Ixl,
}

pub const DECOY_VARIANTS: [DecoyVariant; 2] = [DecoyVariant::Classroom, DecoyVariant::Ixl];

impl DecoyVariant {
    fn pick() -> Self {
        DECOY_VARIANTS[rand::thread_rng().gen_range(0..DECOY_VARIANTS.len())]
    }
}

/// What put the decoy up. Governs which dismissal applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoyReason {
    Idle,
    BossKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CamouflageMode {
    Normal,
    Decoy {
        reason: DecoyReason,
        variant: DecoyVariant,
    },
}

/// Per-tab camouflage state. Never persisted; a reload starts Normal.
pub struct CamouflageController {
    mode: CamouflageMode,
}

impl Default for CamouflageController {
    fn default() -> Self {
        CamouflageController::new()
    }
}

impl CamouflageController {
    pub fn new() -> Self {
        CamouflageController {
            mode: CamouflageMode::Normal,
        }
    }

    pub fn mode(&self) -> CamouflageMode {
        self.mode
    }

    pub fn is_decoy(&self) -> bool {
        matches!(self.mode(), CamouflageMode::Decoy { .. })
    }

    /// Boss-key press: Normal toggles into a BossKey decoy, a BossKey decoy
    /// toggles back. An Idle decoy ignores the hotkey; its dismissal is
    /// explicit only.
    pub fn press_boss_key(&mut self) -> Option<CamouflageMode> {
        match self.mode() {
            CamouflageMode::Normal => self.enter(DecoyReason::BossKey),
            CamouflageMode::Decoy {
                reason: DecoyReason::BossKey,
                ..
            } => self.leave(),
            CamouflageMode::Decoy {
                reason: DecoyReason::Idle,
                ..
            } => None,
        }
    }

    /// Idle timeout elapsed. A no-op if any decoy is already up.
    pub fn idle_elapsed(&mut self) -> Option<CamouflageMode> {
        match self.mode() {
            CamouflageMode::Normal => self.enter(DecoyReason::Idle),
            CamouflageMode::Decoy { .. } => None,
        }
    }

    /// Explicit dismissal from the host-rendered control. Clears either
    /// decoy; new input events alone never reach this path.
    pub fn dismiss(&mut self) -> Option<CamouflageMode> {
        match self.mode() {
            CamouflageMode::Decoy { .. } => self.leave(),
            CamouflageMode::Normal => None,
        }
    }

    fn enter(&mut self, reason: DecoyReason) -> Option<CamouflageMode> {
        self.mode = CamouflageMode::Decoy {
            reason,
            variant: DecoyVariant::pick(),
        };
        Some(self.mode)
    }

    fn leave(&mut self) -> Option<CamouflageMode> {
        self.mode = CamouflageMode::Normal;
        Some(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(mode: CamouflageMode) -> Option<DecoyReason> {
        match mode {
            CamouflageMode::Decoy { reason, .. } => Some(reason),
            CamouflageMode::Normal => None,
        }
    }

    #[test]
    fn test_starts_normal() {
        let controller = CamouflageController::new();
        assert_eq!(controller.mode(), CamouflageMode::Normal);
        assert!(!controller.is_decoy());
    }

    #[test]
    fn test_boss_key_toggles_decoy_on_and_off() {
        let mut controller = CamouflageController::new();

        let entered = controller.press_boss_key().unwrap();
        assert_eq!(reason(entered), Some(DecoyReason::BossKey));
        assert!(controller.is_decoy());

        let left = controller.press_boss_key().unwrap();
        assert_eq!(left, CamouflageMode::Normal);
        assert!(!controller.is_decoy());
    }

    #[test]
    fn test_idle_elapsed_enters_idle_decoy() {
        let mut controller = CamouflageController::new();
        let entered = controller.idle_elapsed().unwrap();
        assert_eq!(reason(entered), Some(DecoyReason::Idle));
    }

    #[test]
    fn test_boss_key_is_noop_in_idle_decoy() {
        let mut controller = CamouflageController::new();
        controller.idle_elapsed().unwrap();

        assert_eq!(controller.press_boss_key(), None);
        assert_eq!(reason(controller.mode()), Some(DecoyReason::Idle));
    }

    #[test]
    fn test_idle_elapsed_is_noop_while_decoy_up() {
        let mut controller = CamouflageController::new();
        controller.press_boss_key().unwrap();

        assert_eq!(controller.idle_elapsed(), None);
        // First entry keeps its reason.
        assert_eq!(reason(controller.mode()), Some(DecoyReason::BossKey));
    }

    #[test]
    fn test_dismiss_clears_either_decoy() {
        let mut controller = CamouflageController::new();
        controller.idle_elapsed().unwrap();
        assert_eq!(controller.dismiss(), Some(CamouflageMode::Normal));

        controller.press_boss_key().unwrap();
        assert_eq!(controller.dismiss(), Some(CamouflageMode::Normal));
    }

    #[test]
    fn test_dismiss_in_normal_is_noop() {
        let mut controller = CamouflageController::new();
        assert_eq!(controller.dismiss(), None);
    }

    #[test]
    fn test_variant_comes_from_fixed_set() {
        let mut controller = CamouflageController::new();
        for _ in 0..8 {
            let mode = controller.press_boss_key().unwrap();
            if let CamouflageMode::Decoy { variant, .. } = mode {
                assert!(DECOY_VARIANTS.contains(&variant));
            }
            controller.press_boss_key();
        }
    }
}
