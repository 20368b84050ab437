use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

/// Dance channels addressable from the keyboard, slots 0..4.
pub const DANCE_SLOT_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Immutable per-frame view of the collected input. Edges (clicks,
/// dance toggles) appear in exactly one snapshot; held keys appear in
/// every snapshot until released.
#[derive(Debug, Clone, Copy)]
pub struct InputSnapshot {
    quit_requested: bool,
    action_states: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    dance_toggle_edges: [bool; DANCE_SLOT_COUNT],
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        action_states: ActionStates,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        dance_toggle_edges: [bool; DANCE_SLOT_COUNT],
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            action_states,
            cursor_position_px,
            left_click_pressed,
            dance_toggle_edges,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.action_states.is_down(action)
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn dance_toggle_pressed(&self, slot: usize) -> bool {
        slot < DANCE_SLOT_COUNT && self.dance_toggle_edges[slot]
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// World-space movement direction from the held movement keys,
    /// normalized so diagonals are no faster than cardinals. Up is
    /// positive y.
    pub fn movement_vector(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.is_down(InputAction::MoveUp) {
            direction.y += 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            direction.y -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            direction.x += 1.0;
        }
        if self.is_down(InputAction::MoveLeft) {
            direction.x -= 1.0;
        }
        if direction.length_squared() > 1.0 {
            direction = direction.normalize();
        }
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(actions: ActionStates) -> InputSnapshot {
        InputSnapshot::new(
            false,
            actions,
            None,
            false,
            [false; DANCE_SLOT_COUNT],
            1024,
            768,
        )
    }

    #[test]
    fn single_key_moves_at_unit_speed() {
        let mut actions = ActionStates::default();
        actions.set(InputAction::MoveUp, true);
        let motion = snapshot_with(actions).movement_vector();
        assert_eq!(motion, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut actions = ActionStates::default();
        actions.set(InputAction::MoveUp, true);
        actions.set(InputAction::MoveRight, true);
        let motion = snapshot_with(actions).movement_vector();
        assert!((motion.length() - 1.0).abs() < 0.0001);
        assert!(motion.x > 0.0 && motion.y > 0.0);
    }

    #[test]
    fn opposing_keys_cancel_out() {
        let mut actions = ActionStates::default();
        actions.set(InputAction::MoveLeft, true);
        actions.set(InputAction::MoveRight, true);
        assert_eq!(snapshot_with(actions).movement_vector(), Vec2::ZERO);
    }

    #[test]
    fn out_of_range_dance_slot_is_never_pressed() {
        let snapshot = InputSnapshot::new(
            false,
            ActionStates::default(),
            None,
            false,
            [true; DANCE_SLOT_COUNT],
            1024,
            768,
        );
        assert!(snapshot.dance_toggle_pressed(3));
        assert!(!snapshot.dance_toggle_pressed(DANCE_SLOT_COUNT));
    }
}
