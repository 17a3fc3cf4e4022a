use std::f32::consts::FRAC_PI_2;
use glam::Vec3;
use crate::domain::city::City;
use crate::domain::collision::{self, Movement};
use crate::state::commands::InputFrame;
use crate::state::player::{PlayerState, PLAYER_RADIUS};
use crate::state::session::GameState;

pub const WALK_SPEED: f32 = 12.0;
pub const GRAVITY: f32 = 25.0;
pub const JUMP_VELOCITY: f32 = 9.0;

pub const DASH_SPEED_MULTIPLIER: f32 = 4.0;
pub const DASH_DURATION_MS: u64 = 250;
pub const DASH_COOLDOWN_MS: u64 = 2000;

const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

/// Horizontal move vector requested by the input, clamped to unit length
pub fn move_direction(player: &PlayerState, input: &InputFrame) -> Vec3 {
    let (forward, right) = player.movement_basis();
    let move_x = if input.move_x.is_finite() { input.move_x } else { 0.0 };
    let move_z = if input.move_z.is_finite() { input.move_z } else { 0.0 };
    let wish = forward * move_z + right * move_x;
    if wish.length_squared() < 1e-6 {
        Vec3::ZERO
    } else {
        wish.clamp_length_max(1.0)
    }
}

pub fn apply_look(player: &mut PlayerState, input: &InputFrame) {
    if input.yaw.is_finite() {
        player.yaw = input.yaw;
    }
    if input.pitch.is_finite() {
        player.pitch = input.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }
}

/// Start a dash along the movement direction (look direction when idle)
pub fn try_dash(player: &mut PlayerState, input: &InputFrame, now: u64) -> Result<(), &'static str> {
    if player.is_dashing {
        return Err("Already dashing");
    }
    if player.dash_cooldown_ms > 0 {
        return Err("Dash on cooldown");
    }

    let mut direction = move_direction(player, input).normalize_or_zero();
    if direction == Vec3::ZERO {
        direction = player.movement_basis().0;
    }

    player.is_dashing = true;
    player.dash_ends_at = Some(now + DASH_DURATION_MS);
    player.dash_direction = direction;
    Ok(())
}

/// Advance look, horizontal motion, jump and gravity, then resolve against the city
pub fn update_movement(
    player: &mut PlayerState,
    city: &City,
    input: &InputFrame,
    now: u64,
    dt_secs: f32,
) -> Movement {
    apply_look(player, input);

    let dashing = player.is_dashing && player.dash_ends_at.map_or(false, |end| now < end);
    let horizontal = if dashing {
        player.dash_direction * WALK_SPEED * DASH_SPEED_MULTIPLIER
    } else {
        move_direction(player, input) * WALK_SPEED
    };

    if input.jump && player.on_ground {
        player.velocity.y = JUMP_VELOCITY;
        player.on_ground = false;
    }
    if !player.on_ground {
        player.velocity.y -= GRAVITY * dt_secs;
    }
    player.velocity.x = horizontal.x;
    player.velocity.z = horizontal.z;

    let movement = collision::resolve_movement(city, player.position, PLAYER_RADIUS, player.velocity * dt_secs);
    player.position += movement.displacement;
    player.on_ground = movement.grounded;
    if movement.grounded && player.velocity.y < 0.0 {
        player.velocity.y = 0.0;
    }

    movement
}

/// End an expired dash and decay the cooldown; returns true when a dash ended this tick
pub fn update_dash(player: &mut PlayerState, now: u64, elapsed_ms: u64) -> bool {
    if player.is_dashing {
        if player.dash_ends_at.map_or(true, |end| now >= end) {
            player.is_dashing = false;
            player.dash_ends_at = None;
            player.dash_cooldown_ms = DASH_COOLDOWN_MS;
            return true;
        }
        return false;
    }

    player.dash_cooldown_ms = player.dash_cooldown_ms.saturating_sub(elapsed_ms);
    false
}

/// Apply contact damage; returns the amount actually taken.
/// Reaching zero health ends the game, after which damage is ignored.
pub fn apply_damage(
    player: &mut PlayerState,
    game_state: &mut GameState,
    amount: u32,
    dash_immunity: bool,
) -> u32 {
    if *game_state != GameState::Playing || amount == 0 {
        return 0;
    }
    if dash_immunity && player.is_dashing {
        return 0;
    }

    let before = player.health;
    player.health = before.saturating_sub(amount);

    if player.health == 0 {
        *game_state = GameState::GameOver;
        log::info!("Player died with score {}", player.score);
    }

    before - player.health
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_city() -> City {
        City::from_buildings(200.0, Vec::new())
    }

    fn forward_input() -> InputFrame {
        InputFrame { move_z: 1.0, ..Default::default() }
    }

    #[test]
    fn test_walk_forward() {
        let city = open_city();
        let mut player = PlayerState::new(Vec3::ZERO);
        update_movement(&mut player, &city, &forward_input(), 0, 0.5);
        assert!((player.position.z + 6.0).abs() < 1e-4);
        assert!(player.position.x.abs() < 1e-4);
        assert!(player.on_ground);
    }

    #[test]
    fn test_diagonal_input_is_normalized() {
        let player = PlayerState::new(Vec3::ZERO);
        let dir = move_direction(&player, &InputFrame { move_x: 1.0, move_z: 1.0, ..Default::default() });
        assert!((dir.length() - 1.0).abs() < 1e-5);

        let half = move_direction(&player, &InputFrame { move_z: 0.5, ..Default::default() });
        assert!((half.length() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_jump_and_land() {
        let city = open_city();
        let mut player = PlayerState::new(Vec3::ZERO);
        let jump = InputFrame { jump: true, ..Default::default() };

        update_movement(&mut player, &city, &jump, 0, 0.05);
        assert!(!player.on_ground);
        assert!(player.position.y > 0.0);

        let idle = InputFrame::default();
        for i in 1..100 {
            update_movement(&mut player, &city, &idle, i * 50, 0.05);
        }
        assert!(player.on_ground);
        assert_eq!(player.position.y, 0.0);
        assert_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn test_no_double_jump() {
        let city = open_city();
        let mut player = PlayerState::new(Vec3::ZERO);
        let jump = InputFrame { jump: true, ..Default::default() };
        update_movement(&mut player, &city, &jump, 0, 0.05);
        let vy = player.velocity.y;
        update_movement(&mut player, &city, &jump, 50, 0.05);
        assert!(player.velocity.y < vy);
    }

    #[test]
    fn test_dash_moves_faster() {
        let city = open_city();
        let mut player = PlayerState::new(Vec3::ZERO);
        try_dash(&mut player, &forward_input(), 0).unwrap();
        update_movement(&mut player, &city, &forward_input(), 10, 0.1);
        let expected = WALK_SPEED * DASH_SPEED_MULTIPLIER * 0.1;
        assert!((player.position.z + expected).abs() < 1e-3);
    }

    #[test]
    fn test_dash_cooldown_cycle() {
        let mut player = PlayerState::new(Vec3::ZERO);
        let input = InputFrame::default();

        try_dash(&mut player, &input, 1000).unwrap();
        assert!(player.is_dashing);
        assert!(try_dash(&mut player, &input, 1010).is_err());

        assert!(!update_dash(&mut player, 1200, 200));
        assert!(player.is_dashing);

        assert!(update_dash(&mut player, 1250, 50));
        assert!(!player.is_dashing);
        assert_eq!(player.dash_cooldown_ms, DASH_COOLDOWN_MS);

        // Cannot retrigger while cooling down
        assert!(try_dash(&mut player, &input, 1300).is_err());

        update_dash(&mut player, 2250, 1000);
        assert_eq!(player.dash_cooldown_ms, 1000);
        update_dash(&mut player, 3500, 1250);
        assert_eq!(player.dash_cooldown_ms, 0);
        update_dash(&mut player, 3600, 100);
        assert_eq!(player.dash_cooldown_ms, 0);

        assert!(try_dash(&mut player, &input, 3600).is_ok());
    }

    #[test]
    fn test_idle_dash_uses_look_direction() {
        let mut player = PlayerState::new(Vec3::ZERO);
        try_dash(&mut player, &InputFrame::default(), 0).unwrap();
        assert!((player.dash_direction - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_apply_damage_clamps_and_ends_game() {
        let mut player = PlayerState::new(Vec3::ZERO);
        let mut state = GameState::Playing;

        assert_eq!(apply_damage(&mut player, &mut state, 30, false), 30);
        assert_eq!(player.health, 70);

        assert_eq!(apply_damage(&mut player, &mut state, 500, false), 70);
        assert_eq!(player.health, 0);
        assert_eq!(state, GameState::GameOver);

        // No further mutation after game over
        assert_eq!(apply_damage(&mut player, &mut state, 10, false), 0);
        assert_eq!(player.health, 0);
    }

    #[test]
    fn test_dash_immunity_is_configurable() {
        let mut player = PlayerState::new(Vec3::ZERO);
        let mut state = GameState::Playing;
        try_dash(&mut player, &InputFrame::default(), 0).unwrap();

        assert_eq!(apply_damage(&mut player, &mut state, 10, true), 0);
        assert_eq!(player.health, 100);

        assert_eq!(apply_damage(&mut player, &mut state, 10, false), 10);
        assert_eq!(player.health, 90);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut player = PlayerState::new(Vec3::ZERO);
        apply_look(&mut player, &InputFrame { pitch: 10.0, yaw: 1.0, ..Default::default() });
        assert!(player.pitch < FRAC_PI_2);
        assert_eq!(player.yaw, 1.0);

        apply_look(&mut player, &InputFrame { yaw: f32::NAN, ..Default::default() });
        assert_eq!(player.yaw, 1.0);
    }
}
