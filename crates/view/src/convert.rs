//! Game space ↔ NDC stage of the conversion chain.
//!
//! Window ↔ game lives on [`crate::ViewportConfig`]; NDC ↔ world needs the
//! camera matrices and lives on [`crate::Camera`].

use glam::Vec2;

/// Game pixels (origin top-left, +Y down) to NDC (`[-1, 1]²`, +Y up).
pub fn game_to_ndc(game: Vec2, game_size: Vec2) -> Vec2 {
    Vec2::new(
        game.x / game_size.x * 2.0 - 1.0,
        1.0 - game.y / game_size.y * 2.0,
    )
}

/// Inverse of [`game_to_ndc`].
pub fn ndc_to_game(ndc: Vec2, game_size: Vec2) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * game_size.x,
        (1.0 - ndc.y) * 0.5 * game_size.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: Vec2 = Vec2::new(640.0, 480.0);

    #[test]
    fn corners_map_to_ndc_extremes() {
        assert_eq!(game_to_ndc(Vec2::ZERO, GAME), Vec2::new(-1.0, 1.0));
        assert_eq!(game_to_ndc(GAME, GAME), Vec2::new(1.0, -1.0));
        assert_eq!(game_to_ndc(GAME * 0.5, GAME), Vec2::ZERO);
    }

    #[test]
    fn y_axis_is_flipped() {
        let near_top = game_to_ndc(Vec2::new(320.0, 10.0), GAME);
        let near_bottom = game_to_ndc(Vec2::new(320.0, 470.0), GAME);
        assert!(near_top.y > near_bottom.y);
    }

    #[test]
    fn ndc_to_game_inverts_game_to_ndc() {
        for p in [
            Vec2::new(0.0, 0.0),
            Vec2::new(12.5, 400.0),
            Vec2::new(639.0, 1.0),
            Vec2::new(-20.0, 500.0),
        ] {
            let back = ndc_to_game(game_to_ndc(p, GAME), GAME);
            assert!((back - p).length() < 1e-3, "{p:?} -> {back:?}");
        }
    }
}
