use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

/// Moves the camera (viewport top-left) only once `target` leaves a
/// `dead_zone` box around the viewport center, per axis.
pub fn follow(camera: Vec2, target: Vec2, viewport: Viewport, dead_zone: f32) -> Vec2 {
    let half = Vec2::new(viewport.width, viewport.height) / 2.0;
    let on_screen = target - camera;
    let axis = |cam: f32, tgt: f32, screen: f32, half: f32| {
        if screen < half - dead_zone {
            tgt - (half - dead_zone)
        } else if screen > half + dead_zone {
            tgt - (half + dead_zone)
        } else {
            cam
        }
    };
    Vec2::new(
        axis(camera.x, target.x, on_screen.x, half.x),
        axis(camera.y, target.y, on_screen.y, half.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_holds_still_inside_dead_zone() {
        let vp = Viewport::default();
        let camera = Vec2::new(-600.0, -400.0);
        assert_eq!(follow(camera, Vec2::new(80.0, -90.0), vp, 100.0), camera);
    }

    #[test]
    fn camera_drags_along_the_dead_zone_edge() {
        let vp = Viewport::default();
        let camera = Vec2::new(-600.0, -400.0);
        let moved = follow(camera, Vec2::new(150.0, 0.0), vp, 100.0);
        assert_eq!(moved, Vec2::new(150.0 - 700.0, -400.0));
        let moved = follow(camera, Vec2::new(0.0, -130.0), vp, 100.0);
        assert_eq!(moved, Vec2::new(-600.0, -130.0 - 300.0));
    }
}
