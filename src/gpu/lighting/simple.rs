// ============================================
// Simple Shadow - Одна карта теней на всю сцену
// ============================================
// Используется, когда PSSM выключен

use ultraviolet::{Mat4, Vec3, Vec4};

use super::bounds::{Aabb, SceneBounds};
use super::cascade::{light_view_matrix, orthographic, shadow_uv_matrix};

/// Центр и радиус пустой сцены
const EMPTY_SCENE_RADIUS: f32 = 100.0;

/// Вид и проекция единственной карты теней
#[derive(Debug, Clone, Copy)]
pub struct SimpleShadow {
    pub view: Mat4,
    pub projection: Mat4,
    pub center: Vec3,
    pub radius: f32,
}

impl SimpleShadow {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn shadow_transform(&self) -> Mat4 {
        shadow_uv_matrix() * self.projection * self.view
    }
}

pub struct SimpleShadowPlanner;

impl SimpleShadowPlanner {
    /// Ограничивающая сфера моделей (без земли)
    pub fn scene_sphere(scene: &SceneBounds) -> (Vec3, f32) {
        let bounds = scene.objects_bounds();
        if bounds.is_empty() {
            return (Vec3::zero(), EMPTY_SCENE_RADIUS);
        }
        let center = bounds.center();
        let radius = (bounds.max - center).mag().max(f32::EPSILON);
        (center, radius)
    }

    pub fn compute(light_direction: Vec3, scene: &SceneBounds) -> SimpleShadow {
        let (center, radius) = Self::scene_sphere(scene);
        let dir = if light_direction.mag_sq() > 0.0 {
            light_direction.normalized()
        } else {
            -Vec3::unit_y()
        };

        let eye = center - dir * (2.0 * radius);
        let view = light_view_matrix(dir, eye);

        // Центр сцены в пространстве света
        let c = view * Vec4::new(center.x, center.y, center.z, 1.0);
        let bounds = Aabb::new(
            Vec3::new(c.x - radius, c.y - radius, c.z - radius),
            Vec3::new(c.x + radius, c.y + radius, c.z + scene.ground_half_diagonal().max(radius)),
        );

        SimpleShadow {
            view,
            projection: orthographic(&bounds),
            center,
            radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scene_fallback() {
        let shadow = SimpleShadowPlanner::compute(Vec3::new(0.0, -1.0, 0.0), &SceneBounds::empty());
        assert_eq!(shadow.center, Vec3::zero());
        assert_eq!(shadow.radius, 100.0);
        let arr: [[f32; 4]; 4] = shadow.view_projection().into();
        assert!(arr.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_center_projects_to_middle() {
        let scene = SceneBounds::new(
            vec![Aabb::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 4.0, 2.0))],
            750.0,
        );
        let shadow = SimpleShadowPlanner::compute(Vec3::new(0.3, -0.9, 0.2), &scene);
        let c = shadow.center;
        let clip = shadow.view_projection() * Vec4::new(c.x, c.y, c.z, 1.0);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);

        // Ближняя плоскость на расстоянии r от источника, запас дальней - земля
        let r = shadow.radius;
        let expected_depth = r / (r + 750.0 * std::f32::consts::SQRT_2);
        assert!((clip.z - expected_depth).abs() < 1e-4);
    }

    #[test]
    fn test_whole_scene_inside_map() {
        let objects = vec![
            Aabb::new(Vec3::new(-10.0, 0.0, -3.0), Vec3::new(-6.0, 12.0, 1.0)),
            Aabb::new(Vec3::new(5.0, 0.0, 4.0), Vec3::new(9.0, 3.0, 8.0)),
        ];
        let scene = SceneBounds::new(objects.clone(), 750.0);
        let shadow = SimpleShadowPlanner::compute(Vec3::new(-0.5, -0.7, 0.4), &scene);
        let vp = shadow.view_projection();
        for b in &objects {
            for p in b.corners() {
                let clip = vp * Vec4::new(p.x, p.y, p.z, 1.0);
                assert!(clip.x.abs() <= 1.0 + 1e-4 && clip.y.abs() <= 1.0 + 1e-4);
                assert!(clip.z >= -1e-4 && clip.z <= 1.0 + 1e-4);
            }
        }
    }
}
