// ============================================
// Cascade - PSSM разбиение frustum и подгонка теней
// ============================================
// Один вид света на все каскады, отдельная ортопроекция на каждый срез.
// XY границы берутся только из углов среза, Z расширяется
// по моделям и земле, перекрывающим срез в XY.

use ultraviolet::{Mat4, Vec3, Vec4};

use super::bounds::{Aabb, SceneBounds};
use crate::gpu::core::{ShadowSettings, CASCADE_COUNT};

/// Порог вырождения базиса света
const AXIS_EPSILON: f32 = 1e-7;

/// Поле зрения камеры, по которому режутся срезы (90°)
pub const CASCADE_FOV: f32 = std::f32::consts::FRAC_PI_2;

/// Параметры камеры для разбиения
#[derive(Debug, Clone, Copy)]
pub struct CameraFrustum {
    pub position: Vec3,
    /// Направление взгляда (нормализованное)
    pub direction: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// width / height
    pub aspect: f32,
}

/// Один каскад
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    pub index: usize,
    pub near: f32,
    pub far: f32,
    /// Ортопроекция каскада (Z -> [0, 1])
    pub projection: Mat4,
    /// Итоговый бокс в пространстве света
    pub light_bounds: Aabb,
}

/// Результат планирования: общий вид света + каскады
#[derive(Debug, Clone, Copy)]
pub struct CascadeSet {
    pub light_view: Mat4,
    pub cascades: [Cascade; CASCADE_COUNT],
}

impl CascadeSet {
    /// Дальние границы срезов (для выбора каскада в шейдере)
    pub fn borders(&self) -> [f32; CASCADE_COUNT] {
        self.cascades.map(|c| c.far)
    }

    /// proj * view для рендера в карту теней
    pub fn view_projections(&self) -> [Mat4; CASCADE_COUNT] {
        self.cascades.map(|c| c.projection * self.light_view)
    }

    /// uv * proj * view для выборки из карты теней
    pub fn shadow_transforms(&self) -> [Mat4; CASCADE_COUNT] {
        let uv = shadow_uv_matrix();
        self.cascades.map(|c| uv * c.projection * self.light_view)
    }
}

/// Планировщик PSSM с равномерными срезами
#[derive(Debug, Clone, Copy)]
pub struct CascadeShadowPlanner {
    /// Ближняя плоскость первого среза
    pub near: f32,
    /// Длина каждого среза
    pub split_distance: f32,
    pub fov: f32,
}

impl CascadeShadowPlanner {
    pub fn new(near: f32, split_distance: f32) -> Self {
        Self {
            near,
            split_distance,
            fov: CASCADE_FOV,
        }
    }

    pub fn from_settings(settings: &ShadowSettings) -> Self {
        Self::new(settings.projection_near, settings.split_distance)
    }

    /// Пересчитать все каскады. Чистая функция входов
    pub fn compute_cascades(
        &self,
        camera: &CameraFrustum,
        light_direction: Vec3,
        scene: &SceneBounds,
    ) -> CascadeSet {
        let light_view = light_view_matrix(light_direction, Vec3::zero());

        // Сцену в пространство света переводим один раз
        let objects: Vec<Aabb> = scene
            .objects
            .iter()
            .map(|b| b.transformed(&light_view))
            .collect();
        let ground = scene.ground.transformed(&light_view);

        let mut near = self.near;
        let cascades = std::array::from_fn(|index| {
            let far = near + self.split_distance;
            let corners = self.frustum_corners(camera, near, far);

            // Базовый бокс: углы среза
            let baseline = Aabb::from_points(&corners).transformed(&light_view);
            let mut bounds = baseline;
            for caster in objects.iter().chain(std::iter::once(&ground)) {
                if caster.overlaps_xy(&baseline) {
                    bounds.min.z = bounds.min.z.min(caster.min.z);
                    bounds.max.z = bounds.max.z.max(caster.max.z);
                }
            }

            let cascade = Cascade {
                index,
                near,
                far,
                projection: orthographic(&bounds),
                light_bounds: bounds,
            };
            near = far;
            cascade
        });

        CascadeSet {
            light_view,
            cascades,
        }
    }

    /// 8 углов среза [near, far] в мировых координатах
    pub fn frustum_corners(&self, camera: &CameraFrustum, near: f32, far: f32) -> [Vec3; 8] {
        let tan_half = (self.fov * 0.5).tan();
        let mut corners = [Vec3::zero(); 8];
        for (i, d) in [near, far].into_iter().enumerate() {
            let center = camera.position + camera.direction * d;
            let half_w = d * tan_half;
            let half_h = half_w / camera.aspect;
            let right = camera.right * half_w;
            let up = camera.up * half_h;
            corners[i * 4] = center - right - up;
            corners[i * 4 + 1] = center + right - up;
            corners[i * 4 + 2] = center + right + up;
            corners[i * 4 + 3] = center - right + up;
        }
        corners
    }
}

/// Базис света: (right, up, forward).
/// forward = направление света, up = forward × X (или × Z, если свет вдоль X)
pub fn light_basis(direction: Vec3) -> (Vec3, Vec3, Vec3) {
    let forward = if direction.mag_sq() > 0.0 {
        direction.normalized()
    } else {
        -Vec3::unit_y()
    };

    let reference = if forward.dot(Vec3::unit_x()).abs() > 1.0 - AXIS_EPSILON {
        Vec3::unit_z()
    } else {
        Vec3::unit_x()
    };

    let up = forward.cross(reference).normalized();
    let right = up.cross(forward);
    (right, up, forward)
}

/// Левосторонний вид "смотреть вдоль направления" из точки eye
pub fn light_view_matrix(direction: Vec3, eye: Vec3) -> Mat4 {
    let (x, y, z) = light_basis(direction);
    Mat4::new(
        Vec4::new(x.x, y.x, z.x, 0.0),
        Vec4::new(x.y, y.y, z.y, 0.0),
        Vec4::new(x.z, y.z, z.z, 0.0),
        Vec4::new(-x.dot(eye), -y.dot(eye), -z.dot(eye), 1.0),
    )
}

/// Ортопроекция бокса: XY -> [-1, 1], Z -> [0, 1]
pub fn orthographic(bounds: &Aabb) -> Mat4 {
    let (min, max) = (bounds.min, bounds.max);
    let w = (max.x - min.x).max(f32::EPSILON);
    let h = (max.y - min.y).max(f32::EPSILON);
    let d = (max.z - min.z).max(f32::EPSILON);
    Mat4::new(
        Vec4::new(2.0 / w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 / h, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0 / d, 0.0),
        Vec4::new(-(max.x + min.x) / w, -(max.y + min.y) / h, -min.z / d, 1.0),
    )
}

/// NDC -> текстурные координаты карты теней (Y вниз)
pub fn shadow_uv_matrix() -> Mat4 {
    Mat4::new(
        Vec4::new(0.5, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -0.5, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.5, 0.5, 0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_neg_z() -> CameraFrustum {
        CameraFrustum {
            position: Vec3::zero(),
            direction: -Vec3::unit_z(),
            up: Vec3::unit_y(),
            right: Vec3::unit_x(),
            aspect: 16.0 / 9.0,
        }
    }

    fn unit_cube() -> Aabb {
        Aabb::new(Vec3::broadcast(-0.5), Vec3::broadcast(0.5))
    }

    fn planner() -> CascadeShadowPlanner {
        CascadeShadowPlanner::new(0.1, 250.0)
    }

    fn to_bits(m: Mat4) -> [[u32; 4]; 4] {
        let arr: [[f32; 4]; 4] = m.into();
        arr.map(|col| col.map(f32::to_bits))
    }

    #[test]
    fn test_up_is_perpendicular_to_light() {
        let dirs = [
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.3, -0.8, 0.5),
            Vec3::new(-0.9, 0.1, 0.2),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        for dir in dirs {
            let (right, up, forward) = light_basis(dir);
            assert!(up.dot(forward).abs() < 1e-5);
            assert!(right.dot(forward).abs() < 1e-5);
            assert!(right.dot(up).abs() < 1e-5);
            assert!((up.mag() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_light_along_x_switches_reference() {
        for dir in [Vec3::unit_x(), -Vec3::unit_x()] {
            let (right, up, forward) = light_basis(dir);
            for v in [right, up, forward] {
                assert!(v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
            }
            assert!((up.mag() - 1.0).abs() < 1e-5);
            assert!(up.dot(forward).abs() < 1e-5);
        }
    }

    #[test]
    fn test_view_maps_light_direction_to_z() {
        let dir = Vec3::new(0.3, -0.8, 0.5).normalized();
        let view = light_view_matrix(dir, Vec3::zero());
        let z = view * Vec4::new(dir.x, dir.y, dir.z, 0.0);
        assert!((z.z - 1.0).abs() < 1e-5);
        assert!(z.x.abs() < 1e-5 && z.y.abs() < 1e-5);
    }

    #[test]
    fn test_splits_are_contiguous() {
        let set = planner().compute_cascades(
            &looking_down_neg_z(),
            Vec3::new(0.2, -1.0, 0.1),
            &SceneBounds::new(vec![unit_cube()], 750.0),
        );
        assert_eq!(set.cascades[0].near, 0.1);
        for i in 1..CASCADE_COUNT {
            assert_eq!(set.cascades[i].near, set.cascades[i - 1].far);
        }
        for (i, c) in set.cascades.iter().enumerate() {
            assert_eq!(c.index, i);
            assert!((c.far - c.near - 250.0).abs() < 1e-3);
        }
        let borders = set.borders();
        assert!(borders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_planner_follows_changed_settings() {
        let bounds = SceneBounds::new(vec![unit_cube()], 750.0);
        let dir = Vec3::new(0.2, -1.0, 0.1);
        let mut settings = ShadowSettings::default();
        let before = CascadeShadowPlanner::from_settings(&settings)
            .compute_cascades(&looking_down_neg_z(), dir, &bounds);

        settings.projection_near = 0.5;
        settings.split_distance = 100.0;
        let after = CascadeShadowPlanner::from_settings(&settings)
            .compute_cascades(&looking_down_neg_z(), dir, &bounds);

        assert_eq!(after.cascades[0].near, 0.5);
        for (i, border) in after.borders().iter().enumerate() {
            assert!((border - (0.5 + 100.0 * (i + 1) as f32)).abs() < 1e-3);
        }
        assert_ne!(before.borders(), after.borders());
    }

    #[test]
    fn test_empty_scene_uses_frustum_corners() {
        let camera = looking_down_neg_z();
        let p = planner();
        let set = p.compute_cascades(&camera, Vec3::new(0.0, -1.0, 0.0), &SceneBounds::empty());
        for c in &set.cascades {
            let baseline = Aabb::from_points(&p.frustum_corners(&camera, c.near, c.far))
                .transformed(&set.light_view);
            assert_eq!(c.light_bounds, baseline);
            let arr: [[f32; 4]; 4] = c.projection.into();
            assert!(arr.iter().flatten().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_idempotent() {
        let camera = CameraFrustum {
            position: Vec3::new(3.0, 9.0, -2.0),
            direction: Vec3::new(0.4, -0.2, 0.9).normalized(),
            up: Vec3::unit_y(),
            right: Vec3::unit_x(),
            aspect: 1.5,
        };
        let scene = SceneBounds::new(vec![unit_cube()], 750.0);
        let dir = Vec3::new(0.3, -0.8, 0.5);
        let a = planner().compute_cascades(&camera, dir, &scene);
        let b = planner().compute_cascades(&camera, dir, &scene);
        assert_eq!(to_bits(a.light_view), to_bits(b.light_view));
        for i in 0..CASCADE_COUNT {
            assert_eq!(
                to_bits(a.cascades[i].projection),
                to_bits(b.cascades[i].projection)
            );
            assert_eq!(a.cascades[i].far.to_bits(), b.cascades[i].far.to_bits());
        }
    }

    #[test]
    fn test_down_light_over_unit_cube() {
        let camera = looking_down_neg_z();
        let p = planner();
        let scene = SceneBounds {
            objects: vec![unit_cube()],
            ground: Aabb::empty(),
        };
        let set = p.compute_cascades(&camera, Vec3::new(0.0, -1.0, 0.0), &scene);
        let c0 = &set.cascades[0];

        let slice = Aabb::from_points(&p.frustum_corners(&camera, c0.near, c0.far))
            .transformed(&set.light_view);
        assert_eq!(c0.light_bounds.min.x, slice.min.x);
        assert_eq!(c0.light_bounds.max.x, slice.max.x);
        assert_eq!(c0.light_bounds.min.y, slice.min.y);
        assert_eq!(c0.light_bounds.max.y, slice.max.y);

        let cube = unit_cube().transformed(&set.light_view);
        assert!(c0.light_bounds.min.z <= cube.min.z);
        assert!(c0.light_bounds.max.z >= cube.max.z);
    }

    #[test]
    fn test_overlapping_caster_extends_only_z() {
        let camera = looking_down_neg_z();
        let p = planner();
        // Высокая башня в срезе 0: выше любых углов среза
        let tower = Aabb::new(Vec3::new(-1.0, 0.0, -20.0), Vec3::new(1.0, 900.0, -18.0));
        let scene = SceneBounds {
            objects: vec![tower],
            ground: Aabb::empty(),
        };
        let set = p.compute_cascades(&camera, Vec3::new(0.0, -1.0, 0.0), &scene);
        let c0 = &set.cascades[0];
        let slice = Aabb::from_points(&p.frustum_corners(&camera, c0.near, c0.far))
            .transformed(&set.light_view);
        let tower_ls = tower.transformed(&set.light_view);

        assert_eq!(c0.light_bounds.min.x, slice.min.x);
        assert_eq!(c0.light_bounds.max.y, slice.max.y);
        assert_eq!(c0.light_bounds.min.z, tower_ls.min.z);
        assert!(c0.light_bounds.min.z < slice.min.z);

        // Срез 3 башню в XY не видит
        let c3 = &set.cascades[3];
        let slice3 = Aabb::from_points(&p.frustum_corners(&camera, c3.near, c3.far))
            .transformed(&set.light_view);
        assert_eq!(c3.light_bounds, slice3);
    }

    #[test]
    fn test_projection_maps_bounds_to_clip_box() {
        let bounds = Aabb::new(Vec3::new(-4.0, 2.0, 10.0), Vec3::new(6.0, 8.0, 30.0));
        let proj = orthographic(&bounds);
        let lo = proj * Vec4::new(-4.0, 2.0, 10.0, 1.0);
        let hi = proj * Vec4::new(6.0, 8.0, 30.0, 1.0);
        assert!((lo.x + 1.0).abs() < 1e-5 && (lo.y + 1.0).abs() < 1e-5 && lo.z.abs() < 1e-5);
        assert!((hi.x - 1.0).abs() < 1e-5 && (hi.y - 1.0).abs() < 1e-5 && (hi.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shadow_uv_matrix() {
        let uv = shadow_uv_matrix();
        let tl = uv * Vec4::new(-1.0, 1.0, 0.25, 1.0);
        let br = uv * Vec4::new(1.0, -1.0, 0.75, 1.0);
        assert_eq!((tl.x, tl.y, tl.z), (0.0, 0.0, 0.25));
        assert_eq!((br.x, br.y, br.z), (1.0, 1.0, 0.75));
    }
}
