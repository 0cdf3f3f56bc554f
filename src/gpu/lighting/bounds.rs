// ============================================
// Bounds - AABB моделей и земли для теней
// ============================================

use ultraviolet::{Mat4, Vec3, Vec4};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Пустой бокс: min = +inf, max = -inf
    pub fn empty() -> Self {
        Self {
            min: Vec3::broadcast(f32::INFINITY),
            max: Vec3::broadcast(f32::NEG_INFINITY),
        }
    }

    /// Бокс по центру и полуразмерам
    pub fn from_center_half(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.extend(*p);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.min_by_component(p);
        self.max = self.max.max_by_component(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min_by_component(other.min),
            max: self.max.max_by_component(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// 8 углов бокса
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// AABB углов после преобразования матрицей (в пространство света)
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        if self.is_empty() {
            return Aabb::empty();
        }
        let mut out = Aabb::empty();
        for c in self.corners() {
            let p = *m * Vec4::new(c.x, c.y, c.z, 1.0);
            out.extend(Vec3::new(p.x, p.y, p.z));
        }
        out
    }

    /// Строгое пересечение проекций на плоскость XY
    pub fn overlaps_xy(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Границы сцены: боксы моделей и площадка земли
#[derive(Debug, Clone)]
pub struct SceneBounds {
    pub objects: Vec<Aabb>,
    pub ground: Aabb,
}

impl SceneBounds {
    /// Плоская земля ±half_extent по X/Z на высоте y = 0
    pub fn new(objects: Vec<Aabb>, ground_half_extent: f32) -> Self {
        Self {
            objects,
            ground: Aabb::new(
                Vec3::new(-ground_half_extent, 0.0, -ground_half_extent),
                Vec3::new(ground_half_extent, 0.0, ground_half_extent),
            ),
        }
    }

    /// Сцена без моделей и без земли
    pub fn empty() -> Self {
        Self {
            objects: Vec::new(),
            ground: Aabb::empty(),
        }
    }

    /// Объединение всех моделей (без земли)
    pub fn objects_bounds(&self) -> Aabb {
        self.objects.iter().fold(Aabb::empty(), |acc, b| acc.union(b))
    }

    /// Полудиагональ земли по XZ (запас дальней плоскости простой тени)
    pub fn ground_half_diagonal(&self) -> f32 {
        if self.ground.is_empty() {
            return 0.0;
        }
        let half = (self.ground.max - self.ground.min) * 0.5;
        (half.x * half.x + half.z * half.z).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box() {
        let b = Aabb::empty();
        assert!(b.is_empty());
        let unit = Aabb::new(Vec3::zero(), Vec3::one());
        assert_eq!(b.union(&unit), unit);
        assert!(!b.overlaps_xy(&unit));
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Aabb::new(Vec3::zero(), Vec3::one());
        let touching = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let inside = Aabb::new(Vec3::broadcast(0.25), Vec3::broadcast(0.75));
        assert!(!a.overlaps_xy(&touching));
        assert!(a.overlaps_xy(&inside));
    }

    #[test]
    fn test_ground_half_diagonal() {
        let scene = SceneBounds::new(Vec::new(), 750.0);
        let expected = 750.0 * std::f32::consts::SQRT_2;
        assert!((scene.ground_half_diagonal() - expected).abs() < 1e-2);
        assert_eq!(SceneBounds::empty().ground_half_diagonal(), 0.0);
    }
}
