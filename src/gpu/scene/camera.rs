// ============================================
// Camera - Свободная камера (yaw/pitch)
// ============================================

use std::f32::consts::{FRAC_PI_2, TAU};

use ultraviolet::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::gpu::lighting::CameraFrustum;

/// Камера с углами рыскания и тангажа
pub struct Camera {
    pub position: Vec3,
    /// Рыскание, [0, 2π)
    yaw: f32,
    /// Тангаж, [-π/2, π/2]
    pitch: f32,

    /// Параметры проекции
    pub aspect: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 9.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            aspect,
            fov: FRAC_PI_2,
            near,
            far,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Повернуть камеру
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw = (self.yaw + d_yaw).rem_euclid(TAU);
        // rem_euclid может вернуть ровно TAU из-за округления
        if self.yaw >= TAU {
            self.yaw = 0.0;
        }
        self.pitch = (self.pitch + d_pitch).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Направление взгляда
    pub fn direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cp * sy, sp, cp * cy)
    }

    /// Верх камеры (производная направления по тангажу)
    pub fn up(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sp * sy, cp, -sp * cy)
    }

    pub fn right(&self) -> Vec3 {
        self.direction().cross(self.up()).normalized()
    }

    /// Направление по земле (без тангажа)
    pub fn ground_forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(sy, 0.0, cy)
    }

    pub fn ground_right(&self) -> Vec3 {
        self.ground_forward().cross(Vec3::unit_y())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.direction(), self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        ultraviolet::projection::perspective_wgpu_dx(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Описание frustum для планировщика каскадов
    pub fn frustum(&self) -> CameraFrustum {
        CameraFrustum {
            position: self.position,
            direction: self.direction(),
            up: self.up(),
            right: self.right(),
            aspect: self.aspect,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// Управление камерой: WASD + мышь
pub struct CameraController {
    pub speed: f32,
    pub sensitivity: f32,

    // Состояние клавиш
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,

    // Дельта мыши
    mouse_dx: f32,
    mouse_dy: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            forward: false,
            backward: false,
            left: false,
            right: false,
            mouse_dx: 0.0,
            mouse_dy: 0.0,
        }
    }

    /// Возвращает true, если клавиша относится к движению
    pub fn process_keyboard(&mut self, key: KeyCode, pressed: bool) -> bool {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.forward = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.backward = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = pressed,
            _ => return false,
        }
        true
    }

    pub fn process_mouse(&mut self, dx: f64, dy: f64) {
        self.mouse_dx += dx as f32;
        self.mouse_dy += dy as f32;
    }

    pub fn update_camera(&mut self, camera: &mut Camera, dt: f32) {
        camera.rotate(
            self.mouse_dx * self.sensitivity,
            -self.mouse_dy * self.sensitivity,
        );
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;

        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        let forward = axis(self.forward, self.backward);
        let strafe = axis(self.right, self.left);
        if forward == 0.0 && strafe == 0.0 {
            return;
        }

        let step = camera.ground_forward() * forward + camera.ground_right() * strafe;
        camera.position += step.normalized() * self.speed * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).mag() < 1e-5
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new(1.0, 0.1, 100.0);
        camera.rotate(0.0, 10.0);
        assert_eq!(camera.pitch(), FRAC_PI_2);
        camera.rotate(0.0, -20.0);
        assert_eq!(camera.pitch(), -FRAC_PI_2);
    }

    #[test]
    fn test_yaw_wraps() {
        let mut camera = Camera::new(1.0, 0.1, 100.0);
        camera.rotate(-0.5, 0.0);
        assert!(camera.yaw() >= 0.0 && camera.yaw() < TAU);
        assert!((camera.yaw() - (TAU - 0.5)).abs() < 1e-5);
        camera.rotate(1.0, 0.0);
        assert!((camera.yaw() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let mut camera = Camera::new(1.5, 0.1, 100.0);
        for (dy, dp) in [(0.3, 0.2), (2.0, -0.9), (1.0, 10.0)] {
            camera.rotate(dy, dp);
            let (d, u, r) = (camera.direction(), camera.up(), camera.right());
            assert!((d.mag() - 1.0).abs() < 1e-5);
            assert!((u.mag() - 1.0).abs() < 1e-5);
            assert!(d.dot(u).abs() < 1e-5);
            assert!(d.dot(r).abs() < 1e-5);
            assert!(u.dot(r).abs() < 1e-5);
        }
    }

    #[test]
    fn test_movement_stays_on_ground() {
        let mut camera = Camera::new(1.0, 0.1, 100.0);
        camera.rotate(0.0, -1.0);
        let mut controller = CameraController::new(7.0, 0.002);
        assert!(controller.process_keyboard(KeyCode::KeyW, true));
        controller.update_camera(&mut camera, 1.0);
        assert!(approx(camera.position, Vec3::new(0.0, 9.0, 7.0)));
        assert!(!controller.process_keyboard(KeyCode::KeyQ, true));
    }
}
