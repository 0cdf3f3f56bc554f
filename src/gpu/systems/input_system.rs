// ============================================
// Input System - Обработка ввода
// ============================================

use winit::{
    event::ElementState,
    keyboard::KeyCode,
    window::CursorGrabMode,
};

use crate::gpu::core::{AppResources, ShadowSettings};

const DEPTH_BIAS_STEP: i32 = 1;
const SLOPE_BIAS_STEP: f32 = 0.25;

/// Система обработки клавиатуры
pub struct InputSystem;

impl InputSystem {
    /// Обработка клавиатурного ввода
    pub fn process_keyboard(
        resources: &mut AppResources,
        keycode: KeyCode,
        state: ElementState,
    ) -> Option<InputAction> {
        let pressed = state == ElementState::Pressed;

        if resources.controller.process_keyboard(keycode, pressed) || !pressed {
            return None;
        }

        match keycode {
            // Escape - отпустить курсор
            KeyCode::Escape => {
                Self::grab_cursor(resources, false);
                Some(InputAction::CursorToggle)
            }

            KeyCode::F6 => Some(InputAction::SaveConfig),

            _ => {
                let shadows = &mut resources.config.shadows;
                if Self::apply_shadow_key(shadows, keycode) {
                    log::info!(
                        "Shadows: pssm={} pcf={} splits={} bias={} slope={:.2}",
                        shadows.use_pssm,
                        shadows.use_pcf,
                        shadows.effective_show_splits(),
                        shadows.depth_bias,
                        shadows.slope_scaled_depth_bias
                    );
                    Some(InputAction::ShadowSettingsChanged)
                } else {
                    None
                }
            }
        }
    }

    /// Переключатели теней. false - клавиша не относится к теням
    pub fn apply_shadow_key(shadows: &mut ShadowSettings, keycode: KeyCode) -> bool {
        match keycode {
            KeyCode::KeyP => shadows.use_pssm = !shadows.use_pssm,
            KeyCode::KeyC => shadows.use_pcf = !shadows.use_pcf,
            KeyCode::KeyK => shadows.show_splits = !shadows.show_splits,
            KeyCode::BracketLeft => {
                shadows.depth_bias = (shadows.depth_bias - DEPTH_BIAS_STEP).max(0);
            }
            KeyCode::BracketRight => shadows.depth_bias += DEPTH_BIAS_STEP,
            KeyCode::Semicolon => {
                shadows.slope_scaled_depth_bias = (shadows.slope_scaled_depth_bias - SLOPE_BIAS_STEP).max(0.0);
            }
            KeyCode::Quote => shadows.slope_scaled_depth_bias += SLOPE_BIAS_STEP,
            _ => return false,
        }
        true
    }

    /// Обработка движения мыши
    pub fn process_mouse_motion(resources: &mut AppResources, delta: (f64, f64)) {
        if resources.cursor_grabbed {
            resources.controller.process_mouse(delta.0, delta.1);
        }
    }

    /// Захват/освобождение курсора
    pub fn grab_cursor(resources: &mut AppResources, grab: bool) {
        if let Some(window) = &resources.window {
            resources.cursor_grabbed = grab;
            if grab {
                let _ = window
                    .set_cursor_grab(CursorGrabMode::Confined)
                    .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
                window.set_cursor_visible(false);
            } else {
                let _ = window.set_cursor_grab(CursorGrabMode::None);
                window.set_cursor_visible(true);
            }
        }
    }
}

/// Действия, которые могут быть вызваны вводом
#[derive(Debug, Clone, Copy)]
pub enum InputAction {
    CursorToggle,
    ShadowSettingsChanged,
    SaveConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_toggles() {
        let mut shadows = ShadowSettings::default();
        assert!(InputSystem::apply_shadow_key(&mut shadows, KeyCode::KeyP));
        assert!(shadows.use_pssm);
        assert!(InputSystem::apply_shadow_key(&mut shadows, KeyCode::KeyC));
        assert!(!shadows.use_pcf);
        assert!(!InputSystem::apply_shadow_key(&mut shadows, KeyCode::KeyZ));
    }

    #[test]
    fn test_depth_bias_never_negative() {
        let mut shadows = ShadowSettings {
            depth_bias: 0,
            slope_scaled_depth_bias: 0.1,
            ..ShadowSettings::default()
        };
        InputSystem::apply_shadow_key(&mut shadows, KeyCode::BracketLeft);
        InputSystem::apply_shadow_key(&mut shadows, KeyCode::Semicolon);
        assert_eq!(shadows.depth_bias, 0);
        assert_eq!(shadows.slope_scaled_depth_bias, 0.0);

        InputSystem::apply_shadow_key(&mut shadows, KeyCode::BracketRight);
        assert_eq!(shadows.depth_bias, 1);
    }
}
