// ============================================
// Animation Module - Анимированная текстура по векторному полю
// ============================================

mod animated_texture;
mod engine;
mod field_swapper;
mod ping_pong;
mod vector_field;

pub use animated_texture::{AdvectUniform, AnimatedTexture, FieldTexture, InterpolateUniform, LayerTarget};
pub use engine::{AnimatedLayer, FieldAdvectionEngine, FieldPhase, FrameAdvance, LayerId, DEFAULT_INTERVAL_MICROS};
pub use field_swapper::{FieldCursor, FieldInterpolation, FieldSlot, FieldSwapper};
pub use ping_pong::{PingPong, Slot};
pub use vector_field::{FieldHeader, FieldSample, VectorField, FIELD_MAGIC, FIELD_VERSION};
