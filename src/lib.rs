// ============================================
// PSSM Field - тени PSSM и анимированная текстура по векторному полю
// ============================================

pub mod gpu;

pub use gpu::run;
