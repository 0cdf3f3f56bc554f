// ============================================
// Make Assets - Генерация слоя и векторного поля по умолчанию
// ============================================

use std::fs;

use image::{Rgba, RgbaImage};
use pssm_field::gpu::animation::VectorField;
use pssm_field::gpu::core::{RendererConfig, Result, CONFIG_FILE};

const FIELD_SIZE: u32 = 256;
const CHECKER_CELL: u32 = 64;

fn checker(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / CHECKER_CELL + y / CHECKER_CELL) % 2 == 0 {
            Rgba([230, 120, 40, 255])
        } else {
            Rgba([40, 90, 200, 255])
        }
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let config = RendererConfig::load(CONFIG_FILE)?;

    let layer_path = config.asset_path(&config.animation.layer_image);
    if let Some(dir) = layer_path.parent() {
        fs::create_dir_all(dir)?;
    }
    checker(config.animation.texture_size.min(1024)).save(&layer_path)?;
    log::info!("Wrote layer image {:?}", layer_path);

    let field = VectorField::swirl(FIELD_SIZE, FIELD_SIZE)?;
    for desc in &config.animation.fields {
        let path = config.asset_path(&desc.path);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        field.save(&path)?;
        log::info!("Wrote vector field {:?} ({}x{})", path, field.width(), field.height());
    }

    Ok(())
}
