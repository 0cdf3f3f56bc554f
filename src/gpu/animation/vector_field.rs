// ============================================
// Vector Field - Дискретное 2D поле направлений
// ============================================
// Формат файла:
// - заголовок bincode: magic "VFLD", версия, ширина, высота
// - тело: bincode-массив (dx, dy, magnitude), сжатый ZSTD

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::gpu::core::{FieldError, Result};

pub const FIELD_MAGIC: [u8; 4] = *b"VFLD";
pub const FIELD_VERSION: u32 = 1;

/// Заголовок файла поля (16 байт)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub width: u32,
    pub height: u32,
}

impl FieldHeader {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            magic: FIELD_MAGIC,
            version: FIELD_VERSION,
            width,
            height,
        }
    }
}

/// Один отсчёт: единичное направление и модуль
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSample {
    pub dx: f32,
    pub dy: f32,
    pub magnitude: f32,
}

/// Неизменяемое поле, загружается один раз
#[derive(Debug, Clone)]
pub struct VectorField {
    width: u32,
    height: u32,
    samples: Vec<FieldSample>,
}

impl VectorField {
    /// Проверить и нормализовать отсчёты
    pub fn new(width: u32, height: u32, samples: Vec<FieldSample>) -> std::result::Result<Self, FieldError> {
        if width == 0 || height == 0 {
            return Err(FieldError::EmptyGrid);
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(FieldError::SampleCount {
                width,
                height,
                expected,
                found: samples.len(),
            });
        }

        let mut normalized = Vec::with_capacity(samples.len());
        for (i, s) in samples.into_iter().enumerate() {
            if !(s.dx.is_finite() && s.dy.is_finite() && s.magnitude.is_finite()) {
                return Err(FieldError::NonFinite(i));
            }
            let len = (s.dx * s.dx + s.dy * s.dy).sqrt();
            if len == 0.0 {
                if s.magnitude != 0.0 {
                    return Err(FieldError::ZeroDirection(i));
                }
                normalized.push(FieldSample { dx: 0.0, dy: 0.0, magnitude: 0.0 });
            } else {
                normalized.push(FieldSample {
                    dx: s.dx / len,
                    dy: s.dy / len,
                    magnitude: s.magnitude,
                });
            }
        }

        Ok(Self {
            width,
            height,
            samples: normalized,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[FieldSample] {
        &self.samples
    }

    pub fn sample(&self, x: u32, y: u32) -> Option<FieldSample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(grid_index(self.width, x, y)).copied()
    }

    /// RGBA32F для загрузки в текстуру: (dx, dy, magnitude, 1)
    pub fn to_rgba32f(&self) -> Vec<[f32; 4]> {
        self.samples
            .iter()
            .map(|s| [s.dx, s.dy, s.magnitude, 1.0])
            .collect()
    }

    /// Загрузить поле из файла
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        // 1. Заголовок фиксированного размера
        let header_size = bincode::serialized_size(&FieldHeader::new(0, 0))? as usize;
        let mut header_bytes = vec![0u8; header_size];
        reader.read_exact(&mut header_bytes)?;
        let header: FieldHeader = bincode::deserialize(&header_bytes)?;

        if header.magic != FIELD_MAGIC {
            return Err(FieldError::InvalidMagic.into());
        }
        if header.version != FIELD_VERSION {
            return Err(FieldError::UnsupportedVersion(header.version).into());
        }

        // 2. Тело
        let mut compressed = Vec::new();
        reader.read_to_end(&mut compressed)?;
        let body = zstd::decode_all(&compressed[..])
            .map_err(|e| FieldError::Compression(e.to_string()))?;
        let samples: Vec<FieldSample> = bincode::deserialize(&body)?;

        Ok(Self::new(header.width, header.height, samples)?)
    }

    /// Записать поле в файл
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = FieldHeader::new(self.width, self.height);
        writer.write_all(&bincode::serialize(&header)?)?;

        let body = bincode::serialize(&self.samples)?;
        let compressed = zstd::encode_all(&body[..], 3)
            .map_err(|e| FieldError::Compression(e.to_string()))?;
        writer.write_all(&compressed)?;

        writer.flush()?;
        Ok(())
    }

    /// Вихрь вокруг центра (для генератора ассетов)
    pub fn swirl(width: u32, height: u32) -> std::result::Result<Self, FieldError> {
        let cx = width as f32 * 0.5;
        let cy = height as f32 * 0.5;
        let max_r = cx.min(cy).max(1.0);
        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let rx = x as f32 + 0.5 - cx;
                let ry = y as f32 + 0.5 - cy;
                let r = (rx * rx + ry * ry).sqrt();
                samples.push(FieldSample {
                    dx: -ry,
                    dy: rx,
                    magnitude: if r > 0.0 { (r / max_r).min(1.0) } else { 0.0 },
                });
            }
        }
        Self::new(width, height, samples)
    }
}

/// Индекс строки-мажорной сетки в usize: width * height может не влезть в u32
fn grid_index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::core::RenderError;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn test_directions_are_normalized() {
        let field = VectorField::new(
            2,
            1,
            vec![
                FieldSample { dx: 3.0, dy: 4.0, magnitude: 2.0 },
                FieldSample { dx: 0.0, dy: 0.0, magnitude: 0.0 },
            ],
        )
        .unwrap();
        let s = field.sample(0, 0).unwrap();
        assert!((s.dx - 0.6).abs() < 1e-6 && (s.dy - 0.8).abs() < 1e-6);
        assert_eq!(s.magnitude, 2.0);
        assert_eq!(field.sample(1, 0).unwrap().magnitude, 0.0);
        assert!(field.sample(2, 0).is_none());
    }

    #[test]
    fn test_grid_index_beyond_u32() {
        // 70000 * 70000 > u32::MAX
        assert_eq!(grid_index(70_000, 5, 69_999), 69_999usize * 70_000 + 5);
        assert_eq!(grid_index(u32::MAX, u32::MAX - 1, 1), 2 * u32::MAX as usize - 1);

        let field = VectorField::swirl(8, 4).unwrap();
        assert_eq!(field.sample(7, 3), field.samples().get(31).copied());
        assert!(field.sample(0, 4).is_none());
    }

    #[test]
    fn test_invalid_samples_rejected() {
        let one = |dx: f32, dy: f32, m: f32| vec![FieldSample { dx, dy, magnitude: m }];
        assert!(matches!(
            VectorField::new(2, 2, one(1.0, 0.0, 1.0)),
            Err(FieldError::SampleCount { expected: 4, found: 1, .. })
        ));
        assert!(matches!(VectorField::new(0, 1, Vec::new()), Err(FieldError::EmptyGrid)));
        assert!(matches!(
            VectorField::new(1, 1, one(f32::NAN, 0.0, 1.0)),
            Err(FieldError::NonFinite(0))
        ));
        assert!(matches!(
            VectorField::new(1, 1, one(0.0, 0.0, 1.0)),
            Err(FieldError::ZeroDirection(0))
        ));
    }

    #[test]
    fn test_rgba_expansion() {
        let field = VectorField::swirl(8, 4).unwrap();
        let rgba = field.to_rgba32f();
        assert_eq!(rgba.len(), 32);
        assert!(rgba.iter().all(|p| p[3] == 1.0));
        for (p, s) in rgba.iter().zip(field.samples()) {
            assert_eq!((p[0], p[1], p[2]), (s.dx, s.dy, s.magnitude));
        }
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("pssm_field_test_swirl.vfld");
        let field = VectorField::swirl(16, 16).unwrap();
        field.save(&path).unwrap();

        let loaded = VectorField::load(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (16, 16));
        assert_eq!(loaded.samples().len(), 256);
        for (a, b) in loaded.samples().iter().zip(field.samples()) {
            assert!((a.dx - b.dx).abs() < 1e-6 && (a.dy - b.dy).abs() < 1e-6);
            assert_eq!(a.magnitude, b.magnitude);
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_magic() {
        let path = temp_path("pssm_field_test_bad_magic.vfld");
        let mut header = FieldHeader::new(1, 1);
        header.magic = *b"NOPE";
        std::fs::write(&path, bincode::serialize(&header).unwrap()).unwrap();

        let err = VectorField::load(&path).unwrap_err();
        assert!(matches!(err, RenderError::Field(FieldError::InvalidMagic)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unsupported_version() {
        let path = temp_path("pssm_field_test_version.vfld");
        let mut header = FieldHeader::new(1, 1);
        header.version = 99;
        std::fs::write(&path, bincode::serialize(&header).unwrap()).unwrap();

        let err = VectorField::load(&path).unwrap_err();
        assert!(matches!(err, RenderError::Field(FieldError::UnsupportedVersion(99))));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = VectorField::load(temp_path("pssm_field_does_not_exist.vfld")).unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }

    #[test]
    fn test_sample_count_mismatch_in_file() {
        let path = temp_path("pssm_field_test_count.vfld");
        let header = bincode::serialize(&FieldHeader::new(4, 4)).unwrap();
        let samples = vec![FieldSample { dx: 1.0, dy: 0.0, magnitude: 1.0 }; 3];
        let body = zstd::encode_all(&bincode::serialize(&samples).unwrap()[..], 3).unwrap();
        let mut bytes = header;
        bytes.extend_from_slice(&body);
        std::fs::write(&path, bytes).unwrap();

        let err = VectorField::load(&path).unwrap_err();
        assert!(matches!(err, RenderError::Field(FieldError::SampleCount { found: 3, .. })));
        std::fs::remove_file(&path).ok();
    }
}
