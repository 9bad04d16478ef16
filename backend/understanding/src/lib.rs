pub mod image_mime;
pub mod ocr;

pub use image_mime::sniff_image_mime;
pub use ocr::{build_engine, OcrEngine, TesseractEngine, VisionOcrEngine};
