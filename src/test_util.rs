#[cfg(test)]
pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().unwrap_or_else(|err| err.into_inner());
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    let old_base = std::env::var(crate::paths::BASE_DIR_ENV).ok();
    // SAFETY: HOME_MUTEX serializes every test that touches these variables.
    unsafe {
        std::env::set_var("HOME", dir.path());
        std::env::remove_var(crate::paths::BASE_DIR_ENV);
    }
    let result = func(dir.path());
    unsafe {
        match old_home {
            Some(old) => std::env::set_var("HOME", old),
            None => std::env::remove_var("HOME"),
        }
        if let Some(old) = old_base {
            std::env::set_var(crate::paths::BASE_DIR_ENV, old);
        }
    }
    result
}

#[cfg(test)]
pub(crate) fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb(color));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

/// Reader returning the same detections for every image.
pub(crate) struct FixedReader(Vec<crate::ocr::RawDetection>);

impl crate::ocr::TextReader for FixedReader {
    fn read_text(&self, _image: &image::RgbImage) -> anyhow::Result<Vec<crate::ocr::RawDetection>> {
        Ok(self.0.clone())
    }
}

/// Only the latin family sees any text.
pub(crate) struct FixedFactory {
    pub(crate) latin: Vec<crate::ocr::RawDetection>,
}

impl crate::ocr::ReaderFactory for FixedFactory {
    type Reader = FixedReader;

    fn create(&self, family: crate::ocr::ScriptFamily) -> anyhow::Result<FixedReader> {
        let detections = if family == crate::ocr::ScriptFamily::Latin {
            self.latin.clone()
        } else {
            Vec::new()
        };
        Ok(FixedReader(detections))
    }
}

/// Uppercases every text and records the requested target languages.
#[derive(Default)]
pub(crate) struct UpperBackend {
    pub(crate) targets: std::sync::Mutex<Vec<String>>,
}

impl crate::translate::TranslationBackend for UpperBackend {
    fn translate_batch(
        &self,
        texts: &[String],
        _source_lang: &str,
        target_lang: &str,
    ) -> anyhow::Result<Vec<Option<String>>> {
        self.targets.lock().unwrap().push(target_lang.to_string());
        Ok(texts.iter().map(|text| Some(text.to_uppercase())).collect())
    }
}

pub(crate) fn detection(x: i32, y: i32, text: &str) -> crate::ocr::RawDetection {
    crate::ocr::RawDetection {
        polygon: crate::ocr::Quad::from_rect(x, y, 40, 14),
        text: text.to_string(),
        confidence: 0.9,
    }
}

pub(crate) fn fake_pipeline(
    latin: Vec<crate::ocr::RawDetection>,
    prefs_dir: &std::path::Path,
) -> crate::ImageTranslator<FixedFactory, UpperBackend> {
    use crate::ocr::ScriptFamily;
    crate::ImageTranslator::new(
        crate::ocr::TextDetector::new(
            FixedFactory { latin },
            vec![ScriptFamily::Latin, ScriptFamily::Chinese],
        ),
        crate::translate::BatchTranslator::new(UpperBackend::default()),
        crate::render::Renderer::default(),
        crate::prefs::UserPrefs::new(prefs_dir.join("prefs.json"), "en"),
    )
}

/// First DejaVu Sans found on the host, for tests that need real glyphs.
pub(crate) fn system_font() -> Option<std::path::PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    ]
    .iter()
    .map(std::path::PathBuf::from)
    .find(|path| path.is_file())
}
