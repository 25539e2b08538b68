use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::info;

use super::ScriptFamily;
use super::engine::ReaderFactory;
use crate::error::{Result, TranslateImageError};

type Slot<R> = Arc<OnceLock<std::result::Result<Arc<R>, String>>>;

/// Process-wide cache of one reader per script family.
///
/// Readers are built on first use and never evicted. Concurrent first
/// requests for the same family block on a per-family slot until the single
/// construction finishes, so a half-built reader is never observed. A failed
/// construction is remembered and reported again without retrying.
pub struct ReaderPool<F: ReaderFactory> {
    factory: F,
    slots: Mutex<HashMap<ScriptFamily, Slot<F::Reader>>>,
}

impl<F: ReaderFactory> ReaderPool<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_reader(&self, family: ScriptFamily) -> Result<Arc<F::Reader>> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());
            slots.entry(family).or_default().clone()
        };
        let entry = slot.get_or_init(|| {
            info!(
                "initializing reader for '{}' ({})",
                family,
                family.languages().join(", ")
            );
            self.factory
                .create(family)
                .map(Arc::new)
                .map_err(|err| format!("{:#}", err))
        });
        match entry {
            Ok(reader) => Ok(reader.clone()),
            Err(reason) => Err(TranslateImageError::Initialization {
                family,
                reason: reason.clone(),
            }),
        }
    }

    /// Families whose construction has completed, successfully or not.
    pub fn initialized(&self) -> Vec<ScriptFamily> {
        let slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());
        let mut families: Vec<ScriptFamily> = slots
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(family, _)| *family)
            .collect();
        families.sort();
        families
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::engine::{RawDetection, TextReader};
    use anyhow::anyhow;
    use image::RgbImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct NoopReader;

    impl TextReader for NoopReader {
        fn read_text(&self, _image: &RgbImage) -> anyhow::Result<Vec<RawDetection>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        calls: AtomicUsize,
    }

    impl ReaderFactory for CountingFactory {
        type Reader = NoopReader;

        fn create(&self, family: ScriptFamily) -> anyhow::Result<NoopReader> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            if family == ScriptFamily::Arabic {
                return Err(anyhow!("models missing"));
            }
            Ok(NoopReader)
        }
    }

    #[test]
    fn constructs_each_family_once_under_contention() {
        let pool = Arc::new(ReaderPool::new(CountingFactory::default()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || pool.get_reader(ScriptFamily::Latin).is_ok())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().expect("thread"));
        }
        let first = pool.get_reader(ScriptFamily::Latin).expect("reader");
        let second = pool.get_reader(ScriptFamily::Latin).expect("reader");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(pool.factory.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_construction_is_not_retried() {
        let pool = ReaderPool::new(CountingFactory::default());
        for _ in 0..3 {
            let err = pool.get_reader(ScriptFamily::Arabic).err().expect("error");
            match err {
                TranslateImageError::Initialization { family, reason } => {
                    assert_eq!(family, ScriptFamily::Arabic);
                    assert!(reason.contains("models missing"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(pool.factory.calls.load(Ordering::SeqCst), 1);
        assert_eq!(pool.initialized(), vec![ScriptFamily::Arabic]);
    }
}
