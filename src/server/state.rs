use crate::ImageTranslator;
use crate::languages::LanguageCatalog;

#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) translator: ImageTranslator,
    pub(crate) catalog: LanguageCatalog,
}
