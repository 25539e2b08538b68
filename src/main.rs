use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use image_translator_rust::languages::LanguageCatalog;
use image_translator_rust::prefs::UserPrefs;
use image_translator_rust::{ImageTranslator, TranslateOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "image-translator-rust",
    version,
    about = "Translate the text inside images and redraw it in place"
)]
struct Cli {
    /// Image to translate (png, jpeg, gif, webp)
    image: Option<PathBuf>,

    /// Output path for the translated image (default: <image>.translated.png)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Target language name or code (overrides the stored preference)
    #[arg(short = 'l', long = "lang")]
    lang: Option<String>,

    /// User id whose stored language preference is used
    #[arg(short = 'u', long = "user", default_value_t = 0)]
    user: u64,

    /// Store the preferred target language for --user and exit
    #[arg(long = "set-lang")]
    set_lang: Option<String>,

    /// Show the stored target language for --user and exit
    #[arg(long = "current-lang")]
    current_lang: bool,

    /// Show supported target languages and exit
    #[arg(long = "show-languages")]
    show_languages: bool,

    /// Run the HTTP server on ADDR (e.g. 127.0.0.1:11223)
    #[arg(long = "server")]
    server: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    image_translator_rust::logging::init(cli.verbose)?;
    let catalog = LanguageCatalog;

    if cli.show_languages {
        println!("{}", catalog.format_listing());
        return Ok(());
    }

    let settings_path = cli.read_settings.as_deref().map(Path::new);
    let settings = image_translator_rust::settings::load_settings(settings_path)?;

    if let Some(language) = cli.set_lang.as_deref() {
        let code = catalog
            .resolve(language)
            .ok_or_else(|| anyhow!("unknown language '{}'", language.trim()))?;
        let prefs = UserPrefs::new(settings.prefs_path(), settings.default_language.clone());
        prefs.set_lang(cli.user, code)?;
        println!("{} ({})", catalog.display_name(code), code);
        return Ok(());
    }

    if cli.current_lang {
        let prefs = UserPrefs::new(settings.prefs_path(), settings.default_language.clone());
        let code = prefs.get_lang(cli.user);
        println!("{} ({})", catalog.display_name(&code), code);
        return Ok(());
    }

    let translator = ImageTranslator::from_settings(&settings)?;

    if let Some(addr) = cli.server {
        return image_translator_rust::server::run_server(translator, addr).await;
    }

    let image_path = cli
        .image
        .ok_or_else(|| anyhow!("an image path is required (see --help)"))?;
    let bytes = std::fs::read(&image_path)
        .with_context(|| format!("failed to read image: {}", image_path.display()))?;
    let lang = match cli.lang.as_deref() {
        Some(value) => Some(
            catalog
                .resolve(value)
                .ok_or_else(|| anyhow!("unknown language '{}'", value.trim()))?
                .to_string(),
        ),
        None => None,
    };

    match translator.translate_image(cli.user, bytes, lang).await? {
        TranslateOutcome::NoText => {
            println!("No text was detected in that image.");
        }
        TranslateOutcome::Translated(result) => {
            let output = cli
                .output
                .unwrap_or_else(|| default_output_path(&image_path));
            std::fs::write(&output, &result.png)
                .with_context(|| format!("failed to write image: {}", output.display()))?;
            println!("{}", result.summary());
            println!("saved: {}", output.display());
        }
    }
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}.translated.png", stem))
}
