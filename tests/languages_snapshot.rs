use image_translator_rust::languages::LanguageCatalog;

#[test]
fn language_listing() {
    let listing = LanguageCatalog.format_listing();
    insta::assert_snapshot!(listing);
}

#[test]
fn autocomplete_matches_names_and_codes() {
    let names: Vec<&str> = LanguageCatalog
        .autocomplete("an")
        .iter()
        .map(|lang| lang.name)
        .collect();
    insta::assert_debug_snapshot!(names, @r#"
    [
        "Danish",
        "German",
        "Hungarian",
        "Indonesian",
        "Italian",
        "Japanese",
        "Korean",
        "Norwegian",
        "Persian",
        "Romanian",
        "Russian",
        "Spanish",
        "Ukrainian",
    ]
    "#);
}
