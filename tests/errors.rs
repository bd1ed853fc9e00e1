mod common;

use intl_catalog::{
    AnyTranslatable, Arg, Catalog, Printer, Translatable, TranslatableError, Translator,
    try_translate_error,
};
use pretty_assertions::assert_eq;
use thiserror::Error;

use common::tag;

#[derive(Debug, Error)]
#[error("validate {field}")]
struct ValidationError {
    field: &'static str,
    #[source]
    source: TranslatableError,
}

#[derive(Debug, Error)]
#[error("storage unavailable")]
struct StorageError;

#[derive(Debug, Error)]
#[error("title too long")]
struct TitleTooLong {
    limit: u32,
}

impl Translatable for TitleTooLong {
    fn translate(&self, printer: &Printer) -> String {
        printer.sprintf("Should be shorter than %d symbols", &[Arg::from(self.limit)])
    }
}

#[derive(Debug, Error)]
#[error("save draft")]
struct SaveError {
    #[source]
    source: AnyTranslatable,
}

fn translator() -> Translator {
    Translator::builder()
        .default_locale("ru")
        .extend(|catalog: &Catalog| {
            catalog.set_string(&tag("ru"), "book", "книга");
            Ok(())
        })
        .build(&common::source())
        .expect("build translator")
}

#[test]
fn translates_error_found_in_source_chain() {
    let translator = translator();
    let err = ValidationError {
        field: "title",
        source: TranslatableError::new("Should be shorter than %d symbols").with_params([12]),
    };

    let ru = translator.printer(&tag("ru"));
    assert_eq!(
        try_translate_error(&err, &ru).as_deref(),
        Some("Должно быть короче 12 символов")
    );
    let en = translator.printer(&tag("en"));
    assert_eq!(
        try_translate_error(&err, &en).as_deref(),
        Some("Should be shorter than 12 symbols")
    );
}

#[test]
fn string_params_are_translated_first() {
    let translator = translator();
    let err = TranslatableError::new("test").with_params(["book"]);

    assert_eq!(
        try_translate_error(&err, &translator.printer(&tag("ru"))).as_deref(),
        Some("Тест книга")
    );
    assert_eq!(
        try_translate_error(&err, &translator.printer(&tag("en"))).as_deref(),
        Some("Test of the book")
    );
}

#[test]
fn plain_errors_are_not_translated() {
    let translator = translator();
    assert_eq!(try_translate_error(&StorageError, &translator.printer(&tag("ru"))), None);
}

#[test]
fn context_translates_with_its_locale() {
    let translator = translator();
    let err = TranslatableError::new("test").with_params(["book"]);

    assert_eq!(translator.context(None).translate(&err), "Тест книга");
    assert_eq!(translator.context(Some(tag("en-GB"))).translate(&err), "Test of the book");
    assert_eq!(translator.context(Some(tag("sq"))).translate(&err), "Тест книга");
}

#[test]
fn custom_translatable_errors_are_found_when_wrapped() {
    let translator = translator();
    let err = SaveError {
        source: AnyTranslatable::new(TitleTooLong { limit: 1500 }),
    };

    assert_eq!(err.source.to_string(), "title too long");
    assert_eq!(
        try_translate_error(&err, &translator.printer(&tag("ru"))).as_deref(),
        Some("Должно быть короче 1\u{a0}500 символов")
    );
    assert_eq!(
        try_translate_error(&err, &translator.printer(&tag("en"))).as_deref(),
        Some("Should be shorter than 1,500 symbols")
    );
}
