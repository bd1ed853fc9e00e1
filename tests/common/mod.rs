#![allow(dead_code)]

use intl_catalog::{LocaleTag, MemorySource, Translator};

pub const RU: &str = r#"[
  {
    "key": "test",
    "description": "Для тестов, не трогать",
    "translation": "Тест %s"
  },
  {
    "key": "test plural",
    "description": "Для тестов, не трогать",
    "plural": {
      "other": "всего %d пауков",
      "one": "паучок",
      "=0": "нет пауков",
      "=2": "всего пара пауков"
    }
  },
  {
    "key": "Should be shorter than %d symbols",
    "translation": "Должно быть короче %d символов"
  }
]"#;

pub const EN: &str = r#"[
  {
    "key": "test",
    "translation": "Test of the %s"
  },
  {
    "key": "test plural",
    "plural": {
      "other": "exactly %d spiders",
      "one": "spider",
      "=0": "no spiders",
      "=2": "just pair of spiders"
    }
  }
]"#;

pub fn source() -> MemorySource {
    MemorySource::new()
        .with_file("locales/ru/active.json", RU)
        .with_file("locales/en/active.json", EN)
}

pub fn translator() -> Translator {
    Translator::builder()
        .default_locale("ru")
        .build(&source())
        .expect("build translator")
}

pub fn tag(s: &str) -> LocaleTag {
    LocaleTag::parse(s).expect("valid tag")
}
