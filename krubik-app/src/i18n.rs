//! User facing text in the supported languages.
use std::fmt;
use std::str::FromStr;

use krubik_model::validate::EXPECTED_PER_COLOR;
use krubik_model::{SolverStatus, Source, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A language the interface can be shown in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    En,
    Ru,
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unsupported language {0:?}, expected one of: en, ru")]
pub struct UnsupportedLanguage(pub String);

/// Fixed strings shown by the front-end.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Text {
    Valid,
    SolutionHeading,
    AlreadySolved,
    Play,
    Pause,
    PreviewHeading,
    Busy,
    Superseded,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ru];

    /// Tag sent as `Accept-Language`.
    pub fn tag(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    pub fn text(self, text: Text) -> &'static str {
        use Text::*;
        match (self, text) {
            (Language::En, Valid) => "The cube state is valid.",
            (Language::Ru, Valid) => "Состояние кубика корректно.",
            (Language::En, SolutionHeading) => "Solution steps",
            (Language::Ru, SolutionHeading) => "Шаги решения",
            (Language::En, AlreadySolved) => "Cube is already solved.",
            (Language::Ru, AlreadySolved) => "Куб уже собран.",
            (Language::En, Play) => "Play",
            (Language::Ru, Play) => "Воспроизвести",
            (Language::En, Pause) => "Pause",
            (Language::Ru, Pause) => "Пауза",
            (Language::En, PreviewHeading) => "Preview",
            (Language::Ru, PreviewHeading) => "Превью",
            (Language::En, Busy) => "A solution is already being computed.",
            (Language::Ru, Busy) => "Решение уже вычисляется.",
            (Language::En, Superseded) => "The cube changed before the solution arrived.",
            (Language::Ru, Superseded) => "Кубик изменился до получения решения.",
        }
    }

    pub fn status(self, status: SolverStatus) -> &'static str {
        match (self, status) {
            (Language::En, SolverStatus::Idle) => "Ready to solve",
            (Language::En, SolverStatus::Loading) => "Solving…",
            (Language::En, SolverStatus::Success) => "Solution ready",
            (Language::En, SolverStatus::Error) => "Unable to solve",
            (Language::Ru, SolverStatus::Idle) => "Готово к решению",
            (Language::Ru, SolverStatus::Loading) => "Решение…",
            (Language::Ru, SolverStatus::Success) => "Решение получено",
            (Language::Ru, SolverStatus::Error) => "Не удалось решить",
        }
    }

    pub fn source(self, source: Source) -> &'static str {
        match (self, source) {
            (Language::En, Source::External) => "Source: external solver",
            (Language::En, Source::Local) => "Source: local solver",
            (Language::Ru, Source::External) => "Источник: внешний решатель",
            (Language::Ru, Source::Local) => "Источник: локальный решатель",
        }
    }

    /// Describe a validation failure.
    pub fn describe(self, error: &ValidationError) -> String {
        match (self, error) {
            (Language::En, ValidationError::Length { expected, actual }) => format!(
                "State must contain {} characters; received {}.",
                expected, actual
            ),
            (Language::Ru, ValidationError::Length { expected, actual }) => format!(
                "Строка должна содержать {} символа, получено {}.",
                expected, actual
            ),
            (Language::En, ValidationError::Alphabet { chars }) => {
                format!("Unsupported characters: {}.", join(chars))
            }
            (Language::Ru, ValidationError::Alphabet { chars }) => {
                format!("Недопустимые символы: {}.", join(chars))
            }
            (Language::En, ValidationError::Count { face, count }) => format!(
                "Color {} appears {} times; {} required.",
                face, count, EXPECTED_PER_COLOR
            ),
            (Language::Ru, ValidationError::Count { face, count }) => format!(
                "Символ {} встречается {} раз(а); требуется {}.",
                face, count, EXPECTED_PER_COLOR
            ),
        }
    }

    /// Describe several validation failures, one per line.
    pub fn describe_all(self, errors: &[ValidationError]) -> String {
        errors
            .iter()
            .map(|e| self.describe(e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn join(chars: &[char]) -> String {
    chars
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    /// Accepts a bare language or a full tag such as `ru-RU`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .trim()
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = UnsupportedLanguage;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> String {
        lang.tag().to_string()
    }
}

#[cfg(test)]
mod tests {
    use krubik_model::Face;

    use super::*;

    #[test]
    fn parses_tags() {
        assert_eq!("en".parse::<Language>(), Ok(Language::En));
        assert_eq!("ru-RU".parse::<Language>(), Ok(Language::Ru));
        assert_eq!(" EN_us ".parse::<Language>(), Ok(Language::En));
        assert!("de".parse::<Language>().is_err());
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn describes_validation_errors() {
        let length = ValidationError::Length {
            expected: 54,
            actual: 10,
        };
        assert_eq!(
            Language::En.describe(&length),
            "State must contain 54 characters; received 10."
        );
        assert_eq!(
            Language::Ru.describe(&length),
            "Строка должна содержать 54 символа, получено 10."
        );

        let alphabet = ValidationError::Alphabet {
            chars: vec!['X', '7'],
        };
        assert_eq!(
            Language::Ru.describe(&alphabet),
            "Недопустимые символы: X, 7."
        );

        let errors = vec![
            alphabet,
            ValidationError::Count {
                face: Face::U,
                count: 0,
            },
        ];
        assert_eq!(
            Language::En.describe_all(&errors),
            "Unsupported characters: X, 7.\nColor U appears 0 times; 9 required."
        );
    }

    #[test]
    fn every_status_has_a_label() {
        for lang in Language::ALL {
            for status in [
                SolverStatus::Idle,
                SolverStatus::Loading,
                SolverStatus::Success,
                SolverStatus::Error,
            ] {
                assert!(!lang.status(status).is_empty());
            }
        }
    }
}
