//! Localized phrases used in rendered comments

use std::str::FromStr;

use serde::Serialize;

use crate::annotation::ObjectType;

/// Language of the descriptive phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Phrase placed before a link, e.g. "Depends on table"
    pub fn reference_phrase(&self, depends: bool, object_type: &ObjectType) -> &'static str {
        match self {
            Locale::En => english_phrase(depends, object_type),
            Locale::Ru => russian_phrase(depends, object_type),
        }
    }

    /// Noun for an object type, used in the dependency section
    pub fn type_label(&self, object_type: &ObjectType) -> &'static str {
        match (self, object_type) {
            (Locale::En, ObjectType::Table) => "table",
            (Locale::En, ObjectType::View) => "view",
            (Locale::En, ObjectType::MaterializedView) => "materialized view",
            (Locale::En, ObjectType::ForeignTable) => "foreign table",
            (Locale::En, ObjectType::Special) => "special table",
            (Locale::En, ObjectType::Function) => "function",
            (Locale::En, ObjectType::Layer) => "layer",
            (Locale::En, ObjectType::Service) => "service",
            (Locale::En, ObjectType::Unknown(_)) => "object",
            (Locale::Ru, ObjectType::Table) => "таблица",
            (Locale::Ru, ObjectType::View) => "представление",
            (Locale::Ru, ObjectType::MaterializedView) => "материальное представление",
            (Locale::Ru, ObjectType::ForeignTable) => "внешняя таблица",
            (Locale::Ru, ObjectType::Special) => "специальная таблица",
            (Locale::Ru, ObjectType::Function) => "функция",
            (Locale::Ru, ObjectType::Layer) => "слой",
            (Locale::Ru, ObjectType::Service) => "сервис",
            (Locale::Ru, ObjectType::Unknown(_)) => "объект",
        }
    }

    /// Label placed before a bold parameter name
    pub fn parameter_label(&self) -> &'static str {
        match self {
            Locale::En => "Parameter:",
            Locale::Ru => "Параметр:",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => Err(format!("unknown locale '{}'", other)),
        }
    }
}

fn english_phrase(depends: bool, object_type: &ObjectType) -> &'static str {
    let (depends_on, affects) = match object_type {
        ObjectType::Table => ("Depends on table", "Affects table"),
        ObjectType::View => ("Depends on view", "Affects view"),
        ObjectType::MaterializedView => ("Depends on materialized view", "Affects materialized view"),
        ObjectType::ForeignTable => ("Depends on foreign table", "Affects foreign table"),
        ObjectType::Special => ("Depends on special table", "Affects special table"),
        ObjectType::Function => ("Depends on function", "Affects function"),
        ObjectType::Layer => ("Depends on layer", "Affects layer"),
        ObjectType::Service => ("Depends on service", "Affects service"),
        ObjectType::Unknown(_) => ("Depends on", "Affects"),
    };
    if depends {
        depends_on
    } else {
        affects
    }
}

fn russian_phrase(depends: bool, object_type: &ObjectType) -> &'static str {
    let (depends_on, affects) = match object_type {
        ObjectType::Table => ("Зависит от таблицы", "Влияет на таблицу"),
        ObjectType::View => ("Зависит от представления", "Влияет на представление"),
        ObjectType::MaterializedView => (
            "Зависит от материального представления",
            "Влияет на материальное представление",
        ),
        ObjectType::ForeignTable => ("Зависит от внешней таблицы", "Влияет на внешнюю таблицу"),
        ObjectType::Special => ("Зависит от специальной таблицы", "Влияет на специальную таблицу"),
        ObjectType::Function => ("Зависит от функции", "Влияет на функцию"),
        ObjectType::Layer => ("Зависит от слоя", "Влияет на слой"),
        ObjectType::Service => ("Зависит от сервиса", "Влияет на сервис"),
        ObjectType::Unknown(_) => ("Зависит от", "Влияет на"),
    };
    if depends {
        depends_on
    } else {
        affects
    }
}
