//! Column Type Inference
//!
//! Picks the editor backing a column from its header label, and builds that
//! editor's options at edit time.

use crate::domain::{ColumnHeader, ColumnType};
use crate::reference::{stored_names, ReferenceDomain};
use crate::reference::domains::{CALCULATION_TYPES, INITIATORS, TAGS};
use crate::storage::PersistentStore;

pub const PRIORITY_OPTIONS: [&str; 3] = ["На перед", "текущая", "срочная"];

pub const SUM_RANGE_OPTIONS: [&str; 3] = [
    "до 5 млн. руб.",
    "от 5 до 50 млн. руб.",
    "свыше 50 млн. руб.",
];

pub const STATUS_OPTIONS: [&str; 4] = [
    "Не приступали",
    "в работе",
    "направлено объекту/заказчику",
    "перенос",
];

/// Label substrings in match order; first hit wins
const INFERENCE_RULES: &[(&[&str], ColumnType)] = &[
    (&["приоритет"], ColumnType::Priority),
    (&["тэг", "тег"], ColumnType::Tag),
    (&["тип расчета", "тип расчёта"], ColumnType::CalculationType),
    (&["инициатор"], ColumnType::Initiator),
    (
        &["ориентировочная сумма", "сумма доп", "сумма дополнительных"],
        ColumnType::SumRange,
    ),
    (&["статус"], ColumnType::Status),
];

/// Infer a column type from a header label (case-insensitive substring)
pub fn infer_column_type(title: &str) -> ColumnType {
    let title = title.to_lowercase();
    INFERENCE_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| title.contains(n)))
        .map(|(_, kind)| *kind)
        .unwrap_or_default()
}

/// Effective type of a column: the pinned kind, else inferred from the title
pub fn resolve_column_type(header: &ColumnHeader) -> ColumnType {
    header.kind.unwrap_or_else(|| infer_column_type(&header.title))
}

/// Reference list backing a column type, if any
pub fn reference_domain(kind: ColumnType) -> Option<&'static ReferenceDomain> {
    match kind {
        ColumnType::Tag => Some(&TAGS),
        ColumnType::CalculationType => Some(&CALCULATION_TYPES),
        ColumnType::Initiator => Some(&INITIATORS),
        _ => None,
    }
}

/// When an editor writes its buffer back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTrigger {
    /// Text input: Enter key or focus loss
    EnterOrBlur,
    /// Select: focus loss only
    Blur,
}

/// What a cell editor offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOptions {
    FreeText,
    Choices {
        options: Vec<String>,
        /// Whether the select has a filter box
        searchable: bool,
    },
}

impl EditorOptions {
    /// Build the options for `kind`, reading live reference lists from `store`
    pub fn for_column(kind: ColumnType, store: &PersistentStore) -> Self {
        let fixed = |options: &[&str]| EditorOptions::Choices {
            options: options.iter().map(|o| o.to_string()).collect(),
            searchable: false,
        };

        match kind {
            ColumnType::Text => EditorOptions::FreeText,
            ColumnType::Priority => fixed(&PRIORITY_OPTIONS[..]),
            ColumnType::SumRange => fixed(&SUM_RANGE_OPTIONS[..]),
            ColumnType::Status => fixed(&STATUS_OPTIONS[..]),
            ColumnType::Tag | ColumnType::CalculationType | ColumnType::Initiator => {
                let options = reference_domain(kind)
                    .map(|domain| stored_names(store, domain))
                    .unwrap_or_default();
                EditorOptions::Choices {
                    options,
                    searchable: true,
                }
            }
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            EditorOptions::FreeText => &[],
            EditorOptions::Choices { options, .. } => options,
        }
    }

    /// Options containing `query`, case-insensitive
    pub fn filter(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.options()
            .iter()
            .filter(|o| o.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }

    pub fn commit_trigger(&self) -> CommitTrigger {
        match self {
            EditorOptions::FreeText => CommitTrigger::EnterOrBlur,
            EditorOptions::Choices { .. } => CommitTrigger::Blur,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::NamedListStore;

    #[test]
    fn test_inference_table() {
        let cases = [
            ("Приоритет", ColumnType::Priority),
            ("ТЭГ работ", ColumnType::Tag),
            ("Основной тег", ColumnType::Tag),
            ("Тип расчёта", ColumnType::CalculationType),
            ("тип расчета", ColumnType::CalculationType),
            ("Инициатор", ColumnType::Initiator),
            ("Ориентировочная сумма", ColumnType::SumRange),
            ("Сумма доп. работ", ColumnType::SumRange),
            ("Статус", ColumnType::Status),
            ("Столбец 5", ColumnType::Text),
            ("", ColumnType::Text),
        ];
        for (title, expected) in cases {
            assert_eq!(infer_column_type(title), expected, "{}", title);
        }
    }

    #[test]
    fn test_first_rule_wins() {
        assert_eq!(infer_column_type("Статус приоритета"), ColumnType::Priority);
    }

    #[test]
    fn test_pinned_kind_overrides_title() {
        let mut header = ColumnHeader::numbered(3);
        header.kind = Some(ColumnType::Status);
        assert_eq!(resolve_column_type(&header), ColumnType::Status);

        header.kind = None;
        assert_eq!(resolve_column_type(&header), ColumnType::Text);
    }

    #[test]
    fn test_live_options_follow_store() {
        let store = PersistentStore::in_memory();
        let empty = EditorOptions::for_column(ColumnType::Tag, &store);
        assert!(empty.options().is_empty());

        let mut tags = NamedListStore::load(&TAGS, store.clone());
        tags.rename("2", "Срочный");
        let options = EditorOptions::for_column(ColumnType::Tag, &store);
        assert_eq!(options.options().to_vec(), vec!["Тэг 1", "Срочный", "Тэг 3"]);
        assert_eq!(options.filter("СРОЧ"), vec!["Срочный"]);
        assert_eq!(options.commit_trigger(), CommitTrigger::Blur);
    }

    #[test]
    fn test_fixed_options() {
        let store = PersistentStore::in_memory();
        let status = EditorOptions::for_column(ColumnType::Status, &store);
        assert_eq!(status.options().len(), 4);
        assert_eq!(status.filter("в"), vec!["в работе", "направлено объекту/заказчику"]);

        let text = EditorOptions::for_column(ColumnType::Text, &store);
        assert_eq!(text, EditorOptions::FreeText);
        assert_eq!(text.commit_trigger(), CommitTrigger::EnterOrBlur);
    }
}
