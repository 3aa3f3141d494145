//! Reference Domains
//!
//! One configuration record per reference list. Every list screen is the same
//! `NamedListStore` parameterized by one of these.

use crate::domain::ReferenceDescriptor;

/// Static configuration of a reference list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDomain {
    /// Registry key
    pub key: &'static str,
    /// Store key of the item list
    pub items_key: &'static str,
    /// Store key of the column header title
    pub header_key: &'static str,
    /// Seed/append name prefix, e.g. "Тэг" -> "Тэг 4"
    pub item_label: &'static str,
    /// Column header title until the user renames it
    pub default_header: &'static str,
    /// Heading of the list screen
    pub list_title: &'static str,
    /// Registry title
    pub title: &'static str,
    /// Registry description
    pub description: &'static str,
    /// Success notices for item mutations
    pub messages: ListMessages,
}

/// Per-domain success notices (grammatical gender differs by item)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMessages {
    pub updated: &'static str,
    pub added: &'static str,
    pub deleted: &'static str,
}

/// Shared by every domain
pub const HEADER_UPDATED: &str = "Заголовок столбца обновлен";

impl ReferenceDomain {
    pub fn descriptor(&self) -> ReferenceDescriptor {
        ReferenceDescriptor::new(self.key, self.title, self.description)
    }
}

pub static TAGS: ReferenceDomain = ReferenceDomain {
    key: "tags",
    items_key: "tags",
    header_key: "tagsColumnTitle",
    item_label: "Тэг",
    default_header: "Наименование тэга",
    list_title: "Справочник тэгов",
    title: "Тэги",
    description: "Тэги для классификации планируемых расчетов",
    messages: ListMessages {
        updated: "Тэг обновлен",
        added: "Новый тэг добавлен",
        deleted: "Тэг удален",
    },
};

pub static CALCULATION_TYPES: ReferenceDomain = ReferenceDomain {
    key: "calculation_types",
    items_key: "calculationTypes",
    header_key: "calculationTypesColumnTitle",
    item_label: "Тип расчета",
    default_header: "Наименование типа расчета",
    list_title: "Справочник типов расчета",
    title: "Типы расчета",
    description: "Виды расчетов, используемые в реестре",
    messages: ListMessages {
        updated: "Тип расчета обновлен",
        added: "Новый тип расчета добавлен",
        deleted: "Тип расчета удален",
    },
};

pub static DOCUMENTS: ReferenceDomain = ReferenceDomain {
    key: "documents",
    items_key: "documents",
    header_key: "documentsColumnTitle",
    item_label: "Документ",
    default_header: "Наименование документа",
    list_title: "Справочник документов",
    title: "Документы",
    description: "Перечень документов по проектам",
    messages: ListMessages {
        updated: "Документ обновлен",
        added: "Новый документ добавлен",
        deleted: "Документ удален",
    },
};

pub static STATUSES: ReferenceDomain = ReferenceDomain {
    key: "statuses",
    items_key: "statuses",
    header_key: "statusesColumnTitle",
    item_label: "Статус",
    default_header: "Наименование статуса",
    list_title: "Справочник статусов",
    title: "Статусы",
    description: "Статусы выполнения работ",
    messages: ListMessages {
        updated: "Статус обновлен",
        added: "Новый статус добавлен",
        deleted: "Статус удален",
    },
};

pub static STAGES: ReferenceDomain = ReferenceDomain {
    key: "stages",
    items_key: "stages",
    header_key: "stagesColumnTitle",
    item_label: "Этап",
    default_header: "Наименование этапа",
    list_title: "Справочник этапов",
    title: "Этапы",
    description: "Этапы реализации проектов",
    messages: ListMessages {
        updated: "Этап обновлен",
        added: "Новый этап добавлен",
        deleted: "Этап удален",
    },
};

pub static INITIATORS: ReferenceDomain = ReferenceDomain {
    key: "initiators",
    items_key: "initiators",
    header_key: "initiatorsColumnTitle",
    item_label: "Инициатор",
    default_header: "Наименование инициатора",
    list_title: "Справочник инициаторов",
    title: "Инициаторы",
    description: "Инициаторы дополнительных работ",
    messages: ListMessages {
        updated: "Инициатор обновлен",
        added: "Новый инициатор добавлен",
        deleted: "Инициатор удален",
    },
};

/// Built-in domains in registry order
pub static ALL_DOMAINS: [&ReferenceDomain; 6] = [
    &TAGS,
    &CALCULATION_TYPES,
    &DOCUMENTS,
    &STATUSES,
    &STAGES,
    &INITIATORS,
];

/// Domain for a registry key
pub fn find_domain(key: &str) -> Option<&'static ReferenceDomain> {
    ALL_DOMAINS.iter().copied().find(|d| d.key == key)
}

/// Built-in registry descriptors
pub fn default_descriptors() -> Vec<ReferenceDescriptor> {
    ALL_DOMAINS.iter().map(|d| d.descriptor()).collect()
}
