//! Dialogs and menus drawn over the current screen.

use lico_types::{ItemId, ListId, ShoppingItem, SortOption, format_quantity};

use crate::input::DraftInput;

/// Actions offered for a list on the overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Rename,
    Share,
    Copy,
    Delete,
}

impl ListAction {
    pub const ALL: [Self; 4] = [Self::Rename, Self::Share, Self::Copy, Self::Delete];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rename => "Renombrar",
            Self::Share => "Compartir",
            Self::Copy => "Copiar",
            Self::Delete => "Borrar",
        }
    }
}

/// Actions offered for an item on the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Edit,
    Delete,
}

impl ItemAction {
    pub const ALL: [Self; 2] = [Self::Edit, Self::Delete];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "Editar",
            Self::Delete => "Borrar",
        }
    }
}

/// Whether a list-name form renames the list or saves a copy of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePurpose {
    Rename,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNameForm {
    pub list_id: ListId,
    pub purpose: NamePurpose,
    pub name: DraftInput,
}

impl ListNameForm {
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.purpose {
            NamePurpose::Rename => "Renombrar lista",
            NamePurpose::Copy => "Copiar lista",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Quantity,
    Unit,
}

impl ItemField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Quantity, Self::Unit];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Nombre",
            Self::Quantity => "Cantidad",
            Self::Unit => "Unidad",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Name => Self::Quantity,
            Self::Quantity => Self::Unit,
            Self::Unit => Self::Name,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Name => Self::Unit,
            Self::Quantity => Self::Name,
            Self::Unit => Self::Quantity,
        }
    }
}

/// What an item form saves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFormTarget {
    New(ListId),
    Edit { list_id: ListId, item_id: ItemId },
}

/// Name / quantity / unit dialog for adding or editing an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemForm {
    pub target: ItemFormTarget,
    pub name: DraftInput,
    pub quantity: DraftInput,
    pub unit: DraftInput,
    pub focus: ItemField,
}

impl ItemForm {
    /// Empty form with quantity `1` and the default unit.
    #[must_use]
    pub fn new_item(list_id: ListId, default_unit: &str) -> Self {
        Self {
            target: ItemFormTarget::New(list_id),
            name: DraftInput::default(),
            quantity: DraftInput::with_text("1"),
            unit: DraftInput::with_text(default_unit),
            focus: ItemField::Name,
        }
    }

    #[must_use]
    pub fn edit(list_id: ListId, item: &ShoppingItem) -> Self {
        Self {
            target: ItemFormTarget::Edit {
                list_id,
                item_id: item.id,
            },
            name: DraftInput::with_text(item.name.clone()),
            quantity: DraftInput::with_text(format_quantity(item.quantity)),
            unit: DraftInput::with_text(item.unit.clone()),
            focus: ItemField::Name,
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.target {
            ItemFormTarget::New(_) => "Nuevo producto",
            ItemFormTarget::Edit { .. } => "Editar producto",
        }
    }

    #[must_use]
    pub fn field(&self, field: ItemField) -> &DraftInput {
        match field {
            ItemField::Name => &self.name,
            ItemField::Quantity => &self.quantity,
            ItemField::Unit => &self.unit,
        }
    }

    pub fn focused_mut(&mut self) -> &mut DraftInput {
        match self.focus {
            ItemField::Name => &mut self.name,
            ItemField::Quantity => &mut self.quantity,
            ItemField::Unit => &mut self.unit,
        }
    }
}

/// The dialog currently open, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    ListActions {
        list_id: ListId,
        title: String,
        selected: usize,
    },
    ListName(ListNameForm),
    ConfirmDeleteList {
        list_id: ListId,
        name: String,
    },
    ItemActions {
        list_id: ListId,
        item_id: ItemId,
        title: String,
        selected: usize,
    },
    ItemForm(ItemForm),
    ConfirmDeleteItem {
        list_id: ListId,
        item_id: ItemId,
        name: String,
    },
    SortMenu {
        list_id: ListId,
        selected: usize,
    },
}

impl Modal {
    /// Number of rows for menu-style modals; `None` for forms and confirmations.
    #[must_use]
    pub fn menu_len(&self) -> Option<usize> {
        match self {
            Modal::ListActions { .. } => Some(ListAction::ALL.len()),
            Modal::ItemActions { .. } => Some(ItemAction::ALL.len()),
            Modal::SortMenu { .. } => Some(SortOption::ALL.len()),
            _ => None,
        }
    }

    pub(crate) fn menu_selected_mut(&mut self) -> Option<&mut usize> {
        match self {
            Modal::ListActions { selected, .. }
            | Modal::ItemActions { selected, .. }
            | Modal::SortMenu { selected, .. } => Some(selected),
            _ => None,
        }
    }

    /// The focused text field, for modals that have one.
    pub(crate) fn draft_mut(&mut self) -> Option<&mut DraftInput> {
        match self {
            Modal::ListName(form) => Some(&mut form.name),
            Modal::ItemForm(form) => Some(form.focused_mut()),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_text_field(&self) -> bool {
        matches!(self, Modal::ListName(_) | Modal::ItemForm(_))
    }
}
