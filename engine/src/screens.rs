//! Per-screen state. The app keeps these on a back stack whose root is
//! always the list overview.

use lico_types::{ListId, Product};

use crate::input::DraftInput;

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Lists(ListsState),
    NewList(NewListState),
    Detail(DetailState),
    AddProduct(AddProductState),
}

impl Screen {
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Lists(_) => "Mis listas",
            Screen::NewList(_) => "Nueva lista",
            Screen::Detail(_) => "Lista",
            Screen::AddProduct(_) => "Añadir producto",
        }
    }
}

/// Overview of every list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListsState {
    pub selected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewListState {
    pub name: DraftInput,
}

/// One list's items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub list_id: ListId,
    /// Index into the visible rows (pending, then purchased when expanded).
    pub selected: usize,
    /// Active search filter. `None` when the search bar is closed.
    pub search: Option<DraftInput>,
    pub show_purchased: bool,
}

impl DetailState {
    #[must_use]
    pub fn new(list_id: ListId) -> Self {
        Self {
            list_id,
            selected: 0,
            search: None,
            show_purchased: false,
        }
    }

    #[must_use]
    pub fn search_text(&self) -> &str {
        self.search.as_ref().map_or("", DraftInput::text)
    }
}

/// An entry the add-product screen offers for selection.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOption {
    /// Fixed suggestion shown while the search field is empty.
    Quick(String),
    /// The typed query itself, for products missing from the catalog.
    Literal(String),
    /// A catalog match.
    Product(Product),
}

impl AddOption {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            AddOption::Quick(name) => name.clone(),
            AddOption::Literal(query) => format!("Añadir \"{query}\""),
            AddOption::Product(product) => product.display_name().to_string(),
        }
    }
}

/// Product search and multi-selection for one list.
#[derive(Debug, Clone, PartialEq)]
pub struct AddProductState {
    pub list_id: ListId,
    pub query: DraftInput,
    /// Index into [`AddProductState::options`].
    pub cursor: usize,
    pub selected_products: Vec<Product>,
    pub selected_names: Vec<String>,
}

impl AddProductState {
    #[must_use]
    pub fn new(list_id: ListId) -> Self {
        Self {
            list_id,
            query: DraftInput::default(),
            cursor: 0,
            selected_products: Vec::new(),
            selected_names: Vec::new(),
        }
    }

    /// Quick chips for a blank query, otherwise the literal-query chip; then catalog matches.
    #[must_use]
    pub fn options(&self, quick: &[String], suggestions: &[Product]) -> Vec<AddOption> {
        let query = self.query.text().trim();
        let mut options: Vec<AddOption> = if query.is_empty() {
            quick.iter().cloned().map(AddOption::Quick).collect()
        } else {
            vec![AddOption::Literal(query.to_string())]
        };
        options.extend(suggestions.iter().cloned().map(AddOption::Product));
        options
    }

    #[must_use]
    pub fn is_selected(&self, option: &AddOption) -> bool {
        match option {
            AddOption::Quick(name) | AddOption::Literal(name) => self.selected_names.contains(name),
            AddOption::Product(product) => self.selected_products.iter().any(|p| p.id == product.id),
        }
    }

    pub fn toggle(&mut self, option: &AddOption) {
        match option {
            AddOption::Quick(name) | AddOption::Literal(name) => {
                if let Some(index) = self.selected_names.iter().position(|n| n == name) {
                    self.selected_names.remove(index);
                } else {
                    self.selected_names.push(name.clone());
                }
            }
            AddOption::Product(product) => {
                if let Some(index) = self.selected_products.iter().position(|p| p.id == product.id)
                {
                    self.selected_products.remove(index);
                } else {
                    self.selected_products.push(product.clone());
                }
            }
        }
    }

    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.selected_products.len() + self.selected_names.len()
    }

    /// Names to add, catalog products first.
    #[must_use]
    pub fn selected_item_names(&self) -> Vec<String> {
        self.selected_products
            .iter()
            .map(|p| p.display_name().to_string())
            .chain(self.selected_names.iter().cloned())
            .collect()
    }
}
