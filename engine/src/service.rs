//! List and item coordinator.
//!
//! [`ShoppingService`] is the only writer of the shopping store. After every
//! successful mutation it reloads all lists with their items and publishes
//! the snapshot on a `watch` channel, so observers always see a consistent
//! joined view.

use thiserror::Error;
use tokio::sync::watch;

use lico_store::{NewItem, ShoppingStore};
use lico_types::{ItemDraft, ItemId, ListId, ListName, ShoppingItem, ShoppingList, SortOption};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("La lista {0} no existe")]
    ListNotFound(ListId),
    #[error("El producto {item} no existe en la lista {list}")]
    ItemNotFound { list: ListId, item: ItemId },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct ShoppingService {
    store: ShoppingStore,
    lists: watch::Sender<Vec<ShoppingList>>,
}

impl ShoppingService {
    /// Wrap `store` and publish its current contents.
    pub fn new(store: ShoppingStore) -> ServiceResult<Self> {
        let snapshot = store.lists_with_items()?;
        tracing::debug!(lists = snapshot.len(), "Loaded shopping lists");
        let (lists, _) = watch::channel(snapshot);
        Ok(Self { store, lists })
    }

    /// Observe the joined lists. The receiver starts with the current snapshot marked seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<ShoppingList>> {
        self.lists.subscribe()
    }

    /// Current snapshot.
    #[must_use]
    pub fn lists(&self) -> Vec<ShoppingList> {
        self.lists.borrow().clone()
    }

    #[must_use]
    pub fn list(&self, id: ListId) -> Option<ShoppingList> {
        self.lists.borrow().iter().find(|list| list.id == id).cloned()
    }

    pub fn add_list(&mut self, name: &ListName) -> ServiceResult<ListId> {
        let id = self.store.insert_list(name.as_str(), SortOption::Default)?;
        tracing::info!(%id, "Created list");
        self.publish()?;
        Ok(id)
    }

    /// Persist a complete list (name, sort option and items) as a new list.
    pub fn add_list_with_items(&mut self, list: &ShoppingList) -> ServiceResult<ListId> {
        let items: Vec<NewItem> = list.items.iter().map(NewItem::from).collect();
        let id = self
            .store
            .insert_list_with_items(&list.name, list.sort_option, &items)?;
        self.publish()?;
        Ok(id)
    }

    /// Duplicate a list under `new_name` with every item back to pending.
    pub fn copy_list(&mut self, id: ListId, new_name: &ListName) -> ServiceResult<ListId> {
        let source = self.list(id).ok_or(ServiceError::ListNotFound(id))?;
        let copy = source.copy_named(new_name.as_str());
        let new_id = self.add_list_with_items(&copy)?;
        tracing::info!(from = %id, to = %new_id, items = copy.items.len(), "Copied list");
        Ok(new_id)
    }

    pub fn delete_list(&mut self, id: ListId) -> ServiceResult<()> {
        if !self.store.delete_list(id)? {
            return Err(ServiceError::ListNotFound(id));
        }
        tracing::info!(%id, "Deleted list");
        self.publish()
    }

    /// Rename in place; the list keeps its id and items.
    pub fn rename_list(&mut self, id: ListId, new_name: &ListName) -> ServiceResult<()> {
        if !self.store.rename_list(id, new_name.as_str())? {
            return Err(ServiceError::ListNotFound(id));
        }
        self.publish()
    }

    /// Append an item after the last position (position 0 in an empty list).
    pub fn add_item(&mut self, list_id: ListId, draft: &ItemDraft) -> ServiceResult<ItemId> {
        self.require_list(list_id)?;
        let position = match self.store.max_position(list_id)? {
            Some(max) => max.saturating_add(1),
            None => 0,
        };
        let item = NewItem {
            name: draft.name().to_string(),
            quantity: draft.quantity(),
            unit: draft.unit().to_string(),
            is_purchased: false,
            position,
        };
        let id = self.store.insert_item(list_id, &item)?;
        self.publish()?;
        Ok(id)
    }

    /// Flip the purchased flag. Returns the new value.
    pub fn toggle_purchased(&mut self, list_id: ListId, item_id: ItemId) -> ServiceResult<bool> {
        let item = self.require_item(list_id, item_id)?;
        let purchased = !item.is_purchased;
        self.store.set_purchased(item_id, purchased)?;
        self.publish()?;
        Ok(purchased)
    }

    /// Replace name, quantity and unit. Purchased flag and position are kept.
    pub fn update_item(
        &mut self,
        list_id: ListId,
        item_id: ItemId,
        draft: &ItemDraft,
    ) -> ServiceResult<()> {
        let item = self.require_item(list_id, item_id)?;
        let updated = ShoppingItem {
            name: draft.name().to_string(),
            quantity: draft.quantity(),
            unit: draft.unit().to_string(),
            ..item
        };
        self.store.update_item(&updated)?;
        self.publish()
    }

    /// Remove an item and close the gap it leaves in the positions.
    pub fn delete_item(&mut self, list_id: ListId, item_id: ItemId) -> ServiceResult<()> {
        self.require_item(list_id, item_id)?;
        if !self.store.delete_item_and_normalize(list_id, item_id)? {
            return Err(ServiceError::ItemNotFound {
                list: list_id,
                item: item_id,
            });
        }
        self.publish()
    }

    pub fn update_sort_option(&mut self, list_id: ListId, option: SortOption) -> ServiceResult<()> {
        if !self.store.update_sort_option(list_id, option)? {
            return Err(ServiceError::ListNotFound(list_id));
        }
        self.publish()
    }

    fn require_list(&self, id: ListId) -> ServiceResult<()> {
        if self.lists.borrow().iter().any(|list| list.id == id) {
            Ok(())
        } else {
            Err(ServiceError::ListNotFound(id))
        }
    }

    fn require_item(&self, list_id: ListId, item_id: ItemId) -> ServiceResult<ShoppingItem> {
        let lists = self.lists.borrow();
        let list = lists
            .iter()
            .find(|list| list.id == list_id)
            .ok_or(ServiceError::ListNotFound(list_id))?;
        list.item(item_id)
            .cloned()
            .ok_or(ServiceError::ItemNotFound {
                list: list_id,
                item: item_id,
            })
    }

    fn publish(&self) -> ServiceResult<()> {
        let snapshot = self.store.lists_with_items()?;
        self.lists.send_replace(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ShoppingService {
        ShoppingService::new(ShoppingStore::open_in_memory().unwrap()).unwrap()
    }

    fn name(value: &str) -> ListName {
        ListName::new(value).unwrap()
    }

    fn draft(value: &str, quantity: f64) -> ItemDraft {
        ItemDraft::new(value, quantity, "uds", "uds").unwrap()
    }

    fn item_names(service: &ShoppingService, id: ListId) -> Vec<String> {
        service
            .list(id)
            .unwrap()
            .items
            .into_iter()
            .map(|i| i.name)
            .collect()
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let mut service = service();
        let mut rx = service.subscribe();
        assert!(!rx.has_changed().unwrap());

        let id = service.add_list(&name("semana")).unwrap();
        assert!(rx.has_changed().unwrap());
        let lists = rx.borrow_and_update().clone();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, id);
        assert_eq!(lists[0].name, "Semana");

        service.add_item(id, &draft("Pan", 1.0)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update()[0].items.len(), 1);
    }

    #[test]
    fn add_item_appends_positions() {
        let mut service = service();
        let id = service.add_list(&name("Casa")).unwrap();
        service.add_item(id, &draft("Pan", 1.0)).unwrap();
        service.add_item(id, &draft("Sal", 1.0)).unwrap();
        let positions: Vec<u32> = service
            .list(id)
            .unwrap()
            .items
            .iter()
            .map(|i| i.position)
            .collect();
        assert_eq!(positions, [0, 1]);
    }

    #[test]
    fn add_item_to_missing_list_fails() {
        let mut service = service();
        let err = service
            .add_item(ListId::new(7), &draft("Pan", 1.0))
            .unwrap_err();
        assert!(matches!(err, ServiceError::ListNotFound(id) if id == ListId::new(7)));
    }

    #[test]
    fn delete_item_renumbers_remaining() {
        let mut service = service();
        let id = service.add_list(&name("Casa")).unwrap();
        service.add_item(id, &draft("A", 1.0)).unwrap();
        let b = service.add_item(id, &draft("B", 1.0)).unwrap();
        service.add_item(id, &draft("C", 1.0)).unwrap();

        service.delete_item(id, b).unwrap();

        let list = service.list(id).unwrap();
        let summary: Vec<(&str, u32)> = list
            .items
            .iter()
            .map(|i| (i.name.as_str(), i.position))
            .collect();
        assert_eq!(summary, [("A", 0), ("C", 1)]);

        // The next item lands right after the last one.
        service.add_item(id, &draft("D", 1.0)).unwrap();
        assert_eq!(service.list(id).unwrap().items[2].position, 2);
    }

    #[test]
    fn toggle_and_update_item() {
        let mut service = service();
        let id = service.add_list(&name("Casa")).unwrap();
        let item = service.add_item(id, &draft("Leche", 1.0)).unwrap();

        assert!(service.toggle_purchased(id, item).unwrap());
        service
            .update_item(id, item, &ItemDraft::new("Leche sin lactosa", 6.0, "bricks", "uds").unwrap())
            .unwrap();

        let stored = service.list(id).unwrap().items.remove(0);
        assert_eq!(stored.name, "Leche sin lactosa");
        assert_eq!(stored.unit, "bricks");
        assert!(stored.is_purchased, "editing keeps the purchased flag");
        assert!(!service.toggle_purchased(id, item).unwrap());
    }

    #[test]
    fn item_must_belong_to_list() {
        let mut service = service();
        let a = service.add_list(&name("A")).unwrap();
        let b = service.add_list(&name("B")).unwrap();
        let item = service.add_item(a, &draft("Pan", 1.0)).unwrap();
        let err = service.delete_item(b, item).unwrap_err();
        assert!(matches!(err, ServiceError::ItemNotFound { .. }));
        assert_eq!(item_names(&service, a), ["Pan"]);
    }

    #[test]
    fn rename_keeps_id_and_items() {
        let mut service = service();
        let id = service.add_list(&name("Casa")).unwrap();
        service.add_item(id, &draft("Pan", 1.0)).unwrap();
        service.rename_list(id, &name("Chalet")).unwrap();
        let list = service.list(id).unwrap();
        assert_eq!(list.name, "Chalet");
        assert_eq!(list.items.len(), 1);
    }

    #[test]
    fn copy_resets_purchased_and_keeps_source() {
        let mut service = service();
        let id = service.add_list(&name("Casa")).unwrap();
        let pan = service.add_item(id, &draft("Pan", 2.0)).unwrap();
        service.add_item(id, &draft("Sal", 1.0)).unwrap();
        service.toggle_purchased(id, pan).unwrap();
        service.update_sort_option(id, SortOption::Quantity).unwrap();

        let copy = service.copy_list(id, &name("Casa 2")).unwrap();

        assert_ne!(copy, id);
        let copied = service.list(copy).unwrap();
        assert_eq!(copied.name, "Casa 2");
        assert_eq!(copied.sort_option, SortOption::Quantity);
        assert!(copied.items.iter().all(|i| !i.is_purchased));
        assert_eq!(item_names(&service, copy), ["Pan", "Sal"]);
        assert_eq!(service.list(id).unwrap().progress().purchased, 1);
    }

    #[test]
    fn delete_list_removes_it_from_snapshot() {
        let mut service = service();
        let id = service.add_list(&name("Casa")).unwrap();
        service.add_item(id, &draft("Pan", 1.0)).unwrap();
        service.delete_list(id).unwrap();
        assert!(service.lists().is_empty());
        assert!(matches!(
            service.delete_list(id),
            Err(ServiceError::ListNotFound(_))
        ));
    }

    #[test]
    fn sort_option_is_published() {
        let mut service = service();
        let id = service.add_list(&name("Casa")).unwrap();
        service.update_sort_option(id, SortOption::Name).unwrap();
        assert_eq!(service.list(id).unwrap().sort_option, SortOption::Name);
    }

    #[test]
    fn snapshot_loaded_on_startup() {
        let store = ShoppingStore::open_in_memory().unwrap();
        let id = store.insert_list("Previa", SortOption::Default).unwrap();
        let service = ShoppingService::new(store).unwrap();
        assert_eq!(service.lists().len(), 1);
        assert_eq!(service.list(id).unwrap().name, "Previa");
    }
}
