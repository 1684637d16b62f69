//! Pure list edits applied by the paging modifier.
//!
//! Each function takes the current item sequence by value and returns the
//! edited sequence; none of them touch load state.

pub fn replace_first<V: PartialEq>(mut items: Vec<V>, old: &V, new: V) -> Vec<V> {
    if let Some(slot) = items.iter_mut().find(|item| *item == old) {
        *slot = new;
    }
    items
}

pub fn replace_last<V: PartialEq>(mut items: Vec<V>, old: &V, new: V) -> Vec<V> {
    if let Some(slot) = items.iter_mut().rev().find(|item| *item == old) {
        *slot = new;
    }
    items
}

pub fn replace_all<V: PartialEq + Clone>(mut items: Vec<V>, old: &V, new: V) -> Vec<V> {
    for slot in items.iter_mut().filter(|item| *item == old) {
        *slot = new.clone();
    }
    items
}

pub fn update_first<V>(
    mut items: Vec<V>,
    predicate: impl Fn(&V) -> bool,
    update: impl FnOnce(&V) -> V,
) -> Vec<V> {
    if let Some(slot) = items.iter_mut().find(|item| predicate(item)) {
        *slot = update(slot);
    }
    items
}

pub fn update_all<V>(
    mut items: Vec<V>,
    predicate: impl Fn(&V) -> bool,
    update: impl Fn(&V) -> V,
) -> Vec<V> {
    for slot in items.iter_mut() {
        if predicate(slot) {
            *slot = update(slot);
        }
    }
    items
}

pub fn remove_first<V>(mut items: Vec<V>, predicate: impl Fn(&V) -> bool) -> Vec<V> {
    if let Some(index) = items.iter().position(predicate) {
        items.remove(index);
    }
    items
}

pub fn remove_last<V>(mut items: Vec<V>, predicate: impl Fn(&V) -> bool) -> Vec<V> {
    if let Some(index) = items.iter().rposition(predicate) {
        items.remove(index);
    }
    items
}

pub fn remove_all<V>(mut items: Vec<V>, predicate: impl Fn(&V) -> bool) -> Vec<V> {
    items.retain(|item| !predicate(item));
    items
}

/// Inserts at `index`, clamped to the sequence length.
pub fn insert<V>(mut items: Vec<V>, index: usize, item: V) -> Vec<V> {
    let index = index.min(items.len());
    items.insert(index, item);
    items
}

/// Inserts every element of `new_items` at `index`, clamped to the sequence length.
pub fn insert_all<V>(mut items: Vec<V>, index: usize, new_items: Vec<V>) -> Vec<V> {
    let index = index.min(items.len());
    items.splice(index..index, new_items);
    items
}
