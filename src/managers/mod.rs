// planlector state managers
// Managers handle stateful data: the in-memory book list and the document store.

pub mod book_list_manager;
pub mod document_store;
