//! In-memory list of books the reader is assembling into a plan.
//!
//! Lives for one interactive session; nothing is persisted.

use crate::types::book::{Book, BookCategory, BookSize, BookStatus};
use crate::types::errors::BookListError;

/// Fields that may be changed on an existing book.
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub category: Option<BookCategory>,
    pub size: Option<BookSize>,
    pub status: Option<BookStatus>,
}

/// Trait defining the book list interface.
pub trait BookListManagerTrait {
    fn add_book(&mut self, title: &str, category: BookCategory, size: BookSize) -> Result<String, BookListError>;
    fn update_book(&mut self, id: &str, update: BookUpdate) -> Result<(), BookListError>;
    fn remove_book(&mut self, id: &str) -> Result<(), BookListError>;
    fn get_book(&self, id: &str) -> Option<&Book>;
    fn list_books(&self) -> &[Book];
    fn clear(&mut self);
    fn book_count(&self) -> usize;
}

pub struct BookListManager {
    books: Vec<Book>,
}

impl BookListManager {
    pub fn new() -> Self {
        Self { books: Vec::new() }
    }

    fn find_index(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    fn validate_title(title: &str) -> Result<String, BookListError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BookListError::InvalidBook("title cannot be empty".to_string()));
        }
        Ok(title.to_string())
    }

    fn validate_size(size: BookSize) -> Result<BookSize, BookListError> {
        if size.is_zero() {
            return Err(BookListError::InvalidBook("size must be positive".to_string()));
        }
        Ok(size)
    }
}

impl Default for BookListManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BookListManagerTrait for BookListManager {
    /// Appends a book and returns its generated ID.
    fn add_book(
        &mut self,
        title: &str,
        category: BookCategory,
        size: BookSize,
    ) -> Result<String, BookListError> {
        let book = Book::new(Self::validate_title(title)?, category, Self::validate_size(size)?);
        let id = book.id.clone();
        self.books.push(book);
        Ok(id)
    }

    /// Applies the provided fields; validation failures leave the book unchanged.
    fn update_book(&mut self, id: &str, update: BookUpdate) -> Result<(), BookListError> {
        let index = self
            .find_index(id)
            .ok_or_else(|| BookListError::NotFound(id.to_string()))?;

        let title = update.title.as_deref().map(Self::validate_title).transpose()?;
        let size = update.size.map(Self::validate_size).transpose()?;

        let book = &mut self.books[index];
        if let Some(title) = title {
            book.title = title;
        }
        if let Some(category) = update.category {
            book.category = category;
        }
        if let Some(size) = size {
            book.size = size;
        }
        if let Some(status) = update.status {
            book.status = status;
        }
        Ok(())
    }

    fn remove_book(&mut self, id: &str) -> Result<(), BookListError> {
        let index = self
            .find_index(id)
            .ok_or_else(|| BookListError::NotFound(id.to_string()))?;
        self.books.remove(index);
        Ok(())
    }

    fn get_book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    fn list_books(&self) -> &[Book] {
        &self.books
    }

    fn clear(&mut self) {
        self.books.clear();
    }

    fn book_count(&self) -> usize {
        self.books.len()
    }
}
