// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use library_lending::domain::book::{Book, LibraryBranch};
use library_lending::domain::types::UserRole;
use library_lending::domain::user::User;

// ==========================================
// User 构建器
// ==========================================

pub struct UserBuilder {
    email: String,
    full_name: Option<String>,
    role: UserRole,
    is_active: bool,
    is_blocked: bool,
}

impl UserBuilder {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            full_name: None,
            role: UserRole::Member,
            is_active: true,
            is_blocked: false,
        }
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn full_name(mut self, name: &str) -> Self {
        self.full_name = Some(name.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn blocked(mut self) -> Self {
        self.is_blocked = true;
        self
    }

    pub fn build(self) -> User {
        let mut user = User::new(&self.email, self.full_name, self.role);
        user.is_active = self.is_active;
        user.is_blocked = self.is_blocked;
        user
    }
}

// ==========================================
// LibraryBranch 构建器
// ==========================================

pub struct BranchBuilder {
    name: String,
    address: Option<String>,
    is_active: bool,
}

impl BranchBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            address: None,
            is_active: true,
        }
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> LibraryBranch {
        let mut branch = LibraryBranch::new(&self.name);
        branch.address = self.address;
        branch.is_active = self.is_active;
        branch
    }
}

// ==========================================
// Book 构建器
// ==========================================

pub struct BookBuilder {
    title: String,
    isbn: String,
    branch_id: String,
    author: Option<String>,
    total_copies: i64,
    available_copies: Option<i64>,
}

impl BookBuilder {
    pub fn new(isbn: &str, branch_id: &str) -> Self {
        Self {
            title: format!("Book {}", isbn),
            isbn: isbn.to_string(),
            branch_id: branch_id.to_string(),
            author: None,
            total_copies: 1,
            available_copies: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn copies(mut self, total: i64) -> Self {
        self.total_copies = total;
        self
    }

    /// 不设置时与总副本数一致
    pub fn available(mut self, available: i64) -> Self {
        self.available_copies = Some(available);
        self
    }

    pub fn build(self) -> Book {
        let mut book = Book::new(&self.title, &self.isbn, &self.branch_id, self.total_copies);
        book.author = self.author;
        if let Some(available) = self.available_copies {
            book.available_copies = available;
        }
        book
    }
}
