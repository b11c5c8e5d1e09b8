pub mod ordering;
pub mod quick_add;
pub mod slug;
pub mod token;
