pub mod providers;
pub mod recipes;
pub mod search;
pub mod social;
pub mod suggestions;
