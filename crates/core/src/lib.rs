pub mod config;
pub mod domain;
pub mod format;
pub mod pricing;

pub use domain::message::{ChatTurn, MessageRole};
pub use domain::product::{CurrencyMode, PricedProduct, Product};
pub use domain::user::ChatUser;
pub use format::{markup_is_balanced, product_block, results_reply, tidy_completion};
pub use pricing::discounted_price;
