pub mod cart_item;
pub mod product;

pub use cart_item::*;
pub use product::*;
