pub mod cart_store;
pub mod subscription;

pub use cart_store::CartStore;
pub use subscription::{Listener, Subscription};
