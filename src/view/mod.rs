pub mod cart_panel;
pub mod launcher;
pub mod order_message;

pub use cart_panel::*;
pub use launcher::*;
pub use order_message::*;
