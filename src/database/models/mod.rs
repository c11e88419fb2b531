pub mod menu_item;

pub use menu_item::MenuItemRow;
