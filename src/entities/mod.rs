pub mod address;
pub mod company;
pub mod discount;
pub mod order;
pub mod order_item;
pub mod order_status_log;
pub mod product;
pub mod product_variation;
pub mod user_discount;
